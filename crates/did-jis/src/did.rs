//! Parsing and construction of `did:<method>:<id>` strings, and the
//! stricter rules of the `jis` method.

use std::fmt::Display;
use std::ops::{Range, RangeFrom};
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

/// The method this engine mints DIDs under.
pub const JIS_METHOD: &str = "jis";

const SCHEME_PREFIX: &str = "did:";
/// How many bytes of the key digest make up a derived id.
const KEY_ID_DIGEST_LEN: usize = 16;

/// A parsed DID of the form `did:<method>:<id>`.
///
/// Parsing accepts any method so that foreign DIDs can still be split into
/// their components; whether a string is a well-formed `did:jis` identifier
/// is the separate, stricter [`Did::is_valid_jis`] predicate.
///
/// The id is everything after the second colon, so ids themselves may
/// contain colons: `did:jis:device:001` has the id `device:001`.
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub struct Did {
	/// The string representation of the DID.
	s: String,
	/// Range of the method within `s`.
	method: Range<usize>,
	/// Range of the id within `s`.
	id: RangeFrom<usize>,
}

impl Did {
	/// Builds `did:jis:<id>` from a caller-chosen id.
	///
	/// Only emptiness is rejected; the id is carried through byte for byte,
	/// so callers keep responsibility for picking ids that satisfy
	/// [`Did::is_valid_jis`].
	pub fn new_jis(id: &str) -> Result<Self, EmptyIdentifier> {
		if id.is_empty() {
			return Err(EmptyIdentifier);
		}
		Ok(Self::assemble(JIS_METHOD, id))
	}

	/// Derives the `did:jis` identifier bound to a public key: the id is
	/// the hex of the first 16 bytes of SHA-256 over the raw key. Stable
	/// for a given key.
	pub fn from_public_key(key: &VerifyingKey) -> Self {
		let digest = Sha256::digest(key.to_bytes());
		Self::assemble(JIS_METHOD, &hex::encode(&digest[..KEY_ID_DIGEST_LEN]))
	}

	/// Whether `s` is a well-formed `did:jis` DID: parseable, method
	/// exactly `jis`, and an id drawn from `[A-Za-z0-9._:-]`.
	///
	/// This is a total predicate. Foreign methods such as `did:web` and
	/// malformed strings are `false`, never an error.
	pub fn is_valid_jis(s: &str) -> bool {
		let Ok(did) = Self::from_str(s) else {
			return false;
		};
		did.method() == JIS_METHOD && did.id().bytes().all(is_id_byte)
	}

	pub fn as_str(&self) -> &str {
		&self.s
	}

	/// The method component, without the surrounding colons.
	pub fn method(&self) -> &str {
		&self.s[self.method.clone()]
	}

	/// The id component: everything after the second colon.
	pub fn id(&self) -> &str {
		&self.s[self.id.clone()]
	}

	pub fn into_string(self) -> String {
		self.s
	}

	fn assemble(method: &str, id: &str) -> Self {
		let s = format!("{SCHEME_PREFIX}{method}:{id}");
		let method_end = SCHEME_PREFIX.len() + method.len();
		Self {
			s,
			method: SCHEME_PREFIX.len()..method_end,
			id: (method_end + 1)..,
		}
	}
}

fn is_id_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b':' | b'-')
}

/// Splits `s` into its method and id ranges.
fn parse_parts(s: &str) -> Result<(Range<usize>, RangeFrom<usize>), ParseError> {
	let remaining = s
		.strip_prefix(SCHEME_PREFIX)
		.ok_or(ParseError::InvalidScheme)?;
	let (method, id) = remaining.split_once(':').ok_or(ParseError::MissingId)?;
	if method.is_empty() {
		return Err(ParseError::MissingMethod);
	}
	if id.is_empty() {
		return Err(ParseError::MissingId);
	}
	let method_start = SCHEME_PREFIX.len();
	let method_end = method_start + method.len();
	Ok((method_start..method_end, (method_end + 1)..))
}

impl FromStr for Did {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (method, id) = parse_parts(s)?;
		Ok(Self {
			s: s.to_owned(),
			method,
			id,
		})
	}
}

impl TryFrom<String> for Did {
	type Error = ParseError;

	fn try_from(s: String) -> Result<Self, Self::Error> {
		let (method, id) = parse_parts(&s)?;
		Ok(Self { s, method, id })
	}
}

impl Display for Did {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.as_str().fmt(f)
	}
}

/// An error while parsing a DID.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum ParseError {
	#[error("expected the string to start with the `did:` scheme, case-sensitively")]
	InvalidScheme,
	#[error("expected `did:<method>:<id>` but the method was empty")]
	MissingMethod,
	#[error("expected `did:<method>:<id>` but there was no id")]
	MissingId,
}

/// The id handed to [`Did::new_jis`] was empty.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
#[error("identifier must not be empty")]
pub struct EmptyIdentifier;
