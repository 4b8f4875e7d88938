//! Ed25519 signing and verification, with the hex encodings used on the
//! wire and validation of keys that arrive from outside the engine.

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Length of a hex-encoded public key.
pub const PUBLIC_KEY_HEX_LENGTH: usize = PUBLIC_KEY_LENGTH * 2;
/// Length of a hex-encoded signature.
pub const SIGNATURE_HEX_LENGTH: usize = SIGNATURE_LENGTH * 2;

/// Multicodec tag for an ed25519 public key (`0xed` as a varint), prefixed
/// to the key bytes inside multibase encodings.
pub(crate) const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// An ed25519 public key that arrived from outside the engine.
///
/// Keys only construct through validation: the bytes must be the y
/// coordinate of a point on the curve, and low-order points are rejected
/// because their signatures verify under almost any message.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct PubKey(VerifyingKey);

impl PubKey {
	pub const LEN: usize = PUBLIC_KEY_LENGTH;

	/// Instantiates a `PubKey` from raw bytes, validating that the bytes
	/// are a point on the curve and of sufficient strength.
	pub fn try_from_bytes(bytes: &[u8; Self::LEN]) -> Result<Self, TryFromBytesError> {
		let compressed = CompressedEdwardsY(bytes.to_owned());
		let Some(point) = compressed.decompress() else {
			return Err(TryFromBytesError::NotOnCurve);
		};
		let key = VerifyingKey::from(point);
		if key.is_weak() {
			return Err(TryFromBytesError::WeakKey);
		}
		Ok(Self(key))
	}

	/// Instantiates a `PubKey` from its 64-char hex encoding,
	/// case-insensitively.
	pub fn try_from_hex(hex_str: &str) -> Result<Self, TryFromHexError> {
		if hex_str.len() != PUBLIC_KEY_HEX_LENGTH {
			return Err(TryFromHexError::WrongLength(hex_str.len()));
		}
		let mut bytes = [0; Self::LEN];
		hex::decode_to_slice(hex_str, &mut bytes)?;
		Ok(Self::try_from_bytes(&bytes)?)
	}

	pub fn verifying_key(&self) -> &VerifyingKey {
		&self.0
	}

	pub fn into_inner(self) -> VerifyingKey {
		self.0
	}
}

/// Decodes a signature from its 128-char hex encoding. `None` if the
/// length or the characters are off.
pub fn signature_from_hex(hex_str: &str) -> Option<Signature> {
	if hex_str.len() != SIGNATURE_HEX_LENGTH {
		return None;
	}
	let mut bytes = [0; SIGNATURE_LENGTH];
	hex::decode_to_slice(hex_str, &mut bytes).ok()?;
	Some(Signature::from_bytes(&bytes))
}

/// Encodes a signature as lowercase hex, always 128 chars.
pub fn signature_to_hex(signature: &Signature) -> String {
	hex::encode(signature.to_bytes())
}

/// Checks `signature` over `message` under `key`. Any failure is `false`.
pub fn verify(key: &VerifyingKey, message: &[u8], signature: &Signature) -> bool {
	key.verify(message, signature).is_ok()
}

/// Checks a hex signature over `message` under a caller-supplied hex public
/// key, independent of any keypair held locally. Malformed hex, off-curve
/// or weak keys, and plain mismatches all come back as `false`.
pub fn verify_with_key(message: &[u8], signature_hex: &str, public_key_hex: &str) -> bool {
	let Ok(key) = PubKey::try_from_hex(public_key_hex) else {
		return false;
	};
	let Some(signature) = signature_from_hex(signature_hex) else {
		return false;
	};
	verify(key.verifying_key(), message, &signature)
}

#[derive(thiserror::Error, Debug)]
pub enum TryFromBytesError {
	#[error("the provided bytes were not the y coordinate of a valid point on the curve")]
	NotOnCurve,
	#[error("public key has a low order and is too weak, which would allow the key to generate signatures that verify for almost any message")]
	WeakKey,
}

#[derive(thiserror::Error, Debug)]
pub enum TryFromHexError {
	#[error("expected {} hex characters but got {0}", PUBLIC_KEY_HEX_LENGTH)]
	WrongLength(usize),
	#[error("not valid hex")]
	Hex(#[from] hex::FromHexError),
	#[error(transparent)]
	Bytes(#[from] TryFromBytesError),
}
