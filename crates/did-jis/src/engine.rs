//! The engine: one identity, every operation of the method.

use crate::crypto::ed25519;
use crate::did::{Did, EmptyIdentifier};
use crate::document::{DidDocument, DocumentError};
use crate::keypair::{ImportKeyError, KeyPair};

/// A `did:jis` identity engine.
///
/// An engine owns a single keypair, fixed at construction, and exposes the
/// whole method surface around it: minting DIDs, issuing signed documents,
/// and signing or verifying messages. Construction either yields a working
/// engine or an error; there is no half-initialized state to guard against.
///
/// Every operation takes `&self`, so one engine can serve any number of
/// threads without locks. Dropping it is teardown.
#[derive(Debug)]
pub struct DidEngine {
	keys: KeyPair,
}

impl DidEngine {
	/// Creates an engine around a freshly generated keypair.
	#[cfg(feature = "random")]
	pub fn new() -> Self {
		Self {
			keys: KeyPair::generate(),
		}
	}

	/// Recreates an engine from a provisioned 64-hex-char secret. The same
	/// secret always yields the same identity.
	pub fn from_secret_hex(secret_hex: &str) -> Result<Self, ImportKeyError> {
		Ok(Self {
			keys: KeyPair::from_secret_hex(secret_hex)?,
		})
	}

	/// The engine's public key as 64 lowercase hex chars.
	pub fn public_key_hex(&self) -> String {
		self.keys.public_key_hex()
	}

	/// The engine's public key in multibase form, as embedded in its
	/// documents.
	pub fn public_key_multibase(&self) -> String {
		self.keys.public_key_multibase()
	}

	/// The underlying key material.
	pub fn keypair(&self) -> &KeyPair {
		&self.keys
	}

	/// Mints `did:jis:<id>` for a caller-chosen id.
	pub fn create_did(&self, id: &str) -> Result<Did, EmptyIdentifier> {
		Did::new_jis(id)
	}

	/// Mints the DID derived from the engine's own public key.
	pub fn create_did_from_key(&self) -> Did {
		Did::from_public_key(&self.keys.verifying_key())
	}

	/// Issues the signed identity document for `did` as compact JSON.
	///
	/// `did` does not have to be the engine's derived DID; any non-empty
	/// identifier the caller controls is accepted. Check the result with
	/// [`DidDocument::verify_json`].
	pub fn create_document(&self, did: &str) -> Result<String, DocumentError> {
		DidDocument::build(&self.keys, did)?
			.to_json()
			.map_err(DocumentError::from)
	}

	/// Signs `message` with the engine key, returning the 128-hex-char
	/// signature.
	pub fn sign(&self, message: &[u8]) -> String {
		ed25519::signature_to_hex(&self.keys.sign(message))
	}

	/// Checks a hex signature over `message` against the engine's own key.
	/// Total: malformed hex and mismatches are `false`, never an error.
	pub fn verify(&self, message: &[u8], signature_hex: &str) -> bool {
		let Some(signature) = ed25519::signature_from_hex(signature_hex) else {
			return false;
		};
		ed25519::verify(&self.keys.verifying_key(), message, &signature)
	}

	/// Checks a hex signature over `message` against an arbitrary hex
	/// public key, with no engine state involved.
	pub fn verify_with_key(message: &[u8], signature_hex: &str, public_key_hex: &str) -> bool {
		ed25519::verify_with_key(message, signature_hex, public_key_hex)
	}
}

#[cfg(feature = "random")]
impl Default for DidEngine {
	fn default() -> Self {
		Self::new()
	}
}
