//! Ed25519 key material owned by an engine.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
#[cfg(feature = "random")]
use rand_core::OsRng;

use crate::crypto::ed25519::ED25519_MULTICODEC;

/// Length of a hex-encoded secret seed.
pub const SECRET_KEY_HEX_LENGTH: usize = SECRET_KEY_LENGTH * 2;

/// An ed25519 keypair. The secret half never leaves this type; only
/// encodings of the public half do.
///
/// The public key is always the one derived from the secret, so no
/// constructor can produce mismatched halves.
pub struct KeyPair {
	signing: SigningKey,
}

impl KeyPair {
	/// Generates a fresh keypair from the operating system's entropy
	/// source.
	#[cfg(feature = "random")]
	pub fn generate() -> Self {
		Self {
			signing: SigningKey::generate(&mut OsRng),
		}
	}

	/// Imports a keypair from a 64-hex-char secret seed, case-insensitively.
	///
	/// Importing is deterministic: the same seed always reconstructs the
	/// same pair, which is how a provisioned identity survives restarts
	/// without any stored state.
	pub fn from_secret_hex(secret_hex: &str) -> Result<Self, ImportKeyError> {
		if secret_hex.len() != SECRET_KEY_HEX_LENGTH {
			return Err(ImportKeyError::WrongLength(secret_hex.len()));
		}
		let mut seed = [0; SECRET_KEY_LENGTH];
		hex::decode_to_slice(secret_hex, &mut seed)?;
		Ok(Self {
			signing: SigningKey::from_bytes(&seed),
		})
	}

	/// The public key as 64 lowercase hex chars.
	pub fn public_key_hex(&self) -> String {
		hex::encode(self.signing.verifying_key().to_bytes())
	}

	/// The public key in multibase form: `z` followed by the base58btc
	/// encoding of the multicodec-tagged key bytes. This is the same
	/// encoding `did:key` uses, so the value drops into standard DID
	/// documents unchanged.
	pub fn public_key_multibase(&self) -> String {
		let tagged = [
			ED25519_MULTICODEC.as_slice(),
			&self.signing.verifying_key().to_bytes(),
		]
		.concat();
		format!(
			"z{}",
			bs58::encode(tagged)
				.with_alphabet(bs58::Alphabet::BITCOIN)
				.into_string()
		)
	}

	/// The verification half of the pair.
	pub fn verifying_key(&self) -> VerifyingKey {
		self.signing.verifying_key()
	}

	/// Signs `message`. Ed25519 signing is deterministic: the same message
	/// under the same key always yields the same signature.
	pub fn sign(&self, message: &[u8]) -> Signature {
		self.signing.sign(message)
	}
}

// keeps the secret half out of logs
impl std::fmt::Debug for KeyPair {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("KeyPair")
			.field("public_key", &self.public_key_hex())
			.finish_non_exhaustive()
	}
}

#[derive(thiserror::Error, Debug)]
pub enum ImportKeyError {
	#[error("expected a secret of {} hex characters but got {0}", SECRET_KEY_HEX_LENGTH)]
	WrongLength(usize),
	#[error("secret is not valid hex")]
	Hex(#[from] hex::FromHexError),
}
