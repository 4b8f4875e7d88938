//! Signed identity documents.
//!
//! A document binds a DID to its public key and carries a proof over its
//! own canonical serialization, making it self-certifying: whoever holds
//! the document alone can check that the embedded key endorsed it, no
//! registry or resolver involved.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::ed25519::{self, PubKey, ED25519_MULTICODEC};
use crate::keypair::KeyPair;

/// Type tag of the embedded verification method.
pub const VERIFICATION_METHOD_TYPE: &str = "Ed25519VerificationKey2020";
/// Type tag of the proof.
pub const PROOF_TYPE: &str = "Ed25519Signature2020";
/// Fragment naming the engine's key within its document.
const KEY_FRAGMENT: &str = "#keys-1";

/// A DID document, in the exact shape it is serialized in.
///
/// Field order is load-bearing: the proof signs the compact,
/// declaration-order serde serialization of the whole document with
/// `signatureValue` absent, so reordering or renaming a field here changes
/// what future signatures cover and orphans every document already issued.
/// The model is closed: fields the signature never covered fail parsing
/// instead of riding along unsigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DidDocument {
	pub id: String,
	pub verification_method: Vec<VerificationMethod>,
	pub authentication: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub proof: Option<Proof>,
}

/// A public key entry within a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerificationMethod {
	pub id: String,
	#[serde(rename = "type")]
	pub type_: String,
	pub controller: String,
	pub public_key_multibase: String,
}

/// The signature block of a document.
///
/// `created` stays a preformatted RFC 3339 string so that parsing and
/// re-serializing a document reproduces the signed bytes exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Proof {
	#[serde(rename = "type")]
	pub type_: String,
	pub created: String,
	pub verification_method: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub signature_value: Option<String>,
}

impl DidDocument {
	/// Builds and signs the document for `did` with `keys`, stamped with
	/// the current time.
	pub fn build(keys: &KeyPair, did: &str) -> Result<Self, DocumentError> {
		Self::build_at(keys, did, Utc::now())
	}

	/// Like [`DidDocument::build`] with an explicit timestamp; the output
	/// is then fully deterministic for a given key, DID and instant.
	pub fn build_at(
		keys: &KeyPair,
		did: &str,
		created: DateTime<Utc>,
	) -> Result<Self, DocumentError> {
		if did.is_empty() {
			return Err(DocumentError::EmptyDid);
		}
		let method_id = format!("{did}{KEY_FRAGMENT}");
		let mut doc = Self {
			id: did.to_owned(),
			verification_method: vec![VerificationMethod {
				id: method_id.clone(),
				type_: VERIFICATION_METHOD_TYPE.to_owned(),
				controller: did.to_owned(),
				public_key_multibase: keys.public_key_multibase(),
			}],
			authentication: vec![method_id.clone()],
			proof: Some(Proof {
				type_: PROOF_TYPE.to_owned(),
				created: created.to_rfc3339_opts(SecondsFormat::Secs, true),
				verification_method: method_id,
				signature_value: None,
			}),
		};

		// the signature covers everything above, timestamp included
		let canonical = serde_json::to_string(&doc)?;
		let signature = ed25519::signature_to_hex(&keys.sign(canonical.as_bytes()));
		if let Some(proof) = doc.proof.as_mut() {
			proof.signature_value = Some(signature);
		}
		Ok(doc)
	}

	/// Serializes the document as compact JSON, signature included.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Checks a serialized document's self-certification: the proof
	/// signature must verify, under the key the document itself embeds,
	/// over the document's canonical form with `signatureValue` removed.
	///
	/// This is a total predicate. Malformed JSON, a missing proof or key,
	/// an undecodable `publicKeyMultibase`, and a plain bad signature all
	/// come back as `false`.
	pub fn verify_json(json: &str) -> bool {
		let Ok(mut doc) = serde_json::from_str::<Self>(json) else {
			return false;
		};
		let Some(signature_hex) = doc
			.proof
			.as_mut()
			.and_then(|proof| proof.signature_value.take())
		else {
			return false;
		};
		let Some(method) = doc.verification_method.first() else {
			return false;
		};
		let Some(key_bytes) = decode_multibase_key(&method.public_key_multibase) else {
			return false;
		};
		let Ok(key) = PubKey::try_from_bytes(&key_bytes) else {
			return false;
		};
		let Some(signature) = ed25519::signature_from_hex(&signature_hex) else {
			return false;
		};
		let Ok(canonical) = serde_json::to_string(&doc) else {
			return false;
		};
		ed25519::verify(key.verifying_key(), canonical.as_bytes(), &signature)
	}
}

/// Decodes a `z`-base58btc multibase value and strips the ed25519
/// multicodec tag. `None` on any mismatch.
fn decode_multibase_key(multibase: &str) -> Option<[u8; PubKey::LEN]> {
	let encoded = multibase.strip_prefix('z')?;
	let decoded = bs58::decode(encoded)
		.with_alphabet(bs58::Alphabet::BITCOIN)
		.into_vec()
		.ok()?;
	let key = decoded.strip_prefix(&ED25519_MULTICODEC)?;
	<[u8; PubKey::LEN]>::try_from(key).ok()
}

/// An error while building a document.
#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
	#[error("a document requires a non-empty DID")]
	EmptyDid,
	#[error("failed to serialize the document")]
	Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
	use chrono::TimeZone;
	use eyre::WrapErr;

	use super::*;

	const ZERO_SEED_MULTIBASE: &str = "z6MkiTBz1ymuepAQ4HEHYSF1H8quG5GLVVQR3djdX3mDooWp";

	fn zero_keys() -> eyre::Result<KeyPair> {
		KeyPair::from_secret_hex(&"00".repeat(32)).wrap_err("failed to import the all-zero seed")
	}

	fn fixed_instant() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().expect("in range")
	}

	#[test]
	fn builds_a_self_certifying_document() -> eyre::Result<()> {
		let keys = zero_keys()?;
		let doc = DidDocument::build(&keys, "did:jis:alice")?;

		assert_eq!(doc.id, "did:jis:alice");
		let method = doc.verification_method.first().expect("one key entry");
		assert_eq!(method.id, "did:jis:alice#keys-1");
		assert_eq!(method.type_, VERIFICATION_METHOD_TYPE);
		assert_eq!(method.controller, "did:jis:alice");
		assert_eq!(method.public_key_multibase, ZERO_SEED_MULTIBASE);
		assert_eq!(doc.authentication, ["did:jis:alice#keys-1"]);

		let proof = doc.proof.as_ref().expect("document is signed");
		assert_eq!(proof.type_, PROOF_TYPE);
		assert_eq!(proof.verification_method, "did:jis:alice#keys-1");
		assert!(proof.signature_value.is_some());

		assert!(DidDocument::verify_json(&doc.to_json()?));
		Ok(())
	}

	#[test]
	fn output_is_deterministic_for_a_fixed_instant() -> eyre::Result<()> {
		let keys = zero_keys()?;
		let a = DidDocument::build_at(&keys, "did:jis:alice", fixed_instant())?.to_json()?;
		let b = DidDocument::build_at(&keys, "did:jis:alice", fixed_instant())?.to_json()?;
		assert_eq!(a, b);
		assert!(a.contains(r#""created":"2026-01-02T03:04:05Z""#));
		Ok(())
	}

	#[test]
	fn serializes_compactly_in_declaration_order() -> eyre::Result<()> {
		let keys = zero_keys()?;
		let json = DidDocument::build_at(&keys, "did:jis:alice", fixed_instant())?.to_json()?;

		assert!(!json.contains('\n'));
		assert!(!json.contains(": "));
		assert!(json.starts_with(r#"{"id":"did:jis:alice","verificationMethod":[{"id":"#));

		// top-level and proof fields appear in declaration order
		let order = [
			r#""id":"#,
			r#""verificationMethod":"#,
			r#""type":"Ed25519VerificationKey2020""#,
			r#""controller":"#,
			r#""publicKeyMultibase":"#,
			r#""authentication":"#,
			r#""proof":"#,
			r#""type":"Ed25519Signature2020""#,
			r#""created":"#,
			r#""signatureValue":"#,
		];
		let mut last = 0;
		for needle in order {
			let at = json[last..]
				.find(needle)
				.ok_or_else(|| eyre::eyre!("missing {needle} after byte {last}"))?;
			last += at + needle.len();
		}
		Ok(())
	}

	#[test]
	fn accepts_caller_chosen_dids() -> eyre::Result<()> {
		let keys = zero_keys()?;
		let json = DidDocument::build(&keys, "did:jis:device:001")?.to_json()?;
		assert!(DidDocument::verify_json(&json));
		Ok(())
	}

	#[test]
	fn rejects_an_empty_did() -> eyre::Result<()> {
		assert!(matches!(
			DidDocument::build(&zero_keys()?, ""),
			Err(DocumentError::EmptyDid)
		));
		Ok(())
	}

	#[test]
	fn verification_rejects_tampering() -> eyre::Result<()> {
		let keys = zero_keys()?;
		let json = DidDocument::build_at(&keys, "did:jis:alice", fixed_instant())?.to_json()?;
		assert!(DidDocument::verify_json(&json));

		let renamed = json.replace("did:jis:alice", "did:jis:mallory");
		assert!(!DidDocument::verify_json(&renamed));

		let backdated = json.replace("2026-01-02T03:04:05Z", "2020-01-02T03:04:05Z");
		assert!(!DidDocument::verify_json(&backdated));

		// flip one hex char of the signature
		let mut doc: DidDocument = serde_json::from_str(&json)?;
		let proof = doc.proof.as_mut().expect("signed");
		let signature = proof.signature_value.take().expect("signed");
		let flipped = match signature.as_bytes()[0] {
			b'0' => format!("1{}", &signature[1..]),
			_ => format!("0{}", &signature[1..]),
		};
		proof.signature_value = Some(flipped);
		assert!(!DidDocument::verify_json(&doc.to_json()?));
		Ok(())
	}

	#[test]
	fn verification_requires_a_complete_proof() -> eyre::Result<()> {
		let keys = zero_keys()?;
		let mut doc = DidDocument::build_at(&keys, "did:jis:alice", fixed_instant())?;

		let mut unsigned = doc.clone();
		if let Some(proof) = unsigned.proof.as_mut() {
			proof.signature_value = None;
		}
		assert!(!DidDocument::verify_json(&unsigned.to_json()?));

		doc.proof = None;
		assert!(!DidDocument::verify_json(&doc.to_json()?));
		Ok(())
	}

	#[test]
	fn verification_rejects_injected_fields() -> eyre::Result<()> {
		let keys = zero_keys()?;
		let json = DidDocument::build_at(&keys, "did:jis:alice", fixed_instant())?.to_json()?;

		// a field the signature never covered cannot ride along
		let padded = json.replacen('{', r#"{"service":[],"#, 1);
		assert!(!DidDocument::verify_json(&padded));
		Ok(())
	}

	#[test]
	fn verification_is_total_on_garbage() {
		for json in [
			"",
			"not json",
			"{}",
			r#"{"id":"did:jis:alice"}"#,
			r#"{"id":"did:jis:alice","verificationMethod":[],"authentication":[]}"#,
		] {
			assert!(!DidDocument::verify_json(json), "input: {json:?}");
		}
	}

	#[test]
	fn multibase_decoding_is_strict() {
		assert!(decode_multibase_key(ZERO_SEED_MULTIBASE).is_some());
		for bad in [
			"",
			"z",
			// base64 multibase prefix
			"m6MkiTBz1ymuepAQ4HEHYSF1H8quG5GLVVQR3djdX3mDooWp",
			// 0 is not in the base58btc alphabet
			"z0MkiTBz1ymuepAQ4HEHYSF1H8quG5GLVVQR3djdX3mDooWp",
			// wrong length once decoded
			"z6Mki",
		] {
			assert!(decode_multibase_key(bad).is_none(), "input: {bad:?}");
		}
	}
}
