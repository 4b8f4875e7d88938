//! Mint and use self-certifying `did:jis` identities.
//!
//! A `did:jis` identity is an ed25519 keypair plus the operations of the
//! method: minting `did:jis:<id>` strings (caller-chosen or derived from
//! the key), issuing signed identity documents, and signing or verifying
//! arbitrary messages. [Decentralized identifiers][did-core] make the
//! identity self-certifying, so a constrained device can prove who it is
//! without reaching a registry.
//!
//! [`DidEngine`] is the entry point: construct one with fresh randomness or
//! from a provisioned secret, and every operation hangs off it.
//!
//! ```
//! use did_jis::{DidDocument, DidEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DidEngine::new();
//! let did = engine.create_did("device:001")?;
//!
//! let document = engine.create_document(did.as_str())?;
//! assert!(DidDocument::verify_json(&document));
//!
//! let signature = engine.sign(b"ping");
//! assert!(engine.verify(b"ping", &signature));
//! # Ok(())
//! # }
//! ```
//!
//! [did-core]: https://www.w3.org/TR/did-core/

#![forbid(unsafe_code)]

pub mod crypto;
pub mod did;
pub mod document;
pub mod engine;
pub mod keypair;

pub use crate::did::Did;
pub use crate::document::DidDocument;
pub use crate::engine::DidEngine;
pub use crate::keypair::KeyPair;

/// Library version, fixed at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
