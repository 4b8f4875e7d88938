//! Signature primitives, plus re-exports of the backing crates so callers
//! can drop down a level when they need to.

// Re-exports
pub use ed25519_dalek;
#[cfg(feature = "random")]
pub use rand_core;

pub mod ed25519;
