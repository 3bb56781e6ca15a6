//! Cryptographic primitives for CredVault.
//!
//! This module provides:
//! - Key material derived from the configured secret (`key`)
//! - AES-256-GCM sealing of raw bytes (`encryption`)
//! - The versioned base64 ciphertext envelope (`envelope`)
//! - SHA-256 digests for equality checks (`digest`)
//! - `VaultCodec`, which ties the above into encrypt / decrypt / hash (`codec`)

pub mod codec;
pub mod digest;
pub mod encryption;
pub mod envelope;
pub mod key;

pub use codec::VaultCodec;
pub use digest::{hash, verify_digest};
pub use key::{generate_secret, KeyMaterial, MIN_SECRET_LEN};
