pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod logging;
pub mod profile;

#[cfg(feature = "audit-log")]
pub mod audit;

pub use crypto::{KeyMaterial, VaultCodec};
pub use errors::{CredVaultError, DecryptFailure, Result};
