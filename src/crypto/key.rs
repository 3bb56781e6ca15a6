//! Process-wide key material.
//!
//! The configured secret string is never used as a cipher key directly.
//! HKDF-SHA256 expands it into two independent sub-keys:
//! - the **cipher key** used by the codec for AES-256-GCM, and
//! - the **store HMAC key** used to authenticate the profile store file.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{CredVaultError, Result};

/// Length of derived sub-keys (256 bits).
pub const KEY_LEN: usize = 32;

/// Minimum length of the configured secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

const CIPHER_KEY_INFO: &[u8] = b"credvault-cipher-key";
const STORE_HMAC_INFO: &[u8] = b"credvault-store-hmac";

/// Sub-keys derived from the configured secret.  Zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    cipher_key: [u8; KEY_LEN],
    store_hmac_key: [u8; KEY_LEN],
}

impl KeyMaterial {
    /// Derive key material from the configured secret string.
    ///
    /// Rejects secrets shorter than `MIN_SECRET_LEN` bytes; there is no
    /// fallback secret.
    pub fn from_secret(secret: &str) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(CredVaultError::WeakKey {
                min: MIN_SECRET_LEN,
                got: secret.len(),
            });
        }

        Ok(Self {
            cipher_key: hkdf_derive(secret.as_bytes(), CIPHER_KEY_INFO)?,
            store_hmac_key: hkdf_derive(secret.as_bytes(), STORE_HMAC_INFO)?,
        })
    }

    pub(crate) fn cipher_key(&self) -> &[u8; KEY_LEN] {
        &self.cipher_key
    }

    pub(crate) fn store_hmac_key(&self) -> &[u8; KEY_LEN] {
        &self.store_hmac_key
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial([redacted])")
    }
}

fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| CredVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// Generate a fresh random secret (32 bytes, base64) suitable for the
/// key environment variable.
pub fn generate_secret() -> String {
    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    rand::rng().fill_bytes(bytes.as_mut_slice());
    BASE64.encode(bytes.as_slice())
}
