//! AES-256-GCM authenticated encryption over raw bytes.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `open` splits the nonce back out
//! before decrypting and verifying the tag.
//!
//! Layout of the sealed buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use super::key::KEY_LEN;
use crate::errors::{CredVaultError, DecryptFailure, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under a 32-byte cipher key.
///
/// Returns nonce || ciphertext || tag.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CredVaultError::EncryptionFailure(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CredVaultError::EncryptionFailure(format!("AES-256-GCM: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt a buffer produced by `seal`.
///
/// A buffer too short to hold a nonce and tag is `Malformed`; any tag
/// mismatch (wrong key, flipped bit, truncated body) is `Authentication`.
pub fn open(key: &[u8; KEY_LEN], sealed: &[u8]) -> std::result::Result<Vec<u8>, DecryptFailure> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(DecryptFailure::Malformed);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| DecryptFailure::Authentication)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| DecryptFailure::Authentication)
}
