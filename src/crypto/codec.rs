//! `VaultCodec` — the credential-at-rest transformation layer.
//!
//! Converts plaintext tokens into storable ciphertexts and back, and
//! exposes the one-way digest.  The codec holds nothing but read-only
//! key material, so a single instance can be shared across threads.

use zeroize::{Zeroize, Zeroizing};

use super::digest;
use super::encryption::{open, seal};
use super::envelope;
use super::key::KeyMaterial;
use crate::errors::{CredVaultError, DecryptFailure, Result};
use crate::logging;

#[derive(Debug)]
pub struct VaultCodec {
    key: KeyMaterial,
}

impl VaultCodec {
    /// Build a codec around already-derived key material.
    pub fn new(key: KeyMaterial) -> Self {
        Self { key }
    }

    /// Shorthand for `VaultCodec::new(KeyMaterial::from_secret(secret)?)`.
    pub fn from_secret(secret: &str) -> Result<Self> {
        Ok(Self::new(KeyMaterial::from_secret(secret)?))
    }

    /// The key material this codec was built with.
    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Encrypt a secret for storage.
    ///
    /// An empty secret means "not set" and encrypts to an empty string.
    /// Every other call uses a fresh nonce, so equal inputs give
    /// different outputs.
    pub fn encrypt(&self, secret: &str) -> Result<String> {
        if secret.is_empty() {
            return Ok(String::new());
        }

        let sealed = seal(self.key.cipher_key(), secret.as_bytes()).map_err(|e| {
            logging::crypto_failure("encrypt", &e);
            e
        })?;

        Ok(envelope::encode(&sealed))
    }

    /// Decrypt a stored ciphertext.
    ///
    /// An empty ciphertext decrypts to an empty secret.  Anything else
    /// either yields the exact original secret or a `DecryptionFailure`.
    pub fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>> {
        if ciphertext.is_empty() {
            return Ok(Zeroizing::new(String::new()));
        }

        self.try_decrypt(ciphertext).map_err(|reason| {
            let err = CredVaultError::DecryptionFailure(reason);
            logging::crypto_failure("decrypt", &err);
            err
        })
    }

    fn try_decrypt(&self, ciphertext: &str) -> std::result::Result<Zeroizing<String>, DecryptFailure> {
        let sealed = envelope::decode(ciphertext)?;
        let plaintext = open(self.key.cipher_key(), &sealed)?;

        // On error, zeroize the bytes inside the error before discarding.
        String::from_utf8(plaintext).map(Zeroizing::new).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            DecryptFailure::NotUtf8
        })
    }

    /// One-way digest of `value`; see [`digest::hash`].
    pub fn hash(&self, value: &str) -> String {
        digest::hash(value)
    }

    /// Constant-time digest check; see [`digest::verify_digest`].
    pub fn verify_digest(&self, value: &str, expected: &str) -> bool {
        digest::verify_digest(value, expected)
    }
}
