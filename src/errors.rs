use std::fmt;

use thiserror::Error;

/// Why a ciphertext could not be turned back into a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptFailure {
    /// Not valid base64, or too short to hold a nonce and auth tag.
    Malformed,
    /// Envelope carries a version byte this build does not understand.
    UnsupportedVersion(u8),
    /// OpenSSL-style `Salted__` envelope from the previous storage scheme.
    LegacyFormat,
    /// Auth tag rejected: wrong key or tampered data.
    Authentication,
    /// Decrypted bytes are not UTF-8.
    NotUtf8,
}

impl fmt::Display for DecryptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => f.write_str("ciphertext is malformed"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported ciphertext version {v}"),
            Self::LegacyFormat => {
                f.write_str("legacy ciphertext format — the credential must be re-entered")
            }
            Self::Authentication => f.write_str("wrong key or corrupted data"),
            Self::NotUtf8 => f.write_str("decrypted value is not valid UTF-8"),
        }
    }
}

/// All errors that can occur in CredVault.
#[derive(Debug, Error)]
pub enum CredVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailure(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailure(DecryptFailure),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Key configuration errors ---
    #[error("Encryption key not configured — set {var} (try `credvault keygen`)")]
    KeyMissing { var: String },

    #[error("Encryption key too short — need at least {min} bytes, got {got}")]
    WeakKey { min: usize, got: usize },

    // --- Profile store errors ---
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("No {kind} token configured for '{user_id}'")]
    TokenNotConfigured { user_id: String, kind: String },

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("Invalid profile store format: {0}")]
    InvalidStoreFormat(String),

    #[error("Profile store was written under a different encryption key")]
    StoreKeyMismatch,

    #[error("HMAC verification failed — profile store may be tampered")]
    HmacMismatch,

    #[error("HMAC error: {0}")]
    HmacError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

impl CredVaultError {
    /// `true` for failures of the cipher or a key mismatch, as opposed to
    /// config, storage or input problems.
    pub fn is_crypto_failure(&self) -> bool {
        matches!(
            self,
            Self::EncryptionFailure(_) | Self::DecryptionFailure(_) | Self::StoreKeyMismatch
        )
    }
}

impl From<DecryptFailure> for CredVaultError {
    fn from(reason: DecryptFailure) -> Self {
        Self::DecryptionFailure(reason)
    }
}

/// Convenience type alias for CredVault results.
pub type Result<T> = std::result::Result<T, CredVaultError>;
