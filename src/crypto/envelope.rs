//! Text envelope for stored ciphertexts.
//!
//! A stored ciphertext is the standard base64 (padded) encoding of:
//!
//! ```text
//! [version: 1 byte][nonce: 12 bytes][AES-256-GCM ciphertext + 16-byte tag]
//! ```
//!
//! The envelope is the only artifact persisted; nothing else is needed
//! to decrypt it besides the key.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::DecryptFailure;

/// Current envelope version.
pub const CURRENT_VERSION: u8 = 1;

/// Prefix of OpenSSL `enc`-style payloads written by the old storage scheme.
const LEGACY_MAGIC: &[u8] = b"Salted__";

/// Wrap a sealed buffer (nonce || ciphertext || tag) into storable text.
pub fn encode(sealed: &[u8]) -> String {
    let mut buf = Vec::with_capacity(1 + sealed.len());
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(sealed);
    BASE64.encode(buf)
}

/// Unwrap storable text back into the sealed buffer.
pub fn decode(text: &str) -> Result<Vec<u8>, DecryptFailure> {
    let mut bytes = BASE64
        .decode(text)
        .map_err(|_| DecryptFailure::Malformed)?;

    if bytes.starts_with(LEGACY_MAGIC) {
        return Err(DecryptFailure::LegacyFormat);
    }

    match bytes.first() {
        None => Err(DecryptFailure::Malformed),
        Some(&CURRENT_VERSION) => {
            bytes.remove(0);
            Ok(bytes)
        }
        Some(&other) => Err(DecryptFailure::UnsupportedVersion(other)),
    }
}
