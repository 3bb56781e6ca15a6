//! One-way digests for equality checks.
//!
//! Digests are lowercase hex SHA-256 of the UTF-8 input.  There is no
//! way back from a digest to its input; to check a candidate, hash it
//! and compare with `verify_digest`.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of a hex digest in characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash `value` with SHA-256 and return the lowercase hex digest.
pub fn hash(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Check whether `value` hashes to `digest`.
///
/// The comparison is constant-time and ignores hex case.
pub fn verify_digest(value: &str, digest: &str) -> bool {
    let actual = hash(value);
    let expected = digest.trim().to_ascii_lowercase();

    actual.as_bytes().ct_eq(expected.as_bytes()).into()
}
