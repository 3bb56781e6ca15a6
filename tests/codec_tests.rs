//! Integration tests for the credential codec.

use std::sync::Arc;
use std::thread;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use credvault::crypto::{hash, verify_digest, KeyMaterial, VaultCodec};
use credvault::{CredVaultError, DecryptFailure};

const K1: &str = "integration-key-one-0123456789abcdef";
const K2: &str = "integration-key-two-0123456789abcdef";

fn codec(secret: &str) -> VaultCodec {
    VaultCodec::new(KeyMaterial::from_secret(secret).expect("valid key"))
}

fn decrypt_failure(result: credvault::Result<impl Sized>) -> DecryptFailure {
    match result {
        Err(CredVaultError::DecryptionFailure(reason)) => reason,
        Err(other) => panic!("expected DecryptionFailure, got {other:?}"),
        Ok(_) => panic!("expected DecryptionFailure, got Ok"),
    }
}

// ---------------------------------------------------------------------------
// Round trip and empty handling
// ---------------------------------------------------------------------------

#[test]
fn decrypt_inverts_encrypt() {
    let c = codec(K1);
    let long = "x".repeat(4096);
    let samples = ["a", "vt_abc123", "sk-live 0123 with spaces", "línea\nnueva\t🔐", long.as_str()];

    for s in samples {
        let ct = c.encrypt(s).expect("encrypt");
        assert_eq!(c.decrypt(&ct).expect("decrypt").as_str(), s);
    }
}

#[test]
fn empty_means_absent() {
    let c = codec(K1);
    assert_eq!(c.encrypt("").unwrap(), "");
    assert_eq!(c.decrypt("").unwrap().as_str(), "");
}

#[test]
fn same_plaintext_encrypts_differently() {
    let c = codec(K1);
    let a = c.encrypt("vt_abc123").unwrap();
    let b = c.encrypt("vt_abc123").unwrap();
    assert_ne!(a, b, "fresh nonce per call");
    assert_eq!(c.decrypt(&a).unwrap().as_str(), c.decrypt(&b).unwrap().as_str());
}

#[test]
fn ciphertext_is_standard_base64() {
    let c = codec(K1);
    let ct = c.encrypt("vt_abc123").unwrap();
    let raw = BASE64.decode(&ct).expect("base64");
    // version + nonce + plaintext + tag
    assert_eq!(raw.len(), 1 + 12 + "vt_abc123".len() + 16);
    assert_eq!(raw[0], 1);
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn wrong_key_never_returns_plaintext() {
    let ct = codec(K1).encrypt("vt_abc123").unwrap();
    let reason = decrypt_failure(codec(K2).decrypt(&ct));
    assert_eq!(reason, DecryptFailure::Authentication);
}

#[test]
fn tampered_ciphertext_fails() {
    let c = codec(K1);
    let ct = c.encrypt("vt_abc123").unwrap();

    let mut raw = BASE64.decode(&ct).unwrap();
    let mid = raw.len() / 2;
    raw[mid] ^= 0x80;
    let tampered = BASE64.encode(&raw);

    assert_eq!(decrypt_failure(c.decrypt(&tampered)), DecryptFailure::Authentication);
}

#[test]
fn truncated_ciphertext_fails() {
    let c = codec(K1);
    let ct = c.encrypt("vt_abc123").unwrap();
    let raw = BASE64.decode(&ct).unwrap();

    // Dropping the last byte leaves a decodable but unauthenticated body.
    let short = BASE64.encode(&raw[..raw.len() - 1]);
    assert_eq!(decrypt_failure(c.decrypt(&short)), DecryptFailure::Authentication);

    // Shorter than nonce + tag.
    let stub = BASE64.encode(&raw[..10]);
    assert_eq!(decrypt_failure(c.decrypt(&stub)), DecryptFailure::Malformed);
}

#[test]
fn garbage_input_is_malformed() {
    let c = codec(K1);
    assert_eq!(decrypt_failure(c.decrypt("%%%not-base64%%%")), DecryptFailure::Malformed);
}

#[test]
fn unknown_version_is_reported() {
    let c = codec(K1);
    let mut raw = BASE64.decode(c.encrypt("vt_abc123").unwrap()).unwrap();
    raw[0] = 9;
    assert_eq!(
        decrypt_failure(c.decrypt(&BASE64.encode(&raw))),
        DecryptFailure::UnsupportedVersion(9)
    );
}

#[test]
fn legacy_openssl_ciphertext_is_reported_distinctly() {
    let c = codec(K1);
    let legacy = "U2FsdGVkX1+q0bB0mXr6rE7m1Zb0cXb3mO8y4v1G2z4=";
    let err = c.decrypt(legacy).unwrap_err();
    assert!(err.is_crypto_failure());
    assert!(matches!(
        err,
        CredVaultError::DecryptionFailure(DecryptFailure::LegacyFormat)
    ));
}

#[test]
fn key_configuration_is_validated() {
    assert!(matches!(
        KeyMaterial::from_secret("short"),
        Err(CredVaultError::WeakKey { .. })
    ));
    assert!(VaultCodec::from_secret("").is_err());
}

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

#[test]
fn hash_is_deterministic_and_distinguishes_inputs() {
    let a1 = hash("user@example.com");
    let a2 = hash("user@example.com");
    let b = hash("other@example.com");

    assert_eq!(a1, a2);
    assert_ne!(a1, b);
    assert_eq!(a1.len(), 64);
    assert!(a1.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
}

#[test]
fn hash_does_not_depend_on_key() {
    assert_eq!(codec(K1).hash("value"), codec(K2).hash("value"));
    assert_eq!(codec(K1).hash("value"), hash("value"));
}

#[test]
fn verification_rehashes_candidate() {
    let digest = hash("user@example.com");
    assert!(verify_digest("user@example.com", &digest));
    assert!(!verify_digest("user@example.org", &digest));
    assert!(codec(K1).verify_digest("user@example.com", &digest));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn codec_is_shareable_across_threads() {
    let c = Arc::new(codec(K1));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let c = Arc::clone(&c);
            thread::spawn(move || {
                let secret = format!("token-{i}");
                for _ in 0..50 {
                    let ct = c.encrypt(&secret).unwrap();
                    assert_eq!(c.decrypt(&ct).unwrap().as_str(), secret);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().expect("worker panicked");
    }
}
