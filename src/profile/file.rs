//! File-backed profile store with HMAC integrity.
//!
//! A `.store` file has this layout:
//!
//! ```text
//! [CVPS: 4][version: 1][key check: 32][profiles JSON][HMAC-SHA256: 32]
//! ```
//!
//! The key check is an HMAC of a fixed label under the store sub-key.  It
//! is compared first, so a store opened under a different secret fails
//! with `StoreKeyMismatch` (a crypto failure) instead of looking tampered.
//!
//! The trailing HMAC uses the same sub-key and covers everything after
//! the magic.  It is verified over the raw bytes from disk before anything
//! is deserialized; a mismatch there is `HmacMismatch`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::record::{ProfileRecord, ProfileUpdate};
use super::store::{upsert, ProfileStore};
use crate::crypto::key::{KeyMaterial, KEY_LEN};
use crate::errors::{CredVaultError, Result};
use crate::logging;

/// Magic bytes at the start of every store file.
const MAGIC: &[u8; 4] = b"CVPS";

/// Current store format version.
pub const CURRENT_VERSION: u8 = 1;

/// Size of the HMAC tag appended to the file.
const HMAC_LEN: usize = 32;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 32 (key check).
const PREFIX_LEN: usize = 5 + HMAC_LEN;

const KEY_CHECK_LABEL: &[u8] = b"credvault-store-key-check";

/// Profile store persisted to a single file.
pub struct FileProfileStore {
    path: PathBuf,
    profiles: HashMap<String, ProfileRecord>,
    hmac_key: Zeroizing<[u8; KEY_LEN]>,
}

impl FileProfileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store; it is created on first `save`.
    /// A store written under another secret is logged as a crypto failure.
    pub fn open(path: &Path, key: &KeyMaterial) -> Result<Self> {
        let hmac_key = Zeroizing::new(*key.store_hmac_key());

        let profiles = if path.exists() {
            let data = fs::read(path)?;
            let records = read_profiles(&data, hmac_key.as_slice()).map_err(|e| {
                if e.is_crypto_failure() {
                    logging::crypto_failure("open-store", &e);
                }
                e
            })?;
            tracing::debug!(path = %path.display(), profiles = records.len(), "profile store opened");
            records
                .into_iter()
                .map(|r| (r.user_id.clone(), r))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            profiles,
            hmac_key,
        })
    }

    /// Serialize the store and write it to disk atomically.
    pub fn save(&self) -> Result<()> {
        // Sorted for deterministic output.
        let mut records: Vec<&ProfileRecord> = self.profiles.values().collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        let buf = write_profiles(&records, self.hmac_key.as_slice())?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Temp file in the same directory so the rename is atomic.
        let parent = self.path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        fs::write(&tmp_path, &buf)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// All user ids in the store, sorted.
    pub fn user_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for FileProfileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileProfileStore")
            .field("path", &self.path)
            .field("profiles", &self.profiles.len())
            .finish_non_exhaustive()
    }
}

impl ProfileStore for FileProfileStore {
    fn get(&self, user_id: &str) -> Result<ProfileRecord> {
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| CredVaultError::ProfileNotFound(user_id.to_string()))
    }

    /// Upsert and persist.  If the write fails the in-memory state is
    /// rolled back so it keeps matching the file.
    fn update(&mut self, user_id: &str, update: &ProfileUpdate) -> Result<ProfileRecord> {
        let previous = self.profiles.get(user_id).cloned();
        let record = upsert(&mut self.profiles, user_id, update)?.clone();

        if let Err(e) = self.save() {
            match previous {
                Some(prev) => self.profiles.insert(user_id.to_string(), prev),
                None => self.profiles.remove(user_id),
            };
            return Err(e);
        }

        Ok(record)
    }
}

fn write_profiles(records: &[&ProfileRecord], hmac_key: &[u8]) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(records)
        .map_err(|e| CredVaultError::SerializationError(format!("profiles: {e}")))?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + body.len() + HMAC_LEN);
    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(&compute_hmac(hmac_key, KEY_CHECK_LABEL)?);
    buf.extend_from_slice(&body);

    let tag = compute_hmac(hmac_key, &buf[MAGIC.len()..])?;
    buf.extend_from_slice(&tag);
    Ok(buf)
}

fn read_profiles(data: &[u8], hmac_key: &[u8]) -> Result<Vec<ProfileRecord>> {
    if data.len() < PREFIX_LEN + HMAC_LEN {
        return Err(CredVaultError::InvalidStoreFormat(
            "file too small to be a profile store".into(),
        ));
    }

    if &data[..MAGIC.len()] != MAGIC {
        return Err(CredVaultError::InvalidStoreFormat(
            "missing CVPS magic bytes".into(),
        ));
    }

    let version = data[MAGIC.len()];
    if version != CURRENT_VERSION {
        return Err(CredVaultError::InvalidStoreFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    verify_hmac(hmac_key, KEY_CHECK_LABEL, &data[MAGIC.len() + 1..PREFIX_LEN])
        .map_err(|_| CredVaultError::StoreKeyMismatch)?;

    let tag_start = data.len() - HMAC_LEN;
    verify_hmac(hmac_key, &data[MAGIC.len()..tag_start], &data[tag_start..])?;

    serde_json::from_slice(&data[PREFIX_LEN..tag_start])
        .map_err(|e| CredVaultError::InvalidStoreFormat(format!("profiles JSON: {e}")))
}

fn compute_hmac(hmac_key: &[u8], covered: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| CredVaultError::HmacError(format!("invalid HMAC key: {e}")))?;
    mac.update(covered);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time check via `Mac::verify_slice`.
fn verify_hmac(hmac_key: &[u8], covered: &[u8], expected: &[u8]) -> Result<()> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| CredVaultError::HmacError(format!("invalid HMAC key: {e}")))?;
    mac.update(covered);
    mac.verify_slice(expected)
        .map_err(|_| CredVaultError::HmacMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::record::TokenKind;
    use tempfile::TempDir;

    fn key() -> KeyMaterial {
        KeyMaterial::from_secret("file-store-test-secret-0123456789").unwrap()
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::open(&dir.path().join("p.store"), &key()).unwrap();
        assert!(store.user_ids().is_empty());
        assert!(!dir.path().join("p.store").exists());
    }

    #[test]
    fn update_persists_and_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("p.store");

        let mut store = FileProfileStore::open(&path, &key()).unwrap();
        store
            .update("u1", &ProfileUpdate::with_token(TokenKind::Deploy, "ct-1"))
            .unwrap();
        assert!(path.exists());

        let reopened = FileProfileStore::open(&path, &key()).unwrap();
        assert_eq!(reopened.user_ids(), vec!["u1"]);
        assert_eq!(reopened.get("u1").unwrap().deploy_token.as_deref(), Some("ct-1"));
    }

    #[test]
    fn wrong_key_is_key_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.store");

        let mut store = FileProfileStore::open(&path, &key()).unwrap();
        store.update("u1", &ProfileUpdate::default()).unwrap();

        let other = KeyMaterial::from_secret("another-secret-fedcba9876543210xyz").unwrap();
        let err = FileProfileStore::open(&path, &other).unwrap_err();
        assert!(matches!(err, CredVaultError::StoreKeyMismatch));
        assert!(err.is_crypto_failure());
    }

    #[test]
    fn tampered_key_check_is_key_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.store");

        let mut store = FileProfileStore::open(&path, &key()).unwrap();
        store.update("u1", &ProfileUpdate::default()).unwrap();

        let mut data = fs::read(&path).unwrap();
        data[MAGIC.len() + 1] ^= 0x01;
        fs::write(&path, &data).unwrap();

        assert!(matches!(
            FileProfileStore::open(&path, &key()),
            Err(CredVaultError::StoreKeyMismatch)
        ));
    }

    #[test]
    fn corrupted_trailing_hmac_is_tamper() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.store");

        let mut store = FileProfileStore::open(&path, &key()).unwrap();
        store.update("u1", &ProfileUpdate::default()).unwrap();

        let mut data = fs::read(&path).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0x01;
        fs::write(&path, &data).unwrap();

        let err = FileProfileStore::open(&path, &key()).unwrap_err();
        assert!(matches!(err, CredVaultError::HmacMismatch));
        assert!(!err.is_crypto_failure());
    }

    #[test]
    #[tracing_test::traced_test]
    fn wrong_key_emits_crypto_failure_marker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.store");

        let mut store = FileProfileStore::open(&path, &key()).unwrap();
        store.update("u1", &ProfileUpdate::default()).unwrap();

        let other = KeyMaterial::from_secret("another-secret-fedcba9876543210xyz").unwrap();
        assert!(FileProfileStore::open(&path, &other).is_err());

        assert!(logs_contain("credential crypto failure"));
        assert!(logs_contain("crypto_failure=true"));
        assert!(logs_contain("open-store"));
    }

    #[test]
    fn tampered_body_is_detected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.store");

        let mut store = FileProfileStore::open(&path, &key()).unwrap();
        store.update("alice", &ProfileUpdate::default()).unwrap();

        let mut data = fs::read(&path).unwrap();
        let pos = data.windows(5).position(|w| w == b"alice").unwrap();
        data[pos] = b'm';
        fs::write(&path, &data).unwrap();

        assert!(matches!(
            FileProfileStore::open(&path, &key()),
            Err(CredVaultError::HmacMismatch)
        ));
    }

    #[test]
    fn rejects_foreign_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.store");
        fs::write(&path, [0u8; 64]).unwrap();

        assert!(matches!(
            FileProfileStore::open(&path, &key()),
            Err(CredVaultError::InvalidStoreFormat(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn store_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.store");
        let mut store = FileProfileStore::open(&path, &key()).unwrap();
        store.update("u1", &ProfileUpdate::default()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
