//! The `ProfileStore` seam and an in-memory implementation.

use std::collections::HashMap;

use super::record::{validate_user_id, ProfileRecord, ProfileUpdate};
use crate::errors::{CredVaultError, Result};

/// Persistent per-user profile records.
///
/// Implementations store whatever they are given; encrypting token
/// fields before `update` is the caller's job (see `TokenService`).
pub trait ProfileStore {
    /// Fetch the profile for `user_id`, or `ProfileNotFound`.
    fn get(&self, user_id: &str) -> Result<ProfileRecord>;

    /// Apply `update` to the profile for `user_id`, creating it if it
    /// does not exist yet, and return the stored result.
    fn update(&mut self, user_id: &str, update: &ProfileUpdate) -> Result<ProfileRecord>;
}

/// `HashMap`-backed store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: HashMap<String, ProfileRecord>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user_id: &str) -> Result<ProfileRecord> {
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| CredVaultError::ProfileNotFound(user_id.to_string()))
    }

    fn update(&mut self, user_id: &str, update: &ProfileUpdate) -> Result<ProfileRecord> {
        Ok(upsert(&mut self.profiles, user_id, update)?.clone())
    }
}

/// Shared upsert logic for map-backed stores.
pub(crate) fn upsert<'a>(
    profiles: &'a mut HashMap<String, ProfileRecord>,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<&'a ProfileRecord> {
    validate_user_id(user_id)?;

    let record = profiles
        .entry(user_id.to_string())
        .or_insert_with(|| ProfileRecord::new(user_id));
    record.apply(update);
    Ok(record)
}
