//! Encrypt-on-write / decrypt-on-read over a `ProfileStore`.
//!
//! `TokenService` is the only path by which plaintext tokens reach a
//! store.  It keeps two outcomes apart that callers must not confuse:
//! a token that was never configured (`None`) and a stored token that
//! cannot be decrypted (`Err(DecryptionFailure)`).

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::record::{validate_user_id, ProfileRecord, ProfileUpdate, TokenKind};
use super::store::ProfileStore;
use crate::crypto::VaultCodec;
use crate::errors::Result;

/// Decrypted tokens for one user.
pub struct UserTokens {
    pub deploy: Option<Zeroizing<String>>,
    pub generation: Option<Zeroizing<String>>,
}

impl UserTokens {
    pub fn get(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::Deploy => self.deploy.as_deref().map(String::as_str),
            TokenKind::Generation => self.generation.as_deref().map(String::as_str),
        }
    }
}

impl fmt::Debug for UserTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserTokens")
            .field("deploy", &self.deploy.as_ref().map(|_| "[redacted]"))
            .field("generation", &self.generation.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Which tokens a user has configured, without decrypting anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStatus {
    pub user_id: String,
    pub deploy: bool,
    pub generation: bool,
    pub onboarding_complete: bool,
    pub updated_at: DateTime<Utc>,
}

impl TokenStatus {
    pub fn is_configured(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Deploy => self.deploy,
            TokenKind::Generation => self.generation,
        }
    }
}

pub struct TokenService<'a, S: ProfileStore> {
    codec: &'a VaultCodec,
    store: S,
}

impl<'a, S: ProfileStore> TokenService<'a, S> {
    pub fn new(codec: &'a VaultCodec, store: S) -> Self {
        Self { codec, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encrypt every token in `update` and hand the result to the store.
    ///
    /// If any token fails to encrypt, nothing is written.
    pub fn update_profile(&mut self, user_id: &str, update: &ProfileUpdate) -> Result<ProfileRecord> {
        validate_user_id(user_id)?;

        let mut encrypted = ProfileUpdate::default();
        encrypted.full_name = update.full_name.clone();
        encrypted.onboarding_complete = update.onboarding_complete;
        for kind in TokenKind::ALL {
            if let Some(plaintext) = update.token(kind) {
                *encrypted.token_mut(kind) = Some(self.codec.encrypt(plaintext)?);
            }
        }

        let record = self.store.update(user_id, &encrypted)?;
        tracing::debug!(user_id, "profile updated");
        Ok(record)
    }

    /// Store `plaintext` as the user's `kind` token.  Empty clears it.
    pub fn set_token(&mut self, user_id: &str, kind: TokenKind, plaintext: &str) -> Result<()> {
        self.update_profile(user_id, &ProfileUpdate::with_token(kind, plaintext))?;
        tracing::info!(user_id, token = %kind, cleared = plaintext.is_empty(), "token stored");
        Ok(())
    }

    /// Remove the user's `kind` token.
    pub fn clear_token(&mut self, user_id: &str, kind: TokenKind) -> Result<()> {
        self.set_token(user_id, kind, "")
    }

    /// Decrypt both tokens for `user_id`.
    pub fn get_tokens(&self, user_id: &str) -> Result<UserTokens> {
        let record = self.store.get(user_id)?;

        Ok(UserTokens {
            deploy: self.decrypt_field(&record, TokenKind::Deploy)?,
            generation: self.decrypt_field(&record, TokenKind::Generation)?,
        })
    }

    /// Decrypt a single token for `user_id`.
    pub fn get_token(&self, user_id: &str, kind: TokenKind) -> Result<Option<Zeroizing<String>>> {
        let record = self.store.get(user_id)?;
        self.decrypt_field(&record, kind)
    }

    pub fn token_status(&self, user_id: &str) -> Result<TokenStatus> {
        let record = self.store.get(user_id)?;

        Ok(TokenStatus {
            deploy: record.token(TokenKind::Deploy).is_some(),
            generation: record.token(TokenKind::Generation).is_some(),
            onboarding_complete: record.onboarding_complete,
            updated_at: record.updated_at,
            user_id: record.user_id,
        })
    }

    fn decrypt_field(&self, record: &ProfileRecord, kind: TokenKind) -> Result<Option<Zeroizing<String>>> {
        let Some(ciphertext) = record.token(kind) else {
            return Ok(None);
        };

        let plaintext = self.codec.decrypt(ciphertext).map_err(|e| {
            tracing::warn!(user_id = %record.user_id, token = %kind, "stored token could not be decrypted");
            e
        })?;

        Ok((!plaintext.is_empty()).then_some(plaintext))
    }
}
