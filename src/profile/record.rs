//! Profile records, partial updates and token kinds.
//!
//! A `ProfileRecord` is what the store persists per user.  Token fields
//! only ever hold ciphertexts produced by `VaultCodec::encrypt`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CredVaultError, Result};

/// Maximum length of a user id.
const MAX_USER_ID_LEN: usize = 128;

/// Which third-party credential a token field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Deployment-platform access token.
    Deploy,
    /// Code-generation API key.
    Generation,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Deploy, TokenKind::Generation];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Generation => "generation",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = CredVaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "deploy" => Ok(Self::Deploy),
            "generation" | "gen" => Ok(Self::Generation),
            other => Err(CredVaultError::CommandFailed(format!(
                "unknown token kind '{other}' — expected deploy or generation"
            ))),
        }
    }
}

/// A user's persisted profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Encrypted deployment token, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_token: Option<String>,

    /// Encrypted generation API key, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_key: Option<String>,

    #[serde(default)]
    pub onboarding_complete: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// An empty profile for `user_id`.
    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            full_name: None,
            deploy_token: None,
            generation_key: None,
            onboarding_complete: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The stored ciphertext for `kind`, if any.
    pub fn token(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::Deploy => self.deploy_token.as_deref(),
            TokenKind::Generation => self.generation_key.as_deref(),
        }
    }

    /// Apply a partial update.  Fields absent from `update` are kept; a
    /// token field set to the empty string is cleared.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.full_name {
            self.full_name = Some(name.clone());
        }
        if let Some(done) = update.onboarding_complete {
            self.onboarding_complete = done;
        }
        for kind in TokenKind::ALL {
            if let Some(value) = update.token(kind) {
                let slot = match kind {
                    TokenKind::Deploy => &mut self.deploy_token,
                    TokenKind::Generation => &mut self.generation_key,
                };
                *slot = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
        }
        self.updated_at = Utc::now();
    }
}

/// A partial profile update; `None` fields are left untouched.
///
/// Handed to `TokenService` with plaintext tokens and to a
/// `ProfileStore` with ciphertexts.  Zeroed on drop either way.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub deploy_token: Option<String>,
    pub generation_key: Option<String>,
    pub onboarding_complete: Option<bool>,
}

impl ProfileUpdate {
    /// An update touching only the `kind` token.
    pub fn with_token(kind: TokenKind, value: &str) -> Self {
        let mut update = Self::default();
        *update.token_mut(kind) = Some(value.to_string());
        update
    }

    pub fn token(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::Deploy => self.deploy_token.as_deref(),
            TokenKind::Generation => self.generation_key.as_deref(),
        }
    }

    pub fn token_mut(&mut self, kind: TokenKind) -> &mut Option<String> {
        match kind {
            TokenKind::Deploy => &mut self.deploy_token,
            TokenKind::Generation => &mut self.generation_key,
        }
    }
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("full_name", &self.full_name)
            .field("deploy_token", &self.deploy_token.as_ref().map(|_| "[redacted]"))
            .field("generation_key", &self.generation_key.as_ref().map(|_| "[redacted]"))
            .field("onboarding_complete", &self.onboarding_complete)
            .finish()
    }
}

/// Validate that a user id is safe to use as a store key.
///
/// Allowed: ASCII letters, digits, `_`, `-`, `.`, `@`.
/// Must be non-empty and at most 128 characters.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(CredVaultError::InvalidUserId(
            "user id cannot be empty".into(),
        ));
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err(CredVaultError::InvalidUserId(format!(
            "user id cannot exceed {MAX_USER_ID_LEN} characters"
        )));
    }
    if !user_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'@'))
    {
        return Err(CredVaultError::InvalidUserId(format!(
            "'{user_id}' contains invalid characters — only ASCII letters, digits, '_', '-', '.' and '@' are allowed"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_kind_parses_and_displays() {
        assert_eq!("deploy".parse::<TokenKind>().unwrap(), TokenKind::Deploy);
        assert_eq!("Generation".parse::<TokenKind>().unwrap(), TokenKind::Generation);
        assert_eq!("gen".parse::<TokenKind>().unwrap(), TokenKind::Generation);
        assert!("github".parse::<TokenKind>().is_err());
        assert_eq!(TokenKind::Deploy.to_string(), "deploy");
    }

    #[test]
    fn apply_keeps_absent_fields() {
        let mut record = ProfileRecord::new("u1");
        record.deploy_token = Some("ct-deploy".into());
        record.full_name = Some("Ada".into());

        let mut update = ProfileUpdate::default();
        update.onboarding_complete = Some(true);
        record.apply(&update);

        assert_eq!(record.deploy_token.as_deref(), Some("ct-deploy"));
        assert_eq!(record.full_name.as_deref(), Some("Ada"));
        assert!(record.onboarding_complete);
    }

    #[test]
    fn apply_empty_token_clears_field() {
        let mut record = ProfileRecord::new("u1");
        record.generation_key = Some("ct-gen".into());

        record.apply(&ProfileUpdate::with_token(TokenKind::Generation, ""));
        assert!(record.generation_key.is_none());
    }

    #[test]
    fn apply_bumps_updated_at() {
        let mut record = ProfileRecord::new("u1");
        let before = record.updated_at;
        record.apply(&ProfileUpdate::with_token(TokenKind::Deploy, "ct"));
        assert!(record.updated_at >= before);
        assert_eq!(record.created_at, before);
    }

    #[test]
    fn update_debug_redacts_tokens() {
        let update = ProfileUpdate::with_token(TokenKind::Deploy, "vt_abc123");
        let shown = format!("{update:?}");
        assert!(!shown.contains("vt_abc123"));
        assert!(shown.contains("[redacted]"));
    }

    #[test]
    fn user_id_validation() {
        assert!(validate_user_id("user@example.com").is_ok());
        assert!(validate_user_id("3f2b-91_a.x").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("a b").is_err());
        assert!(validate_user_id("../etc").is_err());
        assert!(validate_user_id(&"a".repeat(129)).is_err());
    }
}
