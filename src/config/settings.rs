use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::KeyMaterial;
use crate::errors::{CredVaultError, Result};

/// Project-level configuration, loaded from `.credvault.toml`.
///
/// Every field has a default so CredVault works without a config file.
/// The encryption secret itself is never read from this file, only the
/// name of the environment variable that holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Environment variable holding the encryption secret.
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// Directory (relative to project root) for the profile store and audit db.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// File name of the profile store inside `data_dir`.
    #[serde(default = "default_store_file")]
    pub store_file: String,

    /// Default log level for the `credvault` target (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_key_env() -> String {
    "CREDVAULT_SECRET_KEY".to_string()
}

fn default_data_dir() -> String {
    ".credvault".to_string()
}

fn default_store_file() -> String {
    "profiles.store".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_env: default_key_env(),
            data_dir: default_data_dir(),
            store_file: default_store_file(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".credvault.toml";

    /// Load settings from `<project_dir>/.credvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CredVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.key_env.trim().is_empty() {
            return Err(CredVaultError::ConfigError(format!(
                "{}: key_env cannot be empty",
                config_path.display()
            )));
        }

        Ok(settings)
    }

    /// Full path of the data directory.
    pub fn data_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.data_dir)
    }

    /// Full path of the profile store file.
    ///
    /// Example: `project_dir/.credvault/profiles.store`
    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        self.data_path(project_dir).join(&self.store_file)
    }

    /// Read the encryption secret from the process environment and
    /// derive key material from it.
    ///
    /// Fails with `KeyMissing` when the variable is unset or empty;
    /// there is no built-in fallback secret.
    pub fn load_key(&self) -> Result<KeyMaterial> {
        self.load_key_from(|name| std::env::var(name).ok())
    }

    /// Like `load_key`, but with an explicit variable lookup.
    pub fn load_key_from<F>(&self, lookup: F) -> Result<KeyMaterial>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let secret = Zeroizing::new(lookup(&self.key_env).unwrap_or_default());

        if secret.is_empty() {
            return Err(CredVaultError::KeyMissing {
                var: self.key_env.clone(),
            });
        }

        KeyMaterial::from_secret(&secret)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
