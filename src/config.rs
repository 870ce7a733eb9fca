//! Deployment configuration: KDF profile and plaintext size ceiling.
//!
//! Read from `<config dir>/cloudseal/config.json` when present. Every field is
//! optional in the file; missing fields take their defaults.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::crypto::{KdfProfile, SealOptions};
use crate::payload::{self, MAX_PLAINTEXT_BYTES};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// PBKDF2 cost profile used for both sealing and opening.
    pub kdf_profile: KdfProfile,
    /// Plaintext ceiling in bytes. Values above 50 MiB are clamped down.
    pub max_plaintext_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kdf_profile: KdfProfile::default(),
            max_plaintext_bytes: MAX_PLAINTEXT_BYTES,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Invalid config file")
    }

    /// Load from `path`, which must exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn seal_options(&self) -> SealOptions {
        SealOptions {
            kdf: self.kdf_profile.into(),
            max_plaintext_bytes: payload::effective_limit(self.max_plaintext_bytes),
        }
    }
}
