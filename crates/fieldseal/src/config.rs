//! Configuration loading and validation.
//!
//! All values are read from `FIELDSEAL_*` environment variables at startup.
//! A missing or unusable master key is a hard error: there is no fallback to
//! a built-in development secret.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated encryption configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Master secret all per-operation keys are derived from. **Required.**
    pub master_key: String,

    /// Logical id stamped into envelopes produced with the master key.
    #[serde(default = "default_key_id")]
    pub key_id: String,
}

fn default_key_id() -> String {
    "default".into()
}

impl Config {
    /// Load and validate configuration from `FIELDSEAL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `FIELDSEAL_MASTER_KEY` is absent, or if any value
    /// fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("FIELDSEAL"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration (is FIELDSEAL_MASTER_KEY set?)")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.master_key.trim().is_empty() {
            anyhow::bail!("FIELDSEAL_MASTER_KEY is required and must not be empty");
        }
        if self.master_key.trim().len() < 16 {
            anyhow::bail!("FIELDSEAL_MASTER_KEY must be at least 16 characters");
        }
        if self.key_id.trim().is_empty() {
            anyhow::bail!("FIELDSEAL_KEY_ID must not be empty");
        }
        Ok(())
    }
}

impl std::fmt::Display for Config {
    /// Renders the key id only; the master key never appears in logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config {{ key_id: {} }}", self.key_id)
    }
}
