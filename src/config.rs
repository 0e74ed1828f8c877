//! Application configuration.
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. a config file (`--config`, or `kafkalens.toml`/`.yaml` in the working
//!    directory when present)
//! 3. `KAFKALENS_*` environment variables, `__` separating nested keys
//!
//! ```toml
//! current_context = "staging"
//! poll_interval = "5s"
//! refresh_interval = "100ms"
//! offset = "latest"
//! tail = 50
//!
//! [[contexts]]
//! name = "staging"
//! brokers = "kafka-staging:9092"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use kafkalens_types::{ConsumeFlags, OffsetPolicy};
use serde::Deserialize;

use crate::data::duration::parse_duration;

/// A named set of bootstrap brokers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContextConfig {
    pub name: String,
    pub brokers: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Context selected at startup; the first configured one when unset.
    pub current_context: Option<String>,
    pub contexts: Vec<ContextConfig>,
    pub poll_interval: String,
    pub refresh_interval: String,
    pub offset: OffsetPolicy,
    /// Messages per partition to start from with the latest policy.
    /// Defaults to the policy's own default.
    pub tail: Option<i32>,
    pub follow: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            current_context: None,
            contexts: Vec::new(),
            poll_interval: "5s".to_string(),
            refresh_interval: "100ms".to_string(),
            offset: OffsetPolicy::Latest,
            tail: None,
            follow: true,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Load from `path` (required to exist) or the optional default file,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("kafkalens").required(false),
        };
        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("KAFKALENS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("reading configuration")?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let app: AppConfig = config
            .try_deserialize()
            .context("invalid configuration")?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<()> {
        self.poll_interval()?;
        self.refresh_interval()?;
        if let Some(tail) = self.tail {
            if tail < 0 {
                bail!("tail must not be negative, got {}", tail);
            }
        }
        if let Some(current) = &self.current_context {
            if !self.contexts.is_empty() && !self.contexts.iter().any(|c| &c.name == current) {
                bail!("current_context '{}' is not a configured context", current);
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        positive_interval("poll_interval", &self.poll_interval)
    }

    pub fn refresh_interval(&self) -> Result<Duration> {
        positive_interval("refresh_interval", &self.refresh_interval)
    }

    /// Flags a new topic page starts with.
    pub fn consume_flags(&self) -> ConsumeFlags {
        let tail = self.tail.unwrap_or_else(|| self.offset.default_tail());
        ConsumeFlags::new(self.offset, tail, self.follow)
    }

    /// The startup context: the configured one, else the first listed.
    pub fn initial_context(&self) -> Option<&str> {
        self.current_context
            .as_deref()
            .or_else(|| self.contexts.first().map(|c| c.name.as_str()))
    }
}

/// Timers need a non-zero period.
fn positive_interval(field: &str, value: &str) -> Result<Duration> {
    let interval = parse_duration(value).with_context(|| format!("{} '{}'", field, value))?;
    if interval.is_zero() {
        bail!("{} must be greater than zero, got '{}'", field, value);
    }
    Ok(interval)
}
