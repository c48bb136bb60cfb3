//! Bot configuration file support.
//!
//! This module reads the bot configuration from a `delbot.toml` file. Every
//! field has a default, so an empty file (or an absent table) yields a
//! working configuration pointed at it.wiki.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Error loading or validating the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration error: {0}")]
    Invalid(String),
}

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub wiki: WikiSettings,
    #[serde(default)]
    pub run: RunSettings,
}

/// Settings of the wiki the transport layer talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Settings of a daily run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    /// How many days behind the target date are classified as well, to
    /// refresh reports that strays may have landed on.
    #[serde(default = "default_lookbehind_days")]
    pub lookbehind_days: u32,
    /// When set, nothing is written back to the wiki.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_api_url() -> String {
    "https://it.wikipedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    concat!("delbot/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_lookbehind_days() -> u32 {
    1
}

impl Default for WikiSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            lookbehind_days: default_lookbehind_days(),
            dry_run: false,
        }
    }
}

impl BotConfig {
    /// Load the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: BotConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from the default locations, in order:
    /// `delbot.toml`, `config/delbot.toml`, `../delbot.toml`.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("delbot.toml"),
            PathBuf::from("config/delbot.toml"),
            PathBuf::from("../delbot.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::Invalid(
            "no delbot.toml found in standard locations".to_string(),
        ))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.wiki.api_url.is_empty() {
            return Err(ConfigError::Invalid(
                "wiki.api_url must not be empty".to_string(),
            ));
        }
        if !self.wiki.api_url.starts_with("http") {
            return Err(ConfigError::Invalid(format!(
                "wiki.api_url does not look like a URL: {}",
                self.wiki.api_url
            )));
        }
        if self.wiki.user_agent.is_empty() {
            return Err(ConfigError::Invalid(
                "wiki.user_agent must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
