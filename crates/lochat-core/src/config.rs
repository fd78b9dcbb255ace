//! Configuration loading for lochat.
//!
//! Config lives at `$LOCHAT_HOME/config.toml` (default `~/.config/lochat`).
//! A missing file means defaults; a present but malformed file is an error.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_CONTEXT_WINDOW: u64 = 2048;
const DEFAULT_CONTEXT_MESSAGES: usize = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# lochat configuration

# Base URL of the Ollama server (also overridable via OLLAMA_BASE_URL)
# base_url = "http://localhost:11434"

# Model used for chat and generate
model = "llama3.2"

# Context window size in tokens, for usage accounting
# context_window = 2048

# How many recent messages are sent with each request; 0 sends all
# context_messages = 10

# Per-request timeout in seconds
# timeout_secs = 120
"#;

/// Filesystem locations used by lochat.
pub mod paths {
    use std::path::PathBuf;

    use anyhow::{Context, Result};

    /// Returns the lochat home directory.
    ///
    /// `LOCHAT_HOME` overrides the default of `~/.config/lochat`.
    pub fn lochat_home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("LOCHAT_HOME") {
            if !home.is_empty() {
                return Ok(PathBuf::from(home));
            }
        }
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".config").join("lochat"))
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(lochat_home()?.join("config.toml"))
    }
}

/// User configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Model used for chat and generate.
    pub model: String,
    /// Context window size in tokens, for usage accounting.
    pub context_window: u64,
    /// How many recent messages are sent with each request; 0 sends all.
    pub context_messages: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            context_messages: DEFAULT_CONTEXT_MESSAGES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads config from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    /// Loads config from a specific path, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes a commented default config file, failing if one already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("config already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .with_context(|| format!("invalid base_url: {}", self.base_url))?;
        Ok(())
    }

    /// Resolves the effective base URL: `OLLAMA_BASE_URL` env var wins over
    /// the config file, which wins over the built-in default.
    pub fn resolve_base_url(&self) -> String {
        match std::env::var("OLLAMA_BASE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => self.base_url.clone(),
        }
    }
}
