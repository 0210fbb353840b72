//! Configuration file parser for ~/.config/quotedeck/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde, but we log a warning so typos show up
//! in the log file.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_API_BASE_URL: &str = "https://assignment.stage.crafto.app";
pub const DEFAULT_MEDIA_UPLOAD_URL: &str = "https://crafto.app/crafto/v1.0/media/assignment/upload";

/// Top-level application configuration.
///
/// Every field has a default so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the quotes API (login, getQuotes, postQuote).
    pub api_base_url: String,

    /// Full URL of the media upload endpoint.
    pub media_upload_url: String,

    /// Quotes requested per page. Clamped to 1..=100.
    pub page_size: usize,

    /// Quiet period before a "load more" trigger fires.
    pub debounce_ms: u64,

    /// Per-request timeout for every API call.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            media_upload_url: DEFAULT_MEDIA_UPLOAD_URL.to_string(),
            page_size: 20,
            debounce_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const MAX_PAGE_SIZE: usize = 100;

    const KNOWN_KEYS: [&'static str; 5] = [
        "api_base_url",
        "media_upload_url",
        "page_size",
        "debounce_ms",
        "request_timeout_secs",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Out-of-range values → clamped, with a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        let config = config.normalized();
        tracing::info!(
            path = %path.display(),
            api = %config.api_base_url,
            page_size = config.page_size,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Clamp numeric settings into their usable ranges.
    pub fn normalized(mut self) -> Self {
        let clamped = self.page_size.clamp(1, Self::MAX_PAGE_SIZE);
        if clamped != self.page_size {
            tracing::warn!(
                requested = self.page_size,
                used = clamped,
                "page_size out of range"
            );
            self.page_size = clamped;
        }
        if self.request_timeout_secs == 0 {
            tracing::warn!("request_timeout_secs = 0 is not allowed, using 30");
            self.request_timeout_secs = 30;
        }
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
