//! Configuration file parser for ~/.config/miolib-rss/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::feed::{
    default_feeds, FeedSource, PipelineOptions, DEFAULT_BODY_THRESHOLD, DEFAULT_EXCERPT_CHARS,
    DEFAULT_MIRROR_HOST, MAX_FEED_SIZE,
};
use crate::util::DEFAULT_NOISE_PHRASES;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin substituted for `rsshub.app` in feed URLs.
    pub mirror_host: String,

    /// Margin by which content must outgrow the description to become the body.
    pub body_threshold: usize,

    /// Excerpt length in characters, ellipsis not included.
    pub excerpt_chars: usize,

    /// Boilerplate phrases stripped from every field.
    pub noise_phrases: Vec<String>,

    /// Transport timeout in seconds. Unset means no timeout.
    pub timeout_secs: Option<u64>,

    /// Largest accepted response body in bytes.
    pub max_feed_bytes: usize,

    /// Number of feeds fetched at once by the CLI.
    pub concurrency: usize,

    /// Subscriptions.
    pub feeds: Vec<FeedSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mirror_host: DEFAULT_MIRROR_HOST.to_string(),
            body_threshold: DEFAULT_BODY_THRESHOLD,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            noise_phrases: DEFAULT_NOISE_PHRASES
                .iter()
                .map(|phrase| phrase.to_string())
                .collect(),
            timeout_secs: None,
            max_feed_bytes: MAX_FEED_SIZE,
            concurrency: 4,
            feeds: default_feeds(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "mirror_host",
        "body_threshold",
        "excerpt_chars",
        "noise_phrases",
        "timeout_secs",
        "max_feed_bytes",
        "concurrency",
        "feeds",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to avoid loading a huge file
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
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(
            feeds = config.feeds.len(),
            mirror = %config.mirror_host,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Subscriptions with the mirror host applied.
    pub fn sources(&self) -> Vec<FeedSource> {
        self.feeds
            .iter()
            .map(|source| source.with_mirror(&self.mirror_host))
            .collect()
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            excerpt_chars: self.excerpt_chars,
            body_threshold: self.body_threshold,
            noise_phrases: self.noise_phrases.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
