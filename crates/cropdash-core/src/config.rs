use crate::error::{AdvisoryError, Result};
use crate::models::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_MIN_QUERY_CHARS: usize = 3;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Timing and threshold settings for the suggestion search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before a lookup fires
    pub debounce: Duration,
    /// A lookup is issued only when the query is longer than this
    pub min_query_chars: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }
}

/// Layered configuration for the advisory client
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub base_url: ConfigValue<String>,
    pub debounce_ms: ConfigValue<u64>,
    pub min_query_chars: ConfigValue<usize>,
    pub language: ConfigValue<Language>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            base_url: ConfigValue::new(DEFAULT_BASE_URL.to_string(), ConfigSource::Default),
            debounce_ms: ConfigValue::new(DEFAULT_DEBOUNCE_MS, ConfigSource::Default),
            min_query_chars: ConfigValue::new(DEFAULT_MIN_QUERY_CHARS, ConfigSource::Default),
            language: ConfigValue::new(Language::En, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| AdvisoryError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| AdvisoryError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(base_url) = file_config.base_url {
            self.base_url.update(validate_base_url(&base_url)?, ConfigSource::File);
        }

        if let Some(debounce_ms) = file_config.debounce_ms {
            self.debounce_ms.update(debounce_ms, ConfigSource::File);
        }

        if let Some(min_query_chars) = file_config.min_query_chars {
            self.min_query_chars.update(min_query_chars, ConfigSource::File);
        }

        if let Some(language) = file_config.language {
            self.language.update(language.parse()?, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // CROPDASH_BASE_URL
        if let Ok(url) = env::var("CROPDASH_BASE_URL") {
            match validate_base_url(&url) {
                Ok(url) => self.base_url.update(url, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CROPDASH_BASE_URL value '{}': expected an http(s) URL",
                    url
                ),
            }
        }

        // CROPDASH_DEBOUNCE_MS
        if let Ok(ms_str) = env::var("CROPDASH_DEBOUNCE_MS") {
            match ms_str.parse::<u64>() {
                Ok(ms) => self.debounce_ms.update(ms, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CROPDASH_DEBOUNCE_MS value '{}': expected milliseconds",
                    ms_str
                ),
            }
        }

        // CROPDASH_MIN_QUERY_CHARS
        if let Ok(chars_str) = env::var("CROPDASH_MIN_QUERY_CHARS") {
            match chars_str.parse::<usize>() {
                Ok(chars) => self.min_query_chars.update(chars, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CROPDASH_MIN_QUERY_CHARS value '{}': expected a character count",
                    chars_str
                ),
            }
        }

        // CROPDASH_LANGUAGE
        if let Ok(lang_str) = env::var("CROPDASH_LANGUAGE") {
            match lang_str.parse::<Language>() {
                Ok(lang) => self.language.update(lang, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CROPDASH_LANGUAGE value '{}': expected en, hi, mr, es, or fr",
                    lang_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url.update(base_url, ConfigSource::Cli);
        }

        if let Some(debounce_ms) = overrides.debounce_ms {
            self.debounce_ms.update(debounce_ms, ConfigSource::Cli);
        }

        if let Some(min_query_chars) = overrides.min_query_chars {
            self.min_query_chars.update(min_query_chars, ConfigSource::Cli);
        }

        if let Some(language) = overrides.language {
            self.language.update(language, ConfigSource::Cli);
        }
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            debounce: Duration::from_millis(self.debounce_ms.value),
            min_query_chars: self.min_query_chars.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("base_url".to_string(), (self.base_url.value.clone(), self.base_url.source));

        map.insert(
            "debounce_ms".to_string(),
            (format!("{} ms", self.debounce_ms.value), self.debounce_ms.source),
        );

        map.insert(
            "min_query_chars".to_string(),
            (self.min_query_chars.value.to_string(), self.min_query_chars.source),
        );

        map.insert(
            "language".to_string(),
            (
                format!("{} ({})", self.language.value, self.language.value.display_name()),
                self.language.source,
            ),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    base_url: Option<String>,
    debounce_ms: Option<u64>,
    min_query_chars: Option<usize>,
    language: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub base_url: Option<String>,
    pub debounce_ms: Option<u64>,
    pub min_query_chars: Option<usize>,
    pub language: Option<Language>,
}

/// Check that a base URL is an http(s) URL and drop any trailing slash
pub fn validate_base_url(s: &str) -> Result<String> {
    let trimmed = s.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(AdvisoryError::ConfigInvalid {
            key: "base_url".to_string(),
            reason: format!("Invalid base URL: {}. Use an http:// or https:// URL", s),
        });
    }
    Ok(trimmed.to_string())
}
