//! Configuration management for mapleads
//!
//! All configuration is loaded from `./config/mapleads.toml`.
//! No hardcoded defaults exist in source code - all defaults are in the config template.

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use regex::Regex;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/mapleads.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/mapleads.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid regex pattern '{pattern_name}': {error}\n  Pattern: {pattern}")]
    InvalidRegex {
        pattern_name: String,
        pattern: String,
        error: String,
    },

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub browser: BrowserConfig,
    pub search: SearchConfig,
    pub filters: FiltersConfig,
    pub extraction: ExtractionConfig,
    pub matching: MatchingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub output: OutputConfig,
}

/// HTTP client configuration for website fetches
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub nav_timeout_secs: u64,
    pub max_concurrent: usize,
}

/// Search-page navigation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub base_url: String,
    pub initial_wait_ms: u64,
    pub settle_wait_ms: u64,
    pub variation_wait_ms: u64,
    pub scroll_wait_ms: u64,
    pub max_scroll_rounds: u32,
    pub scroll_stable_rounds: u32,
    pub max_variations: usize,
}

/// Business-name validity filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    pub min_name_chars: usize,
    pub max_name_chars: usize,
    pub street_prefixes: Vec<String>,
    pub ui_phrases: Vec<String>,
    pub regex: FilterPatterns,
}

/// Rejection patterns applied to name candidates
#[derive(Debug, Clone, Deserialize)]
pub struct FilterPatterns {
    /// Bare numeric rating ("4,5")
    pub bare_rating: String,
    /// Rating glued to a review count ("5,0(12)"), matched anywhere
    pub rating_with_count: String,
    /// Review count suffix ("12 avis")
    pub review_count: String,
    /// Open/closed status word
    pub open_closed: String,
    /// Digits and separators only
    pub phone_like: String,
    /// Day-of-week name or abbreviation at the start
    pub day_of_week: String,
    /// Opening-hours fragment ("9h30")
    pub opening_hours: String,
    /// Wrapped in quotation marks
    pub quoted: String,
    /// Required Latin/Arabic letter
    pub has_letter: String,
}

/// Signal extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub phone_patterns: Vec<String>,
    pub min_phone_digits: usize,
    pub max_phone_digits: usize,
    pub embedded_name_patterns: Vec<String>,
    pub email_pattern: String,
    pub email_blacklist: Vec<String>,
    pub min_email_chars: usize,
    pub max_email_chars: usize,
    pub regional_url_pattern: String,
    pub generic_url_pattern: String,
    pub max_url_chars: usize,
    pub min_generic_url_chars: usize,
    pub host_denylist: Vec<String>,
    pub tracking_params: Vec<String>,
    pub business_keywords: Vec<String>,
    pub on_page_email_fallback: bool,
    pub max_on_page_emails: usize,
}

/// Proximity and website-matching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    pub proximity_threshold: usize,
    pub score_threshold: u32,
    pub min_token_chars: usize,
    pub min_site_host_chars: usize,
    pub common_words: Vec<String>,
}

/// Email cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_dir() -> String {
    "cache".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            dir: default_cache_dir(),
        }
    }
}

/// Output defaults
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub default_format: String,
    pub default_stem: String,
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the embedded default configuration
    pub fn load_embedded() -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate HTTP config
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.request_timeout_secs".to_string(),
            });
        }
        if self.http.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.batch_size".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        // Validate browser config
        if self.browser.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                field: "browser.max_concurrent".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        // Validate search config
        if !self.search.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl {
                field: "search.base_url".to_string(),
                url: self.search.base_url.clone(),
            });
        }
        if self.search.max_scroll_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_scroll_rounds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        // Validate filter config
        if self.filters.min_name_chars > self.filters.max_name_chars {
            return Err(ConfigError::InvalidValue {
                field: "filters.min_name_chars".to_string(),
                reason: "cannot exceed filters.max_name_chars".to_string(),
            });
        }
        if self.filters.ui_phrases.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "filters.ui_phrases".to_string(),
            });
        }
        self.validate_regex("filters.regex.bare_rating", &self.filters.regex.bare_rating)?;
        self.validate_regex("filters.regex.rating_with_count", &self.filters.regex.rating_with_count)?;
        self.validate_regex("filters.regex.review_count", &self.filters.regex.review_count)?;
        self.validate_regex("filters.regex.open_closed", &self.filters.regex.open_closed)?;
        self.validate_regex("filters.regex.phone_like", &self.filters.regex.phone_like)?;
        self.validate_regex("filters.regex.day_of_week", &self.filters.regex.day_of_week)?;
        self.validate_regex("filters.regex.opening_hours", &self.filters.regex.opening_hours)?;
        self.validate_regex("filters.regex.quoted", &self.filters.regex.quoted)?;
        self.validate_regex("filters.regex.has_letter", &self.filters.regex.has_letter)?;

        // Validate extraction config
        if self.extraction.phone_patterns.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "extraction.phone_patterns".to_string(),
            });
        }
        for (i, pattern) in self.extraction.phone_patterns.iter().enumerate() {
            self.validate_regex(&format!("extraction.phone_patterns[{}]", i), pattern)?;
        }
        if self.extraction.min_phone_digits > self.extraction.max_phone_digits {
            return Err(ConfigError::InvalidValue {
                field: "extraction.min_phone_digits".to_string(),
                reason: "cannot exceed extraction.max_phone_digits".to_string(),
            });
        }
        for (i, pattern) in self.extraction.embedded_name_patterns.iter().enumerate() {
            self.validate_regex(&format!("extraction.embedded_name_patterns[{}]", i), pattern)?;
        }
        // The email pattern uses a lookahead, so it compiles under fancy-regex
        self.validate_fancy_regex("extraction.email_pattern", &self.extraction.email_pattern)?;
        self.validate_regex("extraction.regional_url_pattern", &self.extraction.regional_url_pattern)?;
        self.validate_regex("extraction.generic_url_pattern", &self.extraction.generic_url_pattern)?;

        // Validate matching config
        if self.matching.proximity_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "matching.proximity_threshold".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.matching.min_token_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "matching.min_token_chars".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        // Validate output config
        if !["csv", "json", "markdown", "html"].contains(&self.output.default_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "output.default_format".to_string(),
                reason: "must be 'csv', 'json', 'markdown', or 'html'".to_string(),
            });
        }

        Ok(())
    }

    fn validate_regex(&self, name: &str, pattern: &str) -> Result<(), ConfigError> {
        Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
            pattern_name: name.to_string(),
            pattern: pattern.to_string(),
            error: e.to_string(),
        })?;
        Ok(())
    }

    fn validate_fancy_regex(&self, name: &str, pattern: &str) -> Result<(), ConfigError> {
        fancy_regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
            pattern_name: name.to_string(),
            pattern: pattern.to_string(),
            error: e.to_string(),
        })?;
        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write default config
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        atty::is(atty::Stream::Stdin)
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config() -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("Configuration file not found. Create default config? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config()?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}
