use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// SQLite database file, defaults to the user's data directory
    #[serde(default)]
    pub database_path: Option<String>,

    /// Tokenizer selection
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    /// Remote dictionary and lookup pacing
    #[serde(default)]
    pub dictionary: DictionaryConfig,

    /// Frequency aggregation limits
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Progress entry lifetimes
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Quiz defaults
    #[serde(default)]
    pub quiz: QuizConfig,

    /// Upload acceptance rules
    #[serde(default)]
    pub upload: UploadConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Tokenizer strategy
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerStrategy {
    // @strategy: Probe the morphological analyzer, fall back to the simple one
    #[default]
    Auto,
    // @strategy: Dictionary-backed analyzer only
    Morphological,
    // @strategy: Regex script-run extraction
    Simple,
}

impl TokenizerStrategy {
    // @returns: Lowercase strategy identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Auto => "auto".to_string(),
            Self::Morphological => "morphological".to_string(),
            Self::Simple => "simple".to_string(),
        }
    }
}

impl std::fmt::Display for TokenizerStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TokenizerStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "morphological" => Ok(Self::Morphological),
            "simple" => Ok(Self::Simple),
            _ => Err(anyhow!("Invalid tokenizer strategy: {}", s)),
        }
    }
}

/// Tokenizer configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TokenizerConfig {
    // @field: Strategy used at startup
    #[serde(default)]
    pub strategy: TokenizerStrategy,

    // @field: Compiled system dictionary for the morphological analyzer
    #[serde(default)]
    pub dictionary_path: Option<String>,
}

/// Remote dictionary configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DictionaryConfig {
    /// Search endpoint, queried with `?keyword=<word>`
    #[serde(default = "default_dictionary_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay in milliseconds between consecutive lookups
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Token bucket capacity. When unset a fixed delay is used instead.
    #[serde(default)]
    pub burst_capacity: Option<u32>,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_dictionary_endpoint(),
            timeout_secs: default_timeout_secs(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            burst_capacity: None,
            user_agent: default_user_agent(),
        }
    }
}

impl DictionaryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }
}

/// Vocabulary extraction configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Minimum number of occurrences for a word to be kept
    #[serde(default = "default_min_frequency")]
    pub min_frequency: u32,

    /// Number of top-ranked words sent to the dictionary
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Context sentences kept per word
    #[serde(default = "default_max_contexts")]
    pub max_contexts: usize,

    /// Word total reported before the real candidate count is known
    #[serde(default = "default_max_words")]
    pub estimated_words: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_frequency: default_min_frequency(),
            max_words: default_max_words(),
            max_contexts: default_max_contexts(),
            estimated_words: default_max_words(),
        }
    }
}

/// Progress tracker configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProgressConfig {
    /// Seconds a completed job stays visible
    #[serde(default = "default_complete_ttl_secs")]
    pub complete_ttl_secs: u64,

    /// Seconds a failed job stays visible
    #[serde(default = "default_error_ttl_secs")]
    pub error_ttl_secs: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            complete_ttl_secs: default_complete_ttl_secs(),
            error_ttl_secs: default_error_ttl_secs(),
        }
    }
}

/// Quiz configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuizConfig {
    /// Answer options per question, correct answer included
    #[serde(default = "default_options_per_question")]
    pub options_per_question: usize,

    /// Number of questions when the request does not say
    #[serde(default = "default_question_count")]
    pub default_question_count: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            options_per_question: default_options_per_question(),
            default_question_count: default_question_count(),
        }
    }
}

/// Upload configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadConfig {
    /// Largest accepted subtitle file in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_dictionary_endpoint() -> String {
    "https://jisho.org/api/v1/search/words".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_rate_limit_delay_ms() -> u64 {
    200
}

fn default_user_agent() -> String {
    format!("subvocab/{}", env!("CARGO_PKG_VERSION"))
}

fn default_min_frequency() -> u32 {
    2
}

fn default_max_words() -> usize {
    100
}

fn default_max_contexts() -> usize {
    5
}

fn default_complete_ttl_secs() -> u64 {
    30
}

fn default_error_ttl_secs() -> u64 {
    60
}

fn default_options_per_question() -> usize {
    4
}

fn default_question_count() -> usize {
    10
}

fn default_max_file_size() -> usize {
    5 * 1024 * 1024
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.dictionary.endpoint.trim().is_empty() {
            return Err(anyhow!("Dictionary endpoint must not be empty"));
        }

        url::Url::parse(&self.dictionary.endpoint)
            .with_context(|| format!("Invalid dictionary endpoint: {}", self.dictionary.endpoint))?;

        if self.dictionary.timeout_secs == 0 {
            return Err(anyhow!("Dictionary timeout must be greater than zero"));
        }

        if self.dictionary.burst_capacity == Some(0) {
            return Err(anyhow!("Burst capacity must be greater than zero when set"));
        }

        if self.extraction.max_words == 0 {
            return Err(anyhow!("max_words must be greater than zero"));
        }

        if self.extraction.max_contexts == 0 {
            return Err(anyhow!("max_contexts must be greater than zero"));
        }

        if self.quiz.options_per_question < 2 {
            return Err(anyhow!(
                "options_per_question must be at least 2, got {}",
                self.quiz.options_per_question
            ));
        }

        if self.tokenizer.strategy == TokenizerStrategy::Morphological
            && self.tokenizer.dictionary_path.is_none()
        {
            return Err(anyhow!(
                "The morphological tokenizer requires tokenizer.dictionary_path"
            ));
        }

        Ok(())
    }

    /// Load the configuration at `path`, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: None,
            tokenizer: TokenizerConfig::default(),
            dictionary: DictionaryConfig::default(),
            extraction: ExtractionConfig::default(),
            progress: ProgressConfig::default(),
            quiz: QuizConfig::default(),
            upload: UploadConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
