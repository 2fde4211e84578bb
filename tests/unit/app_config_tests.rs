/*!
 * Tests for application configuration functionality
 */

use std::time::Duration;

use subvocab::app_config::{Config, LogLevel, TokenizerStrategy};
use subvocab::dictionary::RateLimit;

use crate::common;

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.database_path, None);
    assert_eq!(config.tokenizer.strategy, TokenizerStrategy::Auto);
    assert_eq!(config.dictionary.endpoint, "https://jisho.org/api/v1/search/words");
    assert_eq!(config.dictionary.timeout(), Duration::from_secs(10));
    assert_eq!(config.dictionary.rate_limit_delay(), Duration::from_millis(200));
    assert_eq!(config.extraction.min_frequency, 2);
    assert_eq!(config.extraction.max_words, 100);
    assert_eq!(config.extraction.max_contexts, 5);
    assert_eq!(config.extraction.estimated_words, 100);
    assert_eq!(config.progress.complete_ttl_secs, 30);
    assert_eq!(config.progress.error_ttl_secs, 60);
    assert_eq!(config.quiz.options_per_question, 4);
    assert_eq!(config.quiz.default_question_count, 10);
    assert_eq!(config.upload.max_file_size, 5 * 1024 * 1024);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_configValidation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.dictionary.endpoint = " ".to_string();
    assert!(config.validate().is_err());
    config.dictionary.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    config = Config::default();
    config.dictionary.timeout_secs = 0;
    assert!(config.validate().is_err());

    config = Config::default();
    config.extraction.max_words = 0;
    assert!(config.validate().is_err());

    config = Config::default();
    config.quiz.options_per_question = 1;
    assert!(config.validate().is_err());

    config = Config::default();
    config.dictionary.burst_capacity = Some(0);
    assert!(config.validate().is_err());

    config = Config::default();
    config.tokenizer.strategy = TokenizerStrategy::Morphological;
    assert!(config.validate().is_err());
    config.tokenizer.dictionary_path = Some("/opt/dict/system.dic".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "tokenizer": { "strategy": "simple" },
        "dictionary": { "rate_limit_delay_ms": 50, "burst_capacity": 5 },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.tokenizer.strategy, TokenizerStrategy::Simple);
    assert_eq!(config.dictionary.timeout_secs, 10);
    assert_eq!(config.extraction.max_words, 100);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(
        RateLimit::from_config(&config.dictionary),
        RateLimit::Bucket {
            capacity: 5,
            refill_interval: Duration::from_millis(50)
        }
    );
}

#[test]
fn test_rateLimit_withoutBurst_shouldUseFixedDelay() {
    let config = Config::default();
    assert_eq!(
        RateLimit::from_config(&config.dictionary),
        RateLimit::Fixed(Duration::from_millis(200))
    );
}

#[test]
fn test_tokenizerStrategy_parseAndDisplay_shouldRoundTrip() {
    for name in ["auto", "morphological", "simple"] {
        let strategy: TokenizerStrategy = name.parse().unwrap();
        assert_eq!(strategy.to_string(), name);
    }
    assert!("mecab".parse::<TokenizerStrategy>().is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(created.quiz.options_per_question, 4);

    let loaded = Config::load_or_create(&path).unwrap();
    assert_eq!(loaded.dictionary.endpoint, created.dictionary.endpoint);
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}
