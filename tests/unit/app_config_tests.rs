/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::fs;
use std::str::FromStr;
use ocrbatch::app_config::{Config, LogLevel, TranslationProvider};
use ocrbatch::outcome::OutputMode;
use crate::common;

/// Test the documented defaults
#[test]
fn test_default_config_shouldMatchDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "hi");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.ocr.endpoint, "https://vision.googleapis.com");
    assert!(config.ocr.credentials_path.is_none());
    assert_eq!(config.translation.provider, TranslationProvider::Google);
    assert_eq!(config.batch.concurrent_requests, 1);
    assert_eq!(config.batch.retry_count, 0);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test that loading a missing config file leaves the directory untouched
#[test]
fn test_load_withMissingFile_shouldReturnNoneWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load(&path)?;

    assert!(config.is_none());
    assert!(!path.exists());
    Ok(())
}

/// Test that saved defaults load back unchanged
#[test]
fn test_save_withDefaults_shouldReloadSameValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    Config::default().save(&path)?;
    let reloaded = Config::load(&path)?.expect("saved config should load");

    assert_eq!(reloaded.source_language, "hi");
    assert_eq!(reloaded.report.transcript_file, "extracted_text.txt");
    assert_eq!(reloaded.translation.provider, TranslationProvider::Google);
    Ok(())
}

/// Test that a partial config file is completed with defaults
#[test]
fn test_load_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        br#"{"source_language": "mr", "batch": {"concurrent_requests": 4}}"#,
    )?;

    let config = Config::load(&path)?.expect("config file exists");

    assert_eq!(config.source_language, "mr");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.batch.concurrent_requests, 4);
    assert_eq!(config.batch.retry_backoff_ms, 1000);
    assert_eq!(config.report.bilingual_file, "translated_text.txt");
    Ok(())
}

/// Test that malformed JSON is reported, not replaced
#[test]
fn test_load_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", b"{ not json")?;

    assert!(Config::load(&path).is_err());
    assert_eq!(fs::read_to_string(&path)?, "{ not json");
    Ok(())
}

/// Test that validation rejects unknown language codes
#[test]
fn test_validate_withInvalidLanguage_shouldFail() {
    let mut config = Config::default();
    config.source_language = "not-a-language".to_string();
    assert!(config.validate().is_err());
}

/// Test that validation rejects a zero worker pool
#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let mut config = Config::default();
    config.batch.concurrent_requests = 0;
    assert!(config.validate().is_err());
}

/// Test that validation rejects an unparsable endpoint
#[test]
fn test_validate_withInvalidEndpoint_shouldFail() {
    let mut config = Config::default();
    config.ocr.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

/// Test provider-specific defaults
#[test]
fn test_translation_config_withOllama_shouldUseOllamaDefaults() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;

    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.get_model(), "llama3.2:3b");
    assert_eq!(config.translation.get_timeout_secs(), 120);
}

/// Test that set_model only touches the active provider
#[test]
fn test_set_model_shouldUpdateActiveProviderOnly() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.set_model("qwen2.5:7b");

    assert_eq!(config.translation.get_model(), "qwen2.5:7b");
    let google = config.translation.get_provider_config(&TranslationProvider::Google).unwrap();
    assert!(google.model.is_empty());
}

/// Test provider name parsing
#[test]
fn test_translation_provider_fromStr_shouldIgnoreCase() {
    assert_eq!(TranslationProvider::from_str("Google").unwrap(), TranslationProvider::Google);
    assert_eq!(TranslationProvider::from_str("OLLAMA").unwrap(), TranslationProvider::Ollama);
    assert!(TranslationProvider::from_str("deepl").is_err());
}

/// Test the provider names used in log output
#[test]
fn test_translation_provider_displayName_shouldBeReadable() {
    assert_eq!(TranslationProvider::Google.display_name(), "Google Translate");
    assert_eq!(TranslationProvider::Ollama.display_name(), "Ollama");
}

/// Test the report file names per mode
#[test]
fn test_report_file_for_shouldMapEveryMode() {
    let config = Config::default();
    assert_eq!(config.report.file_for(OutputMode::Transcript), "extracted_text.txt");
    assert_eq!(config.report.file_for(OutputMode::Bilingual), "translated_text.txt");
    assert_eq!(config.report.file_for(OutputMode::ManualTranslation), "text_for_translation.txt");
}

/// Test that region-tagged language codes are accepted
#[test]
fn test_validate_withRegionTaggedLanguages_shouldSucceed() {
    let mut config = Config::default();
    config.target_language = "zh-CN".to_string();
    assert!(config.validate().is_ok());

    config.source_language = "pt-BR".to_string();
    config.target_language = "zh-TW".to_string();
    assert!(config.validate().is_ok());
}

/// Test that a Vision handwriting hint passes validation
#[test]
fn test_validate_withHandwritingHint_shouldSucceed() {
    let mut config = Config::default();
    config.ocr.language_hints = vec!["hi-t-i0-handwrit".to_string()];
    assert!(config.validate().is_ok());

    config.ocr.language_hints.push("zz-t-i0-handwrit".to_string());
    assert!(config.validate().is_err());
}
