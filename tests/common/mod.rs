/*!
 * Common test utilities for the ocrbatch test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use ocrbatch::app_config::Config;
use ocrbatch::providers::mock::{MockExtractor, MockTranslator};
use ocrbatch::Controller;

/// Route log output through the test harness; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a fake scan whose bytes the echo extractor reads back as `text`
pub fn create_image(dir: &Path, filename: &str, text: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, text.as_bytes())
}

/// Config tuned for fast tests: no retry backoff worth waiting for
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.batch.retry_backoff_ms = 1;
    config
}

/// Controller wired to mock collaborators
pub fn mock_controller(
    config: Config,
    extractor: MockExtractor,
    translator: Option<MockTranslator>,
) -> Controller {
    Controller::with_clients(
        config,
        Arc::new(extractor),
        translator.map(|t| Arc::new(t) as Arc<dyn ocrbatch::providers::Translator>),
    )
}
