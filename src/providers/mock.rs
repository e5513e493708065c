/*!
 * Mock collaborators for testing.
 *
 * - `MockExtractor::echo()` returns the image bytes as UTF-8 text, the
 *   sentinel for an empty image, and fails for bytes starting with `FAIL:`
 * - `MockExtractor::failing()` always fails
 * - `MockExtractor::flaky(n)` fails the first `n` calls with a connection error
 * - `with_delay(ms)` holds every call open so overlapping calls can be counted
 * - `MockTranslator::working()` tags text with the target language, or uses a
 *   dictionary when one is supplied
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::{ExtractionError, ProviderError, TranslationError};
use crate::outcome::NO_TEXT_FOUND;
use crate::providers::{TextExtractor, Translator};

/// Prefix marking image bytes the echo extractor rejects
pub const FAIL_MARKER: &str = "FAIL:";

/// Behavior mode for the mock extractor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echo the bytes back as text
    Echo,
    /// Fail the first N calls with a transient error, then echo
    Flaky { failures: usize },
    /// Always fail with a service error
    Failing,
}

/// Scripted OCR collaborator
#[derive(Debug, Clone)]
pub struct MockExtractor {
    behavior: MockBehavior,
    preflight_error: Option<String>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl MockExtractor {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            preflight_error: None,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn flaky(failures: usize) -> Self {
        Self::new(MockBehavior::Flaky { failures })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Make the credential pre-flight fail with `message`
    pub fn with_preflight_error(mut self, message: impl Into<String>) -> Self {
        self.preflight_error = Some(message.into());
        self
    }

    /// Keep each `extract` call open for `millis`
    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Some(Duration::from_millis(millis));
        self
    }

    /// Number of `extract` calls so far (shared between clones)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most `extract` calls ever open at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn respond(&self, count: usize, image: &[u8]) -> Result<String, ExtractionError> {
        match self.behavior {
            MockBehavior::Echo => Self::echo_bytes(image),
            MockBehavior::Flaky { failures } if count < failures => {
                Err(ProviderError::ConnectionError(format!("simulated drop #{}", count + 1)).into())
            }
            MockBehavior::Flaky { .. } => Self::echo_bytes(image),
            MockBehavior::Failing => {
                Err(ProviderError::ServiceError("Simulated OCR failure".to_string()).into())
            }
        }
    }

    fn echo_bytes(image: &[u8]) -> Result<String, ExtractionError> {
        let text = String::from_utf8_lossy(image).to_string();

        if let Some(message) = text.strip_prefix(FAIL_MARKER) {
            return Err(ProviderError::ServiceError(message.trim().to_string()).into());
        }
        if text.is_empty() {
            return Ok(NO_TEXT_FOUND.to_string());
        }
        Ok(text)
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    fn name(&self) -> &str {
        "Mock OCR"
    }

    async fn preflight(&self) -> Result<(), ProviderError> {
        match &self.preflight_error {
            Some(message) => Err(ProviderError::AuthenticationError(message.clone())),
            None => Ok(()),
        }
    }

    async fn extract(&self, image: &[u8]) -> Result<String, ExtractionError> {
        let count = self.calls.fetch_add(1, Ordering::SeqCst);
        let open = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(open, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = self.respond(count, image);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Scripted translation collaborator
#[derive(Debug, Clone)]
pub struct MockTranslator {
    dictionary: HashMap<String, String>,
    failing: bool,
    preflight_error: Option<String>,
    /// Every text sent to `translate`, in call order
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockTranslator {
    pub fn working() -> Self {
        Self {
            dictionary: HashMap::new(),
            failing: false,
            preflight_error: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::working()
        }
    }

    /// Translate known phrases with fixed answers
    pub fn with_dictionary(pairs: &[(&str, &str)]) -> Self {
        Self {
            dictionary: pairs.iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            ..Self::working()
        }
    }

    /// Make the pre-flight fail with `message`
    pub fn with_preflight_error(mut self, message: impl Into<String>) -> Self {
        self.preflight_error = Some(message.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn name(&self) -> &str {
        "Mock Translate"
    }

    async fn preflight(&self) -> Result<(), ProviderError> {
        match &self.preflight_error {
            Some(message) => Err(ProviderError::ConnectionError(message.clone())),
            None => Ok(()),
        }
    }

    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        self.requests.lock().push(text.to_string());

        if self.failing {
            return Err(ProviderError::RateLimitExceeded("Simulated translation quota".to_string()).into());
        }

        Ok(self.dictionary.get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{}] {}", target_language, text)))
    }
}
