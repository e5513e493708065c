/*!
 * Clients for the external collaborators.
 *
 * - `google_vision`: document text detection (OCR)
 * - `google_translate`: Google Translate web endpoint
 * - `ollama`: local LLM translation
 * - `mock`: scripted collaborators for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::{ExtractionError, ProviderError, TranslationError};

/// OCR collaborator: image bytes in, recognized text out.
///
/// Implementations return the `NO_TEXT_FOUND` sentinel rather than an empty
/// string when the image holds no text. They keep no per-call state, so one
/// instance serves a whole batch.
#[async_trait]
pub trait TextExtractor: Send + Sync + Debug {
    /// Human-readable service name for logs
    fn name(&self) -> &str;

    /// Check access before any image is processed
    async fn preflight(&self) -> Result<(), ProviderError>;

    /// Run full-document text detection on raw image bytes
    async fn extract(&self, image: &[u8]) -> Result<String, ExtractionError>;
}

/// Translation collaborator: text plus language pair in, translation out
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Human-readable service name for logs
    fn name(&self) -> &str;

    /// Check the service is reachable before any image is processed
    async fn preflight(&self) -> Result<(), ProviderError>;

    /// Translate `text` from `source_language` to `target_language`
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError>;
}

pub mod google_vision;
pub mod google_translate;
pub mod ollama;
pub mod mock;
