/*!
 * Batch processing of discovered images.
 *
 * Every image runs through extraction and, in bilingual mode, translation.
 * A failure only ends that image's run: it is recorded on its `Outcome` and
 * the batch moves on. Outcomes come back in discovery order whatever the
 * completion order was.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::app_config::BatchConfig;
use crate::errors::{ExtractionError, TranslationError};
use crate::file_utils::{FileManager, ImageRef};
use crate::outcome::{ItemState, NO_TEXT_FOUND, Outcome};
use crate::providers::{TextExtractor, Translator};

/// Tuning for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Images (and collaborator calls) in flight at once; 1 is sequential
    pub max_concurrent_requests: usize,
    /// Extra attempts for transient collaborator failures
    pub retry_count: u32,
    /// Base backoff, doubled on each retry
    pub retry_backoff_ms: u64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 1,
            retry_count: 0,
            retry_backoff_ms: 1000,
        }
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            max_concurrent_requests: config.concurrent_requests.max(1),
            retry_count: config.retry_count,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }
}

/// A state change of one image, reported as it happens
#[derive(Debug, Clone, Copy)]
pub struct ItemTransition<'a> {
    /// Position in discovery order
    pub index: usize,
    pub total: usize,
    pub image: &'a ImageRef,
    pub state: ItemState,
    /// Error message for failure states
    pub detail: Option<&'a str>,
}

/// Whether text is handed to the translator or passed through unchanged.
///
/// The no-text sentinel and blank text are never sent.
pub fn is_translatable(text: &str) -> bool {
    text != NO_TEXT_FOUND && !text.trim().is_empty()
}

#[derive(Debug)]
struct TranslationStage {
    translator: Arc<dyn Translator>,
    source_language: String,
    target_language: String,
}

/// Drives extraction and translation over a list of images
#[derive(Debug)]
pub struct BatchRunner {
    extractor: Arc<dyn TextExtractor>,
    translation: Option<TranslationStage>,
    options: BatchOptions,
    /// Admission control for outbound collaborator calls
    limiter: Semaphore,
}

impl BatchRunner {
    /// Create an extraction-only runner
    pub fn new(extractor: Arc<dyn TextExtractor>, options: BatchOptions) -> Self {
        let permits = options.max_concurrent_requests.max(1);
        Self {
            extractor,
            translation: None,
            options,
            limiter: Semaphore::new(permits),
        }
    }

    /// Translate every extracted text from `source_language` to `target_language`
    pub fn with_translation(
        mut self,
        translator: Arc<dyn Translator>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        self.translation = Some(TranslationStage {
            translator,
            source_language: source_language.into(),
            target_language: target_language.into(),
        });
        self
    }

    pub fn translates(&self) -> bool {
        self.translation.is_some()
    }

    /// Process `images` and return one outcome per image, in input order.
    ///
    /// `progress` sees every state transition before the image moves on.
    pub async fn run<F>(&self, images: &[ImageRef], progress: F) -> Vec<Outcome>
    where
        F: Fn(&ItemTransition<'_>) + Send + Sync,
    {
        let total = images.len();
        let progress = &progress;

        for (index, image) in images.iter().enumerate() {
            Self::notify(progress, ItemTransition { index, total, image, state: ItemState::Pending, detail: None });
        }

        let mut results = stream::iter(images.iter().enumerate())
            .map(move |(index, image)| async move {
                (index, self.process(index, total, image, progress).await)
            })
            .buffer_unordered(self.options.max_concurrent_requests.max(1))
            .collect::<Vec<_>>()
            .await;

        // Restore discovery order
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, outcome)| outcome).collect()
    }

    async fn process<F>(&self, index: usize, total: usize, image: &ImageRef, progress: &F) -> Outcome
    where
        F: Fn(&ItemTransition<'_>) + Send + Sync,
    {
        let report = |state: ItemState, detail: Option<&str>| {
            Self::notify(progress, ItemTransition { index, total, image, state, detail });
        };

        report(ItemState::Extracting, None);
        let text = match self.extract(image).await {
            Ok(text) => text,
            Err(e) => {
                let detail = e.to_string();
                report(ItemState::ExtractionFailed, Some(detail.as_str()));
                return Outcome::extraction_failed(image.clone(), detail);
            }
        };
        report(ItemState::Extracted, None);

        let Some(stage) = &self.translation else {
            report(ItemState::Success, None);
            return Outcome::success(image.clone(), text, None);
        };

        if !is_translatable(&text) {
            debug!("{}: nothing to translate, passing text through", image.file_name());
            report(ItemState::Success, None);
            return Outcome::success(image.clone(), text.clone(), Some(text));
        }

        report(ItemState::Translating, None);
        match self.translate(stage, image, &text).await {
            Ok(translated) => {
                report(ItemState::Success, None);
                Outcome::success(image.clone(), text, Some(translated))
            }
            Err(e) => {
                let detail = e.to_string();
                report(ItemState::TranslationFailed, Some(detail.as_str()));
                Outcome::translation_failed(image.clone(), text, detail)
            }
        }
    }

    async fn extract(&self, image: &ImageRef) -> Result<String, ExtractionError> {
        let bytes = FileManager::read_bytes(image.path()).await
            .map_err(|e| ExtractionError::Read {
                path: image.path().display().to_string(),
                message: e.to_string(),
            })?;

        let extractor: &dyn TextExtractor = self.extractor.as_ref();
        let bytes: &[u8] = &bytes;
        self.with_retry(image.file_name(), ExtractionError::is_transient, move || extractor.extract(bytes))
            .await
    }

    async fn translate(
        &self,
        stage: &TranslationStage,
        image: &ImageRef,
        text: &str,
    ) -> Result<String, TranslationError> {
        let translator: &dyn Translator = stage.translator.as_ref();
        let source = stage.source_language.as_str();
        let target = stage.target_language.as_str();
        self.with_retry(image.file_name(), TranslationError::is_transient, move || {
            translator.translate(text, source, target)
        })
        .await
    }

    /// Run `operation` under the call limiter, retrying transient failures
    /// at most `retry_count` times with exponential backoff
    async fn with_retry<T, E, Fut, Op>(
        &self,
        label: &str,
        is_transient: fn(&E) -> bool,
        mut operation: Op,
    ) -> Result<T, E>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            let result = {
                let _permit = self.limiter.acquire().await.ok();
                operation().await
            };

            match result {
                Err(e) if attempt < self.options.retry_count && is_transient(&e) => {
                    let delay_ms = self.options.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16));
                    warn!(
                        "{}: attempt {}/{} failed: {}. Retrying in {}ms",
                        label,
                        attempt + 1,
                        self.options.retry_count + 1,
                        e,
                        delay_ms
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn notify<F>(progress: &F, transition: ItemTransition<'_>)
    where
        F: Fn(&ItemTransition<'_>) + Send + Sync,
    {
        let position = format!("[{}/{}]", transition.index + 1, transition.total);
        match (transition.state, transition.detail) {
            (ItemState::Pending, _) => debug!("{} {}: queued", position, transition.image.file_name()),
            (ItemState::ExtractionFailed | ItemState::TranslationFailed, Some(detail)) => warn!(
                "{} {}: {}: {}",
                position,
                transition.image.file_name(),
                transition.state,
                detail
            ),
            (state, _) => info!("{} {}: {}", position, transition.image.file_name(), state),
        }
        progress(&transition);
    }
}
