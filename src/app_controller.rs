use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, TranslationProvider};
use crate::batch_runner::{BatchOptions, BatchRunner, ItemTransition};
use crate::credentials::Credential;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::outcome::{BatchRun, ItemState, OutputMode};
use crate::providers::google_translate::GoogleTranslate;
use crate::providers::google_vision::GoogleVision;
use crate::providers::ollama::Ollama;
use crate::providers::{TextExtractor, Translator};
use crate::report_writer::ReportWriter;

// @module: Application controller for batch digitization

/// Main application controller: pre-flight, discovery, batch, report
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: OCR collaborator
    extractor: Arc<dyn TextExtractor>,
    // @field: Translation collaborator, needed in bilingual mode only
    translator: Option<Arc<dyn Translator>>,
}

impl Controller {
    /// Build the controller and its service clients from configuration.
    ///
    /// The OCR credential is loaded here, so a missing or unusable key file
    /// fails before anything else happens.
    pub fn from_config(config: Config, mode: OutputMode) -> Result<Self, AppError> {
        let credential = Credential::load(config.ocr.credentials_path.as_deref())?;
        let extractor: Arc<dyn TextExtractor> = Arc::new(
            GoogleVision::new(&config.ocr.endpoint, credential, config.ocr.timeout_secs)
                .with_language_hints(config.ocr.language_hints.clone()),
        );

        let translator = if mode.translates() {
            Some(Self::build_translator(&config))
        } else {
            None
        };

        Ok(Self::with_clients(config, extractor, translator))
    }

    // @method: Create a controller around existing clients
    pub fn with_clients(
        config: Config,
        extractor: Arc<dyn TextExtractor>,
        translator: Option<Arc<dyn Translator>>,
    ) -> Self {
        Self {
            config,
            extractor,
            translator,
        }
    }

    fn build_translator(config: &Config) -> Arc<dyn Translator> {
        let translation = &config.translation;
        info!("Translation provider: {}", translation.provider.display_name());
        match translation.provider {
            TranslationProvider::Google => Arc::new(GoogleTranslate::new(
                translation.get_endpoint(),
                translation.get_timeout_secs(),
            )),
            TranslationProvider::Ollama => Arc::new(Ollama::new(
                translation.get_endpoint(),
                translation.get_model(),
                translation.common.system_prompt.clone(),
                translation.common.temperature,
                translation.get_timeout_secs(),
            )),
        }
    }

    /// Verify access to every collaborator the mode needs
    pub async fn preflight(&self, mode: OutputMode) -> Result<(), AppError> {
        self.extractor.preflight().await.map_err(|e| {
            AppError::Credential(format!("{} pre-flight failed: {}", self.extractor.name(), e))
        })?;

        if mode.translates() {
            let translator = self.translator.as_ref().ok_or_else(|| {
                AppError::Config("bilingual mode needs a translation provider".to_string())
            })?;
            translator.preflight().await.map_err(|e| {
                AppError::Credential(format!("{} pre-flight failed: {}", translator.name(), e))
            })?;
        }

        Ok(())
    }

    /// Run a whole batch over `input_dir` and write the report to `output_path`.
    ///
    /// Only pre-flight, discovery and the final write can fail the run;
    /// per-image failures end up in the returned `BatchRun` and the report.
    pub async fn run(&self, input_dir: &Path, mode: OutputMode, output_path: &Path) -> Result<BatchRun, AppError> {
        self.preflight(mode).await?;
        self.process(input_dir, mode, output_path).await
    }

    /// Discovery, the batch and the report write, for callers that ran
    /// `preflight` themselves
    pub async fn process(&self, input_dir: &Path, mode: OutputMode, output_path: &Path) -> Result<BatchRun, AppError> {
        let start_time = Instant::now();

        let images = FileManager::discover_images(input_dir)?;
        if images.is_empty() {
            warn!("No images found in {}", input_dir.display());
        } else {
            info!("Found {} image(s) in {}", images.len(), input_dir.display());
        }

        let mut runner = BatchRunner::new(Arc::clone(&self.extractor), BatchOptions::from(&self.config.batch));
        if mode.translates() {
            if let Some(translator) = &self.translator {
                runner = runner.with_translation(
                    Arc::clone(translator),
                    &self.config.source_language,
                    &self.config.target_language,
                );
            }
        }

        let progress_bar = Self::progress_bar(images.len() as u64);
        let pb = progress_bar.clone();
        let outcomes = runner.run(&images, move |transition: &ItemTransition<'_>| {
            match transition.state {
                ItemState::Extracting => pb.set_message(transition.image.file_name().to_string()),
                state if state.is_terminal() => pb.inc(1),
                _ => {}
            }
        }).await;
        progress_bar.finish_and_clear();

        let run = BatchRun::new(
            input_dir,
            mode,
            &self.config.source_language,
            &self.config.target_language,
            outcomes,
        );

        if let Err(e) = ReportWriter::write(&run, output_path) {
            error!("Failed to write report to {}: {}", output_path.display(), e);
            for outcome in &run.outcomes {
                error!(
                    "  {}: {:?}{}",
                    outcome.source().file_name(),
                    outcome.status(),
                    outcome.error_detail().map(|d| format!(" ({})", d)).unwrap_or_default()
                );
            }
            debug!("Unsaved report:\n{}", ReportWriter::render(&run));
            return Err(e);
        }

        info!(
            "Batch complete in {}: {}",
            Self::format_duration(start_time.elapsed()),
            run.summary()
        );
        info!("Report written to {}", output_path.display());

        Ok(run)
    }

    fn progress_bar(len: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=>-"));
        progress_bar
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
