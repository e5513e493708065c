/*!
 * Per-image results and the batch aggregate handed to the report writer.
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::file_utils::ImageRef;

/// Text recorded when OCR ran cleanly but found nothing on the page
pub const NO_TEXT_FOUND: &str = "No text found in image";

/// Which pipeline variant runs and how its report is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Extracted text per file
    #[default]
    Transcript,
    /// Extracted text plus automated translation per file
    Bilingual,
    /// Extracted text under instructions for translating it by hand
    #[serde(rename = "manual")]
    ManualTranslation,
}

impl OutputMode {
    /// Whether this mode calls the translation collaborator
    pub fn translates(&self) -> bool {
        matches!(self, Self::Bilingual)
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transcript => write!(f, "transcript"),
            Self::Bilingual => write!(f, "bilingual"),
            Self::ManualTranslation => write!(f, "manual"),
        }
    }
}

/// Terminal status of one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    ExtractionFailed,
    TranslationFailed,
}

/// States an image passes through while the batch runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Extracting,
    Extracted,
    Translating,
    Success,
    ExtractionFailed,
    TranslationFailed,
}

impl ItemState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::ExtractionFailed | Self::TranslationFailed)
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Extracting => "extracting text",
            Self::Extracted => "text extracted",
            Self::Translating => "translating",
            Self::Success => "done",
            Self::ExtractionFailed => "extraction failed",
            Self::TranslationFailed => "translation failed",
        };
        write!(f, "{}", label)
    }
}

/// Immutable result of processing one image.
///
/// The constructors are the only way to build one, which keeps the field
/// presence rules tied to the status: extracted text exists unless extraction
/// failed, a translation exists only on success in bilingual mode, and an
/// error detail exists exactly when the status is a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    source: ImageRef,
    status: OutcomeStatus,
    extracted_text: Option<String>,
    translated_text: Option<String>,
    error_detail: Option<String>,
}

impl Outcome {
    pub fn success(source: ImageRef, extracted_text: String, translated_text: Option<String>) -> Self {
        Self {
            source,
            status: OutcomeStatus::Success,
            extracted_text: Some(extracted_text),
            translated_text,
            error_detail: None,
        }
    }

    pub fn extraction_failed(source: ImageRef, error_detail: impl Into<String>) -> Self {
        Self {
            source,
            status: OutcomeStatus::ExtractionFailed,
            extracted_text: None,
            translated_text: None,
            error_detail: Some(error_detail.into()),
        }
    }

    /// Translation failed; the extracted text is kept
    pub fn translation_failed(source: ImageRef, extracted_text: String, error_detail: impl Into<String>) -> Self {
        Self {
            source,
            status: OutcomeStatus::TranslationFailed,
            extracted_text: Some(extracted_text),
            translated_text: None,
            error_detail: Some(error_detail.into()),
        }
    }

    pub fn source(&self) -> &ImageRef {
        &self.source
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn translated_text(&self) -> Option<&str> {
        self.translated_text.as_deref()
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// One end-to-end invocation: ordered outcomes plus run metadata
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub source_dir: PathBuf,
    pub mode: OutputMode,
    pub source_language: String,
    pub target_language: String,
    pub outcomes: Vec<Outcome>,
}

impl BatchRun {
    pub fn new<P: AsRef<Path>>(
        source_dir: P,
        mode: OutputMode,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        outcomes: Vec<Outcome>,
    ) -> Self {
        Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            mode,
            source_language: source_language.into(),
            target_language: target_language.into(),
            outcomes,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// One-line summary used in logs and at the end of every report
    pub fn summary(&self) -> String {
        format!(
            "{} image(s) processed, {} succeeded, {} failed",
            self.outcomes.len(),
            self.succeeded(),
            self.failed()
        )
    }
}
