/*!
 * # ocrbatch - batch digitization of scanned documents
 *
 * Extracts the text of every scanned image in a directory with an OCR
 * service, optionally translates it, and writes one consolidated report.
 *
 * ## Features
 *
 * - Deterministic, case-insensitive discovery of jpg/jpeg/png/bmp/tiff images
 * - Full-document text detection through Google Cloud Vision
 * - Optional translation through Google Translate or a local Ollama model
 * - Per-image failure isolation: one bad scan never stops the batch
 * - Three report layouts: transcript, bilingual, and ready for manual translation
 * - Bounded concurrency and bounded retries for the external services
 *
 * ## Architecture
 *
 * - `file_utils`: image discovery and atomic file writes
 * - `providers`: OCR and translation clients behind the `TextExtractor` and
 *   `Translator` traits
 * - `batch_runner`: the per-image state machine and ordered outcome collection
 * - `report_writer`: report rendering for each output mode
 * - `app_controller`: pre-flight checks, discovery, batch and report in one run
 * - `app_config`: JSON configuration
 * - `credentials`: OCR credential loading
 * - `language_utils`: ISO language code utilities
 * - `errors`: error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod batch_runner;
pub mod credentials;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod outcome;
pub mod providers;
pub mod report_writer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use batch_runner::{BatchOptions, BatchRunner};
pub use errors::{AppError, ExtractionError, ProviderError, TranslationError};
pub use file_utils::{FileManager, ImageRef};
pub use outcome::{BatchRun, NO_TEXT_FOUND, Outcome, OutcomeStatus, OutputMode};
pub use report_writer::ReportWriter;
