/*!
 * Rendering and persisting batch reports.
 *
 * Three layouts share one rule: every outcome gets its own section headed by
 * its file name, and failed images get a labeled error block instead of
 * being left out. The whole report is rendered in memory and written
 * atomically, so a failed write never leaves a partial file behind.
 */

use std::fmt::Write as _;
use std::path::Path;

use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::outcome::{BatchRun, Outcome, OutcomeStatus, OutputMode};

const TRANSCRIPT_RULE_WIDTH: usize = 50;
const WIDE_RULE_WIDTH: usize = 60;
const SECTION_RULE_WIDTH: usize = 30;
const MANUAL_FILE_RULE_WIDTH: usize = 40;

/// Label prefixed to every per-file error block
pub const ERROR_LABEL: &str = "ERROR";

fn rule(ch: char, width: usize) -> String {
    ch.to_string().repeat(width)
}

fn language_name(code: &str) -> String {
    language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string())
}

fn error_block(outcome: &Outcome) -> String {
    format!(
        "{}: {}",
        ERROR_LABEL,
        outcome.error_detail().unwrap_or("unknown error")
    )
}

/// Renders a `BatchRun` in the layout of its mode
pub struct ReportWriter;

impl ReportWriter {
    /// Render the full report text
    pub fn render(run: &BatchRun) -> String {
        let mut out = String::new();
        match run.mode {
            OutputMode::Transcript => Self::render_transcript(run, &mut out),
            OutputMode::Bilingual => Self::render_bilingual(run, &mut out),
            OutputMode::ManualTranslation => Self::render_manual(run, &mut out),
        }
        let _ = writeln!(out, "\nSUMMARY: {}", run.summary());
        out
    }

    /// Render and atomically replace `path` with the report.
    ///
    /// Returns the rendered text so callers can still show it when needed.
    pub fn write<P: AsRef<Path>>(run: &BatchRun, path: P) -> Result<String, AppError> {
        let rendered = Self::render(run);
        FileManager::write_atomic(path, &rendered)?;
        Ok(rendered)
    }

    fn render_transcript(run: &BatchRun, out: &mut String) {
        let banner = rule('=', TRANSCRIPT_RULE_WIDTH);

        for outcome in &run.outcomes {
            let _ = writeln!(out, "\n{}", banner);
            let _ = writeln!(out, "File: {}", outcome.source().file_name());
            let _ = writeln!(out, "{}", banner);

            match outcome.extracted_text() {
                Some(text) => {
                    let _ = writeln!(out, "{}", text);
                }
                None => {
                    let _ = writeln!(out, "{}", error_block(outcome));
                }
            }
        }
    }

    fn render_bilingual(run: &BatchRun, out: &mut String) {
        let banner = rule('=', WIDE_RULE_WIDTH);
        let section_rule = rule('-', SECTION_RULE_WIDTH);
        let source_name = language_name(&run.source_language);
        let target_name = language_name(&run.target_language);

        for outcome in &run.outcomes {
            let _ = writeln!(out, "\n{}", banner);
            let _ = writeln!(out, "File: {}", outcome.source().file_name());
            let _ = writeln!(out, "{}\n", banner);

            let _ = writeln!(out, "ORIGINAL TEXT ({}):", source_name);
            let _ = writeln!(out, "{}", section_rule);
            match outcome.status() {
                OutcomeStatus::ExtractionFailed => {
                    let _ = writeln!(out, "{}\n", error_block(outcome));
                }
                _ => {
                    let _ = writeln!(out, "{}\n", outcome.extracted_text().unwrap_or_default());
                }
            }

            let _ = writeln!(out, "TRANSLATION ({}):", target_name);
            let _ = writeln!(out, "{}", section_rule);
            match outcome.status() {
                OutcomeStatus::Success => {
                    let _ = writeln!(out, "{}\n", outcome.translated_text().unwrap_or_default());
                }
                OutcomeStatus::TranslationFailed => {
                    let _ = writeln!(out, "{}\n", error_block(outcome));
                }
                OutcomeStatus::ExtractionFailed => {
                    let _ = writeln!(out, "{}: not translated, text extraction failed\n", ERROR_LABEL);
                }
            }
        }
    }

    fn render_manual(run: &BatchRun, out: &mut String) {
        let banner = rule('=', WIDE_RULE_WIDTH);
        let file_rule = rule('-', MANUAL_FILE_RULE_WIDTH);
        let source_name = language_name(&run.source_language);
        let target_name = language_name(&run.target_language);

        let _ = writeln!(out, "EXTRACTED {} TEXT - READY FOR TRANSLATION", source_name.to_uppercase());
        let _ = writeln!(out, "{}\n", banner);
        let _ = writeln!(out, "Instructions:");
        let _ = writeln!(out, "1. Copy the {} text below", source_name);
        let _ = writeln!(out, "2. Paste into Google Translate (translate.google.com)");
        let _ = writeln!(out, "3. Set source: {}, target: {}", source_name, target_name);
        let _ = writeln!(out, "4. Get instant translation\n");
        let _ = writeln!(out, "{}\n", banner);

        for outcome in &run.outcomes {
            let _ = writeln!(out, "FILE: {}", outcome.source().file_name());
            let _ = writeln!(out, "{}", file_rule);
            match outcome.status() {
                OutcomeStatus::ExtractionFailed => {
                    let _ = writeln!(out, "{}", error_block(outcome));
                }
                _ => {
                    let _ = writeln!(out, "{}", outcome.extracted_text().unwrap_or_default());
                }
            }
            let _ = writeln!(out, "\n{}\n", banner);
        }
    }
}
