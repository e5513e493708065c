/*!
 * Tests for report rendering and writing
 */

use anyhow::Result;
use std::fs;
use ocrbatch::errors::AppError;
use ocrbatch::file_utils::ImageRef;
use ocrbatch::outcome::{BatchRun, NO_TEXT_FOUND, Outcome, OutputMode};
use ocrbatch::report_writer::ReportWriter;
use crate::common;

fn image(name: &str) -> ImageRef {
    ImageRef::from_path(format!("/scans/{}", name)).unwrap()
}

fn mixed_outcomes(translated: bool) -> Vec<Outcome> {
    vec![
        Outcome::success(
            image("a.jpg"),
            "नमस्ते".to_string(),
            translated.then(|| "Hello".to_string()),
        ),
        Outcome::extraction_failed(image("b.png"), "OCR service error: Bad image data."),
        Outcome::success(
            image("c.tiff"),
            NO_TEXT_FOUND.to_string(),
            translated.then(|| NO_TEXT_FOUND.to_string()),
        ),
    ]
}

/// Test that every outcome gets exactly one section in transcript mode
#[test]
fn test_render_transcript_withMixedOutcomes_shouldListEveryFile() {
    let run = BatchRun::new("/scans", OutputMode::Transcript, "hi", "en", mixed_outcomes(false));

    let report = ReportWriter::render(&run);

    assert_eq!(report.matches("File: ").count(), 3);
    assert!(report.contains("नमस्ते"));
    assert!(report.contains("ERROR: OCR service error: Bad image data."));
    assert!(report.contains(NO_TEXT_FOUND));
    assert!(report.contains("SUMMARY: 3 image(s) processed, 2 succeeded, 1 failed"));
}

/// Test that sections follow the outcome order
#[test]
fn test_render_transcript_shouldKeepOutcomeOrder() {
    let run = BatchRun::new("/scans", OutputMode::Transcript, "hi", "en", mixed_outcomes(false));

    let report = ReportWriter::render(&run);

    let a = report.find("File: a.jpg").unwrap();
    let b = report.find("File: b.png").unwrap();
    let c = report.find("File: c.tiff").unwrap();
    assert!(a < b && b < c);
}

/// Test the bilingual layout for a translated page
#[test]
fn test_render_bilingual_withTranslation_shouldShowBothSections() {
    let run = BatchRun::new("/scans", OutputMode::Bilingual, "hi", "en", mixed_outcomes(true));

    let report = ReportWriter::render(&run);

    let section = format!(
        "File: a.jpg\n{}\n\nORIGINAL TEXT (Hindi):\n{}\nनमस्ते\n\nTRANSLATION (English):\n{}\nHello\n",
        "=".repeat(60),
        "-".repeat(30),
        "-".repeat(30)
    );
    assert!(report.contains(&section), "unexpected bilingual layout:\n{}", report);
    assert_eq!(report.matches("File: ").count(), 3);
}

/// Test that a translation failure keeps the original text in the report
#[test]
fn test_render_bilingual_withTranslationFailure_shouldKeepOriginal() {
    let outcomes = vec![Outcome::translation_failed(
        image("a.jpg"),
        "नमस्ते".to_string(),
        "Provider error: Rate limit exceeded: quota",
    )];
    let run = BatchRun::new("/scans", OutputMode::Bilingual, "hi", "en", outcomes);

    let report = ReportWriter::render(&run);

    assert!(report.contains("नमस्ते"));
    assert!(report.contains("ERROR: Provider error: Rate limit exceeded: quota"));
    assert!(report.contains("SUMMARY: 1 image(s) processed, 0 succeeded, 1 failed"));
}

/// Test the manual translation layout
#[test]
fn test_render_manual_withMixedOutcomes_shouldListEveryFileAfterInstructions() {
    let run = BatchRun::new("/scans", OutputMode::ManualTranslation, "hi", "en", mixed_outcomes(false));

    let report = ReportWriter::render(&run);

    assert!(report.starts_with("EXTRACTED HINDI TEXT - READY FOR TRANSLATION\n"));
    assert_eq!(report.matches("FILE: ").count(), 3);
    assert!(report.find("Instructions:").unwrap() < report.find("FILE: a.jpg").unwrap());
    assert!(report.contains("ERROR: OCR service error: Bad image data."));
}

/// Test that an empty batch still yields a well-formed report
#[test]
fn test_render_withNoOutcomes_shouldOnlyCarrySummary() {
    let run = BatchRun::new("/scans", OutputMode::Transcript, "hi", "en", Vec::new());

    let report = ReportWriter::render(&run);

    assert_eq!(report, "\nSUMMARY: 0 image(s) processed, 0 succeeded, 0 failed\n");
}

/// Test that write replaces an existing report
#[test]
fn test_write_withExistingReport_shouldOverwrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "extracted_text.txt", b"stale report")?;
    let run = BatchRun::new("/scans", OutputMode::Transcript, "hi", "en", mixed_outcomes(false));

    let rendered = ReportWriter::write(&run, &path)?;

    let written = fs::read_to_string(&path)?;
    assert_eq!(written, rendered);
    assert!(!written.contains("stale report"));
    Ok(())
}

/// Test that a write into an unwritable location is a report write error
#[test]
fn test_write_withDirectoryTarget_shouldReturnReportWriteError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("report");
    fs::create_dir(&target)?;
    fs::write(target.join("keep"), "x")?;
    let run = BatchRun::new("/scans", OutputMode::Transcript, "hi", "en", Vec::new());

    let result = ReportWriter::write(&run, &target);

    assert!(matches!(result, Err(AppError::ReportWrite(_))));
    Ok(())
}
