/*!
 * Tests for error types and conversions
 */

use ocrbatch::errors::{AppError, ExtractionError, ProviderError, TranslationError};

#[test]
fn test_providerError_serviceError_shouldDisplayMessageVerbatim() {
    let error = ProviderError::ServiceError("Bad image data.".to_string());
    assert_eq!(error.to_string(), "Bad image data.");
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "Backend unavailable".to_string(),
    };
    let display = error.to_string();
    assert!(display.contains("503"));
    assert!(display.contains("Backend unavailable"));
}

#[test]
fn test_providerError_fromStatus_shouldClassifyCommonCodes() {
    assert!(matches!(ProviderError::from_status(401, String::new()), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, String::new()), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, String::new()), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(
        ProviderError::from_status(400, String::new()),
        ProviderError::ApiError { status_code: 400, .. }
    ));
}

#[test]
fn test_providerError_isTransient_shouldOnlyCoverRetryableFailures() {
    assert!(ProviderError::ConnectionError("reset".to_string()).is_transient());
    assert!(ProviderError::RateLimitExceeded("quota".to_string()).is_transient());
    assert!(ProviderError::ApiError { status_code: 500, message: String::new() }.is_transient());
    assert!(!ProviderError::ApiError { status_code: 400, message: String::new() }.is_transient());
    assert!(!ProviderError::AuthenticationError("denied".to_string()).is_transient());
    assert!(!ProviderError::ServiceError("Bad image data.".to_string()).is_transient());
}

#[test]
fn test_extractionError_read_shouldNameFileAndCause() {
    let error = ExtractionError::Read {
        path: "/scans/page1.jpg".to_string(),
        message: "Permission denied".to_string(),
    };
    let display = error.to_string();
    assert!(display.contains("/scans/page1.jpg"));
    assert!(display.contains("Permission denied"));
    assert!(!error.is_transient());
}

#[test]
fn test_extractionError_fromProvider_shouldKeepServiceMessage() {
    let error: ExtractionError = ProviderError::ServiceError("Bad image data.".to_string()).into();
    assert_eq!(error.to_string(), "OCR service error: Bad image data.");
}

#[test]
fn test_translationError_fromProvider_shouldForwardTransience() {
    let error: TranslationError = ProviderError::ConnectionError("reset".to_string()).into();
    assert!(error.is_transient());
    assert!(error.to_string().contains("reset"));
}

#[test]
fn test_appError_exitCode_shouldSingleOutCredentialErrors() {
    assert_eq!(AppError::Credential("missing".to_string()).exit_code(), 2);
    assert_eq!(AppError::Discovery("missing".to_string()).exit_code(), 1);
    assert_eq!(AppError::ReportWrite("disk full".to_string()).exit_code(), 1);
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(_)));
}
