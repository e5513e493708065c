/*!
 * Tests for OCR credential loading
 */

use anyhow::Result;
use ocrbatch::credentials::{resolve_credentials_path, Credential};
use ocrbatch::errors::AppError;
use std::path::Path;
use crate::common;

/// Test that an unset credential reference is a credential error
#[test]
fn test_load_withNoPath_shouldReturnCredentialError() {
    let result = Credential::load(None);
    match result {
        Err(AppError::Credential(message)) => assert!(message.contains("GOOGLE_APPLICATION_CREDENTIALS")),
        other => panic!("expected a credential error, got {:?}", other),
    }
}

/// Test that a dangling path is a credential error
#[test]
fn test_load_withMissingFile_shouldReturnCredentialError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("missing-key.json");

    let result = Credential::load(Some(path.as_path()));

    assert!(matches!(result, Err(AppError::Credential(_))));
    Ok(())
}

/// Test that a non-JSON key file is a credential error
#[test]
fn test_load_withInvalidJson_shouldReturnCredentialError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "key.json", b"not json")?;

    let result = Credential::load(Some(path.as_path()));

    assert!(matches!(result, Err(AppError::Credential(_))));
    Ok(())
}

/// Test loading an API key
#[test]
fn test_load_withApiKey_shouldReturnApiKey() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "key.json", br#"{"api_key": " AIza-test "}"#)?;

    let credential = Credential::load(Some(path.as_path()))?;

    assert!(matches!(credential, Credential::ApiKey(ref key) if key == "AIza-test"));
    Ok(())
}

/// Test that a service-account key file is accepted as-is
#[test]
fn test_load_withServiceAccountKey_shouldReturnServiceAccount() -> Result<()> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/service_account.json");

    let credential = Credential::load(Some(path.as_path()))?;

    match &credential {
        Credential::ServiceAccount { client_email, .. } => {
            assert_eq!(client_email, "ocr-batch@scans-archive.iam.gserviceaccount.com");
        }
        other => panic!("expected a service account, got {:?}", other),
    }
    assert_eq!(credential.kind(), "service account ocr-batch@scans-archive.iam.gserviceaccount.com");
    Ok(())
}

/// Test that a service-account file without a private key names the file
#[test]
fn test_load_withServiceAccountMissingKey_shouldReturnCredentialError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "key.json",
        br#"{"type": "service_account", "project_id": "scans", "client_email": "ocr@scans.iam.gserviceaccount.com"}"#,
    )?;

    let error = Credential::load(Some(path.as_path())).unwrap_err();

    assert_eq!(error.exit_code(), 2);
    assert!(error.to_string().contains("key.json"));
    Ok(())
}

/// Test that a key file of another kind explains the accepted forms
#[test]
fn test_load_withUserCredentials_shouldExplainAcceptedForms() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "key.json",
        br#"{"type": "authorized_user", "client_id": "id", "refresh_token": "r"}"#,
    )?;

    let error = Credential::load(Some(path.as_path())).unwrap_err();

    assert!(error.to_string().contains("api_key"));
    Ok(())
}

/// Test credential path precedence
#[test]
fn test_resolve_credentials_path_withBothSources_shouldPreferCommandLine() {
    let resolved = resolve_credentials_path(Some("cli.json".into()), Some("config.json".into()));
    assert_eq!(resolved, Some("cli.json".into()));

    let resolved = resolve_credentials_path(None, Some("config.json".into()));
    assert_eq!(resolved, Some("config.json".into()));

    assert_eq!(resolve_credentials_path(None, None), None);
}
