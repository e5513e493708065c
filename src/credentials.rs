/*!
 * OCR service credentials.
 *
 * The credential reference is a path to a JSON key file. It is resolved once
 * (CLI flag, GOOGLE_APPLICATION_CREDENTIALS, or config) and handed to the
 * client explicitly; nothing here reads the environment.
 */

use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{AppError, ProviderError};

/// Environment variable conventionally pointing at the key file
pub const CREDENTIALS_ENV_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// OAuth scope requested for service-account tokens
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// On-disk key file layout. Service-account files carry `type`,
/// `client_email` and a private key; alternatively the file holds an API key
/// or a pre-issued OAuth access token.
#[derive(Debug, Deserialize)]
struct KeyFile {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    client_email: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

/// How requests to the OCR service are authenticated
#[derive(Clone)]
pub enum Credential {
    /// Sent as the `key` query parameter
    ApiKey(String),
    /// Sent as a bearer token
    AccessToken(String),
    /// Exchanged for short-lived bearer tokens, cached by `gcp_auth`
    ServiceAccount {
        client_email: String,
        account: Arc<CustomServiceAccount>,
    },
}

// Secrets stay out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => write!(f, "ApiKey(***)"),
            Self::AccessToken(_) => write!(f, "AccessToken(***)"),
            Self::ServiceAccount { client_email, .. } => write!(f, "ServiceAccount({})", client_email),
        }
    }
}

/// Request authorization derived from a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// `key` query parameter
    Key(String),
    /// `Authorization: Bearer` header
    Bearer(String),
}

impl Credential {
    /// Load and check the key file at `path`.
    ///
    /// Every failure is an `AppError::Credential` whose message says what to
    /// fix, so the binary can stop before any image is touched.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let path = path.ok_or_else(|| {
            AppError::Credential(format!(
                "{} not set. Export it or pass --credentials: export {}='path/to/your/service-account-key.json'",
                CREDENTIALS_ENV_VAR, CREDENTIALS_ENV_VAR
            ))
        })?;

        if !path.is_file() {
            return Err(AppError::Credential(format!(
                "Credentials file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Credential(format!("Failed to read credentials file {}: {}", path.display(), e))
        })?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, AppError> {
        let key_file: KeyFile = serde_json::from_str(content).map_err(|e| {
            AppError::Credential(format!("Credentials file {} is not valid JSON: {}", path.display(), e))
        })?;

        if let Some(token) = key_file.access_token.filter(|t| !t.trim().is_empty()) {
            return Ok(Self::AccessToken(token.trim().to_string()));
        }
        if let Some(key) = key_file.api_key.filter(|k| !k.trim().is_empty()) {
            return Ok(Self::ApiKey(key.trim().to_string()));
        }

        if key_file.kind.as_deref() == Some("service_account") {
            let account = CustomServiceAccount::from_json(content).map_err(|e| {
                AppError::Credential(format!(
                    "Service account key {} is unusable: {}",
                    path.display(),
                    e
                ))
            })?;
            return Ok(Self::ServiceAccount {
                client_email: key_file.client_email.unwrap_or_default(),
                account: Arc::new(account),
            });
        }

        Err(AppError::Credential(format!(
            "Credentials file {} ({}) is not a service account key and has no 'api_key' or 'access_token' entry",
            path.display(),
            key_file.kind.as_deref().unwrap_or("unknown type"),
        )))
    }

    /// Short description for status output
    pub fn kind(&self) -> String {
        match self {
            Self::ApiKey(_) => "API key".to_string(),
            Self::AccessToken(_) => "access token".to_string(),
            Self::ServiceAccount { client_email, .. } => format!("service account {}", client_email),
        }
    }

    /// Resolve the key or a bearer token for the next request.
    ///
    /// Service accounts fetch (or reuse) an OAuth token; a refused exchange is
    /// an authentication error.
    pub async fn authorization(&self) -> Result<Authorization, ProviderError> {
        match self {
            Self::ApiKey(key) => Ok(Authorization::Key(key.clone())),
            Self::AccessToken(token) => Ok(Authorization::Bearer(token.clone())),
            Self::ServiceAccount { client_email, account } => {
                let token = account.token(&[CLOUD_PLATFORM_SCOPE]).await.map_err(|e| {
                    ProviderError::AuthenticationError(format!(
                        "token exchange for {} failed: {}",
                        client_email, e
                    ))
                })?;
                Ok(Authorization::Bearer(token.as_str().to_string()))
            }
        }
    }
}

/// Pick the credential path: the command line (or its environment variable)
/// first, then the configured value
pub fn resolve_credentials_path(cli: Option<PathBuf>, configured: Option<PathBuf>) -> Option<PathBuf> {
    cli.or(configured).filter(|p| !p.as_os_str().is_empty())
}
