use async_trait::async_trait;
use base64::Engine;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::credentials::{Authorization, Credential};
use crate::errors::{ExtractionError, ProviderError};
use crate::outcome::NO_TEXT_FOUND;
use crate::providers::TextExtractor;

/// Google Cloud Vision client for document text detection
#[derive(Debug)]
pub struct GoogleVision {
    /// HTTP client for API requests
    client: Client,
    /// API base URL
    endpoint: String,
    /// Key or token attached to every request
    credential: Credential,
    /// Language hints forwarded to the detector
    language_hints: Vec<String>,
}

/// Batch annotate request body
#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_context: Option<ImageContext>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    /// Base64 encoded image bytes
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext {
    language_hints: Vec<String>,
}

/// Batch annotate response
#[derive(Debug, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

/// Result for one image
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub full_text_annotation: Option<TextAnnotation>,
    #[serde(default)]
    pub error: Option<Status>,
}

#[derive(Debug, Deserialize)]
pub struct TextAnnotation {
    #[serde(default)]
    pub text: String,
}

/// Per-request error status
#[derive(Debug, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl AnnotateRequest {
    /// Build a DOCUMENT_TEXT_DETECTION request for one image
    pub fn document_text(image: &[u8], language_hints: &[String]) -> Self {
        let image_context = if language_hints.is_empty() {
            None
        } else {
            Some(ImageContext { language_hints: language_hints.to_vec() })
        };

        Self {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(image),
                },
                features: vec![Feature { feature_type: "DOCUMENT_TEXT_DETECTION".to_string() }],
                image_context,
            }],
        }
    }
}

impl GoogleVision {
    /// Create a new Vision client
    pub fn new(endpoint: impl Into<String>, credential: Credential, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            credential,
            language_hints: Vec::new(),
        }
    }

    /// Set language hints for detection
    pub fn with_language_hints(mut self, hints: Vec<String>) -> Self {
        self.language_hints = hints;
        self
    }

    fn annotate_url(&self) -> String {
        format!("{}/v1/images:annotate", self.endpoint.trim_end_matches('/'))
    }

    async fn post_annotate(&self, request: &AnnotateRequest) -> Result<reqwest::Response, ProviderError> {
        let builder = self.client.post(self.annotate_url()).json(request);
        let builder = match self.credential.authorization().await? {
            Authorization::Key(key) => builder.query(&[("key", key)]),
            Authorization::Bearer(token) => builder.bearer_auth(token),
        };
        builder.send().await.map_err(ProviderError::from_transport)
    }

    /// Send one annotate request and return the single image response
    pub async fn annotate(&self, request: &AnnotateRequest) -> Result<AnnotateImageResponse, ProviderError> {
        let response = self.post_annotate(request).await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Vision API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let body = response.json::<AnnotateResponse>().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(body.responses.into_iter().next().unwrap_or_default())
    }

    /// Judge the answer to the pre-flight request.
    ///
    /// An empty batch is rejected with 400 once the credential is accepted, so
    /// only a 400 that names the key as invalid counts as a credential failure.
    pub fn preflight_result(status_code: u16, body: String) -> Result<(), ProviderError> {
        match status_code {
            200..=299 => Ok(()),
            400 if body.contains("API_KEY_INVALID") || body.contains("API key not valid") => {
                Err(ProviderError::AuthenticationError(body))
            }
            400 => Ok(()),
            _ => Err(ProviderError::from_status(status_code, body)),
        }
    }

    /// Pull the document text out of an image response.
    ///
    /// A per-image error wins over any partial text; missing or empty text
    /// becomes the `NO_TEXT_FOUND` sentinel.
    pub fn text_from_response(response: AnnotateImageResponse) -> Result<String, ProviderError> {
        if let Some(status) = response.error {
            if !status.message.is_empty() {
                return Err(ProviderError::ServiceError(status.message));
            }
        }

        match response.full_text_annotation {
            Some(annotation) if !annotation.text.is_empty() => Ok(annotation.text),
            _ => Ok(NO_TEXT_FOUND.to_string()),
        }
    }
}

#[async_trait]
impl TextExtractor for GoogleVision {
    fn name(&self) -> &str {
        "Google Vision"
    }

    async fn preflight(&self) -> Result<(), ProviderError> {
        debug!("Checking Vision credential against {}", self.annotate_url());
        let response = self.post_annotate(&AnnotateRequest { requests: Vec::new() }).await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::preflight_result(status, body)
    }

    async fn extract(&self, image: &[u8]) -> Result<String, ExtractionError> {
        debug!("Sending {} bytes to {}", image.len(), self.annotate_url());
        let request = AnnotateRequest::document_text(image, &self.language_hints);
        let response = self.annotate(&request).await?;
        Ok(Self::text_from_response(response)?)
    }
}
