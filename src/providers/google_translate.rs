use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::errors::{ProviderError, TranslationError};
use crate::language_utils;
use crate::providers::Translator;

/// Client for the public Google Translate web endpoint
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Base URL, e.g. https://translate.googleapis.com
    endpoint: String,
}

impl GoogleTranslate {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    fn single_url(&self) -> String {
        format!("{}/translate_a/single", self.endpoint.trim_end_matches('/'))
    }

    /// Short language code the endpoint expects. Region tags such as
    /// "zh-CN" are passed through as given.
    fn endpoint_code(code: &str) -> String {
        let code = code.trim();
        if language_utils::has_subtags(code) {
            return code.replace('_', "-");
        }
        language_utils::normalize_to_part1_or_part2t(code)
            .unwrap_or_else(|_| code.to_lowercase())
    }

    /// Concatenate the translated segments of a `translate_a/single` reply.
    ///
    /// The reply is a nested array whose first element lists segments as
    /// `[translated, original, ...]`.
    pub fn extract_text_from_response(response: &Value) -> Result<String, ProviderError> {
        let segments = response.get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::ParseError("missing translation segments".to_string()))?;

        Ok(segments.iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect())
    }
}

#[async_trait]
impl Translator for GoogleTranslate {
    fn name(&self) -> &str {
        "Google Translate"
    }

    async fn preflight(&self) -> Result<(), ProviderError> {
        // Keyless endpoint, nothing to verify up front
        Ok(())
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let source = Self::endpoint_code(source_language);
        let target = Self::endpoint_code(target_language);

        let response = self.client.post(self.single_url())
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Translate error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text).into());
        }

        let body = response.json::<Value>().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(Self::extract_text_from_response(&body)?)
    }
}
