//! GeminiImageClient -- concrete [`ImageModel`] implementation for the
//! Gemini image models (`generateContent` endpoint).
//!
//! Sends JSON requests with text and inline-image parts and extracts the
//! first inline-data part of the first candidate as the produced image.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use reviveai_core::image::ImageModel;
use reviveai_types::error::ImageError;

/// Gemini image generation/editing client.
///
/// Implements [`ImageModel`] against the `generateContent` REST endpoint.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and only exposed when
/// constructing the request header. The struct intentionally does not
/// derive Debug.
pub struct GeminiImageClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart {
    Text(String),
    InlineData(InlineData),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    inline_data: Option<InlineData>,
}

impl GeminiImageClient {
    /// Create a new Gemini image client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Google API key wrapped in SecretString
    /// * `model` - Model identifier (e.g., "gemini-2.5-flash-image")
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120)) // image renders are slow
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: model.into(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send a generateContent request and extract the first image part.
    async fn generate_content(&self, parts: Vec<RequestPart>) -> Result<Vec<u8>, ImageError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent { parts }],
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageError::Model(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ImageError::Model(format!("HTTP {status}: {error_body}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Model(format!("failed to parse response: {e}")))?;

        let inline = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data))
            .ok_or(ImageError::NoImageReturned)?;

        base64::engine::general_purpose::STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| ImageError::Model(format!("invalid image base64: {e}")))
    }
}

impl ImageModel for GeminiImageClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        self.generate_content(vec![RequestPart::Text(prompt.to_string())])
            .await
    }

    async fn edit(
        &self,
        prompt: &str,
        image: &[u8],
        media_type: &str,
    ) -> Result<Vec<u8>, ImageError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        self.generate_content(vec![
            RequestPart::Text(prompt.to_string()),
            RequestPart::InlineData(InlineData {
                mime_type: media_type.to_string(),
                data: encoded,
            }),
        ])
        .await
    }
}
