//! Application error type mapping to the `{success: false, error}` envelope.
//!
//! Every failure an endpoint can hit -- upstream model errors, catalogue
//! problems, bad uploads -- collapses into the same envelope. No retries or
//! partial-failure recovery happen at this layer.

use axum::response::{IntoResponse, Response};

use reviveai_types::error::{CatalogError, ImageError, SearchError};
use reviveai_types::llm::LlmError;

use crate::http::response::ApiResponse;

/// Application-level error surfaced by API handlers.
#[derive(Debug)]
pub enum AppError {
    /// LLM provider failure.
    Llm(LlmError),
    /// Carbon catalogue / rerank failure.
    Catalog(CatalogError),
    /// Web research failure.
    Search(SearchError),
    /// Image generation failure.
    Image(ImageError),
    /// Client sent an unusable request (missing image, bad form field).
    Validation(String),
    /// A required backend is not configured (e.g. missing GOOGLE_API_KEY).
    NotConfigured(String),
    /// Anything else.
    Internal(String),
}

impl AppError {
    /// The message placed in the envelope's `error` field.
    pub fn message(&self) -> String {
        match self {
            AppError::Llm(e) => e.to_string(),
            AppError::Catalog(e) => e.to_string(),
            AppError::Search(e) => e.to_string(),
            AppError::Image(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::NotConfigured(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e)
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        AppError::Catalog(e)
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        AppError::Search(e)
    }
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        AppError::Image(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.message();
        tracing::error!(error = %message, "request failed");
        ApiResponse::failure(message).into_response()
    }
}
