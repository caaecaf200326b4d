//! HTTP/REST API layer for ReviveAI.
//!
//! Axum-based API with multipart uploads, NDJSON streaming, the
//! `{success, data, error}` envelope, and CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
