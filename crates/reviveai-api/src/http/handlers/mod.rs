//! HTTP request handlers for the REST API.

pub mod combined;
pub mod single;
pub mod upload;
