//! Shared domain types for ReviveAI.
//!
//! This crate contains the core domain types used across the ReviveAI
//! platform: listing content, carbon catalogue records, LLM request/response
//! shapes, search reports, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod carbon;
pub mod config;
pub mod error;
pub mod listing;
pub mod llm;
pub mod search;
