//! Infrastructure layer for ReviveAI.
//!
//! Contains implementations of the ports defined in `reviveai-core`:
//! the OpenAI-compatible LLM provider, the Gemini image client, Brave
//! Search and webpage-fetch tools, the LanceDB catalogue store, the
//! fastembed embedder, and CSV catalogue ingestion.

pub mod config;
pub mod embedder;
pub mod image;
pub mod ingest;
pub mod llm;
pub mod search;
pub mod vector;
