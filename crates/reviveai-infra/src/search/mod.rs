//! Web tool implementations for the research agent.

pub mod brave;
pub mod fetch;

pub use brave::BraveSearchTool;
pub use fetch::FetchWebpageTool;
