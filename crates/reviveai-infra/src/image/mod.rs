//! Image model implementations.

pub mod gemini;

pub use gemini::GeminiImageClient;
