//! Embedder trait for text-to-vector conversion.
//!
//! Defines the interface for embedding text into vectors for the
//! catalogue's similarity search. Implementations (fastembed) live in
//! reviveai-infra.

use reviveai_types::error::CatalogError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in reviveai-infra.
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors.
    ///
    /// Returns one vector per input text. Batch embedding is supported
    /// for efficiency during catalogue ingestion.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, CatalogError>> + Send;

    /// The model name used for embeddings (e.g., "BGESmallENV15").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}
