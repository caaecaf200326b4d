//! Catalogue vector store trait.
//!
//! Defines the interface for nearest-neighbor search over the carbon
//! catalogue. Implementations (LanceDB) live in reviveai-infra.

use reviveai_types::carbon::{CatalogProduct, ScoredProduct};
use reviveai_types::error::CatalogError;

/// Trait for the vector-indexed carbon catalogue.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in reviveai-infra.
pub trait CatalogStore: Send + Sync {
    /// Search for products closest to the query embedding.
    ///
    /// Returns up to `limit` results ordered by ascending cosine distance.
    fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredProduct>, CatalogError>> + Send;

    /// Add a batch of products with their precomputed embeddings.
    ///
    /// `products` and `embeddings` must be the same length.
    fn add_products(
        &self,
        products: &[CatalogProduct],
        embeddings: &[Vec<f32>],
    ) -> impl std::future::Future<Output = Result<(), CatalogError>> + Send;

    /// Count products in the catalogue.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, CatalogError>> + Send;
}
