//! LanceDB-backed carbon catalogue.

pub mod catalog;
pub mod lance;
pub mod schema;

pub use catalog::LanceCatalogStore;
pub use lance::LanceVectorStore;
