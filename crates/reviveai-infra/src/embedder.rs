//! FastEmbed-based local embedding generator.
//!
//! Implements the `Embedder` trait from `reviveai-core` using fastembed's
//! BGESmallENV15 model (384 dimensions) with ONNX runtime inference.
//! Inference is CPU-bound, so calls run on the blocking thread pool.

use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use reviveai_core::catalog::Embedder;
use reviveai_types::error::CatalogError;

/// Embedding model identifier stored alongside catalogue rows.
pub const EMBEDDING_MODEL_NAME: &str = "BGESmallENV15";

/// BGESmallENV15 output dimension.
pub const EMBEDDING_DIMENSION: usize = 384;

/// Local embedder backed by fastembed's BGESmallENV15 ONNX model.
///
/// The model handle lives behind a mutex and is shared across clones;
/// `embed` moves the work onto `spawn_blocking` so ONNX inference never
/// stalls the async runtime.
#[derive(Clone)]
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl FastEmbedder {
    /// Initialize the embedding model (downloads weights on first use).
    pub fn new() -> Result<Self, CatalogError> {
        let options =
            InitOptions::new(EmbeddingModel::BGESmallENV15).with_show_download_progress(true);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| CatalogError::Embedding(format!("failed to initialize fastembed: {e}")))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

impl Embedder for FastEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CatalogError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| CatalogError::Embedding("embedder mutex poisoned".to_string()))?;
            model
                .embed(texts, None)
                .map_err(|e| CatalogError::Embedding(format!("embedding failed: {e}")))
        })
        .await
        .map_err(|e| CatalogError::Embedding(format!("embedding task panicked: {e}")))?
    }

    fn model_name(&self) -> &str {
        EMBEDDING_MODEL_NAME
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}
