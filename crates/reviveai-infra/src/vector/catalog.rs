//! LanceDB-backed carbon catalogue store.
//!
//! Implements `CatalogStore` from `reviveai-core` using LanceDB for vector
//! storage and cosine-distance search over the 384-dimensional
//! BGESmallENV15 embeddings built from each product's document text.

use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Float64Array, Int32Array, RecordBatch,
    RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field};
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use reviveai_core::catalog::CatalogStore;
use reviveai_types::carbon::{CatalogProduct, ScoredProduct};
use reviveai_types::error::CatalogError;

use super::lance::LanceVectorStore;
use super::schema::{CATALOG_TABLE, EMBEDDING_DIMENSION, catalog_schema};

/// LanceDB-backed catalogue store.
pub struct LanceCatalogStore {
    store: LanceVectorStore,
    embedding_model: String,
}

impl LanceCatalogStore {
    /// Create a new catalogue store backed by the given LanceVectorStore.
    ///
    /// `embedding_model` labels the rows so a model swap can be detected
    /// at ingest time.
    pub fn new(store: LanceVectorStore, embedding_model: impl Into<String>) -> Self {
        Self {
            store,
            embedding_model: embedding_model.into(),
        }
    }

    /// Ensure the catalogue table exists, creating it if needed.
    async fn ensure_table(&self) -> Result<lancedb::Table, CatalogError> {
        let schema = Arc::new(catalog_schema());
        self.store
            .ensure_table(CATALOG_TABLE, schema)
            .await
            .map_err(|e| CatalogError::Storage(format!("Failed to ensure catalogue table: {e}")))
    }

    /// Build an Arrow RecordBatch from products and their embeddings.
    fn build_record_batch(
        &self,
        products: &[CatalogProduct],
        embeddings: &[Vec<f32>],
    ) -> Result<RecordBatch, CatalogError> {
        let schema = Arc::new(catalog_schema());

        let product_id_array =
            StringArray::from(products.iter().map(|p| p.product_id.clone()).collect::<Vec<_>>());
        let product_name_array =
            StringArray::from(products.iter().map(|p| p.product_name.clone()).collect::<Vec<_>>());
        let company_array =
            StringArray::from(products.iter().map(|p| p.company.clone()).collect::<Vec<_>>());
        let sector_array =
            StringArray::from(products.iter().map(|p| p.sector.clone()).collect::<Vec<_>>());
        let weight_array =
            Float64Array::from(products.iter().map(|p| p.weight_kg).collect::<Vec<_>>());
        let footprint_array =
            Float64Array::from(products.iter().map(|p| p.carbon_footprint).collect::<Vec<_>>());
        let country_array =
            StringArray::from(products.iter().map(|p| p.country.clone()).collect::<Vec<_>>());
        let year_array = Int32Array::from(products.iter().map(|p| p.year).collect::<Vec<_>>());
        let detail_array =
            StringArray::from(products.iter().map(|p| p.detail.clone()).collect::<Vec<_>>());
        let document_array = StringArray::from(
            products.iter().map(|p| p.embedding_document()).collect::<Vec<_>>(),
        );
        let embedding_model_array = StringArray::from(
            products.iter().map(|_| self.embedding_model.clone()).collect::<Vec<_>>(),
        );

        // Build FixedSizeList vector column from the flattened embeddings
        let mut flat: Vec<f32> = Vec::with_capacity(embeddings.len() * EMBEDDING_DIMENSION as usize);
        for embedding in embeddings {
            if embedding.len() != EMBEDDING_DIMENSION as usize {
                return Err(CatalogError::Embedding(format!(
                    "embedding dimension {} does not match schema ({EMBEDDING_DIMENSION})",
                    embedding.len()
                )));
            }
            flat.extend_from_slice(embedding);
        }
        let values = Float32Array::from(flat);
        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vector_array =
            FixedSizeListArray::new(field, EMBEDDING_DIMENSION, Arc::new(values), None);

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(product_id_array),
                Arc::new(product_name_array),
                Arc::new(company_array),
                Arc::new(sector_array),
                Arc::new(weight_array),
                Arc::new(footprint_array),
                Arc::new(country_array),
                Arc::new(year_array),
                Arc::new(detail_array),
                Arc::new(document_array),
                Arc::new(embedding_model_array),
                Arc::new(vector_array),
            ],
        )
        .map_err(|e| CatalogError::Storage(format!("Failed to build record batch: {e}")))
    }

    /// Parse Arrow RecordBatch rows into CatalogProduct values.
    ///
    /// Extracts all columns by index from the batch and reconstructs
    /// domain objects. Skips the vector column (used only for search).
    fn record_batch_to_products(batch: &RecordBatch) -> Vec<CatalogProduct> {
        let num_rows = batch.num_rows();
        if num_rows == 0 {
            return vec![];
        }

        let product_id_col = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("product_id column should be StringArray");
        let product_name_col = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("product_name column should be StringArray");
        let company_col = batch
            .column(2)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("company column should be StringArray");
        let sector_col = batch
            .column(3)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("sector column should be StringArray");
        let weight_col = batch
            .column(4)
            .as_any()
            .downcast_ref::<Float64Array>()
            .expect("weight_kg column should be Float64Array");
        let footprint_col = batch
            .column(5)
            .as_any()
            .downcast_ref::<Float64Array>()
            .expect("carbon_footprint column should be Float64Array");
        let country_col = batch
            .column(6)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("country column should be StringArray");
        let year_col = batch
            .column(7)
            .as_any()
            .downcast_ref::<Int32Array>()
            .expect("year column should be Int32Array");
        let detail_col = batch
            .column(8)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("detail column should be StringArray");

        let mut products = Vec::with_capacity(num_rows);
        for i in 0..num_rows {
            products.push(CatalogProduct {
                product_id: product_id_col.value(i).to_string(),
                product_name: product_name_col.value(i).to_string(),
                company: company_col.value(i).to_string(),
                sector: sector_col.value(i).to_string(),
                weight_kg: weight_col.value(i),
                carbon_footprint: footprint_col.value(i),
                country: country_col.value(i).to_string(),
                year: year_col.value(i),
                detail: detail_col.value(i).to_string(),
            });
        }

        products
    }
}

impl CatalogStore for LanceCatalogStore {
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredProduct>, CatalogError> {
        let table = self.ensure_table().await?;

        let results = table
            .vector_search(query_embedding)
            .map_err(|e| CatalogError::Storage(format!("Vector search setup failed: {e}")))?
            .distance_type(lancedb::DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| CatalogError::Storage(format!("Vector search failed: {e}")))?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .map_err(|e| CatalogError::Storage(format!("Failed to collect results: {e}")))?;

        let mut scored: Vec<ScoredProduct> = Vec::new();

        for batch in &batches {
            if batch.num_rows() == 0 {
                continue;
            }

            // The _distance column is added by LanceDB vector search
            let distance_col = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

            let products = Self::record_batch_to_products(batch);

            for (i, product) in products.into_iter().enumerate() {
                let distance = distance_col.map_or(0.0, |d| d.value(i));
                scored.push(ScoredProduct { product, distance });
            }
        }

        // Ascending distance (closest first)
        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);

        Ok(scored)
    }

    async fn add_products(
        &self,
        products: &[CatalogProduct],
        embeddings: &[Vec<f32>],
    ) -> Result<(), CatalogError> {
        if products.is_empty() {
            return Ok(());
        }
        if products.len() != embeddings.len() {
            return Err(CatalogError::Embedding(format!(
                "{} products but {} embeddings",
                products.len(),
                embeddings.len()
            )));
        }

        let table = self.ensure_table().await?;
        let batch = self.build_record_batch(products, embeddings)?;
        let schema = batch.schema();

        let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);
        table
            .add(batches)
            .execute()
            .await
            .map_err(|e| CatalogError::Storage(format!("Failed to add products: {e}")))?;

        Ok(())
    }

    async fn count(&self) -> Result<u64, CatalogError> {
        let table = self.ensure_table().await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| CatalogError::Storage(format!("Failed to count rows: {e}")))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, footprint: f64) -> CatalogProduct {
        CatalogProduct {
            product_id: id.to_string(),
            product_name: name.to_string(),
            company: "Acme".into(),
            sector: "Technology".into(),
            weight_kg: 1.5,
            carbon_footprint: footprint,
            country: "TW".into(),
            year: 2021,
            detail: "a test product".into(),
        }
    }

    /// A deterministic fake embedding pointing mostly along one axis.
    fn axis_embedding(axis: usize) -> Vec<f32> {
        let mut v = vec![0.01_f32; EMBEDDING_DIMENSION as usize];
        v[axis] = 1.0;
        v
    }

    async fn store() -> (tempfile::TempDir, LanceCatalogStore) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let lance = LanceVectorStore::new(temp_dir.path().to_path_buf())
            .await
            .expect("Failed to create vector store");
        (temp_dir, LanceCatalogStore::new(lance, "BGESmallENV15"))
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let (_tmp, store) = store().await;
        assert_eq!(store.count().await.unwrap(), 0);

        store
            .add_products(
                &[product("P1", "Laptop", 160.0), product("P2", "Phone", 55.0)],
                &[axis_embedding(0), axis_embedding(1)],
            )
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_returns_closest_first() {
        let (_tmp, store) = store().await;
        store
            .add_products(
                &[product("P1", "Laptop", 160.0), product("P2", "Phone", 55.0)],
                &[axis_embedding(0), axis_embedding(1)],
            )
            .await
            .unwrap();

        let results = store.search(&axis_embedding(0), 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].product.product_name, "Laptop");
        assert!(results[0].distance <= results[1].distance);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let (_tmp, store) = store().await;
        store
            .add_products(
                &[
                    product("P1", "A", 1.0),
                    product("P2", "B", 2.0),
                    product("P3", "C", 3.0),
                ],
                &[axis_embedding(0), axis_embedding(1), axis_embedding(2)],
            )
            .await
            .unwrap();

        let results = store.search(&axis_embedding(0), 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_add_rejects_mismatched_lengths() {
        let (_tmp, store) = store().await;
        let err = store
            .add_products(&[product("P1", "A", 1.0)], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_add_rejects_wrong_dimension() {
        let (_tmp, store) = store().await;
        let err = store
            .add_products(&[product("P1", "A", 1.0)], &[vec![0.1; 8]])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_roundtrip_preserves_product_fields() {
        let (_tmp, store) = store().await;
        let original = product("PCF-42", "Espresso Machine", 88.5);
        store
            .add_products(std::slice::from_ref(&original), &[axis_embedding(3)])
            .await
            .unwrap();

        let results = store.search(&axis_embedding(3), 1).await.unwrap();
        assert_eq!(results[0].product, original);
    }
}
