//! Carbon catalogue ingestion.
//!
//! Reads the cleaned Carbon Catalogue CSV, applies the cleaning rules
//! (missing details, duplicate product versions across reporting years,
//! unusable footprints), embeds each product's document text, and loads
//! the batch into the LanceDB catalogue.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use reviveai_core::catalog::{CatalogStore, Embedder};
use reviveai_types::carbon::CatalogProduct;
use reviveai_types::error::IngestError;

/// Rows embedded per batch during ingestion.
const EMBED_BATCH_SIZE: usize = 64;

/// Placeholder when the source row has no usable detail text.
const NO_DETAIL: &str = "[no detail provided]";

/// Placeholder when the detail merely repeats the product name.
const SAME_AS_NAME: &str = "[same as product_name]";

/// Product IDs look like `{base}-{seq}-{year}`; the base identifies the
/// same product across reporting years.
static PRODUCT_BASE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)-\d+-\d+$").expect("invalid product id regex"));

/// One row of the cleaned catalogue CSV.
#[derive(Debug, Deserialize)]
struct CsvRow {
    product_id: String,
    product_name: String,
    #[serde(default)]
    product_detail: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    sector: String,
    #[serde(default)]
    weight_kg: Option<f64>,
    #[serde(default)]
    carbon_footprint: Option<f64>,
    #[serde(default)]
    country: String,
    #[serde(default)]
    year: Option<i32>,
}

/// Outcome counts from an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    /// Rows read from the CSV.
    pub total_rows: usize,
    /// Rows written to the catalogue.
    pub ingested: usize,
    /// Rows dropped by cleaning (no footprint, no name, stale year).
    pub skipped: usize,
}

/// Ingest a catalogue CSV into the vector store.
pub async fn ingest_catalog<E, C>(
    csv_path: &Path,
    embedder: &E,
    store: &C,
) -> Result<IngestSummary, IngestError>
where
    E: Embedder,
    C: CatalogStore,
{
    let mut reader = csv::Reader::from_path(csv_path)
        .map_err(|e| IngestError::Io(format!("{}: {e}", csv_path.display())))?;

    let mut rows: Vec<CsvRow> = Vec::new();
    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                // Header is line 1; records start at line 2.
                return Err(IngestError::MalformedRecord {
                    line: idx as u64 + 2,
                    message: e.to_string(),
                });
            }
        }
    }

    let total_rows = rows.len();
    let products = clean_rows(rows);
    let skipped = total_rows - products.len();
    info!(total_rows, kept = products.len(), skipped, "catalogue cleaned");

    let mut ingested = 0usize;
    for chunk in products.chunks(EMBED_BATCH_SIZE) {
        let documents: Vec<String> = chunk.iter().map(|p| p.embedding_document()).collect();
        let embeddings = embedder.embed(&documents).await?;
        store.add_products(chunk, &embeddings).await?;
        ingested += chunk.len();
        info!(ingested, total = products.len(), "catalogue batch written");
    }

    Ok(IngestSummary {
        total_rows,
        ingested,
        skipped,
    })
}

/// Apply the cleaning rules and keep only the latest year per product.
fn clean_rows(rows: Vec<CsvRow>) -> Vec<CatalogProduct> {
    // Latest reporting year per product base id
    let mut latest_year: HashMap<String, i32> = HashMap::new();
    for row in &rows {
        let (Some(base), Some(year)) = (base_id(&row.product_id), row.year) else {
            continue;
        };
        latest_year
            .entry(base)
            .and_modify(|y| *y = (*y).max(year))
            .or_insert(year);
    }

    let mut products = Vec::new();
    for row in rows {
        let name = row.product_name.trim().to_string();
        if name.is_empty() || name.eq_ignore_ascii_case("nan") {
            continue;
        }

        // Footprint is the whole point of the catalogue; rows without one
        // are useless for the savings estimate.
        let Some(carbon_footprint) = row.carbon_footprint else {
            warn!(product_id = %row.product_id, "skipping row without carbon footprint");
            continue;
        };

        let year = row.year.unwrap_or(0);
        if let Some(base) = base_id(&row.product_id) {
            if let Some(&latest) = latest_year.get(&base) {
                if year < latest {
                    continue;
                }
            }
        }

        products.push(CatalogProduct {
            product_id: row.product_id,
            product_name: name.clone(),
            company: row.company,
            sector: row.sector,
            weight_kg: row.weight_kg.unwrap_or(0.0),
            carbon_footprint,
            country: row.country,
            year,
            detail: clean_detail(&name, &row.product_detail),
        });
    }

    products
}

fn base_id(product_id: &str) -> Option<String> {
    PRODUCT_BASE_ID
        .captures(product_id)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Normalize the free-text detail field.
fn clean_detail(name: &str, detail: &str) -> String {
    let trimmed = detail.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("field not included in 2013 data")
    {
        return NO_DETAIL.to_string();
    }
    if trimmed == name {
        return SAME_AS_NAME.to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, name: &str, footprint: Option<f64>, year: Option<i32>) -> CsvRow {
        CsvRow {
            product_id: id.to_string(),
            product_name: name.to_string(),
            product_detail: "some detail".to_string(),
            company: "Acme".to_string(),
            sector: "Tech".to_string(),
            weight_kg: Some(1.0),
            carbon_footprint: footprint,
            country: "TW".to_string(),
            year,
        }
    }

    #[test]
    fn test_clean_detail_placeholders() {
        assert_eq!(clean_detail("Laptop", ""), NO_DETAIL);
        assert_eq!(clean_detail("Laptop", "nan"), NO_DETAIL);
        assert_eq!(
            clean_detail("Laptop", "Field not included in 2013 data"),
            NO_DETAIL
        );
        assert_eq!(clean_detail("Laptop", "Laptop"), SAME_AS_NAME);
        assert_eq!(clean_detail("Laptop", "13-inch model"), "13-inch model");
    }

    #[test]
    fn test_base_id_extraction() {
        assert_eq!(base_id("ABC-1-2020"), Some("ABC".to_string()));
        assert_eq!(base_id("A-B-2-2019"), Some("A-B".to_string()));
        assert_eq!(base_id("no-pattern"), None);
    }

    #[test]
    fn test_clean_rows_drops_missing_footprint() {
        let products = clean_rows(vec![
            row("A-1-2020", "Laptop", Some(100.0), Some(2020)),
            row("B-1-2020", "Phone", None, Some(2020)),
        ]);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_name, "Laptop");
    }

    #[test]
    fn test_clean_rows_drops_empty_name() {
        let products = clean_rows(vec![
            row("A-1-2020", "", Some(100.0), Some(2020)),
            row("B-1-2020", "nan", Some(100.0), Some(2020)),
        ]);
        assert!(products.is_empty());
    }

    #[test]
    fn test_clean_rows_keeps_only_latest_year() {
        let products = clean_rows(vec![
            row("A-1-2019", "Laptop v1", Some(90.0), Some(2019)),
            row("A-2-2021", "Laptop v2", Some(100.0), Some(2021)),
            row("B-1-2020", "Phone", Some(55.0), Some(2020)),
        ]);
        assert_eq!(products.len(), 2);
        assert!(products.iter().any(|p| p.product_name == "Laptop v2"));
        assert!(products.iter().all(|p| p.product_name != "Laptop v1"));
    }

    #[tokio::test]
    async fn test_ingest_catalog_end_to_end() {
        use reviveai_types::carbon::ScoredProduct;
        use reviveai_types::error::CatalogError;
        use std::sync::Mutex;

        struct StubEmbedder;

        impl Embedder for StubEmbedder {
            async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CatalogError> {
                Ok(texts.iter().map(|_| vec![0.5; 4]).collect())
            }

            fn model_name(&self) -> &str {
                "stub"
            }

            fn dimension(&self) -> usize {
                4
            }
        }

        #[derive(Default)]
        struct RecordingStore {
            added: Mutex<Vec<CatalogProduct>>,
        }

        impl CatalogStore for RecordingStore {
            async fn search(
                &self,
                _query_embedding: &[f32],
                _limit: usize,
            ) -> Result<Vec<ScoredProduct>, CatalogError> {
                Ok(Vec::new())
            }

            async fn add_products(
                &self,
                products: &[CatalogProduct],
                embeddings: &[Vec<f32>],
            ) -> Result<(), CatalogError> {
                assert_eq!(products.len(), embeddings.len());
                self.added.lock().unwrap().extend_from_slice(products);
                Ok(())
            }

            async fn count(&self) -> Result<u64, CatalogError> {
                Ok(self.added.lock().unwrap().len() as u64)
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("catalogue.csv");
        std::fs::write(
            &csv_path,
            "product_id,product_name,product_detail,company,sector,weight_kg,carbon_footprint,country,year\n\
             A-1-2020,Laptop 13,13-inch laptop,Acme,Tech,1.3,160.0,TW,2020\n\
             B-1-2020,Phone X,,Acme,Tech,0.2,55.0,TW,2020\n\
             C-1-2020,Broken,,Acme,Tech,0.2,,TW,2020\n",
        )
        .unwrap();

        let store = RecordingStore::default();
        let summary = ingest_catalog(&csv_path, &StubEmbedder, &store)
            .await
            .unwrap();

        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.ingested, 2);
        assert_eq!(summary.skipped, 1);

        let added = store.added.lock().unwrap();
        assert_eq!(added.len(), 2);
        // Missing detail got the placeholder
        assert_eq!(added[1].detail, NO_DETAIL);
    }

    #[tokio::test]
    async fn test_ingest_catalog_missing_file() {
        use reviveai_types::carbon::ScoredProduct;
        use reviveai_types::error::CatalogError;

        struct NoopEmbedder;
        impl Embedder for NoopEmbedder {
            async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, CatalogError> {
                Ok(Vec::new())
            }
            fn model_name(&self) -> &str {
                "noop"
            }
            fn dimension(&self) -> usize {
                4
            }
        }

        struct NoopStore;
        impl CatalogStore for NoopStore {
            async fn search(
                &self,
                _q: &[f32],
                _l: usize,
            ) -> Result<Vec<ScoredProduct>, CatalogError> {
                Ok(Vec::new())
            }
            async fn add_products(
                &self,
                _p: &[CatalogProduct],
                _e: &[Vec<f32>],
            ) -> Result<(), CatalogError> {
                Ok(())
            }
            async fn count(&self) -> Result<u64, CatalogError> {
                Ok(0)
            }
        }

        let err = ingest_catalog(Path::new("/nonexistent/file.csv"), &NoopEmbedder, &NoopStore)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
