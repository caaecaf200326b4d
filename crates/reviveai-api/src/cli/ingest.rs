//! Catalogue ingestion command.

use std::path::Path;

use anyhow::Result;
use console::style;

use reviveai_infra::config::resolve_data_dir;
use reviveai_infra::embedder::{EMBEDDING_MODEL_NAME, FastEmbedder};
use reviveai_infra::ingest::ingest_catalog;
use reviveai_infra::vector::{LanceCatalogStore, LanceVectorStore};

/// Load a carbon catalogue CSV into the LanceDB vector store.
///
/// Built standalone (no AppState) so ingestion works without any hosted
/// API keys configured.
pub async fn ingest(csv_path: &Path, json: bool) -> Result<()> {
    let data_dir = resolve_data_dir();
    tokio::fs::create_dir_all(&data_dir).await?;

    if !json {
        println!();
        println!(
            "  {} Ingesting {}",
            style("⏳").bold(),
            style(csv_path.display()).cyan()
        );
        println!(
            "  {}",
            style("Initializing embedding model (first run downloads weights)...").dim()
        );
    }

    let embedder = FastEmbedder::new()?;
    let lance = LanceVectorStore::new(data_dir.join("vector_store")).await?;
    let store = LanceCatalogStore::new(lance, EMBEDDING_MODEL_NAME);

    let summary = ingest_catalog(csv_path, &embedder, &store).await?;

    if json {
        let out = serde_json::json!({
            "total_rows": summary.total_rows,
            "ingested": summary.ingested,
            "skipped": summary.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Ingested {} of {} rows ({} skipped by cleaning)",
        style("✓").green(),
        style(summary.ingested).bold(),
        summary.total_rows,
        summary.skipped
    );
    println!();

    Ok(())
}
