//! Single-service endpoints under `/service`.
//!
//! Each endpoint exposes one pipeline stage on its own: image analysis,
//! content optimization, web research, carbon calculation, and the two
//! image-studio operations. Produced images are written under
//! `{data_dir}/media/` and returned as paths.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use reviveai_types::carbon::CarbonFootprint;
use reviveai_types::listing::{ContentStyle, ListingContent};

use crate::http::error::AppError;
use crate::http::handlers::upload::ListingForm;
use crate::http::response::ApiResponse;
use crate::state::{AppState, ConcreteImageStudio};

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub description: String,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductSearchRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct CarbonCalculationRequest {
    pub product_description: String,
}

#[derive(Debug, Deserialize)]
pub struct SeekingImageRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisData {
    pub analysis: String,
}

#[derive(Debug, Serialize)]
pub struct SearchData {
    pub search_results: String,
}

#[derive(Debug, Serialize)]
pub struct ImagePathData {
    pub image_path: String,
}

/// POST /service/image_service -- analyze a product photo.
pub async fn image_service(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<AnalysisData>, AppError> {
    let form = ListingForm::read(multipart).await?;
    let image = form.require_image()?;

    info!(bytes = image.bytes.len(), "image analysis request");

    let analysis = state.vision.analyze(&image.bytes, &image.media_type).await?;
    Ok(ApiResponse::success(AnalysisData { analysis }))
}

/// POST /service/content_service -- optimize a product description.
pub async fn content_service(
    State(state): State<AppState>,
    Json(request): Json<ContentRequest>,
) -> Result<ApiResponse<ListingContent>, AppError> {
    let style = ContentStyle::from_param(request.style.as_deref().unwrap_or("normal"));

    info!(style = %style, "content optimization request");

    let content = state.content.generate(&request.description, style).await?;
    Ok(ApiResponse::success(content))
}

/// POST /service/search_agent -- research a product on the web.
pub async fn search_agent(
    State(state): State<AppState>,
    Json(request): Json<ProductSearchRequest>,
) -> Result<ApiResponse<SearchData>, AppError> {
    info!(query = %request.query, "search agent request");

    let report = state.search_agent.research(&request.query).await?;
    Ok(ApiResponse::success(SearchData {
        search_results: report.text,
    }))
}

/// POST /service/calculate_carbon -- estimate carbon savings.
pub async fn calculate_carbon(
    State(state): State<AppState>,
    Json(request): Json<CarbonCalculationRequest>,
) -> Result<ApiResponse<CarbonFootprint>, AppError> {
    info!("carbon calculation request");

    let result = state.carbon.calculate(&request.product_description).await?;
    Ok(ApiResponse::success(result))
}

/// POST /service/remake_image -- re-render a product photo on a
/// sustainability-themed background.
pub async fn remake_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<ImagePathData>, AppError> {
    let studio = require_studio(&state)?;
    let form = ListingForm::read(multipart).await?;
    let image = form.require_image()?;

    info!(bytes = image.bytes.len(), "image remake request");

    let produced = studio
        .remake_product_image(&image.bytes, &image.media_type)
        .await?;
    let path = save_media(&state, "remade", &produced).await?;

    Ok(ApiResponse::success(ImagePathData {
        image_path: path.display().to_string(),
    }))
}

/// POST /service/seeking_image -- generate a reference photo for a
/// seeking post.
pub async fn seeking_image(
    State(state): State<AppState>,
    Json(request): Json<SeekingImageRequest>,
) -> Result<ApiResponse<ImagePathData>, AppError> {
    let studio = require_studio(&state)?;

    info!("seeking image request");

    let produced = studio.create_seeking_image(&request.description).await?;
    let path = save_media(&state, "seeking", &produced).await?;

    Ok(ApiResponse::success(ImagePathData {
        image_path: path.display().to_string(),
    }))
}

fn require_studio(state: &AppState) -> Result<Arc<ConcreteImageStudio>, AppError> {
    state.image_studio.clone().ok_or_else(|| {
        AppError::NotConfigured(
            "image generation requires the GOOGLE_API_KEY environment variable".to_string(),
        )
    })
}

/// Write produced image bytes under `{data_dir}/media/` with a UUID name.
async fn save_media(state: &AppState, prefix: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
    let media_dir = state.data_dir.join("media");
    tokio::fs::create_dir_all(&media_dir)
        .await
        .map_err(|e| AppError::Internal(format!("failed to create media dir: {e}")))?;

    let path = media_dir.join(format!("{prefix}_{}.png", Uuid::new_v4()));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write image: {e}")))?;

    Ok(path)
}
