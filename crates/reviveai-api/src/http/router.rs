//! Axum router configuration with middleware.
//!
//! Combined listing routes live under `/combined_service/`, single-stage
//! routes under `/service/`. Middleware: CORS (allow-any, the dashboard is
//! served from another origin in development) and request tracing.
//!
//! If a built dashboard exists on disk (`REVIVEAI_WEB_DIR`, default
//! `ui/dist`), it is served as static files; API routes take priority.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let combined_routes = Router::new()
        .route("/online_sale", post(handlers::combined::online_sale))
        .route(
            "/online_sale_stream",
            post(handlers::combined::online_sale_stream),
        )
        .route("/selling_post", post(handlers::combined::selling_post))
        .route("/seeking_post", post(handlers::combined::seeking_post));

    let service_routes = Router::new()
        .route("/image_service", post(handlers::single::image_service))
        .route("/content_service", post(handlers::single::content_service))
        .route("/search_agent", post(handlers::single::search_agent))
        .route("/calculate_carbon", post(handlers::single::calculate_carbon))
        .route("/remake_image", post(handlers::single::remake_image))
        .route("/seeking_image", post(handlers::single::seeking_image));

    let mut router = Router::new()
        .nest("/combined_service", combined_routes)
        .nest("/service", service_routes)
        .route("/health", get(health_check))
        // Uploads are capped at 10MB in the multipart reader; leave headroom
        // for the multipart framing itself.
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve a built dashboard from disk if the directory exists.
    let web_dir = std::env::var("REVIVEAI_WEB_DIR").unwrap_or_else(|_| "ui/dist".to_string());
    if std::path::Path::new(&web_dir).exists() {
        router = router.fallback_service(ServeDir::new(&web_dir));
        tracing::info!(path = %web_dir, "dashboard static file serving enabled");
    }

    router
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
