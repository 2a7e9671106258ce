//! Application route configuration.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{Json, Redirect},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::handlers::{brand_routes, category_routes, product_routes, user_routes};
use super::view::render_views;
use super::AppState;
use crate::config::PRODUCT_IMAGE_URL_PREFIX;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/brands", brand_routes())
        .nest("/categories", category_routes())
        .nest("/users", user_routes())
        // Uploaded product images
        .nest_service(PRODUCT_IMAGE_URL_PREFIX, ServeDir::new(&state.upload_dir))
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), render_views))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The product list is the landing page
async fn root() -> Redirect {
    Redirect::to("/products")
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let result = match &state.database {
        Some(database) => database.ping().await.map_err(|e| e.to_string()),
        None => Err("no database configured".to_string()),
    };

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                error: None,
            }),
        ),
        Err(error) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                error: Some(error),
            }),
        ),
    }
}
