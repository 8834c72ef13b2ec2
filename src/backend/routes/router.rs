/**
 * Router Configuration
 *
 * Combines all route groups into one Axum router.
 *
 * # Route Order
 *
 * 1. Realtime routes (`/ws`, `/update/user`)
 * 2. Management API under `/coroutine` and `/reactive`
 * 3. File storage under `/minio`
 * 4. `/health`
 * 5. JSON 404 fallback
 *
 * Every request gets a tower-http trace span. CORS is permissive.
 */

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "ssr")]
use crate::backend::error::BackendError;
#[cfg(feature = "ssr")]
use crate::backend::routes::api_routes::configure_api_routes;
#[cfg(feature = "ssr")]
use crate::backend::routes::chat_routes::configure_chat_routes;
#[cfg(feature = "ssr")]
use crate::backend::routes::file_routes::configure_file_routes;
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;

/// Liveness check
async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

async fn not_found() -> BackendError {
    BackendError::handler(StatusCode::NOT_FOUND, "No route found")
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - services, chat registry, SSE emitter and auth settings
#[cfg(feature = "ssr")]
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_chat_routes(Router::new(), &app_state);
    let router = configure_api_routes(router, &app_state);
    let router = configure_file_routes(router, &app_state);

    router
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
