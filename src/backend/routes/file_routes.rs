//! File routes under `/minio`, admin only.
//!
//! Uploads may be larger than axum's default body limit, up to
//! `MAX_UPLOAD_BYTES`.

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::backend::files::handlers::{delete_file, download_file, upload_file};
use crate::backend::middleware::require_admin;
use crate::backend::server::state::AppState;

pub const FILES_PREFIX: &str = "/minio";

pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub fn configure_file_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let files = Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/{file}", get(download_file).delete(delete_file))
        .route_layer(from_fn_with_state(app_state.clone(), require_admin));
    router.nest(FILES_PREFIX, files)
}
