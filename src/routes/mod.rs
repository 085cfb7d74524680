//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API under `/api`, a health probe, and the static page files as the
//! fallback. Handlers translate HTTP into service calls; every failure goes
//! out through [`crate::error::ApiError`].

pub mod history;
pub mod listings;
pub mod negotiations;

use std::path::Path;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Header carrying the caller's identity for the in-flight guard.
pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// Large enough for a full-resolution phone photo sent as base64 JSON.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

const MAX_CLIENT_ID_LEN: usize = 128;

fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/listings", post(listings::create_listing))
        .route("/api/listings/upload", post(listings::upload_listing))
        .route("/api/negotiations", post(negotiations::create_negotiation))
        .route("/api/history", get(history::list_history).delete(history::clear_history))
        .route("/api/history/{id}", delete(history::delete_history_item))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes plus the page files in `web_dir` at `/`.
pub fn app(state: AppState, web_dir: &Path) -> Router {
    let pages = ServeDir::new(web_dir).append_index_html_on_directories(true);
    api_routes(state).fallback_service(pages)
}

/// Caller identity from [`CLIENT_ID_HEADER`], or [`ANONYMOUS_CLIENT`].
pub(crate) fn client_id(headers: &HeaderMap) -> String {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| ANONYMOUS_CLIENT.to_string(), |v| v.chars().take(MAX_CLIENT_ID_LEN).collect())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
