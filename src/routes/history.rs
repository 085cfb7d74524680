//! History routes: list, delete one, clear all.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::services::history::HistoryItem;
use crate::state::AppState;

/// `GET /api/history`, newest first.
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryItem>> {
    Json(state.history.list().await)
}

/// `DELETE /api/history`
pub async fn clear_history(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.history.clear().await?;
    Ok(Json(json!({ "ok": true })))
}

/// `DELETE /api/history/{id}`
pub async fn delete_history_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.history.delete(&id).await?;
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
