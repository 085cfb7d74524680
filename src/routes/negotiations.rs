//! Negotiation route: buyer message in, three tagged replies out.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use serde::Deserialize;

use super::client_id;
use crate::error::ApiError;
use crate::inflight::Action;
use crate::services::negotiation::{self, NegotiationResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NegotiationBody {
    pub message: String,
}

/// `POST /api/negotiations`
pub async fn create_negotiation(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NegotiationBody>, JsonRejection>,
) -> Result<Json<Vec<NegotiationResponse>>, ApiError> {
    let Json(body) = body?;
    let _permit = state.inflight.try_begin(&client_id(&headers), Action::Negotiation)?;
    let replies = negotiation::draft_replies(&state, &body.message).await?;
    Ok(Json(replies))
}

#[cfg(test)]
#[path = "negotiations_test.rs"]
mod tests;
