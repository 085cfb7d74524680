//! Listing routes: photo in, listing plus history entry out.
//!
//! Two front doors share one pipeline: JSON with a base64 or data-URI image,
//! and multipart with the raw file. Both validate the photo, claim the
//! per-client slot, shrink the image, generate, and record the result in
//! history before answering.

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::client_id;
use crate::error::ApiError;
use crate::inflight::Action;
use crate::services::history::HistoryItem;
use crate::services::image::{self, ImageFile};
use crate::services::listing::{self, ListingError, ListingStyle};
use crate::services::pricing;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingBody {
    /// Data URI or bare base64.
    pub image: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub modal_price: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub item: HistoryItem,
    pub copy_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit: Option<i64>,
}

/// `POST /api/listings`
pub async fn create_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateListingBody>, JsonRejection>,
) -> Result<Json<ListingResponse>, ApiError> {
    let Json(body) = body?;
    let style = parse_style(body.style.as_deref())?;
    let modal_price = check_modal_price(body.modal_price)?;
    let image = ImageFile::from_encoded(&body.image)?;

    run_listing(&state, &client_id(&headers), image, style, modal_price)
        .await
        .map(Json)
}

/// `POST /api/listings/upload` with fields `image`, `style`, `modalPrice`.
pub async fn upload_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ListingResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut image = None;
    let mut style = None;
    let mut modal_price = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let declared = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                debug!(declared = ?declared, bytes = bytes.len(), "listings: received upload");
                image = Some(ImageFile::from_bytes(bytes.to_vec())?);
            }
            "style" => style = Some(field.text().await?),
            "modalPrice" => modal_price = parse_modal_price(&field.text().await?)?,
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("missing image field".into()))?;
    let style = parse_style(style.as_deref())?;
    let modal_price = check_modal_price(modal_price)?;

    run_listing(&state, &client_id(&headers), image, style, modal_price)
        .await
        .map(Json)
}

async fn run_listing(
    state: &AppState,
    client_id: &str,
    image: ImageFile,
    style: ListingStyle,
    modal_price: Option<i64>,
) -> Result<ListingResponse, ApiError> {
    if state.llm.is_none() {
        return Err(ListingError::LlmNotConfigured.into());
    }
    let _permit = state.inflight.try_begin(client_id, Action::Listing)?;

    let config = state.image;
    let prepared = tokio::task::spawn_blocking(move || image::prepare(image, &config))
        .await
        .map_err(|e| ApiError::Internal(format!("image preparation task: {e}")))?;
    info!(
        client_id,
        %style,
        mime = %prepared.upload.mime_type,
        resized = prepared.resized,
        "listings: image ready"
    );

    let result = listing::generate_listing(state, &prepared.upload, style).await?;
    let copy_text = pricing::copy_text(&result);
    let profit = pricing::profit(result.suggested_price, modal_price);

    let item = HistoryItem::new(result, style, prepared.thumbnail_data_uri, modal_price);
    let item = state.history.append(item).await?;
    info!(client_id, id = %item.id, "listings: listing created");

    Ok(ListingResponse { item, copy_text, profit })
}

/// Missing or blank means casual.
pub(crate) fn parse_style(raw: Option<&str>) -> Result<ListingStyle, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(ListingStyle::default()),
        Some(value) => value.parse().map_err(ApiError::BadRequest),
    }
}

/// Parse a multipart `modalPrice`. Blank means none.
pub(crate) fn parse_modal_price(raw: &str) -> Result<Option<i64>, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("modalPrice must be a whole number, got {trimmed:?}")))
}

fn check_modal_price(modal_price: Option<i64>) -> Result<Option<i64>, ApiError> {
    match modal_price {
        Some(price) if price < 0 => Err(ApiError::BadRequest("modalPrice must not be negative".into())),
        other => Ok(other),
    }
}

#[cfg(test)]
#[path = "listings_test.rs"]
mod tests;
