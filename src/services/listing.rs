//! Listing service: item photo → structured sales listing.
//!
//! DESIGN
//! ======
//! One structured generation call per photo. The tone selector only swaps
//! the system instruction; the response schema is the same for both tones.
//! The provider's JSON text is validated against [`listing_schema`] before it
//! becomes a [`ListingResult`], so callers see either a complete listing or
//! an error, never a partially-populated one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::image::ImageFile;
use crate::llm::schema::{self, Property, Schema, SchemaError};
use crate::llm::types::{GenerateRequest, LlmError, Part};
use crate::state::AppState;

pub const PHOTO_SCORE_MIN: i64 = 1;
pub const PHOTO_SCORE_MAX: i64 = 10;

const PERSONA: &str = "You are an expert e-commerce copywriter and professional reseller.";

const CASUAL_TONE: &str = "Write in a CASUAL, fun and energetic voice for Instagram and TikTok \
     shoppers. Use emojis, light slang and exclamation marks, as if a friend were recommending \
     the item.";

const FORMAL_TONE: &str = "Write in a FORMAL, professional and trustworthy voice for marketplaces \
     such as Tokopedia or LinkedIn. Be concise, factual and polite. Do not use emojis.";

const LISTING_TASK: &str = "Analyze this photo of a second-hand item and prepare a sales listing. \
     Rate the photo quality from 1 to 10 and give one concrete tip to make it sell better. \
     Write a catchy title and a persuasive description that covers the visible condition, brand, \
     material and color. Suggest a realistic resale price in Indonesian Rupiah as a whole number \
     with no separators. Finish with relevant hashtags separated by spaces.";

// =============================================================================
// TYPES
// =============================================================================

/// Voice of the generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStyle {
    #[default]
    Casual,
    Formal,
}

impl ListingStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Formal => "formal",
        }
    }
}

impl fmt::Display for ListingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "casual" => Ok(Self::Casual),
            "formal" => Ok(Self::Formal),
            other => Err(format!("unknown listing style: {other:?}")),
        }
    }
}

/// A generated listing. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResult {
    /// Photo quality, 1..=10.
    pub photo_score: u8,
    pub photo_advice: String,
    pub title: String,
    pub description: String,
    /// Whole Rupiah, never negative.
    pub suggested_price: i64,
    /// Space-separated hashtags.
    pub hashtags: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("listing response is not JSON: {0}")]
    NotJson(String),
    #[error("listing response failed validation: {0}")]
    Invalid(#[from] SchemaError),
}

impl crate::error::ErrorCode for ListingError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Llm(_) | Self::NotJson(_) | Self::Invalid(_) => "E_GENERATION_FAILED",
        }
    }

    fn retryable(&self) -> bool {
        !matches!(self, Self::LlmNotConfigured)
    }
}

// =============================================================================
// PROMPT
// =============================================================================

/// Response schema for one listing. Identical for every tone.
#[must_use]
pub fn listing_schema() -> Schema {
    Schema::object(vec![
        Property::required(
            "photo_score",
            Schema::integer()
                .range(Some(PHOTO_SCORE_MIN), Some(PHOTO_SCORE_MAX))
                .clamped()
                .describe("Photo quality from 1 (poor) to 10 (excellent)"),
        ),
        Property::required(
            "photo_advice",
            Schema::string().describe("One short, concrete tip to improve the photo"),
        ),
        Property::required("title", Schema::string().describe("Catchy listing title")),
        Property::required(
            "description",
            Schema::string().describe("Persuasive description of the item and its condition"),
        ),
        Property::required(
            "suggested_price",
            Schema::integer()
                .range(Some(0), None)
                .describe("Suggested resale price in Indonesian Rupiah"),
        ),
        Property::required(
            "hashtags",
            Schema::string().describe("Relevant hashtags separated by spaces"),
        ),
    ])
}

#[must_use]
pub fn system_instruction(style: ListingStyle) -> String {
    let tone = match style {
        ListingStyle::Casual => CASUAL_TONE,
        ListingStyle::Formal => FORMAL_TONE,
    };
    format!("{PERSONA} {tone}")
}

#[must_use]
pub fn build_request(image: &ImageFile, style: ListingStyle) -> GenerateRequest {
    GenerateRequest {
        system: Some(system_instruction(style)),
        parts: vec![
            Part::InlineImage { mime_type: image.mime_type.clone(), data: image.base64_data() },
            Part::Text(LISTING_TASK.to_string()),
        ],
        schema_name: "listing".to_string(),
        schema: listing_schema(),
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// Validate a provider response into a listing.
///
/// # Errors
///
/// Returns an error when `text` is not JSON or does not match the schema.
pub fn parse_listing(text: &str) -> Result<ListingResult, ListingError> {
    let raw = schema::parse_document(text).map_err(|e| ListingError::NotJson(e.to_string()))?;
    let checked = listing_schema().validate(&raw)?;
    serde_json::from_value(checked).map_err(|e| ListingError::NotJson(e.to_string()))
}

/// Generate a listing for `image` in the given tone.
///
/// # Errors
///
/// Returns an error when no LLM is configured, the call fails, or the
/// response does not validate.
pub async fn generate_listing(
    state: &AppState,
    image: &ImageFile,
    style: ListingStyle,
) -> Result<ListingResult, ListingError> {
    let Some(llm) = &state.llm else {
        return Err(ListingError::LlmNotConfigured);
    };

    info!(%style, mime = %image.mime_type, bytes = image.bytes.len(), "listing: generating");
    let request = build_request(image, style);
    let response = llm.generate(&request).await?;
    info!(
        model = %response.model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "listing: response received"
    );

    parse_listing(&response.text).inspect_err(|e| {
        warn!(error = %e, response_len = response.text.len(), "listing: rejected provider response");
    })
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
