//! Negotiation service: buyer message → three suggested seller replies.
//!
//! DESIGN
//! ======
//! Text-only generation with no system instruction. The model must return
//! exactly one reply per tone; anything else (a missing, repeated or unknown
//! tone, or an empty reply) is rejected as a whole. Replies are returned in
//! the fixed order Polite, Firm, Playful regardless of the order the model
//! used.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm::schema::{self, Property, Schema, SchemaError};
use crate::llm::types::{GenerateRequest, LlmError, Part};
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NegotiationTone {
    Polite,
    Firm,
    Playful,
}

impl NegotiationTone {
    /// Every tone, in response order.
    pub const ALL: [Self; 3] = [Self::Polite, Self::Firm, Self::Playful];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "Polite",
            Self::Firm => "Firm",
            Self::Playful => "Playful",
        }
    }
}

impl fmt::Display for NegotiationTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One suggested reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationResponse {
    #[serde(rename = "type")]
    pub tone: NegotiationTone,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    #[error("buyer message is empty")]
    EmptyMessage,
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("negotiation response is not JSON: {0}")]
    NotJson(String),
    #[error("negotiation response failed validation: {0}")]
    Invalid(#[from] SchemaError),
    #[error("negotiation response tones are not one of each: {0:?}")]
    ToneSet(Vec<NegotiationTone>),
    #[error("negotiation reply for {0} is empty")]
    EmptyReply(NegotiationTone),
}

impl crate::error::ErrorCode for NegotiationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "E_EMPTY_MESSAGE",
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Llm(_) | Self::NotJson(_) | Self::Invalid(_) | Self::ToneSet(_) | Self::EmptyReply(_) => {
                "E_GENERATION_FAILED"
            }
        }
    }

    fn retryable(&self) -> bool {
        !matches!(self, Self::EmptyMessage | Self::LlmNotConfigured)
    }
}

// =============================================================================
// PROMPT
// =============================================================================

#[must_use]
pub fn negotiation_schema() -> Schema {
    let tones = NegotiationTone::ALL.map(NegotiationTone::as_str);
    Schema::array(Schema::object(vec![
        Property::required("type", Schema::string_enum(tones).describe("Tone of the reply")),
        Property::required("text", Schema::string().describe("The reply to send to the buyer")),
    ]))
    .item_count(NegotiationTone::ALL.len(), NegotiationTone::ALL.len())
}

#[must_use]
pub fn prompt(message: &str) -> String {
    format!(
        "You are a seller on an online marketplace. A buyer sent you this message: \"{message}\". \
         Write three different replies you could send back: one Polite, one Firm, and one \
         Playful. Keep each reply short and natural, in the same language as the buyer. \
         Protect a fair price without losing the sale."
    )
}

#[must_use]
pub fn build_request(message: &str) -> GenerateRequest {
    GenerateRequest {
        system: None,
        parts: vec![Part::Text(prompt(message))],
        schema_name: "negotiation_replies".to_string(),
        schema: negotiation_schema(),
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// Validate a provider response into exactly one reply per tone, in
/// canonical order.
///
/// # Errors
///
/// Returns an error when `text` is not JSON, does not match the schema, does
/// not cover each tone exactly once, or has an empty reply.
pub fn parse_replies(text: &str) -> Result<Vec<NegotiationResponse>, NegotiationError> {
    let raw = schema::parse_document(text).map_err(|e| NegotiationError::NotJson(e.to_string()))?;
    let checked = negotiation_schema().validate(&raw)?;
    let mut replies: Vec<NegotiationResponse> =
        serde_json::from_value(checked).map_err(|e| NegotiationError::NotJson(e.to_string()))?;

    replies.sort_by_key(|reply| reply.tone);
    let tones: Vec<NegotiationTone> = replies.iter().map(|reply| reply.tone).collect();
    if tones != NegotiationTone::ALL {
        return Err(NegotiationError::ToneSet(tones));
    }
    if let Some(empty) = replies.iter().find(|reply| reply.text.trim().is_empty()) {
        return Err(NegotiationError::EmptyReply(empty.tone));
    }
    Ok(replies)
}

/// Draft three replies to `message`.
///
/// # Errors
///
/// Returns an error for a blank message, a missing LLM, a failed call, or a
/// response that does not validate.
pub async fn draft_replies(
    state: &AppState,
    message: &str,
) -> Result<Vec<NegotiationResponse>, NegotiationError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(NegotiationError::EmptyMessage);
    }
    let Some(llm) = &state.llm else {
        return Err(NegotiationError::LlmNotConfigured);
    };

    info!(message_len = message.len(), "negotiation: drafting replies");
    let response = llm.generate(&build_request(message)).await?;
    info!(
        model = %response.model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "negotiation: response received"
    );

    parse_replies(&response.text).inspect_err(|e| {
        warn!(error = %e, response_len = response.text.len(), "negotiation: rejected provider response");
    })
}

#[cfg(test)]
#[path = "negotiation_test.rs"]
mod tests;
