//! LLM types: provider-neutral request/response types and errors.
//!
//! Shared by the Gemini and `OpenAI` clients. Every call this service makes
//! is a single-shot structured generation: one system instruction, one user
//! turn (text and optionally an inline image) and a response schema.

use super::schema::Schema;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider answered but produced no text to parse.
    #[error("API response contained no text")]
    EmptyResponse,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// One piece of user content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Plain instruction text.
    Text(String),
    /// An image sent inline. `data` is bare base64 with no data-URI prefix.
    InlineImage { mime_type: String, data: String },
}

/// A structured generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// System instruction, if any. Text-only prompts may leave this empty.
    pub system: Option<String>,
    /// User turn content, in order.
    pub parts: Vec<Part>,
    /// Short identifier for the schema (used by providers that name schemas).
    pub schema_name: String,
    /// Shape the provider is asked to produce.
    pub schema: Schema,
}

impl GenerateRequest {
    /// Iterate the text parts of the user turn.
    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            Part::Text(text) => Some(text.as_str()),
            Part::InlineImage { .. } => None,
        })
    }

    /// First inline image of the user turn, if any.
    #[cfg(test)]
    #[must_use]
    pub fn image(&self) -> Option<(&str, &str)> {
        self.parts.iter().find_map(|p| match p {
            Part::InlineImage { mime_type, data } => Some((mime_type.as_str(), data.as_str())),
            Part::Text(_) => None,
        })
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Response from a structured generation call. `text` is the raw JSON
/// document produced by the model; callers validate it against the schema.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub text: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// LLM GENERATE TRAIT
// =============================================================================

/// Provider-neutral async trait for structured generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmGenerate: Send + Sync {
    /// Send a generation request to the LLM provider.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the response is malformed,
    /// or the response carries no text.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
