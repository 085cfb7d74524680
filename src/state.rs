//! Shared application state.
//!
//! DESIGN
//! ======
//! One `AppState` is built in `main` and cloned into every handler by axum.
//! Everything inside is either immutable config or already behind an `Arc`,
//! so cloning is cheap. The LLM is optional: without an API key the AI
//! routes answer 503 while history keeps working.

use std::sync::Arc;

use crate::inflight::InflightTracker;
use crate::llm::LlmGenerate;
use crate::services::history::HistoryStore;
use crate::services::image::ImageConfig;

#[derive(Clone)]
pub struct AppState {
    /// Optional LLM client. `None` if no API key is configured.
    pub llm: Option<Arc<dyn LlmGenerate>>,
    /// Past listings, newest first.
    pub history: Arc<HistoryStore>,
    /// One outstanding AI call per client and action.
    pub inflight: InflightTracker,
    pub image: ImageConfig,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmGenerate>>, history: HistoryStore, image: ImageConfig) -> Self {
        Self { llm, history: Arc::new(history), inflight: InflightTracker::new(), image }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
