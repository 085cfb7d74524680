use std::collections::VecDeque;
use std::sync::Mutex;

use super::*;
use crate::llm::types::{GenerateRequest, GenerateResponse, LlmError};
use crate::store::MemoryKvStore;

/// Scripted LLM. Pops one queued reply per call and records every request.
#[derive(Default)]
pub struct MockLlm {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockLlm {
    #[must_use]
    pub fn replying(texts: &[&str]) -> Self {
        let mock = Self::default();
        for text in texts {
            mock.push(Ok((*text).to_string()));
        }
        mock
    }

    #[must_use]
    pub fn failing(error: LlmError) -> Self {
        let mock = Self::default();
        mock.push(Err(error));
        mock
    }

    pub fn push(&self, reply: Result<String, LlmError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    #[must_use]
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmGenerate for MockLlm {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse));
        reply.map(|text| GenerateResponse { text, model: "mock".into(), input_tokens: 0, output_tokens: 0 })
    }
}

/// Create a test `AppState` with no LLM and an empty in-memory history.
#[must_use]
pub fn test_app_state() -> AppState {
    AppState::new(None, HistoryStore::empty(Arc::new(MemoryKvStore::default())), ImageConfig::default())
}

/// Create a test `AppState` with a mock LLM.
#[must_use]
pub fn test_app_state_with_llm(llm: Arc<dyn LlmGenerate>) -> AppState {
    AppState::new(Some(llm), HistoryStore::empty(Arc::new(MemoryKvStore::default())), ImageConfig::default())
}

/// A canned listing response as the provider would send it.
#[must_use]
pub fn listing_json() -> String {
    serde_json::json!({
        "photo_score": 7,
        "photo_advice": "Shoot near a window for softer light.",
        "title": "Vintage Denim Jacket",
        "description": "Classic blue denim, size M, barely worn.",
        "suggested_price": 175_000,
        "hashtags": "#denim #preloved #thrift"
    })
    .to_string()
}

/// A small valid PNG.
#[must_use]
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 120, 200]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
