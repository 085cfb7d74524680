use super::*;
use crate::inflight::Action;

#[tokio::test]
async fn test_state_starts_without_llm_and_empty_history() {
    let state = test_helpers::test_app_state();
    assert!(state.llm.is_none());
    assert!(state.history.is_empty().await);
    assert_eq!(state.image, ImageConfig::default());
}

#[tokio::test]
async fn clones_share_history_and_inflight() {
    let state = test_helpers::test_app_state();
    let clone = state.clone();

    let _permit = state.inflight.try_begin("alice", Action::Listing).unwrap();
    assert!(clone.inflight.is_active("alice", Action::Listing));
    assert!(Arc::ptr_eq(&state.history, &clone.history));
}

#[tokio::test]
async fn mock_llm_replays_in_order_then_runs_dry() {
    use crate::llm::schema::Schema;
    use crate::llm::types::{GenerateRequest, LlmError};

    let mock = test_helpers::MockLlm::replying(&["one", "two"]);
    let request = GenerateRequest {
        system: None,
        parts: vec![],
        schema_name: "probe".into(),
        schema: Schema::string(),
    };
    assert_eq!(mock.generate(&request).await.unwrap().text, "one");
    assert_eq!(mock.generate(&request).await.unwrap().text, "two");
    assert!(matches!(mock.generate(&request).await, Err(LlmError::EmptyResponse)));
    assert_eq!(mock.requests().len(), 3);
}
