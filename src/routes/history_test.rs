use super::*;
use crate::services::history::HistoryError;
use crate::services::listing::{ListingResult, ListingStyle};
use crate::state::test_helpers;

fn item(title: &str) -> HistoryItem {
    let result = ListingResult {
        photo_score: 9,
        photo_advice: "Great light".into(),
        title: title.into(),
        description: "Mint".into(),
        suggested_price: 50_000,
        hashtags: "#mint".into(),
    };
    HistoryItem::new(result, ListingStyle::Casual, "data:image/jpeg;base64,AA==".into(), None)
}

#[tokio::test]
async fn list_is_newest_first() {
    let state = test_helpers::test_app_state();
    let first = state.history.append(item("first")).await.unwrap();
    let second = state.history.append(item("second")).await.unwrap();

    let Json(items) = list_history(State(state)).await;
    assert_eq!(items, vec![second, first]);
}

#[tokio::test]
async fn delete_one_then_unknown_is_not_found() {
    let state = test_helpers::test_app_state();
    let stored = state.history.append(item("gone soon")).await.unwrap();

    let Json(ok) = delete_history_item(State(state.clone()), Path(stored.id.clone())).await.unwrap();
    assert_eq!(ok, json!({ "ok": true }));
    assert!(state.history.is_empty().await);

    let err = delete_history_item(State(state), Path(stored.id)).await.unwrap_err();
    assert!(matches!(err, ApiError::History(HistoryError::NotFound(_))));
}

#[tokio::test]
async fn clear_empties_history() {
    let state = test_helpers::test_app_state();
    state.history.append(item("a")).await.unwrap();
    state.history.append(item("b")).await.unwrap();

    let Json(ok) = clear_history(State(state.clone())).await.unwrap();
    assert_eq!(ok, json!({ "ok": true }));
    let Json(items) = list_history(State(state)).await;
    assert!(items.is_empty());
}
