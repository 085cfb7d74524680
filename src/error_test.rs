use super::*;
use crate::inflight::Action;
use crate::llm::types::LlmError;
use crate::store::StoreError;

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn generation_failures_share_one_public_message() {
    let errors: Vec<ApiError> = vec![
        ListingError::Llm(LlmError::ApiRequest("timeout".into())).into(),
        ListingError::NotJson("expected value".into()).into(),
        NegotiationError::ToneSet(vec![]).into(),
        NegotiationError::Llm(LlmError::EmptyResponse).into(),
    ];
    for err in errors {
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "E_GENERATION_FAILED");
        assert_eq!(err.public_message(), GENERATION_FAILED_MESSAGE);
    }
}

#[test]
fn request_errors_map_to_statuses() {
    let cases: Vec<(ApiError, StatusCode)> = vec![
        (ImageError::Unsupported.into(), StatusCode::BAD_REQUEST),
        (NegotiationError::EmptyMessage.into(), StatusCode::BAD_REQUEST),
        (ListingError::LlmNotConfigured.into(), StatusCode::SERVICE_UNAVAILABLE),
        (NegotiationError::LlmNotConfigured.into(), StatusCode::SERVICE_UNAVAILABLE),
        (InflightError::Busy { action: Action::Listing }.into(), StatusCode::CONFLICT),
        (HistoryError::NotFound("1".into()).into(), StatusCode::NOT_FOUND),
        (ApiError::BadRequest("bad style".into()), StatusCode::BAD_REQUEST),
        (ApiError::Internal("join".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
        assert_eq!(err.status(), status, "{err}");
    }
}

#[test]
fn body_rejections_keep_size_and_media_type_statuses() {
    let too_large = ApiError::rejected(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into());
    assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(too_large.error_code(), "E_BODY_TOO_LARGE");

    let media = ApiError::rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE, "expected application/json".into());
    assert_eq!(media.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(media.error_code(), "E_UNSUPPORTED_MEDIA_TYPE");

    let data = ApiError::rejected(StatusCode::UNPROCESSABLE_ENTITY, "missing field `message`".into());
    assert_eq!(data.status(), StatusCode::BAD_REQUEST);
    assert_eq!(data.error_code(), "E_BAD_REQUEST");
    assert_eq!(data.public_message(), "missing field `message`");
}

#[test]
fn storage_failure_hides_io_detail() {
    let store = StoreError::Io { key: "sellitfast_history".into(), source: std::io::Error::other("disk full") };
    let err = ApiError::from(HistoryError::from(store));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!err.public_message().contains("disk full"));
}

#[tokio::test]
async fn response_body_shape() {
    let response = ApiError::from(InflightError::Busy { action: Action::Negotiation }).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "E_REQUEST_IN_FLIGHT");
    assert_eq!(body["retryable"], true);
    assert!(body["message"].as_str().unwrap().contains("negotiation"));
}

#[tokio::test]
async fn generation_response_does_not_leak_provider_detail() {
    let err = ListingError::Llm(LlmError::ApiResponse { status: 401, body: "API key invalid".into() });
    let body = body_json(ApiError::from(err).into_response()).await;
    assert_eq!(body["error"], "E_GENERATION_FAILED");
    assert_eq!(body["message"], GENERATION_FAILED_MESSAGE);
    assert!(!body.to_string().contains("API key invalid"));
}
