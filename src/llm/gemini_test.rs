use super::*;
use crate::llm::schema::{Property, Schema};

fn listing_like_request() -> GenerateRequest {
    GenerateRequest {
        system: Some("You are a copywriter.".into()),
        parts: vec![
            Part::InlineImage { mime_type: "image/jpeg".into(), data: "Zm9v".into() },
            Part::Text("Analyze this image.".into()),
        ],
        schema_name: "listing".into(),
        schema: Schema::object(vec![Property::required("title", Schema::string())]),
    }
}

fn make_response(parts: serde_json::Value) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 40, "totalTokenCount": 160 },
        "modelVersion": "gemini-2.5-flash"
    })
    .to_string()
}

// =============================================================================
// build_body
// =============================================================================

#[test]
fn body_has_inline_image_then_text() {
    let req = listing_like_request();
    let body = serde_json::to_value(build_body(&req, 0.7, 1024)).unwrap();
    let parts = &body["contents"][0]["parts"];
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[0]["inlineData"]["data"], "Zm9v");
    assert_eq!(parts[1]["text"], "Analyze this image.");
}

#[test]
fn body_carries_system_instruction_and_json_mode() {
    let req = listing_like_request();
    let body = serde_json::to_value(build_body(&req, 0.7, 1024)).unwrap();
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a copywriter.");
    let config = &body["generationConfig"];
    assert_eq!(config["responseMimeType"], "application/json");
    assert_eq!(config["responseSchema"]["type"], "OBJECT");
    assert_eq!(config["maxOutputTokens"], 1024);
    let temperature = config["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
}

#[test]
fn body_omits_blank_system_instruction() {
    let mut req = listing_like_request();
    req.system = Some("   ".into());
    let body = serde_json::to_value(build_body(&req, 0.7, 1024)).unwrap();
    assert!(body.get("systemInstruction").is_none());

    req.system = None;
    let body = serde_json::to_value(build_body(&req, 0.7, 1024)).unwrap();
    assert!(body.get("systemInstruction").is_none());
}

// =============================================================================
// parse_response
// =============================================================================

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([{ "text": "{\"title\":\"Jaket\"}" }]));
    let resp = parse_response(&json, "requested").unwrap();
    assert_eq!(resp.text, "{\"title\":\"Jaket\"}");
    assert_eq!(resp.model, "gemini-2.5-flash");
    assert_eq!(resp.input_tokens, 120);
    assert_eq!(resp.output_tokens, 40);
}

#[test]
fn parse_concatenates_split_parts() {
    let json = make_response(serde_json::json!([{ "text": "{\"title\":" }, { "text": "\"Jaket\"}" }]));
    let resp = parse_response(&json, "m").unwrap();
    assert_eq!(resp.text, "{\"title\":\"Jaket\"}");
}

#[test]
fn parse_falls_back_to_requested_model_and_zero_usage() {
    let json = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": "[]" }] } }]
    })
    .to_string();
    let resp = parse_response(&json, "gemini-test").unwrap();
    assert_eq!(resp.model, "gemini-test");
    assert_eq!(resp.input_tokens, 0);
    assert_eq!(resp.output_tokens, 0);
}

#[test]
fn parse_no_candidates_is_empty_response() {
    let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    let err = parse_response(&json, "m").unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}

#[test]
fn parse_whitespace_text_is_empty_response() {
    let json = make_response(serde_json::json!([{ "text": "  \n" }]));
    assert!(matches!(parse_response(&json, "m").unwrap_err(), LlmError::EmptyResponse));
}

#[test]
fn parse_invalid_json() {
    let err = parse_response("not json", "m").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}
