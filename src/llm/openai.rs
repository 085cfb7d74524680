//! OpenAI-compatible chat completions client.
//!
//! Uses `/chat/completions` with `response_format: json_schema` (strict).
//! Strict mode requires an object at the top level, so array schemas are
//! wrapped in `{ "items": [...] }` on the way out and unwrapped on the way in.

use serde::Serialize;
use serde_json::{Value, json};

use super::config::LlmConfig;
use super::gemini::build_http;
use super::types::{GenerateRequest, GenerateResponse, LlmError, Part};

const WRAPPED_FIELD: &str = "items";

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            http: build_http(config.timeouts)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    pub async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let body = build_body(model, request, self.temperature, self.max_output_tokens);
        let text = self.send_json("/chat/completions", &body).await?;
        let mut response = parse_chat_completions_response(&text)?;
        if !request.schema.is_object() {
            response.text = unwrap_items(&response.text)?;
        }
        Ok(response)
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

// =============================================================================
// CHAT COMPLETIONS: wire types
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<CcMessage>,
    response_format: Value,
}

#[derive(Serialize)]
struct CcMessage {
    role: &'static str,
    content: Value,
}

fn build_body<'a>(
    model: &'a str,
    request: &GenerateRequest,
    temperature: f32,
    max_output_tokens: u32,
) -> CcRequest<'a> {
    let mut messages = Vec::new();
    if let Some(system) = request.system.as_deref().filter(|s| !s.trim().is_empty()) {
        messages.push(CcMessage { role: "system", content: Value::from(system) });
    }

    let content: Vec<Value> = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "type": "text", "text": text }),
            Part::InlineImage { mime_type, data } => json!({
                "type": "image_url",
                "image_url": { "url": format!("data:{mime_type};base64,{data}") }
            }),
        })
        .collect();
    messages.push(CcMessage { role: "user", content: Value::Array(content) });

    let schema = if request.schema.is_object() {
        request.schema.to_json_schema()
    } else {
        json!({
            "type": "object",
            "properties": { WRAPPED_FIELD: request.schema.to_json_schema() },
            "required": [WRAPPED_FIELD],
            "additionalProperties": false
        })
    };

    CcRequest {
        model,
        max_tokens: max_output_tokens,
        temperature,
        messages,
        response_format: json!({
            "type": "json_schema",
            "json_schema": { "name": request.schema_name, "schema": schema, "strict": true }
        }),
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<GenerateResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let model = root
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    let prompt_tokens = root
        .get("usage")
        .and_then(|u| u.get("prompt_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let completion_tokens = root
        .get("usage")
        .and_then(|u| u.get("completion_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };

    let text = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(GenerateResponse {
        text: text.to_string(),
        model,
        input_tokens: prompt_tokens,
        output_tokens: completion_tokens,
    })
}

fn unwrap_items(text: &str) -> Result<String, LlmError> {
    let root: Value = serde_json::from_str(text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    root.get(WRAPPED_FIELD)
        .map(Value::to_string)
        .ok_or_else(|| LlmError::ApiParse(format!("structured output missing '{WRAPPED_FIELD}' wrapper")))
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
