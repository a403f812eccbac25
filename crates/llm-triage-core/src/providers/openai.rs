//! OpenAI-compatible chat completions provider
//!
//! Talks to `POST {base}/chat/completions` with function tools. Works with
//! any endpoint that speaks the same wire format (Azure proxies, local
//! gateways, vLLM, Ollama's `/v1`).

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, ChatResponse, Provider, ProviderModelConfig};
use crate::logging::Logger;
use crate::types::{ChatMessage, ContentPart, MessageContent, MessageRole, ToolCall, ToolDescriptor};

const PROVIDER_NAME: &str = "openai";

/// Provider for OpenAI-compatible endpoints
pub struct OpenAiProvider {
    client: reqwest::Client,
    timeout: Duration,
    logger: Arc<dyn Logger>,
}

impl OpenAiProvider {
    /// Create a provider whose requests give up after `timeout`
    pub fn new(timeout: Duration, logger: Arc<dyn Logger>) -> ProviderResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            timeout,
            logger,
        })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn default_api_base(&self) -> &str {
        "https://api.openai.com/v1"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &ProviderModelConfig,
        options: &ChatOptions,
    ) -> ProviderResult<ChatResponse> {
        let api_key = model
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::missing_api_key(PROVIDER_NAME))?;

        let url = format!(
            "{}/chat/completions",
            self.get_api_base(model).trim_end_matches('/')
        );
        let body = build_request_body(messages, &model.model, options);

        self.logger.debug(&format!(
            "[OpenAiProvider] chat: model={}, messages={}, tools={}",
            model.model,
            messages.len(),
            options.tools.len()
        ));

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;

        if let Some(err) = status_error(status, &text) {
            return Err(err);
        }

        let json: Value = serde_json::from_str(&text)?;
        let response = parse_response(&json)?;

        self.logger.debug(&format!(
            "[OpenAiProvider] finish_reason={:?}, tool_calls={}",
            response.finish_reason,
            response.tool_calls.len()
        ));

        Ok(response)
    }
}

impl OpenAiProvider {
    fn transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::timeout(PROVIDER_NAME, self.timeout.as_secs())
        } else {
            ProviderError::Http(e)
        }
    }
}

/// Map a non-success status to its error; `None` for 2xx
fn status_error(status: u16, body: &str) -> Option<ProviderError> {
    match status {
        200..=299 => None,
        429 => Some(ProviderError::rate_limited(PROVIDER_NAME, error_message(body))),
        _ => Some(ProviderError::api_error(PROVIDER_NAME, status, error_message(body))),
    }
}

/// Build the chat completions request body
pub fn build_request_body(messages: &[ChatMessage], model: &str, options: &ChatOptions) -> Value {
    let mut body = Map::new();
    body.insert("model".into(), Value::String(model.to_string()));
    body.insert(
        "messages".into(),
        Value::Array(messages.iter().flat_map(to_wire_messages).collect()),
    );

    if !options.tools.is_empty() {
        body.insert(
            "tools".into(),
            Value::Array(options.tools.iter().map(to_wire_tool).collect()),
        );
        body.insert("tool_choice".into(), json!(options.tool_choice.as_str()));
    }

    let sampling = &options.sampling;
    for (key, value) in [
        ("temperature", sampling.temperature),
        ("top_p", sampling.top_p),
        ("frequency_penalty", sampling.frequency_penalty),
        ("presence_penalty", sampling.presence_penalty),
    ] {
        if let Some(v) = value {
            body.insert(key.into(), json!(v));
        }
    }

    Value::Object(body)
}

/// One transcript message can expand to several wire messages: a tool
/// message holds one result per call, and the endpoint wants one each.
fn to_wire_messages(msg: &ChatMessage) -> Vec<Value> {
    match msg.role {
        MessageRole::Tool => tool_results_to_wire(msg),
        MessageRole::Assistant => vec![assistant_to_wire(msg)],
        role => vec![json!({
            "role": role.to_string(),
            "content": msg.joined_text(),
        })],
    }
}

fn assistant_to_wire(msg: &ChatMessage) -> Value {
    let text = msg.joined_text();
    let calls: Vec<Value> = msg
        .tool_calls()
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "type": "function",
                "function": { "name": c.name, "arguments": c.arguments },
            })
        })
        .collect();

    let mut obj = json!({ "role": "assistant" });
    obj["content"] = if text.is_empty() { Value::Null } else { Value::String(text) };
    if !calls.is_empty() {
        obj["tool_calls"] = Value::Array(calls);
    }
    obj
}

fn tool_results_to_wire(msg: &ChatMessage) -> Vec<Value> {
    match &msg.content {
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } => Some(json!({
                    "role": "tool",
                    "tool_call_id": tool_use_id,
                    "content": content,
                })),
                _ => None,
            })
            .collect(),
        MessageContent::Text(t) => vec![json!({ "role": "tool", "tool_call_id": "", "content": t })],
    }
}

fn to_wire_tool(tool: &ToolDescriptor) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema,
        }
    })
}

/// Parse a chat completions response body
pub fn parse_response(body: &Value) -> ProviderResult<ChatResponse> {
    let choice = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .ok_or_else(|| ProviderError::invalid_response(PROVIDER_NAME, "no choices in response"))?;

    let message = choice
        .get("message")
        .ok_or_else(|| ProviderError::invalid_response(PROVIDER_NAME, "no message in choice"))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| calls.iter().enumerate().map(parse_tool_call).collect())
        .unwrap_or_default();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .map(String::from);

    Ok(ChatResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

/// Every entry becomes a call, even a malformed one, so the runner reports
/// it back instead of mistaking the response for a final message.
fn parse_tool_call((index, value): (usize, &Value)) -> ToolCall {
    // Some local endpoints omit call ids
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("call_{}", index));
    let function = value.get("function");
    let name = function
        .and_then(|f| f.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    // Arguments stay raw; the registry decides whether they are valid.
    let arguments = match function.and_then(|f| f.get("arguments")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    ToolCall::new(id, name, arguments)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubServer;
    use crate::types::{SamplingParams, ToolChoice, ToolResult};

    fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(
            "closeIssue",
            "Close Issue",
            json!({"type": "object", "properties": {}, "additionalProperties": false}),
        )
    }

    #[test]
    fn test_request_body_basic() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("issue")];
        let body = build_request_body(&messages, "gpt-4o-mini", &ChatOptions::new());

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "sys"}));
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("tools").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_request_body_tools_and_sampling() {
        let options = ChatOptions::new()
            .with_tools(vec![descriptor()])
            .with_tool_choice(ToolChoice::Auto)
            .with_sampling(SamplingParams::new().with_temperature(0.0).with_top_p(0.5));
        let body = build_request_body(&[ChatMessage::user("x")], "m", &options);

        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "closeIssue");
        assert_eq!(body["tools"][0]["function"]["parameters"]["type"], "object");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["temperature"], json!(0.0));
        assert_eq!(body["top_p"], json!(0.5));
        assert!(body.get("frequency_penalty").is_none());
    }

    #[test]
    fn test_sampling_values_reach_the_wire_unchanged() {
        let options = ChatOptions::new().with_sampling(
            SamplingParams::new()
                .with_temperature(0.7)
                .with_frequency_penalty(-1.3)
                .with_presence_penalty(0.1),
        );
        let body = build_request_body(&[ChatMessage::user("x")], "m", &options);

        assert_eq!(body["temperature"].as_f64(), Some(0.7));
        assert_eq!(body["frequency_penalty"].as_f64(), Some(-1.3));
        assert_eq!(body["presence_penalty"].to_string(), "0.1");
    }

    #[test]
    fn test_request_body_pairs_calls_with_results() {
        let calls = vec![
            ToolCall::new("call_a", "commentIssue", r#"{"content":"hi"}"#),
            ToolCall::new("call_b", "closeIssue", r#"{"reason":"completed"}"#),
        ];
        let messages = vec![
            ChatMessage::assistant_with_calls(None, &calls),
            ChatMessage::tool_result(&ToolResult::success("call_a", "#1 commented: hi")),
            ChatMessage::tool_result(&ToolResult::error("call_b", "boom")),
        ];
        let body = build_request_body(&messages, "m", &ChatOptions::new());
        let wire = body["messages"].as_array().unwrap();

        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0]["content"], Value::Null);
        assert_eq!(wire[0]["tool_calls"][1]["id"], "call_b");
        assert_eq!(wire[0]["tool_calls"][0]["function"]["arguments"], r#"{"content":"hi"}"#);
        assert_eq!(wire[1], json!({"role": "tool", "tool_call_id": "call_a", "content": "#1 commented: hi"}));
        assert_eq!(wire[2]["tool_call_id"], "call_b");
    }

    #[test]
    fn test_parse_final_response() {
        let body = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "All done."},
                "finish_reason": "stop"
            }]
        });
        let resp = parse_response(&body).unwrap();
        assert!(resp.is_final());
        assert_eq!(resp.content.as_deref(), Some("All done."));
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_tool_calls_keeps_raw_arguments() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "c1", "type": "function", "function": {"name": "lockIssue", "arguments": "{\"reason\":\"spam\"}"}},
                        {"id": "c2", "type": "function", "function": {"name": "closeIssue", "arguments": "{not json"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let resp = parse_response(&body).unwrap();
        assert!(!resp.is_final());
        assert_eq!(resp.content, None);
        assert_eq!(resp.tool_calls[0], ToolCall::new("c1", "lockIssue", r#"{"reason":"spam"}"#));
        assert_eq!(resp.tool_calls[1].arguments, "{not json");
    }

    #[test]
    fn test_parse_keeps_calls_without_id_or_name() {
        let body = json!({
            "choices": [{
                "message": {
                    "tool_calls": [
                        {"type": "function", "function": {"name": "closeIssue", "arguments": "{\"reason\":\"completed\"}"}},
                        {"id": "", "type": "function", "function": {"arguments": "{}"}},
                        {"id": "c3", "type": "function"}
                    ]
                }
            }]
        });
        let resp = parse_response(&body).unwrap();

        assert!(!resp.is_final());
        assert_eq!(resp.tool_calls.len(), 3);
        assert_eq!(
            resp.tool_calls[0],
            ToolCall::new("call_0", "closeIssue", r#"{"reason":"completed"}"#)
        );
        assert_eq!(resp.tool_calls[1], ToolCall::new("call_1", "", "{}"));
        assert_eq!(resp.tool_calls[2], ToolCall::new("c3", "", ""));
    }

    #[test]
    fn test_status_classification() {
        assert!(status_error(200, "").is_none());
        assert!(status_error(204, "").is_none());
        assert!(matches!(
            status_error(429, r#"{"error":{"message":"slow down"}}"#),
            Some(ProviderError::RateLimited { ref message, .. }) if message == "slow down"
        ));
        assert!(matches!(
            status_error(401, r#"{"error":{"message":"Incorrect API key"}}"#),
            Some(ProviderError::ApiError { status: 401, ref message, .. }) if message == "Incorrect API key"
        ));
        assert!(matches!(
            status_error(502, "Bad Gateway"),
            Some(ProviderError::ApiError { status: 502, .. })
        ));
    }

    fn provider(timeout: Duration) -> OpenAiProvider {
        OpenAiProvider::new(timeout, Arc::new(crate::logging::NoOpLogger::new())).unwrap()
    }

    fn model_at(base: &str) -> ProviderModelConfig {
        ProviderModelConfig::new("m").with_api_key("sk-test").with_api_base(base)
    }

    #[tokio::test]
    async fn test_chat_round_trip_over_http() {
        let server = StubServer::start(vec![(
            200,
            json!({
                "choices": [{
                    "message": {"tool_calls": [{"id": "c1", "type": "function", "function": {"name": "lockIssue", "arguments": "{\"reason\":\"spam\"}"}}]},
                    "finish_reason": "tool_calls"
                }]
            })
            .to_string(),
        )])
        .await;

        let resp = provider(Duration::from_secs(5))
            .chat(&[ChatMessage::user("x")], &model_at(&server.base), &ChatOptions::new())
            .await
            .unwrap();

        assert_eq!(resp.tool_calls, vec![ToolCall::new("c1", "lockIssue", r#"{"reason":"spam"}"#)]);
        assert_eq!(server.requests(), vec!["POST /chat/completions HTTP/1.1".to_string()]);
    }

    #[tokio::test]
    async fn test_chat_maps_error_statuses() {
        let server = StubServer::start(vec![
            (429, r#"{"error":{"message":"Rate limit reached"}}"#.to_string()),
            (500, r#"{"error":{"message":"upstream failed"}}"#.to_string()),
        ])
        .await;
        let provider = provider(Duration::from_secs(5));
        let model = model_at(&server.base);
        let messages = [ChatMessage::user("x")];

        let err = provider.chat(&messages, &model, &ChatOptions::new()).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }), "{err:?}");

        let err = provider.chat(&messages, &model, &ChatOptions::new()).await.unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status: 500, .. }), "{err:?}");
        assert!(err.to_string().contains("upstream failed"));
    }

    #[tokio::test]
    async fn test_chat_timeout_maps_to_timeout() {
        let server = StubServer::silent().await;

        let err = provider(Duration::from_millis(200))
            .chat(&[ChatMessage::user("x")], &model_at(&server.base), &ChatOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Timeout { .. }), "{err:?}");
    }

    #[test]
    fn test_parse_missing_choices() {
        let err = parse_response(&json!({"error": "nope"})).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Incorrect API key"}}"#),
            "Incorrect API key"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let provider =
            OpenAiProvider::new(Duration::from_secs(1), Arc::new(crate::logging::NoOpLogger::new()))
                .unwrap();
        let err = provider
            .chat(&[ChatMessage::user("x")], &ProviderModelConfig::new("m"), &ChatOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey { .. }));
    }
}
