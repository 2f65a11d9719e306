//! OpenAI-compatible provider
//!
//! Turns are mapped onto chat-completion messages: each `ToolCall` turn
//! becomes an assistant message carrying `tool_calls`, each observation a
//! `tool` message with the matching `tool_call_id`. Models that answer with a
//! `<tool_call>{"name": .., "arguments": ..}</tool_call>` block in plain
//! content are understood as well.

use async_trait::async_trait;
use netops_core::{Error, Result, ToolCall, Turn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::provider::{ChatModel, ChatRequest, LlmResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::internal(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Value>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiToolCallFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCallFunction {
    name: String,
    arguments: String,
}

/// Chat-completion messages for a request
fn to_messages(request: &ChatRequest) -> Vec<Value> {
    let mut messages = Vec::with_capacity(request.turns.len() + 1);
    if let Some(system) = &request.system {
        messages.push(json!({ "role": "system", "content": system }));
    }

    for turn in &request.turns {
        let message = match turn {
            Turn::User { text } => json!({ "role": "user", "content": text }),
            Turn::Assistant { text } => json!({ "role": "assistant", "content": text }),
            Turn::ToolCall { call } => json!({
                "role": "assistant",
                "content": Value::Null,
                "tool_calls": [{
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": encode_arguments(&call.arguments),
                    }
                }]
            }),
            Turn::ToolObservation {
                call_id, content, ..
            } => json!({
                "role": "tool",
                "tool_call_id": call_id,
                "content": content,
            }),
        };
        messages.push(message);
    }
    messages
}

/// Arguments travel as a JSON-encoded string; a raw string is sent unchanged
fn encode_arguments(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Decode the arguments string. Text that is not JSON is kept as a string so
/// the dispatcher can reject it explicitly.
fn decode_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parse a `<tool_call>` block out of plain content
fn parse_content_tool_call(content: &str) -> Option<ToolCall> {
    const OPEN: &str = "<tool_call>";
    const CLOSE: &str = "</tool_call>";

    let start = content.find(OPEN)? + OPEN.len();
    let end = start + content[start..].find(CLOSE)?;
    let data: Value = serde_json::from_str(content[start..end].trim()).ok()?;
    let name = data.get("name")?.as_str()?;
    let arguments = data.get("arguments").cloned().unwrap_or_else(|| json!({}));
    Some(ToolCall::new(name, arguments))
}

fn parse_response(body: &str) -> Result<LlmResponse> {
    let parsed: OpenAiResponse = serde_json::from_str(body).map_err(|e| {
        Error::upstream(format!(
            "invalid chat completion response: {} - {}",
            e,
            truncate(body, 200)
        ))
    })?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::upstream("chat completion returned no choices"))?;

    let tool_calls = choice.message.tool_calls.unwrap_or_default();
    if !tool_calls.is_empty() {
        let calls: Vec<ToolCall> = tool_calls
            .into_iter()
            .map(|tc| {
                ToolCall::with_id(tc.id, tc.function.name, decode_arguments(&tc.function.arguments))
            })
            .collect();
        debug!(
            "Model requested {} tool calls: {:?}",
            calls.len(),
            calls.iter().map(|c| &c.name).collect::<Vec<_>>()
        );
        return Ok(LlmResponse::ToolCalls(calls));
    }

    let content = choice.message.content.unwrap_or_default();
    if let Some(call) = parse_content_tool_call(&content) {
        debug!("Parsed tool call from content: {}", call.name);
        return Ok(LlmResponse::ToolCalls(vec![call]));
    }
    Ok(LlmResponse::Content(content))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl ChatModel for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<LlmResponse> {
        let tools: Vec<Value> = request.tools.iter().map(|t| t.to_openai_format()).collect();
        let body = OpenAiRequest {
            model: request.model.to_string(),
            messages: to_messages(request),
            temperature: request.temperature,
            tool_choice: if tools.is_empty() { None } else { Some("auto") },
            tools,
        };

        debug!(
            model = %request.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("HTTP error: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::upstream(format!("failed to read response: {}", e)))?;
        if !status.is_success() {
            return Err(Error::upstream(format!(
                "chat completion API error {}: {}",
                status,
                truncate(&text, 500)
            )));
        }

        debug!("Model response: {}", truncate(&text, 500));
        parse_response(&text)
    }
}
