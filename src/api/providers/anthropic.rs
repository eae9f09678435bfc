//! Anthropic-compatible `/messages` wire format.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{split_system, truthy_f64, truthy_u32, ChatProviderAdapter, NativeMessages};
use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ApiError;
use crate::types::{ChatOutput, Message, Role, ToolCall, ToolDefinition, ToolResult};

/// `max_tokens` is mandatory for this provider.
const DEFAULT_MAX_TOKENS: u32 = 2000;
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicAdapter;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
    id: String,
    name: String,
    input: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StreamEvent {
    delta: Option<StreamDelta>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StreamDelta {
    text: Option<String>,
}

impl ChatProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn native_messages(&self, messages: &[Message]) -> NativeMessages {
        let (system, rest) = split_system(messages);
        let mut native = Vec::with_capacity(rest.len());
        for message in rest {
            match message.role {
                Role::Tool => push_tool_result(
                    &mut native,
                    json!({
                        "type": "tool_result",
                        "tool_use_id": message.tool_call_id.as_deref().unwrap_or_default(),
                        "content": message.content_str(),
                    }),
                ),
                Role::Assistant if message.tool_calls.is_some() => {
                    native.push(assistant_tool_use_turn(message));
                }
                _ => native.push(json!({
                    "role": message.role.as_str(),
                    "content": message.content_str(),
                })),
            }
        }
        NativeMessages {
            system,
            messages: native,
        }
    }

    fn build_body(
        &self,
        native: &NativeMessages,
        tools: &[ToolDefinition],
        config: &ProviderConfig,
        stream: bool,
    ) -> Value {
        let mut body = Map::new();
        body.insert("model".into(), json!(config.model));
        body.insert(
            "max_tokens".into(),
            json!(truthy_u32(config.max_tokens).unwrap_or(DEFAULT_MAX_TOKENS)),
        );
        body.insert("messages".into(), Value::Array(native.messages.clone()));
        if let Some(system) = &native.system {
            body.insert("system".into(), json!(system));
        }
        if let Some(temperature) = truthy_f64(config.temperature) {
            body.insert("temperature".into(), json!(temperature));
        }
        if let Some(top_p) = truthy_f64(config.top_p) {
            body.insert("top_p".into(), json!(top_p));
        }
        if stream {
            body.insert("stream".into(), json!(true));
        }
        if !tools.is_empty() {
            let tools = tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": tool.parameters,
                    })
                })
                .collect();
            body.insert("tools".into(), Value::Array(tools));
        }
        Value::Object(body)
    }

    fn parse_response(&self, raw: &Value) -> Result<ChatOutput, ApiError> {
        let response = MessagesResponse::deserialize(raw).unwrap_or_default();
        let calls: Vec<ToolCall> = response
            .content
            .iter()
            .filter(|block| block.kind == "tool_use")
            .map(|block| {
                let args = match &block.input {
                    Some(Value::Object(map)) => map.clone(),
                    _ => Map::new(),
                };
                ToolCall::new(block.id.clone(), block.name.clone(), args)
            })
            .collect();
        if !calls.is_empty() {
            return Ok(ChatOutput::ToolCalls(calls));
        }

        let text = response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .unwrap_or_default();
        Ok(ChatOutput::Text(text))
    }

    fn append_tool_results(
        &self,
        sent: &[Value],
        raw: &Value,
        results: &[ToolResult],
    ) -> Vec<Value> {
        let content = raw
            .get("content")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));

        let mut messages = sent.to_vec();
        messages.push(json!({"role": "assistant", "content": content}));
        let blocks: Vec<Value> = results
            .iter()
            .map(|result| {
                json!({
                    "type": "tool_result",
                    "tool_use_id": result.id,
                    "content": result.result,
                })
            })
            .collect();
        messages.push(json!({"role": "user", "content": blocks}));
        messages
    }

    fn stream_delta(&self, event: &Value) -> Option<String> {
        StreamEvent::deserialize(event).ok()?.delta?.text
    }

    fn build_headers(&self, config: &ProviderConfig, _path: &str) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "application/json".to_string()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ("Authorization", format!("Bearer {}", config.auth_token())),
        ]
    }
}

fn assistant_tool_use_turn(message: &Message) -> Value {
    let mut blocks = Vec::new();
    if let Some(text) = message.content.as_deref().filter(|t| !t.is_empty()) {
        blocks.push(json!({"type": "text", "text": text}));
    }
    for call in message.tool_calls.iter().flatten() {
        blocks.push(json!({
            "type": "tool_use",
            "id": call.id,
            "name": call.name,
            "input": Value::Object(call.args.clone()),
        }));
    }
    json!({"role": "assistant", "content": blocks})
}

/// Consecutive tool results share one user turn.
fn push_tool_result(native: &mut Vec<Value>, block: Value) {
    let open_turn = native
        .last_mut()
        .filter(|last| last["role"] == "user")
        .and_then(|last| last.get_mut("content"))
        .and_then(Value::as_array_mut)
        .filter(|blocks| blocks.iter().all(|b| b["type"] == "tool_result"));
    match open_turn {
        Some(blocks) => blocks.push(block),
        None => native.push(json!({"role": "user", "content": [block]})),
    }
}
