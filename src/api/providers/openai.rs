//! OpenAI-compatible `/chat/completions` wire format.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{truthy_f64, truthy_u32, ChatProviderAdapter, NativeMessages};
use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ApiError;
use crate::types::{ChatOutput, Message, ToolCall, ToolDefinition, ToolResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiAdapter;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
    delta: Option<CompletionMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionMessage {
    content: Option<Value>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireFunction {
    name: String,
    /// JSON-encoded argument object.
    arguments: Option<String>,
}

impl ChatProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn native_messages(&self, messages: &[Message]) -> NativeMessages {
        NativeMessages {
            system: None,
            messages: messages.iter().map(native_message).collect(),
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
        body.insert("messages".into(), Value::Array(native.messages.clone()));
        if let Some(temperature) = truthy_f64(config.temperature) {
            body.insert("temperature".into(), json!(temperature));
        }
        if let Some(max_tokens) = truthy_u32(config.max_tokens) {
            body.insert("max_tokens".into(), json!(max_tokens));
        }
        if stream {
            body.insert("stream".into(), json!(true));
        }
        if let Some(top_p) = truthy_f64(config.top_p) {
            body.insert("top_p".into(), json!(top_p));
        }
        if let Some(penalty) = truthy_f64(config.presence_penalty) {
            body.insert("presence_penalty".into(), json!(penalty));
        }
        if let Some(penalty) = truthy_f64(config.frequency_penalty) {
            body.insert("frequency_penalty".into(), json!(penalty));
        }
        if !tools.is_empty() {
            let tools = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        }
                    })
                })
                .collect();
            body.insert("tools".into(), Value::Array(tools));
        }
        Value::Object(body)
    }

    fn parse_response(&self, raw: &Value) -> Result<ChatOutput, ApiError> {
        let response = decode(raw);
        let message = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .unwrap_or_default();

        match message.tool_calls {
            Some(calls) if !calls.is_empty() => calls
                .into_iter()
                .map(|call| {
                    let args = parse_arguments(call.function.arguments.as_deref())?;
                    Ok(ToolCall::new(call.id, call.function.name, args))
                })
                .collect::<Result<Vec<_>, ApiError>>()
                .map(ChatOutput::ToolCalls),
            _ => Ok(ChatOutput::Text(content_text(message.content.as_ref()))),
        }
    }

    fn append_tool_results(
        &self,
        sent: &[Value],
        raw: &Value,
        results: &[ToolResult],
    ) -> Vec<Value> {
        let message = raw.pointer("/choices/0/message");
        let field = |name: &str| {
            message
                .and_then(|m| m.get(name))
                .cloned()
                .unwrap_or(Value::Null)
        };

        let mut messages = sent.to_vec();
        messages.push(json!({
            "role": "assistant",
            "content": field("content"),
            "tool_calls": field("tool_calls"),
        }));
        messages.extend(results.iter().map(|result| {
            json!({
                "role": "tool",
                "tool_call_id": result.id,
                "content": result.result,
            })
        }));
        messages
    }

    fn stream_delta(&self, event: &Value) -> Option<String> {
        let delta = decode(event).choices.into_iter().next()?.delta?;
        match delta.content? {
            Value::String(text) => Some(text),
            _ => None,
        }
    }
}

fn decode(raw: &Value) -> CompletionResponse {
    // A shape mismatch is treated like missing fields.
    CompletionResponse::deserialize(raw).unwrap_or_default()
}

fn native_message(message: &Message) -> Value {
    let mut native = json!({
        "role": message.role.as_str(),
        "content": message.content,
    });
    if let Some(calls) = &message.tool_calls {
        native["tool_calls"] = calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": Value::Object(call.args.clone()).to_string(),
                    }
                })
            })
            .collect();
    }
    if let Some(id) = &message.tool_call_id {
        native["tool_call_id"] = json!(id);
    }
    native
}

/// Decode the JSON-encoded `arguments` string of a tool call.
fn parse_arguments(arguments: Option<&str>) -> Result<Map<String, Value>, ApiError> {
    let Some(text) = arguments.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApiError::InvalidResponse(format!(
            "tool call arguments must be a JSON object, got {other}"
        ))),
        Err(e) => Err(ApiError::InvalidResponse(format!(
            "tool call arguments are not valid JSON: {e}"
        ))),
    }
}

/// Message content as text; array-of-parts content is concatenated.
fn content_text(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect(),
        _ => String::new(),
    }
}
