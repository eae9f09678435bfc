//! Gemini `generateContent` wire format.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{
    split_system, tool_name_for, truthy_f64, truthy_u32, ChatProviderAdapter, NativeMessages,
};
use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ApiError;
use crate::types::{ChatOutput, Message, Role, ToolCall, ToolDefinition, ToolResult};

/// Prefix of synthesized tool call ids; Gemini assigns none.
pub const TOOL_ID_PREFIX: &str = "gemini_tool_";

#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiAdapter;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GenerateResponse {
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Candidate {
    pub(crate) content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CandidateContent {
    pub(crate) parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Part {
    pub(crate) text: Option<String>,
    pub(crate) function_call: Option<FunctionCall>,
    pub(crate) inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FunctionCall {
    pub(crate) name: String,
    pub(crate) args: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub(crate) mime_type: String,
    pub(crate) data: String,
}

/// Decode a `generateContent` response; mismatched fields read as absent.
pub(crate) fn decode_response(raw: &Value) -> GenerateResponse {
    GenerateResponse::deserialize(raw).unwrap_or_default()
}

impl ChatProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn native_messages(&self, messages: &[Message]) -> NativeMessages {
        let (system, rest) = split_system(messages);
        let mut contents = Vec::with_capacity(rest.len());
        for message in &rest {
            match message.role {
                Role::Tool => {
                    let call_id = message.tool_call_id.as_deref().unwrap_or_default();
                    let name = tool_name_for(&rest, call_id).unwrap_or_default();
                    push_function_response(
                        &mut contents,
                        function_response(name, message.content_str()),
                    );
                }
                Role::Assistant => {
                    let mut parts = Vec::new();
                    if message.tool_calls.is_none() || !message.content_str().is_empty() {
                        parts.push(json!({"text": message.content_str()}));
                    }
                    for call in message.tool_calls.iter().flatten() {
                        parts.push(json!({
                            "functionCall": {"name": call.name, "args": Value::Object(call.args.clone())}
                        }));
                    }
                    contents.push(json!({"role": "model", "parts": parts}));
                }
                Role::User | Role::System => contents.push(json!({
                    "role": "user",
                    "parts": [{"text": message.content_str()}],
                })),
            }
        }
        NativeMessages {
            system,
            messages: contents,
        }
    }

    fn build_body(
        &self,
        native: &NativeMessages,
        tools: &[ToolDefinition],
        config: &ProviderConfig,
        _stream: bool,
    ) -> Value {
        let mut body = Map::new();
        body.insert("contents".into(), Value::Array(native.messages.clone()));
        if let Some(system) = &native.system {
            body.insert(
                "systemInstruction".into(),
                json!({"parts": [{"text": system}]}),
            );
        }

        let mut generation = Map::new();
        // An explicit zero temperature is meaningful here and is sent.
        if let Some(temperature) = config.temperature {
            generation.insert("temperature".into(), json!(temperature));
        }
        if let Some(max_tokens) = truthy_u32(config.max_tokens) {
            generation.insert("maxOutputTokens".into(), json!(max_tokens));
        }
        if let Some(top_p) = truthy_f64(config.top_p) {
            generation.insert("topP".into(), json!(top_p));
        }
        if !generation.is_empty() {
            body.insert("generationConfig".into(), Value::Object(generation));
        }

        // Some endpoints reject an empty tools array.
        if !tools.is_empty() {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    })
                })
                .collect();
            body.insert(
                "tools".into(),
                json!([{"functionDeclarations": declarations}]),
            );
        }
        Value::Object(body)
    }

    fn parse_response(&self, raw: &Value) -> Result<ChatOutput, ApiError> {
        let parts = decode_response(raw)
            .candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.content.parts)
            .unwrap_or_default();

        let calls: Vec<ToolCall> = parts
            .iter()
            .filter_map(|part| part.function_call.as_ref())
            .enumerate()
            .map(|(index, call)| {
                let args = match &call.args {
                    Some(Value::Object(map)) => map.clone(),
                    _ => Map::new(),
                };
                ToolCall::new(format!("{TOOL_ID_PREFIX}{index}"), call.name.clone(), args)
            })
            .collect();
        if !calls.is_empty() {
            return Ok(ChatOutput::ToolCalls(calls));
        }

        let text = parts
            .into_iter()
            .next()
            .and_then(|part| part.text)
            .unwrap_or_default();
        Ok(ChatOutput::Text(text))
    }

    fn append_tool_results(
        &self,
        sent: &[Value],
        raw: &Value,
        results: &[ToolResult],
    ) -> Vec<Value> {
        let parts = raw
            .pointer("/candidates/0/content/parts")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));

        let mut messages = sent.to_vec();
        messages.push(json!({"role": "model", "parts": parts}));
        let responses: Vec<Value> = results
            .iter()
            .map(|result| function_response(&result.name, &result.result))
            .collect();
        messages.push(json!({"role": "user", "parts": responses}));
        messages
    }

    fn stream_delta(&self, event: &Value) -> Option<String> {
        decode_response(event)
            .candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .text
    }

    fn stream_path(&self, path: &str) -> String {
        if !path.contains(":generateContent") {
            return path.to_string();
        }
        let streaming = path.replace(":generateContent", ":streamGenerateContent");
        let separator = if streaming.contains('?') { '&' } else { '?' };
        format!("{streaming}{separator}alt=sse")
    }

    fn build_headers(&self, config: &ProviderConfig, path: &str) -> Vec<(&'static str, String)> {
        let native_path = (path.contains("generateContent") || path.contains("/models/"))
            && !path.contains("/chat/completions");
        let auth = if native_path {
            ("x-goog-api-key", config.auth_token().to_string())
        } else {
            ("Authorization", format!("Bearer {}", config.auth_token()))
        };
        vec![("Content-Type", "application/json".to_string()), auth]
    }
}

fn function_response(name: &str, content: &str) -> Value {
    json!({"functionResponse": {"name": name, "response": {"content": content}}})
}

/// Consecutive function responses share one user turn.
fn push_function_response(contents: &mut Vec<Value>, part: Value) {
    let open_turn = contents
        .last_mut()
        .filter(|last| last["role"] == "user")
        .and_then(|last| last.get_mut("parts"))
        .and_then(Value::as_array_mut)
        .filter(|parts| parts.iter().all(|p| p.get("functionResponse").is_some()));
    match open_turn {
        Some(parts) => parts.push(part),
        None => contents.push(json!({"role": "user", "parts": [part]})),
    }
}
