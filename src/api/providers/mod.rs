//! Provider adapters.
//!
//! Each adapter translates canonical [`Message`]s and [`ToolDefinition`]s into
//! one provider's wire format and parses that provider's replies back into a
//! [`ChatOutput`]. Dispatch is closed over [`ProviderKind`]: adding a provider
//! means adding one adapter and one arm in [`adapter_for`].

mod anthropic;
pub(crate) mod gemini;
mod openai;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ApiError;
use crate::types::{ChatOutput, Message, ToolDefinition, ToolResult};
use serde_json::Value;

/// Provider-native message array plus any system text hoisted out of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeMessages {
    /// System instruction for providers that carry it outside the message list.
    pub system: Option<String>,
    /// Messages exactly as they will be transmitted.
    pub messages: Vec<Value>,
}

/// Wire-format translator for one provider family.
pub trait ChatProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Convert canonical messages into the native message array.
    fn native_messages(&self, messages: &[Message]) -> NativeMessages;

    /// Assemble a full request body around an already-native message array.
    fn build_body(
        &self,
        native: &NativeMessages,
        tools: &[ToolDefinition],
        config: &ProviderConfig,
        stream: bool,
    ) -> Value;

    /// Parse a successful response body into text or tool calls.
    fn parse_response(&self, raw: &Value) -> Result<ChatOutput, ApiError>;

    /// Append the assistant tool-call turn and the tool outputs to `sent`.
    fn append_tool_results(&self, sent: &[Value], raw: &Value, results: &[ToolResult])
        -> Vec<Value>;

    /// Incremental text carried by one decoded streaming event.
    fn stream_delta(&self, event: &Value) -> Option<String>;

    /// Build the request body and report the native messages it carries.
    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        config: &ProviderConfig,
        stream: bool,
    ) -> (Value, Vec<Value>) {
        let native = self.native_messages(messages);
        let body = self.build_body(&native, tools, config, stream);
        (body, native.messages)
    }

    /// Path to POST to when streaming instead of `path`.
    fn stream_path(&self, path: &str) -> String {
        path.to_string()
    }

    /// Request headers for a call against `path`.
    fn build_headers(&self, config: &ProviderConfig, _path: &str) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "application/json".to_string()),
            ("Authorization", format!("Bearer {}", config.auth_token())),
        ]
    }
}

static OPENAI: OpenAiAdapter = OpenAiAdapter;
static ANTHROPIC: AnthropicAdapter = AnthropicAdapter;
static GEMINI: GeminiAdapter = GeminiAdapter;

/// Adapter for the configured provider.
pub fn adapter_for(kind: ProviderKind) -> &'static dyn ChatProviderAdapter {
    match kind {
        ProviderKind::OpenAi => &OPENAI,
        ProviderKind::Anthropic => &ANTHROPIC,
        ProviderKind::Gemini => &GEMINI,
    }
}

/// Keep a float parameter only when it is set and non-zero.
///
/// A literal `0` is treated as unset, matching how these endpoints have
/// historically been driven.
pub(super) fn truthy_f64(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

pub(super) fn truthy_u32(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v != 0)
}

/// First system message content, and every non-system message.
pub(super) fn split_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let system = messages
        .iter()
        .find(|m| m.role == crate::types::Role::System)
        .map(|m| m.content_str().to_string());
    let rest = messages
        .iter()
        .filter(|m| m.role != crate::types::Role::System)
        .collect();
    (system, rest)
}

/// Name of the tool call `call_id` answers, looked up in earlier assistant turns.
pub(super) fn tool_name_for<'a>(messages: &'a [&Message], call_id: &str) -> Option<&'a str> {
    messages
        .iter()
        .filter_map(|m| m.tool_calls.as_ref())
        .flatten()
        .find(|call| call.id == call_id)
        .map(|call| call.name.as_str())
}
