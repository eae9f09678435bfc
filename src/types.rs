//! Provider-agnostic conversation model.
//!
//! Callers build [`Message`] lists in this canonical shape; provider adapters
//! translate them into each wire format and parse replies back into
//! [`ChatResult`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Message roles
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Tool execution result.
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single canonical conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,

    /// Text content. `None` when an assistant turn is purely tool calls.
    pub content: Option<String>,

    /// Tool calls requested by the assistant, in model order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// When role == Tool, the id of the call this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Assistant turn that only requests tools.
    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    /// Tool result turn answering `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Provider-assigned id, or `gemini_tool_<index>` for Gemini.
    pub id: String,
    pub name: String,
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    /// String argument lookup used by executors.
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }
}

/// A tool the model may call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema object describing the arguments.
    pub parameters: Value,
}

/// Output of one executed tool call, fed back via continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub id: String,
    pub name: String,
    pub result: String,
}

impl ToolResult {
    pub fn new(id: impl Into<String>, name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            result: result.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Normalized model reply: either final text or a batch of tool calls.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutput {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

/// Result of one chat round trip.
#[derive(Debug, Clone)]
pub struct ChatResult {
    pub output: ChatOutput,
    /// Provider-native response body, needed to echo the assistant turn back.
    pub raw_response: Value,
    /// Provider-native message array exactly as transmitted.
    pub sent_messages: Vec<Value>,
    /// System text sent outside `sent_messages` (Anthropic, Gemini).
    pub sent_system: Option<String>,
    /// Tools offered with the request.
    pub sent_tools: Vec<ToolDefinition>,
}

impl ChatResult {
    /// Result with no record of what was sent.
    pub fn new(output: ChatOutput, raw_response: Value) -> Self {
        Self {
            output,
            raw_response,
            sent_messages: Vec::new(),
            sent_system: None,
            sent_tools: Vec::new(),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.output {
            ChatOutput::Text(text) => Some(text),
            ChatOutput::ToolCalls(_) => None,
        }
    }

    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match &self.output {
            ChatOutput::ToolCalls(calls) => Some(calls),
            ChatOutput::Text(_) => None,
        }
    }
}
