//! Pluggable tool system.
//!
//! Tool *definitions* are fixed and filtered by configuration through
//! [`list_available_tools`]. Tool *executors* are async trait objects the
//! conversation driver dispatches to through a [`ToolRegistry`].

pub mod fetch;
pub mod image;
pub mod search;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::api::ApiClient;
use crate::config::ProviderConfig;
use crate::error::ToolError;
use crate::types::{ToolCall, ToolDefinition};

pub const WEB_SEARCH: &str = "web_search";
pub const FETCH_URL: &str = "fetch_url";
pub const GENERATE_IMAGE: &str = "generate_image";

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

fn web_search_definition() -> ToolDefinition {
    ToolDefinition {
        name: WEB_SEARCH,
        description: "Search the web for current information. Returns the top results with titles, URLs and short descriptions.",
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        }),
    }
}

fn fetch_url_definition() -> ToolDefinition {
    ToolDefinition {
        name: FETCH_URL,
        description: "Fetch a web page and return its readable text content.",
        parameters: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL of the page to read"
                }
            },
            "required": ["url"]
        }),
    }
}

fn generate_image_definition() -> ToolDefinition {
    ToolDefinition {
        name: GENERATE_IMAGE,
        description: "Generate an image from a text description.",
        parameters: json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "Detailed description of the image to create"
                }
            },
            "required": ["prompt"]
        }),
    }
}

/// Tools the model may call under `config`, in a fixed order:
/// `web_search`, `fetch_url`, `generate_image`.
///
/// `web_search` needs a search provider and a non-blank API key;
/// `generate_image` needs a non-blank image model; `fetch_url` is always on.
pub fn list_available_tools(config: &ProviderConfig) -> Vec<ToolDefinition> {
    let mut tools = Vec::with_capacity(3);
    if config.search_provider.is_some() && !config.search_api_key.trim().is_empty() {
        tools.push(web_search_definition());
    }
    tools.push(fetch_url_definition());
    if !config.image_model.trim().is_empty() {
        tools.push(generate_image_definition());
    }
    tools
}

// ---------------------------------------------------------------------------
// Executors
// ---------------------------------------------------------------------------

/// Something that can run one kind of tool call.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Tool name this executor answers to.
    fn name(&self) -> &'static str;

    /// Run the call and return the text handed back to the model.
    async fn execute(&self, call: &ToolCall, config: &ProviderConfig) -> Result<String, ToolError>;
}

/// Executors keyed by tool name.
pub struct ToolRegistry {
    executors: Vec<Box<dyn ToolExecutor>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            executors: Vec::new(),
        }
    }

    /// Registry with the search, fetch and image executors.
    ///
    /// Image generation gets its own client so it doesn't cancel the chat
    /// request driving the tool loop.
    pub fn with_default_tools(config: &ProviderConfig) -> Self {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let mut registry = Self::new();
        registry.register(search::WebSearchTool::new(timeout));
        registry.register(fetch::FetchTool::new(timeout));
        registry.register(image::GenerateImageTool::new(Arc::new(ApiClient::new(
            timeout,
        ))));
        registry
    }

    /// Register an executor, replacing any existing one with the same name.
    pub fn register(&mut self, executor: impl ToolExecutor + 'static) {
        self.executors.retain(|e| e.name() != executor.name());
        self.executors.push(Box::new(executor));
    }

    /// Names of registered executors, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.executors.iter().map(|e| e.name()).collect()
    }

    /// Find the executor for `call.name` and run it.
    pub async fn execute(
        &self,
        call: &ToolCall,
        config: &ProviderConfig,
    ) -> Result<String, ToolError> {
        let executor = self
            .executors
            .iter()
            .find(|e| e.name() == call.name)
            .ok_or_else(|| ToolError::ExecutionFailed(format!("unknown tool: {}", call.name)))?;
        executor.execute(call, config).await
    }

    /// True if no executors are registered.
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
