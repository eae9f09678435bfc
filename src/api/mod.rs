//! HTTP client for OpenAI-, Anthropic- and Gemini-compatible APIs.
//!
//! The API layer is split into cohesive modules:
//! - `providers`: per-provider request building and response parsing
//! - `sse`: chunk-safe streaming frame decoding
//! - `image`: image generation bodies and decoding
//! - `client`: transport, retry and cancellation orchestration

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::ApiError;
use crate::types::{ChatResult, Message, ToolDefinition, ToolResult};

mod client;
mod image;
pub mod providers;
pub mod sse;

pub use client::{resolve_url, ApiClient, RetryPolicy, CONNECTION_TEST_PROMPT};
pub use image::GeneratedImage;

/// Minimal model API interface used by the agent loop.
///
/// This trait lets tests provide deterministic mock responses without network
/// calls while the production path uses [`ApiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        config: &ProviderConfig,
    ) -> Result<ChatResult, ApiError>;

    /// Answer the tool calls in `previous`, replaying exactly what it sent.
    async fn continue_with_tool_results(
        &self,
        previous: &ChatResult,
        config: &ProviderConfig,
        results: &[ToolResult],
    ) -> Result<ChatResult, ApiError>;
}
