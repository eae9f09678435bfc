//! API client orchestration across provider wire formats.
//!
//! The client facade stays small:
//! - request/response translation is delegated to `providers`.
//! - HTTP plumbing and error extraction live in `transport`.
//! - retry policy logic is delegated to `retry`.
//! - the single in-flight request handle lives in `cancel`.

mod cancel;
mod retry;
mod transport;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::image::{build_image_request, parse_image_response, GeneratedImage};
use super::providers::{adapter_for, ChatProviderAdapter, NativeMessages};
use super::sse::SseDecoder;
use super::ModelClient;
use crate::config::ProviderConfig;
use crate::error::ApiError;
use crate::types::{ChatResult, Message, Role, ToolDefinition, ToolResult};
use cancel::{CancelSlot, CancelToken};
use retry::with_retry;

pub use retry::RetryPolicy;
pub use transport::resolve_url;

/// Fixed prompt sent by [`ApiClient::test_connection`].
pub const CONNECTION_TEST_PROMPT: &str = "Hello, this is a connection test.";

/// Client for OpenAI-, Anthropic- and Gemini-compatible chat APIs.
///
/// At most one request is current per client: starting a chat, continuation,
/// stream or image request cancels whatever was in flight before it. Callers
/// that need parallel requests use separate clients.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    retry_policy: RetryPolicy,
    cancel: CancelSlot,
}

impl ApiClient {
    /// Build a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self::with_retry_policy(timeout, RetryPolicy::default())
    }

    pub fn with_retry_policy(timeout: Duration, retry_policy: RetryPolicy) -> Self {
        Self {
            http: transport::build_http_client(timeout),
            retry_policy,
            cancel: CancelSlot::default(),
        }
    }

    /// Build a client using the configured request timeout.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(Duration::from_secs(config.request_timeout_secs))
    }

    /// Abort the in-flight request, if any. Returns whether one was pending.
    pub fn cancel_request(&self) -> bool {
        let cancelled = self.cancel.cancel();
        if cancelled {
            info!("cancelled in-flight request");
        }
        cancelled
    }

    /// One chat round trip offering `tools` to the model.
    ///
    /// The configured system prompt is prepended when `messages` carry none.
    pub async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        config: &ProviderConfig,
    ) -> Result<ChatResult, ApiError> {
        let token = self.cancel.begin();
        let adapter = adapter_for(config.provider);
        let prepared = with_system_prompt(messages, config);
        let native = adapter.native_messages(&prepared);
        let body = adapter.build_body(&native, tools, config, false);
        self.send_chat(&token, adapter, config, body, native, tools.to_vec())
            .await
    }

    /// Feed tool outputs back after a tool-call response and ask again.
    ///
    /// The system text and tool list are the ones `previous` was sent with,
    /// so one turn never changes either partway through.
    pub async fn continue_with_tool_results(
        &self,
        previous: &ChatResult,
        config: &ProviderConfig,
        results: &[ToolResult],
    ) -> Result<ChatResult, ApiError> {
        let token = self.cancel.begin();
        let adapter = adapter_for(config.provider);
        let native = NativeMessages {
            system: previous.sent_system.clone(),
            messages: adapter.append_tool_results(
                &previous.sent_messages,
                &previous.raw_response,
                results,
            ),
        };
        let tools = previous.sent_tools.clone();
        let body = adapter.build_body(&native, &tools, config, false);
        self.send_chat(&token, adapter, config, body, native, tools)
            .await
    }

    /// Stream a reply, calling `on_chunk` with each text delta.
    ///
    /// Returns the concatenated text. Malformed events are skipped.
    pub async fn stream_chat<F>(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
        mut on_chunk: F,
    ) -> Result<String, ApiError>
    where
        F: FnMut(&str),
    {
        let token = self.cancel.begin();
        let adapter = adapter_for(config.provider);
        let prepared = with_system_prompt(messages, config);
        let (body, _) = adapter.build_request(&prepared, &[], config, true);
        let path = adapter.stream_path(&config.chat_path);
        let url = resolve_url(&config.endpoint, &path, &config.model);
        let headers = adapter.build_headers(config, &path);
        debug!(
            provider = config.provider.as_str(),
            url = %url,
            token = %config.redacted_token(),
            "starting streaming chat request"
        );

        let mut response = self.post(&token, &url, &headers, &body).await?;
        let mut decoder = SseDecoder::new();
        let mut text = String::new();
        loop {
            let chunk = token
                .run(async { response.chunk().await.map_err(ApiError::from) })
                .await?;
            let Some(chunk) = chunk else {
                break;
            };
            for payload in decoder.push(&chunk) {
                emit_delta(adapter, &payload, &mut text, &mut on_chunk);
            }
        }
        if let Some(payload) = decoder.finish() {
            emit_delta(adapter, &payload, &mut text, &mut on_chunk);
        }
        Ok(text)
    }

    /// Generate images for `prompt` with the configured image model.
    pub async fn generate_image(
        &self,
        prompt: &str,
        config: &ProviderConfig,
    ) -> Result<Vec<GeneratedImage>, ApiError> {
        let token = self.cancel.begin();
        let url = resolve_url(&config.endpoint, &config.image_path, &config.image_model);
        let headers = adapter_for(config.provider).build_headers(config, &config.image_path);
        let body = build_image_request(prompt, config);
        debug!(
            provider = config.provider.as_str(),
            url = %url,
            model = %config.image_model,
            "sending image request"
        );
        let raw = self.post_for_json(&token, &url, &headers, &body).await?;
        let images = parse_image_response(config.provider, &raw);
        if images.is_empty() {
            warn!("image response contained no images");
        }
        Ok(images)
    }

    /// Send a fixed prompt through the normal chat path.
    pub async fn test_connection(&self, config: &ProviderConfig) -> Result<(), ApiError> {
        let ping = [Message::user(CONNECTION_TEST_PROMPT)];
        self.chat(&ping, &[], config)
            .await
            .map(|_| ())
            .map_err(|err| ApiError::ConnectionTest(Box::new(err)))
    }

    async fn send_chat(
        &self,
        token: &CancelToken,
        adapter: &dyn ChatProviderAdapter,
        config: &ProviderConfig,
        body: Value,
        native: NativeMessages,
        tools: Vec<ToolDefinition>,
    ) -> Result<ChatResult, ApiError> {
        let url = resolve_url(&config.endpoint, &config.chat_path, &config.model);
        let headers = adapter.build_headers(config, &config.chat_path);
        debug!(
            provider = config.provider.as_str(),
            url = %url,
            messages = native.messages.len(),
            token = %config.redacted_token(),
            "sending chat request"
        );
        let raw = self.post_for_json(token, &url, &headers, &body).await?;
        let output = adapter.parse_response(&raw)?;
        Ok(ChatResult {
            output,
            raw_response: raw,
            sent_messages: native.messages,
            sent_system: native.system,
            sent_tools: tools,
        })
    }

    /// POST with retries; the response body is left unread.
    async fn post(
        &self,
        token: &CancelToken,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<reqwest::Response, ApiError> {
        let http = &self.http;
        with_retry(&self.retry_policy, token, move |_| {
            token.run(transport::post_json(http, url, headers, body))
        })
        .await
    }

    /// POST with retries and decode the JSON reply inside each attempt.
    async fn post_for_json(
        &self,
        token: &CancelToken,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<Value, ApiError> {
        let http = &self.http;
        with_retry(&self.retry_policy, token, move |_| {
            token.run(async move {
                let response = transport::post_json(http, url, headers, body).await?;
                transport::read_json(response).await
            })
        })
        .await
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        config: &ProviderConfig,
    ) -> Result<ChatResult, ApiError> {
        ApiClient::chat(self, messages, tools, config).await
    }

    async fn continue_with_tool_results(
        &self,
        previous: &ChatResult,
        config: &ProviderConfig,
        results: &[ToolResult],
    ) -> Result<ChatResult, ApiError> {
        ApiClient::continue_with_tool_results(self, previous, config, results).await
    }
}

/// Prepend the configured system prompt unless one is already present.
fn with_system_prompt(messages: &[Message], config: &ProviderConfig) -> Vec<Message> {
    let mut prepared = messages.to_vec();
    if let Some(system) = config.system_prompt() {
        if !prepared.iter().any(|m| m.role == Role::System) {
            prepared.insert(0, Message::system(system));
        }
    }
    prepared
}

fn emit_delta<F: FnMut(&str)>(
    adapter: &dyn ChatProviderAdapter,
    payload: &str,
    text: &mut String,
    on_chunk: &mut F,
) {
    let event: Value = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "skipping malformed stream event");
            return;
        }
    };
    if let Some(delta) = adapter.stream_delta(&event).filter(|d| !d.is_empty()) {
        on_chunk(&delta);
        text.push_str(&delta);
    }
}
