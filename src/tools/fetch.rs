//! URL fetch tool.
//!
//! Reads pages through the Jina reader proxy, which returns a plain-text
//! rendering of the page instead of raw HTML.

use async_trait::async_trait;
use std::time::Duration;

use super::ToolExecutor;
use crate::config::ProviderConfig;
use crate::error::ToolError;
use crate::types::ToolCall;

/// Maximum characters of page text to return.
const MAX_BODY_CHARS: usize = 8000;

const JINA_READER_URL: &str = "https://r.jina.ai";

/// Tool that fetches a URL and returns its text content.
pub struct FetchTool {
    http: reqwest::Client,
    reader_url: String,
}

impl FetchTool {
    pub fn new(timeout: Duration) -> Self {
        Self::with_reader(timeout, JINA_READER_URL)
    }

    /// Fetch through a different reader proxy.
    pub fn with_reader(timeout: Duration, reader_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            reader_url: reader_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for FetchTool {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl ToolExecutor for FetchTool {
    fn name(&self) -> &'static str {
        super::FETCH_URL
    }

    async fn execute(&self, call: &ToolCall, _config: &ProviderConfig) -> Result<String, ToolError> {
        let url = call
            .str_arg("url")
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("missing `url`".to_string()))?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ToolError::InvalidArguments(format!(
                "url must start with http:// or https://, got `{url}`"
            )));
        }

        tracing::debug!(url, "fetching page");
        let response = self
            .http
            .get(format!("{}/{url}", self.reader_url))
            .header("Accept", "text/plain")
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "fetching {url} failed with status {}",
                response.status().as_u16()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(format!("# Content from {url}\n\n{}", truncate_chars(&body)))
    }
}

/// Cut on a char boundary and mark the cut.
fn truncate_chars(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => format!("{}...[truncated]", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{MockHttpServer, MockResponse};
    use serde_json::{Map, Value};

    fn fetch_call(url: &str) -> ToolCall {
        let mut args = Map::new();
        args.insert("url".into(), Value::String(url.into()));
        ToolCall::new("1", "fetch_url", args)
    }

    #[test]
    fn short_bodies_are_untouched() {
        assert_eq!(truncate_chars("hello"), "hello");
    }

    #[test]
    fn long_bodies_are_cut_on_char_boundary() {
        let body = "é".repeat(MAX_BODY_CHARS + 10);
        let out = truncate_chars(&body);
        assert!(out.ends_with("...[truncated]"));
        assert_eq!(
            out.trim_end_matches("...[truncated]").chars().count(),
            MAX_BODY_CHARS
        );
    }

    #[tokio::test]
    async fn fetches_through_reader_with_heading() {
        let server = MockHttpServer::start(vec![MockResponse::text(200, "Page text")]).await;
        let tool = FetchTool::with_reader(Duration::from_secs(5), server.base_url());
        let output = tool
            .execute(&fetch_call("https://example.com/a"), &ProviderConfig::default())
            .await
            .unwrap();
        assert_eq!(output, "# Content from https://example.com/a\n\nPage text");

        let request = &server.requests()[0];
        assert_eq!(request.path, "/https://example.com/a");
        assert_eq!(request.header("accept"), Some("text/plain"));
    }

    #[tokio::test]
    async fn rejects_non_http_urls() {
        let err = FetchTool::default()
            .execute(&fetch_call("file:///etc/passwd"), &ProviderConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)), "got: {err}");
    }

    #[tokio::test]
    async fn reader_failure_is_execution_error() {
        let server = MockHttpServer::start(vec![MockResponse::text(502, "bad gateway")]).await;
        let tool = FetchTool::with_reader(Duration::from_secs(5), server.base_url());
        let err = tool
            .execute(&fetch_call("https://example.com"), &ProviderConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("status 502"), "got: {err}");
    }
}
