//! Web search tool.
//!
//! Queries Brave Search or Tavily, depending on `search_provider`, and
//! renders the hits as a markdown digest the model can cite from.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::ToolExecutor;
use crate::config::{ProviderConfig, SearchProvider};
use crate::error::ToolError;
use crate::types::ToolCall;

/// Maximum number of results to keep.
const MAX_RESULTS: usize = 5;

const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Tool that searches the web through the configured search API.
pub struct WebSearchTool {
    http: reqwest::Client,
    brave_url: String,
    tavily_url: String,
}

impl WebSearchTool {
    /// Build a search tool with a reusable HTTP client.
    pub fn new(timeout: Duration) -> Self {
        Self::with_endpoints(timeout, BRAVE_SEARCH_URL, TAVILY_SEARCH_URL)
    }

    /// Build a search tool against non-default API endpoints.
    pub fn with_endpoints(
        timeout: Duration,
        brave_url: impl Into<String>,
        tavily_url: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            brave_url: brave_url.into(),
            tavily_url: tavily_url.into(),
        }
    }

    async fn search_brave(&self, query: &str, key: &str) -> Result<Vec<SearchHit>, ToolError> {
        let url = format!("{}?q={}", self.brave_url, urlencoded(query));
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", key)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Brave search failed with status {}",
                response.status().as_u16()
            )));
        }
        let payload: BraveResponse = response
            .json()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(payload
            .web
            .unwrap_or_default()
            .results
            .into_iter()
            .take(MAX_RESULTS)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                description: r.description,
            })
            .collect())
    }

    async fn search_tavily(&self, query: &str, key: &str) -> Result<Vec<SearchHit>, ToolError> {
        let response = self
            .http
            .post(&self.tavily_url)
            .json(&json!({
                "api_key": key,
                "query": query,
                "search_depth": "basic",
                "max_results": MAX_RESULTS,
            }))
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Tavily search failed with status {}",
                response.status().as_u16()
            )));
        }
        let payload: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(payload
            .results
            .into_iter()
            .take(MAX_RESULTS)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                description: r.content,
            })
            .collect())
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BraveResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BraveWeb {
    results: Vec<BraveResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BraveResult {
    title: String,
    url: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
}

#[derive(Debug, Clone, PartialEq)]
struct SearchHit {
    title: String,
    url: String,
    description: String,
}

#[async_trait]
impl ToolExecutor for WebSearchTool {
    fn name(&self) -> &'static str {
        super::WEB_SEARCH
    }

    async fn execute(&self, call: &ToolCall, config: &ProviderConfig) -> Result<String, ToolError> {
        let query = call
            .str_arg("query")
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("missing `query`".to_string()))?;

        let key = config.search_api_key.trim();
        let provider = config.search_provider.filter(|_| !key.is_empty()).ok_or_else(|| {
            ToolError::NotConfigured("web search needs search_provider and search_api_key".into())
        })?;

        tracing::debug!(provider = ?provider, query, "running web search");
        let hits = match provider {
            SearchProvider::Brave => self.search_brave(query, key).await?,
            SearchProvider::Tavily => self.search_tavily(query, key).await?,
        };
        Ok(format_results(query, &hits))
    }
}

/// Render hits as a markdown digest.
fn format_results(query: &str, hits: &[SearchHit]) -> String {
    let mut out = format!("# Search results for \"{query}\"\n\n");
    if hits.is_empty() {
        out.push_str("No results found.");
        return out;
    }
    out.push_str(&format!("Found {} results\n\n", hits.len()));
    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!("## {}. {}\n", i + 1, hit.title));
        out.push_str(&format!("**URL:** {}\n\n", hit.url));
        out.push_str(&format!("{}\n\n", hit.description));
        out.push_str("---\n\n");
    }
    out
}

/// Minimal query-string encoding.
fn urlencoded(s: &str) -> String {
    let mut out = String::new();
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{MockHttpServer, MockResponse};
    use serde_json::{Map, Value};

    fn search_call(query: &str) -> ToolCall {
        let mut args = Map::new();
        args.insert("query".into(), Value::String(query.into()));
        ToolCall::new("1", "web_search", args)
    }

    fn config(provider: SearchProvider) -> ProviderConfig {
        ProviderConfig {
            search_provider: Some(provider),
            search_api_key: "search-key".into(),
            ..ProviderConfig::default()
        }
    }

    fn tool_for(server: &MockHttpServer) -> WebSearchTool {
        WebSearchTool::with_endpoints(
            Duration::from_secs(5),
            format!("{}/brave", server.base_url()),
            format!("{}/tavily", server.base_url()),
        )
    }

    #[test]
    fn urlencoded_space_becomes_plus() {
        assert_eq!(urlencoded("hello world"), "hello+world");
        assert_eq!(urlencoded("-_.~"), "-_.~");
    }

    #[test]
    fn urlencoded_special_chars_percent_encoded() {
        assert_eq!(urlencoded("a&b"), "a%26b");
        assert_eq!(urlencoded("a=b"), "a%3Db");
        assert_eq!(urlencoded("é"), "%C3%A9");
    }

    #[test]
    fn formats_hits_as_markdown() {
        let hits = vec![SearchHit {
            title: "Rust".into(),
            url: "https://rust-lang.org".into(),
            description: "A language".into(),
        }];
        assert_eq!(
            format_results("rust", &hits),
            "# Search results for \"rust\"\n\nFound 1 results\n\n## 1. Rust\n**URL:** https://rust-lang.org\n\nA language\n\n---\n\n"
        );
    }

    #[test]
    fn empty_hits_say_so() {
        assert_eq!(
            format_results("zzz", &[]),
            "# Search results for \"zzz\"\n\nNo results found."
        );
    }

    #[tokio::test]
    async fn brave_sends_subscription_token_and_caps_results() {
        let results: Vec<Value> = (0..7)
            .map(|i| json!({"title": format!("t{i}"), "url": format!("https://e.com/{i}"), "description": "d"}))
            .collect();
        let server = MockHttpServer::start(vec![MockResponse::json(
            200,
            json!({"web": {"results": results}}).to_string(),
        )])
        .await;
        let output = tool_for(&server)
            .execute(&search_call("rust lang"), &config(SearchProvider::Brave))
            .await
            .unwrap();
        assert!(output.contains("Found 5 results"), "got: {output}");
        assert!(output.contains("## 5. t4"));
        assert!(!output.contains("t5"));

        let request = &server.requests()[0];
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/brave?q=rust+lang");
        assert_eq!(request.header("x-subscription-token"), Some("search-key"));
    }

    #[tokio::test]
    async fn tavily_posts_key_in_body() {
        let server = MockHttpServer::start(vec![MockResponse::json(
            200,
            r#"{"results":[{"title":"T","url":"https://t.example","content":"body text"}]}"#,
        )])
        .await;
        let output = tool_for(&server)
            .execute(&search_call("q"), &config(SearchProvider::Tavily))
            .await
            .unwrap();
        assert!(output.contains("body text"));

        let body = server.requests()[0].json();
        assert_eq!(
            body,
            json!({"api_key": "search-key", "query": "q", "search_depth": "basic", "max_results": 5})
        );
    }

    #[tokio::test]
    async fn failing_status_is_execution_error() {
        let server = MockHttpServer::start(vec![MockResponse::json(403, "{}")]).await;
        let err = tool_for(&server)
            .execute(&search_call("q"), &config(SearchProvider::Brave))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "execution failed: Brave search failed with status 403"
        );
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let config = ProviderConfig {
            search_provider: Some(SearchProvider::Brave),
            search_api_key: "  ".into(),
            ..ProviderConfig::default()
        };
        let err = WebSearchTool::default()
            .execute(&search_call("q"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured(_)), "got: {err}");
    }

    #[tokio::test]
    async fn missing_query_is_invalid_arguments() {
        let call = ToolCall::new("1", "web_search", Map::new());
        let err = WebSearchTool::default()
            .execute(&call, &config(SearchProvider::Brave))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
