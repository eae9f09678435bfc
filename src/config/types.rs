//! Configuration data model.
//!
//! `ProviderConfig` is the single settings record: it selects the provider
//! adapter, carries generation parameters, and decides which tools are
//! offered to the model.

use serde::{Deserialize, Serialize};

use super::defaults::{
    DEFAULT_CHAT_PATH, DEFAULT_IMAGE_COUNT, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_PATH,
    DEFAULT_IMAGE_QUALITY, DEFAULT_IMAGE_SIZE, DEFAULT_IMAGE_STYLE, DEFAULT_MAX_TOOL_ROUNDS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Wire protocol family of the configured endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" => Ok(Self::Gemini),
            other => Err(format!(
                "unknown provider `{other}` (expected openai, anthropic or gemini)"
            )),
        }
    }
}

/// Backend used by the `web_search` tool.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    #[default]
    Brave,
    Tavily,
}

/// Provider connection, generation and tool settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub endpoint: String,
    pub model: String,
    pub token: String,
    /// Chat path appended to `endpoint`; may contain `{model}`.
    pub chat_path: String,
    pub image_path: String,
    pub system_prompt: String,
    pub enable_streaming: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,

    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    pub image_style: String,
    pub image_count: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_provider: Option<SearchProvider>,
    pub search_api_key: String,

    /// Bound on tool-call continuations per user turn.
    pub max_tool_rounds: usize,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            endpoint: String::new(),
            model: String::new(),
            token: String::new(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            image_path: DEFAULT_IMAGE_PATH.to_string(),
            system_prompt: String::new(),
            enable_streaming: false,
            temperature: None,
            max_tokens: None,
            top_p: None,
            presence_penalty: None,
            frequency_penalty: None,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            image_quality: DEFAULT_IMAGE_QUALITY.to_string(),
            image_style: DEFAULT_IMAGE_STYLE.to_string(),
            image_count: DEFAULT_IMAGE_COUNT,
            search_provider: Some(SearchProvider::Brave),
            search_api_key: String::new(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    /// True when endpoint, model and token are all present.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
            && !self.model.trim().is_empty()
            && !self.token.trim().is_empty()
    }

    /// Trimmed system prompt, if one is configured.
    pub fn system_prompt(&self) -> Option<&str> {
        Some(self.system_prompt.trim()).filter(|p| !p.is_empty())
    }

    /// Token as sent in request headers, without surrounding whitespace.
    pub fn auth_token(&self) -> &str {
        self.token.trim()
    }

    /// Token masked for logs. Only tokens longer than 16 characters show
    /// their first and last four.
    pub fn redacted_token(&self) -> String {
        let chars: Vec<char> = self.auth_token().chars().collect();
        if chars.len() > 16 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "****".to_string()
        }
    }
}
