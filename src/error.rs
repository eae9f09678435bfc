//! Unified error types.

use std::fmt;

// ---------------------------------------------------------------------------
// ToolError
// ---------------------------------------------------------------------------

/// Errors arising from tool execution.
#[derive(Debug)]
pub enum ToolError {
    /// The model supplied arguments the tool couldn't use.
    InvalidArguments(String),
    /// The tool needs configuration that is missing (e.g. a search API key).
    NotConfigured(String),
    /// The tool ran but encountered a failure.
    ExecutionFailed(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArguments(msg) => write!(f, "invalid arguments: {msg}"),
            Self::NotConfigured(msg) => write!(f, "not configured: {msg}"),
            Self::ExecutionFailed(msg) => write!(f, "execution failed: {msg}"),
        }
    }
}

impl std::error::Error for ToolError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading, parsing or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    TomlSer(toml::ser::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::TomlSer(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        Self::TomlSer(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// How the retry loop should treat a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Aborted by a newer request or an explicit cancel. Never retried.
    Cancelled,
    /// Network failure, HTTP 5xx or HTTP 429.
    Retryable,
    /// Anything else: validation errors, malformed payloads.
    Fatal,
}

/// Errors from the HTTP API layer.
#[derive(Debug)]
pub enum ApiError {
    /// The in-flight request was superseded or cancelled.
    Cancelled,
    /// No response at all (connect, timeout, body read failure).
    Http(reqwest::Error),
    /// Non-2xx status. `message` is the provider's error text or a
    /// synthesized `API Error: {status} {reason}` line.
    Status { code: u16, message: String },
    /// A 2xx response whose payload could not be understood.
    InvalidResponse(String),
    /// Failure of the connection test, wrapping the underlying cause.
    ConnectionTest(Box<ApiError>),
}

impl ApiError {
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// HTTP status code, when the failure came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::ConnectionTest(inner) => inner.status_code(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.class() == ErrorClass::Cancelled
    }

    /// Classify this error for retry purposes.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Cancelled => ErrorClass::Cancelled,
            // Only failures on the wire; builder errors can never succeed.
            Self::Http(inner) if inner.is_timeout() || inner.is_connect() || inner.is_request() => {
                ErrorClass::Retryable
            }
            Self::Http(_) => ErrorClass::Fatal,
            Self::Status { code, .. } if *code == 429 || (500..=599).contains(code) => {
                ErrorClass::Retryable
            }
            Self::Status { .. } | Self::InvalidResponse(_) => ErrorClass::Fatal,
            Self::ConnectionTest(inner) => inner.class(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "request cancelled"),
            Self::Http(e) => write!(f, "network error: {e}"),
            Self::Status { message, .. } => write!(f, "{message}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
            Self::ConnectionTest(inner) => write!(f, "Connection test failed: {inner}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// ChatError (top level)
// ---------------------------------------------------------------------------

/// Top-level error type for the conversation driver.
#[derive(Debug)]
pub enum ChatError {
    Config(ConfigError),
    Api(ApiError),
    Tool(ToolError),
    /// Conversation store failure.
    Store(String),
    /// The model kept requesting tools past the configured round limit.
    MaxToolRoundsReached(usize),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Api(e) => write!(f, "{e}"),
            Self::Tool(e) => write!(f, "tool: {e}"),
            Self::Store(msg) => write!(f, "conversation store: {msg}"),
            Self::MaxToolRoundsReached(n) => {
                write!(f, "model requested tools for more than {n} rounds")
            }
        }
    }
}

impl std::error::Error for ChatError {}

impl From<ConfigError> for ChatError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ApiError> for ChatError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<ToolError> for ChatError {
    fn from(e: ToolError) -> Self {
        Self::Tool(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_display() {
        assert_eq!(
            ToolError::InvalidArguments("missing url".into()).to_string(),
            "invalid arguments: missing url"
        );
        assert_eq!(
            ToolError::NotConfigured("search api key".into()).to_string(),
            "not configured: search api key"
        );
    }

    #[test]
    fn status_errors_classify_by_code() {
        assert_eq!(ApiError::status(500, "boom").class(), ErrorClass::Retryable);
        assert_eq!(ApiError::status(503, "busy").class(), ErrorClass::Retryable);
        assert_eq!(ApiError::status(429, "slow down").class(), ErrorClass::Retryable);
        assert_eq!(ApiError::status(400, "bad").class(), ErrorClass::Fatal);
        assert_eq!(ApiError::status(401, "auth").class(), ErrorClass::Fatal);
        assert_eq!(ApiError::status(404, "missing").class(), ErrorClass::Fatal);
    }

    #[tokio::test]
    async fn unsendable_requests_are_fatal() {
        let http = reqwest::Client::new();
        let bad_header = http
            .post("http://127.0.0.1:9/")
            .header("Authorization", "Bearer sk-test\n")
            .send()
            .await
            .unwrap_err();
        assert_eq!(ApiError::from(bad_header).class(), ErrorClass::Fatal);

        let bad_url = http.get("not a url").send().await.unwrap_err();
        assert_eq!(ApiError::from(bad_url).class(), ErrorClass::Fatal);
    }

    #[tokio::test]
    async fn refused_connections_are_retryable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = reqwest::Client::new()
            .get(format!("http://{addr}/"))
            .send()
            .await
            .unwrap_err();
        assert_eq!(ApiError::from(err).class(), ErrorClass::Retryable);
    }

    #[test]
    fn cancellation_and_invalid_payloads_are_not_retryable() {
        assert_eq!(ApiError::Cancelled.class(), ErrorClass::Cancelled);
        assert!(ApiError::Cancelled.is_cancelled());
        assert_eq!(
            ApiError::InvalidResponse("nope".into()).class(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn status_display_is_the_bare_message() {
        let err = ApiError::status(401, "Incorrect API key provided");
        assert_eq!(err.to_string(), "Incorrect API key provided");
        assert_eq!(err.status_code(), Some(401));
    }

    #[test]
    fn connection_test_wraps_with_prefix() {
        let err = ApiError::ConnectionTest(Box::new(ApiError::status(404, "model not found")));
        assert_eq!(err.to_string(), "Connection test failed: model not found");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.class(), ErrorClass::Fatal);
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn chat_error_display_variants() {
        assert_eq!(
            ChatError::MaxToolRoundsReached(8).to_string(),
            "model requested tools for more than 8 rounds"
        );
        let from_api = ChatError::from(ApiError::Cancelled);
        assert_eq!(from_api.to_string(), "request cancelled");
        let from_tool = ChatError::from(ToolError::ExecutionFailed("oops".into()));
        assert!(from_tool.to_string().contains("oops"), "got: {from_tool}");
    }
}
