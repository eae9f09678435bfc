//! HTTP transport helpers: client construction, URL resolution, error mapping.

use std::time::Duration;

use serde_json::Value;

use crate::error::ApiError;

/// Build an HTTP client with timeout applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// `endpoint + path`, with `{model}` in the path replaced by `model`.
pub fn resolve_url(endpoint: &str, path: &str, model: &str) -> String {
    let path = path.replace("{model}", model);
    let endpoint = endpoint.trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        format!("{endpoint}{path}")
    } else {
        format!("{endpoint}/{path}")
    }
}

/// POST a JSON body; non-2xx statuses become [`ApiError::Status`].
pub(super) async fn post_json(
    http: &reqwest::Client,
    url: &str,
    headers: &[(&'static str, String)],
    body: &Value,
) -> Result<reqwest::Response, ApiError> {
    let mut request = http.post(url);
    for (name, value) in headers {
        request = request.header(*name, value);
    }
    // Headers go first so `json` does not add a second Content-Type.
    let response = request.json(body).send().await?;
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(response)
}

/// Read a successful response body as JSON.
pub(super) async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text)
        .map_err(|err| ApiError::InvalidResponse(format!("invalid JSON response: {err}")))
}

async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body).unwrap_or_else(|| {
        format!(
            "API Error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .trim_end()
        .to_string()
    });
    ApiError::status(status.as_u16(), message)
}

/// Provider error text from `error.message` or a top-level `message`.
pub(super) fn extract_error_message(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body).ok()?;
    payload
        .pointer("/error/message")
        .or_else(|| payload.get("message"))
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}
