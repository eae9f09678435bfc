//! Default configuration constants.

/// Chat path for OpenAI-compatible endpoints.
pub(super) const DEFAULT_CHAT_PATH: &str = "/chat/completions";
/// Image generation path for OpenAI-compatible endpoints.
pub(super) const DEFAULT_IMAGE_PATH: &str = "/images/generations";
pub(super) const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub(super) const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub(super) const DEFAULT_IMAGE_QUALITY: &str = "standard";
pub(super) const DEFAULT_IMAGE_STYLE: &str = "vivid";
pub(super) const DEFAULT_IMAGE_COUNT: u32 = 1;
/// Upper bound on consecutive tool-call rounds per user turn.
pub(super) const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;
/// Default timeout for provider HTTP requests.
pub(super) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Config file name looked up locally and under the user config dir.
pub(super) const CONFIG_FILE_NAME: &str = "chatwire.toml";
/// Subdirectory of the platform config dir holding chatwire files.
pub(super) const CONFIG_DIR_NAME: &str = "chatwire";
