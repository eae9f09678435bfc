//! Image generation tool.

use async_trait::async_trait;
use std::sync::Arc;

use super::ToolExecutor;
use crate::api::ApiClient;
use crate::config::ProviderConfig;
use crate::error::ToolError;
use crate::types::ToolCall;

/// Tool that generates images with the configured image model.
///
/// Uses its own [`ApiClient`] so an image request never cancels the chat
/// request that asked for it.
pub struct GenerateImageTool {
    client: Arc<ApiClient>,
}

impl GenerateImageTool {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolExecutor for GenerateImageTool {
    fn name(&self) -> &'static str {
        super::GENERATE_IMAGE
    }

    async fn execute(&self, call: &ToolCall, config: &ProviderConfig) -> Result<String, ToolError> {
        let prompt = call
            .str_arg("prompt")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("missing `prompt`".to_string()))?;
        if config.image_model.trim().is_empty() {
            return Err(ToolError::NotConfigured("image_model is empty".to_string()));
        }

        let images = self
            .client
            .generate_image(prompt, config)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        if images.is_empty() {
            return Err(ToolError::ExecutionFailed(
                "the provider returned no images".to_string(),
            ));
        }

        let links: Vec<String> = images
            .iter()
            .enumerate()
            .map(|(i, image)| format!("![Generated image {}]({})", i + 1, image.url))
            .collect();
        Ok(links.join("\n\n"))
    }
}
