//! Image generation request bodies and response decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

use super::providers::gemini;
use crate::config::{ProviderConfig, ProviderKind};

/// One generated image, addressable as a URL (often a `data:` URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
    pub mime_type: Option<String>,
    /// Prompt the provider actually used, when it rewrote ours.
    pub revised_prompt: Option<String>,
}

impl GeneratedImage {
    fn from_base64(mime_type: &str, data: &str) -> Self {
        Self {
            url: format!("data:{mime_type};base64,{data}"),
            mime_type: Some(mime_type.to_string()),
            revised_prompt: None,
        }
    }

    /// Decoded bytes for `data:` URLs; `None` for remote URLs.
    pub fn decode_bytes(&self) -> Option<Vec<u8>> {
        let rest = self.url.strip_prefix("data:")?;
        let (_, payload) = rest.split_once(";base64,")?;
        STANDARD.decode(payload).ok()
    }

    /// File extension matching the mime type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_deref() {
            Some("image/jpeg") => "jpg",
            Some("image/webp") => "webp",
            Some("image/gif") => "gif",
            _ => "png",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
    revised_prompt: Option<String>,
}

/// Request body for the configured provider's image endpoint.
pub(crate) fn build_image_request(prompt: &str, config: &ProviderConfig) -> Value {
    match config.provider {
        ProviderKind::Gemini => json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {"responseModalities": ["TEXT", "IMAGE"]},
        }),
        ProviderKind::OpenAi | ProviderKind::Anthropic => json!({
            "prompt": prompt,
            "model": config.image_model,
            "n": config.image_count,
            "size": config.image_size,
            "quality": config.image_quality,
            "style": config.image_style,
            "response_format": "b64_json",
        }),
    }
}

/// Decode every image in a successful response.
pub(crate) fn parse_image_response(kind: ProviderKind, raw: &Value) -> Vec<GeneratedImage> {
    match kind {
        ProviderKind::Gemini => gemini::decode_response(raw)
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .filter_map(|part| part.inline_data)
            .filter(|inline| !inline.data.is_empty())
            .map(|inline| {
                let mime = if inline.mime_type.is_empty() {
                    "image/png"
                } else {
                    inline.mime_type.as_str()
                };
                GeneratedImage::from_base64(mime, &inline.data)
            })
            .collect(),
        ProviderKind::OpenAi | ProviderKind::Anthropic => ImagesResponse::deserialize(raw)
            .unwrap_or_default()
            .data
            .into_iter()
            .filter_map(|datum| {
                let mut image = match (datum.b64_json, datum.url) {
                    (Some(b64), _) => GeneratedImage::from_base64("image/png", &b64),
                    (None, Some(url)) => GeneratedImage {
                        url,
                        mime_type: None,
                        revised_prompt: None,
                    },
                    (None, None) => return None,
                };
                image.revised_prompt = datum.revised_prompt;
                Some(image)
            })
            .collect(),
    }
}
