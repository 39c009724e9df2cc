// SPDX-License-Identifier: MIT
//! # Generative Provider
//!
//! The proxy talks to the model through [`GenerativeProvider`], so the HTTP layer can
//! be exercised against a test double. [`GeminiProvider`] is the production
//! implementation and speaks the `generateContent` REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProxyConfig;

/// Image attached to a generation request, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub const DEFAULT_MIME_TYPE: &'static str = "image/jpeg";

    /// Accepts either `data:<mime>;base64,<data>` or bare base64.
    /// Returns `None` when there is no payload after the header.
    pub fn from_payload(payload: &str) -> Option<Self> {
        let payload = payload.trim();
        let (mime_type, data) = match payload.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest.split_once(',')?;
                let mime = header.split(';').next().unwrap_or_default();
                let mime = if mime.is_empty() { Self::DEFAULT_MIME_TYPE } else { mime };
                (mime.to_string(), data)
            }
            None => (Self::DEFAULT_MIME_TYPE.to_string(), payload),
        };
        if data.is_empty() {
            return None;
        }
        Some(Self {
            mime_type,
            data: data.to_string(),
        })
    }
}

/// Everything the provider needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub instruction: String,
    pub image: Option<InlineImage>,
    pub temperature: f32,
    pub response_mime_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider call timed out")]
    Timeout,
    #[error("provider unreachable: {0}")]
    Transport(String),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected provider response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Run one generation and return the model's raw text.
    async fn generate(&self, api_key: &str, request: &GenerationRequest) -> Result<String, ProviderError>;
}

// --- Gemini wire types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    response_mime_type: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// `generateContent` client.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate(&self, api_key: &str, request: &GenerationRequest) -> Result<String, ProviderError> {
        let mut parts = vec![Part::Text {
            text: &request.instruction,
        }];
        if let Some(image) = &request.image {
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            });
        }
        let body = GenerateContentBody {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: &request.response_mime_type,
            },
        };

        debug!(model = %self.model, has_image = request.image.is_some(), "calling generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Transport(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Parse(e.to_string()))?;
        extract_text(parsed)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("no candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::Parse("candidate has no text".to_string()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_image_from_data_url() {
        let img = InlineImage::from_payload("data:image/png;base64,AAAA").unwrap();
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(img.data, "AAAA");
    }

    #[test]
    fn inline_image_from_bare_base64() {
        let img = InlineImage::from_payload("/9j/4AAQ").unwrap();
        assert_eq!(img.mime_type, "image/jpeg");
        assert_eq!(img.data, "/9j/4AAQ");
    }

    #[test]
    fn inline_image_without_data() {
        assert!(InlineImage::from_payload("data:image/png;base64,").is_none());
        assert!(InlineImage::from_payload("data:image/png").is_none());
        assert!(InlineImage::from_payload("  ").is_none());
    }

    #[test]
    fn extract_text_joins_parts() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn extract_text_without_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(matches!(extract_text(parsed), Err(ProviderError::Parse(_))));

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(matches!(extract_text(blocked), Err(ProviderError::Parse(_))));
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateContentBody {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text { text: "solve" },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "image/jpeg",
                            data: "AAAA",
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json",
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "solve");
        assert_eq!(value["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
    }
}
