//! # Analysis Request Client
//!
//! Sends one question to the inference proxy and parses the structured answer.
//!
//! ```text
//! AnalysisRequest ──▶ JSON {subject, prompt, image?}
//!                       │ larger than payload_ceiling? ──▶ Validation error, nothing sent
//!                       ▼
//!                    POST proxy_url
//!                       │ transport failure ──▶ Network
//!                       │ non-2xx           ──▶ Server {status, body.error | fallback}
//!                       ▼
//!                    AnalysisResponse (inner shape not validated)
//! ```
//!
//! The image must already be optimized; the client never re-encodes it.

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{StudyError, StudyResult};
use crate::model::{AnalysisRequest, AnalysisResponse, Subject};

/// Prompt sent when the user attached only an image.
pub const DEFAULT_PROMPT: &str = "Solve this problem in detail.";
/// Message used when an error response carries no readable `error` field.
pub const FALLBACK_SERVER_MESSAGE: &str = "Server did not respond";

#[derive(Serialize)]
struct WireRequest<'a> {
    subject: Subject,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

#[derive(Deserialize)]
struct WireError {
    error: String,
}

/// HTTP client for the proxy's analysis route.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
    payload_ceiling: usize,
}

impl AnalysisClient {
    pub fn new(config: &AppConfig) -> StudyResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StudyError::config("request_timeout", format!("{:?}", config.request_timeout), e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.proxy_url.clone(),
            payload_ceiling: config.payload_ceiling,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue a single analysis request. Never retries.
    pub async fn analyze(&self, request: &AnalysisRequest) -> StudyResult<AnalysisResponse> {
        let prompt = if request.prompt.trim().is_empty() {
            DEFAULT_PROMPT
        } else {
            request.prompt.as_str()
        };
        let body = serde_json::to_vec(&WireRequest {
            subject: request.subject,
            prompt,
            image: request.image.as_deref(),
        })
        .map_err(|e| StudyError::processing("serialize request", e.to_string()))?;

        if body.len() > self.payload_ceiling {
            return Err(StudyError::validation(
                "image",
                format!(
                    "request is {} bytes, the proxy accepts at most {}",
                    body.len(),
                    self.payload_ceiling
                ),
            )
            .with_recovery_suggestion("Use a smaller optimizer preset or crop tighter"));
        }

        info!(
            "  Sending {} question ({} bytes, image: {})",
            request.subject,
            body.len(),
            request.image.is_some()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let error = if e.is_timeout() {
                    StudyError::timeout("analyze", e.to_string())
                } else {
                    StudyError::network("analyze", e.to_string())
                };
                error.with_recovery_suggestion("Check that the proxy is running and reachable")
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StudyError::network("read response", e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<WireError>(&bytes)
                .ok()
                .map(|e| e.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_SERVER_MESSAGE.to_string());
            warn!("Proxy answered {}: {}", status, message);
            return Err(StudyError::server(status.as_u16(), message)
                .with_recovery_suggestion("Try again in a moment"));
        }

        let parsed: AnalysisResponse = serde_json::from_slice(&bytes)
            .map_err(|e| StudyError::decode("analysis response", e.to_string()))?;
        debug!(quizzes = parsed.prof3.quizzes.len(), "analysis received");
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_request_uses_subject_labels_and_omits_missing_image() {
        let body = serde_json::to_value(WireRequest {
            subject: Subject::Chemistry,
            prompt: "balance H2 + O2",
            image: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"subject": "Hóa học", "prompt": "balance H2 + O2"}));
    }

    #[tokio::test]
    async fn oversized_request_is_refused_locally() {
        let config = AppConfig {
            // Nothing listens here; reaching the network would fail differently.
            proxy_url: "http://127.0.0.1:9/api/gemini".to_string(),
            payload_ceiling: 64,
            ..AppConfig::default()
        };
        let client = AnalysisClient::new(&config).unwrap();
        let request = AnalysisRequest::from_image(Subject::Math, "", "A".repeat(200));

        let err = client.analyze(&request).await.unwrap_err();
        assert!(matches!(err, StudyError::Validation { .. }), "{err:?}");
    }
}
