// SPDX-License-Identifier: MIT
//! # Proxy Errors
//!
//! Every failure is reported to the caller as `{"error": <message>, "kind": <kind>}`
//! with a status chosen per kind. Provider details are logged and never returned;
//! the caller only learns that it should try again.
//!
//! | Kind | Status | Cause |
//! |------|--------|-------|
//! | `method_not_allowed` | 405 | Anything other than `POST` |
//! | `configuration` | 500 | No provider credential in the environment |
//! | `bad_request` | 400 | Body is not the expected JSON |
//! | `payload_too_large` | 413 | Body exceeds the configured limit |
//! | `transport` | 502 / 504 | Provider unreachable or timed out |
//! | `provider` | 502 | Provider answered with a non-success status |
//! | `provider_parse` | 502 | Provider answer had no usable JSON text |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::provider::ProviderError;

/// Shown to end users for every provider-side failure.
pub const RETRY_MESSAGE: &str = "The AI is busy or the image is too large, please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Missing API Key")]
    MissingCredential,
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error("request body exceeds the size limit")]
    PayloadTooLarge,
    #[error("provider transport failure: {detail}")]
    Transport { timed_out: bool, detail: String },
    #[error("provider returned HTTP {status}: {detail}")]
    Provider { status: u16, detail: String },
    #[error("provider response unusable: {0}")]
    ProviderParse(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    kind: &'static str,
}

impl ProxyError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::MissingCredential => "configuration",
            Self::BadRequest(_) => "bad_request",
            Self::PayloadTooLarge => "payload_too_large",
            Self::Transport { .. } => "transport",
            Self::Provider { .. } => "provider",
            Self::ProviderParse(_) => "provider_parse",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Transport { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Transport { .. } | Self::Provider { .. } | Self::ProviderParse(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Message safe to show to the end user.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::MissingCredential => "Missing API Key",
            Self::BadRequest(_) => "Invalid request body",
            Self::PayloadTooLarge => RETRY_MESSAGE,
            Self::Transport { .. } | Self::Provider { .. } | Self::ProviderParse(_) => RETRY_MESSAGE,
        }
    }
}

impl From<ProviderError> for ProxyError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Timeout => Self::Transport {
                timed_out: true,
                detail: "timed out".to_string(),
            },
            ProviderError::Transport(detail) => Self::Transport {
                timed_out: false,
                detail,
            },
            ProviderError::Status { status, body } => Self::Provider { status, detail: body },
            ProviderError::Parse(detail) => Self::ProviderParse(detail),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), "{}", self);
        } else {
            warn!(kind = self.kind(), "{}", self);
        }

        let body = ErrorBody {
            error: self.public_message(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}
