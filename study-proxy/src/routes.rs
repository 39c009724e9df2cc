// SPDX-License-Identifier: MIT
//! API routes for the proxy

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tracing::info;

use crate::error::ProxyError;
use crate::provider::{GenerationRequest, InlineImage};
use crate::sanitize::strip_code_fences;
use crate::template;
use crate::ProxyState;

type ProxyStateArc = Arc<ProxyState>;

/// Request body sent by the study client.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub subject: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

// ============================================================================
// Analysis Routes
// ============================================================================

pub fn analysis_routes() -> Router<ProxyStateArc> {
    Router::new()
        .route("/api/gemini", post(analyze).fallback(method_not_allowed))
        .route("/api/analyze", post(analyze).fallback(method_not_allowed))
}

async fn method_not_allowed(method: Method) -> ProxyError {
    info!("  Rejected {} on analysis route", method);
    ProxyError::MethodNotAllowed
}

async fn analyze(
    State(state): State<ProxyStateArc>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyError> {
    // Credential first: nothing is read, parsed or forwarded without it.
    let api_key = state
        .config
        .api_key
        .as_deref()
        .ok_or(ProxyError::MissingCredential)?;

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ProxyError::PayloadTooLarge
        } else {
            ProxyError::BadRequest(rejection.body_text())
        }
    })?;

    let req: AnalyzeRequest =
        serde_json::from_slice(&body).map_err(|e| ProxyError::BadRequest(e.to_string()))?;

    let image = match req.image.as_deref().map(str::trim) {
        Some(payload) if !payload.is_empty() => Some(
            InlineImage::from_payload(payload)
                .ok_or_else(|| ProxyError::BadRequest("image payload is empty".to_string()))?,
        ),
        _ => None,
    };

    info!(
        "  Analyzing: subject={} prompt_chars={} image={}",
        req.subject,
        req.prompt.as_deref().map(|p| p.chars().count()).unwrap_or(0),
        image.as_ref().map(|i| i.mime_type.as_str()).unwrap_or("none"),
    );

    let generation = GenerationRequest {
        instruction: template::instruction(&req.subject, req.prompt.as_deref(), &state.config.language),
        image,
        temperature: state.config.temperature,
        response_mime_type: "application/json".to_string(),
    };

    let raw = state.provider.generate(api_key, &generation).await?;
    let text = strip_code_fences(&raw);

    serde_json::from_str::<serde_json::Value>(&text)
        .map_err(|e| ProxyError::ProviderParse(format!("answer is not JSON: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, "application/json")], text).into_response())
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<ProxyStateArc> {
    Router::new().route("/healthz", get(health))
}

async fn health(State(state): State<ProxyStateArc>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "model": state.config.model,
        "credential": state.config.has_credential(),
    }))
}
