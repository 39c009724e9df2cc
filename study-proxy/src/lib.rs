// SPDX-License-Identifier: MIT
//! # study-proxy: Inference Proxy for the Study Assistant
//!
//! A small HTTP service standing between the study client and the generative-AI
//! provider. It owns the provider credential, wraps each question in the fixed
//! instruction template, and returns the model's JSON answer as-is.
//!
//! ## Request Flow
//!
//! ```text
//! POST /api/gemini {subject, prompt?, image?}
//!     │ credential present?            no ──▶ 500 Missing API Key
//!     │ body parses?                   no ──▶ 400
//!     ▼
//! template::instruction + inline image ──▶ GenerativeProvider::generate
//!     │ provider ok?                   no ──▶ 502/504 (retry message)
//!     ▼
//! strip_code_fences ──▶ valid JSON?    no ──▶ 502
//!     ▼
//! 200 application/json (verbatim model text)
//! ```
//!
//! Each request is independent: the only shared state is the immutable
//! [`ProxyState`] behind an `Arc`. Nothing is retried automatically.

pub mod config;
pub mod error;
pub mod provider;
pub mod routes;
pub mod sanitize;
pub mod template;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use provider::{GeminiProvider, GenerationRequest, GenerativeProvider, InlineImage, ProviderError};

/// Application state shared across handlers
pub struct ProxyState {
    pub config: ProxyConfig,
    pub provider: Arc<dyn GenerativeProvider>,
}

impl ProxyState {
    pub fn new(config: ProxyConfig, provider: Arc<dyn GenerativeProvider>) -> Self {
        Self { config, provider }
    }
}

/// Build the proxy router.
pub fn router(state: ProxyState) -> Router {
    let body_limit = state.config.body_limit;
    Router::new()
        .merge(routes::analysis_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

/// Serve the proxy on an already-bound listener until the future is dropped.
pub async fn serve(listener: TcpListener, state: ProxyState) -> anyhow::Result<()> {
    if !state.config.has_credential() {
        warn!(
            "No provider credential found ({} / {}); analysis requests will be refused",
            config::PRIMARY_KEY_VAR,
            config::FALLBACK_KEY_VAR
        );
    }
    info!("  Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
