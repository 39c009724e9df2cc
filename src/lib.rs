//! # Symbiotic Study Library
//!
//! Client side of a study assistant: photograph or type a problem, send it to the
//! inference proxy, and keep the structured answer in a local diary.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `capture`: Camera abstraction, countdown scanner and crop editor
//! - `client`: HTTP client for the proxy's analysis route
//! - `history`: Diary store with pluggable persistence backends
//! - `core`: Bounded newest-first log
//! - `config`: Configuration management and validation
//! - `session`: Orchestration of optimize, analyze and record
//! - `render`: Plain-text professor views
//!
//! Image down-scaling lives in the `study-scale` crate and the server side in
//! `study-proxy`.
//!
//! ## Data Flow
//!
//! ```text
//! camera ─▶ Scanner ─▶ CroppedImage ─┐
//!                                    ├─▶ optimize ─▶ AnalysisClient ─▶ proxy
//! typed prompt / photo file ─────────┘                     │
//!                                                          ▼
//!                              render ◀── AnalysisResponse ──▶ DiaryStore
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use symbiotic_study::{AppConfig, Subject};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let mut session = symbiotic_study::open_session(&config)?;
//! session.set_subject(Subject::Physics);
//! session.set_input("A ball falls from 20 m. How long until it lands?");
//! if let Some(answer) = session.submit().await? {
//!     println!("{}", answer.prof1.answer);
//! }
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod model;
pub mod render;
pub mod session;

pub use client::AnalysisClient;
pub use config::AppConfig;
pub use error::{HasRecoverySuggestion, HasSeverity, StudyError, StudyResult};
pub use history::{DiaryStore, FileBackend, MemoryBackend};
pub use model::{AnalysisRequest, AnalysisResponse, DiaryEntry, QuizQuestion, Subject};
pub use session::StudySession;

use tracing::debug;

/// Build a session from `config`: proxy client, file-backed diary and optimizer
/// settings.
pub fn open_session(config: &AppConfig) -> StudyResult<StudySession> {
    config
        .validate()
        .map_err(|reason| StudyError::config("config", "", reason))?;

    let client = AnalysisClient::new(config)?;
    let backend = FileBackend::new(&config.diary_dir);
    let diary = DiaryStore::open_with_capacity(Box::new(backend), config.diary_capacity)?;
    debug!(
        endpoint = client.endpoint(),
        diary = %config.diary_dir.display(),
        entries = diary.len(),
        "session ready"
    );
    Ok(StudySession::new(client, diary, config.optimize))
}
