//! # Study Session
//!
//! Ties the pieces together for one user: the current subject, prompt and image,
//! the last answer, and the diary.
//!
//! ## Flow
//!
//! ```text
//! submit()               (typed question; no-op when prompt and image are both empty)
//! submit_image(bytes)    (photo or confirmed crop; fires at once, prompt may be empty)
//!        │
//!        ▼
//! study_scale::optimize ──▶ AnalysisClient::analyze ──▶ results ──▶ DiaryStore::record
//! ```
//!
//! Submitting borrows the session mutably, so a second analysis cannot start while
//! one is in flight.

use study_scale::{OptimizeConfig, optimize};
use tracing::{info, warn};

use crate::capture::CroppedImage;
use crate::client::AnalysisClient;
use crate::error::StudyResult;
use crate::history::DiaryStore;
use crate::model::{AnalysisRequest, AnalysisResponse, DiaryEntry, Subject};

/// Text shown to the user when an analysis attempt fails.
pub const ANALYSIS_ALERT: &str = "The AI is busy or the image is too large, please try again.";

pub struct StudySession {
    client: AnalysisClient,
    diary: DiaryStore,
    optimize: OptimizeConfig,
    subject: Subject,
    input: String,
    image: Option<String>,
    results: Option<AnalysisResponse>,
}

impl StudySession {
    pub fn new(client: AnalysisClient, diary: DiaryStore, optimize: OptimizeConfig) -> Self {
        Self {
            client,
            diary,
            optimize,
            subject: Subject::default(),
            input: String::new(),
            image: None,
            results: None,
        }
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn set_subject(&mut self, subject: Subject) {
        self.subject = subject;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Optimized image attached to the current question, as a data URL.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Attach an image without sending. It is optimized right away.
    pub fn attach_image(&mut self, bytes: &[u8]) -> StudyResult<()> {
        let optimized = optimize(bytes, &self.optimize)?;
        self.image = Some(optimized.to_data_url());
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn results(&self) -> Option<&AnalysisResponse> {
        self.results.as_ref()
    }

    pub fn diary(&self) -> &DiaryStore {
        &self.diary
    }

    pub fn diary_mut(&mut self) -> &mut DiaryStore {
        &mut self.diary
    }

    /// Send the typed question (and attached image, if any).
    ///
    /// Returns `Ok(None)` without touching the network when there is nothing to send.
    pub async fn submit(&mut self) -> StudyResult<Option<&AnalysisResponse>> {
        let Some(request) = AnalysisRequest::manual(self.subject, self.input.clone(), self.image.clone()) else {
            info!("  Nothing to send");
            return Ok(None);
        };
        self.process(request).await.map(Some)
    }

    /// Attach `bytes` and send immediately, with whatever prompt is typed (possibly none).
    pub async fn submit_image(&mut self, bytes: &[u8]) -> StudyResult<&AnalysisResponse> {
        self.attach_image(bytes)?;
        self.send_attached().await
    }

    /// Send a confirmed camera crop immediately.
    pub async fn submit_capture(&mut self, capture: &CroppedImage) -> StudyResult<&AnalysisResponse> {
        self.image = Some(optimize(&capture.bytes, &self.optimize)?.to_data_url());
        self.send_attached().await
    }

    async fn send_attached(&mut self) -> StudyResult<&AnalysisResponse> {
        let image = self.image.clone().unwrap_or_default();
        let request = AnalysisRequest::from_image(self.subject, self.input.clone(), image);
        self.process(request).await
    }

    async fn process(&mut self, request: AnalysisRequest) -> StudyResult<&AnalysisResponse> {
        self.results = None;
        let response = self.client.analyze(&request).await?;

        let entry = DiaryEntry::new(request.subject, request.prompt, request.image, response.clone());
        if let Err(e) = self.diary.record(entry) {
            // The answer is still shown; only the history write is lost
            warn!("Could not save diary entry: {}", e);
        }

        Ok(self.results.insert(response))
    }
}
