// # Scanner
//
// Countdown capture and crop over a live camera stream.
//
// ```text
//            open() ok                 tick() x3              pan / set_zoom
//   Idle ─────────────▶ Streaming ──▶ Counting(3,2,1,0) ──▶ Cropping ───────┐
//    ▲  │ open() denied                                          │ ◀───────┘
//    │  └──▶ alert, stay Idle                                    │ confirm()
//    │                                                           ▼
//    └─────────── retake() from any live state            Confirmed (emits CroppedImage)
//
//   close() from any state ──▶ Closed (emits nothing)
// ```
//
// The scanner owns the stream exclusively. It is released on confirm, retake,
// close and when the scanner is dropped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use study_scale::data_url;
use tracing::{debug, info, warn};

use crate::capture::crop::{CropEditor, CropRegion, render_region};
use crate::capture::device::{
    CameraDevice, CapturedFrame, FrameEncoder, JpegFrameEncoder, StreamRequest, VideoStream,
};
use crate::error::{StudyError, StudyResult};

pub const CAMERA_ALERT: &str = "Cannot open the camera";
pub const CAPTURE_ALERT: &str = "Could not capture a frame from the camera";

/// User-facing notification sink for device failures.
pub trait Alerter: Send + Sync {
    fn alert(&self, message: &str);
}

/// Alerter that only writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlerter;

impl Alerter for LogAlerter {
    fn alert(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Scanner settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannerConfig {
    /// Seconds counted down before the shot
    pub countdown_secs: u8,
    pub request: StreamRequest,
    /// Crop window width / height
    pub aspect_ratio: f64,
    pub max_zoom: f64,
    /// Quality of the lossy encoding of the confirmed crop
    pub capture_quality: u8,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 3,
            request: StreamRequest::default(),
            aspect_ratio: 4.0 / 3.0,
            max_zoom: 3.0,
            capture_quality: 92,
        }
    }
}

impl ScannerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.request.ideal_width == 0 {
            return Err("Ideal stream width must be greater than 0".to_string());
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(format!("Crop aspect ratio must be positive, got {}", self.aspect_ratio));
        }
        if !(self.max_zoom.is_finite() && self.max_zoom >= 1.0) {
            return Err(format!("Maximum zoom must be at least 1, got {}", self.max_zoom));
        }
        if !(1..=100).contains(&self.capture_quality) {
            return Err(format!(
                "Capture quality must be between 1 and 100, got {}",
                self.capture_quality
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Streaming,
    Counting(u8),
    Cropping,
    Confirmed,
    Closed,
}

impl ScannerState {
    fn is_terminal(self) -> bool {
        matches!(self, ScannerState::Confirmed | ScannerState::Closed)
    }
}

impl fmt::Display for ScannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScannerState::Idle => f.write_str("idle"),
            ScannerState::Streaming => f.write_str("streaming"),
            ScannerState::Counting(n) => write!(f, "counting down ({})", n),
            ScannerState::Cropping => f.write_str("cropping"),
            ScannerState::Confirmed => f.write_str("confirmed"),
            ScannerState::Closed => f.write_str("closed"),
        }
    }
}

/// Confirmed crop, encoded but not down-scaled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
}

impl CroppedImage {
    pub fn to_data_url(&self) -> String {
        data_url::encode(self.mime_type, &self.bytes)
    }
}

/// Camera countdown-and-crop state machine.
pub struct Scanner {
    device: Box<dyn CameraDevice>,
    encoder: Box<dyn FrameEncoder>,
    alerter: Arc<dyn Alerter>,
    config: ScannerConfig,
    state: ScannerState,
    stream: Option<Box<dyn VideoStream>>,
    captured: Option<CapturedFrame>,
    editor: Option<CropEditor>,
}

impl Scanner {
    pub fn new(device: Box<dyn CameraDevice>, alerter: Arc<dyn Alerter>, config: ScannerConfig) -> Self {
        Self {
            device,
            encoder: Box::new(JpegFrameEncoder),
            alerter,
            config,
            state: ScannerState::Idle,
            stream: None,
            captured: None,
            editor: None,
        }
    }

    /// Replace the default JPEG encoder.
    pub fn with_encoder(mut self, encoder: Box<dyn FrameEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Seconds left before the shot, `None` outside the countdown.
    pub fn countdown(&self) -> Option<u8> {
        match self.state {
            ScannerState::Counting(n) => Some(n),
            _ => None,
        }
    }

    pub fn captured(&self) -> Option<&CapturedFrame> {
        self.captured.as_ref()
    }

    pub fn crop_region(&self) -> Option<CropRegion> {
        self.editor.as_ref().map(CropEditor::region)
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_live())
    }

    /// Acquire the camera and start the countdown.
    ///
    /// On failure the user is alerted, the scanner stays `Idle` and the device
    /// error is returned.
    pub async fn open(&mut self) -> StudyResult<()> {
        self.expect(ScannerState::Idle, "open the camera")?;

        let stream = match self.device.acquire_stream(&self.config.request).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!("Camera unavailable: {}", err);
                self.alerter.alert(CAMERA_ALERT);
                return Err(err);
            }
        };

        let size = stream.size();
        info!("  Camera open: {}x{}", size.w, size.h);
        self.stream = Some(stream);
        self.state = ScannerState::Streaming;
        self.count(self.config.countdown_secs)
    }

    /// Advance the countdown by one second. Returns `true` when this tick took the shot.
    pub fn tick(&mut self) -> StudyResult<bool> {
        match self.state {
            ScannerState::Counting(n) if n > 0 => {
                self.count(n - 1)?;
                Ok(self.state == ScannerState::Cropping)
            }
            other => Err(StudyError::state(other.to_string(), "tick the countdown")),
        }
    }

    /// Drive the countdown in real time, one tick per second, until the shot is taken.
    pub async fn run_countdown(&mut self) -> StudyResult<()> {
        if self.countdown().is_none() {
            return Err(StudyError::state(self.state.to_string(), "run the countdown"));
        }

        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        // First tick completes immediately
        ticker.tick().await;
        while self.countdown().is_some() {
            ticker.tick().await;
            self.tick()?;
        }
        Ok(())
    }

    /// Pan the crop window by frame pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) -> StudyResult<CropRegion> {
        Ok(self.editor_mut("pan")?.pan(dx, dy))
    }

    pub fn set_zoom(&mut self, zoom: f64) -> StudyResult<CropRegion> {
        Ok(self.editor_mut("zoom")?.set_zoom(zoom))
    }

    /// Render the crop region into a new image and finish.
    pub fn confirm(&mut self) -> StudyResult<CroppedImage> {
        self.expect(ScannerState::Cropping, "confirm the crop")?;
        let (frame, editor) = match (&self.captured, &self.editor) {
            (Some(frame), Some(editor)) => (frame, editor),
            _ => return Err(StudyError::state(self.state.to_string(), "confirm the crop")),
        };

        let region = editor.region();
        let pixels = render_region(&frame.pixels, &region);
        let bytes = self.encoder.encode_lossy(&pixels, frame.quality)?;
        let image = CroppedImage {
            bytes,
            width: pixels.width(),
            height: pixels.height(),
            mime_type: self.encoder.mime_type(),
        };

        info!(
            "  Crop confirmed: {}x{} at ({}, {}), zoom {:.2}, {} bytes",
            region.width,
            region.height,
            region.x,
            region.y,
            region.zoom,
            image.bytes.len()
        );

        self.release_stream();
        self.captured = None;
        self.editor = None;
        self.state = ScannerState::Confirmed;
        Ok(image)
    }

    /// Discard the shot, re-acquire the camera and restart the countdown.
    pub async fn retake(&mut self) -> StudyResult<()> {
        if self.state.is_terminal() {
            return Err(StudyError::state(self.state.to_string(), "retake"));
        }
        debug!("retake requested while {}", self.state);
        self.release_stream();
        self.captured = None;
        self.editor = None;
        self.state = ScannerState::Idle;
        self.open().await
    }

    /// Release the camera and finish without output.
    pub fn close(&mut self) {
        self.release_stream();
        self.captured = None;
        self.editor = None;
        if self.state != ScannerState::Closed {
            debug!("scanner closed while {}", self.state);
        }
        self.state = ScannerState::Closed;
    }

    fn count(&mut self, remaining: u8) -> StudyResult<()> {
        self.state = ScannerState::Counting(remaining);
        if remaining == 0 {
            self.capture()?;
        }
        Ok(())
    }

    fn capture(&mut self) -> StudyResult<()> {
        let drawn = match self.stream.as_mut() {
            Some(stream) => stream.draw_frame(),
            None => Err(StudyError::state(self.state.to_string(), "capture")),
        };

        let pixels = match drawn {
            Ok(pixels) => pixels,
            Err(err) => {
                warn!("Capture failed: {}", err);
                self.release_stream();
                self.state = ScannerState::Idle;
                self.alerter.alert(CAPTURE_ALERT);
                return Err(err);
            }
        };

        let frame = CapturedFrame::new(pixels, self.config.capture_quality);
        let size = frame.size();
        self.editor = Some(CropEditor::new(size, self.config.aspect_ratio, self.config.max_zoom));
        self.captured = Some(frame);
        self.state = ScannerState::Cropping;
        info!("  Captured {}x{} frame", size.w, size.h);
        Ok(())
    }

    fn editor_mut(&mut self, operation: &str) -> StudyResult<&mut CropEditor> {
        if self.state != ScannerState::Cropping {
            return Err(StudyError::state(self.state.to_string(), operation));
        }
        let state = self.state;
        self.editor
            .as_mut()
            .ok_or_else(|| StudyError::state(state.to_string(), operation))
    }

    fn expect(&self, expected: ScannerState, operation: &str) -> StudyResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(StudyError::state(self.state.to_string(), operation))
        }
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("camera stream released");
        }
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.release_stream();
    }
}
