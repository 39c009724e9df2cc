//! Common test utilities and helpers for the study library tests
//!
//! Camera and alert doubles, canned proxy answers and image fixtures.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::{Value, json};
use study_scale::Size;
use symbiotic_study::StudyError;
use symbiotic_study::capture::{Alerter, CameraDevice, StreamRequest, VideoStream};
use symbiotic_study::error::StudyResult;

/// Counters shared between a [`ScriptedCamera`] and the test body.
#[derive(Debug, Default)]
pub struct CameraProbe {
    pub acquisitions: AtomicUsize,
    pub draws: AtomicUsize,
    pub live_streams: AtomicUsize,
}

impl CameraProbe {
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn draws(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }

    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }
}

/// Camera double serving a fixed frame, or refusing access.
pub struct ScriptedCamera {
    frame: Option<RgbaImage>,
    probe: Arc<CameraProbe>,
}

impl ScriptedCamera {
    pub fn with_frame(width: u32, height: u32) -> (Self, Arc<CameraProbe>) {
        let probe = Arc::new(CameraProbe::default());
        let camera = Self {
            frame: Some(gradient(width, height)),
            probe: probe.clone(),
        };
        (camera, probe)
    }

    pub fn denied() -> (Self, Arc<CameraProbe>) {
        let probe = Arc::new(CameraProbe::default());
        let camera = Self {
            frame: None,
            probe: probe.clone(),
        };
        (camera, probe)
    }
}

#[async_trait]
impl CameraDevice for ScriptedCamera {
    async fn acquire_stream(&mut self, _request: &StreamRequest) -> StudyResult<Box<dyn VideoStream>> {
        self.probe.acquisitions.fetch_add(1, Ordering::SeqCst);
        match &self.frame {
            None => Err(StudyError::device("Permission denied", true)),
            Some(frame) => {
                self.probe.live_streams.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(ScriptedStream {
                    frame: frame.clone(),
                    probe: self.probe.clone(),
                    live: true,
                }))
            }
        }
    }
}

struct ScriptedStream {
    frame: RgbaImage,
    probe: Arc<CameraProbe>,
    live: bool,
}

impl VideoStream for ScriptedStream {
    fn size(&self) -> Size {
        Size {
            w: self.frame.width(),
            h: self.frame.height(),
        }
    }

    fn draw_frame(&mut self) -> StudyResult<RgbaImage> {
        self.probe.draws.fetch_add(1, Ordering::SeqCst);
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.probe.live_streams.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

/// Alerter double remembering every message.
#[derive(Debug, Default)]
pub struct RecordingAlerter {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Alerter for RecordingAlerter {
    fn alert(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Frame where each pixel encodes its own coordinates.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]))
}

/// PNG-encoded test image.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// A complete answer in the proxy's response schema.
pub fn sample_answer() -> Value {
    json!({
        "prof1": {"answer": "$t = 2$ s", "casio": "√(2×20÷9.8)"},
        "prof2": {"explanation": "Use $h = \\frac{1}{2} g t^2$.", "method": "Solve for $t$."},
        "prof3": {"quizzes": [{
            "question": "From 45 m, how long is the fall?",
            "options": ["A. 3 s", "B. 4.5 s", "C. 9 s", "D. 1 s"],
            "answer": "A. 3 s",
            "explanation": "$t = \\sqrt{2h/g}$"
        }]},
        "tts_summary": "The ball lands after about two seconds."
    })
}
