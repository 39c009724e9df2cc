// # Still-Image Camera
//
// A `CameraDevice` that serves an image file as the camera feed. Used by the CLI on
// machines without a camera API binding, and handy for scripted runs: every frame
// drawn from the stream is the file's pixels, scaled down to the requested ideal
// width the way a real camera would pick its closest mode.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::{RgbaImage, imageops};
use study_scale::{Size, build_plan};
use tracing::{debug, info};

use crate::capture::device::{CameraDevice, StreamRequest, VideoStream};
use crate::error::{StudyError, StudyResult};

/// Camera backed by an image file on disk.
#[derive(Debug, Clone)]
pub struct StillCamera {
    path: PathBuf,
}

impl StillCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CameraDevice for StillCamera {
    async fn acquire_stream(&mut self, request: &StreamRequest) -> StudyResult<Box<dyn VideoStream>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            StudyError::device(format!("{}: {}", self.path.display(), e), false)
                .with_operation("acquire_stream")
                .with_recovery_suggestion("Check the image path passed as the camera source")
        })?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| StudyError::device(format!("unreadable camera source: {}", e), false))?
            .to_rgba8();

        let native = Size {
            w: decoded.width(),
            h: decoded.height(),
        };
        let plan = build_plan(native, request.ideal_width.max(1));
        let pixels = if plan.is_identity() {
            decoded
        } else {
            imageops::resize(&decoded, plan.out.w, plan.out.h, imageops::FilterType::Triangle)
        };

        info!(
            "  Camera stream from {} ({}x{}, {:?})",
            self.path.display(),
            pixels.width(),
            pixels.height(),
            request.facing
        );

        Ok(Box::new(StillStream {
            pixels: Arc::new(pixels),
            live: true,
        }))
    }
}

/// Stream handed out by [`StillCamera`].
#[derive(Debug)]
pub struct StillStream {
    pixels: Arc<RgbaImage>,
    live: bool,
}

impl VideoStream for StillStream {
    fn size(&self) -> Size {
        Size {
            w: self.pixels.width(),
            h: self.pixels.height(),
        }
    }

    fn draw_frame(&mut self) -> StudyResult<RgbaImage> {
        if !self.live {
            return Err(StudyError::state("stopped", "draw_frame"));
        }
        Ok(self.pixels.as_ref().clone())
    }

    fn stop(&mut self) {
        if self.live {
            debug!("still camera stream released");
        }
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[tokio::test]
    async fn serves_file_scaled_to_ideal_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.png");
        RgbaImage::from_pixel(400, 300, Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let mut camera = StillCamera::new(&path);
        let request = StreamRequest {
            ideal_width: 200,
            ..StreamRequest::default()
        };
        let mut stream = camera.acquire_stream(&request).await.unwrap();
        assert_eq!(stream.size(), Size { w: 200, h: 150 });

        let frame = stream.draw_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (200, 150));

        stream.stop();
        stream.stop();
        assert!(!stream.is_live());
        assert!(stream.draw_frame().is_err());
    }

    #[tokio::test]
    async fn missing_file_is_a_device_error() {
        let mut camera = StillCamera::new("/definitely/not/here.png");
        let err = camera.acquire_stream(&StreamRequest::default()).await.err().unwrap();
        assert!(matches!(err, StudyError::Device { denied: false, .. }));
    }
}
