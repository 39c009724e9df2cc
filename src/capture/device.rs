// # Camera Device Abstraction
//
// The capture pipeline needs three capabilities from the platform:
//
// - acquire a live video stream from a camera (`CameraDevice::acquire_stream`)
// - draw the current frame into a pixel buffer (`VideoStream::draw_frame`)
// - encode a pixel buffer into a lossy image (`FrameEncoder::encode_lossy`)
//
// Native backends and test doubles implement these traits; the scanner state
// machine only talks to the traits.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use study_scale::Size;

use crate::error::{StudyError, StudyResult};

/// Which camera to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Rear camera, pointed at the worksheet
    #[default]
    Environment,
    /// Front camera
    User,
}

/// Parameters for opening a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing: Facing,
    /// Preferred frame width. Devices pick the closest mode they support.
    pub ideal_width: u32,
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            ideal_width: 1920,
        }
    }
}

/// Source of camera streams.
#[async_trait]
pub trait CameraDevice: Send {
    /// Opens a live stream.
    ///
    /// Fails with [`StudyError::Device`] when the camera is missing or access is
    /// denied; `denied` on the error tells the two apart.
    async fn acquire_stream(&mut self, request: &StreamRequest) -> StudyResult<Box<dyn VideoStream>>;
}

/// A live camera stream. Holding one keeps the camera busy.
pub trait VideoStream: Send {
    /// Native frame size of the stream.
    fn size(&self) -> Size;

    /// Copy the current frame into a new RGBA buffer.
    fn draw_frame(&mut self) -> StudyResult<RgbaImage>;

    /// Release the camera. Calling it again is a no-op.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Lossy still-image encoder.
pub trait FrameEncoder: Send + Sync {
    /// MIME type of the produced bytes.
    fn mime_type(&self) -> &'static str;

    fn encode_lossy(&self, frame: &RgbaImage, quality: u8) -> StudyResult<Vec<u8>>;
}

/// JPEG encoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegFrameEncoder;

impl FrameEncoder for JpegFrameEncoder {
    fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    fn encode_lossy(&self, frame: &RgbaImage, quality: u8) -> StudyResult<Vec<u8>> {
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
        let mut bytes = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| StudyError::processing("encode_lossy", e.to_string()))?;
        Ok(bytes.into_inner())
    }
}

/// One still taken from the stream. Immutable once captured.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub pixels: Arc<RgbaImage>,
    /// Quality used whenever the frame is exported on its own
    pub quality: u8,
}

impl CapturedFrame {
    pub fn new(pixels: RgbaImage, quality: u8) -> Self {
        Self {
            pixels: Arc::new(pixels),
            quality,
        }
    }

    pub fn size(&self) -> Size {
        Size {
            w: self.pixels.width(),
            h: self.pixels.height(),
        }
    }

    /// Encode the whole frame with its configured quality.
    pub fn encode(&self, encoder: &dyn FrameEncoder) -> StudyResult<Vec<u8>> {
        encoder.encode_lossy(&self.pixels, self.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn jpeg_encoder_drops_alpha_and_keeps_size() {
        let frame = RgbaImage::from_pixel(40, 30, Rgba([10, 200, 30, 128]));
        let bytes = JpegFrameEncoder.encode_lossy(&frame, 92).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn captured_frame_reports_size() {
        let frame = CapturedFrame::new(RgbaImage::new(64, 48), 92);
        assert_eq!(frame.size(), Size { w: 64, h: 48 });
        let bytes = frame.encode(&JpegFrameEncoder).unwrap();
        assert!(!bytes.is_empty());
    }
}
