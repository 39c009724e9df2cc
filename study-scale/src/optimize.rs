// SPDX-License-Identifier: MIT
//! # Upload Optimizer
//!
//! Decodes an arbitrary encoded image, caps its width with [`build_plan`], and
//! re-encodes it as JPEG at the configured quality. The source bytes are never
//! modified; the result is a fresh buffer.
//!
//! ```text
//! encoded bytes ──decode──▶ RGB8 ──scale_rgb_cpu──▶ RGB8 (≤ max_width) ──JPEG(q)──▶ OptimizedImage
//! ```

use fast_image_resize::Resizer;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageError, RgbImage};
use tracing::debug;

use crate::cpu::{output_len, scale_rgb_cpu, ScaleError};
use crate::data_url::{self, DataUrlError};
use crate::presets::{build_plan, OptimizeConfig, Size};

#[derive(Debug)]
pub enum OptimizeError {
    /// The input is not an image the decoder understands.
    Decode(ImageError),
    /// A drawing surface for the output could not be set up.
    Surface(String),
    Resize(ScaleError),
    Encode(ImageError),
    DataUrl(DataUrlError),
    InvalidConfig(String),
}

impl std::fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizeError::Decode(e) => write!(f, "Could not decode image: {}", e),
            OptimizeError::Surface(reason) => write!(f, "No rendering surface available: {}", reason),
            OptimizeError::Resize(e) => write!(f, "Resize failed: {}", e),
            OptimizeError::Encode(e) => write!(f, "JPEG encoding failed: {}", e),
            OptimizeError::DataUrl(e) => write!(f, "Invalid image payload: {}", e),
            OptimizeError::InvalidConfig(reason) => write!(f, "Invalid optimizer configuration: {}", reason),
        }
    }
}

impl std::error::Error for OptimizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OptimizeError::Decode(e) | OptimizeError::Encode(e) => Some(e),
            OptimizeError::Resize(e) => Some(e),
            OptimizeError::DataUrl(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ScaleError> for OptimizeError { fn from(e: ScaleError) -> Self { Self::Resize(e) } }
impl From<DataUrlError> for OptimizeError { fn from(e: DataUrlError) -> Self { Self::DataUrl(e) } }

/// Re-encoded, size-bounded image ready for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptimizedImage {
    /// JPEG bytes
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl OptimizedImage {
    pub const MIME_TYPE: &'static str = "image/jpeg";

    /// Encode as a `data:image/jpeg;base64,...` URL.
    pub fn to_data_url(&self) -> String {
        data_url::encode(Self::MIME_TYPE, &self.bytes)
    }
}

/// Down-scale and re-encode `source` according to `config`.
///
/// The output width is `min(source width, config.max_width)` with the height scaled
/// proportionally; the encoding is always JPEG at `config.quality`.
pub fn optimize(source: &[u8], config: &OptimizeConfig) -> Result<OptimizedImage, OptimizeError> {
    config.validate().map_err(OptimizeError::InvalidConfig)?;

    let decoded = image::load_from_memory(source).map_err(OptimizeError::Decode)?;
    let input = Size {
        w: decoded.width(),
        h: decoded.height(),
    };
    if input.w == 0 || input.h == 0 {
        return Err(OptimizeError::Surface(format!("{}x{} source", input.w, input.h)));
    }

    let plan = build_plan(input, config.max_width);
    let src_rgb = decoded.to_rgb8();

    let mut dst = vec![0u8; output_len(&plan)];
    let mut resizer = Resizer::new();
    scale_rgb_cpu(&mut resizer, src_rgb.as_raw(), &plan, &mut dst)?;

    let canvas = RgbImage::from_raw(plan.out.w, plan.out.h, dst)
        .ok_or_else(|| OptimizeError::Surface("output buffer does not match canvas".to_string()))?;

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, config.quality)
        .encode_image(&canvas)
        .map_err(OptimizeError::Encode)?;

    debug!(
        src_w = input.w,
        src_h = input.h,
        out_w = plan.out.w,
        out_h = plan.out.h,
        quality = config.quality,
        src_bytes = source.len(),
        out_bytes = bytes.len(),
        "optimized image"
    );

    Ok(OptimizedImage {
        bytes,
        width: plan.out.w,
        height: plan.out.h,
        quality: config.quality,
    })
}

/// Same as [`optimize`], for images carried as a data URL or bare base64 string.
/// Returns the optimized image as a JPEG data URL.
pub fn optimize_data_url(payload: &str, config: &OptimizeConfig) -> Result<String, OptimizeError> {
    let decoded = data_url::decode(payload)?;
    Ok(optimize(&decoded.bytes, config)?.to_data_url())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = optimize(b"definitely not an image", &OptimizeConfig::default()).unwrap_err();
        assert!(matches!(err, OptimizeError::Decode(_)));
    }

    #[test]
    fn invalid_config_is_rejected_before_decoding() {
        let err = optimize(&png(4, 4), &OptimizeConfig::new(0, 40)).unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidConfig(_)));
    }

    #[test]
    fn source_is_left_untouched() {
        let source = png(300, 200);
        let before = source.clone();
        let _ = optimize(&source, &OptimizeConfig::new(100, 40)).unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn data_url_output_is_jpeg() {
        let url = data_url::encode("image/png", &png(50, 20));
        let out = optimize_data_url(&url, &OptimizeConfig::new(25, 50)).unwrap();
        assert!(out.starts_with("data:image/jpeg;base64,"));

        let back = data_url::decode(&out).unwrap();
        let img = image::load_from_memory(&back.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (25, 10));
    }
}
