// SPDX-License-Identifier: MIT
//! # Scaling Presets and Plan Computation
//!
//! This module decides the output geometry and encoder quality for an upload.
//! The only constraint applied is a maximum width: anything wider is scaled down
//! proportionally, anything at or below the limit keeps its pixel dimensions.
//!
//! ## Budget Strategy
//!
//! The inference proxy sits behind a request-size ceiling (4.5 MB on the hosted
//! deployment). A 1024px-wide JPEG at quality 40 stays far below it while keeping
//! handwriting and printed formulas legible, which is what the `Budget` preset encodes.
//!
//! - **Budget**: 1024px wide, quality 40 (default)
//! - **Balanced**: 1280px wide, quality 60
//! - **Detail**: 1600px wide, quality 80 (dense worksheets, small print)

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Complete scaling plan computed from the source size and the width cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Width cap used for planning
    pub max_width: u32,
    /// Final computed output dimensions
    pub out: Size,
}

impl ScalePlan {
    /// True when the plan leaves the pixel dimensions untouched.
    pub fn is_identity(&self) -> bool {
        self.input == self.out
    }
}

/// Compute the output size for a source image under a width cap.
///
/// Sources wider than `max_width` come out exactly `max_width` wide with height
/// `round(h * max_width / w)`. Narrower sources are never upscaled.
pub fn build_plan(input: Size, max_width: u32) -> ScalePlan {
    let out = if input.w > max_width {
        Size {
            w: max_width,
            h: scaled_height(input, max_width),
        }
    } else {
        input
    };

    ScalePlan {
        input,
        max_width,
        out,
    }
}

/// Proportional height for a given target width, clamped to at least 1px.
fn scaled_height(input: Size, target_w: u32) -> u32 {
    let h = (input.h as f64 * target_w as f64 / input.w as f64).round() as u32;
    h.max(1)
}

/// Encoder settings applied after resizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptimizeConfig {
    /// Maximum output width in pixels
    pub max_width: u32,
    /// JPEG quality factor, 1-100
    pub quality: u8,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Preset::Budget.config()
    }
}

impl OptimizeConfig {
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self { max_width, quality }
    }

    /// Checks the configuration is usable by the encoder.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_width == 0 {
            return Err("max_width must be greater than 0".to_string());
        }
        if !(1..=100).contains(&self.quality) {
            return Err("quality must be between 1 and 100".to_string());
        }
        Ok(())
    }
}

/// Upload presets trading request size for legibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    /// 1024px wide, quality 40; fits the hosted proxy's body limit with a wide margin
    #[default]
    #[clap(name = "budget")]
    Budget,
    /// 1280px wide, quality 60
    #[clap(name = "balanced")]
    Balanced,
    /// 1600px wide, quality 80; for small print
    #[clap(name = "detail")]
    Detail,
}

impl Preset {
    pub fn config(self) -> OptimizeConfig {
        match self {
            Preset::Budget => OptimizeConfig::new(1024, 40),
            Preset::Balanced => OptimizeConfig::new(1280, 60),
            Preset::Detail => OptimizeConfig::new(1600, 80),
        }
    }
}
