// SPDX-License-Identifier: MIT
//! # study-scale: Upload Optimizer for Problem Photos
//!
//! Camera shots of worksheets come in at 12+ megapixels, far above what the inference
//! proxy accepts in a single request. This crate caps the width, re-encodes as JPEG,
//! and hands back a compact payload the request client can send as a data URL.
//!
//! ## Key Components
//!
//! - [`presets`]: Width-cap plan computation and upload presets
//! - [`cpu`]: CPU scaling via `fast_image_resize` (SIMD-accelerated)
//! - [`optimize`]: decode → scale → JPEG pipeline
//! - [`data_url`]: `data:` URL and bare base64 helpers
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use study_scale::{optimize, OptimizeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let photo = std::fs::read("worksheet.png")?;
//! let upload = optimize(&photo, &OptimizeConfig::default())?;
//! assert!(upload.width <= 1024);
//! let payload = upload.to_data_url();
//! # let _ = payload;
//! # Ok(())
//! # }
//! ```

pub mod cpu;
pub mod data_url;
pub mod optimize;
pub mod presets;

pub use optimize::{optimize, optimize_data_url, OptimizeError, OptimizedImage};
pub use presets::{build_plan, OptimizeConfig, Preset, ScalePlan, Size};
