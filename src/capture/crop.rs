// # Crop Editor
//
// Pan/zoom crop over a captured frame, locked to a target aspect ratio.
//
// Coordinate model:
//
// ```text
// ┌──────────── frame (W x H) ─────────────┐
// │    ┌──── base box: largest W:H ────┐   │
// │    │      that fits the frame      │   │
// │    │   ┌─ window = base / zoom ─┐  │   │
// │    │   │        (cx, cy)        │  │   │
// │    │   └────────────────────────┘  │   │
// │    └───────────────────────────────┘   │
// └────────────────────────────────────────┘
// ```
//
// The window center is clamped so the window never leaves the frame. After every
// pan or zoom the integer pixel region is recomputed and cached; `region()` is what
// confirmation renders.

use image::{RgbaImage, imageops};
use study_scale::Size;

/// Pixel-space crop rectangle plus the zoom it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub zoom: f64,
}

impl CropRegion {
    pub fn size(&self) -> Size {
        Size {
            w: self.width,
            h: self.height,
        }
    }
}

/// Interactive crop state for one captured frame.
#[derive(Debug, Clone)]
pub struct CropEditor {
    frame: Size,
    aspect: f64,
    max_zoom: f64,
    zoom: f64,
    center: (f64, f64),
    region: CropRegion,
}

impl CropEditor {
    pub const MIN_ZOOM: f64 = 1.0;

    /// Centered crop at zoom 1 over a frame of `frame` pixels.
    pub fn new(frame: Size, aspect: f64, max_zoom: f64) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 4.0 / 3.0 };
        let mut editor = Self {
            frame,
            aspect,
            max_zoom: max_zoom.max(Self::MIN_ZOOM),
            zoom: Self::MIN_ZOOM,
            center: (frame.w as f64 / 2.0, frame.h as f64 / 2.0),
            region: CropRegion {
                x: 0,
                y: 0,
                width: frame.w,
                height: frame.h,
                zoom: Self::MIN_ZOOM,
            },
        };
        editor.recompute();
        editor
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn frame_size(&self) -> Size {
        self.frame
    }

    /// Move the window by `(dx, dy)` frame pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) -> CropRegion {
        if dx.is_finite() && dy.is_finite() {
            self.center.0 += dx;
            self.center.1 += dy;
        }
        self.recompute();
        self.region
    }

    /// Set the zoom factor, clamped to `[1, max_zoom]`. Zooming keeps the window center.
    pub fn set_zoom(&mut self, zoom: f64) -> CropRegion {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(Self::MIN_ZOOM, self.max_zoom);
        }
        self.recompute();
        self.region
    }

    fn window(&self) -> (f64, f64) {
        let (fw, fh) = (self.frame.w as f64, self.frame.h as f64);
        let (bw, bh) = if fw / fh > self.aspect {
            (fh * self.aspect, fh)
        } else {
            (fw, fw / self.aspect)
        };
        ((bw / self.zoom).min(fw), (bh / self.zoom).min(fh))
    }

    fn recompute(&mut self) {
        if self.frame.w == 0 || self.frame.h == 0 {
            self.region = CropRegion {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
                zoom: self.zoom,
            };
            return;
        }

        let (fw, fh) = (self.frame.w as f64, self.frame.h as f64);
        let (ww, wh) = self.window();

        self.center.0 = self.center.0.clamp(ww / 2.0, fw - ww / 2.0);
        self.center.1 = self.center.1.clamp(wh / 2.0, fh - wh / 2.0);

        let width = (ww.round() as u32).clamp(1, self.frame.w);
        let height = (wh.round() as u32).clamp(1, self.frame.h);
        let x = ((self.center.0 - ww / 2.0).round().max(0.0) as u32).min(self.frame.w - width);
        let y = ((self.center.1 - wh / 2.0).round().max(0.0) as u32).min(self.frame.h - height);

        self.region = CropRegion {
            x,
            y,
            width,
            height,
            zoom: self.zoom,
        };
    }
}

/// Copy exactly `region` out of `frame` into a new buffer.
///
/// The region is clipped to the frame, so the output is never larger than the source.
pub fn render_region(frame: &RgbaImage, region: &CropRegion) -> RgbaImage {
    imageops::crop_imm(frame, region.x, region.y, region.width, region.height).to_image()
}
