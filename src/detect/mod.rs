//! Pixel-span detectors.
//!
//! Each detector looks at the whole photograph and reports the vertical
//! extent of what it believes is the tree. They are independent; the
//! analyzer runs all of them and averages whichever succeed.
mod color;
mod edge;

pub use color::ColorSpanDetector;
pub use edge::EdgeSpanDetector;

use crate::error::{EstimateError, Stage};
use crate::profile::PixelSpan;
use image::RgbImage;

/// A heuristic that measures the tree's apparent height in pixels.
pub trait SpanDetector: Send + Sync {
    /// Stage name used in logs and reports.
    fn stage(&self) -> Stage;

    fn detect(&self, rgb: &RgbImage) -> Result<PixelSpan, EstimateError>;
}
