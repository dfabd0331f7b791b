//! Estimator of last resort: height from the share of green pixels.
//!
//! A pixel counts as green when its green channel strictly exceeds red, blue
//! and the configured floor. The ratio maps to meters through three linear
//! pieces (steeper as the frame fills with foliage), clamped. Anything that
//! prevents computing the ratio yields the fixed failure height instead.
use crate::error::{EstimateError, Stage};
use crate::height::clamp_to;
use crate::image::io::load_rgb_image;
use crate::params::FallbackParams;
use image::RgbImage;
use log::{debug, warn};
use serde::Serialize;
use std::path::Path;

/// Result of the fallback estimator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackEstimate {
    pub meters: f64,
    /// `None` when the failure height was used.
    pub green_ratio: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct FallbackEstimator {
    params: FallbackParams,
}

impl FallbackEstimator {
    pub fn new(params: FallbackParams) -> Self {
        Self { params }
    }

    /// Fraction of pixels that count as green.
    pub fn green_ratio(&self, rgb: &RgbImage) -> Result<f64, EstimateError> {
        let total = rgb.width() as usize * rgb.height() as usize;
        if total == 0 {
            return Err(EstimateError::EmptyImage);
        }
        let min_green = self.params.min_green;
        let green = rgb
            .pixels()
            .filter(|p| {
                let [r, g, b] = p.0;
                g > r && g > b && g > min_green
            })
            .count();
        Ok(green as f64 / total as f64)
    }

    /// Piecewise-linear ratio → meters mapping, clamped.
    pub fn estimate_from_ratio(&self, ratio: f64) -> f64 {
        let raw = if ratio > 0.3 {
            15.0 + (ratio - 0.3) * 50.0
        } else if ratio > 0.1 {
            8.0 + (ratio - 0.1) * 35.0
        } else {
            5.0 + ratio * 30.0
        };
        clamp_to(raw, self.params.clamp_m).0
    }

    /// Never fails: an unusable image gives the failure height.
    pub fn estimate(&self, rgb: &RgbImage) -> FallbackEstimate {
        match self.green_ratio(rgb) {
            Ok(ratio) => {
                let meters = self.estimate_from_ratio(ratio);
                debug!("fallback: green ratio {ratio:.4} → {meters:.2} m");
                FallbackEstimate {
                    meters,
                    green_ratio: Some(ratio),
                }
            }
            Err(err) => self.failed(&err),
        }
    }

    /// Decode `path` and estimate; decode failures give the failure height.
    pub fn estimate_path(&self, path: &Path) -> FallbackEstimate {
        match load_rgb_image(path) {
            Ok(rgb) => self.estimate(&rgb),
            Err(err) => self.failed(&err),
        }
    }

    fn failed(&self, err: &EstimateError) -> FallbackEstimate {
        warn!(
            "{}: {err}; using {} m",
            Stage::Fallback,
            self.params.failure_height_m
        );
        FallbackEstimate {
            meters: self.params.failure_height_m,
            green_ratio: None,
        }
    }
}
