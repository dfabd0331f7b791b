//! Pixel span → meters.
//!
//! Reference mode scales by the reference object's pixels per meter and adds
//! a small upward correction that grows with the fraction of the frame the
//! tree fills. Camera mode assumes a fixed pinhole camera, guesses the
//! subject distance from that same fraction and converts the angular size.
//! Both modes clamp their result and report whether clamping happened.
use crate::error::{EstimateError, Stage};
use crate::params::HeightParams;
use crate::reference::ReferenceMeasurement;
use log::debug;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CalculationMode {
    Reference,
    Camera,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightEstimate {
    /// Clamped height in meters.
    pub meters: f64,
    /// Height before clamping.
    pub raw_meters: f64,
    pub clamped: bool,
    pub mode: CalculationMode,
}

/// Clamp `value` into `[bounds[0], bounds[1]]`, flagging out-of-range input.
///
/// Inverted bounds never panic: the lower bound wins.
pub(crate) fn clamp_to(value: f64, bounds: [f64; 2]) -> (f64, bool) {
    let [lo, hi] = bounds;
    let clamped = value.min(hi).max(lo);
    (clamped, clamped != value)
}

#[derive(Clone, Debug)]
pub struct HeightCalculator {
    params: HeightParams,
    min_span_px: f64,
}

impl HeightCalculator {
    pub fn new(params: HeightParams, min_span_px: f64) -> Self {
        Self {
            params,
            min_span_px,
        }
    }

    /// Convert `span` pixels in an image `image_height` rows tall.
    ///
    /// A reference with a usable scale selects reference mode; otherwise the
    /// camera model is used.
    pub fn calculate(
        &self,
        span: f64,
        image_height: usize,
        reference: Option<&ReferenceMeasurement>,
    ) -> Result<HeightEstimate, EstimateError> {
        if span.is_nan() || span <= 0.0 || span < self.min_span_px {
            return Err(EstimateError::BelowThreshold {
                stage: Stage::Height,
                value: span,
                threshold: self.min_span_px,
            });
        }
        if image_height == 0 {
            return Err(EstimateError::EmptyImage);
        }
        let frame_ratio = span / image_height as f64;

        let (raw, bounds, mode) = match reference.and_then(ReferenceMeasurement::scale) {
            Some(px_per_m) => {
                let factor = 1.0 + frame_ratio * self.params.perspective_coefficient;
                (
                    span / px_per_m * factor,
                    self.params.reference_clamp_m,
                    CalculationMode::Reference,
                )
            }
            None => {
                let cam = &self.params.camera;
                let angular_deg = span * cam.vertical_fov_deg() / image_height as f64;
                let distance = cam.distance_for_ratio(frame_ratio);
                let height = 2.0 * distance * (angular_deg / 2.0).to_radians().tan();
                (
                    height * cam.calibration_factor,
                    cam.clamp_m,
                    CalculationMode::Camera,
                )
            }
        };

        let (meters, clamped) = clamp_to(raw, bounds);
        if clamped {
            debug!("height: {raw:.2} m outside {bounds:?}, clamped to {meters:.2}");
        }
        debug!("height: span {span:.1}px of {image_height}, {mode:?} mode → {meters:.3} m");
        Ok(HeightEstimate {
            meters,
            raw_meters: raw,
            clamped,
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn calc() -> HeightCalculator {
        HeightCalculator::new(HeightParams::default(), 50.0)
    }

    fn reference(pixels: f64) -> ReferenceMeasurement {
        ReferenceMeasurement {
            pixels,
            real_height_m: 1.7,
        }
    }

    #[test]
    fn reference_mode_applies_perspective_factor() {
        let est = calc().calculate(300.0, 500, Some(&reference(200.0))).unwrap();
        assert_eq!(est.mode, CalculationMode::Reference);
        assert_relative_eq!(est.meters, 300.0 / (200.0 / 1.7) * 1.06, epsilon = 1e-9);
        assert!(!est.clamped);
    }

    #[test]
    fn camera_mode_for_large_span() {
        let est = calc().calculate(300.0, 500, None).unwrap();
        assert_eq!(est.mode, CalculationMode::Camera);
        assert_relative_eq!(est.meters, 2.6238017, epsilon = 1e-6);
    }

    #[test]
    fn camera_mode_clamps_to_minimum() {
        // ratio 0.1 → 25 m, angular size ≈ 4.1°, height ≈ 2.15 m
        let est = calc().calculate(100.0, 1000, None).unwrap();
        assert!(est.meters >= 2.0 && est.meters <= 45.0);
        let tiny = calc().calculate(50.0, 4000, None).unwrap();
        assert!(tiny.clamped);
        assert_eq!(tiny.meters, 2.0);
    }

    #[test]
    fn reference_mode_clamps_both_ends() {
        let tall = calc().calculate(3000.0, 4000, Some(&reference(60.0))).unwrap();
        assert_eq!(tall.meters, 50.0);
        assert!(tall.clamped && tall.raw_meters > 50.0);
        let short = calc().calculate(60.0, 4000, Some(&reference(1000.0))).unwrap();
        assert_eq!(short.meters, 1.0);
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        assert_eq!(clamp_to(10.0, [35.0, 3.0]), (35.0, true));
        assert_eq!(clamp_to(7.0, [3.0, 35.0]), (7.0, false));
        let mut params = HeightParams::default();
        params.camera.clamp_m = [45.0, 2.0];
        let est = HeightCalculator::new(params, 50.0)
            .calculate(300.0, 500, None)
            .unwrap();
        assert_eq!(est.meters, 45.0);
        assert!(est.clamped);
    }

    #[test]
    fn unusable_reference_selects_camera_mode() {
        let zero = ReferenceMeasurement {
            pixels: 200.0,
            real_height_m: 0.0,
        };
        let est = calc().calculate(300.0, 500, Some(&zero)).unwrap();
        assert_eq!(est.mode, CalculationMode::Camera);
    }

    #[test]
    fn small_or_zero_spans_are_rejected() {
        for span in [0.0, 49.9, f64::NAN] {
            assert!(matches!(
                calc().calculate(span, 500, None),
                Err(EstimateError::BelowThreshold { stage: Stage::Height, .. })
            ));
        }
        assert!(calc().calculate(50.0, 500, None).is_ok());
    }
}
