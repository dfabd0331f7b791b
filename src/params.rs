//! Parameter types configuring the estimation stages.
//!
//! Every struct deserializes with `#[serde(default)]`, so a JSON file only
//! needs the keys it overrides. The defaults are the tuned values the
//! heuristics were calibrated with; the perspective coefficient and the
//! camera calibration factor in particular are empirical, not derived.
use crate::segments::LsdOptions;
use serde::{Deserialize, Serialize};

/// Analyzer-wide parameters. Built once, never mutated by the pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerParams {
    /// Smallest pixel span accepted as a tree (pixels).
    pub min_tree_height_px: f64,
    /// Real height assumed for the reference object when none is given (m).
    pub default_reference_height_m: f64,
    pub reference: ReferenceParams,
    pub edge: EdgeSpanParams,
    pub color: ColorSpanParams,
    pub height: HeightParams,
    pub fallback: FallbackParams,
}

impl AnalyzerParams {
    /// Reject values that would make a stage meaningless, naming the key.
    pub fn validate(&self) -> Result<(), String> {
        let bounds = [
            ("height.reference_clamp_m", self.height.reference_clamp_m),
            ("height.camera.clamp_m", self.height.camera.clamp_m),
            ("fallback.clamp_m", self.fallback.clamp_m),
        ];
        for (key, [lo, hi]) in bounds {
            if !(lo.is_finite() && hi.is_finite()) || lo > hi {
                return Err(format!("{key} must be finite with min <= max, got [{lo}, {hi}]"));
            }
        }
        let positive = [
            ("min_tree_height_px", self.min_tree_height_px),
            ("default_reference_height_m", self.default_reference_height_m),
            ("fallback.failure_height_m", self.fallback.failure_height_m),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{key} must be a positive number, got {value}"));
            }
        }
        Ok(())
    }
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            min_tree_height_px: 50.0,
            default_reference_height_m: 1.7,
            reference: ReferenceParams::default(),
            edge: EdgeSpanParams::default(),
            color: ColorSpanParams::default(),
            height: HeightParams::default(),
            fallback: FallbackParams::default(),
        }
    }
}

/// Reference-object detection: skin tone for a person, lines for a ruler.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceParams {
    /// Inclusive lower HSV bound on the 8-bit scale (H in 0..180).
    pub skin_hsv_low: [u8; 3],
    /// Inclusive upper HSV bound on the 8-bit scale.
    pub skin_hsv_high: [u8; 3],
    /// Box height must exceed this fraction of the image height.
    pub min_height_fraction: f64,
    /// Box width must stay under this fraction of the image width.
    pub max_width_fraction: f64,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Minimum vertical extent of an accepted ruler line (pixels).
    pub min_line_length_px: f32,
    /// Largest gap bridged when chaining collinear pieces (pixels).
    pub max_line_gap_px: f32,
    /// Ruler lines must drift less than this horizontally (pixels).
    pub max_horizontal_deviation_px: f32,
    pub lsd: LsdOptions,
}

impl Default for ReferenceParams {
    fn default() -> Self {
        Self {
            skin_hsv_low: [0, 20, 70],
            skin_hsv_high: [20, 255, 255],
            min_height_fraction: 0.1,
            max_width_fraction: 0.3,
            canny_low: 50.0,
            canny_high: 150.0,
            min_line_length_px: 100.0,
            max_line_gap_px: 10.0,
            max_horizontal_deviation_px: 10.0,
            lsd: LsdOptions::default(),
        }
    }
}

/// Gradient-peak span detector.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSpanParams {
    /// Pre-gradient smoothing of the grayscale image.
    pub image_sigma: f32,
    /// Pixels above this percentile of the magnitude become edges.
    pub magnitude_percentile: f32,
    /// Smoothing of the row profile before peak picking.
    pub profile_sigma: f32,
    /// Peaks must reach this percentile of the smoothed profile.
    pub peak_percentile: f32,
}

impl Default for EdgeSpanParams {
    fn default() -> Self {
        Self {
            image_sigma: 1.0,
            magnitude_percentile: 85.0,
            profile_sigma: 2.0,
            peak_percentile: 70.0,
        }
    }
}

/// Foliage-color span detector. HSV bounds are on the unit scale, inclusive.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSpanParams {
    pub hue_range: [f32; 2],
    pub saturation_range: [f32; 2],
    pub value_range: [f32; 2],
    /// Peaks must reach this fraction of the profile maximum.
    pub peak_fraction: f32,
}

impl Default for ColorSpanParams {
    fn default() -> Self {
        Self {
            hue_range: [0.25, 0.45],
            saturation_range: [0.3, 1.0],
            value_range: [0.2, 1.0],
            peak_fraction: 0.3,
        }
    }
}

/// Pixel span to meters conversion.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightParams {
    /// Reference mode: factor = 1 + span / image_height * coefficient.
    pub perspective_coefficient: f64,
    pub reference_clamp_m: [f64; 2],
    pub camera: CameraParams,
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            perspective_coefficient: 0.1,
            reference_clamp_m: [1.0, 50.0],
            camera: CameraParams::default(),
        }
    }
}

/// Fixed pinhole model used when no reference is available.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    pub sensor_height_mm: f64,
    pub focal_length_mm: f64,
    pub calibration_factor: f64,
    /// `(ratio_upper_bound, distance_m)` pairs, checked in order.
    pub distance_buckets: Vec<(f64, f64)>,
    /// Distance used when the span ratio exceeds every bucket.
    pub near_distance_m: f64,
    pub clamp_m: [f64; 2],
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            sensor_height_mm: 3.0,
            focal_length_mm: 4.0,
            calibration_factor: 1.2,
            distance_buckets: vec![(0.05, 40.0), (0.15, 25.0), (0.3, 15.0), (0.5, 8.0)],
            near_distance_m: 5.0,
            clamp_m: [2.0, 45.0],
        }
    }
}

impl CameraParams {
    /// Vertical field of view in degrees.
    pub fn vertical_fov_deg(&self) -> f64 {
        (2.0 * (self.sensor_height_mm / (2.0 * self.focal_length_mm)).atan()).to_degrees()
    }

    /// Heuristic subject distance for a span occupying `ratio` of the frame.
    pub fn distance_for_ratio(&self, ratio: f64) -> f64 {
        self.distance_buckets
            .iter()
            .find(|(upper, _)| ratio < *upper)
            .map_or(self.near_distance_m, |&(_, d)| d)
    }
}

/// Green-pixel-ratio estimator of last resort.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackParams {
    /// Green channel must exceed this value (8-bit) to count.
    pub min_green: u8,
    /// Returned whenever the image cannot be processed at all (m).
    pub failure_height_m: f64,
    pub clamp_m: [f64; 2],
}

impl Default for FallbackParams {
    fn default() -> Self {
        Self {
            min_green: 100,
            failure_height_m: 12.5,
            clamp_m: [3.0, 35.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let json = r#"{
            "min_tree_height_px": 80.0,
            "height": { "camera": { "calibration_factor": 1.0 } },
            "fallback": { "failure_height_m": 10.0 }
        }"#;
        let params: AnalyzerParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.min_tree_height_px, 80.0);
        assert_eq!(params.height.camera.calibration_factor, 1.0);
        assert_eq!(params.height.camera.sensor_height_mm, 3.0);
        assert_eq!(params.height.perspective_coefficient, 0.1);
        assert_eq!(params.fallback.failure_height_m, 10.0);
        assert_eq!(params.fallback.min_green, 100);
        assert_eq!(params.default_reference_height_m, 1.7);
        assert_eq!(params.reference.skin_hsv_high, [20, 255, 255]);
    }

    #[test]
    fn defaults_validate() {
        assert_eq!(AnalyzerParams::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_or_non_finite_bounds_are_rejected() {
        let mut params = AnalyzerParams::default();
        params.fallback.clamp_m = [35.0, 3.0];
        let err = params.validate().unwrap_err();
        assert!(err.contains("fallback.clamp_m"), "{err}");

        let mut params = AnalyzerParams::default();
        params.height.camera.clamp_m = [2.0, f64::INFINITY];
        assert!(params.validate().unwrap_err().contains("height.camera.clamp_m"));

        let mut params = AnalyzerParams::default();
        params.default_reference_height_m = 0.0;
        assert!(params.validate().unwrap_err().contains("default_reference_height_m"));
    }

    #[test]
    fn serialized_defaults_round_trip() {
        let json = serde_json::to_string(&AnalyzerParams::default()).unwrap();
        let back: AnalyzerParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.height.camera.distance_buckets.len(), 4);
        assert_eq!(back.edge.peak_percentile, 70.0);
    }

    #[test]
    fn camera_fov_and_buckets() {
        let cam = CameraParams::default();
        assert_relative_eq!(cam.vertical_fov_deg(), 41.1120904, epsilon = 1e-6);
        assert_eq!(cam.distance_for_ratio(0.01), 40.0);
        assert_eq!(cam.distance_for_ratio(0.05), 25.0);
        assert_eq!(cam.distance_for_ratio(0.29), 15.0);
        assert_eq!(cam.distance_for_ratio(0.49), 8.0);
        assert_eq!(cam.distance_for_ratio(0.6), 5.0);
    }
}
