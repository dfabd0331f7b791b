//! Estimation pipeline.
//!
//! Stages run in a fixed order and each is attempted at most once:
//!
//! 1. decode the photograph (once, to 8-bit RGB);
//! 2. measure the reference object unless the kind is `none`;
//! 3. run every span detector, keeping whichever succeed;
//! 4. average the spans and convert them to meters;
//! 5. if there was no span, or the conversion refused it, use the fallback.
//!
//! Stage errors never escape: they are logged, recorded in the report and
//! turn into "no value" for the next decision. The final height is rounded
//! to two decimals on every path.
use crate::detect::{ColorSpanDetector, EdgeSpanDetector, SpanDetector};
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{EstimationReport, HeightSource, InputDescriptor};
use crate::error::{EstimateError, Stage};
use crate::fallback::{FallbackEstimate, FallbackEstimator};
use crate::height::HeightCalculator;
use crate::image::io::load_rgb_image;
use crate::params::AnalyzerParams;
use crate::profile::{mean_span, PixelSpan};
use crate::reference::{ReferenceCalibrator, ReferenceKind};
use image::RgbImage;
use log::{debug, warn};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

/// Round to two decimals.
#[inline]
pub fn round_cm(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}

/// Immutable, reusable estimation service.
pub struct TreeHeightAnalyzer {
    params: AnalyzerParams,
    reference: ReferenceCalibrator,
    detectors: Vec<Box<dyn SpanDetector>>,
    calculator: HeightCalculator,
    fallback: FallbackEstimator,
}

impl Default for TreeHeightAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerParams::default())
    }
}

impl TreeHeightAnalyzer {
    pub fn new(params: AnalyzerParams) -> Self {
        let min_px = params.min_tree_height_px;
        let detectors: Vec<Box<dyn SpanDetector>> = vec![
            Box::new(EdgeSpanDetector::new(params.edge.clone(), min_px)),
            Box::new(ColorSpanDetector::new(params.color.clone(), min_px)),
        ];
        Self {
            reference: ReferenceCalibrator::new(params.reference.clone()),
            detectors,
            calculator: HeightCalculator::new(params.height.clone(), min_px),
            fallback: FallbackEstimator::new(params.fallback.clone()),
            params,
        }
    }

    pub fn params(&self) -> &AnalyzerParams {
        &self.params
    }

    /// `requested`, or the configured default reference height.
    pub fn reference_height(&self, requested: Option<f64>) -> f64 {
        requested.unwrap_or(self.params.default_reference_height_m)
    }

    /// Height of the tree in the photograph at `path`, in meters.
    ///
    /// `None` only if the pipeline produced a non-finite number; decode and
    /// detection failures still yield a fallback height.
    pub fn estimate_tree_height(
        &self,
        path: &Path,
        kind: ReferenceKind,
        reference_height_m: f64,
    ) -> Option<f64> {
        let height = self
            .estimate_with_report(path, kind, reference_height_m)
            .height_m;
        height.is_finite().then_some(height)
    }

    /// Decode `path` and run the full pipeline, keeping every intermediate.
    pub fn estimate_with_report(
        &self,
        path: &Path,
        kind: ReferenceKind,
        reference_height_m: f64,
    ) -> EstimationReport {
        let start = Instant::now();
        let mut report = EstimationReport::new(kind);
        let loaded = report
            .timings
            .time(Stage::Load.label(), || load_rgb_image(path));
        match loaded {
            Ok(rgb) => self.run(&rgb, reference_height_m, &mut report),
            Err(err) => {
                warn!("{}: {err}", Stage::Load);
                report.note(Stage::Load, &err);
                let fb = report
                    .timings
                    .time(Stage::Fallback.label(), || self.fallback.estimate_path(path));
                self.finish_with_fallback(fb, &mut report);
            }
        }
        report.timings.total_ms = elapsed_ms(start);
        debug!("{}: {}", path.display(), report.summary());
        report
    }

    /// Run the pipeline on an already decoded image.
    pub fn estimate_image(
        &self,
        rgb: &RgbImage,
        kind: ReferenceKind,
        reference_height_m: f64,
    ) -> EstimationReport {
        let start = Instant::now();
        let mut report = EstimationReport::new(kind);
        self.run(rgb, reference_height_m, &mut report);
        report.timings.total_ms = elapsed_ms(start);
        report
    }

    fn run(&self, rgb: &RgbImage, reference_height_m: f64, report: &mut EstimationReport) {
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        report.input = InputDescriptor {
            width: w,
            height: h,
        };
        if w == 0 || h == 0 {
            report.note(Stage::Load, &EstimateError::EmptyImage);
            let fb = self.fallback.estimate(rgb);
            self.finish_with_fallback(fb, report);
            return;
        }

        let reference = if report.reference_kind == ReferenceKind::None {
            None
        } else {
            let kind = report.reference_kind;
            let measured = report.timings.time(Stage::Reference.label(), || {
                self.reference.measure(rgb, kind, reference_height_m)
            });
            match measured {
                Ok(m) => {
                    report.reference_px = Some(m.pixels);
                    Some(m)
                }
                Err(err) => {
                    warn!("{}: {err}", Stage::Reference);
                    report.note(Stage::Reference, &err);
                    None
                }
            }
        };

        let mut spans: Vec<PixelSpan> = Vec::with_capacity(self.detectors.len());
        for detector in &self.detectors {
            let stage = detector.stage();
            match report.timings.time(stage.label(), || detector.detect(rgb)) {
                Ok(span) => {
                    match stage {
                        Stage::EdgeSpan => report.edge_span_px = Some(span.pixels()),
                        Stage::ColorSpan => report.color_span_px = Some(span.pixels()),
                        _ => {}
                    }
                    spans.push(span);
                }
                Err(err) => {
                    warn!("{stage}: {err}");
                    report.note(stage, &err);
                }
            }
        }

        let Some(mean) = mean_span(&spans) else {
            debug!("no span detector succeeded, skipping the height calculator");
            let fb = report
                .timings
                .time(Stage::Fallback.label(), || self.fallback.estimate(rgb));
            self.finish_with_fallback(fb, report);
            return;
        };
        report.mean_span_px = Some(mean);

        let calculated = report.timings.time(Stage::Height.label(), || {
            self.calculator.calculate(mean, h, reference.as_ref())
        });
        match calculated {
            Ok(est) => {
                report.height_m = round_cm(est.meters);
                report.raw_height_m = Some(est.raw_meters);
                report.clamped = est.clamped;
                report.source = HeightSource::from(est.mode);
            }
            Err(err) => {
                warn!("{}: {err}", Stage::Height);
                report.note(Stage::Height, &err);
                let fb = report
                    .timings
                    .time(Stage::Fallback.label(), || self.fallback.estimate(rgb));
                self.finish_with_fallback(fb, report);
            }
        }
    }

    fn finish_with_fallback(&self, fb: FallbackEstimate, report: &mut EstimationReport) {
        report.height_m = round_cm(fb.meters);
        report.green_ratio = fb.green_ratio;
        report.source = if fb.green_ratio.is_some() {
            HeightSource::Fallback
        } else {
            HeightSource::FailureConstant
        };
    }
}

static DEFAULT_ANALYZER: OnceLock<TreeHeightAnalyzer> = OnceLock::new();

/// Estimate with a process-wide analyzer built from default parameters.
pub fn estimate_tree_height(
    path: impl AsRef<Path>,
    kind: ReferenceKind,
    reference_height_m: f64,
) -> Option<f64> {
    DEFAULT_ANALYZER
        .get_or_init(TreeHeightAnalyzer::default)
        .estimate_tree_height(path.as_ref(), kind, reference_height_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn green_bar() -> RgbImage {
        let mut rgb = RgbImage::new(300, 500);
        for y in 100..=400 {
            for x in 120..180 {
                rgb.put_pixel(x, y, Rgb([0, 200, 0]));
            }
        }
        rgb
    }

    fn green_bar_with_person() -> RgbImage {
        let mut rgb = green_bar();
        for y in 150..350 {
            for x in 20..60 {
                rgb.put_pixel(x, y, Rgb([220, 170, 140]));
            }
        }
        rgb
    }

    #[test]
    fn analyzer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TreeHeightAnalyzer>();
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        assert_eq!(round_cm(2.623801), 2.62);
        assert_eq!(round_cm(2.7061), 2.71);
        assert_eq!(round_cm(5.0), 5.0);
    }

    #[test]
    fn black_image_skips_calculator() {
        let report = TreeHeightAnalyzer::default().estimate_image(
            &RgbImage::new(64, 64),
            ReferenceKind::None,
            1.7,
        );
        assert!(!report.used_calculator());
        assert_eq!(report.source, HeightSource::Fallback);
        assert_eq!(report.raw_height_m, None);
        assert_eq!(report.mean_span_px, None);
        assert_eq!(report.height_m, 5.0);
        let stages: Vec<Stage> = report.notes.iter().map(|n| n.stage).collect();
        assert_eq!(stages, vec![Stage::EdgeSpan, Stage::ColorSpan]);
    }

    #[test]
    fn green_bar_uses_camera_mode() {
        let report =
            TreeHeightAnalyzer::default().estimate_image(&green_bar(), ReferenceKind::None, 1.7);
        assert_eq!(report.source, HeightSource::Camera);
        assert_eq!(report.color_span_px, Some(300));
        assert!((2.0..=45.0).contains(&report.height_m));
        assert!((report.height_m - 2.62).abs() < 0.05, "{}", report.summary());
    }

    #[test]
    fn missing_reference_falls_back_to_camera() {
        let report =
            TreeHeightAnalyzer::default().estimate_image(&green_bar(), ReferenceKind::Auto, 1.7);
        assert_eq!(report.reference_px, None);
        assert_eq!(report.source, HeightSource::Camera);
        assert!(report.notes.iter().any(|n| n.stage == Stage::Reference));
    }

    #[test]
    fn configured_reference_height_scales_the_estimate() {
        let rgb = green_bar_with_person();
        let stock = TreeHeightAnalyzer::default();
        let tall = TreeHeightAnalyzer::new(AnalyzerParams {
            default_reference_height_m: 2.5,
            ..AnalyzerParams::default()
        });
        assert_eq!(stock.reference_height(None), 1.7);
        assert_eq!(tall.reference_height(None), 2.5);
        assert_eq!(tall.reference_height(Some(1.7)), 1.7);

        let base = stock.estimate_image(&rgb, ReferenceKind::Auto, stock.reference_height(None));
        let scaled = tall.estimate_image(&rgb, ReferenceKind::Auto, tall.reference_height(None));
        assert_eq!(base.source, HeightSource::Reference);
        assert_eq!(scaled.source, HeightSource::Reference);
        let ratio = scaled.raw_height_m.unwrap() / base.raw_height_m.unwrap();
        assert!((ratio - 2.5 / 1.7).abs() < 1e-9, "ratio {ratio}");
        assert!(scaled.height_m > base.height_m);
    }

    #[test]
    fn inverted_fallback_bounds_do_not_panic() {
        let mut params = AnalyzerParams::default();
        params.fallback.clamp_m = [35.0, 3.0];
        let report = TreeHeightAnalyzer::new(params).estimate_image(
            &RgbImage::new(64, 64),
            ReferenceKind::None,
            1.7,
        );
        assert_eq!(report.source, HeightSource::Fallback);
        assert_eq!(report.height_m, 35.0);
    }

    #[test]
    fn undecodable_file_gives_failure_constant() {
        let analyzer = TreeHeightAnalyzer::default();
        let path = Path::new("/nonexistent/dir/tree.jpg");
        let report = analyzer.estimate_with_report(path, ReferenceKind::Auto, 1.7);
        assert_eq!(report.source, HeightSource::FailureConstant);
        assert_eq!(report.height_m, 12.5);
        assert_eq!(
            analyzer.estimate_tree_height(path, ReferenceKind::Auto, 1.7),
            Some(12.5)
        );
    }

    #[test]
    fn empty_image_gives_failure_constant() {
        let report =
            TreeHeightAnalyzer::default().estimate_image(&RgbImage::new(0, 0), ReferenceKind::None, 1.7);
        assert_eq!(report.height_m, 12.5);
        assert_eq!(report.source, HeightSource::FailureConstant);
    }
}
