//! Span from gradient-magnitude peaks.
//!
//! gray → Gaussian(σ₁) → Sobel magnitude → keep pixels above the magnitude
//! percentile → closing → per-row counts → Gaussian(σ₂) → peaks at or above
//! the profile percentile. The span is last peak minus first peak and must
//! exceed the minimum tree height.
use super::SpanDetector;
use crate::edges::sobel_gradients;
use crate::error::{EstimateError, Stage};
use crate::filters::{percentile, smooth_1d, smooth_2d, GaussianFilter};
use crate::image::{ImageF32, Mask};
use crate::params::EdgeSpanParams;
use crate::profile::{find_peaks, PixelSpan};
use image::RgbImage;
use log::debug;

#[derive(Clone, Debug)]
pub struct EdgeSpanDetector {
    params: EdgeSpanParams,
    min_span_px: f64,
}

impl EdgeSpanDetector {
    pub fn new(params: EdgeSpanParams, min_span_px: f64) -> Self {
        Self {
            params,
            min_span_px,
        }
    }

    /// Closed mask of the strongest edges in `gray`.
    pub fn edge_mask(&self, gray: &ImageF32) -> Mask {
        let smoothed = smooth_2d(gray, &GaussianFilter::new(self.params.image_sigma));
        let grad = sobel_gradients(&smoothed);
        let thresh = percentile(&grad.mag.data, self.params.magnitude_percentile);
        let mask = Mask {
            w: gray.w,
            h: gray.h,
            data: grad.mag.data.iter().map(|&m| m > thresh).collect(),
        };
        debug!(
            "edge-span: magnitude p{} = {thresh:.2}, {} edge px",
            self.params.magnitude_percentile,
            mask.count()
        );
        mask.close()
    }

    /// Peaks of the smoothed row profile of `mask`.
    pub fn profile_peaks(&self, mask: &Mask) -> Vec<usize> {
        let profile = smooth_1d(
            &mask.row_counts(),
            &GaussianFilter::new(self.params.profile_sigma),
        );
        let min_height = percentile(&profile, self.params.peak_percentile);
        let peaks = find_peaks(&profile, min_height);
        debug!(
            "edge-span: {} peaks at or above {min_height:.2}",
            peaks.len()
        );
        peaks
    }
}

impl SpanDetector for EdgeSpanDetector {
    fn stage(&self) -> Stage {
        Stage::EdgeSpan
    }

    fn detect(&self, rgb: &RgbImage) -> Result<PixelSpan, EstimateError> {
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(EstimateError::EmptyImage);
        }
        let gray = ImageF32::luma_from_rgb(rgb);
        let peaks = self.profile_peaks(&self.edge_mask(&gray));
        let span = PixelSpan::from_peaks(&peaks).ok_or_else(|| {
            EstimateError::no_signal(
                Stage::EdgeSpan,
                format!("{} profile peak(s), need two", peaks.len()),
            )
        })?;
        if span.as_f64() > self.min_span_px {
            Ok(span)
        } else {
            Err(EstimateError::BelowThreshold {
                stage: Stage::EdgeSpan,
                value: span.as_f64(),
                threshold: self.min_span_px,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn detector() -> EdgeSpanDetector {
        EdgeSpanDetector::new(EdgeSpanParams::default(), 50.0)
    }

    #[test]
    fn bar_outline_spans_its_rows() {
        let mut rgb = RgbImage::new(300, 500);
        for y in 100..=400 {
            for x in 120..180 {
                rgb.put_pixel(x, y, Rgb([0, 200, 0]));
            }
        }
        let span = detector().detect(&rgb).unwrap();
        assert!(
            (297..=303).contains(&span.pixels()),
            "edge span {}",
            span.pixels()
        );
    }

    #[test]
    fn flat_image_has_no_peaks() {
        let rgb = RgbImage::from_pixel(64, 64, Rgb([90, 90, 90]));
        assert!(matches!(
            detector().detect(&rgb),
            Err(EstimateError::NoSignal { stage: Stage::EdgeSpan, .. })
        ));
    }

    #[test]
    fn short_object_is_below_threshold() {
        let mut rgb = RgbImage::new(200, 200);
        for y in 80..=110 {
            for x in 60..140 {
                rgb.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        assert!(matches!(
            detector().detect(&rgb),
            Err(EstimateError::BelowThreshold { .. })
        ));
    }

    #[test]
    fn mask_matches_image_shape() {
        let gray = ImageF32::new(33, 17);
        let mask = detector().edge_mask(&gray);
        assert_eq!((mask.w, mask.h, mask.data.len()), (33, 17, 33 * 17));
    }
}
