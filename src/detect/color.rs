//! Span from the rows covered by foliage-colored pixels.
use super::SpanDetector;
use crate::error::{EstimateError, Stage};
use crate::image::color::hsv_unit;
use crate::image::Mask;
use crate::params::ColorSpanParams;
use crate::profile::{find_peaks, PixelSpan};
use image::RgbImage;
use log::debug;

#[inline]
fn within(v: f32, range: [f32; 2]) -> bool {
    range[0] <= v && v <= range[1]
}

#[derive(Clone, Debug)]
pub struct ColorSpanDetector {
    params: ColorSpanParams,
    min_rows: f64,
}

impl ColorSpanDetector {
    /// `min_rows`: more than this many green rows are needed to report a span.
    pub fn new(params: ColorSpanParams, min_rows: f64) -> Self {
        Self { params, min_rows }
    }

    /// Closed mask of pixels whose unit-scale HSV lies in the foliage ranges.
    pub fn foliage_mask(&self, rgb: &RgbImage) -> Mask {
        let p = &self.params;
        Mask::from_fn(rgb.width() as usize, rgb.height() as usize, |x, y| {
            let [r, g, b] = rgb.get_pixel(x as u32, y as u32).0;
            let [h, s, v] = hsv_unit(r, g, b);
            within(h, p.hue_range) && within(s, p.saturation_range) && within(v, p.value_range)
        })
        .close()
    }
}

impl SpanDetector for ColorSpanDetector {
    fn stage(&self) -> Stage {
        Stage::ColorSpan
    }

    fn detect(&self, rgb: &RgbImage) -> Result<PixelSpan, EstimateError> {
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(EstimateError::EmptyImage);
        }
        let mask = self.foliage_mask(rgb);
        let green_rows = mask.occupied_rows();
        let rows = green_rows.len() as f64;
        if rows <= self.min_rows {
            return Err(EstimateError::BelowThreshold {
                stage: Stage::ColorSpan,
                value: rows,
                threshold: self.min_rows,
            });
        }

        let profile = mask.row_counts();
        let max = profile.iter().copied().fold(0.0f32, f32::max);
        let peaks = find_peaks(&profile, max * self.params.peak_fraction);
        debug!(
            "color-span: {} green rows, {} peaks (max row count {max})",
            green_rows.len(),
            peaks.len()
        );

        PixelSpan::from_peaks(&peaks)
            .or_else(|| PixelSpan::from_rows(&green_rows))
            .ok_or_else(|| EstimateError::no_signal(Stage::ColorSpan, "no green rows"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn detector() -> ColorSpanDetector {
        ColorSpanDetector::new(ColorSpanParams::default(), 50.0)
    }

    #[test]
    fn solid_bar_uses_row_extent() {
        let mut rgb = RgbImage::new(200, 500);
        for y in 100..=400 {
            for x in 80..120 {
                rgb.put_pixel(x, y, Rgb([0, 200, 0]));
            }
        }
        assert_eq!(detector().detect(&rgb).unwrap(), PixelSpan(300));
    }

    #[test]
    fn two_crowns_use_peak_distance() {
        let mut rgb = RgbImage::new(200, 400);
        // trunk-like thin stem between two wide blobs
        for y in 50..=350 {
            for x in 98..102 {
                rgb.put_pixel(x, y, Rgb([30, 140, 40]));
            }
        }
        for (cy, half) in [(100u32, 40u32), (300, 50)] {
            for y in cy - 10..=cy + 10 {
                let w = half - (y as i64 - cy as i64).unsigned_abs() as u32;
                for x in 100 - w..100 + w {
                    rgb.put_pixel(x, y, Rgb([30, 140, 40]));
                }
            }
        }
        assert_eq!(detector().detect(&rgb).unwrap(), PixelSpan(200));
    }

    #[test]
    fn few_green_rows_are_below_threshold() {
        let mut rgb = RgbImage::new(50, 100);
        for y in 10..40 {
            for x in 10..40 {
                rgb.put_pixel(x, y, Rgb([0, 200, 0]));
            }
        }
        assert!(matches!(
            detector().detect(&rgb),
            Err(EstimateError::BelowThreshold { stage: Stage::ColorSpan, .. })
        ));
    }

    #[test]
    fn fractional_row_threshold_is_compared_exactly() {
        let bar = |rows: u32| {
            let mut rgb = RgbImage::new(60, 200);
            for y in 20..20 + rows {
                for x in 20..40 {
                    rgb.put_pixel(x, y, Rgb([0, 200, 0]));
                }
            }
            rgb
        };
        let strict = ColorSpanDetector::new(ColorSpanParams::default(), 55.5);
        assert!(matches!(
            strict.detect(&bar(55)),
            Err(EstimateError::BelowThreshold { threshold, .. }) if threshold == 55.5
        ));
        assert_eq!(strict.detect(&bar(56)).unwrap(), PixelSpan(55));
    }

    #[test]
    fn non_foliage_colors_are_ignored() {
        let rgb = RgbImage::from_pixel(40, 120, Rgb([200, 40, 40]));
        assert_eq!(detector().foliage_mask(&rgb).count(), 0);
        let dark_green = RgbImage::from_pixel(4, 4, Rgb([0, 40, 0]));
        assert_eq!(detector().foliage_mask(&dark_green).count(), 0);
    }
}
