//! Reference-object calibration.
//!
//! Two kinds of reference are recognised:
//!
//! - `person`: skin-tone pixels (8-bit HSV bounds, inclusive) are grouped into
//!   8-connected components. The component with the largest area wins and its
//!   bounding box is accepted only if it is tall enough relative to the image
//!   and narrow enough to not be a full-frame false positive. The result is
//!   the inclusive box height in pixels.
//! - `ruler`: a Canny edge map restricts the LSD-like extractor; collinear
//!   pieces are chained across small gaps and the first near-vertical line
//!   (topmost, then leftmost) that is long enough gives the vertical extent.
//!
//! `auto` means `person`; `none` never measures anything.
use crate::edges::canny_edges;
use crate::error::{EstimateError, Stage};
use crate::image::color::hsv_u8;
use crate::image::{ImageF32, Mask};
use crate::params::ReferenceParams;
use crate::segments::{join_vertical_runs, lsd_extract_segments, Segment};
use image::RgbImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which known-size object to look for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    #[default]
    Auto,
    Person,
    Ruler,
    None,
}

impl ReferenceKind {
    /// Parse a caller-supplied name; anything unrecognised disables the
    /// reference stage.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!("unknown reference kind {name:?}, continuing without a reference");
            ReferenceKind::None
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceKind::Auto => "auto",
            ReferenceKind::Person => "person",
            ReferenceKind::Ruler => "ruler",
            ReferenceKind::None => "none",
        }
    }
}

impl FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ReferenceKind::Auto),
            "person" => Ok(ReferenceKind::Person),
            "ruler" => Ok(ReferenceKind::Ruler),
            "none" => Ok(ReferenceKind::None),
            other => Err(format!(
                "unknown reference kind '{other}' (expected auto, person, ruler or none)"
            )),
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel extent of an object with an assumed real-world height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceMeasurement {
    pub pixels: f64,
    pub real_height_m: f64,
}

impl ReferenceMeasurement {
    /// Pixels per meter, if both sides are positive.
    pub fn scale(&self) -> Option<f64> {
        (self.pixels > 0.0 && self.real_height_m > 0.0).then(|| self.pixels / self.real_height_m)
    }
}

/// Inclusive bounding box of a connected component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentBox {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
    pub area: usize,
}

impl ComponentBox {
    pub fn width(&self) -> usize {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0 + 1
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReferenceCalibrator {
    params: ReferenceParams,
}

impl ReferenceCalibrator {
    pub fn new(params: ReferenceParams) -> Self {
        Self { params }
    }

    /// Measure the reference of `kind` in `rgb`, attributing `real_height_m`.
    pub fn measure(
        &self,
        rgb: &RgbImage,
        kind: ReferenceKind,
        real_height_m: f64,
    ) -> Result<ReferenceMeasurement, EstimateError> {
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(EstimateError::EmptyImage);
        }
        let pixels = match kind {
            ReferenceKind::Auto | ReferenceKind::Person => {
                self.person_height_from_mask(&self.skin_mask(rgb))?
            }
            ReferenceKind::Ruler => self.ruler_height(rgb)?,
            ReferenceKind::None => {
                return Err(EstimateError::no_signal(
                    Stage::Reference,
                    "no reference requested",
                ))
            }
        };
        debug!("reference {kind}: {pixels} px for {real_height_m} m");
        Ok(ReferenceMeasurement {
            pixels,
            real_height_m,
        })
    }

    /// Pixels whose 8-bit HSV lies inside the skin bounds.
    pub fn skin_mask(&self, rgb: &RgbImage) -> Mask {
        let lo = self.params.skin_hsv_low;
        let hi = self.params.skin_hsv_high;
        Mask::from_fn(rgb.width() as usize, rgb.height() as usize, |x, y| {
            let [r, g, b] = rgb.get_pixel(x as u32, y as u32).0;
            let hsv = hsv_u8(r, g, b);
            (0..3).all(|c| lo[c] <= hsv[c] && hsv[c] <= hi[c])
        })
    }

    /// Height of the largest component's box, if it passes the size gates.
    pub fn person_height_from_mask(&self, mask: &Mask) -> Result<f64, EstimateError> {
        let largest = connected_components(mask)
            .into_iter()
            .max_by_key(|c| c.area)
            .ok_or_else(|| EstimateError::no_signal(Stage::Reference, "no skin-tone region"))?;

        let (w, h) = (largest.width(), largest.height());
        let min_h = mask.h as f64 * self.params.min_height_fraction;
        let max_w = mask.w as f64 * self.params.max_width_fraction;
        debug!(
            "person candidate: {w}x{h} px, area {} (need h > {min_h:.1}, w < {max_w:.1})",
            largest.area
        );
        if (h as f64) > min_h && (w as f64) < max_w {
            Ok(h as f64)
        } else {
            Err(EstimateError::no_signal(
                Stage::Reference,
                format!("largest skin region {w}x{h} px fails the size gates"),
            ))
        }
    }

    /// Vertical extent of the first long near-vertical line.
    pub fn ruler_height(&self, rgb: &RgbImage) -> Result<f64, EstimateError> {
        let p = &self.params;
        let gray = ImageF32::luma_from_rgb(rgb);
        let (edges, grad) = canny_edges(&gray, p.canny_low, p.canny_high);
        let pieces = lsd_extract_segments(&grad, p.lsd, Some(&edges));
        let lines = join_vertical_runs(&pieces, p.max_line_gap_px, p.max_horizontal_deviation_px);
        debug!("ruler: {} pieces, {} after joining", pieces.len(), lines.len());

        let mut candidates: Vec<&Segment> = lines
            .iter()
            .filter(|s| s.len >= p.min_line_length_px)
            .filter(|s| s.horizontal_deviation() < p.max_horizontal_deviation_px)
            .collect();
        candidates.sort_by(|a, b| {
            let (ta, _) = a.top_bottom();
            let (tb, _) = b.top_bottom();
            ta[1].total_cmp(&tb[1]).then(ta[0].total_cmp(&tb[0]))
        });

        candidates
            .first()
            .map(|s| s.vertical_extent().round() as f64)
            .ok_or_else(|| EstimateError::no_signal(Stage::Reference, "no near-vertical line"))
    }
}

/// 8-connected components of `mask` with their inclusive boxes.
pub fn connected_components(mask: &Mask) -> Vec<ComponentBox> {
    let (w, h) = (mask.w, mask.h);
    let mut seen = vec![false; w * h];
    let mut stack = Vec::new();
    let mut out = Vec::new();
    for start in 0..w * h {
        if seen[start] || !mask.data[start] {
            continue;
        }
        seen[start] = true;
        stack.push(start);
        let mut comp = ComponentBox {
            x0: usize::MAX,
            y0: usize::MAX,
            x1: 0,
            y1: 0,
            area: 0,
        };
        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            comp.x0 = comp.x0.min(x);
            comp.y0 = comp.y0.min(y);
            comp.x1 = comp.x1.max(x);
            comp.y1 = comp.y1.max(y);
            comp.area += 1;
            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let n = ny * w + nx;
                    if !seen[n] && mask.data[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
        out.push(comp);
    }
    out
}
