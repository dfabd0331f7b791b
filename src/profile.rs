//! Vertical projection profiles and 1D peak picking.
//!
//! A profile holds one value per image row. Peaks are strict local maxima
//! with plateau handling:
//!
//! - the first and last samples are never peaks;
//! - a flat run that rises on the left and falls on the right reports its
//!   middle sample, `(left + right) / 2` rounded down;
//! - a peak qualifies when its value is at least `min_height`.
//!
//! Peaks come back in ascending row order.
use serde::Serialize;

/// Row indices of qualifying local maxima in `profile`, ascending.
pub fn find_peaks(profile: &[f32], min_height: f32) -> Vec<usize> {
    let n = profile.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }
    let last = n - 1;
    let mut i = 1;
    while i < last {
        if profile[i - 1] < profile[i] {
            let mut ahead = i + 1;
            while ahead < last && profile[ahead] == profile[i] {
                ahead += 1;
            }
            if profile[ahead] < profile[i] {
                let mid = (i + ahead - 1) / 2;
                if profile[mid] >= min_height {
                    peaks.push(mid);
                }
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Apparent vertical extent of the tree, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PixelSpan(pub usize);

impl PixelSpan {
    /// Distance between the first and last peak; needs at least two peaks.
    pub fn from_peaks(peaks: &[usize]) -> Option<Self> {
        match (peaks.first(), peaks.last()) {
            (Some(&first), Some(&last)) if peaks.len() >= 2 => {
                Some(Self(last.saturating_sub(first)))
            }
            _ => None,
        }
    }

    /// Distance between the first and last occupied row.
    pub fn from_rows(rows: &[usize]) -> Option<Self> {
        Some(Self(rows.last()?.saturating_sub(*rows.first()?)))
    }

    #[inline]
    pub fn pixels(self) -> usize {
        self.0
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

/// Arithmetic mean of the spans that are present.
pub fn mean_span(spans: &[PixelSpan]) -> Option<f64> {
    if spans.is_empty() {
        return None;
    }
    Some(spans.iter().map(|s| s.as_f64()).sum::<f64>() / spans.len() as f64)
}
