//! Separable Gaussian smoothing and order statistics.
//!
//! Design
//! - Kernels are sampled Gaussians truncated at `round(4σ)` taps on each side
//!   and normalized to unit sum.
//! - Borders mirror the signal including the edge sample
//!   (`d c b a | a b c d | d c b a`), so constant inputs stay constant.
//! - 2D smoothing applies the same 1D kernel horizontally, then vertically.
//!
//! Percentiles interpolate linearly between the two closest ranks, which is
//! the convention the tuning constants (85th/70th percentile) were chosen for.
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order), centred on the middle tap.
    fn taps(&self) -> &[f32];

    fn radius(&self) -> usize {
        self.taps().len() / 2
    }
}

/// Normalized, truncated Gaussian kernel.
#[derive(Clone, Debug)]
pub struct GaussianFilter {
    taps: Vec<f32>,
}

impl GaussianFilter {
    pub fn new(sigma: f32) -> Self {
        let sigma = sigma.max(0.0);
        let radius = (4.0 * sigma + 0.5) as usize;
        if radius == 0 {
            return Self { taps: vec![1.0] };
        }
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (0..=2 * radius)
            .map(|i| {
                let x = i as f32 - radius as f32;
                (-x * x / denom).exp()
            })
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in taps.iter_mut() {
            *t /= sum;
        }
        Self { taps }
    }
}

impl SeparableFilter for GaussianFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Mirror an out-of-range index back into `[0, n)`.
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    if n == 1 {
        return 0;
    }
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - 1 - m }) as usize
}

/// Convolve a 1D signal with a separable filter.
pub fn smooth_1d<F: SeparableFilter>(signal: &[f32], filter: &F) -> Vec<f32> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }
    let taps = filter.taps();
    let radius = filter.radius() as isize;
    (0..n)
        .map(|i| {
            taps.iter()
                .enumerate()
                .map(|(k, &w)| w * signal[reflect(i as isize + k as isize - radius, n)])
                .sum()
        })
        .collect()
}

/// Horizontal then vertical pass of `filter` over `img`.
pub fn smooth_2d<F: SeparableFilter>(img: &ImageF32, filter: &F) -> ImageF32 {
    let (w, h) = (img.w, img.h);
    let mut tmp = ImageF32::new(w, h);
    for y in 0..h {
        let smoothed = smooth_1d(img.row(y), filter);
        tmp.row_mut(y).copy_from_slice(&smoothed);
    }
    let mut out = ImageF32::new(w, h);
    let mut column = vec![0.0f32; h];
    for x in 0..w {
        for (y, c) in column.iter_mut().enumerate() {
            *c = tmp.get(x, y);
        }
        for (y, v) in smooth_1d(&column, filter).into_iter().enumerate() {
            out.set(x, y, v);
        }
    }
    out
}

/// `q`-th percentile (0..=100) with linear interpolation between ranks.
///
/// Returns 0 for an empty slice; NaNs sort last.
pub fn percentile(values: &[f32], q: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
