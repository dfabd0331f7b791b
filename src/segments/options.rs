use serde::{Deserialize, Serialize};

/// Options controlling region growth in the LSD-like extractor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LsdOptions {
    /// Minimum gradient magnitude for grown pixels (Sobel units on 0..255).
    pub magnitude_threshold: f32,
    /// Orientation tolerance around the seed normal in degrees.
    pub angle_tolerance_deg: f32,
    /// Minimum accepted segment length in pixels.
    pub min_length_px: f32,
    /// Minimum number of pixels in a grown region.
    pub min_region_size: usize,
    /// Minimum fraction of region pixels within half the tolerance of the seed.
    pub min_aligned_fraction: f32,
}

impl Default for LsdOptions {
    fn default() -> Self {
        Self {
            magnitude_threshold: 50.0,
            angle_tolerance_deg: 22.5,
            min_length_px: 8.0,
            min_region_size: 12,
            min_aligned_fraction: 0.6,
        }
    }
}
