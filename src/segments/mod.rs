//! Lightweight LSD-like segment extractor.
//!
//! The extractor works on precomputed Sobel gradients:
//!
//! - Region growing from seeds using orientation consistency: 8-connected
//!   pixels whose gradient orientation is within a tolerance of the seed
//!   orientation are grown into a region, subject to a minimum magnitude.
//! - PCA line fitting: pixel coordinates are summarized online and the 2x2
//!   covariance is eigendecomposed to obtain the principal direction.
//! - Endpoints come from projecting region pixels onto that axis.
//! - Significance tests require a minimum region size, minimum length and a
//!   minimum fraction of pixels aligned with the seed.
//!
//! An optional edge mask (typically the Canny map) restricts which pixels may
//! seed or join a region, which keeps segments one ridge thick.
//!
//! Orientation is taken modulo π; see `angle::normalize_half_pi`.

mod extractor;
mod join;
mod options;
mod region;
mod segment;

pub use join::join_vertical_runs;
pub use options::LsdOptions;
pub use segment::Segment;

use crate::edges::Grad;
use crate::image::Mask;

/// Extract line segments from `grad`, optionally restricted to `mask`.
pub fn lsd_extract_segments(grad: &Grad, options: LsdOptions, mask: Option<&Mask>) -> Vec<Segment> {
    extractor::LsdExtractor::new(grad, mask, options).extract()
}

#[cfg(test)]
mod tests;
