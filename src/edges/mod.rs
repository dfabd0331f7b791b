//! Edge processing utilities: image gradients and a Canny-style edge map.
//!
//! - Gradient computation (Sobel) returning `gx`, `gy` and magnitude. The
//!   edge-based span detector thresholds this magnitude directly.
//! - Direction-aligned non-maximum suppression plus hysteresis, producing a
//!   thin binary edge map for straight-line (ruler) extraction.
//!
//! Borders are handled by clamping indices (replicate).

pub mod grad;
pub mod nms;

/// Per-pixel gradients with magnitude.
pub use grad::{sobel_gradients, Grad};
/// Thin binary edge map with hysteresis.
pub use nms::canny_edges;
