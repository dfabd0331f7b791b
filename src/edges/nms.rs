//! Canny-style edge map: direction-aligned non-maximum suppression on the
//! Sobel magnitude followed by hysteresis thresholding.
//!
//! For each pixel the gradient direction is quantized to 0°, 45°, 90° or 135°
//! and the magnitude is compared against the two neighbours along it. Ties
//! are broken towards the lower/left neighbour (`>` on one side, `>=` on the
//! other) so a perfect step edge keeps exactly one pixel column.
//!
//! The outermost 1-pixel frame is never marked.
use crate::edges::grad::{sobel_gradients, Grad};
use crate::image::{ImageF32, ImageView, Mask};
use log::debug;

const TAN_22_5_DEG: f32 = 0.41421356237;

const NEIGH_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Thin ridge candidates: pixels that survive NMS with magnitude ≥ `low`.
pub fn run_nms(grad: &Grad, low: f32) -> Mask {
    let w = grad.gx.w;
    let h = grad.gx.h;
    let mut out = Mask::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        let mag_prev = grad.mag.row(y - 1);
        let mag_row = grad.mag.row(y);
        let mag_next = grad.mag.row(y + 1);
        let gx_row = grad.gx.row(y);
        let gy_row = grad.gy.row(y);

        for x in 1..w - 1 {
            let mag = mag_row[x];
            if mag < low || mag <= 0.0 {
                continue;
            }

            let gx = gx_row[x];
            let gy = gy_row[x];
            let abs_gx = gx.abs();
            let abs_gy = gy.abs();
            let same_sign = (gx >= 0.0 && gy >= 0.0) || (gx <= 0.0 && gy <= 0.0);

            // (before, after) along the gradient direction
            let (before, after) = if abs_gx >= abs_gy {
                if abs_gy <= abs_gx * TAN_22_5_DEG {
                    (mag_row[x - 1], mag_row[x + 1])
                } else if same_sign {
                    (mag_prev[x - 1], mag_next[x + 1])
                } else {
                    (mag_next[x - 1], mag_prev[x + 1])
                }
            } else if abs_gx <= abs_gy * TAN_22_5_DEG {
                (mag_prev[x], mag_next[x])
            } else if same_sign {
                (mag_prev[x - 1], mag_next[x + 1])
            } else {
                (mag_next[x - 1], mag_prev[x + 1])
            };

            if mag > before && mag >= after {
                out.set(x, y, true);
            }
        }
    }
    out
}

/// Keep ridge pixels ≥ `high`, plus ridge pixels ≥ `low` 8-connected to them.
pub fn hysteresis(grad: &Grad, ridges: &Mask, high: f32) -> Mask {
    let (w, h) = (ridges.w, ridges.h);
    let mut out = Mask::new(w, h);
    let mut stack = Vec::with_capacity(64);
    for y in 0..h {
        for x in 0..w {
            if !ridges.get(x, y) || out.get(x, y) || grad.mag.get(x, y) < high {
                continue;
            }
            out.set(x, y, true);
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                for (dx, dy) in NEIGH_OFFSETS {
                    let xn = cx as isize + dx;
                    let yn = cy as isize + dy;
                    if xn < 0 || yn < 0 || xn >= w as isize || yn >= h as isize {
                        continue;
                    }
                    let (xn, yn) = (xn as usize, yn as usize);
                    if ridges.get(xn, yn) && !out.get(xn, yn) {
                        out.set(xn, yn, true);
                        stack.push((xn, yn));
                    }
                }
            }
        }
    }
    out
}

/// Binary edge map of `gray` (0..255 scale) with Canny-style thresholds.
///
/// Returns the map together with the gradients it was computed from so
/// callers can reuse orientations.
pub fn canny_edges(gray: &ImageF32, low: f32, high: f32) -> (Mask, Grad) {
    let grad = sobel_gradients(gray);
    let ridges = run_nms(&grad, low);
    let edges = hysteresis(&grad, &ridges, high);
    debug!(
        "canny: {}x{} ridges={} edges={} (low={low}, high={high})",
        gray.w,
        gray.h,
        ridges.count(),
        edges.count()
    );
    (edges, grad)
}
