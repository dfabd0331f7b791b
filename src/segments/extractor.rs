use super::options::LsdOptions;
use super::region::Region;
use super::segment::Segment;
use crate::angle::{angular_difference, normalize_half_pi};
use crate::edges::Grad;
use crate::image::Mask;

/// Region grower over one gradient field. Consumed by [`LsdExtractor::extract`].
pub(super) struct LsdExtractor<'a> {
    grad: &'a Grad,
    mask: Option<&'a Mask>,
    options: LsdOptions,
    width: usize,
    height: usize,
    /// Gradient orientation folded into [0, π), per pixel.
    orientation: Vec<f32>,
    used: Vec<bool>,
    stack: Vec<usize>,
    region: Region,
}

impl<'a> LsdExtractor<'a> {
    pub(super) fn new(grad: &'a Grad, mask: Option<&'a Mask>, options: LsdOptions) -> Self {
        let (width, height) = (grad.mag.w, grad.mag.h);
        if let Some(m) = mask {
            debug_assert_eq!(m.data.len(), width * height, "mask must match the gradient grid");
        }
        let orientation = grad
            .gx
            .data
            .iter()
            .zip(&grad.gy.data)
            .map(|(&gx, &gy)| normalize_half_pi(gy.atan2(gx)))
            .collect();
        Self {
            grad,
            mask,
            options,
            width,
            height,
            orientation,
            used: vec![false; width * height],
            stack: Vec::with_capacity(64),
            region: Region::with_capacity(128),
        }
    }

    pub(super) fn extract(mut self) -> Vec<Segment> {
        let mut out = Vec::new();
        for seed in 0..self.width * self.height {
            if !self.admissible(seed) {
                continue;
            }
            self.region.clear();
            self.grow_from(seed);
            match self.fit() {
                Some(segment) => out.push(segment),
                None => self.region.release(&mut self.used),
            }
        }
        out
    }

    fn admissible(&self, idx: usize) -> bool {
        !self.used[idx]
            && self.mask.map_or(true, |m| m.data[idx])
            && self.grad.mag.data[idx] >= self.options.magnitude_threshold
    }

    /// Flood 8-connected pixels whose orientation stays within the tolerance
    /// of the seed's.
    fn grow_from(&mut self, seed: usize) {
        let tol = self.options.angle_tolerance_deg.to_radians();
        let seed_angle = self.orientation[seed];
        self.used[seed] = true;
        self.stack.clear();
        self.stack.push(seed);

        while let Some(idx) = self.stack.pop() {
            let (x, y) = (idx % self.width, idx / self.width);
            let aligned = angular_difference(self.orientation[idx], seed_angle) <= 0.5 * tol;
            self.region
                .add(idx, x, y, self.grad.mag.data[idx], aligned);

            for ny in y.saturating_sub(1)..=(y + 1).min(self.height - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(self.width - 1) {
                    let n = ny * self.width + nx;
                    if self.admissible(n)
                        && angular_difference(self.orientation[n], seed_angle) <= tol
                    {
                        self.used[n] = true;
                        self.stack.push(n);
                    }
                }
            }
        }
    }

    /// Line through the current region, if it is large, long and coherent
    /// enough.
    fn fit(&self) -> Option<Segment> {
        let opts = &self.options;
        if self.region.len() < opts.min_region_size.max(2) {
            return None;
        }
        let axis = self.region.principal_axis()?;

        let (lo, hi) = self
            .region
            .pixels
            .iter()
            .map(|&idx| {
                let x = (idx % self.width) as f32 - axis.center.x;
                let y = (idx / self.width) as f32 - axis.center.y;
                x * axis.tangent.x + y * axis.tangent.y
            })
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s), hi.max(s))
            });
        let len = hi - lo;
        if !len.is_finite() || len <= 0.0 || len < opts.min_length_px {
            return None;
        }
        if self.region.aligned_fraction() < opts.min_aligned_fraction {
            return None;
        }

        let end = |s: f32| {
            let p = axis.center + axis.tangent * s;
            [p.x, p.y]
        };
        Some(Segment::new(end(lo), end(hi), self.region.mean_magnitude()))
    }
}
