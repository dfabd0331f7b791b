//! One grown region: its pixels and the coordinate moments needed to fit a
//! line through them.
use nalgebra::{Matrix2, SymmetricEigen, Vector2};

#[derive(Clone, Copy, Debug, Default)]
struct Moments {
    x: f32,
    y: f32,
    xx: f32,
    yy: f32,
    xy: f32,
}

pub(super) struct Region {
    pub(super) pixels: Vec<usize>,
    moments: Moments,
    aligned: usize,
    mag_sum: f32,
}

/// Principal axis of a region: centroid plus unit tangent.
pub(super) struct Axis {
    pub(super) center: Vector2<f32>,
    pub(super) tangent: Vector2<f32>,
}

impl Region {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            pixels: Vec::with_capacity(capacity),
            moments: Moments::default(),
            aligned: 0,
            mag_sum: 0.0,
        }
    }

    pub(super) fn clear(&mut self) {
        self.pixels.clear();
        self.moments = Moments::default();
        self.aligned = 0;
        self.mag_sum = 0.0;
    }

    pub(super) fn add(&mut self, idx: usize, x: usize, y: usize, mag: f32, aligned: bool) {
        let (xf, yf) = (x as f32, y as f32);
        let m = &mut self.moments;
        m.x += xf;
        m.y += yf;
        m.xx += xf * xf;
        m.yy += yf * yf;
        m.xy += xf * yf;
        self.pixels.push(idx);
        self.aligned += usize::from(aligned);
        self.mag_sum += mag;
    }

    pub(super) fn len(&self) -> usize {
        self.pixels.len()
    }

    pub(super) fn aligned_fraction(&self) -> f32 {
        match self.len() {
            0 => 0.0,
            n => self.aligned as f32 / n as f32,
        }
    }

    pub(super) fn mean_magnitude(&self) -> f32 {
        match self.len() {
            0 => 0.0,
            n => self.mag_sum / n as f32,
        }
    }

    /// Dominant eigenvector of the coordinate covariance, or `None` for a
    /// degenerate region.
    pub(super) fn principal_axis(&self) -> Option<Axis> {
        if self.pixels.is_empty() {
            return None;
        }
        let n = self.len() as f32;
        let m = &self.moments;
        let center = Vector2::new(m.x / n, m.y / n);
        if !center.iter().all(|v| v.is_finite()) {
            return None;
        }
        let cxy = m.xy / n - center.x * center.y;
        let cov = Matrix2::new(
            m.xx / n - center.x * center.x,
            cxy,
            cxy,
            m.yy / n - center.y * center.y,
        );
        let eig = SymmetricEigen::new(cov);
        let major = if eig.eigenvalues[0] >= eig.eigenvalues[1] { 0 } else { 1 };
        let lambda = eig.eigenvalues[major];
        if !lambda.is_finite() || lambda <= 0.0 {
            return None;
        }
        let v = eig.eigenvectors.column(major).into_owned();
        let norm = v.norm();
        if !norm.is_finite() || norm < 1e-6 {
            return None;
        }
        Some(Axis {
            center,
            tangent: v / norm,
        })
    }

    /// Give the region's pixels back so other seeds may claim them.
    pub(super) fn release(&self, used: &mut [bool]) {
        for &idx in &self.pixels {
            used[idx] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_column_has_vertical_axis() {
        let mut region = Region::with_capacity(8);
        for y in 0..10 {
            region.add(y * 4 + 2, 2, y, 100.0, true);
        }
        let axis = region.principal_axis().unwrap();
        assert!((axis.center.x - 2.0).abs() < 1e-5);
        assert!((axis.center.y - 4.5).abs() < 1e-5);
        assert!(axis.tangent.y.abs() > 0.99);
        assert_eq!(region.mean_magnitude(), 100.0);
    }

    #[test]
    fn single_pixel_has_no_axis() {
        let mut region = Region::with_capacity(1);
        region.add(0, 3, 3, 10.0, false);
        assert!(region.principal_axis().is_none());
        assert_eq!(region.aligned_fraction(), 0.0);
    }
}
