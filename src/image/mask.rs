//! Boolean masks over an image grid.
//!
//! A [`Mask`] always shares the width/height of the image it was derived
//! from. Morphology uses the 4-connected cross structuring element and treats
//! pixels outside the grid as `false`, so erosion clears the outer frame.
use super::traits::ImageView;

const CROSS: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<bool>,
}

impl Mask {
    /// All-false mask of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![false; w * h],
        }
    }

    /// Evaluate `pred(x, y)` at every pixel.
    pub fn from_fn(w: usize, h: usize, mut pred: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(pred(x, y));
            }
        }
        Self { w, h, data }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: bool) {
        self.data[y * self.w + x] = v;
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    #[inline]
    fn at(&self, x: isize, y: isize) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.w
            && (y as usize) < self.h
            && self.data[y as usize * self.w + x as usize]
    }

    pub fn dilate(&self) -> Mask {
        Mask::from_fn(self.w, self.h, |x, y| {
            self.get(x, y)
                || CROSS
                    .iter()
                    .any(|&(dx, dy)| self.at(x as isize + dx, y as isize + dy))
        })
    }

    pub fn erode(&self) -> Mask {
        Mask::from_fn(self.w, self.h, |x, y| {
            self.get(x, y)
                && CROSS
                    .iter()
                    .all(|&(dx, dy)| self.at(x as isize + dx, y as isize + dy))
        })
    }

    /// Dilate then erode: fills one-pixel gaps between nearby detections.
    pub fn close(&self) -> Mask {
        self.dilate().erode()
    }

    /// Vertical projection profile: number of set pixels per row.
    pub fn row_counts(&self) -> Vec<f32> {
        (0..self.h)
            .map(|y| self.row(y).iter().filter(|&&v| v).count() as f32)
            .collect()
    }

    /// Indices of rows containing at least one set pixel, ascending.
    pub fn occupied_rows(&self) -> Vec<usize> {
        (0..self.h)
            .filter(|&y| self.row(y).iter().any(|&v| v))
            .collect()
    }
}

impl ImageView for Mask {
    type Pixel = bool;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[bool] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[bool]> {
        Some(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(w: usize, h: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> Mask {
        Mask::from_fn(w, h, |x, y| (x0..=x1).contains(&x) && (y0..=y1).contains(&y))
    }

    #[test]
    fn closing_preserves_interior_rectangle() {
        let m = rect(20, 20, 5, 4, 12, 15);
        assert_eq!(m.close(), m);
    }

    #[test]
    fn closing_fills_single_pixel_hole() {
        let mut m = rect(20, 20, 5, 5, 14, 14);
        m.set(9, 9, false);
        let closed = m.close();
        assert!(closed.get(9, 9));
        assert_eq!(closed.count(), 100);
    }

    #[test]
    fn erosion_clears_image_border() {
        let full = Mask::from_fn(6, 5, |_, _| true);
        let eroded = full.erode();
        assert_eq!(eroded.count(), 4 * 3);
        assert!(!eroded.get(0, 2));
        assert!(eroded.get(1, 1));
    }

    #[test]
    fn projections_match_dimensions() {
        let m = rect(10, 8, 2, 3, 4, 5);
        let counts = m.row_counts();
        assert_eq!(counts.len(), 8);
        assert_eq!(counts[3], 3.0);
        assert_eq!(counts[6], 0.0);
        assert_eq!(m.occupied_rows(), vec![3, 4, 5]);
    }
}
