//! RGB → HSV conversions on the two scales the pipeline uses.
//!
//! - [`hsv_unit`]: every channel in [0, 1], hue wrapped to [0, 1). Used for
//!   foliage detection.
//! - [`hsv_u8`]: 8-bit scale with hue halved to [0, 180) and saturation/value
//!   in [0, 255]. Used for skin-tone thresholds.

/// Hue, saturation and value in [0, 1].
pub fn hsv_unit(r: u8, g: u8, b: u8) -> [f32; 3] {
    let (r, g, b) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let v = maxc;
    if maxc == minc {
        return [0.0, 0.0, v];
    }
    let range = maxc - minc;
    let s = range / maxc;
    let rc = (maxc - r) / range;
    let gc = (maxc - g) / range;
    let bc = (maxc - b) / range;
    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    [(h / 6.0).rem_euclid(1.0), s, v]
}

/// Hue in [0, 180), saturation and value in [0, 255].
pub fn hsv_u8(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let range = v - min;
    let s = if v > 0.0 { 255.0 * range / v } else { 0.0 };
    let mut h = if range == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / range
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / range
    } else {
        240.0 + 60.0 * (rf - gf) / range
    };
    if h < 0.0 {
        h += 360.0;
    }
    let h = (h / 2.0).round().min(179.0);
    [h as u8, s.round() as u8, v as u8]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unit_scale_primary_colors() {
        let green = hsv_unit(0, 200, 0);
        assert_abs_diff_eq!(green[0], 1.0 / 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(green[1], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(green[2], 200.0 / 255.0, epsilon = 1e-6);

        let gray = hsv_unit(90, 90, 90);
        assert_eq!(gray[0], 0.0);
        assert_eq!(gray[1], 0.0);

        let magenta_red = hsv_unit(255, 0, 51);
        assert!(magenta_red[0] > 0.9 && magenta_red[0] < 1.0);
    }

    #[test]
    fn u8_scale_skin_tone() {
        let [h, s, v] = hsv_u8(220, 170, 140);
        assert_eq!(h, 11);
        assert_eq!(s, 93);
        assert_eq!(v, 220);
    }

    #[test]
    fn u8_scale_black_has_zero_saturation() {
        assert_eq!(hsv_u8(0, 0, 0), [0, 0, 0]);
    }
}
