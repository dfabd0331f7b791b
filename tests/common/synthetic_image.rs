use image::{Rgb, RgbImage};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const FOLIAGE: Rgb<u8> = Rgb([0, 200, 0]);
pub const SKIN: Rgb<u8> = Rgb([220, 170, 140]);
pub const WHITE: Rgb<u8> = Rgb([230, 230, 230]);

/// Paints columns `x0..x1` of rows `y0..=y1`.
pub fn fill_rect(img: &mut RgbImage, x0: u32, x1: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    for y in y0..=y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

/// Black 300x500 frame with a foliage-green bar over rows 100..=400.
pub fn green_bar_scene() -> RgbImage {
    let mut img = RgbImage::new(300, 500);
    fill_rect(&mut img, 120, 180, 100, 400, FOLIAGE);
    img
}

/// Green bar plus a 40x200 skin-tone patch standing next to it.
pub fn green_bar_with_person() -> RgbImage {
    let mut img = green_bar_scene();
    fill_rect(&mut img, 20, 60, 150, 349, SKIN);
    img
}

/// Green bar plus a thin bright vertical stick, its top just above the bar.
pub fn green_bar_with_ruler() -> RgbImage {
    let mut img = green_bar_scene();
    fill_rect(&mut img, 40, 46, 95, 294, WHITE);
    img
}

/// Deterministic pseudo-random colors (LCG).
pub fn noise(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut state = seed;
    RgbImage::from_fn(width, height, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let [r, g, b, ..] = (state >> 24).to_le_bytes();
        Rgb([r, g, b])
    })
}

/// Unique path in the system temp directory.
pub fn temp_path(stem: &str, ext: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "tree-height-{stem}-{}-{n}.{ext}",
        std::process::id()
    ))
}

/// Writes `img` to a fresh temp file; the format follows `ext`.
pub fn save_temp(img: &RgbImage, stem: &str, ext: &str) -> PathBuf {
    let path = temp_path(stem, ext);
    img.save(&path).expect("write synthetic image");
    path
}
