use super::*;
use crate::edges::{canny_edges, sobel_gradients};
use crate::image::ImageF32;

fn step_image(width: usize, height: usize, split_x: usize) -> ImageF32 {
    let mut img = ImageF32::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let v = if x < split_x { 0.0 } else { 255.0 };
            img.set(x, y, v);
        }
    }
    img
}

#[test]
fn lsd_extractor_finds_vertical_segment() {
    let img = step_image(32, 32, 16);
    let grad = sobel_gradients(&img);
    let segs = lsd_extract_segments(&grad, LsdOptions::default(), None);
    assert!(
        !segs.is_empty(),
        "expected at least one segment on a vertical edge"
    );
    let longest = segs
        .iter()
        .max_by(|a, b| a.len.total_cmp(&b.len))
        .unwrap();
    assert!(
        longest.vertical_extent() > longest.horizontal_deviation(),
        "expected vertical-oriented segment, got {:?}",
        longest
    );
    assert!(
        longest.vertical_extent() >= 28.0,
        "expected the segment to cover the column, got {:?}",
        longest
    );
}

#[test]
fn lsd_extractor_rejects_flat_image() {
    let img = ImageF32::new(16, 16);
    let grad = sobel_gradients(&img);
    let segs = lsd_extract_segments(&grad, LsdOptions::default(), None);
    assert!(
        segs.is_empty(),
        "no segments should be detected in a flat image, got {:?}",
        segs
    );
}

#[test]
fn mask_restricts_growth_to_edge_pixels() {
    let img = step_image(40, 40, 20);
    let (edges, grad) = canny_edges(&img, 50.0, 150.0);
    let segs = lsd_extract_segments(&grad, LsdOptions::default(), Some(&edges));
    assert_eq!(segs.len(), 1, "got {:?}", segs);
    let seg = &segs[0];
    assert!(seg.horizontal_deviation() < 1.0);
    assert!((0.5 * (seg.p0[0] + seg.p1[0]) - 19.0).abs() < 1.0);

    let empty = crate::image::Mask::new(40, 40);
    assert!(lsd_extract_segments(&grad, LsdOptions::default(), Some(&empty)).is_empty());
}
