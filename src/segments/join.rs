use super::segment::Segment;

/// Merge near-vertical segments that continue each other across a short gap.
///
/// Two segments are joined when the lower one starts at most `max_gap` pixels
/// below the end of the upper one and their x coordinates at the junction
/// differ by at most `max_dx`. Segments whose own horizontal drift exceeds
/// `max_dx` are passed through untouched. The merged segment spans from the
/// topmost to the bottommost endpoint; its magnitude is the length-weighted
/// mean of the parts.
pub fn join_vertical_runs(segments: &[Segment], max_gap: f32, max_dx: f32) -> Vec<Segment> {
    let (mut vertical, mut out): (Vec<Segment>, Vec<Segment>) = segments
        .iter()
        .cloned()
        .partition(|s| s.horizontal_deviation() < max_dx);

    vertical.sort_by(|a, b| a.top_bottom().0[1].total_cmp(&b.top_bottom().0[1]));

    let mut chains: Vec<Segment> = Vec::with_capacity(vertical.len());
    for seg in vertical {
        let (top, _) = seg.top_bottom();
        let joinable = chains.iter_mut().find(|chain| {
            let (_, bottom) = chain.top_bottom();
            let gap = top[1] - bottom[1];
            gap <= max_gap && gap >= -1.0 && (top[0] - bottom[0]).abs() <= max_dx
        });
        match joinable {
            Some(chain) => *chain = merge(chain, &seg),
            None => chains.push(seg),
        }
    }

    out.extend(chains);
    out
}

fn merge(upper: &Segment, lower: &Segment) -> Segment {
    let (top, upper_bottom) = upper.top_bottom();
    let (_, lower_bottom) = lower.top_bottom();
    let bottom = if lower_bottom[1] >= upper_bottom[1] {
        lower_bottom
    } else {
        upper_bottom
    };
    let total = (upper.len + lower.len).max(1e-6);
    let avg_mag = (upper.avg_mag * upper.len + lower.avg_mag * lower.len) / total;
    Segment::new(top, bottom, avg_mag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_pieces_are_chained() {
        let parts = [
            Segment::new([20.0, 10.0], [20.5, 60.0], 100.0),
            Segment::new([20.5, 66.0], [21.0, 120.0], 100.0),
            Segment::new([21.0, 125.0], [21.0, 160.0], 100.0),
        ];
        let joined = join_vertical_runs(&parts, 8.0, 3.0);
        assert_eq!(joined.len(), 1);
        assert!((joined[0].vertical_extent() - 150.0).abs() < 1e-3);
    }

    #[test]
    fn distant_columns_stay_separate() {
        let parts = [
            Segment::new([20.0, 10.0], [20.0, 60.0], 100.0),
            Segment::new([80.0, 62.0], [80.0, 120.0], 100.0),
            Segment::new([20.0, 100.0], [20.0, 140.0], 100.0),
        ];
        let joined = join_vertical_runs(&parts, 8.0, 3.0);
        assert_eq!(joined.len(), 3);
    }

    #[test]
    fn slanted_segments_pass_through() {
        let parts = [Segment::new([0.0, 0.0], [40.0, 40.0], 10.0)];
        let joined = join_vertical_runs(&parts, 8.0, 3.0);
        assert_eq!(joined.len(), 1);
        assert!((joined[0].len - 40.0 * 2f32.sqrt()).abs() < 1e-3);
    }
}
