use serde::Serialize;

/// Line segment produced by the LSD-like extractor or by gap joining.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub p0: [f32; 2],
    pub p1: [f32; 2],
    pub len: f32,
    pub avg_mag: f32,
}

impl Segment {
    pub fn new(p0: [f32; 2], p1: [f32; 2], avg_mag: f32) -> Self {
        let dx = p1[0] - p0[0];
        let dy = p1[1] - p0[1];
        Self {
            p0,
            p1,
            len: dx.hypot(dy),
            avg_mag,
        }
    }

    /// |y1 - y0| in pixels.
    pub fn vertical_extent(&self) -> f32 {
        (self.p1[1] - self.p0[1]).abs()
    }

    /// |x1 - x0| in pixels.
    pub fn horizontal_deviation(&self) -> f32 {
        (self.p1[0] - self.p0[0]).abs()
    }

    /// Endpoint with the smaller y, then the other one.
    pub fn top_bottom(&self) -> ([f32; 2], [f32; 2]) {
        if self.p0[1] <= self.p1[1] {
            (self.p0, self.p1)
        } else {
            (self.p1, self.p0)
        }
    }
}
