//! Synthetic network outputs for tests.

use ndarray::Array2;

use crate::{output::NetOutput, topology::Topology};

const BLOB_SIGMA: f32 = 2.0;

/// Adds a Gaussian blob with the given peak value, centered at `(cx, cy)`, to `map`.
pub fn gaussian_blob(map: &mut Array2<f32>, cx: f32, cy: f32, peak: f32) {
    for ((y, x), v) in map.indexed_iter_mut() {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        *v += peak * (-(dx * dx + dy * dy) / (2.0 * BLOB_SIGMA * BLOB_SIGMA)).exp();
    }
}

/// Paints a unit-length field along the segment `from -> to`, rotated by `rotation` radians.
///
/// Every pixel within `half_width` of the segment is overwritten.
pub fn paint_field(
    fx: &mut Array2<f32>,
    fy: &mut Array2<f32>,
    from: [f32; 2],
    to: [f32; 2],
    half_width: f32,
    rotation: f32,
) {
    let (dx, dy) = (to[0] - from[0], to[1] - from[1]);
    let len = (dx * dx + dy * dy).sqrt();
    let (ux, uy) = (dx / len, dy / len);
    let (sin, cos) = rotation.sin_cos();
    let (vx, vy) = (ux * cos - uy * sin, ux * sin + uy * cos);

    let (h, w) = fx.dim();
    for y in 0..h {
        for x in 0..w {
            let (px, py) = (x as f32 - from[0], y as f32 - from[1]);
            let t = ((px * ux + py * uy) / len).clamp(0.0, 1.0);
            let (cx, cy) = (px - t * dx, py - t * dy);
            if (cx * cx + cy * cy).sqrt() <= half_width {
                fx[[y, x]] = vx;
                fy[[y, x]] = vy;
            }
        }
    }
}

/// Builds a network output for `topology` at `width x height`.
pub struct OutputBuilder {
    maps: Vec<Array2<f32>>,
    topology: &'static Topology,
}

impl OutputBuilder {
    pub fn new(topology: &'static Topology, width: usize, height: usize) -> Self {
        Self {
            maps: vec![Array2::zeros((height, width)); topology.channel_count()],
            topology,
        }
    }

    /// Adds a detection of `part` at `(x, y)`.
    pub fn part(mut self, part: usize, x: f32, y: f32) -> Self {
        gaussian_blob(&mut self.maps[part], x, y, 0.9);
        self
    }

    /// Paints the field of limb `limb` from `from` to `to`, rotated by `rotation` radians.
    pub fn limb(mut self, limb: usize, from: [f32; 2], to: [f32; 2], rotation: f32) -> Self {
        let limb = self.topology.limb(limb).expect("limb index out of range");
        let mut fx = std::mem::take(&mut self.maps[limb.field_x]);
        let mut fy = std::mem::take(&mut self.maps[limb.field_y]);
        paint_field(&mut fx, &mut fy, from, to, 2.0, rotation);
        self.maps[limb.field_x] = fx;
        self.maps[limb.field_y] = fy;
        self
    }

    /// Places both parts of limb `limb` and paints its field between them.
    pub fn connect(self, limb: usize, from: [f32; 2], to: [f32; 2]) -> Self {
        let l = self.topology.limb(limb).expect("limb index out of range");
        self.part(l.part_a, from[0], from[1])
            .part(l.part_b, to[0], to[1])
            .limb(limb, from, to, 0.0)
    }

    pub fn build(self) -> NetOutput {
        NetOutput::from_maps(self.maps).unwrap()
    }
}
