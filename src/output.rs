//! Network output maps.
//!
//! Pose networks produce a single `[1, C, H, W]` tensor. The first channels are the part
//! confidence maps, followed by the part affinity fields (see [`crate::topology`]). The output is
//! usually smaller than the input image, so every channel is resized to the image resolution
//! before peaks are extracted.

use anyhow::Context;
use ndarray::{Array2, ArrayView2, ArrayViewD, Axis, Ix4};
use rayon::prelude::*;

use crate::resolution::Resolution;

/// The per-channel output maps of one frame, all with the same resolution.
#[derive(Debug, Clone)]
pub struct NetOutput {
    maps: Vec<Array2<f32>>,
    resolution: Resolution,
}

impl NetOutput {
    /// Wraps a list of already prepared maps (indexed `[y, x]`).
    ///
    /// All maps must have the same shape.
    pub fn from_maps(maps: Vec<Array2<f32>>) -> anyhow::Result<Self> {
        let (h, w) = maps.first().map_or((0, 0), |map| map.dim());
        if let Some((i, map)) = maps.iter().enumerate().find(|(_, map)| map.dim() != (h, w)) {
            anyhow::bail!(
                "output map {} has shape {:?}, expected {:?} like map 0",
                i,
                map.dim(),
                (h, w),
            );
        }

        Ok(Self {
            maps,
            resolution: Resolution::new(w.try_into()?, h.try_into()?),
        })
    }

    /// Splits an NCHW network output into its channels, resizing each channel to `target`.
    ///
    /// Resizing uses bilinear interpolation with pixel centers at half-integer coordinates.
    pub fn from_blob(blob: ArrayViewD<'_, f32>, target: Resolution) -> anyhow::Result<Self> {
        let shape = blob.shape().to_vec();
        let blob = blob
            .into_dimensionality::<Ix4>()
            .with_context(|| format!("network output of shape {shape:?} is not NCHW"))?;
        let (n, c, h, w) = blob.dim();
        if n != 1 {
            anyhow::bail!("expected a batch size of 1, got network output of shape {shape:?}");
        }
        if h == 0 || w == 0 {
            anyhow::bail!("network output of shape {shape:?} contains no pixels");
        }
        if target.is_empty() {
            anyhow::bail!("cannot resize network output to {target}");
        }

        log::trace!("splitting {c} output channels, {w}x{h} -> {target}");

        let batch = blob.index_axis_move(Axis(0), 0);
        let maps = (0..c)
            .into_par_iter()
            .map(|channel| resize_bilinear(batch.index_axis(Axis(0), channel), target))
            .collect();

        Ok(Self {
            maps,
            resolution: target,
        })
    }

    /// Returns the resolution shared by all maps.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.maps.len()
    }

    /// Returns the map of channel `channel`.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is not less than [`NetOutput::num_channels`].
    #[track_caller]
    pub fn channel(&self, channel: usize) -> ArrayView2<'_, f32> {
        self.maps[channel].view()
    }

    /// Returns the map of channel `channel`, or `None` if the output has no such channel.
    pub fn get(&self, channel: usize) -> Option<ArrayView2<'_, f32>> {
        self.maps.get(channel).map(|map| map.view())
    }
}

fn resize_bilinear(src: ArrayView2<'_, f32>, target: Resolution) -> Array2<f32> {
    let (h, w) = src.dim();
    if (w, h) == (target.width() as usize, target.height() as usize) {
        return src.to_owned();
    }

    let [th, tw] = target.shape();
    let scale_x = w as f32 / tw as f32;
    let scale_y = h as f32 / th as f32;

    // Source sample position and weight, per destination column/row.
    let taps = |dst: usize, scale: f32, len: usize| {
        let pos = ((dst as f32 + 0.5) * scale - 0.5).max(0.0);
        let i0 = (pos.floor() as usize).min(len - 1);
        let i1 = (i0 + 1).min(len - 1);
        (i0, i1, pos - i0 as f32)
    };
    let cols = (0..tw).map(|x| taps(x, scale_x, w)).collect::<Vec<_>>();

    Array2::from_shape_fn((th, tw), |(y, x)| {
        let (y0, y1, fy) = taps(y, scale_y, h);
        let (x0, x1, fx) = cols[x];
        let top = src[[y0, x0]] * (1.0 - fx) + src[[y0, x1]] * fx;
        let bottom = src[[y1, x0]] * (1.0 - fx) + src[[y1, x1]] * fx;
        top * (1.0 - fy) + bottom * fy
    })
}
