//! Peak extraction from part confidence maps.
//!
//! Every connected region of a (lightly smoothed) confidence map that exceeds the detection
//! threshold yields exactly one [`Peak`], located at the region's maximum.

use ndarray::{Array2, ArrayView2};

/// A local maximum found in a single confidence map.
///
/// Peaks do not have an identity yet. [`crate::candidate::IdAllocator`] turns them into
/// [`crate::candidate::Candidate`]s once all parts of a frame have been processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub x: u32,
    pub y: u32,
    /// The unsmoothed confidence map value at the peak's location.
    pub confidence: f32,
}

/// Extracts one [`Peak`] per blob of `map` whose smoothed value exceeds `threshold`.
///
/// `map` is indexed as `[y, x]`. Blobs are 8-connected and returned in raster order of their
/// top-left-most pixel. An empty map, or one that never exceeds `threshold`, yields no peaks.
pub fn extract_peaks(map: ArrayView2<'_, f32>, threshold: f32) -> Vec<Peak> {
    let (h, w) = map.dim();
    if h == 0 || w == 0 {
        return Vec::new();
    }

    let smooth = gaussian_blur_3x3(map);
    let is_set = |y: usize, x: usize| smooth[[y, x]] > threshold;

    let mut visited = Array2::from_elem((h, w), false);
    let mut stack = Vec::new();
    let mut peaks = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if visited[[y, x]] || !is_set(y, x) {
                continue;
            }

            // Flood fill the blob, tracking the first maximum in raster order.
            visited[[y, x]] = true;
            stack.push((y, x));
            let mut best = (y, x);
            while let Some((cy, cx)) = stack.pop() {
                let value = smooth[[cy, cx]];
                let best_value = smooth[best];
                if value > best_value || (value == best_value && (cy, cx) < best) {
                    best = (cy, cx);
                }

                for ny in cy.saturating_sub(1)..=(cy + 1).min(h - 1) {
                    for nx in cx.saturating_sub(1)..=(cx + 1).min(w - 1) {
                        if !visited[[ny, nx]] && is_set(ny, nx) {
                            visited[[ny, nx]] = true;
                            stack.push((ny, nx));
                        }
                    }
                }
            }

            let (by, bx) = best;
            peaks.push(Peak {
                x: bx as u32,
                y: by as u32,
                confidence: map[[by, bx]],
            });
        }
    }

    peaks
}

/// Smooths `map` with a separable `[1 2 1] / 4` kernel.
///
/// Borders are reflected without repeating the edge pixel (`gfedcb|abcdefgh|gfedcba`).
fn gaussian_blur_3x3(map: ArrayView2<'_, f32>) -> Array2<f32> {
    let (h, w) = map.dim();

    let mut tmp = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let l = map[[y, reflect_101(x as isize - 1, w)]];
            let r = map[[y, reflect_101(x as isize + 1, w)]];
            tmp[[y, x]] = 0.25 * l + 0.5 * map[[y, x]] + 0.25 * r;
        }
    }

    let mut out = Array2::zeros((h, w));
    for y in 0..h {
        let up = reflect_101(y as isize - 1, h);
        let down = reflect_101(y as isize + 1, h);
        for x in 0..w {
            out[[y, x]] = 0.25 * tmp[[up, x]] + 0.5 * tmp[[y, x]] + 0.25 * tmp[[down, x]];
        }
    }
    out
}

fn reflect_101(i: isize, len: usize) -> usize {
    let len = len as isize;
    if len == 1 {
        return 0;
    }
    let i = if i < 0 { -i } else { i };
    let i = if i >= len { 2 * len - 2 - i } else { i };
    i as usize
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::Array2;

    use crate::test::gaussian_blob;

    use super::*;

    #[test]
    fn empty_maps_have_no_peaks() {
        let map = Array2::<f32>::zeros((0, 0));
        assert!(extract_peaks(map.view(), 0.1).is_empty());

        let map = Array2::<f32>::zeros((16, 16));
        assert!(extract_peaks(map.view(), 0.1).is_empty());
    }

    #[test]
    fn blur_preserves_constant_maps() {
        let map = Array2::from_elem((4, 5), 0.5);
        let smooth = gaussian_blur_3x3(map.view());
        for &v in &smooth {
            assert_relative_eq!(v, 0.5);
        }

        // Single row and column maps only blur along the other axis.
        let mut row = Array2::zeros((1, 3));
        row[[0, 1]] = 1.0;
        let smooth = gaussian_blur_3x3(row.view());
        assert_eq!(smooth.as_slice().unwrap(), &[0.5, 0.5, 0.5]);
    }

    #[test]
    fn reflection() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(0, 5), 0);
        assert_eq!(reflect_101(4, 5), 4);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(-1, 1), 0);
        assert_eq!(reflect_101(1, 1), 0);
    }

    #[test]
    fn single_pixel_reports_unsmoothed_confidence() {
        let mut map = Array2::zeros((12, 12));
        map[[5, 7]] = 1.0;

        let peaks = extract_peaks(map.view(), 0.1);
        assert_eq!(
            peaks,
            [Peak {
                x: 7,
                y: 5,
                confidence: 1.0
            }]
        );
    }

    #[test]
    fn single_pixel_blob() {
        // After smoothing, only the center (0.25) exceeds 0.2; the direct neighbors are at 0.125.
        let mut map = Array2::zeros((12, 12));
        map[[3, 3]] = 1.0;

        let peaks = extract_peaks(map.view(), 0.2);
        assert_eq!(peaks.len(), 1);
        assert_eq!((peaks[0].x, peaks[0].y), (3, 3));
    }

    #[test]
    fn plateau_peaks_at_center() {
        let mut map = Array2::zeros((10, 10));
        for y in 2..5 {
            for x in 4..7 {
                map[[y, x]] = 0.8;
            }
        }

        let peaks = extract_peaks(map.view(), 0.1);
        assert_eq!(peaks.len(), 1);
        assert_eq!((peaks[0].x, peaks[0].y), (5, 3));
        assert_relative_eq!(peaks[0].confidence, 0.8);
    }

    #[test]
    fn blobs_in_raster_order() {
        let mut map = Array2::zeros((64, 64));
        gaussian_blob(&mut map, 50.0, 10.0, 0.9);
        gaussian_blob(&mut map, 10.0, 40.0, 0.7);
        gaussian_blob(&mut map, 30.0, 40.0, 0.8);

        let peaks = extract_peaks(map.view(), 0.1);
        let locations = peaks.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>();
        assert_eq!(locations, [(50, 10), (10, 40), (30, 40)]);
        assert_relative_eq!(peaks[0].confidence, 0.9);
        assert_relative_eq!(peaks[1].confidence, 0.7);
        assert_relative_eq!(peaks[2].confidence, 0.8);
    }

    #[test]
    fn diagonal_pixels_form_one_blob() {
        let mut map = Array2::zeros((8, 8));
        map[[2, 2]] = 1.0;
        map[[3, 3]] = 1.0;

        // Smoothed: both pixels 0.25 + 0.0625, their shared neighbors 0.125 + 0.125.
        let peaks = extract_peaks(map.view(), 0.3);
        assert_eq!(peaks.len(), 1);
        assert_eq!((peaks[0].x, peaks[0].y), (2, 2));
    }

    #[test]
    fn nothing_above_threshold() {
        let mut map = Array2::zeros((8, 8));
        gaussian_blob(&mut map, 4.0, 4.0, 0.05);
        assert!(extract_peaks(map.view(), 0.1).is_empty());
    }
}
