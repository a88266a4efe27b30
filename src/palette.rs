//! Per-part visualization colors.

use std::ops::RangeInclusive;

use crate::image::Color;

const RED: RangeInclusive<u8> = 100..=255;
const GREEN: RangeInclusive<u8> = 100..=255;
const BLUE: RangeInclusive<u8> = 64..=200;

/// A fixed list of randomly generated colors, one per body part (or limb).
///
/// Colors are bright enough to be visible on top of camera images. Lookups wrap around, so any
/// index maps to a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Generates `len` colors from a random seed.
    pub fn random(len: usize) -> Self {
        Self::generate(len, fastrand::Rng::new())
    }

    /// Generates `len` colors from `seed`. The same seed always yields the same palette.
    pub fn seeded(len: usize, seed: u64) -> Self {
        Self::generate(len, fastrand::Rng::with_seed(seed))
    }

    fn generate(len: usize, mut rng: fastrand::Rng) -> Self {
        let colors = (0..len.max(1))
            .map(|_| Color::from_rgb8(rng.u8(RED), rng.u8(GREEN), rng.u8(BLUE)))
            .collect();
        Self { colors }
    }

    /// Returns the number of distinct colors in the palette.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns the color for `index`, wrapping around at the end of the palette.
    pub fn get(&self, index: usize) -> Color {
        self.colors[index % self.colors.len()]
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_is_stable() {
        assert_eq!(Palette::seeded(18, 7), Palette::seeded(18, 7));
        assert_ne!(Palette::seeded(18, 7), Palette::seeded(18, 8));
    }

    #[test]
    fn colors_in_range() {
        let palette = Palette::random(64);
        assert_eq!(palette.len(), 64);
        for color in palette.colors() {
            assert!(RED.contains(&color.r()), "{color:?}");
            assert!(GREEN.contains(&color.g()), "{color:?}");
            assert!(BLUE.contains(&color.b()), "{color:?}");
            assert_eq!(color.a(), 255);
        }
    }

    #[test]
    fn lookup_wraps() {
        let palette = Palette::seeded(3, 1);
        assert_eq!(palette.get(4), palette.get(1));

        // An empty palette still has a color to hand out.
        let palette = Palette::seeded(0, 1);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.get(5), palette.get(0));
    }
}
