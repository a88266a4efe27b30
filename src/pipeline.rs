//! Per-frame pose estimation.
//!
//! [`PoseEstimator`] runs the three stages on one frame of network output:
//!
//! 1. Peak extraction for every part confidence map (in parallel), followed by id assignment.
//! 2. Connection scoring for every limb type.
//! 3. Skeleton assembly.
//!
//! The result is a [`Poses`] value holding everything a caller needs to render or inspect the
//! frame. No state is carried over between frames.

use rayon::prelude::*;

use crate::{
    assembly::{assemble, Skeleton},
    candidate::{Candidate, CandidateId, Candidates},
    config::Settings,
    connection::{score_limbs, LimbState, ScoringParams},
    image::{draw_circle, draw_line, Image},
    output::NetOutput,
    palette::Palette,
    peaks::extract_peaks,
    resolution::Resolution,
    timer::Timer,
    topology::{BodyModel, Topology},
};

/// Radius of the circles marking candidates.
const JOINT_RADIUS: u32 = 5;
/// Stroke width of limb lines.
const LIMB_WIDTH: u32 = 3;

/// Turns network output into assembled skeletons.
pub struct PoseEstimator {
    model: BodyModel,
    threshold: f32,
    scoring: ScoringParams,
    palette: Palette,
    t_extract: Timer,
    t_score: Timer,
    t_assemble: Timer,
}

impl PoseEstimator {
    /// Creates an estimator for `model` with default parameters and a random palette.
    pub fn new(model: BodyModel) -> Self {
        Self {
            model,
            threshold: Settings::DEFAULT_THRESHOLD,
            scoring: ScoringParams::default(),
            palette: Palette::random(model.topology().part_count()),
            t_extract: Timer::new("extract"),
            t_score: Timer::new("score"),
            t_assemble: Timer::new("assemble"),
        }
    }

    /// Creates an estimator from validated `settings`.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let model = settings.validate()?;
        let part_count = model.topology().part_count();
        let palette = match settings.palette_seed {
            Some(seed) => Palette::seeded(part_count, seed),
            None => Palette::random(part_count),
        };

        let mut this = Self::new(model);
        this.threshold = settings.threshold;
        this.scoring = settings.scoring_params();
        this.palette = palette;
        Ok(this)
    }

    #[inline]
    pub fn model(&self) -> BodyModel {
        self.model
    }

    #[inline]
    pub fn topology(&self) -> &'static Topology {
        self.model.topology()
    }

    /// Returns the detection threshold applied to the smoothed confidence maps.
    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    #[inline]
    pub fn scoring(&self) -> &ScoringParams {
        &self.scoring
    }

    pub fn scoring_mut(&mut self) -> &mut ScoringParams {
        &mut self.scoring
    }

    /// Returns the per-part colors used by [`Poses::draw`].
    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Runs all stages on one frame.
    ///
    /// Fails if `output` has fewer channels than the model needs. A frame without any detections
    /// is not an error, it simply yields no skeletons.
    pub fn estimate(&self, output: &NetOutput) -> anyhow::Result<Poses> {
        let topology = self.topology();
        if output.num_channels() < topology.channel_count() {
            anyhow::bail!(
                "{} model needs {} output channels, got {}",
                self.model,
                topology.channel_count(),
                output.num_channels(),
            );
        }

        let candidates = self.t_extract.time(|| {
            let peaks = (0..topology.part_count())
                .into_par_iter()
                .map(|part| extract_peaks(output.channel(part), self.threshold))
                .collect::<Vec<_>>();
            Candidates::from_peaks(&peaks)
        });
        log::debug!(
            "{} candidates for {} parts",
            candidates.len(),
            candidates.part_count()
        );

        let limbs = self
            .t_score
            .time(|| score_limbs(topology, &candidates, output, &self.scoring));
        let skeletons = self.t_assemble.time(|| assemble(topology, &limbs));
        log::debug!(
            "{} of {} limb types connected, {} skeletons",
            limbs.iter().filter(|limb| limb.is_valid()).count(),
            limbs.len(),
            skeletons.len(),
        );

        Ok(Poses {
            model: self.model,
            resolution: output.resolution(),
            candidates,
            limbs,
            skeletons,
        })
    }

    /// Returns profiling timers for peak extraction, connection scoring, and assembly.
    pub fn timers(&self) -> impl IntoIterator<Item = &Timer> + '_ {
        [&self.t_extract, &self.t_score, &self.t_assemble]
    }
}

/// The poses found in one frame.
#[derive(Debug, Clone)]
pub struct Poses {
    model: BodyModel,
    resolution: Resolution,
    candidates: Candidates,
    limbs: Vec<LimbState>,
    skeletons: Vec<Skeleton>,
}

impl Poses {
    #[inline]
    pub fn model(&self) -> BodyModel {
        self.model
    }

    /// Returns the resolution of the maps the poses were found in.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Returns all candidates, grouped by part.
    #[inline]
    pub fn candidates(&self) -> &Candidates {
        &self.candidates
    }

    /// Returns the scoring result of every limb type, in topology order.
    #[inline]
    pub fn limbs(&self) -> &[LimbState] {
        &self.limbs
    }

    /// Returns the indices of all limb types without connections.
    pub fn invalid_limbs(&self) -> impl Iterator<Item = usize> + '_ {
        self.limbs
            .iter()
            .enumerate()
            .filter(|(_, limb)| !limb.is_valid())
            .map(|(index, _)| index)
    }

    #[inline]
    pub fn skeletons(&self) -> &[Skeleton] {
        &self.skeletons
    }

    /// Returns the candidate assigned to `part` of `skeleton`, if any.
    pub fn joint(&self, skeleton: &Skeleton, part: usize) -> Option<&Candidate> {
        skeleton.get(part).and_then(|id| self.candidate(id))
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(id)
    }

    /// Draws all candidates and the limbs of every skeleton onto `image`.
    ///
    /// Candidates are drawn in the color of their part. Limb `i` is drawn in color `i` of
    /// `palette` if both of its joints were found. The last limb types, which only close loops,
    /// are not drawn.
    ///
    /// # Panics
    ///
    /// The image must have the same resolution as the network output the poses were found in.
    pub fn draw(&self, image: &mut Image, palette: &Palette) {
        assert_eq!(
            image.resolution(),
            self.resolution,
            "attempted to draw `Poses` onto canvas with mismatched size",
        );

        for (part, candidates) in self.candidates.iter_parts() {
            for candidate in candidates {
                draw_circle(image, candidate.x() as i32, candidate.y() as i32)
                    .radius(JOINT_RADIUS)
                    .color(palette.get(part));
            }
        }

        let topology = self.model.topology();
        let drawn = topology.part_count().saturating_sub(1);
        for limb in topology.limbs().take(drawn) {
            for skeleton in &self.skeletons {
                let (Some(a), Some(b)) = (
                    self.joint(skeleton, limb.part_a),
                    self.joint(skeleton, limb.part_b),
                ) else {
                    continue;
                };
                draw_line(image, a.x() as i32, a.y() as i32, b.x() as i32, b.y() as i32)
                    .color(palette.get(limb.index))
                    .stroke_width(LIMB_WIDTH);
            }
        }
    }
}
