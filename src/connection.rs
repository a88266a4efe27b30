//! Limb connection scoring with part affinity fields.
//!
//! For every limb type, each candidate of the limb's first part is paired with each candidate of
//! its second part. A pair is plausible if the part affinity field along the straight line between
//! the two candidates points in the direction of that line.
//!
//! By default, matching is *one-directional*: every A-side candidate picks its best B-side
//! candidate, and nothing prevents several A-side candidates from picking the same B-side
//! candidate. [`Matching::Exclusive`] is available when each candidate should be used at most once
//! per limb.

use std::cmp::Reverse;

use itertools::Itertools;
use nalgebra::Vector2;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::{
    candidate::{Candidate, CandidateId, Candidates},
    num::TotalF32,
    output::NetOutput,
    topology::{Limb, Topology},
};

/// A scored link between a candidate of a limb's first part and one of its second part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Candidate of the limb's first part (`Limb::part_a`).
    pub a: CandidateId,
    /// Candidate of the limb's second part (`Limb::part_b`).
    pub b: CandidateId,
    /// Average alignment of the field with the `a -> b` direction over all samples.
    pub score: f32,
}

/// How candidate pairs are matched for a limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Matching {
    /// Every A-side candidate independently picks its best B-side candidate.
    #[default]
    Greedy,
    /// Accepted pairs are taken in descending score order; a pair is dropped if either of its
    /// candidates is already taken.
    Exclusive,
}

/// Parameters of the pair scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    /// Number of field samples between two candidates, including both endpoints.
    pub samples: usize,
    /// Minimum alignment (dot product) for a sample to count.
    pub sample_threshold: f32,
    /// Fraction of counting samples a pair must exceed to be accepted.
    pub min_fraction: f32,
    pub matching: Matching,
}

impl ScoringParams {
    /// Average alignment a pair must exceed to be accepted, regardless of its sample fraction.
    pub const MIN_SCORE: f32 = -1.0;
    pub const DEFAULT_SAMPLES: usize = 10;
    pub const DEFAULT_SAMPLE_THRESHOLD: f32 = 0.1;
    pub const DEFAULT_MIN_FRACTION: f32 = 0.7;
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            samples: Self::DEFAULT_SAMPLES,
            sample_threshold: Self::DEFAULT_SAMPLE_THRESHOLD,
            min_fraction: Self::DEFAULT_MIN_FRACTION,
            matching: Matching::default(),
        }
    }
}

/// Scoring result for one limb type.
#[derive(Debug, Clone, PartialEq)]
pub enum LimbState {
    /// At least one of the limb's parts has no candidates.
    Missing,
    /// Both parts have candidates, but no pair was accepted.
    Unmatched,
    /// At least one pair was accepted.
    Connected(Vec<Connection>),
}

impl LimbState {
    /// Returns `true` if this limb produced connections.
    ///
    /// Invalid limbs ([`LimbState::Missing`] and [`LimbState::Unmatched`]) are skipped during
    /// assembly.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// Returns the accepted connections (empty for invalid limbs).
    pub fn connections(&self) -> &[Connection] {
        match self {
            Self::Connected(connections) => connections,
            Self::Missing | Self::Unmatched => &[],
        }
    }
}

/// Scores all limbs of `topology`, in topology order.
///
/// # Panics
///
/// `output` must contain at least [`Topology::channel_count`] channels, and the candidates must
/// have been extracted from maps of the same resolution.
pub fn score_limbs(
    topology: &Topology,
    candidates: &Candidates,
    output: &NetOutput,
    params: &ScoringParams,
) -> Vec<LimbState> {
    topology
        .limbs()
        .map(|limb| {
            let state = score_limb(
                &limb,
                candidates.for_part(limb.part_a),
                candidates.for_part(limb.part_b),
                output.channel(limb.field_x),
                output.channel(limb.field_y),
                params,
            );
            log::trace!(
                "limb {} ({} -> {}): {} connections ({})",
                limb.index,
                topology.part_name(limb.part_a),
                topology.part_name(limb.part_b),
                state.connections().len(),
                match &state {
                    LimbState::Missing => "missing",
                    LimbState::Unmatched => "unmatched",
                    LimbState::Connected(_) => "connected",
                },
            );
            state
        })
        .collect()
}

/// Scores a single limb given the candidates of both of its parts and its field channels.
pub fn score_limb(
    limb: &Limb,
    cand_a: &[Candidate],
    cand_b: &[Candidate],
    field_x: ArrayView2<'_, f32>,
    field_y: ArrayView2<'_, f32>,
    params: &ScoringParams,
) -> LimbState {
    debug_assert!(cand_a.iter().all(|c| c.part() == limb.part_a));
    debug_assert!(cand_b.iter().all(|c| c.part() == limb.part_b));

    if cand_a.is_empty() || cand_b.is_empty() {
        return LimbState::Missing;
    }

    let connections = match params.matching {
        Matching::Greedy => cand_a
            .iter()
            .filter_map(|a| {
                let mut best: Option<Connection> = None;
                for b in cand_b {
                    let Some(score) = score_pair(a, b, field_x, field_y, params) else {
                        continue;
                    };
                    if best.map_or(true, |best| score > best.score) {
                        best = Some(Connection {
                            a: a.id(),
                            b: b.id(),
                            score,
                        });
                    }
                }
                best
            })
            .collect::<Vec<_>>(),
        Matching::Exclusive => {
            let accepted = cand_a
                .iter()
                .flat_map(|a| cand_b.iter().map(move |b| (a, b)))
                .filter_map(|(a, b)| {
                    score_pair(a, b, field_x, field_y, params).map(|score| Connection {
                        a: a.id(),
                        b: b.id(),
                        score,
                    })
                })
                .sorted_by_key(|conn| Reverse(TotalF32(conn.score)));

            let mut taken = Vec::<Connection>::new();
            for conn in accepted {
                if taken.iter().all(|t| t.a != conn.a && t.b != conn.b) {
                    taken.push(conn);
                }
            }
            taken.sort_by_key(|conn| conn.a);
            taken
        }
    };

    if connections.is_empty() {
        LimbState::Unmatched
    } else {
        LimbState::Connected(connections)
    }
}

/// Samples the field along `a -> b`. Returns the average alignment if the pair is accepted.
///
/// A pair is accepted if more than `min_fraction` of its samples count and its average exceeds
/// [`ScoringParams::MIN_SCORE`]. Coincident candidates have no direction and are never accepted.
fn score_pair(
    a: &Candidate,
    b: &Candidate,
    field_x: ArrayView2<'_, f32>,
    field_y: ArrayView2<'_, f32>,
    params: &ScoringParams,
) -> Option<f32> {
    let start = Vector2::new(a.x() as f32, a.y() as f32);
    let end = Vector2::new(b.x() as f32, b.y() as f32);
    let delta = end - start;
    let norm = delta.norm();
    if norm == 0.0 {
        return None;
    }
    let dir = delta / norm;

    let samples = params.samples.max(2);
    let step = delta / (samples - 1) as f32;

    let mut sum = 0.0;
    let mut counting = 0;
    for i in 0..samples {
        // Intermediate samples are truncated to the pixel grid.
        let [x, y] = match i {
            0 => a.position(),
            i if i == samples - 1 => b.position(),
            i => {
                let p = start + step * i as f32;
                [p.x as u32, p.y as u32]
            }
        };
        let (x, y) = (x as usize, y as usize);

        let field = Vector2::new(field_x[[y, x]], field_y[[y, x]]);
        let alignment = field.dot(&dir);
        sum += alignment;
        if alignment > params.sample_threshold {
            counting += 1;
        }
    }

    let fraction = counting as f32 / samples as f32;
    let score = sum / samples as f32;
    (fraction > params.min_fraction && score > ScoringParams::MIN_SCORE).then_some(score)
}
