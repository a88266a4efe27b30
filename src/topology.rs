//! Body model topologies.
//!
//! A topology describes which body parts a pose network detects, which pairs of parts are
//! connected by limbs, and which output channels hold the part affinity field of each limb.
//!
//! Limb order matters: skeleton assembly processes limbs in the order they are listed here, so the
//! tables follow the order the networks were trained with.

use std::{fmt, str::FromStr};

use crate::iter::zip_exact;

/// The supported body models.
///
/// The configuration name of a model (as accepted by [`FromStr`] and printed by
/// [`fmt::Display`]) matches the dataset name the network was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyModel {
    /// The 18-keypoint COCO body model.
    Coco,
    /// The 25-keypoint body model (COCO plus mid-hip and feet).
    Body25,
    /// The two-hand model with 21 keypoints per hand.
    ///
    /// Assembly for this model is not tuned yet, see [`BodyModel::is_complete`].
    Hand,
}

impl BodyModel {
    pub const ALL: [Self; 3] = [Self::Coco, Self::Body25, Self::Hand];

    /// Returns the name used to select this model in configuration files.
    pub fn name(&self) -> &'static str {
        self.topology().name
    }

    /// Returns the static [`Topology`] of this model.
    pub fn topology(&self) -> &'static Topology {
        match self {
            Self::Coco => &COCO,
            Self::Body25 => &BODY_25,
            Self::Hand => &HAND,
        }
    }

    /// Returns whether this model is fully supported.
    ///
    /// The hand model's topology is known, but its outputs are not assembled into useful skeletons
    /// yet. Configuration validation rejects incomplete models.
    pub fn is_complete(&self) -> bool {
        !matches!(self, Self::Hand)
    }
}

impl FromStr for BodyModel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::ALL.into_iter().find(|model| model.name() == s) {
            Some(model) => Ok(model),
            None => anyhow::bail!(
                "model type '{}' not supported (expected one of: {})",
                s,
                Self::ALL.map(|model| model.name()).join(", "),
            ),
        }
    }
}

impl fmt::Display for BodyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of a body model's parts and limbs.
#[derive(Debug)]
pub struct Topology {
    name: &'static str,
    parts: &'static [&'static str],
    /// `(part A, part B)` for every limb.
    part_pairs: &'static [(usize, usize)],
    /// `(x channel, y channel)` of every limb's part affinity field.
    field_pairs: &'static [(usize, usize)],
}

impl Topology {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of body parts, which is also the number of joint slots per skeleton.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Returns the number of limb types.
    pub fn limb_count(&self) -> usize {
        self.part_pairs.len()
    }

    /// Returns the human-readable name of body part `part`.
    ///
    /// # Panics
    ///
    /// Panics if `part` is not less than [`Topology::part_count`].
    pub fn part_name(&self, part: usize) -> &'static str {
        self.parts[part]
    }

    /// Returns the limb at index `index` of the topology ordering.
    pub fn limb(&self, index: usize) -> Option<Limb> {
        let (part_a, part_b) = *self.part_pairs.get(index)?;
        let (field_x, field_y) = self.field_pairs[index];
        Some(Limb {
            index,
            part_a,
            part_b,
            field_x,
            field_y,
        })
    }

    /// Returns an iterator over all limbs, in topology order.
    pub fn limbs(&self) -> impl ExactSizeIterator<Item = Limb> + '_ {
        zip_exact(self.part_pairs, self.field_pairs).enumerate().map(
            |(index, (&(part_a, part_b), &(field_x, field_y)))| Limb {
                index,
                part_a,
                part_b,
                field_x,
                field_y,
            },
        )
    }

    /// Returns the number of network output channels this topology needs.
    ///
    /// Channels `0..part_count` are the part confidence maps. Part affinity fields follow after
    /// them (some networks have a background channel in between).
    pub fn channel_count(&self) -> usize {
        self.field_pairs
            .iter()
            .map(|&(x, y)| x.max(y) + 1)
            .max()
            .unwrap_or(0)
            .max(self.part_count())
    }
}

/// A limb type: a connection between two body parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limb {
    /// Position of this limb in the topology ordering.
    pub index: usize,
    pub part_a: usize,
    pub part_b: usize,
    /// Output channel holding the X component of this limb's part affinity field.
    pub field_x: usize,
    /// Output channel holding the Y component of this limb's part affinity field.
    pub field_y: usize,
}

// Part and limb orderings follow the pose parameters published with OpenPose:
// https://github.com/CMU-Perceptual-Computing-Lab/openpose/blob/master/src/openpose/pose/poseParameters.cpp

#[rustfmt::skip]
static COCO: Topology = Topology {
    name: "COCO",
    parts: &[
        "Nose", "Neck", "R-Sho", "R-Elb", "R-Wr", "L-Sho", "L-Elb", "L-Wr", "R-Hip", "R-Knee",
        "R-Ank", "L-Hip", "L-Knee", "L-Ank", "R-Eye", "L-Eye", "R-Ear", "L-Ear",
    ],
    part_pairs: &[
        (1, 2), (1, 5), (2, 3), (3, 4), (5, 6), (6, 7),
        (1, 8), (8, 9), (9, 10), (1, 11), (11, 12), (12, 13),
        (1, 0), (0, 14), (14, 16), (0, 15), (15, 17), (2, 17),
        (5, 16),
    ],
    field_pairs: &[
        (31, 32), (39, 40), (33, 34), (35, 36), (41, 42), (43, 44),
        (19, 20), (21, 22), (23, 24), (25, 26), (27, 28), (29, 30),
        (47, 48), (49, 50), (53, 54), (51, 52), (55, 56), (37, 38),
        (45, 46),
    ],
};

// The two ear-to-shoulder limbs ({2,17} on fields {46,47}, {5,18} on {54,55}) are left out.
#[rustfmt::skip]
static BODY_25: Topology = Topology {
    name: "BODY_25",
    parts: &[
        "Nose", "Neck", "RShoulder", "RElbow", "RWrist", "LShoulder", "LElbow", "LWrist",
        "MidHip", "RHip", "RKnee", "RAnkle", "LHip", "LKnee", "LAnkle", "REye", "LEye", "REar",
        "LEar", "LBigToe", "LSmallToe", "LHeel", "RBigToe", "RSmallToe", "RHeel",
    ],
    part_pairs: &[
        (1, 8), (1, 2), (1, 5), (2, 3), (3, 4),
        (5, 6), (6, 7), (8, 9), (9, 10), (10, 11),
        (8, 12), (12, 13), (13, 14), (1, 0), (0, 15),
        (15, 17), (0, 16), (16, 18),
        (14, 19), (19, 20), (14, 21), (11, 22), (22, 23),
        (11, 24),
    ],
    field_pairs: &[
        (26, 27), (40, 41), (48, 49), (42, 43), (44, 45),
        (50, 51), (52, 53), (32, 33), (28, 29), (30, 31),
        (34, 35), (36, 37), (38, 39), (56, 57), (58, 59),
        (62, 63), (60, 61), (64, 65),
        (66, 67), (68, 69), (70, 71), (72, 73), (74, 75),
        (76, 77),
    ],
};

#[rustfmt::skip]
static HAND: Topology = Topology {
    name: "HAND",
    parts: &[
        // Left hand
        "LThumb0",
        "LThumb1CMC", "LThumb2Knuckles", "LThumb3IP", "LThumb4FingerTip",
        "LIndex1Knuckles", "LIndex2PIP", "LIndex3DIP", "LIndex4FingerTip",
        "LMiddle1Knuckles", "LMiddle2PIP", "LMiddle3DIP", "LMiddle4FingerTip",
        "LRing1Knuckles", "LRing2PIP", "LRing3DIP", "LRing4FingerTip",
        "LPinky1Knuckles", "LPinky2PIP", "LPinky3DIP", "LPinky4FingerTip",
        // Right hand
        "RThumb0",
        "RThumb1CMC", "RThumb2Knuckles", "RThumb3IP", "RThumb4FingerTip",
        "RIndex1Knuckles", "RIndex2PIP", "RIndex3DIP", "RIndex4FingerTip",
        "RMiddle1Knuckles", "RMiddle2PIP", "RMiddle3DIP", "RMiddle4FingerTip",
        "RRing1Knuckles", "RRing2PIP", "RRing3DIP", "RRing4FingerTip",
        "RPinky1Knuckles", "RPinky2PIP", "RPinky3DIP", "RPinky4FingerTip",
    ],
    part_pairs: &[
        // Left hand
        (0, 1), (1, 2), (2, 3), (3, 4), (0, 5), (5, 6), (6, 7), (7, 8),
        (0, 9), (9, 10), (10, 11), (11, 12), (0, 13), (13, 14), (14, 15), (15, 16),
        (0, 17), (17, 18), (18, 19), (19, 20),
        // Right hand
        (21, 22), (22, 23), (23, 24), (24, 25), (21, 26), (26, 27), (27, 28), (28, 29),
        (21, 30), (30, 31), (31, 32), (32, 33), (21, 34), (34, 35), (35, 36), (36, 37),
        (21, 38), (38, 39), (39, 40), (40, 41),
    ],
    field_pairs: &[
        // Left hand
        (43, 44), (45, 46), (47, 48), (49, 50), (51, 52), (53, 54), (55, 56), (57, 58),
        (59, 60), (61, 62), (63, 64), (65, 66), (67, 68), (69, 70), (71, 72), (73, 74),
        (75, 76), (77, 78), (79, 80), (81, 82),
        // Right hand
        (83, 84), (85, 86), (87, 88), (89, 90), (91, 92), (93, 94), (95, 96), (97, 98),
        (99, 100), (101, 102), (103, 104), (105, 106), (107, 108), (109, 110), (111, 112), (113, 114),
        (115, 116), (117, 118), (119, 120), (121, 122),
    ],
};
