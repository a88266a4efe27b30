//! Greedy assembly of limb connections into per-person skeletons.
//!
//! Limbs are processed in topology order. A connection extends the first skeleton whose joint at
//! the limb's first part is the connection's A-side candidate; otherwise it starts a new skeleton.
//! Assignments are never revisited, and skeletons are never merged.

use std::fmt;

use crate::{candidate::CandidateId, connection::LimbState, topology::Topology};

/// The joints of one assembled person, indexed by body part.
#[derive(Clone, PartialEq, Eq)]
pub struct Skeleton {
    joints: Vec<Option<CandidateId>>,
}

impl Skeleton {
    fn new(part_count: usize) -> Self {
        Self {
            joints: vec![None; part_count],
        }
    }

    /// Returns the candidate assigned to body part `part`, if any.
    ///
    /// Returns `None` for parts outside of the skeleton's topology.
    pub fn get(&self, part: usize) -> Option<CandidateId> {
        self.joints.get(part).copied().flatten()
    }

    /// Returns all joint slots. The slice always has one entry per body part.
    pub fn joints(&self) -> &[Option<CandidateId>] {
        &self.joints
    }

    /// Returns an iterator over the `(part, candidate)` pairs of all found joints.
    pub fn found(&self) -> impl Iterator<Item = (usize, CandidateId)> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter_map(|(part, id)| id.map(|id| (part, id)))
    }

    /// Returns the number of found joints.
    pub fn found_count(&self) -> usize {
        self.joints.iter().filter(|id| id.is_some()).count()
    }
}

impl fmt::Debug for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.found()).finish()
    }
}

/// Merges the scored connections of every limb into skeletons.
///
/// `limbs` holds one [`LimbState`] per limb of `topology`, in topology order. Invalid limbs are
/// skipped. Connections of the limbs at index `part_count - 1` and above only extend existing
/// skeletons and never start new ones.
pub fn assemble(topology: &Topology, limbs: &[LimbState]) -> Vec<Skeleton> {
    debug_assert_eq!(limbs.len(), topology.limb_count());

    let part_count = topology.part_count();
    let spawn_limit = part_count.saturating_sub(1);
    let mut skeletons: Vec<Skeleton> = Vec::new();

    for (limb, state) in topology.limbs().zip(limbs) {
        let LimbState::Connected(connections) = state else {
            continue;
        };

        for conn in connections {
            let existing = skeletons
                .iter_mut()
                .find(|skeleton| skeleton.joints[limb.part_a] == Some(conn.a));
            match existing {
                Some(skeleton) => skeleton.joints[limb.part_b] = Some(conn.b),
                None if limb.index < spawn_limit => {
                    let mut skeleton = Skeleton::new(part_count);
                    skeleton.joints[limb.part_a] = Some(conn.a);
                    skeleton.joints[limb.part_b] = Some(conn.b);
                    skeletons.push(skeleton);
                }
                None => {
                    log::trace!(
                        "dropping connection {} -> {} of limb {}: no skeleton to extend",
                        conn.a,
                        conn.b,
                        limb.index,
                    );
                }
            }
        }
    }

    skeletons
}
