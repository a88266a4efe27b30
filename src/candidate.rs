//! Keypoint candidates and their frame-wide ids.

use std::{fmt, ops::Range};

use crate::peaks::Peak;

/// Frame-wide identifier of a [`Candidate`].
///
/// Ids are handed out part-major (all candidates of part 0, then part 1, ...) and in extraction
/// order within a part, starting at 0. An id is therefore also the candidate's index in the flat
/// candidate list of its frame ([`Candidates::all`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateId(usize);

impl CandidateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[cfg(test)]
impl CandidateId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A detected location of a single body part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    id: CandidateId,
    part: usize,
    x: u32,
    y: u32,
    confidence: f32,
}

impl Candidate {
    #[inline]
    pub fn id(&self) -> CandidateId {
        self.id
    }

    /// Returns the index of the body part this candidate was detected for.
    #[inline]
    pub fn part(&self) -> usize {
        self.part
    }

    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Returns the candidate's position as `[x, y]`.
    #[inline]
    pub fn position(&self) -> [u32; 2] {
        [self.x, self.y]
    }

    /// Returns the unsmoothed confidence map value at the candidate's position.
    #[inline]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Hands out monotonically increasing [`CandidateId`]s.
///
/// Peaks of different parts may be extracted concurrently, but ids must be assigned one part after
/// the other, in part order, once extraction is done.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of ids handed out so far.
    pub fn allocated(&self) -> usize {
        self.next
    }

    /// Assigns ids to the `peaks` of body part `part`, in order.
    pub fn assign(&mut self, part: usize, peaks: &[Peak]) -> Vec<Candidate> {
        peaks
            .iter()
            .map(|peak| {
                let id = CandidateId(self.next);
                self.next += 1;
                Candidate {
                    id,
                    part,
                    x: peak.x,
                    y: peak.y,
                    confidence: peak.confidence,
                }
            })
            .collect()
    }
}

/// All candidates of one frame, grouped by body part.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    /// Flat list, indexed by [`CandidateId::index`].
    list: Vec<Candidate>,
    /// Range of `list` holding the candidates of each part.
    parts: Vec<Range<usize>>,
}

impl Candidates {
    /// Assigns ids to per-part peak lists.
    ///
    /// `peaks[p]` holds the peaks of body part `p`.
    pub fn from_peaks<P: AsRef<[Peak]>>(peaks: &[P]) -> Self {
        let mut ids = IdAllocator::new();
        let mut list = Vec::new();
        let mut parts = Vec::with_capacity(peaks.len());
        for (part, part_peaks) in peaks.iter().enumerate() {
            let start = ids.allocated();
            list.extend(ids.assign(part, part_peaks.as_ref()));
            parts.push(start..ids.allocated());
        }

        Self { list, parts }
    }

    /// Returns the number of body parts.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Returns the total number of candidates across all parts.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the candidates of body part `part`, in extraction order.
    ///
    /// Parts outside of the frame's part range have no candidates.
    pub fn for_part(&self, part: usize) -> &[Candidate] {
        match self.parts.get(part) {
            Some(range) => &self.list[range.clone()],
            None => &[],
        }
    }

    /// Returns the flat list of all candidates, ordered by id.
    pub fn all(&self) -> &[Candidate] {
        &self.list
    }

    /// Looks up a candidate by id.
    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        self.list.get(id.index())
    }

    /// Returns an iterator over `(part, candidates)` for every body part.
    pub fn iter_parts(&self) -> impl Iterator<Item = (usize, &[Candidate])> + '_ {
        self.parts
            .iter()
            .enumerate()
            .map(|(part, range)| (part, &self.list[range.clone()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(x: u32, y: u32) -> Peak {
        Peak {
            x,
            y,
            confidence: 0.5,
        }
    }

    #[test]
    fn ids_are_part_major() {
        let candidates =
            Candidates::from_peaks(&[vec![peak(1, 1), peak(2, 2)], vec![], vec![peak(3, 3)]]);

        assert_eq!(candidates.part_count(), 3);
        assert_eq!(candidates.len(), 3);

        let ids = |part| {
            candidates
                .for_part(part)
                .iter()
                .map(|c| c.id().index())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(0), [0, 1]);
        assert_eq!(ids(1), [] as [usize; 0]);
        assert_eq!(ids(2), [2]);
        assert!(candidates.for_part(3).is_empty());

        for (index, candidate) in candidates.all().iter().enumerate() {
            assert_eq!(candidate.id().index(), index);
            assert_eq!(candidates.get(candidate.id()), Some(candidate));
        }
        assert_eq!(candidates.get(CandidateId(3)), None);
    }

    #[test]
    fn candidates_keep_peak_data() {
        let candidates = Candidates::from_peaks(&[vec![], vec![peak(7, 9)]]);
        let c = candidates.for_part(1)[0];
        assert_eq!(c.part(), 1);
        assert_eq!(c.position(), [7, 9]);
        assert_eq!(c.confidence(), 0.5);
        assert_eq!(c.id().to_string(), "#0");
    }

    #[test]
    fn allocator_continues_across_parts() {
        let mut ids = IdAllocator::new();
        let a = ids.assign(0, &[peak(0, 0)]);
        let b = ids.assign(1, &[peak(0, 0), peak(1, 1)]);
        assert_eq!(a[0].id(), CandidateId(0));
        assert_eq!(b.iter().map(|c| c.id().index()).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(ids.allocated(), 3);
    }

    #[test]
    fn iter_parts_covers_everything() {
        let candidates = Candidates::from_peaks(&[vec![peak(1, 1)], vec![peak(2, 2)]]);
        let parts = candidates
            .iter_parts()
            .map(|(part, list)| (part, list.len()))
            .collect::<Vec<_>>();
        assert_eq!(parts, [(0, 1), (1, 1)]);
    }
}
