// SPDX-License-Identifier: Apache-2.0

use num_bigint::BigUint;

use crate::search::{Candidate, OrientationPolicy, SearchMode, next_combination, next_permutation};
use crate::sequence_pair::ranks;
use crate::{FloorplanError, Orientation, SequencePair};

/// One orientation dial per active rectangle. The first dial turns fastest.
#[derive(Clone, Debug)]
struct Odometer {
    dials: Vec<Dial>,
}

#[derive(Clone, Debug)]
struct Dial {
    rect: usize,
    choices: Vec<Orientation>,
    digit: usize,
    start: usize,
}

impl Odometer {
    /// Dials for `rects` starting at their current orientation. With
    /// `keep_current`, an orientation the policy does not offer becomes an
    /// extra first choice; otherwise the dial starts at the first choice.
    fn new(
        rects: impl IntoIterator<Item = usize>,
        policy: OrientationPolicy,
        orientations: &[Orientation],
        keep_current: bool,
    ) -> Odometer {
        let dials = rects
            .into_iter()
            .map(|rect| {
                let choices = dial_choices(policy, orientations[rect], keep_current);
                let start = choices
                    .iter()
                    .position(|&choice| choice == orientations[rect])
                    .unwrap_or(0);
                Dial {
                    rect,
                    choices,
                    digit: start,
                    start,
                }
            })
            .collect();
        Odometer { dials }
    }

    fn apply(&self, orientations: &mut [Orientation]) {
        for dial in &self.dials {
            orientations[dial.rect] = dial.choices[dial.digit];
        }
    }

    /// Turns to the next setting. Returns `false` once every dial is back
    /// at its start.
    fn advance(&mut self, orientations: &mut [Orientation]) -> bool {
        for dial in &mut self.dials {
            dial.digit = (dial.digit + 1) % dial.choices.len();
            orientations[dial.rect] = dial.choices[dial.digit];
            if dial.digit != dial.start {
                return true;
            }
        }
        false
    }
}

fn dial_choices(
    policy: OrientationPolicy,
    current: Orientation,
    keep_current: bool,
) -> Vec<Orientation> {
    let mut choices = policy.choices(current);
    if keep_current && !choices.contains(&current) {
        choices.insert(0, current);
    }
    choices
}

/// The rectangles currently rearranged by a k-local pass.
#[derive(Clone, Debug)]
struct Neighborhood {
    k: usize,
    /// All rectangle indices; the first `k` are the active subset.
    universe: Vec<usize>,
    positive: Slots,
    negative: Slots,
}

/// Where the active rectangles sit in one starting locus, and how they are
/// currently rearranged over those positions.
#[derive(Clone, Debug)]
struct Slots {
    positions: Vec<usize>,
    values: Vec<usize>,
    permutation: Vec<usize>,
}

impl Slots {
    fn new(locus: &[usize], subset: &[usize]) -> Slots {
        let rank = ranks(locus);
        let mut positions = subset.iter().map(|&rect| rank[rect]).collect::<Vec<_>>();
        positions.sort_unstable();
        let values = positions.iter().map(|&position| locus[position]).collect();
        Slots {
            permutation: (0..positions.len()).collect(),
            positions,
            values,
        }
    }

    fn write(&self, locus: &mut [usize]) {
        for (&position, &choice) in self.positions.iter().zip(&self.permutation) {
            locus[position] = self.values[choice];
        }
    }
}

#[derive(Clone, Debug)]
enum Scope {
    Global,
    Local(Neighborhood),
}

/// Walks every candidate of a global or k-local search, one at a time.
///
/// Global mode starts from both loci in ascending order and visits
/// `states^n * n! * n!` candidates. Local mode visits, for every `k`-subset
/// of rectangles, every rearrangement of the subset within both starting
/// loci crossed with every orientation of its members; the first candidate
/// of each subset is the start itself. A start orientation the policy does
/// not offer is tried in addition to the policy's choices. Orientations turn fastest, then the
/// negative locus, then the positive locus, then the subset.
#[derive(Clone, Debug)]
pub struct PlacementEnumerator {
    policy: OrientationPolicy,
    start: Candidate,
    current: Candidate,
    odometer: Odometer,
    scope: Scope,
    exhausted: bool,
}

impl PlacementEnumerator {
    /// Enumerates every candidate of `mode` around `start`. `start` only
    /// matters for its orientations in global mode.
    pub fn new(
        start: SequencePair,
        orientations: Vec<Orientation>,
        mode: SearchMode,
        policy: OrientationPolicy,
    ) -> Result<PlacementEnumerator, FloorplanError> {
        start.check_len(orientations.len())?;
        match mode {
            SearchMode::Global | SearchMode::Local(0) => {
                Ok(PlacementEnumerator::global(orientations, policy))
            }
            SearchMode::Local(k) => PlacementEnumerator::local(start, orientations, k, policy),
        }
    }

    pub fn global(
        orientations: Vec<Orientation>,
        policy: OrientationPolicy,
    ) -> PlacementEnumerator {
        let n = orientations.len();
        let start = Candidate {
            sequence_pair: SequencePair::new(n),
            orientations,
        };
        let odometer = Odometer::new(0..n, policy, &start.orientations, false);
        let mut current = start.clone();
        odometer.apply(&mut current.orientations);
        PlacementEnumerator {
            policy,
            start,
            current,
            odometer,
            scope: Scope::Global,
            exhausted: false,
        }
    }

    /// Fails unless `0 < k < n`.
    pub fn local(
        start: SequencePair,
        orientations: Vec<Orientation>,
        k: usize,
        policy: OrientationPolicy,
    ) -> Result<PlacementEnumerator, FloorplanError> {
        start.check_len(orientations.len())?;
        let n = start.len();
        if k == 0 || k >= n {
            return Err(FloorplanError::NeighborhoodTooLarge { k, rectangles: n });
        }

        let start = Candidate {
            sequence_pair: start,
            orientations,
        };
        let mut enumerator = PlacementEnumerator {
            policy,
            current: start.clone(),
            odometer: Odometer { dials: Vec::new() },
            scope: Scope::Local(Neighborhood {
                k,
                universe: (0..n).collect(),
                positive: Slots::new(&start.sequence_pair.positive, &[]),
                negative: Slots::new(&start.sequence_pair.negative, &[]),
            }),
            start,
            exhausted: false,
        };
        enumerator.enter_neighborhood();
        Ok(enumerator)
    }

    /// Number of candidates a full walk visits.
    pub fn candidate_count(&self) -> BigUint {
        let n = self.start.orientations.len();
        let states = BigUint::from(self.policy.states());
        match &self.scope {
            Scope::Global => states.pow(n as u32) * factorial(n) * factorial(n),
            Scope::Local(neighborhood) => {
                let k = neighborhood.k;
                let sizes = self.start.orientations.iter().map(|&current| {
                    dial_choices(self.policy, current, true).len()
                });
                subset_products(sizes, k) * factorial(k) * factorial(k)
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Resets loci and orientations to the start and puts fresh dials on
    /// the active subset.
    fn enter_neighborhood(&mut self) {
        let Scope::Local(neighborhood) = &mut self.scope else {
            return;
        };
        let subset = &neighborhood.universe[..neighborhood.k];
        neighborhood.positive = Slots::new(&self.start.sequence_pair.positive, subset);
        neighborhood.negative = Slots::new(&self.start.sequence_pair.negative, subset);
        log::trace!("Entering neighborhood {subset:?}");

        self.current = self.start.clone();
        self.odometer = Odometer::new(
            subset.iter().copied(),
            self.policy,
            &self.start.orientations,
            true,
        );
        self.odometer.apply(&mut self.current.orientations);
    }

    fn advance(&mut self) {
        if self.odometer.advance(&mut self.current.orientations) {
            return;
        }

        let locus = &mut self.current.sequence_pair;
        match &mut self.scope {
            Scope::Global => {
                if next_permutation(&mut locus.negative) || next_permutation(&mut locus.positive) {
                    return;
                }
            }
            Scope::Local(neighborhood) => {
                if next_permutation(&mut neighborhood.negative.permutation) {
                    neighborhood.negative.write(&mut locus.negative);
                    return;
                }
                if next_permutation(&mut neighborhood.positive.permutation) {
                    neighborhood.negative.write(&mut locus.negative);
                    neighborhood.positive.write(&mut locus.positive);
                    return;
                }
                if next_combination(&mut neighborhood.universe, neighborhood.k) {
                    self.enter_neighborhood();
                    return;
                }
            }
        }
        self.exhausted = true;
    }
}

impl Iterator for PlacementEnumerator {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.exhausted {
            return None;
        }
        let candidate = self.current.clone();
        self.advance();
        Some(candidate)
    }
}

fn factorial(n: usize) -> BigUint {
    (1..=n).map(BigUint::from).product()
}

/// Sum over all `k`-subsets of the product of their sizes.
fn subset_products(sizes: impl IntoIterator<Item = usize>, k: usize) -> BigUint {
    // sums[j] covers the j-subsets of the sizes seen so far
    let mut sums = vec![BigUint::from(0u32); k + 1];
    sums[0] = BigUint::from(1u32);
    for size in sizes {
        let size = BigUint::from(size);
        for j in (1..=k).rev() {
            let extended = &sums[j - 1] * &size;
            sums[j] += extended;
        }
    }
    sums.swap_remove(k)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::Rotation;

    fn count(enumerator: PlacementEnumerator) -> (usize, usize) {
        let candidates = enumerator.collect::<Vec<_>>();
        let distinct = candidates.iter().collect::<HashSet<_>>().len();
        (candidates.len(), distinct)
    }

    #[test]
    fn global_visits_everything_once() {
        let enumerator = PlacementEnumerator::global(
            vec![Orientation::default(); 3],
            OrientationPolicy::QuarterTurns,
        );
        assert_eq!(enumerator.candidate_count(), BigUint::from(288u32));
        assert_eq!(count(enumerator), (288, 288));

        let enumerator = PlacementEnumerator::global(
            vec![Orientation::default(); 2],
            OrientationPolicy::AllRotationsMirrored,
        );
        assert_eq!(count(enumerator), (256, 256));
    }

    #[test]
    fn global_order() {
        let mut enumerator = PlacementEnumerator::global(
            vec![Orientation::default(); 2],
            OrientationPolicy::QuarterTurns,
        );
        let first = enumerator.next().unwrap();
        assert_eq!(first.sequence_pair, SequencePair::new(2));

        // orientations turn first, then the negative locus
        let turned = (0..3).map(|_| enumerator.next().unwrap()).collect::<Vec<_>>();
        assert_eq!(turned[0].orientations[0].rotation, Rotation::R90);
        assert_eq!(turned[1].orientations[1].rotation, Rotation::R90);
        assert_eq!(
            turned[2].orientations,
            vec![Orientation::new(Rotation::R90, false); 2]
        );
        assert_eq!(turned[2].sequence_pair, SequencePair::new(2));

        let next = enumerator.next().unwrap();
        assert_eq!(next.sequence_pair.negative_locus(), &[1, 0]);
        assert_eq!(next.sequence_pair.positive_locus(), &[0, 1]);
        assert_eq!(next.orientations, vec![Orientation::default(); 2]);
    }

    #[test]
    fn empty_packing_has_one_candidate() {
        let enumerator = PlacementEnumerator::global(vec![], OrientationPolicy::AllRotations);
        assert_eq!(enumerator.candidate_count(), BigUint::from(1u32));
        assert_eq!(count(enumerator), (1, 1));
    }

    #[test]
    fn local_count_and_subset_starts() {
        let start = SequencePair::from_loci(vec![2, 0, 3, 1], vec![1, 3, 0, 2]).unwrap();
        let orientations = vec![Orientation::default(); 4];
        let enumerator = PlacementEnumerator::local(
            start.clone(),
            orientations.clone(),
            2,
            OrientationPolicy::Fixed,
        )
        .unwrap();
        assert_eq!(enumerator.candidate_count(), BigUint::from(24u32));

        let candidates = enumerator.collect::<Vec<_>>();
        assert_eq!(candidates.len(), 24);
        for block in candidates.chunks(4) {
            assert_eq!(block[0].sequence_pair, start);
            assert_eq!(block.iter().collect::<HashSet<_>>().len(), 4);
        }

        // subset {0, 1}: positions 1 and 3 of the positive locus, 0 and 2 of
        // the negative locus
        assert_eq!(candidates[1].sequence_pair.negative_locus(), &[0, 3, 1, 2]);
        assert_eq!(candidates[1].sequence_pair.positive_locus(), &[2, 0, 3, 1]);
        assert_eq!(candidates[2].sequence_pair.negative_locus(), &[1, 3, 0, 2]);
        assert_eq!(candidates[2].sequence_pair.positive_locus(), &[2, 1, 3, 0]);
    }

    #[test]
    fn local_turns_only_active_rectangles() {
        let start = SequencePair::new(3);
        let orientations = vec![
            Orientation::new(Rotation::R180, false),
            Orientation::default(),
            Orientation::new(Rotation::R90, false),
        ];
        let enumerator = PlacementEnumerator::local(
            start.clone(),
            orientations.clone(),
            1,
            OrientationPolicy::QuarterTurns,
        )
        .unwrap();
        // R180 is kept as an extra choice for rectangle 0
        assert_eq!(enumerator.candidate_count(), BigUint::from(7u32));

        let candidates = enumerator.collect::<Vec<_>>();
        assert_eq!(candidates.len(), 7);
        let unmodified = Candidate {
            sequence_pair: start,
            orientations: orientations.clone(),
        };
        for first in [0, 3, 5] {
            assert_eq!(candidates[first], unmodified);
        }
        assert_eq!(candidates[1].orientations[0].rotation, Rotation::R0);
        assert_eq!(candidates[2].orientations[0].rotation, Rotation::R90);
        assert_eq!(candidates[4].orientations[1].rotation, Rotation::R90);
        assert_eq!(candidates[6].orientations[2].rotation, Rotation::R0);
        for candidate in &candidates {
            assert_eq!(candidate.sequence_pair, SequencePair::new(3));
        }
    }

    #[test]
    fn subset_products_generalize_binomials() {
        assert_eq!(subset_products([2, 2, 2, 2], 2), BigUint::from(6u32 * 4));
        assert_eq!(subset_products([3, 2, 2], 1), BigUint::from(7u32));
        assert_eq!(subset_products([3, 2, 2], 2), BigUint::from(16u32));
        assert_eq!(subset_products([5], 0), BigUint::from(1u32));
    }

    #[test]
    fn neighborhood_must_be_smaller_than_packing() {
        let result = PlacementEnumerator::new(
            SequencePair::new(3),
            vec![Orientation::default(); 3],
            SearchMode::Local(3),
            OrientationPolicy::Fixed,
        );
        assert!(matches!(
            result,
            Err(FloorplanError::NeighborhoodTooLarge { k: 3, rectangles: 3 })
        ));
    }

    #[test]
    fn zero_neighborhood_matches_global() {
        let start = SequencePair::from_loci(vec![1, 2, 0], vec![2, 0, 1]).unwrap();
        let local = PlacementEnumerator::new(
            start,
            vec![Orientation::default(); 3],
            SearchMode::Local(0),
            OrientationPolicy::QuarterTurns,
        )
        .unwrap()
        .collect::<HashSet<_>>();
        let global = PlacementEnumerator::global(
            vec![Orientation::default(); 3],
            OrientationPolicy::QuarterTurns,
        )
        .collect::<HashSet<_>>();
        assert_eq!(local, global);
    }

    #[test]
    fn counts_do_not_overflow() {
        let enumerator = PlacementEnumerator::global(
            vec![Orientation::default(); 30],
            OrientationPolicy::AllRotationsMirrored,
        );
        assert!(enumerator.candidate_count() > BigUint::from(u128::MAX));
    }
}
