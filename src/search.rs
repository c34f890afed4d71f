// SPDX-License-Identifier: Apache-2.0

//! Exhaustive and k-local search over orientations and sequence pairs.

use crate::{Orientation, Packing, Rotation, SequencePair, Weight};

mod combinatorics;
mod enumerator;
mod optimize;

pub use combinatorics::{next_combination, next_permutation};
pub use enumerator::PlacementEnumerator;
pub use optimize::{evaluate, optimize, optimize_from};

/// Which orientations the search tries for each rectangle.
///
/// Mirroring never changes the footprint of a rectangle, only its pin
/// positions, so it is only worth iterating for wirelength objectives. It is
/// never implied by the objective; choose
/// [`OrientationPolicy::AllRotationsMirrored`] to get it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrientationPolicy {
    /// Keep every rectangle as it is.
    Fixed,
    /// 0 and 90 degrees, keeping the mirrored flag.
    #[default]
    QuarterTurns,
    /// All four rotations, keeping the mirrored flag.
    AllRotations,
    /// All four rotations, unmirrored and then mirrored.
    AllRotationsMirrored,
}

impl OrientationPolicy {
    /// Number of orientations tried per rectangle.
    pub fn states(&self) -> usize {
        match self {
            OrientationPolicy::Fixed => 1,
            OrientationPolicy::QuarterTurns => 2,
            OrientationPolicy::AllRotations => 4,
            OrientationPolicy::AllRotationsMirrored => 8,
        }
    }

    /// Orientations tried for a rectangle currently in `current`, in the
    /// order the search visits them.
    pub fn choices(&self, current: Orientation) -> Vec<Orientation> {
        let oriented = |mirrored, rotations: &[Rotation]| {
            rotations
                .iter()
                .map(move |&rotation| Orientation::new(rotation, mirrored))
                .collect::<Vec<_>>()
        };
        match self {
            OrientationPolicy::Fixed => vec![current],
            OrientationPolicy::QuarterTurns => {
                oriented(current.mirrored, &[Rotation::R0, Rotation::R90])
            }
            OrientationPolicy::AllRotations => oriented(current.mirrored, &Rotation::ALL),
            OrientationPolicy::AllRotationsMirrored => {
                let mut choices = oriented(false, &Rotation::ALL);
                choices.extend(oriented(true, &Rotation::ALL));
                choices
            }
        }
    }
}

/// What a candidate placement is scored by; lower is better.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Objective {
    /// Area of the bounding box of the tightly packed rectangles.
    #[default]
    BoundingBox,
    /// Total weighted half-perimeter wirelength of the optimal placement.
    Wirelength,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Every orientation assignment crossed with every pair of loci.
    #[default]
    Global,
    /// Every way to rearrange and reorient `k` rectangles of the starting
    /// candidate. `Local(0)` is the same as `Global`.
    Local(usize),
}

impl SearchMode {
    pub fn is_global(&self) -> bool {
        matches!(self, SearchMode::Global | SearchMode::Local(0))
    }
}

/// Options for [`optimize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Default: bounding box area.
    pub objective: Objective,
    /// Default: global.
    pub mode: SearchMode,
    /// Default: quarter turns.
    pub orientations: OrientationPolicy,
    /// Upper limit on the number of local passes. Ignored in global mode.
    /// Default: 8.
    pub max_passes: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            objective: Objective::BoundingBox,
            mode: SearchMode::Global,
            orientations: OrientationPolicy::QuarterTurns,
            max_passes: 8,
        }
    }
}

/// One point of the search space.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub sequence_pair: SequencePair,
    /// Orientation of every rectangle, by index.
    pub orientations: Vec<Orientation>,
}

/// Result of a search run.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Placed copy of the best packing found, if any candidate was feasible.
    pub best: Option<Packing>,
    pub score: Option<Weight>,
    pub best_candidate: Option<Candidate>,
    /// Number of candidates scored.
    pub evaluated: usize,
    /// Number of candidates that admitted no placement or overlapped a
    /// blockage.
    pub infeasible: usize,
    pub passes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_choices() {
        let mirrored = Orientation::new(Rotation::R180, true);
        assert_eq!(OrientationPolicy::Fixed.choices(mirrored), vec![mirrored]);
        assert_eq!(
            OrientationPolicy::QuarterTurns.choices(mirrored),
            vec![
                Orientation::new(Rotation::R0, true),
                Orientation::new(Rotation::R90, true)
            ]
        );

        for policy in [
            OrientationPolicy::Fixed,
            OrientationPolicy::QuarterTurns,
            OrientationPolicy::AllRotations,
            OrientationPolicy::AllRotationsMirrored,
        ] {
            let choices = policy.choices(Orientation::default());
            assert_eq!(choices.len(), policy.states());
            assert_eq!(choices[0], Orientation::default());
        }

        let all = OrientationPolicy::AllRotationsMirrored.choices(mirrored);
        assert_eq!(all[3], Orientation::new(Rotation::R270, false));
        assert_eq!(all[4], Orientation::new(Rotation::R0, true));
    }

    #[test]
    fn zero_neighborhood_is_global() {
        assert!(SearchMode::Local(0).is_global());
        assert!(!SearchMode::Local(2).is_global());
        assert_eq!(SearchOptions::default().mode, SearchMode::Global);
    }
}
