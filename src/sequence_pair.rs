// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use fixedbitset::FixedBitSet;
use itertools::Itertools;

use crate::FloorplanError;

mod placement;

/// Relative position of one rectangle with respect to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    LeftOf,
    RightOf,
    Below,
    Above,
}

/// Two permutations of the rectangle indices.
///
/// Rectangle `a` is left of `b` iff `a` precedes `b` in both loci, and `a`
/// is below `b` iff `a` precedes `b` in the negative locus but follows it in
/// the positive locus.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SequencePair {
    pub(crate) positive: Vec<usize>,
    pub(crate) negative: Vec<usize>,
}

impl SequencePair {
    /// Sequence pair with both loci in ascending order, which puts all
    /// rectangles in one row.
    pub fn new(len: usize) -> SequencePair {
        SequencePair {
            positive: (0..len).collect(),
            negative: (0..len).collect(),
        }
    }

    pub fn from_loci(
        positive: Vec<usize>,
        negative: Vec<usize>,
    ) -> Result<SequencePair, FloorplanError> {
        if positive.len() != negative.len() {
            return Err(FloorplanError::LocusLengthMismatch {
                positive: positive.len(),
                negative: negative.len(),
                rectangles: positive.len(),
            });
        }
        check_permutation(&positive)?;
        check_permutation(&negative)?;
        Ok(SequencePair { positive, negative })
    }

    pub fn len(&self) -> usize {
        self.positive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }

    pub fn positive_locus(&self) -> &[usize] {
        &self.positive
    }

    pub fn negative_locus(&self) -> &[usize] {
        &self.negative
    }

    /// Fails if the loci do not have one entry per rectangle.
    pub(crate) fn check_len(&self, rectangles: usize) -> Result<(), FloorplanError> {
        if self.positive.len() != rectangles || self.negative.len() != rectangles {
            return Err(FloorplanError::LocusLengthMismatch {
                positive: self.positive.len(),
                negative: self.negative.len(),
                rectangles,
            });
        }
        Ok(())
    }

    /// Relation of rectangle `a` to rectangle `b`, which must differ.
    pub fn relation(&self, a: usize, b: usize) -> Relation {
        assert_ne!(a, b, "A rectangle has no relation to itself");
        let positive = ranks(&self.positive);
        let negative = ranks(&self.negative);
        match (positive[a] < positive[b], negative[a] < negative[b]) {
            (true, true) => Relation::LeftOf,
            (false, false) => Relation::RightOf,
            (false, true) => Relation::Below,
            (true, false) => Relation::Above,
        }
    }
}

/// `ranks(locus)[rect]` is the position of `rect` in `locus`.
pub(crate) fn ranks(locus: &[usize]) -> Vec<usize> {
    let mut ranks = vec![0; locus.len()];
    for (rank, &rect) in locus.iter().enumerate() {
        ranks[rect] = rank;
    }
    ranks
}

fn check_permutation(locus: &[usize]) -> Result<(), FloorplanError> {
    let mut seen = FixedBitSet::with_capacity(locus.len());
    for &index in locus {
        if index >= locus.len() || seen.put(index) {
            return Err(FloorplanError::InvalidLocus {
                index,
                len: locus.len(),
            });
        }
    }
    Ok(())
}

impl fmt::Display for SequencePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Positive Locus: {}", self.positive.iter().join(", "))?;
        write!(f, "Negative Locus: {}", self.negative.iter().join(", "))
    }
}
