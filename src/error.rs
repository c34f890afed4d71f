// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::Dimension;

/// Error type describing why a placement could not be produced or an input
/// could not be loaded.
#[derive(Debug)]
pub enum FloorplanError {
    /// A locus does not have one entry per movable rectangle.
    LocusLengthMismatch {
        positive: usize,
        negative: usize,
        rectangles: usize,
    },
    /// A locus is not a permutation of `0..len`.
    InvalidLocus { index: usize, len: usize },
    /// The k-local neighborhood must be smaller than the rectangle count.
    NeighborhoodTooLarge { k: usize, rectangles: usize },
    /// Derived coordinates put a rectangle outside the chip base.
    OutOfBounds { rect: usize, dim: Dimension },
    /// The ordering constraints on this axis contain a negative cycle.
    NegativeCycle { dim: Dimension },
    /// Some net demand could not be routed through the flow network.
    UnroutableDemand { dim: Dimension },
    /// A pin refers to a rectangle that does not exist.
    PinOwnerOutOfRange {
        net: usize,
        rect: usize,
        rectangles: usize,
    },
    /// A rectangle's id does not match its position in the movable list.
    RectangleIdMismatch { index: usize, id: usize },
    /// The chip base has no coordinates.
    ChipBaseUnplaced,
    /// A rectangle has no coordinates where a placed one was required.
    Unplaced { rect: usize },
    /// Malformed instance or solution text.
    Parse { line: usize, message: String },
    Io(std::io::Error),
}

impl FloorplanError {
    /// Returns `true` for failures that only rule out the current search
    /// candidate. Everything else aborts the run.
    pub fn is_infeasible_candidate(&self) -> bool {
        matches!(
            self,
            FloorplanError::OutOfBounds { .. }
                | FloorplanError::NegativeCycle { .. }
                | FloorplanError::UnroutableDemand { .. }
        )
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        FloorplanError::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for FloorplanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloorplanError::LocusLengthMismatch {
                positive,
                negative,
                rectangles,
            } => write!(
                f,
                "sequence pair loci have lengths {positive} and {negative}, but the packing has {rectangles} rectangles"
            ),
            FloorplanError::InvalidLocus { index, len } => {
                write!(f, "locus entry {index} is repeated or not in [0..{len})")
            }
            FloorplanError::NeighborhoodTooLarge { k, rectangles } => write!(
                f,
                "neighborhood size {k} must be smaller than the rectangle count {rectangles}"
            ),
            FloorplanError::OutOfBounds { rect, dim } => {
                write!(f, "rectangle {rect} exceeds the chip base along {dim}")
            }
            FloorplanError::NegativeCycle { dim } => {
                write!(f, "ordering constraints along {dim} contain a negative cycle")
            }
            FloorplanError::UnroutableDemand { dim } => {
                write!(f, "net demand along {dim} cannot reach any sink")
            }
            FloorplanError::PinOwnerOutOfRange {
                net,
                rect,
                rectangles,
            } => write!(
                f,
                "net {net} has a pin on rectangle {rect}, but only {rectangles} rectangles exist"
            ),
            FloorplanError::RectangleIdMismatch { index, id } => {
                write!(f, "rectangle at index {index} carries id {id}")
            }
            FloorplanError::ChipBaseUnplaced => write!(f, "chip base has no coordinates"),
            FloorplanError::Unplaced { rect } => write!(f, "rectangle {rect} is not placed"),
            FloorplanError::Parse { line, message } => write!(f, "line {line}: {message}"),
            FloorplanError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FloorplanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FloorplanError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FloorplanError {
    fn from(err: std::io::Error) -> Self {
        FloorplanError::Io(err)
    }
}
