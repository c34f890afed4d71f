// SPDX-License-Identifier: Apache-2.0

use std::fmt;

mod overlap;
mod sweepline;

pub use overlap::{find_conflicts, find_overlaps};
pub use sweepline::find_collision;

/// Verdict of the sweep-line validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Certificate {
    Valid,
    /// Ids of two rectangles whose interiors overlap, smaller id first.
    Collision(usize, usize),
}

impl Certificate {
    pub(crate) fn collision(a: usize, b: usize) -> Certificate {
        Certificate::Collision(a.min(b), a.max(b))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Certificate::Valid)
    }

    pub fn pair(&self) -> Option<(usize, usize)> {
        match self {
            Certificate::Valid => None,
            Certificate::Collision(a, b) => Some((*a, *b)),
        }
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Certificate::Valid => write!(f, "no intersections found"),
            Certificate::Collision(a, b) => write!(f, "rectangles {a} and {b} intersect"),
        }
    }
}
