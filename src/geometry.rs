// SPDX-License-Identifier: Apache-2.0

use std::fmt;

mod bbox;
mod net;
mod orientation;
mod rectangle;

pub use bbox::BoundingBox;
pub use net::{Net, Pin, PinOwner};
pub use orientation::{Orientation, Rotation};
pub use rectangle::Rectangle;

/// Coordinate type used throughout the crate.
pub type Pos = i64;

/// Net weight and wirelength type.
pub type Weight = i64;

/// One of the two placement axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    X,
    Y,
}

impl Dimension {
    pub const ALL: [Dimension; 2] = [Dimension::X, Dimension::Y];

    /// Returns the perpendicular axis.
    pub fn other(self) -> Dimension {
        match self {
            Dimension::X => Dimension::Y,
            Dimension::Y => Dimension::X,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::X => write!(f, "x"),
            Dimension::Y => write!(f, "y"),
        }
    }
}

/// A 2D point with an "is-set" flag. Geometry that has not been placed yet
/// carries an unset point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: Pos,
    pub y: Pos,
    pub set: bool,
}

impl Point {
    pub fn new(x: Pos, y: Pos) -> Point {
        Point { x, y, set: true }
    }

    pub fn unset() -> Point {
        Point::default()
    }

    pub fn coord(&self, dim: Dimension) -> Pos {
        match dim {
            Dimension::X => self.x,
            Dimension::Y => self.y,
        }
    }

    pub fn coord_mut(&mut self, dim: Dimension) -> &mut Pos {
        match dim {
            Dimension::X => &mut self.x,
            Dimension::Y => &mut self.y,
        }
    }

    /// Returns the point with x and y exchanged.
    pub fn swapped(&self) -> Point {
        Point {
            x: self.y,
            y: self.x,
            set: self.set,
        }
    }
}

impl From<(Pos, Pos)> for Point {
    fn from((x, y): (Pos, Pos)) -> Self {
        Point::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
