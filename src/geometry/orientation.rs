// SPDX-License-Identifier: Apache-2.0

use nalgebra::{Matrix3, Vector3, matrix};

use crate::{Point, Pos};

/// Counter-clockwise rotation of a rectangle in quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Integer code used by the solution format.
    pub fn code(self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Rotation> {
        Rotation::ALL.get(code as usize).copied()
    }

    /// Adds `other` to this rotation, modulo a full turn.
    pub fn add(self, other: Rotation) -> Rotation {
        Rotation::ALL[((self.code() + other.code()) % 4) as usize]
    }

    /// Returns `true` for 90 and 270 degrees, where width and height swap.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::R90 | Rotation::R270)
    }
}

/// Rotation and mirroring state of a rectangle. Mirroring is applied first,
/// about the vertical centre line of the unrotated rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Orientation {
    pub rotation: Rotation,
    pub mirrored: bool,
}

impl Orientation {
    pub fn new(rotation: Rotation, mirrored: bool) -> Orientation {
        Orientation { rotation, mirrored }
    }

    /// Homogeneous transform mapping a point of the unrotated `width` x
    /// `height` frame to the oriented frame, whose origin is again the lower
    /// left corner of the (possibly swapped) bounding box.
    pub(crate) fn transform(&self, width: Pos, height: Pos) -> Matrix3<Pos> {
        let mirror = if self.mirrored {
            matrix![
                -1, 0, width;
                0, 1, 0;
                0, 0, 1
            ]
        } else {
            Matrix3::identity()
        };

        let rotate = match self.rotation {
            Rotation::R0 => Matrix3::identity(),
            Rotation::R90 => matrix![
                0, -1, height;
                1, 0, 0;
                0, 0, 1
            ],
            Rotation::R180 => matrix![
                -1, 0, width;
                0, -1, height;
                0, 0, 1
            ],
            Rotation::R270 => matrix![
                0, 1, 0;
                -1, 0, width;
                0, 0, 1
            ],
        };

        rotate * mirror
    }

    pub(crate) fn apply(&self, width: Pos, height: Pos, point: Point) -> Point {
        let v = self.transform(width, height) * Vector3::new(point.x, point.y, 1);
        Point::new(v[0], v[1])
    }
}
