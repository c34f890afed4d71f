// SPDX-License-Identifier: Apache-2.0

use crate::{Dimension, Point, Pos};

/// Axis-aligned box given by its closed bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub min_x: Pos,
    pub min_y: Pos,
    pub max_x: Pos,
    pub max_y: Pos,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<BoundingBox> {
        points.into_iter().fold(None, |acc, p| {
            let point_box = BoundingBox {
                min_x: p.x,
                min_y: p.y,
                max_x: p.x,
                max_y: p.y,
            };
            Some(match acc {
                Some(acc) => acc.union(&point_box),
                None => point_box,
            })
        })
    }

    pub fn min(&self, dim: Dimension) -> Pos {
        match dim {
            Dimension::X => self.min_x,
            Dimension::Y => self.min_y,
        }
    }

    pub fn max(&self, dim: Dimension) -> Pos {
        match dim {
            Dimension::X => self.max_x,
            Dimension::Y => self.max_y,
        }
    }

    pub fn width(&self) -> Pos {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> Pos {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> Pos {
        self.width() * self.height()
    }

    pub fn half_perimeter(&self) -> Pos {
        self.width() + self.height()
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Returns `true` if the open interiors overlap. Boxes that only share an
    /// edge or a corner do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x.max(other.min_x) < self.max_x.min(other.max_x)
            && self.min_y.max(other.min_y) < self.max_y.min(other.max_y)
    }

    /// Overlap region of two boxes with intersecting interiors.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Returns `true` if `other` lies within this box, boundary included.
    pub fn covers(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }
}
