// SPDX-License-Identifier: Apache-2.0

use crate::{BoundingBox, Dimension, Orientation, Pin, PinOwner, Point, Pos, Rotation};

/// A rectangle to be placed, or a fixed one (chip base, blockage).
///
/// `size` is stored in the unrotated frame. Width and height reported by
/// [`Rectangle::dimension`] observe the rotation, and pin positions observe
/// both rotation and mirroring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rectangle {
    pub(crate) id: usize,
    pub(crate) base: Point,
    pub(crate) size: Point,
    pub(crate) orientation: Orientation,
    pub(crate) blockage: bool,
}

impl Rectangle {
    /// Creates an unplaced rectangle.
    pub fn new(id: usize, width: Pos, height: Pos) -> Rectangle {
        assert!(
            width >= 0 && height >= 0,
            "Rectangle {id} has negative size {width}x{height}"
        );
        Rectangle {
            id,
            base: Point::unset(),
            size: Point::new(width, height),
            orientation: Orientation::default(),
            blockage: false,
        }
    }

    /// Creates an unrotated rectangle occupying `bbox`.
    pub fn placed_at(id: usize, bbox: BoundingBox) -> Rectangle {
        let mut rect = Rectangle::new(id, bbox.width(), bbox.height());
        rect.base = Point::new(bbox.min_x, bbox.min_y);
        rect
    }

    /// Creates a fixed obstacle occupying `bbox`.
    pub fn blockage(id: usize, bbox: BoundingBox) -> Rectangle {
        let mut rect = Rectangle::placed_at(id, bbox);
        rect.blockage = true;
        rect
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_blockage(&self) -> bool {
        self.blockage
    }

    /// Returns `true` iff the rectangle has coordinates.
    pub fn placed(&self) -> bool {
        self.base.set
    }

    /// Lower left corner; unset before placement.
    pub fn base(&self) -> Point {
        self.base
    }

    /// Size in the unrotated frame.
    pub fn size(&self) -> Point {
        self.size
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn rotation(&self) -> Rotation {
        self.orientation.rotation
    }

    pub fn mirrored(&self) -> bool {
        self.orientation.mirrored
    }

    /// Increments the current rotation by `by`.
    pub fn rotate(&mut self, by: Rotation) {
        self.orientation.rotation = self.orientation.rotation.add(by);
    }

    pub fn flip(&mut self) {
        self.orientation.mirrored = !self.orientation.mirrored;
    }

    /// Extent along `dim`, observing rotation. Valid before placement.
    pub fn dimension(&self, dim: Dimension) -> Pos {
        if self.orientation.rotation.is_quarter_turn() {
            self.size.coord(dim.other())
        } else {
            self.size.coord(dim)
        }
    }

    pub fn width(&self) -> Pos {
        self.dimension(Dimension::X)
    }

    pub fn height(&self) -> Pos {
        self.dimension(Dimension::Y)
    }

    pub fn area(&self) -> Pos {
        self.size.x * self.size.y
    }

    /// Lower bound along `dim`.
    pub fn pos(&self, dim: Dimension) -> Pos {
        assert!(self.placed(), "Rectangle {} is not placed", self.id);
        self.base.coord(dim)
    }

    /// Upper bound along `dim`.
    pub fn max(&self, dim: Dimension) -> Pos {
        self.pos(dim) + self.dimension(dim)
    }

    /// Sets the lower bound along `dim` and marks the rectangle placed.
    pub fn set_pos(&mut self, dim: Dimension, value: Pos) {
        *self.base.coord_mut(dim) = value;
        self.base.set = true;
    }

    pub fn place_at(&mut self, x: Pos, y: Pos) {
        self.base = Point::new(x, y);
    }

    pub fn unplace(&mut self) {
        self.base = Point::unset();
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox {
            min_x: self.pos(Dimension::X),
            min_y: self.pos(Dimension::Y),
            max_x: self.max(Dimension::X),
            max_y: self.max(Dimension::Y),
        }
    }

    /// Bounding box if placed.
    pub fn try_bbox(&self) -> Option<BoundingBox> {
        self.placed().then(|| self.bbox())
    }

    /// Returns `true` if the interiors of both (placed) rectangles overlap.
    /// A common border does not count as intersection.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.bbox().intersects(&other.bbox())
    }

    /// Position of `pin` relative to the lower left corner of this
    /// rectangle, observing mirroring and rotation. Valid before placement.
    pub fn relative_pin_position(&self, pin: &Pin) -> Point {
        assert_eq!(
            pin.owner,
            PinOwner::Rectangle(self.id),
            "Pin does not belong to rectangle {}",
            self.id
        );
        self.orientation
            .apply(self.size.x, self.size.y, pin.offset)
    }

    pub fn absolute_pin_position(&self, pin: &Pin) -> Point {
        let rel = self.relative_pin_position(pin);
        Point::new(rel.x + self.pos(Dimension::X), rel.y + self.pos(Dimension::Y))
    }
}
