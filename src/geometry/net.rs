// SPDX-License-Identifier: Apache-2.0

use crate::{Point, Pos, Weight};

/// What a pin is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinOwner {
    /// Fixed to the chip; the offset is an absolute chip coordinate.
    Fixed,
    /// Attached to the movable rectangle with this index; the offset is
    /// relative to the rectangle's unrotated frame.
    Rectangle(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    pub(crate) offset: Point,
    pub(crate) owner: PinOwner,
}

impl Pin {
    pub fn on_rectangle(rect: usize, x: Pos, y: Pos) -> Pin {
        Pin {
            offset: Point::new(x, y),
            owner: PinOwner::Rectangle(rect),
        }
    }

    pub fn fixed(x: Pos, y: Pos) -> Pin {
        Pin {
            offset: Point::new(x, y),
            owner: PinOwner::Fixed,
        }
    }

    pub fn owner(&self) -> PinOwner {
        self.owner
    }

    pub fn offset(&self) -> Point {
        self.offset
    }
}

/// A weighted electrical connection. Its cost is the weight times the
/// half-perimeter of the bounding box of its pins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Net {
    pub(crate) weight: Weight,
    pub(crate) pins: Vec<Pin>,
}

impl Net {
    pub fn new(weight: Weight, pins: Vec<Pin>) -> Net {
        assert!(weight > 0, "Net weight must be positive, got {weight}");
        Net { weight, pins }
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }
}
