// SPDX-License-Identifier: Apache-2.0

use crate::validate::{self, Certificate};
use crate::{BoundingBox, Dimension, FloorplanError, Net, Orientation, PinOwner, Pos, Rectangle};

mod netlength;

/// All rectangles, nets, and the chip base of one problem instance.
///
/// Movable rectangles are indexed `0..num_rects()` and their ids equal their
/// index. Blockages are kept apart and never take part in the search.
#[derive(Clone, Debug)]
pub struct Packing {
    pub(crate) chip_base: Rectangle,
    pub(crate) rects: Vec<Rectangle>,
    pub(crate) blockages: Vec<Rectangle>,
    pub(crate) nets: Vec<Net>,
}

impl Packing {
    pub fn new(
        chip_base: Rectangle,
        rectangles: Vec<Rectangle>,
        nets: Vec<Net>,
    ) -> Result<Packing, FloorplanError> {
        if !chip_base.placed() {
            return Err(FloorplanError::ChipBaseUnplaced);
        }

        let (mut blockages, rects): (Vec<_>, Vec<_>) =
            rectangles.into_iter().partition(|r| r.is_blockage());

        for (index, rect) in rects.iter().enumerate() {
            if rect.id() != index {
                return Err(FloorplanError::RectangleIdMismatch {
                    index,
                    id: rect.id(),
                });
            }
        }
        for (index, blockage) in blockages.iter_mut().enumerate() {
            blockage.id = index;
        }

        for (net_index, net) in nets.iter().enumerate() {
            for pin in net.pins() {
                if let PinOwner::Rectangle(rect) = pin.owner() {
                    if rect >= rects.len() {
                        return Err(FloorplanError::PinOwnerOutOfRange {
                            net: net_index,
                            rect,
                            rectangles: rects.len(),
                        });
                    }
                }
            }
        }

        Ok(Packing {
            chip_base,
            rects,
            blockages,
            nets,
        })
    }

    /// The placement region.
    pub fn chip_base(&self) -> &Rectangle {
        &self.chip_base
    }

    pub fn num_rects(&self) -> usize {
        self.rects.len()
    }

    pub fn rects(&self) -> &[Rectangle] {
        &self.rects
    }

    /// Returns the movable rectangle with index `index`.
    pub fn rect(&self, index: usize) -> &Rectangle {
        self.rects.get(index).unwrap_or_else(|| {
            panic!(
                "Rectangle index {index} out of range ({} rectangles)",
                self.rects.len()
            )
        })
    }

    pub fn rect_mut(&mut self, index: usize) -> &mut Rectangle {
        let len = self.rects.len();
        self.rects
            .get_mut(index)
            .unwrap_or_else(|| panic!("Rectangle index {index} out of range ({len} rectangles)"))
    }

    pub fn get_rect(&self, index: usize) -> Option<&Rectangle> {
        self.rects.get(index)
    }

    pub fn blockages(&self) -> &[Rectangle] {
        &self.blockages
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn net(&self, index: usize) -> &Net {
        self.nets.get(index).unwrap_or_else(|| {
            panic!(
                "Net index {index} out of range ({} nets)",
                self.nets.len()
            )
        })
    }

    pub fn orientations(&self) -> Vec<Orientation> {
        self.rects.iter().map(|r| r.orientation()).collect()
    }

    /// Sets the orientation of every movable rectangle, by index.
    pub fn set_orientations(&mut self, orientations: &[Orientation]) {
        assert_eq!(
            orientations.len(),
            self.rects.len(),
            "Expected one orientation per rectangle"
        );
        for (rect, orientation) in self.rects.iter_mut().zip(orientations) {
            rect.set_orientation(*orientation);
        }
    }

    /// Removes the coordinates of every movable rectangle.
    pub fn clear_placement(&mut self) {
        for rect in &mut self.rects {
            rect.unplace();
        }
    }

    pub fn all_placed(&self) -> bool {
        self.rects.iter().all(|r| r.placed())
    }

    /// Bounding box of all placed movable rectangles.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.rects
            .iter()
            .filter_map(|r| r.try_bbox())
            .reduce(|a, b| a.union(&b))
    }

    pub fn bounding_box_area(&self) -> Option<Pos> {
        self.bounding_box().map(|b| b.area())
    }

    /// Checks that every movable rectangle is placed inside the chip base.
    pub fn check_bounds(&self) -> Result<(), FloorplanError> {
        let chip = self.chip_base.bbox();
        for rect in &self.rects {
            if !rect.placed() {
                return Err(FloorplanError::Unplaced { rect: rect.id() });
            }
            for dim in Dimension::ALL {
                if rect.pos(dim) < chip.min(dim) || rect.max(dim) > chip.max(dim) {
                    return Err(FloorplanError::OutOfBounds {
                        rect: rect.id(),
                        dim,
                    });
                }
            }
        }
        Ok(())
    }

    /// Sweep-line check of the movable rectangles. All of them must be placed.
    pub fn validate(&self) -> Certificate {
        validate::find_collision(&self.rects)
    }

    /// Every pair of movable rectangles whose interiors overlap.
    pub fn collisions(&self) -> Vec<(usize, usize)> {
        validate::find_overlaps(&self.placed_boxes(&self.rects))
    }

    /// Every `(rectangle, blockage)` pair whose interiors overlap.
    pub fn blockage_conflicts(&self) -> Vec<(usize, usize)> {
        validate::find_conflicts(
            &self.placed_boxes(&self.rects),
            &self.placed_boxes(&self.blockages),
        )
    }

    /// Overlap region of the two rectangles named by a collision
    /// certificate.
    pub fn collision_region(&self, certificate: &Certificate) -> Option<BoundingBox> {
        let (a, b) = certificate.pair()?;
        self.rect(a).bbox().intersection(&self.rect(b).bbox())
    }

    fn placed_boxes(&self, rects: &[Rectangle]) -> Vec<(usize, BoundingBox)> {
        rects
            .iter()
            .filter_map(|r| r.try_bbox().map(|bbox| (r.id(), bbox)))
            .collect()
    }
}
