// SPDX-License-Identifier: Apache-2.0

use crate::min_cost_flow::FlowNetwork;
use crate::{
    BoundingBox, Dimension, FloorplanError, Packing, Pin, PinOwner, Point, SequencePair, Weight,
};

impl Packing {
    /// Absolute position of a pin. Pins on rectangles require the rectangle
    /// to be placed.
    pub fn pin_position(&self, pin: &Pin) -> Point {
        match pin.owner() {
            PinOwner::Fixed => pin.offset(),
            PinOwner::Rectangle(index) => self.rect(index).absolute_pin_position(pin),
        }
    }

    /// Bounding box of the pins of net `index`, or `None` for a net without
    /// pins.
    pub fn net_bounding_box(&self, index: usize) -> Option<BoundingBox> {
        BoundingBox::from_points(self.net(index).pins().iter().map(|p| self.pin_position(p)))
    }

    /// Total weighted half-perimeter wirelength over the current coordinates.
    pub fn netlength(&self) -> Weight {
        (0..self.num_nets())
            .filter_map(|i| {
                self.net_bounding_box(i)
                    .map(|bbox| self.net(i).weight() * bbox.half_perimeter())
            })
            .sum()
    }

    /// Places all rectangles so that the total wirelength is minimal among
    /// placements respecting the relative order given by `sequence_pair` and
    /// the chip bounds. Returns that wirelength.
    ///
    /// Rectangle orientations are taken as they are. Coordinates are only
    /// written if both axes are feasible.
    pub fn compute_netlength_optimal(
        &mut self,
        sequence_pair: &SequencePair,
    ) -> Result<Weight, FloorplanError> {
        let mut networks = Vec::with_capacity(Dimension::ALL.len());
        for dim in Dimension::ALL {
            let mut network = FlowNetwork::build(self, dim, sequence_pair)?;
            network.solve()?;
            networks.push(network);
        }

        Ok(networks.iter().map(|network| network.place(self)).sum())
    }
}
