// SPDX-License-Identifier: Apache-2.0

use fixedbitset::FixedBitSet;
use indexmap::IndexMap;
use itertools::Either;

use crate::min_cost_flow::{CHIP_BASE, Edge, FlowNetwork, Node, NodeKind, SOURCE};
use crate::{Dimension, FloorplanError, Packing, PinOwner, Pos, SequencePair, Weight};

impl FlowNetwork {
    /// Builds the network for `dim` from the current orientations in
    /// `packing` and the relative order given by `sequence_pair`.
    pub fn build(
        packing: &Packing,
        dim: Dimension,
        sequence_pair: &SequencePair,
    ) -> Result<FlowNetwork, FloorplanError> {
        sequence_pair.check_len(packing.num_rects())?;

        let mut network = FlowNetwork {
            dim,
            nodes: IndexMap::new(),
            edges: Vec::new(),
            potential: Vec::new(),
        };

        network.add_node(NodeKind::Source, 0);
        network.add_node(NodeKind::ChipBase, 0);

        let chip = packing.chip_base();
        for (index, rect) in packing.rects().iter().enumerate() {
            let node = network.add_node(NodeKind::Rectangle(index), 0);
            network.add_constraint(CHIP_BASE, node, chip.pos(dim));
            network.add_constraint(node, CHIP_BASE, rect.dimension(dim) - chip.max(dim));
        }

        for (index, net) in packing.nets().iter().enumerate() {
            if net.pins().is_empty() {
                continue;
            }
            let lower = network.add_node(NodeKind::NetLower(index), net.weight());
            let upper = network.add_node(NodeKind::NetUpper(index), -net.weight());
            for pin in net.pins() {
                let (owner, offset) = match pin.owner() {
                    PinOwner::Fixed => (CHIP_BASE, pin.offset().coord(dim)),
                    PinOwner::Rectangle(rect) => (
                        network.index(NodeKind::Rectangle(rect)),
                        packing.rect(rect).relative_pin_position(pin).coord(dim),
                    ),
                };
                network.add_constraint(lower, owner, -offset);
                network.add_constraint(owner, upper, offset);
            }
        }

        network.add_ordering_edges(packing, sequence_pair);
        network.potential = vec![0; network.nodes.len()];

        log::trace!(
            "Built {dim} flow network with {} nodes and {} edges",
            network.nodes.len(),
            network.edges.len()
        );

        Ok(network)
    }

    /// Adds an edge for every pair of rectangles whose order along this axis
    /// is fixed by the sequence pair.
    fn add_ordering_edges(&mut self, packing: &Packing, sequence_pair: &SequencePair) {
        let positive = sequence_pair.positive_locus();
        let negative = sequence_pair.negative_locus();
        let mut after_negative = FixedBitSet::with_capacity(negative.len());

        for (negative_rank, &before) in negative.iter().enumerate() {
            after_negative.clear();
            after_negative.extend(negative[negative_rank + 1..].iter().copied());

            let Some(positive_rank) = positive.iter().position(|&rect| rect == before) else {
                continue;
            };
            // left of: later in both loci; below: earlier in the positive locus
            let candidates = match self.dim {
                Dimension::X => Either::Left(positive[positive_rank + 1..].iter()),
                Dimension::Y => Either::Right(positive[..positive_rank].iter().rev()),
            };
            let extent = packing.rect(before).dimension(self.dim);
            let from = self.index(NodeKind::Rectangle(before));
            for &after in candidates {
                if after_negative.contains(after) {
                    let to = self.index(NodeKind::Rectangle(after));
                    self.add_constraint(from, to, extent);
                }
            }
        }
    }

    /// Inserts a node. A positive balance is moved onto the source through
    /// an edge bounded by that balance.
    fn add_node(&mut self, kind: NodeKind, balance: Weight) -> usize {
        let (index, previous) = self.nodes.insert_full(kind, Node::default());
        assert!(previous.is_none(), "Node {kind} added twice");

        if balance > 0 {
            self.add_edge(SOURCE, index, 0, Some(balance));
            self.nodes[SOURCE].balance += balance;
        } else {
            self.nodes[index].balance = balance;
        }
        index
    }

    /// Adds the constraint `coord(to) >= coord(from) + offset`.
    fn add_constraint(&mut self, from: usize, to: usize, offset: Pos) {
        self.add_edge(from, to, -offset, None);
    }

    fn add_edge(&mut self, from: usize, to: usize, cost: Weight, capacity: Option<Weight>) {
        assert_ne!(from, to, "Flow network edges must not be loops");
        let id = self.edges.len();
        self.nodes[from].adjacent.push(id);
        self.nodes[to].adjacent.push(id);
        self.edges.push(Edge {
            from,
            to,
            cost,
            flow: 0,
            capacity,
        });
    }

    fn index(&self, kind: NodeKind) -> usize {
        self.nodes
            .get_index_of(&kind)
            .unwrap_or_else(|| panic!("Flow network has no node {kind}"))
    }
}
