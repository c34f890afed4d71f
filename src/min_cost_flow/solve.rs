// SPDX-License-Identifier: Apache-2.0

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;

use crate::min_cost_flow::{CHIP_BASE, FlowNetwork, NodeKind, SOURCE};
use crate::{FloorplanError, Packing, Weight};

/// Shortest augmenting path found by one Dijkstra round.
struct AugmentingPath {
    /// Edge ids from the source to the sink.
    edges: Vec<usize>,
    sink: usize,
    amount: Weight,
}

impl FlowNetwork {
    /// Routes all net supply at minimum cost by successive shortest
    /// augmenting paths, leaving optimal potentials behind.
    ///
    /// Fails with [`FloorplanError::NegativeCycle`] if the ordering
    /// constraints cannot be met on this axis.
    pub fn solve(&mut self) -> Result<(), FloorplanError> {
        self.compute_starting_potential()?;

        let mut augmentations = 0usize;
        while self.nodes[SOURCE].balance > 0 {
            let path = self.shortest_path()?;
            self.augment(&path);
            augmentations += 1;
        }

        log::trace!(
            "Solved {} flow network after {augmentations} augmentations, cost {}",
            self.dim,
            self.cost()
        );
        Ok(())
    }

    /// Writes the coordinates along this axis into `packing` and returns the
    /// total weighted net span along it.
    pub fn place(&self, packing: &mut Packing) -> Weight {
        let base = self.potential[CHIP_BASE];
        let mut netlength = 0;
        for (index, kind) in self.nodes.keys().enumerate() {
            let potential = self.potential[index];
            match *kind {
                NodeKind::Source | NodeKind::ChipBase => {}
                NodeKind::Rectangle(rect) => {
                    packing.rect_mut(rect).set_pos(self.dim, base - potential)
                }
                NodeKind::NetLower(net) => netlength += packing.net(net).weight() * potential,
                NodeKind::NetUpper(net) => netlength -= packing.net(net).weight() * potential,
            }
        }
        netlength
    }

    /// Bellman-Ford from an implicit root joined to every node at cost zero.
    fn compute_starting_potential(&mut self) -> Result<(), FloorplanError> {
        self.potential = vec![0; self.nodes.len()];

        for _ in 0..=self.nodes.len() {
            let mut changed = false;
            for edge in &self.edges {
                let candidate = self.potential[edge.from] + edge.cost;
                if candidate < self.potential[edge.to] {
                    self.potential[edge.to] = candidate;
                    changed = true;
                }
            }
            if !changed {
                return Ok(());
            }
        }

        log::trace!("Negative cycle in {} flow network", self.dim);
        Err(FloorplanError::NegativeCycle { dim: self.dim })
    }

    /// Dijkstra over the residual network by reduced cost. Updates the
    /// potentials and returns the path to the closest node with demand.
    fn shortest_path(&mut self) -> Result<AugmentingPath, FloorplanError> {
        let n = self.nodes.len();
        let mut dist: Vec<Option<Weight>> = vec![None; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut settled = FixedBitSet::with_capacity(n);
        let mut heap = BinaryHeap::new();

        dist[SOURCE] = Some(0);
        heap.push(Reverse((0, SOURCE)));

        while let Some(Reverse((d, node))) = heap.pop() {
            if settled.put(node) {
                continue;
            }
            for &id in &self.nodes[node].adjacent {
                let edge = &self.edges[id];
                if !edge.has_residual(node) {
                    continue;
                }
                let next = edge.other(node);
                if settled.contains(next) {
                    continue;
                }
                let candidate = d + edge.reduced_cost(node, &self.potential);
                if dist[next].is_none_or(|old| candidate < old) {
                    dist[next] = Some(candidate);
                    prev[next] = Some(id);
                    heap.push(Reverse((candidate, next)));
                }
            }
        }

        let farthest = dist.iter().flatten().copied().max().unwrap_or(0);
        for (potential, d) in self.potential.iter_mut().zip(&dist) {
            *potential += d.unwrap_or(farthest);
        }

        let sink = (0..n)
            .filter(|&node| self.nodes[node].balance < 0)
            .filter_map(|node| dist[node].map(|d| (d, node)))
            .min()
            .map(|(_, node)| node)
            .ok_or(FloorplanError::UnroutableDemand { dim: self.dim })?;

        let mut edges = Vec::new();
        let mut amount = self.nodes[SOURCE].balance.min(-self.nodes[sink].balance);
        let mut node = sink;
        while node != SOURCE {
            let Some(id) = prev[node] else {
                return Err(FloorplanError::UnroutableDemand { dim: self.dim });
            };
            let edge = &self.edges[id];
            node = edge.other(node);
            if let Some(residual) = edge.residual(node) {
                amount = amount.min(residual);
            }
            edges.push(id);
        }
        edges.reverse();

        Ok(AugmentingPath {
            edges,
            sink,
            amount,
        })
    }

    fn augment(&mut self, path: &AugmentingPath) {
        debug_assert!(path.amount > 0);
        let mut node = SOURCE;
        for &id in &path.edges {
            let edge = &mut self.edges[id];
            if edge.from == node {
                edge.flow += path.amount;
            } else {
                edge.flow -= path.amount;
            }
            node = edge.other(node);
        }
        debug_assert_eq!(node, path.sink);

        self.nodes[SOURCE].balance -= path.amount;
        self.nodes[path.sink].balance += path.amount;
        log::trace!(
            "Augmented {} units along {} edges",
            path.amount,
            path.edges.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, Dimension, Net, Pin, Rectangle, SequencePair};

    fn packing(chip: BoundingBox, sizes: &[(i64, i64)], nets: Vec<Net>) -> Packing {
        Packing::new(
            Rectangle::placed_at(0, chip),
            sizes
                .iter()
                .enumerate()
                .map(|(id, &(w, h))| Rectangle::new(id, w, h))
                .collect(),
            nets,
        )
        .unwrap()
    }

    fn chip(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    fn solve_axis(p: &mut Packing, dim: Dimension, sp: &SequencePair) -> (FlowNetwork, Weight) {
        let mut network = FlowNetwork::build(p, dim, sp).unwrap();
        network.solve().unwrap();
        let span = network.place(p);
        (network, span)
    }

    #[test]
    fn rectangle_is_pulled_towards_fixed_pin() {
        let nets = vec![Net::new(1, vec![Pin::fixed(0, 0), Pin::on_rectangle(0, 0, 0)])];
        let mut p = packing(chip(2, 3, 10, 10), &[(4, 4)], nets);
        let sp = SequencePair::new(1);

        let (x, x_span) = solve_axis(&mut p, Dimension::X, &sp);
        let (y, y_span) = solve_axis(&mut p, Dimension::Y, &sp);
        assert_eq!(p.rect(0).base(), (2, 3).into());
        assert_eq!((x_span, y_span), (2, 3));
        assert_eq!(x.cost(), -x_span);
        assert_eq!(y.cost(), -y_span);
        assert_eq!(x.balance(NodeKind::Source), Some(0));
        assert_eq!(x.balance(NodeKind::NetUpper(0)), Some(0));
    }

    #[test]
    fn abutting_pins_cost_nothing() {
        // right edge pin of 0 meets left edge pin of 1
        let nets = vec![Net::new(
            3,
            vec![Pin::on_rectangle(0, 2, 1), Pin::on_rectangle(1, 0, 1)],
        )];
        let mut p = packing(chip(0, 0, 20, 20), &[(2, 2), (2, 2)], nets);
        let sp = SequencePair::new(2);

        let (_, x_span) = solve_axis(&mut p, Dimension::X, &sp);
        let (_, y_span) = solve_axis(&mut p, Dimension::Y, &sp);
        assert_eq!((x_span, y_span), (0, 0));
        assert_eq!(p.rect(1).pos(Dimension::X), p.rect(0).max(Dimension::X));
        assert_eq!(p.rect(0).pos(Dimension::Y), p.rect(1).pos(Dimension::Y));
        assert_eq!(p.netlength(), 0);
        assert!(p.validate().is_valid());
    }

    #[test]
    fn competing_nets_follow_the_heavier_weight() {
        // one rectangle pulled left by weight 3 and right by weight 1
        let nets = vec![
            Net::new(3, vec![Pin::fixed(0, 5), Pin::on_rectangle(0, 0, 0)]),
            Net::new(1, vec![Pin::fixed(20, 5), Pin::on_rectangle(0, 0, 0)]),
        ];
        let mut p = packing(chip(0, 0, 20, 20), &[(2, 2)], nets);
        let (x, span) = solve_axis(&mut p, Dimension::X, &SequencePair::new(1));
        assert_eq!(p.rect(0).pos(Dimension::X), 0);
        assert_eq!(span, 20);
        assert_eq!(x.cost(), -20);
    }

    #[test]
    fn overfull_row_is_a_negative_cycle() {
        let mut p = packing(chip(0, 0, 10, 10), &[(6, 1), (6, 1)], vec![]);
        let mut network = FlowNetwork::build(&p, Dimension::X, &SequencePair::new(2)).unwrap();
        assert!(matches!(
            network.solve(),
            Err(FloorplanError::NegativeCycle { dim: Dimension::X })
        ));

        // the same pair is fine along y, where they share a row
        let (_, span) = solve_axis(&mut p, Dimension::Y, &SequencePair::new(2));
        assert_eq!(span, 0);
    }

    #[test]
    fn dot_export() {
        let nets = vec![Net::new(1, vec![Pin::fixed(0, 0), Pin::on_rectangle(0, 0, 0)])];
        let p = packing(chip(0, 0, 10, 10), &[(4, 4)], nets);
        let mut network = FlowNetwork::build(&p, Dimension::X, &SequencePair::new(1)).unwrap();
        let dot = network.to_dot(false);
        assert!(dot.starts_with("digraph flow_x {"));
        assert!(dot.contains("[label=\"rect0\", color=chartreuse];"));
        assert!(network.to_dot(true).lines().all(|line| !line.contains("->")));

        network.solve().unwrap();
        assert!(network.to_dot(true).contains("0 -> 3 [label=\"0,1\"];"));
    }
}
