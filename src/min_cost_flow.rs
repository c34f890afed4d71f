// SPDX-License-Identifier: Apache-2.0

//! Flow network whose optimal dual yields wirelength-minimal coordinates
//! along one axis.
//!
//! An edge `u -> v` stands for the difference constraint
//! `coord(v) >= coord(u) + offset` and carries the flow cost `-offset`.
//! Coordinates are read off the node potentials as
//! `potential(chip base) - potential(node)`.

use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{Dimension, Weight};

mod build;
mod solve;

/// Identifies a node of the flow network by the object it stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// Collects the supply of every lower net rail.
    Source,
    /// Reference node; fixed pins and chip bounds hang off it.
    ChipBase,
    Rectangle(usize),
    /// Lower end of the span of net `i` along the axis.
    NetLower(usize),
    /// Upper end of the span of net `i` along the axis.
    NetUpper(usize),
}

impl NodeKind {
    fn color(&self) -> &'static str {
        match self {
            NodeKind::Source => "black",
            NodeKind::ChipBase => "gold",
            NodeKind::Rectangle(_) => "chartreuse",
            NodeKind::NetLower(_) => "crimson",
            NodeKind::NetUpper(_) => "navy",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Source => write!(f, "source"),
            NodeKind::ChipBase => write!(f, "chip"),
            NodeKind::Rectangle(i) => write!(f, "rect{i}"),
            NodeKind::NetLower(i) => write!(f, "net{i}_lo"),
            NodeKind::NetUpper(i) => write!(f, "net{i}_hi"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Node {
    /// Positive for supply, negative for demand.
    pub(crate) balance: Weight,
    /// Ids of all edges touching this node, in either direction.
    pub(crate) adjacent: Vec<usize>,
}

/// A directed edge and, implicitly, its residual reverse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub(crate) from: usize,
    pub(crate) to: usize,
    pub(crate) cost: Weight,
    pub(crate) flow: Weight,
    /// `None` means unbounded.
    pub(crate) capacity: Option<Weight>,
}

impl Edge {
    pub fn from(&self) -> usize {
        self.from
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub fn cost(&self) -> Weight {
        self.cost
    }

    pub fn flow(&self) -> Weight {
        self.flow
    }

    pub fn capacity(&self) -> Option<Weight> {
        self.capacity
    }

    /// Endpoint that is not `node`.
    pub(crate) fn other(&self, node: usize) -> usize {
        debug_assert!(node == self.from || node == self.to);
        if node == self.from { self.to } else { self.from }
    }

    /// Residual capacity when leaving `node`; `None` means unbounded.
    pub(crate) fn residual(&self, node: usize) -> Option<Weight> {
        if node == self.from {
            self.capacity.map(|capacity| capacity - self.flow)
        } else {
            Some(self.flow)
        }
    }

    pub(crate) fn has_residual(&self, node: usize) -> bool {
        self.residual(node).is_none_or(|residual| residual > 0)
    }

    /// Cost reduced by `potential`, seen when leaving `node`.
    pub(crate) fn reduced_cost(&self, node: usize, potential: &[Weight]) -> Weight {
        let forward = self.cost + potential[self.from] - potential[self.to];
        if node == self.from { forward } else { -forward }
    }
}

/// The flow network of one axis of one candidate placement.
#[derive(Clone, Debug)]
pub struct FlowNetwork {
    pub(crate) dim: Dimension,
    pub(crate) nodes: IndexMap<NodeKind, Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) potential: Vec<Weight>,
}

/// Index of [`NodeKind::Source`]; it is always inserted first.
pub(crate) const SOURCE: usize = 0;
/// Index of [`NodeKind::ChipBase`]; it is always inserted second.
pub(crate) const CHIP_BASE: usize = 1;

impl FlowNetwork {
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.nodes.keys().copied()
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.nodes.contains_key(&kind)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Current balance of a node, `None` if the network has no such node.
    pub fn balance(&self, kind: NodeKind) -> Option<Weight> {
        self.nodes.get(&kind).map(|node| node.balance)
    }

    /// Current potential of a node. Potentials are all zero before
    /// [`FlowNetwork::solve`].
    pub fn potential(&self, kind: NodeKind) -> Option<Weight> {
        self.nodes
            .get_index_of(&kind)
            .map(|index| self.potential[index])
    }

    /// Total cost of the current flow.
    pub fn cost(&self) -> Weight {
        self.edges.iter().map(|edge| edge.cost * edge.flow).sum()
    }

    /// Graphviz rendering of the network. With `flow_only`, edges that
    /// carry no flow are left out. Edge labels are `cost,flow`.
    pub fn to_dot(&self, flow_only: bool) -> String {
        let nodes = self.nodes.keys().enumerate().map(|(index, kind)| {
            format!("  {index} [label=\"{kind}\", color={}];", kind.color())
        });
        let edges = self
            .edges
            .iter()
            .filter(|edge| !flow_only || edge.flow > 0)
            .map(|edge| {
                format!(
                    "  {} -> {} [label=\"{},{}\"];",
                    edge.from, edge.to, edge.cost, edge.flow
                )
            });
        format!(
            "digraph flow_{} {{\n{}\n}}\n",
            self.dim,
            nodes.chain(edges).join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(capacity: Option<Weight>, flow: Weight) -> Edge {
        Edge {
            from: 2,
            to: 5,
            cost: -3,
            flow,
            capacity,
        }
    }

    #[test]
    fn residuals() {
        let bounded = edge(Some(4), 1);
        assert_eq!(bounded.residual(2), Some(3));
        assert_eq!(bounded.residual(5), Some(1));
        assert_eq!(bounded.other(2), 5);
        assert_eq!(bounded.other(5), 2);

        let unbounded = edge(None, 0);
        assert_eq!(unbounded.residual(2), None);
        assert!(unbounded.has_residual(2));
        assert!(!unbounded.has_residual(5));
        assert!(!edge(Some(4), 4).has_residual(2));
    }

    #[test]
    fn reduced_cost_flips_sign_backwards() {
        let potential = [0, 0, 10, 0, 0, 4];
        let e = edge(None, 0);
        assert_eq!(e.reduced_cost(2, &potential), -3 + 10 - 4);
        assert_eq!(e.reduced_cost(5, &potential), -(-3 + 10 - 4));
    }
}
