// SPDX-License-Identifier: Apache-2.0

//! Rectangle packing and wirelength-driven floorplanning over sequence
//! pairs.

mod error;
pub use error::FloorplanError;

mod geometry;
pub use geometry::{
    BoundingBox, Dimension, Net, Orientation, Pin, PinOwner, Point, Pos, Rectangle, Rotation,
    Weight,
};

mod packing;
pub use packing::Packing;

mod sequence_pair;
pub use sequence_pair::{Relation, SequencePair};

pub mod io;
pub mod min_cost_flow;
pub mod search;
pub use search::{
    Candidate, Objective, OrientationPolicy, PlacementEnumerator, SearchMode, SearchOptions,
    SearchOutcome, optimize, optimize_from,
};

pub mod validate;
pub use validate::Certificate;
