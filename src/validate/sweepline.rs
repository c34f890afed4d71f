// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Unbounded};

use crate::validate::Certificate;
use crate::{BoundingBox, Dimension, Pos, Rectangle};

/// Sweeps over placed rectangles from left to right and reports the first
/// pair whose interiors overlap. Runs in O(n log n).
///
/// The sweep line holds rectangles ordered by lower edge. Entries whose right
/// edge lies at or before the current left edge are expired lazily, only when
/// they become a neighbor of a newly inserted rectangle.
pub fn find_collision(rects: &[Rectangle]) -> Certificate {
    // Rectangles without area have no interior and cannot collide.
    let mut boxes = rects
        .iter()
        .filter(|r| r.width() > 0 && r.height() > 0)
        .map(|r| (r.id(), r.bbox()))
        .collect::<Vec<_>>();
    boxes.sort_by_key(|(id, bbox)| (bbox.min_x, *id));

    let mut line: BTreeSet<(Pos, usize)> = BTreeSet::new();

    for (slot, (id, bbox)) in boxes.iter().enumerate() {
        let key = (bbox.min_y, slot);
        line.insert(key);

        // nearest active rectangle below
        loop {
            let Some(below) = line.range(..key).next_back().copied() else {
                break;
            };
            match check_neighbor(&boxes, below.1, bbox) {
                Neighbor::Expired => {
                    line.remove(&below);
                }
                Neighbor::Overlaps => return Certificate::collision(*id, boxes[below.1].0),
                Neighbor::Disjoint => break,
            }
        }

        // nearest active rectangle above
        loop {
            let Some(above) = line.range((Excluded(key), Unbounded)).next().copied() else {
                break;
            };
            match check_neighbor(&boxes, above.1, bbox) {
                Neighbor::Expired => {
                    line.remove(&above);
                }
                Neighbor::Overlaps => return Certificate::collision(*id, boxes[above.1].0),
                Neighbor::Disjoint => break,
            }
        }
    }

    Certificate::Valid
}

enum Neighbor {
    Expired,
    Overlaps,
    Disjoint,
}

fn check_neighbor(boxes: &[(usize, BoundingBox)], slot: usize, current: &BoundingBox) -> Neighbor {
    let other = &boxes[slot].1;
    if other.max(Dimension::X) <= current.min(Dimension::X) {
        Neighbor::Expired
    } else if other.intersects(current) {
        Neighbor::Overlaps
    } else {
        Neighbor::Disjoint
    }
}
