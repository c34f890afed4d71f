// SPDX-License-Identifier: Apache-2.0

use rstar::{AABB, RTree, RTreeObject};

use crate::BoundingBox;

struct BBoxWrapper {
    index: usize,
    envelope: AABB<[i64; 2]>,
}

impl RTreeObject for BBoxWrapper {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn to_aabb(bbox: &BoundingBox) -> AABB<[i64; 2]> {
    AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y])
}

fn bulk_load(boxes: &[(usize, BoundingBox)]) -> RTree<BBoxWrapper> {
    RTree::bulk_load(
        boxes
            .iter()
            .enumerate()
            .map(|(index, (_, bbox))| BBoxWrapper {
                index,
                envelope: to_aabb(bbox),
            })
            .collect::<Vec<_>>(),
    )
}

/// Returns every pair of ids `(a, b)` with `a < b` whose boxes have
/// overlapping interiors, sorted.
pub fn find_overlaps(boxes: &[(usize, BoundingBox)]) -> Vec<(usize, usize)> {
    if boxes.len() < 2 {
        return Vec::new();
    }

    let rtree = bulk_load(boxes);
    let mut pairs = Vec::new();

    for (i, (id, bbox)) in boxes.iter().enumerate() {
        for candidate in rtree.locate_in_envelope_intersecting(&to_aabb(bbox)) {
            let j = candidate.index;
            // each pair once; the rtree also reports abutted boxes, so the
            // interior test is still needed
            if j <= i || !bbox.intersects(&boxes[j].1) {
                continue;
            }
            let (a, b) = (*id, boxes[j].0);
            pairs.push((a.min(b), a.max(b)));
        }
    }

    pairs.sort_unstable();
    pairs
}

/// Returns every `(movable id, fixed id)` pair whose interiors overlap,
/// sorted.
pub fn find_conflicts(
    movable: &[(usize, BoundingBox)],
    fixed: &[(usize, BoundingBox)],
) -> Vec<(usize, usize)> {
    if movable.is_empty() || fixed.is_empty() {
        return Vec::new();
    }

    let rtree = bulk_load(fixed);
    let mut pairs = Vec::new();

    for (id, bbox) in movable {
        for candidate in rtree.locate_in_envelope_intersecting(&to_aabb(bbox)) {
            let (fixed_id, fixed_bbox) = &fixed[candidate.index];
            if bbox.intersects(fixed_bbox) {
                pairs.push((*id, *fixed_id));
            }
        }
    }

    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[test]
    fn test_basic_no_overlap() {
        let boxes = [(0, bbox(0, 0, 10, 10)), (1, bbox(20, 20, 30, 30))];
        assert!(find_overlaps(&boxes).is_empty());
    }

    #[test]
    fn test_basic_shared_corner() {
        let boxes = [(0, bbox(0, 0, 10, 10)), (1, bbox(10, 10, 20, 20))];
        assert!(find_overlaps(&boxes).is_empty());
    }

    #[test]
    fn test_basic_shared_edge() {
        let boxes = [(0, bbox(0, 0, 10, 10)), (1, bbox(10, 0, 20, 10))];
        assert!(find_overlaps(&boxes).is_empty());
    }

    #[test]
    fn test_basic_partial_overlap() {
        let boxes = [(4, bbox(0, 0, 10, 10)), (2, bbox(5, 5, 15, 15))];
        assert_eq!(find_overlaps(&boxes), vec![(2, 4)]);
    }

    #[test]
    fn test_basic_full_overlap() {
        let boxes = [
            (0, bbox(1, 1, 9, 9)),
            (1, bbox(0, 0, 10, 10)),
            (2, bbox(2, 2, 3, 3)),
        ];
        assert_eq!(find_overlaps(&boxes), vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_conflicts_with_fixed_boxes() {
        let movable = [(0, bbox(0, 0, 10, 10)), (1, bbox(10, 0, 20, 10))];
        let fixed = [(0, bbox(5, 5, 6, 6)), (1, bbox(20, 0, 30, 10))];
        assert_eq!(find_conflicts(&movable, &fixed), vec![(0, 0)]);
    }

    #[test]
    fn test_performance_many_instances() {
        use std::time::Instant;

        let mut boxes = Vec::new();
        for i in 0..300 {
            for j in 0..300 {
                boxes.push((boxes.len(), bbox(i, j, i + 1, j + 1)));
            }
        }

        let start = Instant::now();
        assert!(find_overlaps(&boxes).is_empty());
        let elapsed = start.elapsed();

        assert!(
            elapsed.as_secs() < 5,
            "Performance test took too long: {elapsed:?}"
        );
    }
}
