// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use crate::sequence_pair::ranks;
use crate::{Dimension, FloorplanError, Packing, Pos, SequencePair};

impl SequencePair {
    /// Places every rectangle of `packing` as tightly as this sequence pair
    /// allows, starting at the lower left corner of the chip base.
    ///
    /// Rectangle orientations are taken as they are. Nothing is written if
    /// some rectangle would end up outside the chip base.
    pub fn apply_to(&self, packing: &mut Packing) -> Result<(), FloorplanError> {
        self.check_len(packing.num_rects())?;

        let negative_rank = ranks(&self.negative);
        let x = longest_paths(self.positive.iter().copied(), &negative_rank, |rect| {
            packing.rect(rect).dimension(Dimension::X)
        });
        let y = longest_paths(self.positive.iter().rev().copied(), &negative_rank, |rect| {
            packing.rect(rect).dimension(Dimension::Y)
        });

        let chip = packing.chip_base().bbox();
        for (rect, (&x, &y)) in x.iter().zip(&y).enumerate() {
            for (dim, offset) in [(Dimension::X, x), (Dimension::Y, y)] {
                if chip.min(dim) + offset + packing.rect(rect).dimension(dim) > chip.max(dim) {
                    return Err(FloorplanError::OutOfBounds { rect, dim });
                }
            }
        }

        for (rect, (x, y)) in x.into_iter().zip(y).enumerate() {
            packing
                .rect_mut(rect)
                .place_at(chip.min_x + x, chip.min_y + y);
        }

        Ok(())
    }
}

/// Visits rectangles in `order` and assigns each the largest end coordinate
/// among already visited rectangles of smaller negative rank.
///
/// The staircase maps negative rank to the largest end coordinate reached by
/// visited rectangles up to that rank; both keys and values increase, so a
/// lookup is a predecessor query.
fn longest_paths(
    order: impl Iterator<Item = usize>,
    negative_rank: &[usize],
    extent: impl Fn(usize) -> Pos,
) -> Vec<Pos> {
    let mut coords = vec![0; negative_rank.len()];
    let mut staircase: BTreeMap<usize, Pos> = BTreeMap::new();

    for rect in order {
        let rank = negative_rank[rect];
        let start = staircase
            .range(..rank)
            .next_back()
            .map_or(0, |(_, &end)| end);
        let end = start + extent(rect);
        coords[rect] = start;

        let dominated = staircase
            .range(rank + 1..)
            .take_while(|&(_, &later)| later <= end)
            .map(|(&key, _)| key)
            .collect::<Vec<_>>();
        for key in dominated {
            staircase.remove(&key);
        }
        staircase.insert(rank, end);
    }

    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, Orientation, Rectangle, Rotation};

    fn packing(sizes: &[(Pos, Pos)], chip: BoundingBox) -> Packing {
        Packing::new(
            Rectangle::placed_at(0, chip),
            sizes
                .iter()
                .enumerate()
                .map(|(id, &(w, h))| Rectangle::new(id, w, h))
                .collect(),
            vec![],
        )
        .unwrap()
    }

    fn chip(min_x: Pos, min_y: Pos, max_x: Pos, max_y: Pos) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[test]
    fn row_and_column() {
        let mut p = packing(&[(2, 2), (3, 3), (1, 4)], chip(0, 0, 100, 100));
        SequencePair::new(3).apply_to(&mut p).unwrap();
        let xs = p.rects().iter().map(|r| r.base()).collect::<Vec<_>>();
        assert_eq!(xs, vec![(0, 0).into(), (2, 0).into(), (5, 0).into()]);

        // reversed positive locus stacks rectangles bottom to top
        let sp = SequencePair::from_loci(vec![2, 1, 0], vec![0, 1, 2]).unwrap();
        sp.apply_to(&mut p).unwrap();
        let ys = p.rects().iter().map(|r| r.base()).collect::<Vec<_>>();
        assert_eq!(ys, vec![(0, 0).into(), (0, 2).into(), (0, 5).into()]);
    }

    #[test]
    fn placement_is_tight() {
        // 0 is a tall rectangle left of 1 and 2; 2 is above 1; 3 is right of
        // everything
        let mut p = packing(&[(2, 6), (4, 2), (3, 3), (1, 1)], chip(0, 0, 100, 100));
        let sp = SequencePair::from_loci(vec![0, 2, 1, 3], vec![0, 1, 2, 3]).unwrap();
        sp.apply_to(&mut p).unwrap();
        let bases = p.rects().iter().map(|r| r.base()).collect::<Vec<_>>();
        assert_eq!(
            bases,
            vec![(0, 0).into(), (2, 0).into(), (2, 2).into(), (6, 0).into()]
        );
        assert!(p.validate().is_valid());
        assert_eq!(p.bounding_box_area(), Some(7 * 6));
    }

    #[test]
    fn chip_origin_is_added() {
        let mut p = packing(&[(2, 2), (3, 3)], chip(5, 7, 20, 20));
        SequencePair::new(2).apply_to(&mut p).unwrap();
        assert_eq!(p.rect(0).base(), (5, 7).into());
        assert_eq!(p.rect(1).base(), (7, 7).into());
    }

    #[test]
    fn rotation_is_observed() {
        let mut p = packing(&[(4, 1), (1, 1)], chip(0, 0, 10, 10));
        p.rect_mut(0)
            .set_orientation(Orientation::new(Rotation::R90, false));
        SequencePair::new(2).apply_to(&mut p).unwrap();
        assert_eq!(p.rect(1).base(), (1, 0).into());
    }

    #[test]
    fn out_of_bounds_writes_nothing() {
        let mut p = packing(&[(6, 2), (5, 2)], chip(0, 0, 10, 10));
        let err = SequencePair::new(2).apply_to(&mut p).unwrap_err();
        assert!(matches!(
            err,
            FloorplanError::OutOfBounds {
                rect: 1,
                dim: Dimension::X
            }
        ));
        assert!(!p.rect(0).placed());

        // stacked, they fit
        let sp = SequencePair::from_loci(vec![1, 0], vec![0, 1]).unwrap();
        sp.apply_to(&mut p).unwrap();
        assert!(p.all_placed());
    }

    #[test]
    fn locus_length_must_match() {
        let mut p = packing(&[(1, 1)], chip(0, 0, 10, 10));
        assert!(matches!(
            SequencePair::new(2).apply_to(&mut p),
            Err(FloorplanError::LocusLengthMismatch { rectangles: 1, .. })
        ));
    }
}
