// SPDX-License-Identifier: Apache-2.0

use fixedbitset::FixedBitSet;
use itertools::{Either, Itertools};

/// Rearranges `items` into the next lexicographically greater permutation
/// and returns `true`. The last permutation wraps around to sorted order and
/// returns `false`.
pub fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    let n = items.len();
    if n < 2 {
        return false;
    }

    let mut pivot = n - 1;
    while pivot > 0 && items[pivot - 1] >= items[pivot] {
        pivot -= 1;
    }
    if pivot == 0 {
        items.reverse();
        return false;
    }

    let mut successor = n - 1;
    while items[successor] <= items[pivot - 1] {
        successor -= 1;
    }
    items.swap(pivot - 1, successor);
    items[pivot..].reverse();
    true
}

/// Treats `items[..k]` as a chosen subset of the distinct elements of
/// `items` and moves on to the next subset in lexicographic order.
///
/// Afterwards both `items[..k]` and `items[k..]` are sorted. After the last
/// subset, `items` wraps around to the `k` smallest elements and `false` is
/// returned. There is nothing to step through for `k == 0` or `k >=
/// items.len()`.
pub fn next_combination<T: Ord + Clone>(items: &mut [T], k: usize) -> bool {
    let n = items.len();
    if k == 0 || k >= n {
        return false;
    }

    let mut sorted = items.to_vec();
    sorted.sort();
    let mut chosen_values = items[..k].to_vec();
    chosen_values.sort();

    // positions of the chosen values in sorted order
    let mut chosen = Vec::with_capacity(k);
    let mut values = chosen_values.iter().peekable();
    for (index, item) in sorted.iter().enumerate() {
        if values.peek() == Some(&item) {
            chosen.push(index);
            values.next();
        }
    }
    debug_assert_eq!(chosen.len(), k, "Chosen values must be distinct elements");

    let advanced = match (0..k).rev().find(|&i| chosen[i] < n - k + i) {
        Some(i) => {
            chosen[i] += 1;
            for j in i + 1..k {
                chosen[j] = chosen[j - 1] + 1;
            }
            true
        }
        None => {
            for (i, index) in chosen.iter_mut().enumerate() {
                *index = i;
            }
            false
        }
    };

    let mut mask = FixedBitSet::with_capacity(n);
    mask.extend(chosen.iter().copied());
    let (subset, rest): (Vec<T>, Vec<T>) =
        sorted.into_iter().enumerate().partition_map(|(index, item)| {
            if mask.contains(index) {
                Either::Left(item)
            } else {
                Either::Right(item)
            }
        });
    items[..k].clone_from_slice(&subset);
    items[k..].clone_from_slice(&rest);
    advanced
}
