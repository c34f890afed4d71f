// SPDX-License-Identifier: Apache-2.0

use crate::search::{Candidate, Objective, PlacementEnumerator, SearchOptions, SearchOutcome};
use crate::{FloorplanError, Packing, SequencePair, Weight};

/// Places `packing` according to `candidate` and returns its score.
///
/// Errors for which [`FloorplanError::is_infeasible_candidate`] holds mean
/// that this candidate admits no placement; the coordinates in `packing` are
/// then left as they were.
pub fn evaluate(
    packing: &mut Packing,
    candidate: &Candidate,
    objective: Objective,
) -> Result<Weight, FloorplanError> {
    packing.set_orientations(&candidate.orientations);
    match objective {
        Objective::BoundingBox => {
            candidate.sequence_pair.apply_to(packing)?;
            Ok(packing.bounding_box_area().unwrap_or(0))
        }
        Objective::Wirelength => packing.compute_netlength_optimal(&candidate.sequence_pair),
    }
}

/// Searches for the best placement of `packing`. Local passes start from
/// the ascending sequence pair and the current orientations.
pub fn optimize(
    packing: &Packing,
    options: &SearchOptions,
) -> Result<SearchOutcome, FloorplanError> {
    optimize_from(packing, &SequencePair::new(packing.num_rects()), options)
}

/// Searches for the best placement of `packing`, with local passes starting
/// from `start`.
///
/// Candidates whose placement overlaps a blockage count as infeasible.
///
/// In local mode, every pass that improves the score is followed by another
/// pass around the new best candidate, up to `options.max_passes` passes.
pub fn optimize_from(
    packing: &Packing,
    start: &SequencePair,
    options: &SearchOptions,
) -> Result<SearchOutcome, FloorplanError> {
    start.check_len(packing.num_rects())?;

    let mut work = packing.clone();
    work.clear_placement();

    let mut outcome = SearchOutcome {
        best: None,
        score: None,
        best_candidate: None,
        evaluated: 0,
        infeasible: 0,
        passes: 0,
    };
    let mut pass_start = Candidate {
        sequence_pair: start.clone(),
        orientations: packing.orientations(),
    };

    loop {
        outcome.passes += 1;
        let score_before = outcome.score;
        let enumerator = PlacementEnumerator::new(
            pass_start.sequence_pair.clone(),
            pass_start.orientations.clone(),
            options.mode,
            options.orientations,
        )?;
        log::debug!(
            "Search pass {} over {} candidates",
            outcome.passes,
            enumerator.candidate_count()
        );

        for candidate in enumerator {
            outcome.evaluated += 1;
            let score = match evaluate(&mut work, &candidate, options.objective) {
                Ok(score) => score,
                Err(err) if err.is_infeasible_candidate() => {
                    outcome.infeasible += 1;
                    log::trace!("Skipping candidate: {err}");
                    continue;
                }
                Err(err) => return Err(err),
            };
            let conflicts = work.blockage_conflicts();
            if !conflicts.is_empty() {
                outcome.infeasible += 1;
                log::trace!("Skipping candidate overlapping blockages: {conflicts:?}");
                continue;
            }
            log::trace!("Candidate scored {score}");

            if outcome.score.is_some_and(|best| score >= best) {
                continue;
            }
            let certificate = work.validate();
            if !certificate.is_valid() {
                log::warn!(
                    "Rejecting candidate with score {score}: {certificate}\n{}",
                    candidate.sequence_pair
                );
                continue;
            }

            log::debug!("New best score {score}");
            outcome.score = Some(score);
            outcome.best = Some(work.clone());
            outcome.best_candidate = Some(candidate);
        }

        let improved = outcome.score != score_before;
        if options.mode.is_global() || !improved || outcome.passes >= options.max_passes {
            break;
        }
        if let Some(best) = &outcome.best_candidate {
            pass_start = best.clone();
        }
    }

    log::info!(
        "Search finished after {} passes: {} candidates, {} infeasible, best score {:?}",
        outcome.passes,
        outcome.evaluated,
        outcome.infeasible,
        outcome.score
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{OrientationPolicy, SearchMode};
    use crate::{BoundingBox, Net, Orientation, Pin, Rectangle, Rotation};

    fn packing(chip: (i64, i64), sizes: &[(i64, i64)], nets: Vec<Net>) -> Packing {
        Packing::new(
            Rectangle::placed_at(
                0,
                BoundingBox {
                    min_x: 0,
                    min_y: 0,
                    max_x: chip.0,
                    max_y: chip.1,
                },
            ),
            sizes
                .iter()
                .enumerate()
                .map(|(id, &(w, h))| Rectangle::new(id, w, h))
                .collect(),
            nets,
        )
        .unwrap()
    }

    #[test]
    fn infeasible_candidates_are_counted() {
        let p = packing((10, 10), &[(6, 1), (6, 1)], vec![]);
        let options = SearchOptions {
            orientations: OrientationPolicy::Fixed,
            ..Default::default()
        };
        let outcome = optimize(&p, &options).unwrap();
        assert_eq!(outcome.evaluated, 4);
        assert_eq!(outcome.infeasible, 2);
        assert_eq!(outcome.score, Some(12));
        assert_eq!(outcome.passes, 1);
        assert!(!p.rect(0).placed());
    }

    #[test]
    fn rotation_helps_fit() {
        // rectangle 0 only fits when turned
        let p = packing((7, 4), &[(1, 6), (6, 1)], vec![]);
        let outcome = optimize(&p, &SearchOptions::default()).unwrap();
        let best = outcome.best.unwrap();
        assert_eq!(outcome.score, Some(12));
        assert_eq!(best.rect(0).rotation(), Rotation::R90);
        best.check_bounds().unwrap();
        assert!(best.validate().is_valid());
    }

    #[test]
    fn local_search_repeats_while_improving() {
        // the row is 7x3; stacking 1 and 2 next to 0 gives 4x3
        let p = packing((20, 20), &[(1, 3), (3, 1), (3, 1)], vec![]);
        let options = SearchOptions {
            mode: SearchMode::Local(2),
            orientations: OrientationPolicy::Fixed,
            ..Default::default()
        };
        let outcome = optimize(&p, &options).unwrap();
        assert_eq!(outcome.score, Some(12));
        assert_eq!(outcome.passes, 2);
        assert_eq!(outcome.evaluated, 2 * 3 * 4);
        assert!(outcome.best.unwrap().validate().is_valid());
    }

    #[test]
    fn wirelength_search_picks_pin_friendly_orientation() {
        // the pin is on the lower right corner; a 270 degree turn or a
        // mirror moves it to the origin
        let nets = vec![Net::new(1, vec![Pin::fixed(0, 0), Pin::on_rectangle(0, 4, 0)])];
        let p = packing((10, 10), &[(4, 4)], nets);

        let unmirrored = SearchOptions {
            objective: Objective::Wirelength,
            orientations: OrientationPolicy::AllRotations,
            ..Default::default()
        };
        let outcome = optimize(&p, &unmirrored).unwrap();
        assert_eq!(outcome.score, Some(0));
        let best = outcome.best.unwrap();
        assert_eq!(best.netlength(), 0);
        assert!(!best.rect(0).mirrored());

        let rotations_kept = SearchOptions {
            orientations: OrientationPolicy::Fixed,
            ..unmirrored.clone()
        };
        assert_eq!(optimize(&p, &rotations_kept).unwrap().score, Some(4));

        let mirrored = SearchOptions {
            orientations: OrientationPolicy::AllRotationsMirrored,
            ..unmirrored
        };
        let outcome = optimize(&p, &mirrored).unwrap();
        assert_eq!(outcome.score, Some(0));
        assert_eq!(
            outcome.best_candidate.unwrap().orientations,
            vec![Orientation::new(Rotation::R270, false)]
        );
    }

    #[test]
    fn start_must_match_packing() {
        let p = packing((10, 10), &[(1, 1)], vec![]);
        assert!(matches!(
            optimize_from(&p, &SequencePair::new(2), &SearchOptions::default()),
            Err(FloorplanError::LocusLengthMismatch { .. })
        ));
    }
}
