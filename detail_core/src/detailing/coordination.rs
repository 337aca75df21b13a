//! # Splice Coordination Resolver
//!
//! Post-processes the full top + bottom splice set so splices of both layers
//! do not cluster at one cross-section. Top splices are fixed; conflicting
//! bottom splices are relocated by a bounded search (10 rounds × 6 offset
//! magnitudes × 2 directions). When no conflict-free position exists the
//! original position is kept and a warning recorded.

use crate::detailing::bar::{Segment, Splice};
use crate::diagnostics::{Diagnostics, WarningCode};
use crate::geometry::ProhibitedZone;

/// Conflict radius factor: centers closer than 1.5× the larger splice
/// length collide
const CONFLICT_FACTOR: f64 = 1.5;

/// Acceptance radius factor for relocated splices
const ACCEPT_FACTOR: f64 = 1.2;

/// Relocation search rounds
const MAX_ATTEMPT_ROUNDS: usize = 10;

/// Offset magnitudes tried each round, scaled by the round number (m)
const OFFSET_MAGNITUDES: [f64; 6] = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0];

/// Note appended to segments whose splices were moved
const COORDINATION_NOTE: &str = "Splices coordinated";

#[derive(Debug, Clone, Copy)]
struct PlacedSplice {
    center_m: f64,
    length_m: f64,
}

/// Key identifying one physical joint across the two segment copies that
/// carry it: owning family plus the interval at micrometer resolution.
/// The family keeps identical joints of distinct parallel bars apart.
fn splice_key(segment: &Segment, splice: &Splice) -> (String, i64, i64) {
    (
        segment.family_id().to_string(),
        (splice.start_m * 1e6).round() as i64,
        (splice.end_m * 1e6).round() as i64,
    )
}

/// Coordinate bottom splices against the already-placed top splices.
///
/// Relocations update the splice record in every bottom segment that
/// carries it (each joint exists as two copies), set the `adjusted` flag
/// with the original center, and append a note to the affected segments.
pub fn coordinate_splices(
    top_segments: &[Segment],
    bottom_segments: &mut [Segment],
    zones: &[ProhibitedZone],
    beam_length_m: f64,
    diag: &mut Diagnostics,
) {
    if bottom_segments.is_empty() || beam_length_m <= 0.0 {
        return;
    }

    let mut placed: Vec<PlacedSplice> = Vec::new();
    for segment in top_segments {
        for splice in &segment.splices {
            placed.push(PlacedSplice {
                center_m: splice.center_m(),
                length_m: splice.length_m().max(0.0),
            });
        }
    }

    // One relocation decision per physical joint, in encounter order
    let mut seen_keys: Vec<(String, i64, i64)> = Vec::new();
    let mut relocations: Vec<((String, i64, i64), Splice)> = Vec::new();

    for segment in bottom_segments.iter() {
        for splice in &segment.splices {
            let key = splice_key(segment, splice);
            if seen_keys.contains(&key) {
                continue;
            }
            seen_keys.push(key.clone());

            let length = splice.length_m();
            if length <= 0.0 {
                continue;
            }
            let original_center = splice.center_m();

            let has_conflict = placed.iter().any(|existing| {
                let min_distance = length.max(existing.length_m) * CONFLICT_FACTOR;
                (original_center - existing.center_m).abs() < min_distance
            });

            if !has_conflict {
                placed.push(PlacedSplice {
                    center_m: original_center,
                    length_m: length,
                });
                continue;
            }

            match find_non_conflicting_center(original_center, length, &placed, zones, beam_length_m)
            {
                Some(new_center) => {
                    let new_start = (new_center - length / 2.0).max(0.0);
                    let new_end = (new_center + length / 2.0).min(beam_length_m);

                    let mut moved = splice.clone();
                    moved.start_m = new_start;
                    moved.end_m = new_end;
                    moved.adjusted = true;
                    moved.original_center_m = Some(original_center);

                    placed.push(PlacedSplice {
                        center_m: moved.center_m(),
                        length_m: moved.length_m(),
                    });
                    relocations.push((key, moved));
                }
                None => {
                    placed.push(PlacedSplice {
                        center_m: original_center,
                        length_m: length,
                    });
                    diag.warn(
                        WarningCode::CoordinationUnresolved,
                        segment.family_id().to_string(),
                        format!(
                            "could not move splice centered at {:.2} m away from a top splice",
                            original_center
                        ),
                    );
                }
            }
        }
    }

    if relocations.is_empty() {
        return;
    }

    // Apply each relocation to both segment copies of the joint
    for segment in bottom_segments.iter_mut() {
        let mut touched = false;
        for index in 0..segment.splices.len() {
            let key = splice_key(segment, &segment.splices[index]);
            if let Some((_, moved)) = relocations.iter().find(|(k, _)| *k == key) {
                segment.splices[index] = moved.clone();
                touched = true;
            }
        }
        if touched {
            segment.append_note(COORDINATION_NOTE);
        }
    }
}

/// True when `center` lies within `clearance` of any zone interval.
fn center_in_prohibited_zone(center: f64, zones: &[ProhibitedZone], clearance: f64) -> bool {
    zones
        .iter()
        .any(|zone| center > zone.start_m - clearance && center < zone.end_m + clearance)
}

/// Bounded search for a conflict-free splice center.
///
/// Rounds `0..10`, each trying the six offset magnitudes in both directions
/// scaled by `round + 1`. A candidate is accepted when its window fits the
/// beam, clears all zones by one splice length, and keeps 1.2× the larger
/// splice length from every already-placed center.
fn find_non_conflicting_center(
    original_center: f64,
    splice_length: f64,
    placed: &[PlacedSplice],
    zones: &[ProhibitedZone],
    beam_length_m: f64,
) -> Option<f64> {
    if splice_length <= 0.0 {
        return None;
    }

    for attempt in 0..MAX_ATTEMPT_ROUNDS {
        let scale = (attempt + 1) as f64;
        for magnitude in OFFSET_MAGNITUDES {
            for direction in [1.0, -1.0] {
                let test_center = original_center + direction * magnitude * scale;
                if test_center < splice_length / 2.0
                    || test_center > beam_length_m - splice_length / 2.0
                {
                    continue;
                }
                if center_in_prohibited_zone(test_center, zones, splice_length) {
                    continue;
                }
                let conflict = placed.iter().any(|existing| {
                    let min_distance = splice_length.max(existing.length_m) * ACCEPT_FACTOR;
                    (test_center - existing.center_m).abs() < min_distance
                });
                if !conflict {
                    return Some(test_center);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detailing::bar::{Bar, BarPosition, Continuity};
    use crate::nsr10::BarMark;

    fn bar(id: &str, position: BarPosition, start_m: f64, end_m: f64) -> Bar {
        Bar {
            id: id.to_string(),
            mark: BarMark::No5,
            position,
            continuity: Continuity::Continuous,
            start_m,
            end_m,
            hook: None,
            quantity: 1,
            development_length_m: 0.6,
            notes: None,
        }
    }

    /// Two segments sharing one joint at the given interval.
    fn spliced_pair(id: &str, position: BarPosition, joint: (f64, f64), end_m: f64) -> Vec<Segment> {
        let parent = bar(id, position, 0.0, end_m);
        let splice = Splice::new(joint.0, joint.1, position);

        let mut first = Segment::from_unsplit_bar(&parent);
        first.id = format!("{id}-S01");
        first.end_m = joint.1;
        first.splices.push(splice.clone());

        let mut second = Segment::from_unsplit_bar(&parent);
        second.id = format!("{id}-S02");
        second.start_m = joint.0;
        second.splices.push(splice);

        vec![first, second]
    }

    #[test]
    fn test_conflicting_bottom_splice_is_relocated() {
        // Top splice centered at 5.0, bottom at 5.1, both 0.75 m long
        let top = spliced_pair("T1", BarPosition::Top, (4.625, 5.375), 12.0);
        let mut bottom = spliced_pair("B1", BarPosition::Bottom, (4.725, 5.475), 12.0);
        let mut diag = Diagnostics::new();

        coordinate_splices(&top, &mut bottom, &[], 12.0, &mut diag);

        let moved = &bottom[0].splices[0];
        assert!(moved.adjusted);
        assert!((moved.original_center_m.unwrap() - 5.1).abs() < 1e-6);
        // At least 1.2 × 0.75 = 0.9 m from the top splice center
        assert!((moved.center_m() - 5.0).abs() >= 0.9 - 1e-6);
        assert!((moved.length_m() - 0.75).abs() < 1e-6);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_both_segment_copies_stay_in_sync() {
        let top = spliced_pair("T1", BarPosition::Top, (4.625, 5.375), 12.0);
        let mut bottom = spliced_pair("B1", BarPosition::Bottom, (4.725, 5.475), 12.0);
        let mut diag = Diagnostics::new();

        coordinate_splices(&top, &mut bottom, &[], 12.0, &mut diag);

        assert_eq!(bottom[0].splices[0], bottom[1].splices[0]);
        assert!(bottom[0].notes.as_deref().unwrap().contains("Splices coordinated"));
        assert!(bottom[1].notes.as_deref().unwrap().contains("Splices coordinated"));
    }

    #[test]
    fn test_relocation_avoids_prohibited_zones() {
        let top = spliced_pair("T1", BarPosition::Top, (4.625, 5.375), 12.0);
        let mut bottom = spliced_pair("B1", BarPosition::Bottom, (4.725, 5.475), 12.0);
        // Block the region right of the conflict so the search must go left
        let zones = vec![ProhibitedZone::new(5.5, 12.0, "blocked right half")];
        let mut diag = Diagnostics::new();

        coordinate_splices(&top, &mut bottom, &zones, 12.0, &mut diag);

        let moved = &bottom[0].splices[0];
        assert!(moved.adjusted);
        assert!((moved.center_m() - 5.0).abs() >= 0.9 - 1e-6);
        assert!(!center_in_prohibited_zone(moved.center_m(), &zones, moved.length_m()));
    }

    #[test]
    fn test_distant_splices_left_untouched() {
        let top = spliced_pair("T1", BarPosition::Top, (1.0, 1.75), 12.0);
        let mut bottom = spliced_pair("B1", BarPosition::Bottom, (8.0, 8.75), 12.0);
        let expected = bottom.clone();
        let mut diag = Diagnostics::new();

        coordinate_splices(&top, &mut bottom, &[], 12.0, &mut diag);

        assert_eq!(bottom, expected);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_unresolvable_conflict_keeps_original_with_warning() {
        // Beam barely longer than the splice: no candidate center fits the
        // bounds, so the original position must be kept
        let top = spliced_pair("T1", BarPosition::Top, (0.4, 1.15), 1.5);
        let mut bottom = spliced_pair("B1", BarPosition::Bottom, (0.5, 1.25), 1.5);
        let mut diag = Diagnostics::new();

        coordinate_splices(&top, &mut bottom, &[], 1.5, &mut diag);

        let kept = &bottom[0].splices[0];
        assert!(!kept.adjusted);
        assert!((kept.start_m - 0.5).abs() < 1e-6);
        assert!(diag.has(WarningCode::CoordinationUnresolved));
    }

    #[test]
    fn test_center_clearance_semantics() {
        let zones = vec![ProhibitedZone::new(4.0, 5.0, "zone")];
        // Inside the zone
        assert!(center_in_prohibited_zone(4.5, &zones, 0.75));
        // Within one clearance of the edge
        assert!(center_in_prohibited_zone(5.5, &zones, 0.75));
        // Clear of the zone plus clearance
        assert!(!center_in_prohibited_zone(5.80, &zones, 0.75));
    }
}
