//! # Bar Segmentation Engine
//!
//! Splits a continuous reinforcing bar into commercial-length pieces joined
//! by lap splices, keeping every splice clear of prohibited zones whenever
//! the geometry allows it.
//!
//! Two strategies are used, selected by the bar's position:
//!
//! - **Top bars** iterate from the bar start at full usable length, pulling
//!   the first splice away from midspan when the run is long, and optionally
//!   steering splices into the corridor just before a "before support" zone.
//! - **Bottom bars** target a tunable first-segment length (via
//!   `splice_offset_ratio`) and fall back to a stepped scan for the first
//!   splice when the target lands in a zone.
//!
//! All searches are bounded: 20 backward-shift attempts per joint and 100
//! loop iterations per bar guarantee termination; when a bound is hit the
//! engine keeps the degraded result and records a warning.

use crate::detailing::bar::{Bar, BarPosition, Segment, Splice};
use crate::diagnostics::{Diagnostics, WarningCode};
use crate::geometry::{overlaps_any_zone, ProhibitedZone};

/// Coordinate comparison tolerance (m)
const TOLERANCE: f64 = 1e-3;

/// Loop-termination epsilon (m)
const EPS: f64 = 1e-6;

/// Minimum edge cover assumed when the caller supplies less (m)
pub const MIN_EDGE_COVER_M: f64 = 0.04;

/// Hard cap on segmentation loop iterations per bar
const MAX_PIECE_ITERATIONS: usize = 100;

/// Cap on backward-shift attempts when a joint lands in a zone
const MAX_SHIFT_ATTEMPTS: usize = 20;

/// Scan step for the bottom-bar safe-position search (m)
const SAFE_SCAN_STEP_M: f64 = 0.1;

/// Parameters for splitting one bar.
///
/// `zones` must be sorted by start coordinate (the engine entry point sorts
/// its working copy once per invocation).
#[derive(Debug, Clone)]
pub struct SegmentationParams<'a> {
    /// Commercial maximum bar length (m)
    pub max_length_m: f64,

    /// Required lap splice length (m), precomputed per NSR-10
    pub splice_length_m: f64,

    /// Hook extension at this bar's hooked ends (m); 0 when unhooked
    pub hook_length_m: f64,

    /// Concrete cover at the beam ends (m)
    pub edge_cover_m: f64,

    /// Total beam length (m)
    pub beam_length_m: f64,

    /// Steer top-bar splices into "before support" corridors
    pub prefer_previous_zone: bool,

    /// First-segment tuning for bottom bars, clamped to [0, 0.6]
    pub splice_offset_ratio: f64,

    /// Prohibited zones, sorted by start
    pub zones: &'a [ProhibitedZone],
}

/// Split a bar into segments joined by lap splices.
///
/// Returns the bar as a single unsplit segment when splitting is not needed
/// (`length <= max_length`), not possible (`max_length <= 0`), or not
/// meaningful (`splice_length` zero/negative or >= `max_length`; this last
/// case records a warning).
pub fn split_bar(bar: &Bar, params: &SegmentationParams<'_>, diag: &mut Diagnostics) -> Vec<Segment> {
    if params.max_length_m <= 0.0 || bar.length_m() <= params.max_length_m {
        return vec![Segment::from_unsplit_bar(bar)];
    }

    if params.splice_length_m <= 0.0 || params.splice_length_m >= params.max_length_m {
        diag.warn(
            WarningCode::SpliceExceedsMaxLength,
            bar.id.as_str(),
            format!(
                "cannot segment: splice {:.2} m >= commercial length {:.2} m",
                params.splice_length_m, params.max_length_m
            ),
        );
        return vec![Segment::from_unsplit_bar(bar)];
    }

    match bar.position {
        BarPosition::Bottom => split_bottom_bar(bar, params, diag),
        BarPosition::Top => split_top_bar(bar, params, diag),
    }
}

/// Hook presence at the physical beam ends, judged against the cover zone.
fn end_hooks(bar: &Bar, params: &SegmentationParams<'_>) -> (bool, bool) {
    let cover = MIN_EDGE_COVER_M.max(params.edge_cover_m.max(0.0));
    let has_start_hook = params.hook_length_m > 0.0 && bar.start_m <= cover + TOLERANCE;
    let has_end_hook =
        params.hook_length_m > 0.0 && bar.end_m >= params.beam_length_m - cover - TOLERANCE;
    (has_start_hook, has_end_hook)
}

/// Usable piece length after hook deductions, degrading to the full
/// commercial length (with a warning) when hooks consume everything.
fn usable_piece_length(
    bar: &Bar,
    params: &SegmentationParams<'_>,
    piece_index: usize,
    remaining_length: f64,
    has_start_hook: bool,
    has_end_hook: bool,
    diag: &mut Diagnostics,
) -> f64 {
    let mut hook_deduction = 0.0;
    if has_start_hook && piece_index == 1 {
        hook_deduction += params.hook_length_m;
    }
    if has_end_hook && remaining_length <= params.max_length_m + TOLERANCE {
        hook_deduction += params.hook_length_m;
    }

    let usable_max = params.max_length_m - hook_deduction;
    if usable_max <= 0.0 {
        diag.warn(
            WarningCode::HooksConsumeMaxLength,
            bar.id.as_str(),
            "hook deductions consume the commercial length; using the full length",
        );
        return params.max_length_m;
    }
    usable_max
}

fn make_segment(bar: &Bar, piece_index: usize, start_m: f64, end_m: f64) -> Segment {
    Segment {
        id: format!("{}-S{:02}", bar.id, piece_index),
        mark: bar.mark,
        position: bar.position,
        start_m,
        end_m,
        hook: bar.hook,
        splices: Vec::new(),
        quantity: bar.quantity,
        development_length_m: bar.development_length_m,
        notes: Some(format!(
            "Segment {} - {}",
            piece_index,
            bar.position.display_name()
        )),
    }
}

/// Attach each joint to the segments on both of its sides.
fn attach_joints(segments: &mut [Segment], joints: &[Splice]) {
    for (idx, segment) in segments.iter_mut().enumerate() {
        if idx > 0 {
            segment.splices.push(joints[idx - 1].clone());
        }
        if idx < joints.len() {
            segment.splices.push(joints[idx].clone());
        }
    }
}

fn split_top_bar(
    bar: &Bar,
    params: &SegmentationParams<'_>,
    diag: &mut Diagnostics,
) -> Vec<Segment> {
    let (has_start_hook, has_end_hook) = end_hooks(bar, params);

    let mut segments: Vec<Segment> = Vec::new();
    let mut joints: Vec<Splice> = Vec::new();
    let mut current_start = bar.start_m;
    let mut piece_index = 1;
    let mut safety_counter = 0;

    while current_start < bar.end_m - EPS && safety_counter < MAX_PIECE_ITERATIONS {
        safety_counter += 1;
        let remaining_length = (bar.end_m - current_start).max(0.0);
        if remaining_length <= 0.0 {
            break;
        }

        let usable_max = usable_piece_length(
            bar,
            params,
            piece_index,
            remaining_length,
            has_start_hook,
            has_end_hook,
            diag,
        );

        let mut segment_length = usable_max.min(remaining_length);
        // Long runs: shorten the first piece to pull the splice off midspan
        if piece_index == 1 && remaining_length > params.max_length_m * 1.8 {
            segment_length = (usable_max * 0.6).min(remaining_length);
        }

        let mut candidate_end = current_start + segment_length;
        let mut is_last_segment = candidate_end >= bar.end_m - TOLERANCE;

        if params.prefer_previous_zone && !is_last_segment && params.splice_length_m > 0.0 {
            let joint_start_candidate = bar.start_m.max(candidate_end - params.splice_length_m);
            let remaining_after_joint = bar.end_m - joint_start_candidate;
            if remaining_after_joint <= params.max_length_m + TOLERANCE {
                let preferred_end = prefer_splice_in_previous_corridor(
                    current_start,
                    joint_start_candidate,
                    candidate_end,
                    params.splice_length_m,
                    params.zones,
                );
                if preferred_end < candidate_end - TOLERANCE {
                    candidate_end = preferred_end;
                    is_last_segment = candidate_end >= bar.end_m - TOLERANCE;
                }
            }
        }

        let segment_end = if is_last_segment {
            bar.end_m
        } else {
            adjust_segment_end_for_splice_zones(
                current_start,
                candidate_end,
                params.splice_length_m,
                params.zones,
            )
        };

        let length = segment_end - current_start;
        if length <= 0.0 {
            break;
        }

        segments.push(make_segment(bar, piece_index, current_start, segment_end));

        if segment_end >= bar.end_m - EPS {
            break;
        }

        let joint_start = bar.start_m.max(segment_end - params.splice_length_m);
        let joint_end = segment_end;

        if overlaps_any_zone(joint_start, joint_end, params.zones) {
            diag.warn(
                WarningCode::SpliceInProhibitedZone,
                bar.id.as_str(),
                format!(
                    "splice [{:.2}, {:.2}] could not be moved out of prohibited zones",
                    joint_start, joint_end
                ),
            );
        }

        joints.push(Splice::new(joint_start, joint_end, bar.position));
        current_start = joint_start;
        piece_index += 1;
    }

    if safety_counter >= MAX_PIECE_ITERATIONS {
        diag.warn(
            WarningCode::SegmentationCapReached,
            bar.id.as_str(),
            "segmentation iteration cap reached; partial result kept",
        );
    }

    if segments.is_empty() {
        return vec![Segment::from_unsplit_bar(bar)];
    }

    attach_joints(&mut segments, &joints);
    segments
}

fn split_bottom_bar(
    bar: &Bar,
    params: &SegmentationParams<'_>,
    diag: &mut Diagnostics,
) -> Vec<Segment> {
    let (has_start_hook, has_end_hook) = end_hooks(bar, params);

    let total_length = (bar.end_m - bar.start_m).max(0.0);
    let offset_ratio = params.splice_offset_ratio.clamp(0.0, 0.6);
    let mut first_segment_target = if offset_ratio > TOLERANCE {
        (total_length * (0.4 + offset_ratio * 0.5)).min(params.max_length_m)
    } else {
        (total_length * 0.45).min(params.max_length_m * 0.8)
    };
    first_segment_target = first_segment_target.max(params.splice_length_m * 1.5);
    first_segment_target = first_segment_target.min(total_length);

    let mut segments: Vec<Segment> = Vec::new();
    let mut joints: Vec<Splice> = Vec::new();
    let mut current_start = bar.start_m;
    let mut piece_index = 1;
    let mut safety_counter = 0;

    while current_start < bar.end_m - EPS && safety_counter < MAX_PIECE_ITERATIONS {
        safety_counter += 1;
        let remaining_length = (bar.end_m - current_start).max(0.0);
        if remaining_length <= 0.0 {
            break;
        }

        let usable_max = usable_piece_length(
            bar,
            params,
            piece_index,
            remaining_length,
            has_start_hook,
            has_end_hook,
            diag,
        );

        let mut segment_length = usable_max.min(remaining_length);
        if piece_index == 1 {
            segment_length = segment_length.min(first_segment_target);
        }

        let mut candidate_end = (current_start + segment_length).min(bar.end_m);
        let mut is_last_segment = candidate_end >= bar.end_m - TOLERANCE;
        let mut needs_zone_adjustment = true;

        // First piece: try to land the splice in the corridor ahead of a
        // "before support" zone
        if piece_index == 1 && !is_last_segment {
            if let Some(corridor_end) = target_bottom_corridor_end(
                current_start,
                candidate_end,
                params.splice_length_m,
                params.zones,
            ) {
                candidate_end = corridor_end.min(bar.end_m);
                is_last_segment = candidate_end >= bar.end_m - TOLERANCE;
                needs_zone_adjustment = false;
            }
        }

        // First piece, no corridor: stepped scan when the naive splice
        // window lands in a zone
        if piece_index == 1 && !is_last_segment && needs_zone_adjustment {
            let joint_start_candidate = bar.start_m.max(candidate_end - params.splice_length_m);
            if overlaps_any_zone(joint_start_candidate, candidate_end, params.zones) {
                match find_safe_splice_position(
                    current_start + params.splice_length_m,
                    candidate_end,
                    params.splice_length_m,
                    params.zones,
                ) {
                    Some(safe_position) => {
                        candidate_end = safe_position.min(bar.end_m);
                        needs_zone_adjustment = false;
                    }
                    None => {
                        diag.warn(
                            WarningCode::NoSafeCorridorFound,
                            bar.id.as_str(),
                            "no clear corridor found for the first splice; keeping the naive position",
                        );
                    }
                }
            } else {
                needs_zone_adjustment = false;
            }
        }

        if !is_last_segment && needs_zone_adjustment {
            candidate_end = adjust_segment_end_for_splice_zones(
                current_start,
                candidate_end,
                params.splice_length_m,
                params.zones,
            );
            if candidate_end >= bar.end_m - TOLERANCE {
                is_last_segment = true;
            }
        }

        let segment_end = if is_last_segment { bar.end_m } else { candidate_end };
        let length = segment_end - current_start;
        if length <= 0.0 {
            break;
        }

        segments.push(make_segment(bar, piece_index, current_start, segment_end));

        if segment_end >= bar.end_m - EPS {
            break;
        }

        let joint_start = bar.start_m.max(segment_end - params.splice_length_m);
        let joint_end = segment_end;

        if overlaps_any_zone(joint_start, joint_end, params.zones) {
            diag.warn(
                WarningCode::SpliceInProhibitedZone,
                bar.id.as_str(),
                format!(
                    "splice [{:.2}, {:.2}] still falls in a prohibited zone",
                    joint_start, joint_end
                ),
            );
        }

        joints.push(Splice::new(joint_start, joint_end, bar.position));
        current_start = joint_start;
        piece_index += 1;
    }

    if safety_counter >= MAX_PIECE_ITERATIONS {
        diag.warn(
            WarningCode::SegmentationCapReached,
            bar.id.as_str(),
            "segmentation iteration cap reached; partial result kept",
        );
    }

    if segments.is_empty() {
        return vec![Segment::from_unsplit_bar(bar)];
    }

    attach_joints(&mut segments, &joints);
    segments
}

/// Try to pull a top-bar splice into the corridor between the previous zone
/// and the next "before support" zone. Returns the (possibly unchanged)
/// candidate segment end.
fn prefer_splice_in_previous_corridor(
    current_start: f64,
    joint_start: f64,
    candidate_end: f64,
    splice_length: f64,
    zones: &[ProhibitedZone],
) -> f64 {
    if splice_length <= 0.0 {
        return candidate_end;
    }

    let Some(before_zone) = find_next_before_zone(joint_start, zones) else {
        return candidate_end;
    };

    let Some(prev_end) = find_zone_end_before(before_zone.start_m, zones) else {
        return candidate_end;
    };
    if prev_end < current_start + TOLERANCE {
        return candidate_end;
    }

    let corridor_end = before_zone.start_m - TOLERANCE;
    let available = corridor_end - prev_end;
    if available < splice_length - TOLERANCE {
        return candidate_end;
    }

    let target_end = (prev_end + splice_length).min(corridor_end);
    if target_end <= current_start + TOLERANCE {
        return candidate_end;
    }

    target_end
}

/// Corridor target for a bottom bar's first splice, or `None` when no
/// usable "before support" corridor exists ahead of `current_start`.
fn target_bottom_corridor_end(
    current_start: f64,
    candidate_end: f64,
    splice_length: f64,
    zones: &[ProhibitedZone],
) -> Option<f64> {
    let before_zone = find_next_before_zone(current_start, zones)?;
    let prev_end = find_zone_end_before(before_zone.start_m, zones)?;

    let corridor_end = before_zone.start_m - TOLERANCE;
    let target = (prev_end + splice_length).min(corridor_end).min(candidate_end);
    if target - current_start < splice_length - TOLERANCE {
        return None;
    }

    Some(target)
}

/// Shift a segment end backwards until its splice window clears all zones.
///
/// Bounded at [`MAX_SHIFT_ATTEMPTS`]; returns the original candidate when no
/// earlier placement keeps the joint ahead of `current_start`.
fn adjust_segment_end_for_splice_zones(
    current_start: f64,
    candidate_end: f64,
    splice_length: f64,
    zones: &[ProhibitedZone],
) -> f64 {
    let mut adjusted_end = candidate_end;
    let mut attempts = 0;

    while attempts < MAX_SHIFT_ATTEMPTS {
        attempts += 1;
        let mut joint_start = adjusted_end - splice_length;
        if joint_start < current_start + TOLERANCE {
            joint_start = current_start + TOLERANCE;
        }
        if !overlaps_any_zone(joint_start, adjusted_end, zones) {
            return adjusted_end;
        }

        let Some(zone) = find_overlapping_zone(joint_start, adjusted_end, zones) else {
            break;
        };

        let shifted_end = zone.start_m - TOLERANCE;
        if shifted_end - splice_length <= current_start + TOLERANCE {
            return candidate_end;
        }

        adjusted_end = shifted_end;
    }

    adjusted_end
}

fn find_overlapping_zone<'a>(
    start: f64,
    end: f64,
    zones: &'a [ProhibitedZone],
) -> Option<&'a ProhibitedZone> {
    zones.iter().find(|zone| zone.overlaps(start, end))
}

/// End coordinate of the last zone fully before `position`.
///
/// Relies on zones being sorted by start.
fn find_zone_end_before(position: f64, zones: &[ProhibitedZone]) -> Option<f64> {
    let mut previous_end = None;
    for zone in zones {
        if zone.end_m < position - TOLERANCE {
            previous_end = Some(zone.end_m);
        } else {
            break;
        }
    }
    previous_end
}

/// First upcoming zone after `position` whose description marks it as a
/// "before support" zone.
fn find_next_before_zone(position: f64, zones: &[ProhibitedZone]) -> Option<&ProhibitedZone> {
    zones
        .iter()
        .find(|zone| zone.start_m >= position + TOLERANCE && zone.is_before_support_hint())
}

/// Stepped linear scan for a position whose centered splice window clears
/// every zone. Scans `[start_range, end_range]` in 0.1 m steps plus the
/// midpoints between steps, in ascending order; returns the first clear
/// position.
fn find_safe_splice_position(
    start_range: f64,
    end_range: f64,
    splice_length: f64,
    zones: &[ProhibitedZone],
) -> Option<f64> {
    if splice_length <= 0.0 || end_range - start_range <= TOLERANCE {
        return None;
    }

    let mut positions: Vec<f64> = Vec::new();
    let mut pos = start_range;
    while pos <= end_range + TOLERANCE {
        positions.push(pos);
        pos += SAFE_SCAN_STEP_M.max(TOLERANCE);
    }

    let scan_count = positions.len();
    for i in 0..scan_count.saturating_sub(1) {
        positions.push((positions[i] + positions[i + 1]) / 2.0);
    }

    positions.sort_by(|a, b| a.total_cmp(b));
    positions.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

    positions.into_iter().find(|&position| {
        let splice_start = position - splice_length / 2.0;
        let splice_end = position + splice_length / 2.0;
        !overlaps_any_zone(splice_start, splice_end, zones)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detailing::bar::Continuity;
    use crate::nsr10::BarMark;

    fn test_bar(id: &str, position: BarPosition, start_m: f64, end_m: f64) -> Bar {
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

    fn params<'a>(
        max_length_m: f64,
        splice_length_m: f64,
        beam_length_m: f64,
        zones: &'a [ProhibitedZone],
    ) -> SegmentationParams<'a> {
        SegmentationParams {
            max_length_m,
            splice_length_m,
            hook_length_m: 0.0,
            edge_cover_m: 0.04,
            beam_length_m,
            prefer_previous_zone: false,
            splice_offset_ratio: 0.0,
            zones,
        }
    }

    /// Segments sorted by start must tile the bar exactly, overlapping only
    /// in their splice intervals.
    fn assert_tiling(bar: &Bar, segments: &[Segment]) {
        let mut sorted: Vec<&Segment> = segments.iter().collect();
        sorted.sort_by(|a, b| a.start_m.partial_cmp(&b.start_m).unwrap());

        assert!((sorted.first().unwrap().start_m - bar.start_m).abs() < 1e-6);
        assert!((sorted.last().unwrap().end_m - bar.end_m).abs() < 1e-6);

        for pair in sorted.windows(2) {
            let overlap = pair[0].end_m - pair[1].start_m;
            assert!(overlap > 0.0, "consecutive segments must overlap");
            // The overlap is exactly the shared splice interval
            let shared = pair[0]
                .splices
                .iter()
                .find(|s| (s.end_m - pair[0].end_m).abs() < 1e-6)
                .expect("left segment carries the shared splice");
            assert!((shared.start_m - pair[1].start_m).abs() < 1e-6);
        }
    }

    #[test]
    fn test_short_bar_returned_unsplit() {
        let bar = test_bar("T1", BarPosition::Top, 0.0, 8.0);
        let mut diag = Diagnostics::new();
        let segments = split_bar(&bar, &params(9.0, 0.9, 8.0, &[]), &mut diag);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, "T1");
        assert!(segments[0].splices.is_empty());
        assert!(diag.is_empty());
    }

    #[test]
    fn test_oversized_splice_skips_segmentation_with_warning() {
        let bar = test_bar("T1", BarPosition::Top, 0.0, 14.0);
        let mut diag = Diagnostics::new();
        let segments = split_bar(&bar, &params(9.0, 9.5, 14.0, &[]), &mut diag);

        assert_eq!(segments.len(), 1);
        assert!(diag.has(WarningCode::SpliceExceedsMaxLength));
    }

    #[test]
    fn test_top_two_piece_split_no_zones() {
        // 14 m bar, 9 m stock, 0.9 m splice: two pieces, one splice
        let bar = test_bar("T1", BarPosition::Top, 0.0, 14.0);
        let mut diag = Diagnostics::new();
        let segments = split_bar(&bar, &params(9.0, 0.9, 14.0, &[]), &mut diag);

        assert_eq!(segments.len(), 2);
        assert_tiling(&bar, &segments);
        assert_eq!(segments[0].splices.len(), 1);
        assert_eq!(segments[1].splices.len(), 1);
        assert!((segments[0].splices[0].length_m() - 0.9).abs() < 1e-6);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_top_first_piece_shortened_on_long_runs() {
        // 20 m > 1.8 × 9 m: first piece drops to 60% of the usable length
        let bar = test_bar("T1", BarPosition::Top, 0.0, 20.0);
        let mut diag = Diagnostics::new();
        let segments = split_bar(&bar, &params(9.0, 0.9, 20.0, &[]), &mut diag);

        assert_eq!(segments.len(), 3);
        assert!((segments[0].length_m() - 5.4).abs() < 1e-6);
        assert_tiling(&bar, &segments);
        for segment in &segments {
            assert!(segment.length_m() <= 9.0 + 1e-6);
            for splice in &segment.splices {
                assert!(splice.length_m() >= 0.9 - 1e-6);
            }
        }
    }

    #[test]
    fn test_top_splice_shifted_clear_of_zone() {
        let zones = vec![ProhibitedZone::new(8.0, 9.5, "support face")];
        let bar = test_bar("T1", BarPosition::Top, 0.0, 14.0);
        let mut diag = Diagnostics::new();
        let segments = split_bar(&bar, &params(9.0, 0.9, 14.0, &zones), &mut diag);

        assert_tiling(&bar, &segments);
        for segment in &segments {
            for splice in &segment.splices {
                assert!(
                    !overlaps_any_zone(splice.start_m, splice.end_m, &zones),
                    "splice [{:.3}, {:.3}] overlaps the zone",
                    splice.start_m,
                    splice.end_m
                );
            }
        }
        assert!(!diag.has(WarningCode::SpliceInProhibitedZone));
    }

    #[test]
    fn test_top_prefers_before_support_corridor() {
        let zones = vec![
            ProhibitedZone::new(3.0, 4.0, "column face"),
            ProhibitedZone::new(8.5, 9.5, "before support B"),
        ];
        let bar = test_bar("T1", BarPosition::Top, 0.0, 14.0);
        let mut diag = Diagnostics::new();
        let mut p = params(9.0, 0.9, 14.0, &zones);
        p.prefer_previous_zone = true;
        let segments = split_bar(&bar, &p, &mut diag);

        assert_tiling(&bar, &segments);
        // The first splice lands in the corridor right after the column-face
        // zone, ahead of the "before support" zone
        let first_splice = &segments[0].splices[0];
        assert!((first_splice.start_m - 4.0).abs() < 1e-6);
        assert!((first_splice.end_m - 4.9).abs() < 1e-6);
    }

    #[test]
    fn test_hook_deduction_shortens_first_and_last_piece() {
        let mut bar = test_bar("T1", BarPosition::Top, 0.0, 14.0);
        bar.hook = Some(crate::nsr10::HookAngle::Deg90);
        let mut diag = Diagnostics::new();
        let mut p = params(9.0, 0.9, 14.0, &[]);
        p.hook_length_m = 0.3;
        let segments = split_bar(&bar, &p, &mut diag);

        assert_eq!(segments.len(), 2);
        // First piece limited to 9.0 - 0.3 = 8.7
        assert!((segments[0].length_m() - 8.7).abs() < 1e-6);
        assert_tiling(&bar, &segments);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_hooks_consuming_length_degrade_with_warning() {
        let mut bar = test_bar("T1", BarPosition::Top, 0.0, 5.0);
        bar.hook = Some(crate::nsr10::HookAngle::Deg90);
        let mut diag = Diagnostics::new();
        let mut p = params(2.0, 0.3, 5.0, &[]);
        p.hook_length_m = 2.2;
        let segments = split_bar(&bar, &p, &mut diag);

        assert!(diag.has(WarningCode::HooksConsumeMaxLength));
        assert_tiling(&bar, &segments);
    }

    #[test]
    fn test_bottom_default_first_segment_target() {
        // ratio 0: first piece targets min(0.45·L, 0.8·max) = 6.3
        let bar = test_bar("B1", BarPosition::Bottom, 0.0, 14.0);
        let mut diag = Diagnostics::new();
        let segments = split_bar(&bar, &params(9.0, 0.9, 14.0, &[]), &mut diag);

        assert_eq!(segments.len(), 2);
        assert!((segments[0].length_m() - 6.3).abs() < 1e-6);
        assert_tiling(&bar, &segments);
    }

    #[test]
    fn test_bottom_offset_ratio_moves_first_splice() {
        // ratio 0.4: target min(14·0.6, 9) = 8.4
        let bar = test_bar("B1", BarPosition::Bottom, 0.0, 14.0);
        let mut diag = Diagnostics::new();
        let mut p = params(9.0, 0.9, 14.0, &[]);
        p.splice_offset_ratio = 0.4;
        let segments = split_bar(&bar, &p, &mut diag);

        assert!((segments[0].length_m() - 8.4).abs() < 1e-6);
        assert_tiling(&bar, &segments);
    }

    #[test]
    fn test_bottom_stepped_scan_clears_zone() {
        // The naive first splice [5.4, 6.3] lands in the zone; the scan
        // relocates it
        let zones = vec![ProhibitedZone::new(4.5, 6.5, "midspan exclusion")];
        let bar = test_bar("B1", BarPosition::Bottom, 0.0, 14.0);
        let mut diag = Diagnostics::new();
        let segments = split_bar(&bar, &params(9.0, 0.9, 14.0, &zones), &mut diag);

        assert_tiling(&bar, &segments);
        let first_splice = &segments[0].splices[0];
        assert!(!overlaps_any_zone(first_splice.start_m, first_splice.end_m, &zones));
        assert!(!diag.has(WarningCode::NoSafeCorridorFound));
    }

    #[test]
    fn test_bottom_corridor_targeting() {
        let zones = vec![
            ProhibitedZone::new(2.0, 3.0, "column face"),
            ProhibitedZone::new(5.5, 6.5, "antes del apoyo B"),
        ];
        let bar = test_bar("B1", BarPosition::Bottom, 0.0, 14.0);
        let mut diag = Diagnostics::new();
        let segments = split_bar(&bar, &params(9.0, 0.9, 14.0, &zones), &mut diag);

        assert_tiling(&bar, &segments);
        // First splice ends at prev_end + splice_length = 3.9
        let first_splice = &segments[0].splices[0];
        assert!((first_splice.end_m - 3.9).abs() < 1e-6);
        assert!(!overlaps_any_zone(first_splice.start_m, first_splice.end_m, &zones));
    }

    #[test]
    fn test_idempotence() {
        let zones = vec![ProhibitedZone::new(8.0, 9.5, "support face")];
        let bar = test_bar("T1", BarPosition::Top, 0.0, 14.0);
        let p = params(9.0, 0.9, 14.0, &zones);

        let mut diag_a = Diagnostics::new();
        let mut diag_b = Diagnostics::new();
        let first = split_bar(&bar, &p, &mut diag_a);
        let second = split_bar(&bar, &p, &mut diag_b);

        assert_eq!(first, second);
        assert_eq!(diag_a, diag_b);
    }

    #[test]
    fn test_splice_minimum_length_invariant() {
        for (position, ratio) in [(BarPosition::Top, 0.0), (BarPosition::Bottom, 0.3)] {
            let bar = test_bar("X1", position, 0.0, 26.0);
            let mut diag = Diagnostics::new();
            let mut p = params(9.0, 0.9, 26.0, &[]);
            p.splice_offset_ratio = ratio;
            let segments = split_bar(&bar, &p, &mut diag);

            assert_tiling(&bar, &segments);
            for segment in &segments {
                for splice in &segment.splices {
                    assert!(splice.length_m() >= 0.9 - 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_find_safe_splice_position_scan_order() {
        let zones = vec![ProhibitedZone::new(0.0, 2.0, "blocked")];
        // First clear centered window starts after the zone
        let position = find_safe_splice_position(0.9, 6.0, 0.9, &zones).unwrap();
        assert!(position - 0.45 >= 2.0 - 1e-9);

        // Fully blocked range yields no position
        let blocked = vec![ProhibitedZone::new(0.0, 10.0, "blocked")];
        assert!(find_safe_splice_position(0.9, 6.0, 0.9, &blocked).is_none());
    }
}
