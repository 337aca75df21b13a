//! # Splice-From-Geometry Rebuilder
//!
//! Recomputes splice records purely from segment overlap geometry. Used when
//! segments are regrouped or edited externally: whatever produced the
//! segments, the splices attached afterwards are guaranteed consistent with
//! the final coordinates.

use std::collections::BTreeMap;

use crate::detailing::bar::{Segment, Splice, SpliceKind};

const TOLERANCE: f64 = 1e-3;

/// Rebuild every splice in place from segment overlaps.
///
/// Segments are grouped by family (the id prefix before `-S`), sorted by
/// start coordinate within each family, stripped of their splice records,
/// and re-spliced: each pair of consecutive segments with a positive overlap
/// `[max(starts), min(ends)]` gets one splice record attached to both sides.
/// Non-positive overlaps are discarded.
pub fn rebuild_splices(segments: &mut [Segment]) {
    if segments.is_empty() {
        return;
    }

    let mut families: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, segment) in segments.iter().enumerate() {
        families
            .entry(segment.family_id().to_string())
            .or_default()
            .push(index);
    }

    for segment in segments.iter_mut() {
        segment.splices.clear();
    }

    for indices in families.values_mut() {
        indices.sort_by(|&a, &b| {
            let (sa, sb) = (&segments[a], &segments[b]);
            sa.start_m
                .total_cmp(&sb.start_m)
                .then(sa.end_m.total_cmp(&sb.end_m))
        });

        for pair in indices.windows(2) {
            let (current, following) = (pair[0], pair[1]);
            let overlap_start = segments[current].start_m.max(segments[following].start_m);
            let overlap_end = segments[current].end_m.min(segments[following].end_m);
            if overlap_end - overlap_start <= TOLERANCE {
                continue;
            }

            let splice = Splice {
                start_m: overlap_start,
                end_m: overlap_end,
                kind: SpliceKind::LapClassB,
                position: segments[current].position,
                adjusted: false,
                original_center_m: None,
            };

            segments[current].splices.push(splice.clone());
            segments[following].splices.push(splice);
        }
    }
}
