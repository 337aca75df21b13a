//! # Confinement Zone Planner
//!
//! Derives stirrup zones per span: a confinement zone of code-mandated
//! length at each support face with tight spacing, and a non-confined
//! remainder at the looser mid-span spacing. Produces the zone list with
//! `<count>E C/<spacing_cm>` labels plus deduplicated boundary markers for
//! the external stirrup renderer.

use serde::{Deserialize, Serialize};

use crate::geometry::BeamGeometry;
use crate::nsr10::{confinement_zone, BarMark, DissipationClass};

/// Zones at or below this length get their label flipped to the opposite
/// side of the reference line to avoid crowding (m)
const SHORT_ZONE_LABEL_LIMIT_M: f64 = 0.5;

/// Marker dedup tolerance, in drawing units
const MARKER_TOLERANCE: f64 = 0.5;

/// Stirrup zone classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Tight spacing next to a support face
    Confined,
    /// Looser mid-span spacing
    NonConfined,
}

/// Which side of the reference line the zone label goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSide {
    Above,
    Below,
}

/// One stirrup zone along a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupZone {
    /// Left end (m)
    pub start_m: f64,

    /// Right end (m)
    pub end_m: f64,

    /// Confined or non-confined
    pub kind: ZoneKind,

    /// Stirrup spacing in this zone (m)
    pub spacing_m: f64,

    /// Estimated stirrup count: `floor(length / spacing) + 1`
    pub estimated_count: u32,

    /// Drawing label, e.g. `9E C/15`
    pub label: String,

    /// Label placement; short zones flip below the line
    pub label_side: LabelSide,
}

impl StirrupZone {
    /// Zone length (m)
    pub fn length_m(&self) -> f64 {
        self.end_m - self.start_m
    }
}

/// Stirrup plan for a whole beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupPlan {
    /// Stirrup bar mark the plan was computed for
    pub stirrup_mark: BarMark,

    /// Zones across all spans, left to right
    pub zones: Vec<StirrupZone>,
}

impl StirrupPlan {
    /// Zone boundary markers in drawing units, sorted and deduplicated
    /// within [`MARKER_TOLERANCE`]. `scale` converts meters to drawing
    /// units (e.g., 1000 for millimeters).
    pub fn boundary_markers(&self, scale: f64) -> Vec<f64> {
        let mut positions: Vec<f64> = self
            .zones
            .iter()
            .flat_map(|zone| [zone.start_m * scale, zone.end_m * scale])
            .collect();
        positions.sort_by(|a, b| a.total_cmp(b));

        let mut unique: Vec<f64> = Vec::with_capacity(positions.len());
        for position in positions {
            match unique.last() {
                Some(last) if (position - last).abs() <= MARKER_TOLERANCE => {}
                _ => unique.push(position),
            }
        }
        unique
    }
}

fn make_zone(start_m: f64, end_m: f64, kind: ZoneKind, spacing_m: f64) -> StirrupZone {
    let length = (end_m - start_m).max(0.0);
    let estimated_count = if spacing_m > 0.0 {
        (length / spacing_m).floor() as u32 + 1
    } else {
        0
    };
    let label = format!("{}E C/{:.0}", estimated_count, spacing_m * 100.0);
    let label_side = if length <= SHORT_ZONE_LABEL_LIMIT_M {
        LabelSide::Below
    } else {
        LabelSide::Above
    };

    StirrupZone {
        start_m,
        end_m,
        kind,
        spacing_m,
        estimated_count,
        label,
        label_side,
    }
}

/// Plan stirrup zones for every span of the beam.
///
/// Each span gets a confinement zone at both ends (length and spacing per
/// [`confinement_zone`], driven by the span's section depth) and a
/// non-confined middle. Spans too short for two full confinement zones are
/// confined end to end.
pub fn plan_stirrups(
    geometry: &BeamGeometry,
    class: DissipationClass,
    stirrup_mark: BarMark,
) -> StirrupPlan {
    let mut zones: Vec<StirrupZone> = Vec::new();

    for span in &geometry.spans {
        let params = confinement_zone(class, span.section_height_m, stirrup_mark.diameter_mm());
        let span_length = span.clear_length_m();

        if span_length <= 2.0 * params.zone_length_m {
            // No room for a distinct middle zone: fully confined
            zones.push(make_zone(
                span.start_m,
                span.end_m,
                ZoneKind::Confined,
                params.spacing_confined_m,
            ));
            continue;
        }

        let left_end = span.start_m + params.zone_length_m;
        let right_start = span.end_m - params.zone_length_m;

        zones.push(make_zone(
            span.start_m,
            left_end,
            ZoneKind::Confined,
            params.spacing_confined_m,
        ));
        zones.push(make_zone(
            left_end,
            right_start,
            ZoneKind::NonConfined,
            params.spacing_midspan_m,
        ));
        zones.push(make_zone(
            right_start,
            span.end_m,
            ZoneKind::Confined,
            params.spacing_confined_m,
        ));
    }

    StirrupPlan {
        stirrup_mark,
        zones,
    }
}
