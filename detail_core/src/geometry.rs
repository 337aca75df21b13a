//! # Beam Geometry
//!
//! Validated geometric input for detailing: supports, spans and prohibited
//! (no-splice) zones along the beam axis. Coordinates are in meters, beam
//! local, with 0 at the left end.
//!
//! All invariants are checked at construction, so downstream code can rely
//! on sorted, in-bounds, non-inverted intervals without probing.

use serde::{Deserialize, Serialize};

use crate::errors::{DetailError, DetailResult};

const TOLERANCE: f64 = 1e-3;

/// A support (column or wall face) along the beam axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Zero-based index, left to right
    pub index: usize,

    /// Axis label shown on drawings (e.g., "A", "B")
    pub label: String,

    /// Left face of the support (m)
    pub start_m: f64,

    /// Support width (m)
    pub width_m: f64,
}

impl Support {
    /// Right face of the support (m)
    pub fn end_m(&self) -> f64 {
        self.start_m + self.width_m
    }

    /// Axis station at the support centerline (m)
    pub fn center_m(&self) -> f64 {
        self.start_m + self.width_m / 2.0
    }
}

/// One clear span between consecutive supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Zero-based index, left to right
    pub index: usize,

    /// Left end of the clear span (m)
    pub start_m: f64,

    /// Right end of the clear span (m)
    pub end_m: f64,

    /// Section width (m)
    pub section_width_m: f64,

    /// Section depth (m); drives confinement zone extents
    pub section_height_m: f64,
}

impl Span {
    /// Clear span length (m)
    pub fn clear_length_m(&self) -> f64 {
        self.end_m - self.start_m
    }
}

/// A linear region where a lap splice may not be placed.
///
/// Produced by an upstream code-rule evaluator; the description is free text
/// and may carry a corridor hint ("before support" / "antes del apoyo") that
/// the segmentation engine uses to pull splices into the preceding corridor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProhibitedZone {
    /// Left end of the zone (m)
    pub start_m: f64,

    /// Right end of the zone (m)
    pub end_m: f64,

    /// Free-text description, possibly carrying directional hints
    pub description: String,
}

impl ProhibitedZone {
    /// Create a zone; start/end are not validated here (the geometry
    /// constructor owns validation).
    pub fn new(start_m: f64, end_m: f64, description: impl Into<String>) -> Self {
        ProhibitedZone {
            start_m,
            end_m,
            description: description.into(),
        }
    }

    /// Zone length (m)
    pub fn length_m(&self) -> f64 {
        self.end_m - self.start_m
    }

    /// True when the open interval `(start, end)` intersects this zone
    pub fn overlaps(&self, start_m: f64, end_m: f64) -> bool {
        start_m.max(self.start_m) < end_m.min(self.end_m)
    }

    /// True when the description marks this as a "before support" zone,
    /// making the corridor just ahead of it a preferred splice location
    pub fn is_before_support_hint(&self) -> bool {
        let text = self.description.to_lowercase();
        text.contains("before") || text.contains("antes")
    }
}

/// True when `(start, end)` intersects any zone in the list
pub fn overlaps_any_zone(start_m: f64, end_m: f64, zones: &[ProhibitedZone]) -> bool {
    zones.iter().any(|zone| zone.overlaps(start_m, end_m))
}

/// Full beam geometry consumed by the layout engine and stirrup planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamGeometry {
    /// Total beam length from left edge to right edge (m)
    pub total_length_m: f64,

    /// Clear spans, sorted left to right
    pub spans: Vec<Span>,

    /// Supports, sorted left to right
    pub supports: Vec<Support>,
}

impl BeamGeometry {
    /// Build and validate a geometry.
    ///
    /// # Errors
    ///
    /// `DetailError::InvalidInput` when the total length is non-positive, an
    /// interval is inverted, or spans/supports are out of order or out of
    /// bounds.
    pub fn new(
        total_length_m: f64,
        spans: Vec<Span>,
        supports: Vec<Support>,
    ) -> DetailResult<Self> {
        if total_length_m <= 0.0 {
            return Err(DetailError::invalid_input(
                "total_length_m",
                total_length_m.to_string(),
                "Beam length must be positive",
            ));
        }

        let mut previous_end = 0.0;
        for span in &spans {
            if span.end_m <= span.start_m {
                return Err(DetailError::invalid_input(
                    "spans",
                    format!("[{:.3}, {:.3}]", span.start_m, span.end_m),
                    "Span interval is inverted or empty",
                ));
            }
            if span.start_m < previous_end - TOLERANCE {
                return Err(DetailError::invalid_input(
                    "spans",
                    format!("[{:.3}, {:.3}]", span.start_m, span.end_m),
                    "Spans must be sorted and non-overlapping",
                ));
            }
            if span.end_m > total_length_m + TOLERANCE {
                return Err(DetailError::invalid_input(
                    "spans",
                    format!("[{:.3}, {:.3}]", span.start_m, span.end_m),
                    "Span extends past the beam end",
                ));
            }
            if span.section_height_m <= 0.0 || span.section_width_m <= 0.0 {
                return Err(DetailError::invalid_input(
                    "spans",
                    format!("{}x{}", span.section_width_m, span.section_height_m),
                    "Section dimensions must be positive",
                ));
            }
            previous_end = span.end_m;
        }

        let mut previous_start = f64::NEG_INFINITY;
        for support in &supports {
            if support.width_m <= 0.0 {
                return Err(DetailError::invalid_input(
                    "supports",
                    support.width_m.to_string(),
                    "Support width must be positive",
                ));
            }
            if support.start_m < previous_start {
                return Err(DetailError::invalid_input(
                    "supports",
                    support.start_m.to_string(),
                    "Supports must be sorted left to right",
                ));
            }
            previous_start = support.start_m;
        }

        Ok(BeamGeometry {
            total_length_m,
            spans,
            supports,
        })
    }

    /// Build a geometry from supports alone: the total length is the right
    /// face of the last support, and one clear span is generated between
    /// each pair of consecutive supports using a uniform section.
    pub fn from_supports(
        supports: Vec<Support>,
        section_width_m: f64,
        section_height_m: f64,
    ) -> DetailResult<Self> {
        let last = supports.last().ok_or_else(|| {
            DetailError::invalid_input("supports", "[]", "At least one support is required")
        })?;
        let total_length_m = last.end_m();

        let spans = supports
            .windows(2)
            .enumerate()
            .map(|(index, pair)| Span {
                index,
                start_m: pair[0].end_m(),
                end_m: pair[1].start_m,
                section_width_m,
                section_height_m,
            })
            .collect();

        BeamGeometry::new(total_length_m, spans, supports)
    }

    /// Span containing the given station; falls back to the first span when
    /// the station lies inside a support.
    pub fn span_at(&self, station_m: f64) -> Option<&Span> {
        self.spans
            .iter()
            .find(|span| span.start_m <= station_m && station_m <= span.end_m)
            .or_else(|| self.spans.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn support(index: usize, label: &str, start_m: f64, width_m: f64) -> Support {
        Support {
            index,
            label: label.to_string(),
            start_m,
            width_m,
        }
    }

    #[test]
    fn test_from_supports_total_length_and_spans() {
        let geometry = BeamGeometry::from_supports(
            vec![
                support(0, "A", 0.0, 0.35),
                support(1, "B", 4.35, 0.35),
                support(2, "C", 8.70, 0.35),
            ],
            0.30,
            0.45,
        )
        .unwrap();

        assert!((geometry.total_length_m - 9.05).abs() < 1e-9);
        assert_eq!(geometry.spans.len(), 2);
        assert!((geometry.spans[0].start_m - 0.35).abs() < 1e-9);
        assert!((geometry.spans[0].end_m - 4.35).abs() < 1e-9);
        assert!((geometry.spans[0].clear_length_m() - 4.0).abs() < 1e-9);
        assert!((geometry.supports[1].center_m() - 4.525).abs() < 1e-9);
    }

    #[test]
    fn test_span_at_falls_back_to_first() {
        let geometry = BeamGeometry::from_supports(
            vec![support(0, "A", 0.0, 0.35), support(1, "B", 4.35, 0.35)],
            0.30,
            0.45,
        )
        .unwrap();

        // Inside the clear span
        assert_eq!(geometry.span_at(2.0).unwrap().index, 0);
        // Inside the left support: falls back to the first span
        assert_eq!(geometry.span_at(0.1).unwrap().index, 0);
    }

    #[test]
    fn test_rejects_inverted_span() {
        let result = BeamGeometry::new(
            10.0,
            vec![Span {
                index: 0,
                start_m: 4.0,
                end_m: 2.0,
                section_width_m: 0.3,
                section_height_m: 0.45,
            }],
            vec![],
        );
        assert!(matches!(result, Err(DetailError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_non_positive_length() {
        assert!(BeamGeometry::new(0.0, vec![], vec![]).is_err());
    }

    #[test]
    fn test_zone_overlap_and_hint() {
        let zone = ProhibitedZone::new(4.0, 5.0, "Before support B / antes del apoyo B");
        assert!((zone.length_m() - 1.0).abs() < 1e-9);
        assert!(zone.overlaps(4.5, 4.8));
        assert!(zone.overlaps(3.5, 4.2));
        assert!(!zone.overlaps(5.0, 6.0));
        assert!(zone.is_before_support_hint());

        let plain = ProhibitedZone::new(0.0, 1.0, "midspan exclusion");
        assert!(!plain.is_before_support_hint());
    }

    #[test]
    fn test_overlaps_any_zone() {
        let zones = vec![
            ProhibitedZone::new(1.0, 2.0, "a"),
            ProhibitedZone::new(5.0, 6.0, "b"),
        ];
        assert!(overlaps_any_zone(5.5, 5.6, &zones));
        assert!(!overlaps_any_zone(2.5, 4.5, &zones));
    }
}
