//! # Reinforcement Data Model
//!
//! Bars (immutable detailing input), segments (physical pieces after
//! splitting) and splices (lap overlap records). Identifiers follow the
//! `<bar-id>-S<NN>` convention for split pieces; the portion before `-S`
//! is the segment's family, used for regrouping and drawing stacks.

use serde::{Deserialize, Serialize};

use crate::errors::{DetailError, DetailResult};
use crate::nsr10::{BarMark, HookAngle};

/// Vertical role of a bar in the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarPosition {
    /// Negative-moment reinforcement along the top face
    Top,
    /// Positive-moment reinforcement along the bottom face
    Bottom,
}

impl BarPosition {
    /// Both positions for iteration/UI
    pub const ALL: [BarPosition; 2] = [BarPosition::Top, BarPosition::Bottom];

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            BarPosition::Top => "Top",
            BarPosition::Bottom => "Bottom",
        }
    }
}

impl std::fmt::Display for BarPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Continuity class of a bar run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Continuity {
    /// Runs the full beam length
    Continuous,
    /// Confined to one span (e.g., midspan positive steel)
    Span,
}

/// Lap splice classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpliceKind {
    /// Class B tension lap splice
    #[serde(rename = "lap_splice_class_b")]
    LapClassB,
}

/// A lap splice between two adjoining segments.
///
/// The interval `[start_m, end_m]` is where both bar ends run in parallel.
/// Both adjoining segments carry a copy of the record; the coordination
/// resolver keeps the copies in sync when it relocates a splice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Splice {
    /// Left end of the overlap (m)
    pub start_m: f64,

    /// Right end of the overlap (m)
    pub end_m: f64,

    /// Splice classification
    pub kind: SpliceKind,

    /// Role of the owning bar (matches the segment's position)
    pub position: BarPosition,

    /// True when cross-bar coordination moved this splice
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub adjusted: bool,

    /// Center before coordination moved it, kept for traceability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_center_m: Option<f64>,
}

impl Splice {
    /// Create a class B lap splice record
    pub fn new(start_m: f64, end_m: f64, position: BarPosition) -> Self {
        Splice {
            start_m,
            end_m,
            kind: SpliceKind::LapClassB,
            position,
            adjusted: false,
            original_center_m: None,
        }
    }

    /// Overlap length (m)
    pub fn length_m(&self) -> f64 {
        self.end_m - self.start_m
    }

    /// Overlap midpoint (m)
    pub fn center_m(&self) -> f64 {
        (self.start_m + self.end_m) / 2.0
    }
}

/// One continuous reinforcing bar, as designed (before splitting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Identifier (e.g., "T5-C01")
    pub id: String,

    /// Commercial bar mark
    pub mark: BarMark,

    /// Top or bottom role
    pub position: BarPosition,

    /// Continuity class
    pub continuity: Continuity,

    /// Left end along the beam axis (m)
    pub start_m: f64,

    /// Right end along the beam axis (m)
    pub end_m: f64,

    /// Hook at the physical ends, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<HookAngle>,

    /// Number of identical parallel bars this record stands for
    pub quantity: u32,

    /// Development length for anchorage checks (m)
    pub development_length_m: f64,

    /// Free-text notes; directional keywords here can force hook drawing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Bar {
    /// Bar length (m)
    pub fn length_m(&self) -> f64 {
        self.end_m - self.start_m
    }

    /// Validate the bar's own geometry.
    pub fn validate(&self) -> DetailResult<()> {
        if self.end_m <= self.start_m {
            return Err(DetailError::invalid_input(
                "bar",
                format!("{} [{:.3}, {:.3}]", self.id, self.start_m, self.end_m),
                "Bar interval is inverted or empty",
            ));
        }
        if self.quantity == 0 {
            return Err(DetailError::invalid_input(
                "bar",
                self.id.clone(),
                "Bar quantity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// One physical piece of a bar after splitting.
///
/// Invariant: the segments of one bar, sorted by start, tile
/// `[bar.start_m, bar.end_m]` exactly, with consecutive pieces overlapping
/// in their shared splice interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Identifier: `<bar-id>-S<NN>` for split pieces, the bar id when unsplit
    pub id: String,

    /// Commercial bar mark (inherited)
    pub mark: BarMark,

    /// Top or bottom role (inherited)
    pub position: BarPosition,

    /// Left end (m)
    pub start_m: f64,

    /// Right end (m)
    pub end_m: f64,

    /// Hook type inherited from the parent bar; drawn only at true family
    /// terminals (the layout engine decides)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<HookAngle>,

    /// Splice records on this piece's boundaries (0, 1 or 2)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub splices: Vec<Splice>,

    /// Identical parallel pieces (inherited)
    pub quantity: u32,

    /// Development length (inherited, m)
    pub development_length_m: f64,

    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Segment {
    /// Piece length (m)
    pub fn length_m(&self) -> f64 {
        self.end_m - self.start_m
    }

    /// A single segment covering the whole bar (segmentation skipped or
    /// not needed). Keeps the bar's own id.
    pub fn from_unsplit_bar(bar: &Bar) -> Self {
        Segment {
            id: bar.id.clone(),
            mark: bar.mark,
            position: bar.position,
            start_m: bar.start_m,
            end_m: bar.end_m,
            hook: bar.hook,
            splices: Vec::new(),
            quantity: bar.quantity,
            development_length_m: bar.development_length_m,
            notes: bar.notes.clone(),
        }
    }

    /// Family identifier: the id with its `-S<NN>` split suffix stripped.
    ///
    /// Segments split from one bar share a family and are stacked together
    /// by the layout engine.
    pub fn family_id(&self) -> &str {
        family_of(&self.id)
    }

    /// Append a note fragment, separated by " | ", skipping duplicates.
    pub fn append_note(&mut self, fragment: &str) {
        match &mut self.notes {
            Some(existing) => {
                if !existing.contains(fragment) {
                    existing.push_str(" | ");
                    existing.push_str(fragment);
                }
            }
            None => self.notes = Some(fragment.to_string()),
        }
    }
}

/// Strip a trailing `-S<digits>` split suffix from an identifier.
pub fn family_of(id: &str) -> &str {
    if let Some(pos) = id.rfind("-S") {
        let suffix = &id[pos + 2..];
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            return &id[..pos];
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            id: "T5-C01".to_string(),
            mark: BarMark::No5,
            position: BarPosition::Top,
            continuity: Continuity::Continuous,
            start_m: 0.0,
            end_m: 14.0,
            hook: Some(HookAngle::Deg90),
            quantity: 2,
            development_length_m: 0.6,
            notes: None,
        }
    }

    #[test]
    fn test_family_id_stripping() {
        assert_eq!(family_of("T5-C01-S02"), "T5-C01");
        assert_eq!(family_of("T5-C01"), "T5-C01");
        // "-S" followed by non-digits is not a split suffix
        assert_eq!(family_of("B2-Sur"), "B2-Sur");
    }

    #[test]
    fn test_splice_derived_values() {
        let splice = Splice::new(10.5, 12.0, BarPosition::Top);
        assert!((splice.length_m() - 1.5).abs() < 1e-9);
        assert!((splice.center_m() - 11.25).abs() < 1e-9);
        assert!(!splice.adjusted);
    }

    #[test]
    fn test_bar_validation() {
        let bar = sample_bar();
        assert!(bar.validate().is_ok());

        let mut inverted = sample_bar();
        inverted.start_m = 15.0;
        assert!(inverted.validate().is_err());

        let mut empty = sample_bar();
        empty.quantity = 0;
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_unsplit_segment_keeps_bar_id() {
        let bar = sample_bar();
        let segment = Segment::from_unsplit_bar(&bar);
        assert_eq!(segment.id, "T5-C01");
        assert!(segment.splices.is_empty());
        assert_eq!(segment.family_id(), "T5-C01");
    }

    #[test]
    fn test_append_note_deduplicates() {
        let bar = sample_bar();
        let mut segment = Segment::from_unsplit_bar(&bar);
        segment.append_note("Splices coordinated");
        segment.append_note("Splices coordinated");
        assert_eq!(segment.notes.as_deref(), Some("Splices coordinated"));

        segment.append_note("Hooked at support");
        assert_eq!(
            segment.notes.as_deref(),
            Some("Splices coordinated | Hooked at support")
        );
    }

    #[test]
    fn test_serde_wire_shapes() {
        let splice = Splice::new(1.0, 1.75, BarPosition::Bottom);
        let json = serde_json::to_string(&splice).unwrap();
        assert!(json.contains("\"lap_splice_class_b\""));
        assert!(json.contains("\"bottom\""));
        // Unadjusted splices omit the adjustment fields
        assert!(!json.contains("adjusted"));
        assert!(!json.contains("original_center_m"));
    }
}
