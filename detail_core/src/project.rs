//! # Project Data Structures
//!
//! The `BeamProject` struct is the root container for a set of beams being
//! detailed. Projects serialize to `.dsp` (despiece) files as human-readable
//! JSON.
//!
//! ## Structure
//!
//! ```text
//! BeamProject
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── settings: GlobalSettings (code, class, stock length defaults)
//! └── items: HashMap<Uuid, BeamItem> (all beams)
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detailing::{BarPosition, DetailingInput, DetailingOutcome};
use crate::geometry::BeamGeometry;
use crate::nsr10::{BarMark, DissipationClass};

/// Current schema version for .dsp files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
///
/// This is the top-level struct that gets serialized to `.dsp` files.
/// Beams are stored in a flat UUID-keyed map for O(1) lookups and stable
/// references when items are reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamProject {
    /// Project metadata (version, engineer, job info)
    pub meta: ProjectMetadata,

    /// Global settings (code, defaults)
    pub settings: GlobalSettings,

    /// All beams, keyed by UUID
    pub items: HashMap<Uuid, BeamItem>,
}

impl BeamProject {
    /// Create a new empty project.
    ///
    /// # Example
    ///
    /// ```rust
    /// use detail_core::project::BeamProject;
    ///
    /// let project = BeamProject::new("Jane Engineer", "25-042", "ACME Corp");
    /// assert_eq!(project.meta.engineer, "Jane Engineer");
    /// ```
    pub fn new(
        engineer: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        BeamProject {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: GlobalSettings::default(),
            items: HashMap::new(),
        }
    }

    /// Add a beam to the project. Returns the UUID assigned to it.
    pub fn add_item(&mut self, item: BeamItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    /// Remove a beam by UUID, returning it if it existed.
    pub fn remove_item(&mut self, id: &Uuid) -> Option<BeamItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    /// Get a beam by UUID.
    pub fn get_item(&self, id: &Uuid) -> Option<&BeamItem> {
        self.items.get(id)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Number of beams in the project
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl Default for BeamProject {
    fn default() -> Self {
        BeamProject::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// Global project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Building code (fixed to NSR-10 for now)
    pub code: String,

    /// Default energy-dissipation class for new beams
    pub class: DissipationClass,

    /// Default commercial bar length (m)
    pub commercial_length_m: f64,

    /// Default concrete cover (m)
    pub cover_m: f64,

    /// Default stirrup mark
    pub stirrup_mark: BarMark,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            code: "NSR-10".to_string(),
            class: DissipationClass::Des,
            commercial_length_m: 12.0,
            cover_m: 0.04,
            stirrup_mark: BarMark::No3,
        }
    }
}

/// One beam in the project: identification plus everything the engine needs
/// to re-run detailing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamItem {
    /// Drawing label (e.g., "VA 201")
    pub label: String,

    /// Building level the beam belongs to (e.g., "N+3.52")
    pub level: String,

    /// Number of identical beams this item stands for
    pub quantity: u32,

    /// Supports, spans and section data
    pub geometry: BeamGeometry,

    /// Detailing engine input (bars, zones, parameters)
    pub input: DetailingInput,
}

/// Per-position totals derived from a detailing outcome, for schedules and
/// bill-of-materials estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingSummary {
    /// Number of top segments (drawn pieces × their quantities)
    pub top_piece_count: u32,

    /// Number of bottom segments
    pub bottom_piece_count: u32,

    /// Distinct bar marks in use, sorted
    pub marks_used: Vec<BarMark>,

    /// Total steel length across all pieces and quantities (m)
    pub total_steel_length_m: f64,

    /// Number of distinct lap splices
    pub splice_count: usize,
}

impl CuttingSummary {
    /// Summarize a detailing outcome.
    pub fn from_outcome(outcome: &DetailingOutcome) -> Self {
        let mut marks: Vec<BarMark> = Vec::new();
        let mut total_steel_length_m = 0.0;
        let mut counts = [0u32; 2];

        for position in BarPosition::ALL {
            for segment in outcome.segments(position) {
                if !marks.contains(&segment.mark) {
                    marks.push(segment.mark);
                }
                total_steel_length_m += segment.length_m() * segment.quantity.max(1) as f64;
                let slot = match position {
                    BarPosition::Top => 0,
                    BarPosition::Bottom => 1,
                };
                counts[slot] += segment.quantity.max(1);
            }
        }
        marks.sort();

        CuttingSummary {
            top_piece_count: counts[0],
            bottom_piece_count: counts[1],
            marks_used: marks,
            total_steel_length_m,
            splice_count: outcome.splice_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detailing::{detail_beam, Bar, Continuity};
    use crate::geometry::Support;
    use crate::nsr10::lap_splice_length;

    fn sample_item() -> BeamItem {
        let geometry = BeamGeometry::from_supports(
            vec![
                Support { index: 0, label: "A".to_string(), start_m: 0.0, width_m: 0.35 },
                Support { index: 1, label: "B".to_string(), start_m: 13.65, width_m: 0.35 },
            ],
            0.30,
            0.45,
        )
        .unwrap();

        let class = DissipationClass::Des;
        let input = DetailingInput {
            beam_length_m: geometry.total_length_m,
            class,
            commercial_length_m: 12.0,
            splice_length_m: lap_splice_length(BarMark::No6.diameter_mm(), class, 12.0),
            cover_m: 0.04,
            splice_offset_ratio: 0.0,
            prefer_previous_zone: false,
            top_bars: vec![Bar {
                id: "T6-C01".to_string(),
                mark: BarMark::No6,
                position: BarPosition::Top,
                continuity: Continuity::Continuous,
                start_m: 0.0,
                end_m: 14.0,
                hook: None,
                quantity: 2,
                development_length_m: 0.955,
                notes: None,
            }],
            bottom_bars: vec![],
            prohibited_zones: vec![],
        };

        BeamItem {
            label: "VA 201".to_string(),
            level: "N+3.52".to_string(),
            quantity: 1,
            geometry,
            input,
        }
    }

    #[test]
    fn test_project_creation_and_items() {
        let mut project = BeamProject::new("Jane Engineer", "25-042", "ACME Corp");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.settings.code, "NSR-10");

        let id = project.add_item(sample_item());
        assert_eq!(project.item_count(), 1);
        assert!(project.get_item(&id).is_some());

        let removed = project.remove_item(&id);
        assert!(removed.is_some());
        assert_eq!(project.item_count(), 0);
    }

    #[test]
    fn test_project_serialization_roundtrip() {
        let mut project = BeamProject::new("Jane Engineer", "25-042", "ACME Corp");
        project.add_item(sample_item());

        let json = serde_json::to_string_pretty(&project).unwrap();
        assert!(json.contains("NSR-10"));
        assert!(json.contains("VA 201"));

        let roundtrip: BeamProject = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.engineer, "Jane Engineer");
        assert_eq!(roundtrip.item_count(), 1);
    }

    #[test]
    fn test_cutting_summary_totals() {
        let item = sample_item();
        let outcome = detail_beam(&item.input).unwrap();
        let summary = CuttingSummary::from_outcome(&outcome);

        // One 14 m bar × quantity 2, split into 2 pieces
        assert_eq!(summary.top_piece_count, 4);
        assert_eq!(summary.bottom_piece_count, 0);
        assert_eq!(summary.marks_used, vec![BarMark::No6]);
        assert_eq!(summary.splice_count, 1);

        // Total steel exceeds 2 × 14 m by the splice overlap × quantity
        let overlap = outcome.splice_length_m;
        assert!((summary.total_steel_length_m - 2.0 * (14.0 + overlap)).abs() < 1e-6);
    }
}
