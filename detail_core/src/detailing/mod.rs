//! # Beam Reinforcement Detailing
//!
//! The detailing pipeline: bars + prohibited zones + code parameters in,
//! segments + splices + diagnostics out. The entry point follows the
//! crate-wide pattern:
//!
//! - [`DetailingInput`] - input parameters (JSON-serializable)
//! - [`DetailingOutcome`] - results plus structured diagnostics
//! - [`detail_beam`] - pure function, deterministic and stateless
//!
//! Pipeline order: per-bar segmentation (top strategy / bottom strategy),
//! then cross-bar splice coordination. Lane layout and stirrup planning are
//! separate per-drawing passes (see [`crate::layout`] and
//! [`crate::stirrups`]).
//!
//! ## Example
//!
//! ```rust
//! use detail_core::detailing::{detail_beam, DetailingInput};
//! use detail_core::detailing::bar::{Bar, BarPosition, Continuity};
//! use detail_core::nsr10::{lap_splice_length, BarMark, DissipationClass};
//!
//! let mark = BarMark::No6;
//! let class = DissipationClass::Des;
//! let input = DetailingInput {
//!     beam_length_m: 14.0,
//!     class,
//!     commercial_length_m: 12.0,
//!     splice_length_m: lap_splice_length(mark.diameter_mm(), class, 12.0),
//!     cover_m: 0.04,
//!     splice_offset_ratio: 0.0,
//!     prefer_previous_zone: false,
//!     top_bars: vec![Bar {
//!         id: "T6-C01".to_string(),
//!         mark,
//!         position: BarPosition::Top,
//!         continuity: Continuity::Continuous,
//!         start_m: 0.0,
//!         end_m: 14.0,
//!         hook: None,
//!         quantity: 2,
//!         development_length_m: 0.955,
//!         notes: None,
//!     }],
//!     bottom_bars: vec![],
//!     prohibited_zones: vec![],
//! };
//!
//! let outcome = detail_beam(&input).unwrap();
//! assert_eq!(outcome.top_segments.len(), 2);
//! ```

pub mod bar;
pub mod coordination;
pub mod rebuild;
pub mod segmentation;

use serde::{Deserialize, Serialize};

pub use bar::{Bar, BarPosition, Continuity, Segment, Splice, SpliceKind};
pub use coordination::coordinate_splices;
pub use rebuild::rebuild_splices;
pub use segmentation::{split_bar, SegmentationParams, MIN_EDGE_COVER_M};

use crate::diagnostics::Diagnostics;
use crate::errors::{DetailError, DetailResult};
use crate::geometry::ProhibitedZone;
use crate::nsr10::DissipationClass;

/// Input for one detailing run.
///
/// `splice_length_m` is the governing lap splice length, precomputed via
/// [`crate::nsr10::lap_splice_length`]; hook extensions are resolved per bar
/// from the [`crate::nsr10::BarMark`] table inside the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailingInput {
    /// Total beam length (m)
    pub beam_length_m: f64,

    /// Energy-dissipation class
    pub class: DissipationClass,

    /// Commercial (stock) bar length; pieces never exceed it (m)
    pub commercial_length_m: f64,

    /// Required lap splice length (m)
    pub splice_length_m: f64,

    /// Concrete cover at the beam ends (m)
    pub cover_m: f64,

    /// First-splice tuning knob for bottom bars, in [0, 0.6]
    pub splice_offset_ratio: f64,

    /// Steer top-bar splices into "before support" corridors
    pub prefer_previous_zone: bool,

    /// Top reinforcement runs
    pub top_bars: Vec<Bar>,

    /// Bottom reinforcement runs
    pub bottom_bars: Vec<Bar>,

    /// No-splice zones from the upstream code-rule evaluator
    pub prohibited_zones: Vec<ProhibitedZone>,
}

impl DetailingInput {
    /// Validate input geometry.
    ///
    /// Constraint-satisfaction problems never fail (they degrade with
    /// warnings); this rejects only malformed input the engine cannot
    /// meaningfully process.
    pub fn validate(&self) -> DetailResult<()> {
        if self.beam_length_m <= 0.0 {
            return Err(DetailError::invalid_input(
                "beam_length_m",
                self.beam_length_m.to_string(),
                "Beam length must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.splice_offset_ratio) {
            return Err(DetailError::invalid_input(
                "splice_offset_ratio",
                self.splice_offset_ratio.to_string(),
                "Offset ratio must lie in [0, 1]",
            ));
        }
        for bar in self.top_bars.iter().chain(&self.bottom_bars) {
            bar.validate()?;
        }
        for zone in &self.prohibited_zones {
            if zone.end_m <= zone.start_m {
                return Err(DetailError::invalid_input(
                    "prohibited_zones",
                    format!("[{:.3}, {:.3}]", zone.start_m, zone.end_m),
                    "Zone interval is inverted or empty",
                ));
            }
        }
        Ok(())
    }
}

/// Result of one detailing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailingOutcome {
    /// Top segments, in bar order then piece order
    pub top_segments: Vec<Segment>,

    /// Bottom segments, coordinated against the top set
    pub bottom_segments: Vec<Segment>,

    /// Lap splice length the run was performed with (m)
    pub splice_length_m: f64,

    /// Structured warnings recorded while degrading gracefully
    pub diagnostics: Diagnostics,
}

impl DetailingOutcome {
    /// All segments of one position
    pub fn segments(&self, position: BarPosition) -> &[Segment] {
        match position {
            BarPosition::Top => &self.top_segments,
            BarPosition::Bottom => &self.bottom_segments,
        }
    }

    /// Number of distinct physical joints across both positions
    pub fn splice_count(&self) -> usize {
        let attached: usize = self
            .top_segments
            .iter()
            .chain(&self.bottom_segments)
            .map(|segment| segment.splices.len())
            .sum();
        // Each joint is carried by the two segments it adjoins
        attached / 2
    }
}

/// Run the full detailing pipeline for one beam.
///
/// Deterministic and stateless: identical inputs yield identical outcomes,
/// so runs can be retried or executed concurrently for independent beams
/// without locking.
///
/// # Errors
///
/// `DetailError::InvalidInput` for malformed geometry. Constraint failures
/// never error; they surface in [`DetailingOutcome::diagnostics`].
pub fn detail_beam(input: &DetailingInput) -> DetailResult<DetailingOutcome> {
    input.validate()?;

    let mut diag = Diagnostics::new();

    let mut zones = input.prohibited_zones.clone();
    zones.sort_by(|a, b| a.start_m.total_cmp(&b.start_m).then(a.end_m.total_cmp(&b.end_m)));

    let mut top_segments: Vec<Segment> = Vec::new();
    for bar in &input.top_bars {
        let params = SegmentationParams {
            max_length_m: input.commercial_length_m,
            splice_length_m: input.splice_length_m,
            hook_length_m: bar_hook_length(bar),
            edge_cover_m: input.cover_m,
            beam_length_m: input.beam_length_m,
            prefer_previous_zone: input.prefer_previous_zone,
            splice_offset_ratio: 0.0,
            zones: &zones,
        };
        top_segments.extend(split_bar(bar, &params, &mut diag));
    }

    let mut bottom_segments: Vec<Segment> = Vec::new();
    for bar in &input.bottom_bars {
        let params = SegmentationParams {
            max_length_m: input.commercial_length_m,
            splice_length_m: input.splice_length_m,
            hook_length_m: bar_hook_length(bar),
            edge_cover_m: input.cover_m,
            beam_length_m: input.beam_length_m,
            prefer_previous_zone: false,
            splice_offset_ratio: input.splice_offset_ratio,
            zones: &zones,
        };
        bottom_segments.extend(split_bar(bar, &params, &mut diag));
    }

    coordinate_splices(
        &top_segments,
        &mut bottom_segments,
        &zones,
        input.beam_length_m,
        &mut diag,
    );

    Ok(DetailingOutcome {
        top_segments,
        bottom_segments,
        splice_length_m: input.splice_length_m,
        diagnostics: diag,
    })
}

/// Hook extension for a bar, from the unified mark/angle table; 0 when the
/// bar is unhooked or the combination is undefined.
fn bar_hook_length(bar: &Bar) -> f64 {
    bar.hook
        .and_then(|angle| bar.mark.hook_length(angle))
        .unwrap_or(0.0)
}
