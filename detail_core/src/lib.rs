//! # detail_core - Beam Reinforcement Detailing Engine
//!
//! `detail_core` is the computational heart of Despiece: it turns continuous
//! reinforcing bars into code-compliant shop-drawing data for concrete beams
//! per NSR-10 — splitting bars at commercial lengths, placing lap splices
//! clear of prohibited zones, coordinating top and bottom splices, assigning
//! drawing lanes, and planning stirrup confinement zones.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: detailing is a pure function of its inputs — identical
//!   inputs yield bit-identical results, safe to retry or run concurrently
//! - **JSON-First**: all inputs and outputs implement Serialize/Deserialize
//! - **Fail open**: constraint-satisfaction failures degrade to the least-bad
//!   valid geometry and surface as structured warnings, never as errors
//! - **Bounded**: every placement search carries an explicit iteration cap
//!
//! ## Quick Start
//!
//! ```rust
//! use detail_core::detailing::{detail_beam, DetailingInput};
//! use detail_core::detailing::bar::{Bar, BarPosition, Continuity};
//! use detail_core::nsr10::{lap_splice_length, BarMark, DissipationClass};
//!
//! let class = DissipationClass::Des;
//! let mark = BarMark::No5;
//! let input = DetailingInput {
//!     beam_length_m: 14.0,
//!     class,
//!     commercial_length_m: 12.0,
//!     splice_length_m: lap_splice_length(mark.diameter_mm(), class, 12.0),
//!     cover_m: 0.04,
//!     splice_offset_ratio: 0.0,
//!     prefer_previous_zone: false,
//!     top_bars: vec![Bar {
//!         id: "T5-C01".to_string(),
//!         mark,
//!         position: BarPosition::Top,
//!         continuity: Continuity::Continuous,
//!         start_m: 0.0,
//!         end_m: 14.0,
//!         hook: None,
//!         quantity: 2,
//!         development_length_m: 0.795,
//!         notes: None,
//!     }],
//!     bottom_bars: vec![],
//!     prohibited_zones: vec![],
//! };
//!
//! let outcome = detail_beam(&input).unwrap();
//! println!("{} splices", outcome.splice_count());
//! println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`nsr10`] - NSR-10 parameter tables (lap lengths, hooks, confinement)
//! - [`geometry`] - Validated beam geometry and prohibited zones
//! - [`detailing`] - The segmentation/coordination pipeline
//! - [`layout`] - Drawing lane and stack assignment
//! - [`stirrups`] - Confinement zone planning
//! - [`diagnostics`] - Structured warnings returned with every result
//! - [`project`] - Project container and cutting summaries
//! - [`file_io`] - Atomic `.dsp` saves with advisory locking
//! - [`errors`] - Structured error types

pub mod detailing;
pub mod diagnostics;
pub mod errors;
pub mod file_io;
pub mod geometry;
pub mod layout;
pub mod nsr10;
pub mod project;
pub mod stirrups;

// Re-export commonly used types at crate root for convenience
pub use detailing::{detail_beam, DetailingInput, DetailingOutcome};
pub use diagnostics::{Diagnostics, Warning, WarningCode};
pub use errors::{DetailError, DetailResult};
pub use file_io::{load_project, save_project, ProjectLock};
pub use project::{BeamProject, CuttingSummary, ProjectMetadata};
