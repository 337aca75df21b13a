//! # NSR-10 Detailing Parameters
//!
//! Lookup tables and formulas for reinforcement detailing per NSR-10
//! (Reglamento Colombiano de Construcción Sismo Resistente), Título C.
//!
//! ## Overview
//!
//! Lap splice lengths combine three floors:
//!
//! ```text
//! L_splice = max(30·db, Ld(class) × k(L_commercial), 0.30 m)
//! Ld(class) = base(class) · db        base: DES 50, DMO 40, DMI 30
//! k(L)      = 6 m → 1.3, 9 m → 1.4, 12 m → 1.5
//! ```
//!
//! ## Parameter Summary
//!
//! | Parameter          | Description                        | Typical Values |
//! |--------------------|------------------------------------|----------------|
//! | k (lap factor)     | Splice factor by stock length      | 1.3 - 1.5      |
//! | Ld                 | Development length                 | 30db - 50db    |
//! | s confined         | Stirrup spacing near supports      | 0.10 - 0.25 m  |
//! | s midspan          | Stirrup spacing away from supports | ≤ 0.30 m       |
//! | Hook extension     | By bar mark and bend angle         | 0.075 - 1.03 m |
//!
//! ## Reference
//!
//! NSR-10 Título C, Chapters C.12 (development and splices) and C.21
//! (seismic detailing requirements).

use serde::{Deserialize, Serialize};

use crate::errors::DetailError;

// ============================================================================
// NSR-10 Code Section References
// ============================================================================

/// NSR-10 section references for detailing rules.
///
/// These constants provide traceable references to the Colombian
/// seismic-resistant construction code (NSR-10, Título C).
pub mod nsr10_ref {
    /// Development length of deformed bars in tension
    pub const DEVELOPMENT: &str = "NSR-10 C.12.2";
    /// Class B lap splices of deformed bars
    pub const LAP_SPLICE: &str = "NSR-10 C.12.15";
    /// Standard hook geometry
    pub const HOOKS: &str = "NSR-10 C.7.1";
    /// Confinement requirements, special energy dissipation (DES)
    pub const CONFINEMENT_DES: &str = "NSR-10 C.21.5";
    /// Confinement requirements, moderate energy dissipation (DMO)
    pub const CONFINEMENT_DMO: &str = "NSR-10 C.21.3";
    /// Confinement requirements, minimal energy dissipation (DMI)
    pub const CONFINEMENT_DMI: &str = "NSR-10 C.21.2";
}

/// Absolute minimum lap splice length in meters
pub const MIN_LAP_SPLICE_M: f64 = 0.30;

/// Minimum lap splice length expressed in bar diameters
pub const MIN_LAP_DIAMETERS: f64 = 30.0;

/// Minimum clear distance between consecutive splices on one bar run (m)
pub const MIN_SPLICE_SEPARATION_M: f64 = 1.5;

// ============================================================================
// Energy-Dissipation Class
// ============================================================================

/// Energy-dissipation capacity class per NSR-10 Título A/C.
///
/// Determines development lengths and confinement severity. DES is the
/// strictest (high seismic zones), DMI the most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DissipationClass {
    /// Special energy dissipation: Ld = 50·db, tightest confinement
    #[serde(rename = "DES")]
    #[default]
    Des,

    /// Moderate energy dissipation: Ld = 40·db
    #[serde(rename = "DMO")]
    Dmo,

    /// Minimal energy dissipation: Ld = 30·db, loosest confinement
    #[serde(rename = "DMI")]
    Dmi,
}

impl DissipationClass {
    /// All classes for UI selection
    pub const ALL: [DissipationClass; 3] = [
        DissipationClass::Des,
        DissipationClass::Dmo,
        DissipationClass::Dmi,
    ];

    /// Development length base multiplier (diameters)
    pub fn development_base(&self) -> f64 {
        match self {
            DissipationClass::Des => 50.0,
            DissipationClass::Dmo => 40.0,
            DissipationClass::Dmi => 30.0,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            DissipationClass::Des => "DES - Special energy dissipation",
            DissipationClass::Dmo => "DMO - Moderate energy dissipation",
            DissipationClass::Dmi => "DMI - Minimal energy dissipation",
        }
    }

    /// NSR-10 section governing this class's confinement requirements
    pub fn confinement_reference(&self) -> &'static str {
        match self {
            DissipationClass::Des => nsr10_ref::CONFINEMENT_DES,
            DissipationClass::Dmo => nsr10_ref::CONFINEMENT_DMO,
            DissipationClass::Dmi => nsr10_ref::CONFINEMENT_DMI,
        }
    }
}

impl std::fmt::Display for DissipationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Hook Angle
// ============================================================================

/// Standard hook bend angle at a bar end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookAngle {
    /// 90° bend
    #[serde(rename = "90")]
    Deg90,

    /// 135° seismic hook (stirrups, closed ties)
    #[serde(rename = "135")]
    Deg135,

    /// 180° standard hook
    #[serde(rename = "180")]
    Deg180,
}

impl HookAngle {
    /// All hook angles for UI selection
    pub const ALL: [HookAngle; 3] = [HookAngle::Deg90, HookAngle::Deg135, HookAngle::Deg180];

    /// Bend angle in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            HookAngle::Deg90 => 90,
            HookAngle::Deg135 => 135,
            HookAngle::Deg180 => 180,
        }
    }
}

impl std::fmt::Display for HookAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

// ============================================================================
// Commercial Bar Marks
// ============================================================================

/// Commercial reinforcing bar marks (eighth-inch series).
///
/// Serializes to the familiar `"#5"` wire format. Owns the hook-extension
/// table, which is the single source of truth for hook lengths in the crate
/// (the layout engine looks hooks up here rather than carrying its own copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BarMark {
    #[serde(rename = "#2")]
    No2,
    #[serde(rename = "#3")]
    No3,
    #[serde(rename = "#4")]
    No4,
    #[serde(rename = "#5")]
    No5,
    #[serde(rename = "#6")]
    No6,
    #[serde(rename = "#7")]
    No7,
    #[serde(rename = "#8")]
    No8,
    #[serde(rename = "#9")]
    No9,
    #[serde(rename = "#10")]
    No10,
    #[serde(rename = "#11")]
    No11,
    #[serde(rename = "#14")]
    No14,
    #[serde(rename = "#18")]
    No18,
}

impl BarMark {
    /// All marks for UI selection
    pub const ALL: [BarMark; 12] = [
        BarMark::No2,
        BarMark::No3,
        BarMark::No4,
        BarMark::No5,
        BarMark::No6,
        BarMark::No7,
        BarMark::No8,
        BarMark::No9,
        BarMark::No10,
        BarMark::No11,
        BarMark::No14,
        BarMark::No18,
    ];

    /// Mark string as printed on drawings (e.g., `"#5"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            BarMark::No2 => "#2",
            BarMark::No3 => "#3",
            BarMark::No4 => "#4",
            BarMark::No5 => "#5",
            BarMark::No6 => "#6",
            BarMark::No7 => "#7",
            BarMark::No8 => "#8",
            BarMark::No9 => "#9",
            BarMark::No10 => "#10",
            BarMark::No11 => "#11",
            BarMark::No14 => "#14",
            BarMark::No18 => "#18",
        }
    }

    /// Nominal bar diameter in millimeters
    pub fn diameter_mm(&self) -> f64 {
        match self {
            BarMark::No2 => 6.4,
            BarMark::No3 => 9.5,
            BarMark::No4 => 12.7,
            BarMark::No5 => 15.9,
            BarMark::No6 => 19.1,
            BarMark::No7 => 22.2,
            BarMark::No8 => 25.4,
            BarMark::No9 => 28.7,
            BarMark::No10 => 32.3,
            BarMark::No11 => 35.8,
            BarMark::No14 => 43.0,
            BarMark::No18 => 57.3,
        }
    }

    /// Hook extension in meters for this mark and bend angle.
    ///
    /// Returns `None` where the combination is undefined (135° hooks are not
    /// fabricated above #8); callers skip the hook in that case. Values are
    /// independent of any drawing scale.
    pub fn hook_length(&self, angle: HookAngle) -> Option<f64> {
        use HookAngle::{Deg135, Deg180, Deg90};
        match (self, angle) {
            (BarMark::No2, Deg90) => Some(0.10),
            (BarMark::No2, Deg180) => Some(0.080),
            (BarMark::No2, Deg135) => Some(0.075),
            (BarMark::No3, Deg90) => Some(0.15),
            (BarMark::No3, Deg180) => Some(0.130),
            // 0.080 per the corrected stirrup-hook table (was 0.095)
            (BarMark::No3, Deg135) => Some(0.080),
            (BarMark::No4, Deg90) => Some(0.20),
            (BarMark::No4, Deg180) => Some(0.150),
            (BarMark::No4, Deg135) => Some(0.127),
            (BarMark::No5, Deg90) => Some(0.25),
            (BarMark::No5, Deg180) => Some(0.180),
            (BarMark::No5, Deg135) => Some(0.159),
            (BarMark::No6, Deg90) => Some(0.30),
            (BarMark::No6, Deg180) => Some(0.210),
            (BarMark::No6, Deg135) => Some(0.191),
            (BarMark::No7, Deg90) => Some(0.36),
            (BarMark::No7, Deg180) => Some(0.250),
            (BarMark::No7, Deg135) => Some(0.222),
            (BarMark::No8, Deg90) => Some(0.41),
            (BarMark::No8, Deg180) => Some(0.300),
            (BarMark::No8, Deg135) => Some(0.254),
            (BarMark::No9, Deg90) => Some(0.49),
            (BarMark::No9, Deg180) => Some(0.340),
            (BarMark::No10, Deg90) => Some(0.54),
            (BarMark::No10, Deg180) => Some(0.400),
            (BarMark::No11, Deg90) => Some(0.59),
            (BarMark::No11, Deg180) => Some(0.430),
            (BarMark::No14, Deg90) => Some(0.80),
            (BarMark::No14, Deg180) => Some(0.445),
            (BarMark::No18, Deg90) => Some(1.03),
            (BarMark::No18, Deg180) => Some(0.572),
            // 135° hooks undefined above #8
            (_, Deg135) => None,
        }
    }
}

impl std::fmt::Display for BarMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BarMark {
    type Err = DetailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BarMark::ALL
            .iter()
            .copied()
            .find(|mark| mark.as_str() == s.trim())
            .ok_or_else(|| {
                DetailError::invalid_input("bar_mark", s, "Unknown commercial bar mark")
            })
    }
}

// ============================================================================
// Lap Splice and Development Length
// ============================================================================

/// Lap splice factor by commercial stock length.
///
/// Longer stock lengths carry a higher factor; unmapped lengths fall back
/// to the 6 m factor.
pub fn lap_factor(commercial_length_m: f64) -> f64 {
    match commercial_length_m.round() as i64 {
        6 => 1.3,
        9 => 1.4,
        12 => 1.5,
        _ => 1.3,
    }
}

/// Development length in meters for a bar diameter under a dissipation class.
///
/// `Ld = base(class) · db`, with `db` in meters.
pub fn development_length(class: DissipationClass, diameter_mm: f64) -> f64 {
    class.development_base() * diameter_mm / 1000.0
}

/// Class B lap splice length in meters.
///
/// The governing value of three floors: 30 diameters, the factored
/// development length, and the 0.30 m absolute minimum.
///
/// # Example
///
/// ```rust
/// use detail_core::nsr10::{lap_splice_length, DissipationClass};
///
/// // 20 mm bar, DES, 12 m stock: max(0.60, 1.0 × 1.5, 0.30) = 1.5 m
/// let lap = lap_splice_length(20.0, DissipationClass::Des, 12.0);
/// assert!((lap - 1.5).abs() < 1e-9);
/// ```
pub fn lap_splice_length(
    diameter_mm: f64,
    class: DissipationClass,
    commercial_length_m: f64,
) -> f64 {
    let min_by_diameter = MIN_LAP_DIAMETERS * diameter_mm / 1000.0;
    let factored = development_length(class, diameter_mm) * lap_factor(commercial_length_m);
    min_by_diameter.max(factored).max(MIN_LAP_SPLICE_M)
}

// ============================================================================
// Confinement Zone Parameters
// ============================================================================

/// Stirrup spacing and confinement zone extents for one beam section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfinementParams {
    /// Stirrup spacing inside the confinement zone (m)
    pub spacing_confined_m: f64,

    /// Length of each confinement zone measured from the support face (m)
    pub zone_length_m: f64,

    /// Stirrup spacing outside the confinement zones (m)
    pub spacing_midspan_m: f64,
}

/// Confinement zone parameters by class, section depth and stirrup diameter.
///
/// Each spacing is the `min` of a depth-proportional term, a
/// diameter-proportional term and an absolute cap; caps and zone-length
/// multipliers tighten from DMI to DES.
pub fn confinement_zone(
    class: DissipationClass,
    section_height_m: f64,
    stirrup_diameter_mm: f64,
) -> ConfinementParams {
    let h = section_height_m;
    let d = stirrup_diameter_mm / 1000.0;
    let spacing_midspan_m = (0.5 * h).min(24.0 * d).min(0.30);

    match class {
        DissipationClass::Des => ConfinementParams {
            spacing_confined_m: (0.25 * h).min(8.0 * d).min(0.15),
            zone_length_m: (1.5 * h).max(0.6),
            spacing_midspan_m,
        },
        DissipationClass::Dmo => ConfinementParams {
            spacing_confined_m: (0.25 * h).min(8.0 * d).min(0.20),
            zone_length_m: (1.0 * h).max(0.45),
            spacing_midspan_m,
        },
        DissipationClass::Dmi => ConfinementParams {
            spacing_confined_m: (0.25 * h).min(8.0 * d).min(0.25),
            zone_length_m: (0.5 * h).max(0.30),
            spacing_midspan_m,
        },
    }
}

// ============================================================================
// Coarse Splice Interval Planner
// ============================================================================

/// Plan lap splice intervals along a continuous run, without zone awareness.
///
/// This is the quick engine-level placement used for schedule estimates and
/// cut previews: `ceil(L / L_commercial) − 1` splices, the first ending at
/// the commercial length, successors separated by
/// [`MIN_SPLICE_SEPARATION_M`], each tail-clamped into the remaining length.
/// The full segmentation engine ([`crate::detailing`]) supersedes this when
/// prohibited zones are in play.
///
/// # Example
///
/// ```rust
/// use detail_core::nsr10::{splice_intervals, DissipationClass};
///
/// let laps = splice_intervals(12.175, 12.0, 20.0, DissipationClass::Des);
/// assert_eq!(laps.len(), 1);
/// assert!((laps[0].0 - 10.5).abs() < 1e-9);
/// assert!((laps[0].1 - 12.0).abs() < 1e-9);
/// ```
pub fn splice_intervals(
    total_length_m: f64,
    commercial_length_m: f64,
    diameter_mm: f64,
    class: DissipationClass,
) -> Vec<(f64, f64)> {
    if commercial_length_m <= 0.0 || total_length_m <= commercial_length_m {
        return Vec::new();
    }

    let lap = lap_splice_length(diameter_mm, class, commercial_length_m);
    let count = (total_length_m / commercial_length_m).ceil() as usize - 1;

    let mut intervals: Vec<(f64, f64)> = Vec::with_capacity(count);
    let mut remaining = total_length_m;

    for _ in 0..count {
        let mut start = match intervals.last() {
            None => commercial_length_m - lap,
            Some(&(_, previous_end)) => previous_end + MIN_SPLICE_SEPARATION_M,
        };
        let mut end = start + lap;

        if end > remaining {
            let shift = end - remaining;
            start -= shift;
            end -= shift;
        }

        intervals.push((start, end));
        remaining -= commercial_length_m - lap;
    }

    intervals
}
