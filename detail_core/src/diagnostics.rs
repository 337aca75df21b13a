//! # Detailing Diagnostics
//!
//! Structured warnings collected during a detailing run and returned inside
//! the result. The engine is fail-open: when a placement constraint cannot be
//! satisfied it keeps the least-bad geometrically valid answer and records a
//! warning here, so callers (and tests) can inspect exactly what degraded
//! instead of scraping a process-wide log.

use serde::{Deserialize, Serialize};

/// Machine-readable warning categories.
///
/// Each code corresponds to one degradation path in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningCode {
    /// Splice length is zero/negative or >= the commercial max length;
    /// segmentation was skipped and the bar returned unsplit.
    SpliceExceedsMaxLength,

    /// Hook deductions consumed the entire usable piece length; the full
    /// commercial length was used instead.
    HooksConsumeMaxLength,

    /// A splice still overlaps a prohibited zone after all shift attempts.
    SpliceInProhibitedZone,

    /// The segmentation loop hit its iteration cap; the partial result
    /// was kept.
    SegmentationCapReached,

    /// No clear corridor was found for a bottom bar's first splice; the
    /// naive position was kept.
    NoSafeCorridorFound,

    /// Cross-bar coordination could not find a conflict-free position for a
    /// bottom splice; the original (possibly co-located) position was kept.
    CoordinationUnresolved,
}

impl WarningCode {
    /// Short code string for logs and UI badges
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::SpliceExceedsMaxLength => "SPLICE_EXCEEDS_MAX_LENGTH",
            WarningCode::HooksConsumeMaxLength => "HOOKS_CONSUME_MAX_LENGTH",
            WarningCode::SpliceInProhibitedZone => "SPLICE_IN_PROHIBITED_ZONE",
            WarningCode::SegmentationCapReached => "SEGMENTATION_CAP_REACHED",
            WarningCode::NoSafeCorridorFound => "NO_SAFE_CORRIDOR_FOUND",
            WarningCode::CoordinationUnresolved => "COORDINATION_UNRESOLVED",
        }
    }
}

/// One recorded degradation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    /// Machine-readable category
    pub code: WarningCode,

    /// Identifier of the bar the warning refers to, when applicable
    pub bar_id: Option<String>,

    /// Human-readable description of what degraded and how
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.bar_id {
            Some(id) => write!(f, "[{}] bar {}: {}", self.code.as_str(), id, self.message),
            None => write!(f, "[{}] {}", self.code.as_str(), self.message),
        }
    }
}

/// Ordered collection of warnings from one detailing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Record a warning for a specific bar
    pub fn warn(&mut self, code: WarningCode, bar_id: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Warning {
            code,
            bar_id: Some(bar_id.into()),
            message: message.into(),
        });
    }

    /// Record a warning not tied to a single bar
    pub fn warn_global(&mut self, code: WarningCode, message: impl Into<String>) {
        self.warnings.push(Warning {
            code,
            bar_id: None,
            message: message.into(),
        });
    }

    /// True when nothing degraded
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of recorded warnings
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// True when at least one warning with the given code was recorded
    pub fn has(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// All warnings for a specific bar
    pub fn for_bar<'a>(&'a self, bar_id: &'a str) -> impl Iterator<Item = &'a Warning> {
        self.warnings
            .iter()
            .filter(move |w| w.bar_id.as_deref() == Some(bar_id))
    }

    /// Iterate over all warnings in recording order
    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.warnings.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.iter()
    }
}
