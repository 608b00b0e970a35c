use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::rubric::{RubricCategory, RubricVersion};

/// Multipliers that were actually applied to the base score.
///
/// `None` means the modifier was not supplied or does not apply to the
/// rubric version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedModifiers {
    pub engagement_multiplier: Option<f64>,
    pub timing_multiplier: Option<f64>,
}

/// A performance band selected from a band table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PerformanceBand {
    pub label: String,
    /// Lowest percentage that falls in this band. The floor band uses 0.
    pub lower_bound: f64,
}

/// The scored result of one feedback evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreBreakdown {
    pub rubric_version: RubricVersion,
    pub categories: Vec<RubricCategory>,
    /// Expected categories the evaluator did not emit. They are excluded
    /// from `total_possible`.
    pub missing_categories: Vec<String>,
    pub base_score: f64,
    pub modifiers_applied: AppliedModifiers,
    /// Never exceeds `total_possible`.
    pub total_score: f64,
    pub total_possible: f64,
    pub percentage: f64,
    pub performance_band: PerformanceBand,
}
