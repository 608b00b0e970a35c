use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which rubric text format the evaluator produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RubricVersion {
    /// Legacy four-category scheme with partial credit.
    Graduated,
    /// Current six-category all-or-nothing scheme.
    Binary,
}

impl RubricVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            RubricVersion::Graduated => "graduated",
            RubricVersion::Binary => "binary",
        }
    }
}

impl fmt::Display for RubricVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RubricVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graduated" | "legacy" => Ok(RubricVersion::Graduated),
            "binary" | "current" => Ok(RubricVersion::Binary),
            other => Err(format!("unknown rubric version: {other}")),
        }
    }
}

/// Status an evaluator assigned to one rubric category.
///
/// `Met`, `PartiallyMet` and `NotMet` only appear in graduated feedback;
/// `MeetsCriteria` and `NeedsImprovement` only in binary feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RubricStatus {
    Met,
    PartiallyMet,
    NotMet,
    MeetsCriteria,
    NeedsImprovement,
}

impl RubricStatus {
    pub fn version(&self) -> RubricVersion {
        match self {
            RubricStatus::Met | RubricStatus::PartiallyMet | RubricStatus::NotMet => {
                RubricVersion::Graduated
            }
            RubricStatus::MeetsCriteria | RubricStatus::NeedsImprovement => RubricVersion::Binary,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RubricStatus::Met => "Met",
            RubricStatus::PartiallyMet => "Partially Met",
            RubricStatus::NotMet => "Not Met",
            RubricStatus::MeetsCriteria => "Meets Criteria",
            RubricStatus::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for RubricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One category line recognised in evaluator feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RubricCategory {
    pub name: String,
    pub max_points: f64,
    pub status: RubricStatus,
    pub earned_points: f64,
    /// Text after the status, verbatim.
    pub comment: String,
}

/// Normalise a category name for comparison: lowercase alphanumerics
/// only, so "Response Factor" and "response-factor" compare equal.
pub fn category_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
