use motivate_core::models::score::PerformanceBand;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// One row of a band table: percentages at or above `min_percentage`
/// earn `label`, unless a higher row already matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandThreshold {
    pub min_percentage: f64,
    pub label: String,
}

/// Ordered percentage → label table. Rows may be listed in any order;
/// selection always walks them from the highest bound down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub thresholds: Vec<BandThreshold>,
    /// Label for percentages below every threshold.
    pub floor_label: String,
}

impl BandTable {
    /// Bands for the 40-point binary rubric.
    pub fn binary_default() -> Self {
        Self::from_pairs(
            &[
                (90.0, "excellent"),
                (75.0, "strong"),
                (60.0, "satisfactory"),
                (40.0, "basic"),
            ],
            "needs significant improvement",
        )
    }

    /// Bands for the 30-point graduated rubric.
    pub fn graduated_default() -> Self {
        Self::from_pairs(
            &[
                (90.0, "excellent"),
                (80.0, "proficient"),
                (70.0, "developing"),
                (60.0, "emerging"),
            ],
            "needs significant improvement",
        )
    }

    pub fn from_pairs(pairs: &[(f64, &str)], floor_label: &str) -> Self {
        Self {
            thresholds: pairs
                .iter()
                .map(|(min, label)| BandThreshold {
                    min_percentage: *min,
                    label: label.to_string(),
                })
                .collect(),
            floor_label: floor_label.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.floor_label.trim().is_empty() {
            return Err(ScoringError::InvalidBandTable(
                "floor label must not be empty".to_string(),
            ));
        }

        let mut bounds = Vec::with_capacity(self.thresholds.len());
        for t in &self.thresholds {
            if !t.min_percentage.is_finite() || t.min_percentage <= 0.0 || t.min_percentage > 100.0
            {
                return Err(ScoringError::InvalidBandTable(format!(
                    "bound {} for '{}' must be in (0, 100]",
                    t.min_percentage, t.label
                )));
            }
            if t.label.trim().is_empty() {
                return Err(ScoringError::InvalidBandTable(format!(
                    "bound {} has an empty label",
                    t.min_percentage
                )));
            }
            if bounds.contains(&t.min_percentage) {
                return Err(ScoringError::InvalidBandTable(format!(
                    "bound {} appears more than once",
                    t.min_percentage
                )));
            }
            bounds.push(t.min_percentage);
        }
        Ok(())
    }

    /// Highest band whose bound `percentage` reaches; first match wins.
    pub fn select(&self, percentage: f64) -> PerformanceBand {
        let mut ordered: Vec<&BandThreshold> = self.thresholds.iter().collect();
        ordered.sort_by(|a, b| b.min_percentage.total_cmp(&a.min_percentage));

        ordered
            .into_iter()
            .find(|t| percentage >= t.min_percentage)
            .map(|t| PerformanceBand {
                label: t.label.clone(),
                lower_bound: t.min_percentage,
            })
            .unwrap_or_else(|| PerformanceBand {
                label: self.floor_label.clone(),
                lower_bound: 0.0,
            })
    }
}
