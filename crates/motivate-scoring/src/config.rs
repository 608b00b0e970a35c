use motivate_core::models::rubric::RubricVersion;
use serde::{Deserialize, Serialize};

use crate::bands::BandTable;
use crate::engine::ScoreEngine;
use crate::error::ScoringError;
use crate::modifiers::{EngagementTable, TimingTable};
use crate::rubric::{DEFAULT_GRADUATED_POINTS, DEFAULT_PARTIAL_CREDIT, RubricParser};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Format the evaluator is prompted to produce.
    pub rubric_version: RubricVersion,
    pub graduated_points_per_category: f64,
    /// Fraction of a graduated category's points earned by "Partially Met".
    pub graduated_partial_credit: f64,
    pub binary_bands: BandTable,
    pub graduated_bands: BandTable,
    pub engagement: EngagementTable,
    pub timing: TimingTable,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rubric_version: RubricVersion::Binary,
            graduated_points_per_category: DEFAULT_GRADUATED_POINTS,
            graduated_partial_credit: DEFAULT_PARTIAL_CREDIT,
            binary_bands: BandTable::binary_default(),
            graduated_bands: BandTable::graduated_default(),
            engagement: EngagementTable::default(),
            timing: TimingTable::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        let points = self.graduated_points_per_category;
        if !points.is_finite() || points <= 0.0 {
            return Err(ScoringError::InvalidRubric(format!(
                "graduated points per category must be positive, got {points}"
            )));
        }
        let credit = self.graduated_partial_credit;
        if !(0.0..=1.0).contains(&credit) {
            return Err(ScoringError::InvalidRubric(format!(
                "partial credit must be within [0, 1], got {credit}"
            )));
        }
        self.binary_bands.validate()?;
        self.graduated_bands.validate()?;
        self.engagement.validate()?;
        self.timing.validate()
    }

    pub fn bands_for(&self, version: RubricVersion) -> &BandTable {
        match version {
            RubricVersion::Graduated => &self.graduated_bands,
            RubricVersion::Binary => &self.binary_bands,
        }
    }

    pub fn parser(&self) -> RubricParser {
        RubricParser::new(
            self.graduated_points_per_category,
            self.graduated_partial_credit,
        )
    }

    pub fn engine(&self, version: RubricVersion) -> Result<ScoreEngine, ScoringError> {
        ScoreEngine::new(
            version,
            self.bands_for(version).clone(),
            self.engagement.clone(),
            self.timing.clone(),
        )
    }
}
