//! Score computation.
//!
//! `total_possible` only counts categories the evaluator emitted, so a
//! partial evaluation is scored out of a smaller total rather than
//! penalised for the gaps; the gaps are listed in `missing_categories`.
//! Multipliers apply to the graduated rubric only, and the cap at
//! `total_possible` is applied after every multiplier.

use std::collections::HashSet;

use motivate_core::models::rubric::{RubricCategory, RubricVersion, category_key};
use motivate_core::models::score::{AppliedModifiers, ScoreBreakdown};
use tracing::{debug, info, warn};

use crate::bands::BandTable;
use crate::error::ScoringError;
use crate::modifiers::{EngagementTable, ScoreModifiers, TimingTable};
use crate::rubric::expected_categories;

#[derive(Debug, Clone)]
pub struct ScoreEngine {
    version: RubricVersion,
    bands: BandTable,
    engagement: EngagementTable,
    timing: TimingTable,
}

impl ScoreEngine {
    pub fn new(
        version: RubricVersion,
        bands: BandTable,
        engagement: EngagementTable,
        timing: TimingTable,
    ) -> Result<Self, ScoringError> {
        bands.validate()?;
        engagement.validate()?;
        timing.validate()?;
        Ok(Self {
            version,
            bands,
            engagement,
            timing,
        })
    }

    /// Engine with the default tables for `version`.
    pub fn with_defaults(version: RubricVersion) -> Self {
        let bands = match version {
            RubricVersion::Graduated => BandTable::graduated_default(),
            RubricVersion::Binary => BandTable::binary_default(),
        };
        Self {
            version,
            bands,
            engagement: EngagementTable::default(),
            timing: TimingTable::default(),
        }
    }

    pub fn version(&self) -> RubricVersion {
        self.version
    }

    pub fn score(
        &self,
        categories: &[RubricCategory],
        modifiers: Option<&ScoreModifiers>,
    ) -> ScoreBreakdown {
        if let Some(foreign) = categories
            .iter()
            .find(|c| c.status.version() != self.version)
        {
            warn!(
                category = %foreign.name,
                status = %foreign.status,
                engine = %self.version,
                "category status belongs to a different rubric version"
            );
        }

        let base_score: f64 = categories.iter().map(|c| c.earned_points).sum();
        let total_possible: f64 = categories.iter().map(|c| c.max_points).sum();

        let modifiers_applied = self.applied_modifiers(modifiers);
        let adjusted = base_score
            * modifiers_applied.engagement_multiplier.unwrap_or(1.0)
            * modifiers_applied.timing_multiplier.unwrap_or(1.0);
        let total_score = adjusted.min(total_possible).max(0.0);

        let percentage = if total_possible > 0.0 {
            100.0 * total_score / total_possible
        } else {
            0.0
        };
        let performance_band = self.bands.select(percentage);

        let present: HashSet<String> = categories.iter().map(|c| category_key(&c.name)).collect();
        let missing_categories: Vec<String> = expected_categories(self.version)
            .into_iter()
            .filter(|name| !present.contains(&category_key(name)))
            .map(str::to_string)
            .collect();

        info!(
            version = %self.version,
            base_score,
            total_score,
            total_possible,
            percentage,
            band = %performance_band.label,
            missing = missing_categories.len(),
            "feedback scored"
        );

        ScoreBreakdown {
            rubric_version: self.version,
            categories: categories.to_vec(),
            missing_categories,
            base_score,
            modifiers_applied,
            total_score,
            total_possible,
            percentage,
            performance_band,
        }
    }

    fn applied_modifiers(&self, modifiers: Option<&ScoreModifiers>) -> AppliedModifiers {
        let Some(modifiers) = modifiers else {
            return AppliedModifiers::default();
        };
        if self.version == RubricVersion::Binary {
            debug!("binary rubric ignores engagement and timing modifiers");
            return AppliedModifiers::default();
        }

        AppliedModifiers {
            engagement_multiplier: modifiers
                .engagement
                .as_ref()
                .map(|inputs| self.engagement.multiplier(inputs)),
            timing_multiplier: modifiers
                .mean_response_secs
                .and_then(|secs| self.timing.multiplier(secs)),
        }
    }
}
