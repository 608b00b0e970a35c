//! Engagement and timing multipliers for the graduated rubric.
//!
//! Both are table-driven so the band boundaries live in configuration:
//!
//! - engagement: each input (turn count, average student message length,
//!   student question count) earns the largest bonus among the bands it
//!   reaches; the multiplier is `1 + sum of bonuses`, capped at
//!   [`MAX_ENGAGEMENT_MULTIPLIER`]. Non-decreasing in every input.
//! - timing: the mean student response latency falls into the first band
//!   whose upper bound it is below, with one ideal band carrying the
//!   largest multiplier. Latencies past the last band get the floor.

use motivate_core::models::turn::{Role, Turn};
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

pub const MIN_ENGAGEMENT_MULTIPLIER: f64 = 1.0;
pub const MAX_ENGAGEMENT_MULTIPLIER: f64 = 1.3;
pub const MIN_TIMING_MULTIPLIER: f64 = 0.9;
pub const MAX_TIMING_MULTIPLIER: f64 = 1.2;

/// Caller-supplied inputs for the optional multipliers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreModifiers {
    pub engagement: Option<EngagementInputs>,
    /// Mean seconds between a patient turn and the student's reply.
    pub mean_response_secs: Option<f64>,
}

impl ScoreModifiers {
    /// Derive both inputs from a transcript. Timing is only present when
    /// the turns carry timestamps.
    pub fn from_transcript(turns: &[Turn]) -> Self {
        Self {
            engagement: Some(EngagementInputs::from_transcript(turns)),
            mean_response_secs: mean_response_secs(turns),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementInputs {
    pub turn_count: u32,
    /// Mean length of student messages, in characters.
    pub average_message_length: f64,
    /// Student turns that ask at least one question.
    pub question_count: u32,
}

impl EngagementInputs {
    pub fn from_transcript(turns: &[Turn]) -> Self {
        let student: Vec<&Turn> = turns.iter().filter(|t| t.role == Role::Student).collect();
        let total_chars: usize = student.iter().map(|t| t.text.trim().chars().count()).sum();
        let average_message_length = if student.is_empty() {
            0.0
        } else {
            total_chars as f64 / student.len() as f64
        };

        Self {
            turn_count: saturating_count(turns.len()),
            average_message_length,
            question_count: saturating_count(
                student.iter().filter(|t| t.text.contains('?')).count(),
            ),
        }
    }
}

fn saturating_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Mean latency from each patient turn to the student turn right after
/// it, over pairs where both carry timestamps. Pairs running backwards in
/// time are ignored.
pub fn mean_response_secs(turns: &[Turn]) -> Option<f64> {
    let latencies: Vec<f64> = turns
        .windows(2)
        .filter_map(|pair| {
            let (prompt, reply) = (&pair[0], &pair[1]);
            if prompt.role != Role::Patient || reply.role != Role::Student {
                return None;
            }
            let secs = reply
                .sent_at?
                .duration_since(prompt.sent_at?)
                .as_secs_f64();
            (secs >= 0.0).then_some(secs)
        })
        .collect();

    if latencies.is_empty() {
        None
    } else {
        Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
    }
}

/// Inputs at or above `at_least` earn `bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusBand {
    pub at_least: f64,
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementTable {
    pub turn_bands: Vec<BonusBand>,
    pub length_bands: Vec<BonusBand>,
    pub question_bands: Vec<BonusBand>,
    pub max_multiplier: f64,
}

impl Default for EngagementTable {
    fn default() -> Self {
        Self {
            turn_bands: bands(&[(10.0, 0.05), (15.0, 0.10), (20.0, 0.15)]),
            length_bands: bands(&[(50.0, 0.05), (100.0, 0.10)]),
            question_bands: bands(&[(3.0, 0.03), (6.0, 0.05)]),
            max_multiplier: MAX_ENGAGEMENT_MULTIPLIER,
        }
    }
}

impl EngagementTable {
    pub fn multiplier(&self, inputs: &EngagementInputs) -> f64 {
        let bonus = bonus_for(&self.turn_bands, f64::from(inputs.turn_count))
            + bonus_for(&self.length_bands, inputs.average_message_length)
            + bonus_for(&self.question_bands, f64::from(inputs.question_count));
        (MIN_ENGAGEMENT_MULTIPLIER + bonus).clamp(MIN_ENGAGEMENT_MULTIPLIER, self.max_multiplier)
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if !(MIN_ENGAGEMENT_MULTIPLIER..=MAX_ENGAGEMENT_MULTIPLIER).contains(&self.max_multiplier) {
            return Err(ScoringError::InvalidModifierTable(format!(
                "engagement cap {} must be within [{MIN_ENGAGEMENT_MULTIPLIER}, {MAX_ENGAGEMENT_MULTIPLIER}]",
                self.max_multiplier
            )));
        }
        for (name, table) in [
            ("turn", &self.turn_bands),
            ("length", &self.length_bands),
            ("question", &self.question_bands),
        ] {
            for band in table {
                if !band.at_least.is_finite() || !band.bonus.is_finite() || band.bonus < 0.0 {
                    return Err(ScoringError::InvalidModifierTable(format!(
                        "{name} band {band:?} must have finite values and a non-negative bonus"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Latencies below `below_secs` (and at or above the previous band's
/// bound) get `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingBand {
    pub below_secs: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTable {
    pub bands: Vec<TimingBand>,
    /// Multiplier for latencies past the last band.
    pub beyond_multiplier: f64,
}

impl Default for TimingTable {
    fn default() -> Self {
        let bands = [(5.0, 1.0), (10.0, 1.1), (30.0, 1.2), (60.0, 1.1), (120.0, 1.0)]
            .iter()
            .map(|&(below_secs, multiplier)| TimingBand {
                below_secs,
                multiplier,
            })
            .collect();
        Self {
            bands,
            beyond_multiplier: MIN_TIMING_MULTIPLIER,
        }
    }
}

impl TimingTable {
    /// `None` for a negative or non-finite latency.
    pub fn multiplier(&self, mean_response_secs: f64) -> Option<f64> {
        if !mean_response_secs.is_finite() || mean_response_secs < 0.0 {
            return None;
        }
        let multiplier = self
            .bands
            .iter()
            .find(|b| mean_response_secs < b.below_secs)
            .map_or(self.beyond_multiplier, |b| b.multiplier);
        Some(multiplier.clamp(MIN_TIMING_MULTIPLIER, MAX_TIMING_MULTIPLIER))
    }

    /// Bounds must increase, every multiplier must sit in the allowed range,
    /// and the multipliers must rise to a single peak and then fall.
    pub fn validate(&self) -> Result<(), ScoringError> {
        let invalid = |msg: String| Err(ScoringError::InvalidModifierTable(msg));

        let mut multipliers: Vec<f64> = self.bands.iter().map(|b| b.multiplier).collect();
        multipliers.push(self.beyond_multiplier);
        if let Some(m) = multipliers
            .iter()
            .find(|m| !(MIN_TIMING_MULTIPLIER..=MAX_TIMING_MULTIPLIER).contains(*m))
        {
            return invalid(format!(
                "timing multiplier {m} must be within [{MIN_TIMING_MULTIPLIER}, {MAX_TIMING_MULTIPLIER}]"
            ));
        }

        if self
            .bands
            .windows(2)
            .any(|w| !(w[0].below_secs < w[1].below_secs))
        {
            return invalid("timing band bounds must strictly increase".to_string());
        }
        if self.bands.iter().any(|b| !b.below_secs.is_finite() || b.below_secs <= 0.0) {
            return invalid("timing band bounds must be positive and finite".to_string());
        }

        let peak = multipliers.iter().copied().fold(f64::MIN, f64::max);
        let peaks = multipliers.iter().filter(|m| **m == peak).count();
        let peak_at = multipliers.iter().position(|m| *m == peak).unwrap_or(0);
        let rising = multipliers[..=peak_at].windows(2).all(|w| w[0] <= w[1]);
        let falling = multipliers[peak_at..].windows(2).all(|w| w[0] >= w[1]);
        if peaks != 1 || !rising || !falling {
            return invalid(format!(
                "timing multipliers {multipliers:?} must rise to a single ideal band and then fall"
            ));
        }

        Ok(())
    }
}

fn bands(pairs: &[(f64, f64)]) -> Vec<BonusBand> {
    pairs
        .iter()
        .map(|&(at_least, bonus)| BonusBand { at_least, bonus })
        .collect()
}

fn bonus_for(bands: &[BonusBand], value: f64) -> f64 {
    bands
        .iter()
        .filter(|b| value >= b.at_least)
        .map(|b| b.bonus)
        .fold(0.0, f64::max)
}
