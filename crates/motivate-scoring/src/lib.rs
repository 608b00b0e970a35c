//! motivate-scoring
//!
//! Turns evaluator feedback text into a bounded score. Parses rubric lines
//! for either rubric version, applies the optional engagement and timing
//! multipliers, caps the result at the rubric maximum, and picks a
//! performance band. Pure computation, no I/O.

pub mod bands;
pub mod config;
pub mod engine;
pub mod error;
pub mod modifiers;
pub mod rubric;

use motivate_core::models::rubric::RubricVersion;
use motivate_core::models::score::ScoreBreakdown;

use config::ScoringConfig;
use error::ScoringError;
use modifiers::ScoreModifiers;

/// Parse and score one piece of feedback with the given configuration.
pub fn score_feedback(
    feedback: &str,
    version: RubricVersion,
    config: &ScoringConfig,
    modifiers: Option<&ScoreModifiers>,
) -> Result<ScoreBreakdown, ScoringError> {
    let categories = config.parser().parse(feedback, version)?;
    let engine = config.engine(version)?;
    Ok(engine.score(&categories, modifiers))
}
