//! Command implementations. Argument parsing and printing live in `main`.

use motivate_core::models::coverage::CoverageState;
use motivate_core::models::decision::EndDecision;
use motivate_core::models::rubric::RubricVersion;
use motivate_core::models::score::ScoreBreakdown;
use motivate_core::models::turn::Turn;
use motivate_export::render::{render_json, render_report};
use motivate_policy::coverage::CoverageTracker;
use motivate_policy::gate::EndGate;
use motivate_policy::session::SessionContext;
use motivate_scoring::modifiers::ScoreModifiers;
use motivate_scoring::score_feedback;
use serde::Serialize;

use crate::config::MotivateConfig;

/// Gate outcome after one turn of a replayed transcript.
#[derive(Debug, Clone, Serialize)]
pub struct GateStep {
    pub sequence_index: u32,
    pub coverage: CoverageState,
    pub allow_end: bool,
    pub reason: String,
    pub missing_requirements: Vec<String>,
}

/// Result of replaying a whole transcript through the tracker and gate.
#[derive(Debug, Clone)]
pub struct GateReplay {
    pub steps: Vec<GateStep>,
    /// Decision after the last turn, with the full trace.
    pub final_decision: Option<EndDecision>,
}

/// Replay `turns` in order, observing each one and evaluating the gate
/// after it, exactly as a live session would.
pub fn gate(config: &MotivateConfig, turns: &[Turn]) -> eyre::Result<GateReplay> {
    let gate = EndGate::from_config(&config.policy)?;
    let tracker = CoverageTracker::new(&config.policy.coverage)?;
    let mut session = SessionContext::new();
    tracing::info!(session_id = %session.id(), turns = turns.len(), "replaying transcript");

    let mut steps = Vec::with_capacity(turns.len());
    let mut final_decision = None;
    for turn in turns {
        let sequence_index = turn.sequence_index;
        let coverage = tracker.observe(&mut session, turn.clone())?;
        let decision = gate.evaluate(&mut session);

        steps.push(GateStep {
            sequence_index,
            coverage,
            allow_end: decision.allow_end,
            reason: decision.reason.clone(),
            missing_requirements: decision.missing_requirements.clone(),
        });
        final_decision = Some(decision);
    }

    Ok(GateReplay {
        steps,
        final_decision,
    })
}

/// Modifier inputs from an optional transcript and an optional explicit
/// latency. The explicit latency wins over one derived from timestamps.
pub fn modifiers(transcript: Option<&[Turn]>, mean_latency: Option<f64>) -> Option<ScoreModifiers> {
    match (transcript, mean_latency) {
        (None, None) => None,
        (Some(turns), latency) => {
            let mut modifiers = ScoreModifiers::from_transcript(turns);
            if latency.is_some() {
                modifiers.mean_response_secs = latency;
            }
            Some(modifiers)
        }
        (None, Some(secs)) => Some(ScoreModifiers {
            engagement: None,
            mean_response_secs: Some(secs),
        }),
    }
}

pub fn score(
    config: &MotivateConfig,
    feedback: &str,
    version: Option<RubricVersion>,
    modifiers: Option<&ScoreModifiers>,
) -> eyre::Result<ScoreBreakdown> {
    let version = version.unwrap_or(config.scoring.rubric_version);
    Ok(score_feedback(feedback, version, &config.scoring, modifiers)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

pub fn report(
    breakdown: &ScoreBreakdown,
    decision: Option<&EndDecision>,
    format: ReportFormat,
    template: Option<&str>,
) -> eyre::Result<String> {
    let rendered = match format {
        ReportFormat::Text => render_report(breakdown, decision, template)?,
        ReportFormat::Json => render_json(breakdown, decision)?,
    };
    Ok(rendered)
}

pub fn parse_transcript(contents: &str) -> eyre::Result<Vec<Turn>> {
    serde_json::from_str(contents).map_err(|e| eyre::eyre!("invalid transcript JSON: {e}"))
}
