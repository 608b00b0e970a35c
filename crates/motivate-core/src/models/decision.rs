use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The two states of the end gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum GateState {
    Gathering,
    Ready,
}

/// Outcome of a single end-gate evaluation.
///
/// `missing_requirements` always starts with the undemonstrated technique
/// categories; when coverage is complete it names the later check that
/// failed (`explicit_confirmation` or `end_token`), if any.
///
/// `trace` is a snapshot of the session's full gate trace at the moment
/// of evaluation, oldest entry first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EndDecision {
    pub allow_end: bool,
    pub reason: String,
    pub missing_requirements: Vec<String>,
    pub trace: Vec<String>,
}

impl EndDecision {
    pub fn state(&self) -> GateState {
        if self.allow_end {
            GateState::Ready
        } else {
            GateState::Gathering
        }
    }
}
