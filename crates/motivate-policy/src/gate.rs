//! The end gate: decides after each turn whether a session may finish.
//!
//! Checks run in a fixed order and the first failure decides the outcome:
//!
//! 1. the latest turn index has reached the minimum turn threshold;
//! 2. every MI technique category has been demonstrated;
//! 3. the student's latest turn explicitly confirms ending (an ambiguous
//!    courtesy like "thanks" never counts);
//! 4. the patient's latest turn, sent after that confirmation, carries the
//!    end token.
//!
//! Every check performed is appended to the session trace, passing or not.
//! The gate only reports; acting on `allow_end` is the caller's job. Any
//! missing input (no turns, no student turn, no patient reply) resolves to
//! CONTINUE.

use motivate_core::models::decision::EndDecision;
use motivate_core::models::turn::Role;
use tracing::{debug, info};

use crate::config::PolicyConfig;
use crate::coverage::CoverageTracker;
use crate::error::PolicyError;
use crate::phrase::PhraseMatcher;
use crate::session::SessionContext;

pub const REASON_AMBIGUOUS: &str = "ambiguous phrase detected, awaiting explicit confirmation";
pub const REASON_NO_CONFIRMATION: &str = "no explicit confirmation from student";
pub const REASON_NO_END_TOKEN: &str = "end token not present in assistant message";
pub const REASON_ALLOW: &str = "all end conditions met";

pub const REQUIREMENT_CONFIRMATION: &str = "explicit_confirmation";
pub const REQUIREMENT_END_TOKEN: &str = "end_token";

#[derive(Debug, Clone)]
pub struct EndGate {
    min_turn_threshold: u32,
    matcher: PhraseMatcher,
}

/// Outcome of one check, before it becomes a decision.
enum Check {
    Pass(String),
    Fail {
        detail: String,
        reason: String,
        requirement: Option<&'static str>,
    },
}

impl EndGate {
    pub fn new(min_turn_threshold: u32, matcher: PhraseMatcher) -> Self {
        Self {
            min_turn_threshold,
            matcher,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Result<Self, PolicyError> {
        let matcher = PhraseMatcher::new(&config.phrases, &config.end_token)?;
        Ok(Self::new(config.min_turn_threshold, matcher))
    }

    pub fn min_turn_threshold(&self) -> u32 {
        self.min_turn_threshold
    }

    pub fn matcher(&self) -> &PhraseMatcher {
        &self.matcher
    }

    /// Evaluate the session's current state. A fresh decision is derived on
    /// every call; nothing but the session trace is carried between calls.
    pub fn evaluate(&self, session: &mut SessionContext) -> EndDecision {
        let evaluation = session.begin_evaluation();
        let current = session.turn_count();
        let missing: Vec<String> = CoverageTracker::missing(&session.coverage())
            .iter()
            .map(|c| c.to_string())
            .collect();

        let checks: [(&str, fn(&Self, &SessionContext, &[String]) -> Check); 4] = [
            ("turn_count", Self::check_turn_count),
            ("coverage", Self::check_coverage),
            ("confirmation", Self::check_confirmation),
            ("end_token", Self::check_end_token),
        ];

        for (name, check) in checks {
            match check(self, session, &missing) {
                Check::Pass(detail) => {
                    record(session, evaluation, current, name, "pass", &detail);
                }
                Check::Fail {
                    detail,
                    reason,
                    requirement,
                } => {
                    record(session, evaluation, current, name, "fail", &detail);

                    let mut missing_requirements = missing;
                    if let Some(requirement) = requirement {
                        missing_requirements.push(requirement.to_string());
                    }

                    debug!(
                        session_id = %session.id(),
                        evaluation,
                        turn = current,
                        check = name,
                        reason = %reason,
                        "end gate: continue"
                    );

                    return EndDecision {
                        allow_end: false,
                        reason,
                        missing_requirements,
                        trace: session.trace().to_vec(),
                    };
                }
            }
        }

        info!(
            session_id = %session.id(),
            evaluation,
            turn = current,
            "end gate: all end conditions met"
        );

        EndDecision {
            allow_end: true,
            reason: REASON_ALLOW.to_string(),
            missing_requirements: missing,
            trace: session.trace().to_vec(),
        }
    }

    fn check_turn_count(&self, session: &SessionContext, _missing: &[String]) -> Check {
        let current = session.turn_count();
        let detail = format!("{current}/{}", self.min_turn_threshold);
        if current < self.min_turn_threshold {
            Check::Fail {
                reason: format!("minimum turn threshold not met ({detail})"),
                detail,
                requirement: None,
            }
        } else {
            Check::Pass(detail)
        }
    }

    fn check_coverage(&self, _session: &SessionContext, missing: &[String]) -> Check {
        if missing.is_empty() {
            Check::Pass("all techniques demonstrated".to_string())
        } else {
            let list = missing.join(", ");
            Check::Fail {
                detail: format!("missing {list}"),
                reason: format!("MI coverage incomplete. Missing: {list}"),
                requirement: None,
            }
        }
    }

    fn check_confirmation(&self, session: &SessionContext, _missing: &[String]) -> Check {
        let Some(student) = session.last_turn(Role::Student) else {
            return Check::Fail {
                detail: "no student turn".to_string(),
                reason: REASON_NO_CONFIRMATION.to_string(),
                requirement: Some(REQUIREMENT_CONFIRMATION),
            };
        };

        let classification = self.matcher.classify(&student.text);
        let index = student.sequence_index;
        if classification.is_ambiguous_continue {
            Check::Fail {
                detail: format!("turn {index} is an ambiguous phrase"),
                reason: REASON_AMBIGUOUS.to_string(),
                requirement: Some(REQUIREMENT_CONFIRMATION),
            }
        } else if classification.is_explicit_confirmation {
            Check::Pass(format!("turn {index} confirms"))
        } else {
            Check::Fail {
                detail: format!("turn {index} does not confirm"),
                reason: REASON_NO_CONFIRMATION.to_string(),
                requirement: Some(REQUIREMENT_CONFIRMATION),
            }
        }
    }

    fn check_end_token(&self, session: &SessionContext, _missing: &[String]) -> Check {
        let fail = |detail: String| Check::Fail {
            detail,
            reason: REASON_NO_END_TOKEN.to_string(),
            requirement: Some(REQUIREMENT_END_TOKEN),
        };

        let Some(patient) = session.last_turn(Role::Patient) else {
            return fail("no patient turn".to_string());
        };
        let confirmed_at = session
            .last_turn(Role::Student)
            .map_or(0, |t| t.sequence_index);
        if patient.sequence_index < confirmed_at {
            return fail(format!(
                "patient turn {} precedes confirmation at turn {confirmed_at}",
                patient.sequence_index
            ));
        }
        if self.matcher.has_end_token(&patient.text) {
            Check::Pass(format!("turn {} carries end token", patient.sequence_index))
        } else {
            fail(format!("turn {} lacks end token", patient.sequence_index))
        }
    }
}

fn record(
    session: &mut SessionContext,
    evaluation: u32,
    turn: u32,
    check: &str,
    outcome: &str,
    detail: &str,
) {
    let entry = format!("[eval {evaluation} @ turn {turn}] {check}: {outcome} ({detail})");
    debug!(session_id = %session.id(), "{entry}");
    session.push_trace(entry);
}
