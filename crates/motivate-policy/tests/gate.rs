use motivate_core::models::coverage::CoverageState;
use motivate_core::models::decision::GateState;
use motivate_core::models::turn::{Role, Turn};
use motivate_policy::config::PolicyConfig;
use motivate_policy::coverage::CoverageTracker;
use motivate_policy::gate::{
    EndGate, REASON_ALLOW, REASON_AMBIGUOUS, REASON_NO_CONFIRMATION, REASON_NO_END_TOKEN,
};
use motivate_policy::session::SessionContext;
use proptest::prelude::*;
use uuid::Uuid;

fn gate() -> EndGate {
    EndGate::from_config(&PolicyConfig::default()).expect("default policy config is valid")
}

/// Alternating transcript of `turns` turns ending on a patient turn. The
/// last student turn says `student` and the last patient turn says `patient`.
fn transcript(turns: u32, student: &str, patient: &str) -> Vec<Turn> {
    (1..=turns)
        .map(|i| {
            let role = if (turns - i) % 2 == 0 {
                Role::Patient
            } else {
                Role::Student
            };
            let is_last_of_role = i + 2 > turns;
            let text = match (role, is_last_of_role) {
                (Role::Student, true) => student,
                (Role::Patient, true) => patient,
                _ => "filler",
            };
            Turn::new(role, text, i)
        })
        .collect()
}

fn session(turns: u32, coverage: CoverageState, student: &str, patient: &str) -> SessionContext {
    SessionContext::restore(Uuid::nil(), transcript(turns, student, patient), coverage)
        .expect("generated transcript is ordered")
}

#[test]
fn scenario_a_turn_threshold_blocks_first() {
    let mut s = session(4, CoverageState::default(), "let's end the session", "Bye <<END>>");
    let decision = gate().evaluate(&mut s);

    assert!(!decision.allow_end);
    assert_eq!(decision.state(), GateState::Gathering);
    assert_eq!(decision.reason, "minimum turn threshold not met (4/10)");
    assert_eq!(
        decision.missing_requirements,
        vec!["open_ended_question", "reflection", "autonomy", "summary"]
    );
    assert_eq!(decision.trace.len(), 1);
}

#[test]
fn scenario_b_coverage_blocks_before_confirmation() {
    let coverage = CoverageState {
        open_ended_question: true,
        reflection: true,
        autonomy: true,
        summary: false,
    };
    let mut s = session(11, coverage, "let's end the session", "I'm glad we talked.");
    let decision = gate().evaluate(&mut s);

    assert!(!decision.allow_end);
    assert_eq!(decision.reason, "MI coverage incomplete. Missing: summary");
    assert_eq!(decision.missing_requirements, vec!["summary"]);
    // Turn count passed, coverage failed, nothing after it ran.
    assert_eq!(decision.trace.len(), 2);
    assert!(decision.trace[0].contains("turn_count: pass (11/10)"));
    assert!(decision.trace[1].contains("coverage: fail"));
}

#[test]
fn scenario_c_all_conditions_met() {
    let mut s = session(
        14,
        CoverageState::complete(),
        "Yes, I'm ready to finish",
        "Thank you for talking with me today. <<END>>",
    );
    let decision = gate().evaluate(&mut s);

    assert!(decision.allow_end);
    assert_eq!(decision.state(), GateState::Ready);
    assert_eq!(decision.reason, REASON_ALLOW);
    assert!(decision.missing_requirements.is_empty());
    assert_eq!(decision.trace.len(), 4);
    assert!(decision.trace.iter().all(|e| e.contains(": pass (")));
}

#[test]
fn ambiguous_courtesy_never_ends_a_session() {
    let mut s = session(12, CoverageState::complete(), "ok thanks", "Take care. <<END>>");
    let decision = gate().evaluate(&mut s);

    assert!(!decision.allow_end);
    assert_eq!(decision.reason, REASON_AMBIGUOUS);
    assert_eq!(decision.missing_requirements, vec!["explicit_confirmation"]);
}

#[test]
fn informative_student_turn_is_not_confirmation() {
    let mut s = session(
        12,
        CoverageState::complete(),
        "I think I'll try walking after dinner",
        "That sounds like a plan. <<END>>",
    );
    let decision = gate().evaluate(&mut s);
    assert_eq!(decision.reason, REASON_NO_CONFIRMATION);
}

#[test]
fn negated_request_is_not_confirmation() {
    let mut s = session(
        13,
        CoverageState::complete(),
        "I'm not ready to finish yet",
        "Okay. <<END>>",
    );
    let decision = gate().evaluate(&mut s);
    assert!(!decision.allow_end);
    assert_eq!(decision.reason, REASON_NO_CONFIRMATION);
    assert_eq!(decision.missing_requirements, vec!["explicit_confirmation"]);
}

#[test]
fn missing_end_token_blocks() {
    let mut s = session(
        12,
        CoverageState::complete(),
        "no more questions",
        "Okay, is there anything else?",
    );
    let decision = gate().evaluate(&mut s);
    assert_eq!(decision.reason, REASON_NO_END_TOKEN);
    assert_eq!(decision.missing_requirements, vec!["end_token"]);
}

#[test]
fn end_token_before_confirmation_does_not_count() {
    let mut turns = transcript(11, "filler", "Goodbye <<END>>");
    turns.push(Turn::student("let's end the session", 12));
    let mut s = SessionContext::restore(Uuid::nil(), turns, CoverageState::complete()).unwrap();

    let decision = gate().evaluate(&mut s);
    assert!(!decision.allow_end);
    assert_eq!(decision.reason, REASON_NO_END_TOKEN);
}

#[test]
fn empty_session_fails_closed() {
    let mut s = SessionContext::new();
    let decision = gate().evaluate(&mut s);
    assert!(!decision.allow_end);
    assert_eq!(decision.reason, "minimum turn threshold not met (0/10)");
}

#[test]
fn no_turn_threshold_still_needs_the_other_checks() {
    let config = PolicyConfig {
        min_turn_threshold: 0,
        ..PolicyConfig::default()
    };
    let gate = EndGate::from_config(&config).unwrap();
    let mut s = SessionContext::restore(Uuid::nil(), Vec::new(), CoverageState::complete()).unwrap();

    let decision = gate.evaluate(&mut s);
    assert_eq!(decision.reason, REASON_NO_CONFIRMATION);
}

#[test]
fn trace_accumulates_across_evaluations() {
    let gate = gate();
    let tracker = CoverageTracker::new(&PolicyConfig::default().coverage).unwrap();
    let mut s = SessionContext::new();

    tracker
        .observe(&mut s, Turn::student("What brings you in?", 1))
        .unwrap();
    tracker
        .observe(&mut s, Turn::patient("My sleep.", 2))
        .unwrap();
    let first = gate.evaluate(&mut s);
    assert_eq!(first.trace.len(), 1);

    tracker
        .observe(&mut s, Turn::student("Tell me more about your sleep.", 3))
        .unwrap();
    tracker
        .observe(&mut s, Turn::patient("It's bad.", 4))
        .unwrap();
    let second = gate.evaluate(&mut s);

    assert_eq!(second.trace.len(), 2);
    assert_eq!(second.trace[0], first.trace[0]);
    assert!(second.trace[0].starts_with("[eval 1 @ turn 2]"));
    assert!(second.trace[1].starts_with("[eval 2 @ turn 4]"));
    assert_eq!(s.trace(), &second.trace[..]);
}

#[test]
fn decision_is_rederived_each_turn() {
    let gate = gate();
    let mut turns = transcript(12, "I'm ready to finish", "Take care. <<END>>");
    let mut s =
        SessionContext::restore(Uuid::nil(), turns.clone(), CoverageState::complete()).unwrap();
    assert!(gate.evaluate(&mut s).allow_end);

    turns.push(Turn::student("actually, one more thing", 13));
    turns.push(Turn::patient("Of course.", 14));
    let mut s = SessionContext::restore(Uuid::nil(), turns, CoverageState::complete()).unwrap();
    assert!(!gate.evaluate(&mut s).allow_end);
}

fn coverage_strategy() -> impl Strategy<Value = CoverageState> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(o, r, a, s)| {
        CoverageState {
            open_ended_question: o,
            reflection: r,
            autonomy: a,
            summary: s,
        }
    })
}

fn student_text() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "thanks",
        "ok",
        "let's end the session",
        "Yes, I'm ready to finish",
        "I want to keep talking",
    ])
}

fn patient_text() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["Goodbye. <<END>>", "Tell me more.", "<<end>>"])
}

proptest! {
    #[test]
    fn below_threshold_always_continues(
        turns in 0u32..10,
        coverage in coverage_strategy(),
        student in student_text(),
        patient in patient_text(),
    ) {
        let mut s = session(turns, coverage, student, patient);
        let decision = gate().evaluate(&mut s);
        prop_assert!(!decision.allow_end);
        prop_assert!(decision.reason.starts_with("minimum turn threshold not met"));
    }

    #[test]
    fn incomplete_coverage_always_continues(
        turns in 0u32..40,
        coverage in coverage_strategy().prop_filter("incomplete", |c| !c.is_complete()),
        student in student_text(),
        patient in patient_text(),
    ) {
        let mut s = session(turns, coverage, student, patient);
        let decision = gate().evaluate(&mut s);
        let expected: Vec<String> = coverage.missing().iter().map(|c| c.to_string()).collect();

        prop_assert!(!decision.allow_end);
        prop_assert!(!decision.missing_requirements.is_empty());
        prop_assert_eq!(decision.missing_requirements, expected);
    }
}
