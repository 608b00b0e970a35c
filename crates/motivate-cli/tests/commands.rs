use motivate_cli::commands::{self, ReportFormat};
use motivate_cli::config::MotivateConfig;
use motivate_core::models::rubric::RubricVersion;
use motivate_core::models::turn::Turn;

const FEEDBACK: &str = "\
**Collaboration (9 pts): Meets Criteria** - Partnered well.
**Acceptance (6 pts): Meets Criteria** - Affirmed strengths.
**Compassion (6 pts): Needs Improvement** - Missed distress cues.
**Evocation (6 pts): Meets Criteria** - Drew out reasons.
**Summary (3 pts): Needs Improvement** - No summary.
**Response Factor (10 pts): Meets Criteria** - Timely replies.
";

fn session_transcript() -> Vec<Turn> {
    vec![
        Turn::student("What brings you in today?", 1),
        Turn::patient("My sleep has been terrible because of stress at work.", 2),
        Turn::student("It sounds like work stress is keeping you up.", 3),
        Turn::patient("Yes, and I drink coffee late at night.", 4),
        Turn::student("It's up to you what you try first.", 5),
        Turn::patient("Maybe less coffee.", 6),
        Turn::student("Let me recap: your sleep, stress at work, and late coffee.", 7),
        Turn::patient("That's right.", 8),
        Turn::student("What would help most this week?", 9),
        Turn::patient("Cutting coffee after noon.", 10),
        Turn::student("I'm ready to finish", 11),
        Turn::patient("Thank you for talking with me. <<END>>", 12),
    ]
}

#[test]
fn gate_replay_allows_end_only_on_the_final_turn() {
    let replay = commands::gate(&MotivateConfig::default(), &session_transcript()).unwrap();

    assert_eq!(replay.steps.len(), 12);
    assert!(replay.steps[..11].iter().all(|s| !s.allow_end));
    let last = &replay.steps[11];
    assert!(last.allow_end);
    assert!(last.coverage.is_complete());
    assert!(last.missing_requirements.is_empty());

    // Coverage was complete by turn 7; turn count held the gate until 10.
    assert!(replay.steps[6].coverage.is_complete());
    assert!(replay.steps[6].reason.starts_with("minimum turn threshold not met"));

    let decision = replay.final_decision.unwrap();
    assert!(decision.allow_end);
    assert!(decision.trace.len() >= 12);
}

#[test]
fn gate_replay_rejects_out_of_order_turns() {
    let turns = vec![Turn::student("Hi", 2), Turn::patient("Hello", 1)];
    assert!(commands::gate(&MotivateConfig::default(), &turns).is_err());
}

#[test]
fn transcript_json_parses() {
    let turns = commands::parse_transcript(
        r#"[
            { "role": "student", "text": "What brings you in?", "sequence_index": 1 },
            { "role": "patient", "text": "Stress.", "sequence_index": 2,
              "sent_at": "2026-03-01T10:00:05Z" }
        ]"#,
    )
    .unwrap();
    assert_eq!(turns.len(), 2);
    assert!(turns[0].sent_at.is_none());
    assert!(turns[1].sent_at.is_some());

    assert!(commands::parse_transcript("{ not json").is_err());
}

#[test]
fn modifiers_prefer_explicit_latency() {
    assert!(commands::modifiers(None, None).is_none());

    let only_latency = commands::modifiers(None, Some(12.0)).unwrap();
    assert!(only_latency.engagement.is_none());
    assert_eq!(only_latency.mean_response_secs, Some(12.0));

    let turns = session_transcript();
    let derived = commands::modifiers(Some(&turns), Some(20.0)).unwrap();
    assert_eq!(derived.engagement.unwrap().turn_count, 12);
    assert_eq!(derived.mean_response_secs, Some(20.0));
}

#[test]
fn score_uses_configured_version_by_default() {
    let config = MotivateConfig::default();
    let breakdown = commands::score(&config, FEEDBACK, None, None).unwrap();

    assert_eq!(breakdown.rubric_version, RubricVersion::Binary);
    assert!((breakdown.percentage - 77.5).abs() < 1e-9);
    assert_eq!(breakdown.performance_band.label, "strong");

    // Binary feedback has no graduated lines.
    assert!(commands::score(&config, FEEDBACK, Some(RubricVersion::Graduated), None).is_err());
}

#[test]
fn report_renders_text_and_json() {
    let config = MotivateConfig::default();
    let breakdown = commands::score(&config, FEEDBACK, None, None).unwrap();
    let decision = commands::gate(&config, &session_transcript())
        .unwrap()
        .final_decision;

    let text = commands::report(&breakdown, decision.as_ref(), ReportFormat::Text, None).unwrap();
    assert!(text.contains("Band:   strong"));
    assert!(text.contains("Session end: allowed"));

    let json = commands::report(&breakdown, None, ReportFormat::Json, None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["score"]["total_possible"], 40.0);
}
