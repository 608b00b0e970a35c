use motivate_policy::config::{DEFAULT_END_TOKEN, PhraseConfig};
use motivate_policy::error::ConfigurationError;
use motivate_policy::phrase::{PhraseKind, PhraseMatcher};

fn matcher() -> PhraseMatcher {
    PhraseMatcher::new(&PhraseConfig::default(), DEFAULT_END_TOKEN)
        .expect("default phrase config is valid")
}

#[test]
fn courtesies_are_ambiguous_never_confirmation() {
    let m = matcher();
    for text in ["thanks", "ok", "yeah thanks", "OK!", "  Thank you.  ", "ok, bye"] {
        let c = m.classify(text);
        assert!(c.is_ambiguous_continue, "{text:?} should be ambiguous");
        assert!(!c.is_explicit_confirmation, "{text:?} must not confirm");
    }
}

#[test]
fn explicit_requests_confirm_and_are_not_ambiguous() {
    let m = matcher();
    for text in [
        "yes let's end the session",
        "I'm ready to finish",
        "Yes, I'm ready to finish",
        "I have no more questions.",
        "Let\u{2019}s end here",
    ] {
        let c = m.classify(text);
        assert!(c.is_explicit_confirmation, "{text:?} should confirm");
        assert!(!c.is_ambiguous_continue, "{text:?} must not be ambiguous");
    }
}

#[test]
fn informative_text_is_neither() {
    let m = matcher();
    let c = m.classify("thanks, that was helpful to think about my sleep");
    assert!(!c.is_ambiguous_continue);
    assert!(!c.is_explicit_confirmation);

    let c = m.classify("okra is my favourite vegetable");
    assert!(!c.is_ambiguous_continue);
}

#[test]
fn empty_utterance_is_neither() {
    let c = matcher().classify("   ");
    assert!(!c.is_ambiguous_continue);
    assert!(!c.is_explicit_confirmation);
    assert!(!c.has_end_token);
}

#[test]
fn end_token_matches_anywhere_case_insensitively() {
    let m = matcher();
    assert!(m.has_end_token("Take care of yourself. <<END>>"));
    assert!(m.has_end_token("<<end>> thanks for the chat"));
    assert!(!m.has_end_token("Take care of yourself."));
    assert!(!m.has_end_token("<END>"));
}

#[test]
fn custom_end_token() {
    let m = PhraseMatcher::new(&PhraseConfig::default(), "[[done]]").unwrap();
    assert!(m.classify("see you next week [[DONE]]").has_end_token);
    assert!(!m.classify("see you next week <<END>>").has_end_token);
}

#[test]
fn overlapping_phrase_sets_are_rejected() {
    let mut config = PhraseConfig::default();
    config.confirmation.push("Ok, thanks!".to_string());

    let err = PhraseMatcher::new(&config, DEFAULT_END_TOKEN).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::OverlappingPhrase { ref phrase } if phrase == "Ok, thanks!"
    ));
}

fn phrases(ambiguous: &[&str], confirmation: &[&str]) -> PhraseConfig {
    PhraseConfig {
        ambiguous: ambiguous.iter().map(|s| s.to_string()).collect(),
        confirmation: confirmation.iter().map(|s| s.to_string()).collect(),
        ..PhraseConfig::default()
    }
}

#[test]
fn confirmation_inside_an_ambiguous_phrase_is_rejected() {
    let config = phrases(&["ok we can stop"], &["we can stop"]);
    let err = PhraseMatcher::new(&config, DEFAULT_END_TOKEN).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::OverlappingPhrase { ref phrase } if phrase == "we can stop"
    ));

    // Built without the confirmation list, the same courtesy is ambiguous.
    let m = PhraseMatcher::new(&phrases(&["ok we can stop"], &[]), DEFAULT_END_TOKEN).unwrap();
    assert!(m.is_ambiguous_continue("ok we can stop"));
}

#[test]
fn confirmation_spanning_ambiguous_phrases_is_rejected() {
    // "ok we" + "can stop" tiles, and "we can stop" straddles the boundary.
    let config = phrases(&["ok we", "can stop"], &["we can stop"]);
    assert!(matches!(
        PhraseMatcher::new(&config, DEFAULT_END_TOKEN),
        Err(ConfigurationError::OverlappingPhrase { .. })
    ));

    // Starts inside one ambiguous phrase and ends inside another.
    let config = phrases(&["sure we", "can stop now"], &["we can stop"]);
    assert!(matches!(
        PhraseMatcher::new(&config, DEFAULT_END_TOKEN),
        Err(ConfigurationError::OverlappingPhrase { .. })
    ));
}

#[test]
fn confirmation_needing_an_informative_word_is_accepted() {
    let config = phrases(&["ok", "we can"], &["we can stop"]);
    let m = PhraseMatcher::new(&config, DEFAULT_END_TOKEN).unwrap();
    assert!(m.is_ambiguous_continue("ok we can"));
    assert!(m.is_explicit_confirmation("ok we can stop"));
    assert!(!m.is_ambiguous_continue("ok we can stop"));
}

#[test]
fn negated_confirmation_does_not_confirm() {
    let m = matcher();
    for text in [
        "I'm not ready to finish",
        "I don't think I'm ready to end",
        "I don\u{2019}t want to end the session yet",
        "we never said we can stop",
    ] {
        assert!(!m.is_explicit_confirmation(text), "{text:?} must not confirm");
    }
}

#[test]
fn negation_outside_the_window_does_not_cancel() {
    let m = matcher();
    assert!(m.is_explicit_confirmation(
        "I didn't expect it, but honestly I think we can stop now"
    ));
    assert!(m.is_explicit_confirmation("I'm not sure why, but yes, let's end the session"));
    // A later unnegated occurrence still confirms.
    assert!(m.is_explicit_confirmation("not ready to finish? no, I'm ready to finish"));
}

#[test]
fn negation_window_zero_disables_the_guard() {
    let config = PhraseConfig {
        negation_window: 0,
        ..PhraseConfig::default()
    };
    let m = PhraseMatcher::new(&config, DEFAULT_END_TOKEN).unwrap();
    assert!(m.is_explicit_confirmation("I'm not ready to finish"));
}

#[test]
fn identical_phrase_in_both_sets_is_rejected() {
    let config = PhraseConfig {
        ambiguous: vec!["bye".to_string()],
        confirmation: vec!["BYE".to_string()],
        ..PhraseConfig::default()
    };
    assert!(matches!(
        PhraseMatcher::new(&config, DEFAULT_END_TOKEN),
        Err(ConfigurationError::OverlappingPhrase { .. })
    ));
}

#[test]
fn empty_phrase_is_rejected() {
    let config = PhraseConfig {
        ambiguous: vec!["thanks".to_string(), " ?! ".to_string()],
        confirmation: vec!["let's end".to_string()],
        ..PhraseConfig::default()
    };
    assert!(matches!(
        PhraseMatcher::new(&config, DEFAULT_END_TOKEN),
        Err(ConfigurationError::EmptyPhrase {
            kind: PhraseKind::AmbiguousContinue,
            ..
        })
    ));
}

#[test]
fn blank_end_token_is_rejected() {
    assert!(matches!(
        PhraseMatcher::new(&PhraseConfig::default(), "   "),
        Err(ConfigurationError::EmptyEndToken)
    ));
}
