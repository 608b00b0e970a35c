//! Utterance classification against configured phrase sets.
//!
//! Phrases are compared as whole-word token sequences after normalisation,
//! so "ok" matches "OK!" but not "okra". An utterance is an ambiguous
//! continue only when it is made up entirely of ambiguous phrases
//! ("yeah thanks", "ok bye"); anything else in the text makes it
//! informative. A confirmation phrase matches anywhere in the utterance
//! unless a negation ("not", "don't") sits in the few words before it.
//!
//! The two sets are disjoint by construction: a matcher refuses to build
//! when some utterance made only of ambiguous phrases could contain a
//! confirmation phrase, whether inside one ambiguous phrase or spanning
//! several.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PhraseConfig;
use crate::error::ConfigurationError;
use crate::text;

/// Which phrase set a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseKind {
    AmbiguousContinue,
    ExplicitConfirmation,
}

impl fmt::Display for PhraseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhraseKind::AmbiguousContinue => f.write_str("ambiguous"),
            PhraseKind::ExplicitConfirmation => f.write_str("confirmation"),
        }
    }
}

/// Result of classifying one utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseClassification {
    pub is_ambiguous_continue: bool,
    pub is_explicit_confirmation: bool,
    pub has_end_token: bool,
}

#[derive(Debug, Clone)]
struct PhraseRule {
    kind: PhraseKind,
    tokens: Vec<String>,
}

/// Classifies utterances using an ordered rule table built from config.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    rules: Vec<PhraseRule>,
    negations: BTreeSet<String>,
    negation_window: usize,
    end_token: String,
}

impl PhraseMatcher {
    /// Build a matcher, rejecting empty phrases, an empty end token, and
    /// any confirmation phrase that an all-ambiguous utterance could contain.
    pub fn new(phrases: &PhraseConfig, end_token: &str) -> Result<Self, ConfigurationError> {
        let end_token = end_token.trim();
        if end_token.is_empty() {
            return Err(ConfigurationError::EmptyEndToken);
        }

        let mut rules = Vec::with_capacity(phrases.ambiguous.len() + phrases.confirmation.len());
        for (kind, list) in [
            (PhraseKind::AmbiguousContinue, &phrases.ambiguous),
            (PhraseKind::ExplicitConfirmation, &phrases.confirmation),
        ] {
            for phrase in list {
                let tokens = text::tokens(phrase);
                if tokens.is_empty() {
                    return Err(ConfigurationError::EmptyPhrase {
                        kind,
                        phrase: phrase.clone(),
                    });
                }
                rules.push(PhraseRule { kind, tokens });
            }
        }

        let matcher = Self {
            rules,
            negations: phrases.negations.iter().flat_map(|n| text::tokens(n)).collect(),
            negation_window: phrases.negation_window,
            end_token: end_token.to_lowercase(),
        };

        for (phrase, rule) in phrases
            .confirmation
            .iter()
            .zip(matcher.rules_of(PhraseKind::ExplicitConfirmation))
        {
            if matcher.embeds_in_ambiguous(&rule.tokens) {
                return Err(ConfigurationError::OverlappingPhrase {
                    phrase: phrase.clone(),
                });
            }
        }

        debug!(
            ambiguous = phrases.ambiguous.len(),
            confirmation = phrases.confirmation.len(),
            end_token = %matcher.end_token,
            "phrase matcher built"
        );

        Ok(matcher)
    }

    pub fn classify(&self, utterance: &str) -> PhraseClassification {
        PhraseClassification {
            is_ambiguous_continue: self.is_ambiguous_continue(utterance),
            is_explicit_confirmation: self.is_explicit_confirmation(utterance),
            has_end_token: self.has_end_token(utterance),
        }
    }

    /// True when the utterance consists solely of ambiguous phrases.
    pub fn is_ambiguous_continue(&self, utterance: &str) -> bool {
        let tokens = text::tokens(utterance);
        if tokens.is_empty() {
            return false;
        }

        // covered[i]: the first i tokens can be tiled by ambiguous phrases.
        let mut covered = vec![false; tokens.len() + 1];
        covered[0] = true;
        for end in 1..=tokens.len() {
            let tiled = self.rules_of(PhraseKind::AmbiguousContinue).any(|rule| {
                let len = rule.tokens.len();
                len <= end && covered[end - len] && tokens[end - len..end] == rule.tokens[..]
            });
            covered[end] = tiled;
        }
        covered[tokens.len()]
    }

    /// True when any confirmation phrase occurs as a contiguous run of
    /// words with no negation in the `negation_window` words before it.
    pub fn is_explicit_confirmation(&self, utterance: &str) -> bool {
        let tokens = text::tokens(utterance);
        self.rules_of(PhraseKind::ExplicitConfirmation).any(|rule| {
            tokens
                .windows(rule.tokens.len())
                .enumerate()
                .any(|(start, w)| w == &rule.tokens[..] && !self.negated_before(&tokens, start))
        })
    }

    pub fn has_end_token(&self, utterance: &str) -> bool {
        utterance.to_lowercase().contains(&self.end_token)
    }

    pub fn end_token(&self) -> &str {
        &self.end_token
    }

    fn rules_of(&self, kind: PhraseKind) -> impl Iterator<Item = &PhraseRule> {
        self.rules.iter().filter(move |r| r.kind == kind)
    }

    fn negated_before(&self, tokens: &[String], start: usize) -> bool {
        tokens[start.saturating_sub(self.negation_window)..start]
            .iter()
            .any(|t| self.negations.contains(t))
    }

    /// True when `phrase` can appear as a run of words somewhere in a
    /// sequence of whole ambiguous phrases. The run may start partway into
    /// one ambiguous phrase, cross any number of whole ones, and end partway
    /// into another.
    fn embeds_in_ambiguous(&self, phrase: &[String]) -> bool {
        let ambiguous: Vec<&[String]> = self
            .rules_of(PhraseKind::AmbiguousContinue)
            .map(|r| &r.tokens[..])
            .collect();
        let n = phrase.len();

        if ambiguous
            .iter()
            .any(|a| a.windows(n).any(|w| w == phrase))
        {
            return true;
        }

        // reach[j]: phrase[..j] ends exactly on an ambiguous phrase boundary.
        let mut reach = vec![false; n + 1];
        reach[0] = true;
        for a in &ambiguous {
            for start in 1..a.len() {
                let tail = &a[start..];
                if tail.len() <= n && &phrase[..tail.len()] == tail {
                    reach[tail.len()] = true;
                }
            }
        }

        for j in 0..n {
            if !reach[j] {
                continue;
            }
            let rest = &phrase[j..];
            for a in &ambiguous {
                if a.len() <= rest.len() {
                    if &rest[..a.len()] == *a {
                        reach[j + a.len()] = true;
                    }
                } else if &a[..rest.len()] == rest {
                    return true;
                }
            }
        }

        reach[n]
    }
}
