//! Policy configuration with documented defaults.
//!
//! Every field has a default so a partial config file only needs to name
//! what it overrides. Patterns are regular expressions matched against
//! normalised text: lowercase, punctuation replaced by spaces, apostrophes
//! kept.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_TURN_THRESHOLD: u32 = 10;
pub const DEFAULT_END_TOKEN: &str = "<<END>>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// The gate blocks ending while the latest turn index is below this.
    pub min_turn_threshold: u32,
    /// Marker the patient model emits when it considers the exchange done.
    pub end_token: String,
    pub phrases: PhraseConfig,
    pub coverage: CoverageConfig,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_turn_threshold: DEFAULT_MIN_TURN_THRESHOLD,
            end_token: DEFAULT_END_TOKEN.to_string(),
            phrases: PhraseConfig::default(),
            coverage: CoverageConfig::default(),
        }
    }
}

/// Phrase sets for the confirmation check. The two lists must be disjoint:
/// no confirmation phrase may occur inside a run of ambiguous phrases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseConfig {
    /// Low-information courtesies that must never end a session on their own.
    pub ambiguous: Vec<String>,
    /// Unambiguous requests to finish.
    pub confirmation: Vec<String>,
    /// Words that cancel a confirmation phrase when they appear shortly
    /// before it ("I'm not ready to finish").
    pub negations: Vec<String>,
    /// How many words before a confirmation phrase are checked for a
    /// negation. Zero disables the check.
    pub negation_window: usize,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            ambiguous: strings(&[
                "thanks",
                "thank you",
                "thx",
                "ty",
                "ok",
                "okay",
                "k",
                "sure",
                "yeah",
                "yes",
                "yep",
                "yup",
                "alright",
                "all right",
                "cool",
                "great",
                "nice",
                "bye",
                "goodbye",
                "got it",
                "sounds good",
                "mhm",
                "hmm",
                "uh huh",
                "right",
                "fine",
            ]),
            confirmation: strings(&[
                "let's end",
                "lets end",
                "end the session",
                "end session",
                "no more questions",
                "i have no more questions",
                "i'm ready to finish",
                "im ready to finish",
                "ready to finish",
                "ready to end",
                "i'm done",
                "im done",
                "finish the session",
                "we can stop",
                "let's stop",
                "lets stop",
                "that's all for today",
                "wrap up the session",
            ]),
            negations: strings(&[
                "not", "don't", "dont", "never", "isn't", "aren't", "can't", "cant", "won't",
                "wont", "didn't", "doesn't", "shouldn't", "wouldn't", "couldn't", "haven't",
                "hardly",
            ]),
            negation_window: 3,
        }
    }
}

/// Detector patterns for the four MI technique categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Matched against each sentence that ends in `?`.
    pub open_question_patterns: Vec<String>,
    /// Matched against every sentence; invitations to elaborate that are
    /// not phrased as questions ("tell me more about...").
    pub open_invitation_patterns: Vec<String>,
    pub reflection_patterns: Vec<String>,
    pub autonomy_patterns: Vec<String>,
    pub summary_patterns: Vec<String>,
    /// A statement sharing at least this many topic words with the
    /// patient's previous turn counts as a reflection. Zero disables the
    /// overlap rule.
    pub reflection_min_overlap: usize,
    /// A summary must mention at least this many distinct topics the
    /// patient raised earlier in the session.
    pub summary_min_topics: usize,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            open_question_patterns: strings(&[
                r"^(?:(?:so|and|okay|ok|well|now)\s+)*(?:what|how|why|in what ways?)\b",
                r"^(?:(?:so|and|okay|ok|well|now)\s+)*(?:could|can|would|will) you (?:tell|describe|share|explain|walk me through|help me understand)\b",
            ]),
            open_invitation_patterns: strings(&[
                r"\btell me (?:more )?about\b",
                r"\btell me more\b",
                r"\bdescribe\b",
                r"\bwalk me through\b",
                r"\bhelp me understand\b",
            ]),
            reflection_patterns: strings(&[
                r"\b(?:it )?sounds like\b",
                r"\bit seems (?:like|that|as though)\b",
                r"\byou seem\b",
                r"\byou(?:'re| are) feeling\b",
                r"\byou feel\b",
                r"\bwhat i(?:'m| am) hearing\b",
                r"\bi hear (?:that )?you\b",
                r"\byou(?:'re| are) saying\b",
                r"\bon (?:the )?one hand\b",
                r"\bso for you\b",
            ]),
            autonomy_patterns: strings(&[
                r"\bup to you\b",
                r"\byour (?:choice|decision|call)\b",
                r"\byou decide\b",
                r"\byou(?:'re| are) in charge\b",
                r"\bwhatever you (?:decide|choose)\b",
                r"\byou know (?:yourself )?best\b",
                r"\bonly you can\b",
                r"\bon your own terms\b",
                r"\bwhat (?:would|do) you (?:want|like) to do\b",
                r"\bhow would you like to\b",
                r"\bi respect (?:your|that)\b",
            ]),
            summary_patterns: strings(&[
                r"\bto summari[sz]e\b",
                r"\bin summary\b",
                r"\blet me summari[sz]e\b",
                r"\bsumm(?:ing|ed) up\b",
                r"\bto sum up\b",
                r"\b(?:let me |to )?recap\b",
                r"\bso far (?:we(?:'ve| have)|you(?:'ve| have))\b",
                r"\bwe(?:'ve| have) talked about\b",
                r"\byou(?:'ve| have) (?:mentioned|told me|shared)\b",
                r"\bwhat i(?:'ve| have) heard\b",
            ]),
            reflection_min_overlap: 2,
            summary_min_topics: 2,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
