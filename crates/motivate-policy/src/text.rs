//! Text normalisation shared by the phrase matcher and coverage detectors.

use std::collections::BTreeSet;

/// Words too common to count as a topic when comparing student and
/// patient turns.
const STOPWORDS: &[&str] = &[
    "about", "after", "again", "also", "been", "before", "being", "could", "didn't", "does",
    "doesn't", "doing", "don't", "even", "every", "feel", "feeling", "from", "going", "have",
    "haven't", "here", "i'll", "i'm", "i've", "into", "it's", "just", "know", "like", "little",
    "lot", "make", "maybe", "more", "much", "really", "said", "should", "since", "some",
    "something", "still", "sure", "than", "that", "that's", "their", "them", "then", "there",
    "these", "they", "thing", "things", "think", "this", "those", "time", "very", "want",
    "well", "were", "what", "when", "where", "which", "while", "will", "with", "would", "yeah",
    "your", "you're", "you've",
];

/// Lowercase, fold typographic apostrophes, replace remaining punctuation
/// with spaces and collapse whitespace.
pub(crate) fn normalize(text: &str) -> String {
    tokens(text).join(" ")
}

/// Normalised word tokens of `text`.
pub(crate) fn tokens(text: &str) -> Vec<String> {
    let folded: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '`' => '\'',
            c if c.is_alphanumeric() || c == '\'' => c,
            _ => ' ',
        })
        .collect();

    folded
        .split_whitespace()
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Distinct topic-bearing words: at least four characters and not a stopword.
pub(crate) fn content_words(text: &str) -> BTreeSet<String> {
    tokens(text)
        .into_iter()
        .filter(|t| t.chars().count() >= 4 && !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// Split raw text into sentences, returning each normalised sentence and
/// whether it ended with a question mark.
pub(crate) fn sentences(text: &str) -> Vec<(String, bool)> {
    let mut out = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        match c {
            '.' | '!' | '?' | '\n' => {
                let sentence = normalize(&current);
                if !sentence.is_empty() {
                    out.push((sentence, c == '?'));
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }

    let tail = normalize(&current);
    if !tail.is_empty() {
        out.push((tail, false));
    }
    out
}
