//! Word-boundary phrase matching.
//!
//! Used by the fallback classifier (category keywords) and the escalator
//! (trigger phrases, urgent keywords, urgency indicators). Plain substring
//! search would let "app" match "happy" and "down" match "download".

use regex::Regex;
use tracing::warn;

/// Inflections accepted after a phrase ("install" matches "installing",
/// "installation").
const SUFFIXES: &str = "(?:s|es|ed|ing|ion|ation)?";

/// A compiled phrase.
#[derive(Debug, Clone)]
struct Phrase {
    text: String,
    pattern: Regex,
}

/// An ordered set of phrases matched case-insensitively on word boundaries.
#[derive(Debug, Clone, Default)]
pub struct PhraseSet {
    phrases: Vec<Phrase>,
}

impl PhraseSet {
    /// Compile `phrases`. Blank phrases are dropped.
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Self {
        let phrases = phrases
            .iter()
            .filter_map(|p| {
                let text = normalize(p.as_ref());
                if text.is_empty() {
                    return None;
                }
                match compile(&text) {
                    Ok(pattern) => Some(Phrase { text, pattern }),
                    Err(e) => {
                        warn!(phrase = %text, error = %e, "Skipping phrase that failed to compile");
                        None
                    }
                }
            })
            .collect();

        Self { phrases }
    }

    /// Number of phrases.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// First phrase (in declaration order) found in `text`.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let text = normalize(text);
        self.phrases
            .iter()
            .find(|p| p.pattern.is_match(&text))
            .map(|p| p.text.as_str())
    }

    /// Every phrase found in `text`, in declaration order.
    pub fn matches<'a>(&'a self, text: &str) -> Vec<&'a str> {
        let text = normalize(text);
        self.phrases
            .iter()
            .filter(|p| p.pattern.is_match(&text))
            .map(|p| p.text.as_str())
            .collect()
    }

    /// Number of distinct phrases found in `text`.
    pub fn count_matches(&self, text: &str) -> usize {
        let text = normalize(text);
        self.phrases
            .iter()
            .filter(|p| p.pattern.is_match(&text))
            .count()
    }
}

/// Lowercase, straighten apostrophes, collapse whitespace.
fn normalize(text: &str) -> String {
    text.replace(['\u{2018}', '\u{2019}'], "'")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn compile(phrase: &str) -> Result<Regex, regex::Error> {
    let body = phrase
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&format!(
        r"(?:^|[^\p{{L}}\p{{N}}_]){body}{SUFFIXES}(?:$|[^\p{{L}}\p{{N}}_])"
    ))
}
