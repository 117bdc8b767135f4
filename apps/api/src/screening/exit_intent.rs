//! Keyword detectors for "end the conversation" and "I'm done answering".
//!
//! The two vocabularies overlap ("that's all", "no more") but act differently:
//! exit keywords end the session from any phase, closing phrases only move
//! the technical discussion to its conclusion. They stay separate.

use std::sync::LazyLock;

use regex::Regex;

pub const EXIT_KEYWORDS: &[&str] = &[
    "bye",
    "goodbye",
    "exit",
    "quit",
    "end",
    "stop",
    "thank you",
    "thanks",
    "that's all",
    "no more",
    "end conversation",
    "close",
    "terminate",
];

pub const CLOSING_PHRASES: &[&str] = &[
    "that's all",
    "done",
    "finished",
    "no more",
    "nothing else",
    "that covers",
    "i think that's it",
    "any questions about",
];

static EXIT_DETECTOR: LazyLock<KeywordDetector> = LazyLock::new(KeywordDetector::exit_intent);
static CLOSING_DETECTOR: LazyLock<KeywordDetector> =
    LazyLock::new(KeywordDetector::closing_phrases);

/// Case-insensitive phrase matcher. Phrases match on word boundaries, so
/// "end" fires on "the end" but not on "backend".
#[derive(Debug, Clone)]
pub struct KeywordDetector {
    pattern: Option<Regex>,
}

impl KeywordDetector {
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Self {
        let alternatives: Vec<String> = phrases
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(|p| regex::escape(&p.to_lowercase()))
            .collect();

        let pattern = if alternatives.is_empty() {
            None
        } else {
            // Escaped literals only, so the pattern always compiles
            Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).ok()
        };
        Self { pattern }
    }

    pub fn exit_intent() -> Self {
        Self::new(EXIT_KEYWORDS)
    }

    pub fn closing_phrases() -> Self {
        Self::new(CLOSING_PHRASES)
    }

    pub fn detect(&self, text: &str) -> bool {
        let normalized = text.to_lowercase().replace('\u{2019}', "'");
        self.pattern
            .as_ref()
            .is_some_and(|re| re.is_match(normalized.trim()))
    }
}

/// True when the candidate signals they want to end the conversation.
pub fn check_exit_intent(message: &str) -> bool {
    EXIT_DETECTOR.detect(message)
}

/// True when the candidate signals they are done with the technical questions.
pub fn check_closing_phrase(message: &str) -> bool {
    CLOSING_DETECTOR.detect(message)
}
