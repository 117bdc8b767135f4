//! Screening state machine — phases and the per-candidate session value.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::ChatMessage;
use crate::screening::fields::{CandidateField, CandidateInfo, INFO_FIELDS};

/// The phases of a screening conversation.
///
/// Progresses linearly: Greeting → InfoGathering → TechStack →
/// TechnicalQuestions → Conclusion → Ended. Exit intent may jump to Ended
/// from anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    #[default]
    Greeting,
    InfoGathering,
    TechStack,
    TechnicalQuestions,
    Conclusion,
    Ended,
}

impl ConversationPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ConversationPhase) -> bool {
        use ConversationPhase::*;
        match (self, target) {
            (Ended, _) => false,
            (_, Ended) => true,
            _ => self.next() == Some(target),
        }
    }

    /// Whether the conversation is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Get the next phase in the linear progression, if any.
    pub fn next(&self) -> Option<ConversationPhase> {
        use ConversationPhase::*;
        match self {
            Greeting => Some(InfoGathering),
            InfoGathering => Some(TechStack),
            TechStack => Some(TechnicalQuestions),
            TechnicalQuestions => Some(Conclusion),
            Conclusion => Some(Ended),
            Ended => None,
        }
    }
}

impl std::fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Greeting => "greeting",
            Self::InfoGathering => "info_gathering",
            Self::TechStack => "tech_stack",
            Self::TechnicalQuestions => "technical_questions",
            Self::Conclusion => "conclusion",
            Self::Ended => "ended",
        };
        write!(f, "{s}")
    }
}

/// Everything known about one candidate run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    pub phase: ConversationPhase,
    pub fields: CandidateInfo,
    /// Append-only; only user and assistant turns.
    pub history: Vec<ChatMessage>,
    pub tech_stack: Vec<String>,
    /// Index into `INFO_FIELDS`; never exceeds its length.
    pub field_cursor: usize,
    pub technical_questions: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to `target` if the transition is allowed. Invalid transitions are
    /// logged and ignored so the conversation keeps going.
    pub fn transition_to(&mut self, target: ConversationPhase) -> bool {
        if !self.phase.can_transition_to(target) {
            warn!("Ignoring invalid phase transition {} -> {}", self.phase, target);
            return false;
        }
        self.phase = target;
        true
    }

    pub fn record_user(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::user(content));
    }

    pub fn record_assistant(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::assistant(content));
    }

    pub fn store_field(&mut self, field: CandidateField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// Advances the cursor by one, saturating at the schema length.
    pub fn advance_cursor(&mut self) {
        self.field_cursor = (self.field_cursor + 1).min(INFO_FIELDS.len());
    }

    pub fn all_info_collected(&self) -> bool {
        self.field_cursor >= INFO_FIELDS.len()
    }

    /// The most recent `n` turns, oldest first.
    pub fn recent_turns(&self, n: usize) -> &[ChatMessage] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }
}
