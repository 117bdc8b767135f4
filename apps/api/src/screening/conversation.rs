//! ConversationHandler — the screening dialogue state machine.
//!
//! Flow per message: sanitize → record → exit check → phase dispatch.
//! Field validation and tech-stack parsing are local; every open-ended reply
//! goes through the `Gateway`, which never fails.

use tracing::{debug, info};

use crate::llm_client::gateway::{Gateway, Prompt};
use crate::llm_client::offline::PromptIntent;
use crate::llm_client::{ChatMessage, Role};
use crate::screening::exit_intent::{check_closing_phrase, check_exit_intent, KeywordDetector};
use crate::screening::fields::{format_candidate_summary, CandidateField, CandidateInfo, INFO_FIELDS};
use crate::screening::prompts::{
    answer_evaluation_prompt, conclusion_phase_prompt, conclusion_prompt, field_question_fallback,
    field_question_prompt, tech_stack_transition_reply, technical_questions_prompt,
    technical_questions_reply, validation_retry_reply, CONCLUSION_PHASE_OFFLINE_REPLY,
    EMPTY_INPUT_REPLY, EVALUATION_OFFLINE_REPLY, GREETING_PROMPT, SESSION_ENDED_REPLY,
    TECH_STACK_RETRY_REPLY,
};
use crate::screening::state::{ConversationPhase, Session};
use crate::screening::validators::{
    parse_tech_stack, sanitize_input, validate_email, validate_experience, validate_phone,
};

/// Turns of history forwarded with a technical answer (3 exchanges).
const EVALUATION_CONTEXT_TURNS: usize = 6;

/// Reply to one candidate message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub ended: bool,
}

impl Reply {
    fn open(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ended: false,
        }
    }

    fn ended(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ended: true,
        }
    }
}

/// Drives one candidate through the screening phases.
pub struct ConversationHandler {
    gateway: Gateway,
    session: Session,
    /// Custom vocabularies; `None` uses the shared default detectors.
    exit_detector: Option<KeywordDetector>,
    closing_detector: Option<KeywordDetector>,
}

impl ConversationHandler {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            session: Session::new(),
            exit_detector: None,
            closing_detector: None,
        }
    }

    pub fn with_exit_detector(mut self, detector: KeywordDetector) -> Self {
        self.exit_detector = Some(detector);
        self
    }

    pub fn with_closing_detector(mut self, detector: KeywordDetector) -> Self {
        self.closing_detector = Some(detector);
        self
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn phase(&self) -> ConversationPhase {
        self.session.phase
    }

    pub fn candidate_info(&self) -> &CandidateInfo {
        &self.session.fields
    }

    pub fn conversation_history(&self) -> &[ChatMessage] {
        &self.session.history
    }

    pub fn tech_stack(&self) -> &[String] {
        &self.session.tech_stack
    }

    pub fn field_cursor(&self) -> usize {
        self.session.field_cursor
    }

    pub fn technical_questions(&self) -> Option<&str> {
        self.session.technical_questions.as_deref()
    }

    pub fn is_ended(&self) -> bool {
        self.session.phase.is_terminal()
    }

    pub fn is_offline(&self) -> bool {
        self.gateway.is_offline()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Discards the session and the gateway's model context.
    pub fn reset(&mut self) {
        self.session = Session::new();
        self.gateway.reset();
    }

    /// Produces the first assistant turn and opens info gathering.
    pub async fn initial_greeting(&mut self) -> String {
        let greeting = self
            .gateway
            .generate(Prompt::new(GREETING_PROMPT).with_intent(PromptIntent::Greeting))
            .await;
        self.session.record_assistant(greeting.clone());
        if self.session.phase == ConversationPhase::Greeting {
            self.session.transition_to(ConversationPhase::InfoGathering);
        }
        greeting
    }

    /// Processes one raw candidate message.
    pub async fn process_message(&mut self, raw: &str) -> Reply {
        if self.session.phase.is_terminal() {
            return Reply::ended(SESSION_ENDED_REPLY);
        }

        let message = sanitize_input(raw);
        if message.is_empty() {
            return Reply::open(EMPTY_INPUT_REPLY);
        }

        self.session.record_user(message.clone());

        if self.is_exit(&message) {
            return self.handle_exit().await;
        }

        match self.session.phase {
            ConversationPhase::Greeting => {
                self.session.transition_to(ConversationPhase::InfoGathering);
                self.handle_info_gathering(&message).await
            }
            ConversationPhase::InfoGathering => self.handle_info_gathering(&message).await,
            ConversationPhase::TechStack => self.handle_tech_stack(&message).await,
            ConversationPhase::TechnicalQuestions => {
                self.handle_technical_questions(&message).await
            }
            ConversationPhase::Conclusion => self.handle_conclusion(&message).await,
            // Checked above; kept for exhaustiveness
            ConversationPhase::Ended => Reply::ended(SESSION_ENDED_REPLY),
        }
    }

    fn is_exit(&self, message: &str) -> bool {
        match &self.exit_detector {
            Some(detector) => detector.detect(message),
            None => check_exit_intent(message),
        }
    }

    fn is_closing(&self, message: &str) -> bool {
        match &self.closing_detector {
            Some(detector) => detector.detect(message),
            None => check_closing_phrase(message),
        }
    }

    // ── Phase handlers ────────────────────────────────────────────────────

    async fn handle_info_gathering(&mut self, message: &str) -> Reply {
        if self.session.field_cursor == 0 {
            self.session.store_field(CandidateField::FullName, message);
            self.session.field_cursor = 1;
        } else {
            let previous = INFO_FIELDS[self.session.field_cursor - 1];
            let accepted = match previous {
                CandidateField::Email => validate_email(message),
                CandidateField::Phone => validate_phone(message),
                _ => true,
            };
            if !accepted {
                debug!(field = %previous, "Rejected field value");
                return self.respond(validation_retry_reply(previous, message));
            }

            let value = match previous {
                CandidateField::YearsOfExperience => match validate_experience(message) {
                    Some(years) => format!("{years:?}"),
                    None => message.to_string(),
                },
                _ => message.to_string(),
            };
            self.session.store_field(previous, value);
        }

        if self.session.all_info_collected() {
            self.session.transition_to(ConversationPhase::TechStack);
            let name = self.session.fields.get(&CandidateField::FullName).cloned();
            return self.respond(tech_stack_transition_reply(name.as_deref()));
        }

        let next = INFO_FIELDS[self.session.field_cursor];
        self.session.advance_cursor();
        let question = self
            .gateway
            .generate(
                Prompt::new(field_question_prompt(next, message))
                    .with_intent(PromptIntent::General)
                    .with_offline_reply(field_question_fallback(next)),
            )
            .await;
        self.respond(question)
    }

    async fn handle_tech_stack(&mut self, message: &str) -> Reply {
        let parsed = parse_tech_stack(message);
        if parsed.is_empty() {
            return self.respond(TECH_STACK_RETRY_REPLY);
        }

        self.session.store_field(CandidateField::TechStack, message);
        self.session.tech_stack = parsed;
        self.session.transition_to(ConversationPhase::TechnicalQuestions);

        let experience = self
            .session
            .fields
            .get(&CandidateField::YearsOfExperience)
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);
        let position = self.session.fields.get(&CandidateField::DesiredPositions).cloned();

        info!(
            technologies = self.session.tech_stack.len(),
            experience, "Generating technical questions"
        );
        let questions = self
            .gateway
            .generate(
                Prompt::new(technical_questions_prompt(
                    &self.session.tech_stack,
                    experience,
                    position.as_deref(),
                ))
                .with_intent(PromptIntent::TechnicalQuestions),
            )
            .await;

        let reply = technical_questions_reply(&self.session.tech_stack, &questions);
        self.session.technical_questions = Some(questions);
        self.respond(reply)
    }

    async fn handle_technical_questions(&mut self, message: &str) -> Reply {
        if self.is_closing(message) {
            self.session.transition_to(ConversationPhase::Conclusion);
            let conclusion = self.generate_conclusion().await;
            return self.respond(conclusion);
        }

        let context = format_turns(self.session.recent_turns(EVALUATION_CONTEXT_TURNS));
        let evaluation = self
            .gateway
            .generate(
                Prompt::new(answer_evaluation_prompt(message))
                    .with_context(context)
                    .with_intent(PromptIntent::General)
                    .with_offline_reply(EVALUATION_OFFLINE_REPLY),
            )
            .await;
        self.respond(evaluation)
    }

    /// Exit keywords are handled before dispatch; anything else here is small
    /// talk after the application is complete.
    async fn handle_conclusion(&mut self, message: &str) -> Reply {
        let reply = self
            .gateway
            .generate(
                Prompt::new(conclusion_phase_prompt(message))
                    .with_intent(PromptIntent::General)
                    .with_offline_reply(CONCLUSION_PHASE_OFFLINE_REPLY),
            )
            .await;
        self.respond(reply)
    }

    async fn handle_exit(&mut self) -> Reply {
        self.session.transition_to(ConversationPhase::Ended);
        info!(
            fields = self.session.fields.len(),
            "Candidate ended the screening conversation"
        );
        let closing = self.generate_conclusion().await;
        self.session.record_assistant(closing.clone());
        Reply::ended(closing)
    }

    async fn generate_conclusion(&mut self) -> String {
        let summary = format_candidate_summary(&self.session.fields);
        self.gateway
            .generate(Prompt::new(conclusion_prompt(&summary)).with_intent(PromptIntent::Conclusion))
            .await
    }

    /// Records an assistant reply and wraps it for the caller.
    fn respond(&mut self, text: impl Into<String>) -> Reply {
        let text = text.into();
        self.session.record_assistant(text.clone());
        Reply::open(text)
    }
}

/// Renders turns as a "Candidate:/Assistant:" transcript for model context.
fn format_turns(turns: &[ChatMessage]) -> String {
    turns
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => "Candidate",
                Role::Assistant | Role::System => "Assistant",
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
