//! Gateway — turns an instruction into a reply, masking every remote failure.
//!
//! Owns the model-facing conversation buffer (preamble + sliding window of
//! recent turns), the retry/backoff loop, and the offline fallback. One
//! gateway per screening session; nothing here is shared between sessions
//! except the stateless `ChatBackend`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::llm_client::offline::PromptIntent;
use crate::llm_client::prompts::{PROBE_MAX_TOKENS, PROBE_PROMPT, SYSTEM_PROMPT};
use crate::llm_client::{ChatBackend, ChatMessage, Role, MAX_TOKENS, TEMPERATURE};

/// Most recent turns kept behind the preamble.
pub const RECENT_WINDOW: usize = 20;
/// Buffer length cap: preamble + `RECENT_WINDOW`.
pub const MAX_BUFFER_LEN: usize = RECENT_WINDOW + 1;

/// An instruction for the gateway.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub context: Option<String>,
    pub intent: PromptIntent,
    /// Overrides the intent's canned text when the gateway is offline.
    pub offline_reply: Option<String>,
}

impl Prompt {
    /// Builds a prompt whose intent is derived from its text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let intent = PromptIntent::classify(&text);
        Self {
            text,
            context: None,
            intent,
            offline_reply: None,
        }
    }

    pub fn with_intent(mut self, intent: PromptIntent) -> Self {
        self.intent = intent;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_offline_reply(mut self, reply: impl Into<String>) -> Self {
        self.offline_reply = Some(reply.into());
        self
    }

    /// The user-turn text sent to the model.
    fn render(&self) -> String {
        match &self.context {
            Some(context) => format!("Context:\n{context}\n\nTask:\n{}", self.text),
            None => self.text.clone(),
        }
    }

    fn offline_text(&self) -> String {
        self.offline_reply
            .clone()
            .unwrap_or_else(|| self.intent.offline_reply().to_string())
    }
}

/// Bounded retry with exponential backoff between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the zero-based `attempt` failed: 1s, 2s, 4s, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

pub struct Gateway {
    /// `None` means permanently offline for the lifetime of this instance.
    backend: Option<Arc<dyn ChatBackend>>,
    buffer: Vec<ChatMessage>,
    retry: RetryPolicy,
}

impl Gateway {
    /// A gateway that never touches the network.
    pub fn offline() -> Self {
        Self {
            backend: None,
            buffer: vec![ChatMessage::system(SYSTEM_PROMPT)],
            retry: RetryPolicy::default(),
        }
    }

    /// Builds a gateway, confirming the backend is reachable with one probe.
    ///
    /// Any probe failure (auth, network, empty reply) selects offline mode for
    /// good; it is never re-attempted.
    pub async fn connect(backend: Option<Arc<dyn ChatBackend>>) -> Self {
        let Some(backend) = backend else {
            info!("No usable API key configured; gateway running in offline mode");
            return Self::offline();
        };

        let probe = [ChatMessage::user(PROBE_PROMPT)];
        match backend
            .complete(&probe, PROBE_MAX_TOKENS, TEMPERATURE)
            .await
        {
            Ok(reply) if !reply.trim().is_empty() => Self {
                backend: Some(backend),
                ..Self::offline()
            },
            Ok(_) => {
                warn!("Model probe returned no text; gateway running in offline mode");
                Self::offline()
            }
            Err(e) => {
                warn!("Model probe failed ({e}); gateway running in offline mode");
                Self::offline()
            }
        }
    }

    pub fn is_offline(&self) -> bool {
        self.backend.is_none()
    }

    /// The model-facing buffer. Entry 0 is always the preamble.
    pub fn buffer(&self) -> &[ChatMessage] {
        &self.buffer
    }

    /// Drops everything but the preamble.
    pub fn reset(&mut self) {
        self.buffer.truncate(1);
    }

    /// Produces a reply for `prompt`. Never fails: after the retry budget is
    /// spent the offline reply for this prompt is returned instead.
    pub async fn generate(&mut self, prompt: Prompt) -> String {
        let Some(backend) = self.backend.clone() else {
            return prompt.offline_text();
        };

        let content = prompt.render();
        for attempt in 0..self.retry.max_attempts {
            self.buffer.push(ChatMessage::user(content.clone()));

            match backend.complete(&self.buffer, MAX_TOKENS, TEMPERATURE).await {
                Ok(reply) => {
                    self.buffer.push(ChatMessage::assistant(reply.clone()));
                    self.trim_to_window();
                    return reply;
                }
                Err(e) => {
                    // Roll back so the next attempt sends a consistent buffer
                    if self.buffer.last().is_some_and(|m| m.role == Role::User) {
                        self.buffer.pop();
                    }
                    if attempt + 1 < self.retry.max_attempts {
                        let delay = self.retry.delay_after(attempt);
                        warn!(
                            "LLM call attempt {} failed ({e}), retrying after {}ms...",
                            attempt + 1,
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!(
                            "LLM call failed after {} attempts ({e}); using offline reply",
                            self.retry.max_attempts
                        );
                    }
                }
            }
        }

        prompt.offline_text()
    }

    fn trim_to_window(&mut self) {
        if self.buffer.len() > MAX_BUFFER_LEN {
            let excess = self.buffer.len() - MAX_BUFFER_LEN;
            self.buffer.drain(1..1 + excess);
        }
    }
}
