//! Offline replies — canned text returned when the model is unreachable.
//!
//! The table is keyed by `PromptIntent`. Callers pass the intent explicitly;
//! `PromptIntent::classify` only exists for prompts built without one.

use serde::{Deserialize, Serialize};

/// What a prompt is asking the model to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptIntent {
    Greeting,
    TechnicalQuestions,
    Conclusion,
    General,
}

impl PromptIntent {
    /// Derives an intent from the instruction text by keyword.
    ///
    /// Checked in order: greeting/welcome, technical/question, conclusion/closing.
    pub fn classify(prompt: &str) -> Self {
        let lower = prompt.to_lowercase();
        if lower.contains("greeting") || lower.contains("welcome") {
            Self::Greeting
        } else if lower.contains("technical") || lower.contains("question") {
            Self::TechnicalQuestions
        } else if lower.contains("conclusion") || lower.contains("closing") {
            Self::Conclusion
        } else {
            Self::General
        }
    }

    /// The canned reply for this intent.
    pub fn offline_reply(&self) -> &'static str {
        match self {
            Self::Greeting => OFFLINE_GREETING,
            Self::TechnicalQuestions => OFFLINE_TECHNICAL_QUESTIONS,
            Self::Conclusion => OFFLINE_CONCLUSION,
            Self::General => OFFLINE_ACKNOWLEDGMENT,
        }
    }
}

pub const OFFLINE_GREETING: &str = "\
👋 Welcome to TalentScout! I'm your AI Hiring Assistant.

I'm here to help with your initial screening for tech positions. \
This process will take about 5-10 minutes.

**Note:** Running in DEMO MODE - Connect a valid API key for full AI capabilities.

Let's get started! **What is your full name?**";

pub const OFFLINE_TECHNICAL_QUESTIONS: &str = "\
Based on your tech stack, here are some technical questions:

**Python:**
1. Explain the difference between `list` and `tuple` in Python.
2. What is a decorator and how would you use it?
3. How does Python handle memory management?

Please share your thoughts on these questions!";

pub const OFFLINE_CONCLUSION: &str = "\
🎉 Thank you for completing the screening process!

**Next Steps:**
- Our team will review your responses within 5-7 business days
- If selected, you'll receive an email for the next interview round
- For questions, contact us at hr@talentscout.com

We appreciate your time and interest in TalentScout. Good luck! 🍀";

pub const OFFLINE_ACKNOWLEDGMENT: &str = "\
Thank you for your response! This is helpful information.

Would you like to continue with the screening process?";
