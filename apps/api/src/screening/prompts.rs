// Screening LLM prompt templates.
// All prompts the dialogue state machine sends through the gateway are built here.

use crate::screening::fields::CandidateField;

pub const GREETING_PROMPT: &str = "\
Generate a warm, professional greeting for a new candidate starting \
the screening process. Include:
1. Welcome to TalentScout
2. Brief explanation of the screening purpose
3. Ask for their name to begin

Keep it concise (3-4 sentences), friendly, and professional.";

pub const EMPTY_INPUT_REPLY: &str = "I didn't quite catch that. Could you please try again?";

pub const SESSION_ENDED_REPLY: &str = "\
This screening session has ended and your information has been recorded. \
Thank you again for your time!";

pub const TECH_STACK_RETRY_REPLY: &str = "\
I'd like to understand your technical background better. Could you please \
specify the programming languages, frameworks, databases, or tools you work with? \
For example: Python, Django, PostgreSQL, Docker, etc.";

pub const CONCLUSION_PHASE_OFFLINE_REPLY: &str = "\
Thanks for your message! Your application is complete. \
Type 'bye' whenever you're ready to end the conversation.";

pub const EVALUATION_OFFLINE_REPLY: &str = "\
Thank you for your answer! Feel free to continue with the next question, \
or let me know when you're done.";

const DEFAULT_POSITION: &str = "Software Developer";

/// Question difficulty derived from years of experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProfile {
    pub difficulty: &'static str,
    pub focus: &'static str,
}

impl DifficultyProfile {
    pub fn for_experience(years: f64) -> Self {
        if years < 2.0 {
            Self {
                difficulty: "entry-level to intermediate",
                focus: "fundamental concepts, basic implementations, and learning ability",
            }
        } else if years < 5.0 {
            Self {
                difficulty: "intermediate to advanced",
                focus: "practical application, problem-solving, and best practices",
            }
        } else {
            Self {
                difficulty: "advanced to expert",
                focus: "system design, architecture decisions, and technical leadership",
            }
        }
    }
}

/// Asks the model to acknowledge the last answer and ask for `field`.
pub fn field_question_prompt(field: CandidateField, previous_answer: &str) -> String {
    format!(
        r#"The candidate just told us: "{previous_answer}"

Now we need to ask for their {}.
Generate a natural, conversational response that:
1. Briefly acknowledges what they said
2. Asks for: {}

Keep it friendly and concise (1-2 sentences)."#,
        field.key().replace('_', " "),
        field.prompt()
    )
}

/// Offline stand-in for `field_question_prompt`.
pub fn field_question_fallback(field: CandidateField) -> String {
    format!("Thank you! {}", field.prompt())
}

/// Re-prompt for a value that failed validation, naming the expected format.
pub fn validation_retry_reply(field: CandidateField, invalid_value: &str) -> String {
    match field {
        CandidateField::Email => format!(
            "I notice the email '{invalid_value}' might have a small typo. \
             Could you please provide a valid email address? For example: {}",
            field.format_hint().unwrap_or_default()
        ),
        CandidateField::Phone => format!(
            "I'd like to make sure I have your correct phone number. \
             Could you please provide it in a standard format? For example: {}",
            field.format_hint().unwrap_or_default()
        ),
        _ => format!(
            "Could you please provide a valid {}?",
            field.key().replace('_', " ")
        ),
    }
}

/// Fixed transition into the tech-stack phase.
pub fn tech_stack_transition_reply(name: Option<&str>) -> String {
    let name = name.filter(|n| !n.is_empty()).unwrap_or("there");
    format!(
        "Thank you for sharing that information, {name}! \
         Now, let's talk about your technical skills. \
         {} \
         The more detail you provide, the better I can assess your technical background.",
        CandidateField::TechStack.prompt()
    )
}

/// Asks the model for a question set sized to the candidate's experience.
pub fn technical_questions_prompt(
    tech_stack: &[String],
    experience_years: f64,
    position: Option<&str>,
) -> String {
    let profile = DifficultyProfile::for_experience(experience_years);
    let position = position.filter(|p| !p.is_empty()).unwrap_or(DEFAULT_POSITION);
    format!(
        "Generate technical interview questions for a candidate with the following profile:

Technologies: {}
Experience: {experience_years} years
Position: {position}
Difficulty Level: {}
Focus Areas: {}

For each technology, generate 3-5 questions that:
1. Test both theoretical understanding and practical knowledge
2. Include at least one scenario-based question
3. Cover common challenges and best practices
4. Are progressively challenging

Format the output clearly with technology headers and numbered questions.
Make questions specific and relevant to real-world scenarios.",
        tech_stack.join(", "),
        profile.difficulty,
        profile.focus
    )
}

/// Wraps the generated questions in an acknowledgment of the detected stack.
pub fn technical_questions_reply(tech_stack: &[String], questions: &str) -> String {
    format!(
        "Excellent! I can see you have experience with {}. \
         That's a great combination of skills!\n\n\
         Now, I'd like to ask you some technical questions to better understand \
         your proficiency. Please take your time with each question.\n\n\
         {questions}\n\n\
         Please share your thoughts on these questions. You can answer them in any order, \
         or let me know if you'd like to discuss any particular topic in more detail.",
        tech_stack.join(", ")
    )
}

/// Asks the model to briefly evaluate a technical answer.
pub fn answer_evaluation_prompt(latest_answer: &str) -> String {
    format!(
        "The candidate has provided responses to technical questions.

Their latest response: {latest_answer}

Evaluate their response professionally:
1. Acknowledge their answer briefly
2. If they answered well, provide positive feedback
3. If they want to discuss more or have questions, engage appropriately
4. After sufficient technical discussion, ask if they have any questions about the role or company

Keep the response concise and professional. Do not provide detailed answers or solutions."
    )
}

/// Closing message seeded with the candidate summary.
pub fn conclusion_prompt(candidate_summary: &str) -> String {
    format!(
        "The screening process is complete. Generate a professional closing message.

Candidate Summary:
{candidate_summary}

Include:
1. Thank them for their time
2. Confirm their information has been recorded
3. Explain next steps (review within 5-7 business days)
4. Provide contact email: hr@talentscout.com
5. End on a positive, encouraging note

Keep it professional and warm."
    )
}

pub fn conclusion_phase_prompt(message: &str) -> String {
    format!(
        "The candidate said: '{message}'. Respond briefly and professionally, \
         then remind them that their application is complete and they can type 'bye' to end."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_tiers() {
        assert_eq!(
            DifficultyProfile::for_experience(0.0).difficulty,
            "entry-level to intermediate"
        );
        assert_eq!(
            DifficultyProfile::for_experience(1.9).difficulty,
            "entry-level to intermediate"
        );
        assert_eq!(
            DifficultyProfile::for_experience(2.0).difficulty,
            "intermediate to advanced"
        );
        assert_eq!(
            DifficultyProfile::for_experience(4.5).difficulty,
            "intermediate to advanced"
        );
        assert_eq!(
            DifficultyProfile::for_experience(5.0).difficulty,
            "advanced to expert"
        );
        assert!(DifficultyProfile::for_experience(12.0)
            .focus
            .contains("system design"));
    }

    #[test]
    fn test_technical_questions_prompt_contents() {
        let stack = vec!["Rust".to_string(), "PostgreSQL".to_string()];
        let prompt = technical_questions_prompt(&stack, 3.0, None);
        assert!(prompt.contains("Technologies: Rust, PostgreSQL"));
        assert!(prompt.contains("Position: Software Developer"));
        assert!(prompt.contains("intermediate to advanced"));
        assert!(prompt.contains("3-5 questions"));
        assert!(prompt.contains("scenario-based"));
    }

    #[test]
    fn test_validation_retry_names_format() {
        let email = validation_retry_reply(CandidateField::Email, "ada(at)example");
        assert!(email.contains("ada(at)example"));
        assert!(email.contains("name@example.com"));

        let phone = validation_retry_reply(CandidateField::Phone, "12");
        assert!(phone.contains("+1234567890"));
    }

    #[test]
    fn test_field_question_prompt_mentions_field() {
        let prompt = field_question_prompt(CandidateField::YearsOfExperience, "ada@example.com");
        assert!(prompt.contains("years of experience"));
        assert!(prompt.contains("How many years of professional experience"));
        assert!(prompt.contains("\"ada@example.com\""));
    }

    #[test]
    fn test_tech_stack_transition_uses_name() {
        assert!(tech_stack_transition_reply(Some("Ada")).contains("information, Ada!"));
        assert!(tech_stack_transition_reply(None).contains("information, there!"));
    }
}
