pub mod conversation;
pub mod exit_intent;
pub mod fields;
pub mod handlers;
pub mod prompts;
pub mod state;
pub mod validators;
