use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::llm_client::ChatMessage;
use crate::screening::fields::CandidateInfo;

pub const DATA_HANDLING_NOTICE: &str = "This data is collected for recruitment purposes only.";

/// Write-once record of a finished (or exported) screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_id: String,
    /// ISO-8601, local time.
    pub submission_timestamp: String,
    pub candidate_info: CandidateInfo,
    pub conversation_history: Vec<ChatMessage>,
    pub data_handling_notice: String,
}

impl CandidateRecord {
    pub fn from_session(
        candidate_info: &CandidateInfo,
        conversation_history: &[ChatMessage],
        submitted_at: DateTime<Local>,
    ) -> Self {
        Self {
            candidate_id: candidate_id(submitted_at),
            submission_timestamp: submitted_at.to_rfc3339(),
            candidate_info: candidate_info.clone(),
            conversation_history: conversation_history.to_vec(),
            data_handling_notice: DATA_HANDLING_NOTICE.to_string(),
        }
    }
}

/// `candidate_<YYYYMMDD_HHMMSS>` derived from the submission time.
pub fn candidate_id(submitted_at: DateTime<Local>) -> String {
    submitted_at.format("candidate_%Y%m%d_%H%M%S").to_string()
}
