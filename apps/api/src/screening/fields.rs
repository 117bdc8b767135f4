use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A piece of candidate data collected during screening.
///
/// Declaration order is collection order; `CandidateInfo` iterates in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateField {
    FullName,
    Email,
    Phone,
    YearsOfExperience,
    DesiredPositions,
    CurrentLocation,
    TechStack,
}

/// Collected values keyed by field.
pub type CandidateInfo = BTreeMap<CandidateField, String>;

/// The six fields gathered one prompt at a time in the info-gathering phase.
/// `TechStack` has its own phase and is not part of this schema.
pub const INFO_FIELDS: [CandidateField; 6] = [
    CandidateField::FullName,
    CandidateField::Email,
    CandidateField::Phone,
    CandidateField::YearsOfExperience,
    CandidateField::DesiredPositions,
    CandidateField::CurrentLocation,
];

impl CandidateField {
    pub const ALL: [CandidateField; 7] = [
        CandidateField::FullName,
        CandidateField::Email,
        CandidateField::Phone,
        CandidateField::YearsOfExperience,
        CandidateField::DesiredPositions,
        CandidateField::CurrentLocation,
        CandidateField::TechStack,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::YearsOfExperience => "years_of_experience",
            Self::DesiredPositions => "desired_positions",
            Self::CurrentLocation => "current_location",
            Self::TechStack => "tech_stack",
        }
    }

    /// The question asked to collect this field.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::FullName => "What is your full name?",
            Self::Email => "What is your email address?",
            Self::Phone => "What is your phone number?",
            Self::YearsOfExperience => "How many years of professional experience do you have?",
            Self::DesiredPositions => "What position(s) are you interested in?",
            Self::CurrentLocation => "Where are you currently located?",
            Self::TechStack => {
                "Please tell me about your tech stack - including programming languages, \
                 frameworks, databases, and tools you're proficient in."
            }
        }
    }

    /// Human-readable label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::Email => "Email Address",
            Self::Phone => "Phone Number",
            Self::YearsOfExperience => "Years of Experience",
            Self::DesiredPositions => "Desired Position(s)",
            Self::CurrentLocation => "Current Location",
            Self::TechStack => "Tech Stack",
        }
    }

    /// Example of the expected format, for fields that are validated.
    pub fn format_hint(&self) -> Option<&'static str> {
        match self {
            Self::Email => Some("name@example.com"),
            Self::Phone => Some("+1234567890 or 123-456-7890"),
            _ => None,
        }
    }
}

impl std::fmt::Display for CandidateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Renders every field (collected or not) as a plain-text block, used to seed
/// closing messages.
pub fn format_candidate_summary(info: &CandidateInfo) -> String {
    let rule = "=".repeat(50);
    let mut lines = vec![rule.clone(), "CANDIDATE SUMMARY".to_string(), rule.clone()];

    for field in CandidateField::ALL {
        let value = info.get(&field).map(String::as_str).unwrap_or("Not provided");
        lines.push(format!("{}: {}", field.label(), value));
    }

    lines.push(rule);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_fields_are_the_first_six() {
        assert_eq!(INFO_FIELDS.len(), 6);
        assert_eq!(&CandidateField::ALL[..6], &INFO_FIELDS[..]);
        assert!(!INFO_FIELDS.contains(&CandidateField::TechStack));
    }

    #[test]
    fn test_display_matches_serde() {
        for field in CandidateField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(format!("\"{field}\""), json);
        }
    }

    #[test]
    fn test_candidate_info_serializes_in_collection_order() {
        let mut info = CandidateInfo::new();
        info.insert(CandidateField::Phone, "+1234567890".to_string());
        info.insert(CandidateField::FullName, "Ada Lovelace".to_string());
        info.insert(CandidateField::Email, "ada@example.com".to_string());

        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(
            json,
            r#"{"full_name":"Ada Lovelace","email":"ada@example.com","phone":"+1234567890"}"#
        );
    }

    #[test]
    fn test_summary_marks_missing_fields() {
        let mut info = CandidateInfo::new();
        info.insert(CandidateField::FullName, "Ada Lovelace".to_string());

        let summary = format_candidate_summary(&info);
        assert!(summary.contains("CANDIDATE SUMMARY"));
        assert!(summary.contains("Full Name: Ada Lovelace"));
        assert!(summary.contains("Email Address: Not provided"));
        assert!(summary.contains("Tech Stack: Not provided"));
    }

    #[test]
    fn test_format_hints_only_for_validated_fields() {
        assert!(CandidateField::Email.format_hint().is_some());
        assert!(CandidateField::Phone.format_hint().is_some());
        assert!(CandidateField::CurrentLocation.format_hint().is_none());
    }
}
