// Heuristic client-profile extraction from assistant messages
//
// Only assistant messages are scanned: the model paraphrases and confirms
// what the coach shared, which is a cleaner source than raw user text.

use anyhow::Result;
use once_cell::sync::Lazy;
use tracing::debug;

use super::client_info::{ClientField, ClientInfo};
use super::patterns::{default_patterns, FieldPatterns};
use crate::chat::{ChatMessage, Role};

/// At least one of these must appear before any pattern is tried.
const GATE_TERMS: &[&str] = &["client", "information", "details", "disability"];

static DEFAULT_EXTRACTOR: Lazy<ClientInfoExtractor> = Lazy::new(|| {
    ClientInfoExtractor::with_default_patterns().expect("built-in client patterns must compile")
});

/// Extract a partial client profile from one message using the built-in
/// phrasings. See [`ClientInfoExtractor::extract`].
pub fn extract(message: &ChatMessage) -> Option<ClientInfo> {
    DEFAULT_EXTRACTOR.extract(message)
}

/// Normalize free-form skill wording into Beginner / Intermediate /
/// Advanced. Unrecognized wording is passed through unchanged.
pub fn normalize_skill_level(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["beginner", "basic", "limited"]) {
        "Beginner".to_string()
    } else if has(&["intermediate", "moderate"]) {
        "Intermediate".to_string()
    } else if has(&["advanced", "expert", "significant"]) {
        "Advanced".to_string()
    } else {
        raw.trim().to_string()
    }
}

/// Scans assistant messages for client details
pub struct ClientInfoExtractor {
    table: Vec<FieldPatterns>,
}

impl ClientInfoExtractor {
    pub fn new(table: Vec<FieldPatterns>) -> Self {
        Self { table }
    }

    /// Create an extractor with the built-in phrasing table
    pub fn with_default_patterns() -> Result<Self> {
        Ok(Self::new(default_patterns()?))
    }

    /// Extract a partial profile from `message`.
    ///
    /// Returns `None` for non-assistant messages, for text that never
    /// mentions a client/information/details/disability, and for records
    /// that have neither a disability longer than two characters nor both a
    /// name and an age.
    pub fn extract(&self, message: &ChatMessage) -> Option<ClientInfo> {
        if message.role != Role::Assistant {
            return None;
        }

        let lower = message.content.to_lowercase();
        if !GATE_TERMS.iter().any(|term| lower.contains(term)) {
            return None;
        }

        let mut info = ClientInfo::new();
        for field_patterns in &self.table {
            if let Some((pattern, value)) = field_patterns.first_match(&message.content) {
                let value = match field_patterns.field {
                    ClientField::SkillLevel => normalize_skill_level(value),
                    _ => value.trim().to_string(),
                };
                debug!(field = %field_patterns.field, pattern, value = %value, "client detail matched");
                info.set(field_patterns.field, value);
            }
        }

        let disability_long_enough = info
            .get(ClientField::Disability)
            .map(|d| d.chars().count() > 2)
            .unwrap_or(false);
        let has_name_and_age = info.has(ClientField::Name) && info.has(ClientField::Age);

        if disability_long_enough || has_name_and_age {
            Some(info)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant(text: &str) -> ChatMessage {
        ChatMessage::assistant(text)
    }

    #[test]
    fn test_extracts_name_age_disability() {
        let info = extract(&assistant(
            "The client's name is Maria, age 34, with a visual disability.",
        ))
        .expect("record should be accepted");

        assert_eq!(info.get(ClientField::Name), Some("Maria"));
        assert_eq!(info.get(ClientField::Age), Some("34"));
        assert!(info.get(ClientField::Disability).unwrap().contains("visual"));
    }

    #[test]
    fn test_ignores_non_assistant_roles() {
        let text = "The client's name is Maria, age 34, with a visual disability.";
        assert!(extract(&ChatMessage::user(text)).is_none());
        assert!(extract(&ChatMessage::system(text)).is_none());
    }

    #[test]
    fn test_gate_rejects_unrelated_text() {
        // Would match the age and name patterns, but never mentions a client
        let msg = assistant("My cat is named Tom and he is 3 years old.");
        assert!(extract(&msg).is_none());
    }

    #[test]
    fn test_gate_is_case_insensitive() {
        let msg = assistant("CLIENT DETAILS: he has a hearing disability.");
        let info = extract(&msg).unwrap();
        assert_eq!(info.get(ClientField::Disability), Some("hearing"));
    }

    #[test]
    fn test_name_alone_is_discarded() {
        let msg = assistant("Thanks! So your client is named John.");
        assert!(extract(&msg).is_none());
    }

    #[test]
    fn test_name_and_age_without_disability_is_accepted() {
        let msg = assistant("To confirm the details: the client is named Priya and is 52 years old.");
        let info = extract(&msg).unwrap();
        assert_eq!(info.get(ClientField::Name), Some("Priya"));
        assert_eq!(info.get(ClientField::Age), Some("52"));
        assert!(!info.has(ClientField::Disability));
    }

    #[test]
    fn test_medical_and_job_interests() {
        let msg = assistant(
            "Client details: she has a cognitive disability, has been diagnosed with epilepsy. \
             She would like to work in a library.",
        );
        let info = extract(&msg).unwrap();
        assert_eq!(info.get(ClientField::Disability), Some("cognitive"));
        assert_eq!(info.get(ClientField::MedicalConditions), Some("epilepsy"));
        assert_eq!(info.get(ClientField::JobInterests), Some("library"));
    }

    #[test]
    fn test_skill_level_is_normalized() {
        let msg = assistant("Client summary: he has a physical disability and has limited experience.");
        let info = extract(&msg).unwrap();
        assert_eq!(info.get(ClientField::SkillLevel), Some("Beginner"));

        let msg = assistant("The client has a learning disability; intermediate level in retail.");
        let info = extract(&msg).unwrap();
        assert_eq!(info.get(ClientField::SkillLevel), Some("Intermediate"));
    }

    #[test]
    fn test_normalize_skill_level_buckets() {
        assert_eq!(normalize_skill_level("basic"), "Beginner");
        assert_eq!(normalize_skill_level("moderate"), "Intermediate");
        assert_eq!(normalize_skill_level("expert"), "Advanced");
        assert_eq!(normalize_skill_level("significant"), "Advanced");
        assert_eq!(normalize_skill_level(" some "), "some");
    }
}
