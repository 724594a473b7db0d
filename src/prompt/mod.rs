// Prompt assembly
//
// The outgoing request is the behavior instructions, zero or more guidance
// messages chosen from the session state and the pending query, then the
// visible history and the new user message. Each guidance stage is an
// independent function returning at most one system message; `STAGES` fixes
// their order.

pub mod templates;

use crate::chat::ChatMessage;
use crate::profile::{ClientField, ClientInfo};
use crate::upload::UploadedFile;

/// Query terms that mark a question as being about "the client"
const CLIENT_TERMS: &[&str] = &["client", "person", "individual", "he", "she"];

/// Query terms that suggest a client is being discussed before any profile exists
const UNPROFILED_CLIENT_TERMS: &[&str] = &["client", "person", "individual", "disability", "condition"];

/// Query terms that point directly at an uploaded document
const DOCUMENT_TERMS: &[&str] = &["document", "pdf", "file", "resume", "summary", "analyze", "content"];

/// Broader lexicon of questions a knowledge-base document could answer
const DOCUMENT_INTENT_TERMS: &[&str] = &[
    "document", "guide", "manual", "policy", "practice", "training", "accessibility", "coach",
    "coaching", "skills", "best", "practices", "support", "assistance", "help", "formation", "work",
    "employment", "disability", "disabilities", "inclusion", "workplace", "adaptation",
    "accommodations", "communication", "assessment", "resources", "laws", "autonomy", "information",
    "development", "market", "integration",
];

const QUESTION_WORDS: &[&str] = &["how", "what", "which", "where", "why"];

/// Everything the assembler looks at for one request
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    /// Conversation so far, without the pending query
    pub history: &'a [ChatMessage],
    pub client_info: &'a ClientInfo,
    pub query: &'a str,
    /// Uploads in chronological order
    pub uploaded_files: &'a [UploadedFile],
    /// Names of documents known to the model's knowledge base
    pub known_documents: &'a [String],
    pub form_open: bool,
}

impl<'a> PromptInput<'a> {
    fn query_lower(&self) -> String {
        self.query.to_lowercase()
    }
}

/// A guidance stage: zero or one system message
pub type Stage = fn(&PromptInput<'_>) -> Option<ChatMessage>;

/// Guidance stages in the order their messages are sent
pub const STAGES: &[(&str, Stage)] = &[
    ("behavior", behavior_stage),
    ("client-context", client_context_stage),
    ("follow-up", follow_up_stage),
    ("client-focus", client_focus_stage),
    ("clarify", clarify_stage),
    ("document", document_stage),
];

/// Build the full message list for the completion endpoint.
///
/// Cannot fail: this is a pure transformation of the session state.
pub fn build_request(input: &PromptInput<'_>) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = STAGES
        .iter()
        .filter_map(|(name, stage)| {
            let message = stage(input);
            if message.is_some() {
                tracing::debug!(stage = *name, "guidance stage applied");
            }
            message
        })
        .collect();

    messages.extend(input.history.iter().filter(|m| !m.is_system()).cloned());
    messages.push(ChatMessage::user(input.query));
    messages
}

/// Always the first message
pub fn behavior_stage(_input: &PromptInput<'_>) -> Option<ChatMessage> {
    Some(ChatMessage::system(templates::BEHAVIOR_INSTRUCTIONS))
}

pub fn client_context_stage(input: &PromptInput<'_>) -> Option<ChatMessage> {
    if input.client_info.is_empty() {
        return None;
    }
    Some(ChatMessage::system(templates::client_context(input.client_info)))
}

/// Ask for the missing essentials, or for tailored advice once they are known
pub fn follow_up_stage(input: &PromptInput<'_>) -> Option<ChatMessage> {
    let info = input.client_info;
    if info.is_empty() {
        return None;
    }

    let mut missing = Vec::new();
    if !info.has(ClientField::Disability) {
        missing.push("disability type");
    }
    if !info.has(ClientField::Age) {
        missing.push("age");
    }
    if !info.has(ClientField::JobInterests) {
        missing.push("job interests or career goals");
    }

    let content = if missing.is_empty() {
        templates::tailored_advice(
            info.get(ClientField::Disability).unwrap_or_default(),
            info.get(ClientField::Age).unwrap_or_default(),
            info.get(ClientField::JobInterests).unwrap_or("not specified yet"),
        )
    } else {
        templates::missing_details(&missing)
    };
    Some(ChatMessage::system(content))
}

/// Whether the query talks about the profiled client
pub fn is_query_about_client(query: &str, info: &ClientInfo) -> bool {
    if !info.has(ClientField::Disability) && !info.has(ClientField::Name) {
        return false;
    }

    let lower = query.to_lowercase();
    let profile_terms = [
        ClientField::Name,
        ClientField::Disability,
        ClientField::JobInterests,
        ClientField::MedicalConditions,
    ]
    .into_iter()
    .filter_map(|f| info.get(f).map(str::to_lowercase));

    CLIENT_TERMS
        .iter()
        .map(|t| t.to_string())
        .chain(profile_terms)
        .any(|term| lower.contains(&term))
}

pub fn client_focus_stage(input: &PromptInput<'_>) -> Option<ChatMessage> {
    if !is_query_about_client(input.query, input.client_info) {
        return None;
    }

    let info = input.client_info;
    let who = match info.get(ClientField::Name) {
        Some(name) => format!("named {}", name),
        None => format!("with {}", info.get(ClientField::Disability).unwrap_or_default()),
    };
    Some(ChatMessage::system(templates::client_focus(&who)))
}

pub fn clarify_stage(input: &PromptInput<'_>) -> Option<ChatMessage> {
    if !input.client_info.is_empty() || input.form_open {
        return None;
    }

    let lower = input.query_lower();
    if UNPROFILED_CLIENT_TERMS.iter().any(|t| lower.contains(t)) {
        Some(ChatMessage::system(templates::CLARIFY_CLIENT))
    } else {
        None
    }
}

/// Whether the query is about an uploaded or known document
pub fn is_document_query(
    query: &str,
    uploaded_files: &[UploadedFile],
    known_documents: &[String],
) -> bool {
    let lower = query.to_lowercase();

    if DOCUMENT_TERMS.iter().any(|t| lower.contains(t)) {
        return true;
    }
    if uploaded_files
        .iter()
        .any(|f| lower.contains(&f.name.to_lowercase()))
    {
        return true;
    }
    if DOCUMENT_INTENT_TERMS.iter().any(|t| lower.contains(t))
        || QUESTION_WORDS.iter().any(|w| lower.contains(w))
    {
        return true;
    }

    known_documents.iter().any(|doc| {
        let stem = doc.to_lowercase();
        let stem = stem.split('.').next().unwrap_or_default();
        !stem.is_empty() && lower.contains(stem)
    })
}

pub fn document_stage(input: &PromptInput<'_>) -> Option<ChatMessage> {
    if !is_document_query(input.query, input.uploaded_files, input.known_documents) {
        return None;
    }

    let content = match input.uploaded_files.last() {
        Some(latest) => templates::document_focus(&latest.name),
        None => templates::NO_DOCUMENT_UPLOADED.to_string(),
    };
    Some(ChatMessage::system(content))
}
