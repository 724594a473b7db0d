// Coaching session: conversation, client profile, uploads and the glue
// between extraction, prompt assembly and the hosted services.

mod error;
pub mod notices;
mod state;

pub use error::SessionError;
pub use state::SessionState;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::chat::{ChatMessage, Conversation};
use crate::config::constants::{PRIMING_MAX_TOKENS, RECENT_SCAN_WINDOW};
use crate::logging::{EmailSummary, SummaryOutbox};
use crate::profile::{self, ClientField, ClientInfo};
use crate::prompt::{self, templates, PromptInput};
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::upload::{self, blob, DocumentStore, UploadCandidate, UploadRejection, UploadedFile};

/// What happened to a submitted query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input, nothing sent
    Ignored,
    /// The model replied; the reply is the last message
    Answered { form_opened: bool },
    /// The call failed; an apology is the last message
    Failed { form_opened: bool },
}

/// What happened to an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(UploadedFile),
    Rejected(UploadRejection),
    Failed,
}

/// In-memory state of one coaching session
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    conversation: Conversation,
    client_info: ClientInfo,
    /// Values that came from extraction rather than the coach
    auto_filled: ClientInfo,
    uploads: Vec<UploadedFile>,
    known_documents: Vec<String>,
    state: SessionState,
}

impl ChatSession {
    /// New session greeted by the welcome message
    pub fn new() -> Self {
        let mut session = Self::blank();
        session.conversation.add_assistant_message(notices::WELCOME);
        session
    }

    /// New session with an empty conversation
    pub fn blank() -> Self {
        Self::default()
    }

    /// Documents the model's knowledge base already holds
    pub fn with_known_documents(mut self, documents: Vec<String>) -> Self {
        self.known_documents = documents;
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    pub fn client_info(&self) -> &ClientInfo {
        &self.client_info
    }

    pub fn auto_filled(&self) -> &ClientInfo {
        &self.auto_filled
    }

    pub fn uploads(&self) -> &[UploadedFile] {
        &self.uploads
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Merge an extracted record; opens the form for review when the
    /// essentials were just learned. Returns whether the form was opened.
    fn absorb(&mut self, extracted: &ClientInfo) -> bool {
        let outcome = profile::merge(&self.client_info, extracted);
        if !outcome.filled.is_empty() {
            info!(fields = ?outcome.filled, "Client details picked up from conversation");
        }
        for field in &outcome.filled {
            if let Some(value) = outcome.info.get(*field) {
                self.auto_filled.set(*field, value);
            }
        }
        let review = outcome.needs_review() && !self.state.form_open();
        self.client_info = outcome.info;
        if review {
            self.state.open_form();
        }
        review
    }

    /// Look for client details in the most recent messages, oldest first,
    /// and merge the first accepted extraction only.
    fn scan_recent(&mut self) -> bool {
        let found = self
            .conversation
            .recent(RECENT_SCAN_WINDOW)
            .iter()
            .find_map(profile::extract);

        match found {
            Some(extracted) => self.absorb(&extracted),
            None => false,
        }
    }

    /// Messages that would be sent for `query` right now
    pub fn build_request(&self, query: &str) -> Vec<ChatMessage> {
        prompt::build_request(&PromptInput {
            history: self.conversation.messages(),
            client_info: &self.client_info,
            query,
            uploaded_files: &self.uploads,
            known_documents: &self.known_documents,
            form_open: self.state.form_open(),
        })
    }

    /// Send a query to the model.
    ///
    /// The user message and then either the reply or one apology are
    /// appended. Failures are never retried.
    pub async fn submit(
        &mut self,
        query: &str,
        provider: &dyn CompletionProvider,
    ) -> Result<TurnOutcome, SessionError> {
        if query.trim().is_empty() {
            return Ok(TurnOutcome::Ignored);
        }
        self.state.begin_request()?;

        let mut form_opened = self.scan_recent();

        let request = CompletionRequest::new(self.build_request(query));
        self.conversation.add_user_message(query);

        debug!(provider = provider.name(), messages = request.messages.len(), "Submitting query");
        let outcome = match provider.complete(&request).await {
            Ok(reply) => {
                let reply = ChatMessage::assistant(reply);
                if let Some(extracted) = profile::extract(&reply) {
                    form_opened |= self.absorb(&extracted);
                }
                self.conversation.push(reply);
                TurnOutcome::Answered { form_opened }
            }
            Err(e) => {
                error!("Completion request failed: {:#}", e);
                self.conversation.add_assistant_message(notices::COMPLETION_FAILED);
                TurnOutcome::Failed { form_opened }
            }
        };

        self.state.finish_request();
        Ok(outcome)
    }

    /// Validate and upload a document, then let the model know about it.
    ///
    /// Rejections and failures are reported as assistant messages.
    pub async fn upload(
        &mut self,
        candidate: UploadCandidate,
        store: Option<&dyn DocumentStore>,
        provider: &dyn CompletionProvider,
    ) -> Result<UploadOutcome, SessionError> {
        if self.state.is_busy() {
            return Err(SessionError::Busy);
        }

        if let Err(rejection) = upload::validate(&candidate) {
            warn!(file = %candidate.name, "Upload rejected: {}", rejection);
            self.conversation.add_assistant_message(rejection.to_string());
            return Ok(UploadOutcome::Rejected(rejection));
        }

        self.state.begin_request()?;

        let now = Utc::now();
        let storage_key = blob::blob_name(&candidate.name, now.timestamp_millis());
        let content_type = candidate.content_type().to_string();
        let name = candidate.name.clone();

        let stored = match store {
            Some(store) => store.put(&storage_key, candidate.into_bytes(), &content_type).await,
            None => Err(anyhow::anyhow!("Blob storage is not configured")),
        };

        let outcome = match stored {
            Ok(url) => {
                let file = UploadedFile {
                    name: name.clone(),
                    storage_key,
                    url,
                    timestamp: now,
                };
                info!(file = %file.name, url = %file.url, "Document uploaded");
                self.uploads.push(file.clone());
                self.conversation
                    .add_assistant_message(notices::document_received(&name));

                if !self.client_info.has(ClientField::Disability) && !self.state.form_open() {
                    self.state.open_form();
                }

                self.announce_document(&name, provider).await;
                UploadOutcome::Uploaded(file)
            }
            Err(e) => {
                error!("Error uploading file: {:#}", e);
                self.conversation.add_assistant_message(notices::UPLOAD_FAILED);
                UploadOutcome::Failed
            }
        };

        self.state.finish_request();
        Ok(outcome)
    }

    /// Short call telling the model a document exists. The reply is not
    /// shown and a failure does not undo the upload.
    async fn announce_document(&self, name: &str, provider: &dyn CompletionProvider) {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(templates::BEHAVIOR_INSTRUCTIONS),
            ChatMessage::system(templates::document_uploaded(name)),
        ])
        .with_max_tokens(PRIMING_MAX_TOKENS);

        if let Err(e) = provider.complete(&request).await {
            warn!("Document announcement failed: {:#}", e);
        }
    }

    pub fn open_form(&mut self) {
        self.state.open_form();
    }

    /// Edit a profile field. Unlike extraction, this overwrites.
    pub fn set_field(&mut self, field: ClientField, value: &str) -> Result<(), SessionError> {
        if !self.state.form_open() {
            return Err(SessionError::FormClosed);
        }
        self.client_info.set(field, value);
        Ok(())
    }

    /// Save the form: disability and age are required.
    pub fn submit_form(&mut self) -> Result<(), SessionError> {
        if !self.state.form_open() {
            return Err(SessionError::FormClosed);
        }

        let missing: Vec<ClientField> = [ClientField::Disability, ClientField::Age]
            .into_iter()
            .filter(|f| !self.client_info.has(*f))
            .collect();
        if !missing.is_empty() {
            return Err(SessionError::MissingRequired(missing));
        }

        self.state.close_form();
        self.conversation
            .add_assistant_message(notices::profile_saved(&self.client_info));
        Ok(())
    }

    /// Close the form; edits already made are kept
    pub fn cancel_form(&mut self) {
        self.state.close_form();
    }

    /// Whether to show the "client information detected" hint: the form
    /// is closed, something is known, and an essential is still missing.
    pub fn needs_profile_hint(&self) -> bool {
        let info = &self.client_info;
        let something_known = info.has(ClientField::Disability)
            || info.has(ClientField::Name)
            || info.has(ClientField::Age);
        let essential_missing = !info.has(ClientField::Disability)
            || !info.has(ClientField::Age)
            || !info.has(ClientField::JobInterests);

        !self.state.form_open() && something_known && essential_missing
    }

    /// "Send via email": queue a summary of the session in the outbox.
    ///
    /// Returns the summary id when one was queued.
    pub async fn send_summary(
        &mut self,
        outbox: &SummaryOutbox,
    ) -> Result<Option<String>, SessionError> {
        if self.conversation.is_empty() {
            self.conversation
                .reset_to_assistant_message(notices::NO_CHAT_CONTENT);
            return Ok(None);
        }

        self.state.begin_request()?;

        let summary = EmailSummary::new(
            self.conversation.messages().to_vec(),
            self.uploads.clone(),
            self.client_info.clone(),
        );

        let delivered = match outbox.deliver(&summary).await {
            Ok(id) => {
                self.conversation.add_assistant_message(notices::SUMMARY_SENT);
                Some(id)
            }
            Err(e) => {
                error!("Error sending email: {:#}", e);
                self.conversation.add_assistant_message(notices::SUMMARY_FAILED);
                None
            }
        };

        self.state.finish_request();
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies from a script and records every request
    struct ScriptedProvider {
        replies: Mutex<Vec<Result<String, String>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Ok("ok".to_string());
            }
            replies.remove(0).map_err(|e| anyhow::anyhow!(e))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct MemoryStore;

    #[async_trait]
    impl DocumentStore for MemoryStore {
        async fn put(&self, blob_name: &str, _body: Vec<u8>, _content_type: &str) -> Result<String> {
            Ok(format!("memory://uploads/{}", blob_name))
        }
    }

    #[tokio::test]
    async fn test_welcome_message() {
        let session = ChatSession::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].content, notices::WELCOME);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_blank_query_is_ignored() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ChatSession::new();
        let outcome = session.submit("   ", &provider).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Ignored);
        assert!(provider.requests().is_empty());
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_is_appended_and_mined() {
        let provider = ScriptedProvider::new(vec![Ok(
            "To confirm: the client's name is Maria, age 34, with a visual disability.".to_string(),
        )]);
        let mut session = ChatSession::new();

        let outcome = session
            .submit("I'm working with Maria, 34, she is blind", &provider)
            .await
            .unwrap();

        assert_eq!(outcome, TurnOutcome::Answered { form_opened: true });
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[1].role, Role::User);
        assert_eq!(session.client_info().get(ClientField::Name), Some("Maria"));
        assert_eq!(session.client_info().get(ClientField::Age), Some("34"));
        assert_eq!(session.state(), SessionState::FormOpen);
        assert_eq!(session.auto_filled().get(ClientField::Name), Some("Maria"));
    }

    #[tokio::test]
    async fn test_failure_appends_single_apology() {
        let provider = ScriptedProvider::new(vec![Err("HTTP 500".to_string())]);
        let mut session = ChatSession::new();

        let outcome = session.submit("hello", &provider).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Failed { form_opened: false });

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, notices::WELCOME);
        assert_eq!(messages[2], ChatMessage::assistant(notices::COMPLETION_FAILED));
        assert!(session.client_info().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_request_uses_history_then_query() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ChatSession::new();
        session.submit("first", &provider).await.unwrap();
        session.submit("second", &provider).await.unwrap();

        let last = provider.requests().pop().unwrap();
        let replay: Vec<&str> = last
            .messages
            .iter()
            .filter(|m| !m.is_system())
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(replay, vec![notices::WELCOME, "first", "ok", "second"]);
    }

    #[tokio::test]
    async fn test_recent_scan_feeds_profile_into_prompt() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ChatSession::new();
        // Already in the history, so only the pre-query scan can see it
        session.conversation.add_assistant_message(
            "Client details noted: he has a hearing disability.",
        );

        let outcome = session.submit("What jobs suit him?", &provider).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Answered { form_opened: true });

        let request = provider.requests().pop().unwrap();
        assert!(request
            .messages
            .iter()
            .any(|m| m.is_system() && m.content.contains("Disability Type: hearing")));
    }

    #[tokio::test]
    async fn test_recent_scan_stops_at_first_hit() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ChatSession::blank();
        session
            .conversation
            .add_assistant_message("Client details: she has a cognitive disability.");
        session
            .conversation
            .add_assistant_message("Client details: the client is named Ana and is 30 years old.");

        session.submit("next steps?", &provider).await.unwrap();
        assert_eq!(
            session.client_info().get(ClientField::Disability),
            Some("cognitive")
        );
        // The newer message was never merged
        assert!(!session.client_info().has(ClientField::Name));
    }

    #[tokio::test]
    async fn test_recent_scan_ignores_older_messages() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ChatSession::blank();
        session
            .conversation
            .add_assistant_message("Client details: she has a cognitive disability.");
        for i in 0..5 {
            session.conversation.add_user_message(format!("filler {}", i));
        }

        let outcome = session.submit("next steps?", &provider).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Answered { form_opened: false });
        assert!(session.client_info().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_extraction_never_overwrites() {
        let provider = ScriptedProvider::new(vec![Ok(
            "Client update: she has a physical disability.".to_string(),
        )]);
        let mut session = ChatSession::new();
        session.open_form();
        session.set_field(ClientField::Disability, "visual").unwrap();
        session.cancel_form();

        session.submit("thoughts?", &provider).await.unwrap();
        assert_eq!(session.client_info().get(ClientField::Disability), Some("visual"));
    }

    #[tokio::test]
    async fn test_busy_session_refuses_requests() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ChatSession::new();
        session.state.begin_request().unwrap();

        assert_eq!(session.submit("hi", &provider).await, Err(SessionError::Busy));
        let candidate = UploadCandidate::new("a.txt", None, b"x".to_vec());
        assert_eq!(
            session.upload(candidate, Some(&MemoryStore), &provider).await,
            Err(SessionError::Busy)
        );
    }

    #[tokio::test]
    async fn test_upload_records_file_and_announces_it() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ChatSession::new();
        let candidate = UploadCandidate::new("plan.pdf", Some("application/pdf".into()), vec![1; 64]);

        let outcome = session
            .upload(candidate, Some(&MemoryStore), &provider)
            .await
            .unwrap();

        let file = match outcome {
            UploadOutcome::Uploaded(file) => file,
            other => panic!("expected upload, got {:?}", other),
        };
        assert!(file.storage_key.ends_with("-plan.pdf"));
        assert!(file.url.starts_with("memory://uploads/"));
        assert_eq!(session.uploads().len(), 1);
        assert!(session.messages().last().unwrap().content.contains("\"plan.pdf\""));
        // No disability known yet, so the form opens
        assert_eq!(session.state(), SessionState::FormOpen);

        let priming = provider.requests().pop().unwrap();
        assert_eq!(priming.max_tokens, Some(PRIMING_MAX_TOKENS));
        assert!(priming.messages[1].content.contains("plan.pdf"));
    }

    #[tokio::test]
    async fn test_upload_rejection_is_conversational() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ChatSession::new();
        let candidate = UploadCandidate::new("photo.png", Some("image/png".into()), vec![0; 10]);

        let outcome = session
            .upload(candidate, Some(&MemoryStore), &provider)
            .await
            .unwrap();
        assert!(matches!(outcome, UploadOutcome::Rejected(UploadRejection::UnsupportedType { .. })));
        assert!(session.uploads().is_empty());
        assert!(provider.requests().is_empty());
        assert_eq!(session.messages().last().unwrap().role, Role::Assistant);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_upload_without_storage_fails_softly() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = ChatSession::new();
        let candidate = UploadCandidate::new("notes.txt", None, vec![0; 10]);

        let outcome = session.upload(candidate, None, &provider).await.unwrap();
        assert_eq!(outcome, UploadOutcome::Failed);
        assert_eq!(
            session.messages().last().unwrap().content,
            notices::UPLOAD_FAILED
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_form_flow() {
        let mut session = ChatSession::new();
        assert_eq!(
            session.set_field(ClientField::Age, "40"),
            Err(SessionError::FormClosed)
        );

        session.open_form();
        session.set_field(ClientField::Age, "40").unwrap();
        assert_eq!(
            session.submit_form(),
            Err(SessionError::MissingRequired(vec![ClientField::Disability]))
        );

        session.set_field(ClientField::Disability, "hearing impairment").unwrap();
        session.submit_form().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session
            .messages()
            .last()
            .unwrap()
            .content
            .starts_with("Thank you for providing information about your client."));
    }

    #[test]
    fn test_profile_hint() {
        let mut session = ChatSession::new();
        assert!(!session.needs_profile_hint());

        session.open_form();
        session.set_field(ClientField::Name, "Leo").unwrap();
        // Hidden while the form is open
        assert!(!session.needs_profile_hint());

        session.cancel_form();
        assert!(session.needs_profile_hint());

        session.open_form();
        session.set_field(ClientField::Disability, "autism").unwrap();
        session.set_field(ClientField::Age, "22").unwrap();
        session.set_field(ClientField::JobInterests, "IT").unwrap();
        session.cancel_form();
        assert!(!session.needs_profile_hint());
    }

    #[tokio::test]
    async fn test_send_summary_on_empty_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = SummaryOutbox::new(dir.path().join("outbox.jsonl")).unwrap();
        let mut session = ChatSession::blank();

        assert_eq!(session.send_summary(&outbox).await.unwrap(), None);
        assert_eq!(session.messages(), &[ChatMessage::assistant(notices::NO_CHAT_CONTENT)]);
        assert!(outbox.entries().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_summary_queues_session() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = SummaryOutbox::new(dir.path().join("outbox.jsonl")).unwrap();
        let mut session = ChatSession::new();

        let id = session.send_summary(&outbox).await.unwrap().unwrap();
        let entries = outbox.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].conversation.len(), 1);
        assert_eq!(session.messages().last().unwrap().content, notices::SUMMARY_SENT);
    }
}
