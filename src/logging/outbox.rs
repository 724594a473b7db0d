// Conversation summary outbox
//
// "Send via email" has no mail backend: summaries are appended to a JSONL
// outbox file that a delivery service can pick up.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::chat::ChatMessage;
use crate::profile::ClientInfo;
use crate::upload::UploadedFile;

/// Everything a coach would receive by email
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    /// Unique ID for this summary
    pub id: String,

    pub conversation: Vec<ChatMessage>,

    pub attachments: Vec<UploadedFile>,

    pub client_info: ClientInfo,

    pub timestamp: DateTime<Utc>,
}

impl EmailSummary {
    pub fn new(
        conversation: Vec<ChatMessage>,
        attachments: Vec<UploadedFile>,
        client_info: ClientInfo,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation,
            attachments,
            client_info,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only JSONL outbox
pub struct SummaryOutbox {
    path: PathBuf,
}

impl SummaryOutbox {
    /// Create an outbox, making sure its directory exists
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create outbox directory")?;
        }
        Ok(Self { path })
    }

    /// Queue a summary, returning its id
    pub async fn deliver(&self, summary: &EmailSummary) -> Result<String> {
        let json = serde_json::to_string(summary).context("Failed to serialize summary")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open outbox file")?;
        writeln!(file, "{}", json).context("Failed to write summary")?;

        debug!(
            id = %summary.id,
            messages = summary.conversation.len(),
            "Summary queued in {}",
            self.path.display()
        );
        Ok(summary.id.clone())
    }

    /// Read back every queued summary
    pub fn entries(&self) -> Result<Vec<EmailSummary>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path).context("Failed to read outbox")?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).context("Failed to parse outbox entry"))
            .collect()
    }

    /// Get the outbox file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
