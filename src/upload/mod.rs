// Document uploads: validation, the uploaded-file record and blob storage

pub mod blob;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::config::constants::MAX_UPLOAD_BYTES;

pub use blob::{AzureBlobStore, DocumentStore};

const ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

const ALLOWED_EXTENSIONS: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("txt", "text/plain"),
];

/// Why a file was refused. The message is shown to the coach as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("The file format is not compatible. Please upload PDF, DOC, DOCX, or TXT files.")]
    UnsupportedType {
        name: String,
        declared_type: Option<String>,
    },

    #[error("The file is too large. The maximum allowed size is 10MB.")]
    TooLarge { name: String, size: u64 },
}

/// A file the coach picked, not yet validated or uploaded
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub name: String,
    /// MIME type as declared by whoever picked the file
    pub declared_type: Option<String>,
    /// Size in bytes; for a file that was refused before reading, the size
    /// reported by the filesystem
    size: u64,
    bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, declared_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type,
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Open a file from disk. Without an explicit type, the type is guessed
    /// from the extension.
    ///
    /// Type and size are checked against the file metadata first; a file
    /// that would be refused is never read. The read itself stops one byte
    /// past the limit, so files that grow or report no length (devices,
    /// pipes) are still caught by [`validate`].
    pub fn from_path(path: &Path, declared_type: Option<String>) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file path: {}", path.display()))?
            .to_string();
        let declared_type = declared_type.or_else(|| type_for_name(&name).map(str::to_string));

        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let reported = file
            .metadata()
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();

        let mut candidate = Self {
            name,
            declared_type,
            size: reported,
            bytes: Vec::new(),
        };
        if validate(&candidate).is_err() {
            return Ok(candidate);
        }

        let mut bytes = Vec::new();
        file.take(MAX_UPLOAD_BYTES + 1)
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        candidate.size = bytes.len() as u64;
        candidate.bytes = bytes;
        Ok(candidate)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Consume the candidate, yielding the file contents
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Content type sent to storage
    pub fn content_type(&self) -> &str {
        self.declared_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("application/octet-stream")
    }
}

/// MIME type for an accepted extension
pub fn type_for_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Accept PDF/DOC/DOCX/TXT (by declared type or extension) up to 10 MiB.
pub fn validate(candidate: &UploadCandidate) -> Result<(), UploadRejection> {
    let type_ok = candidate
        .declared_type
        .as_deref()
        .map(|t| ALLOWED_TYPES.contains(&t))
        .unwrap_or(false);
    let extension_ok = type_for_name(&candidate.name).is_some();

    if !type_ok && !extension_ok {
        return Err(UploadRejection::UnsupportedType {
            name: candidate.name.clone(),
            declared_type: candidate.declared_type.clone(),
        });
    }

    if candidate.size() > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            name: candidate.name.clone(),
            size: candidate.size(),
        });
    }

    Ok(())
}

/// A document that reached blob storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Original file name
    pub name: String,
    /// Blob name inside the container (`{timestamp_ms}-{name}`)
    pub storage_key: String,
    /// Blob URL without the SAS query string
    pub url: String,
    pub timestamp: DateTime<Utc>,
}
