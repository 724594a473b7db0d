// Project-wide constants
//
// Centralised here so wire values and limits have one source of truth.
// Import via `use crate::config::constants::*;`.

/// `api-version` query parameter of the chat completions endpoint.
pub const COMPLETION_API_VERSION: &str = "2023-05-15";

/// Default sampling temperature for completions.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default maximum tokens for a coaching reply.
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// Maximum tokens for the short call that announces a new upload.
pub const PRIMING_MAX_TOKENS: u32 = 50;

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// How many recent messages are scanned for client details before each query.
pub const RECENT_SCAN_WINDOW: usize = 5;

/// Directory under the home directory holding config and outbox.
pub const CONFIG_DIR_NAME: &str = ".skillable";
