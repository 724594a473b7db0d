// Client profile: the record, its merge rule and heuristic extraction

pub mod client_info;
pub mod extract;
pub mod patterns;

pub use client_info::{merge, ClientField, ClientInfo, MergeOutcome};
pub use extract::{extract, normalize_skill_level, ClientInfoExtractor};
