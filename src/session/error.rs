// Errors for session operations the caller can act on

use thiserror::Error;

use crate::profile::ClientField;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a request is already in progress")]
    Busy,

    #[error("the client form is not open (use /client first)")]
    FormClosed,

    #[error("missing required client details: {}", labels(.0))]
    MissingRequired(Vec<ClientField>),
}

fn labels(fields: &[ClientField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}
