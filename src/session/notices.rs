// Assistant messages the session writes itself (no model involved)

use crate::profile::{ClientField, ClientInfo};

pub const WELCOME: &str = "Welcome, Coach! I'm here to help you create personalized training plans for your \
clients with disabilities. Upload a training document or employment material, and I'll analyze it to create \
accessible versions. I can also answer questions about best practices in job training and accessibility based \
on my knowledge base. How can I assist you today?";

pub const COMPLETION_FAILED: &str =
    "Sorry, there was an error processing your request. Please check the connection to Azure services.";

pub const UPLOAD_FAILED: &str =
    "There was an error uploading the document. Please check Azure Blob Storage configuration.";

pub const NO_CHAT_CONTENT: &str = "There is no chat content to send by email.";

pub const SUMMARY_SENT: &str = "A summary of this conversation has been sent by email. (Note: This is a \
simulated function. The summary was written to the local outbox for a delivery service to pick up.)";

pub const SUMMARY_FAILED: &str = "There was an error trying to send the email.";

pub fn document_received(name: &str) -> String {
    format!(
        "I've received the document \"{}\". I'll analyze it and create accessible versions. Could you provide \
         information about the client for whom you're preparing this material? If you've already entered this \
         information, you can ask directly about the document.",
        name
    )
}

/// Confirmation after the coach saves the client form
pub fn profile_saved(info: &ClientInfo) -> String {
    let named = info
        .get(ClientField::Name)
        .map(|n| format!("named {} ", n))
        .unwrap_or_default();
    let medical = info
        .get(ClientField::MedicalConditions)
        .map(|m| format!(", with {}", m))
        .unwrap_or_default();
    let interests = info
        .get(ClientField::JobInterests)
        .map(|j| format!(", interested in {}", j))
        .unwrap_or_default();

    format!(
        "Thank you for providing information about your client. I can now better personalize training plans \
         for a person {}with {}, aged {}{}{}. How can I specifically help you today?",
        named,
        info.get(ClientField::Disability).unwrap_or_default(),
        info.get(ClientField::Age).unwrap_or_default(),
        medical,
        interests
    )
}
