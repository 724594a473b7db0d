// Slash command parsing and the read-only views

use std::path::PathBuf;

use crate::profile::{ClientField, ClientInfo};
use crate::upload::UploadedFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Upload {
        path: PathBuf,
        content_type: Option<String>,
    },
    Files,
    Client,
    ClientSet { field: ClientField, value: String },
    ClientSave,
    ClientCancel,
    Email,
}

impl Command {
    /// Parse a slash command. Plain text returns `None`; a malformed
    /// command returns `Some(Err(usage))`.
    pub fn parse(input: &str) -> Option<Result<Self, String>> {
        let input = input.trim();
        if !input.starts_with('/') {
            return None;
        }

        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };

        let command = match head {
            "/help" => Ok(Command::Help),
            "/quit" | "/exit" => Ok(Command::Quit),
            "/files" => Ok(Command::Files),
            "/email" => Ok(Command::Email),
            "/upload" => parse_upload(rest),
            "/client" => parse_client(rest),
            other => Err(format!("Unknown command: {} (try /help)", other)),
        };
        Some(command)
    }
}

fn parse_upload(args: &str) -> Result<Command, String> {
    let mut parts = args.split_whitespace();
    let path = parts
        .next()
        .ok_or_else(|| "Usage: /upload <path> [content-type]".to_string())?;
    Ok(Command::Upload {
        path: PathBuf::from(path),
        content_type: parts.next().map(str::to_string),
    })
}

fn parse_client(args: &str) -> Result<Command, String> {
    let (sub, rest) = match args.split_once(char::is_whitespace) {
        Some((sub, rest)) => (sub, rest.trim()),
        None => (args, ""),
    };

    match sub {
        "" => Ok(Command::Client),
        "save" => Ok(Command::ClientSave),
        "cancel" => Ok(Command::ClientCancel),
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(f, v)| (f, v.trim()))
                .unwrap_or((rest, ""));
            let field: ClientField = field.parse().map_err(|_| {
                format!(
                    "Unknown field '{}'. Fields: {}",
                    field,
                    ClientField::ALL.iter().map(|f| f.key()).collect::<Vec<_>>().join(", ")
                )
            })?;
            Ok(Command::ClientSet {
                field,
                value: value.to_string(),
            })
        }
        other => Err(format!("Unknown /client action: {}", other)),
    }
}

pub fn format_help() -> String {
    r#"Available commands:
  /help                        - Show this help message
  /upload <path> [type]        - Upload a PDF, DOC, DOCX or TXT document
  /files                       - List uploaded documents
  /client                      - Show and edit the client profile
  /client set <field> <value>  - Edit a field (name, disability, age, medical, jobs, skill)
  /client save                 - Save the profile (disability and age required)
  /client cancel               - Close the profile form
  /email                       - Send a summary of this conversation
  /quit                        - Exit

Type any question to get started!"#
        .to_string()
}

pub fn format_files(files: &[UploadedFile]) -> String {
    if files.is_empty() {
        return "No documents uploaded yet.".to_string();
    }

    let mut output = String::from("Uploaded documents:\n");
    for (i, file) in files.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} ({})\n",
            i + 1,
            file.name,
            file.timestamp.format("%Y-%m-%d %H:%M")
        ));
    }
    output
}

/// The profile form. Fields picked up from the conversation are marked.
pub fn format_client_form(info: &ClientInfo, auto_filled: &ClientInfo) -> String {
    let mut output = String::from("Client Information\n");
    for field in ClientField::ALL {
        let required = matches!(field, ClientField::Disability | ClientField::Age);
        let value = info.get(field).unwrap_or("-");
        let marker = if auto_filled.get(field).is_some() && auto_filled.get(field) == info.get(field) {
            "  (auto-extracted)"
        } else {
            ""
        };
        output.push_str(&format!(
            "  {:<22} {}{}\n",
            format!("{}{} [{}]:", field.label(), if required { "*" } else { "" }, field.key()),
            value,
            marker
        ));
    }
    output.push_str("\n* required. Use /client set <field> <value>, then /client save.");
    output
}
