// Interactive coaching REPL

use anyhow::Result;
use crossterm::{style::Stylize, terminal};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use crate::chat::Role;
use crate::logging::SummaryOutbox;
use crate::providers::CompletionProvider;
use crate::session::ChatSession;
use crate::upload::{AzureBlobStore, DocumentStore, UploadCandidate};

use super::commands::{format_client_form, format_files, format_help, Command};

const PROFILE_HINT: &str = "Client information detected. Type /client to view and edit.";

/// Get current terminal width, or default to 80 if not a TTY
fn terminal_width() -> usize {
    terminal::size().map(|(w, _)| w as usize).unwrap_or(80)
}

pub struct Repl {
    session: ChatSession,
    provider: Box<dyn CompletionProvider>,
    store: Option<AzureBlobStore>,
    outbox: SummaryOutbox,
    /// Messages already printed
    shown: usize,
    is_interactive: bool,
}

impl Repl {
    pub fn new(
        session: ChatSession,
        provider: Box<dyn CompletionProvider>,
        store: Option<AzureBlobStore>,
        outbox: SummaryOutbox,
    ) -> Self {
        Self {
            session,
            provider,
            store,
            outbox,
            shown: 0,
            is_interactive: io::stdout().is_terminal(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.is_interactive {
            println!("{}", "Skillable - job coaching assistant".bold());
            println!("Completions: {} ✓", self.provider.name());
            if self.store.is_some() {
                println!("Document storage: configured ✓");
            } else {
                println!("{}", "Document storage: not configured (/upload disabled)".dark_grey());
            }
            println!("Type /help for commands.");
            println!();
        }
        self.print_new_messages();

        let mut editor = DefaultEditor::new()?;
        loop {
            if self.is_interactive {
                self.print_separator();
            }

            let line = match editor.readline("> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            let _ = editor.add_history_entry(input);

            match Command::parse(input) {
                Some(Ok(Command::Quit)) => {
                    if self.is_interactive {
                        println!("Goodbye!");
                    }
                    break;
                }
                Some(Ok(command)) => self.handle_command(command).await?,
                Some(Err(usage)) => eprintln!("{}", usage),
                None => self.ask(input).await,
            }

            self.print_new_messages();
            if self.session.needs_profile_hint() {
                println!("{}", PROFILE_HINT.yellow());
            }
        }

        Ok(())
    }

    /// Non-interactive: upload the given files, ask one question, print the
    /// assistant's replies.
    pub async fn run_once(&mut self, query: &str, uploads: &[PathBuf]) -> Result<()> {
        // The welcome is for humans at a prompt
        self.shown = self.session.messages().len();

        for path in uploads {
            self.upload(path, None).await?;
        }
        self.ask(query).await;
        self.print_new_messages();
        Ok(())
    }

    async fn ask(&mut self, query: &str) {
        if let Err(e) = self.session.submit(query, self.provider.as_ref()).await {
            eprintln!("{}", e);
        }
    }

    async fn upload(&mut self, path: &Path, content_type: Option<String>) -> Result<()> {
        let candidate = UploadCandidate::from_path(path, content_type)?;
        let store = self.store.as_ref().map(|s| s as &dyn DocumentStore);
        if let Err(e) = self
            .session
            .upload(candidate, store, self.provider.as_ref())
            .await
        {
            eprintln!("{}", e);
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => println!("{}", format_help()),
            Command::Files => println!("{}", format_files(self.session.uploads())),
            Command::Upload { path, content_type } => {
                if let Err(e) = self.upload(&path, content_type).await {
                    eprintln!("Could not read {}: {:#}", path.display(), e);
                }
            }
            Command::Client => {
                self.session.open_form();
                self.print_form();
            }
            Command::ClientSet { field, value } => {
                // Editing implies the form is open
                self.session.open_form();
                self.session.set_field(field, &value)?;
                self.print_form();
            }
            Command::ClientSave => {
                if let Err(e) = self.session.submit_form() {
                    eprintln!("{}", e);
                }
            }
            Command::ClientCancel => self.session.cancel_form(),
            Command::Email => {
                if let Err(e) = self.session.send_summary(&self.outbox).await {
                    eprintln!("{}", e);
                }
            }
            Command::Quit => {}
        }
        Ok(())
    }

    fn print_form(&self) {
        println!(
            "{}",
            format_client_form(self.session.client_info(), self.session.auto_filled())
        );
    }

    /// Print assistant messages appended since the last call. The coach's
    /// own messages are already on screen.
    fn print_new_messages(&mut self) {
        let messages = self.session.messages();
        for message in messages.iter().skip(self.shown) {
            if message.role != Role::Assistant {
                continue;
            }
            if self.is_interactive {
                println!("{}", "Assistant".cyan().bold());
            }
            println!("{}", message.content);
            println!();
        }
        self.shown = messages.len();
    }

    /// Separator line that adapts to terminal width
    fn print_separator(&self) {
        println!("{}", "─".repeat(terminal_width()).dark_grey());
    }
}
