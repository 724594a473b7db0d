// CLI module
// Slash commands and the interactive REPL

mod commands;
mod repl;

pub use commands::Command;
pub use repl::Repl;
