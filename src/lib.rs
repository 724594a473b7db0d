// Skillable - job coach assistant
// Library exports

pub mod chat;
pub mod cli;
pub mod config;
pub mod logging;
pub mod profile;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod upload;
