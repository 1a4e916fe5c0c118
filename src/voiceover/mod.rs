pub mod alignment;
mod captions;
pub mod cli;
pub mod commands;
pub mod config;
mod elevenlabs;
pub mod error;
mod phrases;
mod pipeline;
mod report;
pub mod script;

pub use cli::{ConfigSource, VoiceoverCommands};
pub use commands::handle_voiceover_command;
