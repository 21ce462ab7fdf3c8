// Interactive command-line interface

pub mod commands;
pub mod conversation;
pub mod repl;

pub use conversation::{Conversation, DEFAULT_SYSTEM_PROMPT};
pub use repl::Repl;
