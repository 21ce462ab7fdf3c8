// Ollama protocol client

pub mod client;
pub mod types;

pub use client::{LineBuffer, OllamaClient};
pub use types::{ChatMessage, ToolCallRequest};
