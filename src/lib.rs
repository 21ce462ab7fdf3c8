// Magpie - tool-calling chat CLI for local Ollama models
// Library exports

pub mod cli;
pub mod config;
pub mod ollama;
pub mod terminal;
pub mod tools;
