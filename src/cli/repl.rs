// Interactive REPL
//
// Owns the line editor, the Ctrl-C running flag, and slash command
// dispatch; everything model-facing is delegated to the Conversation.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::ollama::OllamaClient;
use crate::terminal::{self, MessageType};
use crate::tools::ToolRegistry;

use super::commands::{
    format_config, format_help, format_models, format_template, format_tools, Command,
};
use super::conversation::Conversation;

pub struct Repl {
    config: Config,
    config_path: String,
    client: OllamaClient,
    registry: ToolRegistry,
    conversation: Conversation,
    running: Arc<AtomicBool>,
}

impl Repl {
    pub fn new(
        config: Config,
        config_path: String,
        client: OllamaClient,
        registry: ToolRegistry,
        conversation: Conversation,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));

        // Ctrl-C during a model turn stops the loop at its next natural
        // check point; it does not abort the in-flight request.
        let flag = Arc::clone(&running);
        let _ = ctrlc::set_handler(move || {
            flag.store(false, Ordering::SeqCst);
            terminal::print("\nExiting...", MessageType::System);
        });

        Self {
            config,
            config_path,
            client,
            registry,
            conversation,
            running,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let mut editor = DefaultEditor::new()?;

        while self.running.load(Ordering::SeqCst) {
            let input = match editor.readline("\n> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    terminal::print(&format!("Input error: {}", e), MessageType::Error);
                    break;
                }
            };

            let input = input.trim().to_string();
            if input.is_empty() {
                continue;
            }
            let _ = editor.add_history_entry(&input);

            if let Some(command) = Command::parse(&input) {
                if self.handle_command(command, &mut editor).await {
                    break;
                }
                continue;
            }

            println!();
            self.conversation
                .run_turn(&self.client, &self.registry, &self.config, &input)
                .await;
        }

        terminal::print("Goodbye!", MessageType::Success);
        Ok(())
    }

    fn print_banner(&self) {
        if self.config.enable_tools {
            if self.config.enable_shell {
                terminal::print(
                    "WARNING: Shell command execution is enabled. Use with caution.",
                    MessageType::Warning,
                );
            }
            if self.config.enable_file_ops && self.config.auto_confirm_file_ops {
                terminal::print(
                    "WARNING: Auto-confirmation for file operations is enabled.",
                    MessageType::Warning,
                );
            }
            terminal::print(
                &format!(
                    "Tool usage enabled with {} available tools.",
                    self.registry.len()
                ),
                MessageType::Success,
            );
        }

        terminal::print(
            &format!("Starting chat with model: {}", self.config.model),
            MessageType::Header,
        );
        terminal::print(
            "Type '/exit' to quit, '/reset' to reset the conversation.",
            MessageType::System,
        );
        terminal::print(
            "Type '/help' for a list of available commands.",
            MessageType::System,
        );
        terminal::print(&"-".repeat(50), MessageType::Normal);
    }

    /// Returns true when the REPL should exit.
    async fn handle_command(&mut self, command: Command, editor: &mut DefaultEditor) -> bool {
        match command {
            Command::Exit => return true,
            Command::Reset => {
                self.conversation.reset();
                terminal::print("Conversation reset.", MessageType::Success);
            }
            Command::Help => {
                terminal::print(
                    &format_help(self.config.enable_tools),
                    MessageType::Normal,
                );
            }
            Command::Tools => {
                if self.config.enable_tools && !self.registry.is_empty() {
                    terminal::print(&format_tools(&self.registry), MessageType::Tool);
                } else {
                    terminal::print(
                        "No tools are available. Start the application with -t to enable tools.",
                        MessageType::Warning,
                    );
                }
            }
            Command::Config => {
                terminal::print(
                    &format_config(&self.config, &self.config_path),
                    MessageType::Normal,
                );
            }
            Command::Models => match self.client.list_models().await {
                Ok(models) => terminal::print(
                    &format_models(&models, self.client.host()),
                    MessageType::Normal,
                ),
                Err(e) => terminal::print(&format!("Error: {}", e), MessageType::Error),
            },
            Command::Prompt => {
                terminal::print("Current system prompt:", MessageType::Header);
                terminal::print("==========================", MessageType::Normal);
                terminal::print(self.conversation.system_prompt(), MessageType::System);
                terminal::print("==========================", MessageType::Normal);
            }
            Command::SetPrompt => self.read_new_prompt(editor),
            Command::Template => {
                terminal::print(
                    &format_template(&self.conversation, &self.registry),
                    MessageType::Normal,
                );
            }
        }
        false
    }

    /// Multiline prompt entry, terminated by a '/end' line.
    fn read_new_prompt(&mut self, editor: &mut DefaultEditor) {
        terminal::print(
            "Enter new system prompt (type '/end' on a new line when finished):",
            MessageType::Header,
        );

        let mut new_prompt = String::new();
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    if line.trim() == "/end" {
                        break;
                    }
                    new_prompt.push_str(&line);
                    new_prompt.push('\n');
                }
                Err(_) => break,
            }
        }

        let new_prompt = new_prompt.trim_end_matches('\n').to_string();
        if new_prompt.is_empty() {
            terminal::print("No changes made to system prompt.", MessageType::Warning);
        } else {
            self.conversation.set_system_prompt(new_prompt);
            terminal::print("System prompt updated.", MessageType::Success);
        }
    }
}
