// Conversation orchestration: the turn-taking state machine
//
// One user turn runs: stream the model's text for progressive display,
// fetch the structured response for authoritative tool calls, execute the
// requested tools strictly in order, then ask for exactly one closing
// model turn over the updated transcript. No tool-call detection happens
// on the closing turn; the engine is bounded to one tool round per user
// turn.

use crate::config::Config;
use crate::ollama::{ChatMessage, OllamaClient};
use crate::terminal::{self, MessageType};
use crate::tools::ToolRegistry;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to various tools. \
When addressing complex problems, please follow these guidelines:\n\n\
1. PLAN FIRST: When tackling a complex task, first develop a clear plan with sequential steps.\n\
2. MULTIPLE TOOLS: Consider using multiple tools in sequence to solve problems efficiently.\n\
3. EXPLAIN YOUR APPROACH: Before executing any tools, briefly explain your plan.\n\
4. PROVIDE CONTEXT: For each tool call, explain what you're trying to accomplish.\n\
5. SUMMARIZE RESULTS: After tool execution, summarize what you've learned and what to do next.\n\n\
IMPORTANT: When you need to use multiple commands or operations, don't execute them one by one. \
Instead, provide a comprehensive plan with all needed commands so the user can review the entire \
approach before execution. This is especially important for complex tasks involving system changes.";

/// The transcript plus the per-turn orchestration logic. Messages are
/// append-only; earlier entries are never reordered.
pub struct Conversation {
    messages: Vec<ChatMessage>,
    system_prompt: String,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            messages: vec![ChatMessage::system(system_prompt.clone())],
            system_prompt,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Clear the transcript, keeping only the system prompt.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages
            .push(ChatMessage::system(self.system_prompt.clone()));
    }

    /// Replace the system prompt in place, or insert one if the
    /// transcript somehow lost it.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
        match self.messages.iter_mut().find(|m| m.role == "system") {
            Some(msg) => msg.content = self.system_prompt.clone(),
            None => self
                .messages
                .insert(0, ChatMessage::system(self.system_prompt.clone())),
        }
    }

    /// Run one full user turn against the model.
    pub async fn run_turn(
        &mut self,
        client: &OllamaClient,
        registry: &ToolRegistry,
        config: &Config,
        input: &str,
    ) {
        self.messages.push(ChatMessage::user(input));

        let using_tools = config.enable_tools && !registry.is_empty();
        let definitions = if using_tools {
            registry.definitions()
        } else {
            Vec::new()
        };

        // Stream for progressive display
        terminal::print(
            &format!("Streaming response from {}:", config.model),
            MessageType::System,
        );
        let streamed = client
            .chat_stream(&config.model, &self.messages, &definitions, |chunk| {
                terminal::stream_chunk(chunk, MessageType::Model)
            })
            .await;
        println!();

        // Tool calls only come from the structured, non-streaming path
        let mut response = if using_tools {
            let mut structured = client
                .chat(&config.model, &self.messages, &definitions)
                .await;
            if !structured.has_tool_calls() {
                structured.content = streamed;
            }
            structured
        } else {
            ChatMessage::assistant(streamed)
        };

        if using_tools && response.has_tool_calls() {
            response = self
                .run_tool_round(client, registry, config, &definitions, &response)
                .await;
        }

        self.messages.push(response);
    }

    /// Execute the requested tool calls sequentially, then request the
    /// closing model turn over the updated transcript.
    async fn run_tool_round(
        &mut self,
        client: &OllamaClient,
        registry: &ToolRegistry,
        config: &Config,
        definitions: &[crate::tools::ToolDefinition],
        response: &ChatMessage,
    ) -> ChatMessage {
        terminal::print(
            &format!("Model {} is using tools to respond...", config.model),
            MessageType::System,
        );

        for call in &response.tool_calls {
            terminal::print(
                &format!("Model {} is calling tool: {}", config.model, call.name),
                MessageType::Tool,
            );

            if !registry.has(&call.name) {
                terminal::print(&format!("Tool not found: {}", call.name), MessageType::Error);
                continue;
            }

            if config.debug_mode {
                terminal::print("Tool arguments (detailed):", MessageType::System);
                let pretty = serde_json::to_string_pretty(&call.arguments)
                    .unwrap_or_else(|_| call.arguments.to_string());
                terminal::print(&pretty, MessageType::Normal);
            } else {
                terminal::print(
                    &format!("Tool arguments: {}", call.arguments),
                    MessageType::Normal,
                );
            }

            let result = registry.execute(&call.name, call.arguments.clone()).await;

            if result.is_error() {
                terminal::print("Tool error:", MessageType::Error);
                terminal::print(result.text(), MessageType::Error);
            } else {
                terminal::print("Tool result:", MessageType::Success);
                terminal::print(result.text(), MessageType::Tool);
            }

            self.messages
                .push(ChatMessage::tool_response(result.text(), call.name.clone()));
        }

        if config.debug_mode {
            terminal::print(
                "Getting final response with tool results...",
                MessageType::System,
            );
        }

        terminal::print("Final response after tool execution:", MessageType::Header);
        let final_text = client
            .chat_stream(&config.model, &self.messages, definitions, |chunk| {
                terminal::stream_chunk(chunk, MessageType::Model)
            })
            .await;
        println!();

        ChatMessage::assistant(final_text)
    }
}
