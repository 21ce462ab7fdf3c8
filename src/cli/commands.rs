// Slash command parsing and formatting

use crate::config::Config;
use crate::ollama::ChatMessage;
use crate::tools::ToolRegistry;

use super::conversation::Conversation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    Reset,
    Tools,
    Help,
    Config,
    Models,
    Prompt,
    SetPrompt,
    Template,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "/exit" | "/quit" => Some(Command::Exit),
            "/reset" => Some(Command::Reset),
            "/tools" => Some(Command::Tools),
            "/help" => Some(Command::Help),
            "/config" => Some(Command::Config),
            "/models" => Some(Command::Models),
            "/prompt" => Some(Command::Prompt),
            "/setprompt" => Some(Command::SetPrompt),
            "/template" => Some(Command::Template),
            _ => None,
        }
    }
}

pub fn format_help(tools_enabled: bool) -> String {
    let mut output = String::from(
        "Available commands:\n\
         \x20 /exit, /quit   - Exit the application\n\
         \x20 /reset         - Reset the conversation history\n\
         \x20 /help          - Show this help message\n\
         \x20 /models        - List available models on the Ollama server\n\
         \x20 /config        - Show current configuration\n\
         \x20 /template      - Show the conversation template being sent to the LLM\n\
         \x20 /prompt        - Show the current system prompt\n\
         \x20 /setprompt     - Set a new system prompt\n",
    );
    if tools_enabled {
        output.push_str("  /tools         - List available tools\n");
    }
    output
}

pub fn format_config(config: &Config, config_path: &str) -> String {
    let yes_no = |b: bool| if b { "Yes" } else { "No" };

    let mut output = String::from("Current configuration:\n");
    output.push_str(&format!("  Model:           {}\n", config.model));
    output.push_str(&format!("  Host:            {}\n", config.host));
    output.push_str(&format!("  Tools enabled:   {}\n", yes_no(config.enable_tools)));
    output.push_str(&format!("  Debug mode:      {}\n", yes_no(config.debug_mode)));
    output.push_str(&format!("  Shell enabled:   {}\n", yes_no(config.enable_shell)));
    output.push_str(&format!(
        "  Auto-confirm shell: {}\n",
        yes_no(config.auto_confirm_shell)
    ));
    output.push_str(&format!(
        "  Model list tool: {}\n",
        yes_no(config.enable_model_list)
    ));
    output.push_str(&format!(
        "  File ops enabled: {}\n",
        yes_no(config.enable_file_ops)
    ));
    output.push_str(&format!(
        "  Auto-confirm files: {}\n",
        yes_no(config.auto_confirm_file_ops)
    ));
    output.push_str(&format!(
        "  Ignore calc safety: {}\n",
        yes_no(config.ignore_calc_safety)
    ));
    output.push_str(&format!(
        "  Ignore shell safety: {}\n",
        yes_no(config.ignore_shell_safety)
    ));
    output.push_str(&format!("  Config file:     {}\n", config_path));
    output.push_str("\nTo save this configuration, run with --save-config\n");
    output
}

pub fn format_tools(registry: &ToolRegistry) -> String {
    let mut output = String::from("Available tools:\n");
    for def in registry.definitions() {
        output.push_str(&format!("  - {}: {}\n", def.name, def.description));
        if let Some(properties) = def.parameters.properties.as_object() {
            if !properties.is_empty() {
                output.push_str("    Parameters:\n");
                for (name, info) in properties {
                    let desc = info
                        .get("description")
                        .and_then(|d| d.as_str())
                        .unwrap_or("");
                    output.push_str(&format!("      * {}: {}\n", name, desc));
                }
            }
        }
        output.push('\n');
    }
    output
}

pub fn format_models(models: &[String], host: &str) -> String {
    let mut output = format!("Available models on Ollama server at {}:\n", host);
    if models.is_empty() {
        output.push_str("No models found.\n");
    } else {
        for (i, model) in models.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, model));
        }
    }
    output
}

pub fn format_template(conversation: &Conversation, registry: &ToolRegistry) -> String {
    let mut output = String::from("Current conversation template:\n==========================\n");

    for msg in conversation.messages() {
        output.push_str(&format!("ROLE: {}\n", msg.role));
        if let Some(name) = &msg.name {
            output.push_str(&format!("NAME: {}\n", name));
        }
        output.push_str("CONTENT:\n");
        output.push_str(&msg.content);
        output.push('\n');
        output.push_str(&format_tool_calls(msg));
        output.push_str("--------------------------\n");
    }
    output.push_str("==========================\n");

    if !registry.is_empty() {
        output.push_str("Tools provided with this template:\n");
        for def in registry.definitions() {
            output.push_str(&format!("  - {}: {}\n", def.name, def.description));
        }
    }
    output
}

fn format_tool_calls(msg: &ChatMessage) -> String {
    if msg.tool_calls.is_empty() {
        return String::new();
    }
    let mut output = String::from("TOOL CALLS:\n");
    for call in &msg.tool_calls {
        let mut line = format!("  - {}", call.name);
        if !call.id.is_empty() {
            line.push_str(&format!(" (ID: {})", call.id));
        }
        output.push_str(&line);
        output.push('\n');
        let args = serde_json::to_string_pretty(&call.arguments)
            .unwrap_or_else(|_| call.arguments.to_string());
        output.push_str(&format!("    Arguments: {}\n", args));
    }
    output
}
