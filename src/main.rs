// Magpie - tool-calling chat CLI for local Ollama models
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use magpie::cli::{Conversation, Repl, DEFAULT_SYSTEM_PROMPT};
use magpie::config::{default_config_path, load_config, save_config, Config};
use magpie::ollama::OllamaClient;
use magpie::terminal::{self, MessageType, TerminalGate};
use magpie::tools::ToolRegistry;

#[derive(Parser, Debug)]
#[command(name = "magpie", version, about = "Chat with local Ollama models, with optional gated tool use")]
struct Args {
    /// Model to use (default: llama3)
    #[arg(short, long)]
    model: Option<String>,

    /// List available models and exit
    #[arg(short, long)]
    list: bool,

    /// Enable tool use with the model
    #[arg(short, long)]
    tools: bool,

    /// Enable debug mode for detailed output
    #[arg(short, long)]
    debug: bool,

    /// Enable shell command execution tools (use with caution)
    #[arg(short, long)]
    shell: bool,

    /// Enable file operations (read, write, edit)
    #[arg(short, long)]
    file_ops: bool,

    /// Automatically confirm shell commands without prompting
    #[arg(long)]
    auto_confirm: bool,

    /// Automatically confirm file operations without prompting
    #[arg(long)]
    auto_confirm_files: bool,

    /// Ignore calculator safety checks for potentially dangerous patterns
    #[arg(long)]
    ignore_calc_safety: bool,

    /// Ignore shell command safety checks for potentially dangerous operations
    #[arg(long)]
    ignore_shell_safety: bool,

    /// Enable the model listing tool for the LLM
    #[arg(long)]
    model_list: bool,

    /// Ollama host URL (default: http://localhost:11434)
    #[arg(long)]
    host: Option<String>,

    /// Use the specified config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save current settings to the config file
    #[arg(long)]
    save_config: bool,

    /// Ignore the config file and use default settings
    #[arg(long)]
    no_config: bool,

    /// Model name (positional shorthand for --model)
    #[arg(value_name = "MODEL")]
    positional_model: Option<String>,
}

fn resolve_config(args: &Args, config_path: &Path) -> Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        match load_config(config_path)? {
            Some(loaded) => {
                terminal::print(
                    &format!("Loaded configuration from: {}", config_path.display()),
                    MessageType::Success,
                );
                loaded
            }
            None => {
                terminal::print(
                    "No configuration file found. Using default settings.",
                    MessageType::System,
                );
                Config::default()
            }
        }
    };

    // Command-line flags override the file
    if let Some(model) = args.model.clone().or_else(|| args.positional_model.clone()) {
        config.model = model;
    }
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if args.tools {
        config.enable_tools = true;
    }
    if args.debug {
        config.debug_mode = true;
    }
    if args.shell {
        config.enable_shell = true;
    }
    if args.file_ops {
        config.enable_file_ops = true;
    }
    if args.auto_confirm {
        config.auto_confirm_shell = true;
    }
    if args.auto_confirm_files {
        config.auto_confirm_file_ops = true;
    }
    if args.ignore_calc_safety {
        config.ignore_calc_safety = true;
    }
    if args.ignore_shell_safety {
        config.ignore_shell_safety = true;
    }
    if args.model_list {
        config.enable_model_list = true;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "magpie=debug" } else { "magpie=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = resolve_config(&args, &config_path)?;

    if args.save_config {
        save_config(&config, &config_path)?;
        terminal::print(
            &format!("Configuration saved to: {}", config_path.display()),
            MessageType::Success,
        );
        return Ok(());
    }

    let client = OllamaClient::new(config.host.clone())?;

    terminal::print(
        &format!("Connecting to Ollama server at {}...", config.host),
        MessageType::System,
    );
    if let Err(e) = client.connect().await {
        terminal::print(
            &format!("Error: Could not connect to Ollama server. Is Ollama running?\n{}", e),
            MessageType::Error,
        );
        std::process::exit(1);
    }
    terminal::print("Connected to Ollama server.", MessageType::Success);

    if args.list {
        terminal::print("Available models:", MessageType::Header);
        let models = client.list_models().await?;
        if models.is_empty() {
            terminal::print(
                "No models found. You may need to pull a model first.",
                MessageType::Warning,
            );
            terminal::print(
                &format!("Try running: ollama pull {}", config.model),
                MessageType::System,
            );
        } else {
            for model in models {
                terminal::print(&format!("  - {}", model), MessageType::Normal);
            }
        }
        return Ok(());
    }

    let registry = if config.enable_tools {
        ToolRegistry::with_defaults(&config, Arc::new(TerminalGate))
    } else {
        ToolRegistry::new()
    };

    let conversation = Conversation::new(DEFAULT_SYSTEM_PROMPT);
    let config_path_display = config_path.display().to_string();
    let mut repl = Repl::new(config, config_path_display, client, registry, conversation);

    repl.run().await?;

    Ok(())
}
