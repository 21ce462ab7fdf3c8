// Configuration structs

use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "llama3".to_string()
}

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

/// Session configuration. Read-only from the engine's point of view once
/// the session starts; every tool copies the flags it needs at
/// registration time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_host")]
    pub host: String,

    /// Expose tools to the model at all
    #[serde(default)]
    pub enable_tools: bool,

    #[serde(default)]
    pub debug_mode: bool,

    /// Register the shell and bash execution tools
    #[serde(default)]
    pub enable_shell: bool,

    /// Skip the per-invocation confirmation for shell/bash commands.
    /// Blocklist confirmations still apply.
    #[serde(default)]
    pub auto_confirm_shell: bool,

    #[serde(default)]
    pub enable_model_list: bool,

    /// Register the file read/write/edit tools
    #[serde(default)]
    pub enable_file_ops: bool,

    #[serde(default)]
    pub auto_confirm_file_ops: bool,

    #[serde(default)]
    pub ignore_calc_safety: bool,

    #[serde(default)]
    pub ignore_shell_safety: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            host: default_host(),
            enable_tools: false,
            debug_mode: false,
            enable_shell: false,
            auto_confirm_shell: false,
            enable_model_list: false,
            enable_file_ops: false,
            auto_confirm_file_ops: false,
            ignore_calc_safety: false,
            ignore_shell_safety: false,
        }
    }
}
