// Bash tool - command execution with exit-code reporting and a larger
// output budget than execute_shell_command; blocks a narrower set of
// outright destructive operations.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::terminal::{ConfirmKind, ConfirmationGate};
use crate::tools::process::{run_shell, CommandError};
use crate::tools::registry::Tool;
use crate::tools::types::ToolInputSchema;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 60;
const MAX_OUTPUT_LEN: usize = 1_000_000;

const BLOCKED_OPERATIONS: [&str; 16] = [
    "rm -rf",
    "mkfs",
    "dd if=",
    "> /dev",
    "echo > /dev",
    ">/dev",
    "sudo rm",
    "sudo mv",
    "sudo cp",
    "reboot",
    "shutdown",
    "passwd",
    "chmod 777",
    "chmod -R 777",
    ":(){ :|:& };:",
    "fork bomb",
];

pub struct BashTool {
    gate: Arc<dyn ConfirmationGate>,
    auto_confirm: bool,
    ignore_safety: bool,
}

impl BashTool {
    pub fn new(gate: Arc<dyn ConfirmationGate>, auto_confirm: bool, ignore_safety: bool) -> Self {
        Self {
            gate,
            auto_confirm,
            ignore_safety,
        }
    }

    fn find_blocked_operation(command: &str) -> Option<&'static str> {
        BLOCKED_OPERATIONS
            .iter()
            .find(|op| command.contains(**op))
            .copied()
    }

    fn clamp_timeout(input: &Value) -> u64 {
        let requested = input
            .get("timeout")
            .and_then(|v| v.as_i64())
            .unwrap_or(DEFAULT_TIMEOUT_SECS as i64);
        requested.clamp(1, MAX_TIMEOUT_SECS as i64) as u64
    }
}

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &str {
        "execute_bash"
    }

    fn description(&self) -> &str {
        "Execute bash commands with advanced output handling and formatting. This tool is more \
         powerful than execute_shell_command, with better error detection, command validation, \
         and more comprehensive output."
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: serde_json::json!({
                "command": {
                    "type": "string",
                    "description": "The bash command to execute. Must be a valid bash command."
                },
                "timeout": {
                    "type": "integer",
                    "description": "Maximum execution time in seconds (1-60). Defaults to 10 seconds."
                },
                "working_directory": {
                    "type": "string",
                    "description": "Working directory to execute the command in. Defaults to current directory."
                }
            }),
            required: vec!["command".to_string()],
        }
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let mut command = match input.get("command").and_then(|v| v.as_str()) {
            Some(c) => c.to_string(),
            None => bail!("Missing or invalid 'command' parameter"),
        };
        let timeout_secs = Self::clamp_timeout(&input);

        if let Some(dir) = input.get("working_directory").and_then(|v| v.as_str()) {
            command = format!("cd \"{}\" && {}", dir, command);
        }

        if !self.ignore_safety {
            if let Some(operation) = Self::find_blocked_operation(&command) {
                let confirmed = self.gate.confirm(
                    ConfirmKind::ShellCommand,
                    "The bash command contains a potentially dangerous operation:",
                    &format!("'{}' found in: {}", operation, command),
                    "This operation could potentially harm your system or delete data.",
                    "Tip: Use --ignore-shell-safety to disable these warnings.",
                );
                if !confirmed {
                    bail!(
                        "Command execution aborted due to security concerns with operation: {}",
                        operation
                    );
                }
            }
        }

        if !self.auto_confirm {
            let confirmed = self.gate.confirm(
                ConfirmKind::ShellCommand,
                "The AI is requesting to execute the following bash command:",
                &command,
                "This command will be executed with your user permissions.",
                "Use with caution. Some commands may modify your system.",
            );
            if !confirmed {
                bail!("Command execution denied by user");
            }
        }

        let combined = format!("{} 2>&1", command);
        let output = match run_shell(
            &combined,
            Duration::from_secs(timeout_secs),
            MAX_OUTPUT_LEN,
        )
        .await
        {
            Ok(o) => o,
            Err(CommandError::TimedOut(secs)) => {
                bail!("Command execution timed out after {} seconds", secs)
            }
            Err(e) => bail!("Failed to execute command: {}", e),
        };

        let mut result = output.stdout;
        if output.truncated {
            result.push_str("\n... (output truncated due to size limit)");
        }

        match output.exit_code {
            Some(code) if code != 0 => {
                let mut formatted = format!("Command failed with exit code: {}\n", code);
                if !result.is_empty() {
                    formatted.push_str(&format!("Output:\n{}", result));
                }
                Ok(formatted)
            }
            _ => {
                if result.is_empty() {
                    Ok("Command executed successfully (no output)".to_string())
                } else {
                    Ok(result)
                }
            }
        }
    }
}
