// Shell tool - runs a single command with a broad blocklist
//
// Deliberately stricter than execute_bash: redirection, piping, and
// network clients all count as risk signals here.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::terminal::{ConfirmKind, ConfirmationGate};
use crate::tools::process::{run_shell, CommandError};
use crate::tools::registry::Tool;
use crate::tools::types::ToolInputSchema;

const DEFAULT_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 30;
const MAX_OUTPUT_LEN: usize = 1000;

const BLOCKED_OPERATIONS: [&str; 30] = [
    "rm", "mkfs", "dd", ">", ">>", "|", "&", ";", "&&", "||", "sudo", "su", "chmod", "chown",
    "passwd", "mv", "curl", "wget", "ssh", "scp", "ftp", "telnet", "nc", "ncat", "sleep", "perl",
    "python", "python3", "ruby", "bash",
];

// Shells themselves are blocked too; kept separate so the primary list
// stays readable.
const BLOCKED_SHELLS: [&str; 4] = ["sh", "zsh", "csh", "ksh"];

pub struct ShellTool {
    gate: Arc<dyn ConfirmationGate>,
    auto_confirm: bool,
    ignore_safety: bool,
}

impl ShellTool {
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
            .chain(BLOCKED_SHELLS.iter())
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
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "execute_shell_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return the output"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: serde_json::json!({
                "command": {
                    "type": "string",
                    "description": "The shell command to execute. Certain commands are blocked for security."
                },
                "timeout": {
                    "type": "integer",
                    "description": "Maximum execution time in seconds (1-30). Defaults to 5 seconds."
                }
            }),
            required: vec!["command".to_string()],
        }
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let command = match input.get("command").and_then(|v| v.as_str()) {
            Some(c) => c.to_string(),
            None => bail!("Missing or invalid 'command' parameter"),
        };
        let timeout_secs = Self::clamp_timeout(&input);

        if !self.ignore_safety {
            if let Some(operation) = Self::find_blocked_operation(&command) {
                let confirmed = self.gate.confirm(
                    ConfirmKind::ShellCommand,
                    "The command contains a potentially dangerous operation:",
                    &format!("'{}' found in: {}", operation, command),
                    "This could potentially harm your system or expose sensitive data.",
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

        // Every invocation needs explicit approval unless auto-confirm is on
        if !self.auto_confirm {
            let confirmed = self.gate.confirm(
                ConfirmKind::ShellCommand,
                "The AI is requesting to execute the following command:",
                &command,
                "This could potentially modify your system.",
                "",
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

        if output.truncated {
            return Ok(format!("{}\n... (output truncated)", output.stdout));
        }
        if output.stdout.is_empty() {
            return Ok("Command executed successfully (no output)".to_string());
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::implementations::test_gates::CountingGate;

    #[tokio::test]
    async fn test_safe_command_with_auto_confirm() {
        let gate = CountingGate::new(true);
        let tool = ShellTool::new(gate.clone(), true, false);
        let result = tool
            .execute(serde_json::json!({"command": "echo hello"}))
            .await
            .unwrap();
        assert!(result.contains("hello"));
        assert_eq!(gate.calls(), 0);
    }

    #[tokio::test]
    async fn test_every_command_requires_confirmation_without_auto_confirm() {
        let gate = CountingGate::new(false);
        let tool = ShellTool::new(gate.clone(), false, false);
        let err = tool
            .execute(serde_json::json!({"command": "echo hi"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("denied by user"));
        assert_eq!(gate.calls(), 1);
    }

    #[tokio::test]
    async fn test_blocklist_hit_denied() {
        let gate = CountingGate::new(false);
        let tool = ShellTool::new(gate.clone(), true, false);
        let err = tool
            .execute(serde_json::json!({"command": "curl http://example.com"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("security concerns"));
        assert!(err.to_string().contains("curl"));
    }

    #[tokio::test]
    async fn test_blocklist_skipped_when_safety_ignored() {
        // "|" is on the blocklist; with safety ignored the pipe runs
        // without consulting the gate
        let gate = CountingGate::new(false);
        let tool = ShellTool::new(gate.clone(), true, true);
        let result = tool
            .execute(serde_json::json!({"command": "echo safe | cat"}))
            .await
            .unwrap();
        assert!(result.contains("safe"));
        assert_eq!(gate.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_command() {
        let tool = ShellTool::new(CountingGate::new(true), true, false);
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(err.to_string().contains("command"));
    }

    #[tokio::test]
    async fn test_no_output_message() {
        let gate = CountingGate::new(true);
        let tool = ShellTool::new(gate, true, true);
        let result = tool
            .execute(serde_json::json!({"command": "true"}))
            .await
            .unwrap();
        assert_eq!(result, "Command executed successfully (no output)");
    }

    #[test]
    fn test_timeout_clamping() {
        assert_eq!(ShellTool::clamp_timeout(&serde_json::json!({})), 5);
        assert_eq!(
            ShellTool::clamp_timeout(&serde_json::json!({"timeout": 120})),
            30
        );
        assert_eq!(
            ShellTool::clamp_timeout(&serde_json::json!({"timeout": 0})),
            1
        );
        assert_eq!(
            ShellTool::clamp_timeout(&serde_json::json!({"timeout": 12})),
            12
        );
    }
}
