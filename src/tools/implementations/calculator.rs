// Calculator tool - evaluates arithmetic through the bc calculator

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::terminal::{ConfirmKind, ConfirmationGate};
use crate::tools::process::{run_shell, CommandError};
use crate::tools::registry::Tool;
use crate::tools::types::ToolInputSchema;

const ALLOWED_CHARS: &str =
    "0123456789.+-*/^%() \t\nabcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
const MAX_EXPRESSION_LEN: usize = 500;
const MAX_RESULT_LEN: usize = 1000;
const EVAL_TIMEOUT: Duration = Duration::from_secs(2);

// Function-call lookalikes that have no business in an arithmetic
// expression; a match requires operator confirmation.
const BLOCKED_PATTERNS: [&str; 8] = [
    "system", "exec", "shell", "quit", "halt", "cd", "rm", "mv",
];

pub struct CalculatorTool {
    gate: Arc<dyn ConfirmationGate>,
    ignore_safety: bool,
}

impl CalculatorTool {
    pub fn new(gate: Arc<dyn ConfirmationGate>, ignore_safety: bool) -> Self {
        Self { gate, ignore_safety }
    }

    fn find_blocked_pattern(expression: &str) -> Option<&'static str> {
        BLOCKED_PATTERNS
            .iter()
            .find(|p| expression.contains(**p))
            .copied()
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a mathematical expression using the bc calculator"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: serde_json::json!({
                "expression": {
                    "type": "string",
                    "description": "A mathematical expression to evaluate. \
                        Supports basic operations (+, -, *, /), exponents (^), \
                        parentheses, and functions (sqrt, sin, cos, etc.)"
                }
            }),
            required: vec!["expression".to_string()],
        }
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let expression = match input.get("expression").and_then(|v| v.as_str()) {
            Some(e) => e,
            None => bail!("Missing or invalid 'expression' parameter"),
        };

        let mut sanitized: String = expression
            .chars()
            .filter(|c| ALLOWED_CHARS.contains(*c))
            .collect();

        if !self.ignore_safety {
            if let Some(pattern) = Self::find_blocked_pattern(&sanitized) {
                let confirmed = self.gate.confirm(
                    ConfirmKind::Calculation,
                    "The expression contains a potentially unsafe pattern:",
                    &format!("'{}' found in: {}", pattern, expression),
                    "This might be a false positive, but could be an attempt to execute code.",
                    "Tip: Use --ignore-calc-safety to disable these warnings.",
                );
                if !confirmed {
                    bail!(
                        "Calculation aborted due to security concerns with pattern: {}",
                        pattern
                    );
                }
            }
        }

        if sanitized.len() > MAX_EXPRESSION_LEN {
            sanitized.truncate(MAX_EXPRESSION_LEN);
        }

        let cmd = format!("echo '{}' | BC_LINE_LENGTH=0 bc -l", sanitized);

        let output = match run_shell(&cmd, EVAL_TIMEOUT, MAX_RESULT_LEN).await {
            Ok(o) => o,
            Err(CommandError::TimedOut(_)) => {
                bail!("Calculation timed out (possible infinite loop or too complex)")
            }
            Err(e) => bail!("Failed to execute calculation: {}", e),
        };

        if output.truncated {
            bail!("Result too large");
        }

        let result = output.stdout.trim().to_string();
        if result.is_empty() {
            bail!("Invalid expression or no result");
        }
        if result.contains("syntax error") || result.contains("error") {
            bail!("Error: {}", result);
        }

        Ok(result)
    }
}
