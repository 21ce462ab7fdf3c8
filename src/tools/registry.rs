// Tool registry: name-keyed dispatch over the active tool set
//
// Registration happens once at startup, gated by configuration flags.
// Execution maps the tool's Result onto the tagged ToolResult that goes
// back into the transcript; an unknown name is an error result, never a
// fatal failure.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::implementations::{
    BashTool, CalculatorTool, FileEditTool, FileReadTool, FileWriteTool, ModelListTool, ShellTool,
};
use super::types::{ToolDefinition, ToolInputSchema, ToolResult};
use crate::config::Config;
use crate::terminal::ConfirmationGate;

/// One pluggable, named, schema-described unit of local execution.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> ToolInputSchema;

    async fn execute(&self, input: Value) -> Result<String>;
}

pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Build the registry from configuration flags. The calculator is
    /// always present; the riskier tool families are opt-in.
    pub fn with_defaults(config: &Config, gate: Arc<dyn ConfirmationGate>) -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(CalculatorTool::new(
            Arc::clone(&gate),
            config.ignore_calc_safety,
        )));

        if config.enable_shell {
            registry.register(Box::new(ShellTool::new(
                Arc::clone(&gate),
                config.auto_confirm_shell,
                config.ignore_shell_safety,
            )));
            registry.register(Box::new(BashTool::new(
                Arc::clone(&gate),
                config.auto_confirm_shell,
                config.ignore_shell_safety,
            )));
        }

        if config.enable_model_list {
            registry.register(Box::new(ModelListTool::new(config.host.clone())));
        }

        if config.enable_file_ops {
            registry.register(Box::new(FileReadTool));
            registry.register(Box::new(FileWriteTool::new(
                Arc::clone(&gate),
                config.auto_confirm_file_ops,
            )));
            registry.register(Box::new(FileEditTool::new(
                gate,
                config.auto_confirm_file_ops,
            )));
        }

        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions in registration order, for the chat request and the
    /// /tools listing.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.input_schema(),
            })
            .collect()
    }

    pub async fn execute(&self, name: &str, arguments: Value) -> ToolResult {
        let tool = match self.tools.iter().find(|t| t.name() == name) {
            Some(t) => t,
            None => return ToolResult::error(format!("Tool not found: {}", name)),
        };

        match tool.execute(arguments).await {
            Ok(content) => ToolResult::success(content),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
