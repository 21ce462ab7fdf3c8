// Model list tool - lets the model enumerate what the server can run

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::ollama::OllamaClient;
use crate::tools::registry::Tool;
use crate::tools::types::ToolInputSchema;

pub struct ModelListTool {
    default_host: String,
}

impl ModelListTool {
    pub fn new(default_host: String) -> Self {
        Self { default_host }
    }
}

#[async_trait]
impl Tool for ModelListTool {
    fn name(&self) -> &str {
        "list_models"
    }

    fn description(&self) -> &str {
        "List available models on the Ollama server"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: serde_json::json!({
                "host": {
                    "type": "string",
                    "description": "Optional: The Ollama server URL (default: http://localhost:11434)"
                }
            }),
            required: vec![],
        }
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let host = input
            .get("host")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.default_host)
            .to_string();

        // Transient connection: the host may differ from the session's
        let client = OllamaClient::new(host.clone())?;
        if client.connect().await.is_err() {
            bail!("Could not connect to Ollama server at {}", host);
        }

        let models = client.list_models().await?;
        if models.is_empty() {
            return Ok(format!("No models found on Ollama server at {}", host));
        }

        let mut result = format!("Available models on Ollama server at {}:\n", host);
        for (i, model) in models.iter().enumerate() {
            result.push_str(&format!("  {}. {}\n", i + 1, model));
        }
        Ok(result)
    }
}
