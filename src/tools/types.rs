// Core types for the tool system

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition exposed to the model so it knows which tools exist and
/// how to call them. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ToolInputSchema,
}

impl ToolDefinition {
    /// Wire form for the `tools` array of a chat request.
    pub fn to_wire(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// JSON Schema for tool input parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String, // Usually "object"
    pub properties: Value,
    pub required: Vec<String>,
}

impl ToolInputSchema {
    /// Create a simple schema with required string parameters
    pub fn simple(params: Vec<(&str, &str)>) -> Self {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for (param_name, param_desc) in params.iter() {
            properties.insert(
                param_name.to_string(),
                serde_json::json!({
                    "type": "string",
                    "description": param_desc
                }),
            );
            required.push(param_name.to_string());
        }

        Self {
            schema_type: "object".to_string(),
            properties: Value::Object(properties),
            required,
        }
    }
}

/// Tagged outcome of a tool execution; one message of either kind is fed
/// back into the transcript as a tool message.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(String),
    Error(String),
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        ToolResult::Success(content.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        ToolResult::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error(_))
    }

    /// The content or error text, whichever this result carries.
    pub fn text(&self) -> &str {
        match self {
            ToolResult::Success(content) => content,
            ToolResult::Error(message) => message,
        }
    }
}
