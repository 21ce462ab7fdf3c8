// Ollama API request/response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolDefinition;

/// One transcript entry. `name` is only meaningful for tool messages and
/// `tool_calls` is only populated on assistant messages parsed from the
/// server; neither is sent back upstream except `name` on tool messages.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    pub name: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// Tool result message, fed back into the transcript after execution.
    pub fn tool_response(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.into(),
            name: Some(name.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A tool invocation requested by the model. The id is an opaque
/// correlation token and may be empty; arguments are normalized to a
/// structured object where possible (see `normalize_arguments`).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// Wire form of a transcript message for `/api/chat`.
#[derive(Debug, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl WireMessage {
    pub fn from_chat(msg: &ChatMessage) -> Self {
        // Only tool messages carry a name on the wire
        let name = if msg.role == "tool" { msg.name.clone() } else { None };
        Self {
            role: msg.role.clone(),
            content: msg.content.clone(),
            name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

impl ChatRequest {
    pub fn new(model: &str, messages: &[ChatMessage], tools: &[ToolDefinition], stream: bool) -> Self {
        let wire_tools = if tools.is_empty() {
            None
        } else {
            Some(tools.iter().map(|t| t.to_wire()).collect())
        };
        Self {
            model: model.to_string(),
            messages: messages.iter().map(WireMessage::from_chat).collect(),
            stream,
            tools: wire_tools,
        }
    }
}

/// Non-streaming response body. All fields are optional on the wire;
/// anything missing degrades to an empty assistant message.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct WireToolCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<WireFunction>,
}

#[derive(Debug, Deserialize)]
pub struct WireFunction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// One line of a streaming response.
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub message: Option<StreamMessage>,
}

#[derive(Debug, Deserialize)]
pub struct StreamMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// `GET /api/version` body; the probe succeeds iff `version` is present.
#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub name: String,
}

/// The model may send tool arguments as an embedded JSON string or as an
/// already-structured object. Strings are parsed; a string that fails to
/// parse is preserved as-is rather than discarded.
pub fn normalize_arguments(raw: &Value) -> Value {
    match raw {
        Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())),
        other => other.clone(),
    }
}

impl ChatResponse {
    /// Flatten the wire response into an assistant message with
    /// normalized tool calls.
    pub fn into_chat_message(self) -> ChatMessage {
        let mut msg = ChatMessage::assistant("");
        if let Some(message) = self.message {
            if let Some(content) = message.content {
                msg.content = content;
            }
            for call in message.tool_calls.unwrap_or_default() {
                let (name, arguments) = match call.function {
                    Some(f) => (
                        f.name.unwrap_or_default(),
                        f.arguments
                            .map(|a| normalize_arguments(&a))
                            .unwrap_or(Value::Null),
                    ),
                    None => (String::new(), Value::Null),
                };
                msg.tool_calls.push(ToolCallRequest {
                    id: call.id.unwrap_or_default(),
                    name,
                    arguments,
                });
            }
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_message_carries_name_on_wire() {
        let msg = ChatMessage::tool_response("output", "file_read");
        let wire = WireMessage::from_chat(&msg);
        let json = serde_json::to_string(&wire).unwrap();
        assert!(json.contains("\"name\":\"file_read\""));
        assert!(json.contains("\"role\":\"tool\""));
    }

    #[test]
    fn test_user_message_omits_name_on_wire() {
        let wire = WireMessage::from_chat(&ChatMessage::user("hi"));
        let json = serde_json::to_string(&wire).unwrap();
        assert!(!json.contains("name"));
    }

    #[test]
    fn test_request_without_tools_omits_field() {
        let req = ChatRequest::new("llama3", &[ChatMessage::user("hi")], &[], false);
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("tools"));
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn test_normalize_arguments_parses_json_string() {
        let raw = Value::String("{\"path\": \"a.txt\"}".to_string());
        let normalized = normalize_arguments(&raw);
        assert_eq!(normalized["path"], "a.txt");
    }

    #[test]
    fn test_normalize_arguments_keeps_unparseable_string() {
        let raw = Value::String("not json at all {".to_string());
        let normalized = normalize_arguments(&raw);
        assert_eq!(normalized, raw);
    }

    #[test]
    fn test_normalize_arguments_passes_object_through() {
        let raw = serde_json::json!({"expression": "2+2"});
        assert_eq!(normalize_arguments(&raw), raw);
    }

    #[test]
    fn test_response_with_string_arguments() {
        let body = r#"{"message":{"content":"","tool_calls":[
            {"id":"call_1","function":{"name":"calculator","arguments":"{\"expression\":\"2+2\"}"}}
        ]}}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let msg = response.into_chat_message();
        assert_eq!(msg.tool_calls.len(), 1);
        assert_eq!(msg.tool_calls[0].name, "calculator");
        assert_eq!(msg.tool_calls[0].arguments["expression"], "2+2");
    }

    #[test]
    fn test_response_without_message_is_empty_assistant() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        let msg = response.into_chat_message();
        assert_eq!(msg.role, "assistant");
        assert!(msg.content.is_empty());
        assert!(!msg.has_tool_calls());
    }
}
