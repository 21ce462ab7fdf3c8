// Orchestrator state machine tests: one tool round per user turn, ordered
// appends, unknown-tool handling.

use anyhow::Result;
use async_trait::async_trait;
use mockito::Matcher;
use serde_json::Value;

use magpie::cli::Conversation;
use magpie::config::Config;
use magpie::ollama::OllamaClient;
use magpie::tools::{Tool, ToolInputSchema, ToolRegistry};

struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo_tool"
    }

    fn description(&self) -> &str {
        "Echo the value argument"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::simple(vec![("value", "Value to echo")])
    }

    async fn execute(&self, input: Value) -> Result<String> {
        Ok(format!(
            "echoed: {}",
            input.get("value").and_then(|v| v.as_str()).unwrap_or("")
        ))
    }
}

struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "failing_tool"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::simple(vec![])
    }

    async fn execute(&self, _input: Value) -> Result<String> {
        anyhow::bail!("deliberate failure")
    }
}

fn test_config(host: &str) -> Config {
    Config {
        host: host.to_string(),
        enable_tools: true,
        ..Config::default()
    }
}

async fn mock_stream(server: &mut mockito::ServerGuard, text: &str) -> mockito::Mock {
    server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(serde_json::json!({"stream": true})))
        .with_status(200)
        .with_body(format!("{{\"message\":{{\"content\":\"{}\"}}}}\n", text))
        .create_async()
        .await
}

#[tokio::test]
async fn test_turn_without_tool_calls_uses_streamed_text() {
    let mut server = mockito::Server::new_async().await;
    let _stream = mock_stream(&mut server, "plain answer").await;
    let _full = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(serde_json::json!({"stream": false})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":{"content":"ignored structured text"}}"#)
        .create_async()
        .await;

    let client = OllamaClient::new(server.url()).unwrap();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    let config = test_config(&server.url());

    let mut conversation = Conversation::new("sys");
    conversation
        .run_turn(&client, &registry, &config, "hello")
        .await;

    let messages = conversation.messages();
    let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, vec!["system", "user", "assistant"]);
    // Streamed text is canonical when the structured response has no
    // tool calls
    assert_eq!(messages[2].content, "plain answer");
}

#[tokio::test]
async fn test_tool_round_appends_tool_then_final_assistant() {
    let mut server = mockito::Server::new_async().await;
    let _stream = mock_stream(&mut server, "closing words").await;
    let _full = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(serde_json::json!({"stream": false})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"message":{"content":"","tool_calls":[
                {"id":"c1","function":{"name":"echo_tool","arguments":{"value":"42"}}}
            ]}}"#,
        )
        .create_async()
        .await;

    let client = OllamaClient::new(server.url()).unwrap();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    let config = test_config(&server.url());

    let mut conversation = Conversation::new("sys");
    conversation
        .run_turn(&client, &registry, &config, "use the tool")
        .await;

    let messages = conversation.messages();
    let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, vec!["system", "user", "tool", "assistant"]);

    assert_eq!(messages[2].name.as_deref(), Some("echo_tool"));
    assert_eq!(messages[2].content, "echoed: 42");
    assert_eq!(messages[3].content, "closing words");
}

#[tokio::test]
async fn test_tool_error_is_fed_back_as_tool_message() {
    let mut server = mockito::Server::new_async().await;
    let _stream = mock_stream(&mut server, "done").await;
    let _full = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(serde_json::json!({"stream": false})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"message":{"content":"","tool_calls":[
                {"function":{"name":"failing_tool","arguments":{}}}
            ]}}"#,
        )
        .create_async()
        .await;

    let client = OllamaClient::new(server.url()).unwrap();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(FailingTool));
    let config = test_config(&server.url());

    let mut conversation = Conversation::new("sys");
    conversation
        .run_turn(&client, &registry, &config, "try it")
        .await;

    let messages = conversation.messages();
    assert_eq!(messages[2].role, "tool");
    assert!(messages[2].content.contains("deliberate failure"));
    assert_eq!(messages[3].role, "assistant");
}

#[tokio::test]
async fn test_unknown_tool_is_skipped_without_tool_message() {
    let mut server = mockito::Server::new_async().await;
    let _stream = mock_stream(&mut server, "wrap up").await;
    let _full = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(serde_json::json!({"stream": false})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"message":{"content":"","tool_calls":[
                {"function":{"name":"no_such_tool","arguments":{}}}
            ]}}"#,
        )
        .create_async()
        .await;

    let client = OllamaClient::new(server.url()).unwrap();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    let config = test_config(&server.url());

    let mut conversation = Conversation::new("sys");
    conversation
        .run_turn(&client, &registry, &config, "call something odd")
        .await;

    let roles: Vec<&str> = conversation
        .messages()
        .iter()
        .map(|m| m.role.as_str())
        .collect();
    assert_eq!(roles, vec!["system", "user", "assistant"]);
}

#[tokio::test]
async fn test_earlier_messages_are_never_reordered() {
    let mut server = mockito::Server::new_async().await;
    let _stream = mock_stream(&mut server, "answer").await;
    let _full = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(serde_json::json!({"stream": false})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":{"content":"answer"}}"#)
        .create_async()
        .await;

    let client = OllamaClient::new(server.url()).unwrap();
    let registry = ToolRegistry::new();
    let mut config = test_config(&server.url());
    config.enable_tools = false;

    let mut conversation = Conversation::new("sys");
    conversation.run_turn(&client, &registry, &config, "first").await;
    let snapshot: Vec<(String, String)> = conversation
        .messages()
        .iter()
        .map(|m| (m.role.clone(), m.content.clone()))
        .collect();

    conversation.run_turn(&client, &registry, &config, "second").await;
    let after: Vec<(String, String)> = conversation
        .messages()
        .iter()
        .map(|m| (m.role.clone(), m.content.clone()))
        .collect();

    assert_eq!(&after[..snapshot.len()], &snapshot[..]);
    assert_eq!(after.len(), snapshot.len() + 2);
}

#[tokio::test]
async fn test_transport_failure_yields_empty_assistant_turn() {
    let client = OllamaClient::new("http://127.0.0.1:1").unwrap();
    let registry = ToolRegistry::new();
    let mut config = test_config("http://127.0.0.1:1");
    config.enable_tools = false;

    let mut conversation = Conversation::new("sys");
    conversation
        .run_turn(&client, &registry, &config, "anyone there?")
        .await;

    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, "assistant");
    assert!(messages[2].content.is_empty());
}
