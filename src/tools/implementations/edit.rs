// File edit tool - one operation per call, selected by which argument
// set is present: full replace, find/replace, append, prepend, or
// insert-at-line.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::terminal::{ConfirmKind, ConfirmationGate};
use crate::tools::registry::Tool;
use crate::tools::types::ToolInputSchema;

const PREVIEW_LEN: usize = 100;

enum EditOp {
    ReplaceAll(String),
    ReplaceText { old: String, new: String },
    Append(String),
    Prepend(String),
    InsertAtLine { line: i64, text: String },
}

impl EditOp {
    /// Pick the operation from the argument set. Detection order matches
    /// the precedence documented in the schema.
    fn from_input(input: &Value) -> Option<Self> {
        let str_arg = |key: &str| input.get(key).and_then(|v| v.as_str()).map(String::from);

        if let Some(content) = str_arg("replace_all") {
            return Some(EditOp::ReplaceAll(content));
        }
        if let (Some(old), Some(new)) = (str_arg("old_text"), str_arg("new_text")) {
            return Some(EditOp::ReplaceText { old, new });
        }
        if let Some(text) = str_arg("append") {
            return Some(EditOp::Append(text));
        }
        if let Some(text) = str_arg("prepend") {
            return Some(EditOp::Prepend(text));
        }
        if let (Some(line), Some(text)) = (
            input.get("insert_at_line").and_then(|v| v.as_i64()),
            str_arg("text"),
        ) {
            return Some(EditOp::InsertAtLine { line, text });
        }
        None
    }

    fn description(&self) -> String {
        match self {
            EditOp::ReplaceAll(_) => "Replace entire file".to_string(),
            EditOp::ReplaceText { .. } => "Replace text in file".to_string(),
            EditOp::Append(_) => "Append to file".to_string(),
            EditOp::Prepend(_) => "Prepend to file".to_string(),
            EditOp::InsertAtLine { line, .. } => format!("Insert at line {}", line),
        }
    }

    fn confirmation_details(&self) -> String {
        let preview = |text: &str| {
            if text.chars().count() > PREVIEW_LEN {
                let cut: String = text.chars().take(PREVIEW_LEN).collect();
                format!("{}... (truncated)", cut)
            } else {
                text.to_string()
            }
        };

        let mut details = format!("Operation: {}", self.description());
        match self {
            EditOp::ReplaceText { old, new } => {
                details.push_str(&format!("\nOld Text: {}", preview(old)));
                details.push_str(&format!("\nNew Text: {}", preview(new)));
            }
            EditOp::ReplaceAll(text)
            | EditOp::Append(text)
            | EditOp::Prepend(text)
            | EditOp::InsertAtLine { text, .. } => {
                details.push_str(&format!("\nNew Content: {}", preview(text)));
            }
        }
        details
    }

    /// Apply to the current content; the file is only rewritten on Ok.
    fn apply(self, content: String) -> Result<String> {
        match self {
            EditOp::ReplaceAll(new_content) => Ok(new_content),
            EditOp::ReplaceText { old, new } => {
                if !content.contains(&old) {
                    bail!("Could not find the text to replace in the file");
                }
                Ok(content.replacen(&old, &new, 1))
            }
            EditOp::Append(text) => Ok(content + &text),
            EditOp::Prepend(text) => Ok(text + &content),
            EditOp::InsertAtLine { line, text } => {
                let mut lines: Vec<&str> = content.lines().collect();
                let index = line.clamp(0, lines.len() as i64) as usize;
                lines.insert(index, &text);
                Ok(lines.join("\n"))
            }
        }
    }
}

pub struct FileEditTool {
    gate: Arc<dyn ConfirmationGate>,
    auto_confirm: bool,
}

impl FileEditTool {
    pub fn new(gate: Arc<dyn ConfirmationGate>, auto_confirm: bool) -> Self {
        Self { gate, auto_confirm }
    }
}

#[async_trait]
impl Tool for FileEditTool {
    fn name(&self) -> &str {
        "file_edit"
    }

    fn description(&self) -> &str {
        "Edit an existing file (partial edits or replacement)"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: serde_json::json!({
                "path": {
                    "type": "string",
                    "description": "The path to the file to edit"
                },
                "replace_all": {
                    "type": "string",
                    "description": "If provided, replaces the entire file content"
                },
                "old_text": {
                    "type": "string",
                    "description": "The text to find and replace"
                },
                "new_text": {
                    "type": "string",
                    "description": "The new text to replace with"
                },
                "append": {
                    "type": "string",
                    "description": "Text to append to the end of the file"
                },
                "prepend": {
                    "type": "string",
                    "description": "Text to insert at the beginning of the file"
                },
                "insert_at_line": {
                    "type": "integer",
                    "description": "Line number where to insert text (0-based)"
                },
                "text": {
                    "type": "string",
                    "description": "Text to insert at the specified line"
                }
            }),
            required: vec!["path".to_string()],
        }
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let path = match input.get("path").and_then(|v| v.as_str()) {
            Some(p) => p,
            None => bail!("Missing or invalid 'path' parameter"),
        };

        if path.contains("..") {
            bail!("Path contains forbidden '..' sequence");
        }
        if !Path::new(path).exists() {
            bail!("File does not exist: {}", path);
        }

        let operation = match EditOp::from_input(&input) {
            Some(op) => op,
            None => bail!(
                "No valid edit operation specified. Use 'replace_all', 'old_text'+'new_text', \
                 'append', 'prepend', or 'insert_at_line'+'text'"
            ),
        };

        if !self.auto_confirm {
            let confirmed = self.gate.confirm(
                ConfirmKind::FileOperation,
                "The AI is requesting to edit the file:",
                path,
                &operation.confirmation_details(),
                "",
            );
            if !confirmed {
                bail!("File edit operation denied by user");
            }
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not open file for reading: {}", path))?;
        let new_content = operation.apply(content)?;

        fs::write(path, new_content)
            .with_context(|| format!("Could not open file for writing: {}", path))?;

        Ok(format!("File successfully edited: {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::implementations::test_gates::CountingGate;
    use std::io::Write;

    fn tool() -> FileEditTool {
        FileEditTool::new(CountingGate::new(true), true)
    }

    fn temp_with(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_replace_text() {
        let file = temp_with("hello old world");
        tool()
            .execute(serde_json::json!({
                "path": file.path(), "old_text": "old", "new_text": "new"
            }))
            .await
            .unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "hello new world");
    }

    #[tokio::test]
    async fn test_replace_text_not_found_leaves_file_unmodified() {
        let file = temp_with("original content");
        let err = tool()
            .execute(serde_json::json!({
                "path": file.path(), "old_text": "missing", "new_text": "x"
            }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Could not find the text"));
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "original content");
    }

    #[tokio::test]
    async fn test_replace_all() {
        let file = temp_with("anything");
        tool()
            .execute(serde_json::json!({"path": file.path(), "replace_all": "fresh"}))
            .await
            .unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_append_and_prepend() {
        let file = temp_with("mid");
        tool()
            .execute(serde_json::json!({"path": file.path(), "append": "-end"}))
            .await
            .unwrap();
        tool()
            .execute(serde_json::json!({"path": file.path(), "prepend": "start-"}))
            .await
            .unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "start-mid-end");
    }

    #[tokio::test]
    async fn test_insert_at_line_negative_clamps_to_start() {
        let file = temp_with("a\nb\nc");
        tool()
            .execute(serde_json::json!({
                "path": file.path(), "insert_at_line": -5, "text": "first"
            }))
            .await
            .unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "first\na\nb\nc");
    }

    #[tokio::test]
    async fn test_insert_at_line_past_end_appends() {
        let file = temp_with("a\nb\nc");
        tool()
            .execute(serde_json::json!({
                "path": file.path(), "insert_at_line": 99, "text": "last"
            }))
            .await
            .unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "a\nb\nc\nlast");
    }

    #[tokio::test]
    async fn test_insert_at_middle_line() {
        let file = temp_with("a\nb\nc");
        tool()
            .execute(serde_json::json!({
                "path": file.path(), "insert_at_line": 1, "text": "x"
            }))
            .await
            .unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "a\nx\nb\nc");
    }

    #[tokio::test]
    async fn test_missing_file_rejected() {
        let err = tool()
            .execute(serde_json::json!({"path": "/no/such/file", "append": "x"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_no_operation_rejected() {
        let file = temp_with("content");
        let err = tool()
            .execute(serde_json::json!({"path": file.path()}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No valid edit operation"));
    }

    #[tokio::test]
    async fn test_denied_edit_leaves_file_untouched() {
        let file = temp_with("keep me");
        let gate = CountingGate::new(false);
        let tool = FileEditTool::new(gate.clone(), false);
        let err = tool
            .execute(serde_json::json!({"path": file.path(), "replace_all": "gone"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("denied by user"));
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "keep me");
        assert_eq!(gate.calls(), 1);
    }
}
