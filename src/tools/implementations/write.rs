// File write tool - creates or overwrites, behind the confirmation gate

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::terminal::{ConfirmKind, ConfirmationGate};
use crate::tools::registry::Tool;
use crate::tools::types::ToolInputSchema;

const PREVIEW_LEN: usize = 200;

pub struct FileWriteTool {
    gate: Arc<dyn ConfirmationGate>,
    auto_confirm: bool,
}

impl FileWriteTool {
    pub fn new(gate: Arc<dyn ConfirmationGate>, auto_confirm: bool) -> Self {
        Self { gate, auto_confirm }
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Write content to a file (creates or overwrites)"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::simple(vec![
            ("path", "The path to the file to write"),
            ("content", "The content to write to the file"),
        ])
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let path = match input.get("path").and_then(|v| v.as_str()) {
            Some(p) => p,
            None => bail!("Missing or invalid 'path' parameter"),
        };
        let content = match input.get("content").and_then(|v| v.as_str()) {
            Some(c) => c,
            None => bail!("Missing or invalid 'content' parameter"),
        };

        if path.contains("..") {
            bail!("Path contains forbidden '..' sequence");
        }

        if !self.auto_confirm {
            let mut preview: String = content.chars().take(PREVIEW_LEN).collect();
            if content.chars().count() > PREVIEW_LEN {
                preview.push_str("... (truncated)");
            }

            let confirmed = self.gate.confirm(
                ConfirmKind::FileOperation,
                "The AI is requesting to write to the file:",
                path,
                &format!("Content (preview):\n{}", preview),
                "",
            );
            if !confirmed {
                bail!("File write operation denied by user");
            }
        }

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Could not create directories for: {}", path))?;
            }
        }

        fs::write(path, content)
            .with_context(|| format!("Could not open file for writing: {}", path))?;

        Ok(format!(
            "File successfully written: {} ({} bytes)",
            path,
            content.len()
        ))
    }
}
