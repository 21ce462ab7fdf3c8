// File read tool

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::tools::registry::Tool;
use crate::tools::types::ToolInputSchema;

const MAX_CONTENT_LEN: usize = 50_000;

pub struct FileReadTool;

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read the contents of a file"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::simple(vec![("path", "The path to the file to read")])
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let path = match input.get("path").and_then(|v| v.as_str()) {
            Some(p) => p,
            None => bail!("Missing or invalid 'path' parameter"),
        };

        if path.contains("..") {
            bail!("Path contains forbidden '..' sequence");
        }

        let file_path = Path::new(path);
        if !file_path.exists() {
            bail!("File does not exist: {}", path);
        }
        if !file_path.is_file() {
            bail!("Not a regular file: {}", path);
        }

        let mut content = fs::read_to_string(file_path)
            .with_context(|| format!("Could not open file: {}", path))?;

        if content.len() > MAX_CONTENT_LEN {
            // Back off to a char boundary so the cut never splits a
            // multi-byte character
            let mut cut = MAX_CONTENT_LEN;
            while !content.is_char_boundary(cut) {
                cut -= 1;
            }
            content.truncate(cut);
            content.push_str("\n... (content truncated, file too large)");
        }

        Ok(content)
    }
}
