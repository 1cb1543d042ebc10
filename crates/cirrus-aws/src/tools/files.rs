//! `file_operations`: read-only access to files inside the sandbox.

use std::time::SystemTime;

use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::sandbox::FileSandbox;
use super::{command_input, missing_required, Tool, ToolResult};
use crate::error::ErrorInfo;

/// Files larger than this are not returned inline.
const MAX_READ_BYTES: u64 = 1024 * 1024;

/// Upper bound on entries returned by one listing.
const MAX_LIST_ENTRIES: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FileCommand {
    ReadFile,
    ReadFileAsBase64,
    GetFileInfo,
    ListFiles,
}

impl FileCommand {
    pub const ALL: [FileCommand; 4] = [
        FileCommand::ReadFile,
        FileCommand::ReadFileAsBase64,
        FileCommand::GetFileInfo,
        FileCommand::ListFiles,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FileCommand::ReadFile => "ReadFile",
            FileCommand::ReadFileAsBase64 => "ReadFileAsBase64",
            FileCommand::GetFileInfo => "GetFileInfo",
            FileCommand::ListFiles => "ListFiles",
        }
    }

    fn required(self) -> &'static [&'static str] {
        match self {
            FileCommand::ListFiles => &["dirPath"],
            _ => &["filePath"],
        }
    }
}

pub struct FileOperationsTool {
    sandbox: FileSandbox,
}

impl FileOperationsTool {
    pub fn new(sandbox: FileSandbox) -> Self {
        Self { sandbox }
    }

    async fn read_file(&self, params: &Map<String, Value>, as_base64: bool) -> Result<Value, ErrorInfo> {
        let file_path = str_param(params, "filePath");
        let encoding = if as_base64 {
            "base64"
        } else {
            str_param(params, "encoding").unwrap_or("utf8")
        };
        let file_path = file_path.unwrap_or_default();
        let path = self.resolve(file_path)?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| io_error(format!("Failed to read file {file_path}"), e))?;
        if metadata.len() > MAX_READ_BYTES {
            return Err(ErrorInfo::new(
                "FileTooLarge",
                format!(
                    "File {file_path} is {} bytes; the limit is {MAX_READ_BYTES} bytes",
                    metadata.len()
                ),
            ));
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| io_error(format!("Failed to read file {file_path}"), e))?;
        let content = decode(&bytes, encoding)?;
        debug!(path = %path.display(), bytes = bytes.len(), encoding, "file read");

        let content_key = if as_base64 { "base64Content" } else { "content" };
        Ok(json!({
            "filePath": file_path,
            "encoding": encoding,
            "size": bytes.len(),
            content_key: content,
        }))
    }

    async fn file_info(&self, params: &Map<String, Value>) -> Result<Value, ErrorInfo> {
        let file_path = str_param(params, "filePath").unwrap_or_default();
        let path = self.resolve(file_path)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| io_error(format!("Failed to get file info for {file_path}"), e))?;

        Ok(json!({
            "filePath": file_path,
            "isFile": metadata.is_file(),
            "isDirectory": metadata.is_dir(),
            "size": metadata.len(),
            "created": timestamp(metadata.created()),
            "modified": timestamp(metadata.modified()),
            "accessed": timestamp(metadata.accessed()),
            "permissions": permissions(&metadata),
        }))
    }

    async fn list_files(&self, params: &Map<String, Value>) -> Result<Value, ErrorInfo> {
        let dir_path = str_param(params, "dirPath").unwrap_or_default();
        let recursive = params
            .get("recursive")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let root = self.resolve(dir_path)?;

        let mut files = Vec::new();
        let mut truncated = false;
        let mut pending = vec![root];
        'walk: while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| io_error(format!("Failed to list files in {dir_path}"), e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| io_error(format!("Failed to list files in {dir_path}"), e))?
            {
                if files.len() >= MAX_LIST_ENTRIES {
                    truncated = true;
                    break 'walk;
                }
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| io_error(format!("Failed to list files in {dir_path}"), e))?;
                let name = entry.file_name().to_string_lossy().into_owned();
                let path = entry.path();

                if recursive && file_type.is_dir() && !FileSandbox::is_blocked_name(&name) {
                    pending.push(path.clone());
                }
                files.push(json!({
                    "name": name,
                    "path": path.to_string_lossy(),
                    "isFile": file_type.is_file(),
                    "isDirectory": file_type.is_dir(),
                }));
            }
        }

        let mut data = json!({
            "dirPath": dir_path,
            "recursive": recursive,
            "count": files.len(),
            "files": files,
        });
        if truncated {
            data["truncated"] = json!(true);
        }
        Ok(data)
    }

    fn resolve(&self, path: &str) -> Result<std::path::PathBuf, ErrorInfo> {
        self.sandbox.resolve(path).map_err(|message| {
            let name = if message.starts_with("Access denied") {
                "AccessDenied"
            } else {
                "NotFound"
            };
            ErrorInfo::new(name, message)
        })
    }
}

#[async_trait]
impl Tool for FileOperationsTool {
    fn name(&self) -> &str {
        "file_operations"
    }

    fn description(&self) -> &str {
        "Read local files and list directories inside the workspace: read text, read as base64, \
         get file information, and list files (optionally recursive)."
    }

    fn input_schema(&self) -> Value {
        let commands: Vec<&str> = FileCommand::ALL.iter().map(|c| c.name()).collect();
        json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "enum": commands},
                "params": {
                    "type": "object",
                    "properties": {
                        "filePath": {"type": "string", "description": "File path, relative to the workspace or absolute."},
                        "encoding": {
                            "type": "string",
                            "enum": ["utf8", "ascii", "base64", "hex"],
                            "default": "utf8",
                        },
                        "dirPath": {"type": "string", "description": "Directory to list."},
                        "recursive": {"type": "boolean", "default": false},
                    },
                },
            },
            "required": ["command", "params"],
        })
    }

    async fn invoke(&self, input: &Value) -> ToolResult {
        let (name, params) = command_input(input);
        let Some(name) = name else {
            return ToolResult::missing(None, &["command"]);
        };
        let Ok(command) = serde_json::from_value::<FileCommand>(json!(name)) else {
            return ToolResult::unsupported(name);
        };
        let missing = missing_required(&params, command.required());
        if !missing.is_empty() {
            return ToolResult::missing(Some(command.name()), &missing);
        }

        info!(command = command.name(), "file operation");
        let result = match command {
            FileCommand::ReadFile => self.read_file(&params, false).await,
            FileCommand::ReadFileAsBase64 => self.read_file(&params, true).await,
            FileCommand::GetFileInfo => self.file_info(&params).await,
            FileCommand::ListFiles => self.list_files(&params).await,
        };
        match result {
            Ok(data) => ToolResult::executed_locally(command.name(), data),
            Err(error) => {
                warn!(command = command.name(), "file operation failed: {}", error.message);
                ToolResult::failed(command.name(), error)
            }
        }
    }
}

fn str_param<'a>(params: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    params.get(name).and_then(Value::as_str)
}

fn decode(bytes: &[u8], encoding: &str) -> Result<String, ErrorInfo> {
    match encoding.to_ascii_lowercase().as_str() {
        "utf8" | "utf-8" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "ascii" => Ok(bytes.iter().map(|b| char::from(b & 0x7f)).collect()),
        "base64" => Ok(base64::engine::general_purpose::STANDARD.encode(bytes)),
        "hex" => Ok(hex::encode(bytes)),
        other => Err(ErrorInfo::new(
            "ValidationError",
            format!("Unsupported encoding: {other}"),
        )),
    }
}

fn io_error(context: String, e: std::io::Error) -> ErrorInfo {
    ErrorInfo::new(format!("{:?}", e.kind()), format!("{context}: {e}"))
}

/// RFC 3339, or null where the platform has no such time.
fn timestamp(time: std::io::Result<SystemTime>) -> Value {
    time.map(|t| json!(DateTime::<Utc>::from(t).to_rfc3339()))
        .unwrap_or(Value::Null)
}

#[cfg(unix)]
fn permissions(metadata: &std::fs::Metadata) -> Value {
    use std::os::unix::fs::PermissionsExt;
    json!(format!("{:o}", metadata.permissions().mode() & 0o7777))
}

#[cfg(not(unix))]
fn permissions(metadata: &std::fs::Metadata) -> Value {
    json!(if metadata.permissions().readonly() {
        "readonly"
    } else {
        "readwrite"
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn tool() -> (FileOperationsTool, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "hello world").unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("src/nested/lib.rs"), "").unwrap();
        let sandbox = FileSandbox::new(dir.path()).unwrap();
        (FileOperationsTool::new(sandbox), dir)
    }

    async fn run(tool: &FileOperationsTool, input: Value) -> Value {
        serde_json::to_value(tool.invoke(&input).await).unwrap()
    }

    #[tokio::test]
    async fn read_file_as_text() {
        let (tool, _dir) = tool();
        let result = run(&tool, json!({"command": "ReadFile", "params": {"filePath": "hello.txt"}})).await;
        assert_eq!(result["success"], true);
        assert_eq!(result["message"], "ReadFile executed successfully");
        assert_eq!(result["data"]["content"], "hello world");
        assert_eq!(result["data"]["encoding"], "utf8");
        assert_eq!(result["data"]["size"], 11);
    }

    #[tokio::test]
    async fn read_file_as_base64() {
        let (tool, _dir) = tool();
        let result = run(
            &tool,
            json!({"command": "ReadFileAsBase64", "params": {"filePath": "hello.txt"}}),
        )
        .await;
        assert_eq!(result["data"]["base64Content"], "aGVsbG8gd29ybGQ=");
        assert!(result["data"].get("content").is_none());
    }

    #[tokio::test]
    async fn hex_encoding_and_unknown_encoding() {
        let (tool, _dir) = tool();
        let hex = run(
            &tool,
            json!({"command": "ReadFile", "params": {"filePath": "hello.txt", "encoding": "hex"}}),
        )
        .await;
        assert_eq!(hex["data"]["content"], "68656c6c6f20776f726c64");

        let bad = run(
            &tool,
            json!({"command": "ReadFile", "params": {"filePath": "hello.txt", "encoding": "ebcdic"}}),
        )
        .await;
        assert_eq!(bad["success"], false);
        assert_eq!(bad["error"]["message"], "Unsupported encoding: ebcdic");
    }

    #[tokio::test]
    async fn file_info_reports_type_and_times() {
        let (tool, _dir) = tool();
        let result = run(&tool, json!({"command": "GetFileInfo", "params": {"filePath": "src"}})).await;
        assert_eq!(result["data"]["isDirectory"], true);
        assert_eq!(result["data"]["isFile"], false);
        assert!(result["data"]["modified"].is_string());
    }

    #[tokio::test]
    async fn list_files_flat_and_recursive() {
        let (tool, _dir) = tool();
        let flat = run(&tool, json!({"command": "ListFiles", "params": {"dirPath": "src"}})).await;
        assert_eq!(flat["data"]["count"], 2);
        assert_eq!(flat["data"]["recursive"], false);

        let deep = run(
            &tool,
            json!({"command": "ListFiles", "params": {"dirPath": ".", "recursive": true}}),
        )
        .await;
        let names: Vec<&str> = deep["data"]["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(deep["data"]["count"], 5);
        assert!(names.contains(&"lib.rs"));
    }

    #[tokio::test]
    async fn missing_path_is_reported_before_io() {
        let (tool, _dir) = tool();
        let result = run(&tool, json!({"command": "ReadFile", "params": {}})).await;
        assert_eq!(result["success"], false);
        assert_eq!(result["message"], "Missing required parameter(s): filePath");
    }

    #[tokio::test]
    async fn escape_attempt_is_denied() {
        let (tool, _dir) = tool();
        let result = run(
            &tool,
            json!({"command": "ReadFile", "params": {"filePath": "../../../etc/hostname"}}),
        )
        .await;
        assert_eq!(result["success"], false);
        assert_eq!(result["message"], "Failed to execute ReadFile");
    }

    #[tokio::test]
    async fn unknown_command_is_unsupported() {
        let (tool, _dir) = tool();
        let result = run(&tool, json!({"command": "DeleteFile", "params": {}})).await;
        assert_eq!(result["message"], "Unsupported command: DeleteFile");
    }
}
