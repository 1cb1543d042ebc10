//! The tool catalogue exposed to the model.
//!
//! Every tool takes a JSON input and returns a [`ToolResult`] envelope;
//! `invoke` never fails; errors are reported inside the envelope.

mod connection;
mod files;
mod sandbox;
mod service;
mod session;

use async_trait::async_trait;
use cirrus_ai::ToolDefinition;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AwsError, ErrorInfo};
use crate::protocol::ApiOutput;

pub use connection::{ListBucketsTool, TestConnectionTool};
pub use files::{FileCommand, FileOperationsTool};
pub use sandbox::FileSandbox;
pub use service::ServiceTool;
pub use session::{GetSessionTool, SessionTool, SetEndpointTool, SetProfileTool, SetRegionTool};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the input object.
    fn input_schema(&self) -> Value;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.input_schema(),
        }
    }

    async fn invoke(&self, input: &Value) -> ToolResult;
}

/// The JSON envelope every tool returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
    /// Tool-specific top-level fields (`awsRegion`, `buckets`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub http_status_code: u16,
}

impl ToolResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            command: None,
            message: message.into(),
            data: None,
            error: None,
            metadata: None,
            fields: Map::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }

    /// A backend call that succeeded.
    pub fn executed(command: &str, output: ApiOutput) -> Self {
        Self {
            command: Some(command.to_string()),
            data: Some(output.data),
            metadata: Some(ResultMetadata {
                request_id: output.request_id,
                http_status_code: output.http_status,
            }),
            ..Self::ok(format!("{command} executed successfully"))
        }
    }

    /// A local command that succeeded.
    pub fn executed_locally(command: &str, data: Value) -> Self {
        Self {
            command: Some(command.to_string()),
            data: Some(data),
            ..Self::ok(format!("{command} executed successfully"))
        }
    }

    pub fn failed(command: &str, error: ErrorInfo) -> Self {
        Self {
            command: Some(command.to_string()),
            error: serde_json::to_value(error).ok(),
            ..Self::fail(format!("Failed to execute {command}"))
        }
    }

    pub fn aws_failed(command: &str, error: &AwsError) -> Self {
        Self::failed(command, ErrorInfo::from(error))
    }

    pub fn unsupported(command: &str) -> Self {
        Self {
            command: Some(command.to_string()),
            ..Self::fail(format!("Unsupported command: {command}"))
        }
    }

    pub fn missing(command: Option<&str>, names: &[&str]) -> Self {
        Self {
            command: command.map(String::from),
            ..Self::fail(format!("Missing required parameter(s): {}", names.join(", ")))
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<Value>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Pretty-printed JSON, the form handed back to the model.
    pub fn to_text(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!("{{\n  \"success\": false,\n  \"message\": \"failed to serialize tool result: {e}\"\n}}")
        })
    }
}

/// Split a `{command, params}` input. Absent or non-object params are empty.
pub(crate) fn command_input(input: &Value) -> (Option<&str>, Map<String, Value>) {
    let command = input
        .get("command")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let params = match input.get("params") {
        Some(Value::Object(params)) => params.clone(),
        _ => Map::new(),
    };
    (command, params)
}

/// Required names that are absent, null or empty strings.
pub(crate) fn missing_required<'a>(params: &Map<String, Value>, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|name| match params.get(*name) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .collect()
}

/// A string field of a single-purpose tool's input, trimmed; `None` if empty.
pub(crate) fn string_field<'a>(input: &'a Value, name: &str) -> Option<&'a str> {
    input
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
