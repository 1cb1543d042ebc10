//! Claude API client struct and request building.

use std::time::Duration;

use serde_json::{json, Value};

use crate::{AiError, Message, Role, ToolDefinition};

use super::config::{AuthMethod, ClaudeConfig};

pub(crate) const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude API client.
pub struct ClaudeClient {
    pub(crate) config: ClaudeConfig,
    pub(crate) http: reqwest::Client,
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClaudeConfig {
        &self.config
    }

    /// Build auth headers for the configured auth method.
    pub(crate) fn auth_headers(&self) -> Result<reqwest::header::HeaderMap, AiError> {
        let invalid = |e: reqwest::header::InvalidHeaderValue| {
            AiError::ApiError(format!("invalid auth header: {e}"))
        };

        let mut headers = reqwest::header::HeaderMap::new();
        match self.config.auth_method {
            AuthMethod::ApiKey => {
                headers.insert("x-api-key", self.config.token.parse().map_err(invalid)?);
            }
            AuthMethod::OAuth => {
                headers.insert(
                    "Authorization",
                    format!("Bearer {}", self.config.token)
                        .parse()
                        .map_err(invalid)?,
                );
            }
        }
        headers.insert(
            "anthropic-version",
            reqwest::header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        Ok(headers)
    }

    /// Build the JSON request body for the Messages API.
    ///
    /// System messages move to the top-level `system` field. Consecutive
    /// messages with the same role are merged into one message so that
    /// several tool results answer a single assistant turn.
    pub(crate) fn build_request_body(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        stream: bool,
    ) -> Value {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut msgs: Vec<Value> = Vec::new();

        for msg in messages {
            let role = match msg.role {
                Role::System => {
                    system_parts.push(&msg.content);
                    continue;
                }
                Role::User => "user",
                Role::Assistant => "assistant",
            };

            let blocks = content_blocks(msg);
            if blocks.is_empty() {
                continue;
            }

            match msgs.last_mut() {
                Some(last) if last["role"] == role => {
                    if let Some(content) = last["content"].as_array_mut() {
                        content.extend(blocks);
                    }
                }
                _ => msgs.push(json!({ "role": role, "content": blocks })),
            }
        }

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": msgs,
        });

        if !system_parts.is_empty() {
            body["system"] = json!(system_parts.join("\n\n"));
        }

        if !tools.is_empty() {
            let tool_defs: Vec<_> = tools.iter().map(to_claude_tool).collect();
            body["tools"] = json!(tool_defs);
        }

        if stream {
            body["stream"] = json!(true);
        }

        body
    }
}

/// Convert a tool definition to the Claude API format.
pub(crate) fn to_claude_tool(tool: &ToolDefinition) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.parameters,
    })
}

fn content_blocks(msg: &Message) -> Vec<Value> {
    let mut blocks = Vec::new();

    if let Some(ref result) = msg.tool_result {
        blocks.push(json!({
            "type": "tool_result",
            "tool_use_id": result.call_id,
            "content": result.content,
        }));
    }

    if !msg.content.is_empty() {
        blocks.push(json!({ "type": "text", "text": msg.content }));
    }

    for call in &msg.tool_calls {
        let input = if call.arguments.is_object() {
            call.arguments.clone()
        } else {
            json!({})
        };
        blocks.push(json!({
            "type": "tool_use",
            "id": call.id,
            "name": call.name,
            "input": input,
        }));
    }

    blocks
}
