//! AiClient trait implementation for ClaudeClient (streaming Messages API).

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::streaming::{parse_sse_stream, SseEvent};
use crate::{AiClient, AiError, AiResponse, Message, TokenUsage, ToolCall, ToolDefinition};

use super::client::{ClaudeClient, ANTHROPIC_API_URL};

impl ClaudeClient {
    async fn post(&self, body: &Value) -> Result<reqwest::Response, AiError> {
        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .headers(self.auth_headers()?)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl AiClient for ClaudeClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_chunk: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<AiResponse, AiError> {
        let body = self.build_request_body(messages, tools, true);

        debug!(model = %self.config.model, messages = messages.len(), "Claude API streaming request");

        let response = self.post(&body).await?;

        let mut acc = StreamAccumulator::default();
        parse_sse_stream(response, |event: SseEvent| {
            if let Some(chunk) = acc.apply(&event) {
                on_chunk(chunk);
            }
        })
        .await?;

        if let Some(message) = acc.error.take() {
            return Err(AiError::ApiError(message));
        }

        if acc.usage.total_tokens() == 0 {
            warn!("No usage data received in streaming response");
        }

        Ok(acc.into_response())
    }
}

/// Folds Messages API stream events into a response.
#[derive(Debug, Default)]
pub(crate) struct StreamAccumulator {
    content: String,
    tool_calls: Vec<ToolCall>,
    usage: TokenUsage,
    error: Option<String>,

    // tool_use block being built
    current_tool_id: String,
    current_tool_name: String,
    current_tool_json: String,
}

impl StreamAccumulator {
    /// Apply one event. Returns the text fragment it carried, if any.
    pub(crate) fn apply(&mut self, event: &SseEvent) -> Option<String> {
        let event_type = event.event.as_deref().unwrap_or("");
        let data: Value = match serde_json::from_str(&event.data) {
            Ok(data) => data,
            Err(e) => {
                debug!(event = event_type, "skipping unparseable stream event: {e}");
                return None;
            }
        };

        match event_type {
            "content_block_delta" => match data["delta"]["type"].as_str().unwrap_or("") {
                "text_delta" => {
                    let text = data["delta"]["text"].as_str()?;
                    if text.is_empty() {
                        return None;
                    }
                    self.content.push_str(text);
                    return Some(text.to_string());
                }
                "input_json_delta" => {
                    if let Some(part) = data["delta"]["partial_json"].as_str() {
                        self.current_tool_json.push_str(part);
                    }
                }
                _ => {}
            },
            "content_block_start" => {
                if data["content_block"]["type"] == "tool_use" {
                    self.current_tool_id = data["content_block"]["id"]
                        .as_str()
                        .map(String::from)
                        .unwrap_or_else(cirrus_common::new_id);
                    self.current_tool_name = data["content_block"]["name"]
                        .as_str()
                        .unwrap_or("")
                        .to_string();
                    self.current_tool_json.clear();
                }
            }
            "content_block_stop" => {
                if !self.current_tool_name.is_empty() {
                    let arguments = if self.current_tool_json.trim().is_empty() {
                        Value::Object(Default::default())
                    } else {
                        serde_json::from_str(&self.current_tool_json).unwrap_or_else(|e| {
                            warn!(tool = %self.current_tool_name, "malformed tool input: {e}");
                            Value::Null
                        })
                    };
                    self.tool_calls.push(ToolCall {
                        id: std::mem::take(&mut self.current_tool_id),
                        name: std::mem::take(&mut self.current_tool_name),
                        arguments,
                    });
                    self.current_tool_json.clear();
                }
            }
            "message_start" => {
                if let Some(u) = data["message"].get("usage") {
                    self.usage.input_tokens = u["input_tokens"].as_u64().unwrap_or(0);
                }
            }
            "message_delta" => {
                if let Some(u) = data.get("usage") {
                    self.usage.output_tokens = u["output_tokens"].as_u64().unwrap_or(0);
                }
            }
            "error" => {
                let message = data["error"]["message"]
                    .as_str()
                    .unwrap_or("stream error")
                    .to_string();
                self.error = Some(message);
            }
            _ => {}
        }
        None
    }

    pub(crate) fn into_response(self) -> AiResponse {
        AiResponse {
            content: self.content,
            tool_calls: self.tool_calls,
            usage: self.usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, data: &str) -> SseEvent {
        SseEvent {
            event: Some(name.to_string()),
            data: data.to_string(),
        }
    }

    #[test]
    fn text_deltas_stream_in_order() {
        let mut acc = StreamAccumulator::default();
        let mut chunks = Vec::new();
        for e in [
            event("message_start", r#"{"message":{"usage":{"input_tokens":30}}}"#),
            event("content_block_delta", r#"{"delta":{"type":"text_delta","text":"Hel"}}"#),
            event("content_block_delta", r#"{"delta":{"type":"text_delta","text":"lo"}}"#),
            event("message_delta", r#"{"usage":{"output_tokens":4}}"#),
        ] {
            chunks.extend(acc.apply(&e));
        }

        assert_eq!(chunks, ["Hel", "lo"]);
        let response = acc.into_response();
        assert_eq!(response.content, "Hello");
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage.input_tokens, 30);
        assert_eq!(response.usage.output_tokens, 4);
    }

    #[test]
    fn tool_use_blocks_are_assembled() {
        let mut acc = StreamAccumulator::default();
        for e in [
            event(
                "content_block_start",
                r#"{"content_block":{"type":"tool_use","id":"toolu_1","name":"aws_s3"}}"#,
            ),
            event(
                "content_block_delta",
                r#"{"delta":{"type":"input_json_delta","partial_json":"{\"command\":"}}"#,
            ),
            event(
                "content_block_delta",
                r#"{"delta":{"type":"input_json_delta","partial_json":"\"ListBuckets\"}"}}"#,
            ),
            event("content_block_stop", r#"{"index":0}"#),
            event(
                "content_block_start",
                r#"{"content_block":{"type":"tool_use","id":"toolu_2","name":"aws_get_session"}}"#,
            ),
            event("content_block_stop", r#"{"index":1}"#),
        ] {
            assert!(acc.apply(&e).is_none());
        }

        let response = acc.into_response();
        assert_eq!(response.tool_calls.len(), 2);
        assert_eq!(response.tool_calls[0].id, "toolu_1");
        assert_eq!(response.tool_calls[0].arguments["command"], "ListBuckets");
        assert_eq!(response.tool_calls[1].name, "aws_get_session");
        assert!(response.tool_calls[1].arguments.is_object());
    }

    #[test]
    fn text_block_stop_does_not_create_tool_call() {
        let mut acc = StreamAccumulator::default();
        acc.apply(&event(
            "content_block_delta",
            r#"{"delta":{"type":"text_delta","text":"hi"}}"#,
        ));
        acc.apply(&event("content_block_stop", r#"{"index":0}"#));
        assert!(acc.into_response().tool_calls.is_empty());
    }

    #[test]
    fn error_event_is_recorded() {
        let mut acc = StreamAccumulator::default();
        acc.apply(&event(
            "error",
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        ));
        assert_eq!(acc.error.as_deref(), Some("Overloaded"));
    }
}
