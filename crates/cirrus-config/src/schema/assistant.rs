//! Chat assistant configuration: model, prompt and tool-loop limits.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert in Amazon Web Services (AWS). \
You have access to tools to manage S3 buckets, DynamoDB tables, CloudWatch Logs, Lambda \
functions, Glue jobs, IAM roles and policies, Step Functions state machines, and to test \
connectivity. Use the available tools when appropriate to help the user.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub model: String,
    /// Valid range: 256-64000.
    pub max_tokens: u32,
    /// Upper bound on tool-execution rounds per turn (valid range: 1-100).
    pub max_tool_rounds: u32,
    pub system_prompt: String,
    /// Prepend the active profile/region/endpoint as a context message.
    pub include_session_context: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".into(),
            max_tokens: 4096,
            max_tool_rounds: 10,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            include_session_context: true,
        }
    }
}
