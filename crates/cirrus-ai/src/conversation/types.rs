//! Loop types, the tool seam, and the concurrency guard.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::{AiError, Message, TokenUsage, ToolDefinition};

/// Where streamed model text and progress lines go.
pub trait OutputSink: Send + Sync {
    /// A fragment of model output, in arrival order.
    fn text(&self, fragment: &str);

    /// A status line such as `Running tool: aws_s3...`.
    fn progress(&self, line: &str);
}

/// Executes tools by name on behalf of the loop.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// The tool catalogue advertised to the model.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Run one tool. The returned text is fed back to the model verbatim.
    async fn invoke(&self, name: &str, input: &serde_json::Value)
        -> Result<String, ToolInvokeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolInvokeError {
    #[error("Tool not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Drafting,
    ExecutingTools,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model answered without requesting tools.
    Completed,
    /// The cancellation token fired before a round started.
    Cancelled,
    /// The tool round cap was reached.
    RoundLimit,
    /// The model call failed; the apology text is the final output.
    ModelError,
}

/// Result of one [`run_turn`](super::Conversation::run_turn).
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Text of the last model response (or the error text).
    pub final_text: String,
    /// Completed tool rounds.
    pub rounds: u32,
    pub model_calls: u32,
    pub tool_invocations: u32,
    pub stop_reason: StopReason,
    pub final_state: LoopState,
    pub usage: TokenUsage,
    /// The full message list as sent to the model, plus the final answer.
    pub messages: Vec<Message>,
}

/// Guard that clears the `busy` flag on drop, so it is released even if the
/// turn future is dropped or returns early.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Attempt to acquire the busy flag. Fails with [`AiError::Busy`] if taken.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self, AiError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(AiError::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
