//! The turn loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{AiClient, AiError, Message, TokenUsage};

use super::manager::Conversation;
use super::types::{BusyGuard, LoopState, OutputSink, StopReason, TurnOutcome};

impl Conversation {
    /// Run one user turn to completion.
    ///
    /// Model text is streamed to `sink` as it arrives. Tool calls are executed
    /// one at a time in request order and their results appended for the next
    /// round. `cancel` is checked at the top of every round; in-flight model
    /// or tool calls are not interrupted.
    ///
    /// Model failures end the turn with [`StopReason::ModelError`] and an
    /// apology written to `sink`. The only error returned is
    /// [`AiError::Busy`] when another turn is already running.
    pub async fn run_turn(
        &self,
        client: &dyn AiClient,
        prompt: impl Into<String>,
        context: Option<String>,
        sink: Arc<dyn OutputSink>,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, AiError> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let turn = cirrus_common::new_correlation_id();
        let tools = self.tool_definitions();
        let mut messages = self.initial_messages(prompt.into(), context);

        info!(turn = %turn, model = client.model_name(), tools = tools.len(), "turn started");

        let mut state = LoopState::Drafting;
        let mut rounds = 0u32;
        let mut model_calls = 0u32;
        let mut tool_invocations = 0u32;
        let mut usage = TokenUsage::default();
        let mut final_text = String::new();

        let stop_reason = loop {
            if cancel.is_cancelled() {
                debug!(turn = %turn, rounds, "cancelled before model call");
                break StopReason::Cancelled;
            }

            debug!(turn = %turn, ?state, round = rounds + 1, "drafting");
            let on_chunk: Box<dyn Fn(String) + Send + Sync> = {
                let sink = Arc::clone(&sink);
                Box::new(move |chunk: String| sink.text(&chunk))
            };

            model_calls += 1;
            let response = match client
                .send_message_streaming(&messages, &tools, on_chunk)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(turn = %turn, "model call failed: {e}");
                    final_text = format!("I'm sorry, I couldn't connect to the AI model: {e}");
                    sink.text(&final_text);
                    break StopReason::ModelError;
                }
            };

            usage.add(&response.usage);
            self.record_usage(client.model_name(), &response.usage);
            final_text = response.content.clone();

            let invoker = match self.invoker.as_ref() {
                Some(invoker) if !response.tool_calls.is_empty() => invoker,
                _ => {
                    messages.push(Message::assistant(response.content));
                    break StopReason::Completed;
                }
            };

            if rounds >= self.max_tool_rounds {
                warn!(turn = %turn, max = self.max_tool_rounds, "tool round limit reached");
                messages.push(Message::assistant(response.content));
                break StopReason::RoundLimit;
            }
            rounds += 1;

            state = LoopState::ExecutingTools;
            debug!(turn = %turn, ?state, calls = response.tool_calls.len(), "executing tools");

            let calls = response.tool_calls;
            messages.push(Message::assistant_tool_calls(response.content, calls.clone()));

            for call in &calls {
                sink.progress(&format!("Running tool: {}...", call.name));
                tool_invocations += 1;

                let result = match invoker.invoke(&call.name, &call.arguments).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(turn = %turn, tool = %call.name, "tool failed: {e}");
                        format!("Tool execution failed: {e}")
                    }
                };
                messages.push(Message::tool_result(call.id.clone(), result));
            }

            state = LoopState::Drafting;
        };

        info!(
            turn = %turn,
            ?stop_reason,
            rounds,
            model_calls,
            tool_invocations,
            tokens = usage.total_tokens(),
            "turn finished"
        );

        Ok(TurnOutcome {
            final_text,
            rounds,
            model_calls,
            tool_invocations,
            stop_reason,
            final_state: LoopState::Done,
            usage,
            messages,
        })
    }
}
