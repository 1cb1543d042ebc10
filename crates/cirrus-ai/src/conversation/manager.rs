//! Conversation struct and message assembly.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::token_tracker::TokenTracker;
use crate::{Message, ToolDefinition};

use super::types::ToolInvoker;

/// Drives tool-calling turns against a chat model.
pub struct Conversation {
    pub(super) system_prompt: Option<String>,
    pub(super) invoker: Option<Arc<dyn ToolInvoker>>,
    /// Maximum tool rounds per turn.
    pub(super) max_tool_rounds: u32,
    pub(super) tracker: Mutex<TokenTracker>,
    pub(super) busy: AtomicBool,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            system_prompt: None,
            invoker: None,
            max_tool_rounds: 10,
            tracker: Mutex::new(TokenTracker::new()),
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_invoker(mut self, invoker: Arc<dyn ToolInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_tool_rounds(mut self, max: u32) -> Self {
        self.max_tool_rounds = max.max(1);
        self
    }

    pub fn max_tool_rounds(&self) -> u32 {
        self.max_tool_rounds
    }

    /// Snapshot of token usage across all turns so far.
    pub fn tracker(&self) -> TokenTracker {
        self.tracker
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub(super) fn record_usage(&self, model: &str, usage: &crate::TokenUsage) {
        self.tracker
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .record(model, usage);
    }

    pub(super) fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.invoker
            .as_ref()
            .map(|i| i.definitions())
            .unwrap_or_default()
    }

    /// `[system, context?, prompt]`.
    pub(super) fn initial_messages(&self, prompt: String, context: Option<String>) -> Vec<Message> {
        let mut msgs = Vec::with_capacity(3);
        if let Some(ref system) = self.system_prompt {
            msgs.push(Message::system(system.clone()));
        }
        if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
            msgs.push(Message::user(context));
        }
        msgs.push(Message::user(prompt));
        msgs
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
