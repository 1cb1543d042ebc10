//! Tool-calling conversation loop.
//!
//! A [`Conversation`] owns the system prompt, the tool invoker and the round
//! cap. Each call to [`Conversation::run_turn`] builds a fresh message list,
//! alternates model calls and tool execution until the model stops asking for
//! tools, and returns a [`TurnOutcome`]. Messages are not kept between turns.

mod chat;
mod manager;
mod types;


pub use manager::Conversation;
pub use types::{LoopState, OutputSink, StopReason, ToolInvokeError, ToolInvoker, TurnOutcome};
