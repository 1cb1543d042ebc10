//! Ctrl-C routing for the chat loop.
//!
//! One process-wide handler is installed. A signal cancels the turn in flight;
//! with no turn running it ends the process.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

/// Exit status for a process stopped by SIGINT.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Tracks the cancellation token of the turn currently running, if any.
#[derive(Clone, Default)]
pub struct Interrupts {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the Ctrl-C handler. Runs for the life of the process.
    pub fn install(&self) {
        let interrupts = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("failed to listen for Ctrl-C: {e}");
                    return;
                }
                if !interrupts.interrupt() {
                    tracing::info!("interrupted while idle, exiting");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        });
    }

    /// Register a new turn and return its token.
    pub fn begin_turn(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.active.lock().unwrap_or_else(|p| p.into_inner()) = Some(token.clone());
        token
    }

    pub fn end_turn(&self) {
        self.active.lock().unwrap_or_else(|p| p.into_inner()).take();
    }

    /// Cancel the running turn. Returns `false` when no turn is running.
    pub fn interrupt(&self) -> bool {
        match self.active.lock().unwrap_or_else(|p| p.into_inner()).as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
