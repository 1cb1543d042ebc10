//! Token usage tracking across turns and models.

use std::collections::HashMap;

use crate::TokenUsage;

/// Tracks cumulative token usage per model.
#[derive(Debug, Clone, Default)]
pub struct TokenTracker {
    total: TokenUsage,
    by_model: HashMap<String, TokenUsage>,
    call_count: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token usage from one model call.
    pub fn record(&mut self, model: &str, usage: &TokenUsage) {
        self.total.add(usage);
        self.call_count += 1;
        self.by_model.entry(model.to_string()).or_default().add(usage);
    }

    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    pub fn for_model(&self, model: &str) -> Option<&TokenUsage> {
        self.by_model.get(model)
    }

    pub fn total_tokens(&self) -> u64 {
        self.total.total_tokens()
    }

    /// Number of model calls recorded.
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(input: u64, output: u64) -> TokenUsage {
        TokenUsage {
            input_tokens: input,
            output_tokens: output,
        }
    }

    #[test]
    fn records_per_model_and_total() {
        let mut tracker = TokenTracker::new();
        tracker.record("claude-sonnet", &usage(100, 20));
        tracker.record("claude-sonnet", &usage(50, 10));
        tracker.record("claude-haiku", &usage(5, 5));

        assert_eq!(tracker.call_count(), 3);
        assert_eq!(tracker.total_tokens(), 190);
        assert_eq!(tracker.for_model("claude-sonnet"), Some(&usage(150, 30)));
        assert!(tracker.for_model("gpt").is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut tracker = TokenTracker::new();
        tracker.record("m", &usage(1, 1));
        tracker.reset();
        assert_eq!(tracker.call_count(), 0);
        assert_eq!(tracker.total_tokens(), 0);
        assert!(tracker.for_model("m").is_none());
    }
}
