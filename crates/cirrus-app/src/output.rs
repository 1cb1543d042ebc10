//! Terminal output for the conversation loop.

use std::io::Write;

use cirrus_ai::OutputSink;

/// Streams model text to stdout and progress lines to stderr.
pub struct TerminalSink;

impl OutputSink for TerminalSink {
    fn text(&self, fragment: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout
            .write_all(fragment.as_bytes())
            .and_then(|()| stdout.flush())
        {
            tracing::debug!("stdout write failed: {e}");
        }
    }

    fn progress(&self, line: &str) {
        eprintln!("\n{line}");
    }
}
