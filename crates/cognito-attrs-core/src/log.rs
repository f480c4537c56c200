//! The host's log stream.
//!
//! Deployment hosts hand plugins a sink that takes one line per call. The
//! messages written here are what operators see in their deploy output, so
//! they are kept stable; structured diagnostics go through `tracing` instead.

use std::sync::Mutex;

/// Name the plugin announces itself with, in hooks and log lines.
pub const PLUGIN_NAME: &str = "CognitoAddCustomAttributesPlugin";

/// A line-oriented log sink provided by the host.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str);
}

/// Default sink: every line becomes an info event prefixed with the plugin name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, message: &str) {
        tracing::info!(target: "cognito_attrs", "{PLUGIN_NAME}: {message}");
    }
}

/// Sink that keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Whether any logged line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemoryLogSink::new();
        sink.log("Start");
        sink.log("End");
        assert_eq!(sink.lines(), vec!["Start", "End"]);
        assert!(sink.contains("En"));
        assert!(!sink.contains("Missing"));
    }
}
