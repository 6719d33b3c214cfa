//! Per-message log sink
//!
//! One entry per handled message: method, error if any, and the response
//! truncated to a configured length. Injected into the server so tests can
//! inspect what was logged.

use std::sync::Mutex;

pub const RPC_TARGET: &str = "seltabls::rpc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub method: String,
    pub error: Option<String>,
    pub response: Option<String>,
}

impl LogEntry {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            error: None,
            response: None,
        }
    }

    /// Single-line rendering with the response cut to `limit` characters.
    pub fn line(&self, limit: usize) -> String {
        let mut line = format!("method={}", self.method);
        if let Some(error) = &self.error {
            line.push_str(&format!(" error={:?}", error));
        }
        if let Some(response) = &self.response {
            line.push_str(&format!(" response={}", truncate(response, limit)));
        }
        line
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub trait MessageLog: Send + Sync {
    fn record(&self, entry: LogEntry);
}

/// Forwards entries to `tracing` under the `seltabls::rpc` target.
#[derive(Debug, Clone)]
pub struct TracingLog {
    limit: usize,
}

impl TracingLog {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl MessageLog for TracingLog {
    fn record(&self, entry: LogEntry) {
        let line = entry.line(self.limit);
        if entry.error.is_some() {
            tracing::warn!(target: RPC_TARGET, "{}", line);
        } else {
            tracing::info!(target: RPC_TARGET, "{}", line);
        }
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

impl MessageLog for MemoryLog {
    fn record(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_truncates_response() {
        let entry = LogEntry {
            method: "textDocument/hover".into(),
            error: None,
            response: Some("é".repeat(10)),
        };
        assert_eq!(
            entry.line(3),
            "method=textDocument/hover response=ééé..."
        );
        assert_eq!(
            entry.line(10),
            format!("method=textDocument/hover response={}", "é".repeat(10))
        );
    }

    #[test]
    fn test_line_with_error() {
        let mut entry = LogEntry::new("foo/bar");
        entry.error = Some("Unknown method: foo/bar".into());
        assert_eq!(entry.line(5), r#"method=foo/bar error="Unknown method: foo/bar""#);
    }

    #[test]
    fn test_memory_log_records() {
        let log = MemoryLog::new();
        log.record(LogEntry::new("initialized"));
        log.record(LogEntry::new("exit"));
        let methods: Vec<_> = log.entries().into_iter().map(|e| e.method).collect();
        assert_eq!(methods, vec!["initialized", "exit"]);
    }
}
