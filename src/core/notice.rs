//! Injected logging interface.
//!
//! [`StatusCache`](crate::core::cache::StatusCache) and
//! [`PathResolver`](crate::core::resolver::PathResolver) report informational notices,
//! warnings and failures through a [`NoticeSink`] handed to them at construction, so each
//! instance can be observed independently.
//!
//! # Public API
//! - [`NoticeSink`]: The sink trait
//! - [`LogSink`]: Forwards to the `log` facade
//! - [`MemorySink`]: Captures notices in memory for assertions

use log::Level;
use std::sync::{Arc, Mutex};

/// Log target used by [`LogSink`]
pub const LOG_TARGET: &str = "vcs_status_cache";

/// Destination for notices emitted by the cache and the resolver
pub trait NoticeSink: Send + Sync {
    fn notice(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.notice(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.notice(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.notice(Level::Error, message);
    }

    fn debug(&self, message: &str) {
        self.notice(Level::Debug, message);
    }
}

/// Sink backed by the process-wide `log` logger
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    pub fn shared() -> Arc<dyn NoticeSink> {
        Arc::new(LogSink)
    }
}

impl NoticeSink for LogSink {
    fn notice(&self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{message}");
    }
}

/// Sink that keeps every notice in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Copy of all notices captured so far
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages captured at exactly `level`
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    /// Check whether any captured message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl NoticeSink for MemorySink {
    fn notice(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_captures_levels() {
        let sink = MemorySink::new();
        sink.info("root changed");
        sink.warn("not under root");
        sink.error("connection lost");

        assert_eq!(sink.entries().len(), 3);
        assert_eq!(sink.messages_at(Level::Warn), vec!["not under root"]);
        assert!(sink.contains("connection"));

        sink.clear();
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_log_sink_does_not_panic_without_logger() {
        LogSink.info("no logger installed");
        LogSink::shared().debug("still fine");
    }
}
