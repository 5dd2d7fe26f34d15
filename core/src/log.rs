//! Structured log sink used when a response cannot be decoded.

use std::sync::Mutex;

use tracing::Level;

/// A single structured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub transaction: String,
    pub error: String,
    /// Raw response body, verbatim (lossily decoded as UTF-8).
    pub body: String,
}

/// Receives structured log events.
pub trait EventLog {
    fn log(&self, event: LogEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

macro_rules! emit {
    ($level:expr, $event:ident) => {
        tracing::event!(
            $level,
            r#type = "internal",
            transaction = %$event.transaction,
            err.message = %$event.error,
            json = %$event.body,
            "{}",
            $event.message
        )
    };
}

impl EventLog for TracingLog {
    fn log(&self, event: LogEvent) {
        match event.level {
            Level::ERROR => emit!(Level::ERROR, event),
            Level::WARN => emit!(Level::WARN, event),
            Level::INFO => emit!(Level::INFO, event),
            Level::DEBUG => emit!(Level::DEBUG, event),
            _ => emit!(Level::TRACE, event),
        }
    }
}

/// Keeps events in memory; useful for callers that assert on diagnostics.
#[derive(Debug, Default)]
pub struct RecordingLog {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventLog for RecordingLog {
    fn log(&self, event: LogEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn event(level: Level) -> LogEvent {
        LogEvent {
            level,
            message: "Service call returned non-json response body.".to_string(),
            transaction: "tx-42".to_string(),
            error: "expected value at line 1 column 1".to_string(),
            body: "<html>oops</html>".to_string(),
        }
    }

    #[test]
    #[traced_test]
    fn tracing_log_emits_structured_fields() {
        TracingLog.log(event(Level::ERROR));
        assert!(logs_contain("Service call returned non-json response body."));
        assert!(logs_contain("transaction=tx-42"));
        assert!(logs_contain("internal"));
        assert!(logs_contain("<html>oops</html>"));
        assert!(logs_contain("ERROR"));
    }

    #[test]
    #[traced_test]
    fn tracing_log_respects_level() {
        TracingLog.log(event(Level::WARN));
        assert!(logs_contain("WARN"));
        assert!(!logs_contain("ERROR"));
    }

    #[test]
    fn recording_log_keeps_events_in_order() {
        let log = RecordingLog::new();
        log.log(event(Level::ERROR));
        log.log(event(Level::INFO));
        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[1].level, Level::INFO);
    }
}
