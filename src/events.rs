// Status event payload and sinks
//
// Operations never print. They emit leveled StatusEvents into an injected sink,
// which a CLI, a GUI worker channel or a test can consume the same way.

use std::cell::RefCell;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusLevel {
    /// Console prefix, e.g. `[SUCCESS]`.
    pub fn prefix(&self) -> &'static str {
        match self {
            StatusLevel::Info => "[INFO]",
            StatusLevel::Success => "[SUCCESS]",
            StatusLevel::Warning => "[WARNING]",
            StatusLevel::Error => "[ERROR]",
        }
    }

    fn log_level(&self) -> log::Level {
        match self {
            StatusLevel::Info | StatusLevel::Success => log::Level::Info,
            StatusLevel::Warning => log::Level::Warn,
            StatusLevel::Error => log::Level::Error,
        }
    }
}

/// One status message emitted by an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub level: StatusLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(level: StatusLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.level.prefix(), self.message)
    }
}

/// Consumer of status events.
pub trait EventSink {
    fn emit(&self, event: StatusEvent);

    fn info(&self, message: &str) {
        self.emit(StatusEvent::new(StatusLevel::Info, message));
    }

    fn success(&self, message: &str) {
        self.emit(StatusEvent::new(StatusLevel::Success, message));
    }

    fn warning(&self, message: &str) {
        self.emit(StatusEvent::new(StatusLevel::Warning, message));
    }

    fn error(&self, message: &str) {
        self.emit(StatusEvent::new(StatusLevel::Error, message));
    }
}

impl<F> EventSink for F
where
    F: Fn(StatusEvent),
{
    fn emit(&self, event: StatusEvent) {
        self(event)
    }
}

/// Drops every event. Useful when only the returned report matters.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: StatusEvent) {}
}

/// Records events for the operation report while forwarding them downstream.
/// Every event is mirrored into the `log` facade exactly once, here.
pub struct Recorder<'a> {
    inner: &'a dyn EventSink,
    events: RefCell<Vec<StatusEvent>>,
}

impl<'a> Recorder<'a> {
    pub fn new(inner: &'a dyn EventSink) -> Self {
        Self {
            inner,
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn into_events(self) -> Vec<StatusEvent> {
        self.events.into_inner()
    }
}

impl EventSink for Recorder<'_> {
    fn emit(&self, event: StatusEvent) {
        log::log!(event.level.log_level(), "{}", event.message);
        self.events.borrow_mut().push(event.clone());
        self.inner.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_keeps_order_and_forwards() {
        let forwarded = RefCell::new(Vec::new());
        let downstream = |e: StatusEvent| forwarded.borrow_mut().push(e.level);

        let recorder = Recorder::new(&downstream);
        recorder.info("one");
        recorder.warning("two");
        recorder.success("three");
        recorder.error("four");

        let events = recorder.into_events();
        let levels: Vec<_> = events.iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![StatusLevel::Info, StatusLevel::Warning, StatusLevel::Success, StatusLevel::Error]
        );
        assert_eq!(*forwarded.borrow(), levels);
        assert!(events[3].is_error());
    }

    #[test]
    fn test_display_uses_prefix() {
        let event = StatusEvent::new(StatusLevel::Success, "done");
        assert_eq!(event.to_string(), "[SUCCESS] done");
    }

    #[test]
    fn test_event_serializes_lowercase_level() {
        let event = StatusEvent::new(StatusLevel::Warning, "careful");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["message"], "careful");
    }
}
