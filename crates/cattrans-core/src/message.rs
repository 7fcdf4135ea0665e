//! Operator-facing message queue.

use serde::{Deserialize, Serialize};

/// Severity of an operator message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A human-readable message for whoever triggered the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorMessage {
    pub severity: Severity,
    pub text: String,
}

impl OperatorMessage {
    #[must_use]
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, text)
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }
}

/// Destination for operator messages. Enqueueing never fails.
pub trait MessageQueue {
    fn enqueue(&mut self, message: OperatorMessage);
}

/// In-memory message queue.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<OperatorMessage>,
}

impl MessageLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in the order they were enqueued.
    #[must_use]
    pub fn messages(&self) -> &[OperatorMessage] {
        &self.messages
    }

    /// Number of messages with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.messages.iter().filter(|m| m.severity == severity).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageQueue for MessageLog {
    fn enqueue(&mut self, message: OperatorMessage) {
        self.messages.push(message);
    }
}
