//! Structured events emitted by running tests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a free-form log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Pass,
    Fail,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Pass => "PASS",
            LogLevel::Fail => "FAIL",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of an error attached to a failing test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureInfo {
    pub exception_type: String,
    pub message: String,
    pub stack_trace: String,
    pub inner_message: Option<String>,
}

impl FailureInfo {
    /// Capture type name, message and source chain from an error.
    ///
    /// The type name is the error's Rust type. Enums that want a finer
    /// label (one per variant) override it with [`FailureInfo::with_type`].
    /// No stack trace is recorded: by the time an error reaches the caller
    /// the interesting frames are gone.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let exception_type = std::any::type_name::<E>()
            .rsplit("::")
            .next()
            .unwrap_or("Error")
            .to_string();

        Self {
            exception_type,
            message: error.to_string(),
            stack_trace: String::new(),
            inner_message: error.source().map(|s| s.to_string()),
        }
    }

    /// Build from a plain message, e.g. a caught panic payload.
    pub fn from_message(exception_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            exception_type: exception_type.into(),
            message: message.into(),
            stack_trace: String::new(),
            inner_message: None,
        }
    }

    pub fn with_type(mut self, exception_type: impl Into<String>) -> Self {
        self.exception_type = exception_type.into();
        self
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = stack_trace.into();
        self
    }
}

/// A single event in a test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TestRunEvent {
    TestStarted {
        name: String,
        timestamp: DateTime<Utc>,
    },
    TestEnded {
        name: String,
        passed: bool,
        timestamp: DateTime<Utc>,
    },
    LogLine {
        level: LogLevel,
        message: String,
        timestamp: DateTime<Utc>,
    },
    RequestLogged {
        method: String,
        url: String,
        body: Option<String>,
    },
    ResponseLogged {
        status_code: u16,
        body: String,
    },
    FailureAttached {
        #[serde(flatten)]
        failure: FailureInfo,
        screenshot_path: Option<String>,
    },
}

impl TestRunEvent {
    /// Tag used in the JSON log lines and as the HTML entry class.
    pub fn tag(&self) -> &'static str {
        match self {
            TestRunEvent::TestStarted { .. } => "START",
            TestRunEvent::TestEnded { .. } => "END",
            TestRunEvent::LogLine { level, .. } => level.as_str(),
            TestRunEvent::RequestLogged { .. } => "REQUEST",
            TestRunEvent::ResponseLogged { .. } => "RESPONSE",
            TestRunEvent::FailureAttached { .. } => "FAILURE",
        }
    }

    /// Flatten the event into one log line, e.g. `[REQUEST] GET https://host/posts/1`.
    pub fn render_line(&self) -> String {
        let text = match self {
            TestRunEvent::TestStarted { name, .. } => format!("=== Test Started: {} ===", name),
            TestRunEvent::TestEnded { name, passed, .. } => format!(
                "=== Test Ended: {} - {} ===",
                name,
                if *passed { "PASSED" } else { "FAILED" }
            ),
            TestRunEvent::LogLine { message, .. } => message.clone(),
            TestRunEvent::RequestLogged { method, url, body } => match body {
                Some(body) if !body.is_empty() => format!("{} {} | Body: {}", method, url, body),
                _ => format!("{} {}", method, url),
            },
            TestRunEvent::ResponseLogged { status_code, body } => {
                format!("Status: {} | Body: {}", status_code, body)
            }
            TestRunEvent::FailureAttached {
                failure,
                screenshot_path,
            } => {
                let mut text = format!(
                    "Exception Type: {} | Error Message: {}",
                    failure.exception_type, failure.message
                );
                if let Some(inner) = &failure.inner_message {
                    text.push_str(&format!(" | Inner Exception: {}", inner));
                }
                if !failure.stack_trace.is_empty() {
                    text.push_str(&format!(" | Stack Trace: {}", failure.stack_trace));
                }
                if let Some(path) = screenshot_path {
                    text.push_str(&format!(" | Screenshot: {}", path));
                }
                text
            }
        };
        format!("[{}] {}", self.tag(), text)
    }
}
