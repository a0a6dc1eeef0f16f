//! Per-test records and run-wide counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::TestRunEvent;

/// Lifecycle state of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pending,
    Pass,
    Fail,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pending => "PENDING",
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TestStatus::Pending)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event as stored on a record, stamped with its arrival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub event: TestRunEvent,
}

/// Accumulated state for one `create_test` call.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    pub name: String,
    pub status: TestStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub entries: Vec<LogEntry>,
}

impl TestRecord {
    pub fn new(name: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Pending,
            start_time,
            end_time: None,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, at: DateTime<Utc>, event: TestRunEvent) {
        self.entries.push(LogEntry { at, event });
    }

    /// Set the terminal status. Returns `false` if the record was already final.
    pub fn finish(&mut self, passed: bool, at: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = if passed { TestStatus::Pass } else { TestStatus::Fail };
        self.end_time = Some(at);
        true
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.event.render_line()).collect()
    }

    pub fn to_document(&self) -> RecordDocument {
        RecordDocument {
            name: self.name.clone(),
            status: self.status,
            start_time: self.start_time,
            end_time: self.end_time,
            logs: self.log_lines(),
        }
    }
}

/// Serialized shape of a record in the JSON summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDocument {
    pub name: String,
    pub status: TestStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub logs: Vec<String>,
}

/// Run-wide counters. Only ever incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_started: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub run_start_time: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(run_start_time: DateTime<Utc>) -> Self {
        Self {
            total_started: 0,
            total_passed: 0,
            total_failed: 0,
            run_start_time,
        }
    }

    pub fn finished(&self) -> usize {
        self.total_passed + self.total_failed
    }

    pub fn pending(&self) -> usize {
        self.total_started - self.finished()
    }
}
