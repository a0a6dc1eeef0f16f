//! apicheck report pipeline
//!
//! Collects structured events from concurrently running API tests and turns
//! them into two documents per run:
//!
//! ```text
//! ┌──────────────┐   create_test / log / pass / fail   ┌──────────────────┐
//! │  test task   │ ──────────────────────────────────▶ │    Aggregator    │
//! │  test task   │ ──────────────────────────────────▶ │  (one Mutex)     │
//! └──────────────┘                                      └────────┬─────────┘
//!                                                                │ flush / live rewrite
//!                                          ┌─────────────────────┴──────────────────┐
//!                                          ▼                                        ▼
//!                           test-report_<run>.html                    test-report_<run>.json
//! ```

pub mod aggregator;
pub mod error;
pub mod event;
pub mod html;
pub mod record;
pub mod writer;

pub use aggregator::{Aggregator, ReportConfig, TestHandle, TestReporter};
pub use error::{ReportError, ReportResult};
pub use event::{FailureInfo, LogLevel, TestRunEvent};
pub use record::{RecordDocument, RunSummary, TestRecord, TestStatus};
pub use writer::{read_summary, ReportPaths};
