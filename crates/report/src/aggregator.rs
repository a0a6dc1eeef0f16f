//! Run-wide report aggregator
//!
//! One [`Aggregator`] exists per test run. It is cheap to clone and every
//! clone shares the same state, so each running test gets its own copy
//! (usually wrapped in a [`TestReporter`]).
//!
//! All state lives behind a single mutex. Every mutation happens under it,
//! and so does rendering: the HTML and JSON documents are built from one
//! consistent snapshot before the lock is released. The file writes happen
//! after that. Inside a tokio runtime the live HTML rewrite that follows a
//! finished test runs on the blocking pool, so a slow disk never stalls the
//! other tests' tasks. Each snapshot carries a revision and an older snapshot
//! never replaces a newer file. Write failures are logged and dropped:
//! reporting never fails a test run.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{ReportError, ReportResult};
use crate::event::{FailureInfo, LogLevel, TestRunEvent};
use crate::html::{self, ReportView};
use crate::record::{RecordDocument, RunSummary, TestRecord};
use crate::writer::{self, ReportPaths};

/// Configuration for a report run
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Directory receiving the HTML/JSON pair and copied screenshots
    pub output_dir: PathBuf,

    /// Run identifier used in file names (defaults to a timestamp)
    pub run_id: Option<String>,

    /// Title shown in the HTML header
    pub title: String,

    /// Key/value pairs shown under the title
    pub system_info: Vec<(String, String)>,

    /// Rewrite the HTML report after every finished test
    pub live_html: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test-results/reports"),
            run_id: None,
            title: "API Test Execution Report".to_string(),
            system_info: Vec::new(),
            live_html: true,
        }
    }
}

/// Opaque reference to one test's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestHandle(usize);

struct ReportState {
    records: Vec<TestRecord>,
    summary: RunSummary,
    system_info: Vec<(String, String)>,
    last_event_at: DateTime<Utc>,
    html_revision: u64,
}

/// Rendered HTML tagged with the state revision it was taken from.
struct HtmlSnapshot {
    revision: u64,
    document: String,
}

impl ReportState {
    fn record_mut(&mut self, handle: TestHandle) -> ReportResult<&mut TestRecord> {
        self.records
            .get_mut(handle.0)
            .ok_or(ReportError::UnknownHandle(handle.0))
    }

    fn documents(&self) -> Vec<RecordDocument> {
        self.records.iter().map(TestRecord::to_document).collect()
    }
}

struct Inner {
    paths: ReportPaths,
    title: String,
    live_html: bool,
    state: Mutex<ReportState>,
    /// Revision of the snapshot currently on disk.
    html_written: Mutex<u64>,
}

impl Inner {
    fn persist_html(&self, snapshot: HtmlSnapshot) -> ReportResult<()> {
        let mut written = self.html_written.lock();
        if *written >= snapshot.revision {
            debug!(
                "Skipping HTML revision {} (revision {} already written)",
                snapshot.revision, *written
            );
            return Ok(());
        }
        writer::write_atomic(&self.paths.html, snapshot.document.as_bytes())?;
        *written = snapshot.revision;
        Ok(())
    }
}

/// Collects test events and renders the run report.
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<Inner>,
}

impl Aggregator {
    /// Start a new report run and write the initial (empty) HTML document.
    pub fn open(config: ReportConfig) -> Self {
        let started = Utc::now();
        let run_id = config
            .run_id
            .unwrap_or_else(|| started.format("%Y%m%d_%H%M%S").to_string());

        if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
            error!(
                "Failed to create report directory {}: {}",
                config.output_dir.display(),
                e
            );
        }
        let paths = ReportPaths::allocate(&config.output_dir, &run_id);

        let aggregator = Self {
            inner: Arc::new(Inner {
                paths,
                title: config.title,
                live_html: config.live_html,
                state: Mutex::new(ReportState {
                    records: Vec::new(),
                    summary: RunSummary::new(started),
                    system_info: config.system_info,
                    last_event_at: started,
                    html_revision: 0,
                }),
                html_written: Mutex::new(0),
            }),
        };

        let snapshot = aggregator.snapshot_html(&mut aggregator.inner.state.lock());
        if let Err(e) = aggregator.inner.persist_html(snapshot) {
            error!("Error initializing report: {}", e);
        }

        info!("Report run {} -> {}", run_id, aggregator.inner.paths.html.display());
        aggregator
    }

    /// Output locations for this run.
    pub fn paths(&self) -> &ReportPaths {
        &self.inner.paths
    }

    pub fn add_system_info(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .state
            .lock()
            .system_info
            .push((key.into(), value.into()));
    }

    /// Register a new test. Identically named tests get independent records.
    pub fn create_test(&self, name: &str) -> TestHandle {
        let now = Utc::now();
        let mut state = self.inner.state.lock();

        if state.records.iter().any(|r| r.name == name) {
            warn!("Test name '{}' already used in this run; keeping both records", name);
        }

        let mut record = TestRecord::new(name, now);
        record.push(
            now,
            TestRunEvent::TestStarted {
                name: name.to_string(),
                timestamp: now,
            },
        );
        state.records.push(record);
        state.summary.total_started += 1;
        state.last_event_at = now;

        debug!("Test started: {}", name);
        TestHandle(state.records.len() - 1)
    }

    /// Register a new test and wrap the handle in a [`TestReporter`].
    pub fn start_test(&self, name: &str) -> TestReporter {
        let handle = self.create_test(name);
        TestReporter {
            aggregator: self.clone(),
            handle,
            name: name.to_string(),
        }
    }

    pub fn log(&self, handle: TestHandle, level: LogLevel, message: &str) {
        let now = Utc::now();
        self.push(
            "log",
            handle,
            TestRunEvent::LogLine {
                level,
                message: message.to_string(),
                timestamp: now,
            },
        );
    }

    pub fn record_request(&self, handle: TestHandle, method: &str, url: &str, body: Option<&str>) {
        self.push(
            "record_request",
            handle,
            TestRunEvent::RequestLogged {
                method: method.to_string(),
                url: url.to_string(),
                body: body.map(str::to_string),
            },
        );
    }

    pub fn record_response(&self, handle: TestHandle, status_code: u16, body: &str) {
        self.push(
            "record_response",
            handle,
            TestRunEvent::ResponseLogged {
                status_code,
                body: body.to_string(),
            },
        );
    }

    /// Append raw request/response detail blocks to a test.
    pub fn attach_request_response(&self, handle: TestHandle, request: &str, response: &str) {
        self.log(handle, LogLevel::Info, &format!("Request Details: {}", request));
        self.log(handle, LogLevel::Info, &format!("Response Details: {}", response));
    }

    /// Mark a test as passed.
    pub fn pass(&self, handle: TestHandle, message: &str) {
        self.finish(handle, true, message);
    }

    /// Mark a test as failed.
    pub fn fail(&self, handle: TestHandle, message: &str) {
        self.finish(handle, false, message);
    }

    /// Attach an error summary and, if available, a screenshot.
    ///
    /// The screenshot is copied next to the report. A missing file or a
    /// failed copy only adds a warning to the test's log.
    pub fn attach_failure(&self, handle: TestHandle, failure: &FailureInfo, screenshot: Option<&Path>) {
        let (screenshot_path, note) = match screenshot {
            Some(path) => match self.copy_screenshot(handle, path) {
                Ok((reference, digest)) => {
                    let note = format!("Screenshot attached: {} (sha256 {})", reference, digest);
                    (Some(reference), Some((LogLevel::Info, note)))
                }
                Err(e) => {
                    warn!("Failed to attach screenshot {}: {}", path.display(), e);
                    let note = format!("Failed to attach screenshot: {}", e);
                    (None, Some((LogLevel::Warning, note)))
                }
            },
            None => (None, None),
        };

        let now = Utc::now();
        self.guard("attach_failure", |state| {
            let record = state.record_mut(handle)?;
            record.push(
                now,
                TestRunEvent::FailureAttached {
                    failure: failure.clone(),
                    screenshot_path: screenshot_path.clone(),
                },
            );
            if let Some((level, message)) = &note {
                record.push(
                    now,
                    TestRunEvent::LogLine {
                        level: *level,
                        message: message.clone(),
                        timestamp: now,
                    },
                );
            }
            state.last_event_at = now;
            Ok(())
        });
    }

    /// Current counters.
    pub fn summary(&self) -> RunSummary {
        self.inner.state.lock().summary
    }

    /// URL of the most recent request logged for a test.
    pub fn last_request_url(&self, handle: TestHandle) -> Option<String> {
        let state = self.inner.state.lock();
        state.records.get(handle.0)?.entries.iter().rev().find_map(|entry| {
            match &entry.event {
                TestRunEvent::RequestLogged { url, .. } => Some(url.clone()),
                _ => None,
            }
        })
    }

    /// Snapshot of all records in creation order.
    pub fn records(&self) -> Vec<TestRecord> {
        self.inner.state.lock().records.clone()
    }

    /// Write both documents; errors are logged and dropped.
    ///
    /// Writes happen on the calling thread. Call it from a blocking context
    /// (or `spawn_blocking`) when other tests are still running.
    pub fn flush(&self) {
        // try_flush already logged each failed write
        let _ = self.try_flush();
    }

    /// Write both documents, surfacing the first write error.
    ///
    /// Both writes are always attempted, so a failed JSON write still leaves
    /// an up to date HTML report (and the other way round).
    pub fn try_flush(&self) -> ReportResult<()> {
        let (json, snapshot, summary) = {
            let mut state = self.inner.state.lock();
            let json = writer::summary_json(&state.documents());
            let snapshot = self.snapshot_html(&mut state);
            (json, snapshot, state.summary)
        };

        let json_written =
            json.and_then(|json| writer::write_atomic(&self.inner.paths.json, &json));
        if let Err(e) = &json_written {
            error!(
                "Error writing JSON summary {}: {}",
                self.inner.paths.json.display(),
                e
            );
        }
        let html_written = self.inner.persist_html(snapshot);
        if let Err(e) = &html_written {
            error!(
                "Error writing HTML report {}: {}",
                self.inner.paths.html.display(),
                e
            );
        }
        json_written.and(html_written)?;

        debug!(
            "Report flushed: {} test(s), {} passed, {} failed",
            summary.total_started, summary.total_passed, summary.total_failed
        );
        Ok(())
    }

    /// Final flush. Returns the output paths.
    pub fn close(self) -> ReportPaths {
        self.flush();
        let summary = self.summary();
        info!(
            "Report closed: {} started, {} passed, {} failed, {} pending",
            summary.total_started,
            summary.total_passed,
            summary.total_failed,
            summary.pending()
        );
        self.inner.paths.clone()
    }

    fn finish(&self, handle: TestHandle, passed: bool, message: &str) {
        let now = Utc::now();
        let level = if passed { LogLevel::Pass } else { LogLevel::Fail };
        let live_html = self.inner.live_html;

        let snapshot = self.guard(if passed { "pass" } else { "fail" }, |state| {
            let record = state.record_mut(handle)?;
            record.push(
                now,
                TestRunEvent::LogLine {
                    level,
                    message: message.to_string(),
                    timestamp: now,
                },
            );

            if !record.finish(passed, now) {
                warn!(
                    "Test '{}' already finished as {}; ignoring {}",
                    record.name, record.status, level
                );
                state.last_event_at = now;
                return Ok(None);
            }

            let name = record.name.clone();
            record.push(
                now,
                TestRunEvent::TestEnded {
                    name,
                    passed,
                    timestamp: now,
                },
            );
            if passed {
                state.summary.total_passed += 1;
            } else {
                state.summary.total_failed += 1;
            }
            state.last_event_at = now;

            Ok(live_html.then(|| self.snapshot_html(state)))
        });

        if let Some(Some(snapshot)) = snapshot {
            self.publish_html(snapshot);
        }
    }

    fn push(&self, op: &str, handle: TestHandle, event: TestRunEvent) {
        let now = Utc::now();
        self.guard(op, |state| {
            state.record_mut(handle)?.push(now, event);
            state.last_event_at = now;
            Ok(())
        });
    }

    /// The single error boundary: run `f` under the lock and swallow failures.
    fn guard<T, F>(&self, op: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut ReportState) -> ReportResult<T>,
    {
        let mut state = self.inner.state.lock();
        match f(&mut state) {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Report {} failed: {}", op, e);
                None
            }
        }
    }

    /// Render the HTML document from the current state. Caller holds the lock.
    fn snapshot_html(&self, state: &mut ReportState) -> HtmlSnapshot {
        state.html_revision += 1;
        HtmlSnapshot {
            revision: state.html_revision,
            document: html::render(&ReportView {
                title: &self.inner.title,
                system_info: &state.system_info,
                summary: &state.summary,
                records: &state.records,
                last_event_at: state.last_event_at,
            }),
        }
    }

    /// Write a live snapshot: on the blocking pool inside a tokio runtime,
    /// inline otherwise.
    fn publish_html(&self, snapshot: HtmlSnapshot) {
        let write = |inner: &Inner, snapshot: HtmlSnapshot| {
            if let Err(e) = inner.persist_html(snapshot) {
                error!("Error updating live report: {}", e);
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let inner = Arc::clone(&self.inner);
                runtime.spawn_blocking(move || write(&inner, snapshot));
            }
            Err(_) => write(&self.inner, snapshot),
        }
    }

    /// Copy a screenshot into the run's screenshot directory and return the
    /// path relative to the HTML report plus its digest.
    ///
    /// An existing file of the same name is never replaced; the copy gets a
    /// `_N` suffix instead.
    fn copy_screenshot(&self, handle: TestHandle, source: &Path) -> ReportResult<(String, String)> {
        if !source.is_file() {
            return Err(ReportError::ScreenshotMissing(source.to_path_buf()));
        }

        let dir = &self.inner.paths.screenshots;
        std::fs::create_dir_all(dir)?;
        let requested = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "screenshot.png".to_string());
        let (file_name, mut target_file) = writer::create_unique(dir, &requested)?;
        let target = dir.join(&file_name);
        let mut source_file = File::open(source)?;
        io::copy(&mut source_file, &mut target_file)?;
        drop(target_file);

        let digest = writer::hash_file(&target)?;
        debug!(
            "Screenshot attached to test #{}: {} (sha256 {})",
            handle.0,
            target.display(),
            digest
        );

        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok((format!("{}/{}", dir_name, file_name), digest))
    }
}

/// A test's view of the aggregator: the handle plus convenience logging.
#[derive(Clone)]
pub struct TestReporter {
    aggregator: Aggregator,
    handle: TestHandle,
    name: String,
}

impl TestReporter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> TestHandle {
        self.handle
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn info(&self, message: &str) {
        self.aggregator.log(self.handle, LogLevel::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.aggregator.log(self.handle, LogLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.aggregator.log(self.handle, LogLevel::Error, message);
    }

    pub fn request(&self, method: &str, url: &str, body: Option<&str>) {
        self.aggregator.record_request(self.handle, method, url, body);
    }

    pub fn response(&self, status_code: u16, body: &str) {
        self.aggregator.record_response(self.handle, status_code, body);
    }

    pub fn pass(&self, message: &str) {
        self.aggregator.pass(self.handle, message);
    }

    pub fn fail(&self, message: &str) {
        self.aggregator.fail(self.handle, message);
    }

    pub fn attach_failure(&self, failure: &FailureInfo, screenshot: Option<&Path>) {
        self.aggregator.attach_failure(self.handle, failure, screenshot);
    }

    pub fn attach_request_response(&self, request: &str, response: &str) {
        self.aggregator
            .attach_request_response(self.handle, request, response);
    }

    pub fn last_request_url(&self) -> Option<String> {
        self.aggregator.last_request_url(self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TestStatus;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> Aggregator {
        Aggregator::open(ReportConfig {
            output_dir: dir.path().to_path_buf(),
            run_id: Some("unit".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_open_writes_initial_html() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let html = std::fs::read_to_string(&agg.paths().html).unwrap();
        assert!(html.contains("Total Tests: 0"));
    }

    #[test]
    fn test_second_terminal_call_is_not_counted() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let handle = agg.create_test("twice");
        agg.pass(handle, "first");
        agg.fail(handle, "second");

        let summary = agg.summary();
        assert_eq!(summary.total_passed, 1);
        assert_eq!(summary.total_failed, 0);

        let record = &agg.records()[0];
        assert_eq!(record.status, TestStatus::Pass);
        let lines = record.log_lines();
        assert!(lines.contains(&"[FAIL] second".to_string()));
    }

    #[test]
    fn test_fail_level_log_does_not_finish() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let handle = agg.create_test("still_running");
        agg.log(handle, LogLevel::Fail, "looks bad");
        agg.log(handle, LogLevel::Error, "worse");
        assert_eq!(agg.records()[0].status, TestStatus::Pending);
        assert_eq!(agg.summary().finished(), 0);
    }

    #[test]
    fn test_live_html_tracks_finished_tests() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let a = agg.create_test("a");
        let _b = agg.create_test("b");
        agg.fail(a, "boom");

        let html = std::fs::read_to_string(&agg.paths().html).unwrap();
        assert!(html.contains("Total Tests: 2"));
        assert!(html.contains("Failed: 1"));
        assert!(html.contains("a - FAILED"));
    }

    #[test]
    fn test_missing_screenshot_becomes_warning() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let handle = agg.create_test("shot");
        let failure = FailureInfo::from_message("AssertionError", "expected 200");
        agg.attach_failure(handle, &failure, Some(Path::new("/nonexistent/shot.png")));

        let lines = agg.records()[0].log_lines();
        assert!(lines.iter().any(|l| l.starts_with("[FAILURE] Exception Type: AssertionError")));
        assert!(lines.iter().any(|l| l.starts_with("[WARNING] Failed to attach screenshot")));
    }

    #[test]
    fn test_screenshot_is_copied_next_to_report() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let shot = dir.path().join("capture.png");
        std::fs::write(&shot, b"png").unwrap();

        let handle = agg.create_test("shot");
        let failure = FailureInfo::from_message("TransportError", "refused");
        agg.attach_failure(handle, &failure, Some(&shot));

        assert!(agg.paths().screenshots.join("capture.png").is_file());
        let lines = agg.records()[0].log_lines();
        assert!(lines
            .iter()
            .any(|l| l.ends_with("Screenshot: test-report_unit_screenshots/capture.png")));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("[INFO] Screenshot attached: test-report_unit_screenshots/capture.png (sha256 ")));
    }

    #[test]
    fn test_same_named_screenshots_keep_their_own_image() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let first_src = dir.path().join("first");
        let second_src = dir.path().join("second");
        std::fs::create_dir_all(&first_src).unwrap();
        std::fs::create_dir_all(&second_src).unwrap();
        let first_shot = first_src.join("twin_20260101_000000.png");
        let second_shot = second_src.join("twin_20260101_000000.png");
        std::fs::write(&first_shot, b"FIRST").unwrap();
        std::fs::write(&second_shot, b"SECOND").unwrap();

        let a = agg.create_test("twin");
        let b = agg.create_test("twin");
        let failure = FailureInfo::from_message("Assertion", "mismatch");
        agg.attach_failure(a, &failure, Some(&first_shot));
        agg.attach_failure(b, &failure, Some(&second_shot));

        let screenshots = &agg.paths().screenshots;
        assert_eq!(
            std::fs::read(screenshots.join("twin_20260101_000000.png")).unwrap(),
            b"FIRST"
        );
        assert_eq!(
            std::fs::read(screenshots.join("twin_20260101_000000_1.png")).unwrap(),
            b"SECOND"
        );

        let records = agg.records();
        assert!(records[0]
            .log_lines()
            .iter()
            .any(|l| l.ends_with("Screenshot: test-report_unit_screenshots/twin_20260101_000000.png")));
        assert!(records[1]
            .log_lines()
            .iter()
            .any(|l| l.ends_with("Screenshot: test-report_unit_screenshots/twin_20260101_000000_1.png")));
    }

    #[test]
    fn test_flush_writes_html_even_when_json_fails() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let a = agg.create_test("a");
        agg.pass(a, "ok");
        agg.create_test("b");
        std::fs::create_dir_all(&agg.paths().json).unwrap();

        assert!(agg.try_flush().is_err());
        agg.flush();

        let html = std::fs::read_to_string(&agg.paths().html).unwrap();
        assert_eq!(agg.summary().total_started, 2);
        assert!(html.contains("Total Tests: 2"));
        assert!(html.contains("Pending: 1"));
    }

    #[test]
    fn test_older_snapshot_never_replaces_newer_html() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let newer = HtmlSnapshot {
            revision: 10,
            document: "newer".to_string(),
        };
        let older = HtmlSnapshot {
            revision: 9,
            document: "older".to_string(),
        };
        agg.inner.persist_html(newer).unwrap();
        agg.inner.persist_html(older).unwrap();
        assert_eq!(std::fs::read_to_string(&agg.paths().html).unwrap(), "newer");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_live_html_is_written_off_the_runtime_and_close_is_current() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        for i in 0..5 {
            agg.start_test(&format!("t{}", i)).pass("ok");
        }

        let html_path = agg.paths().html.clone();
        let mut live = String::new();
        for _ in 0..100 {
            live = std::fs::read_to_string(&html_path).unwrap_or_default();
            if live.contains("Passed: 5") {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(live.contains("Passed: 5"));

        let paths = tokio::task::spawn_blocking(move || agg.close()).await.unwrap();
        let html = std::fs::read_to_string(&paths.html).unwrap();
        assert!(html.contains("Total Tests: 5"));
        assert!(html.contains("Passed: 5"));
    }

    #[test]
    fn test_system_info_is_rendered_in_header() {
        let dir = TempDir::new().unwrap();
        let agg = Aggregator::open(ReportConfig {
            output_dir: dir.path().to_path_buf(),
            run_id: Some("info".into()),
            system_info: vec![("Environment".into(), "QA".into())],
            ..Default::default()
        });
        agg.add_system_info("Base URL", "https://api.test");
        agg.flush();

        let html = std::fs::read_to_string(&agg.paths().html).unwrap();
        assert!(html.contains("<td>Environment</td><td>QA</td>"));
        assert!(html.contains("<td>Base URL</td><td>https://api.test</td>"));
    }

    #[test]
    fn test_request_response_details_reach_json() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let reporter = agg.start_test("details");
        reporter.attach_request_response("GET /posts/1", "200 {\"id\":1}");
        reporter.pass("ok");

        let paths = agg.close();
        let docs = crate::writer::read_summary(&paths.json).unwrap();
        assert_eq!(docs[0].logs[1], "[INFO] Request Details: GET /posts/1");
        assert_eq!(docs[0].logs[2], "[INFO] Response Details: 200 {\"id\":1}");
    }

    #[test]
    fn test_reporter_scopes_events_to_its_test() {
        let dir = TempDir::new().unwrap();
        let agg = open(&dir);
        let one = agg.start_test("one");
        let two = agg.start_test("two");
        one.info("for one");
        two.request("GET", "http://x/posts/1", None);
        two.response(200, "{}");
        one.pass("done");

        let records = agg.records();
        assert_eq!(records[0].log_lines().len(), 4);
        assert_eq!(records[1].log_lines()[1], "[REQUEST] GET http://x/posts/1");
        assert_eq!(records[1].log_lines()[2], "[RESPONSE] Status: 200 | Body: {}");
        assert_eq!(two.last_request_url().as_deref(), Some("http://x/posts/1"));
        assert_eq!(one.last_request_url(), None);
    }
}
