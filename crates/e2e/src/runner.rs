//! Concurrent suite runner
//!
//! Each selected [`TestCase`] runs as its own tokio task, bounded by a
//! semaphore. A case body returns `Ok(())` to pass; an `Err` or a panic fails
//! it, attaches the error (and a screenshot when one can be taken) to the
//! report, and lets the rest of the suite carry on.

use apicheck_report::{Aggregator, FailureInfo, TestReporter};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::SuiteConfig;
use crate::error::E2eResult;
use crate::expect::expect_valid;
use crate::fixtures::{TestDataDocument, TestDataLoader};
use crate::http::{ApiClient, Transport};
use crate::resources::{CommentsApi, PostsApi};
use crate::schema::SchemaStore;
use crate::screenshot::ScreenshotCapturer;

pub type CaseFuture = BoxFuture<'static, E2eResult<()>>;

/// A named, tagged test body.
#[derive(Clone, Copy)]
pub struct TestCase {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub run: fn(TestContext) -> CaseFuture,
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Everything a case body needs, scoped to that case.
#[derive(Clone)]
pub struct TestContext {
    pub reporter: TestReporter,
    pub client: ApiClient,
    pub posts: PostsApi,
    pub comments: CommentsApi,
    pub data: Arc<TestDataDocument>,
    pub schemas: Arc<SchemaStore>,
}

impl TestContext {
    pub fn new(
        reporter: TestReporter,
        client: &ApiClient,
        data: Arc<TestDataDocument>,
        schemas: Arc<SchemaStore>,
    ) -> Self {
        let client = client.for_test(reporter.clone());
        Self {
            posts: PostsApi::new(client.clone()),
            comments: CommentsApi::new(client.clone()),
            reporter,
            client,
            data,
            schemas,
        }
    }

    pub fn info(&self, message: &str) {
        self.reporter.info(message);
    }

    /// Validate `json` against a named schema, logging the verdict.
    pub fn check_schema(&self, schema: &str, json: &str) -> E2eResult<()> {
        let outcome = self.schemas.validate(schema, json)?;
        if outcome.valid {
            self.reporter.info("Schema validation passed");
        } else {
            self.reporter
                .error(&format!("Schema validation failed: {}", outcome.summary()));
        }
        expect_valid(outcome)
    }
}

/// Case selection by tag and name.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    /// Keep cases carrying any of these tags; empty keeps all
    pub tags: Vec<String>,

    /// Keep cases whose name contains this substring
    pub name: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, case: &TestCase) -> bool {
        let tag_ok = self.tags.is_empty()
            || self.tags.iter().any(|tag| case.tags.contains(&tag.as_str()));
        let name_ok = self
            .name
            .as_deref()
            .map_or(true, |needle| case.name.contains(needle));
        tag_ok && name_ok
    }
}

/// Result of running a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub name: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running a suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs cases against one API, reporting into one aggregator.
pub struct SuiteRunner {
    client: ApiClient,
    aggregator: Aggregator,
    data: Arc<TestDataDocument>,
    schemas: Arc<SchemaStore>,
    screenshots: Arc<ScreenshotCapturer>,
    concurrency: usize,
    filter: CaseFilter,
}

impl SuiteRunner {
    pub fn new(
        client: ApiClient,
        aggregator: Aggregator,
        data: TestDataDocument,
        schemas: SchemaStore,
    ) -> Self {
        Self {
            client,
            aggregator,
            data: Arc::new(data),
            schemas: Arc::new(schemas),
            screenshots: Arc::new(ScreenshotCapturer::disabled()),
            concurrency: 4,
            filter: CaseFilter::default(),
        }
    }

    /// Build a runner from configuration: validates it, loads fixtures and
    /// schemas, and binds a client to `transport`.
    pub async fn from_config(
        config: &SuiteConfig,
        transport: Arc<dyn Transport>,
        aggregator: Aggregator,
    ) -> E2eResult<Self> {
        config.validate()?;

        let data = TestDataLoader::new(&config.data.fixture_dir)
            .load(&config.data.environment)
            .await?;
        if data.base_url.trim_end_matches('/') != config.api.base_url.trim_end_matches('/') {
            warn!(
                "Fixture baseUrl {} differs from configured base URL {}; using the latter",
                data.base_url, config.api.base_url
            );
        }

        let schemas = SchemaStore::load(&config.data.schema_dir)?;
        debug!("Loaded schemas: {:?}", schemas.names());

        let client = ApiClient::new(transport, &config.api.base_url, &config.api.token)?;
        let mut runner = Self::new(client, aggregator, data, schemas)
            .with_screenshots(ScreenshotCapturer::new(&config.screenshot))
            .with_concurrency(config.run.concurrency);
        runner.filter = CaseFilter {
            tags: config.run.tags.clone(),
            name: config.run.name_filter.clone(),
        };
        Ok(runner)
    }

    pub fn with_screenshots(mut self, capturer: ScreenshotCapturer) -> Self {
        self.screenshots = Arc::new(capturer);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_filter(mut self, filter: CaseFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Run every case the filter selects. Outcomes are in `cases` order.
    pub async fn run(&self, cases: &[TestCase]) -> SuiteResult {
        let start = Instant::now();
        let selected: Vec<TestCase> = cases
            .iter()
            .filter(|case| self.filter.matches(case))
            .copied()
            .collect();

        info!(
            "Running {} test(s) with concurrency {}...",
            selected.len(),
            self.concurrency
        );

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let handles: Vec<_> = selected
            .iter()
            .map(|case| {
                let case = *case;
                let permits = permits.clone();
                let client = self.client.clone();
                let aggregator = self.aggregator.clone();
                let data = self.data.clone();
                let schemas = self.schemas.clone();
                let screenshots = self.screenshots.clone();
                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await.ok();
                    let reporter = aggregator.start_test(case.name);
                    let ctx = TestContext::new(reporter.clone(), &client, data, schemas);
                    run_case(case, ctx, &reporter, &client, &screenshots).await
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (case, handle) in selected.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("✗ {} - task failed: {}", case.name, e);
                    CaseOutcome {
                        name: case.name.to_string(),
                        passed: false,
                        duration_ms: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let passed = outcomes.iter().filter(|o| o.passed).count();
        let failed = outcomes.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        SuiteResult {
            total: outcomes.len(),
            passed,
            failed,
            duration_ms,
            outcomes,
        }
    }
}

async fn run_case(
    case: TestCase,
    ctx: TestContext,
    reporter: &TestReporter,
    client: &ApiClient,
    screenshots: &ScreenshotCapturer,
) -> CaseOutcome {
    let start = Instant::now();
    reporter.info(&format!("Starting test: {}", case.name));
    debug!("Running test: {}", case.name);

    let failure = match AssertUnwindSafe((case.run)(ctx)).catch_unwind().await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some((e.to_string(), FailureInfo::from_error(&e).with_type(e.kind()))),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            let info = FailureInfo::from_message("panic", message.clone());
            Some((message, info))
        }
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    match failure {
        None => {
            reporter.pass(&format!("Test {} completed successfully", case.name));
            info!("✓ {} ({} ms)", case.name, duration_ms);
            CaseOutcome {
                name: case.name.to_string(),
                passed: true,
                duration_ms,
                error: None,
            }
        }
        Some((message, info)) => {
            let target = reporter
                .last_request_url()
                .unwrap_or_else(|| client.base_url().to_string());
            let screenshot = screenshots.capture(case.name, &target).await;
            // Copying and hashing the screenshot touches the disk.
            let attach = {
                let reporter = reporter.clone();
                tokio::task::spawn_blocking(move || {
                    reporter.attach_failure(&info, screenshot.as_deref())
                })
            };
            if let Err(e) = attach.await {
                warn!("Failed to attach failure details for {}: {}", case.name, e);
            }
            reporter.fail(&format!("Test {} failed: {}", case.name, message));
            error!("✗ {} - {}", case.name, message);
            CaseOutcome {
                name: case.name.to_string(),
                passed: false,
                duration_ms,
                error: Some(message),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "test panicked".to_string()
    }
}
