//! Suite configuration
//!
//! Precedence, lowest first: built-in defaults, `apicheck.toml`, process
//! environment, command-line flags (applied by the harness binary).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE: &str = "apicheck.toml";

/// Suite configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// API under test
    pub api: ApiConfig,

    /// Fixtures and schemas
    pub data: DataConfig,

    /// Report output
    pub report: ReportSettings,

    /// Failure screenshots
    pub screenshot: ScreenshotConfig,

    /// Scheduling and selection
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://jsonplaceholder.typicode.com`
    pub base_url: String,

    /// Bearer token sent on every request
    pub token: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding `<environment>.json` fixtures
    pub fixture_dir: PathBuf,

    /// Fixture environment name
    pub environment: String,

    /// Directory searched for `*.json` schemas
    pub schema_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        let testdata = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
        Self {
            fixture_dir: testdata.join("fixtures"),
            environment: "development".to_string(),
            schema_dir: testdata.join("schemas"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub output_dir: PathBuf,
    pub title: String,

    /// Key/value pairs shown in the report header
    pub system_info: Vec<(String, String)>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test-results/reports"),
            title: "API Test Execution Report".to_string(),
            system_info: vec![
                ("Environment".to_string(), "QA".to_string()),
                ("Browser".to_string(), "Playwright".to_string()),
                ("Framework".to_string(), "apicheck".to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    pub enabled: bool,
    pub dir: PathBuf,

    /// Playwright browser type
    pub browser: String,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("test-results/screenshots"),
            browser: "chromium".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Maximum number of cases in flight
    pub concurrency: usize,

    /// Only run cases carrying one of these tags
    pub tags: Vec<String>,

    /// Only run cases whose name contains this substring
    pub name_filter: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            tags: Vec::new(),
            name_filter: None,
        }
    }
}

impl SuiteConfig {
    /// Load configuration from file; a missing file means defaults.
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `BASE_URL`, `AUTH_TOKEN` and `APICHECK_ENV` from the process
    /// environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(token) = non_empty("AUTH_TOKEN") {
            self.api.token = token;
        }
        if let Some(env) = non_empty("APICHECK_ENV") {
            self.data.environment = env;
        }
    }

    /// Fail when the API cannot be reached with this configuration.
    pub fn validate(&self) -> E2eResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(E2eError::Config(
                "BASE_URL is not set (environment, --base-url or [api].base_url)".to_string(),
            ));
        }
        if self.api.token.trim().is_empty() {
            return Err(E2eError::Config(
                "AUTH_TOKEN is not set (environment, --token or [api].token)".to_string(),
            ));
        }
        if self.run.concurrency == 0 {
            return Err(E2eError::Config("run.concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = SuiteConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.data.environment, "development");
        assert_eq!(config.run.concurrency, 4);
        assert!(config.screenshot.enabled);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
[api]
base_url = "https://jsonplaceholder.typicode.com"

[run]
concurrency = 2
tags = ["posts"]
"#,
        )
        .unwrap();

        let config = SuiteConfig::load(&path).unwrap();
        assert_eq!(config.api.base_url, "https://jsonplaceholder.typicode.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.run.concurrency, 2);
        assert_eq!(config.run.tags, vec!["posts".to_string()]);
        assert_eq!(config.report.title, "API Test Execution Report");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = SuiteConfig::default();
        config.api.base_url = "http://from-file".to_string();

        let vars: HashMap<&str, &str> = [
            ("BASE_URL", "http://from-env"),
            ("AUTH_TOKEN", "t0k3n"),
            ("APICHECK_ENV", " "),
        ]
        .into_iter()
        .collect();
        config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://from-env");
        assert_eq!(config.api.token, "t0k3n");
        assert_eq!(config.data.environment, "development");
    }

    #[test]
    fn test_validate_requires_url_and_token() {
        let mut config = SuiteConfig::default();
        assert!(matches!(config.validate(), Err(E2eError::Config(ref m)) if m.contains("BASE_URL")));

        config.api.base_url = "http://api.test".to_string();
        assert!(matches!(config.validate(), Err(E2eError::Config(ref m)) if m.contains("AUTH_TOKEN")));

        config.api.token = "secret".to_string();
        assert!(config.validate().is_ok());
    }
}
