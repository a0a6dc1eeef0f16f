//! Failure screenshots via headless Playwright

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::ScreenshotConfig;
use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Some(Browser::Chromium),
            "firefox" => Some(Browser::Firefox),
            "webkit" | "safari" => Some(Browser::Webkit),
            _ => None,
        }
    }
}

/// Captures a full-page screenshot of a URL. Every failure degrades to
/// `None` plus a warning; a failing test is never made worse by its
/// screenshot.
pub struct ScreenshotCapturer {
    enabled: bool,
    dir: PathBuf,
    browser: Browser,
    available: OnceCell<bool>,
}

impl ScreenshotCapturer {
    pub fn new(config: &ScreenshotConfig) -> Self {
        let browser = Browser::parse(&config.browser).unwrap_or_else(|| {
            warn!("Unknown browser '{}', using chromium", config.browser);
            Browser::Chromium
        });
        Self {
            enabled: config.enabled,
            dir: config.dir.clone(),
            browser,
            available: OnceCell::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::new(),
            browser: Browser::default(),
            available: OnceCell::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Target file for `test_name`, `<test>_<timestamp>.png`.
    pub fn path_for(&self, test_name: &str) -> PathBuf {
        let safe: String = test_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir
            .join(format!("{}_{}.png", safe, Utc::now().format("%Y%m%d_%H%M%S")))
    }

    /// Screenshot `url` on behalf of `test_name`.
    pub async fn capture(&self, test_name: &str, url: &str) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        if !self.playwright_available().await {
            warn!("Playwright is not installed; no screenshot for {}", test_name);
            return None;
        }

        let path = self.path_for(test_name);
        match self.try_capture(url, &path).await {
            Ok(()) => {
                info!("Screenshot captured: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to capture screenshot for {}: {}", test_name, e);
                None
            }
        }
    }

    async fn playwright_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| async {
                Command::new("npx")
                    .args(["playwright", "--version"])
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .await
                    .map(|status| status.success())
                    .unwrap_or(false)
            })
            .await
    }

    async fn try_capture(&self, url: &str, path: &Path) -> E2eResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let target = std::path::absolute(path)?;

        let script = self.build_script(url, &target)?;
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("screenshot.js");
        tokio::fs::write(&script_path, script).await?;

        debug!("Running Playwright script: {}", script_path.display());
        let output = Command::new("node")
            .arg(&script_path)
            .current_dir(temp_dir.path())
            .output()
            .await?;

        if !output.status.success() {
            return Err(E2eError::Screenshot(format!(
                "script failed:\nstdout: {}\nstderr: {}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    /// Node script that loads `url` and writes a full-page PNG to `target`.
    pub fn build_script(&self, url: &str, target: &Path) -> E2eResult<String> {
        let url = serde_json::to_string(url)?;
        let target = serde_json::to_string(&target.to_string_lossy())?;

        Ok(format!(
            r#"
const {{ {browser} }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: true }});
  try {{
    const page = await browser.newPage();
    await page.goto({url});
    await page.screenshot({{ path: {target}, fullPage: true }});
  }} catch (error) {{
    console.error(JSON.stringify({{ success: false, error: error.message }}));
    process.exit(1);
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            browser = self.browser.as_str(),
            url = url,
            target = target,
        ))
    }
}
