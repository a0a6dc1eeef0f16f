//! HTML rendering of the run report
//!
//! The document is always rendered in full from the in-memory model, so a
//! partially updated report can never contain a stale summary block.

use chrono::{DateTime, Utc};

use crate::event::TestRunEvent;
use crate::record::{RunSummary, TestRecord, TestStatus};

/// Everything needed to render one version of the report.
pub struct ReportView<'a> {
    pub title: &'a str,
    pub system_info: &'a [(String, String)],
    pub summary: &'a RunSummary,
    pub records: &'a [TestRecord],
    pub last_event_at: DateTime<Utc>,
}

impl ReportView<'_> {
    pub fn duration_seconds(&self) -> f64 {
        let elapsed = self.last_event_at - self.summary.run_start_time;
        elapsed.num_milliseconds().max(0) as f64 / 1000.0
    }
}

const STYLE: &str = r#"
      body { font-family: Arial, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }
      .container { max-width: 1200px; margin: 0 auto; background-color: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
      .header { background-color: #2c3e50; color: white; padding: 20px; border-radius: 6px; margin-bottom: 20px; }
      .system-info td { padding: 2px 12px 2px 0; color: #ecf0f1; }
      .summary { display: flex; justify-content: space-between; margin: 20px 0; padding: 15px; background-color: #f8f9fa; border-radius: 6px; }
      .summary-item { text-align: center; padding: 10px 20px; border-radius: 4px; color: white; font-weight: bold; }
      .total { background-color: #3498db; }
      .passed { background-color: #2ecc71; }
      .failed { background-color: #e74c3c; }
      .pending { background-color: #95a5a6; }
      .duration { background-color: #9b59b6; }
      .test { margin: 15px 0; }
      .log-entry { padding: 10px; margin: 5px 0; border-radius: 4px; border-left: 4px solid #3498db; background-color: #f8f9fa; }
      .timestamp { color: #7f8c8d; font-size: 0.9em; margin-right: 10px; }
      .level { font-weight: bold; padding: 2px 6px; border-radius: 3px; margin-right: 10px; color: white; background-color: #3498db; }
      .entry-PASS, .entry-END { border-left-color: #2ecc71; }
      .entry-FAIL, .entry-ERROR, .entry-FAILURE { border-left-color: #e74c3c; background-color: #fdf7f7; }
      .entry-WARNING { border-left-color: #f39c12; }
      .entry-REQUEST { border-left-color: #9b59b6; }
      .entry-RESPONSE { border-left-color: #f1c40f; }
      .level-PASS { background-color: #2ecc71; }
      .level-FAIL, .level-ERROR, .level-FAILURE { background-color: #e74c3c; }
      .level-WARNING { background-color: #f39c12; }
      pre { white-space: pre-wrap; word-break: break-all; margin: 6px 0 0 0; }
      img.screenshot { max-width: 100%; border: 1px solid #ddd; margin-top: 8px; }
      .test-results { margin: 20px 0; padding: 15px; background-color: #f8f9fa; border-radius: 6px; }
      .test-result-item { padding: 10px; margin: 5px 0; border-radius: 4px; background-color: white; border-left: 4px solid #95a5a6; }
      .test-result-PASS { border-left-color: #2ecc71; }
      .test-result-FAIL { border-left-color: #e74c3c; }
"#;

/// Render the complete HTML document.
pub fn render(view: &ReportView<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>{style}</style>
  </head>
  <body>
    <div class="container">
      <div class="header">
        <h1>{title}</h1>
        <p>Run started: {started}</p>
"#,
        title = escape(view.title),
        style = STYLE,
        started = view.summary.run_start_time.format("%Y-%m-%d %H:%M:%S UTC"),
    ));

    if !view.system_info.is_empty() {
        html.push_str("        <table class=\"system-info\">\n");
        for (key, value) in view.system_info {
            html.push_str(&format!(
                "          <tr><td>{}</td><td>{}</td></tr>\n",
                escape(key),
                escape(value)
            ));
        }
        html.push_str("        </table>\n");
    }
    html.push_str("      </div>\n");

    html.push_str("      <div class=\"content\">\n");
    for (index, record) in view.records.iter().enumerate() {
        render_record(&mut html, index, record);
    }
    html.push_str("      </div>\n");

    render_summary(&mut html, view);

    html.push_str("    </div>\n  </body>\n</html>\n");
    html
}

/// Records are keyed by position: test names may repeat within a run.
fn render_record(html: &mut String, index: usize, record: &TestRecord) {
    html.push_str(&format!(
        "        <div class=\"test\" id=\"test-{}\" data-name=\"{}\">\n",
        index,
        escape(&record.name)
    ));
    for entry in &record.entries {
        let tag = entry.event.tag();
        html.push_str(&format!(
            "          <div class=\"log-entry entry-{tag}\"><span class=\"timestamp\">{ts}</span><span class=\"level level-{tag}\">{tag}</span>",
            tag = tag,
            ts = entry.at.format("%Y-%m-%d %H:%M:%S"),
        ));
        render_entry_body(html, &entry.event);
        html.push_str("</div>\n");
    }
    html.push_str("        </div>\n");
}

fn render_entry_body(html: &mut String, event: &TestRunEvent) {
    match event {
        TestRunEvent::RequestLogged { method, url, body } => {
            html.push_str(&format!(
                "<span class=\"message\">Request: {} {}</span>",
                escape(method),
                escape(url)
            ));
            if let Some(body) = body.as_deref().filter(|b| !b.is_empty()) {
                html.push_str(&format!("<pre>{}</pre>", escape(body)));
            }
        }
        TestRunEvent::ResponseLogged { status_code, body } => {
            html.push_str(&format!(
                "<span class=\"message\">Response Status: {}</span><pre>{}</pre>",
                status_code,
                escape(body)
            ));
        }
        TestRunEvent::FailureAttached {
            failure,
            screenshot_path,
        } => {
            html.push_str(&format!(
                "<span class=\"message\">Exception Type: {}</span><pre>Error Message: {}</pre>",
                escape(&failure.exception_type),
                escape(&failure.message)
            ));
            if let Some(inner) = &failure.inner_message {
                html.push_str(&format!("<pre>Inner Exception: {}</pre>", escape(inner)));
            }
            if !failure.stack_trace.is_empty() {
                html.push_str(&format!(
                    "<details><summary>Stack Trace</summary><pre>{}</pre></details>",
                    escape(&failure.stack_trace)
                ));
            }
            if let Some(path) = screenshot_path {
                html.push_str(&format!(
                    "<img class=\"screenshot\" alt=\"Failure Screenshot\" src=\"{}\">",
                    escape(path)
                ));
            }
        }
        other => {
            let line = other.render_line();
            let message = line
                .split_once("] ")
                .map(|(_, rest)| rest)
                .unwrap_or(line.as_str());
            html.push_str(&format!("<span class=\"message\">{}</span>", escape(message)));
        }
    }
}

fn render_summary(html: &mut String, view: &ReportView<'_>) {
    let summary = view.summary;
    html.push_str(&format!(
        r#"      <div class="summary">
        <div class="summary-item total">Total Tests: {total}</div>
        <div class="summary-item passed">Passed: {passed}</div>
        <div class="summary-item failed">Failed: {failed}</div>
        <div class="summary-item pending">Pending: {pending}</div>
        <div class="summary-item duration">Duration: {duration:.1}s</div>
      </div>
      <div class="test-results">
        <h2>Test Results</h2>
"#,
        total = summary.total_started,
        passed = summary.total_passed,
        failed = summary.total_failed,
        pending = summary.pending(),
        duration = view.duration_seconds(),
    ));

    for record in view.records {
        let elapsed = match record.end_time {
            Some(end) => format!(
                "{:.1}s",
                (end - record.start_time).num_milliseconds().max(0) as f64 / 1000.0
            ),
            None => "running".to_string(),
        };
        let label = match record.status {
            TestStatus::Pass => "PASSED",
            TestStatus::Fail => "FAILED",
            TestStatus::Pending => "PENDING",
        };
        html.push_str(&format!(
            "        <div class=\"test-result-item test-result-{}\">{} - {} ({})</div>\n",
            record.status.as_str(),
            escape(&record.name),
            label,
            elapsed
        ));
    }
    html.push_str("      </div>\n");
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogLevel;

    fn sample() -> (RunSummary, Vec<TestRecord>) {
        let start = Utc::now();
        let mut summary = RunSummary::new(start);
        summary.total_started = 2;
        summary.total_passed = 1;

        let mut passed = TestRecord::new("get_post", start);
        passed.push(
            start,
            TestRunEvent::LogLine {
                level: LogLevel::Info,
                message: "<b>hi</b>".into(),
                timestamp: start,
            },
        );
        passed.finish(true, start);

        let running = TestRecord::new("slow_one", start);
        (summary, vec![passed, running])
    }

    #[test]
    fn test_render_contains_summary_counts() {
        let (summary, records) = sample();
        let html = render(&ReportView {
            title: "API Test Report",
            system_info: &[("Environment".into(), "QA".into())],
            summary: &summary,
            records: &records,
            last_event_at: summary.run_start_time,
        });
        assert!(html.contains("Total Tests: 2"));
        assert!(html.contains("Passed: 1"));
        assert!(html.contains("Failed: 0"));
        assert!(html.contains("Pending: 1"));
        assert!(html.contains("get_post - PASSED"));
        assert!(html.contains("slow_one - PENDING (running)"));
        assert!(html.contains("<td>Environment</td><td>QA</td>"));
    }

    #[test]
    fn test_render_escapes_messages() {
        let (summary, records) = sample();
        let html = render(&ReportView {
            title: "t",
            system_info: &[],
            summary: &summary,
            records: &records,
            last_event_at: summary.run_start_time,
        });
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(!html.contains("<b>hi</b>"));
    }

    #[test]
    fn test_same_named_records_get_distinct_ids() {
        let start = Utc::now();
        let mut summary = RunSummary::new(start);
        summary.total_started = 2;
        let records = vec![TestRecord::new("twin", start), TestRecord::new("twin", start)];
        let html = render(&ReportView {
            title: "t",
            system_info: &[],
            summary: &summary,
            records: &records,
            last_event_at: start,
        });
        assert!(html.contains("id=\"test-0\" data-name=\"twin\""));
        assert!(html.contains("id=\"test-1\" data-name=\"twin\""));
        assert!(!html.contains("id=\"twin\""));
    }
}
