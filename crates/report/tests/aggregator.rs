//! Aggregator persistence and concurrency tests

use std::sync::Arc;
use std::thread;

use apicheck_report::{read_summary, Aggregator, LogLevel, ReportConfig, TestStatus};
use tempfile::TempDir;

fn open(dir: &TempDir, run_id: &str) -> Aggregator {
    Aggregator::open(ReportConfig {
        output_dir: dir.path().to_path_buf(),
        run_id: Some(run_id.to_string()),
        ..Default::default()
    })
}

#[test]
fn counters_match_terminal_calls_under_concurrency() {
    let dir = TempDir::new().unwrap();
    let agg = open(&dir, "concurrent");

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let agg = agg.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    let handle = agg.create_test(&format!("w{}_t{}", worker, i));
                    agg.log(handle, LogLevel::Info, "working");
                    match i % 3 {
                        0 => agg.pass(handle, "ok"),
                        1 => agg.fail(handle, "nope"),
                        _ => {}
                    }
                    let summary = agg.summary();
                    assert!(summary.total_passed + summary.total_failed <= summary.total_started);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let summary = agg.summary();
    let records = agg.records();
    let terminal = records.iter().filter(|r| r.status.is_terminal()).count();

    assert_eq!(summary.total_started, 200);
    assert_eq!(summary.total_passed + summary.total_failed, terminal);
    assert_eq!(summary.total_passed, 8 * 9);
    assert_eq!(summary.total_failed, 8 * 8);
    assert_eq!(summary.pending(), 8 * 8);
}

#[test]
fn flush_twice_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let agg = open(&dir, "idempotent");
    let handle = agg.create_test("get_post_returns_200");
    agg.record_request(handle, "GET", "https://api.test/posts/1", None);
    agg.record_response(handle, 200, r#"{"id":1}"#);
    agg.pass(handle, "done");

    agg.flush();
    let first_json = std::fs::read(&agg.paths().json).unwrap();
    let first_html = std::fs::read(&agg.paths().html).unwrap();

    agg.flush();
    assert_eq!(first_json, std::fs::read(&agg.paths().json).unwrap());
    assert_eq!(first_html, std::fs::read(&agg.paths().html).unwrap());
}

#[test]
fn json_round_trip_preserves_records() {
    let dir = TempDir::new().unwrap();
    let agg = open(&dir, "roundtrip");

    let a = agg.start_test("create_post_returns_201");
    a.info("Starting test");
    a.request("POST", "https://api.test/posts", Some(r#"{"title":"foo"}"#));
    a.response(201, r#"{"id":101}"#);
    a.pass("created");

    let b = agg.start_test("delete_post_returns_200");
    b.info("Starting test");
    b.fail("status 500");

    let c = agg.start_test("never_finished");
    c.warning("left running");

    let paths = agg.clone().close();
    let docs = read_summary(&paths.json).unwrap();
    let records = agg.records();

    assert_eq!(docs.len(), 3);
    for (doc, record) in docs.iter().zip(records.iter()) {
        assert_eq!(doc.name, record.name);
        assert_eq!(doc.status, record.status);
        assert_eq!(doc.logs, record.log_lines());
    }
    assert_eq!(docs[0].logs[0], "[START] === Test Started: create_post_returns_201 ===");
    assert_eq!(docs[0].logs[2], r#"[REQUEST] POST https://api.test/posts | Body: {"title":"foo"}"#);
    assert_eq!(docs[1].status, TestStatus::Fail);
    assert_eq!(docs[2].status, TestStatus::Pending);
    assert!(docs[2].end_time.is_none());
}

#[test]
fn html_summary_matches_run_summary_after_flush() {
    let dir = TempDir::new().unwrap();
    let agg = open(&dir, "summary");
    for i in 0..4 {
        let t = agg.start_test(&format!("t{}", i));
        if i % 2 == 0 {
            t.pass("ok");
        }
    }
    agg.flush();

    let summary = agg.summary();
    let html = std::fs::read_to_string(&agg.paths().html).unwrap();
    assert!(html.contains(&format!("Total Tests: {}", summary.total_started)));
    assert!(html.contains(&format!("Passed: {}", summary.total_passed)));
    assert!(html.contains(&format!("Failed: {}", summary.total_failed)));
    assert!(html.contains("t1 - PENDING"));
}

#[test]
fn identically_named_tests_keep_both_logs() {
    let dir = TempDir::new().unwrap();
    let agg = Arc::new(open(&dir, "dupes"));

    let workers: Vec<_> = (0..2)
        .map(|n| {
            let agg = Arc::clone(&agg);
            thread::spawn(move || {
                let t = agg.start_test("same_name");
                t.info(&format!("from worker {}", n));
                t.pass("done");
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let records = agg.records();
    assert_eq!(records.len(), 2);
    assert_eq!(agg.summary().total_started, 2);
    assert_eq!(agg.summary().total_passed, 2);

    let mut lines: Vec<String> = records.iter().flat_map(|r| r.log_lines()).collect();
    lines.retain(|l| l.starts_with("[INFO] from worker"));
    lines.sort();
    assert_eq!(lines, vec!["[INFO] from worker 0", "[INFO] from worker 1"]);
}

#[test]
fn runs_never_overwrite_each_other() {
    let dir = TempDir::new().unwrap();
    let first = open(&dir, "same-id").close();
    let second = open(&dir, "same-id").close();
    assert_ne!(first.html, second.html);
    assert_ne!(first.json, second.json);
    assert!(first.json.exists() && second.json.exists());
}

#[test]
fn unwritable_output_does_not_panic() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let agg = Aggregator::open(ReportConfig {
        output_dir: blocker.join("reports"),
        run_id: Some("broken".into()),
        ..Default::default()
    });
    let t = agg.start_test("still_runs");
    t.pass("ok");
    agg.flush();
    assert!(agg.try_flush().is_err());
    assert_eq!(agg.summary().total_passed, 1);
}
