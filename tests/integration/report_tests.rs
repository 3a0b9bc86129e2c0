use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use armpup::output::{HtmlOutput, JsonOutput};
use armpup::reconcile::{FileReport, Outcome, ReconcileSummary, RemoteMatch};
use armpup::scanner::LocalFile;
use chrono::DateTime;
use tempfile::tempdir;

fn sample() -> (Vec<FileReport>, ReconcileSummary) {
    let file = |name: &str| LocalFile::new(PathBuf::from(format!("/photos/{name}")), 4096, SystemTime::now());
    let when = DateTime::parse_from_rfc3339("2021-06-01T12:00:00+02:00").ok();
    let reports = vec![
        FileReport {
            file: file("uploaded.jpg"),
            captured_at: when,
            outcome: Outcome::Matched(RemoteMatch {
                id: "r1".to_string(),
                product_url: "https://photos.example/lr/r1".to_string(),
                base_url: "https://lh3.example/r1".to_string(),
                filename: "uploaded.jpg".to_string(),
            }),
        },
        FileReport {
            file: file("missing.jpg"),
            captured_at: when,
            outcome: Outcome::NotFound,
        },
        FileReport {
            file: file("scan.png"),
            captured_at: None,
            outcome: Outcome::NoCaptureTime("No EXIF date found in /photos/scan.png".to_string()),
        },
    ];
    let summary = ReconcileSummary {
        total_files: 3,
        checked_files: 3,
        matched: 1,
        not_found: 1,
        no_capture_time: 1,
        remote_queries: 1,
        days_resolved: 3,
        ..Default::default()
    };
    (reports, summary)
}

#[test]
fn test_html_report_rows() {
    let (reports, summary) = sample();
    let html = HtmlOutput::new(&reports, &summary).to_html().unwrap();

    assert!(html.contains("3 files"));
    assert!(html.contains("uploaded.jpg"));
    assert!(html.contains("class=\"danger\""));
    assert!(html.contains("class=\"warning\""));
    assert!(html.contains("Not Found!"));
    assert!(html.contains("No EXIF date found."));
    assert!(html.contains("lh3.example"));
}

#[test]
fn test_html_report_written_to_file() {
    let (reports, summary) = sample();
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.html");

    let mut file = fs::File::create(&path).unwrap();
    HtmlOutput::new(&reports, &summary).write_to(&mut file).unwrap();
    drop(file);

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("<!DOCTYPE html>"));
}

#[test]
fn test_json_report_round_trips_counts() {
    let (reports, summary) = sample();
    let json = JsonOutput::new(&reports, &summary).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["files"].as_array().unwrap().len(), 3);
    assert_eq!(value["files"][0]["remote"]["product_url"], "https://photos.example/lr/r1");
    assert_eq!(value["files"][1]["status"], "not_found");
    assert_eq!(value["summary"]["exit_code"], 2);
    assert_eq!(value["summary"]["exit_code_name"], "AP002");
    assert_eq!(value["summary"]["days_resolved"], 3);
}
