use std::fs;

use armpup::capture::ExifReader;
use armpup::error::ExitCode;
use armpup::library::{DayCache, InMemorySource};
use armpup::reconcile::{Outcome, Reconciler};
use armpup::scanner::{ScanError, Walker, WalkerConfig};
use tempfile::TempDir;

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.jpg"), b"not really a jpeg").unwrap();
    fs::write(dir.path().join("a.png"), b"\x89PNG\r\n\x1a\n").unwrap();
    fs::write(dir.path().join(".hidden.jpg"), b"x").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("c.jpg"), b"x").unwrap();
    dir
}

#[test]
fn test_scan_then_reconcile_without_exif() {
    let dir = setup();
    let files = Walker::new(dir.path(), WalkerConfig::new(false, true))
        .collect_files()
        .unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "b.jpg"]);

    let cache = DayCache::new(InMemorySource::new(Vec::new()));
    let mut reconciler = Reconciler::new(cache, ExifReader);
    let (reports, summary) = reconciler.run(files).unwrap();

    assert!(reports
        .iter()
        .all(|r| matches!(r.outcome, Outcome::NoCaptureTime(_))));
    assert_eq!(summary.no_capture_time, 2);
    assert_eq!(summary.remote_queries, 0);
    assert_eq!(summary.exit_code(), ExitCode::PartialSuccess);
}

#[test]
fn test_recursive_scan_includes_subdirectories() {
    let dir = setup();
    let files = Walker::new(dir.path(), WalkerConfig::new(true, false))
        .collect_files()
        .unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert!(names.contains(&"c.jpg"));
    assert!(names.contains(&".hidden.jpg"));
    assert_eq!(files.len(), 4);
}

#[test]
fn test_scan_missing_directory() {
    let dir = TempDir::new().unwrap();
    let result = Walker::new(&dir.path().join("gone"), WalkerConfig::default()).collect_files();
    assert!(matches!(result, Err(ScanError::NotFound(_))));
}
