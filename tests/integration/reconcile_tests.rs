use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use armpup::capture::{CaptureError, CaptureTimeReader};
use armpup::error::ExitCode;
use armpup::library::{
    DayCache, InMemorySource, LibraryError, MediaItem, MediaSource, PageVisitor, SearchRequest,
};
use armpup::progress::ProgressCallback;
use armpup::reconcile::{Outcome, Reconciler};
use armpup::scanner::LocalFile;
use armpup::signal::ShutdownHandler;
use chrono::{DateTime, FixedOffset};

/// Capture times keyed by file name; unknown files have no date.
struct FixedTimes(HashMap<String, DateTime<FixedOffset>>);

impl FixedTimes {
    fn new(entries: &[(&str, &str)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(name, t)| {
                    (
                        name.to_string(),
                        DateTime::parse_from_rfc3339(t).unwrap(),
                    )
                })
                .collect(),
        )
    }
}

impl CaptureTimeReader for FixedTimes {
    fn capture_time(&self, path: &Path) -> Result<DateTime<FixedOffset>, CaptureError> {
        let name = path.file_name().unwrap().to_string_lossy();
        self.0
            .get(name.as_ref())
            .copied()
            .ok_or_else(|| CaptureError::NoDate(path.to_path_buf()))
    }
}

fn files(names: &[&str]) -> Vec<LocalFile> {
    names
        .iter()
        .map(|n| LocalFile::new(PathBuf::from(format!("/photos/{n}")), 100, SystemTime::now()))
        .collect()
}

fn library() -> InMemorySource {
    InMemorySource::new(vec![
        MediaItem::new("r1", "2021-06-01T12:00:00Z")
            .with_urls("https://photos/r1", "https://lh3/r1")
            .with_filename("IMG_0001.JPG"),
        MediaItem::new("r2", "2021-06-02T09:00:00Z"),
    ])
}

#[test]
fn test_outcomes_and_summary() {
    let reader = FixedTimes::new(&[
        ("IMG_0001.JPG", "2021-06-01T08:00:00-04:00"),
        ("IMG_0002.JPG", "2021-06-02T09:00:00Z"),
        ("IMG_0003.JPG", "2021-06-02T09:00:05Z"),
    ]);
    let mut reconciler = Reconciler::new(DayCache::new(library()), reader);
    let (reports, summary) = reconciler
        .run(files(&["IMG_0001.JPG", "IMG_0002.JPG", "IMG_0003.JPG", "notes.txt"]))
        .unwrap();

    assert_eq!(reports.len(), 4);
    match &reports[0].outcome {
        Outcome::Matched(remote) => {
            assert_eq!(remote.id, "r1");
            assert_eq!(remote.product_url, "https://photos/r1");
        }
        other => panic!("Expected match, got {other:?}"),
    }
    assert!(matches!(reports[1].outcome, Outcome::Matched(_)));
    assert_eq!(reports[2].outcome, Outcome::NotFound);
    assert!(matches!(reports[3].outcome, Outcome::NoCaptureTime(_)));
    assert!(reports[3].captured_at.is_none());

    assert_eq!(summary.matched, 2);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.no_capture_time, 1);
    assert_eq!(summary.remote_queries, 1);
    assert_eq!(summary.exit_code(), ExitCode::MissingPhotos);
}

#[test]
fn test_all_matched_is_success() {
    let reader = FixedTimes::new(&[("a.jpg", "2021-06-01T12:00:00Z")]);
    let mut reconciler = Reconciler::new(DayCache::new(library()), reader);
    let (_, summary) = reconciler.run(files(&["a.jpg"])).unwrap();
    assert_eq!(summary.exit_code(), ExitCode::Success);
}

#[test]
fn test_remote_failure_aborts_run() {
    let source = InMemorySource::new(vec![MediaItem::new("bad", "not a time")]);
    let reader = FixedTimes::new(&[("a.jpg", "2021-06-01T12:00:00Z")]);
    let mut reconciler = Reconciler::new(DayCache::new(source), reader);

    let err = reconciler.run(files(&["a.jpg"])).unwrap_err();
    assert!(matches!(err, LibraryError::InvalidTimestamp { .. }));
}

#[test]
fn test_shutdown_between_files_marks_interrupted() {
    let shutdown = ShutdownHandler::new();
    shutdown.request_shutdown();
    let reader = FixedTimes::new(&[("a.jpg", "2021-06-01T12:00:00Z")]);
    let mut reconciler =
        Reconciler::new(DayCache::new(library()), reader).with_shutdown(shutdown);

    let (reports, summary) = reconciler.run(files(&["a.jpg", "b.jpg"])).unwrap();
    assert!(reports.is_empty());
    assert!(summary.interrupted);
    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.exit_code(), ExitCode::Interrupted);
    assert_eq!(reconciler.cache().source().query_count(), 0);
}

/// Serves `items` on the first search; every later search behaves as if
/// Ctrl+C arrived while it was in flight.
struct CancelAfterFirstSearch {
    shutdown: ShutdownHandler,
    searches: Cell<usize>,
    items: Vec<MediaItem>,
}

impl MediaSource for CancelAfterFirstSearch {
    fn search(
        &self,
        _request: &SearchRequest,
        _cancel: &ShutdownHandler,
        visit: &mut PageVisitor<'_>,
    ) -> Result<(), LibraryError> {
        self.searches.set(self.searches.get() + 1);
        if self.searches.get() > 1 {
            self.shutdown.request_shutdown();
            return Err(LibraryError::Cancelled);
        }
        visit(self.items.clone())
    }
}

#[test]
fn test_cancel_during_search_keeps_partial_reports() {
    let shutdown = ShutdownHandler::new();
    let source = CancelAfterFirstSearch {
        shutdown: shutdown.clone(),
        searches: Cell::new(0),
        items: vec![MediaItem::new("r1", "2021-06-01T12:00:00Z")],
    };
    let reader = FixedTimes::new(&[
        ("a.jpg", "2021-06-01T12:00:00Z"),
        ("b.jpg", "2021-07-01T12:00:00Z"),
        ("c.jpg", "2021-08-01T12:00:00Z"),
    ]);
    let mut reconciler =
        Reconciler::new(DayCache::new(source), reader).with_shutdown(shutdown.clone());

    let (reports, summary) = reconciler
        .run(files(&["a.jpg", "b.jpg", "c.jpg"]))
        .unwrap();

    assert_eq!(reports.len(), 1);
    assert!(matches!(&reports[0].outcome, Outcome::Matched(remote) if remote.id == "r1"));
    assert!(summary.interrupted);
    assert_eq!(summary.checked_files, 1);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.exit_code(), ExitCode::Interrupted);
    assert_eq!(reconciler.cache().source().searches.get(), 2);
    assert!(shutdown.is_shutdown_requested());
}

#[derive(Default)]
struct Recorder {
    calls: AtomicUsize,
    phases: Mutex<Vec<String>>,
}

impl ProgressCallback for Recorder {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        self.phases.lock().unwrap().push(format!("start:{phase}"));
    }

    fn on_progress(&self, _current: usize, _path: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn on_phase_end(&self, phase: &str) {
        self.phases.lock().unwrap().push(format!("end:{phase}"));
    }
}

#[test]
fn test_progress_is_reported() {
    let recorder = Arc::new(Recorder::default());
    let reader = FixedTimes::new(&[]);
    let mut reconciler = Reconciler::new(DayCache::new(library()), reader)
        .with_progress(recorder.clone());

    reconciler.run(files(&["a.jpg", "b.jpg", "c.jpg"])).unwrap();

    assert_eq!(recorder.calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        *recorder.phases.lock().unwrap(),
        vec!["start:reconcile".to_string(), "end:reconcile".to_string()]
    );
}
