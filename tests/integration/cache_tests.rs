use armpup::library::{DayCache, DayKey, InMemorySource, LibraryError, MediaItem};
use armpup::signal::ShutdownHandler;
use chrono::{DateTime, FixedOffset};

fn at(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn found_id(
    cache: &mut DayCache<InMemorySource>,
    when: &str,
) -> Result<Option<String>, LibraryError> {
    Ok(cache
        .lookup(&at(when), &ShutdownHandler::new())?
        .map(|item| item.id.clone()))
}

#[test]
fn test_end_to_end_single_query() {
    let source = InMemorySource::new(vec![
        MediaItem::new("first", "2021-06-01T12:00:00Z"),
        MediaItem::new("second", "2021-06-02T09:00:00Z"),
    ]);
    let mut cache = DayCache::new(source);

    assert_eq!(
        found_id(&mut cache, "2021-06-01T12:00:00Z").unwrap().as_deref(),
        Some("first")
    );
    assert_eq!(
        found_id(&mut cache, "2021-06-02T09:00:00Z").unwrap().as_deref(),
        Some("second")
    );

    let requests = cache.source().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].start, at("2021-05-31T12:00:00Z"));
    assert_eq!(requests[0].end, at("2021-06-03T12:00:00Z"));
}

#[test]
fn test_exact_match_not_fuzzy() {
    let source = InMemorySource::new(vec![MediaItem::new("a", "2021-03-04T10:00:00Z")]);
    let mut cache = DayCache::new(source);

    assert!(found_id(&mut cache, "2021-03-04T10:00:01Z").unwrap().is_none());
    assert_eq!(
        found_id(&mut cache, "2021-03-04T10:00:00Z").unwrap().as_deref(),
        Some("a")
    );
    assert_eq!(cache.source().query_count(), 1);
}

#[test]
fn test_fractional_remote_time_does_not_match_whole_second() {
    let source = InMemorySource::new(vec![MediaItem::new("frac", "2021-03-04T10:00:00.750Z")]);
    let mut cache = DayCache::new(source);

    assert!(found_id(&mut cache, "2021-03-04T10:00:00Z").unwrap().is_none());
    assert_eq!(
        found_id(&mut cache, "2021-03-04T10:00:00.750Z").unwrap().as_deref(),
        Some("frac")
    );
    assert_eq!(cache.source().query_count(), 1);
}

#[test]
fn test_offset_timestamp_uses_utc_day() {
    let source = InMemorySource::new(vec![MediaItem::new("late", "2021-03-05T04:30:00Z")]);
    let mut cache = DayCache::new(source);

    // 23:30 at -05:00 is 04:30 UTC the next day.
    let id = found_id(&mut cache, "2021-03-04T23:30:00-05:00").unwrap();
    assert_eq!(id.as_deref(), Some("late"));
    assert!(cache.is_resolved(&DayKey::from_ymd(2021, 3, 5).unwrap()));

    let requests = cache.source().requests();
    assert_eq!(requests[0].start.offset().local_minus_utc(), -5 * 3600);
}

#[test]
fn test_empty_day_is_not_queried_twice() {
    let mut cache = DayCache::new(InMemorySource::new(Vec::new()));

    for _ in 0..5 {
        assert!(found_id(&mut cache, "2020-01-01T08:00:00Z").unwrap().is_none());
    }
    assert_eq!(cache.source().query_count(), 1);
    assert_eq!(cache.stats().not_found, 5);
}

#[test]
fn test_neighbour_days_come_from_one_search() {
    let source = InMemorySource::new(vec![
        MediaItem::new("d1", "2022-08-10T06:00:00Z"),
        MediaItem::new("d2", "2022-08-11T06:00:00Z"),
        MediaItem::new("d3", "2022-08-12T06:00:00Z"),
    ])
    .with_page_size(1);
    let mut cache = DayCache::new(source);

    found_id(&mut cache, "2022-08-10T06:00:00Z").unwrap();
    assert_eq!(
        found_id(&mut cache, "2022-08-12T06:00:00Z").unwrap().as_deref(),
        Some("d3")
    );
    assert_eq!(cache.source().query_count(), 1);
    assert_eq!(cache.resolved_days(), 3);
}

#[test]
fn test_malformed_creation_time_fails_and_retries() {
    let source = InMemorySource::new(vec![
        MediaItem::new("ok", "2021-06-01T12:00:00Z"),
        MediaItem::new("bad", "yesterday"),
    ]);
    let mut cache = DayCache::new(source);

    let err = found_id(&mut cache, "2021-06-01T12:00:00Z").unwrap_err();
    assert!(matches!(err, LibraryError::InvalidTimestamp { .. }));
    assert_eq!(cache.resolved_days(), 0);

    // Still failing, but the day is searched again instead of reported missing.
    assert!(found_id(&mut cache, "2021-06-01T12:00:00Z").is_err());
    assert_eq!(cache.source().query_count(), 2);
}

#[test]
fn test_cancelled_search_is_propagated() {
    let source = InMemorySource::new(vec![MediaItem::new("a", "2021-06-01T12:00:00Z")]);
    let mut cache = DayCache::new(source);
    let cancel = ShutdownHandler::new();
    cancel.request_shutdown();

    let err = cache.lookup(&at("2021-06-01T12:00:00Z"), &cancel).unwrap_err();
    assert!(matches!(err, LibraryError::Cancelled));
    assert!(!cache.is_resolved(&DayKey::from_ymd(2021, 6, 1).unwrap()));
}

#[test]
fn test_overlapping_searches_do_not_duplicate_items() {
    let source = InMemorySource::new(vec![MediaItem::new("shared", "2021-06-03T10:00:00Z")]);
    let mut cache = DayCache::new(source);

    // Both search windows cover 2021-06-03.
    found_id(&mut cache, "2021-06-02T10:00:00Z").unwrap();
    found_id(&mut cache, "2021-06-04T10:00:00Z").unwrap();
    assert_eq!(cache.source().query_count(), 2);

    let day = DayKey::from_ymd(2021, 6, 3).unwrap();
    assert_eq!(cache.items(&day).map(|items| items.len()), Some(1));
    assert_eq!(cache.stats().duplicates_skipped, 1);
}
