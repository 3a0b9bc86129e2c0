//! Day-bucketed lookup cache.
//!
//! # Overview
//!
//! [`DayCache`] answers "is there a remote item created at exactly this
//! instant?" while issuing as few remote searches as possible:
//!
//! 1. The instant is normalized to UTC and mapped to a [`DayKey`].
//! 2. If that day has never been resolved, one range search is issued for
//!    the window from 24 hours before to 48 hours after the instant.
//! 3. Every returned item is filed under its own day, so neighbouring days
//!    are often resolved as a side effect.
//! 4. The bucket for the requested day is scanned for an item whose creation
//!    time is the same instant. Fractional seconds count, so a remote
//!    `10:00:00.750Z` does not match a local `10:00:00`.
//!
//! A day that has been resolved is never searched again, even when its
//! bucket is empty.
//!
//! # Failure policy
//!
//! The target day is marked resolved before the search is issued. If the
//! search fails (remote error, malformed creation time, cancellation), every
//! day first created by that search, the target included, is removed again
//! so the next lookup re-queries instead of reporting "not found". Items
//! appended to days that were already resolved stay in place.
//!
//! # Duplicates
//!
//! Overlapping windows return the same item more than once. An item whose
//! non-empty id is already in its bucket is skipped. Items without an id are
//! appended as-is; first match wins, so such duplicates never change a
//! lookup result.
//!
//! # Example
//!
//! ```
//! use armpup::library::{DayCache, InMemorySource, MediaItem};
//! use armpup::signal::ShutdownHandler;
//! use chrono::DateTime;
//!
//! let source = InMemorySource::new(vec![
//!     MediaItem::new("a", "2021-06-01T12:00:00Z"),
//!     MediaItem::new("b", "2021-06-02T09:00:00Z"),
//! ]);
//! let mut cache = DayCache::new(source);
//! let cancel = ShutdownHandler::new();
//!
//! let t = DateTime::parse_from_rfc3339("2021-06-01T12:00:00Z").unwrap();
//! assert_eq!(cache.lookup(&t, &cancel).unwrap().map(|i| i.id.as_str()), Some("a"));
//!
//! // The neighbouring day was prefetched by the first search.
//! let t = DateTime::parse_from_rfc3339("2021-06-02T09:00:00Z").unwrap();
//! assert_eq!(cache.lookup(&t, &cancel).unwrap().map(|i| i.id.as_str()), Some("b"));
//! assert_eq!(cache.source().query_count(), 1);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use super::day::{instant_key, DayKey};
use super::source::{MediaSource, SearchRequest};
use super::{LibraryError, MediaItem};
use crate::signal::ShutdownHandler;

/// A cached item together with its canonical instant.
#[derive(Debug, Clone)]
struct Entry {
    instant: String,
    item: MediaItem,
}

/// Counters describing cache activity over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of `lookup` calls
    pub lookups: usize,
    /// Lookups that found a matching item
    pub matches: usize,
    /// Lookups that completed without a match
    pub not_found: usize,
    /// Remote searches issued
    pub queries: usize,
    /// Remote searches that failed
    pub failed_queries: usize,
    /// Items received from the remote source
    pub items_received: usize,
    /// Items skipped because their id was already cached
    pub duplicates_skipped: usize,
}

/// Timestamp-indexed cache of remote items, bucketed by UTC day.
///
/// Created once per reconciliation run and owned by its driver. Lookups take
/// `&mut self`, so one cache can never serve two lookups at the same time.
#[derive(Debug)]
pub struct DayCache<S> {
    source: S,
    buckets: HashMap<DayKey, Vec<Entry>>,
    stats: CacheStats,
}

impl<S: MediaSource> DayCache<S> {
    /// Create an empty cache over a remote source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            buckets: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Find the remote item created at exactly `timestamp`.
    ///
    /// Returns `Ok(None)` when the day has been searched and no item matches.
    /// `cancel` is handed to the remote source unchanged.
    ///
    /// # Errors
    ///
    /// Propagates any error from the remote search, including malformed
    /// creation times in returned items. No retry is attempted.
    pub fn lookup(
        &mut self,
        timestamp: &DateTime<FixedOffset>,
        cancel: &ShutdownHandler,
    ) -> Result<Option<&MediaItem>, LibraryError> {
        self.stats.lookups += 1;

        let day = DayKey::from_instant(timestamp);
        if !self.buckets.contains_key(&day) {
            self.populate(timestamp, cancel)?;
        } else {
            log::trace!("Day {} already resolved", day);
        }

        let wanted = instant_key(timestamp);
        let found = self
            .buckets
            .get(&day)
            .and_then(|bucket| bucket.iter().find(|entry| entry.instant == wanted))
            .map(|entry| &entry.item);

        if found.is_some() {
            self.stats.matches += 1;
        } else {
            self.stats.not_found += 1;
        }
        Ok(found)
    }

    /// Issue one remote search around `timestamp` and file the results.
    fn populate(
        &mut self,
        timestamp: &DateTime<FixedOffset>,
        cancel: &ShutdownHandler,
    ) -> Result<(), LibraryError> {
        let day = DayKey::from_instant(timestamp);
        self.buckets.insert(day, Vec::new());
        let mut created = vec![day];

        let request = SearchRequest::around(timestamp);
        log::debug!(
            "Searching remote library for {} ({} .. {})",
            day,
            request.start.to_rfc3339(),
            request.end.to_rfc3339()
        );
        self.stats.queries += 1;

        let source = &self.source;
        let buckets = &mut self.buckets;
        let stats = &mut self.stats;
        let result = source.search(&request, cancel, &mut |page| {
            log::trace!("Received page of {} items", page.len());
            for item in page {
                stats.items_received += 1;
                let created_at = item.creation_time()?;
                let item_day = DayKey::from_instant(&created_at);

                let bucket = buckets.entry(item_day).or_insert_with(|| {
                    created.push(item_day);
                    Vec::new()
                });
                if !item.id.is_empty() && bucket.iter().any(|e| e.item.id == item.id) {
                    stats.duplicates_skipped += 1;
                    continue;
                }
                bucket.push(Entry {
                    instant: instant_key(&created_at),
                    item,
                });
            }
            Ok(())
        });

        if let Err(err) = result {
            self.stats.failed_queries += 1;
            for key in &created {
                self.buckets.remove(key);
            }
            log::debug!(
                "Search for {} failed, unresolved {} day(s): {}",
                day,
                created.len(),
                err
            );
            return Err(err);
        }

        log::debug!(
            "Resolved {} day(s) from search for {}",
            created.len(),
            day
        );
        Ok(())
    }

    /// Whether `day` has been searched (directly or as a neighbour).
    #[must_use]
    pub fn is_resolved(&self, day: &DayKey) -> bool {
        self.buckets.contains_key(day)
    }

    /// Items cached for `day` in insertion order, or `None` if unresolved.
    #[must_use]
    pub fn items(&self, day: &DayKey) -> Option<Vec<&MediaItem>> {
        self.buckets
            .get(day)
            .map(|bucket| bucket.iter().map(|entry| &entry.item).collect())
    }

    /// Number of resolved days.
    #[must_use]
    pub fn resolved_days(&self) -> usize {
        self.buckets.len()
    }

    /// Activity counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// The remote source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consume the cache and return its source.
    #[must_use]
    pub fn into_source(self) -> S {
        self.source
    }
}
