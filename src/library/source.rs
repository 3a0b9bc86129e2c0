//! The remote listing seam.
//!
//! [`MediaSource`] is what the lookup cache queries on a miss. The production
//! implementation is [`GooglePhotosClient`](super::GooglePhotosClient);
//! [`InMemorySource`](super::InMemorySource) serves tests and benchmarks.

use chrono::{DateTime, Duration, FixedOffset};

use super::{LibraryError, MediaItem};
use crate::signal::ShutdownHandler;

/// Hours searched before the target instant.
pub const LOOKBEHIND_HOURS: i64 = 24;

/// Hours searched after the target instant.
pub const LOOKAHEAD_HOURS: i64 = 48;

/// A time-range search against the remote library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    /// Inclusive start of the range
    pub start: DateTime<FixedOffset>,
    /// Inclusive end of the range
    pub end: DateTime<FixedOffset>,
}

impl SearchRequest {
    /// Create a request for an explicit range.
    #[must_use]
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    /// The prefetch window around an instant: one day before to two days
    /// after, keeping the instant's own offset and time of day.
    ///
    /// The window is wider than the target day because the service may
    /// report an item's date in a different zone than the file metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// use armpup::library::SearchRequest;
    /// use chrono::DateTime;
    ///
    /// let t = DateTime::parse_from_rfc3339("2021-06-01T12:00:00Z").unwrap();
    /// let request = SearchRequest::around(&t);
    /// assert_eq!(request.start.to_rfc3339(), "2021-05-31T12:00:00+00:00");
    /// assert_eq!(request.end.to_rfc3339(), "2021-06-03T12:00:00+00:00");
    /// ```
    #[must_use]
    pub fn around(instant: &DateTime<FixedOffset>) -> Self {
        Self {
            start: *instant - Duration::hours(LOOKBEHIND_HOURS),
            end: *instant + Duration::hours(LOOKAHEAD_HOURS),
        }
    }
}

/// Callback invoked with each page of results.
pub type PageVisitor<'a> = dyn FnMut(Vec<MediaItem>) -> Result<(), LibraryError> + 'a;

/// A paged listing of remote media items.
pub trait MediaSource {
    /// Run a range search, handing every page to `visit` in order.
    ///
    /// Implementations must follow all pages before returning `Ok`. An error
    /// from `visit` stops the search and is returned unchanged. `cancel` is
    /// the caller's cancellation context; implementations check it between
    /// pages.
    fn search(
        &self,
        request: &SearchRequest,
        cancel: &ShutdownHandler,
        visit: &mut PageVisitor<'_>,
    ) -> Result<(), LibraryError>;
}

impl<S: MediaSource + ?Sized> MediaSource for &S {
    fn search(
        &self,
        request: &SearchRequest,
        cancel: &ShutdownHandler,
        visit: &mut PageVisitor<'_>,
    ) -> Result<(), LibraryError> {
        (**self).search(request, cancel, visit)
    }
}

impl<S: MediaSource + ?Sized> MediaSource for Box<S> {
    fn search(
        &self,
        request: &SearchRequest,
        cancel: &ShutdownHandler,
        visit: &mut PageVisitor<'_>,
    ) -> Result<(), LibraryError> {
        (**self).search(request, cancel, visit)
    }
}
