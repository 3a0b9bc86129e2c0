//! In-memory media source.
//!
//! Behaves like the Photos Library date filter: an item is returned when
//! its creation date falls between the calendar dates of the request bounds,
//! inclusive. Items whose creation time does not parse are always returned,
//! mirroring a service that hands back malformed records.

use std::cell::RefCell;

use chrono::{DateTime, NaiveDate, Utc};

use super::source::{MediaSource, PageVisitor, SearchRequest};
use super::{LibraryError, MediaItem};
use crate::signal::ShutdownHandler;

/// A [`MediaSource`] backed by a fixed list of items.
#[derive(Debug, Default)]
pub struct InMemorySource {
    items: Vec<MediaItem>,
    page_size: usize,
    requests: RefCell<Vec<SearchRequest>>,
}

impl InMemorySource {
    /// Create a source serving `items` in the given order.
    #[must_use]
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self {
            items,
            page_size: 100,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Split results into pages of `page_size` items.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.borrow().clone()
    }

    /// Number of searches issued against this source.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn matches(item: &MediaItem, first: NaiveDate, last: NaiveDate) -> bool {
        match DateTime::parse_from_rfc3339(&item.media_metadata.creation_time) {
            Ok(created) => {
                let date = created.with_timezone(&Utc).date_naive();
                date >= first && date <= last
            }
            Err(_) => true,
        }
    }
}

impl MediaSource for InMemorySource {
    fn search(
        &self,
        request: &SearchRequest,
        cancel: &ShutdownHandler,
        visit: &mut PageVisitor<'_>,
    ) -> Result<(), LibraryError> {
        self.requests.borrow_mut().push(*request);

        let first = request.start.date_naive();
        let last = request.end.date_naive();
        let hits: Vec<MediaItem> = self
            .items
            .iter()
            .filter(|item| Self::matches(item, first, last))
            .cloned()
            .collect();

        for page in hits.chunks(self.page_size) {
            if cancel.is_shutdown_requested() {
                return Err(LibraryError::Cancelled);
            }
            visit(page.to_vec())?;
        }
        Ok(())
    }
}
