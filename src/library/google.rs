//! Photos Library API client.
//!
//! Implements [`MediaSource`] on top of `POST /v1/mediaItems:search` with a
//! date filter. The API filters on whole calendar dates, so the instants of a
//! [`SearchRequest`] are reduced to their dates in their own offset.
//!
//! # Example
//!
//! ```no_run
//! use armpup::library::{DayCache, GooglePhotosClient};
//! use armpup::signal::ShutdownHandler;
//! use chrono::DateTime;
//!
//! let client = GooglePhotosClient::new("ya29.access-token").unwrap();
//! let mut cache = DayCache::new(client);
//! let t = DateTime::parse_from_rfc3339("2021-06-01T12:00:00Z").unwrap();
//! if let Some(item) = cache.lookup(&t, &ShutdownHandler::new()).unwrap() {
//!     println!("{}", item.product_url);
//! }
//! ```

use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::source::{MediaSource, PageVisitor, SearchRequest};
use super::{LibraryError, MediaItem};
use crate::signal::ShutdownHandler;

/// Default API root.
pub const DEFAULT_API_BASE: &str = "https://photoslibrary.googleapis.com";

/// Largest page size the search endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A calendar date as the API expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl ApiDate {
    /// The calendar date of an instant in its own offset.
    #[must_use]
    pub fn of(instant: &DateTime<FixedOffset>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
            day: instant.day(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: ApiDate,
    pub end_date: ApiDate,
}

impl From<&SearchRequest> for DateRange {
    fn from(request: &SearchRequest) -> Self {
        Self {
            start_date: ApiDate::of(&request.start),
            end_date: ApiDate::of(&request.end),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DateFilter {
    ranges: Vec<DateRange>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Filters {
    date_filter: DateFilter,
}

/// Body of a `mediaItems:search` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
    filters: Filters,
}

/// One page of search results.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    media_items: Vec<MediaItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl SearchPage {
    fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Blocking client for the Photos Library search endpoint.
#[derive(Debug, Clone)]
pub struct GooglePhotosClient {
    http: Client,
    api_base: String,
    access_token: String,
    page_size: u32,
}

impl GooglePhotosClient {
    /// Create a client authenticated with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(access_token: impl Into<String>) -> Result<Self, LibraryError> {
        Self::with_timeout(access_token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LibraryError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("armpup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            access_token: access_token.into(),
            page_size: MAX_PAGE_SIZE,
        })
    }

    /// Point the client at a different API root.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the number of items requested per page (clamped to 1..=100).
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn search_url(&self) -> String {
        format!("{}/v1/mediaItems:search", self.api_base)
    }

    fn fetch_page(&self, body: &SearchBody<'_>) -> Result<SearchPage, LibraryError> {
        let response = self
            .http
            .post(self.search_url())
            .bearer_auth(&self.access_token)
            .json(body)
            .send()?;
        let status = response.status();
        let text = response.text()?;
        parse_page(status, text)
    }
}

/// Turn a raw response into a page, keeping the body on failure.
fn parse_page(status: StatusCode, body: String) -> Result<SearchPage, LibraryError> {
    if !status.is_success() {
        return Err(LibraryError::Status {
            code: status.as_u16(),
            body,
        });
    }
    // The API answers `{}` when a search has no results.
    serde_json::from_str::<SearchPage>(&body).map_err(|source| {
        log::error!("Failed to decode search response");
        LibraryError::UnexpectedBody { body, source }
    })
}

impl MediaSource for GooglePhotosClient {
    fn search(
        &self,
        request: &SearchRequest,
        cancel: &ShutdownHandler,
        visit: &mut PageVisitor<'_>,
    ) -> Result<(), LibraryError> {
        let range = DateRange::from(request);
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if cancel.is_shutdown_requested() {
                return Err(LibraryError::Cancelled);
            }

            let body = SearchBody {
                page_size: self.page_size,
                page_token: token.as_deref(),
                filters: Filters {
                    date_filter: DateFilter {
                        ranges: vec![range],
                    },
                },
            };
            let page = self.fetch_page(&body)?;
            pages += 1;
            token = page.next_token().map(str::to_string);
            log::trace!(
                "Search page {} returned {} items",
                pages,
                page.media_items.len()
            );

            visit(page.media_items)?;
            if token.is_none() {
                break;
            }
        }

        log::debug!("Search finished after {} page(s)", pages);
        Ok(())
    }
}
