//! Remote photo library access.
//!
//! This module provides the timestamp-indexed lookup over a remote photo
//! library and the sources it queries.
//!
//! # Architecture
//!
//! * [`cache`]: the day-bucketed lookup cache ([`DayCache`]).
//! * [`day`]: the [`DayKey`] bucketing type and instant comparison.
//! * [`item`]: the [`MediaItem`] record returned by the service.
//! * [`source`]: the [`MediaSource`] trait the cache queries on a miss.
//! * [`google`]: the Photos Library API implementation of [`MediaSource`].
//! * [`memory`]: an in-memory [`MediaSource`] for tests and benchmarks.

pub mod cache;
pub mod day;
pub mod google;
pub mod item;
pub mod memory;
pub mod source;

pub use cache::{CacheStats, DayCache};
pub use day::{instant_key, DayKey};
pub use google::GooglePhotosClient;
pub use item::{MediaItem, MediaMetadata};
pub use memory::InMemorySource;
pub use source::{MediaSource, PageVisitor, SearchRequest};

/// Errors raised while querying the remote library.
///
/// Every variant is fatal to the lookup that triggered it. A lookup that
/// simply finds nothing is not an error.
#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("Request to Photos Library API failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Photos Library API returned status {code}: {body}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body, kept for diagnostics
        body: String,
    },

    /// The service answered with a body that could not be decoded.
    #[error("Unexpected response body from Photos Library API: {source}")]
    UnexpectedBody {
        /// Raw response body
        body: String,
        /// The decoding error
        #[source]
        source: serde_json::Error,
    },

    /// A returned item carried a creation time that is not RFC 3339.
    #[error("Invalid creation time '{value}' on media item '{id}': {source}")]
    InvalidTimestamp {
        /// Id of the offending item
        id: String,
        /// The raw creation time
        value: String,
        /// The parse error
        #[source]
        source: chrono::ParseError,
    },

    /// The search was cancelled through the shutdown handler.
    #[error("Remote search cancelled")]
    Cancelled,
}
