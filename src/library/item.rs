//! Remote media item records as returned by the Photos Library API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LibraryError;

/// A photo stored in the remote library.
///
/// Only the creation time (and the id, for de-duplication) is inspected by
/// the lookup cache. Everything else is carried through to the report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Stable identifier assigned by the service
    #[serde(default)]
    pub id: String,
    /// Canonical link to the item in the web UI
    #[serde(default)]
    pub product_url: String,
    /// Link to the image bytes, used as the report thumbnail
    #[serde(default)]
    pub base_url: String,
    /// Original file name as uploaded
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub media_metadata: MediaMetadata,
}

/// Metadata block of a [`MediaItem`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    /// RFC 3339 creation timestamp
    #[serde(default)]
    pub creation_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

impl MediaItem {
    /// Create an item with an id and a raw creation timestamp.
    #[must_use]
    pub fn new(id: impl Into<String>, creation_time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_metadata: MediaMetadata {
                creation_time: creation_time.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Set the product and base URLs.
    #[must_use]
    pub fn with_urls(mut self, product_url: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.product_url = product_url.into();
        self.base_url = base_url.into();
        self
    }

    /// Set the remote file name.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Parse the creation timestamp, normalized to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::InvalidTimestamp`] if the value is not RFC 3339.
    pub fn creation_time(&self) -> Result<DateTime<Utc>, LibraryError> {
        let raw = &self.media_metadata.creation_time;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|source| LibraryError::InvalidTimestamp {
                id: self.id.clone(),
                value: raw.clone(),
                source,
            })
    }
}
