//! Capture time extraction from embedded EXIF metadata.
//!
//! [`ExifReader`] reads the first of `DateTimeOriginal`, `DateTimeDigitized`
//! and `DateTime` present in the primary image. When the matching
//! `OffsetTime*` tag exists its offset is applied; otherwise the EXIF time is
//! taken to be in the local timezone, which is how cameras without offset
//! tags record it.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use exif::{In, Tag, Value};

/// EXIF date layout, e.g. `2021:06:01 12:00:00`.
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Date tags in order of preference, each with its offset tag.
const DATE_TAGS: [(Tag, Tag); 3] = [
    (Tag::DateTimeOriginal, Tag::OffsetTimeOriginal),
    (Tag::DateTimeDigitized, Tag::OffsetTimeDigitized),
    (Tag::DateTime, Tag::OffsetTime),
];

/// Errors that can occur while reading a capture time.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// The file could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file has no readable EXIF block.
    #[error("No EXIF data in {path}: {reason}")]
    NoExif {
        /// File being read
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// EXIF is present but carries no date tag.
    #[error("No EXIF date found in {0}")]
    NoDate(PathBuf),

    /// A date tag is present but cannot be parsed.
    #[error("Invalid EXIF date '{value}' in {path}")]
    InvalidDate {
        /// File being read
        path: PathBuf,
        /// Raw tag value
        value: String,
    },
}

/// Source of capture timestamps for local files.
pub trait CaptureTimeReader {
    /// Read the moment the photo at `path` was taken.
    ///
    /// # Errors
    ///
    /// Returns a [`CaptureError`] when no usable timestamp is found.
    fn capture_time(&self, path: &Path) -> Result<DateTime<FixedOffset>, CaptureError>;
}

/// Reads capture times with `kamadak-exif`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifReader;

impl CaptureTimeReader for ExifReader {
    fn capture_time(&self, path: &Path) -> Result<DateTime<FixedOffset>, CaptureError> {
        let file = File::open(path).map_err(|source| CaptureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        let exif = exif::Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| match e {
                exif::Error::Io(source) => CaptureError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                other => CaptureError::NoExif {
                    path: path.to_path_buf(),
                    reason: other.to_string(),
                },
            })?;

        for (date_tag, offset_tag) in DATE_TAGS {
            let Some(raw) = exif
                .get_field(date_tag, In::PRIMARY)
                .and_then(|f| ascii_value(&f.value))
            else {
                continue;
            };
            let offset = exif
                .get_field(offset_tag, In::PRIMARY)
                .and_then(|f| ascii_value(&f.value))
                .and_then(|s| parse_offset(&s));

            log::trace!("{}: {} = {} ({:?})", path.display(), date_tag, raw, offset);
            return parse_exif_datetime(&raw, offset).ok_or_else(|| CaptureError::InvalidDate {
                path: path.to_path_buf(),
                value: raw,
            });
        }

        Err(CaptureError::NoDate(path.to_path_buf()))
    }
}

fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Parse an EXIF date, applying `offset` or else the local timezone.
///
/// # Examples
///
/// ```
/// use armpup::capture::{parse_exif_datetime, parse_offset};
///
/// let t = parse_exif_datetime("2021:06:01 12:00:00", parse_offset("+02:00")).unwrap();
/// assert_eq!(t.to_rfc3339(), "2021-06-01T12:00:00+02:00");
/// ```
#[must_use]
pub fn parse_exif_datetime(raw: &str, offset: Option<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATE_FORMAT).ok()?;
    match offset {
        Some(offset) => offset.from_local_datetime(&naive).single(),
        None => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(DateTime::<FixedOffset>::from),
    }
}

/// Parse an EXIF offset tag such as `+09:00` or `-05:30`.
///
/// Hours and minutes must be exactly two ASCII digits each.
#[must_use]
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours = two_digits(hours)?;
    let minutes = two_digits(minutes)?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn two_digits(part: &str) -> Option<i32> {
    if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
