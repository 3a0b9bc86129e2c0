//! armpup - Are My Photos Uploaded?
//!
//! Checks a folder of photos against a Google Photos library by matching
//! each photo's EXIF capture time to a remote item's creation time. Remote
//! items are fetched one day-window at a time and cached per UTC day, so a
//! folder of a few hundred photos costs a handful of searches.

pub mod app;
pub mod auth;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod output;
pub mod paths;
pub mod platform;
pub mod progress;
pub mod reconcile;
pub mod scanner;
pub mod signal;

pub use app::run_app;
