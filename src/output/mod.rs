//! Report formatters for reconciliation results.
//!
//! - HTML for browsing local photos next to their remote matches
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use armpup::capture::ExifReader;
//! use armpup::library::{DayCache, InMemorySource};
//! use armpup::output::json::JsonOutput;
//! use armpup::reconcile::Reconciler;
//!
//! let cache = DayCache::new(InMemorySource::new(Vec::new()));
//! let (reports, summary) = Reconciler::new(cache, ExifReader).run(Vec::new()).unwrap();
//!
//! let output = JsonOutput::new(&reports, &summary);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod html;
pub mod json;

pub use html::HtmlOutput;
pub use json::JsonOutput;
