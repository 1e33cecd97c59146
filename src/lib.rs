//! # Content Export Extractor
//!
//! Reads the analytics workbook a LinkedIn creator downloads from the
//! platform ("content export") and extracts the historical post statistics it
//! holds, so a draft can be compared against what performed well before.
//!
//! ## Features
//!
//! - **Ranked post tables**: the top posts by engagements and by impressions,
//!   read from the fixed side-by-side layout of the `TOP POSTS` sheet
//! - **Audience demographics**: the leading job titles of the audience as
//!   fractions, when the export carries them
//! - **Trends**: the daily engagement series, verbatim
//! - **Pure Rust workbook reader**: `.xlsx` packages are parsed from memory,
//!   no spreadsheet application needed
//! - **Reports**: a JSON report and a plain-text summary
//!
//! ## Example
//!
//! ```no_run
//! let bytes = std::fs::read("Content_2024-01-01_2024-03-31.xlsx")?;
//! let data = content_export::extract(&bytes)?;
//! for post in &data.top_by_engagement {
//!     println!("{} {:?}", post.url, post.metric);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod error;
pub mod export;
mod helpers;
pub mod spreadsheet;

#[cfg(test)]
mod testing;

pub use error::ExportError;
pub use export::extract;
pub use export::report::render_summary;
pub use export::report::ExtractionReport;
pub use export::ExportData;
pub use export::ExportLayout;
pub use export::ExtractionResult;
pub use export::Extractor;
