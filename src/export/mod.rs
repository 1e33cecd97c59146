//! # Content Export Extraction
//!
//! Turns a LinkedIn content export workbook into ranked post tables and
//! optional audience and trend enrichments.
//!
//! The vendor layout is undocumented, so it is read positionally: the top
//! posts sheet holds two three-column tables side by side below a header row
//! containing `Post URL`, engagement-ranked in columns A–C and
//! impression-ranked in columns E–G. Column D is an intentional gap. Every
//! fixed value of that contract lives in [`ExportLayout`].
//!
//! Only two conditions abort an extraction: the workbook cannot be opened
//! (which includes a missing top posts sheet) and the header row cannot be
//! found. Demographics and trends degrade to empty collections.
use crate::error::ExportError;
use crate::spreadsheet::Workbook;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

mod demographics;
mod posts;
pub mod report;
mod trends;

/// Errors raised when a workbook does not follow the export layout.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A sheet named by the layout is absent
    #[error("Worksheet named '{0}' not found")]
    SheetNotFound(String),

    /// No row of the sheet contains the header label
    #[error("Could not find '{label}' header in sheet '{sheet}'")]
    MissingHeaderRow { sheet: String, label: String },

    /// A header row lacks a column the layout needs
    #[error("Missing column '{column}' in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },
}

/// Outcome of one extraction: the record set, or the reason it aborted.
pub type ExtractionResult = Result<ExportData, ExportError>;

/// Positions of one ranked table inside the top posts sheet (0-based columns).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColumnWindow {
    /// Post URL column
    pub url: usize,
    /// Publish date column
    pub date: usize,
    /// Engagement or impression count column
    pub metric: usize,
}

/// Columns A–C: posts ranked by engagements.
pub const ENGAGEMENT_WINDOW: ColumnWindow = ColumnWindow { url: 0, date: 1, metric: 2 };

/// Columns E–G: posts ranked by impressions.
pub const IMPRESSIONS_WINDOW: ColumnWindow = ColumnWindow { url: 4, date: 5, metric: 6 };

/// Fixed layout contract of the vendor export.
#[derive(Clone, Debug)]
pub struct ExportLayout {
    /// Sheet holding both ranked tables
    pub posts_sheet: String,
    /// Cell text identifying the header row of the ranked tables
    pub header_label: String,
    /// Substring every accepted post URL contains
    pub host: String,
    pub engagement_window: ColumnWindow,
    pub impressions_window: ColumnWindow,
    /// Rows kept per ranked table
    pub top_posts: usize,
    pub demographics_sheet: String,
    pub demographics_category_column: String,
    pub demographics_label_column: String,
    pub demographics_percentage_column: String,
    /// Category retained from the demographics sheet
    pub demographics_category: String,
    pub demographics_limit: usize,
    pub trends_sheet: String,
    pub trends_date_column: String,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            posts_sheet: "TOP POSTS".to_owned(),
            header_label: "Post URL".to_owned(),
            host: "linkedin.com".to_owned(),
            engagement_window: ENGAGEMENT_WINDOW,
            impressions_window: IMPRESSIONS_WINDOW,
            top_posts: 10,
            demographics_sheet: "DEMOGRAPHICS".to_owned(),
            demographics_category_column: "Top Demographics".to_owned(),
            demographics_label_column: "Value".to_owned(),
            demographics_percentage_column: "Percentage".to_owned(),
            demographics_category: "Job titles".to_owned(),
            demographics_limit: 5,
            trends_sheet: "ENGAGEMENT".to_owned(),
            trends_date_column: "Date".to_owned(),
        }
    }
}

/// One row of a ranked post table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub url: String,
    /// Publish date as displayed by the export, kept opaque
    pub date: Option<String>,
    /// Engagements or impressions, depending on the table
    pub metric: Option<f64>,
}

/// Share of the audience holding one job title.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemographicEntry {
    pub label: String,
    /// Fraction in [0, 1]
    pub percentage: f64,
}

/// One row of the trends sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    /// Metric name to value, for every numeric column of the row
    pub metrics: BTreeMap<String, f64>,
}

/// Record set extracted from one export workbook.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    pub top_by_engagement: Vec<PostRecord>,
    pub top_by_impressions: Vec<PostRecord>,
    pub demographics: Vec<DemographicEntry>,
    pub trends: Vec<TrendPoint>,
}

/// Extracts [`ExportData`] from workbooks following an [`ExportLayout`].
#[derive(Clone, Debug, Default)]
pub struct Extractor {
    layout: ExportLayout,
}

impl Extractor {
    pub fn new(layout: ExportLayout) -> Self {
        Self { layout }
    }

    /// Extracts the record set from raw workbook bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bytes are not a readable workbook
    /// - The top posts sheet is missing or unreadable
    /// - No row of the top posts sheet contains the header label
    pub fn extract(&self, bytes: &[u8]) -> ExtractionResult {
        let layout = &self.layout;
        let mut workbook = Workbook::from_bytes(bytes)?;
        let Some(sheet) = workbook.read_sheet(&layout.posts_sheet)? else {
            debug!(sheet = %layout.posts_sheet, available = ?workbook.sheet_names(), "top posts sheet missing");
            return Err(ExtractError::SheetNotFound(layout.posts_sheet.to_owned()).into());
        };
        let header_row = sheet
            .find_row_with(&layout.header_label)
            .ok_or_else(|| ExtractError::MissingHeaderRow {
                sheet: layout.posts_sheet.to_owned(),
                label: layout.header_label.to_owned(),
            })?;
        debug!(sheet = %layout.posts_sheet, header_row, "located ranked tables");

        let top_by_engagement = posts::read_post_table(&sheet, header_row, &layout.engagement_window, layout);
        let top_by_impressions = posts::read_post_table(&sheet, header_row, &layout.impressions_window, layout);
        let demographics = enrichment("demographics", demographics::load_demographics(&mut workbook, layout))
            .unwrap_or_default();
        let trends = enrichment("trends", trends::load_trends(&mut workbook, layout))
            .unwrap_or_default();

        info!(
            engagement = top_by_engagement.len(),
            impressions = top_by_impressions.len(),
            demographics = demographics.len(),
            trends = trends.len(),
            "extracted content export"
        );
        Ok(ExportData {
            top_by_engagement,
            top_by_impressions,
            demographics,
            trends,
        })
    }
}

/// Extracts with the default vendor layout.
pub fn extract(bytes: &[u8]) -> ExtractionResult {
    Extractor::default().extract(bytes)
}

/// Keeps an optional dataset, logging instead of propagating its failure.
fn enrichment<T>(name: &str, result: Result<Vec<T>, ExportError>) -> Option<Vec<T>> {
    match result {
        Ok(records) => Some(records),
        Err(error) => {
            warn!(enrichment = name, %error, "enrichment unavailable");
            None
        }
    }
}

/// Resolves a named column of a header row.
fn require_column(
    header: &HashMap<String, usize>,
    sheet: &str,
    column: &str,
) -> Result<usize, ExtractError> {
    header
        .get(column)
        .copied()
        .ok_or_else(|| ExtractError::MissingColumn {
            sheet: sheet.to_owned(),
            column: column.to_owned(),
        })
}
