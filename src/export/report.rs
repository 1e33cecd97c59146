//! Serialised and human-readable forms of an extraction.
use crate::export::ExportData;
use crate::export::ExtractionResult;
use crate::export::PostRecord;
use serde::Serialize;
use std::fmt::Write;

const SUMMARY_DEMOGRAPHICS: usize = 3;
const SUMMARY_POSTS: usize = 5;
const SUMMARY_URL_WIDTH: usize = 50;

/// Either the record set or the failure message, never both.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionReport {
    Extracted(ExportData),
    Failed { error: String },
}

impl From<ExtractionResult> for ExtractionReport {
    fn from(result: ExtractionResult) -> Self {
        match result {
            Ok(data) => ExtractionReport::Extracted(data),
            Err(error) => ExtractionReport::Failed { error: error.to_string() },
        }
    }
}

impl ExtractionReport {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionReport::Failed { .. })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Renders the short summary shown next to a draft: the leading audience
/// job titles and the first posts of each ranked table.
pub fn render_summary(data: &ExportData) -> String {
    let mut summary = String::new();

    if !data.demographics.is_empty() {
        summary.push_str("Audience:\n");
        for entry in data.demographics.iter().take(SUMMARY_DEMOGRAPHICS) {
            let _ = writeln!(summary, "- {}: {:.1}%", entry.label, entry.percentage * 100.0);
        }
        summary.push('\n');
    }

    summary.push_str("Top posts by engagement:\n");
    push_posts(&mut summary, &data.top_by_engagement, "engagements");
    summary.push('\n');
    summary.push_str("Top posts by impressions:\n");
    push_posts(&mut summary, &data.top_by_impressions, "impressions");
    summary
}

fn push_posts(summary: &mut String, posts: &[PostRecord], unit: &str) {
    if posts.is_empty() {
        summary.push_str("(none)\n");
        return;
    }
    for (index, post) in posts.iter().take(SUMMARY_POSTS).enumerate() {
        let metric = post.metric.map(group_thousands).unwrap_or_else(|| "N/A".to_owned());
        let _ = writeln!(summary, "{}. {} - {} {}", index + 1, truncate_url(&post.url), metric, unit);
    }
}

fn truncate_url(url: &str) -> String {
    match url.char_indices().nth(SUMMARY_URL_WIDTH) {
        Some((end, _)) => format!("{}...", &url[..end]),
        None => url.to_owned(),
    }
}

/// Formats a count with comma thousands separators, rounding to an integer.
fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
