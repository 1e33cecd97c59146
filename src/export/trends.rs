use crate::error::ExportError;
use crate::export::require_column;
use crate::export::ExportLayout;
use crate::export::ExtractError;
use crate::export::TrendPoint;
use crate::spreadsheet::Workbook;
use std::collections::BTreeMap;

/// Loads the daily series of the trends sheet verbatim.
///
/// The first row is the header; every later row with a date becomes a point
/// holding each other column whose value is numeric.
pub(super) fn load_trends(workbook: &mut Workbook<'_>, layout: &ExportLayout) -> Result<Vec<TrendPoint>, ExportError> {
    let sheet_name = layout.trends_sheet.as_str();
    let sheet = workbook
        .read_sheet(sheet_name)?
        .ok_or_else(|| ExtractError::SheetNotFound(sheet_name.to_owned()))?;
    let header_row = sheet.rows().next().unwrap_or_default();
    let header = sheet.header(header_row);
    let date_column = require_column(&header, sheet_name, &layout.trends_date_column)?;
    let metric_columns: Vec<(&String, usize)> = header
        .iter()
        .filter(|(_, col)| **col != date_column)
        .map(|(name, col)| (name, *col))
        .collect();

    let points = sheet
        .rows_after(header_row)
        .filter_map(|row| {
            let date = sheet.value(row, date_column)?.to_string().trim().to_owned();
            let metrics: BTreeMap<String, f64> = metric_columns
                .iter()
                .filter_map(|(name, col)| {
                    let value = sheet.value(row, *col)?.to_number()?;
                    Some((name.to_string(), value))
                })
                .collect();
            Some(TrendPoint { date, metrics })
        })
        .collect();
    Ok(points)
}
