use crate::error::ExportError;
use crate::export::require_column;
use crate::export::DemographicEntry;
use crate::export::ExportLayout;
use crate::export::ExtractError;
use crate::spreadsheet::Workbook;
use tracing::debug;

/// Loads the audience breakdown for the layout's category.
///
/// The first row of the sheet is its header. The first `demographics_limit`
/// rows of the category are kept; of those, a row without a label or whose
/// percentage is not a fraction in [0, 1] yields no entry and is not replaced
/// by a later row.
pub(super) fn load_demographics(workbook: &mut Workbook<'_>, layout: &ExportLayout) -> Result<Vec<DemographicEntry>, ExportError> {
    let sheet_name = layout.demographics_sheet.as_str();
    let sheet = workbook
        .read_sheet(sheet_name)?
        .ok_or_else(|| ExtractError::SheetNotFound(sheet_name.to_owned()))?;
    let header_row = sheet.rows().next().unwrap_or_default();
    let header = sheet.header(header_row);
    let category_col = require_column(&header, sheet_name, &layout.demographics_category_column)?;
    let label_col = require_column(&header, sheet_name, &layout.demographics_label_column)?;
    let percentage_col = require_column(&header, sheet_name, &layout.demographics_percentage_column)?;

    let entries = sheet
        .rows_after(header_row)
        .filter(|row| {
            sheet
                .value(*row, category_col)
                .is_some_and(|cell| cell.to_string().trim() == layout.demographics_category)
        })
        .take(layout.demographics_limit)
        .filter_map(|row| {
            let Some(label) = sheet.value(row, label_col).map(|cell| cell.to_string().trim().to_owned()) else {
                debug!(sheet = %sheet_name, row, "skipped demographic row without label");
                return None;
            };
            let raw = sheet.value(row, percentage_col).map(|cell| cell.value.as_str()).unwrap_or_default();
            match sheet.value(row, percentage_col).and_then(|cell| cell.to_fraction()) {
                Some(fraction) if (0.0..=1.0).contains(&fraction) => Some(DemographicEntry { label, percentage: fraction }),
                _ => {
                    debug!(sheet = %sheet_name, row, %label, percentage = raw, "skipped demographic row without a fraction in [0, 1]");
                    None
                }
            }
        })
        .collect();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn header() -> Vec<Value> {
        vec![text("Top Demographics"), text("Value"), text("Percentage")]
    }

    fn row(category: &str, label: &str, percentage: Value) -> Vec<Value> {
        vec![shared(category), shared(label), percentage]
    }

    fn load(bytes: &[u8]) -> Result<Vec<DemographicEntry>, ExportError> {
        let mut workbook = Workbook::from_bytes(bytes).unwrap();
        load_demographics(&mut workbook, &ExportLayout::default())
    }

    #[test]
    fn keeps_first_five_job_titles() {
        let mut rows = vec![header(), row("Locations", "Berlin", number(0.2))];
        for index in 0..7 {
            rows.push(row("Job titles", &format!("Title {index}"), number(0.1)));
        }
        rows.push(row("Industries", "Software", number(0.3)));
        let bytes = WorkbookBuilder::new().sheet("DEMOGRAPHICS", 0, rows).build();

        let entries = load(&bytes).unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0], DemographicEntry { label: "Title 0".to_owned(), percentage: 0.1 });
        assert_eq!(entries[4].label, "Title 4");
    }

    #[test]
    fn percentages_are_fractions() {
        let bytes = WorkbookBuilder::new()
            .sheet("DEMOGRAPHICS", 0, vec![
                header(),
                row("Job titles", "Founder", number(0.084)),
                row("Job titles", "Chief Executive Officer", text("< 1%")),
                row("Job titles", "Engineer", text("12%")),
                row("Job titles", "Pre-multiplied", number(12.0)),
                row("Job titles", "Unknown", text("n/a")),
            ])
            .build();

        let entries = load(&bytes).unwrap();
        let fractions: Vec<f64> = entries.iter().map(|entry| entry.percentage).collect();
        assert_eq!(fractions, vec![0.084, 0.01, 0.12]);
        assert!(entries.iter().all(|entry| (0.0..=1.0).contains(&entry.percentage)));
    }

    #[test]
    fn header_may_start_below_first_row() {
        let bytes = WorkbookBuilder::new()
            .sheet("DEMOGRAPHICS", 2, vec![header(), row("Job titles", "Founder", number(0.5))])
            .build();

        let entries = load(&bytes).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn unusable_rows_count_towards_the_limit() {
        let mut rows = vec![header(), row("Job titles", "A", text("n/a"))];
        for label in ["B", "C", "D", "E", "F"] {
            rows.push(row("Job titles", label, number(0.1)));
        }
        let bytes = WorkbookBuilder::new().sheet("DEMOGRAPHICS", 0, rows).build();

        let labels: Vec<String> = load(&bytes).unwrap().into_iter().map(|entry| entry.label).collect();
        assert_eq!(labels, vec!["B", "C", "D", "E"]);
    }

    #[test]
    fn missing_sheet_or_column_is_an_error() {
        let bytes = WorkbookBuilder::new().sheet("TOP POSTS", 0, vec![vec![text("Post URL")]]).build();
        assert!(matches!(
            load(&bytes),
            Err(ExportError::ExtractError(ExtractError::SheetNotFound(_)))
        ));

        let bytes = WorkbookBuilder::new()
            .sheet("DEMOGRAPHICS", 0, vec![vec![text("Top Demographics"), text("Value")]])
            .build();
        let error = load(&bytes).err().expect("missing Percentage column");
        assert_eq!(error.to_string(), "Missing column 'Percentage' in sheet 'DEMOGRAPHICS'");
    }

    #[test]
    fn empty_sheet_is_an_error() {
        let bytes = WorkbookBuilder::new().sheet("DEMOGRAPHICS", 0, vec![]).build();
        assert!(load(&bytes).is_err());
    }
}
