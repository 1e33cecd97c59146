use crate::export::ColumnWindow;
use crate::export::ExportLayout;
use crate::export::PostRecord;
use crate::spreadsheet::Sheet;
use tracing::debug;

/// Reads one ranked table from the rows below the header row.
///
/// Fields are assigned by position. Rows without a URL, or whose URL lacks
/// the layout's host, are dropped; the first `top_posts` remaining rows are
/// kept in sheet order.
pub(super) fn read_post_table(sheet: &Sheet, header_row: usize, window: &ColumnWindow, layout: &ExportLayout) -> Vec<PostRecord> {
    let mut foreign = 0usize;
    let mut posts = Vec::<PostRecord>::new();
    for row in sheet.rows_after(header_row) {
        let url = match sheet.value(row, window.url) {
            Some(cell) if cell.kind.is_text() => cell.value.trim(),
            Some(cell) => {
                debug!(sheet = %sheet.name(), cell = %cell.reference(), "post URL cell is not text");
                foreign += 1;
                continue;
            }
            None => continue,
        };
        if !url.contains(layout.host.as_str()) {
            foreign += 1;
            continue;
        }
        posts.push(PostRecord {
            url: url.to_owned(),
            date: sheet.value(row, window.date).map(|cell| cell.to_string().trim().to_owned()),
            metric: sheet.value(row, window.metric).and_then(|cell| cell.to_number()),
        });
    }
    if foreign > 0 {
        debug!(sheet = %sheet.name(), url_column = window.url, foreign, "dropped rows without a matching post URL");
    }
    posts.truncate(layout.top_posts);
    posts
}
