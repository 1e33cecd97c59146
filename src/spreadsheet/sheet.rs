use crate::spreadsheet::cell::Cell;
use std::collections::HashMap;
use std::ops::Range;

/// Represents a worksheet as a sparse grid of non-empty cells.
#[derive(Debug)]
pub struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in document order
    pub(crate) cells: Vec<Cell>,
    /// Position index from (row, col) to the cells vector
    indexes: HashMap<(usize, usize), usize>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            indexes: HashMap::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns the sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet, updating data ranges.
    /// A later cell at the same position replaces the earlier one.
    pub(crate) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        if let Some(index) = self.indexes.get(&(cell.row, cell.col)) {
            self.cells[*index] = cell;
        } else {
            self.indexes.insert((cell.row, cell.col), self.cells.len());
            self.cells.push(cell);
        }
    }

    /// Updates the actual data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Gets the cell at the specified position, if any.
    pub(crate) fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.indexes
            .get(&(row, col))
            .and_then(|index| self.cells.get(*index))
    }

    /// Gets the non-blank cell at the specified position.
    pub(crate) fn value(&self, row: usize, col: usize) -> Option<&Cell> {
        self.get(row, col).filter(|cell| !cell.is_blank())
    }

    /// Row indexes from the first to the last row holding data.
    pub(crate) fn rows(&self) -> Range<usize> {
        match self.row_lower_bound.zip(self.row_upper_bound) {
            Some((lower, upper)) => lower..upper + 1,
            None => 0..0,
        }
    }

    /// Rows strictly after `row` up to the last row holding data.
    pub(crate) fn rows_after(&self, row: usize) -> Range<usize> {
        match self.row_upper_bound {
            Some(upper) if row < upper => row + 1..upper + 1,
            _ => 0..0,
        }
    }

    /// Finds the first row, top to bottom, where some cell's trimmed text equals `label`.
    pub(crate) fn find_row_with(&self, label: &str) -> Option<usize> {
        self.rows().find(|row| {
            self.cells_in_row(*row)
                .any(|cell| cell.kind.is_text() && cell.value.trim() == label)
        })
    }

    /// Cells of one row, in column order.
    pub(crate) fn cells_in_row(&self, row: usize) -> impl Iterator<Item = &Cell> + '_ {
        let columns = match self.col_lower_bound.zip(self.col_upper_bound) {
            Some((lower, upper)) => lower..upper + 1,
            None => 0..0,
        };
        columns.filter_map(move |col| self.get(row, col))
    }

    /// Maps the text labels of a header row to their column indexes.
    /// The first occurrence of a repeated label wins.
    pub(crate) fn header(&self, row: usize) -> HashMap<String, usize> {
        let mut header = HashMap::<String, usize>::new();
        for cell in self.cells_in_row(row).filter(|cell| !cell.is_blank()) {
            header.entry(cell.to_string().trim().to_owned()).or_insert(cell.col);
        }
        header
    }
}
