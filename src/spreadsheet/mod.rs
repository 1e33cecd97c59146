//! # Workbook Reading Module
//!
//! Reads Office Open XML workbooks (`.xlsx`, `.xlsm`) held in memory. The
//! reader resolves the sheet list, number formats and shared strings up
//! front, then materialises individual worksheets as sparse cell grids
//! addressed by 0-based `(row, column)` indexes.
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

pub use sheet::Sheet;
pub use xlsx::Workbook;

/// Errors raised by the structure of a workbook package.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// A required part is missing from the package
    #[error("Missing '{0}' in workbook package")]
    FileError(String),

    /// The workbook is an encrypted package
    #[error("Workbook is password protected")]
    PasswordProtectedError,

    /// The workbook is a legacy binary (.xls) file
    #[error("Legacy binary workbooks are not supported, save the file as .xlsx")]
    LegacyFormatError,

    /// The workbook declares no worksheets
    #[error("Workbook contains no worksheets")]
    EmptyError,

    /// A cell references a shared string that does not exist
    #[error("Shared string index '{0}' out of range")]
    SharedStringError(usize),
}
