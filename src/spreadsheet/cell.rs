use crate::spreadsheet::reference::index_to_reference;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::TimeDelta;
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

/// First serial past 9999-12-31 in the 1900 date system.
const MAX_DATE_SERIAL: f64 = 2_958_466.0;

/// Percentages as exported in text form: "12%", "12.5 %", "< 1%".
static PERCENTAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<?\s*(\d+(?:\.\d+)?)\s*%$").expect("Hardcode regex pattern")
});

/// Types of cell data in a worksheet.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references, resolved to their text when the cell is read
    SharedString,
    /// Error values ("#N/A", "#REF!", ...)
    Error,
}

impl CellType {
    /// Parses built-in number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format codes to determine cell type.
    /// Literals, escapes and bracketed sections (colors, locales) are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_color && !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }

    pub(crate) fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Number
                | Self::NumberDateTime1900
                | Self::NumberDate1900
                | Self::NumberTime1900
                | Self::NumberDateTime1904
                | Self::NumberDate1904
                | Self::NumberTime1904
        )
    }

    pub(crate) fn is_text(&self) -> bool {
        matches!(self, Self::InlineString | Self::SharedString)
    }
}

/// Represents a single cell in a worksheet with position, type, and value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the worksheet (shared strings already resolved)
    pub(crate) value: String,
}

impl Cell {
    /// Returns the A1-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// True when the cell holds nothing but whitespace.
    pub(crate) fn is_blank(&self) -> bool {
        self.kind == CellType::Empty || self.value.trim().is_empty()
    }

    /// Converts the stored value to double-precision floating point.
    pub(crate) fn to_double(&self) -> Result<f64, String> {
        self.value.trim().parse::<f64>().map_err(|_| format!("parse '{}' to double failed", self.value))
    }

    /// Reads the cell as a number: numeric cells directly, text cells after
    /// removing thousands separators ("12,345").
    pub(crate) fn to_number(&self) -> Option<f64> {
        if self.kind.is_numeric() {
            self.to_double().ok()
        } else if self.kind.is_text() {
            self.value.trim().replace(',', "").parse::<f64>().ok()
        } else {
            None
        }
    }

    /// Reads the cell as a fraction in [0, 1]: numeric cells directly,
    /// text percentages ("12%", "< 1%") divided by 100.
    pub(crate) fn to_fraction(&self) -> Option<f64> {
        if self.kind.is_text() {
            if let Some(captures) = PERCENTAGE_PATTERN.captures(self.value.trim()) {
                return captures[1].parse::<f64>().ok().map(|percent| percent / 100.0);
            }
        }
        self.to_number()
    }

    /// Converts a serial date number to a timestamp, honouring the epoch.
    /// Serials outside the calendar Excel can display (before 0 or after
    /// 9999-12-31) and non-finite values have no timestamp.
    fn to_naive_datetime(&self, is_1904: bool) -> Option<NaiveDateTime> {
        let serial = self.to_double().ok().filter(|serial| (0.0..MAX_DATE_SERIAL).contains(serial))?;
        let days = serial.trunc() as i64;
        // Serial 60 is the phantom 1900-02-29 kept for Lotus 1-2-3 compatibility
        let offset = if is_1904 {
            1_462
        } else if days < 60 {
            1
        } else {
            0
        };
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        let milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
        epoch
            .checked_add_signed(TimeDelta::try_days(days.checked_add(offset)?)?)?
            .checked_add_signed(TimeDelta::try_milliseconds(milliseconds)?)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formatted = match self.kind {
            CellType::Boolean => Some(if self.value == "1" { "true" } else { "false" }.to_owned()),
            CellType::NumberDate1900 | CellType::NumberDate1904 => self
                .to_naive_datetime(self.kind == CellType::NumberDate1904)
                .map(|datetime| datetime.format("%Y-%m-%d").to_string()),
            CellType::NumberDateTime1900 | CellType::NumberDateTime1904 => self
                .to_naive_datetime(self.kind == CellType::NumberDateTime1904)
                .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
            CellType::NumberTime1900 | CellType::NumberTime1904 => self
                .to_naive_datetime(false)
                .map(|datetime| datetime.format("%H:%M:%S").to_string()),
            CellType::IsoDateTime => Some(self.value.replace('T', " ")),
            _ => None,
        };
        // Malformed serial numbers keep their raw text
        write!(f, "{}", formatted.as_deref().unwrap_or(self.value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell { row: 0, col: 0, kind, value: value.to_owned() }
    }

    #[test]
    fn builtin_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("3", false), None);
    }

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("m/d/yy h:mm", false), CellType::NumberDateTime1900);
        assert_eq!(CellType::parse_custom_number_format("hh:mm:ss", true), CellType::NumberTime1904);
        assert_eq!(CellType::parse_custom_number_format("#,##0", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("0.0\"days\"", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
    }

    #[test]
    fn dates_render_as_iso() {
        assert_eq!(cell(CellType::NumberDate1900, "45306").to_string(), "2024-01-15");
        assert_eq!(cell(CellType::NumberDate1900, "1").to_string(), "1900-01-01");
        assert_eq!(cell(CellType::NumberDate1900, "61").to_string(), "1900-03-01");
        assert_eq!(cell(CellType::NumberDate1904, "0").to_string(), "1904-01-01");
        assert_eq!(cell(CellType::NumberDateTime1900, "45306.5").to_string(), "2024-01-15 12:00:00");
        assert_eq!(cell(CellType::NumberTime1900, "0.75").to_string(), "18:00:00");
        assert_eq!(cell(CellType::IsoDateTime, "2024-01-15T08:30:00").to_string(), "2024-01-15 08:30:00");
    }

    #[test]
    fn malformed_dates_keep_raw_text() {
        assert_eq!(cell(CellType::NumberDate1900, "n/a").to_string(), "n/a");
    }

    #[test]
    fn out_of_range_serials_keep_raw_text() {
        assert_eq!(cell(CellType::NumberDate1900, "2958465").to_string(), "9999-12-31");
        assert_eq!(cell(CellType::NumberDate1900, "2958466").to_string(), "2958466");
        assert_eq!(cell(CellType::NumberDate1900, "1E+15").to_string(), "1E+15");
        assert_eq!(cell(CellType::NumberDateTime1904, "1e300").to_string(), "1e300");
        assert_eq!(cell(CellType::NumberTime1900, "-0.5").to_string(), "-0.5");
        assert_eq!(cell(CellType::NumberDate1900, "NaN").to_string(), "NaN");
        assert_eq!(cell(CellType::NumberDate1900, "inf").to_string(), "inf");
    }

    #[test]
    fn numbers() {
        assert_eq!(cell(CellType::Number, "1234").to_number(), Some(1234.0));
        assert_eq!(cell(CellType::InlineString, " 12,345 ").to_number(), Some(12345.0));
        assert_eq!(cell(CellType::SharedString, "many").to_number(), None);
        assert_eq!(cell(CellType::Error, "#N/A").to_number(), None);
        assert_eq!(cell(CellType::Boolean, "1").to_number(), None);
    }

    #[test]
    fn fractions() {
        assert_eq!(cell(CellType::Number, "0.25").to_fraction(), Some(0.25));
        assert_eq!(cell(CellType::InlineString, "12%").to_fraction(), Some(0.12));
        assert_eq!(cell(CellType::SharedString, "< 1%").to_fraction(), Some(0.01));
        assert_eq!(cell(CellType::InlineString, "0.3").to_fraction(), Some(0.3));
        assert_eq!(cell(CellType::InlineString, "unknown").to_fraction(), None);
    }

    #[test]
    fn blank_cells() {
        assert!(cell(CellType::InlineString, "  ").is_blank());
        assert!(cell(CellType::Empty, "x").is_blank());
        assert!(!cell(CellType::Number, "0").is_blank());
        assert_eq!(cell(CellType::Number, "0").reference(), "A1");
    }
}
