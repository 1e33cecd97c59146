//! In-memory `.xlsx` writer for tests.

use crate::spreadsheet::reference::index_to_reference;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const MAIN_NAMESPACE: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIP_NAMESPACE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A cell value written by [`WorkbookBuilder`].
#[derive(Clone, Debug)]
pub(crate) enum Value {
    /// Inline string
    Text(String),
    /// Shared string table entry
    Shared(String),
    /// Plain number
    Number(f64),
    /// Serial date with the built-in `m/d/yyyy` style
    Date(f64),
    /// Error value such as `#N/A`
    Error(String),
    /// No cell at all
    Blank,
}

pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_owned())
}

pub(crate) fn shared(value: &str) -> Value {
    Value::Shared(value.to_owned())
}

pub(crate) fn number(value: f64) -> Value {
    Value::Number(value)
}

pub(crate) fn date(serial: f64) -> Value {
    Value::Date(serial)
}

enum Part {
    Cells(BTreeMap<(usize, usize), Value>),
    Raw(String),
    Missing,
}

/// Builds a workbook package with the given sheets.
#[derive(Default)]
pub(crate) struct WorkbookBuilder {
    sheets: Vec<(String, Part)>,
}

impl WorkbookBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet whose `rows[i]` is written at row `first_row + i`, from column A.
    pub(crate) fn sheet(mut self, name: &str, first_row: usize, rows: Vec<Vec<Value>>) -> Self {
        let mut cells = BTreeMap::new();
        for (offset, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                if !matches!(value, Value::Blank) {
                    cells.insert((first_row + offset, col), value);
                }
            }
        }
        self.sheets.push((name.to_owned(), Part::Cells(cells)));
        self
    }

    /// Adds a sheet with literal worksheet XML.
    pub(crate) fn raw_sheet(mut self, name: &str, xml: &str) -> Self {
        self.sheets.push((name.to_owned(), Part::Raw(xml.to_owned())));
        self
    }

    /// Declares a sheet in the workbook without writing its part.
    pub(crate) fn missing_sheet(mut self, name: &str) -> Self {
        self.sheets.push((name.to_owned(), Part::Missing));
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let options = SimpleFileOptions::default();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut shared_strings = Vec::<String>::new();
        let mut sheet_entries = String::new();
        let mut relationships = String::new();

        for (index, (name, part)) in self.sheets.iter().enumerate() {
            let id = index + 1;
            sheet_entries.push_str(&format!(r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#, escape(name)));
            relationships.push_str(&format!(
                r#"<Relationship Id="rId{id}" Type="{RELATIONSHIP_NAMESPACE}/worksheet" Target="worksheets/sheet{id}.xml"/>"#
            ));
            let xml = match part {
                Part::Cells(cells) => worksheet_xml(cells, &mut shared_strings),
                Part::Raw(xml) => xml.to_owned(),
                Part::Missing => continue,
            };
            write_part(&mut writer, &format!("xl/worksheets/sheet{id}.xml"), &xml, options);
        }
        relationships.push_str(&format!(
            r#"<Relationship Id="rIdStyles" Type="{RELATIONSHIP_NAMESPACE}/styles" Target="styles.xml"/>"#
        ));

        write_part(&mut writer, "xl/workbook.xml", &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{MAIN_NAMESPACE}" xmlns:r="{RELATIONSHIP_NAMESPACE}"><workbookPr/><sheets>{sheet_entries}</sheets></workbook>"#
        ), options);
        write_part(&mut writer, "xl/_rels/workbook.xml.rels", &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
        ), options);
        write_part(&mut writer, "xl/styles.xml", &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><styleSheet xmlns="{MAIN_NAMESPACE}"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/></cellXfs></styleSheet>"#
        ), options);
        if !shared_strings.is_empty() {
            let items: String = shared_strings
                .iter()
                .map(|string| format!("<si><t>{}</t></si>", escape(string)))
                .collect();
            write_part(&mut writer, "xl/sharedStrings.xml", &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="{MAIN_NAMESPACE}" count="{0}" uniqueCount="{0}">{items}</sst>"#,
                shared_strings.len()
            ), options);
        }

        writer.finish().expect("finish test workbook").into_inner()
    }
}

fn worksheet_xml(cells: &BTreeMap<(usize, usize), Value>, shared_strings: &mut Vec<String>) -> String {
    let mut rows = BTreeMap::<usize, String>::new();
    for ((row, col), value) in cells {
        let reference = index_to_reference(*row, *col);
        let cell = match value {
            Value::Text(text) => format!(r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#, escape(text)),
            Value::Shared(text) => {
                shared_strings.push(text.to_owned());
                format!(r#"<c r="{reference}" t="s"><v>{}</v></c>"#, shared_strings.len() - 1)
            }
            Value::Number(number) => format!(r#"<c r="{reference}"><v>{number}</v></c>"#),
            Value::Date(serial) => format!(r#"<c r="{reference}" s="1"><v>{serial}</v></c>"#),
            Value::Error(error) => format!(r#"<c r="{reference}" t="e"><v>{}</v></c>"#, escape(error)),
            Value::Blank => continue,
        };
        rows.entry(*row).or_default().push_str(&cell);
    }
    let data: String = rows
        .iter()
        .map(|(row, cells)| format!(r#"<row r="{}">{cells}</row>"#, row + 1))
        .collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="{MAIN_NAMESPACE}"><sheetData>{data}</sheetData></worksheet>"#)
}

fn write_part(writer: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, content: &str, options: SimpleFileOptions) {
    writer.start_file(name, options).expect("start test part");
    writer.write_all(content.as_bytes()).expect("write test part");
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
