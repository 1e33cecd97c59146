//! Office Open XML package helpers shared by the workbook reader
use crate::error::ExportError;
use crate::helpers::xml::AttributeLookup;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Cursor;
use zip::ZipArchive;

/// In-memory reader over the uploaded workbook bytes
pub(crate) type WorkbookReader<'a> = Cursor<&'a [u8]>;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Signature of an OLE compound file, the container of encrypted packages and legacy workbooks
const COMPOUND_FILE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Opens the zip container of a workbook held in memory
///
/// # Arguments
/// * `bytes` - Raw workbook content
///
/// # Returns
/// Zip archive handle over the bytes
pub(super) fn open(bytes: &[u8]) -> Result<ZipArchive<WorkbookReader<'_>>, ExportError> {
    if bytes.starts_with(&COMPOUND_FILE_SIGNATURE) {
        if is_password_protected(bytes) {
            Err(SpreadsheetError::PasswordProtectedError)?
        } else {
            Err(SpreadsheetError::LegacyFormatError)?
        }
    }
    Ok(ZipArchive::new(Cursor::new(bytes))?)
}

/// Loads worksheet relationships from the package
///
/// # Arguments
/// * `zip` - Zip archive handle
/// * `path` - Path to the relationships XML part within the archive
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths
pub(super) fn load_relationships(zip: &mut ZipArchive<WorkbookReader<'_>>, path: &str) -> Result<HashMap<String, String>, ExportError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.attribute("Id")?;
            let kind = event.attribute("Type")?;
            let target = event.attribute("Target")?;
            // Only worksheet relationships point at sheet data
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Maps style indexes to cell types using custom and built-in formats
///
/// # Arguments
/// * `format_indexes` - Number format id of each cell style, in style order
/// * `custom_formats` - Custom format mappings defined in the workbook
/// * `is_1904` - Whether the workbook uses the 1904 date system
pub(super) fn load_number_formats(format_indexes: Vec<String>, custom_formats: HashMap<String, CellType>, is_1904: bool) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Normalizes a relationship target to a path inside the archive
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Checks whether a compound file carries an encrypted OOXML package
///
/// Directory entry names are stored as UTF-16LE, so the stream name is
/// searched in that encoding.
fn is_password_protected(bytes: &[u8]) -> bool {
    let name: Vec<u8> = "EncryptedPackage"
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    bytes.windows(name.len()).any(|window| window == name.as_slice())
}
