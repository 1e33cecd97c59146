//! Event-level access to the XML parts of a workbook package.
use crate::error::ExportError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Unknown XML entity '&{0};'")]
    UnknownEntity(String),

    #[error("Attribute '{name}' has invalid value '{value}'")]
    InvalidAttribute { name: String, value: String },
}

/// Pull reader over one part. `<a/>` is reported as `Start` + `End`, and
/// mismatched end tags are tolerated.
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(source: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.expand_empty_elements = true;
        XmlReader { reader, buffer: Vec::with_capacity(1024) }
    }

    /// Next event, or `None` once the part is exhausted.
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, ExportError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer)? {
            Event::Eof => Ok(None),
            event => Ok(Some(event)),
        }
    }
}

/// Attribute lookup on a start tag, values unescaped.
pub(crate) trait AttributeLookup<'a> {
    /// Value of the attribute with this exact (possibly prefixed) name.
    fn attribute(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, ExportError>;

    /// Value of the first attribute whose name without namespace prefix matches,
    /// so `r:id` is found as `id`.
    fn local_attribute(&'a self, local_name: &[u8]) -> Result<Option<Cow<'a, str>>, ExportError>;

    /// Parsed attribute value; an empty value counts as absent.
    fn parse_attribute<T: FromStr>(&self, name: &str) -> Result<Option<T>, ExportError>;
}

impl<'a> AttributeLookup<'a> for BytesStart<'a> {
    fn attribute(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, ExportError> {
        match self.try_get_attribute(name)? {
            Some(attribute) => Ok(Some(attribute.unescape_value()?)),
            None => Ok(None),
        }
    }

    fn local_attribute(&'a self, local_name: &[u8]) -> Result<Option<Cow<'a, str>>, ExportError> {
        for attribute in self.attributes() {
            let attribute = attribute?;
            if attribute.key.local_name().as_ref() == local_name {
                return Ok(Some(attribute.unescape_value()?));
            }
        }
        Ok(None)
    }

    fn parse_attribute<T: FromStr>(&self, name: &str) -> Result<Option<T>, ExportError> {
        let attribute = match self.try_get_attribute(name)? {
            Some(attribute) if !attribute.value.is_empty() => attribute,
            _ => return Ok(None),
        };
        let value = attribute.unescape_value()?;
        match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(XmlError::InvalidAttribute {
                name: name.to_owned(),
                value: value.to_string(),
            }
            .into()),
        }
    }
}

/// Accumulates element text across text, CDATA and reference events.
pub(crate) trait XmlTextBuffer {
    fn push_text(&mut self, text: &BytesText) -> Result<(), ExportError>;

    /// Appends a predefined entity (`&amp;`) or character reference (`&#38;`, `&#x26;`).
    fn push_reference(&mut self, reference: &BytesRef) -> Result<(), ExportError>;
}

impl XmlTextBuffer for String {
    fn push_text(&mut self, text: &BytesText) -> Result<(), ExportError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_reference(&mut self, reference: &BytesRef) -> Result<(), ExportError> {
        let name = reference.xml_content()?;
        let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
            Some(hex) => Some(u32::from_str_radix(hex, 16)?),
            None => name.strip_prefix('#').map(str::parse::<u32>).transpose()?,
        };
        match code {
            // Invalid scalar values (lone surrogates) are dropped
            Some(code) => self.extend(char::from_u32(code)),
            None => self.push_str(resolve_xml_entity(&name).ok_or_else(|| XmlError::UnknownEntity(name.to_string()))?),
        }
        Ok(())
    }
}

/// Loops over the events of an [`XmlReader`] until the end of the part,
/// dispatching to the given arms and skipping everything else.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::name::QName;

    fn collect_text(xml: &str) -> Result<String, ExportError> {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Text(event) => text.push_text(&event)?,
            Event::GeneralRef(event) => text.push_reference(&event)?,
        });
        Ok(text)
    }

    #[test]
    fn resolves_entities_and_character_references() {
        let text = collect_text("<t>Sales &amp; Marketing &#38; &#x263A;</t>").unwrap();
        assert_eq!(text, "Sales & Marketing & \u{263A}");
    }

    #[test]
    fn rejects_unknown_entity() {
        let error = collect_text("<t>&bogus;</t>").err().expect("unknown entity");
        assert_eq!(error.to_string(), "Unknown XML entity '&bogus;'");
    }

    #[test]
    fn reads_and_parses_attributes() -> Result<(), ExportError> {
        let mut reader = XmlReader::new(r#"<c r="B2" s="3" t="" r:id="rId7" v="x"/>"#.as_bytes());
        let mut seen = false;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == QName(b"c") => {
                assert_eq!(event.attribute("r")?.as_deref(), Some("B2"));
                assert_eq!(event.parse_attribute::<usize>("s")?, Some(3));
                assert_eq!(event.parse_attribute::<usize>("t")?, None);
                assert_eq!(event.attribute("missing")?, None);
                assert_eq!(event.local_attribute(b"id")?.as_deref(), Some("rId7"));
                assert!(event.parse_attribute::<usize>("v").is_err());
                seen = true;
            }
        });
        assert!(seen);
        Ok(())
    }
}
