use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::TissError;
use crate::core::formats::format_amount;

fn xml_io(e: std::io::Error) -> TissError {
    TissError::Serialization(format!("XML write error: {e}"))
}

/// Indenting element writer over an in-memory buffer.
pub(crate) struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    /// New document with a UTF-8 declaration and two-space indentation.
    pub fn new() -> Result<Self, TissError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, TissError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, TissError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, TissError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, TissError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write the element only when a value is present.
    pub fn optional_element(
        &mut self,
        name: &str,
        text: Option<&str>,
    ) -> Result<&mut Self, TissError> {
        match text {
            Some(text) => self.text_element(name, text),
            None => Ok(self),
        }
    }

    /// Monetary amount with exactly two decimals.
    pub fn amount_element(&mut self, name: &str, amount: Decimal) -> Result<&mut Self, TissError> {
        self.text_element(name, &format_amount(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn escapes_text_and_indents() {
        let mut w = XmlWriter::new().unwrap();
        w.start_element("a").unwrap();
        w.text_element("b", "x < y & z").unwrap();
        w.optional_element("c", None).unwrap();
        w.amount_element("d", dec!(10)).unwrap();
        w.end_element("a").unwrap();
        let xml = String::from_utf8(w.into_bytes()).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a>\n  <b>x &lt; y &amp; z</b>\n  <d>10.00</d>\n</a>"
        );
    }
}
