use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use std::io::Write;

use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    codec::{Codec, ElementEncoder, FieldEncoder},
    encode::{ElementSink, Encoder, FieldSink, encode},
    error::{Error, Result},
};

/// Writes XML to any [`std::io::Write`] sink.
///
/// Fields become child elements named after the field; nil fields are left
/// out. Sequence items become elements named [`item`](XmlEncoder::with_item_name).
/// A flattened `"{namespace} {local}"` name is written as `local` with a
/// default namespace declaration. Scalars are written as escaped text.
pub struct XmlEncoder<W: Write> {
    writer: Writer<W>,
    item: String,
}

impl<W: Write> XmlEncoder<W> {
    /// Creates an encoder writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            writer: Writer::new(out),
            item: "item".into(),
        }
    }

    /// Sets the element name used for sequence items.
    #[must_use]
    pub fn with_item_name(mut self, name: impl Into<String>) -> Self {
        self.item = name.into();
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Writes `v` as the single element `name`.
    ///
    /// # Errors
    ///
    /// Returns the encode error of `v` or [`Error::Custom`] on I/O failure.
    pub fn encode_element(&mut self, name: &str, v: &dyn Codec) -> Result<()> {
        let (ns, local) = match name.split_once(' ') {
            Some((ns, local)) => (Some(ns), local),
            None => (None, name),
        };
        let mut start = BytesStart::new(local);
        if let Some(ns) = ns {
            start.push_attribute(("xmlns", ns));
        }
        self.write(Event::Start(start))?;
        encode(&mut *self, v)?;
        self.write(Event::End(BytesEnd::new(local)))
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(Error::custom)
    }

    fn text(&mut self, s: &str) -> Result<()> {
        self.write(Event::Text(BytesText::new(s)))
    }
}

impl<W: Write> Encoder for XmlEncoder<W> {
    fn encode_nil(&mut self) -> Result<()> {
        Ok(())
    }

    fn encode_bool(&mut self, b: bool) -> Result<()> {
        self.text(if b { "true" } else { "false" })
    }

    fn encode_i64(&mut self, v: i64) -> Result<()> {
        self.text(&v.to_string())
    }

    fn encode_u64(&mut self, v: u64) -> Result<()> {
        self.text(&v.to_string())
    }

    fn encode_f64(&mut self, v: f64) -> Result<()> {
        self.text(&v.to_string())
    }

    fn encode_str(&mut self, s: &str) -> Result<()> {
        self.text(s)
    }

    fn encode_bytes(&mut self, data: &[u8]) -> Result<()> {
        match core::str::from_utf8(data) {
            Ok(s) => self.text(s),
            Err(_) => Err(Error::NotSupported { kind: "bytes" }),
        }
    }

    fn encode_fields(&mut self, v: &dyn FieldEncoder) -> Result<()> {
        v.encode_fields(&mut Children(self))
    }

    fn encode_elements(&mut self, v: &dyn ElementEncoder) -> Result<()> {
        v.encode_elements(&mut Children(self))
    }
}

struct Children<'e, W: Write>(&'e mut XmlEncoder<W>);

impl<W: Write> FieldSink for Children<'_, W> {
    fn encode_field(&mut self, name: &str, v: &dyn Codec) -> Result<()> {
        if v.is_nil() {
            return Ok(());
        }
        self.0.encode_element(name, v)
    }
}

impl<W: Write> ElementSink for Children<'_, W> {
    fn encode_element(&mut self, v: &dyn Codec) -> Result<()> {
        let item = core::mem::take(&mut self.0.item);
        let result = self.0.encode_element(&item, v);
        self.0.item = item;
        result
    }
}

/// Encodes `v` as an XML fragment.
///
/// Wrap the value in a [`Document`](super::Document) to get a single root
/// element.
///
/// # Errors
///
/// Returns [`Error::NotSupported`] for values without an encode capability.
pub fn to_string(v: &dyn Codec) -> Result<String> {
    let mut enc = XmlEncoder::new(Vec::new());
    encode(&mut enc, v)?;
    String::from_utf8(enc.into_inner()).map_err(Error::custom)
}

#[cfg(test)]
mod tests {
    use alloc::{collections::BTreeMap, vec};

    use super::*;
    use crate::xml::Document;

    #[test]
    fn fields_become_elements() {
        let mut m: BTreeMap<String, Vec<Option<i32>>> = BTreeMap::new();
        m.insert("n".into(), vec![Some(1), None]);
        m.insert("e".into(), vec![]);
        let doc = Document::new("root", m);
        assert_eq!(
            to_string(&doc).unwrap(),
            "<root><e></e><n><item>1</item><item></item></n></root>"
        );
    }

    #[test]
    fn text_is_escaped() {
        let doc = Document::new("a", String::from("x < y & z"));
        assert_eq!(to_string(&doc).unwrap(), "<a>x &lt; y &amp; z</a>");
    }

    #[test]
    fn namespaced_names_declare_a_default_namespace() {
        let doc = Document::new("urn:x a", 1u8);
        assert_eq!(to_string(&doc).unwrap(), r#"<a xmlns="urn:x">1</a>"#);
    }

    #[test]
    fn nil_fields_are_omitted() {
        let mut m: BTreeMap<String, Option<bool>> = BTreeMap::new();
        m.insert("gone".into(), None);
        m.insert("kept".into(), Some(false));
        let doc = Document::new("r", m);
        assert_eq!(to_string(&doc).unwrap(), "<r><kept>false</kept></r>");
    }
}
