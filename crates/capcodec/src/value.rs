//! Schemaless values.
//!
//! [`Value`] accepts any shape a decoder produces and encodes back to the same
//! shape, which makes it the destination of choice when the structure of the
//! input is not known in advance.
use alloc::{
    borrow::Cow,
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use core::any::Any;

use crate::{
    codec::{
        Codec, Decoder, ElementDecoder, ElementEncoder, FieldDecoder, FieldEncoder, NilDecoder,
        ScalarDecoder, ScalarEncoder, StringDecoder, StringEncoder, TextAppender,
    },
    encode::{ElementSink, FieldSink},
    error::{Error, Result},
};

/// Members of a [`Value::Object`], ordered by key.
pub type Map = BTreeMap<String, Value>;
/// Members of a [`Value::Array`].
pub type Array = Vec<Value>;

/// A dynamically typed value.
///
/// Decoding into a `Value` follows the shape of the input:
///
/// - nil becomes [`Null`](Value::Null), booleans and numbers become
///   [`Boolean`](Value::Boolean) and [`Number`](Value::Number);
/// - strings and text become [`String`](Value::String), with text fragments
///   appended;
/// - name-addressed members turn the value into an [`Object`](Value::Object)
///   and ordinal-addressed members into an [`Array`](Value::Array), replacing
///   any scalar it held. Text that arrives once the value is an aggregate is
///   dropped.
///
/// # Examples
///
/// ```
/// use capcodec::Value;
///
/// let mut v = Value::Null;
/// capcodec::json::from_str(r#"{"key": ["value", 1]}"#, &mut v).unwrap();
/// assert_eq!(v.to_string(), r#"{"key":["value",1]}"#);
/// ```
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(test, feature = "serde"), serde(untagged))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// The nil marker.
    #[default]
    Null,
    /// A boolean.
    Boolean(bool),
    /// Any number, widened to `f64`.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered sequence.
    Array(Array),
    /// A string-keyed map.
    Object(Map),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is [`Array`] or [`Object`].
    ///
    /// [`Array`]: Value::Array
    /// [`Object`]: Value::Object
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Array(..) | Self::Object(..))
    }

    /// Looks up a member of an [`Object`](Value::Object).
    ///
    /// ```
    /// use capcodec::Value;
    ///
    /// let mut v = Value::Null;
    /// capcodec::json::from_str(r#"{"a": true}"#, &mut v).unwrap();
    /// assert_eq!(v.get("a"), Some(&Value::Boolean(true)));
    /// assert_eq!(v.get("b"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    fn object_mut(&mut self) -> &mut Map {
        if !matches!(self, Self::Object(..)) {
            *self = Self::Object(Map::new());
        }
        match self {
            Self::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn array_mut(&mut self) -> &mut Array {
        if !matches!(self, Self::Array(..)) {
            *self = Self::Array(Array::new());
        }
        match self {
            Self::Array(items) => items,
            _ => unreachable!(),
        }
    }
}

impl NilDecoder for Value {
    fn decode_nil(&mut self) -> Result<()> {
        *self = Self::Null;
        Ok(())
    }
}

impl ScalarDecoder<bool> for Value {
    fn decode_scalar(&mut self, v: bool) -> Result<()> {
        *self = Self::Boolean(v);
        Ok(())
    }
}

impl ScalarDecoder<f64> for Value {
    fn decode_scalar(&mut self, v: f64) -> Result<()> {
        *self = Self::Number(v);
        Ok(())
    }
}

impl StringDecoder for Value {
    fn decode_string(&mut self, s: &str) -> Result<()> {
        *self = Self::String(s.to_string());
        Ok(())
    }
}

impl TextAppender for Value {
    fn append_text(&mut self, text: &[u8]) -> Result<()> {
        let text = core::str::from_utf8(text).map_err(Error::custom)?;
        match self {
            Self::String(s) => s.push_str(text),
            Self::Array(..) | Self::Object(..) => {}
            _ => *self = Self::String(text.to_string()),
        }
        Ok(())
    }
}

impl FieldDecoder for Value {
    fn begin_fields(&mut self) -> Result<()> {
        self.object_mut();
        Ok(())
    }

    fn decode_field(&mut self, dec: &mut dyn Decoder, _index: usize, name: &str) -> Result<()> {
        let entry = self.object_mut().entry(name.to_string()).or_default();
        *entry = Value::Null;
        dec.decode(entry)
    }
}

impl ElementDecoder for Value {
    fn begin_elements(&mut self) -> Result<()> {
        self.array_mut().clear();
        Ok(())
    }

    fn decode_element(&mut self, dec: &mut dyn Decoder, _index: usize, _name: &str) -> Result<()> {
        let items = self.array_mut();
        items.push(Value::Null);
        let last = items.len() - 1;
        dec.decode(&mut items[last])
    }
}

impl ScalarEncoder<bool> for Value {
    fn encode_scalar(&self) -> Result<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            _ => Err(Error::NotSupported { kind: "bool" }),
        }
    }
}

impl ScalarEncoder<f64> for Value {
    fn encode_scalar(&self) -> Result<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            _ => Err(Error::NotSupported { kind: "number" }),
        }
    }
}

impl StringEncoder for Value {
    fn encode_string(&self) -> Result<Cow<'_, str>> {
        match self {
            Self::String(s) => Ok(Cow::Borrowed(s)),
            _ => Err(Error::NotSupported { kind: "string" }),
        }
    }
}

impl FieldEncoder for Value {
    fn encode_fields(&self, fields: &mut dyn FieldSink) -> Result<()> {
        if let Self::Object(map) = self {
            map.encode_fields(fields)?;
        }
        Ok(())
    }
}

impl ElementEncoder for Value {
    fn encode_elements(&self, elements: &mut dyn ElementSink) -> Result<()> {
        if let Self::Array(items) = self {
            items.encode_elements(elements)?;
        }
        Ok(())
    }
}

impl Codec for Value {
    fn as_any(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }

    fn as_nil_decoder(&mut self) -> Option<&mut dyn NilDecoder> {
        Some(self)
    }

    fn as_bool_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<bool>> {
        Some(self)
    }

    fn as_float_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<f64>> {
        Some(self)
    }

    fn as_string_decoder(&mut self) -> Option<&mut dyn StringDecoder> {
        Some(self)
    }

    fn as_text_appender(&mut self) -> Option<&mut dyn TextAppender> {
        Some(self)
    }

    fn as_field_decoder(&mut self) -> Option<&mut dyn FieldDecoder> {
        Some(self)
    }

    fn as_element_decoder(&mut self) -> Option<&mut dyn ElementDecoder> {
        Some(self)
    }

    fn is_nil(&self) -> bool {
        self.is_null()
    }

    fn as_bool_encoder(&self) -> Option<&dyn ScalarEncoder<bool>> {
        matches!(self, Self::Boolean(..)).then_some(self as &dyn ScalarEncoder<bool>)
    }

    fn as_float_encoder(&self) -> Option<&dyn ScalarEncoder<f64>> {
        matches!(self, Self::Number(..)).then_some(self as &dyn ScalarEncoder<f64>)
    }

    fn as_string_encoder(&self) -> Option<&dyn StringEncoder> {
        matches!(self, Self::String(..)).then_some(self as &dyn StringEncoder)
    }

    fn as_field_encoder(&self) -> Option<&dyn FieldEncoder> {
        matches!(self, Self::Object(..)).then_some(self as &dyn FieldEncoder)
    }

    fn as_element_encoder(&self) -> Option<&dyn ElementEncoder> {
        matches!(self, Self::Array(..)).then_some(self as &dyn ElementEncoder)
    }
}

/// Escapes a string for inclusion in a JSON string literal.
///
/// Quotes, backslashes, control characters and the Unicode line separators
/// are written as escape sequences.
pub(crate) fn write_escaped_string<W: core::fmt::Write>(src: &str, f: &mut W) -> core::fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            // Older parsers treat these as line terminators.
            '\u{2028}' | '\u{2029}' => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            c if c.is_ascii_control() || c.is_control() && c as u32 <= 0xFFFF => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Number(n) => f.write_str(&n.to_string()),
            Value::String(s) => {
                f.write_str("\"")?;
                write_escaped_string(s, f)?;
                f.write_str("\"")
            }
            Value::Array(arr) => {
                f.write_str("[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str("\"")?;
                    write_escaped_string(k, f)?;
                    write!(f, "\":{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        let v = Value::from("a\"b\\c\nd\u{1}\u{2028}");
        assert_eq!(v.to_string(), r#""a\"b\\c\nd\u0001\u2028""#);
    }

    #[test]
    fn text_is_dropped_once_aggregate() {
        let mut v = Value::Object(Map::new());
        v.append_text(b"\n  ").unwrap();
        assert_eq!(v, Value::Object(Map::new()));

        let mut s = Value::Null;
        s.append_text(b"ab").unwrap();
        s.append_text(b"c").unwrap();
        assert_eq!(s, Value::from("abc"));
    }

    #[test]
    fn members_replace_scalars() {
        let mut v = Value::from("  ");
        assert!(v.object_mut().is_empty());
        assert!(v.is_aggregate());
    }
}
