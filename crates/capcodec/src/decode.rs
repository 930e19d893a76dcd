//! Decode-side capability dispatch.
//!
//! Each function probes a destination in a fixed order and returns
//! `Ok(true)` once a capability accepted (or failed to accept) the value.
//! `Ok(false)` means no capability matched and nothing was touched; the
//! engines turn that into [`Error::NotSupported`] where appropriate.
//!
//! Once a capability has been tried, no later capability is consulted, even
//! if the attempt returned an error.
use tracing::trace;

use crate::{
    codec::Codec,
    error::{Error, Result},
    scalar::{is_integral, parse_bool_str, parse_number},
};

/// A format-agnostic scalar payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive<'a> {
    /// The nil marker (`null`).
    Nil,
    /// A boolean literal.
    Bool(bool),
    /// Numeric text, not yet parsed.
    Number(&'a str),
    /// A complete string, decoded from its escaped form.
    String(&'a str),
    /// A complete byte string.
    Bytes(&'a [u8]),
    /// One fragment of text that may be followed by more.
    Text(&'a [u8]),
}

impl Primitive<'_> {
    /// Short name of the payload kind, used in [`Error::NotSupported`].
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Nil => "nil",
            Primitive::Bool(_) => "bool",
            Primitive::Number(_) => "number",
            Primitive::String(_) => "string",
            Primitive::Bytes(_) => "bytes",
            Primitive::Text(_) => "text",
        }
    }
}

/// Dispatches the nil marker. Only [`NilDecoder`](crate::NilDecoder) matches.
///
/// # Errors
///
/// Returns the destination's error.
pub fn decode_nil(v: &mut dyn Codec) -> Result<bool> {
    match v.as_nil_decoder() {
        Some(nd) => nd.decode_nil().map(|()| true),
        None => Ok(false),
    }
}

/// Dispatches a boolean to a `bool` slot or a `ScalarDecoder<bool>`.
///
/// # Errors
///
/// Returns the destination's error.
pub fn decode_bool(v: &mut dyn Codec, b: bool) -> Result<bool> {
    if let Some(slot) = v.as_slot() {
        if slot.set_bool(b) {
            return Ok(true);
        }
    }
    match v.as_bool_decoder() {
        Some(bd) => bd.decode_scalar(b).map(|()| true),
        None => Ok(false),
    }
}

/// Dispatches a textual boolean.
///
/// Strings outside the recognized set (see [`parse_bool_str`]) are not a
/// match and return `Ok(false)` without touching the destination.
///
/// # Errors
///
/// Returns the destination's error.
pub fn decode_bool_str(v: &mut dyn Codec, s: &str) -> Result<bool> {
    match parse_bool_str(s) {
        Some(b) => decode_bool(v, b),
        None => Ok(false),
    }
}

/// Dispatches numeric text.
///
/// Numeric slots parse the text with their own width as the bound. Otherwise
/// integral text is offered to the `i64`, `u64` and `f64` carriers in that
/// order, and any other text to the `f64` carrier only.
///
/// # Errors
///
/// Returns [`Error::InvalidNumber`] if the text does not parse as the chosen
/// type, or the destination's error.
pub fn decode_number(v: &mut dyn Codec, text: &str) -> Result<bool> {
    if let Some(slot) = v.as_slot() {
        if slot.set_number(text)? {
            return Ok(true);
        }
    }
    if is_integral(text) {
        if let Some(d) = v.as_int_decoder() {
            return d.decode_scalar(parse_number(text, "i64")?).map(|()| true);
        }
        if let Some(d) = v.as_uint_decoder() {
            return d.decode_scalar(parse_number(text, "u64")?).map(|()| true);
        }
    }
    match v.as_float_decoder() {
        Some(d) => d.decode_scalar(parse_number(text, "f64")?).map(|()| true),
        None => Ok(false),
    }
}

/// Dispatches a complete string to a `String` slot or a
/// [`StringDecoder`](crate::StringDecoder).
///
/// # Errors
///
/// Returns the destination's error.
pub fn decode_string(v: &mut dyn Codec, s: &str) -> Result<bool> {
    if let Some(slot) = v.as_slot() {
        if slot.set_string(s) {
            return Ok(true);
        }
    }
    match v.as_string_decoder() {
        Some(sd) => sd.decode_string(s).map(|()| true),
        None => Ok(false),
    }
}

/// Dispatches a complete byte string, replacing the destination's content.
///
/// # Errors
///
/// Returns the destination's error.
pub fn decode_bytes(v: &mut dyn Codec, data: &[u8]) -> Result<bool> {
    if let Some(slot) = v.as_slot() {
        if slot.set_bytes(data) {
            return Ok(true);
        }
    }
    match v.as_bytes_decoder() {
        Some(bd) => bd.decode_bytes(data).map(|()| true),
        None => Ok(false),
    }
}

/// Appends one text fragment to a `String`/`BString` slot or a
/// [`TextAppender`](crate::TextAppender).
///
/// # Errors
///
/// Returns the destination's error, or [`Error::Custom`] when non-UTF-8
/// bytes are appended to a `String`.
pub fn append_text(v: &mut dyn Codec, text: &[u8]) -> Result<bool> {
    if let Some(slot) = v.as_slot() {
        if slot.append(text)? {
            return Ok(true);
        }
    }
    match v.as_text_appender() {
        Some(ta) => ta.append_text(text).map(|()| true),
        None => Ok(false),
    }
}

/// Returns `true` if `v` can accumulate text fragments.
pub(crate) fn accepts_text(v: &mut dyn Codec) -> bool {
    use crate::scalar::Slot;

    matches!(v.as_slot(), Some(Slot::String(_) | Slot::Bytes(_))) || v.as_text_appender().is_some()
}

/// Dispatches untyped text: as a string, then as bytes, then as a textual
/// boolean, then as a number.
///
/// Used for values whose type the format does not record, such as XML
/// attribute values and JSON strings.
///
/// # Errors
///
/// Returns the error of the first capability that was attempted.
pub fn decode_text_value(v: &mut dyn Codec, s: &str) -> Result<bool> {
    if decode_string(v, s)? || decode_bytes(v, s.as_bytes())? || decode_bool_str(v, s)? {
        return Ok(true);
    }
    decode_number(v, s)
}

/// Dispatches any [`Primitive`].
///
/// Numbers that find no numeric capability fall back to the string
/// capability with the original text.
///
/// # Errors
///
/// Returns the error of the capability that was attempted.
pub fn decode_primitive(v: &mut dyn Codec, p: Primitive<'_>) -> Result<bool> {
    trace!(kind = p.kind(), "dispatch primitive");
    match p {
        Primitive::Nil => decode_nil(v),
        Primitive::Bool(b) => decode_bool(v, b),
        Primitive::Number(text) => Ok(decode_number(v, text)? || decode_string(v, text)?),
        Primitive::String(s) => decode_text_value(v, s),
        Primitive::Bytes(data) => decode_bytes(v, data),
        Primitive::Text(text) => append_text(v, text),
    }
}

/// Like [`decode_primitive`], but an unmatched non-nil value is an error.
///
/// # Errors
///
/// Returns [`Error::NotSupported`] when no capability matched, or the error
/// of the capability that was attempted.
pub fn decode_required(v: &mut dyn Codec, p: Primitive<'_>) -> Result<()> {
    if decode_primitive(v, p)? || p == Primitive::Nil {
        Ok(())
    } else {
        Err(Error::NotSupported { kind: p.kind() })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use rstest::rstest;

    use super::*;
    use crate::codec::{ScalarDecoder, StringDecoder};

    #[derive(Default)]
    struct Carriers {
        int: Option<i64>,
        uint: Option<u64>,
        float: Option<f64>,
        accept_int: bool,
    }

    impl ScalarDecoder<i64> for Carriers {
        fn decode_scalar(&mut self, v: i64) -> Result<()> {
            self.int = Some(v);
            Ok(())
        }
    }

    impl ScalarDecoder<u64> for Carriers {
        fn decode_scalar(&mut self, v: u64) -> Result<()> {
            self.uint = Some(v);
            Ok(())
        }
    }

    impl ScalarDecoder<f64> for Carriers {
        fn decode_scalar(&mut self, v: f64) -> Result<()> {
            self.float = Some(v);
            Ok(())
        }
    }

    impl Codec for Carriers {
        fn as_int_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<i64>> {
            if !self.accept_int {
                return None;
            }
            Some(self)
        }
        fn as_uint_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<u64>> {
            Some(self)
        }
        fn as_float_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<f64>> {
            Some(self)
        }
    }

    #[test]
    fn integral_prefers_int_carrier() {
        let mut c = Carriers {
            accept_int: true,
            ..Carriers::default()
        };
        assert!(decode_number(&mut c, "-7").unwrap());
        assert_eq!((c.int, c.uint, c.float), (Some(-7), None, None));
    }

    #[test]
    fn integral_falls_through_to_uint() {
        let mut c = Carriers::default();
        assert!(decode_number(&mut c, "18446744073709551615").unwrap());
        assert_eq!(c.uint, Some(u64::MAX));
    }

    #[test]
    fn fractional_goes_to_float_only() {
        let mut c = Carriers {
            accept_int: true,
            ..Carriers::default()
        };
        assert!(decode_number(&mut c, "2.5e1").unwrap());
        assert_eq!((c.int, c.float), (None, Some(25.0)));
    }

    #[rstest]
    #[case("true", Some(true))]
    #[case("0", Some(false))]
    #[case("", Some(false))]
    #[case("maybe", None)]
    fn bool_strings_reach_bool_slots(#[case] text: &str, #[case] expected: Option<bool>) {
        let mut b: Option<bool> = None;
        let matched = decode_bool_str(&mut b, text).unwrap();
        assert_eq!(matched, expected.is_some());
        assert_eq!(b, expected);
    }

    #[test]
    fn text_value_order() {
        let mut s = String::new();
        assert!(decode_text_value(&mut s, "1").unwrap());
        assert_eq!(s, "1");

        let mut b = false;
        assert!(decode_text_value(&mut b, "1").unwrap());
        assert!(b);

        let mut n = 0i32;
        assert!(decode_text_value(&mut n, "12").unwrap());
        assert_eq!(n, 12);

        let mut flag = false;
        assert!(!decode_text_value(&mut flag, "yes").unwrap());
    }

    #[test]
    fn failed_attempt_does_not_fall_back() {
        struct Picky(String);
        impl StringDecoder for Picky {
            fn decode_string(&mut self, _: &str) -> Result<()> {
                Err(Error::custom("rejected"))
            }
        }
        impl Codec for Picky {
            fn as_string_decoder(&mut self) -> Option<&mut dyn StringDecoder> {
                Some(self)
            }
            fn as_bool_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<bool>> {
                unreachable!("bool capability consulted after a string attempt")
            }
        }
        let mut p = Picky(String::new());
        assert_eq!(decode_text_value(&mut p, "true"), Err(Error::custom("rejected")));
        assert!(p.0.is_empty());
    }

    #[test]
    fn unmatched_number_is_not_supported() {
        let mut flag = false;
        let err = decode_required(&mut flag, Primitive::Number("3")).unwrap_err();
        assert_eq!(err, Error::NotSupported { kind: "number" });
    }

    #[test]
    fn nil_without_capability_is_ignored() {
        let mut n = 5u8;
        decode_required(&mut n, Primitive::Nil).unwrap();
        assert_eq!(n, 5);
    }
}
