//! The capability vocabulary.
//!
//! A type takes part in encoding and decoding by implementing [`Codec`] and
//! overriding the probe methods for the capabilities it supports. Every probe
//! defaults to "not supported", so a codec only spells out what it can do:
//!
//! ```
//! use capcodec::{Codec, Decoder, FieldDecoder, Result};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl FieldDecoder for Point {
//!     fn decode_field(&mut self, dec: &mut dyn Decoder, _index: usize, name: &str) -> Result<()> {
//!         match name {
//!             "x" => dec.decode(&mut self.x),
//!             "y" => dec.decode(&mut self.y),
//!             _ => Ok(()),
//!         }
//!     }
//! }
//!
//! impl Codec for Point {
//!     fn as_field_decoder(&mut self) -> Option<&mut dyn FieldDecoder> {
//!         Some(self)
//!     }
//! }
//!
//! let mut p = Point::default();
//! capcodec::json::from_str(r#"{"x": 1, "y": -2, "z": [3]}"#, &mut p).unwrap();
//! assert_eq!((p.x, p.y), (1, -2));
//! ```
//!
//! Probes are consulted in the fixed order documented on
//! [`decode_primitive`](crate::decode_primitive) and [`encode`](crate::encode());
//! there is no reflection over struct layouts.
use alloc::borrow::Cow;
use core::any::Any;

use crate::{
    encode::{ElementSink, FieldSink},
    error::Result,
    scalar::{Scalar, Slot},
};

/// A format-specific source of values.
///
/// Implemented by the streaming engines and by the [`Once`](crate::Once)
/// guard they hand to aggregate capabilities.
pub trait Decoder {
    /// Decodes the next value in the stream into `v`.
    ///
    /// # Errors
    ///
    /// Returns any tokenizer, structural, parse or capability error raised
    /// while decoding the value.
    fn decode(&mut self, v: &mut dyn Codec) -> Result<()>;

    /// Consumes and discards the next value, whatever its shape.
    ///
    /// # Errors
    ///
    /// Returns tokenizer and structural errors; discarding never fails on
    /// capability grounds.
    fn skip(&mut self) -> Result<()> {
        self.decode(&mut crate::Discard)
    }
}

/// A value that can be decoded from and/or encoded to any supported format.
///
/// All methods are capability probes with a `None`/`false` default.
/// Implement the probes for the capabilities the type supports, returning
/// `Some(self)` (or a view of `self`).
pub trait Codec {
    /// Exposes the value for type-keyed resolvers such as
    /// [`TypeResolver`](crate::TypeResolver).
    fn as_any(&mut self) -> Option<&mut dyn Any> {
        None
    }

    // -- decoding ---------------------------------------------------------

    /// The value is a built-in scalar, or an `Option` of one.
    fn as_slot(&mut self) -> Option<Slot<'_>> {
        None
    }

    /// Accepts the nil/absent marker.
    fn as_nil_decoder(&mut self) -> Option<&mut dyn NilDecoder> {
        None
    }

    /// Accepts a boolean.
    fn as_bool_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<bool>> {
        None
    }

    /// Accepts a signed integer, normalized to `i64`.
    fn as_int_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<i64>> {
        None
    }

    /// Accepts an unsigned integer, normalized to `u64`.
    fn as_uint_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<u64>> {
        None
    }

    /// Accepts a floating-point number, normalized to `f64`.
    fn as_float_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<f64>> {
        None
    }

    /// Accepts a string.
    fn as_string_decoder(&mut self) -> Option<&mut dyn StringDecoder> {
        None
    }

    /// Accepts a byte string, replacing any previous content.
    fn as_bytes_decoder(&mut self) -> Option<&mut dyn BytesDecoder> {
        None
    }

    /// Accepts text delivered in fragments, appending each one.
    fn as_text_appender(&mut self) -> Option<&mut dyn TextAppender> {
        None
    }

    /// Accepts name-addressed members (object keys, XML attributes and
    /// child elements).
    fn as_field_decoder(&mut self) -> Option<&mut dyn FieldDecoder> {
        None
    }

    /// Accepts ordinal-addressed members (array elements).
    fn as_element_decoder(&mut self) -> Option<&mut dyn ElementDecoder> {
        None
    }

    // -- encoding ---------------------------------------------------------

    /// The value encodes as nil.
    fn is_nil(&self) -> bool {
        false
    }

    /// The value is a built-in scalar.
    fn as_scalar(&self) -> Option<Scalar<'_>> {
        None
    }

    /// Produces a boolean.
    fn as_bool_encoder(&self) -> Option<&dyn ScalarEncoder<bool>> {
        None
    }

    /// Produces a signed integer.
    fn as_int_encoder(&self) -> Option<&dyn ScalarEncoder<i64>> {
        None
    }

    /// Produces an unsigned integer.
    fn as_uint_encoder(&self) -> Option<&dyn ScalarEncoder<u64>> {
        None
    }

    /// Produces a floating-point number.
    fn as_float_encoder(&self) -> Option<&dyn ScalarEncoder<f64>> {
        None
    }

    /// Produces a string.
    fn as_string_encoder(&self) -> Option<&dyn StringEncoder> {
        None
    }

    /// Produces a byte string.
    fn as_bytes_encoder(&self) -> Option<&dyn BytesEncoder> {
        None
    }

    /// Produces name-addressed members.
    fn as_field_encoder(&self) -> Option<&dyn FieldEncoder> {
        None
    }

    /// Produces ordinal-addressed members.
    fn as_element_encoder(&self) -> Option<&dyn ElementEncoder> {
        None
    }
}

/// Decodes from the nil/absent marker.
pub trait NilDecoder {
    /// Called for `null` (JSON).
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn decode_nil(&mut self) -> Result<()>;
}

/// Decodes from one canonical scalar carrier: `bool`, `i64`, `u64` or `f64`.
pub trait ScalarDecoder<T> {
    /// Accepts the converted value.
    ///
    /// # Errors
    ///
    /// Implementation-defined, e.g. a value outside the type's domain.
    fn decode_scalar(&mut self, v: T) -> Result<()>;
}

/// Decodes from a string.
pub trait StringDecoder {
    /// Accepts a complete string value.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn decode_string(&mut self, s: &str) -> Result<()>;
}

/// Decodes from a byte string, replacing existing content.
pub trait BytesDecoder {
    /// Accepts a complete byte string.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn decode_bytes(&mut self, data: &[u8]) -> Result<()>;
}

/// Accumulates text that arrives in several fragments.
///
/// Formats with interleaved markup (XML character data split by entity
/// references or CDATA sections) call this once per fragment.
pub trait TextAppender {
    /// Appends one fragment.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn append_text(&mut self, text: &[u8]) -> Result<()>;
}

/// Decodes name-addressed members such as struct fields or string-keyed maps.
pub trait FieldDecoder {
    /// Called when a JSON object begins, before its first member.
    ///
    /// # Errors
    ///
    /// Returns errors from the implementation.
    fn begin_fields(&mut self) -> Result<()> {
        Ok(())
    }

    /// Decodes one member.
    ///
    /// `index` is the member's ordinal among its siblings and `name` its
    /// (flattened) key. `dec` may be used at most once; leaving it unused
    /// makes the engine skip the value.
    ///
    /// # Errors
    ///
    /// Returns errors from `dec` or from the implementation.
    fn decode_field(&mut self, dec: &mut dyn Decoder, index: usize, name: &str) -> Result<()>;
}

/// Decodes ordinal-addressed members such as sequences.
pub trait ElementDecoder {
    /// Called when a JSON array begins, before its first member.
    ///
    /// # Errors
    ///
    /// Returns errors from the implementation.
    fn begin_elements(&mut self) -> Result<()> {
        Ok(())
    }

    /// Decodes one member.
    ///
    /// `name` is empty when the format has no natural name for elements
    /// (JSON arrays) and carries the element name for XML children.
    ///
    /// # Errors
    ///
    /// Returns errors from `dec` or from the implementation.
    fn decode_element(&mut self, dec: &mut dyn Decoder, index: usize, name: &str)
    -> Result<()>;
}

/// Encodes to one canonical scalar carrier.
pub trait ScalarEncoder<T> {
    /// Produces the value.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn encode_scalar(&self) -> Result<T>;
}

/// Encodes to a string.
pub trait StringEncoder {
    /// Produces the string.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn encode_string(&self) -> Result<Cow<'_, str>>;
}

/// Encodes to a byte string.
pub trait BytesEncoder {
    /// Produces the bytes.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn encode_bytes(&self) -> Result<Cow<'_, [u8]>>;
}

/// Encodes name-addressed members.
pub trait FieldEncoder {
    /// Feeds every member to `fields`, in output order.
    ///
    /// # Errors
    ///
    /// Returns errors from `fields`.
    fn encode_fields(&self, fields: &mut dyn FieldSink) -> Result<()>;
}

/// Encodes ordinal-addressed members.
pub trait ElementEncoder {
    /// Feeds every member to `elements`, in order.
    ///
    /// # Errors
    ///
    /// Returns errors from `elements`.
    fn encode_elements(&self, elements: &mut dyn ElementSink) -> Result<()>;
}
