//! Encode-side capability dispatch, mirroring [`crate::decode`].
use tracing::trace;

use crate::{
    codec::{Codec, ElementEncoder, FieldEncoder},
    error::{Error, Result},
    scalar::Scalar,
};

/// A format-specific sink for values.
///
/// Formats implement the primitives they can represent; the provided
/// [`encode_bytes`](Encoder::encode_bytes) reports [`Error::NotSupported`].
pub trait Encoder {
    /// Writes the nil marker.
    ///
    /// # Errors
    ///
    /// Returns output or format errors.
    fn encode_nil(&mut self) -> Result<()>;

    /// Writes a boolean.
    ///
    /// # Errors
    ///
    /// Returns output or format errors.
    fn encode_bool(&mut self, b: bool) -> Result<()>;

    /// Writes a signed integer.
    ///
    /// # Errors
    ///
    /// Returns output or format errors.
    fn encode_i64(&mut self, v: i64) -> Result<()>;

    /// Writes an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns output or format errors.
    fn encode_u64(&mut self, v: u64) -> Result<()>;

    /// Writes a floating-point number.
    ///
    /// # Errors
    ///
    /// Returns output or format errors, e.g. for non-finite values in JSON.
    fn encode_f64(&mut self, v: f64) -> Result<()>;

    /// Writes a string.
    ///
    /// # Errors
    ///
    /// Returns output or format errors.
    fn encode_str(&mut self, s: &str) -> Result<()>;

    /// Writes a byte string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] unless the format overrides it.
    fn encode_bytes(&mut self, data: &[u8]) -> Result<()> {
        let _ = data;
        Err(Error::NotSupported { kind: "bytes" })
    }

    /// Writes a name-addressed aggregate.
    ///
    /// # Errors
    ///
    /// Returns output, format or member errors.
    fn encode_fields(&mut self, v: &dyn FieldEncoder) -> Result<()>;

    /// Writes an ordinal-addressed aggregate.
    ///
    /// # Errors
    ///
    /// Returns output, format or member errors.
    fn encode_elements(&mut self, v: &dyn ElementEncoder) -> Result<()>;
}

/// Receives the members of a [`FieldEncoder`].
pub trait FieldSink {
    /// Encodes one named member.
    ///
    /// # Errors
    ///
    /// Returns output, format or member errors.
    fn encode_field(&mut self, name: &str, v: &dyn Codec) -> Result<()>;
}

/// Receives the members of an [`ElementEncoder`].
pub trait ElementSink {
    /// Encodes one member.
    ///
    /// # Errors
    ///
    /// Returns output, format or member errors.
    fn encode_element(&mut self, v: &dyn Codec) -> Result<()>;
}

/// Encodes `v` through the first capability it exposes.
///
/// The order is: nil, built-in scalar, `bool`/`i64`/`u64`/`f64` producers,
/// string, bytes, fields, elements.
///
/// # Errors
///
/// Returns [`Error::NotSupported`] if `v` exposes no encode capability, or
/// the error of the capability or the encoder.
pub fn encode(enc: &mut dyn Encoder, v: &dyn Codec) -> Result<()> {
    if v.is_nil() {
        trace!("encode nil");
        return enc.encode_nil();
    }
    if let Some(s) = v.as_scalar() {
        return encode_scalar(enc, s);
    }
    if let Some(e) = v.as_bool_encoder() {
        return enc.encode_bool(e.encode_scalar()?);
    }
    if let Some(e) = v.as_int_encoder() {
        return enc.encode_i64(e.encode_scalar()?);
    }
    if let Some(e) = v.as_uint_encoder() {
        return enc.encode_u64(e.encode_scalar()?);
    }
    if let Some(e) = v.as_float_encoder() {
        return enc.encode_f64(e.encode_scalar()?);
    }
    if let Some(e) = v.as_string_encoder() {
        return enc.encode_str(&e.encode_string()?);
    }
    if let Some(e) = v.as_bytes_encoder() {
        return enc.encode_bytes(&e.encode_bytes()?);
    }
    if let Some(e) = v.as_field_encoder() {
        trace!("encode fields");
        return enc.encode_fields(e);
    }
    if let Some(e) = v.as_element_encoder() {
        trace!("encode elements");
        return enc.encode_elements(e);
    }
    Err(Error::NotSupported { kind: "value" })
}

fn encode_scalar(enc: &mut dyn Encoder, s: Scalar<'_>) -> Result<()> {
    match s {
        Scalar::Bool(b) => enc.encode_bool(b),
        Scalar::Int(v) => enc.encode_i64(v),
        Scalar::Uint(v) => enc.encode_u64(v),
        Scalar::Float(v) => enc.encode_f64(v),
        Scalar::Str(s) => enc.encode_str(s),
        Scalar::Bytes(data) => enc.encode_bytes(data),
    }
}
