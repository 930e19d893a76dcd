use alloc::string::String;
use core::fmt::Write;

use crate::{
    codec::{Codec, ElementEncoder, FieldEncoder},
    encode::{ElementSink, Encoder, FieldSink, encode},
    error::{Error, Result},
    value::write_escaped_string,
};

/// Writes compact JSON text to any [`core::fmt::Write`] sink.
///
/// Byte strings are written as strings when they are valid UTF-8. Non-finite
/// floats have no JSON representation and are rejected.
#[derive(Debug)]
pub struct JsonEncoder<W> {
    out: W,
}

impl<W: Write> JsonEncoder<W> {
    /// Creates an encoder writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, s: &str) -> Result<()> {
        self.out.write_str(s).map_err(Error::custom)
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write("\"")?;
        write_escaped_string(s, &mut self.out).map_err(Error::custom)?;
        self.write("\"")
    }
}

impl<W: Write> Encoder for JsonEncoder<W> {
    fn encode_nil(&mut self) -> Result<()> {
        self.write("null")
    }

    fn encode_bool(&mut self, b: bool) -> Result<()> {
        self.write(if b { "true" } else { "false" })
    }

    fn encode_i64(&mut self, v: i64) -> Result<()> {
        write!(self.out, "{v}").map_err(Error::custom)
    }

    fn encode_u64(&mut self, v: u64) -> Result<()> {
        write!(self.out, "{v}").map_err(Error::custom)
    }

    fn encode_f64(&mut self, v: f64) -> Result<()> {
        if !v.is_finite() {
            return Err(Error::NotSupported {
                kind: "non-finite number",
            });
        }
        write!(self.out, "{v}").map_err(Error::custom)
    }

    fn encode_str(&mut self, s: &str) -> Result<()> {
        self.write_string(s)
    }

    fn encode_bytes(&mut self, data: &[u8]) -> Result<()> {
        match core::str::from_utf8(data) {
            Ok(s) => self.write_string(s),
            Err(_) => Err(Error::NotSupported { kind: "bytes" }),
        }
    }

    fn encode_fields(&mut self, v: &dyn FieldEncoder) -> Result<()> {
        self.write("{")?;
        v.encode_fields(&mut Members {
            enc: &mut *self,
            first: true,
        })?;
        self.write("}")
    }

    fn encode_elements(&mut self, v: &dyn ElementEncoder) -> Result<()> {
        self.write("[")?;
        v.encode_elements(&mut Members {
            enc: &mut *self,
            first: true,
        })?;
        self.write("]")
    }
}

struct Members<'e, W> {
    enc: &'e mut JsonEncoder<W>,
    first: bool,
}

impl<W: Write> Members<'_, W> {
    fn separator(&mut self) -> Result<()> {
        if self.first {
            self.first = false;
            Ok(())
        } else {
            self.enc.write(",")
        }
    }
}

impl<W: Write> FieldSink for Members<'_, W> {
    fn encode_field(&mut self, name: &str, v: &dyn Codec) -> Result<()> {
        self.separator()?;
        self.enc.write_string(name)?;
        self.enc.write(":")?;
        encode(&mut *self.enc, v)
    }
}

impl<W: Write> ElementSink for Members<'_, W> {
    fn encode_element(&mut self, v: &dyn Codec) -> Result<()> {
        self.separator()?;
        encode(&mut *self.enc, v)
    }
}

/// Encodes `v` as compact JSON text.
///
/// # Errors
///
/// Returns [`Error::NotSupported`] for values without an encode capability
/// or that JSON cannot represent.
pub fn to_string(v: &dyn Codec) -> Result<String> {
    let mut enc = JsonEncoder::new(String::new());
    encode(&mut enc, v)?;
    Ok(enc.into_inner())
}
