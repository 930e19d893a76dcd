use alloc::string::{String, ToString};

use crate::{
    codec::{Codec, Decoder, ElementDecoder, FieldEncoder},
    encode::FieldSink,
    error::{Error, Result},
};

/// The root of an XML document.
///
/// Decoded at document level, it records the name of the root element and
/// decodes the element into `root`. Encoded, it writes `root` as a single
/// element named `name` (or `"root"` if unset).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document<T> {
    /// Flattened name of the root element.
    pub name: Option<String>,
    /// The decoded root element.
    pub root: T,
}

impl<T> Document<T> {
    /// Wraps `root` for encoding under the element name `name`.
    pub fn new(name: impl Into<String>, root: T) -> Self {
        Self {
            name: Some(name.into()),
            root,
        }
    }
}

impl<T: Codec> ElementDecoder for Document<T> {
    fn decode_element(&mut self, dec: &mut dyn Decoder, index: usize, name: &str) -> Result<()> {
        if index > 0 {
            return Err(Error::MultipleRootElements);
        }
        self.name = Some(name.to_string());
        dec.decode(&mut self.root)
    }
}

impl<T: Codec> FieldEncoder for Document<T> {
    fn encode_fields(&self, fields: &mut dyn FieldSink) -> Result<()> {
        fields.encode_field(self.name.as_deref().unwrap_or("root"), &self.root)
    }
}

impl<T: Codec> Codec for Document<T> {
    fn as_element_decoder(&mut self) -> Option<&mut dyn ElementDecoder> {
        Some(self)
    }

    fn as_field_encoder(&self) -> Option<&dyn FieldEncoder> {
        Some(self)
    }
}
