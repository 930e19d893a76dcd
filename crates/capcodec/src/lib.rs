//! Capability-based decoding and encoding for JSON and XML.
//!
//! A destination takes part in decoding by implementing [`Codec`] and
//! overriding the probes for the capabilities it has: a scalar slot, a
//! [`StringDecoder`], a [`FieldDecoder`] for name-addressed children, and so
//! on. The streaming engines in [`json`] and [`xml`] read one token at a
//! time, pick the first matching capability and recurse through the
//! [`Decoder`] handed to aggregates. Values nobody consumes are skipped.
//!
//! Encoding mirrors this through the `*Encoder` capabilities and the
//! [`Encoder`] trait implemented by each format.
//!
//! Common Rust types (`bool`, integers, floats, `String`, `BString`,
//! `Option<T>`, `Vec<T>`, string-keyed maps) and the dynamic [`Value`]
//! implement the capabilities out of the box.
//!
//! ```
//! use capcodec::{Codec, Decoder, FieldDecoder, Result};
//!
//! #[derive(Default)]
//! struct Release {
//!     name: String,
//!     major: u16,
//!     yanked: Option<bool>,
//! }
//!
//! impl FieldDecoder for Release {
//!     fn decode_field(&mut self, dec: &mut dyn Decoder, _: usize, name: &str) -> Result<()> {
//!         match name {
//!             "name" => dec.decode(&mut self.name),
//!             "major" => dec.decode(&mut self.major),
//!             "yanked" => dec.decode(&mut self.yanked),
//!             _ => Ok(()),
//!         }
//!     }
//! }
//!
//! impl Codec for Release {
//!     fn as_field_decoder(&mut self) -> Option<&mut dyn FieldDecoder> {
//!         Some(self)
//!     }
//! }
//!
//! let mut r = Release::default();
//! capcodec::json::from_str(r#"{"name":"capcodec","major":1,"notes":[1,2]}"#, &mut r)?;
//! assert_eq!((r.name.as_str(), r.major, r.yanked), ("capcodec", 1, None));
//! # Ok::<(), capcodec::Error>(())
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod adapters;
mod codec;
mod decode;
mod encode;
mod error;
mod once;
mod options;
mod resolve;
mod scalar;
mod value;

pub mod json;
#[cfg(feature = "xml")]
pub mod xml;

#[cfg(test)]
mod tests;

pub use adapters::Discard;
pub use bstr::BString;
pub use codec::{
    BytesDecoder, BytesEncoder, Codec, Decoder, ElementDecoder, ElementEncoder, FieldDecoder,
    FieldEncoder, NilDecoder, ScalarDecoder, ScalarEncoder, StringDecoder, StringEncoder,
    TextAppender,
};
pub use decode::{
    Primitive, append_text, decode_bool, decode_bool_str, decode_bytes, decode_nil, decode_number,
    decode_primitive, decode_required, decode_string, decode_text_value,
};
pub use encode::{ElementSink, Encoder, FieldSink, encode};
pub use error::{Error, Position, Result};
pub use once::Once;
pub use options::DecoderOptions;
pub use resolve::{Opaque, Resolved, Resolver, TypeResolver, downcast_codec, resolve};
pub use scalar::{Place, Scalar, Slot, SlotKind, parse_bool_str};
pub use value::{Array, Map, Value};
