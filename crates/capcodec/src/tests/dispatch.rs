//! Engine-independent guarantees: arity, auto-discard and resolution.
use alloc::{boxed::Box, format, string::String, vec, vec::Vec};

use super::fixtures::Greedy;
use crate::{
    Codec, Decoder, Error, FieldDecoder, Opaque, Resolved, Resolver, Result, StringDecoder,
    TypeResolver,
    json::{JsonDecoder, from_str},
};

#[derive(Debug, Default)]
struct Known {
    known: i64,
    known2: i64,
}

impl FieldDecoder for Known {
    fn decode_field(&mut self, dec: &mut dyn Decoder, _: usize, name: &str) -> Result<()> {
        match name {
            "known" => dec.decode(&mut self.known),
            "known2" => dec.decode(&mut self.known2),
            _ => Ok(()),
        }
    }
}

impl Codec for Known {
    fn as_field_decoder(&mut self) -> Option<&mut dyn FieldDecoder> {
        Some(self)
    }
}

#[test]
fn unconsumed_members_are_discarded() {
    let mut k = Known::default();
    from_str(r#"{"known":1,"unknown":{"a":1,"b":2},"known2":2}"#, &mut k).unwrap();
    assert_eq!((k.known, k.known2), (1, 2));
}

#[test]
fn second_decode_in_one_step_is_an_arity_error() {
    let mut g = Greedy::default();
    let err = from_str(r#"{"a":1}"#, &mut g).unwrap_err();
    assert_eq!(err, Error::Arity { calls: 2 });
    assert_eq!(g.first, 1);
    assert_eq!(g.second, 0);
}

#[test]
fn swallowed_arity_error_still_fails() {
    let mut g = Greedy {
        swallow: true,
        ..Default::default()
    };
    let err = from_str(r#"{"a":1}"#, &mut g).unwrap_err();
    assert_eq!(err, Error::Arity { calls: 2 });
}

struct Hex<'a>(&'a mut u32);

impl StringDecoder for Hex<'_> {
    fn decode_string(&mut self, s: &str) -> Result<()> {
        *self.0 = u32::from_str_radix(s, 16).map_err(Error::custom)?;
        Ok(())
    }
}

impl Codec for Hex<'_> {
    fn as_string_decoder(&mut self) -> Option<&mut dyn StringDecoder> {
        Some(self)
    }
}

fn hex_types() -> TypeResolver {
    TypeResolver::new().register(|n: &mut u32| Box::new(Hex(n)))
}

#[test]
fn type_resolver_applies_at_every_level() {
    let mut dec = JsonDecoder::new(r#"["ff", "10"]"#).with_resolver(hex_types());
    let mut v: Vec<u32> = Vec::new();
    dec.decode(&mut v).unwrap();
    assert_eq!(v, [255, 16]);
}

#[test]
fn substitute_replaces_native_capabilities() {
    // Numbers reach the adapter through its string capability.
    let mut dec = JsonDecoder::new("12").with_resolver(hex_types());
    let mut n = 0_u32;
    dec.decode(&mut n).unwrap();
    assert_eq!(n, 0x12);
}

#[test]
fn opaque_values_need_a_resolver() {
    struct Foreign(u32);

    let mut f = Foreign(0);
    let err = from_str(r#""ff""#, &mut Opaque(&mut f)).unwrap_err();
    assert_eq!(err, Error::NotSupported { kind: "string" });

    let types = TypeResolver::new().register(|f: &mut Foreign| Box::new(Hex(&mut f.0)));
    JsonDecoder::new(r#""ff""#)
        .with_resolver(types)
        .decode(&mut Opaque(&mut f))
        .unwrap();
    assert_eq!(f.0, 255);
}

/// Tags every string it is offered with its own name.
struct Tagging {
    tag: &'static str,
}

struct Tagged<'v> {
    tag: &'static str,
    out: &'v mut String,
}

impl StringDecoder for Tagged<'_> {
    fn decode_string(&mut self, s: &str) -> Result<()> {
        *self.out = format!("{}:{s}", self.tag);
        Ok(())
    }
}

impl Codec for Tagged<'_> {
    fn as_string_decoder(&mut self) -> Option<&mut dyn StringDecoder> {
        Some(self)
    }
}

impl Resolver for Tagging {
    fn resolve_codec<'v>(&self, v: &'v mut dyn Codec) -> Resolved<'v> {
        match crate::downcast_codec::<String>(v) {
            Ok(out) => Resolved::Codec(Box::new(Tagged { tag: self.tag, out })),
            Err(v) => Resolved::Value(v),
        }
    }
}

#[test]
fn first_registered_resolver_wins() {
    let mut dec = JsonDecoder::new(r#"["x"]"#)
        .with_resolver(Tagging { tag: "first" })
        .with_resolver(Tagging { tag: "second" });
    let mut v: Vec<String> = vec![];
    dec.decode(&mut v).unwrap();
    assert_eq!(v, ["first:x"]);
}
