//! Capability implementations for standard library types.
//!
//! Scalars, `String` and `BString` are direct slots. `Option<T>` of a slot
//! type accepts nil and allocates on first write. Sequences and string-keyed
//! maps are aggregates whose members are any codec with a default value.
//! Each member is decoded into a fresh default and then stored, replacing
//! what was there.
use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use core::any::Any;

use bstr::BString;

use crate::{
    codec::{
        BytesDecoder, BytesEncoder, Codec, Decoder, ElementDecoder, ElementEncoder,
        FieldDecoder, FieldEncoder, NilDecoder, ScalarDecoder, ScalarEncoder, StringDecoder,
        StringEncoder, TextAppender,
    },
    encode::{ElementSink, FieldSink},
    error::Result,
    scalar::{Place, Scalar, Slot, SlotKind},
};

macro_rules! slot_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Codec for $ty {
                fn as_any(&mut self) -> Option<&mut dyn Any> {
                    Some(self)
                }

                fn as_slot(&mut self) -> Option<Slot<'_>> {
                    Some(<$ty as SlotKind>::slot(Place::Value(self)))
                }

                fn as_scalar(&self) -> Option<Scalar<'_>> {
                    Some(SlotKind::scalar(self))
                }
            }
        )*
    };
}

slot_codec!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, BString,
);

impl<T: SlotKind + 'static> NilDecoder for Option<T> {
    fn decode_nil(&mut self) -> Result<()> {
        *self = None;
        Ok(())
    }
}

impl<T: SlotKind + 'static> Codec for Option<T> {
    fn as_any(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }

    fn as_slot(&mut self) -> Option<Slot<'_>> {
        Some(T::slot(Place::Optional(self)))
    }

    fn as_nil_decoder(&mut self) -> Option<&mut dyn NilDecoder> {
        Some(self)
    }

    fn is_nil(&self) -> bool {
        self.is_none()
    }

    fn as_scalar(&self) -> Option<Scalar<'_>> {
        self.as_ref().map(SlotKind::scalar)
    }
}

impl<T: Codec + Default + 'static> ElementDecoder for Vec<T> {
    fn begin_elements(&mut self) -> Result<()> {
        self.clear();
        Ok(())
    }

    fn decode_element(&mut self, dec: &mut dyn Decoder, index: usize, _name: &str) -> Result<()> {
        let mut item = T::default();
        dec.decode(&mut item)?;
        match self.get_mut(index) {
            Some(existing) => *existing = item,
            None => self.push(item),
        }
        Ok(())
    }
}

impl<T: Codec + Default + 'static> ElementEncoder for Vec<T> {
    fn encode_elements(&self, elements: &mut dyn ElementSink) -> Result<()> {
        self.iter().try_for_each(|v| elements.encode_element(v))
    }
}

impl<T: Codec + Default + 'static> Codec for Vec<T> {
    fn as_any(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }

    fn as_element_decoder(&mut self) -> Option<&mut dyn ElementDecoder> {
        Some(self)
    }

    fn as_element_encoder(&self) -> Option<&dyn ElementEncoder> {
        Some(self)
    }
}

impl<V: Codec + Default + 'static> FieldDecoder for BTreeMap<String, V> {
    fn decode_field(&mut self, dec: &mut dyn Decoder, _index: usize, name: &str) -> Result<()> {
        let mut value = V::default();
        dec.decode(&mut value)?;
        self.insert(name.to_string(), value);
        Ok(())
    }
}

impl<V: Codec + Default + 'static> FieldEncoder for BTreeMap<String, V> {
    fn encode_fields(&self, fields: &mut dyn FieldSink) -> Result<()> {
        self.iter().try_for_each(|(k, v)| fields.encode_field(k, v))
    }
}

impl<V: Codec + Default + 'static> Codec for BTreeMap<String, V> {
    fn as_any(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }

    fn as_field_decoder(&mut self) -> Option<&mut dyn FieldDecoder> {
        Some(self)
    }

    fn as_field_encoder(&self) -> Option<&dyn FieldEncoder> {
        Some(self)
    }
}

#[cfg(feature = "std")]
mod hash_map {
    use alloc::{string::String, vec::Vec};
    use core::{any::Any, hash::BuildHasher};
    use std::collections::HashMap;

    use super::*;

    impl<V, S> FieldDecoder for HashMap<String, V, S>
    where
        V: Codec + Default + 'static,
        S: BuildHasher + 'static,
    {
        fn decode_field(&mut self, dec: &mut dyn Decoder, _index: usize, name: &str) -> Result<()> {
            let mut value = V::default();
            dec.decode(&mut value)?;
            self.insert(name.to_string(), value);
            Ok(())
        }
    }

    /// Members are written in key order so output is reproducible.
    impl<V, S> FieldEncoder for HashMap<String, V, S>
    where
        V: Codec + Default + 'static,
        S: BuildHasher + 'static,
    {
        fn encode_fields(&self, fields: &mut dyn FieldSink) -> Result<()> {
            let mut entries: Vec<_> = self.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            entries
                .into_iter()
                .try_for_each(|(k, v)| fields.encode_field(k, v))
        }
    }

    impl<V, S> Codec for HashMap<String, V, S>
    where
        V: Codec + Default + 'static,
        S: BuildHasher + 'static,
    {
        fn as_any(&mut self) -> Option<&mut dyn Any> {
            Some(self)
        }

        fn as_field_decoder(&mut self) -> Option<&mut dyn FieldDecoder> {
            Some(self)
        }

        fn as_field_encoder(&self) -> Option<&dyn FieldEncoder> {
            Some(self)
        }
    }
}

/// Shared references encode as their referent and cannot be decoded into.
impl<T: Codec + ?Sized> Codec for &T {
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn as_scalar(&self) -> Option<Scalar<'_>> {
        (**self).as_scalar()
    }

    fn as_bool_encoder(&self) -> Option<&dyn ScalarEncoder<bool>> {
        (**self).as_bool_encoder()
    }

    fn as_int_encoder(&self) -> Option<&dyn ScalarEncoder<i64>> {
        (**self).as_int_encoder()
    }

    fn as_uint_encoder(&self) -> Option<&dyn ScalarEncoder<u64>> {
        (**self).as_uint_encoder()
    }

    fn as_float_encoder(&self) -> Option<&dyn ScalarEncoder<f64>> {
        (**self).as_float_encoder()
    }

    fn as_string_encoder(&self) -> Option<&dyn StringEncoder> {
        (**self).as_string_encoder()
    }

    fn as_bytes_encoder(&self) -> Option<&dyn BytesEncoder> {
        (**self).as_bytes_encoder()
    }

    fn as_field_encoder(&self) -> Option<&dyn FieldEncoder> {
        (**self).as_field_encoder()
    }

    fn as_element_encoder(&self) -> Option<&dyn ElementEncoder> {
        (**self).as_element_encoder()
    }
}

/// A destination that accepts and drops any value.
///
/// Aggregates are drained by the engine because `Discard` exposes no member
/// capabilities. [`Decoder::skip`] decodes into it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl NilDecoder for Discard {
    fn decode_nil(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ScalarDecoder<bool> for Discard {
    fn decode_scalar(&mut self, _: bool) -> Result<()> {
        Ok(())
    }
}

impl StringDecoder for Discard {
    fn decode_string(&mut self, _: &str) -> Result<()> {
        Ok(())
    }
}

impl BytesDecoder for Discard {
    fn decode_bytes(&mut self, _: &[u8]) -> Result<()> {
        Ok(())
    }
}

impl TextAppender for Discard {
    fn append_text(&mut self, _: &[u8]) -> Result<()> {
        Ok(())
    }
}

impl Codec for Discard {
    fn as_nil_decoder(&mut self) -> Option<&mut dyn NilDecoder> {
        Some(self)
    }

    fn as_bool_decoder(&mut self) -> Option<&mut dyn ScalarDecoder<bool>> {
        Some(self)
    }

    fn as_string_decoder(&mut self) -> Option<&mut dyn StringDecoder> {
        Some(self)
    }

    fn as_bytes_decoder(&mut self) -> Option<&mut dyn BytesDecoder> {
        Some(self)
    }

    fn as_text_appender(&mut self) -> Option<&mut dyn TextAppender> {
        Some(self)
    }

    fn is_nil(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::decode::{Primitive, decode_primitive};

    #[test]
    fn optional_scalar_accepts_nil() {
        let mut v = Some(4u32);
        assert!(decode_primitive(&mut v, Primitive::Nil).unwrap());
        assert_eq!(v, None);
        assert!(v.is_nil());
    }

    #[test]
    fn discard_accepts_every_primitive() {
        for p in [
            Primitive::Nil,
            Primitive::Bool(true),
            Primitive::Number("1.5"),
            Primitive::String("x"),
            Primitive::Bytes(b"\0"),
            Primitive::Text(b"t"),
        ] {
            assert!(decode_primitive(&mut Discard, p).unwrap(), "{p:?}");
        }
    }

    #[test]
    fn sequences_overwrite_then_grow() {
        struct Fixed<'a>(&'a str);
        impl Decoder for Fixed<'_> {
            fn decode(&mut self, v: &mut dyn Codec) -> Result<()> {
                decode_primitive(v, Primitive::Number(self.0)).map(|_| ())
            }
        }
        let mut v = vec![1u8, 2];
        v.decode_element(&mut Fixed("9"), 0, "").unwrap();
        v.decode_element(&mut Fixed("7"), 2, "").unwrap();
        assert_eq!(v, [9, 2, 7]);
    }

    #[test]
    fn scalars_expose_themselves_to_resolvers() {
        let mut s = String::from("x");
        assert!(s.as_any().is_some_and(|any| any.is::<String>()));
        assert_eq!(s.as_scalar(), Some(Scalar::Str("x")));
    }
}
