//! Scalar conversion rules.
//!
//! A [`Slot`] is a typed, writable view of a destination that *is* a scalar
//! (or an `Option` of one). A [`Scalar`] is the read-only counterpart used
//! when encoding, normalized to the canonical carriers `bool`, `i64`, `u64`,
//! `f64`, `str` and bytes.
use alloc::string::{String, ToString};
use core::{fmt, str::FromStr};

use bstr::BString;

use crate::error::{Error, Result};

/// Recognizes the textual boolean forms accepted by the codec.
///
/// `""`, `"0"`, `"false"` and `"FALSE"` are `false`; `"1"`, `"true"` and
/// `"TRUE"` are `true`. Any other string is not a boolean and yields `None`.
///
/// ```
/// use capcodec::parse_bool_str;
///
/// assert_eq!(parse_bool_str("FALSE"), Some(false));
/// assert_eq!(parse_bool_str("1"), Some(true));
/// assert_eq!(parse_bool_str("yes"), None);
/// ```
#[must_use]
pub fn parse_bool_str(s: &str) -> Option<bool> {
    match s {
        "" | "0" | "false" | "FALSE" => Some(false),
        "1" | "true" | "TRUE" => Some(true),
        _ => None,
    }
}

/// Parses base-10 `text` as `T`, keeping the original text on failure.
pub(crate) fn parse_number<T>(text: &str, kind: &'static str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.parse::<T>().map_err(|err| Error::InvalidNumber {
        text: text.to_string(),
        kind,
        reason: err.to_string(),
    })
}

/// Returns `true` when `text` looks like an integer (`-?[0-9]+`).
pub(crate) fn is_integral(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Where a scalar gets written: the value itself, or an `Option` that is
/// filled with a default value on first write.
#[derive(Debug)]
pub enum Place<'a, T> {
    /// The destination is the scalar itself.
    Value(&'a mut T),
    /// The destination is one level of optional indirection.
    Optional(&'a mut Option<T>),
}

impl<'a, T: Default> Place<'a, T> {
    /// Overwrites the destination, allocating an `Option` if needed.
    pub fn set(self, value: T) {
        match self {
            Place::Value(slot) => *slot = value,
            Place::Optional(slot) => *slot = Some(value),
        }
    }

    /// Binds the destination, constructing a default value if it is empty.
    pub fn get_mut(self) -> &'a mut T {
        match self {
            Place::Value(slot) => slot,
            Place::Optional(slot) => slot.get_or_insert_with(T::default),
        }
    }
}

/// A writable view of a destination that is a built-in scalar type.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum Slot<'a> {
    Bool(Place<'a, bool>),
    I8(Place<'a, i8>),
    I16(Place<'a, i16>),
    I32(Place<'a, i32>),
    I64(Place<'a, i64>),
    Isize(Place<'a, isize>),
    U8(Place<'a, u8>),
    U16(Place<'a, u16>),
    U32(Place<'a, u32>),
    U64(Place<'a, u64>),
    Usize(Place<'a, usize>),
    F32(Place<'a, f32>),
    F64(Place<'a, f64>),
    String(Place<'a, String>),
    Bytes(Place<'a, BString>),
}

impl Slot<'_> {
    /// The Rust type name of the slot, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Bool(_) => "bool",
            Slot::I8(_) => "i8",
            Slot::I16(_) => "i16",
            Slot::I32(_) => "i32",
            Slot::I64(_) => "i64",
            Slot::Isize(_) => "isize",
            Slot::U8(_) => "u8",
            Slot::U16(_) => "u16",
            Slot::U32(_) => "u32",
            Slot::U64(_) => "u64",
            Slot::Usize(_) => "usize",
            Slot::F32(_) => "f32",
            Slot::F64(_) => "f64",
            Slot::String(_) => "String",
            Slot::Bytes(_) => "BString",
        }
    }

    /// Writes a boolean. Returns `false` if this is not a `bool` slot.
    pub(crate) fn set_bool(self, b: bool) -> bool {
        match self {
            Slot::Bool(place) => {
                place.set(b);
                true
            }
            _ => false,
        }
    }

    /// Parses `text` with the slot's width as the bound and writes it.
    ///
    /// Returns `Ok(false)` for non-numeric slots; a parse failure is an error
    /// because a decode was attempted.
    pub(crate) fn set_number(self, text: &str) -> Result<bool> {
        let kind = self.kind();
        match self {
            Slot::I8(p) => p.set(parse_number(text, kind)?),
            Slot::I16(p) => p.set(parse_number(text, kind)?),
            Slot::I32(p) => p.set(parse_number(text, kind)?),
            Slot::I64(p) => p.set(parse_number(text, kind)?),
            Slot::Isize(p) => p.set(parse_number(text, kind)?),
            Slot::U8(p) => p.set(parse_number(text, kind)?),
            Slot::U16(p) => p.set(parse_number(text, kind)?),
            Slot::U32(p) => p.set(parse_number(text, kind)?),
            Slot::U64(p) => p.set(parse_number(text, kind)?),
            Slot::Usize(p) => p.set(parse_number(text, kind)?),
            Slot::F32(p) => p.set(parse_number(text, kind)?),
            Slot::F64(p) => p.set(parse_number(text, kind)?),
            Slot::Bool(_) | Slot::String(_) | Slot::Bytes(_) => return Ok(false),
        }
        Ok(true)
    }

    /// Replaces a string slot. Returns `false` for other slots.
    pub(crate) fn set_string(self, s: &str) -> bool {
        match self {
            Slot::String(place) => {
                place.set(s.to_string());
                true
            }
            _ => false,
        }
    }

    /// Replaces a byte slot. Returns `false` for other slots.
    pub(crate) fn set_bytes(self, data: &[u8]) -> bool {
        match self {
            Slot::Bytes(place) => {
                place.set(BString::from(data));
                true
            }
            _ => false,
        }
    }

    /// Appends to a byte or string slot without discarding existing content.
    ///
    /// Returns `Ok(false)` for other slots. Appending bytes that are not
    /// UTF-8 to a string slot is an error.
    pub(crate) fn append(self, text: &[u8]) -> Result<bool> {
        match self {
            Slot::Bytes(place) => {
                place.get_mut().extend_from_slice(text);
                Ok(true)
            }
            Slot::String(place) => {
                let text = core::str::from_utf8(text).map_err(Error::custom)?;
                place.get_mut().push_str(text);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// A read-only scalar, normalized to one of the canonical carriers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum Scalar<'a> {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(&'a str),
    Bytes(&'a [u8]),
}

/// Built-in scalar types that can sit behind a [`Slot`].
///
/// Implemented for `bool`, the integer and float primitives, `String` and
/// `BString`. `Option<T>` of any of these is a codec through this trait.
pub trait SlotKind: Default + Sized {
    /// Wraps a place holding `Self` into the matching slot variant.
    fn slot(place: Place<'_, Self>) -> Slot<'_>;

    /// Reads `self` as a canonical scalar.
    fn scalar(&self) -> Scalar<'_>;
}

macro_rules! impl_slot_kind {
    ($($ty:ty => $variant:ident, |$v:ident| $scalar:expr;)*) => {
        $(
            impl SlotKind for $ty {
                fn slot(place: Place<'_, Self>) -> Slot<'_> {
                    Slot::$variant(place)
                }

                fn scalar(&self) -> Scalar<'_> {
                    let $v = self;
                    $scalar
                }
            }
        )*
    };
}

impl_slot_kind! {
    bool => Bool, |v| Scalar::Bool(*v);
    i8 => I8, |v| Scalar::Int(i64::from(*v));
    i16 => I16, |v| Scalar::Int(i64::from(*v));
    i32 => I32, |v| Scalar::Int(i64::from(*v));
    i64 => I64, |v| Scalar::Int(*v);
    isize => Isize, |v| Scalar::Int(*v as i64);
    u8 => U8, |v| Scalar::Uint(u64::from(*v));
    u16 => U16, |v| Scalar::Uint(u64::from(*v));
    u32 => U32, |v| Scalar::Uint(u64::from(*v));
    u64 => U64, |v| Scalar::Uint(*v);
    usize => Usize, |v| Scalar::Uint(*v as u64);
    f32 => F32, |v| Scalar::Float(f64::from(*v));
    f64 => F64, |v| Scalar::Float(*v);
    String => String, |v| Scalar::Str(v.as_str());
    BString => Bytes, |v| Scalar::Bytes(v.as_slice());
}
