//! Codec substitution ahead of capability dispatch.
//!
//! Engines run every destination through their resolver chain before probing
//! its capabilities. A resolver either supplies a substitute codec (typically
//! an adapter that borrows the original value) or hands the value back
//! untouched for the next resolver to inspect.
use alloc::{boxed::Box, collections::BTreeMap};
use core::{
    any::{Any, TypeId},
    fmt,
    marker::PhantomData,
};

use tracing::debug;

use crate::codec::Codec;

/// The outcome of asking a [`Resolver`] about a value.
pub enum Resolved<'v> {
    /// A substitute codec to dispatch through instead of the value.
    Codec(Box<dyn Codec + 'v>),
    /// The original value, handed back because no substitute applies.
    Value(&'v mut dyn Codec),
}

impl Resolved<'_> {
    /// The codec to dispatch through.
    pub fn codec_mut(&mut self) -> &mut dyn Codec {
        match self {
            Resolved::Codec(codec) => &mut **codec,
            Resolved::Value(v) => &mut **v,
        }
    }

    /// Returns `true` when a resolver substituted the value.
    #[must_use]
    pub fn is_substitute(&self) -> bool {
        matches!(self, Resolved::Codec(_))
    }
}

impl fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resolved::Codec(_) => "Resolved::Codec(..)",
            Resolved::Value(_) => "Resolved::Value(..)",
        })
    }
}

/// A strategy that may substitute a codec for a value.
///
/// Resolvers must not depend on or change stream state: the same value
/// always resolves the same way.
pub trait Resolver {
    /// Returns a substitute for `v`, or hands `v` back.
    fn resolve_codec<'v>(&self, v: &'v mut dyn Codec) -> Resolved<'v>;
}

/// Runs `v` through `resolvers` in order and returns the first substitute.
///
/// If no resolver substitutes, `v` itself is returned. There is no
/// backtracking: later resolvers are not consulted once one matches.
pub fn resolve<'v>(v: &'v mut dyn Codec, resolvers: &[Box<dyn Resolver>]) -> Resolved<'v> {
    let mut current = v;
    for (position, resolver) in resolvers.iter().enumerate() {
        match resolver.resolve_codec(current) {
            Resolved::Value(back) => current = back,
            substitute @ Resolved::Codec(_) => {
                debug!(position, "resolver substituted codec");
                return substitute;
            }
        }
    }
    Resolved::Value(current)
}

/// Downcasts a codec to its concrete type through [`Codec::as_any`].
///
/// Returns the codec unchanged when it does not expose itself or has a
/// different type.
///
/// # Errors
///
/// The `Err` variant carries `v` back.
pub fn downcast_codec<T: Any>(v: &mut dyn Codec) -> Result<&mut T, &mut dyn Codec> {
    if !v.as_any().is_some_and(|any| any.is::<T>()) {
        return Err(v);
    }
    Ok(v
        .as_any()
        .and_then(|any| any.downcast_mut::<T>())
        .expect("type checked above"))
}

/// Gives a value of a foreign type a codec identity without capabilities.
///
/// An `Opaque` has nothing to dispatch through on its own; it exists so a
/// [`TypeResolver`] can recognize the wrapped type and substitute an adapter.
pub struct Opaque<'a, T: Any>(pub &'a mut T);

impl<T: Any> Codec for Opaque<'_, T> {
    fn as_any(&mut self) -> Option<&mut dyn Any> {
        Some(&mut *self.0)
    }
}

trait Adapt {
    fn adapt<'v>(&self, any: &'v mut dyn Any) -> Option<Box<dyn Codec + 'v>>;
}

struct ByType<T, F> {
    adapter: F,
    _type: PhantomData<fn(&mut T)>,
}

impl<T: Any, F> Adapt for ByType<T, F>
where
    F: for<'v> Fn(&'v mut T) -> Box<dyn Codec + 'v>,
{
    fn adapt<'v>(&self, any: &'v mut dyn Any) -> Option<Box<dyn Codec + 'v>> {
        any.downcast_mut::<T>().map(|t| (self.adapter)(t))
    }
}

/// A registry of adapters keyed by the concrete type of the destination.
///
/// ```
/// use capcodec::{Codec, Decoder, Opaque, Result, StringDecoder, TypeResolver};
///
/// // A type from another crate that cannot implement `Codec` itself.
/// struct Celsius(f64);
///
/// struct CelsiusText<'a>(&'a mut Celsius);
///
/// impl StringDecoder for CelsiusText<'_> {
///     fn decode_string(&mut self, s: &str) -> Result<()> {
///         let n = s.trim_end_matches('C').parse().map_err(capcodec::Error::custom)?;
///         self.0.0 = n;
///         Ok(())
///     }
/// }
///
/// impl Codec for CelsiusText<'_> {
///     fn as_string_decoder(&mut self) -> Option<&mut dyn StringDecoder> {
///         Some(self)
///     }
/// }
///
/// let types = TypeResolver::new().register(|c: &mut Celsius| Box::new(CelsiusText(c)));
/// let mut t = Celsius(0.0);
/// capcodec::json::JsonDecoder::new(r#""21.5C""#)
///     .with_resolver(types)
///     .decode(&mut Opaque(&mut t))
///     .unwrap();
/// assert_eq!(t.0, 21.5);
/// ```
#[derive(Default)]
pub struct TypeResolver {
    adapters: BTreeMap<TypeId, Box<dyn Adapt>>,
}

impl TypeResolver {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter` for values of type `T`, replacing any previous
    /// registration for `T`.
    #[must_use]
    pub fn register<T, F>(mut self, adapter: F) -> Self
    where
        T: Any,
        F: for<'v> Fn(&'v mut T) -> Box<dyn Codec + 'v> + 'static,
    {
        self.adapters.insert(
            TypeId::of::<T>(),
            Box::new(ByType {
                adapter,
                _type: PhantomData,
            }),
        );
        self
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns `true` if no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeResolver")
            .field("types", &self.adapters.len())
            .finish()
    }
}

impl Resolver for TypeResolver {
    fn resolve_codec<'v>(&self, v: &'v mut dyn Codec) -> Resolved<'v> {
        let Some(id) = v.as_any().map(|any| Any::type_id(&*any)) else {
            return Resolved::Value(v);
        };
        let Some(adapter) = self.adapters.get(&id) else {
            return Resolved::Value(v);
        };
        match v.as_any().and_then(|any| adapter.adapt(any)) {
            Some(codec) => Resolved::Codec(codec),
            None => unreachable!("type id matched but downcast failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec, vec::Vec};

    use super::*;
    use crate::codec::StringDecoder;

    /// Substitutes a codec that records the resolver's tag, or hands back.
    struct Tagging {
        tag: &'static str,
        active: bool,
    }

    struct Tagged<'v> {
        target: &'v mut String,
        tag: &'static str,
    }

    impl StringDecoder for Tagged<'_> {
        fn decode_string(&mut self, s: &str) -> crate::Result<()> {
            *self.target = alloc::format!("{}:{s}", self.tag);
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
            if !self.active {
                return Resolved::Value(v);
            }
            match downcast_codec::<String>(v) {
                Ok(target) => Resolved::Codec(Box::new(Tagged {
                    target,
                    tag: self.tag,
                })),
                Err(v) => Resolved::Value(v),
            }
        }
    }

    fn chain(tags: &[(&'static str, bool)]) -> Vec<Box<dyn Resolver>> {
        tags.iter()
            .map(|&(tag, active)| Box::new(Tagging { tag, active }) as Box<dyn Resolver>)
            .collect()
    }

    #[test]
    fn first_substitute_wins() {
        let resolvers = chain(&[("r1", false), ("r2", true), ("r3", true)]);
        let mut s = String::new();
        let mut resolved = resolve(&mut s, &resolvers);
        assert!(resolved.is_substitute());
        resolved
            .codec_mut()
            .as_string_decoder()
            .unwrap()
            .decode_string("v")
            .unwrap();
        drop(resolved);
        assert_eq!(s, "r2:v");
    }

    #[test]
    fn no_match_returns_original() {
        let resolvers = chain(&[("r1", false)]);
        let mut n = 0u8;
        let resolved = resolve(&mut n, &resolvers);
        assert!(!resolved.is_substitute());
    }

    #[test]
    fn downcast_hands_back_on_mismatch() {
        let mut n = 3u16;
        assert!(downcast_codec::<u32>(&mut n).is_err());
        *downcast_codec::<u16>(&mut n).ok().unwrap() = 4;
        assert_eq!(n, 4);
    }

    #[test]
    fn type_resolver_only_matches_registered_types() {
        let types = TypeResolver::new().register(|s: &mut String| {
            Box::new(Tagged {
                target: s,
                tag: "typed",
            }) as Box<dyn Codec + '_>
        });
        assert_eq!(types.len(), 1);

        let mut other = vec![1u8];
        assert!(!types.resolve_codec(&mut other).is_substitute());

        let mut s = String::new();
        let mut resolved = types.resolve_codec(&mut s);
        resolved
            .codec_mut()
            .as_string_decoder()
            .unwrap()
            .decode_string("v")
            .unwrap();
        drop(resolved);
        assert_eq!(s, "typed:v");
    }
}
