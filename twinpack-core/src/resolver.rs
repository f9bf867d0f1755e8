//! Type to formatter lookup.
//!
//! A [`Resolver`] answers "which formatter handles this type?" keyed by
//! [`TypeId`]. Three building blocks cover the usual layering:
//!
//! - [`ConcreteResolver`] holds ready-made formatters for exact types
//!   (primitives, strings, well-known library types).
//! - [`GenericResolver`] holds constructors for instantiations of generic
//!   containers (`Vec<T>`, `HashMap<K, V>`, tuples) registered through the
//!   [`Generic`] trait; the formatter is built on first lookup.
//! - [`CompositeResolver`] chains any number of resolvers, first match wins,
//!   and memoizes every answer (including misses) per type.

use core::any::{Any, TypeId, type_name};
use core::marker::PhantomData;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Error, Format, Formatter, Result};

/// A formatter for some type, with the type erased.
///
/// Holds an `Arc<dyn Formatter<F, T>>` behind `dyn Any`, so one map can
/// store formatters for unrelated types. Cloning is a reference count bump.
#[derive(Clone)]
pub struct ErasedFormatter {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ErasedFormatter {
    /// Erase a formatter for `T`.
    pub fn new<F: Format, T: 'static>(formatter: Arc<dyn Formatter<F, T>>) -> Self {
        Self {
            inner: Arc::new(formatter),
            type_name: type_name::<T>(),
        }
    }

    /// Recover the typed formatter. `None` if this does not format `T` in `F`.
    pub fn downcast<F: Format, T: 'static>(&self) -> Option<Arc<dyn Formatter<F, T>>> {
        self.inner
            .downcast_ref::<Arc<dyn Formatter<F, T>>>()
            .cloned()
    }

    /// Name of the formatted type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl core::fmt::Debug for ErasedFormatter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("ErasedFormatter")
            .field(&self.type_name)
            .finish()
    }
}

/// Lookup service from a type to its formatter in format `F`.
pub trait Resolver<F: Format>: Send + Sync {
    /// The formatter registered for `type_id`, if any.
    fn resolve(&self, type_id: TypeId) -> Option<ErasedFormatter>;
}

/// Typed lookups on top of [`Resolver::resolve`].
pub trait ResolverExt<F: Format>: Resolver<F> {
    /// The formatter for `T`, or `None` if no resolver in the chain knows it.
    fn get<T: 'static>(&self) -> Option<Arc<dyn Formatter<F, T>>> {
        self.resolve(TypeId::of::<T>())?.downcast::<F, T>()
    }

    /// The formatter for `T`, failing with [`ErrorKind::NoFormatter`](crate::ErrorKind::NoFormatter)
    /// when none is registered.
    fn get_with_verify<T: 'static>(&self) -> Result<Arc<dyn Formatter<F, T>>> {
        self.get::<T>().ok_or_else(Error::no_formatter::<T>)
    }
}

impl<F: Format, R: Resolver<F> + ?Sized> ResolverExt<F> for R {}

impl<F: Format, R: Resolver<F> + ?Sized> Resolver<F> for Arc<R> {
    fn resolve(&self, type_id: TypeId) -> Option<ErasedFormatter> {
        (**self).resolve(type_id)
    }
}

impl<F: Format, R: Resolver<F> + ?Sized> Resolver<F> for &R {
    fn resolve(&self, type_id: TypeId) -> Option<ErasedFormatter> {
        (**self).resolve(type_id)
    }
}

/// Exact-type table.
pub struct ConcreteResolver<F> {
    formatters: HashMap<TypeId, ErasedFormatter>,
    _format: PhantomData<fn() -> F>,
}

impl<F: Format> ConcreteResolver<F> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            formatters: HashMap::new(),
            _format: PhantomData,
        }
    }

    /// Register `formatter` for `T`, replacing any earlier registration.
    pub fn with<T: 'static>(mut self, formatter: impl Formatter<F, T> + 'static) -> Self {
        self.insert::<T>(Arc::new(formatter));
        self
    }

    /// Register a shared formatter for `T`.
    pub fn insert<T: 'static>(&mut self, formatter: Arc<dyn Formatter<F, T>>) {
        self.formatters
            .insert(TypeId::of::<T>(), ErasedFormatter::new(formatter));
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.formatters.len()
    }
}

impl<F: Format> Resolver<F> for ConcreteResolver<F> {
    fn resolve(&self, type_id: TypeId) -> Option<ErasedFormatter> {
        self.formatters.get(&type_id).cloned()
    }
}

/// A type whose formatter can be built without configuration, usually a
/// generic container instantiated at concrete element types.
pub trait Generic<F: Format>: Sized + 'static {
    /// Build the formatter for this type.
    fn formatter() -> Arc<dyn Formatter<F, Self>>;
}

fn construct<F: Format, T: Generic<F>>() -> ErasedFormatter {
    ErasedFormatter::new::<F, T>(T::formatter())
}

/// Constructors for [`Generic`] instantiations.
///
/// Nothing is built until a lookup asks for it; wrap this in a
/// [`CompositeResolver`] so each formatter is built at most once.
pub struct GenericResolver<F> {
    constructors: HashMap<TypeId, fn() -> ErasedFormatter>,
    _format: PhantomData<fn() -> F>,
}

impl<F: Format> GenericResolver<F> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
            _format: PhantomData,
        }
    }

    /// Register the instantiation `T`.
    pub fn register<T: Generic<F>>(mut self) -> Self {
        self.constructors
            .insert(TypeId::of::<T>(), construct::<F, T>);
        self
    }

    /// Number of registered instantiations.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }
}

impl<F: Format> Resolver<F> for GenericResolver<F> {
    fn resolve(&self, type_id: TypeId) -> Option<ErasedFormatter> {
        let constructor = self.constructors.get(&type_id)?;
        let formatter = constructor();
        trace!(format = F::NAME, ty = formatter.type_name(), "constructed generic formatter");
        Some(formatter)
    }
}

/// Ordered chain of resolvers with a per-type memo.
///
/// Earlier resolvers take priority, so an application resolver placed in
/// front of the built-in one can override any default.
pub struct CompositeResolver<F> {
    resolvers: Vec<Arc<dyn Resolver<F>>>,
    cache: RwLock<HashMap<TypeId, Option<ErasedFormatter>>>,
}

impl<F: Format> CompositeResolver<F> {
    /// An empty chain; resolves nothing.
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Append a resolver to the end of the chain.
    pub fn with(self, resolver: impl Resolver<F> + 'static) -> Self {
        self.with_shared(Arc::new(resolver))
    }

    /// Append a shared resolver to the end of the chain.
    pub fn with_shared(mut self, resolver: Arc<dyn Resolver<F>>) -> Self {
        self.resolvers.push(resolver);
        self.cache.get_mut().clear();
        self
    }

    /// Number of chained resolvers.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Number of memoized lookups, hits and misses alike.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }
}

impl<F: Format> Resolver<F> for CompositeResolver<F> {
    fn resolve(&self, type_id: TypeId) -> Option<ErasedFormatter> {
        if let Some(entry) = self.cache.read().get(&type_id) {
            return entry.clone();
        }

        let found = self
            .resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(type_id));
        match &found {
            Some(formatter) => debug!(
                format = F::NAME,
                ty = formatter.type_name(),
                "resolver cache fill"
            ),
            None => debug!(format = F::NAME, ?type_id, "resolver cache miss"),
        }

        // A racing thread may have filled the slot; keep the first answer.
        self.cache
            .write()
            .entry(type_id)
            .or_insert(found)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fields, FieldMatch, SeqState};
    use twinpack_testhelpers::test;

    /// A format that can frame nothing; enough to exercise lookups.
    struct Inert;

    impl Format for Inert {
        const NAME: &'static str = "inert";

        fn write_nil(_: &mut Vec<u8>, _: &mut usize) -> Result<()> {
            Ok(())
        }
        fn try_read_nil(_: &[u8], _: &mut usize) -> Result<bool> {
            Ok(true)
        }
        fn write_array_start(_: &mut Vec<u8>, _: &mut usize, _: usize) -> Result<()> {
            Ok(())
        }
        fn write_array_separator(_: &mut Vec<u8>, _: &mut usize) -> Result<()> {
            Ok(())
        }
        fn write_array_end(_: &mut Vec<u8>, _: &mut usize) -> Result<()> {
            Ok(())
        }
        fn read_array_start(_: &[u8], _: &mut usize) -> Result<SeqState> {
            Ok(SeqState::counted(0))
        }
        fn read_array_next(_: &[u8], _: &mut usize, s: &mut SeqState) -> Result<Option<usize>> {
            Ok(s.advance())
        }
        fn write_map_start(_: &mut Vec<u8>, _: &mut usize, _: usize) -> Result<()> {
            Ok(())
        }
        fn write_map_separator(_: &mut Vec<u8>, _: &mut usize) -> Result<()> {
            Ok(())
        }
        fn write_map_key<K>(
            b: &mut Vec<u8>,
            c: &mut usize,
            k: &K,
            f: &dyn Formatter<Self, K>,
            r: &dyn Resolver<Self>,
        ) -> Result<()> {
            f.serialize(b, c, k, r)
        }
        fn write_map_end(_: &mut Vec<u8>, _: &mut usize) -> Result<()> {
            Ok(())
        }
        fn read_map_start(_: &[u8], _: &mut usize) -> Result<SeqState> {
            Ok(SeqState::counted(0))
        }
        fn read_map_next(_: &[u8], _: &mut usize, s: &mut SeqState) -> Result<Option<usize>> {
            Ok(s.advance())
        }
        fn read_map_key<K>(
            b: &[u8],
            c: &mut usize,
            f: &dyn Formatter<Self, K>,
            r: &dyn Resolver<Self>,
        ) -> Result<K> {
            f.deserialize(b, c, r)
        }
        fn write_record_start(_: &mut Vec<u8>, _: &mut usize, _: &Fields) -> Result<()> {
            Ok(())
        }
        fn write_field_name(_: &mut Vec<u8>, _: &mut usize, _: usize, _: &Fields) -> Result<()> {
            Ok(())
        }
        fn write_record_end(_: &mut Vec<u8>, _: &mut usize, _: &Fields) -> Result<()> {
            Ok(())
        }
        fn read_record_start(_: &[u8], _: &mut usize) -> Result<SeqState> {
            Ok(SeqState::counted(0))
        }
        fn read_record_next(_: &[u8], _: &mut usize, s: &mut SeqState) -> Result<Option<usize>> {
            Ok(s.advance())
        }
        fn read_field_name(_: &[u8], _: &mut usize, o: usize, _: &Fields) -> Result<FieldMatch> {
            Ok(FieldMatch::Known(o))
        }
        fn skip_value(_: &[u8], _: &mut usize) -> Result<()> {
            Ok(())
        }
        fn unexpected(_: &[u8], offset: usize, expected: &'static str) -> Error {
            Error::invalid_code(0, "inert", expected, offset)
        }
    }

    /// Writes a fixed tag byte so tests can tell formatters apart.
    struct Tagged(u8);

    impl Formatter<Inert, u32> for Tagged {
        fn serialize(
            &self,
            buffer: &mut Vec<u8>,
            cursor: &mut usize,
            _value: &u32,
            _resolver: &dyn Resolver<Inert>,
        ) -> Result<()> {
            crate::buffer::write_u8(buffer, cursor, self.0)
        }

        fn deserialize(&self, _: &[u8], _: &mut usize, _: &dyn Resolver<Inert>) -> Result<u32> {
            Ok(self.0 as u32)
        }
    }

    struct Unregistered;

    fn tag_of(resolver: &dyn Resolver<Inert>) -> u32 {
        let formatter = resolver.get_with_verify::<u32>().unwrap();
        formatter.deserialize(&[], &mut 0, resolver).unwrap()
    }

    #[test]
    fn concrete_lookup_and_verify_failure() {
        let resolver = ConcreteResolver::<Inert>::new().with::<u32>(Tagged(7));
        assert_eq!(tag_of(&resolver), 7);
        assert!(resolver.get::<Unregistered>().is_none());

        let err = resolver.get_with_verify::<Unregistered>().err().unwrap();
        assert_eq!(err.kind.code(), "twinpack::no_formatter");
        assert!(err.to_string().contains("Unregistered"));
    }

    #[test]
    fn first_resolver_in_chain_wins() {
        let resolver = CompositeResolver::<Inert>::new()
            .with(ConcreteResolver::new().with::<u32>(Tagged(1)))
            .with(ConcreteResolver::new().with::<u32>(Tagged(2)));
        assert_eq!(tag_of(&resolver), 1);
    }

    #[test]
    fn composite_memoizes_hits_and_misses() {
        let resolver =
            CompositeResolver::<Inert>::new().with(ConcreteResolver::new().with::<u32>(Tagged(3)));
        assert_eq!(resolver.cached(), 0);

        assert!(resolver.get::<u32>().is_some());
        assert!(resolver.get::<u32>().is_some());
        assert!(resolver.get::<Unregistered>().is_none());
        assert_eq!(resolver.cached(), 2);
    }

    #[test]
    fn erased_formatter_rejects_wrong_type() {
        let erased = ErasedFormatter::new::<Inert, u32>(Arc::new(Tagged(0)));
        assert!(erased.downcast::<Inert, u32>().is_some());
        assert!(erased.downcast::<Inert, u64>().is_none());
        assert_eq!(erased.type_name(), "u32");
    }
}
