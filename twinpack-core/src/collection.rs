use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::{
    Dictionary, Format, Formatter, Generic, GenericResolver, Resolver, ResolverExt, Result,
    Sequence, Stack, Timestamp, Value,
};

/// Formats any [`Sequence`] as an array of its elements.
pub struct SequenceFormatter<C>(PhantomData<fn() -> C>);

impl<C> SequenceFormatter<C> {
    /// Create the formatter.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<F: Format, C: Sequence> Formatter<F, C> for SequenceFormatter<C> {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &C,
        resolver: &dyn Resolver<F>,
    ) -> Result<()> {
        let item = resolver.get_with_verify::<C::Item>()?;
        F::write_array_start(buffer, cursor, value.len())?;
        for (i, element) in value.iter().enumerate() {
            if i > 0 {
                F::write_array_separator(buffer, cursor)?;
            }
            item.serialize(buffer, cursor, element, resolver)?;
        }
        F::write_array_end(buffer, cursor)
    }

    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, resolver: &dyn Resolver<F>) -> Result<C> {
        let item = resolver.get_with_verify::<C::Item>()?;
        let mut state = F::read_array_start(bytes, cursor)?;
        let mut builder = C::create(state.size_hint());
        while F::read_array_next(bytes, cursor, &mut state)?.is_some() {
            C::add(&mut builder, item.deserialize(bytes, cursor, resolver)?);
        }
        C::complete(builder).map_err(|err| err.with_offset(*cursor))
    }
}

/// Formats any [`Dictionary`] as a map.
///
/// Text formats need a key formatter that supports property names.
pub struct DictionaryFormatter<D>(PhantomData<fn() -> D>);

impl<D> DictionaryFormatter<D> {
    /// Create the formatter.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<F: Format, D: Dictionary> Formatter<F, D> for DictionaryFormatter<D> {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &D,
        resolver: &dyn Resolver<F>,
    ) -> Result<()> {
        let key = resolver.get_with_verify::<D::Key>()?;
        let val = resolver.get_with_verify::<D::Value>()?;
        F::write_map_start(buffer, cursor, value.len())?;
        for (i, (k, v)) in value.iter().enumerate() {
            if i > 0 {
                F::write_map_separator(buffer, cursor)?;
            }
            F::write_map_key(buffer, cursor, k, &*key, resolver)?;
            val.serialize(buffer, cursor, v, resolver)?;
        }
        F::write_map_end(buffer, cursor)
    }

    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, resolver: &dyn Resolver<F>) -> Result<D> {
        let key = resolver.get_with_verify::<D::Key>()?;
        let val = resolver.get_with_verify::<D::Value>()?;
        let mut state = F::read_map_start(bytes, cursor)?;
        let mut builder = D::create(state.size_hint());
        while F::read_map_next(bytes, cursor, &mut state)?.is_some() {
            let k = F::read_map_key(bytes, cursor, &*key, resolver)?;
            let v = val.deserialize(bytes, cursor, resolver)?;
            D::add(&mut builder, k, v);
        }
        D::complete(builder).map_err(|err| err.with_offset(*cursor))
    }
}

/// Formats `Option<T>`: `None` as the format's null, `Some` as `T`.
pub struct OptionFormatter<T>(PhantomData<fn() -> T>);

impl<T> OptionFormatter<T> {
    /// Create the formatter.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<F: Format, T: 'static> Formatter<F, Option<T>> for OptionFormatter<T> {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Option<T>,
        resolver: &dyn Resolver<F>,
    ) -> Result<()> {
        match value {
            None => F::write_nil(buffer, cursor),
            Some(inner) => resolver
                .get_with_verify::<T>()?
                .serialize(buffer, cursor, inner, resolver),
        }
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        resolver: &dyn Resolver<F>,
    ) -> Result<Option<T>> {
        if F::try_read_nil(bytes, cursor)? {
            return Ok(None);
        }
        resolver
            .get_with_verify::<T>()?
            .deserialize(bytes, cursor, resolver)
            .map(Some)
    }
}

impl<F: Format, T: 'static> Generic<F> for Option<T> {
    fn formatter() -> Arc<dyn Formatter<F, Self>> {
        Arc::new(OptionFormatter::<T>::new())
    }
}

macro_rules! generic_sequence {
    ($([$($params:tt)*] $ty:ty;)*) => {$(
        impl<F: Format, $($params)*> Generic<F> for $ty {
            fn formatter() -> Arc<dyn Formatter<F, Self>> {
                Arc::new(SequenceFormatter::<Self>::new())
            }
        }
    )*};
}

generic_sequence! {
    [T: 'static] Vec<T>;
    [T: 'static] VecDeque<T>;
    [T: 'static] LinkedList<T>;
    [T: 'static] Box<[T]>;
    [T: 'static] Arc<[T]>;
    [T: Eq + Hash + 'static, S: BuildHasher + Default + 'static] HashSet<T, S>;
    [T: Ord + 'static] BTreeSet<T>;
    [T: 'static] Stack<T>;
    [T: 'static, const N: usize] [T; N];
}

macro_rules! generic_dictionary {
    ($([$($params:tt)*] $ty:ty;)*) => {$(
        impl<F: Format, $($params)*> Generic<F> for $ty {
            fn formatter() -> Arc<dyn Formatter<F, Self>> {
                Arc::new(DictionaryFormatter::<Self>::new())
            }
        }
    )*};
}

generic_dictionary! {
    [K: Eq + Hash + 'static, V: 'static, S: BuildHasher + Default + 'static] HashMap<K, V, S>;
    [K: Ord + 'static, V: 'static] BTreeMap<K, V>;
    [K: Eq + Hash + 'static, V: 'static, S: BuildHasher + Default + 'static] IndexMap<K, V, S>;
}

macro_rules! register_common {
    ($resolver:expr; $($t:ty),* $(,)?) => {
        $resolver
            $(
                .register::<Vec<$t>>()
                .register::<Option<$t>>()
                .register::<HashMap<String, $t>>()
                .register::<BTreeMap<String, $t>>()
                .register::<IndexMap<String, $t>>()
            )*
    };
}

/// Containers of the built-in element types that every format can resolve
/// out of the box: `Vec`, `Option` and string-keyed maps of each scalar,
/// `String`, `Vec<u8>`, [`Timestamp`] and [`Value`].
pub fn standard_generics<F: Format>() -> GenericResolver<F> {
    register_common!(GenericResolver::new();
        bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64, char,
        String, Vec<u8>, Timestamp, Value,
    )
    .register::<Vec<Vec<Value>>>()
    .register::<Vec<HashMap<String, Value>>>()
}
