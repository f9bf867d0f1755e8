//! Create/add/complete construction for containers.
//!
//! Deserialization never appends to the target container directly. It asks
//! the container type for a mutable builder, feeds it decoded elements in wire
//! order, and finally converts the builder into the container. That covers
//! containers without an append API in their final form (`Box<[T]>`,
//! `Arc<[T]>`, fixed arrays) and containers whose wire order differs from
//! their push order ([`Stack`]).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::{Error, Result, Stack};

/// A container serialized as an array.
pub trait Sequence: Sized + 'static {
    /// Element type.
    type Item: 'static;
    /// Intermediate state while deserializing.
    type Builder;
    /// Iterator in wire order.
    type Iter<'a>: Iterator<Item = &'a Self::Item>
    where
        Self: 'a;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Elements in the order they are written.
    fn iter(&self) -> Self::Iter<'_>;

    /// Start building; `capacity` is a hint.
    fn create(capacity: usize) -> Self::Builder;

    /// Append the next element in wire order.
    fn add(builder: &mut Self::Builder, item: Self::Item);

    /// Finish building.
    fn complete(builder: Self::Builder) -> Result<Self>;
}

/// A container serialized as a map.
///
/// When a key repeats, the last value wins.
pub trait Dictionary: Sized + 'static {
    /// Key type.
    type Key: 'static;
    /// Value type.
    type Value: 'static;
    /// Intermediate state while deserializing.
    type Builder;
    /// Iterator in wire order.
    type Iter<'a>: Iterator<Item = (&'a Self::Key, &'a Self::Value)>
    where
        Self: 'a;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Entries in the order they are written.
    fn iter(&self) -> Self::Iter<'_>;

    /// Start building; `capacity` is a hint.
    fn create(capacity: usize) -> Self::Builder;

    /// Insert the next entry.
    fn add(builder: &mut Self::Builder, key: Self::Key, value: Self::Value);

    /// Finish building.
    fn complete(builder: Self::Builder) -> Result<Self>;
}

impl<T: 'static> Sequence for Vec<T> {
    type Item = T;
    type Builder = Vec<T>;
    type Iter<'a> = core::slice::Iter<'a, T>;

    fn len(&self) -> usize {
        self.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        self.as_slice().iter()
    }
    fn create(capacity: usize) -> Self::Builder {
        Vec::with_capacity(capacity)
    }
    fn add(builder: &mut Self::Builder, item: T) {
        builder.push(item);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(builder)
    }
}

impl<T: 'static> Sequence for VecDeque<T> {
    type Item = T;
    type Builder = VecDeque<T>;
    type Iter<'a> = std::collections::vec_deque::Iter<'a, T>;

    fn len(&self) -> usize {
        self.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        VecDeque::iter(self)
    }
    fn create(capacity: usize) -> Self::Builder {
        VecDeque::with_capacity(capacity)
    }
    fn add(builder: &mut Self::Builder, item: T) {
        builder.push_back(item);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(builder)
    }
}

impl<T: 'static> Sequence for LinkedList<T> {
    type Item = T;
    type Builder = LinkedList<T>;
    type Iter<'a> = std::collections::linked_list::Iter<'a, T>;

    fn len(&self) -> usize {
        self.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        LinkedList::iter(self)
    }
    fn create(_capacity: usize) -> Self::Builder {
        LinkedList::new()
    }
    fn add(builder: &mut Self::Builder, item: T) {
        builder.push_back(item);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(builder)
    }
}

impl<T: 'static> Sequence for Box<[T]> {
    type Item = T;
    type Builder = Vec<T>;
    type Iter<'a> = core::slice::Iter<'a, T>;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }
    fn iter(&self) -> Self::Iter<'_> {
        <[T]>::iter(self)
    }
    fn create(capacity: usize) -> Self::Builder {
        Vec::with_capacity(capacity)
    }
    fn add(builder: &mut Self::Builder, item: T) {
        builder.push(item);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(builder.into_boxed_slice())
    }
}

impl<T: 'static> Sequence for Arc<[T]> {
    type Item = T;
    type Builder = Vec<T>;
    type Iter<'a> = core::slice::Iter<'a, T>;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }
    fn iter(&self) -> Self::Iter<'_> {
        <[T]>::iter(self)
    }
    fn create(capacity: usize) -> Self::Builder {
        Vec::with_capacity(capacity)
    }
    fn add(builder: &mut Self::Builder, item: T) {
        builder.push(item);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(Arc::from(builder))
    }
}

impl<T, S> Sequence for HashSet<T, S>
where
    T: Eq + Hash + 'static,
    S: BuildHasher + Default + 'static,
{
    type Item = T;
    type Builder = HashSet<T, S>;
    type Iter<'a> = std::collections::hash_set::Iter<'a, T>;

    fn len(&self) -> usize {
        self.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        HashSet::iter(self)
    }
    fn create(capacity: usize) -> Self::Builder {
        HashSet::with_capacity_and_hasher(capacity, S::default())
    }
    fn add(builder: &mut Self::Builder, item: T) {
        builder.insert(item);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(builder)
    }
}

impl<T: Ord + 'static> Sequence for BTreeSet<T> {
    type Item = T;
    type Builder = BTreeSet<T>;
    type Iter<'a> = std::collections::btree_set::Iter<'a, T>;

    fn len(&self) -> usize {
        self.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        BTreeSet::iter(self)
    }
    fn create(_capacity: usize) -> Self::Builder {
        BTreeSet::new()
    }
    fn add(builder: &mut Self::Builder, item: T) {
        builder.insert(item);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(builder)
    }
}

impl<T: 'static> Sequence for Stack<T> {
    type Item = T;
    /// Elements top first, as read from the wire.
    type Builder = Vec<T>;
    type Iter<'a> = core::iter::Rev<core::slice::Iter<'a, T>>;

    fn len(&self) -> usize {
        Stack::len(self)
    }
    fn iter(&self) -> Self::Iter<'_> {
        Stack::iter(self)
    }
    fn create(capacity: usize) -> Self::Builder {
        Vec::with_capacity(capacity)
    }
    fn add(builder: &mut Self::Builder, item: T) {
        builder.push(item);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        // Re-push last to first so the first element read ends on top.
        Ok(builder.into_iter().rev().collect())
    }
}

impl<T: 'static, const N: usize> Sequence for [T; N] {
    type Item = T;
    type Builder = Vec<T>;
    type Iter<'a> = core::slice::Iter<'a, T>;

    fn len(&self) -> usize {
        N
    }
    fn iter(&self) -> Self::Iter<'_> {
        self.as_slice().iter()
    }
    fn create(_capacity: usize) -> Self::Builder {
        Vec::with_capacity(N)
    }
    fn add(builder: &mut Self::Builder, item: T) {
        builder.push(item);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        let found = builder.len();
        <[T; N]>::try_from(builder).map_err(|_| {
            Error::invalid_value(format!("expected an array of {N} elements, found {found}"))
        })
    }
}

impl<K, V, S> Dictionary for HashMap<K, V, S>
where
    K: Eq + Hash + 'static,
    V: 'static,
    S: BuildHasher + Default + 'static,
{
    type Key = K;
    type Value = V;
    type Builder = HashMap<K, V, S>;
    type Iter<'a> = std::collections::hash_map::Iter<'a, K, V>;

    fn len(&self) -> usize {
        self.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        HashMap::iter(self)
    }
    fn create(capacity: usize) -> Self::Builder {
        HashMap::with_capacity_and_hasher(capacity, S::default())
    }
    fn add(builder: &mut Self::Builder, key: K, value: V) {
        builder.insert(key, value);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(builder)
    }
}

impl<K: Ord + 'static, V: 'static> Dictionary for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    type Builder = BTreeMap<K, V>;
    type Iter<'a> = std::collections::btree_map::Iter<'a, K, V>;

    fn len(&self) -> usize {
        self.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        BTreeMap::iter(self)
    }
    fn create(_capacity: usize) -> Self::Builder {
        BTreeMap::new()
    }
    fn add(builder: &mut Self::Builder, key: K, value: V) {
        builder.insert(key, value);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(builder)
    }
}

impl<K, V, S> Dictionary for IndexMap<K, V, S>
where
    K: Eq + Hash + 'static,
    V: 'static,
    S: BuildHasher + Default + 'static,
{
    type Key = K;
    type Value = V;
    type Builder = IndexMap<K, V, S>;
    type Iter<'a> = indexmap::map::Iter<'a, K, V>;

    fn len(&self) -> usize {
        self.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        IndexMap::iter(self)
    }
    fn create(capacity: usize) -> Self::Builder {
        IndexMap::with_capacity_and_hasher(capacity, S::default())
    }
    fn add(builder: &mut Self::Builder, key: K, value: V) {
        // Keeps the first position of a repeated key, with the last value.
        builder.insert(key, value);
    }
    fn complete(builder: Self::Builder) -> Result<Self> {
        Ok(builder)
    }
}
