//! Records: fixed sets of named members.
//!
//! Binary formats write members positionally; text formats write them as an
//! object keyed by member name and match names back through an
//! [`AutomataDictionary`]. Either way unknown members are skipped and
//! missing ones are an error.

use core::marker::PhantomData;
use std::sync::Arc;

use crate::{
    AutomataDictionary, Error, ErrorKind, FieldMatch, Format, Formatter, Generic, KeyValuePair,
    Resolver, ResolverExt, Result,
};

/// Member names of a record and the trie that matches them.
#[derive(Debug, Clone)]
pub struct Fields {
    names: Box<[&'static str]>,
    dictionary: AutomataDictionary,
}

impl Fields {
    /// Members in declaration order; the index of each name is its position.
    pub fn new(names: &[&'static str]) -> Self {
        let dictionary = names
            .iter()
            .enumerate()
            .map(|(position, name)| (*name, position))
            .collect();
        Self {
            names: names.into(),
            dictionary,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the record has no members.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the member at `position`.
    pub fn name(&self, position: usize) -> Option<&'static str> {
        self.names.get(position).copied()
    }

    /// Position of the member spelled by these raw UTF-8 bytes.
    #[inline]
    pub fn position(&self, name: &[u8]) -> Option<usize> {
        self.dictionary.get(name)
    }

    /// Match an ordinal from a positional encoding.
    pub fn by_ordinal(&self, ordinal: usize) -> FieldMatch {
        if ordinal < self.len() {
            FieldMatch::Known(ordinal)
        } else {
            FieldMatch::Unknown
        }
    }

    /// Match raw name bytes from a keyed encoding.
    pub fn by_name(&self, name: &[u8]) -> FieldMatch {
        match self.position(name) {
            Some(position) => FieldMatch::Known(position),
            None => FieldMatch::Unknown,
        }
    }
}

fn missing(name: &'static str, offset: usize) -> Error {
    Error::at(ErrorKind::MissingField { name }, offset)
}

/// Formats tuples of arity 1 through 6 as records named `Item1`..`Item6`.
pub struct TupleFormatter<T> {
    fields: Fields,
    _tuple: PhantomData<fn() -> T>,
}

macro_rules! tuple_formatter {
    ($($idx:tt $T:ident $name:literal),+) => {
        impl<$($T),+> TupleFormatter<($($T,)+)> {
            /// Create the formatter.
            pub fn new() -> Self {
                Self {
                    fields: Fields::new(&[$($name),+]),
                    _tuple: PhantomData,
                }
            }
        }

        impl<F: Format, $($T: 'static),+> Formatter<F, ($($T,)+)> for TupleFormatter<($($T,)+)> {
            fn serialize(
                &self,
                buffer: &mut Vec<u8>,
                cursor: &mut usize,
                value: &($($T,)+),
                resolver: &dyn Resolver<F>,
            ) -> Result<()> {
                F::write_record_start(buffer, cursor, &self.fields)?;
                $(
                    F::write_field_name(buffer, cursor, $idx, &self.fields)?;
                    resolver
                        .get_with_verify::<$T>()?
                        .serialize(buffer, cursor, &value.$idx, resolver)?;
                )+
                F::write_record_end(buffer, cursor, &self.fields)
            }

            fn deserialize(
                &self,
                bytes: &[u8],
                cursor: &mut usize,
                resolver: &dyn Resolver<F>,
            ) -> Result<($($T,)+)> {
                let formatters = ($(resolver.get_with_verify::<$T>()?,)+);
                let mut slots = ($(None::<$T>,)+);
                let mut state = F::read_record_start(bytes, cursor)?;
                while let Some(ordinal) = F::read_record_next(bytes, cursor, &mut state)? {
                    match F::read_field_name(bytes, cursor, ordinal, &self.fields)? {
                        $(
                            FieldMatch::Known($idx) => {
                                slots.$idx =
                                    Some(formatters.$idx.deserialize(bytes, cursor, resolver)?);
                            }
                        )+
                        _ => F::skip_value(bytes, cursor)?,
                    }
                }
                Ok(($(slots.$idx.ok_or_else(|| missing($name, *cursor))?,)+))
            }
        }

        impl<F: Format, $($T: 'static),+> Generic<F> for ($($T,)+) {
            fn formatter() -> Arc<dyn Formatter<F, Self>> {
                Arc::new(TupleFormatter::<Self>::new())
            }
        }
    };
}

tuple_formatter!(0 T1 "Item1");
tuple_formatter!(0 T1 "Item1", 1 T2 "Item2");
tuple_formatter!(0 T1 "Item1", 1 T2 "Item2", 2 T3 "Item3");
tuple_formatter!(0 T1 "Item1", 1 T2 "Item2", 2 T3 "Item3", 3 T4 "Item4");
tuple_formatter!(0 T1 "Item1", 1 T2 "Item2", 2 T3 "Item3", 3 T4 "Item4", 4 T5 "Item5");
tuple_formatter!(0 T1 "Item1", 1 T2 "Item2", 2 T3 "Item3", 3 T4 "Item4", 4 T5 "Item5", 5 T6 "Item6");

/// Formats [`KeyValuePair`] as a record with members `Key` and `Value`.
pub struct KeyValuePairFormatter<K, V> {
    fields: Fields,
    _pair: PhantomData<fn() -> (K, V)>,
}

impl<K, V> KeyValuePairFormatter<K, V> {
    /// Create the formatter.
    pub fn new() -> Self {
        Self {
            fields: Fields::new(&["Key", "Value"]),
            _pair: PhantomData,
        }
    }
}

impl<F: Format, K: 'static, V: 'static> Formatter<F, KeyValuePair<K, V>>
    for KeyValuePairFormatter<K, V>
{
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &KeyValuePair<K, V>,
        resolver: &dyn Resolver<F>,
    ) -> Result<()> {
        F::write_record_start(buffer, cursor, &self.fields)?;
        F::write_field_name(buffer, cursor, 0, &self.fields)?;
        resolver
            .get_with_verify::<K>()?
            .serialize(buffer, cursor, &value.key, resolver)?;
        F::write_field_name(buffer, cursor, 1, &self.fields)?;
        resolver
            .get_with_verify::<V>()?
            .serialize(buffer, cursor, &value.value, resolver)?;
        F::write_record_end(buffer, cursor, &self.fields)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        resolver: &dyn Resolver<F>,
    ) -> Result<KeyValuePair<K, V>> {
        let key_formatter = resolver.get_with_verify::<K>()?;
        let value_formatter = resolver.get_with_verify::<V>()?;
        let (mut key, mut value) = (None, None);
        let mut state = F::read_record_start(bytes, cursor)?;
        while let Some(ordinal) = F::read_record_next(bytes, cursor, &mut state)? {
            match F::read_field_name(bytes, cursor, ordinal, &self.fields)? {
                FieldMatch::Known(0) => key = Some(key_formatter.deserialize(bytes, cursor, resolver)?),
                FieldMatch::Known(1) => {
                    value = Some(value_formatter.deserialize(bytes, cursor, resolver)?)
                }
                _ => F::skip_value(bytes, cursor)?,
            }
        }
        Ok(KeyValuePair {
            key: key.ok_or_else(|| missing("Key", *cursor))?,
            value: value.ok_or_else(|| missing("Value", *cursor))?,
        })
    }
}

impl<F: Format, K: 'static, V: 'static> Generic<F> for KeyValuePair<K, V> {
    fn formatter() -> Arc<dyn Formatter<F, Self>> {
        Arc::new(KeyValuePairFormatter::<K, V>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_match_by_name_and_ordinal() {
        let fields = Fields::new(&["Key", "Value"]);
        assert_eq!(fields.by_name(b"Key"), FieldMatch::Known(0));
        assert_eq!(fields.by_name(b"Value"), FieldMatch::Known(1));
        assert_eq!(fields.by_name(b"Unknown"), FieldMatch::Unknown);
        assert_eq!(fields.by_ordinal(1), FieldMatch::Known(1));
        assert_eq!(fields.by_ordinal(2), FieldMatch::Unknown);
        assert_eq!(fields.name(1), Some("Value"));
    }
}
