use core::marker::PhantomData;

use crate::{Error, Format, Nil, Resolver, Result};

/// Serialization logic for one type in one wire format.
///
/// A formatter writes exactly one complete value per call and reads exactly
/// one back, advancing the caller's cursor past it. It holds no per-call
/// state, so a single instance can serve any number of buffers on any number
/// of threads. Formatters for containers look up their element formatters
/// through the `resolver` they are handed.
pub trait Formatter<F: Format, T>: Send + Sync {
    /// Write `value` at the cursor.
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &T,
        resolver: &dyn Resolver<F>,
    ) -> Result<()>;

    /// Read one value at the cursor.
    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, resolver: &dyn Resolver<F>)
    -> Result<T>;

    /// Write `value` as an object property name.
    ///
    /// Only text formats call this; types without a textual key form keep
    /// the default, which refuses.
    fn serialize_key(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &T,
        resolver: &dyn Resolver<F>,
    ) -> Result<()> {
        let _ = (buffer, cursor, value, resolver);
        Err(Error::unsupported_key::<T>())
    }

    /// Read an object property name as a `T`.
    fn deserialize_key(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        resolver: &dyn Resolver<F>,
    ) -> Result<T> {
        let _ = (bytes, resolver);
        Err(Error::unsupported_key::<T>().with_offset(*cursor))
    }
}

/// Writes and reads the format's null for [`Nil`] and `()`.
pub struct NilFormatter<F>(PhantomData<fn() -> F>);

impl<F> NilFormatter<F> {
    /// Create the formatter.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<F: Format> Formatter<F, Nil> for NilFormatter<F> {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        _value: &Nil,
        _resolver: &dyn Resolver<F>,
    ) -> Result<()> {
        F::write_nil(buffer, cursor)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<F>,
    ) -> Result<Nil> {
        if F::try_read_nil(bytes, cursor)? {
            Ok(Nil)
        } else {
            Err(F::unexpected(bytes, *cursor, "nil"))
        }
    }
}

impl<F: Format> Formatter<F, ()> for NilFormatter<F> {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        _value: &(),
        _resolver: &dyn Resolver<F>,
    ) -> Result<()> {
        F::write_nil(buffer, cursor)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        resolver: &dyn Resolver<F>,
    ) -> Result<()> {
        <Self as Formatter<F, Nil>>::deserialize(self, bytes, cursor, resolver).map(|Nil| ())
    }
}
