#![deny(unsafe_code)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use debug;
#[allow(unused_imports)]
pub(crate) use trace;

pub mod codes;
mod dispatch;
mod format;
mod formatters;
pub mod read;
mod resolver;
pub mod write;

pub use format::MsgPack;
pub use formatters::{PrimitiveFormatter, ValueFormatter};
pub use resolver::{builtin, default_resolver};

use twinpack_core::buffer::finish;
use twinpack_core::{Resolver, ResolverExt, Result};

/// Serialize `value` with the [`default_resolver`].
pub fn to_vec<T: 'static>(value: &T) -> Result<Vec<u8>> {
    to_vec_with(value, default_resolver())
}

/// Serialize `value`, looking up formatters through `resolver`.
pub fn to_vec_with<T: 'static>(value: &T, resolver: &dyn Resolver<MsgPack>) -> Result<Vec<u8>> {
    trace!(ty = core::any::type_name::<T>(), "msgpack serialize");
    let formatter = resolver.get_with_verify::<T>()?;
    let mut buffer = Vec::new();
    let mut cursor = 0;
    formatter.serialize(&mut buffer, &mut cursor, value, resolver)?;
    Ok(finish(buffer, cursor))
}

/// Deserialize one `T` from the front of `bytes` with the
/// [`default_resolver`].
///
/// Bytes after the first complete value are ignored.
pub fn from_slice<T: 'static>(bytes: &[u8]) -> Result<T> {
    from_slice_with(bytes, default_resolver())
}

/// Deserialize one `T` from the front of `bytes` through `resolver`.
pub fn from_slice_with<T: 'static>(bytes: &[u8], resolver: &dyn Resolver<MsgPack>) -> Result<T> {
    trace!(ty = core::any::type_name::<T>(), len = bytes.len(), "msgpack deserialize");
    let formatter = resolver.get_with_verify::<T>()?;
    let mut cursor = 0;
    let value = formatter.deserialize(bytes, &mut cursor, resolver)?;
    if cursor < bytes.len() {
        debug!(consumed = cursor, len = bytes.len(), "trailing bytes after value");
    }
    Ok(value)
}
