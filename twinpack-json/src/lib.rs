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

mod escape;
mod format;
mod formatters;
pub mod pretty;
pub mod read;
mod resolver;
pub mod write;

pub use format::Json;
pub use formatters::{PrimitiveFormatter, ValueFormatter};
pub use resolver::{builtin, default_resolver};

use twinpack_core::buffer::finish;
use twinpack_core::{Error, ErrorKind, Resolver, ResolverExt, Result};

/// Output layout for the `*_with_options` writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Break objects and arrays over lines and indent nested members.
    pub pretty: bool,
    /// One nesting level when `pretty` is set.
    pub indent: &'static str,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            pretty: false,
            indent: "  ",
        }
    }
}

impl SerializeOptions {
    /// Indented output with the default indent.
    pub fn pretty() -> Self {
        SerializeOptions {
            pretty: true,
            ..Default::default()
        }
    }
}

/// Serialize `value` as compact JSON with the [`default_resolver`].
pub fn to_vec<T: 'static>(value: &T) -> Result<Vec<u8>> {
    to_vec_with(value, default_resolver())
}

/// Serialize `value` as compact JSON, looking up formatters through
/// `resolver`.
pub fn to_vec_with<T: 'static>(value: &T, resolver: &dyn Resolver<Json>) -> Result<Vec<u8>> {
    to_vec_with_options(value, resolver, SerializeOptions::default())
}

/// Serialize `value` through `resolver`, laid out per `options`.
pub fn to_vec_with_options<T: 'static>(
    value: &T,
    resolver: &dyn Resolver<Json>,
    options: SerializeOptions,
) -> Result<Vec<u8>> {
    trace!(ty = core::any::type_name::<T>(), pretty = options.pretty, "json serialize");
    let formatter = resolver.get_with_verify::<T>()?;
    let mut buffer = Vec::new();
    let mut cursor = 0;
    formatter.serialize(&mut buffer, &mut cursor, value, resolver)?;
    let compact = finish(buffer, cursor);
    if options.pretty {
        Ok(pretty::prettify(&compact, options.indent))
    } else {
        Ok(compact)
    }
}

/// As [`to_vec`], returning a `String`.
pub fn to_string<T: 'static>(value: &T) -> Result<String> {
    to_string_with_options(value, default_resolver(), SerializeOptions::default())
}

/// As [`to_vec_with_options`], returning a `String`.
pub fn to_string_with_options<T: 'static>(
    value: &T,
    resolver: &dyn Resolver<Json>,
    options: SerializeOptions,
) -> Result<String> {
    let bytes = to_vec_with_options(value, resolver, options)?;
    // Writers only ever emit ASCII.
    String::from_utf8(bytes).map_err(|_| Error::new(ErrorKind::InvalidUtf8))
}

/// Deserialize a `T` from a complete JSON document with the
/// [`default_resolver`].
pub fn from_slice<T: 'static>(bytes: &[u8]) -> Result<T> {
    from_slice_with(bytes, default_resolver())
}

/// Deserialize a `T` from a complete JSON document through `resolver`.
///
/// Anything but whitespace after the value is an error.
pub fn from_slice_with<T: 'static>(bytes: &[u8], resolver: &dyn Resolver<Json>) -> Result<T> {
    trace!(ty = core::any::type_name::<T>(), len = bytes.len(), "json deserialize");
    let formatter = resolver.get_with_verify::<T>()?;
    let mut cursor = 0;
    let value = formatter.deserialize(bytes, &mut cursor, resolver)?;
    read::skip_whitespace(bytes, &mut cursor);
    if cursor < bytes.len() {
        debug!(consumed = cursor, len = bytes.len(), "trailing content after document");
        return Err(read::unexpected(bytes, cursor, "end of input"));
    }
    Ok(value)
}

/// As [`from_slice`], from text.
pub fn from_str<T: 'static>(text: &str) -> Result<T> {
    from_slice(text.as_bytes())
}
