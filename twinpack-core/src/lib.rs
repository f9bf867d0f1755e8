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
    ($($arg:tt)*) => { () };
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
    ($($arg:tt)*) => { () };
}

#[allow(unused_imports)]
pub(crate) use debug;
#[allow(unused_imports)]
pub(crate) use trace;

pub mod automata;
pub mod buffer;
pub mod builder;
mod collection;
mod error;
mod format;
mod formatter;
mod record;
mod resolver;
mod types;
mod value;

pub use automata::AutomataDictionary;
pub use builder::{Dictionary, Sequence};
pub use collection::{DictionaryFormatter, OptionFormatter, SequenceFormatter, standard_generics};
pub use error::{Error, ErrorKind, Result};
pub use format::{FieldMatch, Format, SeqState};
pub use formatter::{Formatter, NilFormatter};
pub use record::{Fields, KeyValuePairFormatter, TupleFormatter};
pub use resolver::{
    CompositeResolver, ConcreteResolver, ErasedFormatter, Generic, GenericResolver, Resolver,
    ResolverExt,
};
pub use types::{Extension, ExtensionHeader, KeyValuePair, Nil, Stack, Timestamp};
pub use value::Value;
