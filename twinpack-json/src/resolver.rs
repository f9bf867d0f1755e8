//! The resolver chain used when callers do not supply their own.

use std::sync::LazyLock;
use std::time::SystemTime;

use time::OffsetDateTime;
use twinpack_core::{
    CompositeResolver, ConcreteResolver, KeyValuePair, Nil, NilFormatter, Timestamp, Value,
    standard_generics,
};

use crate::Json;
use crate::formatters::{PrimitiveFormatter, ValueFormatter};

/// Formatters for scalars, text, timestamps and [`Value`].
pub fn builtin() -> ConcreteResolver<Json> {
    ConcreteResolver::new()
        .with::<Nil>(NilFormatter::new())
        .with::<()>(NilFormatter::new())
        .with::<bool>(PrimitiveFormatter)
        .with::<u8>(PrimitiveFormatter)
        .with::<u16>(PrimitiveFormatter)
        .with::<u32>(PrimitiveFormatter)
        .with::<u64>(PrimitiveFormatter)
        .with::<u128>(PrimitiveFormatter)
        .with::<usize>(PrimitiveFormatter)
        .with::<i8>(PrimitiveFormatter)
        .with::<i16>(PrimitiveFormatter)
        .with::<i32>(PrimitiveFormatter)
        .with::<i64>(PrimitiveFormatter)
        .with::<i128>(PrimitiveFormatter)
        .with::<isize>(PrimitiveFormatter)
        .with::<f32>(PrimitiveFormatter)
        .with::<f64>(PrimitiveFormatter)
        .with::<char>(PrimitiveFormatter)
        .with::<String>(PrimitiveFormatter)
        .with::<Box<str>>(PrimitiveFormatter)
        .with::<Vec<u8>>(PrimitiveFormatter)
        .with::<Timestamp>(PrimitiveFormatter)
        .with::<SystemTime>(PrimitiveFormatter)
        .with::<OffsetDateTime>(PrimitiveFormatter)
        .with::<Value>(ValueFormatter)
}

static DEFAULT: LazyLock<CompositeResolver<Json>> = LazyLock::new(|| {
    CompositeResolver::new()
        .with(builtin())
        .with(
            standard_generics::<Json>()
                .register::<KeyValuePair<String, Value>>()
                .register::<Vec<KeyValuePair<String, Value>>>(),
        )
});

/// Process-wide chain of [`builtin`] followed by the standard containers.
pub fn default_resolver() -> &'static CompositeResolver<Json> {
    &DEFAULT
}
