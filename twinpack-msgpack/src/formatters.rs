//! Formatters for primitives, well-known library types and [`Value`].

use std::time::SystemTime;

use time::OffsetDateTime;
use twinpack_core::buffer::peek;
use twinpack_core::{
    Error, ErrorKind, Extension, Formatter, Resolver, Result, Timestamp, Value,
};

use crate::codes::{self, ValueType, value_type};
use crate::{MsgPack, dispatch, read, write};

/// Formats the scalar and string-like types MessagePack has a native
/// encoding for.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveFormatter;

macro_rules! primitive {
    ($($t:ty => $write:path, $read:path;)*) => {$(
        impl Formatter<MsgPack, $t> for PrimitiveFormatter {
            #[inline]
            fn serialize(
                &self,
                buffer: &mut Vec<u8>,
                cursor: &mut usize,
                value: &$t,
                _resolver: &dyn Resolver<MsgPack>,
            ) -> Result<()> {
                $write(buffer, cursor, *value)
            }

            #[inline]
            fn deserialize(
                &self,
                bytes: &[u8],
                cursor: &mut usize,
                _resolver: &dyn Resolver<MsgPack>,
            ) -> Result<$t> {
                $read(bytes, cursor)
            }
        }
    )*};
}

primitive! {
    bool => write::write_bool, read::read_bool;
    u8 => write::write_u8, read::read_u8;
    u16 => write::write_u16, read::read_u16;
    u32 => write::write_u32, read::read_u32;
    u64 => write::write_u64, read::read_u64;
    i8 => write::write_i8, read::read_i8;
    i16 => write::write_i16, read::read_i16;
    i32 => write::write_i32, read::read_i32;
    i64 => write::write_i64, read::read_i64;
    f32 => write::write_f32, read::read_f32;
    f64 => write::write_f64, read::read_f64;
    Timestamp => write::write_timestamp, read::read_timestamp;
}

fn out_of_range(target: &'static str, offset: usize) -> Error {
    Error::at(ErrorKind::NumberOutOfRange { target }, offset)
}

impl Formatter<MsgPack, usize> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        write::write_u64(buffer, cursor, *value as u64)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<usize> {
        let start = *cursor;
        let n = read::read_u64(bytes, cursor)?;
        usize::try_from(n).map_err(|_| out_of_range("usize", start))
    }
}

impl Formatter<MsgPack, isize> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &isize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        write::write_i64(buffer, cursor, *value as i64)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<isize> {
        let start = *cursor;
        let n = read::read_i64(bytes, cursor)?;
        isize::try_from(n).map_err(|_| out_of_range("isize", start))
    }
}

impl Formatter<MsgPack, char> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &char,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        write::write_str(buffer, cursor, value.encode_utf8(&mut [0; 4]))
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<char> {
        let start = *cursor;
        let s = read::read_str(bytes, cursor)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::invalid_value(format!("expected a single character, found {s:?}"))
                .with_offset(start)),
        }
    }
}

impl Formatter<MsgPack, String> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &String,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        write::write_str(buffer, cursor, value)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<String> {
        read::read_str(bytes, cursor).map(str::to_owned)
    }
}

impl Formatter<MsgPack, Box<str>> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Box<str>,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        write::write_str(buffer, cursor, value)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<Box<str>> {
        read::read_str(bytes, cursor).map(Box::from)
    }
}

/// bin on write; bin or an array of small integers on read.
impl Formatter<MsgPack, Vec<u8>> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Vec<u8>,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        write::write_bytes(buffer, cursor, value)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<Vec<u8>> {
        if value_type(peek(bytes, *cursor)?) == ValueType::Array {
            let len = read::read_array_header(bytes, cursor)?;
            let mut out = Vec::with_capacity(len.min(bytes.len()));
            for _ in 0..len {
                out.push(read::read_u8(bytes, cursor)?);
            }
            return Ok(out);
        }
        read::read_bytes(bytes, cursor).map(<[u8]>::to_vec)
    }
}

impl Formatter<MsgPack, Extension> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Extension,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        write::write_extension(buffer, cursor, value.type_code, &value.data)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<Extension> {
        read::read_extension(bytes, cursor)
    }
}

impl Formatter<MsgPack, SystemTime> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &SystemTime,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        write::write_timestamp(buffer, cursor, Timestamp::from(*value))
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<SystemTime> {
        let start = *cursor;
        let ts = read::read_timestamp(bytes, cursor)?;
        SystemTime::try_from(ts).map_err(|err| err.with_offset(start))
    }
}

impl Formatter<MsgPack, OffsetDateTime> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &OffsetDateTime,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        write::write_timestamp(buffer, cursor, Timestamp::from(*value))
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<OffsetDateTime> {
        let start = *cursor;
        let ts = read::read_timestamp(bytes, cursor)?;
        OffsetDateTime::try_from(ts).map_err(|err| err.with_offset(start))
    }
}

/// 128-bit integers travel as decimal strings; plain integers are accepted
/// on read.
macro_rules! wide_int {
    ($($t:ty => $narrow:path;)*) => {$(
        impl Formatter<MsgPack, $t> for PrimitiveFormatter {
            fn serialize(
                &self,
                buffer: &mut Vec<u8>,
                cursor: &mut usize,
                value: &$t,
                _resolver: &dyn Resolver<MsgPack>,
            ) -> Result<()> {
                write::write_display(buffer, cursor, value)
            }

            fn deserialize(
                &self,
                bytes: &[u8],
                cursor: &mut usize,
                _resolver: &dyn Resolver<MsgPack>,
            ) -> Result<$t> {
                let start = *cursor;
                if value_type(peek(bytes, start)?) == ValueType::Integer {
                    return $narrow(bytes, cursor).map(<$t>::from);
                }
                let digits = read::read_str(bytes, cursor)?;
                digits.parse::<$t>().map_err(|_| {
                    Error::at(ErrorKind::InvalidNumber { target: stringify!($t) }, start)
                })
            }
        }
    )*};
}

wide_int! {
    u128 => read::read_u64;
    i128 => read::read_i64;
}

/// Nesting limit for [`Value`] decoding; input beyond it is rejected.
const MAX_DEPTH: usize = 512;

/// Reads any well-formed value into a [`Value`] and writes it back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueFormatter;

impl ValueFormatter {
    fn write(buffer: &mut Vec<u8>, cursor: &mut usize, value: &Value) -> Result<()> {
        match value {
            Value::Nil => write::write_nil(buffer, cursor),
            Value::Bool(b) => write::write_bool(buffer, cursor, *b),
            Value::Int(n) => write::write_i64(buffer, cursor, *n),
            Value::UInt(n) => write::write_u64(buffer, cursor, *n),
            Value::Float(f) => write::write_f64(buffer, cursor, *f),
            Value::String(s) => write::write_str(buffer, cursor, s),
            Value::Binary(b) => write::write_bytes(buffer, cursor, b),
            Value::Array(items) => {
                write::write_array_header(buffer, cursor, items.len())?;
                items
                    .iter()
                    .try_for_each(|item| Self::write(buffer, cursor, item))
            }
            Value::Map(entries) => {
                write::write_map_header(buffer, cursor, entries.len())?;
                entries.iter().try_for_each(|(k, v)| {
                    Self::write(buffer, cursor, k)?;
                    Self::write(buffer, cursor, v)
                })
            }
            Value::Extension(ext) => write::write_extension(buffer, cursor, ext.type_code, &ext.data),
            Value::Timestamp(ts) => write::write_timestamp(buffer, cursor, *ts),
        }
    }

    fn read(bytes: &[u8], cursor: &mut usize, depth: usize) -> Result<Value> {
        let start = *cursor;
        if depth > MAX_DEPTH {
            return Err(Error::invalid_value(format!("nesting deeper than {MAX_DEPTH}"))
                .with_offset(start));
        }
        let code = peek(bytes, start)?;
        match value_type(code) {
            ValueType::Nil => read::read_nil(bytes, cursor).map(|()| Value::Nil),
            ValueType::Boolean => read::read_bool(bytes, cursor).map(Value::Bool),
            ValueType::Integer => match code {
                0x00..=codes::POSITIVE_FIXINT_MAX | codes::UINT8..=codes::UINT64 => {
                    read::read_u64(bytes, cursor).map(Value::from)
                }
                _ => read::read_i64(bytes, cursor).map(Value::Int),
            },
            ValueType::Float => read::read_f64(bytes, cursor).map(Value::Float),
            ValueType::String => read::read_str(bytes, cursor).map(|s| Value::String(s.to_owned())),
            ValueType::Binary => read::read_bytes(bytes, cursor).map(|b| Value::Binary(b.to_vec())),
            ValueType::Array => {
                let len = read::read_array_header(bytes, cursor)?;
                let mut items = Vec::with_capacity(len.min(bytes.len() - *cursor));
                for _ in 0..len {
                    items.push(Self::read(bytes, cursor, depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            ValueType::Map => {
                let len = read::read_map_header(bytes, cursor)?;
                let mut entries = Vec::with_capacity(len.min(bytes.len() - *cursor));
                for _ in 0..len {
                    let k = Self::read(bytes, cursor, depth + 1)?;
                    let v = Self::read(bytes, cursor, depth + 1)?;
                    entries.push((k, v));
                }
                Ok(Value::Map(entries))
            }
            ValueType::Extension => {
                let mut probe = start;
                let header = read::read_extension_header(bytes, &mut probe)?;
                let is_timestamp = header.type_code == codes::TIMESTAMP_TYPE
                    && matches!(
                        (code, header.length),
                        (codes::FIXEXT4, 4) | (codes::FIXEXT8, 8) | (codes::EXT8, 12)
                    );
                if is_timestamp {
                    read::read_timestamp(bytes, cursor).map(Value::Timestamp)
                } else {
                    read::read_extension(bytes, cursor).map(Value::Extension)
                }
            }
            ValueType::Unknown => Err(dispatch::invalid_code(bytes, start, "any value")),
        }
    }
}

impl Formatter<MsgPack, Value> for ValueFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Value,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<()> {
        Self::write(buffer, cursor, value)
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<MsgPack>,
    ) -> Result<Value> {
        Self::read(bytes, cursor, 0)
    }
}
