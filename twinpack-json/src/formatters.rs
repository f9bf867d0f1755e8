//! Formatters for primitives, well-known library types and [`Value`].

use std::time::SystemTime;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use twinpack_core::{Error, ErrorKind, Format, Formatter, Resolver, Result, Timestamp, Value};

use crate::read::{self, Token};
use crate::{Json, write};

/// Formats numbers, booleans, text and timestamps.
///
/// Integer, `char` and string formatters also act as object keys; integers
/// are quoted when they do.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveFormatter;

type Reader<T> = fn(&[u8], &mut usize) -> Result<T>;

/// Parse a quoted property name with a number reader. Escapes are decoded
/// first; the decoded name must be exactly the number, with no padding.
fn quoted_number<T>(bytes: &[u8], cursor: &mut usize, parse: Reader<T>, target: &'static str) -> Result<T> {
    let span = read::read_string_span(bytes, cursor)?;
    let name = span.decode()?;
    let digits = name.as_bytes();
    let invalid = || Error::at(ErrorKind::InvalidNumber { target }, span.offset);
    if digits.first().is_none_or(|b| b.is_ascii_whitespace()) {
        return Err(invalid());
    }
    let mut at = 0;
    match parse(digits, &mut at) {
        Ok(n) if at == digits.len() => Ok(n),
        Err(Error {
            kind: kind @ ErrorKind::NumberOutOfRange { .. },
            ..
        }) => Err(Error::at(kind, span.offset)),
        _ => Err(invalid()),
    }
}

macro_rules! integer {
    ($($t:ty => $read:path;)*) => {$(
        impl Formatter<Json, $t> for PrimitiveFormatter {
            #[inline]
            fn serialize(
                &self,
                buffer: &mut Vec<u8>,
                cursor: &mut usize,
                value: &$t,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<()> {
                write::write_integer(buffer, cursor, *value)
            }

            #[inline]
            fn deserialize(
                &self,
                bytes: &[u8],
                cursor: &mut usize,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<$t> {
                $read(bytes, cursor)
            }

            fn serialize_key(
                &self,
                buffer: &mut Vec<u8>,
                cursor: &mut usize,
                value: &$t,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<()> {
                write::write_quoted_integer(buffer, cursor, *value)
            }

            fn deserialize_key(
                &self,
                bytes: &[u8],
                cursor: &mut usize,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<$t> {
                quoted_number(bytes, cursor, $read, stringify!($t))
            }
        }
    )*};
}

integer! {
    u8 => read::read_u8;
    u16 => read::read_u16;
    u32 => read::read_u32;
    u64 => read::read_u64;
    u128 => read::read_u128;
    usize => read::read_usize;
    i8 => read::read_i8;
    i16 => read::read_i16;
    i32 => read::read_i32;
    i64 => read::read_i64;
    i128 => read::read_i128;
    isize => read::read_isize;
}

/// `null` reads back as NaN, the value it was most likely written from.
macro_rules! float {
    ($($t:ty => $write:path, $read:path;)*) => {$(
        impl Formatter<Json, $t> for PrimitiveFormatter {
            fn serialize(
                &self,
                buffer: &mut Vec<u8>,
                cursor: &mut usize,
                value: &$t,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<()> {
                $write(buffer, cursor, *value)
            }

            fn deserialize(
                &self,
                bytes: &[u8],
                cursor: &mut usize,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<$t> {
                if read::read_is_null(bytes, cursor) {
                    return Ok(<$t>::NAN);
                }
                $read(bytes, cursor)
            }
        }
    )*};
}

float! {
    f32 => write::write_f32, read::read_f32;
    f64 => write::write_f64, read::read_f64;
}

impl Formatter<Json, bool> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &bool,
        _resolver: &dyn Resolver<Json>,
    ) -> Result<()> {
        write::write_bool(buffer, cursor, *value)
    }

    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, _resolver: &dyn Resolver<Json>) -> Result<bool> {
        read::read_bool(bytes, cursor)
    }
}

fn single_char(bytes: &[u8], cursor: &mut usize) -> Result<char> {
    read::skip_whitespace(bytes, cursor);
    let start = *cursor;
    let s = read::read_str(bytes, cursor)?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::invalid_value(format!("expected a single character, found {s:?}"))
            .with_offset(start)),
    }
}

impl Formatter<Json, char> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &char,
        _resolver: &dyn Resolver<Json>,
    ) -> Result<()> {
        write::write_str(buffer, cursor, value.encode_utf8(&mut [0; 4]))
    }

    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, _resolver: &dyn Resolver<Json>) -> Result<char> {
        single_char(bytes, cursor)
    }

    fn serialize_key(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &char,
        resolver: &dyn Resolver<Json>,
    ) -> Result<()> {
        self.serialize(buffer, cursor, value, resolver)
    }

    fn deserialize_key(&self, bytes: &[u8], cursor: &mut usize, _resolver: &dyn Resolver<Json>) -> Result<char> {
        single_char(bytes, cursor)
    }
}

macro_rules! text {
    ($($t:ty;)*) => {$(
        impl Formatter<Json, $t> for PrimitiveFormatter {
            fn serialize(
                &self,
                buffer: &mut Vec<u8>,
                cursor: &mut usize,
                value: &$t,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<()> {
                write::write_str(buffer, cursor, value)
            }

            fn deserialize(
                &self,
                bytes: &[u8],
                cursor: &mut usize,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<$t> {
                read::read_str(bytes, cursor).map(|s| s.into_owned().into())
            }

            fn serialize_key(
                &self,
                buffer: &mut Vec<u8>,
                cursor: &mut usize,
                value: &$t,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<()> {
                write::write_str(buffer, cursor, value)
            }

            fn deserialize_key(
                &self,
                bytes: &[u8],
                cursor: &mut usize,
                _resolver: &dyn Resolver<Json>,
            ) -> Result<$t> {
                read::read_str(bytes, cursor).map(|s| s.into_owned().into())
            }
        }
    )*};
}

text! {
    String;
    Box<str>;
}

fn write_byte_array(buffer: &mut Vec<u8>, cursor: &mut usize, data: &[u8]) -> Result<()> {
    write::write_begin_array(buffer, cursor)?;
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            write::write_value_separator(buffer, cursor)?;
        }
        write::write_integer(buffer, cursor, *b)?;
    }
    write::write_end_array(buffer, cursor)
}

fn read_byte_array(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>> {
    let mut state = Json::read_array_start(bytes, cursor)?;
    let mut out = Vec::new();
    while Json::read_array_next(bytes, cursor, &mut state)?.is_some() {
        out.push(read::read_u8(bytes, cursor)?);
    }
    Ok(out)
}

/// An array of numbers, one per byte.
impl Formatter<Json, Vec<u8>> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Vec<u8>,
        _resolver: &dyn Resolver<Json>,
    ) -> Result<()> {
        write_byte_array(buffer, cursor, value)
    }

    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, _resolver: &dyn Resolver<Json>) -> Result<Vec<u8>> {
        read_byte_array(bytes, cursor)
    }
}

fn write_rfc3339(buffer: &mut Vec<u8>, cursor: &mut usize, time: OffsetDateTime) -> Result<()> {
    let text = time
        .format(&Rfc3339)
        .map_err(|err| Error::invalid_value(err.to_string()))?;
    write::write_str(buffer, cursor, &text)
}

fn read_rfc3339(bytes: &[u8], cursor: &mut usize) -> Result<OffsetDateTime> {
    read::skip_whitespace(bytes, cursor);
    let start = *cursor;
    let text = read::read_str(bytes, cursor)?;
    OffsetDateTime::parse(&text, &Rfc3339).map_err(|err| Error::invalid_value(err.to_string()).with_offset(start))
}

/// RFC 3339 text, normalised to UTC on write.
impl Formatter<Json, OffsetDateTime> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &OffsetDateTime,
        _resolver: &dyn Resolver<Json>,
    ) -> Result<()> {
        write_rfc3339(buffer, cursor, value.to_offset(time::UtcOffset::UTC))
    }

    fn deserialize(
        &self,
        bytes: &[u8],
        cursor: &mut usize,
        _resolver: &dyn Resolver<Json>,
    ) -> Result<OffsetDateTime> {
        read_rfc3339(bytes, cursor)
    }
}

impl Formatter<Json, Timestamp> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Timestamp,
        _resolver: &dyn Resolver<Json>,
    ) -> Result<()> {
        write_rfc3339(buffer, cursor, OffsetDateTime::try_from(*value)?)
    }

    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, _resolver: &dyn Resolver<Json>) -> Result<Timestamp> {
        read_rfc3339(bytes, cursor).map(Timestamp::from)
    }
}

impl Formatter<Json, SystemTime> for PrimitiveFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &SystemTime,
        _resolver: &dyn Resolver<Json>,
    ) -> Result<()> {
        write_rfc3339(buffer, cursor, OffsetDateTime::try_from(Timestamp::from(*value))?)
    }

    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, _resolver: &dyn Resolver<Json>) -> Result<SystemTime> {
        let start = *cursor;
        let time = read_rfc3339(bytes, cursor)?;
        SystemTime::try_from(Timestamp::from(time)).map_err(|err| err.with_offset(start))
    }
}

/// Nesting limit for [`Value`] decoding; input beyond it is rejected.
const MAX_DEPTH: usize = 512;

/// Reads any JSON document into a [`Value`] and writes one back.
///
/// Binary data becomes an array of numbers, timestamps RFC 3339 strings and
/// extensions an object with `type` and `data` members; none of them survive
/// a round trip as their original variant. Map keys must be strings or
/// integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueFormatter;

impl ValueFormatter {
    fn write_key(buffer: &mut Vec<u8>, cursor: &mut usize, key: &Value) -> Result<()> {
        match key {
            Value::String(s) => write::write_str(buffer, cursor, s),
            Value::Int(n) => write::write_quoted_integer(buffer, cursor, *n),
            Value::UInt(n) => write::write_quoted_integer(buffer, cursor, *n),
            _ => Err(Error::unsupported_key::<Value>()),
        }
    }

    fn write(buffer: &mut Vec<u8>, cursor: &mut usize, value: &Value) -> Result<()> {
        match value {
            Value::Nil => write::write_null(buffer, cursor),
            Value::Bool(b) => write::write_bool(buffer, cursor, *b),
            Value::Int(n) => write::write_integer(buffer, cursor, *n),
            Value::UInt(n) => write::write_integer(buffer, cursor, *n),
            Value::Float(f) => write::write_f64(buffer, cursor, *f),
            Value::String(s) => write::write_str(buffer, cursor, s),
            Value::Binary(data) => write_byte_array(buffer, cursor, data),
            Value::Array(items) => {
                write::write_begin_array(buffer, cursor)?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write::write_value_separator(buffer, cursor)?;
                    }
                    Self::write(buffer, cursor, item)?;
                }
                write::write_end_array(buffer, cursor)
            }
            Value::Map(entries) => {
                write::write_begin_object(buffer, cursor)?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write::write_value_separator(buffer, cursor)?;
                    }
                    Self::write_key(buffer, cursor, k)?;
                    write::write_name_separator(buffer, cursor)?;
                    Self::write(buffer, cursor, v)?;
                }
                write::write_end_object(buffer, cursor)
            }
            Value::Extension(ext) => {
                write::write_begin_object(buffer, cursor)?;
                write::write_property_name(buffer, cursor, "type")?;
                write::write_integer(buffer, cursor, ext.type_code)?;
                write::write_value_separator(buffer, cursor)?;
                write::write_property_name(buffer, cursor, "data")?;
                write_byte_array(buffer, cursor, &ext.data)?;
                write::write_end_object(buffer, cursor)
            }
            Value::Timestamp(ts) => write_rfc3339(buffer, cursor, OffsetDateTime::try_from(*ts)?),
        }
    }

    fn read_number(bytes: &[u8], cursor: &mut usize) -> Result<Value> {
        let start = *cursor;
        let span = read::read_number_span(bytes, cursor)?;
        // `-0` keeps its sign only as a float
        let integral = span != b"-0" && !span.iter().any(|b| matches!(b, b'.' | b'e' | b'E'));
        if integral {
            let mut at = start;
            if let Ok(n) = read::read_i64(bytes, &mut at) {
                return Ok(Value::Int(n));
            }
            let mut at = start;
            if let Ok(n) = read::read_u64(bytes, &mut at) {
                return Ok(Value::UInt(n));
            }
        }
        let mut at = start;
        read::read_f64(bytes, &mut at).map(Value::Float)
    }

    fn read(bytes: &[u8], cursor: &mut usize, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(Error::invalid_value(format!("nesting deeper than {MAX_DEPTH}")).with_offset(*cursor));
        }
        match read::current_token(bytes, cursor)? {
            Token::Null => read::read_null(bytes, cursor).map(|()| Value::Nil),
            Token::True | Token::False => read::read_bool(bytes, cursor).map(Value::Bool),
            Token::Number => Self::read_number(bytes, cursor),
            Token::String => read::read_str(bytes, cursor).map(|s| Value::String(s.into_owned())),
            Token::BeginArray => {
                let mut state = Json::read_array_start(bytes, cursor)?;
                let mut items = Vec::new();
                while Json::read_array_next(bytes, cursor, &mut state)?.is_some() {
                    items.push(Self::read(bytes, cursor, depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            Token::BeginObject => {
                let mut state = Json::read_map_start(bytes, cursor)?;
                let mut entries = Vec::new();
                while Json::read_map_next(bytes, cursor, &mut state)?.is_some() {
                    let key = read::read_str(bytes, cursor)?.into_owned();
                    read::read_name_separator(bytes, cursor)?;
                    let value = Self::read(bytes, cursor, depth + 1)?;
                    entries.push((Value::String(key), value));
                }
                Ok(Value::Map(entries))
            }
            _ => Err(read::unexpected(bytes, *cursor, "a value")),
        }
    }
}

impl Formatter<Json, Value> for ValueFormatter {
    fn serialize(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Value,
        _resolver: &dyn Resolver<Json>,
    ) -> Result<()> {
        Self::write(buffer, cursor, value)
    }

    fn deserialize(&self, bytes: &[u8], cursor: &mut usize, _resolver: &dyn Resolver<Json>) -> Result<Value> {
        Self::read(bytes, cursor, 0)
    }

    fn serialize_key(
        &self,
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        value: &Value,
        _resolver: &dyn Resolver<Json>,
    ) -> Result<()> {
        Self::write_key(buffer, cursor, value)
    }

    fn deserialize_key(&self, bytes: &[u8], cursor: &mut usize, _resolver: &dyn Resolver<Json>) -> Result<Value> {
        read::read_str(bytes, cursor).map(|s| Value::String(s.into_owned()))
    }
}
