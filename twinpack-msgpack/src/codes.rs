//! MessagePack leading-byte constants and classification.

#![allow(missing_docs)]

/// Largest positive fixint (`0xxxxxxx`).
pub const POSITIVE_FIXINT_MAX: u8 = 0x7f;
/// First fixmap code (`1000xxxx`).
pub const FIXMAP_MIN: u8 = 0x80;
/// Last fixmap code.
pub const FIXMAP_MAX: u8 = 0x8f;
/// First fixarray code (`1001xxxx`).
pub const FIXARRAY_MIN: u8 = 0x90;
/// Last fixarray code.
pub const FIXARRAY_MAX: u8 = 0x9f;
/// First fixstr code (`101xxxxx`).
pub const FIXSTR_MIN: u8 = 0xa0;
/// Last fixstr code.
pub const FIXSTR_MAX: u8 = 0xbf;
pub const NIL: u8 = 0xc0;
/// Reserved; never valid on the wire.
pub const NEVER_USED: u8 = 0xc1;
pub const FALSE: u8 = 0xc2;
pub const TRUE: u8 = 0xc3;
pub const BIN8: u8 = 0xc4;
pub const BIN16: u8 = 0xc5;
pub const BIN32: u8 = 0xc6;
pub const EXT8: u8 = 0xc7;
pub const EXT16: u8 = 0xc8;
pub const EXT32: u8 = 0xc9;
pub const FLOAT32: u8 = 0xca;
pub const FLOAT64: u8 = 0xcb;
pub const UINT8: u8 = 0xcc;
pub const UINT16: u8 = 0xcd;
pub const UINT32: u8 = 0xce;
pub const UINT64: u8 = 0xcf;
pub const INT8: u8 = 0xd0;
pub const INT16: u8 = 0xd1;
pub const INT32: u8 = 0xd2;
pub const INT64: u8 = 0xd3;
pub const FIXEXT1: u8 = 0xd4;
pub const FIXEXT2: u8 = 0xd5;
pub const FIXEXT4: u8 = 0xd6;
pub const FIXEXT8: u8 = 0xd7;
pub const FIXEXT16: u8 = 0xd8;
pub const STR8: u8 = 0xd9;
pub const STR16: u8 = 0xda;
pub const STR32: u8 = 0xdb;
pub const ARRAY16: u8 = 0xdc;
pub const ARRAY32: u8 = 0xdd;
pub const MAP16: u8 = 0xde;
pub const MAP32: u8 = 0xdf;
/// First negative fixint (`111xxxxx`, -32).
pub const NEGATIVE_FIXINT_MIN: u8 = 0xe0;

/// Largest count a fix header can carry.
pub const FIX_COUNT_MAX: usize = 15;
/// Largest byte length a fixstr can carry.
pub const FIXSTR_LEN_MAX: usize = 31;

/// Extension type code reserved for timestamps.
pub const TIMESTAMP_TYPE: i8 = -1;

/// Broad family of a leading byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Any integer encoding
    Integer,
    /// `nil`
    Nil,
    /// `true` / `false`
    Boolean,
    /// float 32 / float 64
    Float,
    /// fixstr / str 8/16/32
    String,
    /// bin 8/16/32
    Binary,
    /// fixarray / array 16/32
    Array,
    /// fixmap / map 16/32
    Map,
    /// fixext / ext 8/16/32
    Extension,
    /// The reserved `0xc1`
    Unknown,
}

/// Classify a leading byte.
pub const fn value_type(code: u8) -> ValueType {
    match code {
        0x00..=POSITIVE_FIXINT_MAX | NEGATIVE_FIXINT_MIN..=0xff => ValueType::Integer,
        UINT8..=INT64 => ValueType::Integer,
        FIXMAP_MIN..=FIXMAP_MAX | MAP16 | MAP32 => ValueType::Map,
        FIXARRAY_MIN..=FIXARRAY_MAX | ARRAY16 | ARRAY32 => ValueType::Array,
        FIXSTR_MIN..=FIXSTR_MAX | STR8 | STR16 | STR32 => ValueType::String,
        NIL => ValueType::Nil,
        FALSE | TRUE => ValueType::Boolean,
        BIN8 | BIN16 | BIN32 => ValueType::Binary,
        EXT8 | EXT16 | EXT32 | FIXEXT1..=FIXEXT16 => ValueType::Extension,
        FLOAT32 | FLOAT64 => ValueType::Float,
        NEVER_USED => ValueType::Unknown,
    }
}

/// The name the MessagePack specification gives a leading byte.
pub const fn format_name(code: u8) -> &'static str {
    match code {
        0x00..=POSITIVE_FIXINT_MAX => "positive fixint",
        FIXMAP_MIN..=FIXMAP_MAX => "fixmap",
        FIXARRAY_MIN..=FIXARRAY_MAX => "fixarray",
        FIXSTR_MIN..=FIXSTR_MAX => "fixstr",
        NIL => "nil",
        NEVER_USED => "never used",
        FALSE => "false",
        TRUE => "true",
        BIN8 => "bin 8",
        BIN16 => "bin 16",
        BIN32 => "bin 32",
        EXT8 => "ext 8",
        EXT16 => "ext 16",
        EXT32 => "ext 32",
        FLOAT32 => "float 32",
        FLOAT64 => "float 64",
        UINT8 => "uint 8",
        UINT16 => "uint 16",
        UINT32 => "uint 32",
        UINT64 => "uint 64",
        INT8 => "int 8",
        INT16 => "int 16",
        INT32 => "int 32",
        INT64 => "int 64",
        FIXEXT1 => "fixext 1",
        FIXEXT2 => "fixext 2",
        FIXEXT4 => "fixext 4",
        FIXEXT8 => "fixext 8",
        FIXEXT16 => "fixext 16",
        STR8 => "str 8",
        STR16 => "str 16",
        STR32 => "str 32",
        ARRAY16 => "array 16",
        ARRAY32 => "array 32",
        MAP16 => "map 16",
        MAP32 => "map 32",
        NEGATIVE_FIXINT_MIN..=0xff => "negative fixint",
    }
}
