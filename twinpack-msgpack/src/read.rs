//! MessagePack readers.
//!
//! Each reader peeks the leading byte and jumps straight to the decoder its
//! table holds for that byte.

use twinpack_core::buffer::peek;
use twinpack_core::{Error, ErrorKind, Extension, ExtensionHeader, Result, Timestamp};

use crate::codes::NIL;
use crate::dispatch::{self, dispatch};

macro_rules! reader {
    ($($(#[$meta:meta])* $name:ident -> $t:ty = $table:ident;)*) => {$(
        $(#[$meta])*
        #[inline]
        pub fn $name(bytes: &[u8], cursor: &mut usize) -> Result<$t> {
            dispatch(&dispatch::$table, bytes, cursor)
        }
    )*};
}

reader! {
    /// `true` or `false`.
    read_bool -> bool = BOOL;
    /// Any encoding whose value fits `u8`.
    read_u8 -> u8 = U8;
    /// Any encoding whose value fits `u16`.
    read_u16 -> u16 = U16;
    /// Any encoding whose value fits `u32`.
    read_u32 -> u32 = U32;
    /// Any encoding whose value fits `u64`.
    read_u64 -> u64 = U64;
    /// Any encoding whose value fits `i8`.
    read_i8 -> i8 = I8;
    /// Any encoding whose value fits `i16`.
    read_i16 -> i16 = I16;
    /// Any encoding whose value fits `i32`.
    read_i32 -> i32 = I32;
    /// Any encoding whose value fits `i64`.
    read_i64 -> i64 = I64;
    /// Either float width or any integer, narrowed to `f32`.
    read_f32 -> f32 = F32;
    /// Either float width or any integer.
    read_f64 -> f64 = FLOAT;
    /// Element count of an array.
    read_array_header -> usize = ARRAY_HEADER;
    /// Entry count of a map.
    read_map_header -> usize = MAP_HEADER;
    /// Type code and payload length, leaving the cursor on the payload.
    read_extension_header -> ExtensionHeader = EXT_HEADER;
    /// A whole extension value.
    read_extension -> Extension = EXTENSION;
    /// Any of the three timestamp layouts.
    read_timestamp -> Timestamp = TIMESTAMP;
}

/// A str, borrowed from the input.
#[inline]
pub fn read_str<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a str> {
    let code = peek(bytes, *cursor)?;
    dispatch::STR[code as usize](bytes, cursor)
}

/// A str payload as raw bytes, without UTF-8 validation.
#[inline]
pub fn read_str_bytes<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    let code = peek(bytes, *cursor)?;
    dispatch::STR_SPAN[code as usize](bytes, cursor)
}

/// A bin payload, borrowed from the input.
#[inline]
pub fn read_bytes<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    let code = peek(bytes, *cursor)?;
    dispatch::BIN[code as usize](bytes, cursor)
}

/// Consume a nil if the cursor is on one.
#[inline]
pub fn try_read_nil(bytes: &[u8], cursor: &mut usize) -> Result<bool> {
    if peek(bytes, *cursor)? == NIL {
        *cursor += 1;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Consume a nil or fail.
pub fn read_nil(bytes: &[u8], cursor: &mut usize) -> Result<()> {
    if try_read_nil(bytes, cursor)? {
        Ok(())
    } else {
        Err(dispatch::invalid_code(bytes, *cursor, "nil"))
    }
}

/// Skip one complete value, nested arrays and maps included, without
/// decoding it.
///
/// Works off a count of values still owed rather than recursion, so nesting
/// depth costs no stack.
pub fn skip_value(bytes: &[u8], cursor: &mut usize) -> Result<()> {
    let mut owed: usize = 1;
    while owed > 0 {
        owed -= 1;
        let start = *cursor;
        let nested = dispatch(&dispatch::SKIP, bytes, cursor)?;
        owed = owed.checked_add(nested).ok_or_else(|| {
            Error::at(
                ErrorKind::NumberOutOfRange {
                    target: "nested value count",
                },
                start,
            )
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write;
    use twinpack_core::buffer::finish;
    use twinpack_testhelpers::test;

    #[test]
    fn never_used_code_is_rejected_everywhere() {
        let bytes = [0xc1];
        let err = read_i32(&bytes, &mut 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid code 0xc1 (never used) while reading i32 at offset 0"
        );
        assert!(read_bool(&bytes, &mut 0).is_err());
        assert!(read_str(&bytes, &mut 0).is_err());
        assert!(skip_value(&bytes, &mut 0).is_err());
        assert!(read_array_header(&bytes, &mut 0).is_err());
    }

    #[test]
    fn integers_decode_across_widths() {
        assert_eq!(read_u8(&[0x7f], &mut 0).unwrap(), 127);
        assert_eq!(read_i64(&[0xe0], &mut 0).unwrap(), -32);
        assert_eq!(read_i16(&[0xd0, 0x80], &mut 0).unwrap(), -128);
        assert_eq!(read_u64(&[0xcd, 0x01, 0x00], &mut 0).unwrap(), 256);
        assert_eq!(read_i32(&[0xcc, 0xff], &mut 0).unwrap(), 255);
    }

    #[test]
    fn out_of_range_is_an_error_not_a_truncation() {
        let err = read_u8(&[0xcd, 0x01, 0x00], &mut 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NumberOutOfRange { target: "u8" });
        let err = read_u32(&[0xff], &mut 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NumberOutOfRange { target: "u32" });
    }

    #[test]
    fn truncated_payload_is_eof() {
        let err = read_u32(&[0xce, 0x00, 0x01], &mut 0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedEof { .. }));
        let err = read_str(&[0xa3, b'a'], &mut 0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedEof { .. }));
        let err = read_bool(&[], &mut 0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedEof { needed: 1 }));
    }

    #[test]
    fn strings_and_bins() {
        let mut cursor = 0;
        assert_eq!(read_str(&[0xa2, b'h', b'i'], &mut cursor).unwrap(), "hi");
        assert_eq!(cursor, 3);
        assert_eq!(read_str_bytes(&[0xd9, 1, 0xff], &mut 0).unwrap(), [0xff]);
        let err = read_str(&[0xd9, 1, 0xff], &mut 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidUtf8);
        assert_eq!(read_bytes(&[0xc4, 2, 1, 2], &mut 0).unwrap(), [1, 2]);
    }

    #[test]
    fn floats_accept_integers() {
        assert_eq!(read_f64(&[0x05], &mut 0).unwrap(), 5.0);
        assert_eq!(read_f64(&[0xd0, 0x80], &mut 0).unwrap(), -128.0);
        let mut buffer = Vec::new();
        let mut cursor = 0;
        write::write_f32(&mut buffer, &mut cursor, 1.5).unwrap();
        let bytes = finish(buffer, cursor);
        assert_eq!(read_f32(&bytes, &mut 0).unwrap(), 1.5);
        assert_eq!(read_f64(&bytes, &mut 0).unwrap(), 1.5);
    }

    #[test]
    fn timestamp_extension_must_match() {
        // fixext 4 with a type code other than -1
        let err = read_timestamp(&[0xd6, 0x05, 0, 0, 0, 0], &mut 0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidExtension { type_code: 5, length: 4, .. }));
        // ext 8 declaring 11 bytes
        let mut bytes = vec![0xc7, 11, 0xff];
        bytes.extend([0; 11]);
        assert!(read_timestamp(&bytes, &mut 0).is_err());
        // 64-bit layout with nanoseconds above one billion
        let packed: u64 = 1_000_000_000 << 34;
        let mut bytes = vec![0xd7, 0xff];
        bytes.extend(packed.to_be_bytes());
        let err = read_timestamp(&bytes, &mut 0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidValue { .. }));
    }

    #[test]
    fn skip_nested_containers() {
        // [{"a": [1, 2]}, nil, bin8[3]] followed by 7
        let bytes = [
            0x93, 0x81, 0xa1, b'a', 0x92, 0x01, 0x02, 0xc0, 0xc4, 0x03, 1, 2, 3, 0x07,
        ];
        let mut cursor = 0;
        skip_value(&bytes, &mut cursor).unwrap();
        assert_eq!(cursor, bytes.len() - 1);
        assert_eq!(read_u8(&bytes, &mut cursor).unwrap(), 7);
    }

    #[test]
    fn skip_deep_nesting_uses_no_recursion() {
        let mut bytes = vec![0x91; 100_000];
        bytes.push(0xc0);
        let mut cursor = 0;
        skip_value(&bytes, &mut cursor).unwrap();
        assert_eq!(cursor, bytes.len());
    }
}
