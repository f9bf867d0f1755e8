//! JSON token writers.
//!
//! Structural tokens and literals are written as raw bytes. Numbers use
//! `itoa` and `ryu`, so output never depends on locale.

use twinpack_core::Result;
use twinpack_core::buffer::{write_raw, write_u8};

pub use crate::escape::write_json_string as write_str;

/// `{`
pub fn write_begin_object(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
    write_u8(buffer, cursor, b'{')
}

/// `}`
pub fn write_end_object(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
    write_u8(buffer, cursor, b'}')
}

/// `[`
pub fn write_begin_array(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
    write_u8(buffer, cursor, b'[')
}

/// `]`
pub fn write_end_array(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
    write_u8(buffer, cursor, b']')
}

/// `,`
pub fn write_value_separator(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
    write_u8(buffer, cursor, b',')
}

/// `:`
pub fn write_name_separator(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
    write_u8(buffer, cursor, b':')
}

/// `null`
pub fn write_null(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
    write_raw(buffer, cursor, b"null")
}

/// `true` or `false`
pub fn write_bool(buffer: &mut Vec<u8>, cursor: &mut usize, value: bool) -> Result<()> {
    write_raw(buffer, cursor, if value { &b"true"[..] } else { b"false" })
}

/// A quoted property name followed by `:`.
pub fn write_property_name(buffer: &mut Vec<u8>, cursor: &mut usize, name: &str) -> Result<()> {
    write_str(buffer, cursor, name)?;
    write_name_separator(buffer, cursor)
}

/// Any integer up to 128 bits.
pub fn write_integer<I: itoa::Integer>(buffer: &mut Vec<u8>, cursor: &mut usize, n: I) -> Result<()> {
    let mut digits = itoa::Buffer::new();
    write_raw(buffer, cursor, digits.format(n).as_bytes())
}

/// An integer as a quoted string, for property names.
pub fn write_quoted_integer<I: itoa::Integer>(
    buffer: &mut Vec<u8>,
    cursor: &mut usize,
    n: I,
) -> Result<()> {
    write_u8(buffer, cursor, b'"')?;
    write_integer(buffer, cursor, n)?;
    write_u8(buffer, cursor, b'"')
}

/// Shortest round-tripping decimal form; NaN and the infinities have no
/// JSON form and are written as `null`.
pub fn write_f64(buffer: &mut Vec<u8>, cursor: &mut usize, n: f64) -> Result<()> {
    if !n.is_finite() {
        return write_null(buffer, cursor);
    }
    let mut digits = ryu::Buffer::new();
    write_raw(buffer, cursor, digits.format_finite(n).as_bytes())
}

/// As [`write_f64`], with `f32` precision.
pub fn write_f32(buffer: &mut Vec<u8>, cursor: &mut usize, n: f32) -> Result<()> {
    if !n.is_finite() {
        return write_null(buffer, cursor);
    }
    let mut digits = ryu::Buffer::new();
    write_raw(buffer, cursor, digits.format_finite(n).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinpack_core::buffer::finish;
    use twinpack_testhelpers::test;

    fn text(write: impl FnOnce(&mut Vec<u8>, &mut usize) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        let mut cursor = 0;
        write(&mut buffer, &mut cursor).unwrap();
        String::from_utf8(finish(buffer, cursor)).unwrap()
    }

    #[test]
    fn integers_are_plain_decimal() {
        assert_eq!(text(|b, c| write_integer(b, c, -12_345i32)), "-12345");
        assert_eq!(text(|b, c| write_integer(b, c, u128::MAX)), u128::MAX.to_string());
        assert_eq!(text(|b, c| write_quoted_integer(b, c, 7u8)), "\"7\"");
    }

    #[test]
    fn floats_round_trip_and_non_finite_is_null() {
        assert_eq!(text(|b, c| write_f64(b, c, 1.5)), "1.5");
        assert_eq!(text(|b, c| write_f64(b, c, 1e300)), "1e300");
        assert_eq!(text(|b, c| write_f32(b, c, 0.1)), "0.1");
        assert_eq!(text(|b, c| write_f64(b, c, f64::NAN)), "null");
        assert_eq!(text(|b, c| write_f64(b, c, f64::NEG_INFINITY)), "null");
    }

    #[test]
    fn tokens() {
        let out = text(|b, c| {
            write_begin_object(b, c)?;
            write_property_name(b, c, "k")?;
            write_begin_array(b, c)?;
            write_bool(b, c, true)?;
            write_value_separator(b, c)?;
            write_null(b, c)?;
            write_end_array(b, c)?;
            write_end_object(b, c)
        });
        assert_eq!(out, r#"{"k":[true,null]}"#);
    }
}
