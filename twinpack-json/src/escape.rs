//! String escaping in both directions.
//!
//! Output is pure ASCII: everything above U+007F is written as `\uXXXX`,
//! as a surrogate pair beyond the basic multilingual plane.

use twinpack_core::buffer::write_raw;
use twinpack_core::{Error, ErrorKind, Result};

/// Write `s` as a quoted JSON string.
///
/// Runs of sixteen plain ASCII bytes are copied in one go; anything that
/// needs escaping drops to a per-character path for the rest of that run.
pub fn write_json_string(buffer: &mut Vec<u8>, cursor: &mut usize, s: &str) -> Result<()> {
    const STEP_SIZE: usize = 16;
    type Chunk = [u8; STEP_SIZE];

    write_raw(buffer, cursor, b"\"")?;

    let mut s = s;
    while let Some(Ok(chunk)) = s.as_bytes().get(..STEP_SIZE).map(Chunk::try_from) {
        let window = u128::from_ne_bytes(chunk);
        let completely_ascii = window & 0x80808080808080808080808080808080 == 0;
        let quote_free = !contains_byte(window, b'"');
        let backslash_free = !contains_byte(window, b'\\');
        let control_char_free = no_control_chars(window);

        if completely_ascii && quote_free && backslash_free && control_char_free {
            write_raw(buffer, cursor, &chunk)?;
            s = &s[STEP_SIZE..];
        } else {
            let mut chars = s.chars();
            let mut count = STEP_SIZE;
            for c in &mut chars {
                write_escaped_char(buffer, cursor, c)?;
                count = count.saturating_sub(c.len_utf8());
                if count == 0 {
                    break;
                }
            }
            s = chars.as_str();
        }
    }

    for c in s.chars() {
        write_escaped_char(buffer, cursor, c)?;
    }

    write_raw(buffer, cursor, b"\"")
}

const HEX: &[u8; 16] = b"0123456789abcdef";

fn unicode_escape(unit: u16) -> [u8; 6] {
    [
        b'\\',
        b'u',
        HEX[(unit >> 12) as usize & 0xf],
        HEX[(unit >> 8) as usize & 0xf],
        HEX[(unit >> 4) as usize & 0xf],
        HEX[unit as usize & 0xf],
    ]
}

#[inline]
fn write_escaped_char(buffer: &mut Vec<u8>, cursor: &mut usize, c: char) -> Result<()> {
    match c {
        '"' => write_raw(buffer, cursor, b"\\\""),
        '\\' => write_raw(buffer, cursor, b"\\\\"),
        '\n' => write_raw(buffer, cursor, b"\\n"),
        '\r' => write_raw(buffer, cursor, b"\\r"),
        '\t' => write_raw(buffer, cursor, b"\\t"),
        '\u{08}' => write_raw(buffer, cursor, b"\\b"),
        '\u{0C}' => write_raw(buffer, cursor, b"\\f"),
        c if c.is_ascii_control() => write_raw(buffer, cursor, &unicode_escape(c as u16)),
        c if c.is_ascii() => write_raw(buffer, cursor, &[c as u8]),
        c => {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write_raw(buffer, cursor, &unicode_escape(*unit))?;
            }
            Ok(())
        }
    }
}

/// Check if any byte in the u128 equals the target byte.
#[inline]
const fn contains_byte(val: u128, byte: u8) -> bool {
    let mask = 0x01010101010101010101010101010101u128 * (byte as u128);
    let xor_result = val ^ mask;
    let has_zero = (xor_result.wrapping_sub(0x01010101010101010101010101010101))
        & !xor_result
        & 0x80808080808080808080808080808080;
    has_zero != 0
}

/// Check that every byte is at least 0x20.
#[inline]
const fn no_control_chars(value: u128) -> bool {
    let masked = value & 0xe0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0;
    let has_zero = (masked.wrapping_sub(0x01010101010101010101010101010101))
        & !masked
        & 0x80808080808080808080808080808080;
    has_zero == 0
}

fn hex_unit(span: &[u8], at: usize, base: usize) -> Result<u16> {
    let digits = span
        .get(at..at + 4)
        .ok_or_else(|| Error::at(ErrorKind::InvalidEscape, base + at))?;
    digits.iter().try_fold(0u16, |acc, &d| {
        let nibble = match d {
            b'0'..=b'9' => d - b'0',
            b'a'..=b'f' => d - b'a' + 10,
            b'A'..=b'F' => d - b'A' + 10,
            _ => return Err(Error::at(ErrorKind::InvalidEscape, base + at)),
        };
        Ok(acc << 4 | nibble as u16)
    })
}

/// Decode the body of a string literal (between the quotes) that contains
/// at least one escape. `base` is the offset of `span` in the input, for
/// error positions.
pub fn unescape(span: &[u8], base: usize) -> Result<String> {
    let mut out = Vec::with_capacity(span.len());
    let mut i = 0;
    while i < span.len() {
        let run = span[i..].iter().position(|&b| b == b'\\').unwrap_or(span.len() - i);
        out.extend_from_slice(&span[i..i + run]);
        i += run;
        if i == span.len() {
            break;
        }

        let escape = *span
            .get(i + 1)
            .ok_or_else(|| Error::at(ErrorKind::InvalidEscape, base + i))?;
        i += 2;
        let simple = match escape {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let start = i - 2;
                let unit = hex_unit(span, i, base)?;
                i += 4;
                let code_point = match unit {
                    0xd800..=0xdbff => {
                        if span.get(i..i + 2) != Some(&b"\\u"[..]) {
                            return Err(Error::at(ErrorKind::InvalidEscape, base + start));
                        }
                        let low = hex_unit(span, i + 2, base)?;
                        if !(0xdc00..=0xdfff).contains(&low) {
                            return Err(Error::at(ErrorKind::InvalidEscape, base + start));
                        }
                        i += 6;
                        0x10000 + ((unit as u32 & 0x3ff) << 10) + (low as u32 & 0x3ff)
                    }
                    0xdc00..=0xdfff => {
                        return Err(Error::at(ErrorKind::InvalidEscape, base + start));
                    }
                    unit => unit as u32,
                };
                let c = char::from_u32(code_point)
                    .ok_or_else(|| Error::at(ErrorKind::InvalidEscape, base + start))?;
                out.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes());
                continue;
            }
            _ => return Err(Error::at(ErrorKind::InvalidEscape, base + i - 2)),
        };
        out.push(simple);
    }
    String::from_utf8(out).map_err(|_| Error::at(ErrorKind::InvalidUtf8, base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinpack_core::buffer::finish;
    use twinpack_testhelpers::test;

    fn escaped(s: &str) -> String {
        let mut buffer = Vec::new();
        let mut cursor = 0;
        write_json_string(&mut buffer, &mut cursor, s).unwrap();
        String::from_utf8(finish(buffer, cursor)).unwrap()
    }

    #[test]
    fn plain_ascii_passes_through() {
        assert_eq!(escaped(""), r#""""#);
        assert_eq!(escaped("hello"), r#""hello""#);
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        assert_eq!(escaped(long), format!("\"{long}\""));
    }

    #[test]
    fn specials_and_controls() {
        assert_eq!(escaped("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(escaped("\n\r\t\u{08}\u{0c}"), r#""\n\r\t\b\f""#);
        assert_eq!(escaped("\u{01}\u{1f}\u{7f}"), r#""\u0001\u001f\u007f""#);
    }

    #[test]
    fn non_ascii_becomes_unicode_escapes() {
        assert_eq!(escaped("é"), r#""\u00e9""#);
        assert_eq!(escaped("日本"), r#""\u65e5\u672c""#);
        assert_eq!(escaped("😀"), r#""\ud83d\ude00""#);
        // escape in the middle of a sixteen-byte run
        assert_eq!(escaped("0123456789abcdéf0123"), r#""0123456789abcd\u00e9f0123""#);
    }

    #[test]
    fn unescape_handles_pairs_and_rejects_lone_surrogates() {
        assert_eq!(unescape(br"\ud83d\ude00!", 0).unwrap(), "😀!");
        assert_eq!(unescape(br"tab\there\/", 0).unwrap(), "tab\there/");
        assert_eq!(unescape(br"\u00e9", 0).unwrap(), "é");
        let err = unescape(br"x\ud83d", 10).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidEscape);
        assert_eq!(err.offset, Some(11));
        assert!(unescape(br"\ude00", 0).is_err());
        assert!(unescape(br"\q", 0).is_err());
        assert!(unescape(br"\u12", 0).is_err());
        assert!(unescape(b"trailing\\", 0).is_err());
    }
}
