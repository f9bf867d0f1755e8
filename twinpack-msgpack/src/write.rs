//! MessagePack writers.
//!
//! Every writer emits one complete value at the cursor using the smallest
//! header that can hold it, and leaves the cursor just past what it wrote.

use core::fmt::{self, Display, Write as _};

use twinpack_core::buffer::{ensure_capacity, write_raw, write_tagged, write_u8 as write_byte};
use twinpack_core::{Error, ErrorKind, Result, Timestamp};

use crate::codes::*;

/// Largest header a str can need (`str 32` plus four length bytes).
const MAX_STR_HEADER: usize = 5;

/// `nil`
pub fn write_nil(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
    write_byte(buffer, cursor, NIL)
}

/// `true` or `false`
pub fn write_bool(buffer: &mut Vec<u8>, cursor: &mut usize, value: bool) -> Result<()> {
    write_byte(buffer, cursor, if value { TRUE } else { FALSE })
}

/// Non-negative integers escalate fixint, uint 8, uint 16, uint 32, uint 64.
pub fn write_u64(buffer: &mut Vec<u8>, cursor: &mut usize, n: u64) -> Result<()> {
    match n {
        0..=127 => write_byte(buffer, cursor, n as u8),
        128..=255 => write_tagged(buffer, cursor, UINT8, [n as u8]),
        256..=65535 => write_tagged(buffer, cursor, UINT16, (n as u16).to_be_bytes()),
        65536..=4294967295 => write_tagged(buffer, cursor, UINT32, (n as u32).to_be_bytes()),
        _ => write_tagged(buffer, cursor, UINT64, n.to_be_bytes()),
    }
}

/// Non-negative values go through [`write_u64`]; negative ones escalate
/// negative fixint, int 8, int 16, int 32, int 64.
pub fn write_i64(buffer: &mut Vec<u8>, cursor: &mut usize, n: i64) -> Result<()> {
    match n {
        0..=i64::MAX => write_u64(buffer, cursor, n as u64),
        -32..=-1 => write_byte(buffer, cursor, n as u8),
        -128..=-33 => write_tagged(buffer, cursor, INT8, [n as u8]),
        -32768..=-129 => write_tagged(buffer, cursor, INT16, (n as i16).to_be_bytes()),
        -2147483648..=-32769 => write_tagged(buffer, cursor, INT32, (n as i32).to_be_bytes()),
        _ => write_tagged(buffer, cursor, INT64, n.to_be_bytes()),
    }
}

/// See [`write_u64`].
pub fn write_u8(buffer: &mut Vec<u8>, cursor: &mut usize, n: u8) -> Result<()> {
    write_u64(buffer, cursor, n as u64)
}

/// See [`write_u64`].
pub fn write_u16(buffer: &mut Vec<u8>, cursor: &mut usize, n: u16) -> Result<()> {
    write_u64(buffer, cursor, n as u64)
}

/// See [`write_u64`].
pub fn write_u32(buffer: &mut Vec<u8>, cursor: &mut usize, n: u32) -> Result<()> {
    write_u64(buffer, cursor, n as u64)
}

/// See [`write_i64`].
pub fn write_i8(buffer: &mut Vec<u8>, cursor: &mut usize, n: i8) -> Result<()> {
    write_i64(buffer, cursor, n as i64)
}

/// See [`write_i64`].
pub fn write_i16(buffer: &mut Vec<u8>, cursor: &mut usize, n: i16) -> Result<()> {
    write_i64(buffer, cursor, n as i64)
}

/// See [`write_i64`].
pub fn write_i32(buffer: &mut Vec<u8>, cursor: &mut usize, n: i32) -> Result<()> {
    write_i64(buffer, cursor, n as i64)
}

/// Always `uint 32`, five bytes, whatever the value.
pub fn write_u32_forced(buffer: &mut Vec<u8>, cursor: &mut usize, n: u32) -> Result<()> {
    write_tagged(buffer, cursor, UINT32, n.to_be_bytes())
}

/// Always float 32.
pub fn write_f32(buffer: &mut Vec<u8>, cursor: &mut usize, n: f32) -> Result<()> {
    write_tagged(buffer, cursor, FLOAT32, n.to_be_bytes())
}

/// Always float 64.
pub fn write_f64(buffer: &mut Vec<u8>, cursor: &mut usize, n: f64) -> Result<()> {
    write_tagged(buffer, cursor, FLOAT64, n.to_be_bytes())
}

fn wire_len(len: usize, what: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::new(ErrorKind::NumberOutOfRange { target: what }))
}

/// fixarray, array 16 or array 32.
pub fn write_array_header(buffer: &mut Vec<u8>, cursor: &mut usize, len: usize) -> Result<()> {
    let len = wire_len(len, "array length")?;
    match len {
        0..=15 => write_byte(buffer, cursor, FIXARRAY_MIN | len as u8),
        16..=65535 => write_tagged(buffer, cursor, ARRAY16, (len as u16).to_be_bytes()),
        _ => write_tagged(buffer, cursor, ARRAY32, len.to_be_bytes()),
    }
}

/// fixmap, map 16 or map 32.
pub fn write_map_header(buffer: &mut Vec<u8>, cursor: &mut usize, len: usize) -> Result<()> {
    let len = wire_len(len, "map length")?;
    match len {
        0..=15 => write_byte(buffer, cursor, FIXMAP_MIN | len as u8),
        16..=65535 => write_tagged(buffer, cursor, MAP16, (len as u16).to_be_bytes()),
        _ => write_tagged(buffer, cursor, MAP32, len.to_be_bytes()),
    }
}

/// `array 32` whatever the count, so the count can be patched later.
pub fn write_array_header_forced32(buffer: &mut Vec<u8>, cursor: &mut usize, len: u32) -> Result<()> {
    write_tagged(buffer, cursor, ARRAY32, len.to_be_bytes())
}

/// `map 32` whatever the count, so the count can be patched later.
pub fn write_map_header_forced32(buffer: &mut Vec<u8>, cursor: &mut usize, len: u32) -> Result<()> {
    write_tagged(buffer, cursor, MAP32, len.to_be_bytes())
}

const fn str_header_len(len: usize) -> usize {
    match len {
        0..=FIXSTR_LEN_MAX => 1,
        32..=255 => 2,
        256..=65535 => 3,
        _ => 5,
    }
}

/// fixstr, str 8, str 16 or str 32.
pub fn write_str_header(buffer: &mut Vec<u8>, cursor: &mut usize, len: usize) -> Result<()> {
    let len = wire_len(len, "str length")?;
    match len {
        0..=31 => write_byte(buffer, cursor, FIXSTR_MIN | len as u8),
        32..=255 => write_tagged(buffer, cursor, STR8, [len as u8]),
        256..=65535 => write_tagged(buffer, cursor, STR16, (len as u16).to_be_bytes()),
        _ => write_tagged(buffer, cursor, STR32, len.to_be_bytes()),
    }
}

/// A str value with the smallest header that fits.
pub fn write_str(buffer: &mut Vec<u8>, cursor: &mut usize, value: &str) -> Result<()> {
    ensure_capacity(buffer, *cursor, str_header_len(value.len()) + value.len())?;
    write_str_header(buffer, cursor, value.len())?;
    write_raw(buffer, cursor, value.as_bytes())
}

/// Streams text into the buffer, remembering why a write failed.
struct Sink<'a> {
    buffer: &'a mut Vec<u8>,
    cursor: &'a mut usize,
    error: Option<Error>,
}

impl fmt::Write for Sink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_raw(self.buffer, self.cursor, s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

/// Write the `Display` form of `value` as a str without measuring it first.
///
/// The text is formatted straight into the buffer behind room for the
/// largest header. Once its length is known the minimal header is written
/// in front and the text is moved down over the unused header bytes.
pub fn write_display(buffer: &mut Vec<u8>, cursor: &mut usize, value: impl Display) -> Result<()> {
    let start = *cursor;
    let payload_start = start + MAX_STR_HEADER;
    ensure_capacity(buffer, start, MAX_STR_HEADER)?;

    let mut end = payload_start;
    let mut sink = Sink {
        buffer: &mut *buffer,
        cursor: &mut end,
        error: None,
    };
    if write!(sink, "{value}").is_err() {
        return Err(sink
            .error
            .unwrap_or_else(|| Error::invalid_value("Display implementation returned an error")));
    }

    let len = end - payload_start;
    *cursor = start;
    write_str_header(buffer, cursor, len)?;
    let header_len = *cursor - start;
    if header_len < MAX_STR_HEADER {
        buffer.copy_within(payload_start..end, start + header_len);
    }
    *cursor = start + header_len + len;
    Ok(())
}

/// bin 8, bin 16 or bin 32.
pub fn write_bin_header(buffer: &mut Vec<u8>, cursor: &mut usize, len: usize) -> Result<()> {
    let len = wire_len(len, "bin length")?;
    match len {
        0..=255 => write_tagged(buffer, cursor, BIN8, [len as u8]),
        256..=65535 => write_tagged(buffer, cursor, BIN16, (len as u16).to_be_bytes()),
        _ => write_tagged(buffer, cursor, BIN32, len.to_be_bytes()),
    }
}

/// A bin value.
pub fn write_bytes(buffer: &mut Vec<u8>, cursor: &mut usize, value: &[u8]) -> Result<()> {
    write_bin_header(buffer, cursor, value.len())?;
    write_raw(buffer, cursor, value)
}

/// fixext for payloads of exactly 1, 2, 4, 8 or 16 bytes, ext 8/16/32 otherwise.
pub fn write_extension_header(
    buffer: &mut Vec<u8>,
    cursor: &mut usize,
    type_code: i8,
    len: usize,
) -> Result<()> {
    let len = wire_len(len, "ext length")?;
    let type_byte = type_code as u8;
    match len {
        1 => write_tagged(buffer, cursor, FIXEXT1, [type_byte]),
        2 => write_tagged(buffer, cursor, FIXEXT2, [type_byte]),
        4 => write_tagged(buffer, cursor, FIXEXT4, [type_byte]),
        8 => write_tagged(buffer, cursor, FIXEXT8, [type_byte]),
        16 => write_tagged(buffer, cursor, FIXEXT16, [type_byte]),
        0..=255 => write_tagged(buffer, cursor, EXT8, [len as u8, type_byte]),
        256..=65535 => {
            let [hi, lo] = (len as u16).to_be_bytes();
            write_tagged(buffer, cursor, EXT16, [hi, lo, type_byte])
        }
        _ => {
            let [a, b, c, d] = len.to_be_bytes();
            write_tagged(buffer, cursor, EXT32, [a, b, c, d, type_byte])
        }
    }
}

/// An extension value: header, type code, then `data`.
pub fn write_extension(
    buffer: &mut Vec<u8>,
    cursor: &mut usize,
    type_code: i8,
    data: &[u8],
) -> Result<()> {
    write_extension_header(buffer, cursor, type_code, data.len())?;
    write_raw(buffer, cursor, data)
}

/// Timestamp extension, in the smallest of its three layouts:
///
/// - 32 bits: whole seconds in `0..2^32`, as fixext 4.
/// - 64 bits: seconds in `0..2^34` with nanoseconds, as fixext 8.
/// - 96 bits: anything else, as ext 8 with 32-bit nanoseconds and 64-bit seconds.
pub fn write_timestamp(buffer: &mut Vec<u8>, cursor: &mut usize, value: Timestamp) -> Result<()> {
    let seconds = value.seconds();
    let nanos = value.nanos();
    let type_byte = TIMESTAMP_TYPE as u8;

    if (seconds as u64) >> 34 == 0 {
        let packed = ((nanos as u64) << 34) | seconds as u64;
        if packed & 0xffff_ffff_0000_0000 == 0 {
            let [a, b, c, d] = (packed as u32).to_be_bytes();
            write_tagged(buffer, cursor, FIXEXT4, [type_byte, a, b, c, d])
        } else {
            let [a, b, c, d, e, f, g, h] = packed.to_be_bytes();
            write_tagged(buffer, cursor, FIXEXT8, [type_byte, a, b, c, d, e, f, g, h])
        }
    } else {
        let mut payload = [0u8; 14];
        payload[0] = 12;
        payload[1] = type_byte;
        payload[2..6].copy_from_slice(&nanos.to_be_bytes());
        payload[6..14].copy_from_slice(&seconds.to_be_bytes());
        write_tagged(buffer, cursor, EXT8, payload)
    }
}
