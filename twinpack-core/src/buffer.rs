//! Growable output buffer and cursor discipline shared by every writer.
//!
//! Writers operate on a `Vec<u8>` whose *length* is the usable capacity and a
//! separate cursor that marks the end of the bytes produced so far. Every
//! primitive writer calls [`ensure_capacity`] before touching bytes at the
//! cursor, and leaves the cursor exactly past what it wrote. [`finish`] trims
//! the slack once the top-level value is complete.
//!
//! Readers take a plain `&[u8]` and the same kind of cursor.

use crate::{Error, ErrorKind, Result};

/// Smallest length a buffer grows to.
const MIN_LEN: usize = 64;

/// Largest length a buffer may ever have.
const MAX_LEN: usize = isize::MAX as usize;

/// Make sure `additional` bytes can be written at `cursor`.
///
/// When the buffer is too short it grows to twice the required length, so a
/// run of small writes costs amortized O(1). The buffer never shrinks here.
pub fn ensure_capacity(buffer: &mut Vec<u8>, cursor: usize, additional: usize) -> Result<()> {
    let required = match cursor.checked_add(additional) {
        Some(required) if required <= MAX_LEN => required,
        _ => {
            return Err(Error::new(ErrorKind::Allocation {
                requested: cursor.saturating_add(additional),
            }));
        }
    };
    if required <= buffer.len() {
        return Ok(());
    }

    let new_len = required.saturating_mul(2).clamp(MIN_LEN, MAX_LEN);
    trace!(from = buffer.len(), to = new_len, "growing output buffer");
    buffer
        .try_reserve_exact(new_len - buffer.len())
        .map_err(|_| Error::new(ErrorKind::Allocation { requested: new_len }))?;
    buffer.resize(new_len, 0);
    Ok(())
}

/// Write one byte at the cursor.
#[inline]
pub fn write_u8(buffer: &mut Vec<u8>, cursor: &mut usize, byte: u8) -> Result<()> {
    ensure_capacity(buffer, *cursor, 1)?;
    buffer[*cursor] = byte;
    *cursor += 1;
    Ok(())
}

/// Write raw bytes at the cursor.
#[inline]
pub fn write_raw(buffer: &mut Vec<u8>, cursor: &mut usize, bytes: &[u8]) -> Result<()> {
    ensure_capacity(buffer, *cursor, bytes.len())?;
    buffer[*cursor..*cursor + bytes.len()].copy_from_slice(bytes);
    *cursor += bytes.len();
    Ok(())
}

/// Write a header byte followed by a fixed-width payload.
#[inline]
pub fn write_tagged<const N: usize>(
    buffer: &mut Vec<u8>,
    cursor: &mut usize,
    tag: u8,
    payload: [u8; N],
) -> Result<()> {
    ensure_capacity(buffer, *cursor, N + 1)?;
    buffer[*cursor] = tag;
    buffer[*cursor + 1..*cursor + 1 + N].copy_from_slice(&payload);
    *cursor += N + 1;
    Ok(())
}

/// Trim the buffer to the bytes actually written and hand it back.
pub fn finish(mut buffer: Vec<u8>, cursor: usize) -> Vec<u8> {
    buffer.truncate(cursor);
    buffer
}

/// The byte at the cursor, without consuming it.
#[inline]
pub fn peek(bytes: &[u8], cursor: usize) -> Result<u8> {
    bytes.get(cursor).copied().ok_or(Error::eof(1, cursor))
}

/// Consume `len` bytes starting at the cursor.
#[inline]
pub fn take<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8]> {
    let start = *cursor;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= bytes.len())
        .ok_or(Error::eof(len - bytes.len().saturating_sub(start).min(len), start))?;
    *cursor = end;
    Ok(&bytes[start..end])
}

/// Consume exactly `N` bytes starting at the cursor.
#[inline]
pub fn take_array<const N: usize>(bytes: &[u8], cursor: &mut usize) -> Result<[u8; N]> {
    let slice = take(bytes, cursor, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}
