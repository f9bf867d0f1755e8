//! Per-leading-byte decode tables.
//!
//! Each decode operation owns a `static` array of 256 decoder functions
//! indexed by the first byte of the value. The arrays are filled at compile
//! time by walking the MessagePack code ranges; bytes that mean nothing for
//! an operation get that operation's sentinel, which fails with the byte and
//! its format name. A decoder is entered with the cursor on the leading byte
//! and leaves it just past the value it consumed.
//!
//! Decoders never back up: on failure the cursor position is unspecified and
//! the caller abandons the whole decode.

use twinpack_core::buffer::{peek, take, take_array};
use twinpack_core::{Error, ErrorKind, Extension, ExtensionHeader, Result, Timestamp};

use crate::codes::*;

/// Decodes one value whose leading byte is at the cursor.
pub(crate) type Decoder<T> = fn(&[u8], &mut usize) -> Result<T>;

/// Decodes a borrowed str whose leading byte is at the cursor.
pub(crate) type StrDecoder = for<'a> fn(&'a [u8], &mut usize) -> Result<&'a str>;

/// Decodes a borrowed byte span whose leading byte is at the cursor.
pub(crate) type SpanDecoder = for<'a> fn(&'a [u8], &mut usize) -> Result<&'a [u8]>;

/// The error for a leading byte with no decoder in some table.
#[cold]
pub(crate) fn invalid_code(bytes: &[u8], offset: usize, expected: &'static str) -> Error {
    match bytes.get(offset) {
        Some(&code) => {
            trace!(
                code,
                offset,
                expected,
                format = format_name(code),
                "no decoder for leading byte"
            );
            Error::invalid_code(code, format_name(code), expected, offset)
        }
        None => Error::eof(1, offset),
    }
}

/// Read the `N` bytes that follow the leading byte.
#[inline]
fn payload<const N: usize>(bytes: &[u8], cursor: &mut usize) -> Result<[u8; N]> {
    let mut at = *cursor + 1;
    let out = take_array::<N>(bytes, &mut at)?;
    *cursor = at;
    Ok(out)
}

/// Read a big-endian length of `N` bytes after the leading byte, then that
/// many bytes of data.
#[inline]
fn sized<'a, const N: usize>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    let mut at = *cursor + 1;
    let raw = take_array::<N>(bytes, &mut at)?;
    let mut len = 0usize;
    for b in raw {
        len = (len << 8) | b as usize;
    }
    let data = take(bytes, &mut at, len)?;
    *cursor = at;
    Ok(data)
}

/// Fill `table[from..=to]` with `decoder`.
macro_rules! fill {
    ($table:ident, $from:expr, $to:expr, $decoder:expr) => {{
        let mut i = $from as usize;
        while i <= $to as usize {
            $table[i] = $decoder;
            i += 1;
        }
    }};
    ($table:ident, $code:expr, $decoder:expr) => {
        $table[$code as usize] = $decoder
    };
}

// --- integers ---------------------------------------------------------------

/// Integer types the integer tables decode into.
pub(crate) trait WireInt: TryFrom<u64> + TryFrom<i64> + Copy + 'static {
    const NAME: &'static str;
}

macro_rules! wire_int {
    ($($t:ty),*) => {$(
        impl WireInt for $t {
            const NAME: &'static str = stringify!($t);
        }
    )*};
}

wire_int!(u8, u16, u32, u64, i8, i16, i32, i64);

#[inline]
fn from_unsigned<T: WireInt>(n: u64, offset: usize) -> Result<T> {
    T::try_from(n).map_err(|_| Error::at(ErrorKind::NumberOutOfRange { target: T::NAME }, offset))
}

#[inline]
fn from_signed<T: WireInt>(n: i64, offset: usize) -> Result<T> {
    T::try_from(n).map_err(|_| Error::at(ErrorKind::NumberOutOfRange { target: T::NAME }, offset))
}

fn positive_fixint<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    *cursor += 1;
    from_unsigned(bytes[start] as u64, start)
}

fn negative_fixint<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    *cursor += 1;
    from_signed(bytes[start] as i8 as i64, start)
}

fn uint8<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    let [n] = payload::<1>(bytes, cursor)?;
    from_unsigned(n as u64, start)
}

fn uint16<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    from_unsigned(u16::from_be_bytes(payload(bytes, cursor)?) as u64, start)
}

fn uint32<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    from_unsigned(u32::from_be_bytes(payload(bytes, cursor)?) as u64, start)
}

fn uint64<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    from_unsigned(u64::from_be_bytes(payload(bytes, cursor)?), start)
}

fn int8<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    from_signed(i8::from_be_bytes(payload(bytes, cursor)?) as i64, start)
}

fn int16<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    from_signed(i16::from_be_bytes(payload(bytes, cursor)?) as i64, start)
}

fn int32<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    from_signed(i32::from_be_bytes(payload(bytes, cursor)?) as i64, start)
}

fn int64<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let start = *cursor;
    from_signed(i64::from_be_bytes(payload(bytes, cursor)?), start)
}

fn invalid_int<T: WireInt>(bytes: &[u8], cursor: &mut usize) -> Result<T> {
    Err(invalid_code(bytes, *cursor, T::NAME))
}

const fn int_table<T: WireInt>() -> [Decoder<T>; 256] {
    let mut t = [invalid_int::<T> as Decoder<T>; 256];
    fill!(t, 0x00, POSITIVE_FIXINT_MAX, positive_fixint::<T>);
    fill!(t, NEGATIVE_FIXINT_MIN, 0xff, negative_fixint::<T>);
    fill!(t, UINT8, uint8::<T>);
    fill!(t, UINT16, uint16::<T>);
    fill!(t, UINT32, uint32::<T>);
    fill!(t, UINT64, uint64::<T>);
    fill!(t, INT8, int8::<T>);
    fill!(t, INT16, int16::<T>);
    fill!(t, INT32, int32::<T>);
    fill!(t, INT64, int64::<T>);
    t
}

pub(crate) static U8: [Decoder<u8>; 256] = int_table::<u8>();
pub(crate) static U16: [Decoder<u16>; 256] = int_table::<u16>();
pub(crate) static U32: [Decoder<u32>; 256] = int_table::<u32>();
pub(crate) static U64: [Decoder<u64>; 256] = int_table::<u64>();
pub(crate) static I8: [Decoder<i8>; 256] = int_table::<i8>();
pub(crate) static I16: [Decoder<i16>; 256] = int_table::<i16>();
pub(crate) static I32: [Decoder<i32>; 256] = int_table::<i32>();
pub(crate) static I64: [Decoder<i64>; 256] = int_table::<i64>();

// --- nil / bool ---------------------------------------------------------------

fn bool_false(_: &[u8], cursor: &mut usize) -> Result<bool> {
    *cursor += 1;
    Ok(false)
}

fn bool_true(_: &[u8], cursor: &mut usize) -> Result<bool> {
    *cursor += 1;
    Ok(true)
}

fn invalid_bool(bytes: &[u8], cursor: &mut usize) -> Result<bool> {
    Err(invalid_code(bytes, *cursor, "bool"))
}

const fn bool_table() -> [Decoder<bool>; 256] {
    let mut t = [invalid_bool as Decoder<bool>; 256];
    fill!(t, FALSE, bool_false as Decoder<bool>);
    fill!(t, TRUE, bool_true as Decoder<bool>);
    t
}

pub(crate) static BOOL: [Decoder<bool>; 256] = bool_table();

// --- floats -------------------------------------------------------------------

fn float32(bytes: &[u8], cursor: &mut usize) -> Result<f64> {
    Ok(f32::from_be_bytes(payload(bytes, cursor)?) as f64)
}

fn float64(bytes: &[u8], cursor: &mut usize) -> Result<f64> {
    Ok(f64::from_be_bytes(payload(bytes, cursor)?))
}

fn unsigned_as_float(bytes: &[u8], cursor: &mut usize) -> Result<f64> {
    let code = bytes[*cursor];
    U64[code as usize](bytes, cursor).map(|n| n as f64)
}

fn signed_as_float(bytes: &[u8], cursor: &mut usize) -> Result<f64> {
    let code = bytes[*cursor];
    I64[code as usize](bytes, cursor).map(|n| n as f64)
}

fn invalid_float(bytes: &[u8], cursor: &mut usize) -> Result<f64> {
    Err(invalid_code(bytes, *cursor, "float"))
}

/// Floats and every integer encoding, widened to `f64`.
const fn float_table() -> [Decoder<f64>; 256] {
    let mut t = [invalid_float as Decoder<f64>; 256];
    fill!(t, 0x00, POSITIVE_FIXINT_MAX, unsigned_as_float as Decoder<f64>);
    fill!(t, UINT8, UINT64, unsigned_as_float as Decoder<f64>);
    fill!(t, NEGATIVE_FIXINT_MIN, 0xff, signed_as_float as Decoder<f64>);
    fill!(t, INT8, INT64, signed_as_float as Decoder<f64>);
    fill!(t, FLOAT32, float32 as Decoder<f64>);
    fill!(t, FLOAT64, float64 as Decoder<f64>);
    t
}

pub(crate) static FLOAT: [Decoder<f64>; 256] = float_table();

fn float32_exact(bytes: &[u8], cursor: &mut usize) -> Result<f32> {
    Ok(f32::from_be_bytes(payload(bytes, cursor)?))
}

fn narrowed_to_f32(bytes: &[u8], cursor: &mut usize) -> Result<f32> {
    let code = bytes[*cursor];
    FLOAT[code as usize](bytes, cursor).map(|n| n as f32)
}

fn invalid_f32(bytes: &[u8], cursor: &mut usize) -> Result<f32> {
    Err(invalid_code(bytes, *cursor, "f32"))
}

/// float 32 read without a round trip through `f64`, so NaN payloads survive.
const fn f32_table() -> [Decoder<f32>; 256] {
    let mut t = [invalid_f32 as Decoder<f32>; 256];
    fill!(t, 0x00, POSITIVE_FIXINT_MAX, narrowed_to_f32 as Decoder<f32>);
    fill!(t, UINT8, UINT64, narrowed_to_f32 as Decoder<f32>);
    fill!(t, NEGATIVE_FIXINT_MIN, 0xff, narrowed_to_f32 as Decoder<f32>);
    fill!(t, INT8, INT64, narrowed_to_f32 as Decoder<f32>);
    fill!(t, FLOAT64, narrowed_to_f32 as Decoder<f32>);
    fill!(t, FLOAT32, float32_exact as Decoder<f32>);
    t
}

pub(crate) static F32: [Decoder<f32>; 256] = f32_table();

// --- container headers ----------------------------------------------------------

fn fix_low_nibble(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    let n = (bytes[*cursor] & 0x0f) as usize;
    *cursor += 1;
    Ok(n)
}

fn count16(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    Ok(u16::from_be_bytes(payload(bytes, cursor)?) as usize)
}

fn count32(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    Ok(u32::from_be_bytes(payload(bytes, cursor)?) as usize)
}

fn invalid_array(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    Err(invalid_code(bytes, *cursor, "array header"))
}

fn invalid_map(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    Err(invalid_code(bytes, *cursor, "map header"))
}

const fn array_table() -> [Decoder<usize>; 256] {
    let mut t = [invalid_array as Decoder<usize>; 256];
    fill!(t, FIXARRAY_MIN, FIXARRAY_MAX, fix_low_nibble as Decoder<usize>);
    fill!(t, ARRAY16, count16 as Decoder<usize>);
    fill!(t, ARRAY32, count32 as Decoder<usize>);
    t
}

const fn map_table() -> [Decoder<usize>; 256] {
    let mut t = [invalid_map as Decoder<usize>; 256];
    fill!(t, FIXMAP_MIN, FIXMAP_MAX, fix_low_nibble as Decoder<usize>);
    fill!(t, MAP16, count16 as Decoder<usize>);
    fill!(t, MAP32, count32 as Decoder<usize>);
    t
}

pub(crate) static ARRAY_HEADER: [Decoder<usize>; 256] = array_table();
pub(crate) static MAP_HEADER: [Decoder<usize>; 256] = map_table();

// --- str / bin ------------------------------------------------------------------

fn fixstr_span<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    let len = (bytes[*cursor] & 0x1f) as usize;
    let mut at = *cursor + 1;
    let data = take(bytes, &mut at, len)?;
    *cursor = at;
    Ok(data)
}

fn invalid_str_span<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    Err(invalid_code(bytes, *cursor, "str"))
}

fn invalid_bin_span<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    Err(invalid_code(bytes, *cursor, "bin"))
}

/// str payloads as raw bytes, not yet validated as UTF-8.
const fn str_span_table() -> [SpanDecoder; 256] {
    let mut t = [invalid_str_span as SpanDecoder; 256];
    fill!(t, FIXSTR_MIN, FIXSTR_MAX, fixstr_span as SpanDecoder);
    fill!(t, STR8, sized::<1> as SpanDecoder);
    fill!(t, STR16, sized::<2> as SpanDecoder);
    fill!(t, STR32, sized::<4> as SpanDecoder);
    t
}

const fn bin_table() -> [SpanDecoder; 256] {
    let mut t = [invalid_bin_span as SpanDecoder; 256];
    fill!(t, BIN8, sized::<1> as SpanDecoder);
    fill!(t, BIN16, sized::<2> as SpanDecoder);
    fill!(t, BIN32, sized::<4> as SpanDecoder);
    t
}

pub(crate) static STR_SPAN: [SpanDecoder; 256] = str_span_table();
pub(crate) static BIN: [SpanDecoder; 256] = bin_table();

fn utf8<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a str> {
    let start = *cursor;
    let span = STR_SPAN[bytes[start] as usize](bytes, cursor)?;
    core::str::from_utf8(span).map_err(|_| Error::at(ErrorKind::InvalidUtf8, start))
}

fn invalid_str<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a str> {
    Err(invalid_code(bytes, *cursor, "str"))
}

const fn str_table() -> [StrDecoder; 256] {
    let mut t = [invalid_str as StrDecoder; 256];
    fill!(t, FIXSTR_MIN, FIXSTR_MAX, utf8 as StrDecoder);
    fill!(t, STR8, STR32, utf8 as StrDecoder);
    t
}

pub(crate) static STR: [StrDecoder; 256] = str_table();

// --- extensions -----------------------------------------------------------------

fn fixext<const N: u32>(bytes: &[u8], cursor: &mut usize) -> Result<ExtensionHeader> {
    let [type_code] = payload::<1>(bytes, cursor)?;
    Ok(ExtensionHeader {
        type_code: type_code as i8,
        length: N,
    })
}

fn ext8(bytes: &[u8], cursor: &mut usize) -> Result<ExtensionHeader> {
    let [len, type_code] = payload::<2>(bytes, cursor)?;
    Ok(ExtensionHeader {
        type_code: type_code as i8,
        length: len as u32,
    })
}

fn ext16(bytes: &[u8], cursor: &mut usize) -> Result<ExtensionHeader> {
    let [hi, lo, type_code] = payload::<3>(bytes, cursor)?;
    Ok(ExtensionHeader {
        type_code: type_code as i8,
        length: u16::from_be_bytes([hi, lo]) as u32,
    })
}

fn ext32(bytes: &[u8], cursor: &mut usize) -> Result<ExtensionHeader> {
    let [a, b, c, d, type_code] = payload::<5>(bytes, cursor)?;
    Ok(ExtensionHeader {
        type_code: type_code as i8,
        length: u32::from_be_bytes([a, b, c, d]),
    })
}

fn invalid_ext_header(bytes: &[u8], cursor: &mut usize) -> Result<ExtensionHeader> {
    Err(invalid_code(bytes, *cursor, "extension"))
}

const fn ext_header_table() -> [Decoder<ExtensionHeader>; 256] {
    let mut t = [invalid_ext_header as Decoder<ExtensionHeader>; 256];
    fill!(t, FIXEXT1, fixext::<1> as Decoder<ExtensionHeader>);
    fill!(t, FIXEXT2, fixext::<2> as Decoder<ExtensionHeader>);
    fill!(t, FIXEXT4, fixext::<4> as Decoder<ExtensionHeader>);
    fill!(t, FIXEXT8, fixext::<8> as Decoder<ExtensionHeader>);
    fill!(t, FIXEXT16, fixext::<16> as Decoder<ExtensionHeader>);
    fill!(t, EXT8, ext8 as Decoder<ExtensionHeader>);
    fill!(t, EXT16, ext16 as Decoder<ExtensionHeader>);
    fill!(t, EXT32, ext32 as Decoder<ExtensionHeader>);
    t
}

pub(crate) static EXT_HEADER: [Decoder<ExtensionHeader>; 256] = ext_header_table();

fn extension(bytes: &[u8], cursor: &mut usize) -> Result<Extension> {
    let header = EXT_HEADER[bytes[*cursor] as usize](bytes, cursor)?;
    let data = take(bytes, cursor, header.length as usize)?;
    Ok(Extension {
        type_code: header.type_code,
        data: data.to_vec(),
    })
}

fn invalid_extension(bytes: &[u8], cursor: &mut usize) -> Result<Extension> {
    Err(invalid_code(bytes, *cursor, "extension"))
}

const fn extension_table() -> [Decoder<Extension>; 256] {
    let mut t = [invalid_extension as Decoder<Extension>; 256];
    fill!(t, FIXEXT1, FIXEXT16, extension as Decoder<Extension>);
    fill!(t, EXT8, EXT32, extension as Decoder<Extension>);
    t
}

pub(crate) static EXTENSION: [Decoder<Extension>; 256] = extension_table();

// --- timestamps -------------------------------------------------------------------

fn timestamp_header(bytes: &[u8], cursor: &mut usize, expected_len: u32) -> Result<()> {
    let start = *cursor;
    let header = EXT_HEADER[bytes[start] as usize](bytes, cursor)?;
    if header.type_code != TIMESTAMP_TYPE || header.length != expected_len {
        return Err(Error::at(
            ErrorKind::InvalidExtension {
                type_code: header.type_code,
                length: header.length,
                expected: "timestamp",
            },
            start,
        ));
    }
    Ok(())
}

fn timestamp_out_of_range(offset: usize) -> Error {
    Error::at(
        ErrorKind::InvalidValue {
            message: "timestamp nanoseconds out of range".into(),
        },
        offset,
    )
}

fn timestamp32(bytes: &[u8], cursor: &mut usize) -> Result<Timestamp> {
    let start = *cursor;
    timestamp_header(bytes, cursor, 4)?;
    let seconds = u32::from_be_bytes(take_array(bytes, cursor)?);
    Timestamp::new(seconds as i64, 0).ok_or_else(|| timestamp_out_of_range(start))
}

fn timestamp64(bytes: &[u8], cursor: &mut usize) -> Result<Timestamp> {
    let start = *cursor;
    timestamp_header(bytes, cursor, 8)?;
    let packed = u64::from_be_bytes(take_array(bytes, cursor)?);
    let nanos = (packed >> 34) as u32;
    let seconds = (packed & 0x3_ffff_ffff) as i64;
    Timestamp::new(seconds, nanos).ok_or_else(|| timestamp_out_of_range(start))
}

fn timestamp96(bytes: &[u8], cursor: &mut usize) -> Result<Timestamp> {
    let start = *cursor;
    timestamp_header(bytes, cursor, 12)?;
    let nanos = u32::from_be_bytes(take_array(bytes, cursor)?);
    let seconds = i64::from_be_bytes(take_array(bytes, cursor)?);
    Timestamp::new(seconds, nanos).ok_or_else(|| timestamp_out_of_range(start))
}

fn invalid_timestamp(bytes: &[u8], cursor: &mut usize) -> Result<Timestamp> {
    Err(invalid_code(bytes, *cursor, "timestamp"))
}

const fn timestamp_table() -> [Decoder<Timestamp>; 256] {
    let mut t = [invalid_timestamp as Decoder<Timestamp>; 256];
    fill!(t, FIXEXT4, timestamp32 as Decoder<Timestamp>);
    fill!(t, FIXEXT8, timestamp64 as Decoder<Timestamp>);
    fill!(t, EXT8, timestamp96 as Decoder<Timestamp>);
    t
}

pub(crate) static TIMESTAMP: [Decoder<Timestamp>; 256] = timestamp_table();

// --- skip -----------------------------------------------------------------------------

/// Skip decoders consume one header (and any scalar payload) and return how
/// many nested values follow it, so skipping needs no recursion.
fn skip_fixed<const N: usize>(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    let mut at = *cursor + 1;
    take(bytes, &mut at, N)?;
    *cursor = at;
    Ok(0)
}

fn skip_fixstr(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    fixstr_span(bytes, cursor).map(|_| 0)
}

fn skip_sized<const N: usize>(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    sized::<N>(bytes, cursor).map(|_| 0)
}

fn skip_extension(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    extension_span(bytes, cursor).map(|_| 0)
}

fn extension_span<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    let header = EXT_HEADER[bytes[*cursor] as usize](bytes, cursor)?;
    take(bytes, cursor, header.length as usize)
}

fn skip_fixarray(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    fix_low_nibble(bytes, cursor)
}

fn skip_fixmap(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    fix_low_nibble(bytes, cursor).map(|n| n * 2)
}

fn skip_map16(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    count16(bytes, cursor).map(|n| n * 2)
}

fn skip_map32(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    let start = *cursor;
    count32(bytes, cursor)?
        .checked_mul(2)
        .ok_or_else(|| Error::at(ErrorKind::NumberOutOfRange { target: "map length" }, start))
}

fn invalid_skip(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    Err(invalid_code(bytes, *cursor, "any value"))
}

const fn skip_table() -> [Decoder<usize>; 256] {
    let mut t = [invalid_skip as Decoder<usize>; 256];
    fill!(t, 0x00, POSITIVE_FIXINT_MAX, skip_fixed::<0> as Decoder<usize>);
    fill!(t, NEGATIVE_FIXINT_MIN, 0xff, skip_fixed::<0> as Decoder<usize>);
    fill!(t, NIL, skip_fixed::<0> as Decoder<usize>);
    fill!(t, FALSE, skip_fixed::<0> as Decoder<usize>);
    fill!(t, TRUE, skip_fixed::<0> as Decoder<usize>);
    fill!(t, UINT8, skip_fixed::<1> as Decoder<usize>);
    fill!(t, INT8, skip_fixed::<1> as Decoder<usize>);
    fill!(t, UINT16, skip_fixed::<2> as Decoder<usize>);
    fill!(t, INT16, skip_fixed::<2> as Decoder<usize>);
    fill!(t, UINT32, skip_fixed::<4> as Decoder<usize>);
    fill!(t, INT32, skip_fixed::<4> as Decoder<usize>);
    fill!(t, FLOAT32, skip_fixed::<4> as Decoder<usize>);
    fill!(t, UINT64, skip_fixed::<8> as Decoder<usize>);
    fill!(t, INT64, skip_fixed::<8> as Decoder<usize>);
    fill!(t, FLOAT64, skip_fixed::<8> as Decoder<usize>);
    fill!(t, FIXSTR_MIN, FIXSTR_MAX, skip_fixstr as Decoder<usize>);
    fill!(t, STR8, skip_sized::<1> as Decoder<usize>);
    fill!(t, BIN8, skip_sized::<1> as Decoder<usize>);
    fill!(t, STR16, skip_sized::<2> as Decoder<usize>);
    fill!(t, BIN16, skip_sized::<2> as Decoder<usize>);
    fill!(t, STR32, skip_sized::<4> as Decoder<usize>);
    fill!(t, BIN32, skip_sized::<4> as Decoder<usize>);
    fill!(t, FIXEXT1, FIXEXT16, skip_extension as Decoder<usize>);
    fill!(t, EXT8, EXT32, skip_extension as Decoder<usize>);
    fill!(t, FIXARRAY_MIN, FIXARRAY_MAX, skip_fixarray as Decoder<usize>);
    fill!(t, ARRAY16, count16 as Decoder<usize>);
    fill!(t, ARRAY32, count32 as Decoder<usize>);
    fill!(t, FIXMAP_MIN, FIXMAP_MAX, skip_fixmap as Decoder<usize>);
    fill!(t, MAP16, skip_map16 as Decoder<usize>);
    fill!(t, MAP32, skip_map32 as Decoder<usize>);
    t
}

pub(crate) static SKIP: [Decoder<usize>; 256] = skip_table();

/// Run the decoder `table` selects for the byte at the cursor.
#[inline]
pub(crate) fn dispatch<T>(table: &[Decoder<T>; 256], bytes: &[u8], cursor: &mut usize) -> Result<T> {
    let code = peek(bytes, *cursor)?;
    table[code as usize](bytes, cursor)
}
