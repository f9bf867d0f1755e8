//! JSON token readers.
//!
//! Every reader skips leading whitespace itself. The class of the byte at
//! the cursor comes from a 256-entry table, so token detection is a single
//! lookup.

use std::borrow::Cow;

use lexical_parse_float::FromLexical as _;
use lexical_parse_integer::FromLexical as _;
use twinpack_core::{Error, ErrorKind, Result};

use crate::escape::unescape;

/// Structural class of a byte in JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Space, tab, line feed or carriage return
    Whitespace,
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// `:`
    NameSeparator,
    /// `,`
    ValueSeparator,
    /// `"`
    String,
    /// `-` or a digit
    Number,
    /// `t`
    True,
    /// `f`
    False,
    /// `n`
    Null,
    /// Anything else
    Invalid,
}

const fn token_table() -> [Token; 256] {
    let mut t = [Token::Invalid; 256];
    t[b' ' as usize] = Token::Whitespace;
    t[b'\t' as usize] = Token::Whitespace;
    t[b'\n' as usize] = Token::Whitespace;
    t[b'\r' as usize] = Token::Whitespace;
    t[b'{' as usize] = Token::BeginObject;
    t[b'}' as usize] = Token::EndObject;
    t[b'[' as usize] = Token::BeginArray;
    t[b']' as usize] = Token::EndArray;
    t[b':' as usize] = Token::NameSeparator;
    t[b',' as usize] = Token::ValueSeparator;
    t[b'"' as usize] = Token::String;
    t[b'-' as usize] = Token::Number;
    let mut d = b'0';
    while d <= b'9' {
        t[d as usize] = Token::Number;
        d += 1;
    }
    t[b't' as usize] = Token::True;
    t[b'f' as usize] = Token::False;
    t[b'n' as usize] = Token::Null;
    t
}

static TOKENS: [Token; 256] = token_table();

/// Class of `byte`.
#[inline]
pub fn classify(byte: u8) -> Token {
    TOKENS[byte as usize]
}

/// Advance past whitespace.
#[inline]
pub fn skip_whitespace(bytes: &[u8], cursor: &mut usize) {
    while let Some(&b) = bytes.get(*cursor) {
        if classify(b) != Token::Whitespace {
            break;
        }
        *cursor += 1;
    }
}

/// Class of the next non-whitespace byte, without consuming it.
pub fn current_token(bytes: &[u8], cursor: &mut usize) -> Result<Token> {
    skip_whitespace(bytes, cursor);
    bytes
        .get(*cursor)
        .map(|&b| classify(b))
        .ok_or_else(|| Error::eof(1, *cursor))
}

/// Error for whatever sits at `offset` when `expected` was wanted.
pub fn unexpected(bytes: &[u8], offset: usize, expected: &'static str) -> Error {
    match bytes.get(offset) {
        Some(&got) => Error::at(ErrorKind::UnexpectedToken { got, expected }, offset),
        None => Error::eof(1, offset),
    }
}

#[inline]
fn read_is(bytes: &[u8], cursor: &mut usize, byte: u8) -> bool {
    skip_whitespace(bytes, cursor);
    if bytes.get(*cursor) == Some(&byte) {
        *cursor += 1;
        true
    } else {
        false
    }
}

#[inline]
fn expect(bytes: &[u8], cursor: &mut usize, byte: u8, expected: &'static str) -> Result<()> {
    if read_is(bytes, cursor, byte) {
        Ok(())
    } else {
        Err(unexpected(bytes, *cursor, expected))
    }
}

macro_rules! token_readers {
    ($($is:ident / $read:ident => $byte:literal;)*) => {$(
        #[doc = concat!("Consume `", $byte, "` if it is next.")]
        #[inline]
        pub fn $is(bytes: &[u8], cursor: &mut usize) -> bool {
            read_is(bytes, cursor, $byte as u8)
        }

        #[doc = concat!("Consume `", $byte, "` or fail.")]
        #[inline]
        pub fn $read(bytes: &[u8], cursor: &mut usize) -> Result<()> {
            expect(bytes, cursor, $byte as u8, concat!("'", $byte, "'"))
        }
    )*};
}

token_readers! {
    read_is_begin_object / read_begin_object => '{';
    read_is_end_object / read_end_object => '}';
    read_is_begin_array / read_begin_array => '[';
    read_is_end_array / read_end_array => ']';
    read_is_value_separator / read_value_separator => ',';
    read_is_name_separator / read_name_separator => ':';
}

fn read_literal(bytes: &[u8], cursor: &mut usize, literal: &'static [u8], expected: &'static str) -> Result<()> {
    let end = *cursor + literal.len();
    match bytes.get(*cursor..end) {
        Some(found) if found == literal => {
            *cursor = end;
            Ok(())
        }
        Some(_) => Err(unexpected(bytes, *cursor, expected)),
        None => Err(Error::eof(end - bytes.len(), *cursor)),
    }
}

/// Consume `null` if it is next.
pub fn read_is_null(bytes: &[u8], cursor: &mut usize) -> bool {
    skip_whitespace(bytes, cursor);
    if bytes.get(*cursor..).is_some_and(|rest| rest.starts_with(b"null")) {
        *cursor += 4;
        true
    } else {
        false
    }
}

/// Consume `null` or fail.
pub fn read_null(bytes: &[u8], cursor: &mut usize) -> Result<()> {
    skip_whitespace(bytes, cursor);
    read_literal(bytes, cursor, b"null", "null")
}

/// `true` or `false`.
pub fn read_bool(bytes: &[u8], cursor: &mut usize) -> Result<bool> {
    match current_token(bytes, cursor)? {
        Token::True => read_literal(bytes, cursor, b"true", "a boolean").map(|()| true),
        Token::False => read_literal(bytes, cursor, b"false", "a boolean").map(|()| false),
        _ => Err(unexpected(bytes, *cursor, "a boolean")),
    }
}

fn digits(bytes: &[u8], cursor: &mut usize) -> usize {
    let start = *cursor;
    while bytes.get(*cursor).is_some_and(u8::is_ascii_digit) {
        *cursor += 1;
    }
    *cursor - start
}

/// The exact bytes of a number literal, checked against the JSON grammar.
pub fn read_number_span<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    skip_whitespace(bytes, cursor);
    let start = *cursor;
    let mut at = start;
    if bytes.get(at) == Some(&b'-') {
        at += 1;
    }
    match bytes.get(at) {
        Some(b'0') => at += 1,
        Some(b'1'..=b'9') => {
            digits(bytes, &mut at);
        }
        _ => return Err(unexpected(bytes, at, "a number")),
    }
    if bytes.get(at) == Some(&b'.') {
        at += 1;
        if digits(bytes, &mut at) == 0 {
            return Err(unexpected(bytes, at, "a digit"));
        }
    }
    if matches!(bytes.get(at), Some(b'e' | b'E')) {
        at += 1;
        if matches!(bytes.get(at), Some(b'+' | b'-')) {
            at += 1;
        }
        if digits(bytes, &mut at) == 0 {
            return Err(unexpected(bytes, at, "a digit"));
        }
    }
    *cursor = at;
    Ok(&bytes[start..at])
}

fn is_integer_literal(span: &[u8]) -> bool {
    span.iter().all(|&b| b == b'-' || b.is_ascii_digit())
}

fn integer_error(span: &[u8], target: &'static str, offset: usize) -> Error {
    // A well-formed integer literal can only fail by not fitting.
    let kind = if is_integer_literal(span) {
        ErrorKind::NumberOutOfRange { target }
    } else {
        ErrorKind::InvalidNumber { target }
    };
    Error::at(kind, offset)
}

macro_rules! integer_readers {
    ($($(#[$meta:meta])* $name:ident -> $t:ty;)*) => {$(
        $(#[$meta])*
        pub fn $name(bytes: &[u8], cursor: &mut usize) -> Result<$t> {
            skip_whitespace(bytes, cursor);
            let start = *cursor;
            let span = read_number_span(bytes, cursor)?;
            let wide = i128::from_lexical(span)
                .map_err(|_| integer_error(span, stringify!($t), start))?;
            <$t>::try_from(wide)
                .map_err(|_| Error::at(ErrorKind::NumberOutOfRange { target: stringify!($t) }, start))
        }
    )*};
}

integer_readers! {
    /// An integer literal that fits `u8`.
    read_u8 -> u8;
    /// An integer literal that fits `u16`.
    read_u16 -> u16;
    /// An integer literal that fits `u32`.
    read_u32 -> u32;
    /// An integer literal that fits `u64`.
    read_u64 -> u64;
    /// An integer literal that fits `usize`.
    read_usize -> usize;
    /// An integer literal that fits `i8`.
    read_i8 -> i8;
    /// An integer literal that fits `i16`.
    read_i16 -> i16;
    /// An integer literal that fits `i32`.
    read_i32 -> i32;
    /// An integer literal that fits `i64`.
    read_i64 -> i64;
    /// An integer literal that fits `isize`.
    read_isize -> isize;
    /// An integer literal that fits `i128`.
    read_i128 -> i128;
}

/// An integer literal that fits `u128`.
pub fn read_u128(bytes: &[u8], cursor: &mut usize) -> Result<u128> {
    skip_whitespace(bytes, cursor);
    let start = *cursor;
    let span = read_number_span(bytes, cursor)?;
    if span.first() == Some(&b'-') {
        return Err(Error::at(ErrorKind::NumberOutOfRange { target: "u128" }, start));
    }
    u128::from_lexical(span).map_err(|_| integer_error(span, "u128", start))
}

/// Any number literal as `f64`.
pub fn read_f64(bytes: &[u8], cursor: &mut usize) -> Result<f64> {
    skip_whitespace(bytes, cursor);
    let start = *cursor;
    let span = read_number_span(bytes, cursor)?;
    f64::from_lexical(span).map_err(|_| Error::at(ErrorKind::InvalidNumber { target: "f64" }, start))
}

/// Any number literal as `f32`.
pub fn read_f32(bytes: &[u8], cursor: &mut usize) -> Result<f32> {
    skip_whitespace(bytes, cursor);
    let start = *cursor;
    let span = read_number_span(bytes, cursor)?;
    f32::from_lexical(span).map_err(|_| Error::at(ErrorKind::InvalidNumber { target: "f32" }, start))
}

/// Raw body of a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringSpan<'a> {
    /// Bytes between the quotes, escapes untouched
    pub raw: &'a [u8],
    /// Offset of `raw` in the input
    pub offset: usize,
    /// Whether `raw` contains at least one backslash
    pub escaped: bool,
}

impl<'a> StringSpan<'a> {
    /// Decode escapes and check UTF-8, borrowing when there is nothing to
    /// decode.
    pub fn decode(&self) -> Result<Cow<'a, str>> {
        if self.escaped {
            unescape(self.raw, self.offset).map(Cow::Owned)
        } else {
            str::from_utf8(self.raw)
                .map(Cow::Borrowed)
                .map_err(|_| Error::at(ErrorKind::InvalidUtf8, self.offset))
        }
    }
}

/// Scan a string literal without decoding it.
pub fn read_string_span<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<StringSpan<'a>> {
    expect(bytes, cursor, b'"', "a string")?;
    let start = *cursor;
    let mut at = start;
    let mut escaped = false;
    loop {
        let Some(&b) = bytes.get(at) else {
            return Err(Error::eof(1, at));
        };
        match b {
            b'"' => break,
            b'\\' => {
                escaped = true;
                at += 2;
            }
            0x00..=0x1f => return Err(unexpected(bytes, at, "a string character")),
            _ => at += 1,
        }
    }
    *cursor = at + 1;
    Ok(StringSpan {
        raw: &bytes[start..at],
        offset: start,
        escaped,
    })
}

/// A string literal, borrowed from the input unless it contains escapes.
pub fn read_str<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<Cow<'a, str>> {
    read_string_span(bytes, cursor)?.decode()
}

/// Where a skip stands inside one open array or object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Right after `[`: a value or `]`.
    ArrayFirst,
    /// After `,` in an array.
    ArrayValue,
    /// After an element: `,` or `]`.
    ArrayNext,
    /// Right after `{`: a name or `}`.
    ObjectFirst,
    /// After `,` in an object.
    ObjectName,
    /// After a name.
    ObjectColon,
    /// After `:`.
    ObjectValue,
    /// After a member: `,` or `}`.
    ObjectNext,
}

fn replace_top(open: &mut [Expect], next: Expect) {
    if let Some(top) = open.last_mut() {
        *top = next;
    }
}

/// Skip one complete value of any kind, nested arrays and objects included.
///
/// The skipped text must be well formed: separators, member names and
/// closing brackets are all checked. Open containers are tracked on a heap
/// stack rather than the call stack, so nesting depth is bounded only by
/// memory. Separators between sibling values at the top level are left to the
/// caller.
pub fn read_next_block(bytes: &[u8], cursor: &mut usize) -> Result<()> {
    let mut open: Vec<Expect> = Vec::new();
    loop {
        let token = current_token(bytes, cursor)?;
        let at = *cursor;
        match (open.last().copied(), token) {
            (Some(Expect::ArrayFirst | Expect::ArrayNext), Token::EndArray)
            | (Some(Expect::ObjectFirst | Expect::ObjectNext), Token::EndObject) => {
                *cursor += 1;
                open.pop();
            }
            (Some(Expect::ArrayNext), Token::ValueSeparator) => {
                *cursor += 1;
                replace_top(&mut open, Expect::ArrayValue);
                continue;
            }
            (Some(Expect::ArrayNext), _) => return Err(unexpected(bytes, at, "',' or ']'")),
            (Some(Expect::ObjectNext), Token::ValueSeparator) => {
                *cursor += 1;
                replace_top(&mut open, Expect::ObjectName);
                continue;
            }
            (Some(Expect::ObjectNext), _) => return Err(unexpected(bytes, at, "',' or '}'")),
            (Some(Expect::ObjectFirst | Expect::ObjectName), Token::String) => {
                read_string_span(bytes, cursor)?;
                replace_top(&mut open, Expect::ObjectColon);
                continue;
            }
            (Some(Expect::ObjectFirst | Expect::ObjectName), _) => {
                return Err(unexpected(bytes, at, "a property name"));
            }
            (Some(Expect::ObjectColon), Token::NameSeparator) => {
                *cursor += 1;
                replace_top(&mut open, Expect::ObjectValue);
                continue;
            }
            (Some(Expect::ObjectColon), _) => return Err(unexpected(bytes, at, "':'")),
            (_, Token::BeginArray) => {
                *cursor += 1;
                open.push(Expect::ArrayFirst);
                continue;
            }
            (_, Token::BeginObject) => {
                *cursor += 1;
                open.push(Expect::ObjectFirst);
                continue;
            }
            (_, Token::String) => {
                read_string_span(bytes, cursor)?;
            }
            (_, Token::Number) => {
                read_number_span(bytes, cursor)?;
            }
            (_, Token::True) => read_literal(bytes, cursor, b"true", "true")?,
            (_, Token::False) => read_literal(bytes, cursor, b"false", "false")?,
            (_, Token::Null) => read_literal(bytes, cursor, b"null", "null")?,
            _ => return Err(unexpected(bytes, at, "a value")),
        }
        // a complete value was consumed
        match open.last().copied() {
            None => return Ok(()),
            Some(Expect::ObjectValue) => replace_top(&mut open, Expect::ObjectNext),
            Some(_) => replace_top(&mut open, Expect::ArrayNext),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinpack_testhelpers::test;

    #[test]
    fn structural_tokens() {
        let bytes = b" { \"a\" : [ ] , } ";
        let mut cursor = 0;
        assert!(read_is_begin_object(bytes, &mut cursor));
        assert_eq!(read_str(bytes, &mut cursor).unwrap(), "a");
        assert!(!read_is_value_separator(bytes, &mut cursor));
        assert!(read_is_name_separator(bytes, &mut cursor));
        assert!(read_is_begin_array(bytes, &mut cursor));
        assert!(read_is_end_array(bytes, &mut cursor));
        assert!(read_is_value_separator(bytes, &mut cursor));
        assert!(read_is_end_object(bytes, &mut cursor));
        assert_eq!(current_token(bytes, &mut cursor).unwrap_err().kind, ErrorKind::UnexpectedEof { needed: 1 });
    }

    #[test]
    fn number_spans_follow_the_grammar() {
        let span = |s: &str| read_number_span(s.as_bytes(), &mut 0).map(|s| s.to_vec());
        assert_eq!(span("-12.5e+3,").unwrap(), b"-12.5e+3");
        assert_eq!(span("0]").unwrap(), b"0");
        assert_eq!(span("01").unwrap(), b"0");
        assert!(span("-").is_err());
        assert!(span("1.").is_err());
        assert!(span("1e").is_err());
        assert!(span(".5").is_err());
    }

    #[test]
    fn integers_check_their_range() {
        assert_eq!(read_i8(b"-128", &mut 0).unwrap(), -128);
        assert_eq!(read_u64(b"18446744073709551615", &mut 0).unwrap(), u64::MAX);
        let err = read_u8(b"256", &mut 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NumberOutOfRange { target: "u8" });
        let err = read_u32(b"-1", &mut 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NumberOutOfRange { target: "u32" });
        let err = read_i32(b"1.5", &mut 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidNumber { target: "i32" });
        assert_eq!(read_u128(b"340282366920938463463374607431768211455", &mut 0).unwrap(), u128::MAX);
    }

    #[test]
    fn floats() {
        assert_eq!(read_f64(b" 2.5 ", &mut 0).unwrap(), 2.5);
        assert_eq!(read_f64(b"-1e-2", &mut 0).unwrap(), -0.01);
        assert_eq!(read_f32(b"7", &mut 0).unwrap(), 7.0);
    }

    #[test]
    fn strings_borrow_unless_escaped() {
        let mut cursor = 0;
        let s = read_str(br#""plain" "#, &mut cursor).unwrap();
        assert!(matches!(s, Cow::Borrowed("plain")));
        assert_eq!(cursor, 7);
        let s = read_str(br#""a\"b""#, &mut 0).unwrap();
        assert!(matches!(s, Cow::Owned(ref o) if o == "a\"b"));
        assert!(read_str(b"\"raw\ncontrol\"", &mut 0).is_err());
        assert!(matches!(
            read_str(b"\"open", &mut 0).unwrap_err().kind,
            ErrorKind::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn literals() {
        assert!(read_bool(b"true", &mut 0).unwrap());
        assert!(!read_bool(b" false", &mut 0).unwrap());
        assert!(read_bool(b"tru", &mut 0).is_err());
        let mut cursor = 0;
        assert!(read_is_null(b" null", &mut cursor));
        assert_eq!(cursor, 5);
        assert!(!read_is_null(b"nul", &mut 0));
        read_null(b"null", &mut 0).unwrap();
    }

    #[test]
    fn skip_then_read_the_second_element() {
        let bytes = br#"[{"x":[1,{"y":"}"}],"z":null}, 42]"#;
        let mut cursor = 0;
        read_begin_array(bytes, &mut cursor).unwrap();
        read_next_block(bytes, &mut cursor).unwrap();
        read_value_separator(bytes, &mut cursor).unwrap();
        assert_eq!(read_i32(bytes, &mut cursor).unwrap(), 42);
        read_end_array(bytes, &mut cursor).unwrap();
        assert_eq!(cursor, bytes.len());
    }

    #[test]
    fn skip_rejects_mismatched_brackets() {
        assert!(read_next_block(b"[1}", &mut 0).is_err());
        assert!(read_next_block(b"[1,", &mut 0).is_err());
        assert!(read_next_block(b",", &mut 0).is_err());
    }

    #[test]
    fn skip_checks_separators_and_names() {
        for malformed in [&b"[1 2]"[..], b"[1,]", b"[,1]", br#"{"a" 1}"#, br#"{"a":1 "b":2}"#, b"{1:2}", br#"{"a":}"#, br#"{"a":1,}"#] {
            let err = read_next_block(malformed, &mut 0).unwrap_err();
            assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }), "{err:?}");
        }
        let bytes = br#"{ "a" : [ 1 , { } , [ ] ] , "b" : { "c" : null } } tail"#;
        let mut cursor = 0;
        read_next_block(bytes, &mut cursor).unwrap();
        assert_eq!(&bytes[cursor..], b" tail");
    }

    #[test]
    fn skip_deep_nesting_uses_no_recursion() {
        let mut bytes = vec![b'['; 100_000];
        bytes.extend(vec![b']'; 100_000]);
        let mut cursor = 0;
        read_next_block(&bytes, &mut cursor).unwrap();
        assert_eq!(cursor, bytes.len());
    }
}
