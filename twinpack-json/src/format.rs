use twinpack_core::{Error, FieldMatch, Fields, Format, Formatter, Resolver, Result, SeqState};

use crate::{read, write};

/// The JSON text format.
///
/// Records are objects keyed by member name. Dictionary keys must have a
/// formatter that supports property names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Json;

/// Shared element loop for arrays, objects and records.
fn read_next(bytes: &[u8], cursor: &mut usize, state: &mut SeqState, close: u8) -> Result<Option<usize>> {
    read::skip_whitespace(bytes, cursor);
    if bytes.get(*cursor) == Some(&close) {
        *cursor += 1;
        return Ok(None);
    }
    if !state.is_first() {
        read::read_value_separator(bytes, cursor)?;
    }
    Ok(Some(state.next_index()))
}

impl Format for Json {
    const NAME: &'static str = "json";

    fn write_nil(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
        write::write_null(buffer, cursor)
    }

    fn try_read_nil(bytes: &[u8], cursor: &mut usize) -> Result<bool> {
        Ok(read::read_is_null(bytes, cursor))
    }

    fn write_array_start(buffer: &mut Vec<u8>, cursor: &mut usize, _len: usize) -> Result<()> {
        write::write_begin_array(buffer, cursor)
    }

    fn write_array_separator(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
        write::write_value_separator(buffer, cursor)
    }

    fn write_array_end(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
        write::write_end_array(buffer, cursor)
    }

    fn read_array_start(bytes: &[u8], cursor: &mut usize) -> Result<SeqState> {
        read::read_begin_array(bytes, cursor).map(|()| SeqState::delimited())
    }

    fn read_array_next(bytes: &[u8], cursor: &mut usize, state: &mut SeqState) -> Result<Option<usize>> {
        read_next(bytes, cursor, state, b']')
    }

    fn write_map_start(buffer: &mut Vec<u8>, cursor: &mut usize, _len: usize) -> Result<()> {
        write::write_begin_object(buffer, cursor)
    }

    fn write_map_separator(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
        write::write_value_separator(buffer, cursor)
    }

    fn write_map_key<K>(
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        key: &K,
        formatter: &dyn Formatter<Self, K>,
        resolver: &dyn Resolver<Self>,
    ) -> Result<()> {
        formatter.serialize_key(buffer, cursor, key, resolver)?;
        write::write_name_separator(buffer, cursor)
    }

    fn write_map_end(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
        write::write_end_object(buffer, cursor)
    }

    fn read_map_start(bytes: &[u8], cursor: &mut usize) -> Result<SeqState> {
        read::read_begin_object(bytes, cursor).map(|()| SeqState::delimited())
    }

    fn read_map_next(bytes: &[u8], cursor: &mut usize, state: &mut SeqState) -> Result<Option<usize>> {
        read_next(bytes, cursor, state, b'}')
    }

    fn read_map_key<K>(
        bytes: &[u8],
        cursor: &mut usize,
        formatter: &dyn Formatter<Self, K>,
        resolver: &dyn Resolver<Self>,
    ) -> Result<K> {
        read::skip_whitespace(bytes, cursor);
        let key = formatter.deserialize_key(bytes, cursor, resolver)?;
        read::read_name_separator(bytes, cursor)?;
        Ok(key)
    }

    fn write_record_start(buffer: &mut Vec<u8>, cursor: &mut usize, _fields: &Fields) -> Result<()> {
        write::write_begin_object(buffer, cursor)
    }

    fn write_field_name(
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        position: usize,
        fields: &Fields,
    ) -> Result<()> {
        if position > 0 {
            write::write_value_separator(buffer, cursor)?;
        }
        let name = fields.name(position).unwrap_or_default();
        write::write_property_name(buffer, cursor, name)
    }

    fn write_record_end(buffer: &mut Vec<u8>, cursor: &mut usize, _fields: &Fields) -> Result<()> {
        write::write_end_object(buffer, cursor)
    }

    fn read_record_start(bytes: &[u8], cursor: &mut usize) -> Result<SeqState> {
        read::read_begin_object(bytes, cursor).map(|()| SeqState::delimited())
    }

    fn read_record_next(bytes: &[u8], cursor: &mut usize, state: &mut SeqState) -> Result<Option<usize>> {
        read_next(bytes, cursor, state, b'}')
    }

    fn read_field_name(bytes: &[u8], cursor: &mut usize, _ordinal: usize, fields: &Fields) -> Result<FieldMatch> {
        let span = read::read_string_span(bytes, cursor)?;
        let found = if span.escaped {
            fields.by_name(span.decode()?.as_bytes())
        } else {
            // Unescaped names match on the raw bytes; nothing is copied.
            fields.by_name(span.raw)
        };
        read::read_name_separator(bytes, cursor)?;
        Ok(found)
    }

    fn skip_value(bytes: &[u8], cursor: &mut usize) -> Result<()> {
        read::read_next_block(bytes, cursor)
    }

    fn unexpected(bytes: &[u8], offset: usize, expected: &'static str) -> Error {
        read::unexpected(bytes, offset, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinpack_testhelpers::test;

    #[test]
    fn element_loop_handles_separators_and_empties() {
        let bytes = b"[ 1 , 2 ]";
        let mut cursor = 0;
        let mut state = Json::read_array_start(bytes, &mut cursor).unwrap();
        let mut seen = Vec::new();
        while let Some(i) = Json::read_array_next(bytes, &mut cursor, &mut state).unwrap() {
            seen.push((i, read::read_u8(bytes, &mut cursor).unwrap()));
        }
        assert_eq!(seen, [(0, 1), (1, 2)]);
        assert_eq!(cursor, bytes.len());

        let mut cursor = 0;
        let mut state = Json::read_array_start(b"[]", &mut cursor).unwrap();
        assert_eq!(Json::read_array_next(b"[]", &mut cursor, &mut state).unwrap(), None);
    }

    #[test]
    fn missing_separator_is_an_error() {
        let bytes = b"[1 2]";
        let mut cursor = 0;
        let mut state = Json::read_array_start(bytes, &mut cursor).unwrap();
        Json::read_array_next(bytes, &mut cursor, &mut state).unwrap();
        read::read_u8(bytes, &mut cursor).unwrap();
        assert!(Json::read_array_next(bytes, &mut cursor, &mut state).is_err());
    }

    #[test]
    fn field_names_match_raw_or_escaped() {
        let fields = Fields::new(&["Key", "Value"]);
        let bytes = br#""Key":"#;
        assert_eq!(Json::read_field_name(bytes, &mut 0, 0, &fields).unwrap(), FieldMatch::Known(0));
        let bytes = br#""Value" :"#;
        assert_eq!(Json::read_field_name(bytes, &mut 0, 0, &fields).unwrap(), FieldMatch::Known(1));
        let bytes = br#""K\u0065y":"#;
        assert_eq!(Json::read_field_name(bytes, &mut 0, 0, &fields).unwrap(), FieldMatch::Known(0));
        let bytes = br#""Unknown":"#;
        assert_eq!(Json::read_field_name(bytes, &mut 0, 0, &fields).unwrap(), FieldMatch::Unknown);
    }
}
