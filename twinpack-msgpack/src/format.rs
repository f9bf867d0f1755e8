use twinpack_core::{Error, FieldMatch, Fields, Format, Formatter, Resolver, Result, SeqState};

use crate::{dispatch, read, write};

/// The MessagePack wire format.
///
/// Records are arrays in member order; member names never reach the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MsgPack;

impl Format for MsgPack {
    const NAME: &'static str = "msgpack";

    fn write_nil(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()> {
        write::write_nil(buffer, cursor)
    }

    fn try_read_nil(bytes: &[u8], cursor: &mut usize) -> Result<bool> {
        read::try_read_nil(bytes, cursor)
    }

    fn write_array_start(buffer: &mut Vec<u8>, cursor: &mut usize, len: usize) -> Result<()> {
        write::write_array_header(buffer, cursor, len)
    }

    fn write_array_separator(_: &mut Vec<u8>, _: &mut usize) -> Result<()> {
        Ok(())
    }

    fn write_array_end(_: &mut Vec<u8>, _: &mut usize) -> Result<()> {
        Ok(())
    }

    fn read_array_start(bytes: &[u8], cursor: &mut usize) -> Result<SeqState> {
        read::read_array_header(bytes, cursor).map(SeqState::counted)
    }

    fn read_array_next(_: &[u8], _: &mut usize, state: &mut SeqState) -> Result<Option<usize>> {
        Ok(state.advance())
    }

    fn write_map_start(buffer: &mut Vec<u8>, cursor: &mut usize, len: usize) -> Result<()> {
        write::write_map_header(buffer, cursor, len)
    }

    fn write_map_separator(_: &mut Vec<u8>, _: &mut usize) -> Result<()> {
        Ok(())
    }

    fn write_map_key<K>(
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        key: &K,
        formatter: &dyn Formatter<Self, K>,
        resolver: &dyn Resolver<Self>,
    ) -> Result<()> {
        formatter.serialize(buffer, cursor, key, resolver)
    }

    fn write_map_end(_: &mut Vec<u8>, _: &mut usize) -> Result<()> {
        Ok(())
    }

    fn read_map_start(bytes: &[u8], cursor: &mut usize) -> Result<SeqState> {
        read::read_map_header(bytes, cursor).map(SeqState::counted)
    }

    fn read_map_next(_: &[u8], _: &mut usize, state: &mut SeqState) -> Result<Option<usize>> {
        Ok(state.advance())
    }

    fn read_map_key<K>(
        bytes: &[u8],
        cursor: &mut usize,
        formatter: &dyn Formatter<Self, K>,
        resolver: &dyn Resolver<Self>,
    ) -> Result<K> {
        formatter.deserialize(bytes, cursor, resolver)
    }

    fn write_record_start(buffer: &mut Vec<u8>, cursor: &mut usize, fields: &Fields) -> Result<()> {
        write::write_array_header(buffer, cursor, fields.len())
    }

    fn write_field_name(_: &mut Vec<u8>, _: &mut usize, _: usize, _: &Fields) -> Result<()> {
        Ok(())
    }

    fn write_record_end(_: &mut Vec<u8>, _: &mut usize, _: &Fields) -> Result<()> {
        Ok(())
    }

    fn read_record_start(bytes: &[u8], cursor: &mut usize) -> Result<SeqState> {
        read::read_array_header(bytes, cursor).map(SeqState::counted)
    }

    fn read_record_next(_: &[u8], _: &mut usize, state: &mut SeqState) -> Result<Option<usize>> {
        Ok(state.advance())
    }

    fn read_field_name(_: &[u8], _: &mut usize, ordinal: usize, fields: &Fields) -> Result<FieldMatch> {
        // Elements past the declared members come from a newer writer.
        Ok(fields.by_ordinal(ordinal))
    }

    fn skip_value(bytes: &[u8], cursor: &mut usize) -> Result<()> {
        read::skip_value(bytes, cursor)
    }

    fn unexpected(bytes: &[u8], offset: usize, expected: &'static str) -> Error {
        dispatch::invalid_code(bytes, offset, expected)
    }
}
