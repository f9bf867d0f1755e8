use crate::{Error, Fields, Formatter, Resolver, Result};

/// Upper bound on the capacity a builder pre-allocates from a declared length.
///
/// Lengths come from untrusted input; anything above this grows on demand.
const MAX_PREALLOCATE: usize = 4096;

/// Position within an array, map or record being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqState {
    /// Declared element count for length-prefixed encodings.
    pub len: Option<usize>,
    /// Number of elements handed out so far.
    pub index: usize,
}

impl SeqState {
    /// A sequence whose element count is known up front.
    pub const fn counted(len: usize) -> Self {
        Self {
            len: Some(len),
            index: 0,
        }
    }

    /// A sequence terminated by a closing token.
    pub const fn delimited() -> Self {
        Self {
            len: None,
            index: 0,
        }
    }

    /// Index of the next element of a counted sequence, if any remain.
    pub fn advance(&mut self) -> Option<usize> {
        let len = self.len?;
        if self.index < len {
            self.index += 1;
            Some(self.index - 1)
        } else {
            None
        }
    }

    /// Hand out the next index of a delimited sequence.
    pub fn next_index(&mut self) -> usize {
        self.index += 1;
        self.index - 1
    }

    /// Whether no element has been handed out yet.
    pub const fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Capacity hint for a builder, bounded against hostile lengths.
    pub fn size_hint(&self) -> usize {
        self.len.unwrap_or(0).min(MAX_PREALLOCATE)
    }
}

/// Result of matching a record member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// The member at this position
    Known(usize),
    /// A member this record does not declare; skip its value
    Unknown,
}

/// A wire format: the container framing that collection, dictionary and
/// record formatters are written against.
///
/// Implementations are zero-sized markers. Primitive encodings live in each
/// format crate; this trait only covers what generic formatters need to frame
/// their elements and to skip what they do not understand.
pub trait Format: Sized + Send + Sync + 'static {
    /// Human-readable format name, used in logs.
    const NAME: &'static str;

    /// Write the format's null.
    fn write_nil(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()>;

    /// Consume a null at the cursor if there is one.
    fn try_read_nil(bytes: &[u8], cursor: &mut usize) -> Result<bool>;

    /// Open an array of `len` elements.
    fn write_array_start(buffer: &mut Vec<u8>, cursor: &mut usize, len: usize) -> Result<()>;

    /// Separate two array elements.
    fn write_array_separator(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()>;

    /// Close an array.
    fn write_array_end(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()>;

    /// Consume an array opening.
    fn read_array_start(bytes: &[u8], cursor: &mut usize) -> Result<SeqState>;

    /// Advance to the next array element, consuming any separator or the
    /// closing token. Returns the element index, or `None` at the end.
    fn read_array_next(
        bytes: &[u8],
        cursor: &mut usize,
        state: &mut SeqState,
    ) -> Result<Option<usize>>;

    /// Open a map of `len` entries.
    fn write_map_start(buffer: &mut Vec<u8>, cursor: &mut usize, len: usize) -> Result<()>;

    /// Separate two map entries.
    fn write_map_separator(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()>;

    /// Write a map key followed by whatever separates it from its value.
    fn write_map_key<K>(
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        key: &K,
        formatter: &dyn Formatter<Self, K>,
        resolver: &dyn Resolver<Self>,
    ) -> Result<()>;

    /// Close a map.
    fn write_map_end(buffer: &mut Vec<u8>, cursor: &mut usize) -> Result<()>;

    /// Consume a map opening.
    fn read_map_start(bytes: &[u8], cursor: &mut usize) -> Result<SeqState>;

    /// Advance to the next map entry. Returns the entry index, or `None` at the end.
    fn read_map_next(
        bytes: &[u8],
        cursor: &mut usize,
        state: &mut SeqState,
    ) -> Result<Option<usize>>;

    /// Read a map key and whatever separates it from its value.
    fn read_map_key<K>(
        bytes: &[u8],
        cursor: &mut usize,
        formatter: &dyn Formatter<Self, K>,
        resolver: &dyn Resolver<Self>,
    ) -> Result<K>;

    /// Open a record with the given members.
    fn write_record_start(buffer: &mut Vec<u8>, cursor: &mut usize, fields: &Fields)
    -> Result<()>;

    /// Introduce the member at `position`.
    fn write_field_name(
        buffer: &mut Vec<u8>,
        cursor: &mut usize,
        position: usize,
        fields: &Fields,
    ) -> Result<()>;

    /// Close a record.
    fn write_record_end(buffer: &mut Vec<u8>, cursor: &mut usize, fields: &Fields) -> Result<()>;

    /// Consume a record opening.
    fn read_record_start(bytes: &[u8], cursor: &mut usize) -> Result<SeqState>;

    /// Advance to the next record member. Returns its ordinal, or `None` at the end.
    fn read_record_next(
        bytes: &[u8],
        cursor: &mut usize,
        state: &mut SeqState,
    ) -> Result<Option<usize>>;

    /// Identify the member whose value follows. `ordinal` is the value
    /// returned by [`Format::read_record_next`].
    fn read_field_name(
        bytes: &[u8],
        cursor: &mut usize,
        ordinal: usize,
        fields: &Fields,
    ) -> Result<FieldMatch>;

    /// Skip exactly one complete value, including everything nested in it.
    fn skip_value(bytes: &[u8], cursor: &mut usize) -> Result<()>;

    /// Error for a value at `offset` that is not the `expected` kind.
    fn unexpected(bytes: &[u8], offset: usize, expected: &'static str) -> Error;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counted_sequences_stop_at_len() {
        let mut state = SeqState::counted(2);
        assert!(state.is_first());
        assert_eq!(state.advance(), Some(0));
        assert_eq!(state.advance(), Some(1));
        assert_eq!(state.advance(), None);
        assert_eq!(state.advance(), None);
    }

    #[test]
    fn size_hint_is_bounded() {
        assert_eq!(SeqState::counted(3).size_hint(), 3);
        assert_eq!(SeqState::counted(u32::MAX as usize).size_hint(), MAX_PREALLOCATE);
        assert_eq!(SeqState::delimited().size_hint(), 0);
    }
}
