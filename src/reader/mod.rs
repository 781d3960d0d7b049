//! In-place reader over finished segments
//!
//! Follows the same pointer encoding the builders write, borrowing the
//! segment buffers instead of copying them. It bounds-checks every access
//! but assumes the buffers came from a [`MessageBuilder`]; it is not a
//! validator for untrusted input.
//!
//! [`MessageBuilder`]: crate::message::MessageBuilder

pub mod lists;
pub mod structs;

use crate::{
    arena::SegmentId,
    config::{ROOT_POINTER_OFFSET, ROOT_SEGMENT, WORD_SIZE},
    error::{Result, TesseraError},
    layout::wire::{locate_struct, WordSource},
};

pub use lists::{ListReader, PrimitiveListReader};
pub use structs::StructReader;

/// Borrowed view of a message's segments
#[derive(Debug, Clone)]
pub struct MessageReader<'a> {
    segments: Vec<&'a [u8]>,
}

impl<'a> MessageReader<'a> {
    pub fn new(segments: &'a [Vec<u8>]) -> Self {
        Self {
            segments: segments.iter().map(Vec::as_slice).collect(),
        }
    }

    /// Build from arbitrary borrowed buffers, in segment id order
    pub fn from_slices(segments: Vec<&'a [u8]>) -> Self {
        Self { segments }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The top-level struct
    pub fn root(&self) -> Result<StructReader<'_>> {
        let location = locate_struct(self, ROOT_SEGMENT, ROOT_POINTER_OFFSET)?
            .ok_or_else(|| TesseraError::invalid_pointer("message has no root struct"))?;
        StructReader::new(self, location)
    }

    /// Borrow `len` bytes at `offset` in `segment`
    pub fn bytes(&self, segment: SegmentId, offset: usize, len: usize) -> Result<&'a [u8]> {
        let data = self
            .segments
            .get(segment as usize)
            .ok_or_else(|| TesseraError::invalid_pointer(format!("no segment {}", segment)))?;

        match offset.checked_add(len) {
            Some(end) if end <= data.len() => Ok(&data[offset..end]),
            _ => Err(TesseraError::invalid_pointer(format!(
                "range {}+{} outside segment {} ({} bytes)",
                offset,
                len,
                segment,
                data.len()
            ))),
        }
    }
}

impl WordSource for MessageReader<'_> {
    fn read_word(&self, segment: SegmentId, offset: usize) -> Result<u64> {
        let bytes = self.bytes(segment, offset, WORD_SIZE)?;
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root() {
        let segments = vec![vec![0u8; 8]];
        let reader = MessageReader::new(&segments);
        assert!(reader.root().is_err());
    }

    #[test]
    fn test_bytes_bounds() {
        let segments = vec![vec![1u8, 2, 3, 4]];
        let reader = MessageReader::new(&segments);
        assert_eq!(reader.bytes(0, 1, 2).unwrap(), &[2, 3]);
        assert!(reader.bytes(0, 3, 2).is_err());
        assert!(reader.bytes(1, 0, 1).is_err());
        assert!(reader.read_word(0, 0).is_err());
    }
}
