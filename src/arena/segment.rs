//! Segment implementation - one contiguous, append-only allocation region

use crate::{
    config::WORD_SIZE,
    error::{Result, TesseraError},
};

/// Index of a segment within its segment set
pub type SegmentId = u32;

/// Round a byte count up to a whole number of words
#[inline]
pub fn align_to_word(bytes: usize) -> Option<usize> {
    bytes
        .checked_add(WORD_SIZE - 1)
        .map(|padded| padded & !(WORD_SIZE - 1))
}

/// A single contiguous byte buffer acting as a bump allocator
///
/// The backing vector is reserved at its full capacity when the segment is
/// created and never grows past it, so it is never reallocated and every
/// offset handed out stays valid for the life of the segment.
#[derive(Debug)]
pub struct Segment {
    id: SegmentId,
    /// Committed bytes; `data.len()` is the write cursor
    data: Vec<u8>,
    capacity: usize,
}

impl Segment {
    /// Create an empty segment able to hold `capacity` bytes
    pub fn new(id: SegmentId, capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity % WORD_SIZE != 0 {
            return Err(TesseraError::invalid_parameter(
                "capacity",
                "Segment capacity must be a non-zero multiple of the word size",
            ));
        }

        let mut data = Vec::new();
        data.try_reserve_exact(capacity).map_err(|e| {
            TesseraError::resource_exhausted(capacity, format!("segment {}: {}", id, e))
        })?;

        Ok(Self { id, data, capacity })
    }

    /// Reserve `byte_count` bytes (rounded up to a word) at the end of the
    /// segment, returning the start offset, or `None` when the segment is full
    pub fn allocate(&mut self, byte_count: usize) -> Option<usize> {
        let aligned = align_to_word(byte_count)?;
        if aligned > self.remaining() {
            return None;
        }

        let offset = self.data.len();
        self.data.resize(offset + aligned, 0);
        Some(offset)
    }

    /// Whether `byte_count` bytes would fit without opening a new segment
    pub fn has_room(&self, byte_count: usize) -> bool {
        align_to_word(byte_count).is_some_and(|aligned| aligned <= self.remaining())
    }

    /// Stable index of this segment within its set
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Number of committed bytes (the write cursor)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been allocated yet
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available for allocation
    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// All committed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Committed bytes in `[offset, offset + len)`
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = self.checked_end(offset, len)?;
        Ok(&self.data[offset..end])
    }

    /// Mutable committed bytes in `[offset, offset + len)`
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        let end = self.checked_end(offset, len)?;
        Ok(&mut self.data[offset..end])
    }

    /// Give up the committed bytes, trimmed to the write cursor
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.data.shrink_to_fit();
        self.data
    }

    fn checked_end(&self, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(TesseraError::invalid_pointer(format!(
                "range {}+{} outside segment {} ({} bytes committed)",
                offset,
                len,
                self.id,
                self.data.len()
            ))),
        }
    }
}
