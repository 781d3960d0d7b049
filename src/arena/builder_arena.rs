//! Shared, single-writer handle to a segment set

use std::cell::RefCell;

use super::{
    config::ArenaConfig,
    segment::SegmentId,
    segment_set::SegmentSet,
    stats::ArenaStats,
};
use crate::{
    config::WORD_SIZE,
    error::Result,
    layout::wire::WordSource,
};

/// Interior-mutable owner of a [`SegmentSet`] that struct and list builders
/// borrow from
///
/// Builders are `(arena, segment, offset)` views and may be alive at the same
/// time, so the set sits behind a `RefCell`. No borrow outlives a single
/// method call here. The arena is `Send` but not `Sync`: one writer per
/// message, any number of messages on different threads.
#[derive(Debug)]
pub struct BuilderArena {
    inner: RefCell<SegmentSet>,
}

impl BuilderArena {
    /// Create an arena with a fresh segment set
    pub fn new(config: ArenaConfig) -> Result<Self> {
        Ok(Self {
            inner: RefCell::new(SegmentSet::new(config)?),
        })
    }

    /// Allocate in the current segment, opening a new one if needed
    pub fn allocate(&self, byte_count: usize) -> Result<(SegmentId, usize)> {
        self.inner.borrow_mut().allocate(byte_count)
    }

    /// Allocate in one specific segment only
    pub fn allocate_in(&self, segment: SegmentId, byte_count: usize) -> Result<Option<usize>> {
        self.inner.borrow_mut().allocate_in(segment, byte_count)
    }

    /// Segment currently accepting allocations
    pub fn current_segment_id(&self) -> SegmentId {
        self.inner.borrow().current_segment_id()
    }

    /// Copy committed bytes out of a segment
    pub fn read_bytes(&self, segment: SegmentId, offset: usize, len: usize) -> Result<Vec<u8>> {
        let set = self.inner.borrow();
        Ok(set.segment(segment)?.bytes(offset, len)?.to_vec())
    }

    /// Overwrite committed bytes in a segment
    pub fn write_bytes(&self, segment: SegmentId, offset: usize, data: &[u8]) -> Result<()> {
        let mut set = self.inner.borrow_mut();
        set.segment_mut(segment)?
            .bytes_mut(offset, data.len())?
            .copy_from_slice(data);
        Ok(())
    }

    /// Run `f` over a committed byte range without copying
    pub(crate) fn with_bytes<R>(
        &self,
        segment: SegmentId,
        offset: usize,
        len: usize,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Result<R> {
        let set = self.inner.borrow();
        Ok(f(set.segment(segment)?.bytes(offset, len)?))
    }

    /// Run `f` over a mutable committed byte range
    pub(crate) fn with_bytes_mut<R>(
        &self,
        segment: SegmentId,
        offset: usize,
        len: usize,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R> {
        let mut set = self.inner.borrow_mut();
        Ok(f(set.segment_mut(segment)?.bytes_mut(offset, len)?))
    }

    /// Store one little-endian word
    pub fn write_word(&self, segment: SegmentId, offset: usize, word: u64) -> Result<()> {
        self.write_bytes(segment, offset, &word.to_le_bytes())
    }

    /// Count a cross-segment pointer
    pub fn record_far_pointer(&self) {
        self.inner.borrow_mut().record_far_pointer();
    }

    /// Snapshot of the allocation statistics
    pub fn stats(&self) -> ArenaStats {
        self.inner.borrow().stats().clone()
    }

    /// Number of segments opened so far
    pub fn segment_count(&self) -> usize {
        self.inner.borrow().segment_count()
    }

    /// Committed length of a segment
    pub fn segment_len(&self, segment: SegmentId) -> Result<usize> {
        Ok(self.inner.borrow().segment(segment)?.len())
    }

    /// Give up the handle and return the segment set
    pub fn into_inner(self) -> SegmentSet {
        self.inner.into_inner()
    }
}

impl WordSource for BuilderArena {
    fn read_word(&self, segment: SegmentId, offset: usize) -> Result<u64> {
        self.with_bytes(segment, offset, WORD_SIZE, |bytes| {
            let mut word = [0u8; WORD_SIZE];
            word.copy_from_slice(bytes);
            u64::from_le_bytes(word)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_round_trip_through_arena() {
        let arena = BuilderArena::new(ArenaConfig::new(32)).unwrap();
        let (segment, offset) = arena.allocate(16).unwrap();

        arena.write_word(segment, offset + 8, 0xdead_beef).unwrap();
        assert_eq!(arena.read_word(segment, offset).unwrap(), 0);
        assert_eq!(arena.read_word(segment, offset + 8).unwrap(), 0xdead_beef);
        assert!(arena.read_word(segment, offset + 16).is_err());
    }

    #[test]
    fn test_byte_access() {
        let arena = BuilderArena::new(ArenaConfig::new(32)).unwrap();
        let (segment, offset) = arena.allocate(8).unwrap();

        arena.write_bytes(segment, offset, &[1, 2, 3]).unwrap();
        assert_eq!(arena.read_bytes(segment, offset, 4).unwrap(), vec![1, 2, 3, 0]);

        arena
            .with_bytes_mut(segment, offset, 2, |bytes| bytes.swap(0, 1))
            .unwrap();
        let sum = arena
            .with_bytes(segment, offset, 3, |bytes| bytes.iter().map(|&b| b as u32).sum::<u32>())
            .unwrap();
        assert_eq!(sum, 6);
        assert_eq!(arena.read_bytes(segment, offset, 2).unwrap(), vec![2, 1]);
    }
}
