//! Message builder: owner of a segment arena plus the root pointer

use log::debug;

use crate::{
    arena::{ArenaConfig, ArenaStats, BuilderArena, SegmentId},
    config::{ROOT_POINTER_OFFSET, ROOT_SEGMENT, WORD_SIZE},
    error::{Result, TesseraError},
    layout::{wire::locate_struct, PointerSlot, StructBuilder, StructLocation},
    reader::MessageReader,
};

/// Builds one message
///
/// Word 0 of segment 0 is reserved for the root pointer when the message is
/// created. Builders handed out borrow the message, so [`finish`] can only be
/// called once they are gone.
///
/// [`finish`]: MessageBuilder::finish
#[derive(Debug)]
pub struct MessageBuilder {
    arena: BuilderArena,
}

impl MessageBuilder {
    /// Create an empty message with the given segment policy
    pub fn new(config: ArenaConfig) -> Result<Self> {
        let arena = BuilderArena::new(config)?;
        let root = arena.allocate(WORD_SIZE)?;
        if root != (ROOT_SEGMENT, ROOT_POINTER_OFFSET) {
            return Err(TesseraError::invalid_pointer(format!(
                "root pointer landed at {}:{}",
                root.0, root.1
            )));
        }
        Ok(Self { arena })
    }

    /// Create an empty message with the default segment policy
    pub fn with_defaults() -> Result<Self> {
        Self::new(ArenaConfig::default())
    }

    /// Allocate the top-level struct
    pub fn init_root(&self, struct_size: usize) -> Result<StructBuilder<'_>> {
        self.root_slot().init_struct(struct_size)
    }

    /// Reopen the top-level struct, if it was allocated
    pub fn get_root(&self) -> Result<Option<StructBuilder<'_>>> {
        self.root_slot().get_struct()
    }

    /// The root pointer slot
    pub fn root_slot(&self) -> PointerSlot<'_> {
        PointerSlot::new(&self.arena, ROOT_SEGMENT, ROOT_POINTER_OFFSET)
    }

    /// The arena builders allocate from
    pub fn arena(&self) -> &BuilderArena {
        &self.arena
    }

    /// Allocation statistics so far
    pub fn stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    pub fn segment_count(&self) -> usize {
        self.arena.segment_count()
    }

    /// Stop building and hand out the segments
    pub fn finish(self) -> Result<FinishedMessage> {
        let root = locate_struct(&self.arena, ROOT_SEGMENT, ROOT_POINTER_OFFSET)?;
        let stats = self.arena.stats();
        let segments = self.arena.into_inner().into_segments();

        debug!(
            "finished message: {} segments, {} bytes",
            segments.len(),
            segments.iter().map(Vec::len).sum::<usize>()
        );

        Ok(FinishedMessage {
            segments,
            root,
            stats,
        })
    }
}

/// A completed message: ordered immutable segment buffers plus the location
/// of the top-level struct
#[derive(Debug, Clone)]
pub struct FinishedMessage {
    segments: Vec<Vec<u8>>,
    root: Option<StructLocation>,
    stats: ArenaStats,
}

impl FinishedMessage {
    /// Segment buffers in id order
    pub fn segments(&self) -> &[Vec<u8>] {
        &self.segments
    }

    /// Where the top-level struct lives; `None` if no root was allocated
    pub fn root(&self) -> Option<StructLocation> {
        self.root
    }

    /// `(segment, offset)` of the top-level struct
    pub fn root_position(&self) -> Option<(SegmentId, usize)> {
        self.root.map(|loc| (loc.segment, loc.offset))
    }

    /// Allocation statistics at the time the message was finished
    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    /// Total committed bytes across all segments
    pub fn total_bytes(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    /// Read the message back in place
    pub fn reader(&self) -> MessageReader<'_> {
        MessageReader::new(&self.segments)
    }

    pub fn into_segments(self) -> Vec<Vec<u8>> {
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ElementSize;

    #[test]
    fn test_root_pointer_is_reserved() {
        let message = MessageBuilder::with_defaults().unwrap();
        assert!(message.get_root().unwrap().is_none());

        let root = message.init_root(16).unwrap();
        assert_eq!((root.segment_id(), root.offset()), (0, 8));
        assert!(message.init_root(16).is_err());

        let again = message.get_root().unwrap().unwrap();
        assert_eq!(again.size(), 16);
    }

    #[test]
    fn test_finish() {
        let message = MessageBuilder::with_defaults().unwrap();
        {
            let root = message.init_root(8).unwrap();
            let list = root.new_list(0, ElementSize::Byte, 3).unwrap();
            list.copy_from_slice(&[1u8, 2, 3]).unwrap();
        }
        let finished = message.finish().unwrap();

        assert_eq!(finished.segments().len(), 1);
        assert_eq!(finished.root_position(), Some((0, 8)));
        // root pointer + root struct + one word of list data
        assert_eq!(finished.total_bytes(), 24);
        assert_eq!(finished.stats().allocations, 3);
    }

    #[test]
    fn test_finish_without_root() {
        let finished = MessageBuilder::with_defaults().unwrap().finish().unwrap();
        assert!(finished.root().is_none());
        assert_eq!(finished.total_bytes(), 8);
    }
}
