//! Pointer slots: the one place where child regions get allocated

use log::trace;

use super::{
    element::ElementSize,
    lists::ListBuilder,
    structs::StructBuilder,
    wire::{composite_header, locate_list, locate_struct, WirePointer, WordSource},
};
use crate::{
    arena::{BuilderArena, SegmentId},
    config::{MAX_LIST_LENGTH, WORD_SIZE},
    error::{Result, TesseraError},
    typed::TextBuilder,
};

/// Check a requested list length before anything is allocated
pub fn checked_length(length: i64) -> Result<usize> {
    if length < 0 {
        return Err(TesseraError::NegativeLength { length });
    }
    match usize::try_from(length) {
        Ok(count) if count <= MAX_LIST_LENGTH => Ok(count),
        _ => Err(TesseraError::SizeLimit {
            what: "list length",
            value: length as u64,
            max: MAX_LIST_LENGTH as u64,
        }),
    }
}

fn checked_struct_size(size: usize) -> Result<()> {
    if size % WORD_SIZE != 0 {
        return Err(TesseraError::misaligned("struct size", size));
    }
    Ok(())
}

/// A word inside a struct or pointer list that refers to a child region
///
/// A slot goes from unset to allocated exactly once; the `init_*` methods
/// refuse slots that already hold a pointer.
#[derive(Debug, Clone, Copy)]
pub struct PointerSlot<'a> {
    arena: &'a BuilderArena,
    segment: SegmentId,
    offset: usize,
}

impl<'a> PointerSlot<'a> {
    pub(crate) fn new(arena: &'a BuilderArena, segment: SegmentId, offset: usize) -> Self {
        Self {
            arena,
            segment,
            offset,
        }
    }

    /// Segment holding the pointer word
    pub fn segment_id(&self) -> SegmentId {
        self.segment
    }

    /// Byte offset of the pointer word
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether no region has been allocated for this slot yet
    pub fn is_null(&self) -> Result<bool> {
        Ok(self.arena.read_word(self.segment, self.offset)? == 0)
    }

    /// Allocate a struct of `size` bytes and point this slot at it
    pub fn init_struct(&self, size: usize) -> Result<StructBuilder<'a>> {
        checked_struct_size(size)?;
        let (segment, offset) = self.place(size, |target| WirePointer::struct_at(target, size))?;
        Ok(StructBuilder::new(self.arena, segment, offset, size))
    }

    /// Allocate a list of `length` scalar or pointer elements
    pub fn init_list(&self, element_size: ElementSize, length: i64) -> Result<ListBuilder<'a>> {
        let count = checked_length(length)?;
        if element_size == ElementSize::InlineComposite {
            return Err(TesseraError::invalid_parameter(
                "element_size",
                "struct lists need a struct size; use init_struct_list",
            ));
        }

        let bytes = element_size
            .body_bytes(count, 0)
            .ok_or(TesseraError::SizeLimit {
                what: "list bytes",
                value: count as u64,
                max: usize::MAX as u64,
            })?;
        let (segment, offset) =
            self.place(bytes, |target| WirePointer::list_at(target, element_size, count))?;

        Ok(ListBuilder::new(
            self.arena,
            segment,
            offset,
            element_size,
            element_size.byte_width(),
            count,
        ))
    }

    /// Allocate a list of `length` structs of `struct_size` bytes each
    pub fn init_struct_list(&self, struct_size: usize, length: i64) -> Result<ListBuilder<'a>> {
        let count = checked_length(length)?;
        checked_struct_size(struct_size)?;
        let header = composite_header(count, struct_size)?;

        let bytes = ElementSize::InlineComposite
            .body_bytes(count, struct_size)
            .and_then(|body| body.checked_add(WORD_SIZE))
            .ok_or(TesseraError::SizeLimit {
                what: "list bytes",
                value: count as u64,
                max: usize::MAX as u64,
            })?;
        let (segment, start) = self.place(bytes, |target| {
            WirePointer::list_at(target, ElementSize::InlineComposite, count)
        })?;
        self.arena.write_word(segment, start, header)?;

        Ok(ListBuilder::new(
            self.arena,
            segment,
            start + WORD_SIZE,
            ElementSize::InlineComposite,
            struct_size,
            count,
        ))
    }

    /// Allocate a byte list holding `text`
    pub fn set_text(&self, text: &str) -> Result<TextBuilder<'a>> {
        let list = self.init_list(ElementSize::Byte, text.len() as i64)?;
        list.copy_from_slice(text.as_bytes())?;
        TextBuilder::new(list)
    }

    /// Reopen the struct this slot points at
    pub fn get_struct(&self) -> Result<Option<StructBuilder<'a>>> {
        Ok(locate_struct(self.arena, self.segment, self.offset)?
            .map(|loc| StructBuilder::new(self.arena, loc.segment, loc.offset, loc.size)))
    }

    /// Reopen the list this slot points at
    pub fn get_list(&self) -> Result<Option<ListBuilder<'a>>> {
        Ok(locate_list(self.arena, self.segment, self.offset)?.map(|loc| {
            ListBuilder::new(
                self.arena,
                loc.segment,
                loc.offset,
                loc.element_size,
                loc.step,
                loc.length,
            )
        }))
    }

    /// Reserve `bytes` for a child and store the pointer to it in this slot.
    ///
    /// Lands in this slot's own segment whenever it has room, even if later
    /// segments exist; otherwise the child goes wherever the segment set puts
    /// it, preceded by a landing pad, and the slot gets a far pointer.
    fn place(
        &self,
        bytes: usize,
        pointer_to: impl Fn(usize) -> Result<WirePointer>,
    ) -> Result<(SegmentId, usize)> {
        if !self.is_null()? {
            return Err(TesseraError::FieldAlreadySet {
                segment: self.segment,
                slot: self.offset,
            });
        }

        let arena = self.arena;
        if let Some(offset) = arena.allocate_in(self.segment, bytes)? {
            arena.write_word(self.segment, self.offset, pointer_to(offset)?.encode())?;
            return Ok((self.segment, offset));
        }

        let padded = bytes.checked_add(WORD_SIZE).ok_or(TesseraError::SizeLimit {
            what: "allocation",
            value: bytes as u64,
            max: usize::MAX as u64,
        })?;
        let (segment, pad) = arena.allocate(padded)?;
        let target = pad + WORD_SIZE;

        arena.write_word(segment, pad, pointer_to(target)?.encode())?;
        arena.write_word(
            self.segment,
            self.offset,
            WirePointer::far(segment, pad)?.encode(),
        )?;
        arena.record_far_pointer();
        trace!(
            "far pointer {}:{} -> {}:{} via pad at {}",
            self.segment,
            self.offset,
            segment,
            target,
            pad
        );

        Ok((segment, target))
    }
}
