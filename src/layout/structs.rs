//! Struct builder - a positional write view over a fixed-size struct region

use super::{
    element::{ElementSize, Primitive},
    lists::ListBuilder,
    slot::PointerSlot,
};
use crate::{
    arena::{BuilderArena, SegmentId},
    config::WORD_SIZE,
    error::{Result, TesseraError},
    typed::TextBuilder,
};

/// A `(segment, offset)` view over `size` bytes of struct data
///
/// Field layout is the schema's business: primitives sit at byte offsets,
/// pointer slots at word-aligned offsets, all inside `size`. The builder is a
/// transient handle; dropping it releases nothing and the bytes live as long
/// as the message.
#[derive(Debug, Clone, Copy)]
pub struct StructBuilder<'a> {
    arena: &'a BuilderArena,
    segment: SegmentId,
    offset: usize,
    size: usize,
}

impl<'a> StructBuilder<'a> {
    pub(crate) fn new(arena: &'a BuilderArena, segment: SegmentId, offset: usize, size: usize) -> Self {
        Self {
            arena,
            segment,
            offset,
            size,
        }
    }

    pub fn segment_id(&self) -> SegmentId {
        self.segment
    }

    /// Byte offset of the struct's first byte within its segment
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Declared struct size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Read a primitive at `offset` bytes into the struct
    pub fn get<T: Primitive>(&self, offset: usize) -> Result<T> {
        self.check(offset, T::WIDTH)?;
        self.arena
            .with_bytes(self.segment, self.offset + offset, T::WIDTH, T::read_le)
    }

    /// Write a primitive at `offset` bytes into the struct
    pub fn set<T: Primitive>(&self, offset: usize, value: T) -> Result<()> {
        self.check(offset, T::WIDTH)?;
        self.arena
            .with_bytes_mut(self.segment, self.offset + offset, T::WIDTH, |bytes| {
                value.write_le(bytes)
            })
    }

    /// Read the bit at `bit_offset` bits into the struct
    pub fn get_bool(&self, bit_offset: usize) -> Result<bool> {
        let byte = bit_offset / 8;
        self.check(byte, 1)?;
        self.arena.with_bytes(self.segment, self.offset + byte, 1, |bytes| {
            bytes[0] & (1 << (bit_offset % 8)) != 0
        })
    }

    /// Write the bit at `bit_offset` bits into the struct
    pub fn set_bool(&self, bit_offset: usize, value: bool) -> Result<()> {
        let byte = bit_offset / 8;
        self.check(byte, 1)?;
        self.arena
            .with_bytes_mut(self.segment, self.offset + byte, 1, |bytes| {
                let mask = 1u8 << (bit_offset % 8);
                if value {
                    bytes[0] |= mask;
                } else {
                    bytes[0] &= !mask;
                }
            })
    }

    /// The pointer word at `slot` bytes into the struct
    pub fn pointer_slot(&self, slot: usize) -> Result<PointerSlot<'a>> {
        if slot % WORD_SIZE != 0 {
            return Err(TesseraError::misaligned("pointer slot", slot));
        }
        self.check(slot, WORD_SIZE)?;
        Ok(PointerSlot::new(self.arena, self.segment, self.offset + slot))
    }

    /// Allocate a child struct of `struct_size` bytes referenced from `slot`
    pub fn new_struct(&self, slot: usize, struct_size: usize) -> Result<StructBuilder<'a>> {
        self.pointer_slot(slot)?.init_struct(struct_size)
    }

    /// Allocate a list of `length` elements referenced from `slot`
    pub fn new_list(
        &self,
        slot: usize,
        element_size: ElementSize,
        length: i64,
    ) -> Result<ListBuilder<'a>> {
        self.pointer_slot(slot)?.init_list(element_size, length)
    }

    /// Allocate a list of `length` structs referenced from `slot`
    pub fn new_struct_list(
        &self,
        slot: usize,
        struct_size: usize,
        length: i64,
    ) -> Result<ListBuilder<'a>> {
        self.pointer_slot(slot)?.init_struct_list(struct_size, length)
    }

    /// Store `text` as a byte list referenced from `slot`
    pub fn set_text(&self, slot: usize, text: &str) -> Result<TextBuilder<'a>> {
        self.pointer_slot(slot)?.set_text(text)
    }

    /// Reopen the struct referenced from `slot`
    pub fn get_struct(&self, slot: usize) -> Result<Option<StructBuilder<'a>>> {
        self.pointer_slot(slot)?.get_struct()
    }

    /// Reopen the list referenced from `slot`
    pub fn get_list(&self, slot: usize) -> Result<Option<ListBuilder<'a>>> {
        self.pointer_slot(slot)?.get_list()
    }

    /// Copy of the struct's bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.arena.read_bytes(self.segment, self.offset, self.size)
    }

    fn check(&self, offset: usize, width: usize) -> Result<()> {
        match offset.checked_add(width) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(TesseraError::struct_overflow(offset, width, self.size)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaConfig;

    fn with_struct<R>(size: usize, f: impl FnOnce(StructBuilder<'_>) -> R) -> R {
        let arena = BuilderArena::new(ArenaConfig::new(256)).unwrap();
        let (segment, offset) = arena.allocate(size).unwrap();
        f(StructBuilder::new(&arena, segment, offset, size))
    }

    #[test]
    fn test_primitive_fields() {
        with_struct(16, |s| {
            s.set::<u32>(0, 0xfeed_f00d).unwrap();
            s.set::<i16>(4, -7).unwrap();
            s.set::<f64>(8, 2.25).unwrap();

            assert_eq!(s.get::<u32>(0).unwrap(), 0xfeed_f00d);
            assert_eq!(s.get::<i16>(4).unwrap(), -7);
            assert_eq!(s.get::<f64>(8).unwrap(), 2.25);
            assert_eq!(s.get::<u8>(6).unwrap(), 0);
        });
    }

    #[test]
    fn test_write_past_size_fails() {
        with_struct(8, |s| {
            assert!(s.set::<u32>(4, 1).is_ok());
            assert!(matches!(
                s.set::<u32>(6, 1),
                Err(TesseraError::StructOverflow { offset: 6, width: 4, size: 8 })
            ));
            assert!(s.get::<u64>(8).is_err());
            assert!(s.set::<u8>(usize::MAX, 1).is_err());
            // The failed write left the neighbouring bytes alone
            assert_eq!(s.to_bytes().unwrap(), vec![0, 0, 0, 0, 1, 0, 0, 0]);
        });
    }

    #[test]
    fn test_bool_fields() {
        with_struct(8, |s| {
            s.set_bool(3, true).unwrap();
            s.set_bool(9, true).unwrap();
            assert!(s.get_bool(3).unwrap());
            assert!(!s.get_bool(4).unwrap());
            assert_eq!(s.get::<u8>(0).unwrap(), 0b1000);

            s.set_bool(3, false).unwrap();
            assert!(!s.get_bool(3).unwrap());
            assert!(s.set_bool(64, true).is_err());
        });
    }

    #[test]
    fn test_pointer_slot_checks() {
        with_struct(16, |s| {
            assert!(s.pointer_slot(8).is_ok());
            assert!(s.pointer_slot(4).is_err());
            assert!(matches!(
                s.pointer_slot(16),
                Err(TesseraError::StructOverflow { .. })
            ));
        });
    }

    #[test]
    fn test_children() {
        with_struct(16, |s| {
            let child = s.new_struct(0, 8).unwrap();
            child.set::<u64>(0, 99).unwrap();

            let list = s.new_list(8, ElementSize::TwoBytes, 3).unwrap();
            list.set::<u16>(2, 500).unwrap();

            let child = s.get_struct(0).unwrap().unwrap();
            assert_eq!(child.get::<u64>(0).unwrap(), 99);
            let list = s.get_list(8).unwrap().unwrap();
            assert_eq!(list.get::<u16>(2).unwrap(), 500);
        });
    }

    #[test]
    fn test_unset_children_are_none() {
        with_struct(16, |s| {
            assert!(s.get_struct(0).unwrap().is_none());
            assert!(s.get_list(8).unwrap().is_none());
        });
    }
}
