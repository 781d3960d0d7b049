//! Struct reader

use super::{
    lists::{ListReader, PrimitiveListReader},
    MessageReader,
};
use crate::{
    arena::SegmentId,
    config::WORD_SIZE,
    error::{Result, TesseraError},
    layout::{
        wire::{locate_list, locate_struct},
        ElementSize, Primitive, StructLocation,
    },
};

/// Read-only view over a struct region in finished segments
#[derive(Debug, Clone, Copy)]
pub struct StructReader<'a> {
    message: &'a MessageReader<'a>,
    location: StructLocation,
    data: &'a [u8],
}

impl<'a> StructReader<'a> {
    pub(crate) fn new(message: &'a MessageReader<'a>, location: StructLocation) -> Result<Self> {
        let data = message.bytes(location.segment, location.offset, location.size)?;
        Ok(Self {
            message,
            location,
            data,
        })
    }

    pub fn segment_id(&self) -> SegmentId {
        self.location.segment
    }

    pub fn offset(&self) -> usize {
        self.location.offset
    }

    pub fn size(&self) -> usize {
        self.location.size
    }

    /// The struct's bytes, borrowed from the segment
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn get<T: Primitive>(&self, offset: usize) -> Result<T> {
        match offset.checked_add(T::WIDTH) {
            Some(end) if end <= self.data.len() => Ok(T::read_le(&self.data[offset..end])),
            _ => Err(TesseraError::struct_overflow(offset, T::WIDTH, self.data.len())),
        }
    }

    pub fn get_bool(&self, bit_offset: usize) -> Result<bool> {
        let byte = bit_offset / 8;
        let value = self
            .data
            .get(byte)
            .ok_or_else(|| TesseraError::struct_overflow(byte, 1, self.data.len()))?;
        Ok(value & (1 << (bit_offset % 8)) != 0)
    }

    /// Struct referenced from `slot`; `None` when the slot is unset
    pub fn get_struct(&self, slot: usize) -> Result<Option<StructReader<'a>>> {
        let at = self.slot(slot)?;
        match locate_struct(self.message, self.location.segment, at)? {
            Some(location) => Ok(Some(StructReader::new(self.message, location)?)),
            None => Ok(None),
        }
    }

    /// List referenced from `slot`, which must hold `expected` elements; an
    /// unset slot reads as an empty list
    pub fn get_list(&self, slot: usize, expected: ElementSize) -> Result<ListReader<'a>> {
        let at = self.slot(slot)?;
        let list = match locate_list(self.message, self.location.segment, at)? {
            Some(location) => ListReader::new(self.message, location)?,
            None => return Ok(ListReader::empty(self.message, expected)),
        };

        if list.element_size() != expected {
            return Err(TesseraError::width_mismatch(
                expected.name(),
                list.element_size().name(),
            ));
        }
        Ok(list)
    }

    /// Scalar list referenced from `slot`
    pub fn get_primitive_list<T: Primitive>(&self, slot: usize) -> Result<PrimitiveListReader<'a, T>> {
        PrimitiveListReader::new(self.get_list(slot, T::ELEMENT_SIZE)?)
    }

    /// Text referenced from `slot`; an unset slot reads as ""
    pub fn get_text(&self, slot: usize) -> Result<&'a str> {
        self.get_list(slot, ElementSize::Byte)?.as_text()
    }

    fn slot(&self, slot: usize) -> Result<usize> {
        if slot % WORD_SIZE != 0 {
            return Err(TesseraError::misaligned("pointer slot", slot));
        }
        match slot.checked_add(WORD_SIZE) {
            Some(end) if end <= self.data.len() => Ok(self.location.offset + slot),
            _ => Err(TesseraError::struct_overflow(slot, WORD_SIZE, self.data.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{layout::ElementSize, message::MessageBuilder};

    #[test]
    fn test_read_back_fields() {
        let message = MessageBuilder::with_defaults().unwrap();
        let root = message.init_root(24).unwrap();
        root.set::<u32>(0, 42).unwrap();
        root.set_bool(33, true).unwrap();
        root.set_text(8, "segment").unwrap();
        root.new_struct(16, 8).unwrap().set::<i64>(0, -5).unwrap();
        let finished = message.finish().unwrap();

        let reader = finished.reader();
        let root = reader.root().unwrap();
        assert_eq!(root.size(), 24);
        assert_eq!(root.get::<u32>(0).unwrap(), 42);
        assert!(root.get_bool(33).unwrap());
        assert!(!root.get_bool(32).unwrap());
        assert_eq!(root.get_text(8).unwrap(), "segment");
        assert_eq!(root.get_struct(16).unwrap().unwrap().get::<i64>(0).unwrap(), -5);
        assert!(root.get::<u64>(20).is_err());
    }

    #[test]
    fn test_unset_and_mismatched_fields() {
        let message = MessageBuilder::with_defaults().unwrap();
        let root = message.init_root(16).unwrap();
        root.new_list(8, ElementSize::FourBytes, 2).unwrap();
        let finished = message.finish().unwrap();

        let reader = finished.reader();
        let root = reader.root().unwrap();
        assert!(root.get_struct(0).unwrap().is_none());
        assert!(root.get_list(0, ElementSize::Byte).unwrap().is_empty());
        assert_eq!(root.get_text(0).unwrap(), "");
        assert!(root.get_list(8, ElementSize::Byte).is_err());
        assert_eq!(root.get_list(8, ElementSize::FourBytes).unwrap().len(), 2);
        assert!(root.get_struct(8).is_err());
    }
}
