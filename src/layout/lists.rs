//! List builder - a positional write view over a homogeneous element region

use super::{
    element::{ElementSize, Primitive},
    slot::PointerSlot,
    structs::StructBuilder,
};
use crate::{
    arena::{BuilderArena, SegmentId},
    error::{Result, TesseraError},
};

/// Location of one list element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef {
    pub segment: SegmentId,
    /// Byte offset of the element (for bit lists, of the byte holding it)
    pub offset: usize,
    /// Bit within the byte; always zero outside bit lists
    pub bit: u8,
    /// Bytes per element; zero for bit and void lists
    pub width: usize,
}

/// A `(segment, offset)` view over `length` elements of one width class
///
/// `length × width` bytes starting at `offset` belong to this list alone.
/// Element width is fixed when the list is allocated.
#[derive(Debug, Clone, Copy)]
pub struct ListBuilder<'a> {
    arena: &'a BuilderArena,
    segment: SegmentId,
    offset: usize,
    element_size: ElementSize,
    step: usize,
    length: usize,
}

impl<'a> ListBuilder<'a> {
    pub(crate) fn new(
        arena: &'a BuilderArena,
        segment: SegmentId,
        offset: usize,
        element_size: ElementSize,
        step: usize,
        length: usize,
    ) -> Self {
        Self {
            arena,
            segment,
            offset,
            element_size,
            step,
            length,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn element_size(&self) -> ElementSize {
        self.element_size
    }

    /// Bytes per element (struct size for struct lists, zero for bit lists)
    pub fn element_width(&self) -> usize {
        self.step
    }

    pub fn segment_id(&self) -> SegmentId {
        self.segment
    }

    /// Byte offset of element 0 within the segment
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes covered by the elements, excluding word padding
    pub fn byte_len(&self) -> usize {
        self.element_size
            .body_bytes(self.length, self.step)
            .unwrap_or(usize::MAX)
    }

    /// Locate element `index`
    pub fn at(&self, index: usize) -> Result<ElementRef> {
        if index >= self.length {
            return Err(TesseraError::index_out_of_range(index, self.length));
        }

        Ok(match self.element_size {
            ElementSize::Bit => ElementRef {
                segment: self.segment,
                offset: self.offset + index / 8,
                bit: (index % 8) as u8,
                width: 0,
            },
            _ => ElementRef {
                segment: self.segment,
                offset: self.offset + index * self.step,
                bit: 0,
                width: self.step,
            },
        })
    }

    /// Read scalar element `index`
    pub fn get<T: Primitive>(&self, index: usize) -> Result<T> {
        self.expect(T::ELEMENT_SIZE)?;
        let element = self.at(index)?;
        self.arena
            .with_bytes(element.segment, element.offset, T::WIDTH, T::read_le)
    }

    /// Write scalar element `index`
    pub fn set<T: Primitive>(&self, index: usize, value: T) -> Result<()> {
        self.expect(T::ELEMENT_SIZE)?;
        let element = self.at(index)?;
        self.arena
            .with_bytes_mut(element.segment, element.offset, T::WIDTH, |bytes| {
                value.write_le(bytes)
            })
    }

    /// Read bit element `index`
    pub fn get_bool(&self, index: usize) -> Result<bool> {
        self.expect(ElementSize::Bit)?;
        let element = self.at(index)?;
        self.arena
            .with_bytes(element.segment, element.offset, 1, |bytes| {
                bytes[0] & (1 << element.bit) != 0
            })
    }

    /// Write bit element `index`
    pub fn set_bool(&self, index: usize, value: bool) -> Result<()> {
        self.expect(ElementSize::Bit)?;
        let element = self.at(index)?;
        self.arena
            .with_bytes_mut(element.segment, element.offset, 1, |bytes| {
                if value {
                    bytes[0] |= 1 << element.bit;
                } else {
                    bytes[0] &= !(1 << element.bit);
                }
            })
    }

    /// Copy of the raw bytes of element `index`
    pub fn read_bytes(&self, index: usize) -> Result<Vec<u8>> {
        let element = self.at(index)?;
        self.arena
            .read_bytes(element.segment, element.offset, element.width)
    }

    /// Overwrite the raw bytes of element `index`; `data` must be exactly
    /// one element wide
    pub fn write_bytes(&self, index: usize, data: &[u8]) -> Result<()> {
        let element = self.at(index)?;
        if data.len() != element.width {
            return Err(TesseraError::invalid_parameter(
                "data",
                format!("{} bytes for a {} byte element", data.len(), element.width),
            ));
        }
        self.arena.write_bytes(element.segment, element.offset, data)
    }

    /// Overwrite every element from `values`
    pub fn copy_from_slice<T: Primitive>(&self, values: &[T]) -> Result<()> {
        self.expect(T::ELEMENT_SIZE)?;
        if values.len() != self.length {
            return Err(TesseraError::invalid_parameter(
                "values",
                format!("{} values for a list of {}", values.len(), self.length),
            ));
        }
        if values.is_empty() {
            return Ok(());
        }

        self.arena.with_bytes_mut(
            self.segment,
            self.offset,
            self.length * T::WIDTH,
            |bytes| {
                for (chunk, value) in bytes.chunks_exact_mut(T::WIDTH).zip(values) {
                    value.write_le(chunk);
                }
            },
        )
    }

    /// Read every element
    pub fn to_vec<T: Primitive>(&self) -> Result<Vec<T>> {
        self.expect(T::ELEMENT_SIZE)?;
        if self.length == 0 {
            return Ok(Vec::new());
        }

        self.arena
            .with_bytes(self.segment, self.offset, self.length * T::WIDTH, |bytes| {
                bytes.chunks_exact(T::WIDTH).map(T::read_le).collect()
            })
    }

    /// Struct element `index` of a struct list
    pub fn struct_at(&self, index: usize) -> Result<StructBuilder<'a>> {
        self.expect(ElementSize::InlineComposite)?;
        let element = self.at(index)?;
        Ok(StructBuilder::new(
            self.arena,
            element.segment,
            element.offset,
            element.width,
        ))
    }

    /// Pointer slot `index` of a pointer list
    pub fn pointer_at(&self, index: usize) -> Result<PointerSlot<'a>> {
        self.expect(ElementSize::Pointer)?;
        let element = self.at(index)?;
        Ok(PointerSlot::new(self.arena, element.segment, element.offset))
    }

    /// Fail unless the list holds `expected` elements
    pub(crate) fn expect(&self, expected: ElementSize) -> Result<()> {
        if self.element_size != expected {
            return Err(TesseraError::width_mismatch(
                expected.name(),
                self.element_size.name(),
            ));
        }
        Ok(())
    }
}
