//! List readers

use std::marker::PhantomData;

use super::{structs::StructReader, MessageReader};
use crate::{
    config::WORD_SIZE,
    error::{Result, TesseraError},
    layout::{
        wire::{locate_list, locate_struct},
        ElementSize, ListLocation, Primitive, StructLocation,
    },
};

/// Read-only view over a list region in finished segments
#[derive(Debug, Clone, Copy)]
pub struct ListReader<'a> {
    message: &'a MessageReader<'a>,
    location: ListLocation,
    data: &'a [u8],
}

impl<'a> ListReader<'a> {
    pub(crate) fn new(message: &'a MessageReader<'a>, location: ListLocation) -> Result<Self> {
        let len = location
            .element_size
            .body_bytes(location.length, location.step)
            .ok_or_else(|| TesseraError::invalid_pointer("list body size overflows"))?;
        let data = message.bytes(location.segment, location.offset, len)?;
        Ok(Self {
            message,
            location,
            data,
        })
    }

    pub(crate) fn empty(message: &'a MessageReader<'a>, element_size: ElementSize) -> Self {
        Self {
            message,
            location: ListLocation {
                segment: 0,
                offset: 0,
                element_size,
                step: element_size.byte_width(),
                length: 0,
            },
            data: &[],
        }
    }

    pub fn len(&self) -> usize {
        self.location.length
    }

    pub fn is_empty(&self) -> bool {
        self.location.length == 0
    }

    pub fn element_size(&self) -> ElementSize {
        self.location.element_size
    }

    /// Bytes per element (struct size for struct lists)
    pub fn element_width(&self) -> usize {
        self.location.step
    }

    /// Element bytes of a byte list, borrowed from the segment
    pub fn as_bytes(&self) -> Result<&'a [u8]> {
        self.expect(ElementSize::Byte)?;
        Ok(self.data)
    }

    /// A byte list decoded as UTF-8
    pub fn as_text(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.as_bytes()?)?)
    }

    pub fn get<T: Primitive>(&self, index: usize) -> Result<T> {
        self.expect(T::ELEMENT_SIZE)?;
        self.check(index)?;
        let start = index * T::WIDTH;
        Ok(T::read_le(&self.data[start..start + T::WIDTH]))
    }

    pub fn get_bool(&self, index: usize) -> Result<bool> {
        self.expect(ElementSize::Bit)?;
        self.check(index)?;
        Ok(self.data[index / 8] & (1 << (index % 8)) != 0)
    }

    pub fn to_vec<T: Primitive>(&self) -> Result<Vec<T>> {
        self.expect(T::ELEMENT_SIZE)?;
        Ok(self.data.chunks_exact(T::WIDTH).map(T::read_le).collect())
    }

    /// Struct element `index` of a struct list
    pub fn struct_at(&self, index: usize) -> Result<StructReader<'a>> {
        self.expect(ElementSize::InlineComposite)?;
        self.check(index)?;
        StructReader::new(
            self.message,
            StructLocation {
                segment: self.location.segment,
                offset: self.location.offset + index * self.location.step,
                size: self.location.step,
            },
        )
    }

    /// Struct referenced by element `index` of a pointer list
    pub fn struct_ptr_at(&self, index: usize) -> Result<Option<StructReader<'a>>> {
        let slot = self.pointer_slot(index)?;
        match locate_struct(self.message, self.location.segment, slot)? {
            Some(location) => Ok(Some(StructReader::new(self.message, location)?)),
            None => Ok(None),
        }
    }

    /// List referenced by element `index` of a pointer list; `None` when unset
    pub fn list_at(&self, index: usize) -> Result<Option<ListReader<'a>>> {
        let slot = self.pointer_slot(index)?;
        match locate_list(self.message, self.location.segment, slot)? {
            Some(location) => Ok(Some(ListReader::new(self.message, location)?)),
            None => Ok(None),
        }
    }

    fn pointer_slot(&self, index: usize) -> Result<usize> {
        self.expect(ElementSize::Pointer)?;
        self.check(index)?;
        Ok(self.location.offset + index * WORD_SIZE)
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.location.length {
            return Err(TesseraError::index_out_of_range(index, self.location.length));
        }
        Ok(())
    }

    fn expect(&self, expected: ElementSize) -> Result<()> {
        if self.location.element_size != expected {
            return Err(TesseraError::width_mismatch(
                expected.name(),
                self.location.element_size.name(),
            ));
        }
        Ok(())
    }
}

/// A list reader narrowed to `T` scalars
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveListReader<'a, T: Primitive> {
    list: ListReader<'a>,
    _marker: PhantomData<T>,
}

impl<'a, T: Primitive> PrimitiveListReader<'a, T> {
    pub fn new(list: ListReader<'a>) -> Result<Self> {
        list.expect(T::ELEMENT_SIZE)?;
        Ok(Self {
            list,
            _marker: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<T> {
        self.list.get(index)
    }

    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.list.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        self.list.data.chunks_exact(T::WIDTH).map(T::read_le)
    }

    pub fn as_list(&self) -> ListReader<'a> {
        self.list
    }
}
