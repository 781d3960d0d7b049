//! Pointer list wrapper: lists whose elements are themselves lists or structs

use crate::{
    error::Result,
    layout::{ElementSize, ListBuilder, PointerSlot, StructBuilder},
};

/// A list of pointer slots
#[derive(Debug, Clone, Copy)]
pub struct PointerListBuilder<'a> {
    list: ListBuilder<'a>,
}

impl<'a> PointerListBuilder<'a> {
    pub fn new(list: ListBuilder<'a>) -> Result<Self> {
        list.expect(ElementSize::Pointer)?;
        Ok(Self { list })
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Slot `index`
    pub fn get(&self, index: usize) -> Result<PointerSlot<'a>> {
        self.list.pointer_at(index)
    }

    /// Allocate a list for element `index`
    pub fn init_list_at(
        &self,
        index: usize,
        element_size: ElementSize,
        length: i64,
    ) -> Result<ListBuilder<'a>> {
        self.get(index)?.init_list(element_size, length)
    }

    /// Allocate a struct for element `index`
    pub fn init_struct_at(&self, index: usize, struct_size: usize) -> Result<StructBuilder<'a>> {
        self.get(index)?.init_struct(struct_size)
    }

    pub fn as_list(&self) -> ListBuilder<'a> {
        self.list
    }
}
