//! Bit list wrapper

use crate::{
    error::Result,
    layout::{ElementSize, ListBuilder},
};

/// A list of booleans packed eight to a byte
#[derive(Debug, Clone, Copy)]
pub struct BitListBuilder<'a> {
    list: ListBuilder<'a>,
}

impl<'a> BitListBuilder<'a> {
    pub fn new(list: ListBuilder<'a>) -> Result<Self> {
        list.expect(ElementSize::Bit)?;
        Ok(Self { list })
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<bool> {
        self.list.get_bool(index)
    }

    pub fn set(&self, index: usize, value: bool) -> Result<()> {
        self.list.set_bool(index, value)
    }

    pub fn to_vec(&self) -> Result<Vec<bool>> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    pub fn as_list(&self) -> ListBuilder<'a> {
        self.list
    }
}
