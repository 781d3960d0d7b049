//! Scalar list wrappers

use std::marker::PhantomData;

use crate::{
    error::Result,
    layout::{ListBuilder, Primitive},
};

/// A list of `T` scalars
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveListBuilder<'a, T: Primitive> {
    list: ListBuilder<'a>,
    _marker: PhantomData<T>,
}

/// Byte list, the shape behind generated `init_<field>(length)` accessors for
/// `list(u8)` fields
pub type Uint8ListBuilder<'a> = PrimitiveListBuilder<'a, u8>;

impl<'a, T: Primitive> PrimitiveListBuilder<'a, T> {
    /// Bytes per element
    pub const K_SIZE: usize = T::WIDTH;

    /// Narrow `list` to `T` elements
    pub fn new(list: ListBuilder<'a>) -> Result<Self> {
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

    pub fn set(&self, index: usize, value: T) -> Result<()> {
        self.list.set(index, value)
    }

    /// Fill the whole list from `values`; lengths must match
    pub fn copy_from_slice(&self, values: &[T]) -> Result<()> {
        self.list.copy_from_slice(values)
    }

    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.list.to_vec()
    }

    /// Iterate over the elements in order
    pub fn iter(&self) -> impl Iterator<Item = Result<T>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// The untyped list underneath
    pub fn as_list(&self) -> ListBuilder<'a> {
        self.list
    }
}

impl<'a, T: Primitive> TryFrom<ListBuilder<'a>> for PrimitiveListBuilder<'a, T> {
    type Error = crate::error::TesseraError;

    fn try_from(list: ListBuilder<'a>) -> Result<Self> {
        Self::new(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::TesseraError, layout::ElementSize, message::MessageBuilder};

    #[test]
    fn test_byte_list_wrapper() {
        let message = MessageBuilder::with_defaults().unwrap();
        let root = message.init_root(8).unwrap();
        let list = root.new_list(0, ElementSize::Byte, 5).unwrap();

        let bytes = Uint8ListBuilder::new(list).unwrap();
        assert_eq!(Uint8ListBuilder::K_SIZE, 1);
        for i in 0..bytes.len() {
            bytes.set(i, i as u8).unwrap();
        }
        assert_eq!(bytes.to_vec().unwrap(), vec![0, 1, 2, 3, 4]);

        let collected: Vec<u8> = bytes.iter().collect::<Result<_>>().unwrap();
        assert_eq!(collected, vec![0, 1, 2, 3, 4]);
        assert!(bytes.get(5).is_err());
    }

    #[test]
    fn test_wrapper_width_must_match() {
        let message = MessageBuilder::with_defaults().unwrap();
        let root = message.init_root(8).unwrap();
        let list = root.new_list(0, ElementSize::TwoBytes, 2).unwrap();

        assert!(matches!(
            Uint8ListBuilder::new(list),
            Err(TesseraError::ElementWidthMismatch { .. })
        ));
        let shorts = PrimitiveListBuilder::<u16>::try_from(list).unwrap();
        shorts.copy_from_slice(&[300, 400]).unwrap();
        assert_eq!(shorts.get(1).unwrap(), 400);
    }
}
