//! Struct list wrapper

use crate::{
    error::{Result, TesseraError},
    layout::{ElementSize, ListBuilder, StructBuilder},
};

/// A list of inline structs of one fixed size
#[derive(Debug, Clone, Copy)]
pub struct StructListBuilder<'a> {
    list: ListBuilder<'a>,
}

impl<'a> StructListBuilder<'a> {
    /// Narrow `list` to structs of `struct_size` bytes
    pub fn new(list: ListBuilder<'a>, struct_size: usize) -> Result<Self> {
        list.expect(ElementSize::InlineComposite)?;
        if list.element_width() != struct_size {
            return Err(TesseraError::struct_size_mismatch(
                struct_size,
                list.element_width(),
            ));
        }
        Ok(Self { list })
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Struct element `index`
    pub fn get(&self, index: usize) -> Result<StructBuilder<'a>> {
        self.list.struct_at(index)
    }

    /// Size of each element in bytes
    pub fn struct_size(&self) -> usize {
        self.list.element_width()
    }

    pub fn as_list(&self) -> ListBuilder<'a> {
        self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageBuilder;

    #[test]
    fn test_struct_list() {
        let message = MessageBuilder::with_defaults().unwrap();
        let root = message.init_root(8).unwrap();
        let points = StructListBuilder::new(root.new_struct_list(0, 16, 3).unwrap(), 16).unwrap();

        for i in 0..points.len() {
            let point = points.get(i).unwrap();
            point.set::<f64>(0, i as f64).unwrap();
            point.set::<f64>(8, -(i as f64)).unwrap();
        }

        assert_eq!(points.struct_size(), 16);
        assert_eq!(points.get(2).unwrap().get::<f64>(8).unwrap(), -2.0);
        assert!(points.get(3).is_err());
    }

    #[test]
    fn test_struct_size_mismatch() {
        let message = MessageBuilder::with_defaults().unwrap();
        let root = message.init_root(8).unwrap();
        let list = root.new_struct_list(0, 16, 1).unwrap();
        let err = StructListBuilder::new(list, 8).unwrap_err();
        assert!(matches!(
            err,
            TesseraError::StructSizeMismatch {
                expected: 8,
                actual: 16
            }
        ));
        assert!(err.is_invariant_violation());
    }
}
