//! UTF-8 text stored as a byte list

use crate::{
    error::Result,
    layout::ListBuilder,
};

use super::primitive::Uint8ListBuilder;

/// A byte list written from a `&str`
#[derive(Debug, Clone, Copy)]
pub struct TextBuilder<'a> {
    bytes: Uint8ListBuilder<'a>,
}

impl<'a> TextBuilder<'a> {
    pub fn new(list: ListBuilder<'a>) -> Result<Self> {
        Ok(Self {
            bytes: Uint8ListBuilder::new(list)?,
        })
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the stored bytes
    pub fn text(&self) -> Result<String> {
        let bytes = self.bytes.to_vec()?;
        Ok(std::str::from_utf8(&bytes)?.to_owned())
    }

    pub fn as_bytes(&self) -> Uint8ListBuilder<'a> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use crate::message::MessageBuilder;

    #[test]
    fn test_text_field() {
        let message = MessageBuilder::with_defaults().unwrap();
        let root = message.init_root(16).unwrap();

        let text = root.set_text(0, "héllo").unwrap();
        assert_eq!(text.len(), 6);
        assert_eq!(text.text().unwrap(), "héllo");

        let empty = root.set_text(8, "").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.text().unwrap(), "");
    }
}
