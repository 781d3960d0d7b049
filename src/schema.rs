//! # Generated struct accessors
//!
//! [`define_struct!`](crate::define_struct) turns a struct description into a
//! unit marker type plus `<Name>Builder<'a>` and `<Name>Reader<'a>` wrappers.
//! The wrappers hold a [`StructBuilder`](crate::layout::StructBuilder) or
//! [`StructReader`](crate::reader::StructReader) and expose one method per
//! field; all allocation stays in the layout layer.
//!
//! ### Usage
//!
//! ```
//! use tessera::{define_struct, message::MessageBuilder};
//!
//! define_struct! {
//!     /// A string as a list of bytes
//!     pub struct Str (size = 8) {
//!         chars: list(u8) @ 0,
//!     }
//! }
//!
//! let message = MessageBuilder::with_defaults()?;
//! let s = StrBuilder::init_root(&message)?;
//! let chars = s.init_chars(5)?;
//! chars.copy_from_slice(b"hello")?;
//!
//! let finished = message.finish()?;
//! let reader = finished.reader();
//! let s = StrReader::root(&reader)?;
//! assert_eq!(s.chars()?.to_vec()?, b"hello".to_vec());
//! # Ok::<(), tessera::TesseraError>(())
//! ```
//!
//! ### Field kinds
//!
//! | kind               | `@` position     | builder methods                    |
//! |--------------------|------------------|------------------------------------|
//! | `prim(T)`          | byte offset      | `field()`, `set_field(v)`          |
//! | `bool`             | bit offset       | `field()`, `set_field(v)`          |
//! | `text`             | pointer slot     | `field()`, `set_field(&str)`       |
//! | `list(T)`          | pointer slot     | `field()`, `init_field(len)`       |
//! | `bits`             | pointer slot     | `field()`, `init_field(len)`       |
//! | `structure(Other)` | pointer slot     | `field()`, `init_field()`          |
//! | `structs(Other)`   | pointer slot     | `field()`, `init_field(len)`       |

/// Compile-time facts about a generated struct type
pub trait StructSchema {
    /// Struct size in bytes
    const SIZE: usize;
    /// Name given in the definition
    const NAME: &'static str;
}

/// Generates a struct marker type with builder and reader accessors.
#[macro_export]
macro_rules! define_struct {
    (@builder $lt:lifetime, $field:ident, prim($ty:ty), $at:expr) => {
        $crate::__paste! {
            #[inline]
            pub fn $field(&self) -> $crate::Result<$ty> {
                self.inner.get::<$ty>($at)
            }

            #[inline]
            pub fn [<set_ $field>](&self, value: $ty) -> $crate::Result<()> {
                self.inner.set::<$ty>($at, value)
            }
        }
    };
    (@builder $lt:lifetime, $field:ident, bool, $at:expr) => {
        $crate::__paste! {
            #[inline]
            pub fn $field(&self) -> $crate::Result<bool> {
                self.inner.get_bool($at)
            }

            #[inline]
            pub fn [<set_ $field>](&self, value: bool) -> $crate::Result<()> {
                self.inner.set_bool($at, value)
            }
        }
    };
    (@builder $lt:lifetime, $field:ident, text, $at:expr) => {
        $crate::__paste! {
            pub fn $field(&self) -> $crate::Result<Option<$crate::typed::TextBuilder<$lt>>> {
                self.inner
                    .get_list($at)?
                    .map($crate::typed::TextBuilder::new)
                    .transpose()
            }

            pub fn [<set_ $field>](&self, text: &str) -> $crate::Result<$crate::typed::TextBuilder<$lt>> {
                self.inner.set_text($at, text)
            }
        }
    };
    (@builder $lt:lifetime, $field:ident, list($ty:ty), $at:expr) => {
        $crate::__paste! {
            pub fn $field(
                &self,
            ) -> $crate::Result<Option<$crate::typed::PrimitiveListBuilder<$lt, $ty>>> {
                self.inner
                    .get_list($at)?
                    .map($crate::typed::PrimitiveListBuilder::new)
                    .transpose()
            }

            pub fn [<init_ $field>](
                &self,
                length: i64,
            ) -> $crate::Result<$crate::typed::PrimitiveListBuilder<$lt, $ty>> {
                $crate::typed::PrimitiveListBuilder::new(self.inner.new_list(
                    $at,
                    <$ty as $crate::layout::Primitive>::ELEMENT_SIZE,
                    length,
                )?)
            }
        }
    };
    (@builder $lt:lifetime, $field:ident, bits, $at:expr) => {
        $crate::__paste! {
            pub fn $field(&self) -> $crate::Result<Option<$crate::typed::BitListBuilder<$lt>>> {
                self.inner
                    .get_list($at)?
                    .map($crate::typed::BitListBuilder::new)
                    .transpose()
            }

            pub fn [<init_ $field>](&self, length: i64) -> $crate::Result<$crate::typed::BitListBuilder<$lt>> {
                $crate::typed::BitListBuilder::new(
                    self.inner.new_list($at, $crate::layout::ElementSize::Bit, length)?,
                )
            }
        }
    };
    (@builder $lt:lifetime, $field:ident, structure($other:ident), $at:expr) => {
        $crate::__paste! {
            pub fn $field(&self) -> $crate::Result<Option<[<$other Builder>]<$lt>>> {
                self.inner
                    .get_struct($at)?
                    .map([<$other Builder>]::new)
                    .transpose()
            }

            pub fn [<init_ $field>](&self) -> $crate::Result<[<$other Builder>]<$lt>> {
                [<$other Builder>]::new(self.inner.new_struct(
                    $at,
                    <$other as $crate::schema::StructSchema>::SIZE,
                )?)
            }
        }
    };
    (@builder $lt:lifetime, $field:ident, structs($other:ident), $at:expr) => {
        $crate::__paste! {
            pub fn $field(&self) -> $crate::Result<Option<$crate::typed::StructListBuilder<$lt>>> {
                match self.inner.get_list($at)? {
                    Some(list) => Ok(Some($crate::typed::StructListBuilder::new(
                        list,
                        <$other as $crate::schema::StructSchema>::SIZE,
                    )?)),
                    None => Ok(None),
                }
            }

            pub fn [<init_ $field>](&self, length: i64) -> $crate::Result<$crate::typed::StructListBuilder<$lt>> {
                let size = <$other as $crate::schema::StructSchema>::SIZE;
                $crate::typed::StructListBuilder::new(
                    self.inner.new_struct_list($at, size, length)?,
                    size,
                )
            }
        }
    };

    (@reader $lt:lifetime, $field:ident, prim($ty:ty), $at:expr) => {
        #[inline]
        pub fn $field(&self) -> $crate::Result<$ty> {
            self.inner.get::<$ty>($at)
        }
    };
    (@reader $lt:lifetime, $field:ident, bool, $at:expr) => {
        #[inline]
        pub fn $field(&self) -> $crate::Result<bool> {
            self.inner.get_bool($at)
        }
    };
    (@reader $lt:lifetime, $field:ident, text, $at:expr) => {
        pub fn $field(&self) -> $crate::Result<&$lt str> {
            self.inner.get_text($at)
        }
    };
    (@reader $lt:lifetime, $field:ident, list($ty:ty), $at:expr) => {
        pub fn $field(&self) -> $crate::Result<$crate::reader::PrimitiveListReader<$lt, $ty>> {
            self.inner.get_primitive_list::<$ty>($at)
        }
    };
    (@reader $lt:lifetime, $field:ident, bits, $at:expr) => {
        pub fn $field(&self) -> $crate::Result<$crate::reader::ListReader<$lt>> {
            self.inner.get_list($at, $crate::layout::ElementSize::Bit)
        }
    };
    (@reader $lt:lifetime, $field:ident, structure($other:ident), $at:expr) => {
        $crate::__paste! {
            pub fn $field(&self) -> $crate::Result<Option<[<$other Reader>]<$lt>>> {
                self.inner
                    .get_struct($at)?
                    .map([<$other Reader>]::new)
                    .transpose()
            }
        }
    };
    (@reader $lt:lifetime, $field:ident, structs($other:ident), $at:expr) => {
        pub fn $field(&self) -> $crate::Result<$crate::reader::ListReader<$lt>> {
            self.inner
                .get_list($at, $crate::layout::ElementSize::InlineComposite)
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident (size = $size:expr) {
            $( $field:ident : $kind:ident $( ( $($arg:tt)* ) )? @ $at:expr ),* $(,)?
        }
    ) => {
        $crate::__paste! {
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            $vis struct $name;

            impl $crate::schema::StructSchema for $name {
                const SIZE: usize = $size;
                const NAME: &'static str = stringify!($name);
            }

            #[doc = "Builder view of `" $name "`"]
            #[derive(Debug, Clone, Copy)]
            $vis struct [<$name Builder>]<'a> {
                inner: $crate::layout::StructBuilder<'a>,
            }

            impl<'a> [<$name Builder>]<'a> {
                /// Struct size in bytes
                pub const K_SIZE: usize = $size;

                /// Wrap a struct region of exactly `K_SIZE` bytes
                pub fn new(inner: $crate::layout::StructBuilder<'a>) -> $crate::Result<Self> {
                    if inner.size() != $size {
                        return Err($crate::TesseraError::struct_size_mismatch($size, inner.size()));
                    }
                    Ok(Self { inner })
                }

                /// Allocate this struct as the message root
                pub fn init_root(message: &'a $crate::message::MessageBuilder) -> $crate::Result<Self> {
                    Self::new(message.init_root($size)?)
                }

                /// Reopen the message root as this struct
                pub fn get_root(message: &'a $crate::message::MessageBuilder) -> $crate::Result<Option<Self>> {
                    message.get_root()?.map(Self::new).transpose()
                }

                pub fn as_struct(&self) -> $crate::layout::StructBuilder<'a> {
                    self.inner
                }

                $( $crate::define_struct!(@builder 'a, $field, $kind $( ( $($arg)* ) )?, $at); )*
            }

            #[doc = "Reader view of `" $name "`"]
            #[derive(Debug, Clone, Copy)]
            $vis struct [<$name Reader>]<'a> {
                inner: $crate::reader::StructReader<'a>,
            }

            impl<'a> [<$name Reader>]<'a> {
                /// Wrap a struct region of exactly `SIZE` bytes
                pub fn new(inner: $crate::reader::StructReader<'a>) -> $crate::Result<Self> {
                    if inner.size() != $size {
                        return Err($crate::TesseraError::struct_size_mismatch($size, inner.size()));
                    }
                    Ok(Self { inner })
                }

                /// Read the message root as this struct
                pub fn root(message: &'a $crate::reader::MessageReader<'a>) -> $crate::Result<Self> {
                    Self::new(message.root()?)
                }

                pub fn as_struct(&self) -> $crate::reader::StructReader<'a> {
                    self.inner
                }

                $( $crate::define_struct!(@reader 'a, $field, $kind $( ( $($arg)* ) )?, $at); )*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::StructSchema;
    use crate::{arena::ArenaConfig, message::MessageBuilder, Result};

    crate::define_struct! {
        /// Fixed-size header
        pub struct Header (size = 16) {
            id: prim(u64) @ 0,
            flags: prim(u16) @ 8,
            urgent: bool @ 80,
        }
    }

    crate::define_struct! {
        pub struct Packet (size = 40) {
            header: structure(Header) @ 0,
            payload: list(u8) @ 8,
            name: text @ 16,
            acks: bits @ 24,
            parts: structs(Header) @ 32,
        }
    }

    #[test]
    fn test_schema_constants() {
        assert_eq!(Header::SIZE, 16);
        assert_eq!(Packet::NAME, "Packet");
        assert_eq!(PacketBuilder::K_SIZE, 40);
    }

    #[test]
    fn test_generated_round_trip() -> Result<()> {
        let message = MessageBuilder::new(ArenaConfig::new(32))?;
        let packet = PacketBuilder::init_root(&message)?;

        let header = packet.init_header()?;
        header.set_id(7)?;
        header.set_flags(0b101)?;
        header.set_urgent(true)?;

        packet.init_payload(4)?.copy_from_slice(&[9, 8, 7, 6])?;
        packet.set_name("heartbeat")?;
        packet.init_acks(3)?.set(1, true)?;
        let parts = packet.init_parts(2)?;
        HeaderBuilder::new(parts.get(1)?)?.set_id(99)?;

        assert!(packet.init_header().is_err());
        assert_eq!(packet.header()?.unwrap().id()?, 7);
        assert_eq!(packet.name()?.unwrap().text()?, "heartbeat");
        assert_eq!(packet.parts()?.unwrap().len(), 2);

        let finished = message.finish()?;
        let reader = finished.reader();
        let packet = PacketReader::root(&reader)?;

        let header = packet.header()?.unwrap();
        assert_eq!(header.id()?, 7);
        assert_eq!(header.flags()?, 0b101);
        assert!(header.urgent()?);
        assert_eq!(packet.payload()?.to_vec()?, vec![9, 8, 7, 6]);
        assert_eq!(packet.name()?, "heartbeat");
        assert!(packet.acks()?.get_bool(1)?);
        let parts = packet.parts()?;
        assert_eq!(HeaderReader::new(parts.struct_at(1)?)?.id()?, 99);
        Ok(())
    }

    #[test]
    fn test_wrong_size_is_rejected() -> Result<()> {
        let message = MessageBuilder::with_defaults()?;
        let root = message.init_root(8)?;
        assert!(HeaderBuilder::new(root).is_err());
        assert!(HeaderBuilder::get_root(&message).is_err());
        Ok(())
    }

    #[test]
    fn test_unset_fields() -> Result<()> {
        let message = MessageBuilder::with_defaults()?;
        let packet = PacketBuilder::init_root(&message)?;
        assert!(packet.header()?.is_none());
        assert!(packet.payload()?.is_none());

        let finished = message.finish()?;
        let reader = finished.reader();
        let packet = PacketReader::root(&reader)?;
        assert!(packet.header()?.is_none());
        assert!(packet.payload()?.is_empty());
        assert_eq!(packet.name()?, "");
        Ok(())
    }
}
