//! Element width classes and primitive scalar encoding

use serde::{Deserialize, Serialize};

use crate::{
    config::WORD_SIZE,
    error::{Result, TesseraError},
};

/// Logical width class of a list element, stored as a 3-bit tag in list
/// pointers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ElementSize {
    Void = 0,
    Bit = 1,
    Byte = 2,
    TwoBytes = 3,
    FourBytes = 4,
    EightBytes = 5,
    /// Each element is a pointer word
    Pointer = 6,
    /// Each element is a fixed-size struct laid out inline
    InlineComposite = 7,
}

impl ElementSize {
    /// Decode a 3-bit tag
    pub fn from_tag(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => Self::Void,
            1 => Self::Bit,
            2 => Self::Byte,
            3 => Self::TwoBytes,
            4 => Self::FourBytes,
            5 => Self::EightBytes,
            6 => Self::Pointer,
            7 => Self::InlineComposite,
            _ => {
                return Err(TesseraError::invalid_pointer(format!(
                    "unknown element size tag {}",
                    tag
                )))
            }
        })
    }

    /// Tag stored on the wire
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Bits of data per element; zero for void and inline composites
    pub const fn data_bits(self) -> usize {
        match self {
            Self::Void => 0,
            Self::Bit => 1,
            Self::Byte => 8,
            Self::TwoBytes => 16,
            Self::FourBytes => 32,
            Self::EightBytes | Self::Pointer => 64,
            Self::InlineComposite => 0,
        }
    }

    /// Whole bytes per element; zero for void, bit and inline composites
    pub const fn byte_width(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::TwoBytes => 2,
            Self::FourBytes => 4,
            Self::EightBytes | Self::Pointer => WORD_SIZE,
            Self::Void | Self::Bit | Self::InlineComposite => 0,
        }
    }

    /// Scalar width class for an element of `bytes` bytes
    pub fn for_width(bytes: usize) -> Option<Self> {
        match bytes {
            0 => Some(Self::Void),
            1 => Some(Self::Byte),
            2 => Some(Self::TwoBytes),
            4 => Some(Self::FourBytes),
            8 => Some(Self::EightBytes),
            _ => None,
        }
    }

    /// Human-readable name for diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bit => "bit",
            Self::Byte => "byte",
            Self::TwoBytes => "two-byte",
            Self::FourBytes => "four-byte",
            Self::EightBytes => "eight-byte",
            Self::Pointer => "pointer",
            Self::InlineComposite => "inline-composite",
        }
    }

    /// Bytes occupied by `length` elements, before word alignment and
    /// excluding the inline-composite header word
    pub fn body_bytes(self, length: usize, struct_size: usize) -> Option<usize> {
        match self {
            Self::Void => Some(0),
            Self::Bit => Some(length.div_ceil(8)),
            Self::InlineComposite => length.checked_mul(struct_size),
            _ => length.checked_mul(self.byte_width()),
        }
    }
}

/// A scalar that can be stored in a struct field or a list element
///
/// `read_le`/`write_le` expect slices of at least `WIDTH` bytes; callers
/// bounds-check before handing them out.
pub trait Primitive: Copy + Default + PartialEq + std::fmt::Debug + 'static {
    /// Width class of a list of this type
    const ELEMENT_SIZE: ElementSize;
    /// Bytes per value
    const WIDTH: usize = Self::ELEMENT_SIZE.byte_width();

    fn read_le(bytes: &[u8]) -> Self;

    fn write_le(self, bytes: &mut [u8]);
}

macro_rules! impl_primitive {
    ($($ty:ty => $size:ident),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const ELEMENT_SIZE: ElementSize = ElementSize::$size;

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
                    <$ty>::from_le_bytes(buf)
                }

                #[inline]
                fn write_le(self, bytes: &mut [u8]) {
                    bytes[..std::mem::size_of::<$ty>()].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_primitive! {
    u8 => Byte,
    i8 => Byte,
    u16 => TwoBytes,
    i16 => TwoBytes,
    u32 => FourBytes,
    i32 => FourBytes,
    f32 => FourBytes,
    u64 => EightBytes,
    i64 => EightBytes,
    f64 => EightBytes,
}
