//! Pointer words and how they are followed
//!
//! Every reference from a struct or pointer list to a child region is one
//! little-endian 64-bit word:
//!
//! ```text
//!  63                    35 34  32 31                       2 1  0
//! +------------------------+------+--------------------------+----+
//! | struct: size in words                | target word offset | 00 |
//! | list:   element count  | size |      | target word offset | 01 |
//! | far:    target segment id            | landing pad offset | 10 |
//! +------------------------+------+--------------------------+----+
//! ```
//!
//! Offsets are absolute word offsets inside the target's segment. A far
//! pointer names another segment and the landing pad: an ordinary struct or
//! list pointer stored there, directly in front of the target. The all-zero
//! word is the null pointer. Inline-composite lists start with a header word
//! (low half: element count, high half: struct size in words).

use super::element::ElementSize;
use crate::{
    arena::SegmentId,
    config::{MAX_LIST_LENGTH, MAX_WORD_OFFSET, WORD_SIZE},
    error::{Result, TesseraError},
};

const KIND_STRUCT: u32 = 0;
const KIND_LIST: u32 = 1;
const KIND_FAR: u32 = 2;

/// Decoded pointer word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirePointer {
    Null,
    Struct {
        offset_words: u32,
        size_words: u32,
    },
    List {
        offset_words: u32,
        element_size: ElementSize,
        count: u32,
    },
    Far {
        pad_words: u32,
        segment: SegmentId,
    },
}

impl WirePointer {
    /// Pointer to a struct of `size_bytes` at `offset_bytes`
    pub fn struct_at(offset_bytes: usize, size_bytes: usize) -> Result<Self> {
        Ok(Self::Struct {
            offset_words: word_offset(offset_bytes)?,
            size_words: struct_words(size_bytes)?,
        })
    }

    /// Pointer to a list whose body (or composite header) is at `offset_bytes`
    pub fn list_at(offset_bytes: usize, element_size: ElementSize, count: usize) -> Result<Self> {
        Ok(Self::List {
            offset_words: word_offset(offset_bytes)?,
            element_size,
            count: list_count(count)?,
        })
    }

    /// Far pointer to a landing pad at `pad_bytes` in `segment`
    pub fn far(segment: SegmentId, pad_bytes: usize) -> Result<Self> {
        Ok(Self::Far {
            pad_words: word_offset(pad_bytes)?,
            segment,
        })
    }

    pub fn encode(self) -> u64 {
        let (lower, upper) = match self {
            Self::Null => return 0,
            Self::Struct {
                offset_words,
                size_words,
            } => ((offset_words << 2) | KIND_STRUCT, size_words),
            Self::List {
                offset_words,
                element_size,
                count,
            } => (
                (offset_words << 2) | KIND_LIST,
                (count << 3) | element_size.tag() as u32,
            ),
            Self::Far { pad_words, segment } => ((pad_words << 2) | KIND_FAR, segment),
        };
        ((upper as u64) << 32) | lower as u64
    }

    pub fn decode(word: u64) -> Result<Self> {
        if word == 0 {
            return Ok(Self::Null);
        }

        let lower = word as u32;
        let upper = (word >> 32) as u32;
        let target = lower >> 2;

        match lower & 0b11 {
            KIND_STRUCT => Ok(Self::Struct {
                offset_words: target,
                size_words: upper,
            }),
            KIND_LIST => Ok(Self::List {
                offset_words: target,
                element_size: ElementSize::from_tag((upper & 0b111) as u8)?,
                count: upper >> 3,
            }),
            KIND_FAR => Ok(Self::Far {
                pad_words: target,
                segment: upper,
            }),
            _ => Err(TesseraError::invalid_pointer(format!(
                "reserved pointer kind in word {:#018x}",
                word
            ))),
        }
    }

    pub fn is_null(self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Encode the header word in front of an inline-composite list body
pub fn composite_header(count: usize, struct_size: usize) -> Result<u64> {
    let count = list_count(count)?;
    let words = struct_words(struct_size)?;
    Ok(((words as u64) << 32) | count as u64)
}

/// Anything pointers can be followed through: the builder arena or a set of
/// finished segments
pub trait WordSource {
    fn read_word(&self, segment: SegmentId, offset: usize) -> Result<u64>;
}

/// Where a struct lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructLocation {
    pub segment: SegmentId,
    pub offset: usize,
    pub size: usize,
}

/// Where a list's elements live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLocation {
    pub segment: SegmentId,
    /// Offset of element 0 (past the composite header, if any)
    pub offset: usize,
    pub element_size: ElementSize,
    /// Bytes per element; zero for bit and void lists
    pub step: usize,
    pub length: usize,
}

/// Read the pointer at `(segment, slot)`, following a far pointer to its
/// landing pad. The returned pointer is never `Far`.
pub fn resolve<S: WordSource + ?Sized>(
    source: &S,
    segment: SegmentId,
    slot: usize,
) -> Result<(SegmentId, WirePointer)> {
    match WirePointer::decode(source.read_word(segment, slot)?)? {
        WirePointer::Far {
            pad_words,
            segment: target,
        } => {
            let pad = WirePointer::decode(source.read_word(target, pad_words as usize * WORD_SIZE)?)?;
            match pad {
                WirePointer::Far { .. } | WirePointer::Null => Err(TesseraError::invalid_pointer(
                    format!("landing pad in segment {} is not a direct pointer", target),
                )),
                direct => Ok((target, direct)),
            }
        }
        direct => Ok((segment, direct)),
    }
}

/// Follow a struct pointer; `None` for an unset slot
pub fn locate_struct<S: WordSource + ?Sized>(
    source: &S,
    segment: SegmentId,
    slot: usize,
) -> Result<Option<StructLocation>> {
    match resolve(source, segment, slot)? {
        (_, WirePointer::Null) => Ok(None),
        (
            segment,
            WirePointer::Struct {
                offset_words,
                size_words,
            },
        ) => Ok(Some(StructLocation {
            segment,
            offset: offset_words as usize * WORD_SIZE,
            size: size_words as usize * WORD_SIZE,
        })),
        (_, other) => Err(TesseraError::invalid_pointer(format!(
            "expected struct pointer, found {:?}",
            other
        ))),
    }
}

/// Follow a list pointer; `None` for an unset slot
pub fn locate_list<S: WordSource + ?Sized>(
    source: &S,
    segment: SegmentId,
    slot: usize,
) -> Result<Option<ListLocation>> {
    let (segment, offset_words, element_size, count) = match resolve(source, segment, slot)? {
        (_, WirePointer::Null) => return Ok(None),
        (
            segment,
            WirePointer::List {
                offset_words,
                element_size,
                count,
            },
        ) => (segment, offset_words, element_size, count),
        (_, other) => {
            return Err(TesseraError::invalid_pointer(format!(
                "expected list pointer, found {:?}",
                other
            )))
        }
    };

    let start = offset_words as usize * WORD_SIZE;
    let length = count as usize;

    if element_size != ElementSize::InlineComposite {
        return Ok(Some(ListLocation {
            segment,
            offset: start,
            element_size,
            step: element_size.byte_width(),
            length,
        }));
    }

    let header = source.read_word(segment, start)?;
    let header_count = (header & 0xffff_ffff) as usize;
    if header_count != length {
        return Err(TesseraError::invalid_pointer(format!(
            "composite header counts {} elements, pointer says {}",
            header_count, length
        )));
    }

    Ok(Some(ListLocation {
        segment,
        offset: start + WORD_SIZE,
        element_size,
        step: (header >> 32) as usize * WORD_SIZE,
        length,
    }))
}

fn word_offset(offset_bytes: usize) -> Result<u32> {
    if offset_bytes % WORD_SIZE != 0 {
        return Err(TesseraError::invalid_pointer(format!(
            "target offset {} is not word aligned",
            offset_bytes
        )));
    }
    let words = offset_bytes / WORD_SIZE;
    if words > MAX_WORD_OFFSET {
        return Err(TesseraError::SizeLimit {
            what: "word offset",
            value: words as u64,
            max: MAX_WORD_OFFSET as u64,
        });
    }
    Ok(words as u32)
}

fn struct_words(size_bytes: usize) -> Result<u32> {
    if size_bytes % WORD_SIZE != 0 {
        return Err(TesseraError::misaligned("struct size", size_bytes));
    }
    u32::try_from(size_bytes / WORD_SIZE).map_err(|_| TesseraError::SizeLimit {
        what: "struct words",
        value: (size_bytes / WORD_SIZE) as u64,
        max: u32::MAX as u64,
    })
}

fn list_count(count: usize) -> Result<u32> {
    if count > MAX_LIST_LENGTH {
        return Err(TesseraError::SizeLimit {
            what: "list length",
            value: count as u64,
            max: MAX_LIST_LENGTH as u64,
        });
    }
    Ok(count as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Words(Vec<Vec<u64>>);

    impl WordSource for Words {
        fn read_word(&self, segment: SegmentId, offset: usize) -> Result<u64> {
            self.0
                .get(segment as usize)
                .and_then(|s| s.get(offset / WORD_SIZE))
                .copied()
                .ok_or_else(|| TesseraError::invalid_pointer("out of bounds"))
        }
    }

    #[test]
    fn test_pointer_encoding() {
        let ptr = WirePointer::struct_at(16, 24).unwrap();
        assert_eq!(ptr.encode(), (3u64 << 32) | (2 << 2));
        assert_eq!(WirePointer::decode(ptr.encode()).unwrap(), ptr);

        let ptr = WirePointer::list_at(8, ElementSize::Byte, 5).unwrap();
        assert_eq!(ptr.encode(), (((5u64 << 3) | 2) << 32) | (1 << 2) | 1);
        assert_eq!(WirePointer::decode(ptr.encode()).unwrap(), ptr);

        let ptr = WirePointer::far(3, 40).unwrap();
        assert_eq!(ptr.encode(), (3u64 << 32) | (5 << 2) | 2);
        assert_eq!(WirePointer::decode(ptr.encode()).unwrap(), ptr);

        assert_eq!(WirePointer::decode(0).unwrap(), WirePointer::Null);
        assert!(WirePointer::decode(3).is_err());
    }

    #[test]
    fn test_pointer_limits() {
        assert!(WirePointer::struct_at(4, 8).is_err());
        assert!(WirePointer::struct_at(8, 12).is_err());
        assert!(WirePointer::list_at(0, ElementSize::Byte, MAX_LIST_LENGTH + 1).is_err());
        assert!(WirePointer::list_at(0, ElementSize::Byte, MAX_LIST_LENGTH).is_ok());
    }

    #[test]
    fn test_resolve_far_pointer() {
        let pad = WirePointer::list_at(8, ElementSize::Byte, 3).unwrap().encode();
        let far = WirePointer::far(1, 0).unwrap().encode();
        let words = Words(vec![vec![far], vec![pad, 0]]);

        let (segment, ptr) = resolve(&words, 0, 0).unwrap();
        assert_eq!(segment, 1);
        assert!(matches!(ptr, WirePointer::List { count: 3, .. }));

        let list = locate_list(&words, 0, 0).unwrap().unwrap();
        assert_eq!(list.segment, 1);
        assert_eq!(list.offset, 8);
        assert_eq!(list.length, 3);
        assert_eq!(list.step, 1);
    }

    #[test]
    fn test_far_to_far_is_rejected() {
        let far = WirePointer::far(1, 0).unwrap().encode();
        let words = Words(vec![vec![far], vec![far]]);
        assert!(resolve(&words, 0, 0).is_err());
    }

    #[test]
    fn test_locate_composite_list() {
        let ptr = WirePointer::list_at(8, ElementSize::InlineComposite, 2).unwrap().encode();
        let header = composite_header(2, 16).unwrap();
        let words = Words(vec![vec![ptr, header, 0, 0, 0, 0]]);

        let list = locate_list(&words, 0, 0).unwrap().unwrap();
        assert_eq!(list.offset, 16);
        assert_eq!(list.step, 16);
        assert_eq!(list.length, 2);

        assert!(locate_struct(&words, 0, 0).is_err());
    }

    #[test]
    fn test_null_slots() {
        let words = Words(vec![vec![0]]);
        assert!(locate_struct(&words, 0, 0).unwrap().is_none());
        assert!(locate_list(&words, 0, 0).unwrap().is_none());
    }
}
