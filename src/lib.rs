//! # Tessera - Segment-Based Zero-Copy Message Builder
//!
//! Tessera builds structured messages directly in their final byte layout.
//! Memory comes from an append-only set of word-aligned segments that grows
//! on demand; nothing already written is ever moved or copied.
//!
//! ## Features
//!
//! - **Growable segment arena**: fixed-size or geometrically growing segments
//! - **Stable addresses**: regions never relocate once handed out
//! - **Struct and list builders**: fixed-size structs, scalar, bit, pointer and struct lists
//! - **Far pointers**: references across segments through landing pads
//! - **Typed wrappers**: compile-time element widths, text, generated accessors
//! - **In-place reader**: walk finished segments without copying
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  schema: define_struct!  │  typed: list wrappers │
//! ├──────────────────────────────────────────────────┤
//! │  layout: StructBuilder, ListBuilder, pointers    │
//! ├──────────────────────────────────────────────────┤
//! │  arena: SegmentSet ── Segment 0 │ 1 │ ... │ n    │
//! └──────────────────────────────────────────────────┘
//!           │ finish()                  ▲
//!           ▼                           │
//! ┌─────────────────┐      ┌────────────────────────┐
//! │ FinishedMessage │ ───▶ │ reader: MessageReader  │
//! └─────────────────┘      └────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tessera::{ElementSize, MessageBuilder};
//!
//! let message = MessageBuilder::with_defaults()?;
//! let root = message.init_root(16)?;
//! root.set::<u32>(0, 7)?;
//! root.new_list(8, ElementSize::Byte, 5)?
//!     .copy_from_slice(&[0u8, 1, 2, 3, 4])?;
//!
//! let finished = message.finish()?;
//! let reader = finished.reader();
//! let list = reader.root()?.get_primitive_list::<u8>(8)?;
//! assert_eq!(list.to_vec()?, vec![0, 1, 2, 3, 4]);
//! # Ok::<(), tessera::TesseraError>(())
//! ```

pub mod arena;
pub mod error;
pub mod layout;
pub mod message;
pub mod reader;
pub mod schema;
pub mod typed;

pub use arena::{
    AllocationStrategy, ArenaConfig, ArenaConfigBuilder, ArenaStats, BuilderArena, Segment,
    SegmentId, SegmentSet,
};
pub use error::{Result, TesseraError};
pub use layout::{ElementSize, ListBuilder, PointerSlot, Primitive, StructBuilder, WirePointer};
pub use message::{FinishedMessage, MessageBuilder};
pub use reader::{ListReader, MessageReader, PrimitiveListReader, StructReader};
pub use schema::StructSchema;
pub use typed::{
    BitListBuilder, PointerListBuilder, PrimitiveListBuilder, StructListBuilder, TextBuilder,
    Uint8ListBuilder,
};

#[doc(hidden)]
pub use paste::paste as __paste;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Layout and sizing constants
pub mod config {
    use crate::arena::SegmentId;

    /// Allocation granularity and pointer size, in bytes
    pub const WORD_SIZE: usize = 8;

    /// Default capacity of segment 0 (1KB)
    pub const DEFAULT_FIRST_SEGMENT_SIZE: usize = 1024;

    /// Default lower bound for segments opened after the first (1KB)
    pub const DEFAULT_MIN_SEGMENT_SIZE: usize = 1024;

    /// Default upper bound for grown segments (1MB)
    pub const DEFAULT_MAX_SEGMENT_SIZE: usize = 1 << 20;

    /// Default multiplier applied to the previous segment size
    pub const DEFAULT_GROWTH_FACTOR: usize = 2;

    /// Largest word offset a pointer can carry
    pub const MAX_WORD_OFFSET: usize = (1 << 30) - 1;

    /// Largest segment a pointer can address
    pub const MAX_SEGMENT_BYTES: usize = (MAX_WORD_OFFSET + 1) * WORD_SIZE;

    /// Largest element count a list pointer can carry
    pub const MAX_LIST_LENGTH: usize = (1 << 29) - 1;

    /// Segment holding the root pointer
    pub const ROOT_SEGMENT: SegmentId = 0;

    /// Byte offset of the root pointer within its segment
    pub const ROOT_POINTER_OFFSET: usize = 0;
}
