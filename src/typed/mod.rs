//! Typed list wrappers
//!
//! Each wrapper holds a [`ListBuilder`](crate::layout::ListBuilder) and
//! narrows it to one element type. Wrappers never allocate; construction
//! fails when the list's element width does not match the wrapper's.

pub mod bits;
pub mod pointers;
pub mod primitive;
pub mod structs;
pub mod text;

// Re-export main types
pub use bits::BitListBuilder;
pub use pointers::PointerListBuilder;
pub use primitive::{PrimitiveListBuilder, Uint8ListBuilder};
pub use structs::StructListBuilder;
pub use text::TextBuilder;
