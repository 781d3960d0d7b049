//! Struct and list builders over the segment arena
//!
//! Builders are positional views: an arena reference plus a
//! `(segment, offset)` pair. All allocation goes through [`PointerSlot`],
//! which writes the pointer word for a child region the moment the region is
//! reserved.

pub mod element;
pub mod lists;
pub mod slot;
pub mod structs;
pub mod wire;

// Re-export main types
pub use element::{ElementSize, Primitive};
pub use lists::{ElementRef, ListBuilder};
pub use slot::{checked_length, PointerSlot};
pub use structs::StructBuilder;
pub use wire::{ListLocation, StructLocation, WirePointer, WordSource};
