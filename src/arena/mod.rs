//! Segment arena: growable, append-only backing storage for one message
//!
//! A message is stored in one or more [`Segment`]s owned by a
//! [`SegmentSet`]. Builders never hold memory themselves; they address the
//! set through `(segment, offset)` pairs via the [`BuilderArena`] handle.

pub mod builder_arena;
pub mod config;
pub mod segment;
pub mod segment_set;
pub mod stats;

// Re-export main types
pub use builder_arena::BuilderArena;
pub use config::{AllocationStrategy, ArenaConfig, ArenaConfigBuilder};
pub use segment::{align_to_word, Segment, SegmentId};
pub use segment_set::SegmentSet;
pub use stats::ArenaStats;
