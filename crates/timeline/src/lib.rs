//! Timeline: an indexable, appendable log of history entries with a cursor.
//!
//! # Invariants
//! - Entry 0 always carries a snapshot; every other entry carries a snapshot, a patch, or both.
//! - An entry's patch never changes; its snapshot cell is filled at most once.
//! - `latest` always equals the snapshot reconstructed at the last entry.
//! - Failed operations leave the timeline untouched.

pub mod codec;
mod entry;
mod error;
mod timeline;

pub use codec::{CapabilitySet, Codec, PatchOps, PatchSupport};
pub use entry::Entry;
pub use error::HistoryError;
pub use retrace_common::{DEFAULT_CHECKPOINT_INTERVAL, Direction, TimelineMode};
pub use timeline::{ReplayStats, Timeline};
