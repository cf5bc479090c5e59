//! Time machine: binds a live state to branching history.
//!
//! # Invariants
//! - The live state always equals the snapshot at the active branch's cursor,
//!   as of the last commit or travel call.
//! - A fork deep-copies its parent's prefix; branches never share entries.
//! - Branches are never removed.
//! - Every failed call leaves history and the live state untouched.

mod branch;
mod machine;
mod recorder;
mod sync;

pub use branch::Branch;
pub use machine::{MachineError, TimeMachine};
pub use recorder::{StateHistory, StateRecorder};
pub use retrace_common::{BranchId, Direction, HistoryConfig, TimelineMode, Topology};
pub use retrace_timeline::{Codec, HistoryError, Timeline};
