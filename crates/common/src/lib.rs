//! Shared types used across the retrace workspace.
//!
//! # Invariants
//! - Branch ids are allocated in ascending order and never reused.
//! - Configuration defaults match the engine defaults (hybrid, linear, interval 10).

mod config;
mod types;

pub use config::{DEFAULT_CHECKPOINT_INTERVAL, HistoryConfig};
pub use types::{BranchId, Direction, TimelineMode, Topology};
