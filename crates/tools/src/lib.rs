//! Developer tooling: read-only views of recorded history.
//!
//! # Invariants
//! - Inspection never moves a cursor or fills a snapshot cache.

mod inspector;

pub use inspector::{BranchInfo, EntryInfo, EntryKind, HistoryInspector, TimelineSummary};
