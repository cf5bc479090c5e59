use serde::{Deserialize, Serialize};

use crate::types::{TimelineMode, Topology};

/// Checkpoint spacing used when none is configured.
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 10;

/// Construction-time configuration for a history.
///
/// Missing fields fall back to their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub mode: TimelineMode,
    pub topology: Topology,
    /// Spacing between stored snapshots. Only read in hybrid mode.
    pub checkpoint_interval: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            mode: TimelineMode::default(),
            topology: Topology::default(),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
        }
    }
}

impl HistoryConfig {
    pub fn new(mode: TimelineMode, topology: Topology) -> Self {
        Self {
            mode,
            topology,
            ..Self::default()
        }
    }

    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }
}
