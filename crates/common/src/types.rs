use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a branch of history.
///
/// Ids are plain integers so that branches order numerically; the root branch
/// is always `BranchId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchId(pub u32);

impl BranchId {
    /// The branch every history starts on.
    pub const ROOT: Self = Self(0);

    /// The id allocated after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for BranchId {
    fn default() -> Self {
        Self::ROOT
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction in which a patch is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Apply the `next` side of each change.
    Forward,
    /// Apply the `previous` side of each change.
    Backward,
}

/// Storage policy of a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineMode {
    /// Every entry stores a full snapshot.
    Full,
    /// Only entry 0 stores a snapshot; every later entry carries a patch.
    Patch,
    /// Patches with a stored checkpoint snapshot every `checkpoint_interval` entries.
    #[default]
    Hybrid,
}

impl TimelineMode {
    /// Whether this mode needs patch capabilities from the codec.
    pub fn uses_patches(self) -> bool {
        !matches!(self, Self::Full)
    }
}

impl fmt::Display for TimelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Full => "full",
            Self::Patch => "patch",
            Self::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// Shape of history when committing from the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Single history; committing from the past discards the redo tail.
    #[default]
    Linear,
    /// Committing from the past forks a new branch and keeps the old tail.
    Branching,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linear => "linear",
            Self::Branching => "branching",
        })
    }
}
