use retrace_common::TimelineMode;

/// Precondition violations raised by timelines and codec resolution.
///
/// Every operation that returns one of these has left the timeline unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("{mode} mode requires the `{capability}` capability")]
    MissingCapability {
        capability: &'static str,
        mode: TimelineMode,
    },
    #[error("checkpoint interval must be at least 1")]
    InvalidCheckpointInterval,
    #[error("patch entries are not allowed in full mode")]
    PatchesDisabled,
    #[error("no snapshot to apply a patch to")]
    NoBaseline,
    #[error("index {index} out of range for timeline of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("timeline is empty")]
    Empty,
    #[error("entry {index} has neither a snapshot nor a patch")]
    Unreconstructable { index: usize },
}
