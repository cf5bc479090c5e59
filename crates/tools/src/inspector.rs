use std::time::{Duration, SystemTime};

use retrace_common::{BranchId, TimelineMode};
use retrace_machine::{Branch, TimeMachine};
use retrace_timeline::{Entry, Timeline};

/// History inspector for developer tooling.
///
/// Provides read-only queries against timelines and time machines for
/// debugging and the CLI.
pub struct HistoryInspector;

impl HistoryInspector {
    /// Produce a summary of a timeline.
    pub fn summary<Snap: Clone, P: Clone>(timeline: &Timeline<Snap, P>) -> TimelineSummary {
        TimelineSummary {
            mode: timeline.mode(),
            len: timeline.len(),
            cursor: timeline.index(),
            checkpoints: timeline.checkpoint_count(),
            cached: timeline
                .entries()
                .iter()
                .filter(|e| !e.is_checkpoint() && e.snapshot().is_some())
                .count(),
            patches_replayed: timeline.replay_stats().patches_replayed,
        }
    }

    /// Describe every entry of a timeline, oldest first.
    pub fn entries<Snap: Clone, P: Clone>(timeline: &Timeline<Snap, P>) -> Vec<EntryInfo> {
        let start = timeline
            .entries()
            .first()
            .map_or(SystemTime::UNIX_EPOCH, |e| e.timestamp());
        timeline
            .entries()
            .iter()
            .map(|e| EntryInfo::from_entry(e, timeline.index() == Some(e.index()), start))
            .collect()
    }

    /// Describe one branch.
    pub fn branch<Snap: Clone, P: Clone>(branch: &Branch<Snap, P>, active: bool) -> BranchInfo {
        BranchInfo {
            id: branch.id(),
            parent: branch.parent(),
            fork_index: branch.fork_index(),
            label: branch.label().map(str::to_owned),
            len: branch.timeline().len(),
            cursor: branch.timeline().index(),
            active,
        }
    }

    /// Describe every branch of a machine in ascending id order.
    pub fn branches<S, Snap: Clone, P: Clone>(machine: &TimeMachine<S, Snap, P>) -> Vec<BranchInfo> {
        let active = machine.branch_id();
        machine
            .branches()
            .map(|b| Self::branch(b, b.id() == active))
            .collect()
    }

    /// One character per entry, with the cursor in brackets.
    ///
    /// `F` full snapshot, `C` checkpointed patch, `*` patch with a memoized
    /// snapshot, `.` bare patch.
    pub fn scrubber<Snap: Clone, P: Clone>(timeline: &Timeline<Snap, P>) -> String {
        let mut out = String::with_capacity(timeline.len() + 2);
        for info in Self::entries(timeline) {
            let mark = info.kind.mark(info.cached);
            if info.at_cursor {
                out.push('[');
                out.push(mark);
                out.push(']');
            } else {
                out.push(mark);
            }
        }
        out
    }
}

/// Summary of one timeline for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSummary {
    pub mode: TimelineMode,
    pub len: usize,
    pub cursor: Option<usize>,
    pub checkpoints: usize,
    /// Non-checkpoint entries whose snapshot has been reconstructed.
    pub cached: usize,
    pub patches_replayed: u64,
}

impl std::fmt::Display for TimelineSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cursor = self
            .cursor
            .map_or_else(|| "-".to_owned(), |c| c.to_string());
        write!(
            f,
            "Timeline: mode={} len={} cursor={} checkpoints={} cached={} replayed={}",
            self.mode, self.len, cursor, self.checkpoints, self.cached, self.patches_replayed
        )
    }
}

/// How an entry stores its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Full,
    CheckpointedPatch,
    Patch,
}

impl EntryKind {
    fn mark(self, cached: bool) -> char {
        match self {
            Self::Full => 'F',
            Self::CheckpointedPatch => 'C',
            Self::Patch if cached => '*',
            Self::Patch => '.',
        }
    }
}

/// Detailed info about a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub index: usize,
    pub kind: EntryKind,
    pub cached: bool,
    pub label: Option<String>,
    pub at_cursor: bool,
    /// Time since the first entry was written.
    pub elapsed: Duration,
}

impl EntryInfo {
    fn from_entry<Snap, P>(entry: &Entry<Snap, P>, at_cursor: bool, start: SystemTime) -> Self {
        let kind = match (entry.patch().is_some(), entry.is_checkpoint()) {
            (false, _) => EntryKind::Full,
            (true, true) => EntryKind::CheckpointedPatch,
            (true, false) => EntryKind::Patch,
        };
        Self {
            index: entry.index(),
            kind,
            cached: entry.snapshot().is_some(),
            label: entry.label().map(str::to_owned),
            at_cursor,
            // The wall clock may step backwards between writes.
            elapsed: entry.timestamp().duration_since(start).unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for EntryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cursor = if self.at_cursor { ">" } else { " " };
        write!(
            f,
            "{cursor} #{:<4} +{}ms {:?}",
            self.index,
            self.elapsed.as_millis(),
            self.kind
        )?;
        if let Some(label) = &self.label {
            write!(f, " \"{label}\"")?;
        }
        Ok(())
    }
}

/// Detailed info about a single branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub id: BranchId,
    pub parent: Option<BranchId>,
    pub fork_index: Option<usize>,
    pub label: Option<String>,
    pub len: usize,
    pub cursor: Option<usize>,
    pub active: bool,
}

impl std::fmt::Display for BranchInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = if self.active { "*" } else { " " };
        write!(f, "{marker} Branch {} len={}", self.id, self.len)?;
        if let Some(c) = self.cursor {
            write!(f, " cursor={c}")?;
        }
        if let (Some(parent), Some(at)) = (self.parent, self.fork_index) {
            write!(f, " forked from {parent} at {at}")?;
        }
        if let Some(label) = &self.label {
            write!(f, " \"{label}\"")?;
        }
        Ok(())
    }
}
