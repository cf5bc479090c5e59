use std::cell::Cell;

use crate::codec::{PatchOps, PatchSupport};
use crate::entry::Entry;
use crate::error::HistoryError;
use retrace_common::{DEFAULT_CHECKPOINT_INTERVAL, TimelineMode};

/// Reconstruction counters, for instrumentation and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Patches applied by `snapshot_at` over the timeline's lifetime.
    pub patches_replayed: u64,
    /// Patches applied by the most recent `snapshot_at` call.
    pub last_distance: usize,
}

/// Indexable, appendable log of history entries with a cursor.
///
/// Writes truncate any entries after the cursor first, so the log is linear;
/// branching lives one layer up.
#[derive(Debug, Clone)]
pub struct Timeline<Snap, P> {
    entries: Vec<Entry<Snap, P>>,
    cursor: Option<usize>,
    mode: TimelineMode,
    checkpoint_interval: usize,
    /// Snapshot at the last entry, kept even when the entry itself stores none.
    latest: Option<Snap>,
    patches: PatchSupport<Snap, P>,
    stats: Cell<ReplayStats>,
}

impl<Snap: Clone, P: Clone> Timeline<Snap, P> {
    /// Create an empty timeline.
    ///
    /// Fails if `mode` needs patches but `patches` is `SnapshotsOnly`, or if a
    /// hybrid timeline is given a zero checkpoint interval.
    pub fn new(
        mode: TimelineMode,
        checkpoint_interval: usize,
        patches: PatchSupport<Snap, P>,
    ) -> Result<Self, HistoryError> {
        if mode == TimelineMode::Hybrid && checkpoint_interval == 0 {
            return Err(HistoryError::InvalidCheckpointInterval);
        }
        let patches = match (mode, patches) {
            (TimelineMode::Full, _) => PatchSupport::SnapshotsOnly,
            (_, PatchSupport::SnapshotsOnly) => {
                return Err(HistoryError::MissingCapability {
                    capability: "apply_patch",
                    mode,
                });
            }
            (_, support) => support,
        };
        Ok(Self {
            entries: Vec::new(),
            cursor: None,
            mode,
            checkpoint_interval,
            latest: None,
            patches,
            stats: Cell::new(ReplayStats::default()),
        })
    }

    /// A timeline that stores every entry as a full snapshot.
    pub fn full() -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            mode: TimelineMode::Full,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            latest: None,
            patches: PatchSupport::SnapshotsOnly,
            stats: Cell::new(ReplayStats::default()),
        }
    }

    /// A patch or hybrid timeline replaying with `ops`.
    pub fn with_patches(
        mode: TimelineMode,
        checkpoint_interval: usize,
        ops: PatchOps<Snap, P>,
    ) -> Result<Self, HistoryError> {
        Self::new(mode, checkpoint_interval, PatchSupport::Patches(ops))
    }

    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position; `None` only while the timeline is empty.
    pub fn index(&self) -> Option<usize> {
        self.cursor
    }

    /// Whether the cursor sits on the last entry (trivially true when empty).
    pub fn is_at_present(&self) -> bool {
        self.cursor == self.entries.len().checked_sub(1)
    }

    pub fn entry(&self, index: usize) -> Option<&Entry<Snap, P>> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[Entry<Snap, P>] {
        &self.entries
    }

    /// Snapshot at the last entry.
    pub fn latest(&self) -> Option<&Snap> {
        self.latest.as_ref()
    }

    /// Number of entries whose snapshot was stored at write time.
    pub fn checkpoint_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_checkpoint()).count()
    }

    pub fn replay_stats(&self) -> ReplayStats {
        self.stats.get()
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> Result<&Snap, HistoryError> {
        let index = self.cursor.ok_or(HistoryError::Empty)?;
        self.snapshot_at(index)
    }

    /// Append a full snapshot after the cursor, discarding any redo tail.
    pub fn push_full(&mut self, snapshot: Snap, label: Option<String>) -> usize {
        self.drop_tail();
        let index = self.entries.len();
        self.entries.push(Entry::new_full(index, snapshot.clone(), label));
        self.latest = Some(snapshot);
        self.cursor = Some(index);
        tracing::debug!(index, mode = %self.mode, "pushed full snapshot");
        index
    }

    /// Append a patch after the cursor, discarding any redo tail.
    ///
    /// The resulting snapshot is computed now so the next diff has a baseline;
    /// it is kept on the entry only at hybrid checkpoints.
    pub fn push_patch(&mut self, patch: P, label: Option<String>) -> Result<usize, HistoryError> {
        let ops = match &self.patches {
            PatchSupport::Patches(ops) => ops.clone(),
            PatchSupport::SnapshotsOnly => return Err(HistoryError::PatchesDisabled),
        };
        let cursor = self.cursor.ok_or(HistoryError::NoBaseline)?;

        let next = {
            let base = if self.is_at_present() {
                self.latest.as_ref().ok_or(HistoryError::NoBaseline)?
            } else {
                self.snapshot_at(cursor)?
            };
            ops.apply(base, &patch)
        };

        self.drop_tail();
        let index = self.entries.len();
        let checkpoint = match self.mode {
            TimelineMode::Hybrid if index % self.checkpoint_interval == 0 => Some(next.clone()),
            _ => None,
        };
        let stored = checkpoint.is_some();
        self.entries.push(Entry::new_patch(index, patch, checkpoint, label));
        self.latest = Some(next);
        self.cursor = Some(index);
        tracing::debug!(index, checkpoint = stored, "pushed patch");
        Ok(index)
    }

    /// Reconstruct the snapshot at `index`.
    ///
    /// Replays forward from the nearest earlier snapshot, memoizing every
    /// intermediate result so later reads of the range are free.
    pub fn snapshot_at(&self, index: usize) -> Result<&Snap, HistoryError> {
        let entry = self.entries.get(index).ok_or(HistoryError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })?;
        if let Some(snapshot) = entry.snapshot() {
            self.record_replay(0);
            return Ok(snapshot);
        }

        let PatchSupport::Patches(ops) = &self.patches else {
            return Err(HistoryError::Unreconstructable { index });
        };
        let (base, mut current) = self.entries[..index]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, e)| e.snapshot().map(|s| (i, s)))
            .ok_or(HistoryError::Unreconstructable { index })?;

        for entry in &self.entries[base + 1..=index] {
            let patch = entry.patch().ok_or(HistoryError::Unreconstructable {
                index: entry.index(),
            })?;
            current = entry.memoize(ops.apply(current, patch));
        }

        let distance = index - base;
        tracing::trace!(index, from = base, distance, "replayed patches");
        self.record_replay(distance);
        Ok(current)
    }

    /// Move the cursor one entry forward.
    pub fn step_forward(&mut self) -> bool {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                true
            }
            _ => false,
        }
    }

    /// Move the cursor one entry back.
    pub fn step_backward(&mut self) -> bool {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                true
            }
            _ => false,
        }
    }

    /// Move the cursor by `offset`, clamped to the timeline. Returns whether it moved.
    pub fn step_by(&mut self, offset: isize) -> bool {
        let Some(c) = self.cursor else {
            return false;
        };
        let last = self.entries.len() - 1;
        let target = c.saturating_add_signed(offset).min(last);
        self.cursor = Some(target);
        target != c
    }

    /// Move the cursor to an absolute index.
    pub fn go_to(&mut self, index: usize) -> Result<(), HistoryError> {
        if index >= self.entries.len() {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.cursor = Some(index);
        Ok(())
    }

    pub fn go_to_start(&mut self) -> bool {
        self.jump(0)
    }

    pub fn go_to_end(&mut self) -> bool {
        match self.entries.len().checked_sub(1) {
            Some(last) => self.jump(last),
            None => false,
        }
    }

    /// Drop every entry after the cursor and recompute `latest`.
    /// Returns the number of entries dropped.
    pub fn truncate_future(&mut self) -> Result<usize, HistoryError> {
        let Some(cursor) = self.cursor else {
            return Ok(0);
        };
        let latest = self.snapshot_at(cursor)?.clone();
        let dropped = self.drop_tail();
        self.latest = Some(latest);
        Ok(dropped)
    }

    /// Drop every memoized snapshot, keeping checkpoints.
    pub fn clear_cache(&mut self) {
        for entry in &mut self.entries {
            entry.clear_cache();
        }
    }

    /// Independent copy of entries `0..=at`, with the cursor on `at`.
    ///
    /// Entries are deep-copied, so filling caches on either timeline never
    /// shows up on the other.
    pub fn fork_at(&self, at: usize) -> Result<Self, HistoryError> {
        let latest = self.snapshot_at(at)?.clone();
        Ok(Self {
            entries: self.entries[..=at].to_vec(),
            cursor: Some(at),
            mode: self.mode,
            checkpoint_interval: self.checkpoint_interval,
            latest: Some(latest),
            patches: self.patches.clone(),
            stats: Cell::new(ReplayStats::default()),
        })
    }

    fn jump(&mut self, index: usize) -> bool {
        if self.entries.is_empty() || self.cursor == Some(index) {
            return false;
        }
        self.cursor = Some(index);
        true
    }

    fn drop_tail(&mut self) -> usize {
        let keep = self.cursor.map_or(0, |c| c + 1);
        let dropped = self.entries.len().saturating_sub(keep);
        if dropped > 0 {
            self.entries.truncate(keep);
            tracing::debug!(dropped, kept = keep, "truncated redo history");
        }
        dropped
    }

    fn record_replay(&self, distance: usize) {
        let mut stats = self.stats.get();
        stats.patches_replayed += distance as u64;
        stats.last_distance = distance;
        self.stats.set(stats);
    }
}
