//! Commit and travel steps shared by `TimeMachine` and `StateHistory`.

use retrace_common::Direction;
use retrace_timeline::{CapabilitySet, HistoryError, PatchSupport, Timeline};

/// What committing a snapshot would write.
pub(crate) enum Pending<P> {
    Full,
    Patch(P),
    /// The snapshot matches the baseline; nothing to write.
    Unchanged,
}

/// Decide how `snapshot` goes into `timeline` without touching it.
///
/// The baseline is the tip when the cursor is at the present, otherwise the
/// snapshot under the cursor.
pub(crate) fn plan<S, Snap: Clone, P: Clone>(
    caps: &CapabilitySet<S, Snap, P>,
    timeline: &Timeline<Snap, P>,
    snapshot: &Snap,
) -> Result<Pending<P>, HistoryError> {
    if timeline.is_empty() {
        return Ok(Pending::Full);
    }
    match caps.patches() {
        PatchSupport::SnapshotsOnly => Ok(Pending::Full),
        PatchSupport::Patches(ops) => {
            let baseline = if timeline.is_at_present() {
                timeline.latest().ok_or(HistoryError::NoBaseline)?
            } else {
                timeline.current()?
            };
            let patch = ops.diff(baseline, snapshot);
            if caps.is_empty_patch(&patch) {
                Ok(Pending::Unchanged)
            } else {
                Ok(Pending::Patch(patch))
            }
        }
    }
}

/// Write a planned commit. Returns the new entry's index, if one was written.
pub(crate) fn write<Snap: Clone, P: Clone>(
    timeline: &mut Timeline<Snap, P>,
    snapshot: Snap,
    pending: Pending<P>,
    label: Option<String>,
) -> Result<Option<usize>, HistoryError> {
    match pending {
        Pending::Full => Ok(Some(timeline.push_full(snapshot, label))),
        Pending::Patch(patch) => timeline.push_patch(patch, label).map(Some),
        Pending::Unchanged => Ok(None),
    }
}

/// Bring `state` in line with `timeline` after its cursor moved away from `from`.
///
/// A move across exactly one patch entry is replayed in place when the codec
/// can patch state; anything else overwrites the state from a snapshot.
pub(crate) fn sync_state<S, Snap: Clone, P: Clone>(
    caps: &CapabilitySet<S, Snap, P>,
    timeline: &Timeline<Snap, P>,
    from: usize,
    state: &mut S,
) -> Result<(), HistoryError> {
    let to = timeline.index().ok_or(HistoryError::Empty)?;
    let crossed = if to == from + 1 {
        Some((to, Direction::Forward))
    } else if to + 1 == from {
        Some((from, Direction::Backward))
    } else {
        None
    };

    if let Some((index, direction)) = crossed.filter(|_| caps.can_patch_state()) {
        if let Some(patch) = timeline.entry(index).and_then(|e| e.patch()) {
            caps.apply_patch_to_state(patch, direction, state);
            tracing::trace!(index, ?direction, "patched live state in place");
            return Ok(());
        }
    }

    let snapshot = timeline.current()?;
    caps.apply_snapshot(snapshot, state);
    Ok(())
}
