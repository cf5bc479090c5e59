use crate::machine::{MachineError, TimeMachine};
use crate::sync;
use retrace_common::TimelineMode;
use retrace_timeline::{CapabilitySet, Codec, HistoryError, Timeline};

/// Anything that can record a state into history.
pub trait StateRecorder {
    type State;
    type Error;

    /// Record `state`. Returns whether a new entry was written; an unchanged
    /// state is not recorded.
    fn record(&mut self, state: &Self::State) -> Result<bool, Self::Error>;
}

/// Linear, record-only history for a state the caller keeps.
///
/// Recording behind the tip drops the redo tail.
pub struct StateHistory<S, Snap, P> {
    caps: CapabilitySet<S, Snap, P>,
    timeline: Timeline<Snap, P>,
}

impl<S, Snap: Clone, P: Clone> StateHistory<S, Snap, P> {
    pub fn new(
        codec: Codec<S, Snap, P>,
        mode: TimelineMode,
        checkpoint_interval: usize,
    ) -> Result<Self, HistoryError> {
        let caps = codec.resolve(mode)?;
        let timeline = caps.timeline(checkpoint_interval)?;
        Ok(Self { caps, timeline })
    }

    /// Record `state` with a label.
    pub fn record_labeled(&mut self, state: &S, label: &str) -> Result<bool, HistoryError> {
        self.record_inner(state, Some(label.to_owned()))
    }

    /// Step back and write the earlier snapshot onto `state`.
    pub fn undo(&mut self, state: &mut S) -> Result<bool, HistoryError> {
        self.travel(state, Timeline::step_backward)
    }

    /// Step forward and write the later snapshot onto `state`.
    pub fn redo(&mut self, state: &mut S) -> Result<bool, HistoryError> {
        self.travel(state, Timeline::step_forward)
    }

    pub fn go_to(&mut self, index: usize, state: &mut S) -> Result<(), HistoryError> {
        let len = self.timeline.len();
        if index >= len {
            return Err(HistoryError::IndexOutOfRange { index, len });
        }
        self.travel(state, |t| t.go_to(index).is_ok())?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.timeline.index()
    }

    pub fn is_at_present(&self) -> bool {
        self.timeline.is_at_present()
    }

    pub fn current(&self) -> Result<&Snap, HistoryError> {
        self.timeline.current()
    }

    pub fn timeline(&self) -> &Timeline<Snap, P> {
        &self.timeline
    }

    fn record_inner(&mut self, state: &S, label: Option<String>) -> Result<bool, HistoryError> {
        let snapshot = self.caps.create_snapshot(state);
        let pending = sync::plan(&self.caps, &self.timeline, &snapshot)?;
        let written = sync::write(&mut self.timeline, snapshot, pending, label)?;
        Ok(written.is_some())
    }

    fn travel(
        &mut self,
        state: &mut S,
        step: impl FnOnce(&mut Timeline<Snap, P>) -> bool,
    ) -> Result<bool, HistoryError> {
        let Some(from) = self.timeline.index() else {
            return Ok(false);
        };
        if !step(&mut self.timeline) {
            return Ok(false);
        }
        sync::sync_state(&self.caps, &self.timeline, from, state)?;
        Ok(true)
    }
}

impl<S, Snap: Clone, P: Clone> StateRecorder for StateHistory<S, Snap, P> {
    type State = S;
    type Error = HistoryError;

    fn record(&mut self, state: &S) -> Result<bool, HistoryError> {
        self.record_inner(state, None)
    }
}

/// Recording replaces the machine's live state, then commits it.
impl<S: Clone, Snap: Clone, P: Clone> StateRecorder for TimeMachine<S, Snap, P> {
    type State = S;
    type Error = MachineError;

    fn record(&mut self, state: &S) -> Result<bool, MachineError> {
        self.state_mut().clone_from(state);
        let (_, written) = self.commit_entry(None)?;
        Ok(written.is_some())
    }
}
