use std::collections::BTreeMap;

use crate::branch::Branch;
use crate::sync::{self, Pending};
use retrace_common::{BranchId, HistoryConfig, TimelineMode, Topology};
use retrace_timeline::{CapabilitySet, Codec, HistoryError, Timeline};

/// Errors from time machine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    #[error("branch {0} does not exist")]
    UnknownBranch(BranchId),
    #[error("branch operations need branching topology, history is {0}")]
    BranchingDisabled(Topology),
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Branching history bound to a live state.
///
/// The machine owns the state. Callers mutate it through [`state_mut`] and
/// then [`commit`]; travel calls write reconstructed snapshots back onto it.
///
/// [`state_mut`]: TimeMachine::state_mut
/// [`commit`]: TimeMachine::commit
pub struct TimeMachine<S, Snap, P> {
    caps: CapabilitySet<S, Snap, P>,
    config: HistoryConfig,
    branches: BTreeMap<BranchId, Branch<Snap, P>>,
    active: BranchId,
    next_id: BranchId,
    state: S,
}

impl<S, Snap: Clone, P: Clone> TimeMachine<S, Snap, P> {
    /// Resolve `codec` against `config` and start an empty root branch.
    ///
    /// Nothing is recorded until the first [`commit`](Self::commit).
    pub fn new(
        codec: Codec<S, Snap, P>,
        config: HistoryConfig,
        state: S,
    ) -> Result<Self, MachineError> {
        let caps = codec.resolve(config.mode)?;
        let timeline = caps.timeline(config.checkpoint_interval)?;
        let mut branches = BTreeMap::new();
        branches.insert(BranchId::ROOT, Branch::root(timeline));
        tracing::debug!(mode = %config.mode, topology = %config.topology, "time machine ready");
        Ok(Self {
            caps,
            config,
            branches,
            active: BranchId::ROOT,
            next_id: BranchId::ROOT.next(),
            state,
        })
    }

    /// Record the live state.
    ///
    /// In branching topology a commit made behind the tip forks a new branch
    /// holding the prefix up to the cursor. A commit that changes nothing is
    /// dropped. Returns the snapshot of the live state.
    pub fn commit(&mut self, label: Option<&str>) -> Result<Snap, MachineError> {
        self.commit_entry(label).map(|(snapshot, _)| snapshot)
    }

    /// Like `commit`, also returning the index of the entry written, if any.
    pub(crate) fn commit_entry(
        &mut self,
        label: Option<&str>,
    ) -> Result<(Snap, Option<usize>), MachineError> {
        let _span = tracing::debug_span!("commit", branch = %self.active).entered();
        let snapshot = self.caps.create_snapshot(&self.state);
        let pending = sync::plan(&self.caps, self.timeline(), &snapshot)?;
        if matches!(pending, Pending::Unchanged) {
            tracing::debug!("commit changed nothing, skipped");
            return Ok((snapshot, None));
        }

        if self.config.topology == Topology::Branching && !self.timeline().is_at_present() {
            let at = self.timeline().index().ok_or(HistoryError::Empty)?;
            self.fork_active(at)?;
        }

        let timeline = &mut self.active_branch_mut()?.timeline;
        let index = sync::write(timeline, snapshot.clone(), pending, label.map(str::to_owned))?;
        Ok((snapshot, index))
    }

    pub fn go_to_start(&mut self) -> Result<bool, MachineError> {
        self.travel(Timeline::go_to_start)
    }

    pub fn go_to_end(&mut self) -> Result<bool, MachineError> {
        self.travel(Timeline::go_to_end)
    }

    /// Jump to `index` on the active branch.
    pub fn go_to(&mut self, index: usize) -> Result<(), MachineError> {
        let len = self.len();
        if index >= len {
            return Err(HistoryError::IndexOutOfRange { index, len }.into());
        }
        self.travel(|t| t.go_to(index).is_ok())?;
        Ok(())
    }

    /// Undo. Returns false at the start of history.
    pub fn step_backward(&mut self) -> Result<bool, MachineError> {
        self.travel(Timeline::step_backward)
    }

    /// Redo. Returns false at the tip.
    pub fn step_forward(&mut self) -> Result<bool, MachineError> {
        self.travel(Timeline::step_forward)
    }

    /// Move by `offset`, clamped to the active branch.
    pub fn step_by(&mut self, offset: isize) -> Result<bool, MachineError> {
        self.travel(|t| t.step_by(offset))
    }

    pub fn next_branch(&mut self) -> Result<bool, MachineError> {
        self.cycle_branch(1)
    }

    pub fn previous_branch(&mut self) -> Result<bool, MachineError> {
        self.cycle_branch(-1)
    }

    /// Switch to the branch `offset` places away in ascending id order,
    /// wrapping around. Returns false when that is the active branch.
    pub fn cycle_branch(&mut self, offset: isize) -> Result<bool, MachineError> {
        self.require_branching()?;
        let ids: Vec<BranchId> = self.branches.keys().copied().collect();
        let position = ids
            .iter()
            .position(|id| *id == self.active)
            .ok_or(MachineError::UnknownBranch(self.active))?;
        let len = ids.len() as isize;
        let step = offset.rem_euclid(len);
        let target = ids[(position as isize + step).rem_euclid(len) as usize];
        self.switch_branch(target)
    }

    /// Make `id` the active branch and overwrite the live state with its
    /// cursor snapshot. Returns false if it already was active.
    pub fn switch_branch(&mut self, id: BranchId) -> Result<bool, MachineError> {
        let branch = self
            .branches
            .get(&id)
            .ok_or(MachineError::UnknownBranch(id))?;
        if id == self.active {
            return Ok(false);
        }
        // Branches may have diverged arbitrarily since the fork: overwrite, never patch.
        if !branch.timeline.is_empty() {
            let snapshot = branch.timeline.current()?;
            self.caps.apply_snapshot(snapshot, &mut self.state);
        }
        tracing::debug!(from = %self.active, to = %id, "switched branch");
        self.active = id;
        Ok(true)
    }

    /// Fork a new branch from `from` at `index` and switch to it.
    pub fn fork(&mut self, from: BranchId, index: usize) -> Result<BranchId, MachineError> {
        self.require_branching()?;
        let id = self.fork_from(from, index)?;
        let snapshot = self.branches[&id].timeline.current()?;
        self.caps.apply_snapshot(snapshot, &mut self.state);
        Ok(id)
    }

    /// Rename a branch. `None` clears the label.
    pub fn set_branch_label(
        &mut self,
        id: BranchId,
        label: Option<&str>,
    ) -> Result<(), MachineError> {
        let branch = self
            .branches
            .get_mut(&id)
            .ok_or(MachineError::UnknownBranch(id))?;
        branch.set_label(label.map(str::to_owned));
        Ok(())
    }

    /// Entries on the active branch.
    pub fn len(&self) -> usize {
        self.timeline().len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline().is_empty()
    }

    /// Cursor on the active branch; `None` before the first commit.
    pub fn index(&self) -> Option<usize> {
        self.timeline().index()
    }

    pub fn is_at_present(&self) -> bool {
        self.timeline().is_at_present()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Id of the active branch.
    pub fn branch_id(&self) -> BranchId {
        self.active
    }

    pub fn branch(&self, id: BranchId) -> Option<&Branch<Snap, P>> {
        self.branches.get(&id)
    }

    /// All branches in ascending id order.
    pub fn branches(&self) -> impl Iterator<Item = &Branch<Snap, P>> {
        self.branches.values()
    }

    pub fn active_branch(&self) -> &Branch<Snap, P> {
        &self.branches[&self.active]
    }

    /// Timeline of the active branch.
    pub fn timeline(&self) -> &Timeline<Snap, P> {
        &self.active_branch().timeline
    }

    /// Snapshot under the cursor of the active branch.
    pub fn current_snapshot(&self) -> Result<&Snap, MachineError> {
        Ok(self.timeline().current()?)
    }

    pub fn mode(&self) -> TimelineMode {
        self.config.mode
    }

    pub fn topology(&self) -> Topology {
        self.config.topology
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the live state. Changes become history on the next commit.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }

    fn active_branch_mut(&mut self) -> Result<&mut Branch<Snap, P>, MachineError> {
        self.branches
            .get_mut(&self.active)
            .ok_or(MachineError::UnknownBranch(self.active))
    }

    /// Move the active cursor with `step`, then sync the live state.
    fn travel(
        &mut self,
        step: impl FnOnce(&mut Timeline<Snap, P>) -> bool,
    ) -> Result<bool, MachineError> {
        let active = self.active;
        let branch = self
            .branches
            .get_mut(&active)
            .ok_or(MachineError::UnknownBranch(active))?;
        let Some(from) = branch.timeline.index() else {
            return Ok(false);
        };
        if !step(&mut branch.timeline) {
            return Ok(false);
        }
        sync::sync_state(&self.caps, &branch.timeline, from, &mut self.state)?;
        tracing::debug!(branch = %active, from, to = ?branch.timeline.index(), "travelled");
        Ok(true)
    }

    fn fork_active(&mut self, at: usize) -> Result<BranchId, MachineError> {
        self.fork_from(self.active, at)
    }

    fn fork_from(&mut self, parent: BranchId, at: usize) -> Result<BranchId, MachineError> {
        let source = self
            .branches
            .get(&parent)
            .ok_or(MachineError::UnknownBranch(parent))?;
        let timeline = source.timeline.fork_at(at)?;
        let id = self.next_id;
        self.next_id = id.next();
        self.branches
            .insert(id, Branch::forked(id, parent, at, timeline));
        self.active = id;
        tracing::debug!(%parent, branch = %id, fork_index = at, "forked branch");
        Ok(id)
    }

    fn require_branching(&self) -> Result<(), MachineError> {
        match self.config.topology {
            Topology::Branching => Ok(()),
            Topology::Linear => Err(MachineError::BranchingDisabled(Topology::Linear)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrace_patch::{
        Delta, Direction, FieldPatch, GridPatch, all_empty, apply_grid, apply_grid_in_place,
        diff_field, diff_grid,
    };
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Board {
        cells: Vec<u8>,
        winner: Option<u8>,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct BoardPatch {
        cells: GridPatch<u8>,
        winner: FieldPatch<Option<u8>>,
    }

    impl Delta for BoardPatch {
        fn is_empty(&self) -> bool {
            all_empty(&[&self.cells, &self.winner])
        }
    }

    fn board(cells: &[u8]) -> Board {
        Board {
            cells: cells.to_vec(),
            winner: None,
        }
    }

    fn codec() -> Codec<Board, Board, BoardPatch> {
        Codec::new(|s: &Board| s.clone(), |snap: &Board, s: &mut Board| *s = snap.clone())
            .with_patches(
                |a: &Board, b: &Board| BoardPatch {
                    cells: diff_grid(&a.cells, &b.cells),
                    winner: diff_field(&a.winner, &b.winner),
                },
                |base: &Board, p: &BoardPatch| Board {
                    cells: apply_grid(&base.cells, &p.cells, Direction::Forward),
                    winner: p.winner.apply(&base.winner, Direction::Forward),
                },
            )
            .with_empty_check(|p: &BoardPatch| p.is_empty())
    }

    fn machine(mode: TimelineMode, topology: Topology) -> TimeMachine<Board, Board, BoardPatch> {
        TimeMachine::new(codec(), HistoryConfig::new(mode, topology), board(&[0, 0, 0, 0])).unwrap()
    }

    fn commit_cells(m: &mut TimeMachine<Board, Board, BoardPatch>, cells: &[u8]) {
        m.state_mut().cells = cells.to_vec();
        m.commit(None).unwrap();
    }

    #[test]
    fn starts_empty_on_root() {
        let m = machine(TimelineMode::Patch, Topology::Linear);
        assert_eq!(m.len(), 0);
        assert_eq!(m.index(), None);
        assert_eq!(m.branch_count(), 1);
        assert_eq!(m.branch_id(), BranchId::ROOT);
        assert!(m.is_at_present());
    }

    #[test]
    fn missing_capability_fails_construction() {
        let bare: Codec<Board, Board, BoardPatch> =
            Codec::new(|s: &Board| s.clone(), |snap: &Board, s: &mut Board| *s = snap.clone());
        let result = TimeMachine::new(bare, HistoryConfig::default(), Board::default());
        assert!(matches!(
            result.err(),
            Some(MachineError::History(HistoryError::MissingCapability { .. }))
        ));
    }

    #[test]
    fn first_commit_is_full_snapshot() {
        let mut m = machine(TimelineMode::Patch, Topology::Linear);
        let snap = m.commit(Some("start")).unwrap();
        assert_eq!(snap, board(&[0, 0, 0, 0]));
        let entry = m.timeline().entry(0).unwrap();
        assert!(entry.is_checkpoint());
        assert!(entry.patch().is_none());
        assert_eq!(entry.label(), Some("start"));
    }

    #[test]
    fn full_mode_stores_every_snapshot() {
        let codec: Codec<Board, Board, BoardPatch> =
            Codec::new(|s: &Board| s.clone(), |snap: &Board, s: &mut Board| *s = snap.clone());
        let mut m = TimeMachine::new(
            codec,
            HistoryConfig::new(TimelineMode::Full, Topology::Linear),
            board(&[0]),
        )
        .unwrap();
        m.commit(None).unwrap();
        m.state_mut().cells = vec![1];
        m.commit(None).unwrap();
        // Without an emptiness check identical commits are still recorded.
        m.commit(None).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m.timeline().checkpoint_count(), 3);
    }

    #[test]
    fn concrete_scenario() {
        let mut m = machine(TimelineMode::Patch, Topology::Linear);
        m.commit(None).unwrap();
        commit_cells(&mut m, &[1, 0, 0, 0]);
        let patch = m.timeline().entry(1).unwrap().patch().unwrap();
        assert_eq!(patch.cells.len(), 1);
        let change = &patch.cells.changes()[0];
        assert_eq!((change.index, change.previous, change.next), (0, 0, 1));
        commit_cells(&mut m, &[1, 1, 0, 0]);

        assert!(m.step_backward().unwrap());
        assert!(m.step_backward().unwrap());
        assert_eq!(m.state(), &board(&[0, 0, 0, 0]));
        assert_eq!(m.current_snapshot().unwrap(), &board(&[0, 0, 0, 0]));

        commit_cells(&mut m, &[1, 0, 1, 0]);
        assert_eq!(m.len(), 2);
        assert_eq!(m.timeline().snapshot_at(1).unwrap(), &board(&[1, 0, 1, 0]));
    }

    #[test]
    fn identical_commit_is_suppressed() {
        let mut m = machine(TimelineMode::Hybrid, Topology::Linear);
        m.commit(None).unwrap();
        commit_cells(&mut m, &[2, 0, 0, 0]);
        let snap = m.commit(Some("noop")).unwrap();
        assert_eq!(snap, board(&[2, 0, 0, 0]));
        assert_eq!(m.len(), 2);
        assert_eq!(m.index(), Some(1));
    }

    #[test]
    fn suppressed_commit_in_the_past_keeps_redo_tail() {
        let mut m = machine(TimelineMode::Patch, Topology::Linear);
        m.commit(None).unwrap();
        commit_cells(&mut m, &[1, 0, 0, 0]);
        m.step_backward().unwrap();
        m.commit(None).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.index(), Some(0));
    }

    fn four_states(m: &mut TimeMachine<Board, Board, BoardPatch>) {
        m.commit(None).unwrap();
        commit_cells(m, &[1, 0, 0, 0]);
        commit_cells(m, &[1, 2, 0, 0]);
        commit_cells(m, &[1, 2, 3, 0]);
    }

    #[test]
    fn linear_commit_truncates_redo() {
        let mut m = machine(TimelineMode::Patch, Topology::Linear);
        four_states(&mut m);
        m.go_to(1).unwrap();
        commit_cells(&mut m, &[1, 0, 0, 9]);

        // Entries up to the cursor survive; the new state follows them.
        assert_eq!(m.len(), 3);
        assert_eq!(m.branch_count(), 1);
        assert_eq!(m.timeline().snapshot_at(1).unwrap(), &board(&[1, 0, 0, 0]));
        assert_eq!(m.timeline().snapshot_at(2).unwrap(), &board(&[1, 0, 0, 9]));
        assert!(!m.step_forward().unwrap());
        assert_eq!(m.timeline().latest(), Some(&board(&[1, 0, 0, 9])));
    }

    #[test]
    fn branching_commit_forks() {
        let mut m = machine(TimelineMode::Patch, Topology::Branching);
        four_states(&mut m);
        m.go_to(1).unwrap();
        commit_cells(&mut m, &[1, 0, 0, 9]);

        assert_eq!(m.branch_count(), 2);
        assert_eq!(m.branch_id(), BranchId(1));
        assert_eq!(m.len(), 3);
        let fork = m.active_branch();
        assert_eq!(fork.parent(), Some(BranchId::ROOT));
        assert_eq!(fork.fork_index(), Some(1));
        assert_eq!(fork.timeline().snapshot_at(1).unwrap(), &board(&[1, 0, 0, 0]));
        assert_eq!(fork.timeline().snapshot_at(2).unwrap(), &board(&[1, 0, 0, 9]));

        let root = m.branch(BranchId::ROOT).unwrap();
        assert_eq!(root.timeline().len(), 4);
        assert_eq!(root.timeline().index(), Some(1));
        assert_eq!(root.timeline().snapshot_at(3).unwrap(), &board(&[1, 2, 3, 0]));
    }

    #[test]
    fn commit_at_tip_never_forks() {
        let mut m = machine(TimelineMode::Patch, Topology::Branching);
        four_states(&mut m);
        commit_cells(&mut m, &[5, 5, 5, 5]);
        assert_eq!(m.branch_count(), 1);
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn branch_cycling_wraps_and_overwrites_state() {
        let mut m = machine(TimelineMode::Hybrid, Topology::Branching);
        four_states(&mut m);
        m.go_to(1).unwrap();
        commit_cells(&mut m, &[7, 7, 7, 7]);
        m.go_to(0).unwrap();
        commit_cells(&mut m, &[8, 8, 8, 8]);
        assert_eq!(m.branch_count(), 3);
        assert_eq!(m.branch_id(), BranchId(2));

        assert!(m.next_branch().unwrap());
        assert_eq!(m.branch_id(), BranchId::ROOT);
        // Root cursor was left at 1 when the first fork happened.
        assert_eq!(m.state(), &board(&[1, 0, 0, 0]));

        assert!(m.previous_branch().unwrap());
        assert_eq!(m.branch_id(), BranchId(2));
        assert_eq!(m.state(), &board(&[8, 8, 8, 8]));

        assert!(m.cycle_branch(2).unwrap());
        assert_eq!(m.branch_id(), BranchId(1));
        // Branch 1 was left at its first entry before the second fork.
        assert_eq!(m.state(), &board(&[0, 0, 0, 0]));

        assert!(!m.cycle_branch(3).unwrap());
    }

    #[test]
    fn cycling_by_extreme_offsets_wraps() {
        let mut m = machine(TimelineMode::Patch, Topology::Branching);
        m.commit(None).unwrap();
        commit_cells(&mut m, &[1, 0, 0, 0]);
        m.step_backward().unwrap();
        commit_cells(&mut m, &[2, 0, 0, 0]);
        assert_eq!(m.branch_count(), 2);
        assert_eq!(m.branch_id(), BranchId(1));

        // isize::MAX is odd: one step forward, wrapping to the root.
        assert!(m.cycle_branch(isize::MAX).unwrap());
        assert_eq!(m.branch_id(), BranchId::ROOT);
        assert_eq!(m.state(), &board(&[0, 0, 0, 0]));

        // isize::MIN is even: no move.
        assert!(!m.cycle_branch(isize::MIN).unwrap());
        assert_eq!(m.branch_id(), BranchId::ROOT);
    }

    #[test]
    fn branch_ops_rejected_in_linear_topology() {
        let mut m = machine(TimelineMode::Patch, Topology::Linear);
        m.commit(None).unwrap();
        assert_eq!(
            m.next_branch(),
            Err(MachineError::BranchingDisabled(Topology::Linear))
        );
        assert!(m.fork(BranchId::ROOT, 0).is_err());
        assert_eq!(m.branch_count(), 1);
    }

    #[test]
    fn unknown_branch_is_an_error() {
        let mut m = machine(TimelineMode::Patch, Topology::Branching);
        m.commit(None).unwrap();
        assert_eq!(
            m.switch_branch(BranchId(9)),
            Err(MachineError::UnknownBranch(BranchId(9)))
        );
        assert_eq!(m.branch_id(), BranchId::ROOT);
        assert!(m.set_branch_label(BranchId(9), Some("x")).is_err());
    }

    #[test]
    fn explicit_fork_switches_and_restores() {
        let mut m = machine(TimelineMode::Patch, Topology::Branching);
        four_states(&mut m);
        let id = m.fork(BranchId::ROOT, 2).unwrap();
        assert_eq!(id, BranchId(1));
        assert_eq!(m.branch_id(), id);
        assert_eq!(m.state(), &board(&[1, 2, 0, 0]));
        assert!(m.is_at_present());

        assert!(m.fork(BranchId::ROOT, 4).is_err());
        assert_eq!(m.branch_count(), 2);

        m.set_branch_label(id, Some("experiment")).unwrap();
        assert_eq!(m.branch(id).unwrap().label(), Some("experiment"));
    }

    #[test]
    fn travel_writes_state() {
        let mut m = machine(TimelineMode::Hybrid, Topology::Linear);
        four_states(&mut m);
        assert!(m.go_to_start().unwrap());
        assert_eq!(m.state(), &board(&[0, 0, 0, 0]));
        assert!(!m.go_to_start().unwrap());
        assert!(m.step_by(2).unwrap());
        assert_eq!(m.state(), &board(&[1, 2, 0, 0]));
        assert!(m.go_to_end().unwrap());
        assert_eq!(m.state(), &board(&[1, 2, 3, 0]));
        assert!(!m.step_forward().unwrap());
    }

    #[test]
    fn go_to_out_of_range_is_an_error() {
        let mut m = machine(TimelineMode::Patch, Topology::Linear);
        four_states(&mut m);
        m.go_to(2).unwrap();
        let before = m.state().clone();
        assert_eq!(
            m.go_to(4),
            Err(MachineError::History(HistoryError::IndexOutOfRange { index: 4, len: 4 }))
        );
        assert_eq!(m.index(), Some(2));
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn travel_on_empty_history_does_nothing() {
        let mut m = machine(TimelineMode::Patch, Topology::Linear);
        assert!(!m.step_backward().unwrap());
        assert!(!m.go_to_end().unwrap());
        assert!(m.go_to(0).is_err());
    }

    #[test]
    fn single_steps_patch_state_in_place() {
        let overwrites = Rc::new(Cell::new(0));
        let counter = Rc::clone(&overwrites);
        let codec = Codec::new(
            |s: &Board| s.clone(),
            move |snap: &Board, s: &mut Board| {
                counter.set(counter.get() + 1);
                *s = snap.clone();
            },
        )
        .with_patches(
            |a: &Board, b: &Board| BoardPatch {
                cells: diff_grid(&a.cells, &b.cells),
                winner: diff_field(&a.winner, &b.winner),
            },
            |base: &Board, p: &BoardPatch| Board {
                cells: apply_grid(&base.cells, &p.cells, Direction::Forward),
                winner: p.winner.apply(&base.winner, Direction::Forward),
            },
        )
        .with_state_patcher(|p: &BoardPatch, direction, s: &mut Board| {
            apply_grid_in_place(&mut s.cells, &p.cells, direction);
            p.winner.apply_in_place(&mut s.winner, direction);
        });
        let mut m = TimeMachine::new(
            codec,
            HistoryConfig::new(TimelineMode::Patch, Topology::Linear),
            board(&[0, 0, 0, 0]),
        )
        .unwrap();
        four_states(&mut m);
        m.state_mut().winner = Some(1);
        m.commit(None).unwrap();

        assert!(m.step_backward().unwrap());
        assert_eq!(m.state(), &board(&[1, 2, 3, 0]));
        assert!(m.step_by(-1).unwrap());
        assert!(m.step_forward().unwrap());
        assert_eq!(m.state(), &board(&[1, 2, 3, 0]));
        assert_eq!(overwrites.get(), 0);

        // Multi-entry jumps always overwrite.
        m.go_to(1).unwrap();
        assert_eq!(overwrites.get(), 1);
        assert!(m.step_backward().unwrap());
        assert_eq!(m.state(), &board(&[0, 0, 0, 0]));
        assert_eq!(overwrites.get(), 1);

        m.go_to_end().unwrap();
        assert_eq!(m.state().winner, Some(1));
        assert_eq!(overwrites.get(), 2);
    }
}
