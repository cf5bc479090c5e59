//! Capability set supplied by callers.
//!
//! A [`Codec`] collects the snapshot and patch functions for one state type.
//! It is resolved exactly once against a [`TimelineMode`]; a capability the
//! mode needs but the codec lacks fails resolution, never a later call.

use std::fmt;
use std::rc::Rc;

use crate::error::HistoryError;
use crate::timeline::Timeline;
use retrace_common::{Direction, TimelineMode};

type SnapshotFn<S, Snap> = Box<dyn Fn(&S) -> Snap>;
type RestoreFn<S, Snap> = Box<dyn Fn(&Snap, &mut S)>;
type DiffFn<Snap, P> = Rc<dyn Fn(&Snap, &Snap) -> P>;
type ApplyFn<Snap, P> = Rc<dyn Fn(&Snap, &P) -> Snap>;
type StatePatchFn<S, P> = Box<dyn Fn(&P, Direction, &mut S)>;
type EmptyCheckFn<P> = Box<dyn Fn(&P) -> bool>;

/// Unresolved capability set for state `S`, snapshots `Snap` and patches `P`.
pub struct Codec<S, Snap, P> {
    create_snapshot: SnapshotFn<S, Snap>,
    apply_snapshot: RestoreFn<S, Snap>,
    create_patch: Option<DiffFn<Snap, P>>,
    apply_patch: Option<ApplyFn<Snap, P>>,
    apply_patch_to_state: Option<StatePatchFn<S, P>>,
    is_empty_patch: Option<EmptyCheckFn<P>>,
}

impl<S, Snap, P> Codec<S, Snap, P> {
    /// Start from the two required capabilities.
    pub fn new(
        create_snapshot: impl Fn(&S) -> Snap + 'static,
        apply_snapshot: impl Fn(&Snap, &mut S) + 'static,
    ) -> Self {
        Self {
            create_snapshot: Box::new(create_snapshot),
            apply_snapshot: Box::new(apply_snapshot),
            create_patch: None,
            apply_patch: None,
            apply_patch_to_state: None,
            is_empty_patch: None,
        }
    }

    /// Add diffing and forward patch application (needed by patch and hybrid modes).
    pub fn with_patches(
        mut self,
        create_patch: impl Fn(&Snap, &Snap) -> P + 'static,
        apply_patch: impl Fn(&Snap, &P) -> Snap + 'static,
    ) -> Self {
        self.create_patch = Some(Rc::new(create_patch));
        self.apply_patch = Some(Rc::new(apply_patch));
        self
    }

    /// Enable in-place single-step travel on the live state.
    pub fn with_state_patcher(mut self, patcher: impl Fn(&P, Direction, &mut S) + 'static) -> Self {
        self.apply_patch_to_state = Some(Box::new(patcher));
        self
    }

    /// Enable suppression of commits that change nothing.
    pub fn with_empty_check(mut self, is_empty: impl Fn(&P) -> bool + 'static) -> Self {
        self.is_empty_patch = Some(Box::new(is_empty));
        self
    }

    /// Validate the capabilities against `mode`.
    pub fn resolve(self, mode: TimelineMode) -> Result<CapabilitySet<S, Snap, P>, HistoryError> {
        let patches = if mode.uses_patches() {
            let create = self.create_patch.ok_or(HistoryError::MissingCapability {
                capability: "create_patch",
                mode,
            })?;
            let apply = self.apply_patch.ok_or(HistoryError::MissingCapability {
                capability: "apply_patch",
                mode,
            })?;
            PatchSupport::Patches(PatchOps { create, apply })
        } else {
            PatchSupport::SnapshotsOnly
        };

        Ok(CapabilitySet {
            mode,
            create_snapshot: self.create_snapshot,
            apply_snapshot: self.apply_snapshot,
            patches,
            apply_patch_to_state: self.apply_patch_to_state,
            is_empty_patch: self.is_empty_patch,
        })
    }
}

/// Patch functions shared between a capability set and its timelines.
pub struct PatchOps<Snap, P> {
    create: DiffFn<Snap, P>,
    apply: ApplyFn<Snap, P>,
}

impl<Snap, P> PatchOps<Snap, P> {
    pub fn new(
        create: impl Fn(&Snap, &Snap) -> P + 'static,
        apply: impl Fn(&Snap, &P) -> Snap + 'static,
    ) -> Self {
        Self {
            create: Rc::new(create),
            apply: Rc::new(apply),
        }
    }

    pub fn diff(&self, previous: &Snap, next: &Snap) -> P {
        (self.create)(previous, next)
    }

    pub fn apply(&self, base: &Snap, patch: &P) -> Snap {
        (self.apply)(base, patch)
    }
}

impl<Snap, P> Clone for PatchOps<Snap, P> {
    fn clone(&self) -> Self {
        Self {
            create: Rc::clone(&self.create),
            apply: Rc::clone(&self.apply),
        }
    }
}

impl<Snap, P> fmt::Debug for PatchOps<Snap, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchOps").finish_non_exhaustive()
    }
}

/// Whether a resolved codec can produce and replay patches.
#[derive(Debug)]
pub enum PatchSupport<Snap, P> {
    SnapshotsOnly,
    Patches(PatchOps<Snap, P>),
}

impl<Snap, P> Clone for PatchSupport<Snap, P> {
    fn clone(&self) -> Self {
        match self {
            Self::SnapshotsOnly => Self::SnapshotsOnly,
            Self::Patches(ops) => Self::Patches(ops.clone()),
        }
    }
}

/// A codec validated against one mode.
pub struct CapabilitySet<S, Snap, P> {
    mode: TimelineMode,
    create_snapshot: SnapshotFn<S, Snap>,
    apply_snapshot: RestoreFn<S, Snap>,
    patches: PatchSupport<Snap, P>,
    apply_patch_to_state: Option<StatePatchFn<S, P>>,
    is_empty_patch: Option<EmptyCheckFn<P>>,
}

impl<S, Snap: Clone, P: Clone> CapabilitySet<S, Snap, P> {
    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub fn create_snapshot(&self, state: &S) -> Snap {
        (self.create_snapshot)(state)
    }

    pub fn apply_snapshot(&self, snapshot: &Snap, state: &mut S) {
        (self.apply_snapshot)(snapshot, state)
    }

    pub fn patches(&self) -> &PatchSupport<Snap, P> {
        &self.patches
    }

    /// Whether `patch` is known to change nothing. Without an emptiness
    /// capability every patch counts as a change.
    pub fn is_empty_patch(&self, patch: &P) -> bool {
        self.is_empty_patch.as_ref().is_some_and(|check| check(patch))
    }

    pub fn can_patch_state(&self) -> bool {
        self.apply_patch_to_state.is_some()
    }

    /// Apply `patch` directly to the live state. Returns false when the
    /// capability is absent and nothing was done.
    pub fn apply_patch_to_state(&self, patch: &P, direction: Direction, state: &mut S) -> bool {
        match &self.apply_patch_to_state {
            Some(patcher) => {
                patcher(patch, direction, state);
                true
            }
            None => false,
        }
    }

    /// A new, empty timeline storing entries per this set's mode.
    pub fn timeline(&self, checkpoint_interval: usize) -> Result<Timeline<Snap, P>, HistoryError> {
        Timeline::new(self.mode, checkpoint_interval, self.patches.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_only() -> Codec<Vec<u8>, Vec<u8>, Vec<(usize, u8, u8)>> {
        Codec::new(|s: &Vec<u8>| s.clone(), |snap, s| *s = snap.clone())
    }

    fn with_patches() -> Codec<Vec<u8>, Vec<u8>, Vec<(usize, u8, u8)>> {
        snapshot_only().with_patches(
            |a: &Vec<u8>, b: &Vec<u8>| {
                a.iter()
                    .zip(b)
                    .enumerate()
                    .filter(|(_, (x, y))| x != y)
                    .map(|(i, (x, y))| (i, *x, *y))
                    .collect()
            },
            |base: &Vec<u8>, patch: &Vec<(usize, u8, u8)>| {
                let mut next = base.clone();
                for (i, _, v) in patch {
                    next[*i] = *v;
                }
                next
            },
        )
    }

    #[test]
    fn full_mode_needs_only_snapshots() {
        let caps = snapshot_only().resolve(TimelineMode::Full).unwrap();
        assert!(matches!(caps.patches(), PatchSupport::SnapshotsOnly));
    }

    #[test]
    fn patch_mode_without_patches_fails_at_resolve() {
        let err = snapshot_only().resolve(TimelineMode::Patch).err();
        assert_eq!(
            err,
            Some(HistoryError::MissingCapability {
                capability: "create_patch",
                mode: TimelineMode::Patch,
            })
        );
        assert!(snapshot_only().resolve(TimelineMode::Hybrid).is_err());
    }

    #[test]
    fn patch_capabilities_resolve() {
        let caps = with_patches().resolve(TimelineMode::Hybrid).unwrap();
        let PatchSupport::Patches(ops) = caps.patches() else {
            panic!("expected patch support");
        };
        let patch = ops.diff(&vec![0, 0], &vec![0, 5]);
        assert_eq!(patch, vec![(1, 0, 5)]);
        assert_eq!(ops.apply(&vec![0, 0], &patch), vec![0, 5]);
    }

    #[test]
    fn optional_capabilities_default_off() {
        let caps = with_patches().resolve(TimelineMode::Patch).unwrap();
        assert!(!caps.is_empty_patch(&Vec::new()));
        assert!(!caps.can_patch_state());
        let mut state = vec![1];
        assert!(!caps.apply_patch_to_state(&vec![(0, 1, 2)], Direction::Forward, &mut state));
        assert_eq!(state, vec![1]);
    }

    #[test]
    fn optional_capabilities_when_supplied() {
        let caps = with_patches()
            .with_empty_check(|p: &Vec<(usize, u8, u8)>| p.is_empty())
            .with_state_patcher(|p, dir, s: &mut Vec<u8>| {
                for (i, prev, next) in p {
                    s[*i] = if dir == Direction::Forward { *next } else { *prev };
                }
            })
            .resolve(TimelineMode::Patch)
            .unwrap();
        assert!(caps.is_empty_patch(&Vec::new()));

        let mut state = vec![1];
        assert!(caps.apply_patch_to_state(&vec![(0, 1, 2)], Direction::Forward, &mut state));
        assert_eq!(state, vec![2]);
        caps.apply_patch_to_state(&vec![(0, 1, 2)], Direction::Backward, &mut state);
        assert_eq!(state, vec![1]);
    }

    #[test]
    fn snapshot_round_trip_through_state() {
        let caps = snapshot_only().resolve(TimelineMode::Full).unwrap();
        let snap = caps.create_snapshot(&vec![4, 5]);
        let mut state = Vec::new();
        caps.apply_snapshot(&snap, &mut state);
        assert_eq!(state, vec![4, 5]);
    }
}
