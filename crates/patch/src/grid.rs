use serde::{Deserialize, Serialize};

use crate::Delta;
use retrace_common::Direction;

/// One differing cell between two grids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellChange<T> {
    /// Flat index of the cell.
    pub index: usize,
    pub previous: T,
    pub next: T,
}

impl<T> CellChange<T> {
    /// The value this change writes when replayed in `direction`.
    pub fn value(&self, direction: Direction) -> &T {
        match direction {
            Direction::Forward => &self.next,
            Direction::Backward => &self.previous,
        }
    }
}

/// Ordered list of cell changes, ascending by index.
///
/// An empty list means "no change". Multi-dimensional grids are diffed over
/// their flat storage; the coordinate mapping belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPatch<T> {
    changes: Vec<CellChange<T>>,
}

impl<T> Default for GridPatch<T> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
        }
    }
}

impl<T> GridPatch<T> {
    /// Build a patch from explicit changes.
    pub fn from_changes(mut changes: Vec<CellChange<T>>) -> Self {
        changes.sort_by_key(|c| c.index);
        Self { changes }
    }

    pub fn changes(&self) -> &[CellChange<T>] {
        &self.changes
    }

    /// Number of changed cells.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl<T> Delta for GridPatch<T> {
    fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Diff two equal-length grids cell by cell.
///
/// # Panics
/// If the grids differ in length; grid shape is fixed for the lifetime of a
/// history.
pub fn diff_grid<T: Clone + PartialEq>(previous: &[T], next: &[T]) -> GridPatch<T> {
    assert_eq!(
        previous.len(),
        next.len(),
        "grid length changed between snapshots"
    );
    let changes = previous
        .iter()
        .zip(next)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(index, (a, b))| CellChange {
            index,
            previous: a.clone(),
            next: b.clone(),
        })
        .collect();
    GridPatch { changes }
}

/// Apply a patch to a copy of `base`, leaving unlisted cells untouched.
pub fn apply_grid<T: Clone>(base: &[T], patch: &GridPatch<T>, direction: Direction) -> Vec<T> {
    let mut cells = base.to_vec();
    apply_grid_in_place(&mut cells, patch, direction);
    cells
}

/// Apply a patch directly onto `cells`.
///
/// Changes whose index falls outside `cells` are ignored.
pub fn apply_grid_in_place<T: Clone>(cells: &mut [T], patch: &GridPatch<T>, direction: Direction) {
    for change in &patch.changes {
        if let Some(cell) = cells.get_mut(change.index) {
            *cell = change.value(direction).clone();
        }
    }
}
