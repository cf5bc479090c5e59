//! Patch codecs: compact, reversible differences between two snapshots.
//!
//! # Invariants
//! - A grid diff emits one change per differing cell, never for identical cells.
//! - Applying a patch forward and then backward restores the base exactly.
//! - Cells or fields not named by a patch are left untouched.

mod field;
mod grid;

pub use field::{FieldPatch, diff_field};
pub use grid::{CellChange, GridPatch, apply_grid, apply_grid_in_place, diff_grid};
pub use retrace_common::Direction;

/// A patch that can report whether it changes anything.
///
/// Composite patches are empty iff every part is empty; see [`all_empty`].
pub trait Delta {
    fn is_empty(&self) -> bool;
}

/// True when every part of a composite patch is empty.
pub fn all_empty(parts: &[&dyn Delta]) -> bool {
    parts.iter().all(|p| p.is_empty())
}
