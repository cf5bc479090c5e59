use serde::{Deserialize, Serialize};

use crate::Delta;
use retrace_common::Direction;

/// Change to a single scalar field.
///
/// Either side of a change may be absent, which covers fields that only exist
/// on one side of a transition. Replaying towards an absent side leaves the
/// base value as it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldPatch<T> {
    #[default]
    Unchanged,
    Changed {
        previous: Option<T>,
        next: Option<T>,
    },
}

impl<T: Clone> FieldPatch<T> {
    /// A change with both sides known.
    pub fn changed(previous: T, next: T) -> Self {
        Self::Changed {
            previous: Some(previous),
            next: Some(next),
        }
    }

    /// The value written when replayed in `direction`, if any.
    pub fn value(&self, direction: Direction) -> Option<&T> {
        match self {
            Self::Unchanged => None,
            Self::Changed { previous, next } => match direction {
                Direction::Forward => next.as_ref(),
                Direction::Backward => previous.as_ref(),
            },
        }
    }

    /// Replay onto a copy of `base`.
    pub fn apply(&self, base: &T, direction: Direction) -> T {
        self.value(direction).unwrap_or(base).clone()
    }

    /// Replay onto `field` in place.
    pub fn apply_in_place(&self, field: &mut T, direction: Direction) {
        if let Some(value) = self.value(direction) {
            *field = value.clone();
        }
    }
}

impl<T> Delta for FieldPatch<T> {
    fn is_empty(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Diff one field between two snapshots.
pub fn diff_field<T: Clone + PartialEq>(previous: &T, next: &T) -> FieldPatch<T> {
    if previous == next {
        FieldPatch::Unchanged
    } else {
        FieldPatch::changed(previous.clone(), next.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_values_are_unchanged() {
        assert_eq!(diff_field(&3, &3), FieldPatch::Unchanged);
        assert!(diff_field(&"x", &"x").is_empty());
    }

    #[test]
    fn apply_both_directions() {
        let patch = diff_field(&1, &2);
        assert_eq!(patch.apply(&1, Direction::Forward), 2);
        assert_eq!(patch.apply(&2, Direction::Backward), 1);
    }

    #[test]
    fn unchanged_keeps_base() {
        let patch: FieldPatch<i32> = FieldPatch::Unchanged;
        assert_eq!(patch.apply(&42, Direction::Forward), 42);
    }

    #[test]
    fn absent_side_falls_back_to_base() {
        // Outcome appears partway through history: nothing recorded before it.
        let patch = FieldPatch::Changed {
            previous: None,
            next: Some("x wins"),
        };
        assert_eq!(patch.apply(&"pending", Direction::Forward), "x wins");
        assert_eq!(patch.apply(&"x wins", Direction::Backward), "x wins");
    }

    #[test]
    fn optional_fields_round_trip() {
        let before: Option<char> = None;
        let after = Some('x');
        let patch = diff_field(&before, &after);

        let mut field = before;
        patch.apply_in_place(&mut field, Direction::Forward);
        assert_eq!(field, after);
        patch.apply_in_place(&mut field, Direction::Backward);
        assert_eq!(field, before);
    }
}
