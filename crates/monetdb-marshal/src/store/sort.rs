//! Single-pass nullability and monotonicity tracking.

use std::cmp::Ordering;

use crate::column::ColumnFlags;
use crate::config::NullOrdering;

/// Tracks summary flags while a column is built, one row at a time.
///
/// The caller compares the current value with an earlier row on demand;
/// the tracker decides which row that is and whether a comparison is
/// needed at all.
#[derive(Debug, Clone, Copy)]
pub struct SortTracker {
    ordering: NullOrdering,
    sorted: bool,
    reverse_sorted: bool,
    has_nil: bool,
    previous: Option<(usize, bool)>,
}

impl SortTracker {
    /// Start tracking with the given nil placement.
    #[must_use]
    pub const fn new(ordering: NullOrdering) -> Self {
        Self {
            ordering,
            sorted: true,
            reverse_sorted: true,
            has_nil: false,
            previous: None,
        }
    }

    /// Record `row`.
    ///
    /// `compare` receives the index of the earlier row and returns how the
    /// current value orders against it. It is only called when both rows
    /// hold values.
    pub fn observe(&mut self, row: usize, is_nil: bool, compare: impl FnOnce(usize) -> Ordering) {
        if is_nil {
            self.has_nil = true;
            if self.ordering == NullOrdering::Skip {
                return;
            }
        }
        if let Some((previous, previous_nil)) = self.previous {
            let order = match (previous_nil, is_nil) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => compare(previous),
            };
            match order {
                Ordering::Less => self.sorted = false,
                Ordering::Greater => self.reverse_sorted = false,
                Ordering::Equal => {}
            }
        }
        self.previous = Some((row, is_nil));
    }

    /// Final flags.
    #[must_use]
    pub const fn finish(self) -> ColumnFlags {
        ColumnFlags {
            nullable: self.has_nil,
            non_nil: !self.has_nil,
            sorted: self.sorted,
            reverse_sorted: self.reverse_sorted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(values: &[Option<i32>], ordering: NullOrdering) -> ColumnFlags {
        let mut tracker = SortTracker::new(ordering);
        for (row, value) in values.iter().enumerate() {
            tracker.observe(row, value.is_none(), |prev| {
                value.cmp(&values[prev])
            });
        }
        tracker.finish()
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(track(&[], NullOrdering::First), ColumnFlags::EMPTY);
        let flags = track(&[Some(1)], NullOrdering::First);
        assert!(flags.sorted && flags.reverse_sorted && flags.non_nil);
    }

    #[test]
    fn test_ascending_descending_constant() {
        let up = track(&[Some(1), Some(2), Some(2)], NullOrdering::First);
        assert!(up.sorted && !up.reverse_sorted);
        let down = track(&[Some(3), Some(1)], NullOrdering::First);
        assert!(!down.sorted && down.reverse_sorted);
        let flat = track(&[Some(7), Some(7)], NullOrdering::First);
        assert!(flat.sorted && flat.reverse_sorted);
    }

    #[test]
    fn test_nil_first_policy() {
        let flags = track(&[Some(5), None, Some(3)], NullOrdering::First);
        assert!(flags.nullable && !flags.non_nil);
        assert!(!flags.sorted && !flags.reverse_sorted);

        let leading = track(&[None, None, Some(1), Some(4)], NullOrdering::First);
        assert!(leading.sorted && !leading.reverse_sorted);
    }

    #[test]
    fn test_nil_skip_policy() {
        let flags = track(&[Some(5), None, Some(3)], NullOrdering::Skip);
        assert!(flags.nullable);
        assert!(!flags.sorted && flags.reverse_sorted);

        let all_nil = track(&[None, None], NullOrdering::Skip);
        assert!(all_nil.sorted && all_nil.reverse_sorted && all_nil.nullable);
    }
}
