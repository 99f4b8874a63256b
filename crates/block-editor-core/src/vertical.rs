//! Vertical Navigation Tracker
//!
//! Plain caret restoration loses the intended column when Up/Down passes through a block that is
//! shorter than the one the run started in. The tracker remembers the widest offset requested
//! during a continuous run of vertical navigation so the caret can return to it once a block is
//! long enough again.

/// Remembered caret column for Up/Down navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnTracker {
    remembered: usize,
}

impl ColumnTracker {
    /// A tracker with column 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the remembered column. Called for every non-vertical input.
    pub fn record_column(&mut self, offset: usize) {
        self.remembered = offset;
    }

    /// Target column for a vertical move from `current_offset`.
    ///
    /// Moving vertically never narrows the intended column: the result is
    /// `max(remembered, current_offset)`, which also becomes the remembered column.
    pub fn resolve_column(&mut self, current_offset: usize) -> usize {
        self.remembered = self.remembered.max(current_offset);
        self.remembered
    }

    /// Forget the remembered column (caret hit the top of the document).
    pub fn reset(&mut self) {
        self.remembered = 0;
    }

    /// The remembered column.
    pub fn remembered(&self) -> usize {
        self.remembered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_never_narrows() {
        let mut tracker = ColumnTracker::new();
        tracker.record_column(4);
        // Passing through a two-character block reports offset 2.
        assert_eq!(tracker.resolve_column(2), 4);
        assert_eq!(tracker.resolve_column(4), 4);
    }

    #[test]
    fn test_resolve_widens_with_current_offset() {
        let mut tracker = ColumnTracker::new();
        tracker.record_column(1);
        assert_eq!(tracker.resolve_column(6), 6);
        assert_eq!(tracker.remembered(), 6);
    }

    #[test]
    fn test_record_and_reset() {
        let mut tracker = ColumnTracker::new();
        tracker.record_column(7);
        tracker.record_column(3);
        assert_eq!(tracker.remembered(), 3);
        tracker.reset();
        assert_eq!(tracker.remembered(), 0);
    }
}
