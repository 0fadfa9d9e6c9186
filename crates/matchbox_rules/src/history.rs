//! Bounded move history for the Erase variant.
//!
//! Marks older than the window disappear. The window tightens after 18 and
//! again after 28 total moves, so marks vanish faster as a game drags on.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// Default number of most-recent marks kept on an Erase board.
pub const DEFAULT_WINDOW: usize = 6;

/// Total moves after which the window first shrinks.
pub const FIRST_SHRINK_AFTER: u32 = 18;

/// Total moves after which the window shrinks again.
pub const SECOND_SHRINK_AFTER: u32 = 28;

/// Ordered, bounded record of the cells marked so far.
///
/// `entries.len()` never exceeds `window` after a call to [`record`], and
/// `window` never grows.
///
/// [`record`]: HistoryWindow::record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    base: usize,
    window: usize,
    total_moves: u32,
    entries: VecDeque<usize>,
}

impl HistoryWindow {
    /// Creates an empty history with base window `base` (at least 1).
    #[instrument]
    pub fn new(base: usize) -> Self {
        let base = base.max(1);
        Self {
            base,
            window: base,
            total_moves: 0,
            entries: VecDeque::with_capacity(base + 1),
        }
    }

    /// Records a mark placed at `index` and returns the cells whose marks
    /// must now be cleared, oldest first.
    ///
    /// Usually this is empty or a single index. On the move that shrinks
    /// the window the history can overshoot by two, and both are returned.
    #[instrument(skip(self), fields(total = self.total_moves + 1))]
    pub fn record(&mut self, index: usize) -> Vec<usize> {
        self.total_moves += 1;
        self.window = self.window.min(self.target_window());

        self.entries.push_back(index);

        let mut evicted = Vec::new();
        while self.entries.len() > self.window {
            if let Some(oldest) = self.entries.pop_front() {
                evicted.push(oldest);
            }
        }

        if !evicted.is_empty() {
            debug!(?evicted, window = self.window, "Evicted oldest marks");
        }
        evicted
    }

    /// Window size implied by the move count alone.
    fn target_window(&self) -> usize {
        if self.total_moves > SECOND_SHRINK_AFTER {
            self.base.saturating_sub(2).max(4)
        } else if self.total_moves > FIRST_SHRINK_AFTER {
            self.base.saturating_sub(1).max(5)
        } else {
            self.base
        }
    }

    /// Base window this history was created with.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Current window size.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Moves recorded so far, including evicted ones.
    pub fn total_moves(&self) -> u32 {
        self.total_moves
    }

    /// Retained cell indices, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh history with the same base window.
    pub fn reset(&self) -> Self {
        Self::new(self.base)
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_until_window_exceeded() {
        let mut history = HistoryWindow::new(6);
        for index in 0..6 {
            assert!(history.record(index).is_empty(), "move {} evicted early", index);
        }
        assert_eq!(history.record(6), vec![0]);
        assert_eq!(history.len(), 6);
    }

    #[test]
    fn test_first_cell_evicted_exactly_once() {
        let mut history = HistoryWindow::new(6);
        let evicted: Vec<usize> = (0..12).flat_map(|i| history.record(i % 9)).collect();
        assert_eq!(evicted.iter().filter(|&&i| i == 0).count(), 1);
        assert_eq!(evicted, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_window_shrinks_after_thresholds() {
        let mut history = HistoryWindow::new(6);
        for index in 0..18 {
            history.record(index % 9);
        }
        assert_eq!(history.window(), 6);

        history.record(0);
        assert_eq!(history.window(), 5);
        assert_eq!(history.len(), 5);

        for index in 0..9 {
            history.record(index);
        }
        assert_eq!(history.total_moves(), 28);
        assert_eq!(history.window(), 5);

        history.record(0);
        assert_eq!(history.window(), 4);
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_shrink_evicts_overshoot() {
        let mut history = HistoryWindow::new(6);
        for index in 0..18 {
            history.record(index);
        }
        // 6 retained; the 19th makes 7 against a window of 5
        assert_eq!(history.record(18), vec![12, 13]);
    }

    #[test]
    fn test_window_clamped_to_minimums() {
        let mut history = HistoryWindow::new(5);
        for index in 0..40 {
            history.record(index);
        }
        // max(5-1, 5) then max(5-2, 4)
        assert_eq!(history.window(), 4);

        let mut large = HistoryWindow::new(9);
        for index in 0..40 {
            large.record(index);
        }
        assert_eq!(large.window(), 7);
    }

    #[test]
    fn test_window_never_grows() {
        let mut history = HistoryWindow::new(3);
        let mut previous = history.window();
        for index in 0..40 {
            history.record(index);
            assert!(history.window() <= previous);
            assert!(history.len() <= history.window());
            previous = history.window();
        }
        assert_eq!(history.window(), 3);
    }
}
