//! Point scoring for the 5×5 Experimental variant.
//!
//! Points are recomputed from the whole board on every call. Each of the
//! twelve length-5 lines holds three length-3 windows; every window held
//! entirely by one mark is a point for that mark. A full length-5 line is an
//! instant win.
//!
//! There is no draw rule here: a full board without an instant win stays in
//! progress.

use crate::types::{Board, Cell, Mark};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Side length of the Experimental board.
const SIDE: usize = 5;

/// Length of a scoring run.
const RUN: usize = 3;

const fn five_lines() -> [[usize; SIDE]; 2 * SIDE + 2] {
    let mut lines = [[0; SIDE]; 2 * SIDE + 2];
    let mut i = 0;
    while i < SIDE {
        let mut j = 0;
        while j < SIDE {
            lines[i][j] = i * SIDE + j; // row i
            lines[SIDE + i][j] = j * SIDE + i; // column i
            j += 1;
        }
        lines[2 * SIDE][i] = i * (SIDE + 1);
        lines[2 * SIDE + 1][i] = (i + 1) * (SIDE - 1);
        i += 1;
    }
    lines
}

/// The twelve length-5 lines of the 5×5 grid: rows, columns, then the two
/// diagonals.
pub const FIVE_LINES: [[usize; SIDE]; 2 * SIDE + 2] = five_lines();

/// A pair of non-negative per-mark counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreTally {
    /// Count for mark-A (X).
    pub x: u32,
    /// Count for mark-B (O).
    pub o: u32,
}

impl ScoreTally {
    /// Creates a tally.
    pub fn new(x: u32, o: u32) -> Self {
        Self { x, o }
    }

    /// Count for `mark`.
    pub fn get(&self, mark: Mark) -> u32 {
        match mark {
            Mark::X => self.x,
            Mark::O => self.o,
        }
    }

    /// Adds one to `mark`'s count.
    pub fn increment(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x += 1,
            Mark::O => self.o += 1,
        }
    }

    /// True when neither counter is below `earlier`'s.
    pub fn dominates(&self, earlier: &ScoreTally) -> bool {
        self.x >= earlier.x && self.o >= earlier.o
    }
}

fn owner(board: &Board, cells: &[usize]) -> Option<Mark> {
    let Some(Cell::Occupied(first)) = board.get(cells[0]) else {
        return None;
    };
    cells
        .iter()
        .all(|&index| board.get(index) == Some(Cell::Occupied(first)))
        .then_some(first)
}

/// Counts every length-3 run of one mark inside the twelve length-5 lines.
///
/// Stateless: calling it twice on the same board gives the same tally.
#[instrument(skip(board))]
pub fn tally_points(board: &Board) -> ScoreTally {
    debug_assert_eq!(board.len(), SIDE * SIDE, "scoring needs a 5x5 board");
    let mut tally = ScoreTally::default();
    for line in &FIVE_LINES {
        for window in line.windows(RUN) {
            if let Some(mark) = owner(board, window) {
                tally.increment(mark);
            }
        }
    }
    debug!(x = tally.x, o = tally.o, "Points tallied");
    tally
}

/// Returns the mark holding an entire length-5 line, if any.
#[instrument(skip(board))]
pub fn check_instant_win(board: &Board) -> Option<Mark> {
    FIVE_LINES.iter().find_map(|line| owner(board, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: [&str; 5]) -> Board {
        rows.concat().parse().expect("valid board")
    }

    #[test]
    fn test_lines_cover_rows_columns_diagonals() {
        assert_eq!(FIVE_LINES[0], [0, 1, 2, 3, 4]);
        assert_eq!(FIVE_LINES[4], [20, 21, 22, 23, 24]);
        assert_eq!(FIVE_LINES[5], [0, 5, 10, 15, 20]);
        assert_eq!(FIVE_LINES[9], [4, 9, 14, 19, 24]);
        assert_eq!(FIVE_LINES[10], [0, 6, 12, 18, 24]);
        assert_eq!(FIVE_LINES[11], [4, 8, 12, 16, 20]);
    }

    #[test]
    fn test_single_run_scores_one() {
        let b = board(["XXX  ", "     ", "     ", "     ", "     "]);
        assert_eq!(tally_points(&b), ScoreTally::new(1, 0));

        let b = board(["     ", "     ", " OOO ", "     ", "     "]);
        assert_eq!(tally_points(&b), ScoreTally::new(0, 1));
    }

    #[test]
    fn test_run_of_four_scores_two() {
        let b = board(["     ", "OOOO ", "     ", "     ", "     "]);
        assert_eq!(tally_points(&b), ScoreTally::new(0, 2));
    }

    #[test]
    fn test_tally_is_idempotent() {
        let b = board(["XXX  ", "X    ", "X    ", "     ", "  OOO"]);
        let first = tally_points(&b);
        assert_eq!(first, ScoreTally::new(2, 1));
        assert_eq!(tally_points(&b), first);
    }

    #[test]
    fn test_diagonal_five_is_instant_win() {
        let b = board(["X    ", " X   ", "  X  ", "   X ", "    X"]);
        assert_eq!(check_instant_win(&b), Some(Mark::X));
        // three windows on the diagonal
        assert_eq!(tally_points(&b), ScoreTally::new(3, 0));
    }

    #[test]
    fn test_column_five_wins_regardless_of_points() {
        let b = board(["OXXX ", "O    ", "O XXX", "O    ", "O    "]);
        assert_eq!(check_instant_win(&b), Some(Mark::O));
        assert!(tally_points(&b).x > 0);
    }

    #[test]
    fn test_no_instant_win_on_four() {
        let b = board(["XXXX ", "     ", "     ", "     ", "     "]);
        assert_eq!(check_instant_win(&b), None);
    }
}
