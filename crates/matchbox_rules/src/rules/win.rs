//! Win detection for the 3×3 variants.

use crate::types::{Board, Cell, Mark};
use tracing::instrument;

/// The eight straight lines of a 3×3 grid.
pub const CLASSIC_LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the mark holding a full line, if any.
///
/// Lines are scanned in [`CLASSIC_LINES`] order and the first complete one
/// decides.
#[instrument(level = "trace", skip(board))]
pub fn check_winner(board: &Board) -> Option<Mark> {
    for [a, b, c] in CLASSIC_LINES {
        if let Some(Cell::Occupied(mark)) = board.get(a)
            && board.get(b) == Some(Cell::Occupied(mark))
            && board.get(c) == Some(Cell::Occupied(mark))
        {
            return Some(mark);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(check_winner(&Board::classic()), None);
    }

    #[test]
    fn test_winner_top_row() {
        let board: Board = "XXX OO   ".parse().expect("valid board");
        assert_eq!(check_winner(&board), Some(Mark::X));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let board: Board = "X O O OX ".parse().expect("valid board");
        assert_eq!(check_winner(&board), Some(Mark::O));
    }

    #[test]
    fn test_no_winner_incomplete() {
        let board: Board = "XX       ".parse().expect("valid board");
        assert_eq!(check_winner(&board), None);
    }
}
