//! Minimax search with alpha-beta pruning for the 3×3 rules.
//!
//! One board is reused across the whole search. Every trial placement is a
//! [`Trial`] guard that empties its cell again when dropped, so a sibling or
//! caller never sees a polluted board, including after a cutoff.

use crate::rules::evaluate;
use crate::types::{Board, Mark, Outcome};
use std::ops::{Deref, DerefMut};
use tracing::{debug, instrument};

/// The mark the computer plays in solo mode.
pub const COMPUTER_MARK: Mark = Mark::O;

/// Magnitude of a win found at the root; deeper wins score less.
const WIN_SCORE: i32 = 10;

/// Bound wider than any reachable score.
const INFINITY: i32 = 1_000_000;

/// A mark placed on a borrowed board for the lifetime of the guard.
struct Trial<'a> {
    board: &'a mut Board,
    index: usize,
}

impl<'a> Trial<'a> {
    fn place(board: &'a mut Board, index: usize, mark: Mark) -> Option<Self> {
        board.place(index, mark).ok()?;
        Some(Self { board, index })
    }
}

impl Deref for Trial<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Trial<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        // index was validated by place()
        let _ = self.board.clear(self.index);
    }
}

/// Result of a root search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Chosen cell index.
    pub index: usize,
    /// Minimax score of that cell from the searching mark's side.
    pub score: i32,
    /// Positions visited.
    pub nodes: u64,
}

/// Best cell for [`COMPUTER_MARK`] on a 3×3 board.
///
/// Returns `None` only when the board has no empty cell.
#[instrument(skip(board))]
pub fn best_move(board: &Board) -> Option<usize> {
    best_move_for(board, COMPUTER_MARK).map(|found| found.index)
}

/// Best cell for `mark` on a 3×3 board, with its score and search effort.
///
/// Empty cells are tried in ascending index order and the first cell that
/// reaches the best score is kept.
#[instrument(skip(board), fields(vacant = board.vacant_cells().count()))]
pub fn best_move_for(board: &Board, mark: Mark) -> Option<SearchOutcome> {
    let mut scratch = board.clone();
    let mut nodes = 0u64;
    let mut alpha = -INFINITY;
    let beta = INFINITY;
    let mut best: Option<(usize, i32)> = None;

    let vacant: Vec<usize> = scratch.vacant_cells().collect();
    for index in vacant {
        let Some(mut trial) = Trial::place(&mut scratch, index, mark) else {
            continue;
        };
        let score = minimax(&mut trial, 1, false, mark, alpha, beta, &mut nodes);
        drop(trial);

        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((index, score));
            alpha = alpha.max(score);
        }
    }

    let (index, score) = best?;
    debug!(index, score, nodes, "Search complete");
    Some(SearchOutcome {
        index,
        score,
        nodes,
    })
}

/// Scores a terminal position from `me`'s side, or `None` if play continues.
fn terminal_score(board: &Board, me: Mark, depth: i32) -> Option<i32> {
    match evaluate(board) {
        Outcome::Won(winner) if winner == me => Some(WIN_SCORE - depth),
        Outcome::Won(_) => Some(depth - WIN_SCORE),
        Outcome::Draw => Some(0),
        Outcome::InProgress => None,
    }
}

fn minimax(
    board: &mut Board,
    depth: i32,
    maximizing: bool,
    me: Mark,
    mut alpha: i32,
    mut beta: i32,
    nodes: &mut u64,
) -> i32 {
    *nodes += 1;
    if let Some(score) = terminal_score(board, me, depth) {
        return score;
    }

    let mover = if maximizing { me } else { me.opponent() };
    let mut best = if maximizing { -INFINITY } else { INFINITY };

    let vacant: Vec<usize> = board.vacant_cells().collect();
    for index in vacant {
        let Some(mut trial) = Trial::place(board, index, mover) else {
            continue;
        };
        let score = minimax(&mut trial, depth + 1, !maximizing, me, alpha, beta, nodes);
        drop(trial);

        if maximizing {
            best = best.max(score);
            alpha = alpha.max(best);
        } else {
            best = best.min(score);
            beta = beta.min(best);
        }
        if beta <= alpha {
            break;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::evaluate;

    fn board(s: &str) -> Board {
        s.parse().expect("valid board")
    }

    #[test]
    fn test_empty_board_returns_legal_move() {
        let empty = Board::classic();
        let index = best_move(&empty).expect("moves available");
        assert!(index < 9);
    }

    #[test]
    fn test_full_board_has_no_move() {
        assert_eq!(best_move(&board("XOXOXXOXO")), None);
    }

    #[test]
    fn test_takes_immediate_win() {
        // O to move can complete the middle row at 5
        let b = board("XX OO X  ");
        assert_eq!(best_move(&b), Some(5));
    }

    #[test]
    fn test_blocks_opponent_line() {
        // X threatens the top row at 2; O has nothing faster
        let b = board("XX  O    ");
        assert_eq!(best_move(&b), Some(2));
    }

    #[test]
    fn test_faster_win_preferred() {
        // X can win now at 2 (top row); a slower win should never beat it
        let b = board("XX OO    ");
        let found = best_move_for(&b, Mark::X).expect("moves available");
        assert_eq!(found.index, 2);
        assert_eq!(found.score, WIN_SCORE - 1);
    }

    #[test]
    fn test_search_leaves_input_untouched() {
        let b = board("X   O    ");
        let before = b.clone();
        let _ = best_move_for(&b, Mark::X);
        assert_eq!(b, before);
    }

    #[test]
    fn test_trial_restores_cell_on_drop() {
        let mut b = Board::classic();
        {
            let trial = Trial::place(&mut b, 4, Mark::X).expect("in range");
            assert_eq!(trial.mark_at(4), Some(Mark::X));
        }
        assert!(b.is_vacant(4));
    }

    #[test]
    fn test_optimal_self_play_draws() {
        let mut b = Board::classic();
        let mut mover = Mark::X;
        while evaluate(&b) == Outcome::InProgress {
            let found = best_move_for(&b, mover).expect("moves available");
            b.place(found.index, mover).expect("in range");
            mover = mover.opponent();
        }
        assert_eq!(evaluate(&b), Outcome::Draw);
    }
}
