//! Terminal-state rules for the 3×3 variants.
//!
//! Pure functions over an immutable board snapshot. Classic and Erase share
//! these rules; Experimental is scored by [`crate::scoring`] instead.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{CLASSIC_LINES, check_winner};

use crate::types::{Board, Outcome};
use tracing::instrument;

/// Evaluates a 3×3 board.
///
/// A line held entirely by one mark wins for that mark; otherwise a full
/// board is a draw; otherwise the game is still in progress.
#[instrument(level = "trace", skip(board))]
pub fn evaluate(board: &Board) -> Outcome {
    debug_assert_eq!(board.len(), 9, "classic rules need a 3x3 board");
    if let Some(winner) = check_winner(board) {
        Outcome::Won(winner)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
