//! Matchbox rules - pure game logic for the three grid variants
//!
//! Nothing in this crate performs I/O or reads a clock; every function is a
//! query or a transformation over an owned board.
//!
//! # Architecture
//!
//! - **Types**: [`Board`], [`Mark`], [`Cell`], [`Variant`], [`Outcome`]
//! - **Rules**: 3×3 win/draw evaluation shared by Classic and Erase
//! - **Search**: minimax with alpha-beta pruning for the computer opponent
//! - **History**: the Erase variant's shrinking move window
//! - **Scoring**: the Experimental variant's point tally and instant win
//!
//! # Example
//!
//! ```
//! use matchbox_rules::{Board, Mark, Outcome, best_move, evaluate};
//!
//! let mut board: Board = "XX OO    ".parse()?;
//! board.place(2, Mark::X)?;
//! assert_eq!(evaluate(&board), Outcome::Won(Mark::X));
//!
//! let reply = best_move(&"X        ".parse()?);
//! assert!(reply.is_some());
//! # Ok::<(), matchbox_rules::BoardError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod history;
mod rules;
mod scoring;
mod search;
mod types;

pub use error::BoardError;
pub use history::{DEFAULT_WINDOW, FIRST_SHRINK_AFTER, HistoryWindow, SECOND_SHRINK_AFTER};
pub use rules::{CLASSIC_LINES, check_winner, evaluate, is_full};
pub use scoring::{FIVE_LINES, ScoreTally, check_instant_win, tally_points};
pub use search::{COMPUTER_MARK, SearchOutcome, best_move, best_move_for};
pub use types::{Board, Cell, Mark, Outcome, Variant};
