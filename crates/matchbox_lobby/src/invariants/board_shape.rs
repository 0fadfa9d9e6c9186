//! Board shape invariant: the board length matches the variant.

use super::Invariant;
use crate::match_state::Match;

/// Invariant: the board has exactly the variant's cell count.
pub struct BoardShapeInvariant;

impl Invariant<Match> for BoardShapeInvariant {
    fn holds(game: &Match) -> bool {
        game.board().len() == game.variant().cell_count()
    }

    fn description() -> &'static str {
        "Board length matches the variant"
    }
}
