//! Turn invariant: the turn indicator names a seat, and seats are distinct.

use super::Invariant;
use crate::match_state::Match;

/// Invariant: `turn` is 0 or 1 and the two participants differ.
pub struct TurnIndexInvariant;

impl Invariant<Match> for TurnIndexInvariant {
    fn holds(game: &Match) -> bool {
        *game.turn() < 2 && game.players()[0] != game.players()[1]
    }

    fn description() -> &'static str {
        "Turn indicator names one of two distinct participants"
    }
}
