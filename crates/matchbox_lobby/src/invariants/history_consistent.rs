//! History consistency invariant for Erase matches.

use super::Invariant;
use crate::match_state::Match;
use matchbox_rules::Cell;
use std::collections::BTreeSet;

/// Invariant: an Erase match's retained history fits its window and names
/// exactly the occupied cells.
///
/// Every placed mark is recorded, and every evicted entry is cleared from
/// the board, so the two always agree. Other variants hold trivially.
pub struct HistoryConsistentInvariant;

impl Invariant<Match> for HistoryConsistentInvariant {
    fn holds(game: &Match) -> bool {
        let Some(history) = game.history() else {
            return true;
        };

        if history.len() > history.window() {
            return false;
        }

        let retained: BTreeSet<usize> = history.entries().collect();
        let occupied: BTreeSet<usize> = game
            .board()
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != Cell::Empty)
            .map(|(index, _)| index)
            .collect();

        retained.len() == history.len() && retained == occupied
    }

    fn description() -> &'static str {
        "Erase history fits its window and matches the occupied cells"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParticipantId;
    use chrono::{DateTime, Utc};
    use matchbox_rules::Variant;

    fn erase(window: usize) -> Match {
        let players: [ParticipantId; 2] = ["a".to_string(), "b".to_string()];
        Match::new(
            "e".to_string(),
            Variant::Erase,
            players,
            window,
            false,
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_fresh_match_holds() {
        assert!(HistoryConsistentInvariant::holds(&erase(6)));
    }

    #[test]
    fn test_holds_through_evictions() {
        let mut game = erase(2);
        let seats = ["a", "b"];
        // Seven moves on distinct cells, no three-in-line can survive a window of 2
        for (turn, index) in [0, 1, 2, 3, 4, 5, 6].into_iter().enumerate() {
            game.submit_move(seats[turn % 2], index, DateTime::<Utc>::UNIX_EPOCH)
                .expect("legal move");
            assert!(HistoryConsistentInvariant::holds(&game));
            assert!(game.history().is_some_and(|h| h.len() <= 2));
        }
    }
}
