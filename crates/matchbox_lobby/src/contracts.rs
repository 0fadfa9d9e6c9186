//! Contract-based validation for match transitions.
//!
//! A contract pairs preconditions, checked before a transition touches the
//! match, with postconditions comparing the match before and after.

use crate::error::LobbyError;
use crate::invariants::{InvariantSet, MatchInvariants};
use crate::match_state::Match;
use crate::ParticipantId;
use derive_new::new;
use matchbox_rules::Outcome;
use tracing::instrument;

/// Preconditions and postconditions for a transition `A` on state `S`.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), LobbyError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), LobbyError>;
}

/// A participant's request to mark a cell.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Move {
    /// Who is moving.
    pub participant: ParticipantId,
    /// Target cell.
    pub index: usize,
}

/// Precondition: the match accepts moves.
pub struct MatchInProgress;

impl MatchInProgress {
    /// Rejects moves on a finished match.
    #[instrument(skip(game))]
    pub fn check(game: &Match) -> Result<(), LobbyError> {
        match *game.status() {
            Outcome::InProgress => Ok(()),
            status => Err(LobbyError::MatchNotInProgress(status)),
        }
    }
}

/// Precondition: the mover is a participant and it is their turn.
pub struct ParticipantsTurn;

impl ParticipantsTurn {
    /// Rejects outsiders and out-of-turn moves.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &Match) -> Result<(), LobbyError> {
        let index = game
            .participant_index(&mov.participant)
            .ok_or_else(|| LobbyError::NotParticipant(mov.participant.clone()))?;
        if index != *game.turn() {
            return Err(LobbyError::NotYourTurn(mov.participant.clone()));
        }
        Ok(())
    }
}

/// Precondition: the target cell exists and is empty.
pub struct CellIsVacant;

impl CellIsVacant {
    /// Rejects out-of-range and occupied cells.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &Match) -> Result<(), LobbyError> {
        if mov.index >= game.board().len() {
            Err(LobbyError::CellOutOfRange(mov.index))
        } else if !game.board().is_vacant(mov.index) {
            Err(LobbyError::CellOccupied(mov.index))
        } else {
            Ok(())
        }
    }
}

/// Composite precondition, checked in order: status, turn, cell.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &Match) -> Result<(), LobbyError> {
        MatchInProgress::check(game)?;
        ParticipantsTurn::check(mov, game)?;
        CellIsVacant::check(mov, game)?;
        Ok(())
    }
}

/// Contract for move submission.
///
/// Postconditions: the match invariants hold, cumulative wins never
/// decrease, and Experimental points never decrease.
pub struct MoveContract;

impl Contract<Match, Move> for MoveContract {
    fn pre(game: &Match, action: &Move) -> Result<(), LobbyError> {
        LegalMove::check(action, game)
    }

    fn post(before: &Match, after: &Match) -> Result<(), LobbyError> {
        MatchInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            LobbyError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })?;

        if !after.wins().dominates(before.wins()) {
            return Err(LobbyError::InvariantViolation(
                "Cumulative wins decreased".to_string(),
            ));
        }

        if let (Some(earlier), Some(later)) = (before.points(), after.points())
            && !later.dominates(&earlier)
        {
            return Err(LobbyError::InvariantViolation(
                "Experimental points decreased".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use matchbox_rules::Variant;

    fn game() -> Match {
        Match::new(
            "m".to_string(),
            Variant::Classic,
            ["a".to_string(), "b".to_string()],
            6,
            false,
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_precondition_empty_cell() {
        let action = Move::new("a".to_string(), 4);
        assert!(MoveContract::pre(&game(), &action).is_ok());
    }

    #[test]
    fn test_turn_checked_before_cell() {
        let mut g = game();
        g.submit_move("a", 4, DateTime::<Utc>::UNIX_EPOCH)
            .expect("legal move");
        // wrong player on an occupied cell reports the turn first
        let action = Move::new("a".to_string(), 4);
        assert_eq!(
            MoveContract::pre(&g, &action),
            Err(LobbyError::NotYourTurn("a".to_string()))
        );
    }

    #[test]
    fn test_postcondition_holds_after_move() {
        let before = game();
        let mut after = before.clone();
        after
            .submit_move("a", 0, DateTime::<Utc>::UNIX_EPOCH)
            .expect("legal move");
        assert!(MoveContract::post(&before, &after).is_ok());
    }

    #[test]
    fn test_postcondition_detects_lost_wins() {
        let mut before = game();
        for (who, index) in [("a", 0), ("b", 3), ("a", 1), ("b", 4), ("a", 2)] {
            before
                .submit_move(who, index, DateTime::<Utc>::UNIX_EPOCH)
                .expect("legal move");
        }
        assert_eq!(before.wins().x, 1);
        let after = game();
        assert!(matches!(
            MoveContract::post(&before, &after),
            Err(LobbyError::InvariantViolation(_))
        ));
    }
}
