//! The computer seat in solo matches.

use crate::error::LobbyError;
use crate::match_state::{Match, MoveReport};
use chrono::{DateTime, Utc};
use matchbox_rules::{Outcome, Variant, best_move};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Participant id occupying the computer's seat in a solo match.
pub const COMPUTER_ID: &str = "computer";

/// Both halves of a solo exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoloTurn {
    /// The human's move.
    pub human: MoveReport,
    /// The computer's reply, absent when the human's move ended the match.
    pub computer: Option<MoveReport>,
}

/// True for variants the search can play.
pub fn supports_solo(variant: Variant) -> bool {
    matches!(variant, Variant::Classic | Variant::Erase)
}

/// Plays the computer's move if it is the computer's turn in a live match.
///
/// The search sees the current board under Classic rules; in Erase the
/// reply still passes through the history window like any other move.
#[instrument(skip(game), fields(match_id = %game.id()))]
pub(crate) fn answer_as_computer(
    game: &mut Match,
    now: DateTime<Utc>,
) -> Result<Option<MoveReport>, LobbyError> {
    if !*game.solo()
        || *game.status() != Outcome::InProgress
        || game.current_participant() != COMPUTER_ID
    {
        return Ok(None);
    }

    let Some(index) = best_move(game.board()) else {
        debug!("No vacant cell for the computer");
        return Ok(None);
    };
    debug!(index, "Computer chose a cell");
    game.submit_move(COMPUTER_ID, index, now).map(Some)
}
