//! Participant-facing snapshot of a match.

use crate::error::LobbyError;
use crate::match_state::Match;
use crate::{MatchId, ParticipantId};
use derive_getters::Getters;
use matchbox_rules::{Mark, Variant};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// What one participant may see of a match, shaped for the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ParticipantView {
    /// Match this view describes.
    match_id: MatchId,
    /// Board and rule variant.
    variant: Variant,
    /// Cells in row-major order as `"x"`, `"o"` or `" "`.
    board: Vec<String>,
    /// `in_progress`, `x_wins`, `o_wins` or `draw`.
    status: String,
    /// The viewer's mark, `"x"` or `"o"`.
    your_side: String,
    /// Seat index that moves next.
    turn: usize,
    /// True when the viewer may move now.
    your_turn: bool,
    /// The other participant.
    opponent: ParticipantId,
    /// Rounds won by x in this match.
    score_x: u32,
    /// Rounds won by o in this match.
    score_o: u32,
    /// Experimental point tally for x.
    #[serde(skip_serializing_if = "Option::is_none")]
    points_x: Option<u32>,
    /// Experimental point tally for o.
    #[serde(skip_serializing_if = "Option::is_none")]
    points_o: Option<u32>,
    /// True when the viewer has voted for a rematch.
    rematch_requested: bool,
    /// True when the opponent is the computer.
    solo: bool,
}

impl ParticipantView {
    /// Builds `participant`'s view of `game`.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::NotParticipant`] if `participant` is not seated.
    #[instrument(skip(game), fields(match_id = %game.id()))]
    pub fn of(game: &Match, participant: &str) -> Result<Self, LobbyError> {
        let seat = game
            .participant_index(participant)
            .ok_or_else(|| LobbyError::NotParticipant(participant.to_string()))?;
        let points = game.points();

        Ok(Self {
            match_id: game.id().clone(),
            variant: game.variant(),
            board: game.board().to_flat(),
            status: game.status().label().to_string(),
            your_side: if seat == 0 { Mark::X } else { Mark::O }.side().to_string(),
            turn: *game.turn(),
            your_turn: *game.turn() == seat && !game.status().is_terminal(),
            opponent: game.players()[1 - seat].clone(),
            score_x: game.wins().x,
            score_o: game.wins().o,
            points_x: points.map(|p| p.x),
            points_o: points.map(|p| p.o),
            rematch_requested: game.rematch_votes().contains(participant),
            solo: *game.solo(),
        })
    }
}
