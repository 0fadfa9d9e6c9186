//! Rejected-operation errors for match and queue transitions.

use crate::{MatchId, ParticipantId};
use matchbox_rules::{Outcome, Variant};

/// Why a lobby operation was rejected.
///
/// Every variant is caller-correctable. A rejected transition leaves the
/// match exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum LobbyError {
    /// The match id is unknown, was left, or expired from inactivity.
    #[display("Match {} does not exist or has expired", _0)]
    InvalidMatch(MatchId),

    /// The identifier is not one of the match's participants.
    #[display("{} is not a participant in this match", _0)]
    NotParticipant(ParticipantId),

    /// The participant moved out of turn.
    #[display("It is not {}'s turn", _0)]
    NotYourTurn(ParticipantId),

    /// The target cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(usize),

    /// The target cell is outside the variant's board.
    #[display("Cell {} is outside the board", _0)]
    CellOutOfRange(usize),

    /// A move was attempted on a finished match.
    #[display("Match is not in progress (status: {})", _0)]
    MatchNotInProgress(Outcome),

    /// Solo play was requested for a variant the computer cannot play.
    #[display("Solo play is not available for the {} variant", _0)]
    SoloUnsupported(Variant),

    /// Both seats were given the same participant.
    #[display("{} cannot play against themselves", _0)]
    DuplicateParticipant(ParticipantId),

    /// A transition broke a match invariant and was discarded.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for LobbyError {}
