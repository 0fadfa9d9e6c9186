//! Per-match record and its legal transitions.

use crate::contracts::{Contract, Move, MoveContract};
use crate::error::LobbyError;
use crate::{MatchId, ParticipantId};
use chrono::{DateTime, TimeDelta, Utc};
use derive_getters::Getters;
use matchbox_rules::{
    Board, HistoryWindow, Mark, Outcome, ScoreTally, Variant, check_instant_win, evaluate,
    tally_points,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// Variant tag carrying the state only that variant needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum VariantRules {
    /// Standard 3×3 rules.
    Classic,
    /// 3×3 with a decaying history.
    Erase {
        /// Marks still on the board, oldest first.
        history: HistoryWindow,
    },
    /// 5×5 scored play.
    Experimental {
        /// Points for the current board.
        points: ScoreTally,
    },
}

impl VariantRules {
    /// Fresh per-variant state.
    pub fn new(variant: Variant, erase_window: usize) -> Self {
        match variant {
            Variant::Classic => VariantRules::Classic,
            Variant::Erase => VariantRules::Erase {
                history: HistoryWindow::new(erase_window),
            },
            Variant::Experimental => VariantRules::Experimental {
                points: ScoreTally::default(),
            },
        }
    }

    /// The variant this state belongs to.
    pub fn variant(&self) -> Variant {
        match self {
            VariantRules::Classic => Variant::Classic,
            VariantRules::Erase { .. } => Variant::Erase,
            VariantRules::Experimental { .. } => Variant::Experimental,
        }
    }

    fn reset(&self) -> Self {
        match self {
            VariantRules::Classic => VariantRules::Classic,
            VariantRules::Erase { history } => VariantRules::Erase {
                history: history.reset(),
            },
            VariantRules::Experimental { .. } => VariantRules::Experimental {
                points: ScoreTally::default(),
            },
        }
    }
}

/// What an accepted move did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    /// Cell that received the mark.
    pub index: usize,
    /// Mark placed.
    pub mark: Mark,
    /// Cells cleared by the Erase history, oldest first.
    pub evicted: Vec<usize>,
    /// Match status after the move.
    pub status: Outcome,
}

/// Result of a rematch vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RematchState {
    /// Waiting for the other participant's vote.
    Pending,
    /// Both voted; a fresh round has started.
    Restarted,
}

/// A match between two participants.
///
/// Participant 0 plays [`Mark::X`] and moves first; participant 1 plays
/// [`Mark::O`]. Cumulative `wins` survive rematches; the board does not.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Match {
    /// Lobby-assigned identifier.
    id: MatchId,
    /// Seat 0 plays x, seat 1 plays o.
    players: [ParticipantId; 2],
    /// Current board.
    board: Board,
    /// Outcome of the current round.
    status: Outcome,
    /// Seat index that moves next.
    turn: usize,
    /// Rounds won per mark across rematches.
    wins: ScoreTally,
    /// Variant tag and its state.
    rules: VariantRules,
    /// Participants who asked for a rematch.
    rematch_votes: BTreeSet<ParticipantId>,
    /// True when seat 1 is the computer.
    solo: bool,
    /// When the match was created.
    created_at: DateTime<Utc>,
    /// Last accepted transition.
    last_activity: DateTime<Utc>,
}

impl Match {
    /// Creates an in-progress match with a fresh board.
    #[instrument(skip(players), fields(x = %players[0], o = %players[1]))]
    pub(crate) fn new(
        id: MatchId,
        variant: Variant,
        players: [ParticipantId; 2],
        erase_window: usize,
        solo: bool,
        now: DateTime<Utc>,
    ) -> Self {
        info!(match_id = %id, %variant, solo, "Creating match");
        Self {
            id,
            players,
            board: Board::new(variant),
            status: Outcome::InProgress,
            turn: 0,
            wins: ScoreTally::default(),
            rules: VariantRules::new(variant, erase_window),
            rematch_votes: BTreeSet::new(),
            solo,
            created_at: now,
            last_activity: now,
        }
    }

    /// The match's variant.
    pub fn variant(&self) -> Variant {
        self.rules.variant()
    }

    /// Seat of `participant` (0 or 1), if they belong to this match.
    pub fn participant_index(&self, participant: &str) -> Option<usize> {
        self.players.iter().position(|p| p == participant)
    }

    /// Mark played by `participant`, if they belong to this match.
    pub fn mark_of(&self, participant: &str) -> Option<Mark> {
        self.participant_index(participant)
            .and_then(Mark::from_index)
    }

    /// Participant whose turn it is.
    pub fn current_participant(&self) -> &ParticipantId {
        &self.players[self.turn]
    }

    /// The other participant.
    pub fn opponent_of(&self, participant: &str) -> Option<&ParticipantId> {
        self.participant_index(participant)
            .map(|index| &self.players[1 - index])
    }

    /// The Erase history, for Erase matches.
    pub fn history(&self) -> Option<&HistoryWindow> {
        match &self.rules {
            VariantRules::Erase { history } => Some(history),
            _ => None,
        }
    }

    /// The current point tally, for Experimental matches.
    pub fn points(&self) -> Option<ScoreTally> {
        match &self.rules {
            VariantRules::Experimental { points } => Some(*points),
            _ => None,
        }
    }

    /// True once nothing has happened for longer than `ttl`.
    pub fn is_idle(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.last_activity) > ttl
    }

    /// Places `participant`'s mark at `index`.
    ///
    /// The move is checked against [`MoveContract`] before anything changes;
    /// if the result breaks an invariant the match is restored.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::MatchNotInProgress`], [`LobbyError::NotParticipant`],
    /// [`LobbyError::NotYourTurn`], [`LobbyError::CellOutOfRange`] or
    /// [`LobbyError::CellOccupied`] without touching the match.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn submit_move(
        &mut self,
        participant: &str,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<MoveReport, LobbyError> {
        let action = Move::new(participant.to_string(), index);
        MoveContract::pre(self, &action).inspect_err(|e| {
            warn!(participant, index, error = %e, "Move rejected");
        })?;

        let before = self.clone();
        let report = match self
            .apply_move(index, now)
            .and_then(|report| MoveContract::post(&before, self).map(|()| report))
        {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Move broke an invariant, restoring match");
                *self = before;
                return Err(e);
            }
        };

        info!(
            participant,
            index,
            evicted = ?report.evicted,
            status = %report.status,
            "Move accepted"
        );
        Ok(report)
    }

    /// Applies a move that already passed the preconditions.
    ///
    /// May leave the match half-updated on error; the caller restores it.
    fn apply_move(&mut self, index: usize, now: DateTime<Utc>) -> Result<MoveReport, LobbyError> {
        let mark = Mark::from_index(self.turn).ok_or_else(|| {
            LobbyError::InvariantViolation(format!("Turn index {} names no seat", self.turn))
        })?;
        let mut evicted = Vec::new();

        self.board
            .place(index, mark)
            .map_err(|e| LobbyError::InvariantViolation(e.to_string()))?;

        if let VariantRules::Erase { history } = &mut self.rules {
            evicted = history.record(index);
            for &cell in &evicted {
                self.board
                    .clear(cell)
                    .map_err(|e| LobbyError::InvariantViolation(e.to_string()))?;
            }
        }

        self.status = match &mut self.rules {
            VariantRules::Classic | VariantRules::Erase { .. } => evaluate(&self.board),
            VariantRules::Experimental { points } => {
                *points = tally_points(&self.board);
                match check_instant_win(&self.board) {
                    Some(winner) => Outcome::Won(winner),
                    None => Outcome::InProgress,
                }
            }
        };

        match self.status {
            Outcome::Won(winner) => self.wins.increment(winner),
            Outcome::InProgress => self.turn = 1 - self.turn,
            Outcome::Draw => {}
        }
        self.last_activity = now;

        Ok(MoveReport {
            index,
            mark,
            evicted,
            status: self.status,
        })
    }

    /// Records `participant`'s rematch vote.
    ///
    /// Once both participants have voted the board, turn, status and
    /// per-variant state reset and the votes clear. Cumulative wins persist.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::NotParticipant`] for an outsider's vote.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn request_rematch(
        &mut self,
        participant: &str,
        now: DateTime<Utc>,
    ) -> Result<RematchState, LobbyError> {
        if self.participant_index(participant).is_none() {
            warn!(participant, "Rematch vote from non-participant");
            return Err(LobbyError::NotParticipant(participant.to_string()));
        }

        self.rematch_votes.insert(participant.to_string());
        self.last_activity = now;

        let all_voted = self.players.iter().all(|p| self.rematch_votes.contains(p));
        if !all_voted {
            debug!(participant, votes = self.rematch_votes.len(), "Rematch vote recorded");
            return Ok(RematchState::Pending);
        }

        self.board = Board::new(self.variant());
        self.rules = self.rules.reset();
        self.turn = 0;
        self.status = Outcome::InProgress;
        self.rematch_votes.clear();

        info!(score_x = self.wins.x, score_o = self.wins.o, "Rematch started");
        Ok(RematchState::Restarted)
    }
}
