//! The lobby: owns live matches and the matchmaking queue.
//!
//! Transitions on one match are serialized by a per-match guard held for
//! the whole load, apply and save sequence. Different matches never
//! contend. The guard table lock is only held long enough to look up or
//! insert a guard, never while a match guard is being acquired.

use crate::clock::{Clock, SystemClock};
use crate::config::LobbyConfig;
use crate::error::LobbyError;
use crate::match_state::{Match, RematchState};
use crate::queue::{Admission, MatchmakingQueue, WaitingEntry};
use crate::solo::{COMPUTER_ID, SoloTurn, answer_as_computer, supports_solo};
use crate::store::{InMemoryStore, MatchStore};
use crate::sync::lock;
use crate::view::ParticipantView;
use crate::{MatchId, ParticipantId};
use chrono::{DateTime, Utc};
use matchbox_rules::Variant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Acknowledgement that a participant is queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingAck {
    /// Lane the participant waits in.
    pub variant: Variant,
    /// Place in the lane (0 = next to be paired).
    pub position: usize,
    /// Seconds before the entry is pruned.
    pub timeout_secs: u64,
}

/// Result of [`Lobby::enqueue_or_match`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Matchmaking {
    /// A partner was waiting; this is the new match.
    Matched(Match),
    /// No partner yet.
    Waiting(WaitingAck),
}

/// Process-wide registry of matches and waiting participants.
#[derive(Debug)]
pub struct Lobby<S: MatchStore = InMemoryStore, C: Clock = SystemClock> {
    config: LobbyConfig,
    store: S,
    clock: C,
    queue: MatchmakingQueue,
    guards: Mutex<HashMap<MatchId, Arc<Mutex<()>>>>,
    next_id: AtomicU64,
}

impl Lobby {
    /// Creates a lobby backed by memory and the system clock.
    #[instrument(skip(config))]
    pub fn new(config: LobbyConfig) -> Self {
        Self::with_parts(config, InMemoryStore::new(), SystemClock)
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new(LobbyConfig::default())
    }
}

impl<S: MatchStore, C: Clock> Lobby<S, C> {
    /// Creates a lobby over the given store and clock.
    #[instrument(skip_all)]
    pub fn with_parts(config: LobbyConfig, store: S, clock: C) -> Self {
        info!(
            queue_timeout_secs = config.queue_timeout_secs(),
            match_idle_timeout_secs = config.match_idle_timeout_secs(),
            erase_window = config.erase_window(),
            "Creating lobby"
        );
        Self {
            config,
            store,
            clock,
            queue: MatchmakingQueue::new(),
            guards: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Starts a two-participant match. Participant 0 moves first.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::DuplicateParticipant`] if both seats name the
    /// same participant.
    #[instrument(skip(self))]
    pub fn create_match(
        &self,
        variant: Variant,
        participants: [ParticipantId; 2],
    ) -> Result<Match, LobbyError> {
        if participants[0] == participants[1] {
            warn!("Participant paired with themselves");
            return Err(LobbyError::DuplicateParticipant(participants[0].clone()));
        }
        Ok(self.open(variant, participants, false))
    }

    /// Starts a match against the computer. The human moves first.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::SoloUnsupported`] for Experimental and
    /// [`LobbyError::DuplicateParticipant`] if the human uses the
    /// computer's id.
    #[instrument(skip(self))]
    pub fn create_solo_match(
        &self,
        variant: Variant,
        participant: &str,
    ) -> Result<Match, LobbyError> {
        if !supports_solo(variant) {
            warn!("Solo requested for unsupported variant");
            return Err(LobbyError::SoloUnsupported(variant));
        }
        if participant == COMPUTER_ID {
            return Err(LobbyError::DuplicateParticipant(participant.to_string()));
        }
        Ok(self.open(
            variant,
            [participant.to_string(), COMPUTER_ID.to_string()],
            true,
        ))
    }

    fn open(&self, variant: Variant, players: [ParticipantId; 2], solo: bool) -> Match {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = format!("{}-{:06}", variant, seq);
        let game = Match::new(
            id.clone(),
            variant,
            players,
            *self.config.erase_window(),
            solo,
            self.clock.now(),
        );
        lock(&self.guards).insert(id, Arc::new(Mutex::new(())));
        self.store.save(game.clone());
        game
    }

    /// Places `participant`'s mark at `index`.
    ///
    /// In a solo match the computer answers inside the same transition, so
    /// the returned match is already waiting on the human again.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::InvalidMatch`] for an unknown or expired match,
    /// or any rejection from [`Match::submit_move`]. A rejected move leaves
    /// the match unchanged.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        match_id: &str,
        participant: &str,
        index: usize,
    ) -> Result<Match, LobbyError> {
        let (_, game) = self.transition(match_id, |game, now| {
            game.submit_move(participant, index, now)?;
            answer_as_computer(game, now)
        })?;
        Ok(game)
    }

    /// Plays a solo move and reports both the human's move and the reply.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::InvalidMatch`] if `match_id` is not a live solo
    /// match, or any rejection from [`Match::submit_move`].
    #[instrument(skip(self))]
    pub fn submit_solo_move(
        &self,
        match_id: &str,
        participant: &str,
        index: usize,
    ) -> Result<SoloTurn, LobbyError> {
        let (turn, _) = self.transition(match_id, |game, now| {
            if !*game.solo() {
                warn!("Solo move on a two-participant match");
                return Err(LobbyError::InvalidMatch(match_id.to_string()));
            }
            let human = game.submit_move(participant, index, now)?;
            let computer = answer_as_computer(game, now)?;
            Ok(SoloTurn { human, computer })
        })?;
        Ok(turn)
    }

    /// Records a rematch vote; the round restarts once both have voted.
    ///
    /// The computer always agrees, so in solo one vote restarts the round.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::InvalidMatch`] or [`LobbyError::NotParticipant`].
    #[instrument(skip(self))]
    pub fn request_rematch(
        &self,
        match_id: &str,
        participant: &str,
    ) -> Result<Match, LobbyError> {
        let (_, game) = self.transition(match_id, |game, now| {
            let state = game.request_rematch(participant, now)?;
            if state == RematchState::Pending && *game.solo() {
                return game.request_rematch(COMPUTER_ID, now);
            }
            Ok(state)
        })?;
        Ok(game)
    }

    /// Destroys the match if `participant` plays in it.
    ///
    /// Leaving a match one does not play in changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::InvalidMatch`] for an unknown or expired match.
    #[instrument(skip(self))]
    pub fn leave(&self, match_id: &str, participant: &str) -> Result<(), LobbyError> {
        let guard = self.guard(match_id)?;
        let _held = lock(&guard);
        let game = self.load_live(match_id)?;

        if game.participant_index(participant).is_none() {
            debug!("Leave from non-participant ignored");
            return Ok(());
        }

        self.destroy(match_id);
        info!(status = %game.status(), "Participant left, match destroyed");
        Ok(())
    }

    /// Pairs `participant` with the oldest waiting entry of the same variant,
    /// or queues them.
    ///
    /// The waiting participant becomes participant 0 and moves first. Both
    /// participants leave every other lane they were waiting in.
    ///
    /// # Errors
    ///
    /// Never fails for a fresh pairing; the error type is shared with
    /// [`Lobby::create_match`].
    #[instrument(skip(self))]
    pub fn enqueue_or_match(
        &self,
        variant: Variant,
        participant: &str,
    ) -> Result<Matchmaking, LobbyError> {
        let now = self.clock.now();
        match self
            .queue
            .admit(variant, participant, now, self.config.queue_timeout())
        {
            Admission::Paired(partner) => {
                let players = [partner.participant().clone(), participant.to_string()];
                let game = self.create_match(variant, players)?;
                info!(match_id = %game.id(), "Matchmaking paired participants");
                Ok(Matchmaking::Matched(game))
            }
            Admission::Waiting { position } => Ok(Matchmaking::Waiting(WaitingAck {
                variant,
                position,
                timeout_secs: *self.config.queue_timeout_secs(),
            })),
        }
    }

    /// Withdraws `participant` from the queue. Returns true if they were waiting.
    #[instrument(skip(self))]
    pub fn cancel_wait(&self, participant: &str) -> bool {
        self.queue.cancel(participant)
    }

    /// Participants currently waiting for `variant`, oldest first.
    pub fn waiting(&self, variant: Variant) -> Vec<WaitingEntry> {
        self.queue.waiting(variant)
    }

    /// Drops queue entries older than the queue timeout.
    #[instrument(skip(self))]
    pub fn prune_waiting(&self) -> usize {
        self.queue
            .prune_expired(self.clock.now(), self.config.queue_timeout())
    }

    /// `participant`'s snapshot of a match.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::InvalidMatch`] or [`LobbyError::NotParticipant`].
    #[instrument(skip(self))]
    pub fn view(
        &self,
        match_id: &str,
        participant: &str,
    ) -> Result<ParticipantView, LobbyError> {
        let game = self.get_match(match_id)?;
        ParticipantView::of(&game, participant)
    }

    /// Current state of a live match.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::InvalidMatch`] for an unknown or expired match.
    #[instrument(skip(self))]
    pub fn get_match(&self, match_id: &str) -> Result<Match, LobbyError> {
        let guard = self.guard(match_id)?;
        let _held = lock(&guard);
        self.load_live(match_id)
    }

    /// Ids of every stored match.
    pub fn match_ids(&self) -> Vec<MatchId> {
        self.store.ids()
    }

    /// Destroys every match idle longer than the idle timeout.
    /// Returns how many were destroyed.
    #[instrument(skip(self))]
    pub fn sweep_idle_matches(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.config.match_idle_timeout();
        let mut swept = 0;

        for id in self.store.ids() {
            let Ok(guard) = self.guard(&id) else {
                continue;
            };
            let _held = lock(&guard);
            if let Some(game) = self.store.load(&id)
                && game.is_idle(now, ttl)
            {
                self.destroy(&id);
                swept += 1;
            }
        }

        if swept > 0 {
            info!(swept, "Swept idle matches");
        }
        swept
    }

    /// Runs `apply` on a copy of the match under its guard and saves the
    /// copy only if `apply` succeeds.
    fn transition<T>(
        &self,
        match_id: &str,
        apply: impl FnOnce(&mut Match, DateTime<Utc>) -> Result<T, LobbyError>,
    ) -> Result<(T, Match), LobbyError> {
        let guard = self.guard(match_id)?;
        let _held = lock(&guard);

        let mut game = self.load_live(match_id)?;
        let out = apply(&mut game, self.clock.now())?;
        self.store.save(game.clone());
        Ok((out, game))
    }

    fn guard(&self, match_id: &str) -> Result<Arc<Mutex<()>>, LobbyError> {
        lock(&self.guards)
            .get(match_id)
            .cloned()
            .ok_or_else(|| {
                debug!(match_id, "No guard for match");
                LobbyError::InvalidMatch(match_id.to_string())
            })
    }

    /// Loads a match, destroying it instead if it has gone idle.
    /// Callers hold the match guard.
    fn load_live(&self, match_id: &str) -> Result<Match, LobbyError> {
        let game = self
            .store
            .load(match_id)
            .ok_or_else(|| LobbyError::InvalidMatch(match_id.to_string()))?;

        if game.is_idle(self.clock.now(), self.config.match_idle_timeout()) {
            info!(match_id, "Match expired from inactivity");
            self.destroy(match_id);
            return Err(LobbyError::InvalidMatch(match_id.to_string()));
        }
        Ok(game)
    }

    fn destroy(&self, match_id: &str) {
        self.store.remove(match_id);
        lock(&self.guards).remove(match_id);
    }
}
