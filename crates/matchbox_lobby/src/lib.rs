//! Matchbox lobby - matches, matchmaking and solo play
//!
//! Owns every live match behind a per-match guard and pairs waiting
//! participants per variant. The game rules themselves live in
//! [`matchbox_rules`]; this crate arbitrates who may apply them and when.
//!
//! # Architecture
//!
//! - **Lobby**: [`Lobby`] is the entry point for every operation
//! - **Matches**: [`Match`] holds one match's board, turn and scores
//! - **Queue**: [`MatchmakingQueue`] pairs participants oldest first
//! - **Contracts**: preconditions and postconditions for each move
//! - **Capabilities**: [`MatchStore`] for persistence, [`Clock`] for time
//!
//! # Example
//!
//! ```
//! use matchbox_lobby::{Lobby, LobbyConfig, Matchmaking};
//! use matchbox_rules::{Mark, Outcome, Variant};
//!
//! let lobby = Lobby::new(LobbyConfig::default());
//! assert!(matches!(
//!     lobby.enqueue_or_match(Variant::Classic, "p1")?,
//!     Matchmaking::Waiting(_)
//! ));
//! let Matchmaking::Matched(game) = lobby.enqueue_or_match(Variant::Classic, "p2")? else {
//!     unreachable!("p1 was waiting");
//! };
//!
//! let id = game.id().clone();
//! for (who, cell) in [("p1", 0), ("p2", 3), ("p1", 1), ("p2", 4), ("p1", 2)] {
//!     lobby.submit_move(&id, who, cell)?;
//! }
//! assert_eq!(*lobby.get_match(&id)?.status(), Outcome::Won(Mark::X));
//! # Ok::<(), matchbox_lobby::LobbyError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod clock;
mod config;
mod contracts;
mod error;
mod invariants;
mod lobby;
mod match_state;
mod queue;
mod solo;
mod store;
mod sync;
mod view;

/// Identifier of a match.
pub type MatchId = String;

/// Opaque, caller-supplied identifier of a participant.
pub type ParticipantId = String;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LobbyConfig};
pub use contracts::{
    CellIsVacant, Contract, LegalMove, MatchInProgress, Move, MoveContract, ParticipantsTurn,
};
pub use error::LobbyError;
pub use invariants::{
    BoardShapeInvariant, HistoryConsistentInvariant, Invariant, InvariantSet, InvariantViolation,
    MatchInvariants, TurnIndexInvariant,
};
pub use lobby::{Lobby, Matchmaking, WaitingAck};
pub use match_state::{Match, MoveReport, RematchState, VariantRules};
pub use queue::{Admission, MatchmakingQueue, WaitingEntry};
pub use solo::{COMPUTER_ID, SoloTurn, supports_solo};
pub use store::{InMemoryStore, MatchStore};
pub use view::ParticipantView;
