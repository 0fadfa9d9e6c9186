//! Matchmaking queue.
//!
//! One FIFO lane per variant, all behind a single lock. Prune, scan, pair
//! and the withdrawal of both paired participants from every other lane
//! happen under that lock, so a waiting entry can be claimed once and a
//! participant is never seated by two lanes.

use crate::ParticipantId;
use crate::sync::lock;
use chrono::{DateTime, TimeDelta, Utc};
use derive_getters::Getters;
use derive_new::new;
use matchbox_rules::Variant;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

/// A participant waiting to be paired.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct WaitingEntry {
    /// Who is waiting.
    participant: ParticipantId,
    /// When they joined the lane.
    joined_at: DateTime<Utc>,
}

impl WaitingEntry {
    fn is_expired(&self, now: DateTime<Utc>, timeout: TimeDelta) -> bool {
        now.signed_duration_since(self.joined_at) > timeout
    }
}

/// Outcome of offering a participant to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The oldest compatible waiting entry, now removed from every lane.
    Paired(WaitingEntry),
    /// The participant is queued at `position` (0 = next to be paired).
    Waiting {
        /// Place in the lane.
        position: usize,
    },
}

type Lanes = BTreeMap<Variant, VecDeque<WaitingEntry>>;

/// Waiting participants, grouped by variant.
#[derive(Debug)]
pub struct MatchmakingQueue {
    lanes: Mutex<Lanes>,
}

impl MatchmakingQueue {
    /// Creates an empty queue with one lane per variant.
    #[instrument]
    pub fn new() -> Self {
        let lanes = Variant::iter()
            .map(|variant| (variant, VecDeque::new()))
            .collect();
        Self {
            lanes: Mutex::new(lanes),
        }
    }

    /// Prunes expired entries, then pairs `participant` with the oldest
    /// remaining entry or queues them.
    ///
    /// A participant already waiting in this lane keeps their place. On a
    /// pairing both participants leave every other lane.
    #[instrument(skip(self, timeout))]
    pub fn admit(
        &self,
        variant: Variant,
        participant: &str,
        now: DateTime<Utc>,
        timeout: TimeDelta,
    ) -> Admission {
        let mut lanes = lock(&self.lanes);

        let pruned = prune(&mut lanes, now, timeout);
        if pruned > 0 {
            info!(pruned, "Pruned stale waiting entries");
        }

        let lane = lanes.entry(variant).or_default();
        if let Some(position) = lane.iter().position(|e| e.participant() == participant) {
            debug!(position, "Participant already waiting");
            return Admission::Waiting { position };
        }

        if let Some(partner) = lane.pop_front() {
            withdraw(&mut lanes, partner.participant());
            withdraw(&mut lanes, participant);
            info!(partner = %partner.participant(), "Paired with waiting participant");
            return Admission::Paired(partner);
        }

        lane.push_back(WaitingEntry::new(participant.to_string(), now));
        debug!(waiting = lane.len(), "Participant queued");
        Admission::Waiting {
            position: lane.len() - 1,
        }
    }

    /// Removes `participant` from every lane. Returns true if they were waiting.
    #[instrument(skip(self))]
    pub fn cancel(&self, participant: &str) -> bool {
        let removed = withdraw(&mut lock(&self.lanes), participant);
        if removed {
            info!("Participant left the queue");
        }
        removed
    }

    /// Drops expired entries from every lane. Returns how many were dropped.
    #[instrument(skip(self, timeout))]
    pub fn prune_expired(&self, now: DateTime<Utc>, timeout: TimeDelta) -> usize {
        let pruned = prune(&mut lock(&self.lanes), now, timeout);
        if pruned > 0 {
            info!(pruned, "Pruned stale waiting entries");
        }
        pruned
    }

    /// Snapshot of a lane, oldest first.
    pub fn waiting(&self, variant: Variant) -> Vec<WaitingEntry> {
        lock(&self.lanes)
            .get(&variant)
            .map(|lane| lane.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MatchmakingQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn prune(lanes: &mut Lanes, now: DateTime<Utc>, timeout: TimeDelta) -> usize {
    let mut pruned = 0;
    for lane in lanes.values_mut() {
        let before = lane.len();
        lane.retain(|entry| !entry.is_expired(now, timeout));
        pruned += before - lane.len();
    }
    pruned
}

fn withdraw(lanes: &mut Lanes, participant: &str) -> bool {
    let mut removed = false;
    for lane in lanes.values_mut() {
        let before = lane.len();
        lane.retain(|entry| entry.participant() != participant);
        removed |= lane.len() < before;
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(secs)
    }

    fn timeout() -> TimeDelta {
        TimeDelta::seconds(15)
    }

    #[test]
    fn test_first_participant_waits() {
        let queue = MatchmakingQueue::new();
        assert_eq!(
            queue.admit(Variant::Classic, "p1", at(0), timeout()),
            Admission::Waiting { position: 0 }
        );
        assert_eq!(queue.waiting(Variant::Classic).len(), 1);
    }

    #[test]
    fn test_pairs_oldest_first() {
        let queue = MatchmakingQueue::new();
        queue.admit(Variant::Classic, "p1", at(0), timeout());
        let admission = queue.admit(Variant::Classic, "p2", at(1), timeout());
        let Admission::Paired(partner) = admission else {
            panic!("expected a pairing");
        };
        assert_eq!(partner.participant(), "p1");

        // p3 and p5 both waiting; p4 takes the older entry
        queue.admit(Variant::Classic, "p3", at(2), timeout());
        queue.admit(Variant::Classic, "p5", at(3), timeout());
        let admission = queue.admit(Variant::Classic, "p4", at(4), timeout());
        let Admission::Paired(partner) = admission else {
            panic!("expected a pairing");
        };
        assert_eq!(partner.participant(), "p3");
    }

    #[test]
    fn test_variants_do_not_mix() {
        let queue = MatchmakingQueue::new();
        queue.admit(Variant::Classic, "p1", at(0), timeout());
        assert!(matches!(
            queue.admit(Variant::Erase, "p2", at(1), timeout()),
            Admission::Waiting { .. }
        ));
    }

    #[test]
    fn test_expired_entries_pruned_before_pairing() {
        let queue = MatchmakingQueue::new();
        queue.admit(Variant::Classic, "p1", at(0), timeout());
        assert_eq!(
            queue.admit(Variant::Classic, "p2", at(16), timeout()),
            Admission::Waiting { position: 0 }
        );
        assert_eq!(queue.waiting(Variant::Classic)[0].participant(), "p2");
    }

    #[test]
    fn test_entry_at_exact_timeout_still_pairs() {
        let queue = MatchmakingQueue::new();
        queue.admit(Variant::Classic, "p1", at(0), timeout());
        assert!(matches!(
            queue.admit(Variant::Classic, "p2", at(15), timeout()),
            Admission::Paired(_)
        ));
    }

    #[test]
    fn test_requeue_keeps_place() {
        let queue = MatchmakingQueue::new();
        queue.admit(Variant::Classic, "p1", at(0), timeout());
        assert_eq!(
            queue.admit(Variant::Classic, "p1", at(1), timeout()),
            Admission::Waiting { position: 0 }
        );
        assert_eq!(queue.waiting(Variant::Classic).len(), 1);
    }

    #[test]
    fn test_cancel_removes_entry() {
        let queue = MatchmakingQueue::new();
        queue.admit(Variant::Erase, "p1", at(0), timeout());
        assert!(queue.cancel("p1"));
        assert!(!queue.cancel("p1"));
        assert!(queue.waiting(Variant::Erase).is_empty());
    }

    #[test]
    fn test_prune_expired_counts() {
        let queue = MatchmakingQueue::new();
        queue.admit(Variant::Classic, "p1", at(0), timeout());
        queue.admit(Variant::Experimental, "p2", at(10), timeout());
        assert_eq!(queue.prune_expired(at(20), timeout()), 1);
        assert_eq!(queue.waiting(Variant::Experimental).len(), 1);
    }

    #[test]
    fn test_pairing_withdraws_both_from_other_lanes() {
        let queue = MatchmakingQueue::new();
        queue.admit(Variant::Classic, "p1", at(0), timeout());
        queue.admit(Variant::Erase, "p1", at(0), timeout());
        queue.admit(Variant::Experimental, "p2", at(1), timeout());

        let admission = queue.admit(Variant::Classic, "p2", at(2), timeout());
        assert!(matches!(admission, Admission::Paired(ref e) if e.participant() == "p1"));
        assert!(queue.waiting(Variant::Erase).is_empty());
        assert!(queue.waiting(Variant::Experimental).is_empty());

        // p1 is seated, so p3 cannot claim them from the Erase lane
        assert_eq!(
            queue.admit(Variant::Erase, "p3", at(3), timeout()),
            Admission::Waiting { position: 0 }
        );
    }
}
