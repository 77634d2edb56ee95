//! Turn queue: round-robin drawer rotation over shuffled cycles.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use scribble_protocol::ParticipantId;

/// Drawer order for a room.
///
/// The queue is consumed front to back and refilled with a shuffled copy
/// of the current members only when it is empty at selection time, so
/// everyone draws once before anyone draws twice.
#[derive(Debug, Default, Clone)]
pub struct TurnQueue {
    queue: VecDeque<ParticipantId>,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the next drawer among `members`.
    ///
    /// Entries for participants who have left are discarded. If the queue
    /// runs dry without a valid candidate it is refilled once more; the
    /// call never loops beyond that. Returns `None` when fewer than
    /// `min_players` members are present.
    pub fn next_drawer<R: Rng + ?Sized>(
        &mut self,
        members: &[ParticipantId],
        min_players: usize,
        rng: &mut R,
    ) -> Option<ParticipantId> {
        if members.len() < min_players.max(1) {
            return None;
        }

        for _ in 0..2 {
            if self.queue.is_empty() {
                self.refill(members, rng);
            }
            while let Some(candidate) = self.queue.pop_front() {
                if members.contains(&candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Drops a participant from the pending order.
    pub fn remove(&mut self, id: ParticipantId) {
        self.queue.retain(|&queued| queued != id);
    }

    /// Participants still waiting for a turn in this cycle.
    pub fn pending(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.queue.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn refill<R: Rng + ?Sized>(&mut self, members: &[ParticipantId], rng: &mut R) {
        let mut order = members.to_vec();
        order.shuffle(rng);
        self.queue.extend(order);
    }
}
