//! Room members and the leaderboard.

use std::sync::Arc;

use scribble_protocol::{ParticipantId, ScoreEntry};
use tokio::sync::mpsc;

/// Outbound queue to one participant's connection.
///
/// Payloads are serialized once per event and shared between recipients.
/// A closed queue means the connection is gone.
pub type ParticipantSender = mpsc::UnboundedSender<Arc<str>>;

/// Everything a room needs to admit a new member.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub id: ParticipantId,
    pub name: String,
    pub sender: ParticipantSender,
}

impl NewParticipant {
    pub fn new(id: ParticipantId, name: impl Into<String>, sender: ParticipantSender) -> Self {
        Self {
            id,
            name: name.into(),
            sender,
        }
    }
}

/// A member of a room. Owned by the room actor.
#[derive(Debug)]
pub(crate) struct Participant {
    pub(crate) id: ParticipantId,
    pub(crate) name: String,
    /// Only ever increases while the participant stays in the room.
    pub(crate) score: u32,
    pub(crate) sender: ParticipantSender,
}

impl From<NewParticipant> for Participant {
    fn from(new: NewParticipant) -> Self {
        Self {
            id: new.id,
            name: new.name,
            score: 0,
            sender: new.sender,
        }
    }
}

/// Scores sorted descending; ties keep join order.
pub(crate) fn leaderboard(participants: &[Participant]) -> Vec<ScoreEntry> {
    let mut entries: Vec<ScoreEntry> = participants
        .iter()
        .map(|p| ScoreEntry {
            name: p.name.clone(),
            score: p.score,
        })
        .collect();
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}
