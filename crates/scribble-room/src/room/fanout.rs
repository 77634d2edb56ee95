//! Broadcast fan-out with per-connection failure isolation.

use std::sync::Arc;

use scribble_protocol::{Codec, ParticipantId, ServerMessage};

use super::RoomActor;
use crate::participant::ParticipantSender;

/// Who receives a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recipient {
    All,
    Only(ParticipantId),
    AllExcept(ParticipantId),
}

impl Recipient {
    fn includes(self, id: ParticipantId) -> bool {
        match self {
            Self::All => true,
            Self::Only(target) => id == target,
            Self::AllExcept(excluded) => id != excluded,
        }
    }
}

impl RoomActor {
    /// Serializes `msg` once and queues it for every matching member.
    ///
    /// Delivery goes to a copy of the member list taken up front. A
    /// closed queue never stops delivery to the others; the member is
    /// recorded and removed by [`flush_failed`](Self::flush_failed)
    /// once the current event is done.
    pub(super) fn send(&mut self, to: Recipient, msg: &ServerMessage) {
        let payload: Arc<str> = match self.codec.encode(msg) {
            Ok(text) => text.into(),
            Err(e) => {
                tracing::error!(room_id = %self.room_id, error = %e, "failed to encode message");
                return;
            }
        };

        let targets: Vec<(ParticipantId, ParticipantSender)> = self
            .participants
            .iter()
            .filter(|p| to.includes(p.id))
            .map(|p| (p.id, p.sender.clone()))
            .collect();

        for (id, sender) in targets {
            if sender.send(Arc::clone(&payload)).is_err() && !self.failed.contains(&id) {
                tracing::debug!(room_id = %self.room_id, participant = %id, "outbound queue closed");
                self.failed.push(id);
            }
        }
    }

    /// Removes every member whose queue was found closed, exactly as if
    /// they had left. Removal may broadcast and uncover further failures;
    /// the loop ends because each pass shrinks the room.
    pub(super) fn flush_failed(&mut self) {
        while !self.failed.is_empty() {
            let id = self.failed.remove(0);
            if self.remove_participant(id).is_some() {
                tracing::info!(
                    room_id = %self.room_id,
                    participant = %id,
                    "removed participant after send failure"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_includes() {
        let a = ParticipantId(1);
        let b = ParticipantId(2);
        assert!(Recipient::All.includes(a));
        assert!(Recipient::Only(a).includes(a));
        assert!(!Recipient::Only(a).includes(b));
        assert!(!Recipient::AllExcept(a).includes(a));
        assert!(Recipient::AllExcept(a).includes(b));
    }
}
