//! Session registry: maps room ids to running rooms.

use std::collections::HashMap;
use std::sync::Arc;

use scribble_protocol::{ParticipantId, RoomId};

use crate::room::spawn_room;
use crate::{GameConfig, NewParticipant, RoomError, RoomHandle, RoomSnapshot};

/// Tracks every live room.
///
/// Rooms are created on the first join to an unseen id and dropped from
/// the registry as soon as their last member leaves. A room actor stops
/// by itself once empty, so a handle whose actor is gone is treated the
/// same as a missing room.
pub struct SessionRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
    config: Arc<GameConfig>,
}

impl SessionRegistry {
    /// Creates an empty registry. The config is validated once here and
    /// shared by every room.
    ///
    /// # Errors
    /// Returns [`RoomError::InvalidConfig`] if the config cannot run a game.
    pub fn new(config: GameConfig) -> Result<Self, RoomError> {
        Ok(Self {
            rooms: HashMap::new(),
            config: Arc::new(config.validated()?),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Adds a participant to a room, creating the room if needed.
    ///
    /// Returns the room's handle and a snapshot taken right after the join.
    pub async fn join(
        &mut self,
        room_id: RoomId,
        participant: NewParticipant,
    ) -> Result<(RoomHandle, RoomSnapshot), RoomError> {
        self.prune();

        let handle = self.handle_or_create(&room_id);
        match handle.join(participant.clone()).await {
            Ok(snapshot) => Ok((handle, snapshot)),
            Err(RoomError::Unavailable(_)) => {
                // The actor emptied and stopped after the lookup.
                self.rooms.remove(&room_id);
                let handle = self.handle_or_create(&room_id);
                let snapshot = handle.join(participant).await?;
                Ok((handle, snapshot))
            }
            Err(e) => Err(e),
        }
    }

    /// Removes a participant and returns how many members remain.
    ///
    /// The room is forgotten once nobody is left.
    pub async fn leave(
        &mut self,
        room_id: &RoomId,
        participant: ParticipantId,
    ) -> Result<usize, RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        match handle.leave(participant).await {
            Ok(0) => {
                self.rooms.remove(room_id);
                tracing::info!(%room_id, "room destroyed");
                Ok(0)
            }
            Ok(remaining) => Ok(remaining),
            Err(RoomError::Unavailable(_)) if handle.is_closed() => {
                // Already emptied through send failures.
                self.rooms.remove(room_id);
                tracing::info!(%room_id, "room destroyed");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns a snapshot of a live room.
    pub async fn snapshot(&self, room_id: &RoomId) -> Result<RoomSnapshot, RoomError> {
        let handle = self
            .handle(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.snapshot().await
    }

    /// Returns the handle of a live room.
    pub fn handle(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms
            .get(room_id)
            .filter(|handle| !handle.is_closed())
            .cloned()
    }

    /// Returns `true` if the room exists and is running.
    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.handle(room_id).is_some()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.values().filter(|h| !h.is_closed()).count()
    }

    /// Ids of all live rooms.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|(_, h)| !h.is_closed())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Stops every room.
    pub async fn shutdown(&mut self) {
        for (room_id, handle) in self.rooms.drain() {
            if handle.shutdown().await.is_ok() {
                tracing::info!(%room_id, "room shut down");
            }
        }
    }

    fn handle_or_create(&mut self, room_id: &RoomId) -> RoomHandle {
        let config = &self.config;
        self.rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                tracing::info!(%room_id, "room created");
                spawn_room(room_id.clone(), Arc::clone(config))
            })
            .clone()
    }

    fn prune(&mut self) {
        self.rooms.retain(|room_id, handle| {
            let alive = !handle.is_closed();
            if !alive {
                tracing::debug!(%room_id, "dropping stopped room");
            }
            alive
        });
    }
}
