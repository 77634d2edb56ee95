//! Room actor: an isolated Tokio task that owns one game session.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. Joins, leaves, participant messages and timer
//! ticks are all handled by the same loop, one at a time, so nothing else
//! ever observes a room halfway through an update.

mod fanout;
mod round;

use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use scribble_protocol::{ClientMessage, JsonCodec, ParticipantId, RoomId};
use scribble_tick::TickInfo;
use tokio::sync::{mpsc, oneshot};

use crate::history::DrawHistory;
use crate::hint::Hint;
use crate::participant::{NewParticipant, Participant};
use crate::timer::{RoundTimer, TimerPurpose, next_tick};
use crate::turn::TurnQueue;
use crate::{GameConfig, Phase, RoomError};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and waits for the response on it.
pub(crate) enum RoomCommand {
    /// Add a participant to the room.
    Join {
        participant: NewParticipant,
        reply: oneshot::Sender<Result<RoomSnapshot, RoomError>>,
    },

    /// Remove a participant. Replies with the number of members left.
    Leave {
        id: ParticipantId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// Deliver a message from a participant.
    Message {
        sender: ParticipantId,
        msg: ClientMessage,
    },

    /// Request a snapshot of the room.
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },

    /// Stop the room.
    Shutdown,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One member as seen in a [`RoomSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantInfo {
    pub id: ParticipantId,
    pub name: String,
    pub score: u32,
}

/// The active timer as seen in a [`RoomSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub purpose: TimerPurpose,
    pub remaining: u32,
}

/// A point-in-time copy of a room's state.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub phase: Phase,
    pub drawer: Option<ParticipantId>,
    /// The secret word; empty outside Drawing.
    pub word: String,
    /// The hint as guessers see it; empty outside Drawing.
    pub hint: String,
    /// Members in join order.
    pub participants: Vec<ParticipantInfo>,
    pub guessed_count: usize,
    pub history_len: usize,
    pub timer: Option<TimerSnapshot>,
}

impl RoomSnapshot {
    pub fn member_count(&self) -> usize {
        self.participants.len()
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&ParticipantInfo> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn score_of(&self, id: ParticipantId) -> Option<u32> {
        self.participant(id).map(|p| p.score)
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running room actor. Used to send commands to it.
///
/// This is cheap to clone: it is just an `mpsc::Sender` wrapper.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's identifier.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Adds a participant and returns the room as they found it.
    pub async fn join(&self, participant: NewParticipant) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command(RoomCommand::Join {
            participant,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Removes a participant and returns how many members remain.
    pub async fn leave(&self, id: ParticipantId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command(RoomCommand::Leave {
            id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Forwards a participant's message (fire-and-forget).
    pub async fn send_message(
        &self,
        sender: ParticipantId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.command(RoomCommand::Message { sender, msg }).await
    }

    /// Requests a snapshot of the room.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command(RoomCommand::Snapshot { reply: reply_tx })
            .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.command(RoomCommand::Shutdown).await
    }

    async fn command(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

enum Event {
    Command(RoomCommand),
    Tick(TimerPurpose, TickInfo),
}

/// The internal room state. Runs inside a Tokio task.
pub(crate) struct RoomActor {
    room_id: RoomId,
    config: Arc<GameConfig>,
    codec: JsonCodec,
    /// Members in join order.
    participants: Vec<Participant>,
    /// Always a current member when set.
    drawer: Option<ParticipantId>,
    phase: Phase,
    word: String,
    hint: Hint,
    /// Words offered to the drawer during Selecting.
    offered: Vec<String>,
    /// Non-drawers who guessed this round.
    guessed: HashSet<ParticipantId>,
    turns: TurnQueue,
    history: DrawHistory,
    /// At most one timer per room.
    timer: Option<RoundTimer>,
    rng: StdRng,
    /// Participants whose outbound queue was found closed, removed after
    /// the current event.
    failed: Vec<ParticipantId>,
    /// Set on the first successful join; an empty room that has had
    /// members stops.
    occupied: bool,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until the room empties or is shut down.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        loop {
            let event = tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => Event::Command(cmd),
                    None => break,
                },
                (purpose, tick) = next_tick(&mut self.timer) => Event::Tick(purpose, tick),
            };

            let stop = match event {
                Event::Command(cmd) => self.handle_command(cmd),
                Event::Tick(purpose, tick) => {
                    self.on_tick(purpose, tick);
                    false
                }
            };
            self.flush_failed();

            if stop || (self.occupied && self.participants.is_empty()) {
                break;
            }
        }

        self.cancel_timer();
        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    /// Returns `true` if the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join { participant, reply } => {
                let result = self.join(participant);
                let _ = reply.send(result);
            }
            RoomCommand::Leave { id, reply } => {
                let result = match self.remove_participant(id) {
                    Some(_) => Ok(self.participants.len()),
                    None => Err(RoomError::NotInRoom(id, self.room_id.clone())),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Message { sender, msg } => {
                self.handle_message(sender, msg);
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room_id = %self.room_id, "room shutting down");
                return true;
            }
        }
        false
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            phase: self.phase,
            drawer: self.drawer,
            word: self.word.clone(),
            hint: self.hint.render(),
            participants: self
                .participants
                .iter()
                .map(|p| ParticipantInfo {
                    id: p.id,
                    name: p.name.clone(),
                    score: p.score,
                })
                .collect(),
            guessed_count: self.guessed.len(),
            history_len: self.history.len(),
            timer: self.timer.as_ref().map(|t| TimerSnapshot {
                purpose: t.purpose(),
                remaining: t.remaining(),
            }),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room(room_id: RoomId, config: Arc<GameConfig>) -> RoomHandle {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let actor = RoomActor {
        room_id: room_id.clone(),
        config,
        codec: JsonCodec,
        participants: Vec::new(),
        drawer: None,
        phase: Phase::Lobby,
        word: String::new(),
        hint: Hint::default(),
        offered: Vec::new(),
        guessed: HashSet::new(),
        turns: TurnQueue::new(),
        history: DrawHistory::new(),
        timer: None,
        rng,
        failed: Vec::new(),
        occupied: false,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
