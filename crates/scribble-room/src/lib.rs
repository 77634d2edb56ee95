//! Room orchestration for Scribble.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! members, phase, word, draw history and round timer.
//!
//! # Key types
//!
//! - [`SessionRegistry`]: creates rooms lazily, forgets them when empty
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomSnapshot`]: a point-in-time copy of a room
//! - [`GameConfig`]: timings, limits, scoring and the word list
//! - [`Phase`]: Lobby → Selecting → Drawing → Scoring
//! - [`TurnQueue`], [`Hint`], [`DrawHistory`]: the round's building blocks

mod config;
mod error;
mod hint;
mod history;
mod participant;
mod registry;
mod room;
mod timer;
mod turn;
pub mod words;

pub use config::{GameConfig, Phase};
pub use error::RoomError;
pub use hint::Hint;
pub use history::DrawHistory;
pub use participant::{NewParticipant, ParticipantSender};
pub use registry::SessionRegistry;
pub use room::{ParticipantInfo, RoomHandle, RoomSnapshot, TimerSnapshot};
pub use timer::TimerPurpose;
pub use turn::TurnQueue;
