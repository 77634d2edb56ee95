//! # Scribble
//!
//! A real-time multiplayer drawing-and-guessing game server.
//!
//! Participants connect over WebSocket, send a `join` frame naming a room
//! and a display name, and from then on exchange JSON messages with the
//! room: one participant draws a secret word, everyone else guesses in
//! chat. Rooms are created on first join and disappear when empty.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scribble::prelude::*;
//!
//! # async fn start() -> Result<(), ScribbleError> {
//! let server = ScribbleServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ScribbleError;
pub use server::{ScribbleServer, ScribbleServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{ScribbleError, ScribbleServer, ScribbleServerBuilder};
    pub use scribble_protocol::{ClientMessage, ParticipantId, RoomId, ServerMessage};
    pub use scribble_room::{GameConfig, words};
}
