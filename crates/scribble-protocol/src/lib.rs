//! Wire protocol for Scribble.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`DrawEvent`],
//!   [`ParticipantId`], [`RoomId`], ...): the structures that travel on
//!   the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from text.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! ```text
//! Transport (text frames) → Protocol (typed messages) → Room (game rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientMessage, DrawEvent, ParticipantId, Role, RoomId, ScoreEntry, ServerMessage,
    StrokeData,
};
