//! Transport abstraction layer for Scribble.
//!
//! Accepting a peer happens in two steps. [`Transport::accept`] returns as
//! soon as the socket is accepted, and [`Upgrade::upgrade`] finishes the
//! protocol handshake. Only the first step runs on the accept loop, so one
//! slow peer cannot hold up the others.
//!
//! A [`Connection`] is an ordered, message-oriented, bidirectional channel
//! carrying text payloads. `recv` returns `Ok(None)` once the peer has
//! closed it.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{IncomingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

/// Process-unique identifier of an accepted peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Listens for peers.
pub trait Transport: Send + Sync + 'static {
    /// An accepted peer that has not finished its handshake yet.
    type Incoming: Upgrade;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer. Does not perform the handshake.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error>;
}

/// Second half of accepting a peer.
pub trait Upgrade: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    fn id(&self) -> ConnectionId;

    fn peer_addr(&self) -> SocketAddr;

    /// Completes the handshake and yields a usable connection.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// A live connection that sends and receives text payloads.
///
/// `send` and `recv` may run concurrently from different tasks; a
/// pending `recv` never blocks a `send`.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next payload, or `Ok(None)` after a clean close.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    fn peer_addr(&self) -> SocketAddr;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_round_trips_raw_value() {
        assert_eq!(ConnectionId::new(42).into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }
}
