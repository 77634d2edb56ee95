//! Per-connection handler: join handshake and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `join` → room id and display name
//!   2. Join the room through the registry
//!   3. Writer task: room → socket
//!   4. Reader loop: socket → room, until either side ends

use std::sync::Arc;
use std::time::Duration;

use scribble_protocol::{
    ClientMessage, Codec, ParticipantId, ProtocolError, RoomId, ServerMessage,
};
use scribble_room::NewParticipant;
use scribble_transport::{Connection, TransportError, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ScribbleError;
use crate::server::ServerState;

/// How long a new connection has to send its `join`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Display names are cut to this many characters.
const MAX_NAME_CHARS: usize = 32;

/// Removes the participant from their room when the handler exits,
/// panics included. The leave runs on a spawned task because it needs
/// the registry lock.
struct MembershipGuard {
    room_id: RoomId,
    participant: ParticipantId,
    state: Arc<ServerState>,
}

impl Drop for MembershipGuard {
    fn drop(&mut self) {
        let room_id = self.room_id.clone();
        let participant = self.participant;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut registry = state.registry.lock().await;
            match registry.leave(&room_id, participant).await {
                Ok(remaining) => {
                    tracing::debug!(%room_id, %participant, remaining, "left room");
                }
                Err(e) => {
                    // Already removed by the room after a failed send.
                    tracing::debug!(%room_id, %participant, error = %e, "leave skipped");
                }
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), ScribbleError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let peer = conn.peer_addr();
    let participant = ParticipantId(conn_id.into_inner());
    tracing::debug!(%conn_id, %peer, "handling new connection");

    // --- Step 1: Handshake ---
    let (room_id, name) = match perform_handshake(&conn, &state).await {
        Ok(joined) => joined,
        Err(e) => {
            let _ = conn.close().await;
            return Err(e);
        }
    };

    // --- Step 2: Join ---
    let (tx, mut rx) = mpsc::unbounded_channel();
    let joined = {
        let mut registry = state.registry.lock().await;
        registry
            .join(room_id.clone(), NewParticipant::new(participant, name.clone(), tx))
            .await
    };
    let (handle, snapshot) = match joined {
        Ok(joined) => joined,
        Err(e) => {
            send_error(&conn, &state, &e.to_string()).await?;
            let _ = conn.close().await;
            return Err(e.into());
        }
    };
    let _guard = MembershipGuard {
        room_id: room_id.clone(),
        participant,
        state: Arc::clone(&state),
    };
    tracing::info!(
        %conn_id,
        %peer,
        %participant,
        %room_id,
        %name,
        phase = %snapshot.phase,
        members = snapshot.member_count(),
        "connection joined room"
    );

    // --- Step 3: Writer ---
    let mut writer = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            while let Some(payload) = rx.recv().await {
                if let Err(e) = conn.send(&payload).await {
                    tracing::debug!(%participant, error = %e, "send failed");
                    break;
                }
            }
        })
    };

    // --- Step 4: Reader ---
    loop {
        tokio::select! {
            received = conn.recv() => match received {
                Ok(Some(text)) => {
                    let msg: ClientMessage = match state.codec.decode(&text) {
                        Ok(msg) => msg,
                        Err(e) => {
                            tracing::debug!(%participant, error = %e, "dropping malformed message");
                            continue;
                        }
                    };
                    if handle.send_message(participant, msg).await.is_err() {
                        tracing::debug!(%participant, %room_id, "room stopped");
                        break;
                    }
                }
                Ok(None) => {
                    tracing::info!(%participant, %room_id, "connection closed cleanly");
                    break;
                }
                Err(e @ TransportError::InvalidUtf8(_)) => {
                    tracing::debug!(%participant, error = %e, "dropping malformed frame");
                    continue;
                }
                Err(e) => {
                    tracing::debug!(%participant, error = %e, "recv error");
                    break;
                }
            },
            _ = &mut writer => {
                tracing::debug!(%participant, "outbound stream ended");
                break;
            }
        }
    }

    writer.abort();
    let _ = conn.close().await;
    // _guard drops here → leave fires.
    Ok(())
}

/// Waits for the `join` frame and returns the room id and display name.
///
/// Anything else gets an `error` message back.
async fn perform_handshake(
    conn: &WebSocketConnection,
    state: &ServerState,
) -> Result<(RoomId, String), ScribbleError> {
    let text = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(text))) => text,
        Ok(Ok(None)) => {
            return Err(invalid("connection closed before join"));
        }
        Ok(Err(e)) => return Err(ScribbleError::Transport(e)),
        Err(_) => {
            send_error(conn, state, "join timed out").await?;
            return Err(invalid("join timed out"));
        }
    };

    let (room, name) = match state.codec.decode::<ClientMessage>(&text) {
        Ok(ClientMessage::Join { room, name }) => (room, name),
        _ => {
            send_error(conn, state, "first message must be join").await?;
            return Err(invalid("first message must be join"));
        }
    };

    let name: String = name.trim().chars().take(MAX_NAME_CHARS).collect();
    if name.is_empty() || room.as_str().trim().is_empty() {
        send_error(conn, state, "room and name are required").await?;
        return Err(invalid("empty room or name"));
    }

    Ok((room, name))
}

/// Sends an `error` message to the client.
async fn send_error(
    conn: &WebSocketConnection,
    state: &ServerState,
    message: &str,
) -> Result<(), ScribbleError> {
    let text = state.codec.encode(&ServerMessage::Error {
        message: message.to_string(),
    })?;
    conn.send(&text).await?;
    Ok(())
}

fn invalid(reason: &str) -> ScribbleError {
    ScribbleError::Protocol(ProtocolError::InvalidMessage(reason.into()))
}
