//! Core protocol types for Scribble's wire format.
//!
//! Every message on the wire is a JSON object with a `type` discriminator
//! and type-specific fields, e.g. `{"type":"timer","time":42}`.
//! Serde's internally tagged enums (`#[serde(tag = "type")]`) produce
//! exactly that shape, so the enums below ARE the message catalogue.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a participant.
///
/// The server derives it from the connection id at connect time. It is
/// the key for everything a room knows about a participant; the
/// connection itself is just one attribute of the participant.
///
/// `#[serde(transparent)]` serializes `ParticipantId(42)` as `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A caller-chosen room identifier (e.g. `"r1"`).
///
/// Rooms are addressed by whatever string the client connects with; an
/// unseen identifier creates the room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a room id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Shared payload pieces
// ---------------------------------------------------------------------------

/// The role a recipient plays in the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Drawer,
    Guesser,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

/// The body of a `draw` or `fill` event.
///
/// The drawing payload itself (coordinates, colour, width, ...) is opaque
/// to the server and is kept verbatim via `#[serde(flatten)]`, so the
/// event is rebroadcast exactly as the drawer sent it. Only `strokeId`,
/// which groups the events of one pen gesture, is interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrokeData {
    #[serde(rename = "strokeId", default, skip_serializing_if = "Option::is_none")]
    pub stroke_id: Option<String>,

    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl StrokeData {
    /// Convenience constructor used mostly by tests and tools.
    pub fn new(stroke_id: Option<&str>, data: Map<String, Value>) -> Self {
        Self {
            stroke_id: stroke_id.map(str::to_owned),
            data,
        }
    }
}

/// One entry of a room's draw history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawEvent {
    Draw(StrokeData),
    Fill(StrokeData),
    Clear,
}

impl DrawEvent {
    /// The stroke this event belongs to, if the client tagged it.
    pub fn stroke_id(&self) -> Option<&str> {
        match self {
            Self::Draw(data) | Self::Fill(data) => data.stroke_id.as_deref(),
            Self::Clear => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Messages a participant sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Handshake: must be the first frame on a new connection.
    Join { room: RoomId, name: String },

    /// Free text. From a guesser during Drawing this is also a guess.
    Chat { message: String },

    /// Drawer only: a segment of the current stroke.
    Draw(StrokeData),

    /// Drawer only: a flood fill.
    Fill(StrokeData),

    /// Drawer only: wipe the canvas and the history.
    Clear,

    /// Drawer only: revert the last stroke (or the last event if untagged).
    Undo,

    /// Drawer only, during Selecting: pick one of the offered words.
    WordSelect { word: String },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Messages the server sends to participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on join: current role, visible word/hint, leaderboard.
    GameState {
        role: Role,
        word: String,
        scores: Vec<ScoreEntry>,
    },

    /// Full draw-history replace-all.
    Redraw { history: Vec<DrawEvent> },

    /// To the drawer only, during Selecting.
    ChooseWord {
        words: Vec<String>,
        drawer_name: String,
    },

    /// To everyone but the drawer, during Selecting.
    Choosing {
        message: String,
        drawer_name: String,
    },

    /// Per recipient: the drawer sees the word, others the hint.
    NewRound {
        role: Role,
        word: String,
        drawer_name: String,
        round_time: u32,
    },

    /// Countdown tick, once per time unit while drawing.
    Timer { time: u32 },

    /// Updated hint after a letter reveal.
    HintUpdate { word: String },

    /// Someone guessed the word; includes the updated leaderboard.
    CorrectGuess {
        message: String,
        scores: Vec<ScoreEntry>,
    },

    /// Free-text chat or a system announcement.
    Chat {
        message: String,
        #[serde(rename = "isSystem", default)]
        is_system: bool,
    },

    /// Leaderboard refresh after membership changes or a round end.
    Scores { scores: Vec<ScoreEntry> },

    /// Rebroadcast drawer events.
    Draw(StrokeData),
    Fill(StrokeData),
    Clear,

    /// The server rejected the connection's request (e.g. a bad handshake).
    Error { message: String },
}

impl ServerMessage {
    /// A system chat line.
    pub fn system(message: impl Into<String>) -> Self {
        Self::Chat {
            message: message.into(),
            is_system: true,
        }
    }
}

impl From<DrawEvent> for ServerMessage {
    fn from(event: DrawEvent) -> Self {
        match event {
            DrawEvent::Draw(data) => Self::Draw(data),
            DrawEvent::Fill(data) => Self::Fill(data),
            DrawEvent::Clear => Self::Clear,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The catalogue's JSON shapes are what browser clients parse, so these
    //! tests pin the exact field names and tags.

    use super::*;
    use serde_json::json;

    #[test]
    fn test_participant_id_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&ParticipantId(42)).unwrap(), "42");
        assert_eq!(ParticipantId(7).to_string(), "P-7");
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&RoomId::new("r1")).unwrap(), "\"r1\"");
        assert_eq!(RoomId::from("r1").to_string(), "r1");
    }

    #[test]
    fn test_client_join_parses() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"join","room":"r1","name":"Ann"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join {
                room: RoomId::new("r1"),
                name: "Ann".into()
            }
        );
    }

    #[test]
    fn test_client_draw_keeps_opaque_payload_and_stroke_id() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"draw","prevX":1,"prevY":2,"currX":3,"currY":4,"strokeId":"s1"}"#,
        )
        .unwrap();
        let ClientMessage::Draw(data) = msg else {
            panic!("expected draw, got {msg:?}");
        };
        assert_eq!(data.stroke_id.as_deref(), Some("s1"));
        assert_eq!(data.data["prevX"], 1);
        assert_eq!(data.data["currY"], 4);
        assert!(!data.data.contains_key("type"));
        assert!(!data.data.contains_key("strokeId"));
    }

    #[test]
    fn test_draw_rebroadcast_is_verbatim() {
        let incoming = json!({"type": "draw", "prevX": 10, "currX": 12, "color": "#000", "strokeId": "s9"});
        let ClientMessage::Draw(data) = serde_json::from_value(incoming.clone()).unwrap() else {
            panic!("expected draw");
        };
        let outgoing = serde_json::to_value(ServerMessage::from(DrawEvent::Draw(data))).unwrap();
        assert_eq!(outgoing, incoming);
    }

    #[test]
    fn test_draw_without_stroke_id_omits_field() {
        let data = StrokeData::new(None, Map::new());
        let json = serde_json::to_value(DrawEvent::Fill(data)).unwrap();
        assert_eq!(json, json!({"type": "fill"}));
    }

    #[test]
    fn test_client_unit_variants_parse() {
        let clear: ClientMessage = serde_json::from_str(r#"{"type":"clear"}"#).unwrap();
        let undo: ClientMessage = serde_json::from_str(r#"{"type":"undo"}"#).unwrap();
        assert_eq!(clear, ClientMessage::Clear);
        assert_eq!(undo, ClientMessage::Undo);
    }

    #[test]
    fn test_client_word_select_parses() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"word_select","word":"tree"}"#).unwrap();
        assert_eq!(msg, ClientMessage::WordSelect { word: "tree".into() });
    }

    #[test]
    fn test_game_state_json_format() {
        let msg = ServerMessage::GameState {
            role: Role::Guesser,
            word: "_ _ _".into(),
            scores: vec![ScoreEntry {
                name: "Ann".into(),
                score: 100,
            }],
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "game_state",
                "role": "guesser",
                "word": "_ _ _",
                "scores": [{"name": "Ann", "score": 100}]
            })
        );
    }

    #[test]
    fn test_new_round_json_format() {
        let msg = ServerMessage::NewRound {
            role: Role::Drawer,
            word: "tree".into(),
            drawer_name: "Ann".into(),
            round_time: 60,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "new_round");
        assert_eq!(json["role"], "drawer");
        assert_eq!(json["drawer_name"], "Ann");
        assert_eq!(json["round_time"], 60);
    }

    #[test]
    fn test_chat_uses_is_system_camel_case() {
        let json = serde_json::to_value(ServerMessage::system("hello")).unwrap();
        assert_eq!(json, json!({"type": "chat", "message": "hello", "isSystem": true}));
    }

    #[test]
    fn test_chat_is_system_defaults_to_false() {
        let msg: ServerMessage = serde_json::from_str(r#"{"type":"chat","message":"hi"}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Chat {
                message: "hi".into(),
                is_system: false
            }
        );
    }

    #[test]
    fn test_redraw_history_entries_are_tagged() {
        let history = vec![
            DrawEvent::Draw(StrokeData::new(Some("s1"), Map::new())),
            DrawEvent::Fill(StrokeData::new(None, Map::new())),
        ];
        let json = serde_json::to_value(ServerMessage::Redraw { history }).unwrap();
        assert_eq!(
            json,
            json!({"type": "redraw", "history": [{"type": "draw", "strokeId": "s1"}, {"type": "fill"}]})
        );
    }

    #[test]
    fn test_choose_word_json_format() {
        let msg = ServerMessage::ChooseWord {
            words: vec!["a".into(), "b".into(), "c".into()],
            drawer_name: "Ann".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "choose_word");
        assert_eq!(json["words"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_decode_missing_fields_is_error() {
        let result: Result<ClientMessage, _> = serde_json::from_str(r#"{"type":"join","room":"r1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_draw_event_stroke_id_accessor() {
        assert_eq!(
            DrawEvent::Draw(StrokeData::new(Some("s2"), Map::new())).stroke_id(),
            Some("s2")
        );
        assert_eq!(DrawEvent::Clear.stroke_id(), None);
    }
}
