//! Integration tests for the Scribble server, handler, and full connection flow.
//!
//! These run a real server on an OS-assigned port and talk to it with
//! plain `tokio-tungstenite` clients. One time unit is 20ms so whole
//! rounds finish in well under a second.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use scribble::prelude::*;
use scribble_room::RoomError;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const WAIT: Duration = Duration::from_secs(5);

fn fast_config() -> GameConfig {
    GameConfig {
        tick: Duration::from_millis(20),
        selection_time: 100,
        round_time: 250,
        reveal_pause: 5,
        complete_pause: 5,
        words: vec!["tree".into(), "lamp".into(), "boat".into()],
        seed: Some(7),
        ..GameConfig::default()
    }
}

/// Starts a server on a random port and returns the address.
async fn start_server(config: GameConfig) -> String {
    let server = ScribbleServer::builder()
        .bind("127.0.0.1:0")
        .game_config(config)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send_json(ws: &mut ClientWs, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("send should succeed");
}

async fn join(addr: &str, room: &str, name: &str) -> ClientWs {
    let mut ws = connect(addr).await;
    send_json(&mut ws, json!({"type": "join", "room": room, "name": name})).await;
    ws
}

/// Next text frame as JSON. `None` once the server closes the socket.
async fn next_json(ws: &mut ClientWs) -> Option<Value> {
    loop {
        let msg = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("server went quiet")?;
        match msg {
            Ok(Message::Text(text)) => {
                return Some(serde_json::from_str(text.as_str()).expect("server sent JSON"));
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

/// Skips frames until one of type `ty` arrives.
async fn recv_until(ws: &mut ClientWs, ty: &str) -> Value {
    loop {
        let value = next_json(ws)
            .await
            .unwrap_or_else(|| panic!("connection closed while waiting for {ty}"));
        if value["type"] == ty {
            return value;
        }
    }
}

/// Skips frames until a system chat containing `needle` arrives.
async fn recv_system(ws: &mut ClientWs, needle: &str) -> String {
    loop {
        let value = recv_until(ws, "chat").await;
        if value["isSystem"] == true {
            let line = value["message"].as_str().unwrap_or_default().to_owned();
            if line.contains(needle) {
                return line;
            }
        }
    }
}

/// Waits for the selection notice and returns the offered words if this
/// client is the drawer.
async fn selection(ws: &mut ClientWs) -> Option<Vec<String>> {
    loop {
        let value = next_json(ws).await.expect("connection open");
        match value["type"].as_str() {
            Some("choose_word") => {
                let words = value["words"]
                    .as_array()
                    .expect("words array")
                    .iter()
                    .filter_map(|w| w.as_str().map(str::to_owned))
                    .collect();
                return Some(words);
            }
            Some("choosing") => return None,
            _ => continue,
        }
    }
}

/// Joins two players and returns `(drawer, guesser, offered words)`.
async fn two_player_room(addr: &str, room: &str) -> (ClientWs, ClientWs, Vec<String>) {
    let mut ann = join(addr, room, "ann").await;
    recv_until(&mut ann, "game_state").await;
    let mut bob = join(addr, room, "bob").await;

    let ann_offer = selection(&mut ann).await;
    let bob_offer = selection(&mut bob).await;
    match (ann_offer, bob_offer) {
        (Some(words), None) => (ann, bob, words),
        (None, Some(words)) => (bob, ann, words),
        other => panic!("exactly one drawer expected, got {other:?}"),
    }
}

// =========================================================================
// Handshake
// =========================================================================

#[tokio::test]
async fn test_join_receives_state_then_history() {
    let addr = start_server(fast_config()).await;
    let mut ws = join(&addr, "r1", "ann").await;

    let state = next_json(&mut ws).await.expect("game_state");
    assert_eq!(state["type"], "game_state");
    assert_eq!(state["role"], "guesser");
    assert_eq!(state["word"], "");
    assert_eq!(state["scores"], json!([{"name": "ann", "score": 0}]));

    let redraw = next_json(&mut ws).await.expect("redraw");
    assert_eq!(redraw, json!({"type": "redraw", "history": []}));
}

#[tokio::test]
async fn test_first_message_must_be_join() {
    let addr = start_server(fast_config()).await;
    let mut ws = connect(&addr).await;
    send_json(&mut ws, json!({"type": "chat", "message": "hi"})).await;

    let error = next_json(&mut ws).await.expect("error message");
    assert_eq!(error["type"], "error");
    assert!(next_json(&mut ws).await.is_none(), "server should close");
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let addr = start_server(fast_config()).await;
    let mut ws = join(&addr, "r1", "   ").await;

    let error = next_json(&mut ws).await.expect("error message");
    assert_eq!(error["type"], "error");
}

#[tokio::test]
async fn test_build_rejects_unusable_word_list() {
    let result = ScribbleServer::builder()
        .bind("127.0.0.1:0")
        .game_config(GameConfig {
            words: vec!["one".into(), "two".into()],
            ..GameConfig::default()
        })
        .build()
        .await;
    assert!(matches!(
        result,
        Err(ScribbleError::Room(RoomError::InvalidConfig(_)))
    ));
}

// =========================================================================
// Game flow
// =========================================================================

#[tokio::test]
async fn test_full_round_over_websocket() {
    let addr = start_server(fast_config()).await;
    let (mut drawer, mut guesser, offered) = two_player_room(&addr, "r1").await;
    let word = offered[0].clone();

    send_json(&mut drawer, json!({"type": "word_select", "word": word})).await;

    let round = recv_until(&mut drawer, "new_round").await;
    assert_eq!(round["role"], "drawer");
    assert_eq!(round["word"], word.as_str());

    let round = recv_until(&mut guesser, "new_round").await;
    assert_eq!(round["role"], "guesser");
    assert_eq!(round["word"], "_ _ _ _");

    send_json(
        &mut guesser,
        json!({"type": "chat", "message": format!("  {} ", word.to_uppercase())}),
    )
    .await;

    let correct = recv_until(&mut drawer, "correct_guess").await;
    let scores = correct["scores"].as_array().expect("scores");
    assert_eq!(scores[0]["score"], 100);
    assert_eq!(scores[1]["score"], 0);

    let line = recv_system(&mut guesser, "Everyone guessed").await;
    assert!(line.contains(&word));

    // Roles rotate after the pause.
    let next_offer = selection(&mut guesser).await;
    assert!(next_offer.is_some(), "the other player draws next");
}

#[tokio::test]
async fn test_round_times_out_with_hint() {
    let addr = start_server(GameConfig {
        round_time: 10,
        hint_checkpoints: vec![5],
        ..fast_config()
    })
    .await;
    let (mut drawer, mut guesser, offered) = two_player_room(&addr, "r1").await;
    send_json(&mut drawer, json!({"type": "word_select", "word": offered[0]})).await;

    let hint = recv_until(&mut guesser, "hint_update").await;
    let shown = hint["word"]
        .as_str()
        .expect("hint text")
        .split(' ')
        .filter(|c| *c != "_")
        .count();
    assert_eq!(shown, 1);

    let last = loop {
        let tick = recv_until(&mut guesser, "timer").await;
        if tick["time"] == 0 {
            break tick;
        }
    };
    assert_eq!(last["time"], 0);
    recv_system(&mut guesser, "Time's up").await;
}

#[tokio::test]
async fn test_draw_is_rebroadcast_verbatim() {
    let addr = start_server(fast_config()).await;
    let (mut drawer, mut guesser, offered) = two_player_room(&addr, "r1").await;
    send_json(&mut drawer, json!({"type": "word_select", "word": offered[0]})).await;
    recv_until(&mut guesser, "new_round").await;

    let stroke = json!({
        "type": "draw",
        "prevX": 1, "prevY": 2, "currX": 3, "currY": 4,
        "color": "#ff0000", "strokeId": "s1"
    });
    send_json(&mut drawer, stroke.clone()).await;

    let echoed = recv_until(&mut guesser, "draw").await;
    assert_eq!(echoed, stroke);

    send_json(&mut drawer, json!({"type": "undo"})).await;
    let redraw = recv_until(&mut guesser, "redraw").await;
    assert_eq!(redraw["history"], json!([]));
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let addr = start_server(fast_config()).await;
    let mut ann = join(&addr, "r1", "ann").await;
    recv_until(&mut ann, "redraw").await;

    ann.send(Message::text("not json".to_owned())).await.unwrap();
    send_json(&mut ann, json!({"type": "teleport"})).await;
    send_json(&mut ann, json!({"type": "chat", "message": "still here"})).await;

    let chat = recv_until(&mut ann, "chat").await;
    assert_eq!(chat["message"], "ann: still here");
}

#[tokio::test]
async fn test_non_utf8_binary_frame_keeps_connection_open() {
    let addr = start_server(fast_config()).await;
    let mut ann = join(&addr, "r1", "ann").await;
    recv_until(&mut ann, "redraw").await;

    ann.send(Message::Binary(vec![0xff, 0xfe].into())).await.unwrap();
    send_json(&mut ann, json!({"type": "chat", "message": "after binary"})).await;

    let chat = recv_until(&mut ann, "chat").await;
    assert_eq!(chat["message"], "ann: after binary");
}

#[tokio::test]
async fn test_disconnect_sends_room_back_to_lobby() {
    let addr = start_server(fast_config()).await;
    let (mut drawer, guesser, _) = two_player_room(&addr, "r1").await;
    drop(guesser);

    recv_system(&mut drawer, "left the room").await;
    recv_system(&mut drawer, "Waiting for more players").await;
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let addr = start_server(fast_config()).await;
    let mut ann = join(&addr, "a", "ann").await;
    let mut bob = join(&addr, "b", "bob").await;
    recv_until(&mut ann, "redraw").await;
    recv_until(&mut bob, "redraw").await;

    send_json(&mut ann, json!({"type": "chat", "message": "only room a"})).await;
    send_json(&mut bob, json!({"type": "chat", "message": "only room b"})).await;

    let chat = recv_until(&mut bob, "chat").await;
    assert_eq!(chat["message"], "bob: only room b");
    let chat = recv_until(&mut ann, "chat").await;
    assert_eq!(chat["message"], "ann: only room a");
}
