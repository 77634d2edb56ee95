//! The round state machine: membership, word selection, drawing, guessing
//! and scoring.

use rand::seq::IndexedRandom;
use scribble_protocol::{ClientMessage, DrawEvent, ParticipantId, Role, ScoreEntry, ServerMessage};
use scribble_tick::TickInfo;
use tracing::{debug, info, warn};

use super::fanout::Recipient;
use super::{RoomActor, RoomSnapshot};
use crate::hint::Hint;
use crate::participant::{self, NewParticipant, Participant};
use crate::timer::{RoundTimer, TimerPurpose};
use crate::{GameConfig, Phase, RoomError};

/// Why a drawing round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    TimeUp,
    AllGuessed,
}

impl RoomActor {
    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    pub(super) fn join(&mut self, new: NewParticipant) -> Result<RoomSnapshot, RoomError> {
        if self.member(new.id).is_some() {
            return Err(RoomError::AlreadyInRoom(new.id, self.room_id.clone()));
        }
        if self.participants.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.room_id.clone()));
        }

        let id = new.id;
        let name = new.name.clone();
        self.participants.push(Participant::from(new));
        self.occupied = true;
        info!(
            room_id = %self.room_id,
            participant = %id,
            %name,
            members = self.participants.len(),
            "participant joined"
        );

        // State sync first, then the canvas.
        let visible = if self.phase == Phase::Drawing {
            self.hint.render()
        } else {
            String::new()
        };
        let state = ServerMessage::GameState {
            role: Role::Guesser,
            word: visible,
            scores: self.leaderboard(),
        };
        self.send(Recipient::Only(id), &state);
        let redraw = ServerMessage::Redraw {
            history: self.history.to_vec(),
        };
        self.send(Recipient::Only(id), &redraw);
        if self.phase == Phase::Selecting {
            if let Some(drawer_name) = self.drawer_name() {
                self.send(Recipient::Only(id), &choosing(drawer_name));
            }
        }

        self.send(
            Recipient::AllExcept(id),
            &ServerMessage::system(format!("{name} joined the room")),
        );
        self.broadcast_scores();

        if self.phase == Phase::Lobby && self.participants.len() >= self.config.min_players {
            self.begin_selection();
        }

        Ok(self.snapshot())
    }

    /// Removes a member and repairs the round around the gap.
    ///
    /// Shared by explicit leaves and send failures.
    pub(super) fn remove_participant(&mut self, id: ParticipantId) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.id == id)?;
        let gone = self.participants.remove(index);
        self.turns.remove(id);
        self.guessed.remove(&id);
        self.failed.retain(|&failed| failed != id);
        let was_drawer = self.drawer == Some(id);
        if was_drawer {
            self.drawer = None;
        }

        info!(
            room_id = %self.room_id,
            participant = %id,
            name = %gone.name,
            members = self.participants.len(),
            was_drawer,
            "participant left"
        );

        if self.participants.is_empty() {
            self.cancel_timer();
            self.phase = Phase::Lobby;
            return Some(gone);
        }

        self.send(
            Recipient::All,
            &ServerMessage::system(format!("{} left the room", gone.name)),
        );
        self.broadcast_scores();

        if self.participants.len() < self.config.min_players {
            self.enter_lobby();
        } else if was_drawer {
            self.send(
                Recipient::All,
                &ServerMessage::system(format!("{} was drawing, picking a new drawer", gone.name)),
            );
            self.begin_selection();
        } else if self.phase == Phase::Drawing && self.all_guessed() {
            self.end_round(RoundEnd::AllGuessed);
        }

        Some(gone)
    }

    // -----------------------------------------------------------------
    // Inbound messages
    // -----------------------------------------------------------------

    pub(super) fn handle_message(&mut self, sender: ParticipantId, msg: ClientMessage) {
        if self.member(sender).is_none() {
            warn!(room_id = %self.room_id, %sender, "message from non-member, ignoring");
            return;
        }

        match msg {
            ClientMessage::Join { .. } => {
                debug!(room_id = %self.room_id, %sender, "join after handshake ignored");
            }
            ClientMessage::Chat { message } => self.handle_chat(sender, &message),
            ClientMessage::Draw(data) => self.record_draw(sender, DrawEvent::Draw(data)),
            ClientMessage::Fill(data) => self.record_draw(sender, DrawEvent::Fill(data)),
            ClientMessage::Clear => self.clear_canvas(sender),
            ClientMessage::Undo => self.undo(sender),
            ClientMessage::WordSelect { word } => self.choose_word(sender, &word),
        }
    }

    fn handle_chat(&mut self, sender: ParticipantId, text: &str) {
        if self.is_drawer(sender) {
            debug!(room_id = %self.room_id, %sender, "drawer chat dropped");
            return;
        }
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(name) = self.member(sender).map(|p| p.name.clone()) else {
            return;
        };

        if self.phase == Phase::Drawing && is_match(text, &self.word) {
            if self.guessed.contains(&sender) {
                debug!(room_id = %self.room_id, %sender, "repeat guess swallowed");
                return;
            }
            self.award_guess(sender, &name);
            return;
        }

        self.send(
            Recipient::All,
            &ServerMessage::Chat {
                message: format!("{name}: {text}"),
                is_system: false,
            },
        );
    }

    fn award_guess(&mut self, sender: ParticipantId, name: &str) {
        let points = self.config.points_per_guess;
        if let Some(p) = self.participants.iter_mut().find(|p| p.id == sender) {
            p.score = p.score.saturating_add(points);
        }
        self.guessed.insert(sender);
        info!(
            room_id = %self.room_id,
            participant = %sender,
            points,
            guessed = self.guessed.len(),
            "correct guess"
        );

        let msg = ServerMessage::CorrectGuess {
            message: format!("{name} guessed the word!"),
            scores: self.leaderboard(),
        };
        self.send(Recipient::All, &msg);

        if self.all_guessed() {
            self.end_round(RoundEnd::AllGuessed);
        }
    }

    fn record_draw(&mut self, sender: ParticipantId, event: DrawEvent) {
        if !self.is_drawer(sender) {
            debug!(room_id = %self.room_id, %sender, "draw from non-drawer ignored");
            return;
        }
        self.history.record(event.clone());
        self.send(Recipient::AllExcept(sender), &ServerMessage::from(event));
    }

    fn clear_canvas(&mut self, sender: ParticipantId) {
        if !self.is_drawer(sender) {
            debug!(room_id = %self.room_id, %sender, "clear from non-drawer ignored");
            return;
        }
        self.history.clear();
        self.send(Recipient::All, &ServerMessage::Clear);
    }

    fn undo(&mut self, sender: ParticipantId) {
        if !self.is_drawer(sender) {
            debug!(room_id = %self.room_id, %sender, "undo from non-drawer ignored");
            return;
        }
        if self.history.undo() {
            let redraw = ServerMessage::Redraw {
                history: self.history.to_vec(),
            };
            self.send(Recipient::All, &redraw);
        }
    }

    fn choose_word(&mut self, sender: ParticipantId, word: &str) {
        if self.phase != Phase::Selecting || self.drawer != Some(sender) {
            debug!(room_id = %self.room_id, %sender, phase = %self.phase, "word_select ignored");
            return;
        }
        let word = word.trim();
        let Some(chosen) = self.offered.iter().find(|w| w.as_str() == word).cloned() else {
            debug!(room_id = %self.room_id, %sender, "word_select with a word not offered");
            return;
        };
        self.start_drawing(chosen);
    }

    // -----------------------------------------------------------------
    // Timer
    // -----------------------------------------------------------------

    pub(super) fn on_tick(&mut self, purpose: TimerPurpose, tick: TickInfo) {
        match (purpose, self.phase) {
            (TimerPurpose::Selection, Phase::Selecting) => {
                if tick.remaining == 0 {
                    self.auto_select();
                }
            }
            (TimerPurpose::Drawing, Phase::Drawing) => {
                self.send(Recipient::All, &ServerMessage::Timer { time: tick.remaining });
                if self.config.hint_checkpoints.contains(&tick.remaining) {
                    self.reveal_hint();
                }
                if tick.remaining == 0 {
                    self.end_round(RoundEnd::TimeUp);
                }
            }
            (TimerPurpose::Intermission, Phase::Scoring) => {
                if tick.remaining == 0 {
                    self.begin_selection();
                }
            }
            (purpose, phase) => {
                debug!(room_id = %self.room_id, %purpose, %phase, "stale tick ignored");
            }
        }
    }

    fn auto_select(&mut self) {
        match self.offered.first().cloned() {
            Some(word) => {
                debug!(room_id = %self.room_id, "selection timed out, auto-picking");
                self.start_drawing(word);
            }
            None => {
                warn!(room_id = %self.room_id, "selection timed out with nothing offered");
                self.begin_selection();
            }
        }
    }

    fn reveal_hint(&mut self) {
        if self.hint.reveal_random(&mut self.rng).is_none() {
            return;
        }
        let hint = ServerMessage::HintUpdate {
            word: self.hint.render(),
        };
        match self.drawer {
            Some(drawer) => self.send(Recipient::AllExcept(drawer), &hint),
            None => self.send(Recipient::All, &hint),
        }
    }

    fn start_timer(&mut self, purpose: TimerPurpose, units: u32) {
        // Replacing the slot drops (cancels) whatever ran before.
        self.timer = Some(RoundTimer::start(purpose, units, self.config.tick));
    }

    pub(super) fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!(
                room_id = %self.room_id,
                purpose = %timer.purpose(),
                remaining = timer.remaining(),
                "timer cancelled"
            );
        }
    }

    // -----------------------------------------------------------------
    // Phase transitions
    // -----------------------------------------------------------------

    fn enter_lobby(&mut self) {
        let was_playing = self.phase != Phase::Lobby;
        self.cancel_timer();
        self.phase = Phase::Lobby;
        self.drawer = None;
        self.word.clear();
        self.hint = Hint::default();
        self.offered.clear();
        self.guessed.clear();
        if !self.history.is_empty() {
            self.history.clear();
            self.send(Recipient::All, &ServerMessage::Clear);
        }

        if was_playing {
            warn!(
                room_id = %self.room_id,
                members = self.participants.len(),
                "not enough players, back to lobby"
            );
            self.send(
                Recipient::All,
                &ServerMessage::system("Waiting for more players..."),
            );
        }
    }

    fn begin_selection(&mut self) {
        self.cancel_timer();
        self.word.clear();
        self.hint = Hint::default();
        self.guessed.clear();
        self.offered.clear();

        let members: Vec<ParticipantId> = self.participants.iter().map(|p| p.id).collect();
        let Some(drawer) =
            self.turns
                .next_drawer(&members, self.config.min_players, &mut self.rng)
        else {
            self.enter_lobby();
            return;
        };

        self.drawer = Some(drawer);
        self.phase = Phase::Selecting;
        self.history.clear();
        self.offered = self
            .config
            .words
            .choose_multiple(&mut self.rng, GameConfig::WORD_CHOICES)
            .cloned()
            .collect();

        let drawer_name = self.drawer_name().unwrap_or_default();
        info!(room_id = %self.room_id, %drawer, %drawer_name, "drawer selecting word");

        self.send(Recipient::All, &ServerMessage::Clear);
        let offer = ServerMessage::ChooseWord {
            words: self.offered.clone(),
            drawer_name: drawer_name.clone(),
        };
        self.send(Recipient::Only(drawer), &offer);
        self.send(Recipient::AllExcept(drawer), &choosing(drawer_name));

        self.start_timer(TimerPurpose::Selection, self.config.selection_time);
    }

    fn start_drawing(&mut self, word: String) {
        self.cancel_timer();
        let Some(drawer) = self.drawer else {
            self.enter_lobby();
            return;
        };

        self.hint = Hint::new(&word);
        self.word = word;
        self.guessed.clear();
        self.offered.clear();
        self.phase = Phase::Drawing;

        let drawer_name = self.drawer_name().unwrap_or_default();
        let round_time = self.config.round_time;
        info!(
            room_id = %self.room_id,
            %drawer,
            letters = self.hint.hidden_letters(),
            round_time,
            "round started"
        );

        let for_drawer = ServerMessage::NewRound {
            role: Role::Drawer,
            word: self.word.clone(),
            drawer_name: drawer_name.clone(),
            round_time,
        };
        let for_guessers = ServerMessage::NewRound {
            role: Role::Guesser,
            word: self.hint.render(),
            drawer_name,
            round_time,
        };
        self.send(Recipient::Only(drawer), &for_drawer);
        self.send(Recipient::AllExcept(drawer), &for_guessers);

        self.start_timer(TimerPurpose::Drawing, round_time);
    }

    fn end_round(&mut self, reason: RoundEnd) {
        self.cancel_timer();
        let word = std::mem::take(&mut self.word);
        self.hint = Hint::default();
        self.phase = Phase::Scoring;
        self.drawer = None;

        let (notice, pause) = match reason {
            RoundEnd::TimeUp => (
                format!("Time's up! The word was: {word}"),
                self.config.reveal_pause,
            ),
            RoundEnd::AllGuessed => (
                format!("Everyone guessed it! The word was: {word}"),
                self.config.complete_pause,
            ),
        };
        info!(
            room_id = %self.room_id,
            %word,
            ?reason,
            guessed = self.guessed.len(),
            "round ended"
        );

        self.send(Recipient::All, &ServerMessage::system(notice));
        self.broadcast_scores();

        if pause == 0 {
            self.begin_selection();
        } else {
            self.start_timer(TimerPurpose::Intermission, pause);
        }
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    /// Holds the turn right now, so canvas actions are theirs alone.
    fn is_drawer(&self, id: ParticipantId) -> bool {
        self.phase.has_drawer() && self.drawer == Some(id)
    }

    fn member(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    fn drawer_name(&self) -> Option<String> {
        self.drawer
            .and_then(|id| self.member(id))
            .map(|p| p.name.clone())
    }

    /// Every non-drawer has guessed, and there is at least one.
    fn all_guessed(&self) -> bool {
        let mut guessers = self
            .participants
            .iter()
            .filter(|p| Some(p.id) != self.drawer)
            .peekable();
        guessers.peek().is_some() && guessers.all(|p| self.guessed.contains(&p.id))
    }

    fn leaderboard(&self) -> Vec<ScoreEntry> {
        participant::leaderboard(&self.participants)
    }

    fn broadcast_scores(&mut self) {
        let scores = ServerMessage::Scores {
            scores: self.leaderboard(),
        };
        self.send(Recipient::All, &scores);
    }
}

fn choosing(drawer_name: String) -> ServerMessage {
    ServerMessage::Choosing {
        message: format!("{drawer_name} is choosing a word..."),
        drawer_name,
    }
}

/// Case-insensitive, whitespace-trimmed exact comparison.
fn is_match(guess: &str, word: &str) -> bool {
    !word.is_empty() && guess.trim().to_lowercase() == word.trim().to_lowercase()
}
