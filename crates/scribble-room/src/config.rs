//! Game configuration and the round phase enum.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::RoomError;
use crate::words;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room of a server.
///
/// All durations except `tick` are counted in time units; one unit lasts
/// `tick` (one second by default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Members needed before a round can start.
    pub min_players: usize,

    /// Maximum members allowed in a room.
    pub max_players: usize,

    /// Units the drawer has to pick a word.
    pub selection_time: u32,

    /// Units a drawing round lasts.
    pub round_time: u32,

    /// Remaining-time values at which one hint letter is revealed.
    pub hint_checkpoints: Vec<u32>,

    /// Pause after a round that ran out of time.
    pub reveal_pause: u32,

    /// Pause after a round in which everyone guessed.
    pub complete_pause: u32,

    /// Points added for a correct guess.
    pub points_per_guess: u32,

    /// Length of one time unit.
    pub tick: Duration,

    /// Candidate words offered to drawers.
    pub words: Vec<String>,

    /// Fixed RNG seed for reproducible turn order and word picks.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 12,
            selection_time: 15,
            round_time: 60,
            hint_checkpoints: vec![30, 15],
            reveal_pause: 5,
            complete_pause: 3,
            points_per_guess: 100,
            tick: Duration::from_secs(1),
            words: words::default_words(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Number of words offered to the drawer each round.
    pub const WORD_CHOICES: usize = 3;

    /// Letters the timer may reveal in one round.
    pub const MAX_HINT_REVEALS: usize = 2;

    /// Checks that the settings can run a game and normalizes them.
    ///
    /// Words are trimmed and deduplicated (first occurrence wins), hint
    /// checkpoints outside `1..round_time` are dropped and at most
    /// [`MAX_HINT_REVEALS`](Self::MAX_HINT_REVEALS) may remain.
    ///
    /// # Errors
    /// Returns [`RoomError::InvalidConfig`] describing the first problem.
    pub fn validated(mut self) -> Result<Self, RoomError> {
        if self.min_players < 2 {
            return Err(invalid(format!(
                "min_players must be at least 2, got {}",
                self.min_players
            )));
        }
        if self.max_players < self.min_players {
            return Err(invalid(format!(
                "max_players ({}) is below min_players ({})",
                self.max_players, self.min_players
            )));
        }
        if self.selection_time == 0 || self.round_time == 0 {
            return Err(invalid("selection_time and round_time must be non-zero"));
        }
        if self.tick.is_zero() {
            return Err(invalid("tick must be non-zero"));
        }

        let mut seen = HashSet::new();
        self.words = self
            .words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .filter(|w| seen.insert(w.to_lowercase()))
            .map(str::to_owned)
            .collect();
        if self.words.len() < Self::WORD_CHOICES {
            return Err(invalid(format!(
                "need at least {} distinct words, got {}",
                Self::WORD_CHOICES,
                self.words.len()
            )));
        }

        let round_time = self.round_time;
        self.hint_checkpoints.retain(|&c| c > 0 && c < round_time);
        self.hint_checkpoints.sort_unstable_by(|a, b| b.cmp(a));
        self.hint_checkpoints.dedup();
        if self.hint_checkpoints.len() > Self::MAX_HINT_REVEALS {
            return Err(invalid(format!(
                "at most {} hint checkpoints are allowed, got {:?}",
                Self::MAX_HINT_REVEALS,
                self.hint_checkpoints
            )));
        }

        Ok(self)
    }
}

fn invalid(reason: impl Into<String>) -> RoomError {
    RoomError::InvalidConfig(reason.into())
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a room is in its round cycle.
///
/// ```text
/// Lobby ──(enough members)──► Selecting ──(word chosen)──► Drawing
///   ▲                            ▲                            │
///   │                            └────────(pause)── Scoring ◄─┘
///   └──────────────(too few members, from any phase)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for enough members. No drawer, no timer.
    Lobby,
    /// The drawer is picking one of the offered words.
    Selecting,
    /// The drawer draws, everyone else guesses.
    Drawing,
    /// The word has been revealed; the next selection starts after a pause.
    Scoring,
}

impl Phase {
    /// Returns `true` while a drawer holds the turn.
    pub fn has_drawer(&self) -> bool {
        matches!(self, Self::Selecting | Self::Drawing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Selecting => write!(f, "Selecting"),
            Self::Drawing => write!(f, "Drawing"),
            Self::Scoring => write!(f, "Scoring"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_words(words: &[&str]) -> GameConfig {
        GameConfig {
            words: words.iter().map(|w| w.to_string()).collect(),
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default().validated().unwrap();
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_players, 12);
        assert_eq!(config.selection_time, 15);
        assert_eq!(config.round_time, 60);
        assert_eq!(config.hint_checkpoints, vec![30, 15]);
        assert_eq!(config.points_per_guess, 100);
        assert_eq!(config.tick, Duration::from_secs(1));
    }

    #[test]
    fn test_too_few_distinct_words_rejected() {
        let err = with_words(&["tree", "Tree ", "sun", ""]).validated().unwrap_err();
        assert!(matches!(err, RoomError::InvalidConfig(_)));
    }

    #[test]
    fn test_words_are_trimmed_and_deduplicated() {
        let config = with_words(&[" tree", "sun", "TREE", "moon "]).validated().unwrap();
        assert_eq!(config.words, vec!["tree", "sun", "moon"]);
    }

    #[test]
    fn test_min_players_below_two_rejected() {
        let config = GameConfig {
            min_players: 1,
            ..GameConfig::default()
        };
        assert!(matches!(config.validated(), Err(RoomError::InvalidConfig(_))));
    }

    #[test]
    fn test_max_below_min_rejected() {
        let config = GameConfig {
            min_players: 4,
            max_players: 3,
            ..GameConfig::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_zero_round_time_rejected() {
        let config = GameConfig {
            round_time: 0,
            ..GameConfig::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_out_of_range_checkpoints_dropped() {
        let config = GameConfig {
            round_time: 20,
            hint_checkpoints: vec![0, 5, 30, 10, 5],
            ..GameConfig::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.hint_checkpoints, vec![10, 5]);
    }

    #[test]
    fn test_more_than_two_checkpoints_rejected() {
        let config = GameConfig {
            hint_checkpoints: vec![50, 40, 30, 20, 10],
            ..GameConfig::default()
        };
        assert!(matches!(config.validated(), Err(RoomError::InvalidConfig(_))));
    }

    #[test]
    fn test_unreachable_checkpoints_do_not_count_toward_cap() {
        let config = GameConfig {
            round_time: 60,
            hint_checkpoints: vec![90, 40, 20],
            ..GameConfig::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.hint_checkpoints, vec![40, 20]);
    }

    #[test]
    fn test_phase_has_drawer() {
        assert!(!Phase::Lobby.has_drawer());
        assert!(Phase::Selecting.has_drawer());
        assert!(Phase::Drawing.has_drawer());
        assert!(!Phase::Scoring.has_drawer());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Lobby.to_string(), "Lobby");
        assert_eq!(Phase::Drawing.to_string(), "Drawing");
    }
}
