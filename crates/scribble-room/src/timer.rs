//! The room's single round-timer slot.

use std::fmt;
use std::time::Duration;

use scribble_tick::{Countdown, TickInfo};
use serde::{Deserialize, Serialize};

/// What a running timer will do when it expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerPurpose {
    /// Auto-pick a word for an undecided drawer.
    Selection,
    /// Count the round down, reveal hints, end the round.
    Drawing,
    /// Pause after a round before the next selection.
    Intermission,
}

impl fmt::Display for TimerPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selection => write!(f, "selection"),
            Self::Drawing => write!(f, "drawing"),
            Self::Intermission => write!(f, "intermission"),
        }
    }
}

/// A countdown tagged with its purpose. A room holds at most one, in an
/// `Option` slot; replacing or clearing the slot cancels it.
pub(crate) struct RoundTimer {
    purpose: TimerPurpose,
    countdown: Countdown,
}

impl RoundTimer {
    pub(crate) fn start(purpose: TimerPurpose, units: u32, unit: Duration) -> Self {
        Self {
            purpose,
            countdown: Countdown::with_unit(units, unit),
        }
    }

    pub(crate) fn purpose(&self) -> TimerPurpose {
        self.purpose
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }
}

/// Resolves with the next tick of the timer in `slot`.
///
/// Pends forever while the slot is empty, so an empty slot simply never
/// wins the actor's `select!`.
pub(crate) async fn next_tick(slot: &mut Option<RoundTimer>) -> (TimerPurpose, TickInfo) {
    match slot {
        Some(timer) => {
            let tick = timer.countdown.wait_for_tick().await;
            (timer.purpose, tick)
        }
        None => std::future::pending().await,
    }
}
