//! Fixed-unit countdown scheduler for Scribble.
//!
//! A [`Countdown`] fires once per time unit (one second by default) until
//! its remaining count reaches zero, then pends forever. Each fired tick
//! reports how many units are left, which is all a round timer needs to
//! broadcast the clock, reveal hints at checkpoints, and end the round.
//!
//! # Integration
//!
//! The countdown is designed to sit inside a room actor's `tokio::select!`
//! loop, owned by the actor itself:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         tick = countdown.wait_for_tick() => { /* tick.remaining */ }
//!     }
//! }
//! ```
//!
//! Cancelling is dropping: once the owner drops (or replaces) the
//! countdown, none of its future ticks can ever fire.

use std::time::Duration;

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a tick is delivered late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Schedule the next tick one unit from *now*.
    /// Late ticks stretch the countdown instead of bunching up.
    #[default]
    Skip,
    /// Keep the original cadence: the next tick is one unit after the
    /// missed deadline, so a late tick is followed by a quick one.
    Drop,
}

/// Configuration for a countdown.
#[derive(Debug, Clone)]
pub struct CountdownConfig {
    /// Length of one time unit.
    pub unit: Duration,
    /// Late-tick handling policy.
    pub policy: TickPolicy,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            policy: TickPolicy::default(),
        }
    }
}

impl CountdownConfig {
    /// Shortest unit accepted; anything below is clamped.
    pub const MIN_UNIT: Duration = Duration::from_millis(1);

    /// Create a config for a specific unit length with default policy.
    pub fn with_unit(unit: Duration) -> Self {
        Self {
            unit,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`Countdown::new`].
    pub fn validated(mut self) -> Self {
        if self.unit < Self::MIN_UNIT {
            warn!(
                unit_us = self.unit.as_micros() as u64,
                "countdown unit below minimum, clamping"
            );
            self.unit = Self::MIN_UNIT;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info (returned to caller each tick)
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`Countdown::wait_for_tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Units left after this tick. `0` means the countdown just expired.
    pub remaining: u32,
    /// `true` if this tick fired more than 10% of a unit late.
    pub overrun: bool,
    /// Whole units that passed unobserved because of the overrun.
    pub units_late: u64,
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// Counts down from `total` units, firing once per unit.
pub struct Countdown {
    config: CountdownConfig,
    total: u32,
    remaining: u32,
    tick_count: u64,
    /// When the next tick should fire (Tokio instant for `sleep_until`).
    next_tick: TokioInstant,
}

impl Countdown {
    /// Create a countdown of `total` units. The first tick fires one unit
    /// from now.
    pub fn new(total: u32, config: CountdownConfig) -> Self {
        let config = config.validated();
        let next_tick = TokioInstant::now() + config.unit;

        debug!(
            total,
            unit_ms = config.unit.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "countdown started"
        );

        Self {
            config,
            total,
            remaining: total,
            tick_count: 0,
            next_tick,
        }
    }

    /// Create a countdown with the given unit and default policy.
    pub fn with_unit(total: u32, unit: Duration) -> Self {
        Self::new(total, CountdownConfig::with_unit(unit))
    }

    /// Wait until the next unit elapses and return its [`TickInfo`].
    ///
    /// Once the countdown has expired this future pends forever, so it
    /// can stay in a `tokio::select!` without firing again.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.remaining == 0 {
            std::future::pending::<()>().await;
        }

        let next = self.next_tick;
        let unit = self.config.unit;
        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.remaining -= 1;

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > unit / 10;
        let units_late = if overrun {
            (late_by.as_nanos() / unit.as_nanos()) as u64
        } else {
            0
        };
        if units_late > 0 {
            warn!(
                tick = self.tick_count,
                units_late,
                late_ms = late_by.as_secs_f64() * 1000.0,
                policy = ?self.config.policy,
                "countdown tick overrun"
            );
        }

        self.next_tick = match self.config.policy {
            TickPolicy::Skip => now + unit,
            TickPolicy::Drop => next + unit,
        };

        trace!(tick = self.tick_count, remaining = self.remaining, "countdown tick");

        TickInfo {
            tick: self.tick_count,
            remaining: self.remaining,
            overrun,
            units_late,
        }
    }

    /// Units left before expiry.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The number of units this countdown started with.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whether the countdown has reached zero.
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The length of one unit.
    pub fn unit(&self) -> Duration {
        self.config.unit
    }
}
