//! Active-time accumulation and the rest reminder state machine.
//!
//! Once per tick the accumulator samples an [`ActivitySource`] and decides
//! whether the user was active. Active ticks advance the counter toward the
//! reminder interval; idle ticks only advance a bounded grace counter and
//! never touch accumulated or remaining time. When the counter reaches the
//! interval the accumulator enters [`Phase::Resting`] and ignores ticks until
//! it is resumed.
//!
//! ## State Diagram
//!
//! ```text
//!            accumulated >= interval
//!   Running ─────────────────────────▶ Resting
//!      ▲                                  │
//!      └──────────── resume() ────────────┘
//! ```

use crate::libs::idle::is_input_active;
use std::fmt;
use thiserror::Error;

/// Consecutive idle ticks tolerated before the grace counter stops growing.
pub const GRACE_PERIOD_SECONDS: u32 = 10;

/// Reminder interval used when nothing is configured.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 20;

/// One reading of both probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySample {
    pub idle_seconds: u64,
    pub audio_active: bool,
}

impl ActivitySample {
    pub fn input_active(&self) -> bool {
        is_input_active(self.idle_seconds)
    }

    /// Display classification. Input wins over audio; both count the same.
    pub fn kind(&self) -> ActivityKind {
        if self.input_active() {
            ActivityKind::Input
        } else if self.audio_active {
            ActivityKind::Audio
        } else {
            ActivityKind::Idle
        }
    }
}

/// Anything that can produce an [`ActivitySample`] on demand.
pub trait ActivitySource {
    fn sample(&mut self) -> ActivitySample;
}

/// What the user was doing on the last sampled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityKind {
    #[default]
    Idle,
    Input,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Resting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Running => write!(f, "running"),
            Phase::Resting => write!(f, "resting"),
        }
    }
}

/// State transitions surfaced to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorEvent {
    ReminderDue,
    PhaseChanged(Phase),
}

/// Snapshot the UI renders once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentDisplay {
    pub remaining_seconds: u32,
    pub activity: ActivityKind,
    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccumulatorError {
    #[error("reminder interval must be at least one minute (got {0})")]
    InvalidInterval(u32),
}

/// The tick-driven accumulator.
#[derive(Debug, Clone)]
pub struct ActivityAccumulator {
    interval_seconds: u32,
    accumulated_seconds: u32,
    grace_counter: u32,
    remaining_seconds: u32,
    activity: ActivityKind,
    phase: Phase,
}

impl ActivityAccumulator {
    pub fn new(interval_minutes: u32) -> Result<Self, AccumulatorError> {
        let interval_seconds = interval_seconds(interval_minutes)?;
        Ok(Self {
            interval_seconds,
            accumulated_seconds: 0,
            grace_counter: 0,
            remaining_seconds: interval_seconds,
            activity: ActivityKind::Idle,
            phase: Phase::Running,
        })
    }

    pub fn interval_seconds(&self) -> u32 {
        self.interval_seconds
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_seconds / 60
    }

    pub fn accumulated_seconds(&self) -> u32 {
        self.accumulated_seconds
    }

    pub fn grace_counter(&self) -> u32 {
        self.grace_counter
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn activity(&self) -> ActivityKind {
        self.activity
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn display(&self) -> CurrentDisplay {
        CurrentDisplay {
            remaining_seconds: self.remaining_seconds,
            activity: self.activity,
            phase: self.phase,
        }
    }

    /// Advances the state machine by one tick.
    ///
    /// While resting the source is not sampled and nothing changes.
    pub fn tick<S: ActivitySource + ?Sized>(&mut self, source: &mut S) -> Vec<AccumulatorEvent> {
        if self.phase == Phase::Resting {
            return Vec::new();
        }
        let sample = source.sample();
        self.apply(sample)
    }

    fn apply(&mut self, sample: ActivitySample) -> Vec<AccumulatorEvent> {
        self.activity = sample.kind();

        if self.activity == ActivityKind::Idle {
            if self.grace_counter < GRACE_PERIOD_SECONDS {
                self.grace_counter += 1;
            }
            return Vec::new();
        }

        self.accumulated_seconds += 1;
        self.grace_counter = 0;
        self.remaining_seconds = self.interval_seconds.saturating_sub(self.accumulated_seconds);

        if self.accumulated_seconds >= self.interval_seconds {
            self.accumulated_seconds = self.interval_seconds;
            self.phase = Phase::Resting;
            return vec![AccumulatorEvent::ReminderDue, AccumulatorEvent::PhaseChanged(Phase::Resting)];
        }
        Vec::new()
    }

    /// Starts a fresh cycle at the current interval.
    pub fn resume(&mut self) -> Vec<AccumulatorEvent> {
        let was_resting = self.phase == Phase::Resting;
        self.accumulated_seconds = 0;
        self.grace_counter = 0;
        self.remaining_seconds = self.interval_seconds;
        self.phase = Phase::Running;

        if was_resting {
            vec![AccumulatorEvent::PhaseChanged(Phase::Running)]
        } else {
            Vec::new()
        }
    }

    /// Changes the interval and restarts the current cycle at the new length.
    ///
    /// Does not leave `Resting`; only [`resume`](Self::resume) does.
    pub fn set_interval(&mut self, minutes: u32) -> Result<(), AccumulatorError> {
        self.interval_seconds = interval_seconds(minutes)?;
        self.accumulated_seconds = 0;
        self.remaining_seconds = self.interval_seconds;
        Ok(())
    }
}

fn interval_seconds(minutes: u32) -> Result<u32, AccumulatorError> {
    match minutes.checked_mul(60) {
        Some(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(AccumulatorError::InvalidInterval(minutes)),
    }
}

/// Formats seconds as `MM:SS`, with minutes allowed to exceed 59.
pub fn format_remaining(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
