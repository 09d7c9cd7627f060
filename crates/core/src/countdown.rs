//! One-second resolution countdown that drives session expiry.
//!
//! The countdown holds no timer handle of its own: the host feeds it ticks
//! (an interval in the session runner, or a loop in tests), so pause, resume
//! and cancel are plain state changes.

/// Default assessment length (45:00).
pub const DEFAULT_DURATION_SECS: u32 = 45 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Running,
    Paused,
    Expired,
    Cancelled,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown is not running; nothing changed.
    Inactive,
    Ticked { remaining: u32 },
    /// Remaining time just reached zero. Reported once per `start`.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    elapsed: u32,
    state: CountdownState,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self {
            duration: 0,
            remaining: 0,
            elapsed: 0,
            state: CountdownState::Idle,
        }
    }

    /// Begin counting down from `duration_secs`, discarding any previous run.
    pub fn start(&mut self, duration_secs: u32) {
        self.duration = duration_secs;
        self.remaining = duration_secs;
        self.elapsed = 0;
        self.state = CountdownState::Running;
    }

    pub fn pause(&mut self) {
        if self.state == CountdownState::Running {
            self.state = CountdownState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == CountdownState::Paused {
            self.state = CountdownState::Running;
        }
    }

    /// Stop for good. Only a fresh `start` brings the countdown back.
    pub fn cancel(&mut self) {
        if self.state != CountdownState::Expired {
            self.state = CountdownState::Cancelled;
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != CountdownState::Running {
            return TickOutcome::Inactive;
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            self.elapsed = self.elapsed.saturating_add(1);
        }
        if self.remaining == 0 {
            self.state = CountdownState::Expired;
            return TickOutcome::Expired;
        }
        TickOutcome::Ticked {
            remaining: self.remaining,
        }
    }

    #[must_use]
    pub fn state(&self) -> CountdownState {
        self.state
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    /// Seconds actually counted down, excluding time spent paused.
    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    /// Remaining time as `MM:SS`.
    #[must_use]
    pub fn label(&self) -> String {
        format_mm_ss(self.remaining)
    }
}

#[must_use]
pub fn format_mm_ss(seconds: u32) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    format!("{minutes:02}:{remainder:02}")
}
