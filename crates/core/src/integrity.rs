//! Tab-switch detection policy.
//!
//! Every visible to hidden edge counts as one violation; repeated `hidden`
//! reports without a visible one in between are the same switch. The count is
//! incremented before it is compared: while `count <= limit` a warning with
//! `limit - count` remaining is reported, and the first transition past the
//! limit reports `LimitExceeded` once and disarms the monitor.

pub const DEFAULT_MAX_TAB_SWITCHES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityEvent {
    Warning { remaining: u32 },
    LimitExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityMonitor {
    limit: u32,
    violations: u32,
    armed: bool,
    hidden: bool,
}

impl Default for IntegrityMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TAB_SWITCHES)
    }
}

impl IntegrityMonitor {
    /// A disarmed monitor; call `arm` when the session starts running.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            violations: 0,
            armed: false,
            hidden: false,
        }
    }

    pub fn arm(&mut self) {
        self.violations = 0;
        self.armed = true;
        self.hidden = false;
    }

    /// Stop observing. Further transitions produce no events.
    pub fn detach(&mut self) {
        self.armed = false;
    }

    pub fn observe(&mut self, hidden: bool) -> Option<IntegrityEvent> {
        let was_hidden = std::mem::replace(&mut self.hidden, hidden);
        if !self.armed || !hidden || was_hidden {
            return None;
        }
        self.violations = self.violations.saturating_add(1);
        if self.violations > self.limit {
            self.armed = false;
            return Some(IntegrityEvent::LimitExceeded);
        }
        Some(IntegrityEvent::Warning {
            remaining: self.limit - self.violations,
        })
    }

    #[must_use]
    pub fn violations(&self) -> u32 {
        self.violations
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
