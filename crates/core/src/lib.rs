#![forbid(unsafe_code)]

pub mod countdown;
pub mod error;
pub mod integrity;
pub mod model;
pub mod time;

pub use countdown::{Countdown, CountdownState, DEFAULT_DURATION_SECS, TickOutcome, format_mm_ss};
pub use error::Error;
pub use integrity::{DEFAULT_MAX_TAB_SWITCHES, IntegrityEvent, IntegrityMonitor};
pub use time::Clock;
