//! Guided meditation sessions.
//!
//! [`MeditationSession`] is the pure lifecycle, [`Countdown`] the one-second
//! ticker, and [`SessionRunner`] joins them with ambient playback.

mod countdown;
mod runner;
mod session;

pub use countdown::{Countdown, CountdownTick, TICK_PERIOD};
pub use runner::{SessionRunner, StartReport, ToggleOutcome};
pub use session::{
    CompletedSession, MeditationSession, SessionConfig, SessionState, DEFAULT_DURATION_SECS,
};
