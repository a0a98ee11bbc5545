//! Meditation session state machine.
//!
//! Pure lifecycle: no audio, no timers. The caller feeds one `tick()` per
//! elapsed second while running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> Completed -> Idle
//! ```
//!
//! Configuration edits made while a session is in flight are stored for
//! the next session; the running one keeps the values frozen at start.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::sound::{SessionMood, SessionType, SoundId};

pub const DEFAULT_DURATION_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero. Folds back to `Idle` within the same tick.
    Completed,
}

/// What a session is set up to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub duration_secs: u64,
    pub session_type: SessionType,
    pub mood: SessionMood,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            session_type: SessionType::default(),
            mood: SessionMood::default(),
        }
    }
}

impl SessionConfig {
    /// Whole minutes credited for this duration, rounded up.
    pub fn credited_minutes(&self) -> u64 {
        self.duration_secs.div_ceil(60)
    }
}

/// A session whose countdown reached zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedSession {
    pub config: SessionConfig,
    pub minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeditationSession {
    /// Configuration for the next session.
    config: SessionConfig,
    /// Configuration frozen when the current session started.
    #[serde(default)]
    in_flight: Option<SessionConfig>,
    state: SessionState,
    remaining_secs: u64,
}

impl Default for MeditationSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl MeditationSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            in_flight: None,
            state: SessionState::Idle,
            remaining_secs: config.duration_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Whether a session has started and not yet completed or been cancelled.
    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Configuration for the next session.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Configuration governing the current countdown.
    pub fn current(&self) -> &SessionConfig {
        self.in_flight.as_ref().unwrap_or(&self.config)
    }

    /// 0.0 .. 1.0 progress through the current session.
    pub fn progress(&self) -> f64 {
        let total = self.current().duration_secs;
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn remaining_display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn snapshot(&self, active_sound: SoundId, sound_playing: bool) -> Event {
        let current = self.current();
        Event::StateSnapshot {
            state: self.state,
            session_type: current.session_type,
            mood: current.mood,
            duration_secs: current.duration_secs,
            remaining_secs: self.remaining_secs,
            active_sound,
            sound_playing,
            at: Utc::now(),
        }
    }

    // ── Configuration ────────────────────────────────────────────────

    pub fn set_duration_minutes(&mut self, minutes: u64) -> Result<(), ValidationError> {
        if minutes == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        self.config.duration_secs = minutes * 60;
        if !self.in_flight() {
            self.remaining_secs = self.config.duration_secs;
        }
        Ok(())
    }

    pub fn set_session_type(&mut self, session_type: SessionType) {
        self.config.session_type = session_type;
    }

    pub fn set_mood(&mut self, mood: SessionMood) {
        self.config.mood = mood;
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            SessionState::Idle | SessionState::Completed => {
                let frozen = self.config;
                self.in_flight = Some(frozen);
                self.remaining_secs = frozen.duration_secs;
                self.state = SessionState::Running;
                Some(Event::SessionStarted {
                    session_type: frozen.session_type,
                    mood: frozen.mood,
                    duration_secs: frozen.duration_secs,
                    at: Utc::now(),
                })
            }
            SessionState::Paused => self.resume(),
            SessionState::Running => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            SessionState::Running => {
                self.state = SessionState::Paused;
                Some(Event::SessionPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.state {
            SessionState::Paused => {
                self.state = SessionState::Running;
                Some(Event::SessionResumed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Abandon the current session without crediting it.
    pub fn cancel(&mut self) -> Option<Event> {
        if !self.in_flight() {
            return None;
        }
        self.reset_to_idle();
        Some(Event::SessionCancelled { at: Utc::now() })
    }

    /// Count down one second. Returns the completed session when the
    /// countdown reaches zero; ignored unless running.
    pub fn tick(&mut self) -> Option<CompletedSession> {
        if self.state != SessionState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        let config = self.in_flight.unwrap_or(self.config);
        self.state = SessionState::Completed;
        tracing::debug!(session_type = %config.session_type, "meditation countdown reached zero");
        self.reset_to_idle();
        Some(CompletedSession {
            config,
            minutes: config.credited_minutes(),
        })
    }

    fn reset_to_idle(&mut self) {
        self.in_flight = None;
        self.state = SessionState::Idle;
        self.remaining_secs = self.config.duration_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short(secs: u64) -> MeditationSession {
        MeditationSession::new(SessionConfig {
            duration_secs: secs,
            ..SessionConfig::default()
        })
    }

    #[test]
    fn starts_idle_with_full_duration() {
        let session = MeditationSession::default();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.remaining_secs(), 300);
        assert_eq!(session.remaining_display(), "05:00");
    }

    #[test]
    fn start_pause_resume() {
        let mut session = MeditationSession::default();
        assert!(session.start().is_some());
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.start().is_none());

        assert!(session.pause().is_some());
        assert_eq!(session.state(), SessionState::Paused);
        assert!(session.pause().is_none());

        assert!(matches!(session.start(), Some(Event::SessionResumed { .. })));
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn pause_resume_preserves_remaining() {
        let mut session = short(10);
        session.start();
        session.tick();
        session.tick();
        session.pause();
        for _ in 0..5 {
            assert!(session.tick().is_none());
        }
        assert_eq!(session.remaining_secs(), 8);
        session.resume();
        assert_eq!(session.remaining_secs(), 8);
    }

    #[test]
    fn completes_after_duration_and_resets() {
        let mut session = short(3);
        session.start();
        assert!(session.tick().is_none());
        assert!(session.tick().is_none());
        let done = session.tick().expect("completed");
        assert_eq!(done.minutes, 1);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.remaining_secs(), 3);
        assert!(!session.in_flight());
    }

    #[test]
    fn credited_minutes_round_up() {
        let cfg = |d| SessionConfig { duration_secs: d, ..SessionConfig::default() };
        assert_eq!(cfg(60).credited_minutes(), 1);
        assert_eq!(cfg(61).credited_minutes(), 2);
        assert_eq!(cfg(600).credited_minutes(), 10);
    }

    #[test]
    fn mid_session_changes_apply_to_next_session() {
        let mut session = short(2);
        session.start();
        session.set_duration_minutes(10).unwrap();
        session.set_session_type(SessionType::BodyScan);
        session.set_mood(SessionMood::Anxious);
        assert_eq!(session.remaining_secs(), 2);

        session.tick();
        let done = session.tick().unwrap();
        assert_eq!(done.config.duration_secs, 2);
        assert_eq!(done.config.session_type, SessionType::Breathing);
        assert_eq!(done.config.mood, SessionMood::Calm);

        assert_eq!(session.remaining_secs(), 600);
        assert_eq!(session.current().session_type, SessionType::BodyScan);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut session = MeditationSession::default();
        assert_eq!(session.set_duration_minutes(0), Err(ValidationError::ZeroDuration));
    }

    #[test]
    fn cancel_resets_without_completion() {
        let mut session = short(5);
        assert!(session.cancel().is_none());
        session.start();
        session.tick();
        session.pause();
        assert!(session.cancel().is_some());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.remaining_secs(), 5);
    }

    #[test]
    fn session_roundtrips_through_json() {
        let mut session = short(30);
        session.start();
        session.tick();
        let json = serde_json::to_string(&session).unwrap();
        let restored: MeditationSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), SessionState::Running);
        assert_eq!(restored.remaining_secs(), 29);
    }
}
