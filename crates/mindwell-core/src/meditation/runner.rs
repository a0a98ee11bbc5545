//! Drives a [`MeditationSession`] against the ambient player.
//!
//! The runner owns the countdown task and the player so that the two are
//! always started and stopped together: pausing or completing a session
//! cancels the countdown and stops audio in the same call.

use chrono::Utc;
use tokio::sync::mpsc;

use super::countdown::{Countdown, CountdownTick};
use super::session::{MeditationSession, SessionConfig, SessionState};
use crate::error::{AudioError, ValidationError};
use crate::events::{Event, EventQueue};
use crate::history::MeditationRecord;
use crate::sound::{AmbientPlayer, PlayOutcome, RecommendationEngine, SessionMood, SessionType, SoundId};

/// Result of starting or resuming a session.
#[derive(Debug, Clone, PartialEq)]
pub struct StartReport {
    /// `None` when no playback was attempted (silence, or the active sound
    /// was already playing).
    pub playback: Option<Result<PlayOutcome, AudioError>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Started(StartReport),
    Paused,
}

#[derive(Debug)]
pub struct SessionRunner {
    session: MeditationSession,
    player: AmbientPlayer,
    recommender: RecommendationEngine,
    countdown: Countdown,
    events: EventQueue,
}

impl SessionRunner {
    /// Build a runner and the channel its countdown ticks arrive on. The
    /// caller feeds every received tick back through [`Self::on_tick`].
    pub fn new(
        config: SessionConfig,
        player: AmbientPlayer,
        recommender: RecommendationEngine,
    ) -> (Self, mpsc::UnboundedReceiver<CountdownTick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::with_countdown(config, player, recommender, Countdown::new(tx)), rx)
    }

    pub fn with_countdown(
        config: SessionConfig,
        player: AmbientPlayer,
        recommender: RecommendationEngine,
        countdown: Countdown,
    ) -> Self {
        let mut runner = Self {
            session: MeditationSession::new(config),
            player,
            recommender,
            countdown,
            events: EventQueue::new(),
        };
        runner.recommend();
        runner
    }

    pub fn session(&self) -> &MeditationSession {
        &self.session
    }

    pub fn player(&self) -> &AmbientPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut AmbientPlayer {
        &mut self.player
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn snapshot(&self) -> Event {
        self.session
            .snapshot(self.player.active(), self.player.is_sound_playing())
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Re-run the recommendation for the configured type and mood.
    pub fn recommend(&mut self) -> SoundId {
        let config = *self.session.config();
        let (sound, event) =
            self.recommender
                .recommend(config.session_type, config.mood, &mut self.player);
        self.events.push(event);
        sound
    }

    pub fn set_session_type(&mut self, session_type: SessionType) -> SoundId {
        self.session.set_session_type(session_type);
        self.recommend()
    }

    pub fn set_mood(&mut self, mood: SessionMood) -> SoundId {
        self.session.set_mood(mood);
        self.recommend()
    }

    pub fn set_duration_minutes(&mut self, minutes: u64) -> Result<(), ValidationError> {
        self.session.set_duration_minutes(minutes)
    }

    /// Explicit sound pick: plays immediately, replacing whatever plays.
    pub async fn choose_sound(&mut self, sound: SoundId) -> Result<PlayOutcome, AudioError> {
        self.player.play(sound).await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start or resume. Returns `None` if already running.
    ///
    /// The countdown starts before the audio handshake is awaited, so a
    /// slow engine delays the sound but not the timer.
    pub async fn start(&mut self) -> Option<StartReport> {
        let event = self.session.start()?;
        self.events.push(event);
        self.countdown.start();

        let active = self.player.active();
        let playback = if active.is_silence() || self.player.playing() == Some(active) {
            None
        } else {
            Some(self.player.play(active).await)
        };
        if let Some(Err(e)) = &playback {
            tracing::warn!(sound = %active, error = %e, "session started without ambient sound");
        }
        Some(StartReport { playback })
    }

    /// Pause a running session. Returns whether anything changed.
    pub fn pause(&mut self) -> bool {
        let Some(event) = self.session.pause() else {
            return false;
        };
        self.halt();
        self.events.push(event);
        true
    }

    pub async fn toggle(&mut self) -> ToggleOutcome {
        if self.session.is_running() {
            self.pause();
            return ToggleOutcome::Paused;
        }
        match self.start().await {
            Some(report) => ToggleOutcome::Started(report),
            None => ToggleOutcome::Paused,
        }
    }

    /// Abandon the session in flight. No record is produced.
    pub fn cancel(&mut self) -> bool {
        let Some(event) = self.session.cancel() else {
            return false;
        };
        self.halt();
        self.events.push(event);
        true
    }

    /// Apply a countdown tick. Stale ticks from a cancelled run are
    /// dropped.
    pub fn on_tick(&mut self, tick: CountdownTick) -> Option<MeditationRecord> {
        if !self.countdown.is_current(tick) {
            return None;
        }
        self.advance()
    }

    /// Count down one second. On reaching zero, stops timer and audio and
    /// returns the record to persist.
    pub fn advance(&mut self) -> Option<MeditationRecord> {
        let done = self.session.tick()?;
        self.halt();

        let record = MeditationRecord::from_completion(&done, self.player.active(), Utc::now());
        self.events.push(Event::SessionCompleted {
            session_type: record.session_type,
            mood: record.mood,
            minutes: record.minutes,
            sound: record.sound,
            at: record.occurred_at,
        });
        Some(record)
    }

    /// Events from the session and the player, in the order they happened
    /// within each source.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = self.events.drain();
        events.extend(self.player.take_events());
        events
    }

    fn halt(&mut self) {
        self.countdown.cancel();
        self.player.stop_all();
    }
}
