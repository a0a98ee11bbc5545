//! Application context.
//!
//! One [`AppContext`] is built at startup and passed by `&mut` to whatever
//! front end drives it. It owns the record store, the loaded history, the
//! meditation runner and the chat conversation, and turns every recoverable
//! failure into a [`Event::Notification`] instead of an error the front end
//! must handle.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::chat::{
    ChatReply, CompletionClient, Conversation, GeminiClient, RetryPolicy, RetryingClient,
};
use crate::error::{AudioError, CompletionError, CoreError, StorageError, ValidationError};
use crate::events::{Event, EventQueue, NotificationLevel};
use crate::history::{DailyAverage, History, MeditationRecord, MoodEntry, MoodScore, MoodSummary};
use crate::meditation::{CountdownTick, SessionConfig, SessionRunner, SessionState, ToggleOutcome};
use crate::safety_plan::SafetyPlan;
use crate::sound::{
    AmbientPlayer, HeadlessBackend, PlayOutcome, RecommendationEngine, SessionMood, SessionType,
    SoundId,
};
use crate::storage::{data_dir, Config, Database, RecordStore};
use crate::tips;

pub struct AppContext {
    config: Config,
    store: Box<dyn RecordStore + Send>,
    history: History,
    runner: SessionRunner,
    ticks: mpsc::UnboundedReceiver<CountdownTick>,
    conversation: Conversation,
    chat: Option<Box<dyn CompletionClient>>,
    events: EventQueue,
}

impl AppContext {
    /// Assemble a context from its parts. Stored history is loaded key by
    /// key; an unreadable key is reported, moved aside and starts empty
    /// while the other keys load normally.
    pub fn new(
        config: Config,
        store: Box<dyn RecordStore + Send>,
        player: AmbientPlayer,
        chat: Option<Box<dyn CompletionClient>>,
    ) -> Self {
        let mut events = EventQueue::new();
        let (history, problems) = History::recover(store.as_ref());
        for e in problems {
            tracing::warn!(error = %e, "history record could not be loaded; starting it empty");
            events.notify(NotificationLevel::Warning, format!("Saved history could not be read: {e}"));
        }

        let session_config = SessionConfig {
            duration_secs: config.meditation.default_minutes.max(1) * 60,
            session_type: config.meditation.default_type,
            mood: config.meditation.default_mood,
        };
        let (runner, ticks) =
            SessionRunner::new(session_config, player, RecommendationEngine::default());

        Self {
            config,
            store,
            history,
            runner,
            ticks,
            conversation: Conversation::new(),
            chat,
            events,
        }
    }

    /// Open the on-disk store under the data directory with the headless
    /// audio backend and, if an API key is configured, the Gemini client.
    pub fn open(config: Config) -> Result<Self, CoreError> {
        let dir = data_dir()?;
        let store = Database::open_at(&dir.join("mindwell.db"))?;
        let player = build_player(&config, &dir);

        let chat: Option<Box<dyn CompletionClient>> =
            match GeminiClient::from_config(&config.chat, config.chat_api_key()) {
                Ok(client) => {
                    let policy = RetryPolicy::new(
                        config.chat.max_attempts,
                        Duration::from_millis(config.chat.base_delay_ms),
                    );
                    Some(Box::new(RetryingClient::new(client, policy)))
                }
                Err(e) => {
                    tracing::debug!(error = %e, "chat assistant disabled");
                    None
                }
            };

        Ok(Self::new(config, Box::new(store), player, chat))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn runner(&self) -> &SessionRunner {
        &self.runner
    }

    pub fn session_state(&self) -> SessionState {
        self.runner.state()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn snapshot(&self) -> Event {
        self.runner.snapshot()
    }

    /// Everything that happened since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.absorb();
        self.events.drain()
    }

    // ── Meditation ───────────────────────────────────────────────────

    pub fn set_session_type(&mut self, session_type: SessionType) -> SoundId {
        let sound = self.runner.set_session_type(session_type);
        self.absorb();
        sound
    }

    pub fn set_mood(&mut self, mood: SessionMood) -> SoundId {
        let sound = self.runner.set_mood(mood);
        self.absorb();
        sound
    }

    pub fn set_duration_minutes(&mut self, minutes: u64) -> Result<(), ValidationError> {
        let result = self.runner.set_duration_minutes(minutes);
        if let Err(e) = &result {
            self.notify(NotificationLevel::Warning, e.to_string());
        }
        result
    }

    /// Explicit sound pick from the selector; plays immediately.
    pub async fn choose_sound(&mut self, sound: SoundId) -> Result<PlayOutcome, AudioError> {
        let result = self.runner.choose_sound(sound).await;
        let running = self.runner.state() == SessionState::Running;
        match &result {
            Ok(PlayOutcome::Started) if !running => {
                self.notify(NotificationLevel::Info, format!("Playing {sound} sound."));
            }
            Ok(PlayOutcome::Silenced) if !running => {
                self.notify(NotificationLevel::Info, "Ambient sound stopped (Silence).");
            }
            Ok(_) => {}
            Err(e) => self.notify_audio(e),
        }
        result
    }

    pub fn set_volume(&mut self, level: f32) -> f32 {
        let applied = self.runner.player_mut().set_volume(level);
        self.absorb();
        applied
    }

    /// Start when not running, pause when running. The audio engine is
    /// primed first, as a toggle is the user gesture that allows it.
    pub async fn toggle_session(&mut self) -> ToggleOutcome {
        if !self.runner.session().is_running() {
            self.runner.player().prime().await;
        }
        let outcome = self.runner.toggle().await;
        if let ToggleOutcome::Started(report) = &outcome {
            if let Some(Err(e)) = &report.playback {
                self.notify_audio(e);
            }
        }
        self.absorb();
        outcome
    }

    pub fn cancel_session(&mut self) -> bool {
        let cancelled = self.runner.cancel();
        self.absorb();
        cancelled
    }

    /// Wait for the next countdown tick. Pending forever while no session
    /// runs.
    pub async fn next_tick(&mut self) -> Option<CountdownTick> {
        self.ticks.recv().await
    }

    /// Apply a countdown tick. On completion the stats are written first,
    /// then the history.
    pub fn on_tick(&mut self, tick: CountdownTick) -> Option<MeditationRecord> {
        let record = self.runner.on_tick(tick)?;
        self.complete(record.clone());
        Some(record)
    }

    /// Apply one second without waiting on the countdown task.
    pub fn advance(&mut self) -> Option<MeditationRecord> {
        let record = self.runner.advance()?;
        self.complete(record.clone());
        Some(record)
    }

    fn complete(&mut self, record: MeditationRecord) {
        self.history.record_session(record);
        let stats = self.history.save_stats(self.store.as_ref());
        let sessions = self.history.save_sessions(self.store.as_ref());
        match stats.and(sessions) {
            Ok(()) => self.notify(NotificationLevel::Success, "Meditation completed! Well done."),
            Err(e) => self.notify_error(&e),
        }
    }

    // ── Mood ─────────────────────────────────────────────────────────

    /// Record a mood rating. `None` means the user has not picked one.
    pub fn save_mood(&mut self, mood: Option<u8>, note: Option<String>) -> Result<MoodEntry, CoreError> {
        let result = self.try_save_mood(mood, note);
        match &result {
            Ok(_) => self.notify(NotificationLevel::Success, "Mood entry saved!"),
            Err(e) => self.notify_error(e),
        }
        result
    }

    fn try_save_mood(&mut self, mood: Option<u8>, note: Option<String>) -> Result<MoodEntry, CoreError> {
        let score = MoodScore::new(mood.ok_or(ValidationError::NoMoodSelected)?)?;
        let entry = MoodEntry::now(score, note);
        self.history.record_mood(entry.clone());
        self.history.save_moods(self.store.as_ref())?;
        Ok(entry)
    }

    pub fn mood_chart(&self, days: u32) -> Vec<DailyAverage> {
        self.history.windowed_average(days)
    }

    pub fn default_mood_chart(&self) -> Vec<DailyAverage> {
        self.mood_chart(self.config.history.chart_days)
    }

    pub fn mood_summary(&self) -> MoodSummary {
        self.history.mood_summary(self.config.history.chart_days)
    }

    pub fn recent_moods(&self) -> Vec<&MoodEntry> {
        self.history.recent_moods(self.config.history.recent_moods)
    }

    pub fn recent_sessions(&self) -> Vec<&MeditationRecord> {
        self.history.recent_sessions(self.config.history.recent_sessions)
    }

    // ── Safety plan & tip ────────────────────────────────────────────

    pub fn safety_plan(&mut self) -> SafetyPlan {
        match SafetyPlan::load(self.store.as_ref()) {
            Ok(plan) => plan,
            Err(e) => {
                self.notify_error(&e);
                SafetyPlan::default()
            }
        }
    }

    pub fn save_safety_plan(&mut self, mut plan: SafetyPlan) -> Result<SafetyPlan, CoreError> {
        match plan.save(self.store.as_ref()) {
            Ok(()) => {
                self.notify(NotificationLevel::Success, "Safety plan saved!");
                Ok(plan)
            }
            Err(e) => {
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    pub fn daily_tip(&self) -> String {
        tips::daily_tip(self.store.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "daily tip unavailable; using the first tip");
            tips::TIPS[0].to_string()
        })
    }

    // ── Chat ─────────────────────────────────────────────────────────

    /// Send a chat message. Input problems are rejected; service failures
    /// yield the apology text with the error attached.
    pub async fn send_chat(&mut self, message: &str) -> Result<ChatReply, ValidationError> {
        let sent = match self.chat.as_deref() {
            Some(client) => self.conversation.send(client, message).await,
            None => self.conversation.begin(message).map(|()| {
                self.conversation.finish(Err(CompletionError::NotConfigured(
                    "no chat API key configured".into(),
                )))
            }),
        };
        match &sent {
            Ok(reply) => {
                if let Some(e) = &reply.error {
                    let message = format!("Chat assistant unavailable: {e}");
                    self.notify(NotificationLevel::Error, message);
                }
            }
            Err(e) => self.notify(NotificationLevel::Warning, e.to_string()),
        }
        sent
    }

    // ── Notifications ────────────────────────────────────────────────

    fn absorb(&mut self) {
        let pending = self.runner.drain_events();
        self.events.extend(pending);
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.absorb();
        self.events.notify(level, message);
    }

    fn notify_audio(&mut self, err: &AudioError) {
        let (level, message) = match err {
            AudioError::EngineUnavailable => (
                NotificationLevel::Warning,
                "Meditation audio is disabled because no audio engine is available.".to_string(),
            ),
            AudioError::TrackNotLoaded(sound) => (
                NotificationLevel::Error,
                format!("Ambient sound \"{sound}\" file not loaded."),
            ),
            AudioError::EngineNotReady(_) => {
                let sound = self.runner.player().active();
                (
                    NotificationLevel::Error,
                    format!("Could not start {sound} sound. Please check audio permissions."),
                )
            }
            other => (NotificationLevel::Error, other.to_string()),
        };
        self.notify(level, message);
    }

    fn notify_error(&mut self, err: &CoreError) {
        match err {
            CoreError::Validation(e) => self.notify(NotificationLevel::Warning, e.to_string()),
            CoreError::Audio(e) => self.notify_audio(e),
            CoreError::Storage(StorageError::Corrupt { key, .. }) => {
                let message = format!("Saved data under {key} is unreadable.");
                self.notify(NotificationLevel::Error, message);
            }
            other => self.notify(NotificationLevel::Error, other.to_string()),
        }
    }
}

/// Build the ambient player for `config`, loading sound files from the
/// configured assets directory. Missing files only disable those sounds.
pub fn build_player(config: &Config, data_dir: &Path) -> AmbientPlayer {
    if !config.audio.enabled {
        return AmbientPlayer::new(None, config.audio.volume);
    }
    let mut player = AmbientPlayer::new(Some(Arc::new(HeadlessBackend::new())), config.audio.volume);
    let failures = player.load_library(&config.assets_dir(data_dir));
    if !failures.is_empty() {
        tracing::debug!(missing = failures.len(), "some ambient sounds are unavailable");
    }
    player
}
