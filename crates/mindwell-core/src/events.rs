use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meditation::SessionState;
use crate::sound::{SessionMood, SessionType, SoundId};

/// Every state change in the system produces an Event.
/// Front ends drain the queue and render; nothing in the core renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Recommendation changed the selected sound (nothing was played).
    SoundRecommended {
        session_type: SessionType,
        mood: SessionMood,
        sound: SoundId,
        at: DateTime<Utc>,
    },
    /// The active (selected) sound changed, whether or not it plays.
    ActiveSoundChanged {
        sound: SoundId,
        at: DateTime<Utc>,
    },
    AmbientStarted {
        sound: SoundId,
        at: DateTime<Utc>,
    },
    AmbientStopped {
        sound: SoundId,
        at: DateTime<Utc>,
    },
    VolumeChanged {
        level: f32,
        at: DateTime<Utc>,
    },
    SessionStarted {
        session_type: SessionType,
        mood: SessionMood,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCancelled {
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_type: SessionType,
        mood: SessionMood,
        minutes: u64,
        sound: SoundId,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        session_type: SessionType,
        mood: SessionMood,
        duration_secs: u64,
        remaining_secs: u64,
        active_sound: SoundId,
        sound_playing: bool,
        at: DateTime<Utc>,
    },
    /// A transient user-facing message.
    Notification {
        level: NotificationLevel,
        message: String,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// FIFO of pending events.
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.push(Event::Notification {
            level,
            message: message.into(),
            at: Utc::now(),
        });
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    /// Remove and return everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
