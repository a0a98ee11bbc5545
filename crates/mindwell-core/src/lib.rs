//! # MindWell Core Library
//!
//! Business logic for the MindWell wellness app: guided meditation with
//! automatically recommended ambient sound, mood tracking, a safety plan,
//! a daily tip and a chat assistant. Front ends (the `mindwell` CLI, or any
//! GUI) drive an [`AppContext`] and render the [`Event`]s it produces.
//!
//! ## Architecture
//!
//! - **Sound**: a fixed (session type x mood) recommendation table, and an
//!   ambient player that keeps at most one looping track playing
//! - **Meditation**: an Idle/Running/Paused session state machine with a
//!   one-second countdown task that starts and stops audio with the timer
//! - **History**: append-only mood and meditation logs, running totals and
//!   daily-average chart series
//! - **Storage**: SQLite-backed JSON records and TOML configuration
//! - **Chat / Auth**: REST clients for the completion and identity services
//!
//! ## Key Components
//!
//! - [`AppContext`]: composition root and notification boundary
//! - [`SessionRunner`]: meditation lifecycle plus ambient playback
//! - [`SoundLibrary`]: sound recommendation table
//! - [`History`]: mood and meditation aggregates
//! - [`Config`]: application configuration management

pub mod app;
pub mod auth;
pub mod chat;
pub mod error;
pub mod events;
pub mod history;
pub mod meditation;
pub mod safety_plan;
pub mod sound;
pub mod storage;
pub mod tips;

pub use app::AppContext;
pub use auth::{AccountService, AuthSession, FirebaseAuth, IdentityProvider, UserProfile};
pub use chat::{ChatReply, ChatTurn, CompletionClient, Conversation, GeminiClient, RetryPolicy};
pub use error::{
    AudioError, AuthError, CompletionError, ConfigError, CoreError, StorageError, ValidationError,
};
pub use events::{Event, NotificationLevel};
pub use history::{History, MeditationRecord, MeditationStats, MoodEntry, MoodScore};
pub use meditation::{MeditationSession, SessionConfig, SessionRunner, SessionState};
pub use safety_plan::SafetyPlan;
pub use sound::{AmbientPlayer, SessionMood, SessionType, SoundId, SoundLibrary};
pub use storage::{Config, Database, MemoryStore, RecordStore};
