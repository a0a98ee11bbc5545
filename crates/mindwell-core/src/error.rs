//! Core error types for mindwell-core.
//!
//! Every boundary (storage, audio, completion service, identity service)
//! gets its own thiserror enum; [`CoreError`] folds them together so the
//! application context can decide which ones become user notifications.

use std::path::PathBuf;
use thiserror::Error;

use crate::sound::SoundId;

/// Core error type for mindwell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Record store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ambient audio errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Text-completion service errors
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Identity service errors
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// User input errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Record store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the store
    #[error("Failed to open record store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Record store is locked")]
    Locked,

    /// A stored value did not decode as the expected record
    #[error("Corrupt record under '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// The record could not be read at load time and was not backed up
    #[error("Refusing to overwrite unreadable record '{key}'")]
    Protected { key: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Ambient audio errors. All of them are recoverable: playback simply
/// stays stopped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// No audio backend was initialised
    #[error("Audio engine is unavailable; ambient sound is disabled")]
    EngineUnavailable,

    /// The backend could not transition to a running state
    #[error("Audio engine failed to start: {0}")]
    EngineNotReady(String),

    /// The sound has no loaded handle (missing asset)
    #[error("Ambient sound \"{0}\" is not loaded")]
    TrackNotLoaded(SoundId),

    /// Loading an asset failed
    #[error("Failed to load {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Track refused to start
    #[error("Could not start {sound} sound: {message}")]
    StartFailed { sound: SoundId, message: String },
}

/// Text-completion service errors.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("HTTP Error: {status}")]
    Status { status: u16 },

    /// Service not configured
    #[error("Completion service is not configured: {0}")]
    NotConfigured(String),

    /// Unexpected response body
    #[error("Malformed completion response: {0}")]
    Malformed(String),

    /// All attempts failed
    #[error("Completion failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<CompletionError>,
    },
}

/// Identity service errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Email is already registered
    #[error("An account with this email already exists")]
    EmailExists,

    /// Wrong email/password combination
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password rejected by the provider
    #[error("Password is too weak: {0}")]
    WeakPassword(String),

    /// Too many attempts
    #[error("Too many attempts; try again later")]
    RateLimited,

    /// Operation requires a signed-in user
    #[error("Not signed in")]
    NotSignedIn,

    /// Provider not configured
    #[error("Identity service is not configured: {0}")]
    NotConfigured(String),

    /// Any other provider-reported failure
    #[error("Identity service error: {0}")]
    Provider(String),

    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Validation errors for user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Save requested without a mood selection
    #[error("Please select a mood first")]
    NoMoodSelected,

    /// Mood score outside 1..=5
    #[error("Mood must be between 1 and 5 (got {0})")]
    MoodOutOfRange(u8),

    /// Empty chat input
    #[error("Message is empty")]
    EmptyMessage,

    /// A chat reply is still pending
    #[error("The assistant is still replying")]
    ReplyPending,

    /// Zero-length meditation
    #[error("Session duration must be at least one minute")]
    ZeroDuration,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
