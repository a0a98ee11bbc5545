//! Ambient playback controller.
//!
//! Owns one looping handle per playable sound and guarantees that at most
//! one of them is started at any time. Distinguishes the *active* sound
//! (what the selector shows) from the sound that is actually *playing*.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use super::backend::{AudioBackend, TrackHandle};
use super::library::SoundId;
use crate::error::AudioError;
use crate::events::{Event, EventQueue};

pub const DEFAULT_VOLUME: f32 = 0.5;

/// What a successful [`AmbientPlayer::play`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The requested sound was already playing; nothing changed.
    AlreadyPlaying,
    /// Silence was requested; any previous track was stopped.
    Silenced,
    /// The track is now playing.
    Started,
}

pub struct AmbientPlayer {
    backend: Option<Arc<dyn AudioBackend>>,
    tracks: HashMap<SoundId, Box<dyn TrackHandle>>,
    active: SoundId,
    playing: Option<SoundId>,
    volume: f32,
    events: EventQueue,
}

impl fmt::Debug for AmbientPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientPlayer")
            .field("has_backend", &self.backend.is_some())
            .field("loaded", &self.tracks.keys().collect::<Vec<_>>())
            .field("active", &self.active)
            .field("playing", &self.playing)
            .field("volume", &self.volume)
            .finish()
    }
}

impl AmbientPlayer {
    /// Create a controller. `None` means no audio engine: every `play` of a
    /// real sound reports [`AudioError::EngineUnavailable`].
    pub fn new(backend: Option<Arc<dyn AudioBackend>>, volume: f32) -> Self {
        Self {
            backend,
            tracks: HashMap::new(),
            active: SoundId::Silence,
            playing: None,
            volume: clamp_volume(volume),
            events: EventQueue::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_VOLUME)
    }

    /// Load every playable sound from `assets_dir`. Missing assets are not
    /// fatal: the sound stays selectable and `play` reports it.
    pub fn load_library(&mut self, assets_dir: &Path) -> Vec<AudioError> {
        let Some(backend) = self.backend.clone() else {
            return vec![AudioError::EngineUnavailable];
        };
        if !backend.is_available() {
            return vec![AudioError::EngineUnavailable];
        }

        let mut failures = Vec::new();
        for sound in SoundId::PLAYABLE {
            let Some(file) = sound.asset_file() else {
                continue;
            };
            match backend.load(sound, &assets_dir.join(file)) {
                Ok(handle) => self.insert_track(sound, handle),
                Err(e) => {
                    tracing::warn!(%sound, error = %e, "ambient track not loaded");
                    failures.push(e);
                }
            }
        }
        failures
    }

    /// Register a handle for `sound`, looping at the current volume.
    pub fn insert_track(&mut self, sound: SoundId, mut handle: Box<dyn TrackHandle>) {
        if sound.is_silence() {
            return;
        }
        handle.set_looping(true);
        handle.set_volume(self.volume);
        if let Some(mut old) = self.tracks.insert(sound, handle) {
            if old.is_started() {
                old.stop();
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn active(&self) -> SoundId {
        self.active
    }

    pub fn playing(&self) -> Option<SoundId> {
        self.playing
    }

    pub fn is_sound_playing(&self) -> bool {
        self.playing.is_some()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_loaded(&self, sound: SoundId) -> bool {
        self.tracks.contains_key(&sound)
    }

    pub fn has_engine(&self) -> bool {
        self.backend.as_ref().is_some_and(|b| b.is_available())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply a volume level to every loaded track, playing or not.
    /// Values are clamped to `0.0..=1.0`; NaN becomes `0.0`.
    pub fn set_volume(&mut self, level: f32) -> f32 {
        self.volume = clamp_volume(level);
        for handle in self.tracks.values_mut() {
            handle.set_volume(self.volume);
        }
        self.events.push(Event::VolumeChanged {
            level: self.volume,
            at: Utc::now(),
        });
        self.volume
    }

    /// Mark `sound` as active without touching playback. Returns whether
    /// the selection changed.
    pub fn select(&mut self, sound: SoundId) -> bool {
        if self.active == sound {
            return false;
        }
        self.active = sound;
        self.events.push(Event::ActiveSoundChanged {
            sound,
            at: Utc::now(),
        });
        true
    }

    /// Ask the engine to become ready ahead of a `play`. Failure here is
    /// only a warning; `play` retries the handshake and reports errors.
    pub async fn prime(&self) {
        if let Some(backend) = self.backend.as_ref().filter(|b| b.is_available()) {
            if let Err(e) = backend.request_engine_ready().await {
                tracing::warn!(error = %e, "audio engine failed to start on prime");
            }
        }
    }

    /// Make `sound` the active sound and start it.
    ///
    /// A no-op when `sound` is already playing. Otherwise the previous
    /// track is stopped first. The returned future completes only after
    /// the engine handshake settles.
    pub async fn play(&mut self, sound: SoundId) -> Result<PlayOutcome, AudioError> {
        if self.playing == Some(sound) {
            self.select(sound);
            return Ok(PlayOutcome::AlreadyPlaying);
        }

        self.stop_all();
        self.active = sound;
        self.events.push(Event::ActiveSoundChanged {
            sound,
            at: Utc::now(),
        });

        if sound.is_silence() {
            return Ok(PlayOutcome::Silenced);
        }

        let backend = match &self.backend {
            Some(b) if b.is_available() => Arc::clone(b),
            _ => return Err(AudioError::EngineUnavailable),
        };
        if !self.tracks.contains_key(&sound) {
            return Err(AudioError::TrackNotLoaded(sound));
        }

        backend.request_engine_ready().await?;

        let handle = self
            .tracks
            .get_mut(&sound)
            .ok_or(AudioError::TrackNotLoaded(sound))?;
        handle.start()?;
        self.playing = Some(sound);
        self.events.push(Event::AmbientStarted {
            sound,
            at: Utc::now(),
        });
        tracing::debug!(%sound, "ambient playback started");
        Ok(PlayOutcome::Started)
    }

    /// Stop every started track. Returns how many were stopped.
    pub fn stop_all(&mut self) -> usize {
        let mut stopped = 0;
        for handle in self.tracks.values_mut() {
            if handle.is_started() {
                handle.stop();
                stopped += 1;
            }
        }
        if let Some(sound) = self.playing.take() {
            self.events.push(Event::AmbientStopped {
                sound,
                at: Utc::now(),
            });
        }
        stopped
    }

    /// Drain events produced since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}

fn clamp_volume(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}
