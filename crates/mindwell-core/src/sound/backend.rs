//! Audio backend seam.
//!
//! The playback controller never talks to an audio device directly. A
//! backend loads one looping handle per sound and has to be brought to a
//! running state before any handle can start. On some platforms that
//! transition is only allowed after a user gesture, so it is modelled as
//! an explicit async step.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::library::SoundId;
use crate::error::AudioError;

/// A loaded, loopable track.
pub trait TrackHandle: Send {
    fn start(&mut self) -> Result<(), AudioError>;
    fn stop(&mut self);
    fn is_started(&self) -> bool;
    /// Linear gain in `0.0..=1.0`.
    fn set_volume(&mut self, gain: f32);
    fn set_looping(&mut self, looping: bool);
}

#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Whether the engine exists at all. `false` disables ambient sound.
    fn is_available(&self) -> bool {
        true
    }

    /// Resolve once the engine is running. Resolves immediately when it
    /// already is.
    async fn request_engine_ready(&self) -> Result<(), AudioError>;

    /// Load a track from disk.
    fn load(&self, sound: SoundId, source: &Path) -> Result<Box<dyn TrackHandle>, AudioError>;
}

/// Convert linear gain to decibels, as most engines expect.
pub fn gain_to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * gain.log10()
    }
}

/// Backend for headless front ends. Tracks state and logs what a real
/// engine would do, without producing sound.
#[derive(Debug, Default, Clone)]
pub struct HeadlessBackend {
    started: Arc<Mutex<HashSet<SoundId>>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sounds whose handles are currently started.
    pub fn started(&self) -> Vec<SoundId> {
        self.started
            .lock()
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AudioBackend for HeadlessBackend {
    async fn request_engine_ready(&self) -> Result<(), AudioError> {
        Ok(())
    }

    fn load(&self, sound: SoundId, source: &Path) -> Result<Box<dyn TrackHandle>, AudioError> {
        if !source.exists() {
            return Err(AudioError::LoadFailed {
                path: source.to_path_buf(),
                message: "file not found".into(),
            });
        }
        Ok(Box::new(HeadlessTrack {
            sound,
            started: false,
            registry: Arc::clone(&self.started),
        }))
    }
}

struct HeadlessTrack {
    sound: SoundId,
    started: bool,
    registry: Arc<Mutex<HashSet<SoundId>>>,
}

impl TrackHandle for HeadlessTrack {
    fn start(&mut self) -> Result<(), AudioError> {
        self.started = true;
        if let Ok(mut set) = self.registry.lock() {
            set.insert(self.sound);
        }
        tracing::info!(sound = %self.sound, "ambient track started");
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
        if let Ok(mut set) = self.registry.lock() {
            set.remove(&self.sound);
        }
        tracing::info!(sound = %self.sound, "ambient track stopped");
    }

    fn is_started(&self) -> bool {
        self.started
    }

    fn set_volume(&mut self, gain: f32) {
        tracing::debug!(sound = %self.sound, db = gain_to_db(gain), "volume");
    }

    fn set_looping(&mut self, _looping: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_to_db_matches_reference_points() {
        assert_eq!(gain_to_db(1.0), 0.0);
        assert!((gain_to_db(0.5) - (-6.0206)).abs() < 0.001);
        assert_eq!(gain_to_db(0.0), f32::NEG_INFINITY);
    }

    #[test]
    fn headless_load_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = HeadlessBackend::new();
        assert!(backend.load(SoundId::Rain, &dir.path().join("rain.mp3")).is_err());

        std::fs::write(dir.path().join("rain.mp3"), b"").unwrap();
        let mut track = backend.load(SoundId::Rain, &dir.path().join("rain.mp3")).unwrap();
        track.start().unwrap();
        assert_eq!(backend.started(), vec![SoundId::Rain]);
        track.stop();
        assert!(backend.started().is_empty());
    }
}
