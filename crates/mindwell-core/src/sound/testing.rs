//! In-memory audio backend for unit tests. Records every call in order.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::backend::{AudioBackend, TrackHandle};
use super::library::SoundId;
use crate::error::AudioError;

#[derive(Clone, Default)]
pub struct FakeBackend {
    calls: Arc<Mutex<Vec<String>>>,
    started: Arc<Mutex<HashSet<SoundId>>>,
    missing: HashSet<SoundId>,
    engine_error: Option<String>,
    ready_delay: Option<Duration>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_asset(mut self, sound: SoundId) -> Self {
        self.missing.insert(sound);
        self
    }

    pub fn failing_engine(mut self, message: &str) -> Self {
        self.engine_error = Some(message.to_string());
        self
    }

    pub fn with_ready_delay(mut self, delay: Duration) -> Self {
        self.ready_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn started(&self) -> Vec<SoundId> {
        let mut v: Vec<_> = self.started.lock().unwrap().iter().copied().collect();
        v.sort_by_key(|s| s.as_str());
        v
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioBackend for FakeBackend {
    async fn request_engine_ready(&self) -> Result<(), AudioError> {
        if let Some(delay) = self.ready_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.engine_error {
            Some(msg) => {
                self.log("ready-failed".into());
                Err(AudioError::EngineNotReady(msg.clone()))
            }
            None => {
                self.log("ready".into());
                Ok(())
            }
        }
    }

    fn load(&self, sound: SoundId, source: &Path) -> Result<Box<dyn TrackHandle>, AudioError> {
        if self.missing.contains(&sound) {
            return Err(AudioError::LoadFailed {
                path: source.to_path_buf(),
                message: "missing".into(),
            });
        }
        Ok(Box::new(FakeTrack {
            sound,
            started: false,
            backend: self.clone(),
        }))
    }
}

struct FakeTrack {
    sound: SoundId,
    started: bool,
    backend: FakeBackend,
}

impl TrackHandle for FakeTrack {
    fn start(&mut self) -> Result<(), AudioError> {
        self.started = true;
        self.backend.started.lock().unwrap().insert(self.sound);
        self.backend.log(format!("start:{}", self.sound));
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
        self.backend.started.lock().unwrap().remove(&self.sound);
        self.backend.log(format!("stop:{}", self.sound));
    }

    fn is_started(&self) -> bool {
        self.started
    }

    fn set_volume(&mut self, gain: f32) {
        self.backend.log(format!("volume:{gain}"));
    }

    fn set_looping(&mut self, _looping: bool) {}
}
