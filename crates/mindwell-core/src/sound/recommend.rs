//! Sound recommendation.
//!
//! Recommending only changes the *selected* sound. It never starts or
//! interrupts playback; that happens when a session starts or the user
//! picks a sound explicitly.

use chrono::Utc;

use super::library::{SessionMood, SessionType, SoundId, SoundLibrary};
use super::player::AmbientPlayer;
use crate::events::Event;

#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine {
    library: SoundLibrary,
}

impl RecommendationEngine {
    pub fn new(library: SoundLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &SoundLibrary {
        &self.library
    }

    /// Look up the sound for `session_type`/`mood` and select it on the
    /// player. Returns the suggestion together with its event.
    pub fn recommend(
        &self,
        session_type: SessionType,
        mood: SessionMood,
        player: &mut AmbientPlayer,
    ) -> (SoundId, Event) {
        let sound = self.library.recommend(session_type, mood);
        tracing::debug!(%session_type, %mood, %sound, "recommended ambient sound");
        player.select(sound);
        (
            sound,
            Event::SoundRecommended {
                session_type,
                mood,
                sound,
                at: Utc::now(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::testing::FakeBackend;
    use std::path::Path;
    use std::sync::Arc;

    #[tokio::test]
    async fn recommendation_does_not_interrupt_playing_sound() {
        let backend = FakeBackend::new();
        let mut player = AmbientPlayer::new(Some(Arc::new(backend.clone())), 0.5);
        player.load_library(Path::new("audio"));
        player.play(SoundId::Rain).await.unwrap();
        backend.clear();

        let engine = RecommendationEngine::default();
        let (sound, _) = engine.recommend(SessionType::BodyScan, SessionMood::Calm, &mut player);

        assert_eq!(sound, SoundId::Forest);
        assert_eq!(player.active(), SoundId::Forest);
        assert_eq!(player.playing(), Some(SoundId::Rain));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn recommendation_selects_without_engine() {
        let mut player = AmbientPlayer::disabled();
        let engine = RecommendationEngine::default();
        let (sound, event) =
            engine.recommend(SessionType::AnxietyRelief, SessionMood::Tired, &mut player);
        assert_eq!(sound, SoundId::Rain);
        assert_eq!(player.active(), SoundId::Rain);
        assert!(matches!(event, Event::SoundRecommended { sound: SoundId::Rain, .. }));
    }
}
