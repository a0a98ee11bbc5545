mod backend;
mod library;
mod player;
mod recommend;
#[cfg(test)]
pub(crate) mod testing;

pub use backend::{gain_to_db, AudioBackend, HeadlessBackend, TrackHandle};
pub use library::{SessionMood, SessionType, SoundId, SoundLibrary};
pub use player::{AmbientPlayer, PlayOutcome, DEFAULT_VOLUME};
pub use recommend::RecommendationEngine;
