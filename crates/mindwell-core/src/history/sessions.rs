use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meditation::CompletedSession;
use crate::sound::{SessionMood, SessionType, SoundId};

/// A completed meditation. Created once per completion, never on pause or
/// cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationRecord {
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub minutes: u64,
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    // Records written before mood/sound were tracked lack these keys.
    #[serde(default)]
    pub mood: SessionMood,
    #[serde(default = "silence")]
    pub sound: SoundId,
}

fn silence() -> SoundId {
    SoundId::Silence
}

impl MeditationRecord {
    /// Build the record for a finished countdown with the sound that was
    /// active when it finished.
    pub fn from_completion(done: &CompletedSession, sound: SoundId, at: DateTime<Utc>) -> Self {
        Self {
            session_type: done.config.session_type,
            minutes: done.minutes,
            occurred_at: at,
            mood: done.config.mood,
            sound,
        }
    }
}

/// Running totals. Only ever grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeditationStats {
    pub total_sessions: u64,
    pub total_minutes: u64,
}

impl MeditationStats {
    pub fn credit(&mut self, record: &MeditationRecord) {
        self.total_sessions += 1;
        self.total_minutes += record.minutes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_use_camel_case_keys() {
        let stats = MeditationStats {
            total_sessions: 2,
            total_minutes: 15,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["totalSessions"], 2);
        assert_eq!(json["totalMinutes"], 15);
    }

    #[test]
    fn legacy_record_without_mood_or_sound_loads() {
        let json = r#"{"type":"body-scan","minutes":10,"date":"2024-02-01T07:00:00Z"}"#;
        let record: MeditationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.session_type, SessionType::BodyScan);
        assert_eq!(record.mood, SessionMood::Calm);
        assert_eq!(record.sound, SoundId::Silence);
    }
}
