//! Ambient sound identifiers and the recommendation table.
//!
//! The table is keyed by session type and session mood, each with a
//! `default` fallback. Lookups resolve through at most three steps:
//!
//! ```text
//! (type, mood) -> (type, default) -> (default, default)
//! ```
//!
//! The global `(default, default)` entry is a concrete sound, so every
//! lookup terminates with a real identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// An ambient track, or [`SoundId::Silence`] for "no ambient track".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundId {
    Rain,
    Ocean,
    Forest,
    Stream,
    Silence,
}

impl SoundId {
    /// Every sound backed by an audio file.
    pub const PLAYABLE: [SoundId; 4] = [SoundId::Rain, SoundId::Ocean, SoundId::Forest, SoundId::Stream];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundId::Rain => "rain",
            SoundId::Ocean => "ocean",
            SoundId::Forest => "forest",
            SoundId::Stream => "stream",
            SoundId::Silence => "silence",
        }
    }

    pub fn is_silence(&self) -> bool {
        matches!(self, SoundId::Silence)
    }

    /// Asset file name relative to the configured assets directory.
    pub fn asset_file(&self) -> Option<String> {
        if self.is_silence() {
            None
        } else {
            Some(format!("{}.mp3", self.as_str()))
        }
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoundId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rain" => Ok(SoundId::Rain),
            "ocean" => Ok(SoundId::Ocean),
            "forest" => Ok(SoundId::Forest),
            "stream" => Ok(SoundId::Stream),
            "silence" | "none" => Ok(SoundId::Silence),
            other => Err(ValidationError::InvalidValue {
                field: "sound".into(),
                message: format!("unknown sound '{other}'"),
            }),
        }
    }
}

/// Meditation technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    Breathing,
    BodyScan,
    LovingKindness,
    AnxietyRelief,
}

impl SessionType {
    pub const ALL: [SessionType; 4] = [
        SessionType::Breathing,
        SessionType::BodyScan,
        SessionType::LovingKindness,
        SessionType::AnxietyRelief,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Breathing => "breathing",
            SessionType::BodyScan => "body-scan",
            SessionType::LovingKindness => "loving-kindness",
            SessionType::AnxietyRelief => "anxiety-relief",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SessionType::Breathing => "Mindful Breathing",
            SessionType::BodyScan => "Body Scan",
            SessionType::LovingKindness => "Loving Kindness",
            SessionType::AnxietyRelief => "Anxiety Relief",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SessionType::Breathing => "Focus on your breath and find inner calm",
            SessionType::BodyScan => "Progressive relaxation from head to toe",
            SessionType::LovingKindness => "Cultivate compassion and love",
            SessionType::AnxietyRelief => "Calm your worried mind",
        }
    }
}

impl Default for SessionType {
    fn default() -> Self {
        SessionType::Breathing
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        SessionType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "session_type".into(),
                message: format!("unknown session type '{s}'"),
            })
    }
}

/// Self-reported state used for sound recommendation. Distinct from the
/// 1-5 mood-tracking score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMood {
    Calm,
    Anxious,
    Tired,
    Restless,
}

impl SessionMood {
    pub const ALL: [SessionMood; 4] = [
        SessionMood::Calm,
        SessionMood::Anxious,
        SessionMood::Tired,
        SessionMood::Restless,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMood::Calm => "calm",
            SessionMood::Anxious => "anxious",
            SessionMood::Tired => "tired",
            SessionMood::Restless => "restless",
        }
    }
}

impl Default for SessionMood {
    fn default() -> Self {
        SessionMood::Calm
    }
}

impl fmt::Display for SessionMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        SessionMood::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "mood".into(),
                message: format!("unknown mood '{s}'"),
            })
    }
}

/// One row of the table. `None` keys are the `default` row/column.
struct Row {
    session_type: Option<SessionType>,
    entries: &'static [(Option<SessionMood>, SoundId)],
}

use SessionMood::{Anxious, Calm, Restless, Tired};
use SoundId::{Forest, Ocean, Rain, Silence, Stream};

const BUILTIN: &[Row] = &[
    Row {
        session_type: Some(SessionType::Breathing),
        entries: &[
            (Some(Calm), Stream),
            (Some(Anxious), Ocean),
            (Some(Tired), Silence),
            (Some(Restless), Rain),
            (None, Stream),
        ],
    },
    Row {
        session_type: Some(SessionType::BodyScan),
        entries: &[
            (Some(Calm), Forest),
            (Some(Anxious), Rain),
            (Some(Tired), Stream),
            (Some(Restless), Ocean),
            (None, Forest),
        ],
    },
    Row {
        session_type: Some(SessionType::LovingKindness),
        entries: &[
            (Some(Calm), Stream),
            (Some(Anxious), Forest),
            (Some(Tired), Silence),
            (Some(Restless), Stream),
            (None, Stream),
        ],
    },
    Row {
        session_type: Some(SessionType::AnxietyRelief),
        entries: &[
            (Some(Calm), Ocean),
            (Some(Anxious), Ocean),
            (Some(Tired), Rain),
            (Some(Restless), Rain),
            (None, Ocean),
        ],
    },
    Row {
        session_type: None,
        entries: &[
            (Some(Calm), Stream),
            (Some(Anxious), Ocean),
            (Some(Tired), Silence),
            (Some(Restless), Rain),
            (None, Silence),
        ],
    },
];

/// Terminal fallback when even the `default` row lacks a `default` column.
const GLOBAL_DEFAULT: SoundId = SoundId::Silence;

/// Immutable (session type x mood) -> sound table.
#[derive(Clone, Copy)]
pub struct SoundLibrary {
    rows: &'static [Row],
}

impl fmt::Debug for SoundLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundLibrary").field("rows", &self.rows.len()).finish()
    }
}

impl Default for SoundLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SoundLibrary {
    pub fn builtin() -> Self {
        Self { rows: BUILTIN }
    }

    /// Recommend a sound for a known type and mood.
    pub fn recommend(&self, session_type: SessionType, mood: SessionMood) -> SoundId {
        self.resolve(Some(session_type), Some(mood))
    }

    /// Recommend from raw selector values. Unrecognised strings fall back
    /// to the `default` row or column instead of failing.
    pub fn recommend_raw(&self, session_type: &str, mood: &str) -> SoundId {
        self.resolve(session_type.parse().ok(), mood.parse().ok())
    }

    fn resolve(&self, session_type: Option<SessionType>, mood: Option<SessionMood>) -> SoundId {
        let row = self
            .row(session_type)
            .or_else(|| self.row(None));
        let Some(row) = row else {
            return GLOBAL_DEFAULT;
        };

        let exact = mood.and_then(|m| Self::column(row, Some(m)));
        exact
            .or_else(|| Self::column(row, None))
            .or_else(|| self.row(None).and_then(|r| Self::column(r, None)))
            .unwrap_or(GLOBAL_DEFAULT)
    }

    fn row(&self, session_type: Option<SessionType>) -> Option<&'static Row> {
        self.rows.iter().find(|r| r.session_type == session_type)
    }

    fn column(row: &Row, mood: Option<SessionMood>) -> Option<SoundId> {
        row.entries
            .iter()
            .find(|(m, _)| *m == mood)
            .map(|(_, sound)| *sound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_entries_resolve() {
        let lib = SoundLibrary::builtin();
        assert_eq!(lib.recommend(SessionType::Breathing, SessionMood::Calm), SoundId::Stream);
        assert_eq!(lib.recommend(SessionType::BodyScan, SessionMood::Restless), SoundId::Ocean);
        assert_eq!(lib.recommend(SessionType::LovingKindness, SessionMood::Anxious), SoundId::Forest);
        assert_eq!(lib.recommend(SessionType::AnxietyRelief, SessionMood::Tired), SoundId::Rain);
    }

    #[test]
    fn unknown_mood_uses_type_default() {
        let lib = SoundLibrary::builtin();
        assert_eq!(lib.recommend_raw("body-scan", "ecstatic"), SoundId::Forest);
        assert_eq!(lib.recommend_raw("anxiety-relief", ""), SoundId::Ocean);
    }

    #[test]
    fn unknown_type_uses_default_row() {
        let lib = SoundLibrary::builtin();
        assert_eq!(lib.recommend_raw("yoga", "anxious"), SoundId::Ocean);
        assert_eq!(lib.recommend_raw("yoga", "restless"), SoundId::Rain);
    }

    #[test]
    fn unknown_everything_is_global_default() {
        let lib = SoundLibrary::builtin();
        assert_eq!(lib.recommend_raw("yoga", "ecstatic"), SoundId::Silence);
    }

    #[test]
    fn every_known_pair_has_an_exact_entry() {
        let lib = SoundLibrary::builtin();
        for t in SessionType::ALL {
            let row = lib.row(Some(t)).unwrap();
            for m in SessionMood::ALL {
                assert!(SoundLibrary::column(row, Some(m)).is_some(), "{t}/{m} missing");
            }
        }
    }

    #[test]
    fn parse_accepts_display_forms() {
        assert_eq!("body-scan".parse::<SessionType>().unwrap(), SessionType::BodyScan);
        assert_eq!("Loving_Kindness".parse::<SessionType>().unwrap(), SessionType::LovingKindness);
        assert_eq!("RESTLESS".parse::<SessionMood>().unwrap(), SessionMood::Restless);
        assert_eq!("none".parse::<SoundId>().unwrap(), SoundId::Silence);
        assert!("thunder".parse::<SoundId>().is_err());
    }

    #[test]
    fn serde_uses_kebab_and_lowercase() {
        assert_eq!(serde_json::to_string(&SessionType::AnxietyRelief).unwrap(), "\"anxiety-relief\"");
        assert_eq!(serde_json::to_string(&SoundId::Stream).unwrap(), "\"stream\"");
    }

    #[test]
    fn silence_has_no_asset() {
        assert_eq!(SoundId::Silence.asset_file(), None);
        assert_eq!(SoundId::Rain.asset_file().as_deref(), Some("rain.mp3"));
    }

    proptest! {
        #[test]
        fn recommend_raw_is_total(t in ".{0,20}", m in ".{0,20}") {
            let lib = SoundLibrary::builtin();
            let sound = lib.recommend_raw(&t, &m);
            prop_assert!(!sound.as_str().is_empty());
        }
    }
}
