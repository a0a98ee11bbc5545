//! Mood tracking through the application context with an on-disk store.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use mindwell_core::history::{MoodEntry, MoodScore};
use mindwell_core::storage::{keys, save_json};
use mindwell_core::{AmbientPlayer, AppContext, Config, Database, History, RecordStore};

fn at(day: NaiveDate, hour: u32) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap())
}

#[test]
fn saved_moods_survive_reopen_and_chart_by_day() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindwell.db");

    {
        let mut app = AppContext::new(
            Config::default(),
            Box::new(Database::open_at(&path).unwrap()),
            AmbientPlayer::disabled(),
            None,
        );
        app.save_mood(Some(5), None).unwrap();
        app.save_mood(Some(3), Some("tired".into())).unwrap();
        assert!(app.save_mood(Some(9), None).is_err());
    }

    let app = AppContext::new(
        Config::default(),
        Box::new(Database::open_at(&path).unwrap()),
        AmbientPlayer::disabled(),
        None,
    );
    assert_eq!(app.history().moods().len(), 2);
    let chart = app.default_mood_chart();
    assert_eq!(chart.len(), 7);
    assert_eq!(chart[6].average, Some(4.0));
    assert!(chart[..6].iter().all(|d| d.average.is_none()));

    let recent = app.recent_moods();
    assert_eq!(recent[0].note.as_deref(), Some("tired"));
}

#[test]
fn legacy_records_load_into_history() {
    let db = Database::open_memory().unwrap();
    db.set(
        keys::MOOD_DATA,
        r#"[{"mood":2,"note":"","date":"2024-03-08T09:00:00.000Z","timestamp":1709888400000}]"#,
    )
    .unwrap();
    db.set(keys::MEDITATION_STATS, r#"{"totalSessions":4,"totalMinutes":35}"#)
        .unwrap();

    let history = History::load(&db).unwrap();
    assert_eq!(history.moods()[0].mood.value(), 2);
    assert_eq!(history.stats().total_minutes, 35);
}

#[test]
fn chart_window_matches_daily_means() {
    let db = Database::open_memory().unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let start = today - Duration::days(6);
    let entries = vec![
        MoodEntry::new(MoodScore::new(5).unwrap(), None, at(start, 8)),
        MoodEntry::new(MoodScore::new(3).unwrap(), None, at(start, 21)),
        MoodEntry::new(MoodScore::new(1).unwrap(), None, at(start + Duration::days(2), 12)),
    ];
    save_json(&db, keys::MOOD_DATA, &entries).unwrap();

    let history = History::load(&db).unwrap();
    let averages: Vec<_> = history
        .windowed_average_on(7, today)
        .into_iter()
        .map(|d| d.average)
        .collect();
    assert_eq!(averages, vec![Some(4.0), None, Some(1.0), None, None, None, None]);
}
