//! End-to-end meditation flow over the headless audio backend and an
//! on-disk record store.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use mindwell_core::meditation::ToggleOutcome;
use mindwell_core::sound::{HeadlessBackend, PlayOutcome};
use mindwell_core::storage::keys;
use mindwell_core::{
    AmbientPlayer, AppContext, Config, Database, History, RecordStore, SessionMood,
    SessionState, SessionType, SoundId,
};

fn write_assets(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    for sound in SoundId::PLAYABLE {
        fs::write(dir.join(sound.asset_file().unwrap()), b"ID3").unwrap();
    }
}

fn headless_player(assets: &Path) -> (AmbientPlayer, HeadlessBackend) {
    let backend = HeadlessBackend::new();
    let mut player = AmbientPlayer::new(Some(Arc::new(backend.clone())), 0.5);
    assert!(player.load_library(assets).is_empty());
    (player, backend)
}

#[tokio::test(start_paused = true)]
async fn anxiety_relief_tired_session_plays_rain_and_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let assets = dir.path().join("audio");
    write_assets(&assets);
    let db_path = dir.path().join("mindwell.db");

    let (player, backend) = headless_player(&assets);
    let store = Database::open_at(&db_path).unwrap();
    let mut app = AppContext::new(Config::default(), Box::new(store), player, None);

    assert_eq!(app.set_session_type(SessionType::AnxietyRelief), SoundId::Ocean);
    assert_eq!(app.set_mood(SessionMood::Tired), SoundId::Rain);
    assert!(backend.started().is_empty());

    app.set_duration_minutes(1).unwrap();
    match app.toggle_session().await {
        ToggleOutcome::Started(report) => {
            assert_eq!(report.playback, Some(Ok(PlayOutcome::Started)));
        }
        other => panic!("expected start, got {other:?}"),
    }
    assert_eq!(backend.started(), vec![SoundId::Rain]);

    let record = loop {
        let tick = app.next_tick().await.unwrap();
        if let Some(record) = app.on_tick(tick) {
            break record;
        }
    };

    assert_eq!(record.session_type, SessionType::AnxietyRelief);
    assert_eq!(record.mood, SessionMood::Tired);
    assert_eq!(record.sound, SoundId::Rain);
    assert_eq!(record.minutes, 1);
    assert_eq!(app.session_state(), SessionState::Idle);
    assert!(backend.started().is_empty());
    drop(app);

    let reopened = Database::open_at(&db_path).unwrap();
    let history = History::load(&reopened).unwrap();
    assert_eq!(history.stats().total_sessions, 1);
    assert_eq!(history.stats().total_minutes, 1);
    assert_eq!(history.sessions().len(), 1);
    let raw = reopened.get(keys::MEDITATION_HISTORY).unwrap().unwrap();
    assert!(raw.contains(r#""type":"anxiety-relief""#));
}

#[tokio::test(start_paused = true)]
async fn pause_and_resume_keep_remaining_time() {
    let dir = tempfile::tempdir().unwrap();
    let assets = dir.path().join("audio");
    write_assets(&assets);
    let (player, backend) = headless_player(&assets);
    let mut app = AppContext::new(
        Config::default(),
        Box::new(Database::open_memory().unwrap()),
        player,
        None,
    );

    app.toggle_session().await;
    for _ in 0..10 {
        let tick = app.next_tick().await.unwrap();
        assert!(app.on_tick(tick).is_none());
    }
    assert_eq!(app.toggle_session().await, ToggleOutcome::Paused);
    assert!(backend.started().is_empty());
    let remaining = app.runner().session().remaining_secs();
    assert_eq!(remaining, 290);

    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    app.toggle_session().await;
    assert_eq!(app.runner().session().remaining_secs(), remaining);
    assert_eq!(backend.started(), vec![SoundId::Stream]);
}

#[tokio::test(start_paused = true)]
async fn cancelled_session_leaves_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let (player, _backend) = headless_player(&{
        let assets = dir.path().join("audio");
        write_assets(&assets);
        assets
    });
    let mut app = AppContext::new(
        Config::default(),
        Box::new(Database::open_memory().unwrap()),
        player,
        None,
    );

    app.toggle_session().await;
    let tick = app.next_tick().await.unwrap();
    app.on_tick(tick);
    assert!(app.cancel_session());
    assert!(app.history().sessions().is_empty());
    assert_eq!(app.history().stats().total_sessions, 0);
    assert!(app.store().get(keys::MEDITATION_STATS).unwrap().is_none());
}
