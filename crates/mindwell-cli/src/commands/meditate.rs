use clap::Subcommand;
use mindwell_core::{MeditationRecord, SessionMood, SessionType, SoundId, SoundLibrary};

use super::{open_app, report};

#[derive(Subcommand)]
pub enum MeditateAction {
    /// Run a meditation session in the foreground (Ctrl-C cancels)
    Start {
        /// Length in minutes (defaults to meditation.default_minutes)
        #[arg(long)]
        minutes: Option<u64>,
        /// breathing, body-scan, loving-kindness or anxiety-relief
        #[arg(long = "type")]
        session_type: Option<SessionType>,
        /// calm, anxious, tired or restless
        #[arg(long)]
        mood: Option<SessionMood>,
        /// Override the recommended sound
        #[arg(long)]
        sound: Option<SoundId>,
        /// Print the completed record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the recommended sound for a session type and mood
    Recommend {
        #[arg(long = "type", default_value = "default")]
        session_type: String,
        #[arg(long, default_value = "default")]
        mood: String,
    },
    /// List completed sessions, newest first
    History {
        /// Number of sessions (defaults to history.recent_sessions)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Total sessions and minutes
    Stats {
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: MeditateAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MeditateAction::Start {
            minutes,
            session_type,
            mood,
            sound,
            json,
        } => start(minutes, session_type, mood, sound, json).await,
        MeditateAction::Recommend { session_type, mood } => {
            let sound = SoundLibrary::builtin().recommend_raw(&session_type, &mood);
            println!("{sound}");
            Ok(())
        }
        MeditateAction::History { limit, json } => {
            let app = open_app()?;
            let limit = limit.unwrap_or(app.config().history.recent_sessions);
            let sessions = app.history().recent_sessions(limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("No meditation sessions yet.");
            } else {
                for record in sessions {
                    print_record(record);
                }
            }
            Ok(())
        }
        MeditateAction::Stats { json } => {
            let app = open_app()?;
            let stats = app.history().stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Sessions: {}", stats.total_sessions);
                println!("Minutes:  {}", stats.total_minutes);
            }
            Ok(())
        }
    }
}

async fn start(
    minutes: Option<u64>,
    session_type: Option<SessionType>,
    mood: Option<SessionMood>,
    sound: Option<SoundId>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app()?;

    if let Some(minutes) = minutes {
        app.set_duration_minutes(minutes)?;
    }
    if let Some(session_type) = session_type {
        app.set_session_type(session_type);
    }
    if let Some(mood) = mood {
        app.set_mood(mood);
    }
    if let Some(sound) = sound {
        if let Err(e) = app.choose_sound(sound).await {
            tracing::debug!(sound = %sound, error = %e, "sound pick failed");
        }
    }

    app.toggle_session().await;
    report(app.drain_events());

    let current = *app.runner().session().current();
    eprintln!(
        "{} ({}), {} min, sound: {}",
        current.session_type.title(),
        current.mood,
        current.duration_secs / 60,
        app.runner().player().active()
    );

    let record = loop {
        tokio::select! {
            tick = app.next_tick() => {
                let Some(tick) = tick else {
                    return Err("countdown stopped unexpectedly".into());
                };
                if let Some(record) = app.on_tick(tick) {
                    break record;
                }
                let remaining = app.runner().session().remaining_secs();
                if remaining % 60 == 0 {
                    eprintln!("{} remaining", app.runner().session().remaining_display());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                app.cancel_session();
                report(app.drain_events());
                eprintln!("Session cancelled.");
                return Ok(());
            }
        }
    };

    report(app.drain_events());
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}

fn print_record(record: &MeditationRecord) {
    println!(
        "{}  {:<16} {:>3} min  {:<8} {}",
        record.occurred_at.format("%Y-%m-%d %H:%M"),
        record.session_type.title(),
        record.minutes,
        record.mood,
        record.sound
    );
}
