pub mod auth;
pub mod chat;
pub mod config;
pub mod meditate;
pub mod mood;
pub mod plan;
pub mod tip;

use mindwell_core::{AppContext, Config, Event, NotificationLevel};

/// Open the application context with the on-disk configuration.
pub fn open_app() -> Result<AppContext, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    Ok(AppContext::open(config)?)
}

/// Print pending notifications to stderr. Other events are only logged.
pub fn report(events: Vec<Event>) {
    for event in events {
        match event {
            Event::Notification { level, message, .. } => {
                let tag = match level {
                    NotificationLevel::Info => "info",
                    NotificationLevel::Success => "ok",
                    NotificationLevel::Warning => "warning",
                    NotificationLevel::Error => "error",
                };
                eprintln!("[{tag}] {message}");
            }
            other => tracing::debug!(event = ?other, "event"),
        }
    }
}
