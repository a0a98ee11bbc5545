use clap::Subcommand;

use super::{open_app, report};

#[derive(Subcommand)]
pub enum MoodAction {
    /// Record how you feel (1 = poor .. 5 = great)
    Log {
        /// Mood score, 1-5
        score: Option<u8>,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
    },
    /// Most recent entries, newest first
    Recent {
        /// Number of entries (defaults to history.recent_moods)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Daily averages for the last N days
    Chart {
        /// Window size in days (defaults to history.chart_days)
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: MoodAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app()?;

    match action {
        MoodAction::Log { score, note } => {
            let result = app.save_mood(score, note);
            report(app.drain_events());
            let entry = result?;
            println!("{} ({})", entry.mood.value(), entry.mood.label());
        }
        MoodAction::Recent { limit, json } => {
            let limit = limit.unwrap_or(app.config().history.recent_moods);
            let entries = app.history().recent_moods(limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No mood entries yet.");
            } else {
                for entry in entries {
                    let note = entry.note.as_deref().unwrap_or("");
                    println!(
                        "{}  {} {:<5} {note}",
                        entry.occurred_at.format("%Y-%m-%d %H:%M"),
                        entry.mood.value(),
                        entry.mood.label()
                    );
                }
            }
        }
        MoodAction::Chart { days, json } => {
            let days = days.unwrap_or(app.config().history.chart_days);
            let series = app.mood_chart(days);
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                for point in &series {
                    match point.average {
                        Some(avg) => println!(
                            "{}  {:<10} {avg:.1}",
                            point.date.format("%a %d"),
                            "#".repeat((avg * 2.0).round() as usize)
                        ),
                        None => println!("{}  {:<10} -", point.date.format("%a %d"), ""),
                    }
                }
                let summary = app.history().mood_summary(days);
                match summary.average {
                    Some(avg) => println!("average {avg:.1} over {} entries", summary.entries),
                    None => println!("no entries in the last {days} days"),
                }
            }
        }
    }
    Ok(())
}
