//! Mood-tracking entries and the daily-average chart series.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A 1-5 self-rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MoodScore(u8);

impl MoodScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::MoodOutOfRange(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Poor",
            2 => "Low",
            3 => "Okay",
            4 => "Good",
            _ => "Great",
        }
    }
}

impl TryFrom<u8> for MoodScore {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MoodScore> for u8 {
    fn from(score: MoodScore) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood: MoodScore,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    /// Epoch milliseconds of `occurred_at`.
    #[serde(default)]
    pub timestamp: i64,
}

impl MoodEntry {
    pub fn new(mood: MoodScore, note: Option<String>, occurred_at: DateTime<Utc>) -> Self {
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Self {
            mood,
            note,
            occurred_at,
            timestamp: occurred_at.timestamp_millis(),
        }
    }

    pub fn now(mood: MoodScore, note: Option<String>) -> Self {
        Self::new(mood, note, Utc::now())
    }

    pub fn day(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}

/// One point of the chart series. `average` is `None` for days without
/// entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    /// Total entries ever recorded.
    pub entries: usize,
    /// Mean of the daily averages that have data, if any.
    pub average: Option<f64>,
}

/// Longest chart window, in days.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Mean mood per calendar day (UTC) for the `days` days ending at `today`,
/// oldest first. `days` is capped at [`MAX_WINDOW_DAYS`].
pub fn windowed_average<'a>(
    entries: impl IntoIterator<Item = &'a MoodEntry>,
    days: u32,
    today: NaiveDate,
) -> Vec<DailyAverage> {
    let days = days.min(MAX_WINDOW_DAYS);
    if days == 0 {
        return Vec::new();
    }
    let Some(first) = today.checked_sub_days(Days::new(u64::from(days - 1))) else {
        return Vec::new();
    };

    let mut buckets: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for entry in entries {
        let day = entry.day();
        if day < first || day > today {
            continue;
        }
        let bucket = buckets.entry(day).or_default();
        bucket.0 += u32::from(entry.mood.value());
        bucket.1 += 1;
    }

    first
        .iter_days()
        .take(days as usize)
        .map(|date| DailyAverage {
            date,
            average: buckets
                .get(&date)
                .map(|(sum, count)| f64::from(*sum) / f64::from(*count)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(mood: u8, date: NaiveDate, hour: u32) -> MoodEntry {
        let at = Utc
            .from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap());
        MoodEntry::new(MoodScore::new(mood).unwrap(), None, at)
    }

    #[test]
    fn score_range_is_enforced() {
        assert!(MoodScore::new(0).is_err());
        assert!(MoodScore::new(6).is_err());
        assert_eq!(MoodScore::new(5).unwrap().label(), "Great");
        assert!(serde_json::from_str::<MoodScore>("9").is_err());
    }

    #[test]
    fn window_example_from_product_chart() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let day0 = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let entries = vec![entry(5, day0, 9), entry(3, day0, 20), entry(1, day2, 12)];

        let series = windowed_average(&entries, 7, today);
        let averages: Vec<_> = series.iter().map(|d| d.average).collect();
        assert_eq!(
            averages,
            vec![Some(4.0), None, Some(1.0), None, None, None, None]
        );
        assert_eq!(series[0].date, day0);
        assert_eq!(series[6].date, today);
    }

    #[test]
    fn entries_outside_window_are_ignored() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let old = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let future = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let entries = vec![entry(5, old, 8), entry(2, future, 8), entry(3, today, 8)];

        let series = windowed_average(&entries, 7, today);
        assert_eq!(series.iter().filter(|d| d.average.is_some()).count(), 1);
        assert_eq!(series[6].average, Some(3.0));
    }

    #[test]
    fn zero_day_window_is_empty() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(windowed_average(&Vec::<MoodEntry>::new(), 0, today).is_empty());
    }

    #[test]
    fn blank_notes_are_dropped() {
        let e = MoodEntry::now(MoodScore::new(3).unwrap(), Some("   ".into()));
        assert_eq!(e.note, None);
    }

    #[test]
    fn parses_legacy_record_shape() {
        let json = r#"{"mood":4,"note":"walked","date":"2024-03-10T08:30:00.000Z","timestamp":1710059400000}"#;
        let e: MoodEntry = serde_json::from_str(json).unwrap();
        assert_eq!(e.mood.value(), 4);
        assert_eq!(e.note.as_deref(), Some("walked"));
        assert_eq!(e.timestamp, 1710059400000);
    }

    #[test]
    fn oversized_window_is_capped_and_ends_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let none: Vec<MoodEntry> = Vec::new();
        let series = windowed_average(&none, u32::MAX, today);
        assert_eq!(series.len(), MAX_WINDOW_DAYS as usize);
        assert_eq!(series.last().map(|d| d.date), Some(today));
        assert!(windowed_average(&none, 2, NaiveDate::MIN).is_empty());
    }
}
