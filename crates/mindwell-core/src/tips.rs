//! Tip of the day.
//!
//! One tip is drawn at random per calendar day and cached in the record
//! store together with the date it was drawn, so every view on the same
//! day shows the same tip.

use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::CoreError;
use crate::storage::{keys, RecordStore};

pub const TIPS: [&str; 10] = [
    "Take three deep breaths and remind yourself that you are doing your best today.",
    "Practice gratitude by writing down three things you're thankful for.",
    "Take a 5-minute walk outside to connect with nature and clear your mind.",
    "Reach out to someone you care about and let them know you're thinking of them.",
    "Set boundaries today - it's okay to say no to protect your mental health.",
    "Practice self-compassion by speaking to yourself as you would to a good friend.",
    "Take breaks throughout your day, even if they're just a few minutes long.",
    "Stay hydrated and nourish your body with foods that make you feel good.",
    "Listen to music that uplifts your mood or brings you peace.",
    "Remember: progress, not perfection. Every small step forward matters.",
];

/// Today's tip, drawing and caching a new one on the first call of the day.
pub fn daily_tip(store: &dyn RecordStore) -> Result<String, CoreError> {
    daily_tip_on(store, Utc::now().date_naive(), &mut rand::thread_rng())
}

pub fn daily_tip_on<R: Rng + ?Sized>(
    store: &dyn RecordStore,
    today: NaiveDate,
    rng: &mut R,
) -> Result<String, CoreError> {
    let stamp = today.to_string();
    let cached_day = store.get(keys::DAILY_TIP_DATE)?;

    if cached_day.as_deref() == Some(stamp.as_str()) {
        if let Some(tip) = store.get(keys::DAILY_TIP)?.filter(|t| !t.is_empty()) {
            return Ok(tip);
        }
    }

    let tip = TIPS.choose(rng).copied().unwrap_or(TIPS[0]);
    store.set(keys::DAILY_TIP, tip)?;
    store.set(keys::DAILY_TIP_DATE, &stamp)?;
    tracing::debug!(day = %stamp, "drew new daily tip");
    Ok(tip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn same_day_returns_cached_tip() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        let first = daily_tip_on(&store, day(10), &mut rng).unwrap();
        for _ in 0..5 {
            assert_eq!(daily_tip_on(&store, day(10), &mut rng).unwrap(), first);
        }
        assert!(TIPS.contains(&first.as_str()));
    }

    #[test]
    fn new_day_redraws_and_restamps() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        daily_tip_on(&store, day(10), &mut rng).unwrap();
        daily_tip_on(&store, day(11), &mut rng).unwrap();
        assert_eq!(
            store.get(keys::DAILY_TIP_DATE).unwrap().as_deref(),
            Some("2024-03-11")
        );
    }

    #[test]
    fn cached_tip_is_reused_verbatim() {
        let store = MemoryStore::new();
        store.set(keys::DAILY_TIP, "Drink some water.").unwrap();
        store.set(keys::DAILY_TIP_DATE, "2024-03-10").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            daily_tip_on(&store, day(10), &mut rng).unwrap(),
            "Drink some water."
        );
    }
}
