//! Daily reading progress: words read today against a configurable goal.
//!
//! The counter belongs to the local calendar day. Any operation that notices
//! the day has changed resets the record before accumulating, so a stale
//! value from yesterday never leaks into today's total.

use crate::storage::{self, KeyValueStore};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of words to read per day.
pub const DEFAULT_DAILY_GOAL: u64 = 1000;

/// Wall-clock source, injectable so tests can pin and roll the day.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    /// Local calendar day; daily totals reset when this changes.
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Persisted record: how many words were read on which day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub words_read: u64,
}

/// Tracks words read today, persisting after every change.
pub struct ReadingProgress {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    goal: u64,
    current: DailyProgress,
}

impl ReadingProgress {
    /// Load today's progress from the store. A record from an earlier day,
    /// a missing record, or an unreadable one all start today at zero.
    pub fn load(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>, goal: u64) -> Self {
        let today = clock.today();
        let current = store
            .get(storage::keys::READING_PROGRESS)
            .and_then(|raw| serde_json::from_str::<DailyProgress>(&raw).ok())
            .filter(|record| record.date == today)
            .unwrap_or(DailyProgress {
                date: today,
                words_read: 0,
            });
        Self {
            store,
            clock,
            goal,
            current,
        }
    }

    /// Add words read to today's total, rolling the record over first if the
    /// local day has changed since the last update.
    pub fn add_words(&mut self, count: u64) {
        let today = self.clock.today();
        if self.current.date != today {
            debug!(%today, carried = self.current.words_read, "new day, resetting counter");
            self.current = DailyProgress {
                date: today,
                words_read: 0,
            };
        }
        self.current.words_read += count;
        self.persist();
    }

    pub fn words_read(&self) -> u64 {
        self.current.words_read
    }

    pub fn goal(&self) -> u64 {
        self.goal
    }

    /// Percent of the daily goal reached, capped at 100.
    pub fn percentage(&self) -> f32 {
        let pct = self.current.words_read as f32 / self.goal as f32 * 100.0;
        pct.min(100.0)
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.current) {
            Ok(json) => self.store.set(storage::keys::READING_PROGRESS, &json),
            Err(err) => debug!(%err, "progress record did not serialize"),
        }
    }
}

/// Pinned, manually-rolled clock for tests. Clones share the same day, so a
/// handle kept by the test steers clocks already moved into trackers.
#[cfg(test)]
#[derive(Clone)]
pub struct FakeClock {
    day: std::rc::Rc<std::cell::Cell<NaiveDate>>,
}

#[cfg(test)]
impl FakeClock {
    pub fn starting_at(date: NaiveDate) -> Self {
        Self {
            day: std::rc::Rc::new(std::cell::Cell::new(date)),
        }
    }

    pub fn advance_one_day(&self) {
        self.day.set(self.day.get().succ_opt().unwrap());
    }
}

#[cfg(test)]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.today().and_hms_opt(12, 0, 0).unwrap().and_utc()
    }

    fn today(&self) -> NaiveDate {
        self.day.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn tracker(clock: &FakeClock, goal: u64) -> ReadingProgress {
        ReadingProgress::load(Box::new(MemoryStore::new()), Box::new(clock.clone()), goal)
    }

    #[test]
    fn words_accumulate_within_a_single_day() {
        let clock = FakeClock::starting_at(day("2026-08-22"));
        let mut progress = tracker(&clock, 1000);

        progress.add_words(120);
        progress.add_words(80);

        assert_eq!(progress.words_read(), 200);
        assert!((progress.percentage() - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn counter_resets_when_the_day_rolls_over() {
        let clock = FakeClock::starting_at(day("2026-08-22"));
        let mut progress = tracker(&clock, 1000);

        progress.add_words(120);
        clock.advance_one_day();
        progress.add_words(30);

        assert_eq!(progress.words_read(), 30);
    }

    #[test]
    fn percentage_is_capped_at_one_hundred() {
        let clock = FakeClock::starting_at(day("2026-08-22"));
        let mut progress = tracker(&clock, 100);

        progress.add_words(250);

        assert!((progress.percentage() - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn same_day_record_survives_a_reload() {
        let clock = FakeClock::starting_at(day("2026-08-22"));
        let store = MemoryStore::new();
        let mut progress = ReadingProgress::load(
            Box::new(store.clone()),
            Box::new(clock.clone()),
            1000,
        );
        progress.add_words(42);
        drop(progress);

        let reloaded =
            ReadingProgress::load(Box::new(store), Box::new(clock.clone()), 1000);
        assert_eq!(reloaded.words_read(), 42);
    }

    #[test]
    fn stale_record_reads_as_zero_for_today() {
        let clock = FakeClock::starting_at(day("2026-08-22"));
        let mut store = MemoryStore::new();
        let yesterday = DailyProgress {
            date: day("2026-08-21"),
            words_read: 500,
        };
        store.set(
            storage::keys::READING_PROGRESS,
            &serde_json::to_string(&yesterday).unwrap(),
        );

        let progress = ReadingProgress::load(Box::new(store), Box::new(clock.clone()), 1000);
        assert_eq!(progress.words_read(), 0);
    }

    #[test]
    fn unreadable_record_starts_from_zero() {
        let clock = FakeClock::starting_at(day("2026-08-22"));
        let mut store = MemoryStore::new();
        store.set(storage::keys::READING_PROGRESS, "not json");

        let progress = ReadingProgress::load(Box::new(store), Box::new(clock.clone()), 1000);
        assert_eq!(progress.words_read(), 0);
    }
}
