//! Daily review counters and streaks.
//!
//! One counter per local calendar day, keyed "YYYY-MM-DD". Counters are
//! created lazily by the first rating of the day; the streak is fixed at
//! creation (yesterday's streak + 1, else 1) and never recomputed.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use leetrecall_algo::Grade;

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::storage::{KvStore, REVIEW_DAYS_RECORD};

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Count per grade. All four keys are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCounts {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

impl GradeCounts {
    fn bump(&mut self, grade: Grade) {
        match grade {
            Grade::Again => self.again += 1,
            Grade::Hard => self.hard += 1,
            Grade::Good => self.good += 1,
            Grade::Easy => self.easy += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.again + self.hard + self.good + self.easy
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: String,
    /// Always equals `new_cards + reviewed_cards`.
    pub total_reviews: u32,
    /// Ratings where the card had reps == 0 before the rating.
    pub new_cards: u32,
    pub reviewed_cards: u32,
    pub grades: GradeCounts,
    /// Consecutive review days ending on this date. 0 only in gap-filler
    /// placeholders.
    pub streak: u32,
}

impl DailyStats {
    pub fn empty(date: String, streak: u32) -> Self {
        Self {
            date,
            total_reviews: 0,
            new_cards: 0,
            reviewed_cards: 0,
            grades: GradeCounts::default(),
            streak,
        }
    }
}

pub struct StatsStore {
    storage: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl StatsStore {
    pub fn new(storage: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    async fn load(&self) -> CoreResult<BTreeMap<String, DailyStats>> {
        match self.storage.read_record(REVIEW_DAYS_RECORD).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| CoreError::Corrupt {
                record: REVIEW_DAYS_RECORD.to_string(),
                source: e,
            }),
            None => Ok(BTreeMap::new()),
        }
    }

    async fn save(&self, days: &BTreeMap<String, DailyStats>) -> CoreResult<()> {
        self.storage
            .write_record(REVIEW_DAYS_RECORD, serde_json::to_value(days)?)
            .await
    }

    pub async fn get_today(&self) -> CoreResult<Option<DailyStats>> {
        let key = day_key(self.clock.local_date(self.clock.now()));
        self.get_for_date(&key).await
    }

    pub async fn get_for_date(&self, date_key: &str) -> CoreResult<Option<DailyStats>> {
        Ok(self.load().await?.get(date_key).cloned())
    }

    /// The sole mutator. Called exactly once per rating event, after the card
    /// write, with the same `now`. The caller decides `is_new_card` from the
    /// card's reps before the rating.
    pub async fn record_review(
        &self,
        grade: Grade,
        is_new_card: bool,
        now: DateTime<Utc>,
    ) -> CoreResult<DailyStats> {
        let mut days = self.load().await?;
        let today = self.clock.local_date(now);
        let key = day_key(today);

        let mut entry = match days.remove(&key) {
            Some(existing) => existing,
            None => {
                let streak = today
                    .pred_opt()
                    .and_then(|yesterday| days.get(&day_key(yesterday)))
                    .map(|d| d.streak + 1)
                    .unwrap_or(1);
                debug!(date = %key, streak, "first review of the day");
                DailyStats::empty(key.clone(), streak)
            }
        };

        entry.total_reviews += 1;
        entry.grades.bump(grade);
        if is_new_card {
            entry.new_cards += 1;
        } else {
            entry.reviewed_cards += 1;
        }

        days.insert(key, entry.clone());
        self.save(&days).await?;
        Ok(entry)
    }

    /// Chronological window ending today; days without reviews come back as
    /// zeroed placeholders so chart consumers get a dense series.
    pub async fn last_n_days(&self, n: u32, now: DateTime<Utc>) -> CoreResult<Vec<DailyStats>> {
        let days = self.load().await?;
        let today = self.clock.local_date(now);
        let mut out = Vec::with_capacity(n as usize);
        for back in (0..n).rev() {
            let date = today - Days::new(back as u64);
            let key = day_key(date);
            out.push(
                days.get(&key)
                    .cloned()
                    .unwrap_or_else(|| DailyStats::empty(key, 0)),
            );
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;

    fn noon(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap()
    }

    fn store_at(now: DateTime<Utc>) -> (StatsStore, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::utc(now));
        (
            StatsStore::new(Arc::new(MemoryStore::new()), clock.clone()),
            clock,
        )
    }

    #[tokio::test]
    async fn counter_is_created_lazily() {
        let (stats, _clock) = store_at(noon(2));
        assert!(stats.get_today().await.unwrap().is_none());
        stats.record_review(Grade::Good, true, noon(2)).await.unwrap();
        let today = stats.get_today().await.unwrap().unwrap();
        assert_eq!(today.date, "2025-06-02");
        assert_eq!(today.total_reviews, 1);
        assert_eq!(today.new_cards, 1);
        assert_eq!(today.streak, 1);
    }

    #[tokio::test]
    async fn contiguous_days_extend_the_streak() {
        let (stats, clock) = store_at(noon(2));
        stats.record_review(Grade::Good, true, clock.now()).await.unwrap();
        clock.advance(Duration::days(1));
        stats.record_review(Grade::Hard, false, clock.now()).await.unwrap();
        let today = stats.get_today().await.unwrap().unwrap();
        assert_eq!(today.streak, 2);
    }

    #[tokio::test]
    async fn a_gap_day_resets_the_streak() {
        let (stats, clock) = store_at(noon(2));
        stats.record_review(Grade::Good, true, clock.now()).await.unwrap();
        clock.advance(Duration::days(2));
        stats.record_review(Grade::Good, false, clock.now()).await.unwrap();
        let today = stats.get_today().await.unwrap().unwrap();
        assert_eq!(today.date, "2025-06-04");
        assert_eq!(today.streak, 1);
    }

    #[tokio::test]
    async fn streak_is_fixed_at_creation() {
        let (stats, clock) = store_at(noon(2));
        stats.record_review(Grade::Good, true, clock.now()).await.unwrap();
        clock.advance(Duration::days(1));
        stats.record_review(Grade::Good, false, clock.now()).await.unwrap();
        stats.record_review(Grade::Easy, false, clock.now()).await.unwrap();
        let today = stats.get_today().await.unwrap().unwrap();
        assert_eq!(today.streak, 2);
        assert_eq!(today.total_reviews, 2);
    }

    #[tokio::test]
    async fn grade_breakdown_sums_to_total() {
        let (stats, clock) = store_at(noon(2));
        let grades = [Grade::Again, Grade::Good, Grade::Good, Grade::Easy, Grade::Hard];
        for (i, grade) in grades.iter().enumerate() {
            stats
                .record_review(*grade, i % 2 == 0, clock.now())
                .await
                .unwrap();
        }
        let today = stats.get_today().await.unwrap().unwrap();
        assert_eq!(today.grades.total(), today.total_reviews);
        assert_eq!(today.total_reviews, today.new_cards + today.reviewed_cards);
        assert_eq!(today.grades.again, 1);
        assert_eq!(today.grades.hard, 1);
        assert_eq!(today.grades.good, 2);
        assert_eq!(today.grades.easy, 1);
    }

    #[tokio::test]
    async fn month_rollover_counts_as_adjacent() {
        let start = Utc.with_ymd_and_hms(2025, 5, 31, 12, 0, 0).unwrap();
        let (stats, clock) = store_at(start);
        stats.record_review(Grade::Good, true, clock.now()).await.unwrap();
        clock.advance(Duration::days(1));
        stats.record_review(Grade::Good, false, clock.now()).await.unwrap();
        let today = stats.get_today().await.unwrap().unwrap();
        assert_eq!(today.date, "2025-06-01");
        assert_eq!(today.streak, 2);
    }

    #[tokio::test]
    async fn last_n_days_fills_gaps_chronologically() {
        let (stats, clock) = store_at(noon(2));
        stats.record_review(Grade::Good, true, clock.now()).await.unwrap();
        clock.advance(Duration::days(2));
        stats.record_review(Grade::Good, false, clock.now()).await.unwrap();

        let window = stats.last_n_days(3, clock.now()).await.unwrap();
        let dates: Vec<&str> = window.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-06-02", "2025-06-03", "2025-06-04"]);
        assert_eq!(window[0].total_reviews, 1);
        assert_eq!(window[1].total_reviews, 0);
        assert_eq!(window[2].total_reviews, 1);
    }
}
