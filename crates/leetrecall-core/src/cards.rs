//! Card store: coding problems tracked as review cards.
//!
//! The store owns the card map and the 1:1 note texts. In-memory types carry
//! rich timestamps; the persisted shape ([`StoredCard`]) is primitive epoch
//! millis so the record stays wire-safe.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use leetrecall_algo::{CardPhase, Grade, MemoryState, Scheduler};

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::storage::{KvStore, CARDS_RECORD, NOTES_RECORD};

// ==================== Domain types ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Stable problem identifier, e.g. "two-sum".
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub memory: MemoryState,
    /// Problem difficulty label from the host site, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leetcode_id: Option<u32>,
    /// Paused cards are exempt from queue inclusion.
    pub paused: bool,
    /// Id of the card's note, if one exists. Owned 1:1; deleted with the card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
}

impl Card {
    fn create(
        slug: &str,
        name: &str,
        difficulty: Option<String>,
        leetcode_id: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            created_at: now,
            memory: MemoryState::fresh(now),
            difficulty,
            leetcode_id,
            paused: false,
            note_id: None,
        }
    }
}

// ==================== Persisted shape ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredCard {
    slug: String,
    name: String,
    created_at: i64,
    memory: StoredMemoryState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    leetcode_id: Option<u32>,
    #[serde(default)]
    paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMemoryState {
    phase: CardPhase,
    due: i64,
    stability: f64,
    difficulty: f64,
    elapsed_days: i64,
    scheduled_days: i64,
    reps: i32,
    lapses: i32,
    // Absent means never reviewed; must not collapse to epoch 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_review: Option<i64>,
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}

impl StoredCard {
    pub(crate) fn from_card(card: &Card) -> Self {
        Self {
            slug: card.slug.clone(),
            name: card.name.clone(),
            created_at: card.created_at.timestamp_millis(),
            memory: StoredMemoryState {
                phase: card.memory.phase,
                due: card.memory.due.timestamp_millis(),
                stability: card.memory.stability,
                difficulty: card.memory.difficulty,
                elapsed_days: card.memory.elapsed_days,
                scheduled_days: card.memory.scheduled_days,
                reps: card.memory.reps,
                lapses: card.memory.lapses,
                last_review: card.memory.last_review.map(|t| t.timestamp_millis()),
            },
            difficulty: card.difficulty.clone(),
            leetcode_id: card.leetcode_id,
            paused: card.paused,
            note_id: card.note_id.clone(),
        }
    }

    pub(crate) fn into_card(self) -> Card {
        Card {
            slug: self.slug,
            name: self.name,
            created_at: from_millis(self.created_at),
            memory: MemoryState {
                phase: self.memory.phase,
                due: from_millis(self.memory.due),
                stability: self.memory.stability,
                difficulty: self.memory.difficulty,
                elapsed_days: self.memory.elapsed_days,
                scheduled_days: self.memory.scheduled_days,
                reps: self.memory.reps,
                lapses: self.memory.lapses,
                last_review: self.memory.last_review.map(from_millis),
            },
            difficulty: self.difficulty,
            leetcode_id: self.leetcode_id,
            paused: self.paused,
            note_id: self.note_id,
        }
    }
}

// ==================== Store ====================

pub struct CardStore {
    storage: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    scheduler: Scheduler,
}

impl CardStore {
    pub fn new(storage: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            scheduler: Scheduler::new(),
        }
    }

    async fn load(&self) -> CoreResult<BTreeMap<String, StoredCard>> {
        match self.storage.read_record(CARDS_RECORD).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| CoreError::Corrupt {
                record: CARDS_RECORD.to_string(),
                source: e,
            }),
            None => Ok(BTreeMap::new()),
        }
    }

    async fn save(&self, cards: &BTreeMap<String, StoredCard>) -> CoreResult<()> {
        self.storage
            .write_record(CARDS_RECORD, serde_json::to_value(cards)?)
            .await
    }

    /// Idempotent create. An existing slug wins: the stored card comes back
    /// unchanged and the new name/metadata are ignored.
    pub async fn add_card(
        &self,
        slug: &str,
        name: &str,
        difficulty: Option<String>,
        leetcode_id: Option<u32>,
    ) -> CoreResult<Card> {
        let mut cards = self.load().await?;
        if let Some(existing) = cards.get(slug) {
            return Ok(existing.clone().into_card());
        }
        let card = Card::create(slug, name, difficulty, leetcode_id, self.clock.now());
        cards.insert(slug.to_string(), StoredCard::from_card(&card));
        self.save(&cards).await?;
        debug!(slug, "card added");
        Ok(card)
    }

    pub async fn get_all(&self) -> CoreResult<Vec<Card>> {
        let cards = self.load().await?;
        Ok(cards.into_values().map(StoredCard::into_card).collect())
    }

    pub async fn get(&self, slug: &str) -> CoreResult<Option<Card>> {
        let cards = self.load().await?;
        Ok(cards.get(slug).map(|c| c.clone().into_card()))
    }

    /// Deletes a card and its note. Missing slug is a silent no-op.
    pub async fn remove_card(&self, slug: &str) -> CoreResult<()> {
        let mut cards = self.load().await?;
        let Some(removed) = cards.remove(slug) else {
            return Ok(());
        };
        self.save(&cards).await?;
        if let Some(note_id) = removed.note_id {
            self.delete_note(&note_id).await?;
        }
        debug!(slug, "card removed");
        Ok(())
    }

    /// The single review entry point. Unknown slugs are created first (name
    /// falls back to the slug), then the memory model advances the state.
    /// Returns the updated card and whether it was new before this rating.
    pub async fn rate_card(
        &self,
        slug: &str,
        name: Option<&str>,
        grade: Grade,
        difficulty: Option<String>,
        leetcode_id: Option<u32>,
        now: DateTime<Utc>,
    ) -> CoreResult<(Card, bool)> {
        let mut cards = self.load().await?;
        let mut card = match cards.get(slug) {
            Some(stored) => stored.clone().into_card(),
            None => Card::create(slug, name.unwrap_or(slug), difficulty, leetcode_id, now),
        };
        let was_new = card.memory.is_new();
        card.memory = self.scheduler.compute_next(&card.memory, grade, now);
        cards.insert(slug.to_string(), StoredCard::from_card(&card));
        self.save(&cards).await?;
        debug!(slug, grade = ?grade, due = %card.memory.due, "card rated");
        Ok((card, was_new))
    }

    pub async fn set_paused(&self, slug: &str, paused: bool) -> CoreResult<Card> {
        self.update(slug, |card| card.paused = paused).await
    }

    /// Pushes the due date by `days` without touching reps or stability.
    /// Negative values advance the card.
    pub async fn delay(&self, slug: &str, days: i64) -> CoreResult<Card> {
        self.update(slug, |card| card.memory.due += Duration::days(days))
            .await
    }

    async fn update(&self, slug: &str, mutate: impl FnOnce(&mut Card)) -> CoreResult<Card> {
        let mut cards = self.load().await?;
        let Some(stored) = cards.get(slug) else {
            return Err(CoreError::CardNotFound {
                slug: slug.to_string(),
            });
        };
        let mut card = stored.clone().into_card();
        mutate(&mut card);
        cards.insert(slug.to_string(), StoredCard::from_card(&card));
        self.save(&cards).await?;
        Ok(card)
    }

    // ==================== Notes ====================

    async fn load_notes(&self) -> CoreResult<BTreeMap<String, String>> {
        match self.storage.read_record(NOTES_RECORD).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| CoreError::Corrupt {
                record: NOTES_RECORD.to_string(),
                source: e,
            }),
            None => Ok(BTreeMap::new()),
        }
    }

    async fn save_notes(&self, notes: &BTreeMap<String, String>) -> CoreResult<()> {
        self.storage
            .write_record(NOTES_RECORD, serde_json::to_value(notes)?)
            .await
    }

    /// Creates or overwrites the card's note; the note id is stable once
    /// assigned. The card gains its id before the note body is written, so
    /// a failure in between leaves a dangling id rather than an ownerless
    /// note blob.
    pub async fn save_note(&self, slug: &str, text: &str) -> CoreResult<Card> {
        let mut cards = self.load().await?;
        let Some(stored) = cards.get(slug) else {
            return Err(CoreError::CardNotFound {
                slug: slug.to_string(),
            });
        };
        let mut card = stored.clone().into_card();
        let note_id = match &card.note_id {
            Some(id) => id.clone(),
            None => {
                let id = Uuid::new_v4().to_string();
                card.note_id = Some(id.clone());
                cards.insert(slug.to_string(), StoredCard::from_card(&card));
                self.save(&cards).await?;
                id
            }
        };

        let mut notes = self.load_notes().await?;
        notes.insert(note_id, text.to_string());
        self.save_notes(&notes).await?;
        Ok(card)
    }

    pub async fn get_note(&self, slug: &str) -> CoreResult<Option<String>> {
        let cards = self.load().await?;
        let Some(stored) = cards.get(slug) else {
            return Ok(None);
        };
        let Some(note_id) = &stored.note_id else {
            return Ok(None);
        };
        let notes = self.load_notes().await?;
        Ok(notes.get(note_id).cloned())
    }

    async fn delete_note(&self, note_id: &str) -> CoreResult<()> {
        let mut notes = self.load_notes().await?;
        if notes.remove(note_id).is_some() {
            self.save_notes(&notes).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;

    fn store_at(now: DateTime<Utc>) -> (CardStore, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::utc(now));
        let store = CardStore::new(Arc::new(MemoryStore::new()), clock.clone());
        (store, clock)
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn add_is_idempotent_and_keeps_original_fields() {
        let (store, clock) = store_at(noon());
        let first = store.add_card("two-sum", "Two Sum", None, Some(1)).await.unwrap();
        clock.advance(Duration::hours(1));
        let second = store
            .add_card("two-sum", "Renamed", Some("Easy".into()), Some(99))
            .await
            .unwrap();
        assert_eq!(second, first);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rating_unknown_slug_creates_the_card() {
        let (store, _clock) = store_at(noon());
        let (card, was_new) = store
            .rate_card("unknown-slug", None, Grade::Good, None, None, noon())
            .await
            .unwrap();
        assert!(was_new);
        assert_eq!(card.name, "unknown-slug");
        assert_eq!(card.memory.reps, 1);
        assert_ne!(card.memory.phase, CardPhase::New);
        assert_eq!(card.memory.last_review, Some(noon()));
    }

    #[tokio::test]
    async fn rating_persists_the_advanced_state() {
        let (store, _clock) = store_at(noon());
        store.add_card("lru-cache", "LRU Cache", None, None).await.unwrap();
        let (rated, was_new) = store
            .rate_card("lru-cache", None, Grade::Easy, None, None, noon())
            .await
            .unwrap();
        assert!(was_new);
        let reread = store.get("lru-cache").await.unwrap().unwrap();
        assert_eq!(reread.memory, rated.memory);
        assert!(!reread.memory.is_new());
    }

    #[tokio::test]
    async fn remove_missing_is_a_noop() {
        let (store, _clock) = store_at(noon());
        store.remove_card("nope").await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_cascades_note_deletion() {
        let (store, _clock) = store_at(noon());
        store.add_card("two-sum", "Two Sum", None, None).await.unwrap();
        store.save_note("two-sum", "hash map trick").await.unwrap();
        assert_eq!(
            store.get_note("two-sum").await.unwrap().as_deref(),
            Some("hash map trick")
        );
        store.remove_card("two-sum").await.unwrap();
        assert!(store.get_note("two-sum").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delay_moves_due_forward_only() {
        let (store, _clock) = store_at(noon());
        store.add_card("word-break", "Word Break", None, None).await.unwrap();
        let before = store.get("word-break").await.unwrap().unwrap();
        let delayed = store.delay("word-break", 3).await.unwrap();
        assert_eq!(delayed.memory.due, before.memory.due + Duration::days(3));
        assert_eq!(delayed.memory.reps, before.memory.reps);
        assert_eq!(delayed.memory.stability, before.memory.stability);
    }

    #[tokio::test]
    async fn pause_and_delay_on_missing_slug_error_with_slug() {
        let (store, _clock) = store_at(noon());
        let err = store.set_paused("ghost", true).await.unwrap_err();
        assert!(matches!(err, CoreError::CardNotFound { slug } if slug == "ghost"));
    }

    // Fails every write to the notes record, passes everything else through.
    struct NoteWriteFails {
        inner: MemoryStore,
    }

    #[async_trait::async_trait]
    impl KvStore for NoteWriteFails {
        async fn read_record(&self, record: &str) -> CoreResult<Option<serde_json::Value>> {
            self.inner.read_record(record).await
        }

        async fn write_record(&self, record: &str, value: serde_json::Value) -> CoreResult<()> {
            if record == NOTES_RECORD {
                return Err(CoreError::Storage {
                    record: record.to_string(),
                    message: "disk full".to_string(),
                });
            }
            self.inner.write_record(record, value).await
        }

        async fn clear(&self) -> CoreResult<()> {
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn failed_note_write_never_orphans_a_note() {
        let clock = Arc::new(FixedClock::utc(noon()));
        let storage = Arc::new(NoteWriteFails {
            inner: MemoryStore::new(),
        });
        let store = CardStore::new(storage, clock);
        store.add_card("two-sum", "Two Sum", None, None).await.unwrap();

        let err = store.save_note("two-sum", "hash map trick").await.unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));

        // The card write landed first: a dangling id at worst, never a note
        // body without an owner.
        let card = store.get("two-sum").await.unwrap().unwrap();
        assert!(card.note_id.is_some());
        assert!(store.get_note("two-sum").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stored_card_round_trip_is_lossless() {
        let now = noon();
        let scheduler = Scheduler::new();
        let mut card = Card::create("coin-change", "Coin Change", Some("Medium".into()), Some(322), now);
        card.memory = scheduler.compute_next(&card.memory, Grade::Good, now);

        let back = StoredCard::from_card(&card).into_card();
        assert_eq!(back, card);

        // Never-reviewed card: last_review stays absent, not epoch 0.
        let fresh = Card::create("two-sum", "Two Sum", None, None, now);
        let json = serde_json::to_value(StoredCard::from_card(&fresh)).unwrap();
        assert!(json["memory"].get("lastReview").is_none());
        let back: StoredCard = serde_json::from_value(json).unwrap();
        assert!(back.into_card().memory.last_review.is_none());
    }
}
