//! Daily review queue construction.
//!
//! Due review cards are unbounded; new cards are capped by the daily limit
//! minus what was already introduced today. The two groups are interleaved
//! with reviews as the primary stream.

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

use leetrecall_algo::CardPhase;

use crate::cards::Card;
use crate::clock::Clock;
use crate::interleave::interleave;

/// Builds today's session from a storage snapshot.
///
/// Partition order is deterministic: due reviews by due date then slug, new
/// cards by creation time then slug. A card due exactly at `now` is due
/// (inclusive boundary); paused cards are excluded from both partitions.
pub fn build_queue(
    cards: Vec<Card>,
    already_new_today: u32,
    new_card_cap: i64,
    now: DateTime<Utc>,
) -> Vec<Card> {
    let mut due_review: Vec<Card> = Vec::new();
    let mut fresh: Vec<Card> = Vec::new();
    for card in cards {
        if card.paused {
            continue;
        }
        if card.memory.is_new() {
            fresh.push(card);
        } else if card.memory.due <= now {
            due_review.push(card);
        }
    }

    due_review.sort_by(|a, b| {
        a.memory
            .due
            .cmp(&b.memory.due)
            .then_with(|| a.slug.cmp(&b.slug))
    });
    fresh.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.slug.cmp(&b.slug))
    });

    let slots = (new_card_cap - i64::from(already_new_today)).max(0) as usize;
    fresh.truncate(slots);

    interleave(due_review, fresh)
}

/// Card counts per lifecycle phase, for the stats view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseCounts {
    pub total: u32,
    pub new: u32,
    pub learning: u32,
    pub review: u32,
    pub relearning: u32,
    pub paused: u32,
}

pub fn phase_counts(cards: &[Card]) -> PhaseCounts {
    let mut counts = PhaseCounts::default();
    for card in cards {
        counts.total += 1;
        if card.paused {
            counts.paused += 1;
        }
        match card.memory.phase {
            CardPhase::New => counts.new += 1,
            CardPhase::Learning => counts.learning += 1,
            CardPhase::Review => counts.review += 1,
            CardPhase::Relearning => counts.relearning += 1,
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueForecastEntry {
    pub date: String,
    pub count: u32,
}

/// Forward-looking due counts for the next `n` local calendar days, starting
/// today. Overdue cards roll into today's bucket; paused and never-rated
/// cards are excluded.
pub fn due_forecast(
    cards: &[Card],
    n: u32,
    clock: &dyn Clock,
    now: DateTime<Utc>,
) -> Vec<DueForecastEntry> {
    let today = clock.local_date(now);
    (0..n)
        .map(|ahead| {
            let date = today + Days::new(u64::from(ahead));
            let count = cards
                .iter()
                .filter(|c| !c.paused && !c.memory.is_new())
                .filter(|c| {
                    let due_date = clock.local_date(c.memory.due);
                    if ahead == 0 {
                        due_date <= date
                    } else {
                        due_date == date
                    }
                })
                .count() as u32;
            DueForecastEntry {
                date: crate::stats::day_key(date),
                count,
            }
        })
        .collect()
}
