//! Common types shared by the scheduler and its callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review grade, as reported by the user after recalling a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    /// Numeric rating used by the FSRS formulas (1-4).
    pub fn value(self) -> i32 {
        match self {
            Grade::Again => 1,
            Grade::Hard => 2,
            Grade::Good => 3,
            Grade::Easy => 4,
        }
    }
}

/// Lifecycle phase of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardPhase {
    New,
    Learning,
    Review,
    Relearning,
}

impl Default for CardPhase {
    fn default() -> Self {
        Self::New
    }
}

impl CardPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Learning => "LEARNING",
            Self::Review => "REVIEW",
            Self::Relearning => "RELEARNING",
        }
    }
}

/// Scheduling state carried by every card.
///
/// Invariant: `phase == CardPhase::New` iff `reps == 0`. The scheduler
/// always increments `reps`, so a rated card can never report `New`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    pub phase: CardPhase,
    /// Next scheduled review. Always set; for unrated cards this is the
    /// creation instant so they sort stably.
    pub due: DateTime<Utc>,
    /// Retention half-life proxy, in days.
    pub stability: f64,
    /// Intrinsic recall difficulty, clamped to [1, 10].
    pub difficulty: f64,
    /// Whole days between the previous two reviews (diagnostic).
    pub elapsed_days: i64,
    /// Whole days of the currently scheduled interval (0 for minute steps).
    pub scheduled_days: i64,
    /// Ratings received so far.
    pub reps: i32,
    /// Again-graded reviews so far.
    pub lapses: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// State of a card that has never been rated.
    pub fn fresh(created_at: DateTime<Utc>) -> Self {
        Self {
            phase: CardPhase::New,
            due: created_at,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            last_review: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.reps == 0
    }
}
