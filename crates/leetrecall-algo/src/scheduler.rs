//! Phase machine on top of the FSRS dynamics.
//!
//! [`Scheduler::compute_next`] maps (current memory state, grade, now) to the
//! next memory state, including the next due instant. Learning and relearning
//! use short same-day steps; graduated cards get day-scale intervals sized so
//! retrievability decays to the desired retention.

use chrono::{DateTime, Duration, Utc};

use crate::fsrs::{
    self, initial_difficulty, initial_stability, next_difficulty, next_forget_stability,
    next_interval, next_recall_stability, FsrsParams,
};
use crate::types::{CardPhase, Grade, MemoryState};

const DEFAULT_RETENTION: f64 = 0.9;

// Learning steps, in minutes. A failed or hesitant answer keeps the card in
// the same session; Good on a new card waits one longer step before the card
// graduates on its next review.
const NEW_AGAIN_STEP_MIN: i64 = 1;
const NEW_HARD_STEP_MIN: i64 = 5;
const NEW_GOOD_STEP_MIN: i64 = 10;
const LEARNING_AGAIN_STEP_MIN: i64 = 5;
const LEARNING_HARD_STEP_MIN: i64 = 10;
const RELEARN_STEP_MIN: i64 = 10;

/// Stateless scheduling engine.
#[derive(Debug, Clone)]
pub struct Scheduler {
    params: FsrsParams,
    desired_retention: f64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            params: FsrsParams::default(),
            desired_retention: DEFAULT_RETENTION,
        }
    }

    pub fn with_params(params: FsrsParams, desired_retention: f64) -> Self {
        Self {
            params,
            desired_retention,
        }
    }

    /// Pure transition: does not read the wall clock and touches no storage.
    /// Callers must pass the real current time for due-date correctness.
    pub fn compute_next(&self, state: &MemoryState, grade: Grade, now: DateTime<Utc>) -> MemoryState {
        if state.is_new() {
            self.first_review(state, grade, now)
        } else {
            self.subsequent_review(state, grade, now)
        }
    }

    fn first_review(&self, state: &MemoryState, grade: Grade, now: DateTime<Utc>) -> MemoryState {
        let w = &self.params.w;
        let rating = grade.value();
        let stability = initial_stability(w, rating);
        let difficulty = initial_difficulty(w, rating);

        let (phase, due, scheduled_days) = match grade {
            Grade::Again => (CardPhase::Learning, now + Duration::minutes(NEW_AGAIN_STEP_MIN), 0),
            Grade::Hard => (CardPhase::Learning, now + Duration::minutes(NEW_HARD_STEP_MIN), 0),
            Grade::Good => (CardPhase::Learning, now + Duration::minutes(NEW_GOOD_STEP_MIN), 0),
            Grade::Easy => {
                let days = self.interval_days(stability);
                (CardPhase::Review, now + Duration::days(days), days)
            }
        };

        MemoryState {
            phase,
            due,
            stability,
            difficulty,
            elapsed_days: 0,
            scheduled_days,
            reps: state.reps + 1,
            lapses: state.lapses + if grade == Grade::Again { 1 } else { 0 },
            last_review: Some(now),
        }
    }

    fn subsequent_review(&self, state: &MemoryState, grade: Grade, now: DateTime<Utc>) -> MemoryState {
        let w = &self.params.w;
        let rating = grade.value();

        let elapsed = state
            .last_review
            .map(|last| (now - last).num_seconds().max(0) as f64 / 86_400.0)
            .unwrap_or(0.0);
        let r = fsrs::retrievability(state.stability, elapsed);

        let difficulty = next_difficulty(w, state.difficulty, rating);
        let lapsed = grade == Grade::Again;
        let stability = if lapsed {
            next_forget_stability(w, state.difficulty, state.stability, r)
        } else {
            next_recall_stability(w, state.difficulty, state.stability, r, rating)
        };

        let (phase, due, scheduled_days) = match (state.phase, grade) {
            (CardPhase::Review, Grade::Again) => (
                CardPhase::Relearning,
                now + Duration::minutes(RELEARN_STEP_MIN),
                0,
            ),
            (CardPhase::Learning | CardPhase::Relearning, Grade::Again) => (
                state.phase,
                now + Duration::minutes(LEARNING_AGAIN_STEP_MIN),
                0,
            ),
            (CardPhase::Learning | CardPhase::Relearning, Grade::Hard) => (
                state.phase,
                now + Duration::minutes(LEARNING_HARD_STEP_MIN),
                0,
            ),
            _ => {
                let days = self.interval_days(stability);
                (CardPhase::Review, now + Duration::days(days), days)
            }
        };

        MemoryState {
            phase,
            due,
            stability,
            difficulty,
            elapsed_days: elapsed.floor() as i64,
            scheduled_days,
            reps: state.reps + 1,
            lapses: state.lapses + if lapsed { 1 } else { 0 },
            last_review: Some(now),
        }
    }

    fn interval_days(&self, stability: f64) -> i64 {
        next_interval(stability, self.desired_retention).round().max(1.0) as i64
    }
}
