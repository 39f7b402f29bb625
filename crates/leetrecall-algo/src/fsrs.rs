//! FSRS forgetting-curve math.
//!
//! Stability/difficulty update rules with the standard 17-weight parameter
//! vector. All functions are pure; the phase machine in [`crate::scheduler`]
//! decides how the resulting intervals map onto due dates.

use serde::{Deserialize, Serialize};

pub(crate) const DECAY: f64 = -0.5;
pub(crate) const FACTOR: f64 = 19.0 / 81.0;

/// Weight vector for the update rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsrsParams {
    pub w: [f64; 17],
}

impl Default for FsrsParams {
    fn default() -> Self {
        Self {
            w: [
                0.4, 0.6, 2.4, 5.8, // w0-w3: initial stability per grade
                4.93, 0.94, 0.86, 0.01, 1.49, // w4-w8
                0.14, 0.94, 2.18, 0.05, 0.34, // w9-w13
                1.26, 0.29, 2.61, // w14-w16
            ],
        }
    }
}

/// Probability of recall after `elapsed_days` at the given stability.
pub fn retrievability(stability: f64, elapsed_days: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    let safe_elapsed = elapsed_days.max(0.0);
    (1.0 + FACTOR * safe_elapsed / stability).powf(DECAY)
}

/// Interval, in days, at which retrievability falls to `desired_retention`.
pub(crate) fn next_interval(stability: f64, desired_retention: f64) -> f64 {
    let safe_retention = desired_retention.clamp(0.0001, 0.9999);
    let interval = stability / FACTOR * (safe_retention.powf(1.0 / DECAY) - 1.0);
    interval.clamp(1.0, 36500.0)
}

pub(crate) fn initial_stability(w: &[f64; 17], rating: i32) -> f64 {
    w[(rating - 1) as usize].max(0.1)
}

pub(crate) fn initial_difficulty(w: &[f64; 17], rating: i32) -> f64 {
    (w[4] - (rating - 3) as f64 * w[5]).clamp(1.0, 10.0)
}

pub(crate) fn next_difficulty(w: &[f64; 17], d: f64, rating: i32) -> f64 {
    let d_new = d - w[6] * (rating - 3) as f64;
    let d_mean = w[7] * (w[4] - 3.0 * w[5]) + (1.0 - w[7]) * d_new;
    d_mean.clamp(1.0, 10.0)
}

pub(crate) fn next_recall_stability(w: &[f64; 17], d: f64, s: f64, r: f64, rating: i32) -> f64 {
    let hard_penalty = if rating == 2 { w[15] } else { 1.0 };
    let easy_bonus = if rating == 4 { w[16] } else { 1.0 };

    let new_s = s
        * (1.0
            + w[8].exp()
                * (11.0 - d)
                * s.powf(-w[9])
                * ((1.0 - r) * w[10]).exp_m1()
                * hard_penalty
                * easy_bonus);
    new_s.max(0.1)
}

pub(crate) fn next_forget_stability(w: &[f64; 17], d: f64, s: f64, r: f64) -> f64 {
    let new_s =
        w[11] * d.powf(-w[12]) * ((s + 1.0).powf(w[13]) - 1.0) * ((1.0 - r) * w[14]).exp();
    new_s.clamp(0.1, s)
}
