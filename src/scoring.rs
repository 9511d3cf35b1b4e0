// src/scoring.rs
//
// Response-time based scoring: the faster the answer, the more points.

use crate::config::{MAX_SCORE, MAX_TIME_MS, MIN_SCORE, MIN_TIME_MS};

/// Points awarded for a correct answer given the response time.
///
/// At or below MIN_TIME_MS the full MAX_SCORE is awarded; at or above
/// MAX_TIME_MS only MIN_SCORE. In between the score interpolates linearly,
/// rounded once, half away from zero.
pub fn calculate_score(response_time_ms: u64) -> u32 {
    if response_time_ms <= MIN_TIME_MS {
        return MAX_SCORE; // Fastest response gets max points
    }

    if response_time_ms >= MAX_TIME_MS {
        return MIN_SCORE; // Slowest response gets min points
    }

    // Linear interpolation between MIN_SCORE and MAX_SCORE based on time ratio
    let time_ratio = 1.0 - (response_time_ms - MIN_TIME_MS) as f64 / (MAX_TIME_MS - MIN_TIME_MS) as f64;
    (MIN_SCORE as f64 + time_ratio * (MAX_SCORE - MIN_SCORE) as f64).round() as u32
}
