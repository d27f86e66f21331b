//! Knowledge Decay and Update Rule
//!
//! A stored knowledge percentage is only valid as of its `lastDate`. Before
//! it is used for ranking or blended with new answers it is aged to `now`:
//!
//! `K(now) = K(lastDate) × e^(-0.01 × days)`, days counted in whole days.
//!
//! A fresh batch of answers is then blended with the aged value, the batch
//! weighing three times as much as the history:
//!
//! `K' = (1 × K + 3 × accuracy) / 4`

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::sanitize::sanitize_knowledge;
use crate::types::{
    ElapsedPolicy, DECAY_RATE_PER_DAY, MS_PER_DAY, PREVIOUS_KNOWLEDGE_WEIGHT,
    RECENT_RESULTS_WEIGHT,
};

// ==================== Decay ====================

/// Whole days between `last_date` and `now`, rounded down.
///
/// Negative when `last_date` lies in the future.
pub fn elapsed_days(last_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last_date).num_milliseconds().div_euclid(MS_PER_DAY)
}

/// Age a knowledge value recorded at `last_date` to `now`.
pub fn decay_knowledge(
    knowledge: f64,
    last_date: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: ElapsedPolicy,
) -> f64 {
    let days = policy.apply(elapsed_days(last_date, now));
    decay_by_days(knowledge, days)
}

/// Age a knowledge value by a known number of whole days.
pub fn decay_by_days(knowledge: f64, days: i64) -> f64 {
    sanitize_knowledge(knowledge) * (-DECAY_RATE_PER_DAY * days as f64).exp()
}

// ==================== Outcomes ====================

/// Only deliberate answers take part in the average; `None` marks an entry
/// that was missing or not a boolean.
pub fn is_strict_boolean(outcome: &Option<bool>) -> bool {
    outcome.is_some()
}

/// Read one submitted answer. Anything other than a JSON boolean is `None`.
pub fn outcome_from_json(value: &Value) -> Option<bool> {
    value.as_bool()
}

pub fn outcomes_from_json(values: &[Value]) -> Vec<Option<bool>> {
    values.iter().map(outcome_from_json).collect()
}

/// The counted answers of a batch, in order.
pub fn strict_outcomes(results: &[Option<bool>]) -> impl Iterator<Item = bool> + '_ {
    results.iter().filter(|r| is_strict_boolean(r)).flatten().copied()
}

/// Percentage of correct answers among the counted ones.
///
/// `None` when the batch holds no counted answer.
pub fn accuracy_percentage(results: &[Option<bool>]) -> Option<f64> {
    let (correct, counted) = strict_outcomes(results)
        .fold((0usize, 0usize), |(correct, counted), r| {
            (correct + usize::from(r), counted + 1)
        });

    if counted == 0 {
        return None;
    }

    Some(correct as f64 / counted as f64 * 100.0)
}

// ==================== Update Rule ====================

/// Blend an already-aged knowledge value with a new batch of answers.
///
/// Returns `previous` untouched when the batch has nothing to count.
pub fn update_knowledge(previous: f64, results: &[Option<bool>]) -> f64 {
    match accuracy_percentage(results) {
        Some(average) => {
            (PREVIOUS_KNOWLEDGE_WEIGHT * previous + RECENT_RESULTS_WEIGHT * average)
                / (PREVIOUS_KNOWLEDGE_WEIGHT + RECENT_RESULTS_WEIGHT)
        }
        None => previous,
    }
}
