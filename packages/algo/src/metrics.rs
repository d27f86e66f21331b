//! Knowledge Aggregation
//!
//! Groups a user's case stats by case name and reports decayed knowledge,
//! attempt counts and accuracy, overall and per case.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::knowledge::decay_knowledge;
use crate::sanitize::{finite_mean, percentage};
use crate::types::{CaseAggregate, ElapsedPolicy, KnowledgeSummary, PerformanceRecord};

#[derive(Default)]
struct CaseAccumulator {
    knowledge: Vec<f64>,
    attempts: usize,
    correct: usize,
}

pub fn summarize_knowledge(
    records: &[PerformanceRecord],
    now: DateTime<Utc>,
    policy: ElapsedPolicy,
) -> KnowledgeSummary {
    let mut groups: BTreeMap<&str, CaseAccumulator> = BTreeMap::new();

    for stats in records.iter().flat_map(|r| r.stats_by_case.iter()) {
        let acc = groups.entry(stats.case_name.as_str()).or_default();
        acc.knowledge
            .push(decay_knowledge(stats.knowledge, stats.last_date, now, policy));
        acc.attempts += stats.record.len();
        acc.correct += stats.correct_count();
    }

    let all_knowledge: Vec<f64> = groups
        .values()
        .flat_map(|acc| acc.knowledge.iter().copied())
        .collect();

    let mut by_case: Vec<CaseAggregate> = groups
        .into_iter()
        .map(|(case_name, acc)| CaseAggregate {
            case_name: case_name.to_string(),
            translations: acc.knowledge.len(),
            average_knowledge: finite_mean(&acc.knowledge),
            attempts: acc.attempts,
            correct: acc.correct,
            accuracy: percentage(acc.correct, acc.attempts),
        })
        .collect();

    by_case.sort_by(|a, b| {
        a.average_knowledge
            .total_cmp(&b.average_knowledge)
            .then_with(|| a.case_name.cmp(&b.case_name))
    });

    let attempts = by_case.iter().map(|c| c.attempts).sum();
    let correct = by_case.iter().map(|c| c.correct).sum();

    KnowledgeSummary {
        tracked_cases: all_knowledge.len(),
        average_knowledge: finite_mean(&all_knowledge),
        attempts,
        correct,
        accuracy: percentage(correct, attempts),
        by_case,
    }
}
