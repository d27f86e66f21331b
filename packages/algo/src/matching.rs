//! Exercise Matching
//!
//! Attaches the current knowledge of each exercise's target
//! (translation, case) pair so a selection layer can put weak or stale
//! items first. Exercises without stored stats score as unpractised.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::knowledge::decay_knowledge;
use crate::types::{
    is_blank_id, CaseStats, ElapsedPolicy, Exercise, PerformanceRecord, ScoredExercise, Word,
    UNPRACTICED_KNOWLEDGE,
};

/// Performance records indexed by translation id.
///
/// When several records share an id the first one wins.
#[derive(Debug, Default)]
pub struct PerformanceIndex<'a> {
    by_translation: HashMap<&'a str, &'a PerformanceRecord>,
}

impl<'a> PerformanceIndex<'a> {
    pub fn new(records: &'a [PerformanceRecord]) -> Self {
        let mut by_translation = HashMap::with_capacity(records.len());
        for record in records {
            by_translation
                .entry(record.translation_id.as_str())
                .or_insert(record);
        }
        Self { by_translation }
    }

    pub fn len(&self) -> usize {
        self.by_translation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_translation.is_empty()
    }

    pub fn record(&self, translation_id: &str) -> Option<&'a PerformanceRecord> {
        self.by_translation.get(translation_id).copied()
    }

    pub fn case_stats(&self, translation_id: &str, case_name: &str) -> Option<&'a CaseStats> {
        self.record(translation_id)?.case_stats(case_name)
    }

    /// Stats targeted by `exercise`, if every step of the lookup resolves.
    pub fn stats_for(&self, exercise: &Exercise) -> Option<&'a CaseStats> {
        let target = exercise.target()?;
        let translation_id = target
            .translation_id
            .as_deref()
            .filter(|id| !is_blank_id(id))?;
        let case_name = target.case.as_deref().filter(|case| !is_blank_id(case))?;
        self.case_stats(translation_id, case_name)
    }
}

/// Current knowledge of the pair targeted by `exercise`.
pub fn knowledge_for(
    exercise: &Exercise,
    index: &PerformanceIndex<'_>,
    now: DateTime<Utc>,
    policy: ElapsedPolicy,
) -> f64 {
    index
        .stats_for(exercise)
        .map(|stats| decay_knowledge(stats.knowledge, stats.last_date, now, policy))
        .unwrap_or(UNPRACTICED_KNOWLEDGE)
}

fn score_with_index(
    word: &Word,
    index: &PerformanceIndex<'_>,
    now: DateTime<Utc>,
    policy: ElapsedPolicy,
) -> Vec<ScoredExercise> {
    word.exercises
        .iter()
        .map(|exercise| {
            let knowledge = knowledge_for(exercise, index, now, policy);
            ScoredExercise::new(exercise.clone(), knowledge)
        })
        .collect()
}

/// Score every exercise of `word`, keeping its order and length.
pub fn match_exercises(
    word: &Word,
    performance: &[PerformanceRecord],
    now: DateTime<Utc>,
    policy: ElapsedPolicy,
) -> Vec<ScoredExercise> {
    let index = PerformanceIndex::new(performance);
    score_with_index(word, &index, now, policy)
}

/// Score several words against the same records and the same `now`.
///
/// Words are processed in parallel; results follow the input order.
pub fn match_exercises_batch(
    words: &[Word],
    performance: &[PerformanceRecord],
    now: DateTime<Utc>,
    policy: ElapsedPolicy,
) -> Vec<Vec<ScoredExercise>> {
    let index = PerformanceIndex::new(performance);

    words
        .par_iter()
        .map(|word| score_with_index(word, &index, now, policy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchingTranslations, TranslationRef};
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
    }

    fn stats(case_name: &str, knowledge: f64, days_ago: i64) -> CaseStats {
        CaseStats {
            case_name: case_name.to_string(),
            record: vec![true, false, true],
            last_date: now() - Duration::days(days_ago),
            knowledge,
        }
    }

    fn record(translation_id: &str, stats_by_case: Vec<CaseStats>) -> PerformanceRecord {
        PerformanceRecord {
            stats_by_case,
            ..PerformanceRecord::new("p1", "u1", "w1", translation_id)
        }
    }

    fn word(exercises: Vec<Exercise>) -> Word {
        Word {
            id: "w1".to_string(),
            exercises,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_translation_scores_zero() {
        let word = word(vec![Exercise::targeting("t-unknown", "nominativeSingularDE")]);
        let perf = vec![record("t1", vec![stats("nominativeSingularDE", 90.0, 0)])];

        let scored = match_exercises(&word, &perf, now(), ElapsedPolicy::ClampToZero);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].knowledge, 0.0);
    }

    #[test]
    fn test_matching_case_gets_decayed_knowledge() {
        let word = word(vec![Exercise::targeting("t1", "indicativePresent1sES")]);
        let perf = vec![record("t1", vec![stats("indicativePresent1sES", 80.0, 10)])];

        let scored = match_exercises(&word, &perf, now(), ElapsedPolicy::ClampToZero);
        let expected = 80.0 * (-0.1f64).exp();
        assert!((scored[0].knowledge - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_case_scores_zero() {
        let word = word(vec![Exercise::targeting("t1", "genitivePluralET")]);
        let perf = vec![record("t1", vec![stats("nominativePluralET", 75.0, 0)])];

        let scored = match_exercises(&word, &perf, now(), ElapsedPolicy::ClampToZero);
        assert_eq!(scored[0].knowledge, 0.0);
    }

    #[test]
    fn test_incomplete_targets_score_zero() {
        let no_item_b = Exercise::default();
        let no_translation = Exercise {
            matching_translations: MatchingTranslations {
                item_b: Some(TranslationRef {
                    case: Some("positiveEN".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        let empty_translation = Exercise::targeting("", "positiveEN");
        let no_case = Exercise {
            matching_translations: MatchingTranslations {
                item_b: Some(TranslationRef {
                    translation_id: Some("t1".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        };

        let word = word(vec![no_item_b, no_translation, empty_translation, no_case]);
        let perf = vec![
            record("t1", vec![stats("positiveEN", 60.0, 0)]),
            record("", vec![stats("positiveEN", 60.0, 0)]),
        ];

        let scored = match_exercises(&word, &perf, now(), ElapsedPolicy::ClampToZero);
        assert_eq!(scored.len(), 4);
        assert!(scored.iter().all(|s| s.knowledge == 0.0));
    }

    #[test]
    fn test_whitespace_targets_count_as_missing() {
        let word = word(vec![
            Exercise::targeting(" ", "positiveEN"),
            Exercise::targeting("\t", "positiveEN"),
            Exercise::targeting("t1", "  "),
        ]);
        let perf = vec![
            record(" ", vec![stats("positiveEN", 60.0, 0)]),
            record("\t", vec![stats("positiveEN", 60.0, 0)]),
            record("t1", vec![stats("  ", 60.0, 0)]),
        ];

        let scored = match_exercises(&word, &perf, now(), ElapsedPolicy::ClampToZero);
        assert_eq!(scored.len(), 3);
        assert!(scored.iter().all(|s| s.knowledge == 0.0));
        assert!(is_blank_id(" \t"));
        assert!(!is_blank_id(" t1 "));
    }

    #[test]
    fn test_no_performance_at_all() {
        let word = word(vec![
            Exercise::targeting("t1", "a"),
            Exercise::targeting("t2", "b"),
        ]);
        let scored = match_exercises(&word, &[], now(), ElapsedPolicy::ClampToZero);
        assert_eq!(scored.len(), 2);
        assert!(scored.iter().all(|s| s.knowledge == 0.0));
    }

    #[test]
    fn test_order_and_length_preserved() {
        let exercises = vec![
            Exercise::targeting("t2", "comparativeEN"),
            Exercise::targeting("t9", "superlativeEN"),
            Exercise::targeting("t1", "positiveEN"),
            Exercise::targeting("t2", "comparativeEN"),
        ];
        let word = word(exercises.clone());
        let perf = vec![
            record("t1", vec![stats("positiveEN", 40.0, 0)]),
            record("t2", vec![stats("comparativeEN", 70.0, 0)]),
        ];

        let scored = match_exercises(&word, &perf, now(), ElapsedPolicy::ClampToZero);
        let knowledge: Vec<f64> = scored.iter().map(|s| s.knowledge).collect();
        assert_eq!(knowledge, vec![70.0, 0.0, 40.0, 70.0]);

        let back: Vec<Exercise> = scored.into_iter().map(|s| s.exercise).collect();
        assert_eq!(back, exercises);
    }

    #[test]
    fn test_first_record_and_first_case_win() {
        let word = word(vec![Exercise::targeting("t1", "dativeSingularDE")]);
        let perf = vec![
            record(
                "t1",
                vec![
                    stats("dativeSingularDE", 30.0, 0),
                    stats("dativeSingularDE", 99.0, 0),
                ],
            ),
            record("t1", vec![stats("dativeSingularDE", 55.0, 0)]),
        ];

        let index = PerformanceIndex::new(&perf);
        assert_eq!(index.len(), 1);

        let scored = match_exercises(&word, &perf, now(), ElapsedPolicy::ClampToZero);
        assert_eq!(scored[0].knowledge, 30.0);
    }

    #[test]
    fn test_document_fields_survive_and_knowledge_is_replaced() {
        let exercise: Exercise = serde_json::from_value(json!({
            "_id": "ex-7",
            "type": "fill-in",
            "knowledge": 12,
            "matchingTranslations": {
                "itemA": { "language": "ES" },
                "itemB": { "translationId": "t1", "case": "indicativePresent1sES", "language": "DE" }
            }
        }))
        .unwrap();
        let perf = vec![record("t1", vec![stats("indicativePresent1sES", 50.0, 0)])];

        let scored = match_exercises(&word(vec![exercise]), &perf, now(), ElapsedPolicy::ClampToZero);
        let value = serde_json::to_value(&scored[0]).unwrap();

        assert_eq!(value["_id"], json!("ex-7"));
        assert_eq!(value["type"], json!("fill-in"));
        assert_eq!(value["knowledge"], json!(50.0));
        assert_eq!(value["matchingTranslations"]["itemA"]["language"], json!("ES"));
        assert_eq!(value["matchingTranslations"]["itemB"]["language"], json!("DE"));
    }

    #[test]
    fn test_batch_matches_single_word_scoring() {
        let perf = vec![
            record("t1", vec![stats("a", 20.0, 5)]),
            record("t2", vec![stats("b", 90.0, 40)]),
        ];
        let words = vec![
            word(vec![Exercise::targeting("t1", "a")]),
            word(vec![Exercise::targeting("t2", "b"), Exercise::targeting("t3", "c")]),
            word(vec![]),
        ];

        let batch = match_exercises_batch(&words, &perf, now(), ElapsedPolicy::ClampToZero);
        assert_eq!(batch.len(), 3);
        for (w, scored) in words.iter().zip(&batch) {
            assert_eq!(scored, &match_exercises(w, &perf, now(), ElapsedPolicy::ClampToZero));
        }
    }
}
