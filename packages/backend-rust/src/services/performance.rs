use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lexis_algo::sanitize::clamp_percentage;
use lexis_algo::{
    decay_knowledge, is_blank_id, match_exercises, match_exercises_batch, outcomes_from_json,
    strict_outcomes, update_knowledge, CaseStats, PerformanceRecord, ScoredExercise, Word,
    UNPRACTICED_KNOWLEDGE,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::ScoringConfig;
use crate::store::{PerformanceStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum PerformanceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Answers given to the exercises of one (translation, case) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOutcome {
    pub translation_id: String,
    #[serde(rename = "case")]
    pub case_name: String,
    /// Submitted answers; entries that are not booleans are kept as `None`
    #[serde(deserialize_with = "deserialize_outcomes")]
    pub results: Vec<Option<bool>>,
}

fn deserialize_outcomes<'de, D>(deserializer: D) -> Result<Vec<Option<bool>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(outcomes_from_json(&raw))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseUpdate {
    pub translation_id: String,
    pub case_name: String,
    /// Stored knowledge aged to the time of the batch; `None` for a new case
    pub aged_knowledge: Option<f64>,
    pub knowledge: f64,
    pub counted_answers: usize,
}

impl CaseUpdate {
    pub fn is_new(&self) -> bool {
        self.aged_knowledge.is_none()
    }
}

fn require_id(value: &str, field: &str) -> Result<(), PerformanceError> {
    if is_blank_id(value) {
        return Err(PerformanceError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Apply one practice batch to the user's stored performance on a word.
///
/// A case seen for the first time starts from unpractised knowledge. An
/// existing case is aged to `now`, blended with the batch and stamped with
/// `now`. Counted answers are appended to the case record. Outcomes without
/// any boolean answer are skipped.
///
/// Every touched record is written in one all-or-nothing store call, so a
/// failed batch can be retried as a whole. Records are read, changed and
/// written back without a version check: batches for the same (user, word)
/// must not run concurrently, or the later write drops the earlier answers.
pub async fn record_practice_batch<S: PerformanceStore>(
    store: &S,
    user_id: &str,
    word_id: &str,
    outcomes: &[ExerciseOutcome],
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> Result<Vec<CaseUpdate>, PerformanceError> {
    require_id(user_id, "userId")?;
    require_id(word_id, "wordId")?;
    for outcome in outcomes {
        require_id(&outcome.translation_id, "translationId")?;
        require_id(&outcome.case_name, "case")?;
    }

    let existing = store.find_by_user_and_word(user_id, word_id).await?;
    let mut by_translation: HashMap<String, PerformanceRecord> = HashMap::new();
    for record in existing {
        by_translation
            .entry(record.translation_id.clone())
            .or_insert(record);
    }

    let mut touched: Vec<String> = Vec::new();
    let mut updates = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        let counted: Vec<bool> = strict_outcomes(&outcome.results).collect();
        if counted.is_empty() {
            tracing::debug!(
                translation_id = %outcome.translation_id,
                case = %outcome.case_name,
                "no counted answers in outcome, skipping"
            );
            continue;
        }

        let record = by_translation
            .entry(outcome.translation_id.clone())
            .or_insert_with(|| {
                PerformanceRecord::new(
                    Uuid::new_v4().to_string(),
                    user_id,
                    word_id,
                    outcome.translation_id.as_str(),
                )
            });

        let update = match record.case_stats_mut(&outcome.case_name) {
            Some(stats) => {
                let aged = decay_knowledge(stats.knowledge, stats.last_date, now, config.elapsed_policy);
                let knowledge = clamp_percentage(update_knowledge(aged, &outcome.results));
                stats.record.extend_from_slice(&counted);
                stats.last_date = now;
                stats.knowledge = knowledge;

                CaseUpdate {
                    translation_id: outcome.translation_id.clone(),
                    case_name: outcome.case_name.clone(),
                    aged_knowledge: Some(aged),
                    knowledge,
                    counted_answers: counted.len(),
                }
            }
            None => {
                let knowledge =
                    clamp_percentage(update_knowledge(UNPRACTICED_KNOWLEDGE, &outcome.results));
                record.stats_by_case.push(CaseStats {
                    case_name: outcome.case_name.clone(),
                    record: counted.clone(),
                    last_date: now,
                    knowledge,
                });

                CaseUpdate {
                    translation_id: outcome.translation_id.clone(),
                    case_name: outcome.case_name.clone(),
                    aged_knowledge: None,
                    knowledge,
                    counted_answers: counted.len(),
                }
            }
        };

        if !touched.contains(&outcome.translation_id) {
            touched.push(outcome.translation_id.clone());
        }
        updates.push(update);
    }

    let changed: Vec<PerformanceRecord> = touched
        .iter()
        .filter_map(|translation_id| by_translation.remove(translation_id))
        .collect();
    if !changed.is_empty() {
        store.upsert_many(changed).await?;
    }

    tracing::info!(
        user_id,
        word_id,
        cases = updates.len(),
        translations = touched.len(),
        "practice batch recorded"
    );

    Ok(updates)
}

/// Exercises of `word` annotated with the user's current knowledge.
pub async fn score_word_exercises<S: PerformanceStore>(
    store: &S,
    user_id: &str,
    word: &Word,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> Result<Vec<ScoredExercise>, PerformanceError> {
    require_id(user_id, "userId")?;

    let records = store.find_by_user_and_word(user_id, &word.id).await?;
    let scored = match_exercises(word, &records, now, config.elapsed_policy);

    tracing::debug!(
        user_id,
        word_id = %word.id,
        exercises = scored.len(),
        records = records.len(),
        "word exercises scored"
    );

    Ok(scored)
}

/// Score several words in one pass over the user's records.
pub async fn score_words<S: PerformanceStore>(
    store: &S,
    user_id: &str,
    words: &[Word],
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> Result<Vec<Vec<ScoredExercise>>, PerformanceError> {
    require_id(user_id, "userId")?;

    let records = store.find_by_user(user_id).await?;
    Ok(match_exercises_batch(words, &records, now, config.elapsed_policy))
}

/// Stable sort putting the weakest (or stalest) exercises first.
pub fn order_weakest_first(scored: &mut [ScoredExercise]) {
    scored.sort_by(|a, b| a.knowledge.total_cmp(&b.knowledge));
}

/// The next exercises to practise for `word`, weakest first.
pub async fn build_practice_queue<S: PerformanceStore>(
    store: &S,
    user_id: &str,
    word: &Word,
    now: DateTime<Utc>,
    config: &ScoringConfig,
    limit: Option<usize>,
) -> Result<Vec<ScoredExercise>, PerformanceError> {
    let mut scored = score_word_exercises(store, user_id, word, now, config).await?;
    order_weakest_first(&mut scored);
    scored.truncate(limit.unwrap_or(config.practice_queue_limit));
    Ok(scored)
}
