//! Common Types and Constants
//!
//! Shared data structures used across the scoring modules. Field names
//! serialize in camelCase to match the documents kept by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ==================== Constants ====================

/// Exponential decay rate per whole day (half-life ≈ 69.3 days)
pub const DECAY_RATE_PER_DAY: f64 = 0.01;

/// Milliseconds in one day
pub const MS_PER_DAY: i64 = 86_400_000;

/// Weight of the aged knowledge in the update rule
pub const PREVIOUS_KNOWLEDGE_WEIGHT: f64 = 1.0;

/// Weight of the fresh batch average in the update rule
pub const RECENT_RESULTS_WEIGHT: f64 = 3.0;

/// Knowledge attached to exercises that have never been practised
pub const UNPRACTICED_KNOWLEDGE: f64 = 0.0;

/// Upper bound of a knowledge percentage
pub const MAX_KNOWLEDGE: f64 = 100.0;

/// Whether an id or case name counts as missing (empty or whitespace only)
pub fn is_blank_id(id: &str) -> bool {
    id.trim().is_empty()
}

// ==================== Decay Policy ====================

/// How a `lastDate` later than `now` is treated when counting elapsed days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElapsedPolicy {
    /// Negative elapsed days count as zero, so future dates never inflate knowledge.
    #[default]
    ClampToZero,
    /// Negative elapsed days are kept and the decayed value grows above its input.
    AllowNegative,
}

impl ElapsedPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "clamp" | "clamp-to-zero" => Some(ElapsedPolicy::ClampToZero),
            "allow-negative" | "negative" => Some(ElapsedPolicy::AllowNegative),
            _ => None,
        }
    }

    pub fn apply(&self, days: i64) -> i64 {
        match self {
            ElapsedPolicy::ClampToZero => days.max(0),
            ElapsedPolicy::AllowNegative => days,
        }
    }
}

// ==================== Performance Types ====================

/// Scoring state of one grammatical case of one translation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStats {
    /// Case identifier, e.g. "indicativePresent1sES"
    pub case_name: String,
    /// Every counted answer in chronological order (true = correct)
    #[serde(default)]
    pub record: Vec<bool>,
    /// Time of the last recorded attempt
    pub last_date: DateTime<Utc>,
    /// Knowledge percentage as of `last_date`
    pub knowledge: f64,
}

impl CaseStats {
    pub fn correct_count(&self) -> usize {
        self.record.iter().filter(|&&correct| correct).count()
    }
}

/// Per-translation performance of one user on one word
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub user_id: String,
    pub word_id: String,
    pub translation_id: String,
    #[serde(default)]
    pub stats_by_case: Vec<CaseStats>,
}

impl PerformanceRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        word_id: impl Into<String>,
        translation_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            word_id: word_id.into(),
            translation_id: translation_id.into(),
            stats_by_case: Vec::new(),
        }
    }

    /// First stats entry for `case_name`
    pub fn case_stats(&self, case_name: &str) -> Option<&CaseStats> {
        self.stats_by_case.iter().find(|s| s.case_name == case_name)
    }

    pub fn case_stats_mut(&mut self, case_name: &str) -> Option<&mut CaseStats> {
        self.stats_by_case
            .iter_mut()
            .find(|s| s.case_name == case_name)
    }
}

// ==================== Exercise Types ====================

/// Reference from an exercise to the (translation, case) it scores
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingTranslations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_b: Option<TranslationRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Practice item generated from a word's translations.
///
/// Only the scoring target is typed; every other field of the exercise
/// document is carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(default)]
    pub matching_translations: MatchingTranslations,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Exercise {
    pub fn targeting(translation_id: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            matching_translations: MatchingTranslations {
                item_b: Some(TranslationRef {
                    translation_id: Some(translation_id.into()),
                    case: Some(case.into()),
                    extra: Map::new(),
                }),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    pub fn target(&self) -> Option<&TranslationRef> {
        self.matching_translations.item_b.as_ref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Exercise annotated with its current (decayed) knowledge
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredExercise {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub knowledge: f64,
}

impl ScoredExercise {
    pub fn new(mut exercise: Exercise, knowledge: f64) -> Self {
        // the attached score replaces any stale value carried by the document
        exercise.extra.remove("knowledge");
        Self {
            exercise,
            knowledge,
        }
    }
}

// ==================== Aggregation Types ====================

/// Aggregate of every tracked translation for one case name
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAggregate {
    pub case_name: String,
    /// Number of stats entries (one per translation) carrying this case
    pub translations: usize,
    /// Mean knowledge after decay to `now`
    pub average_knowledge: f64,
    pub attempts: usize,
    pub correct: usize,
    /// Correct share of attempts as a percentage
    pub accuracy: f64,
}

/// Knowledge overview of one user
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSummary {
    pub tracked_cases: usize,
    pub average_knowledge: f64,
    pub attempts: usize,
    pub correct: usize,
    pub accuracy: f64,
    /// Weakest case first
    pub by_case: Vec<CaseAggregate>,
}
