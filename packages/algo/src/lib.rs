//! # lexis-algo - knowledge scoring core for vocabulary practice
//!
//! Pure Rust implementation of the model that decides which translation
//! cases a learner should practise next:
//!
//! - **Decay** - stored knowledge fades exponentially, 1% per whole day
//! - **Update rule** - a new batch of answers weighs 3× the aged history
//! - **Matching** - every exercise of a word gets the current knowledge of its target case
//! - **Aggregation** - per-case knowledge, attempts and accuracy for one user
//!
//! ## Design
//!
//! - **Explicit clock** - every function takes `now`; nothing reads the wall clock
//! - **Fail to default** - missing stats score as 0 instead of erroring
//! - **Parallel batches** - many words can be scored at once with Rayon
//!
//! ## Modules
//!
//! - [`knowledge`] - decay, outcome filtering, update rule
//! - [`matching`] - exercise ↔ performance lookup and scoring
//! - [`metrics`] - knowledge aggregation
//! - [`sanitize`] - numerical guards
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use lexis_algo::{decay_knowledge, update_knowledge, ElapsedPolicy};
//!
//! let now = Utc::now();
//! let aged = decay_knowledge(80.0, now - Duration::days(69), now, ElapsedPolicy::ClampToZero);
//! let updated = update_knowledge(aged, &[Some(true), None, Some(false)]);
//! assert!(aged < 41.0);
//! assert!(updated < 80.0);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod knowledge;
pub mod matching;
pub mod metrics;
pub mod sanitize;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use knowledge::{
    accuracy_percentage, decay_by_days, decay_knowledge, elapsed_days, is_strict_boolean,
    outcome_from_json, outcomes_from_json, strict_outcomes, update_knowledge,
};

pub use matching::{knowledge_for, match_exercises, match_exercises_batch, PerformanceIndex};

pub use metrics::summarize_knowledge;
