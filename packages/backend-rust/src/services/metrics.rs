use chrono::{DateTime, Utc};
use lexis_algo::{summarize_knowledge, KnowledgeSummary};

use crate::config::ScoringConfig;
use crate::store::{PerformanceStore, StoreError};

/// Knowledge overview across every word the user has practised.
pub async fn user_knowledge_summary<S: PerformanceStore>(
    store: &S,
    user_id: &str,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> Result<KnowledgeSummary, StoreError> {
    let records = store.find_by_user(user_id).await?;
    let summary = summarize_knowledge(&records, now, config.elapsed_policy);

    tracing::debug!(
        user_id,
        records = records.len(),
        tracked_cases = summary.tracked_cases,
        average_knowledge = summary.average_knowledge,
        "knowledge summary computed"
    );

    Ok(summary)
}
