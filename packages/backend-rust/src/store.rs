//! Performance record persistence seam.
//!
//! The document store behind the scoring services only has to find a
//! user's records and write a set of them back, all or none.
//! [`InMemoryPerformanceStore`] keeps them in insertion order, the way a
//! collection scan returns them.
//!
//! Writes replace whole records without a version check, so batches for one
//! (user, word) must be applied one at a time by the caller.

use std::future::Future;

use lexis_algo::PerformanceRecord;
use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait PerformanceStore: Send + Sync {
    fn find_by_user_and_word(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> impl Future<Output = StoreResult<Vec<PerformanceRecord>>> + Send;

    fn find_by_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = StoreResult<Vec<PerformanceRecord>>> + Send;

    /// Insert or replace (by id) every record, or leave the store untouched
    /// when any of them is rejected.
    fn upsert_many(
        &self,
        records: Vec<PerformanceRecord>,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Insert `record`, or replace the stored record with the same id.
    fn upsert(&self, record: PerformanceRecord) -> impl Future<Output = StoreResult<()>> + Send {
        self.upsert_many(vec![record])
    }
}

fn apply_upsert(records: &mut Vec<PerformanceRecord>, record: PerformanceRecord) -> StoreResult<()> {
    if record.id.is_empty() {
        return Err(StoreError::Backend("record id is empty".to_string()));
    }

    if let Some(existing) = records.iter_mut().find(|r| r.id == record.id) {
        *existing = record;
        return Ok(());
    }

    let duplicate = records.iter().any(|r| {
        r.user_id == record.user_id
            && r.word_id == record.word_id
            && r.translation_id == record.translation_id
    });
    if duplicate {
        return Err(StoreError::Conflict(format!(
            "performance for user {} word {} translation {} already exists",
            record.user_id, record.word_id, record.translation_id
        )));
    }

    records.push(record);
    Ok(())
}

#[derive(Debug, Default)]
pub struct InMemoryPerformanceStore {
    records: RwLock<Vec<PerformanceRecord>>,
}

impl InMemoryPerformanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<PerformanceRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<PerformanceRecord> {
        self.records.read().clone()
    }
}

impl PerformanceStore for InMemoryPerformanceStore {
    async fn find_by_user_and_word(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> StoreResult<Vec<PerformanceRecord>> {
        let records = self.records.read();
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id && r.word_id == word_id)
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<PerformanceRecord>> {
        let records = self.records.read();
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_many(&self, records: Vec<PerformanceRecord>) -> StoreResult<()> {
        let mut stored = self.records.write();

        // applied to a copy first so a rejected record leaves nothing behind
        let mut staged = stored.clone();
        for record in records {
            apply_upsert(&mut staged, record)?;
        }

        *stored = staged;
        Ok(())
    }
}
