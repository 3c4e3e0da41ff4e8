//! Keyed persistence of analyzed records.

use crate::analyzer::{self, AnalyzedRecord};
use crate::filter;
use crate::lir::Predicate;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("String already exists in the system")]
    Conflict,
    #[error("String does not exist in the system")]
    NotFound,
    #[error("Storage backend failed: {0}")]
    Backend(String),
    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a record. Fails with [`StoreError::Conflict`] when its identifier is taken.
    ///
    /// The check and the insert are atomic with regard to other inserts.
    async fn insert(&self, record: AnalyzedRecord) -> Result<AnalyzedRecord, StoreError>;

    async fn get(&self, value: &str) -> Result<Option<AnalyzedRecord>, StoreError>;

    /// Remove the record with this exact value. Fails with [`StoreError::NotFound`] if absent.
    async fn delete(&self, value: &str) -> Result<(), StoreError>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<AnalyzedRecord>, StoreError>;

    /// All records matching the predicate, oldest first.
    async fn find(&self, predicate: &Predicate) -> Result<Vec<AnalyzedRecord>, StoreError> {
        Ok(filter::evaluate(predicate, self.list().await?))
    }
}

#[derive(Default)]
struct Inner {
    next: u64,
    /// insertion sequence to record
    records: BTreeMap<u64, AnalyzedRecord>,
    /// identifier to insertion sequence
    index: HashMap<String, u64>,
}

/// A store keeping everything in memory, in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, record: AnalyzedRecord) -> Result<AnalyzedRecord, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.index.contains_key(&record.identifier) {
            return Err(StoreError::Conflict);
        }

        let seq = inner.next;
        inner.next += 1;
        inner.index.insert(record.identifier.clone(), seq);
        inner.records.insert(seq, record.clone());

        Ok(record)
    }

    async fn get(&self, value: &str) -> Result<Option<AnalyzedRecord>, StoreError> {
        let inner = self.inner.read().await;

        Ok(inner
            .index
            .get(&analyzer::identifier(value))
            .and_then(|seq| inner.records.get(seq))
            .cloned())
    }

    async fn delete(&self, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        let seq = inner
            .index
            .remove(&analyzer::identifier(value))
            .ok_or(StoreError::NotFound)?;
        inner.records.remove(&seq);

        Ok(())
    }

    async fn list(&self) -> Result<Vec<AnalyzedRecord>, StoreError> {
        Ok(self.inner.read().await.records.values().cloned().collect())
    }

    async fn find(&self, predicate: &Predicate) -> Result<Vec<AnalyzedRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(filter::evaluate(predicate, inner.records.values())
            .into_iter()
            .cloned()
            .collect())
    }
}
