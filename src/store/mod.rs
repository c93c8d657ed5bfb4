//! Abstract record store contract plus local reference implementations.
//!
//! The engine only ever talks to the store through short-lived
//! request/response calls: query, count, upsert-by-id, delete-by-id-set.
//! All mutations are idempotent, so no client-side locking is needed.

pub mod corpus;
pub mod filter;
pub mod memory;

pub use corpus::{load_corpus, save_corpus, Corpus};
pub use filter::{Field, Filter, Predicate};
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Question;

/// Errors a store call can surface. Every call has an explicit error path;
/// the remediation orchestrator treats any of these as an ordinary batch
/// failure and keeps going. No implicit retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("store rejected the request: {0}")]
    Rejected(String),
    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

/// Minimum contract the engine needs from a record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return every question matching `filter`.
    async fn query(&self, filter: &Filter) -> Result<Vec<Question>, StoreError>;

    /// Count questions matching `filter` without fetching them.
    async fn count(&self, filter: &Filter) -> Result<usize, StoreError>;

    /// Insert or replace records, keyed by id.
    async fn upsert(&self, records: Vec<Question>) -> Result<(), StoreError>;

    /// Delete the given ids. Unknown ids are ignored (idempotent).
    async fn delete(&self, ids: &[String]) -> Result<(), StoreError>;
}
