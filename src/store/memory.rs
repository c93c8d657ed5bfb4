//! In-process reference store. Backs the CLI (seeded from the corpus file)
//! and the test suite. Mutations are idempotent by id like any conforming
//! store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::filter::Filter;
use super::{RecordStore, StoreError};
use crate::model::Question;

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Question>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(questions: Vec<Question>) -> Self {
        let records = questions.into_iter().map(|q| (q.id.clone(), q)).collect();
        MemoryStore {
            records: RwLock::new(records),
        }
    }

    /// Snapshot of every record, ordered by id for stable output.
    pub async fn snapshot(&self) -> Vec<Question> {
        let guard = self.records.read().await;
        let mut all: Vec<Question> = guard.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query(&self, filter: &Filter) -> Result<Vec<Question>, StoreError> {
        let guard = self.records.read().await;
        let mut hits: Vec<Question> = guard
            .values()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(hits)
    }

    async fn count(&self, filter: &Filter) -> Result<usize, StoreError> {
        let guard = self.records.read().await;
        Ok(guard.values().filter(|q| filter.matches(q)).count())
    }

    async fn upsert(&self, records: Vec<Question>) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;
        for q in records {
            guard.insert(q.id.clone(), q);
        }
        Ok(())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;
        for id in ids {
            guard.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Difficulty, Provenance};
    use crate::store::filter::{Field, Predicate};
    use chrono::Utc;

    fn question(id: &str, entity_id: &str) -> Question {
        Question {
            id: id.to_string(),
            entity_id: entity_id.to_string(),
            text: format!("Question {} about something?", id),
            option_a: "A".to_string(),
            option_b: "B".to_string(),
            option_c: "C".to_string(),
            option_d: "D".to_string(),
            correct_answer: "A".to_string(),
            difficulty: Difficulty::Medium,
            category: Category::History,
            explanation: String::new(),
            rotation_period: 1,
            provenance: Provenance::Generated,
            image_ref: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_query_by_entity() {
        let store = MemoryStore::seeded(vec![question("q1", "kenya"), question("q2", "japan")]);
        let hits = store.query(&Filter::entity("kenya")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "q1");
    }

    #[tokio::test]
    async fn test_count_matches_query() {
        let store = MemoryStore::seeded(vec![question("q1", "kenya"), question("q2", "kenya")]);
        let filter = Filter::matching(Predicate::Eq(Field::EntityId, "kenya".to_string()));
        assert_eq!(store.count(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryStore::seeded(vec![question("q1", "kenya")]);
        let mut updated = question("q1", "kenya");
        updated.text = "Rewritten question about Kenya?".to_string();
        store.upsert(vec![updated]).await.unwrap();
        let all = store.snapshot().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].text, "Rewritten question about Kenya?");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::seeded(vec![question("q1", "kenya")]);
        let ids = vec!["q1".to_string(), "missing".to_string()];
        store.delete(&ids).await.unwrap();
        store.delete(&ids).await.unwrap();
        assert!(store.snapshot().await.is_empty());
    }
}
