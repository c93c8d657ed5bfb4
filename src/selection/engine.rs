//! Builds one quiz session's question set from the validated pool.
//!
//! Candidates come in tiers: entity-specific first, then regional peers,
//! then explicitly global questions. Broader tiers are appended only while
//! the set is short of `count`, so fallback candidates never displace
//! entity-specific ones. The session's used-id window provides
//! anti-repetition; when even that would under-fill the result, previously
//! used questions are brought back oldest-first rather than returning fewer
//! than requested.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::session::SelectionSession;
use crate::model::{Entity, Question};
use crate::quality::duplicates::fingerprint;
use crate::quality::relevance::RelevanceClassifier;
use crate::quality::validator::{validate, ValidationRules};

/// Scope markers that qualify a question for the global fallback tier.
const GLOBAL_MARKERS: &[&str] = &["world", "global", "international"];

pub struct SelectionParams<'a> {
    /// Entity the quiz is about.
    pub entity: &'a Entity,
    /// Full entity catalog, for regional-tier membership and validation.
    pub entities: &'a [Entity],
    pub classifier: &'a RelevanceClassifier,
    pub rules: &'a ValidationRules,
    /// Questions requested for this round.
    pub count: usize,
}

/// Select one round of questions. Mutates `session` by recording the
/// returned ids. Returns at least `min(count, distinct valid questions
/// across all tiers)` entries, never a duplicate id within one result.
pub fn select<R: Rng>(
    pool: &[Question],
    params: &SelectionParams,
    session: &mut SelectionSession,
    rng: &mut R,
) -> Vec<Question> {
    session.maybe_reset();

    let by_id: HashMap<&str, &Entity> = params
        .entities
        .iter()
        .map(|e| (e.id.as_str(), e))
        .collect();

    // Only validated questions enter any tier.
    let valid: Vec<&Question> = pool
        .iter()
        .filter(|q| {
            by_id
                .get(q.entity_id.as_str())
                .map(|entity| validate(q, entity, params.classifier, params.rules).is_valid)
                .unwrap_or(false)
        })
        .collect();

    let entity_tier: Vec<&Question> = valid
        .iter()
        .copied()
        .filter(|q| q.entity_id == params.entity.id)
        .collect();
    let regional_tier: Vec<&Question> = valid
        .iter()
        .copied()
        .filter(|q| {
            q.entity_id != params.entity.id
                && by_id
                    .get(q.entity_id.as_str())
                    .map(|e| e.region == params.entity.region)
                    .unwrap_or(false)
        })
        .collect();
    let global_tier: Vec<&Question> = valid
        .iter()
        .copied()
        .filter(|q| {
            let lower = q.text.to_lowercase();
            GLOBAL_MARKERS.iter().any(|m| lower.contains(m))
        })
        .collect();

    // Merge tiers in order, deduplicating each by fingerprint and shuffling
    // within the tier. The entity tier enters whole; broader tiers only top
    // up the shortfall, so fallback never displaces an entity-specific
    // candidate from the final draw.
    let mut candidates: Vec<&Question> = Vec::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for (i, tier) in [entity_tier, regional_tier, global_tier].into_iter().enumerate() {
        if i > 0 && candidates.len() >= params.count {
            break;
        }
        let mut deduped = dedup_by_fingerprint(tier);
        deduped.shuffle(rng);
        for q in deduped {
            if i > 0 && candidates.len() >= params.count {
                break;
            }
            if seen_ids.insert(q.id.as_str()) {
                candidates.push(q);
            }
        }
    }

    debug!(
        candidates = candidates.len(),
        requested = params.count,
        entity = %params.entity.id,
        "selection candidates assembled"
    );

    // Anti-repetition: drop ids served inside the current window.
    let mut picked: Vec<&Question> = candidates
        .iter()
        .copied()
        .filter(|q| !session.is_used(&q.id))
        .collect();

    // Under-filled: bring back used candidates oldest-first instead of
    // returning fewer than requested.
    if picked.len() < params.count {
        let by_candidate_id: HashMap<&str, &Question> =
            candidates.iter().map(|q| (q.id.as_str(), *q)).collect();
        for id in session.oldest_first() {
            if picked.len() >= params.count {
                break;
            }
            if let Some(&q) = by_candidate_id.get(id.as_str()) {
                if !picked.iter().any(|p| p.id == q.id) {
                    picked.push(q);
                }
            }
        }
    }

    picked.shuffle(rng);
    picked.truncate(params.count);

    let ids: Vec<String> = picked.iter().map(|q| q.id.clone()).collect();
    session.mark_used(&ids);

    picked.into_iter().cloned().collect()
}

/// Keep one question per fingerprint, preferring the earliest created.
fn dedup_by_fingerprint(tier: Vec<&Question>) -> Vec<&Question> {
    let mut best: HashMap<String, &Question> = HashMap::new();
    for q in tier {
        let key = fingerprint(&q.text);
        match best.get(&key) {
            Some(existing)
                if (existing.created_at, existing.id.as_str()) <= (q.created_at, q.id.as_str()) => {}
            _ => {
                best.insert(key, q);
            }
        }
    }
    let mut kept: Vec<&Question> = best.into_values().collect();
    kept.sort_by(|a, b| a.id.cmp(&b.id));
    kept
}
