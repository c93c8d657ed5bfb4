//! Corpus-wide exact-duplicate detection via normalized fingerprints.
//!
//! Exact-match only by design: no edit distance, no paraphrase detection.
//! Two questions are duplicates when their texts normalize to the same key.

use std::collections::HashMap;

use crate::model::Question;

/// A group of records sharing one fingerprint. `keep` is the id of the
/// earliest-created member; everything in `remove` is redundant.
#[derive(Debug, Clone)]
pub struct DuplicateCluster {
    pub fingerprint: String,
    pub keep: String,
    pub remove: Vec<String>,
}

impl DuplicateCluster {
    pub fn member_count(&self) -> usize {
        self.remove.len() + 1
    }
}

/// Normalize text into a duplicate-detection key: lowercase, strip
/// non-alphanumeric characters, collapse whitespace runs.
pub fn fingerprint(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scan the corpus once and return every fingerprint group with more than
/// one member. O(n) in corpus size. Clusters come back sorted by
/// fingerprint so output is stable across runs.
pub fn find_duplicates(questions: &[Question]) -> Vec<DuplicateCluster> {
    let mut groups: HashMap<String, Vec<&Question>> = HashMap::new();
    for q in questions {
        groups.entry(fingerprint(&q.text)).or_default().push(q);
    }

    let mut clusters: Vec<DuplicateCluster> = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(fp, mut members)| {
            // Earliest created wins; id is the tiebreak so the choice is
            // deterministic even for same-timestamp imports.
            members.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            });
            DuplicateCluster {
                fingerprint: fp,
                keep: members[0].id.clone(),
                remove: members[1..].iter().map(|q| q.id.clone()).collect(),
            }
        })
        .collect();
    clusters.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
    clusters
}
