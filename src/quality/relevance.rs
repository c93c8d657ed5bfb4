//! Decides whether a question is topically tied to its assigned country.
//!
//! Lowercase substring matching only, no stemming or fuzzy logic. Known
//! limitation: an entity whose name is a common word, or a substring of
//! another entity's name (e.g. "Niger" / "Nigeria"), can trip the
//! conflicting-entity check. That ambiguity is documented, not resolved.

use crate::model::{Category, Entity};

/// Outcome of classification. `ConflictingEntity` is a stronger signal than
/// plain `Irrelevant`: the text names a *different* country or region while
/// the category demands regional grounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    Relevant,
    Irrelevant,
    ConflictingEntity,
}

impl Relevance {
    pub fn is_relevant(&self) -> bool {
        matches!(self, Relevance::Relevant)
    }
}

/// Scope markers that make a question valid for any entity.
const GLOBAL_MARKERS: &[&str] = &["world", "global", "international"];

/// Regions checked for conflicts even when no peer entity lives there.
const KNOWN_REGIONS: &[&str] = &[
    "africa",
    "asia",
    "europe",
    "north america",
    "south america",
    "oceania",
    "antarctica",
    "middle east",
    "caribbean",
];

/// Classifier built once from the entity catalog. Peer names and capitals
/// feed the conflicting-entity check.
#[derive(Debug, Clone)]
pub struct RelevanceClassifier {
    /// Lowercased (name, region) of every catalog entity, keyed by entity id.
    peers: Vec<PeerTerms>,
}

#[derive(Debug, Clone)]
struct PeerTerms {
    entity_id: String,
    name: String,
    capital: String,
    region: String,
}

impl RelevanceClassifier {
    pub fn new(entities: &[Entity]) -> Self {
        let peers = entities
            .iter()
            .map(|e| PeerTerms {
                entity_id: e.id.clone(),
                name: e.name.to_lowercase(),
                capital: e.capital.to_lowercase(),
                region: e.region.to_lowercase(),
            })
            .collect();
        RelevanceClassifier { peers }
    }

    /// Classify one text unit (question text + explanation) against `entity`.
    pub fn classify(
        &self,
        text: &str,
        explanation: &str,
        entity: &Entity,
        category: Category,
    ) -> Relevance {
        let haystack = format!("{} {}", text, explanation).to_lowercase();
        let name = entity.name.to_lowercase();
        let region = entity.region.to_lowercase();

        // 1. Direct mention of the entity itself.
        if haystack.contains(&name) {
            return Relevance::Relevant;
        }

        // 2. Mention of the entity's region. Good enough, unless the
        //    category demands regional grounding and the text also names a
        //    different specific region or country.
        if !region.is_empty() && haystack.contains(&region) {
            if category.is_region_sensitive() && self.names_foreign_place(&haystack, entity) {
                return Relevance::ConflictingEntity;
            }
            return Relevance::Relevant;
        }

        // 3. Explicitly global questions are valid for any entity.
        if GLOBAL_MARKERS.iter().any(|m| haystack.contains(m)) {
            return Relevance::Relevant;
        }

        // 4. Nothing matched. Region-sensitive categories must be grounded;
        //    other categories stay relevant so evergreen trivia survives.
        if category.is_region_sensitive() {
            if self.names_foreign_place(&haystack, entity) {
                Relevance::ConflictingEntity
            } else {
                Relevance::Irrelevant
            }
        } else {
            Relevance::Relevant
        }
    }

    /// True if the text names a region other than the entity's own, or a
    /// peer country, capital, or region from the catalog.
    fn names_foreign_place(&self, haystack: &str, entity: &Entity) -> bool {
        let own_region = entity.region.to_lowercase();
        if KNOWN_REGIONS
            .iter()
            .any(|r| *r != own_region && haystack.contains(r))
        {
            return true;
        }
        self.peers.iter().any(|p| {
            p.entity_id != entity.id
                && (haystack.contains(&p.name)
                    || (!p.capital.is_empty() && haystack.contains(&p.capital))
                    || (!p.region.is_empty()
                        && p.region != own_region
                        && haystack.contains(&p.region)))
        })
    }
}
