use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty bucket a question is served under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Topic a question belongs to. Geography, Culture and History are
/// region-sensitive: a question in one of these that never mentions its
/// country is suspect, while an Economy or Science question may be evergreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Geography,
    History,
    Culture,
    Economy,
    Nature,
    Science,
    Sports,
    Food,
}

impl Category {
    /// Categories where relevance to the assigned country is mandatory.
    pub fn is_region_sensitive(&self) -> bool {
        matches!(self, Category::Geography | Category::Culture | Category::History)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Geography => "geography",
            Category::History => "history",
            Category::Culture => "culture",
            Category::Economy => "economy",
            Category::Nature => "nature",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Food => "food",
        }
    }
}

/// Where a question came from. Generated questions passed through an
/// automated producer and are the usual source of placeholder leftovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Generated,
    Curated,
}

/// A single multiple-choice trivia question tied to one entity (country).
///
/// Records are read-only everywhere except the remediation orchestrator,
/// which is the only component allowed to fix or delete them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub entity_id: String,
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub difficulty: Difficulty,
    pub category: Category,
    #[serde(default)]
    pub explanation: String,
    /// Month bucket marking which rotation cycle the question is current for.
    #[serde(default)]
    pub rotation_period: u32,
    pub provenance: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default = "epoch")]
    pub created_at: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Question {
    /// The four option slots in display order.
    pub fn options(&self) -> [&str; 4] {
        [&self.option_a, &self.option_b, &self.option_c, &self.option_d]
    }

    /// Age since the record was created.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.created_at
    }

    /// Return a short reference in the format "entity/id"
    pub fn short_ref(&self) -> String {
        format!("{}/{}", self.entity_id, self.id)
    }
}
