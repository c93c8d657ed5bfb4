use serde::{Deserialize, Serialize};

use super::question::Category;

/// The country (or other topical subject) a question is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// Region / continent the entity belongs to, e.g. "Africa".
    pub region: String,
    pub capital: String,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub area_km2: f64,
    /// Topic affinity: categories this entity has good coverage for.
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Entity {
    /// Return a test/demo entity. Handy in unit tests across the crate.
    #[cfg(test)]
    pub fn sample(id: &str, name: &str, region: &str, capital: &str) -> Self {
        Entity {
            id: id.to_string(),
            name: name.to_string(),
            region: region.to_string(),
            capital: capital.to_string(),
            population: 0,
            area_km2: 0.0,
            categories: vec![],
        }
    }
}
