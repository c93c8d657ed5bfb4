//! The minimum predicate algebra the engine requires from a store:
//! equality, substring and set-membership predicates OR-combined across
//! fields. An empty filter matches everything.

use crate::model::Question;

/// Question fields a predicate can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    EntityId,
    Text,
    Category,
    Difficulty,
    Provenance,
    RotationPeriod,
}

#[derive(Debug, Clone)]
pub enum Predicate {
    /// Field equals the value exactly.
    Eq(Field, String),
    /// Field contains the value as a case-insensitive substring.
    Contains(Field, String),
    /// Field equals any of the values.
    In(Field, Vec<String>),
}

/// OR-combination of predicates. `Filter::all()` matches every record.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub any: Vec<Predicate>,
}

impl Filter {
    /// Match every record.
    pub fn all() -> Self {
        Filter { any: Vec::new() }
    }

    pub fn matching(predicate: Predicate) -> Self {
        Filter { any: vec![predicate] }
    }

    pub fn or(mut self, predicate: Predicate) -> Self {
        self.any.push(predicate);
        self
    }

    /// Convenience: match a set of ids.
    pub fn ids(ids: &[String]) -> Self {
        Filter::matching(Predicate::In(Field::Id, ids.to_vec()))
    }

    /// Convenience: match one entity's questions.
    pub fn entity(entity_id: &str) -> Self {
        Filter::matching(Predicate::Eq(Field::EntityId, entity_id.to_string()))
    }

    pub fn matches(&self, question: &Question) -> bool {
        if self.any.is_empty() {
            return true;
        }
        self.any.iter().any(|p| p.matches(question))
    }
}

impl Predicate {
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            Predicate::Eq(field, value) => field_value(question, *field) == *value,
            Predicate::Contains(field, value) => field_value(question, *field)
                .to_lowercase()
                .contains(&value.to_lowercase()),
            Predicate::In(field, values) => {
                let actual = field_value(question, *field);
                values.iter().any(|v| *v == actual)
            }
        }
    }
}

fn field_value(question: &Question, field: Field) -> String {
    match field {
        Field::Id => question.id.clone(),
        Field::EntityId => question.entity_id.clone(),
        Field::Text => question.text.clone(),
        Field::Category => question.category.as_str().to_string(),
        Field::Difficulty => format!("{:?}", question.difficulty).to_lowercase(),
        Field::Provenance => format!("{:?}", question.provenance).to_lowercase(),
        Field::RotationPeriod => question.rotation_period.to_string(),
    }
}
