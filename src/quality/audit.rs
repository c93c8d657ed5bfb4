//! Aggregates per-record validation and duplicate detection into one
//! corpus-wide report. Read-only: safe to re-run after remediation to
//! confirm the corpus converged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::duplicates::{find_duplicates, DuplicateCluster};
use super::relevance::RelevanceClassifier;
use super::validator::{validate, IssueKind, ValidationResult, ValidationRules};
use crate::model::{Entity, Question};

/// Score below which a record lands on the worst-offender list.
pub const WORST_SCORE_FLOOR: u32 = 70;
/// Cap on the worst-offender list length.
pub const WORST_LIST_CAP: usize = 50;
/// Corpus accuracy below this percentage is flagged as critical.
pub const ACCURACY_CRITICAL_BELOW: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationLevel {
    Info,
    Warning,
    Critical,
}

/// A rule-derived follow-up action for the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub level: RecommendationLevel,
    pub message: String,
}

/// Per-entity rollup of validation outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRollup {
    pub entity_id: String,
    pub entity_name: String,
    pub question_count: usize,
    pub irrelevant_count: usize,
    pub mean_score: f64,
}

/// One entry on the worst-offender list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorstEntry {
    pub question_id: String,
    pub entity_id: String,
    pub score: u32,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub critical: usize,
    /// Percentage of records that pass validation.
    pub accuracy_pct: f64,
    pub duplicate_cluster_count: usize,
    pub per_entity: Vec<EntityRollup>,
    pub worst: Vec<WorstEntry>,
    pub recommendations: Vec<Recommendation>,
}

/// Run the validator over every record and the duplicate detector once,
/// then merge the results into an [`AuditReport`].
///
/// Questions whose `entity_id` is missing from the catalog are counted as
/// invalid with a wrong-entity style summary rather than skipped.
pub fn audit(
    questions: &[Question],
    entities: &[Entity],
    classifier: &RelevanceClassifier,
    rules: &ValidationRules,
) -> AuditReport {
    let by_id: HashMap<&str, &Entity> = entities.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut valid = 0usize;
    let mut critical = 0usize;
    let mut results: Vec<(&Question, Option<ValidationResult>)> = Vec::with_capacity(questions.len());

    for q in questions {
        match by_id.get(q.entity_id.as_str()) {
            Some(entity) => {
                let result = validate(q, entity, classifier, rules);
                if result.is_valid {
                    valid += 1;
                }
                if result.has_critical() {
                    critical += 1;
                }
                results.push((q, Some(result)));
            }
            None => {
                // Unknown entity: nothing to validate against.
                critical += 1;
                results.push((q, None));
            }
        }
    }

    let total = questions.len();
    let invalid = total - valid;
    let accuracy_pct = if total == 0 {
        100.0
    } else {
        valid as f64 * 100.0 / total as f64
    };

    let clusters: Vec<DuplicateCluster> = find_duplicates(questions);
    debug!(total, valid, clusters = clusters.len(), "audit pass complete");

    let per_entity = rollup_entities(entities, &results);
    let worst = worst_entries(&results);
    let recommendations = derive_recommendations(accuracy_pct, invalid, &clusters, &per_entity);

    AuditReport {
        total,
        valid,
        invalid,
        critical,
        accuracy_pct,
        duplicate_cluster_count: clusters.len(),
        per_entity,
        worst,
        recommendations,
    }
}

fn rollup_entities(
    entities: &[Entity],
    results: &[(&Question, Option<ValidationResult>)],
) -> Vec<EntityRollup> {
    entities
        .iter()
        .map(|entity| {
            let mut count = 0usize;
            let mut irrelevant = 0usize;
            let mut score_sum = 0u64;
            for (q, result) in results {
                if q.entity_id != entity.id {
                    continue;
                }
                count += 1;
                if let Some(r) = result {
                    score_sum += r.score as u64;
                    if r.issues.iter().any(|i| {
                        matches!(i.kind, IssueKind::IrrelevantContent | IssueKind::WrongEntity)
                    }) {
                        irrelevant += 1;
                    }
                }
            }
            EntityRollup {
                entity_id: entity.id.clone(),
                entity_name: entity.name.clone(),
                question_count: count,
                irrelevant_count: irrelevant,
                mean_score: if count == 0 {
                    0.0
                } else {
                    score_sum as f64 / count as f64
                },
            }
        })
        .collect()
}

fn worst_entries(results: &[(&Question, Option<ValidationResult>)]) -> Vec<WorstEntry> {
    let mut worst: Vec<WorstEntry> = results
        .iter()
        .filter_map(|(q, result)| match result {
            Some(r) if r.score < WORST_SCORE_FLOOR => Some(WorstEntry {
                question_id: q.id.clone(),
                entity_id: q.entity_id.clone(),
                score: r.score,
                summary: r
                    .issues
                    .first()
                    .map(|i| i.description.clone())
                    .unwrap_or_else(|| "low score".to_string()),
            }),
            None => Some(WorstEntry {
                question_id: q.id.clone(),
                entity_id: q.entity_id.clone(),
                score: 0,
                summary: format!("unknown entity '{}'", q.entity_id),
            }),
            _ => None,
        })
        .collect();
    // Ascending by score: worst first. Id tiebreak keeps output stable.
    worst.sort_by(|a, b| a.score.cmp(&b.score).then_with(|| a.question_id.cmp(&b.question_id)));
    worst.truncate(WORST_LIST_CAP);
    worst
}

fn derive_recommendations(
    accuracy_pct: f64,
    invalid: usize,
    clusters: &[DuplicateCluster],
    per_entity: &[EntityRollup],
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if accuracy_pct < ACCURACY_CRITICAL_BELOW {
        recs.push(Recommendation {
            level: RecommendationLevel::Critical,
            message: format!(
                "corpus accuracy {:.1}% is below the {:.0}% floor; run cleanup before serving",
                accuracy_pct, ACCURACY_CRITICAL_BELOW
            ),
        });
    } else if invalid > 0 {
        recs.push(Recommendation {
            level: RecommendationLevel::Warning,
            message: format!("{} invalid records remain; run cleanup", invalid),
        });
    }

    if !clusters.is_empty() {
        let extra: usize = clusters.iter().map(|c| c.remove.len()).sum();
        recs.push(Recommendation {
            level: RecommendationLevel::Warning,
            message: format!(
                "{} duplicate cluster(s) covering {} redundant record(s); flag for dedup",
                clusters.len(),
                extra
            ),
        });
    }

    for rollup in per_entity {
        if rollup.question_count == 0 {
            recs.push(Recommendation {
                level: RecommendationLevel::Warning,
                message: format!("no questions for {}; missing coverage", rollup.entity_name),
            });
        }
    }

    if recs.is_empty() {
        recs.push(Recommendation {
            level: RecommendationLevel::Info,
            message: "corpus is clean; no action needed".to_string(),
        });
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Difficulty, Provenance};
    use chrono::Utc;

    fn catalog() -> Vec<Entity> {
        vec![
            Entity::sample("kenya", "Kenya", "Africa", "Nairobi"),
            Entity::sample("japan", "Japan", "Asia", "Tokyo"),
        ]
    }

    fn question(id: &str, entity_id: &str, text: &str) -> Question {
        Question {
            id: id.to_string(),
            entity_id: entity_id.to_string(),
            text: text.to_string(),
            option_a: "Nairobi".to_string(),
            option_b: "Lagos".to_string(),
            option_c: "Accra".to_string(),
            option_d: "Kigali".to_string(),
            correct_answer: "Nairobi".to_string(),
            difficulty: Difficulty::Easy,
            category: Category::Geography,
            explanation: String::new(),
            rotation_period: 1,
            provenance: Provenance::Curated,
            image_ref: None,
            created_at: Utc::now(),
        }
    }

    fn run(questions: &[Question]) -> AuditReport {
        let entities = catalog();
        let classifier = RelevanceClassifier::new(&entities);
        audit(questions, &entities, &classifier, &ValidationRules::default())
    }

    #[test]
    fn test_clean_corpus_totals() {
        let corpus = vec![
            question("q1", "kenya", "What is the capital of Kenya?"),
            question("q2", "kenya", "Which lake in Kenya is the largest by area?"),
        ];
        let report = run(&corpus);
        assert_eq!(report.total, 2);
        assert_eq!(report.valid, 2);
        assert_eq!(report.invalid, 0);
        assert_eq!(report.critical, 0);
        assert_eq!(report.accuracy_pct, 100.0);
        assert!(report.worst.is_empty());
    }

    #[test]
    fn test_placeholder_counts_as_critical() {
        let corpus = vec![
            question("q1", "kenya", "What is the capital of Kenya?"),
            question("q2", "kenya", "Option A for Kenya placeholder question"),
        ];
        let report = run(&corpus);
        assert_eq!(report.valid, 1);
        assert_eq!(report.invalid, 1);
        assert_eq!(report.critical, 1);
    }

    #[test]
    fn test_low_accuracy_yields_critical_recommendation() {
        let corpus = vec![
            question("q1", "kenya", "Option A for Kenya placeholder question"),
            question("q2", "kenya", "What is the capital of Kenya?"),
        ];
        let report = run(&corpus);
        assert!(report.accuracy_pct < 80.0);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.level == RecommendationLevel::Critical));
    }

    #[test]
    fn test_missing_coverage_recommendation() {
        let corpus = vec![question("q1", "kenya", "What is the capital of Kenya?")];
        let report = run(&corpus);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.message.contains("Japan") && r.message.contains("missing coverage")));
    }

    #[test]
    fn test_duplicate_recommendation() {
        let corpus = vec![
            question("q1", "kenya", "What is the capital of Kenya?"),
            question("q2", "kenya", "what is the capital of kenya"),
        ];
        let report = run(&corpus);
        assert_eq!(report.duplicate_cluster_count, 1);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.message.contains("duplicate")));
    }

    #[test]
    fn test_worst_list_ascending_with_floor() {
        let mut bad = question("q-bad", "kenya", "Option A for Kenya placeholder question");
        bad.correct_answer = "nope".to_string();
        let corpus = vec![
            question("q-good", "kenya", "What is the capital of Kenya?"),
            // Short and ungrounded: -20 and -30, lands at 50.
            question("q-weak", "kenya", "Tallest tower?"),
            bad,
        ];
        let report = run(&corpus);
        // q-good scores 100 and stays off the list.
        assert!(report.worst.iter().all(|w| w.question_id != "q-good"));
        assert_eq!(report.worst.len(), 2);
        for pair in report.worst.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
    }

    #[test]
    fn test_unknown_entity_is_critical() {
        let corpus = vec![question("q1", "atlantis", "What is the capital of Atlantis?")];
        let report = run(&corpus);
        assert_eq!(report.critical, 1);
        assert_eq!(report.valid, 0);
        assert_eq!(report.worst[0].summary, "unknown entity 'atlantis'");
    }

    #[test]
    fn test_per_entity_rollup() {
        let corpus = vec![
            question("q1", "kenya", "What is the capital of Kenya?"),
            question("q2", "kenya", "Which river is the longest on the planet?"),
        ];
        let report = run(&corpus);
        let kenya = report
            .per_entity
            .iter()
            .find(|r| r.entity_id == "kenya")
            .unwrap();
        assert_eq!(kenya.question_count, 2);
        assert_eq!(kenya.irrelevant_count, 1);
        assert_eq!(kenya.mean_score, 85.0); // (100 + 70) / 2
    }

    #[test]
    fn test_empty_corpus_is_100_percent() {
        let report = run(&[]);
        assert_eq!(report.accuracy_pct, 100.0);
        assert_eq!(report.total, 0);
    }
}
