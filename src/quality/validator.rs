//! Per-record validation: structural rules, pattern rules and relevance,
//! folded into a deterministic quality score.

use serde::{Deserialize, Serialize};

use super::patterns;
use super::relevance::{Relevance, RelevanceClassifier};
use crate::model::{Entity, Question};

/// Ordinal severity ranking. Drives validity and remediation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    PlaceholderText,
    DuplicateOption,
    MissingCorrectAnswer,
    IrrelevantContent,
    GenericContent,
    WrongEntity,
    PoorQuality,
}

/// One problem found in a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
}

/// Outcome of validating one question. Issues are reported in rule order,
/// so the first issue is always the most structural one found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub question_id: String,
    pub is_valid: bool,
    pub issues: Vec<Issue>,
    /// Highest severity across issues; None for a clean record.
    pub severity: Option<Severity>,
    /// Quality score in [0, 100] after deterministic deductions.
    pub score: u32,
}

impl ValidationResult {
    pub fn has_critical(&self) -> bool {
        self.severity == Some(Severity::Critical)
    }
}

/// Tunable thresholds. Deduction amounts are fixed policy, not config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Minimum question text length in characters.
    pub min_text_length: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules { min_text_length: 20 }
    }
}

// Deductions per rule. Score starts at 100 and floors at 0.
const DEDUCT_STRUCTURAL: u32 = 50;
const DEDUCT_PLACEHOLDER_TEXT: u32 = 50;
const DEDUCT_PLACEHOLDER_OPTION: u32 = 40;
const DEDUCT_IRRELEVANT: u32 = 30;
const DEDUCT_DUPLICATE_OPTION: u32 = 20;
const DEDUCT_SHORT_TEXT: u32 = 20;
const DEDUCT_GENERIC: u32 = 10;

/// Validate a single question. Pure and deterministic: the same record,
/// entity and rules always produce the same result.
pub fn validate(
    question: &Question,
    entity: &Entity,
    classifier: &RelevanceClassifier,
    rules: &ValidationRules,
) -> ValidationResult {
    let mut issues: Vec<Issue> = Vec::new();
    let mut deductions: u32 = 0;

    // Structural rules first: blank fields and a correct answer that is not
    // one of the options are unconditionally critical.
    if question.text.trim().is_empty() {
        issues.push(Issue {
            kind: IssueKind::PoorQuality,
            severity: Severity::Critical,
            description: "question text is empty".to_string(),
        });
        deductions += DEDUCT_STRUCTURAL;
    }

    let option_labels = ["A", "B", "C", "D"];
    for (label, option) in option_labels.iter().zip(question.options()) {
        if option.trim().is_empty() {
            issues.push(Issue {
                kind: IssueKind::PoorQuality,
                severity: Severity::Critical,
                description: format!("option {} is empty", label),
            });
            deductions += DEDUCT_STRUCTURAL;
        }
    }

    if question.correct_answer.trim().is_empty() {
        issues.push(Issue {
            kind: IssueKind::MissingCorrectAnswer,
            severity: Severity::Critical,
            description: "correct answer is empty".to_string(),
        });
        deductions += DEDUCT_STRUCTURAL;
    } else if !question
        .options()
        .iter()
        .any(|o| *o == question.correct_answer)
    {
        issues.push(Issue {
            kind: IssueKind::MissingCorrectAnswer,
            severity: Severity::Critical,
            description: format!(
                "correct answer '{}' does not match any option",
                question.correct_answer
            ),
        });
        deductions += DEDUCT_STRUCTURAL;
    }

    // Placeholder leftovers are fatal wherever they appear.
    if patterns::has_placeholder(&question.text) {
        issues.push(Issue {
            kind: IssueKind::PlaceholderText,
            severity: Severity::Critical,
            description: "question text contains placeholder template text".to_string(),
        });
        deductions += DEDUCT_PLACEHOLDER_TEXT;
    }
    for (label, option) in option_labels.iter().zip(question.options()) {
        if patterns::has_placeholder(option) {
            issues.push(Issue {
                kind: IssueKind::PlaceholderText,
                severity: Severity::Critical,
                description: format!("option {} contains placeholder template text", label),
            });
            deductions += DEDUCT_PLACEHOLDER_OPTION;
        }
    }

    // Pairwise-distinct options, ignoring case and surrounding whitespace.
    let mut seen: Vec<String> = Vec::new();
    let mut duplicate_reported = false;
    for option in question.options() {
        let norm = option.trim().to_lowercase();
        if norm.is_empty() {
            continue;
        }
        if seen.contains(&norm) && !duplicate_reported {
            issues.push(Issue {
                kind: IssueKind::DuplicateOption,
                severity: Severity::High,
                description: format!("duplicate option text '{}'", option.trim()),
            });
            deductions += DEDUCT_DUPLICATE_OPTION;
            duplicate_reported = true;
        }
        seen.push(norm);
    }

    let text_len = question.text.trim().chars().count();
    if text_len > 0 && text_len < rules.min_text_length {
        issues.push(Issue {
            kind: IssueKind::PoorQuality,
            severity: Severity::High,
            description: format!(
                "question text is too short ({} chars, minimum {})",
                text_len, rules.min_text_length
            ),
        });
        deductions += DEDUCT_SHORT_TEXT;
    }

    match classifier.classify(
        &question.text,
        &question.explanation,
        entity,
        question.category,
    ) {
        Relevance::Relevant => {}
        Relevance::Irrelevant => {
            issues.push(Issue {
                kind: IssueKind::IrrelevantContent,
                severity: Severity::High,
                description: format!("content is not tied to {}", entity.name),
            });
            deductions += DEDUCT_IRRELEVANT;
        }
        Relevance::ConflictingEntity => {
            issues.push(Issue {
                kind: IssueKind::WrongEntity,
                severity: Severity::High,
                description: format!(
                    "content names a different country or region than {}",
                    entity.name
                ),
            });
            deductions += DEDUCT_IRRELEVANT;
        }
    }

    if patterns::has_generic(&question.text) {
        issues.push(Issue {
            kind: IssueKind::GenericContent,
            severity: Severity::Medium,
            description: "question text uses generic filler wording".to_string(),
        });
        deductions += DEDUCT_GENERIC;
    }

    let score = 100u32.saturating_sub(deductions);
    let severity = issues.iter().map(|i| i.severity).max();
    let is_valid = score > 0
        && !issues
            .iter()
            .any(|i| i.severity >= Severity::High);

    ValidationResult {
        question_id: question.id.clone(),
        is_valid,
        issues,
        severity,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Difficulty, Provenance};
    use chrono::Utc;

    fn kenya() -> Entity {
        Entity::sample("kenya", "Kenya", "Africa", "Nairobi")
    }

    fn catalog() -> Vec<Entity> {
        vec![
            kenya(),
            Entity::sample("france", "France", "Europe", "Paris"),
            Entity::sample("japan", "Japan", "Asia", "Tokyo"),
        ]
    }

    fn classifier() -> RelevanceClassifier {
        RelevanceClassifier::new(&catalog())
    }

    pub(crate) fn sample_question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            entity_id: "kenya".to_string(),
            text: "What is the capital of Kenya?".to_string(),
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

    fn check(q: &Question) -> ValidationResult {
        validate(q, &kenya(), &classifier(), &ValidationRules::default())
    }

    #[test]
    fn test_clean_question_scores_100() {
        let result = check(&sample_question("q-1"));
        assert!(result.is_valid);
        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
        assert_eq!(result.severity, None);
    }

    #[test]
    fn test_answer_not_among_options_is_critical() {
        let mut q = sample_question("q-1");
        q.correct_answer = "Cairo".to_string();
        let result = check(&q);
        assert!(!result.is_valid);
        assert_eq!(result.severity, Some(Severity::Critical));
        assert_eq!(result.issues[0].kind, IssueKind::MissingCorrectAnswer);
    }

    #[test]
    fn test_blank_option_is_critical() {
        let mut q = sample_question("q-1");
        q.option_c = "  ".to_string();
        let result = check(&q);
        assert!(!result.is_valid);
        assert_eq!(result.severity, Some(Severity::Critical));
    }

    #[test]
    fn test_placeholder_text_is_critical() {
        let mut q = sample_question("q-1");
        q.text = "Option A for France".to_string();
        q.option_a = "Correct answer for France".to_string();
        q.correct_answer = q.option_a.clone();
        let result = check(&q);
        assert!(!result.is_valid);
        assert_eq!(result.severity, Some(Severity::Critical));
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::PlaceholderText));
    }

    #[test]
    fn test_duplicate_option_is_high() {
        let mut q = sample_question("q-1");
        q.option_b = "Nairobi".to_string();
        let result = check(&q);
        assert!(!result.is_valid);
        assert_eq!(result.severity, Some(Severity::High));
        assert_eq!(result.score, 80);
        assert_eq!(result.issues[0].kind, IssueKind::DuplicateOption);
    }

    #[test]
    fn test_short_text_is_high() {
        let mut q = sample_question("q-1");
        q.text = "Kenya capital?".to_string();
        let result = check(&q);
        assert!(!result.is_valid);
        assert_eq!(result.score, 80);
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::PoorQuality && i.severity == Severity::High));
    }

    #[test]
    fn test_irrelevant_content_is_high() {
        let mut q = sample_question("q-1");
        q.text = "Which river is the longest on the planet?".to_string();
        let result = check(&q);
        assert!(!result.is_valid);
        assert_eq!(result.score, 70);
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::IrrelevantContent));
    }

    #[test]
    fn test_conflicting_entity_reports_wrong_entity() {
        let mut q = sample_question("q-1");
        q.entity_id = "japan".to_string();
        q.text = "How tall is the Eiffel Tower in Paris?".to_string();
        let japan = Entity::sample("japan", "Japan", "Asia", "Tokyo");
        let result = validate(&q, &japan, &classifier(), &ValidationRules::default());
        assert!(!result.is_valid);
        assert!(result.issues.iter().any(|i| i.kind == IssueKind::WrongEntity));
    }

    #[test]
    fn test_generic_content_is_medium_and_still_valid() {
        let mut q = sample_question("q-1");
        q.text = "Kenya's economy grew due to various factors, which one mattered?".to_string();
        q.category = Category::Economy;
        let result = check(&q);
        assert!(result.is_valid);
        assert_eq!(result.score, 90);
        assert_eq!(result.severity, Some(Severity::Medium));
    }

    #[test]
    fn test_deductions_floor_at_zero() {
        let mut q = sample_question("q-1");
        q.text = "Option A for".to_string();
        q.option_a = "Option A for Kenya".to_string();
        q.option_b = "Option B for Kenya".to_string();
        q.option_c = "Option C for Kenya".to_string();
        q.option_d = "Option D for Kenya".to_string();
        q.correct_answer = "missing".to_string();
        let result = check(&q);
        assert_eq!(result.score, 0);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_issue_order_is_structural_first() {
        let mut q = sample_question("q-1");
        q.correct_answer = "Cairo".to_string();
        q.text = "Short?".to_string();
        let result = check(&q);
        assert_eq!(result.issues[0].kind, IssueKind::MissingCorrectAnswer);
    }
}
