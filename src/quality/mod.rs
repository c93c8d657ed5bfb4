pub mod audit;
pub mod duplicates;
pub mod patterns;
pub mod relevance;
pub mod validator;

pub use audit::{audit, AuditReport, EntityRollup, Recommendation, RecommendationLevel};
pub use duplicates::{find_duplicates, fingerprint, DuplicateCluster};
pub use patterns::{match_patterns, PatternKind};
pub use relevance::{Relevance, RelevanceClassifier};
pub use validator::{validate, Issue, IssueKind, Severity, ValidationResult, ValidationRules};
