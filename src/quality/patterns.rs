//! Static table of placeholder and generic phrases.
//!
//! Detection is deliberately a fixed, auditable list of lowercase substrings
//! rather than anything learned: test reproducibility depends on it staying
//! deterministic. Extend the tables, don't replace the mechanism.

/// What a matched phrase indicates about the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Leftover template text: the question was never properly authored.
    Placeholder,
    /// Vague filler wording that carries no real content.
    Generic,
}

/// Template leftovers. A match anywhere in question text or options means
/// the generation step emitted its own scaffolding instead of content.
const PLACEHOLDER_PHRASES: &[&str] = &[
    "option a for",
    "option b for",
    "option c for",
    "option d for",
    "correct answer for",
    "answer text here",
    "placeholder",
    "lorem ipsum",
    "methodology a",
    "methodology b",
    "methodology c",
    "methodology d",
    "[insert",
    "todo:",
];

/// Vague filler that marks low-content questions. Not fatal on its own.
const GENERIC_PHRASES: &[&str] = &[
    "various factors",
    "many reasons",
    "several aspects",
    "different things",
    "it depends",
    "some people say",
];

/// Match `text` against both tables, case-insensitively.
///
/// Overlapping matches are all reported; the result contains at most one
/// entry per kind (a second placeholder hit adds nothing).
pub fn match_patterns(text: &str) -> Vec<PatternKind> {
    let lower = text.to_lowercase();
    let mut kinds = Vec::new();
    if PLACEHOLDER_PHRASES.iter().any(|p| lower.contains(p)) {
        kinds.push(PatternKind::Placeholder);
    }
    if GENERIC_PHRASES.iter().any(|p| lower.contains(p)) {
        kinds.push(PatternKind::Generic);
    }
    kinds
}

/// True if `text` contains any placeholder phrase.
pub fn has_placeholder(text: &str) -> bool {
    match_patterns(text).contains(&PatternKind::Placeholder)
}

/// True if `text` contains any generic filler phrase.
pub fn has_generic(text: &str) -> bool {
    match_patterns(text).contains(&PatternKind::Generic)
}
