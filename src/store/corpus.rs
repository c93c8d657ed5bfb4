//! Versioned corpus file: entities plus questions in one JSON document.
//! Saves are atomic so a crash mid-write never corrupts the corpus.

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::model::{Entity, Question};

pub const CORPUS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    pub version: u32,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Corpus {
    pub fn new(entities: Vec<Entity>, questions: Vec<Question>) -> Self {
        Corpus {
            version: CORPUS_VERSION,
            entities,
            questions,
        }
    }
}

/// Load a corpus from a JSON file.
///
/// Unlike session state there is no empty default: a missing corpus is an
/// operator error and reported as such.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open corpus file at {}", path.display()))?;

    let corpus: Corpus = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse corpus file at {}", path.display()))?;

    if corpus.version != CORPUS_VERSION {
        anyhow::bail!("Unsupported corpus version: {}", corpus.version);
    }

    Ok(corpus)
}

/// Save a corpus to a JSON file atomically.
pub fn save_corpus(path: &Path, corpus: &Corpus) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, corpus).context("Failed to serialize corpus")?;

    file.commit().context("Failed to save corpus")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Difficulty, Provenance};
    use chrono::Utc;

    fn sample_corpus() -> Corpus {
        Corpus::new(
            vec![Entity::sample("kenya", "Kenya", "Africa", "Nairobi")],
            vec![Question {
                id: "q1".to_string(),
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
            }],
        )
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");

        let corpus = sample_corpus();
        save_corpus(&path, &corpus).unwrap();

        let loaded = load_corpus(&path).unwrap();
        assert_eq!(loaded.version, CORPUS_VERSION);
        assert_eq!(loaded.entities.len(), 1);
        assert_eq!(loaded.questions.len(), 1);
        assert_eq!(loaded.questions[0].id, "q1");
    }

    #[test]
    fn test_missing_corpus_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(load_corpus(&path).is_err());
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        let mut corpus = sample_corpus();
        corpus.version = 99;
        save_corpus(&path, &corpus).unwrap();
        assert!(load_corpus(&path).is_err());
    }
}
