use serde::{Deserialize, Serialize};

use crate::quality::validator::ValidationRules;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub remediation: RemediationConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Minimum question text length in characters.
    pub min_text_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig { min_text_length: 20 }
    }
}

impl ValidationConfig {
    pub fn rules(&self) -> ValidationRules {
        ValidationRules {
            min_text_length: self.min_text_length,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RemediationConfig {
    /// Ids per store call.
    pub batch_size: usize,
    /// Backpressure delay between store calls, in milliseconds.
    pub batch_delay_ms: u64,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        RemediationConfig {
            batch_size: 25,
            batch_delay_ms: 250,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SelectionConfig {
    /// Minutes before a session's used-id window resets.
    pub used_window_minutes: i64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            used_window_minutes: 60,
        }
    }
}
