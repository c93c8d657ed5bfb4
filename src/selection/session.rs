//! Per-session anti-repetition state.
//!
//! An explicit handle, never ambient module state: concurrent quiz sessions
//! each hold their own instance, and tests can pin the clock by calling the
//! `*_at` methods directly. The used-id window resets after a fixed period,
//! after which questions may repeat.

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Default reset window for the used-id set.
pub const DEFAULT_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionSession {
    pub version: u32,
    /// Minutes before the used-id set is cleared.
    pub window_minutes: i64,
    pub window_started: DateTime<Utc>,
    /// Question id -> when it was served.
    #[serde(default)]
    pub used: HashMap<String, DateTime<Utc>>,
}

impl Default for SelectionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::with_window(Duration::minutes(DEFAULT_WINDOW_MINUTES))
    }

    pub fn with_window(window: Duration) -> Self {
        SelectionSession {
            version: 1,
            window_minutes: window.num_minutes(),
            window_started: Utc::now(),
            used: HashMap::new(),
        }
    }

    /// Clear the used set if the reset window has elapsed.
    pub fn maybe_reset(&mut self) {
        self.maybe_reset_at(Utc::now());
    }

    pub fn maybe_reset_at(&mut self, now: DateTime<Utc>) {
        if now - self.window_started >= Duration::minutes(self.window_minutes) {
            self.used.clear();
            self.window_started = now;
        }
    }

    pub fn is_used(&self, id: &str) -> bool {
        self.used.contains_key(id)
    }

    pub fn mark_used(&mut self, ids: &[String]) {
        self.mark_used_at(ids, Utc::now());
    }

    pub fn mark_used_at(&mut self, ids: &[String], now: DateTime<Utc>) {
        for id in ids {
            self.used.insert(id.clone(), now);
        }
    }

    /// Ids ordered oldest-used first. Reintroduction order when the fresh
    /// pool runs dry.
    pub fn oldest_first(&self) -> Vec<String> {
        let mut entries: Vec<(&String, &DateTime<Utc>)> = self.used.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }
}

/// Load session state from a JSON file. A missing file is a fresh session.
pub fn load_session(path: &Path) -> Result<SelectionSession> {
    if !path.exists() {
        return Ok(SelectionSession::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open session file at {}", path.display()))?;

    let session: SelectionSession =
        serde_json::from_reader(file).context("Failed to load session state")?;

    if session.version != 1 {
        anyhow::bail!("Unsupported session state version: {}", session.version);
    }

    Ok(session)
}

/// Save session state to a JSON file atomically.
pub fn save_session(path: &Path, session: &SelectionSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, session).context("Failed to serialize session state")?;

    file.commit().context("Failed to save session state")?;

    Ok(())
}
