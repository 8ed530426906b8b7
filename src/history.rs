// ============================================================================
// File: src/history.rs
// Bounded session history with optional on-disk persistence
// ============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::RequestType;

pub const DEFAULT_CAPACITY: usize = 50;
pub const TEXT_LIMIT: usize = 100;
pub const RESULT_LIMIT: usize = 200;

/// A past analysis, truncated for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub text: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

/// What the caller supplies; id and timestamp are assigned by the store
#[derive(Debug, Clone)]
pub struct NewEntry<'a> {
    pub text: &'a str,
    pub request_type: RequestType,
    pub result: &'a str,
}

#[derive(Serialize, Deserialize)]
struct HistoryFile {
    entries: Vec<HistoryEntry>,
}

/// Newest-first log of analyses, never longer than `capacity`
#[derive(Debug)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    capacity: usize,
    last_id: u64,
    path: Option<PathBuf>,
    // Set by `clear` so the next save replaces the file instead of merging
    cleared: bool,
}

impl HistoryStore {
    /// In-memory store; `save` is a no-op
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            last_id: 0,
            path: None,
            cleared: false,
        }
    }

    /// Store backed by a JSON file. A missing file starts an empty history.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Result<Self> {
        let path = path.into();
        let mut store = Self::new(capacity);

        if path.exists() {
            store.entries = read_entries(&path)?;
            store.entries.truncate(store.capacity);
            store.last_id = store.entries.iter().map(|e| e.id).max().unwrap_or(0);
            tracing::debug!(
                path = %path.display(),
                entries = store.entries.len(),
                "Loaded history"
            );
        }

        store.path = Some(path);
        Ok(store)
    }

    /// Record a completed analysis and return the stored entry
    pub fn add_entry(&mut self, entry: NewEntry<'_>) -> HistoryEntry {
        let timestamp = Utc::now();
        let id = self.next_id(&timestamp);

        let entry = HistoryEntry {
            id,
            text: truncate(entry.text, TEXT_LIMIT),
            request_type: entry.request_type,
            result: truncate(entry.result, RESULT_LIMIT),
            timestamp,
        };

        self.entries.insert(0, entry.clone());
        self.entries.truncate(self.capacity);
        entry
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cleared = true;
    }

    /// Entries, newest first
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the history file via a temp file and rename.
    ///
    /// Entries another process wrote since this store was opened are merged
    /// in first, unless this store was cleared.
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        if !self.cleared && path.exists() {
            let on_disk = read_entries(&path)?;
            self.merge(on_disk);
        }
        self.cleared = false;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = HistoryFile {
            entries: self.entries.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    fn merge(&mut self, other: Vec<HistoryEntry>) {
        for entry in other {
            if !self.entries.contains(&entry) {
                self.entries.push(entry);
            }
        }
        self.entries
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        self.entries.truncate(self.capacity);
        self.last_id = self.entries.iter().map(|e| e.id).fold(self.last_id, u64::max);
    }

    // Millisecond timestamp, bumped so ids stay strictly increasing
    fn next_id(&mut self, timestamp: &DateTime<Utc>) -> u64 {
        let millis = u64::try_from(timestamp.timestamp_millis()).unwrap_or(0);
        self.last_id = millis.max(self.last_id + 1);
        self.last_id
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// Hand-edited files may hold longer fields; the limits hold after a reload too
fn read_entries(path: &Path) -> Result<Vec<HistoryEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    let file: HistoryFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file {}", path.display()))?;

    Ok(file
        .entries
        .into_iter()
        .map(|entry| HistoryEntry {
            text: truncate(&entry.text, TEXT_LIMIT),
            result: truncate(&entry.result, RESULT_LIMIT),
            ..entry
        })
        .collect())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
