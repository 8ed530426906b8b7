// ============================================================================
// File: src/markdown.rs
// Markdown export of the analysis history
// ============================================================================

use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::Path;

use crate::history::HistoryEntry;

pub struct MarkdownExporter<'a> {
    entries: &'a [HistoryEntry],
}

impl<'a> MarkdownExporter<'a> {
    pub fn new(entries: &'a [HistoryEntry]) -> Self {
        Self { entries }
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut content = String::new();

        self.write_header(&mut content);
        self.write_entries(&mut content);

        content
    }

    fn write_header(&self, content: &mut String) {
        content.push_str("# IsItTrue Analysis History\n\n");
        content.push_str(&format!("**Exported**: {}\n\n", Local::now().format("%Y-%m-%d %H:%M:%S")));
        content.push_str(&format!("**Entries**: {}\n\n", self.entries.len()));
    }

    fn write_entries(&self, content: &mut String) {
        if self.entries.is_empty() {
            content.push_str("_No history yet._\n");
            return;
        }

        // No verdict here: entries keep only an excerpt of the result, and a
        // verdict taken from the excerpt can contradict the full one
        for entry in self.entries {
            content.push_str(&format!(
                "## {} {}\n\n",
                entry.request_type.label(),
                entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            ));
            for line in entry.text.lines() {
                content.push_str(&format!("> {}\n", line));
            }
            content.push('\n');

            content.push_str(&entry.result);
            content.push_str("\n\n---\n\n");
        }
    }
}
