//! Parser for the `.snippet` definition format
//!
//! A snippet file is a flat list of records:
//!
//! ```text
//! #t=Show message
//! #g=msg
//! Message("$1")
//! ```
//!
//! `#t=` opens a record and names it, `#g=` gives it a trigger, and every
//! other line after both are known belongs to the body.

const LABEL_MARKER: &str = "#t=";
const TRIGGER_MARKER: &str = "#g=";
const BOM: char = '\u{feff}';

/// One snippet definition as written in a source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnippetRecord {
    pub label: String,
    pub trigger: String,
    /// Body lines with trailing blank lines already removed
    pub body: Vec<String>,
}

impl SnippetRecord {
    /// The body as inserted into a document, lines joined with `\n`.
    pub fn body_text(&self) -> String {
        self.body.join("\n")
    }
}

/// Parse every record out of one snippet file.
///
/// Lines that show up before a record has both a label and a trigger are
/// dropped without complaint.
pub fn parse_snippets(content: &str) -> Vec<SnippetRecord> {
    let content = content.strip_prefix(BOM).unwrap_or(content);

    let mut records = Vec::new();
    let mut pending = PendingRecord::default();

    for line in content.lines() {
        if let Some(label) = line.strip_prefix(LABEL_MARKER) {
            if let Some(record) = pending.take_valid() {
                records.push(record);
            }
            pending = PendingRecord {
                label: label.trim().to_string(),
                ..Default::default()
            };
        } else if let Some(trigger) = line.strip_prefix(TRIGGER_MARKER) {
            pending.trigger = trigger.trim().to_string();
        } else if pending.is_valid() {
            pending.body.push(line.to_string());
        }
    }

    if let Some(record) = pending.take_valid() {
        records.push(record);
    }

    records
}

#[derive(Default)]
struct PendingRecord {
    label: String,
    trigger: String,
    body: Vec<String>,
}

impl PendingRecord {
    fn is_valid(&self) -> bool {
        !self.label.is_empty() && !self.trigger.is_empty()
    }

    fn take_valid(&mut self) -> Option<SnippetRecord> {
        if !self.is_valid() {
            return None;
        }
        let PendingRecord { label, trigger, mut body } = std::mem::take(self);

        while body.last().is_some_and(|line| line.trim().is_empty()) {
            body.pop();
        }

        if body.is_empty() && label.is_empty() {
            return None;
        }

        Some(SnippetRecord { label, trigger, body })
    }
}
