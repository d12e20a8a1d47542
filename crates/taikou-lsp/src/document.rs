use taikou_snippets::is_event_file;
use tower_lsp::lsp_types::Position;

/// Represents an open document in the LSP server
pub struct Document {
    /// Lines of the document, without line terminators
    lines: Vec<String>,
    /// Whether the first line carries the event source header
    event_file: bool,
}

impl Document {
    pub fn new(text: String) -> Self {
        let lines = split_lines(&text);
        let event_file = is_event_file(&lines[0]);
        Self { lines, event_file }
    }

    /// Replace the text. Returns true when the event-file status changed.
    pub fn update_text(&mut self, new_text: String) -> bool {
        self.lines = split_lines(&new_text);
        let event_file = is_event_file(&self.lines[0]);
        let changed = event_file != self.event_file;
        self.event_file = event_file;
        changed
    }

    pub fn is_event_file(&self) -> bool {
        self.event_file
    }

    /// Text of the cursor's line up to the cursor.
    ///
    /// `position.character` counts UTF-16 code units; positions past the end
    /// of the line clamp to the whole line.
    pub fn line_prefix(&self, position: Position) -> Option<&str> {
        let line = self.lines.get(position.line as usize)?;

        let mut units = 0u32;
        for (idx, c) in line.char_indices() {
            if units >= position.character {
                return Some(&line[..idx]);
            }
            units += c.len_utf16() as u32;
        }
        Some(line.as_str())
    }
}

/// Always yields at least one line so an empty document still has line 0
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
