//! Completion queries against a snippet index
//!
//! Every entry becomes one candidate; the typed prefix only changes the order
//! of the entry's triggers so that the client's own matcher sees the best
//! trigger first. Results depend on the prefix and must not be reused across
//! keystrokes.

use std::cmp::Ordering;

use crate::index::{IndexEntry, SnippetIndex};

/// Width of the zero-padded sort key.
const SORT_KEY_WIDTH: usize = 6;

/// Column range in a line, counted in UTF-16 code units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: u32,
    pub end: u32,
}

/// The token being typed immediately before the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prefix<'a> {
    /// The token exactly as written
    pub token: &'a str,
    /// Where the token sits in the line
    pub span: TokenSpan,
}

impl Prefix<'_> {
    pub fn lowercase(&self) -> String {
        self.token.to_lowercase()
    }
}

/// One completion candidate, derived per request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub label: String,
    /// Triggers in rank order, space separated
    pub filter_text: String,
    /// Triggers in rank order, for display
    pub detail: String,
    /// Zero-padded sort index
    pub sort_text: String,
    pub body: String,
    /// Range the insertion should replace, when a prefix was found
    pub replacement: Option<TokenSpan>,
}

/// Candidates for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionSet {
    pub candidates: Vec<Candidate>,
    /// Always set: ranking changes with every typed character
    pub is_incomplete: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    AsciiWord,
    NonAscii,
}

impl TokenClass {
    fn of(c: char) -> Option<Self> {
        if c.is_ascii_alphanumeric() || c == '_' {
            Some(TokenClass::AsciiWord)
        } else if !c.is_ascii() {
            Some(TokenClass::NonAscii)
        } else {
            None
        }
    }
}

/// Find the prefix at the end of `line_before_cursor`.
///
/// The prefix is the longest trailing run of either ASCII word characters or
/// non-ASCII characters, so `"代入a"` yields `"a"` and `"a代入"` yields `"代入"`.
pub fn extract_prefix(line_before_cursor: &str) -> Option<Prefix<'_>> {
    let mut chars = line_before_cursor.char_indices().rev();
    let (mut start, last) = chars.next()?;
    let class = TokenClass::of(last)?;

    for (idx, c) in chars {
        if TokenClass::of(c) != Some(class) {
            break;
        }
        start = idx;
    }

    let span_start = utf16_len(&line_before_cursor[..start]);
    Some(Prefix {
        token: &line_before_cursor[start..],
        span: TokenSpan {
            start: span_start,
            end: span_start + utf16_len(&line_before_cursor[start..]),
        },
    })
}

/// Order an entry's triggers for a lower-cased prefix.
///
/// Triggers starting with the prefix come first, shortest first; the rest
/// follow by length then text. Without a usable prefix, ASCII triggers come
/// before the others.
pub fn rank_triggers<'a>(
    triggers: impl IntoIterator<Item = &'a str>,
    prefix: &str,
) -> Vec<&'a str> {
    let triggers: Vec<&str> = triggers.into_iter().collect();

    if !prefix.is_empty() {
        let (mut matches, mut others): (Vec<&str>, Vec<&str>) = triggers
            .iter()
            .partition(|t| t.to_lowercase().starts_with(prefix));

        if !matches.is_empty() {
            // Stable: equal lengths keep first-seen order
            matches.sort_by_key(|t| char_len(t));
            others.sort_by(|a, b| by_length_then_text(a, b));
            matches.extend(others);
            return matches;
        }
    }

    let mut ranked = triggers;
    ranked.sort_by(|a, b| {
        b.is_ascii()
            .cmp(&a.is_ascii())
            .then_with(|| by_length_then_text(a, b))
    });
    ranked
}

/// Build one candidate per entry, ranked for `prefix`.
pub fn query(index: &SnippetIndex, prefix: &str) -> Vec<Candidate> {
    let prefix = prefix.to_lowercase();
    index
        .entries()
        .map(|entry| candidate(entry, &prefix, None))
        .collect()
}

/// Complete against the text of the current line up to the cursor.
pub fn complete_line(index: &SnippetIndex, line_before_cursor: &str) -> CompletionSet {
    let prefix = extract_prefix(line_before_cursor);
    let lowered = prefix.map(|p| p.lowercase()).unwrap_or_default();
    let replacement = prefix.map(|p| p.span);

    CompletionSet {
        candidates: index
            .entries()
            .map(|entry| candidate(entry, &lowered, replacement))
            .collect(),
        is_incomplete: true,
    }
}

fn candidate(entry: &IndexEntry, prefix: &str, replacement: Option<TokenSpan>) -> Candidate {
    let ranked = rank_triggers(entry.triggers.iter().map(String::as_str), prefix);

    Candidate {
        label: entry.label.clone(),
        filter_text: ranked.join(" "),
        detail: ranked.join(", "),
        sort_text: format!("{:0width$}", entry.sort_index, width = SORT_KEY_WIDTH),
        body: entry.body.clone(),
        replacement,
    }
}

fn by_length_then_text(a: &str, b: &str) -> Ordering {
    char_len(a).cmp(&char_len(b)).then_with(|| a.cmp(b))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}
