//! Snippet index: one entry per distinct body, in load order

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::parser::{parse_snippets, SnippetRecord};

/// Filename substrings that decide which files load first.
///
/// A file takes the rank of the first substring it contains; files matching
/// none load after all of them.
pub const DEFAULT_LOAD_ORDER: &[&str] = &["fast", "script", "keywords"];

/// Name and full text of one snippet source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnippetFile {
    pub name: String,
    pub content: String,
}

impl SnippetFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// All triggers that insert the same body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Label of the first record seen with this body
    pub label: String,
    /// Trigger synonyms in first-seen order, never empty
    pub triggers: IndexSet<String>,
    /// Rank assigned when the body was first seen
    pub sort_index: usize,
    pub body: String,
}

/// Immutable snippet index keyed by body text.
///
/// Iteration order equals ascending `sort_index`.
#[derive(Clone, Debug, Default)]
pub struct SnippetIndex {
    entries: IndexMap<String, IndexEntry>,
}

impl SnippetIndex {
    /// Build an index from files using [`DEFAULT_LOAD_ORDER`].
    pub fn build(files: impl IntoIterator<Item = SnippetFile>) -> Self {
        Self::build_with_order(files, DEFAULT_LOAD_ORDER)
    }

    /// Build an index from files, loading them in `load_order` priority.
    pub fn build_with_order<S: AsRef<str>>(
        files: impl IntoIterator<Item = SnippetFile>,
        load_order: &[S],
    ) -> Self {
        let mut files: Vec<SnippetFile> = files.into_iter().collect();
        sort_load_order(&mut files, load_order);

        debug!(
            files = ?files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            "snippet load order"
        );

        let mut builder = IndexBuilder::default();
        for file in &files {
            for record in parse_snippets(&file.content) {
                builder.add(record);
            }
        }
        builder.finish()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry that inserts exactly `body`.
    pub fn get(&self, body: &str) -> Option<&IndexEntry> {
        self.entries.get(body)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }
}

/// Accumulates records into entries, handing out one rank per new body.
#[derive(Default)]
struct IndexBuilder {
    entries: IndexMap<String, IndexEntry>,
    next_sort_index: usize,
}

impl IndexBuilder {
    fn add(&mut self, record: SnippetRecord) {
        let body = record.body_text();

        if let Some(entry) = self.entries.get_mut(&body) {
            // First occurrence keeps label and rank
            entry.triggers.insert(record.trigger);
            return;
        }

        let sort_index = self.next_sort_index;
        self.next_sort_index += 1;

        let mut triggers = IndexSet::new();
        triggers.insert(record.trigger);

        self.entries.insert(
            body.clone(),
            IndexEntry {
                label: record.label,
                triggers,
                sort_index,
                body,
            },
        );
    }

    fn finish(self) -> SnippetIndex {
        SnippetIndex {
            entries: self.entries,
        }
    }
}

/// Priority of a filename under `load_order`, lower loads first.
pub fn file_priority<S: AsRef<str>>(name: &str, load_order: &[S]) -> usize {
    load_order
        .iter()
        .position(|needle| name.contains(needle.as_ref()))
        .unwrap_or(load_order.len())
}

/// Sort files by load priority, then by filename.
pub fn sort_load_order<S: AsRef<str>>(files: &mut [SnippetFile], load_order: &[S]) {
    files.sort_by(|a, b| {
        file_priority(&a.name, load_order)
            .cmp(&file_priority(&b.name, load_order))
            .then_with(|| a.name.cmp(&b.name))
    });
}
