//! Snippet completion core for Taikou5 event scripts
//!
//! This crate turns a directory of `.snippet` definition files into an
//! in-memory index and answers prefix-based completion queries against it.
//! It is shared by the language server and by anything else that wants the
//! same ranking without speaking LSP.
//!
//! # Features
//!
//! - **Parser**: reads `#t=` / `#g=` records out of one snippet file
//! - **Index**: merges identical bodies across files, keeps trigger synonyms and
//!   assigns a stable rank per body
//! - **Query**: extracts the typed prefix and re-ranks each entry's triggers
//! - **Store**: holds the current index snapshot and swaps it atomically on rebuild
//! - **Watch**: rebuilds the store when snippet files change on disk
//!
//! # Example
//!
//! ```
//! use taikou_snippets::{complete_line, SnippetFile, SnippetIndex};
//!
//! let index = SnippetIndex::build(vec![SnippetFile::new(
//!     "keywords.snippet",
//!     "#t=Wait\n#g=wait\nWait($1)\n",
//! )]);
//!
//! let set = complete_line(&index, "wa");
//! assert!(set.is_incomplete);
//! assert_eq!(set.candidates[0].filter_text, "wait");
//! ```

pub mod error;
pub mod header;
pub mod index;
pub mod parser;
pub mod query;
pub mod source;
pub mod store;
pub mod watch;

// Re-export main types for convenience
pub use error::{Result, SnippetError};
pub use header::is_event_file;
pub use index::{file_priority, sort_load_order, IndexEntry, SnippetFile, SnippetIndex, DEFAULT_LOAD_ORDER};
pub use parser::{parse_snippets, SnippetRecord};
pub use query::{
    complete_line, extract_prefix, query, rank_triggers, Candidate, CompletionSet, Prefix, TokenSpan,
};
pub use source::{load_snippet_dir, read_snippet_dir, SnippetConfig, DEFAULT_EXTENSION};
pub use store::SnippetStore;
pub use watch::SnippetWatcher;
