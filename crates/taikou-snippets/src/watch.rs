//! Live reload of the snippet directory
//!
//! Uses `notify` through `notify-debouncer-mini` so that an editor saving a
//! file in several steps causes a single rebuild.

use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use tracing::{debug, info, warn};

use crate::error::{Result, SnippetError};
use crate::store::SnippetStore;

/// Debounce window for bursts of file events.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Rebuilds a [`SnippetStore`] whenever a snippet file in its directory changes.
///
/// Watching stops when this value is dropped.
pub struct SnippetWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl SnippetWatcher {
    /// Watch the store's configured directory.
    pub fn spawn(store: Arc<SnippetStore>) -> Result<Self> {
        Self::spawn_with_debounce(store, DEFAULT_DEBOUNCE)
    }

    pub fn spawn_with_debounce(store: Arc<SnippetStore>, debounce: Duration) -> Result<Self> {
        let config = store.config();
        let dir = config.dir.clone();

        let handler_store = Arc::clone(&store);
        let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let config = handler_store.config();
                    let relevant = events.iter().any(|e| config.is_snippet_path(&e.path));
                    debug!(events = events.len(), relevant, "snippet directory changed");
                    if relevant {
                        let entries = handler_store.rebuild();
                        info!(entries, "reloaded snippets after file change");
                    }
                }
                Err(err) => warn!("snippet watcher error: {err}"),
            }
        })
        .map_err(|source| SnippetError::Watch {
            path: dir.clone(),
            source,
        })?;

        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| SnippetError::Watch {
                path: dir.clone(),
                source,
            })?;

        info!(dir = %dir.display(), "watching snippet directory");
        Ok(Self {
            _debouncer: debouncer,
        })
    }
}
