//! Shared snippet index with atomic rebuilds
//!
//! Readers take an `Arc` snapshot and keep using it for the whole request; a
//! rebuild builds the next index off to the side and publishes it with a
//! single swap, so no reader ever sees a half-built index. Rebuilds are
//! serialized so the last one to start is the last one published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use arc_swap::ArcSwap;
use tracing::debug;

use crate::index::SnippetIndex;
use crate::source::{load_snippet_dir, SnippetConfig};

pub struct SnippetStore {
    config: RwLock<SnippetConfig>,
    current: ArcSwap<SnippetIndex>,
    generation: AtomicU64,
    /// Held across read and publish in `rebuild`
    rebuild_lock: Mutex<()>,
}

impl SnippetStore {
    /// Create a store with an empty index. Nothing is read until [`rebuild`](Self::rebuild).
    pub fn new(config: SnippetConfig) -> Self {
        Self {
            config: RwLock::new(config),
            current: ArcSwap::from_pointee(SnippetIndex::default()),
            generation: AtomicU64::new(0),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// The index as of the last publish.
    pub fn snapshot(&self) -> Arc<SnippetIndex> {
        self.current.load_full()
    }

    /// Number of indexes published so far; 0 means never built.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn config(&self) -> SnippetConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Swap in a new source configuration. Takes effect on the next rebuild.
    pub fn set_config(&self, config: SnippetConfig) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }

    /// Re-read the snippet directory and publish the result.
    ///
    /// Returns the number of entries in the new index.
    pub fn rebuild(&self) -> usize {
        let _guard = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let config = self.config();
        self.publish(load_snippet_dir(&config))
    }

    /// Publish an already built index, replacing the current one.
    pub fn publish(&self, index: SnippetIndex) -> usize {
        let len = index.len();
        self.current.store(Arc::new(index));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, entries = len, "published snippet index");
        len
    }
}
