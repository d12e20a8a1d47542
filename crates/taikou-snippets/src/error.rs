use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures the snippet core can observe while loading or watching a source directory.
///
/// None of these are fatal: callers log them and fall back to an empty or
/// partial index.
#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("snippet directory {} is unavailable: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read snippet file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to watch snippet directory {}: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

pub type Result<T> = std::result::Result<T, SnippetError>;
