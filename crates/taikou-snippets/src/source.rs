//! Loading snippet files from a directory

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, SnippetError};
use crate::index::{SnippetFile, SnippetIndex, DEFAULT_LOAD_ORDER};

/// File name suffix of snippet definition files.
pub const DEFAULT_EXTENSION: &str = ".snippet";

/// Where snippets come from and how they are ordered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnippetConfig {
    pub dir: PathBuf,
    /// Only files whose name ends with this suffix are loaded
    pub extension: String,
    pub load_order: Vec<String>,
}

impl SnippetConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            load_order: DEFAULT_LOAD_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether a changed path should cause a rebuild.
    pub fn is_snippet_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&self.extension))
    }
}

/// Read every snippet file in `dir` whose name ends with `extension`.
///
/// A file that cannot be read is logged and skipped. Only a directory that
/// cannot be listed at all is an error.
pub fn read_snippet_dir(dir: &Path, extension: &str) -> Result<Vec<SnippetFile>> {
    let entries = fs::read_dir(dir).map_err(|source| SnippetError::SourceUnavailable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(dir = %dir.display(), "failed to list snippet directory entry: {err}, skipping");
                continue;
            }
        };
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !name.ends_with(extension) {
            continue;
        }

        let path = entry.path();
        match fs::read_to_string(&path) {
            Ok(content) => files.push(SnippetFile { name, content }),
            Err(source) => {
                let err = SnippetError::FileRead { path, source };
                warn!("{err}, skipping");
            }
        }
    }

    debug!(count = files.len(), dir = %dir.display(), "read snippet files");
    Ok(files)
}

/// Build a fresh index from the configured directory.
///
/// A missing directory gives an empty index rather than an error.
pub fn load_snippet_dir(config: &SnippetConfig) -> SnippetIndex {
    let files = match read_snippet_dir(&config.dir, &config.extension) {
        Ok(files) => files,
        Err(err) => {
            warn!("{err}, snippet completion disabled");
            return SnippetIndex::default();
        }
    };

    let index = SnippetIndex::build_with_order(files, &config.load_order);
    info!(
        entries = index.len(),
        dir = %config.dir.display(),
        "loaded unique snippets"
    );
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SnippetConfig::new("everedit");
        assert_eq!(config.extension, ".snippet");
        assert_eq!(config.load_order, vec!["fast", "script", "keywords"]);
    }

    #[test]
    fn test_is_snippet_path() {
        let config = SnippetConfig::new("everedit");
        assert!(config.is_snippet_path(Path::new("everedit/keywords.snippet")));
        assert!(!config.is_snippet_path(Path::new("everedit/keywords.snippet.bak")));
        assert!(!config.is_snippet_path(Path::new("everedit")));
    }

    #[test]
    fn test_missing_directory_is_source_unavailable() {
        let err = read_snippet_dir(Path::new("/nonexistent/taikou5/everedit"), DEFAULT_EXTENSION)
            .unwrap_err();
        assert!(matches!(err, SnippetError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_missing_directory_loads_empty() {
        let index = load_snippet_dir(&SnippetConfig::new("/nonexistent/taikou5/everedit"));
        assert!(index.is_empty());
    }
}
