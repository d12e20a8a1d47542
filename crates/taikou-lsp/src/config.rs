use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use taikou_snippets::SnippetConfig;

/// Name of the snippet directory shipped next to the server binary.
const DEFAULT_SNIPPETS_DIR: &str = "everedit";

/// Options a client may pass in `initializationOptions`
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializationOptions {
    pub snippets_dir: Option<PathBuf>,
    pub compiler_path: Option<String>,
    pub load_order: Option<Vec<String>>,
    pub snippet_extension: Option<String>,
}

/// Effective server configuration.
///
/// Values given on the command line are pinned and win over anything the
/// client sends later.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub snippets: SnippetConfig,
    pub compiler_path: Option<PathBuf>,
    pinned_snippets_dir: bool,
    pinned_compiler: bool,
}

impl ServerConfig {
    pub fn from_cli(snippets_dir: Option<PathBuf>, compiler: Option<PathBuf>) -> Self {
        Self {
            pinned_snippets_dir: snippets_dir.is_some(),
            pinned_compiler: compiler.is_some(),
            snippets: SnippetConfig::new(snippets_dir.unwrap_or_else(default_snippets_dir)),
            compiler_path: compiler,
        }
    }

    pub fn apply_initialization_options(&mut self, options: InitializationOptions) {
        if let Some(dir) = options.snippets_dir {
            if !self.pinned_snippets_dir {
                self.snippets.dir = dir;
            }
        }
        if let Some(order) = options.load_order {
            self.snippets.load_order = order;
        }
        if let Some(extension) = options.snippet_extension {
            self.snippets.extension = extension;
        }
        if let Some(path) = options.compiler_path {
            self.set_compiler_path(&path);
        }
    }

    /// Update the compiler from a client setting; an empty string clears it.
    pub fn set_compiler_path(&mut self, path: &str) {
        if self.pinned_compiler {
            return;
        }
        let path = path.trim();
        self.compiler_path = (!path.is_empty()).then(|| PathBuf::from(path));
    }
}

/// Read `taikou5.compilerPath` out of a `workspace/didChangeConfiguration` payload.
///
/// Clients send either a nested `{ "taikou5": { "compilerPath": .. } }` or the
/// flat dotted key.
pub fn compiler_path_setting(settings: &Value) -> Option<&str> {
    settings
        .get("taikou5")
        .and_then(|section| section.get("compilerPath"))
        .or_else(|| settings.get("taikou5.compilerPath"))
        .and_then(Value::as_str)
}

fn default_snippets_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_SNIPPETS_DIR)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNIPPETS_DIR))
}
