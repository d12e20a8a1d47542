use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use taikou_snippets::{SnippetStore, SnippetWatcher};
use tokio::sync::{mpsc, Mutex, RwLock};
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::capabilities;
use crate::config::{compiler_path_setting, InitializationOptions, ServerConfig};
use crate::document::Document;
use crate::handlers;
use crate::handlers::commands;
use crate::handlers::event_file::{EventFileNotification, EventFileParams};

pub struct Backend {
    client: Client,
    documents: DashMap<Url, Document>,
    config: RwLock<ServerConfig>,
    snippets: Arc<SnippetStore>,
    watcher: Mutex<Option<SnippetWatcher>>,
    /// Most recently opened or edited document, the default compile target
    active: RwLock<Option<Url>>,
    debug: bool,
}

impl Backend {
    pub fn new(client: Client, config: ServerConfig, debug: bool) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            snippets: Arc::new(SnippetStore::new(config.snippets.clone())),
            config: RwLock::new(config),
            watcher: Mutex::new(None),
            active: RwLock::new(None),
            debug,
        }
    }

    async fn log_debug(&self, message: &str) {
        tracing::debug!("{}", message);
        if self.debug {
            self.client
                .log_message(MessageType::INFO, format!("[DEBUG] {}", message))
                .await;
        }
    }

    /// Rebuild the snippet index off the async runtime.
    async fn reload_snippets(&self) -> usize {
        let store = Arc::clone(&self.snippets);
        match tokio::task::spawn_blocking(move || store.rebuild()).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("snippet rebuild task failed: {}", e);
                self.snippets.snapshot().len()
            }
        }
    }

    async fn start_watcher(&self) {
        match SnippetWatcher::spawn(Arc::clone(&self.snippets)) {
            Ok(watcher) => *self.watcher.lock().await = Some(watcher),
            Err(e) => {
                tracing::warn!("{}", e);
                self.client
                    .log_message(MessageType::WARNING, format!("Snippet live reload disabled: {}", e))
                    .await;
            }
        }
    }

    async fn publish_event_file(&self, uri: Url, is_event_file: bool) {
        self.client
            .send_notification::<EventFileNotification>(EventFileParams { uri, is_event_file })
            .await;
    }

    async fn compile(&self, uri: Option<Url>) {
        let compiler = self.config.read().await.compiler_path.clone();

        let (lines, mut output) = mpsc::unbounded_channel();
        let forward = async {
            while let Some(line) = output.recv().await {
                self.client.log_message(MessageType::LOG, line).await;
            }
        };
        let compile = handlers::compile::compile_document(compiler.as_deref(), uri.as_ref(), lines);
        let (result, ()) = tokio::join!(compile, forward);

        match result {
            Ok(result) => {
                if result.success {
                    self.client
                        .show_message(MessageType::INFO, "Compiled to EVM")
                        .await;
                } else {
                    let code = result
                        .code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string());
                    self.client
                        .show_message(
                            MessageType::ERROR,
                            format!("Compilation failed (exit {}), see output for details", code),
                        )
                        .await;
                }
            }
            Err(e) => {
                tracing::warn!("compile failed: {}", e);
                self.client.show_message(MessageType::ERROR, e.to_string()).await;
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.log_debug("Initializing Taikou5 LSP server").await;

        if let Some(options) = params.initialization_options {
            match serde_json::from_value::<InitializationOptions>(options) {
                Ok(options) => {
                    let mut config = self.config.write().await;
                    config.apply_initialization_options(options);
                    self.snippets.set_config(config.snippets.clone());
                }
                Err(e) => tracing::warn!("ignoring invalid initializationOptions: {}", e),
            }
        }

        let entries = self.reload_snippets().await;
        self.log_debug(&format!("Loaded {} unique snippets", entries))
            .await;

        Ok(InitializeResult {
            capabilities: capabilities::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "taikou-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.start_watcher().await;
        self.client
            .log_message(MessageType::INFO, "Taikou5 LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.log_debug("Shutting down server").await;
        self.watcher.lock().await.take();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;

        self.log_debug(&format!("Document opened: {}", uri)).await;

        let document = Document::new(params.text_document.text);
        let is_event_file = document.is_event_file();
        self.documents.insert(uri.clone(), document);
        *self.active.write().await = Some(uri.clone());

        self.publish_event_file(uri, is_event_file).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        self.log_debug(&format!("Document changed: {}", uri)).await;

        let status = if let Some(mut doc) = self.documents.get_mut(&uri) {
            // Full sync: the last change holds the whole text
            let mut changed = false;
            for change in params.content_changes {
                changed |= doc.update_text(change.text);
            }
            changed.then(|| doc.is_event_file())
        } else {
            None
        }; // Release the lock before async calls

        *self.active.write().await = Some(uri.clone());

        if let Some(is_event_file) = status {
            self.publish_event_file(uri, is_event_file).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.log_debug(&format!("Document closed: {}", uri)).await;
        self.documents.remove(&uri);

        let mut active = self.active.write().await;
        if active.as_ref() == Some(&uri) {
            *active = None;
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        if let Some(path) = compiler_path_setting(&params.settings) {
            self.config.write().await.set_compiler_path(path);
            self.log_debug(&format!("Compiler path set to {:?}", path))
                .await;
        }
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let config = self.snippets.config();
        let relevant = params.changes.iter().any(|change| {
            change
                .uri
                .to_file_path()
                .map(|path| config.is_snippet_path(&path))
                .unwrap_or(false)
        });

        if relevant {
            let entries = self.reload_snippets().await;
            self.log_debug(&format!("Reloaded {} unique snippets", entries))
                .await;
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        self.log_debug(&format!("Completion request at {:?}", position))
            .await;

        let index = self.snippets.snapshot();
        if let Some(doc) = self.documents.get(uri) {
            let list = handlers::completion::get_completions(&doc, position, &index);
            Ok(Some(CompletionResponse::List(list)))
        } else {
            Ok(None)
        }
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        self.log_debug(&format!("Execute command: {}", params.command))
            .await;

        match params.command.as_str() {
            commands::COMPILE => {
                let target = match handlers::compile::target_argument(&params.arguments) {
                    Ok(Some(uri)) => Some(uri),
                    Ok(None) => self.active.read().await.clone(),
                    Err(e) => {
                        return Err(Error::invalid_params(format!(
                            "taikou5.compile expects a document URI: {}",
                            e
                        )))
                    }
                };
                self.compile(target).await;
                Ok(None)
            }
            commands::RELOAD_SNIPPETS => {
                let entries = self.reload_snippets().await;
                Ok(Some(Value::from(entries)))
            }
            other => Err(Error::invalid_params(format!("unknown command: {}", other))),
        }
    }
}
