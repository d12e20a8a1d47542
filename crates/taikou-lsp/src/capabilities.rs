use tower_lsp::lsp_types::*;

use crate::handlers::commands;

/// Define the server capabilities for the Taikou5 LSP
pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        // Full text sync - simplest to implement
        text_document_sync: Some(TextDocumentSyncCapability::Kind(
            TextDocumentSyncKind::FULL,
        )),

        // Snippet completion; results are marked incomplete so the client
        // asks again on every keystroke
        completion_provider: Some(CompletionOptions {
            resolve_provider: Some(false),
            ..Default::default()
        }),

        // Compile and reload commands
        execute_command_provider: Some(ExecuteCommandOptions {
            commands: commands::ALL.iter().map(|c| c.to_string()).collect(),
            work_done_progress_options: Default::default(),
        }),

        ..Default::default()
    }
}
