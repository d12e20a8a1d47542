use taikou_snippets::{complete_line, Candidate, SnippetIndex};
use tower_lsp::lsp_types::*;

use crate::document::Document;

/// Language id used for code blocks in completion documentation
const SCRIPT_LANGUAGE_ID: &str = "taikou5-script";

/// Get completion items for a position in the document
pub fn get_completions(doc: &Document, position: Position, index: &SnippetIndex) -> CompletionList {
    let before_cursor = doc.line_prefix(position).unwrap_or("");
    let set = complete_line(index, before_cursor);

    CompletionList {
        is_incomplete: set.is_incomplete,
        items: set
            .candidates
            .iter()
            .map(|candidate| convert_to_lsp_completion(candidate, position.line))
            .collect(),
    }
}

/// Convert a ranked snippet candidate to an LSP completion item
fn convert_to_lsp_completion(candidate: &Candidate, line: u32) -> CompletionItem {
    // Replace exactly the detected prefix so the client's own word detection
    // cannot swallow an adjacent token of the other script
    let text_edit = candidate.replacement.map(|span| {
        CompletionTextEdit::Edit(TextEdit {
            range: Range {
                start: Position::new(line, span.start),
                end: Position::new(line, span.end),
            },
            new_text: candidate.body.clone(),
        })
    });

    CompletionItem {
        label: candidate.label.clone(),
        kind: Some(CompletionItemKind::SNIPPET),
        detail: Some(candidate.detail.clone()),
        documentation: Some(Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format_documentation(&candidate.body),
        })),
        sort_text: Some(candidate.sort_text.clone()),
        filter_text: Some(candidate.filter_text.clone()),
        insert_text: Some(candidate.body.clone()),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        text_edit,
        ..Default::default()
    }
}

fn format_documentation(body: &str) -> String {
    format!("```{}\n{}\n```", SCRIPT_LANGUAGE_ID, body)
}
