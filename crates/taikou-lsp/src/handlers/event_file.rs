use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::Url;

/// Server-to-client notification telling the editor whether a document is an
/// event source file, so it can show or hide the compile action.
pub enum EventFileNotification {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFileParams {
    pub uri: Url,
    pub is_event_file: bool,
}

impl Notification for EventFileNotification {
    type Params = EventFileParams;
    const METHOD: &'static str = "taikou5/eventFile";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_wire_shape() {
        let params = EventFileParams {
            uri: Url::parse("file:///scripts/event.txt").unwrap(),
            is_event_file: true,
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "uri": "file:///scripts/event.txt", "isEventFile": true })
        );
    }
}
