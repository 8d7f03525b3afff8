//! Push channel message envelope.
//!
//! The server sends JSON text frames shaped as
//! `{"event": "<name>", "data": {...}}`. The envelope is decoded here; the
//! `data` payload stays untyped until a subscribed handler interprets it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named event with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl ChannelMessage {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Parse a text frame into a channel message.
///
/// Returns `Err` for malformed JSON or a missing `event` name. Callers drop
/// and log such frames.
pub fn parse_message(text: &str) -> Result<ChannelMessage, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_jobupdate_message() {
        let text = r#"{"event":"jobupdate","data":{"id":5,"status":"done"}}"#;
        let msg = parse_message(text).unwrap();
        assert_eq!(msg.event, "jobupdate");
        assert_eq!(msg.data, json!({"id": 5, "status": "done"}));
    }

    #[test]
    fn test_parse_message_without_data() {
        let msg = parse_message(r#"{"event":"ping"}"#).unwrap();
        assert_eq!(msg.event, "ping");
        assert!(msg.data.is_null());
    }

    #[test]
    fn test_parse_message_without_event_fails() {
        assert!(parse_message(r#"{"data":{"id":1}}"#).is_err());
    }

    #[test]
    fn test_parse_invalid_json_fails() {
        assert!(parse_message("not json at all").is_err());
    }
}
