//! SSE line decoding for the agent's event stream.
//!
//! Each logical message arrives as one line prefixed `data: `, JSON-encoded,
//! with a literal `[DONE]` sentinel ending the stream. Decoding is total: a
//! malformed line becomes a recoverable event, never a stream abort.

use serde_json::Value;
use tracing::warn;

use floe_core::stream::{DeltaContent, StreamError, StreamEvent};

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";
const DELTA_OBJECT: &str = "message.delta";

/// Decode one raw line from the transport into a [`StreamEvent`].
pub fn decode_line(line: &str) -> StreamEvent {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return StreamEvent::Skip;
    };
    let payload = payload.trim();

    if payload == DONE_MARKER {
        return StreamEvent::Done;
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "failed to parse SSE data line as JSON");
            return StreamEvent::NonJson {
                raw: line.to_string(),
            };
        }
    };

    // In-band errors carry a code/message pair. They are diagnostics; the
    // caller must keep reading the remaining lines.
    if let (Some(code), Some(message)) = (scalar_field(&value, "code"), scalar_field(&value, "message")) {
        let request_id = scalar_field(&value, "request_id");
        warn!(code = %code, request_id = request_id.as_deref().unwrap_or("n/a"), "in-stream agent error");
        return StreamEvent::Error(StreamError {
            code,
            message,
            request_id,
        });
    }

    if value.get("object").and_then(Value::as_str) == Some(DELTA_OBJECT) {
        if let Some(content) = value.pointer("/delta/content").and_then(Value::as_array) {
            return StreamEvent::Message(merge_delta_content(content));
        }
    }

    StreamEvent::Other { payload: value }
}

/// Merge one event's content blocks into partial text and tool sequences.
///
/// Text fragments concatenate in order; `tool_use` / `tool_results` payloads
/// append to their sequences. Unknown block types are silently ignored so new
/// protocol block kinds cannot break older clients.
pub fn merge_delta_content(blocks: &[Value]) -> DeltaContent {
    let mut merged = DeltaContent::default();

    for block in blocks {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(Value::as_str) {
                    merged.text.push_str(text);
                }
            }
            Some("tool_use") => {
                merged
                    .tool_use
                    .push(block.get("tool_use").cloned().unwrap_or_else(empty_object));
            }
            Some("tool_results") => {
                merged
                    .tool_results
                    .push(block.get("tool_results").cloned().unwrap_or_else(empty_object));
            }
            _ => {}
        }
    }

    merged
}

/// Read a scalar field as a string. Absent, null, and empty-string values all
/// count as absent; numeric codes are rendered as their decimal form.
fn scalar_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── decode_line ──────────────────────────────────────────────────────

    #[test]
    fn decode_skips_unmarked_line() {
        assert!(matches!(decode_line("event: ping"), StreamEvent::Skip));
        assert!(matches!(decode_line(""), StreamEvent::Skip));
        assert!(matches!(decode_line(": comment"), StreamEvent::Skip));
    }

    #[test]
    fn decode_done_marker() {
        assert!(matches!(decode_line("data: [DONE]"), StreamEvent::Done));
        assert!(matches!(decode_line("data: [DONE]  "), StreamEvent::Done));
    }

    #[test]
    fn decode_non_json_is_recoverable() {
        let event = decode_line("data: this is not json");
        if let StreamEvent::NonJson { raw } = event {
            assert_eq!(raw, "data: this is not json");
        } else {
            panic!("expected NonJson, got {event:?}");
        }
    }

    #[test]
    fn decode_error_with_code_and_message() {
        let event = decode_line(
            r#"data: {"code":"390301","message":"session expired","request_id":"req-9"}"#,
        );
        if let StreamEvent::Error(err) = event {
            assert_eq!(err.code, "390301");
            assert_eq!(err.message, "session expired");
            assert_eq!(err.request_id.as_deref(), Some("req-9"));
        } else {
            panic!("expected Error, got {event:?}");
        }
    }

    #[test]
    fn decode_error_with_numeric_code() {
        let event = decode_line(r#"data: {"code":390301,"message":"session expired"}"#);
        if let StreamEvent::Error(err) = event {
            assert_eq!(err.code, "390301");
            assert!(err.request_id.is_none());
        } else {
            panic!("expected Error, got {event:?}");
        }
    }

    #[test]
    fn decode_code_without_message_is_other() {
        let event = decode_line(r#"data: {"code":"390301","object":"status"}"#);
        assert!(matches!(event, StreamEvent::Other { .. }));
    }

    #[test]
    fn decode_empty_message_is_not_error() {
        let event = decode_line(r#"data: {"code":"390301","message":""}"#);
        assert!(matches!(event, StreamEvent::Other { .. }));
    }

    #[test]
    fn decode_message_delta() {
        let event = decode_line(
            r#"data: {"object":"message.delta","delta":{"content":[{"type":"text","text":"Hello"}]}}"#,
        );
        if let StreamEvent::Message(content) = event {
            assert_eq!(content.text, "Hello");
            assert!(content.tool_use.is_empty());
        } else {
            panic!("expected Message, got {event:?}");
        }
    }

    #[test]
    fn decode_delta_without_content_is_other() {
        let event = decode_line(r#"data: {"object":"message.delta","delta":{}}"#);
        assert!(matches!(event, StreamEvent::Other { .. }));
    }

    #[test]
    fn decode_unrecognized_object_is_other() {
        let event = decode_line(r#"data: {"object":"message.done","status":"ok"}"#);
        if let StreamEvent::Other { payload } = event {
            assert_eq!(payload["object"], "message.done");
        } else {
            panic!("expected Other, got {event:?}");
        }
    }

    // ── merge_delta_content ──────────────────────────────────────────────

    #[test]
    fn merge_concatenates_text_in_order() {
        let blocks = vec![
            json!({"type": "text", "text": "Hello"}),
            json!({"type": "text", "text": " "}),
            json!({"type": "text", "text": "world"}),
        ];
        let merged = merge_delta_content(&blocks);
        assert_eq!(merged.text, "Hello world");
    }

    #[test]
    fn merge_appends_tool_blocks_in_order() {
        let blocks = vec![
            json!({"type": "tool_use", "tool_use": {"name": "analyst", "input": {}}}),
            json!({"type": "tool_results", "tool_results": {"content": [{"json": {"sql": "SELECT 1"}}]}}),
            json!({"type": "tool_use", "tool_use": {"name": "search"}}),
        ];
        let merged = merge_delta_content(&blocks);
        assert_eq!(merged.tool_use.len(), 2);
        assert_eq!(merged.tool_use[0]["name"], "analyst");
        assert_eq!(merged.tool_use[1]["name"], "search");
        assert_eq!(merged.tool_results.len(), 1);
    }

    #[test]
    fn merge_ignores_unknown_block_types() {
        let blocks = vec![
            json!({"type": "text", "text": "kept"}),
            json!({"type": "chart", "chart": {"spec": "..."}}),
            json!({"no_type_at_all": true}),
        ];
        let merged = merge_delta_content(&blocks);
        assert_eq!(merged.text, "kept");
        assert!(merged.tool_use.is_empty());
        assert!(merged.tool_results.is_empty());
    }

    #[test]
    fn merge_tool_block_missing_payload_yields_empty_object() {
        let blocks = vec![json!({"type": "tool_use"})];
        let merged = merge_delta_content(&blocks);
        assert_eq!(merged.tool_use.len(), 1);
        assert!(merged.tool_use[0].as_object().unwrap().is_empty());
    }

    #[test]
    fn merge_empty_content() {
        let merged = merge_delta_content(&[]);
        assert!(merged.is_empty());
    }
}
