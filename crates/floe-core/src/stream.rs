use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One decoded event from the agent's SSE response.
///
/// Produced line by line by the decoder and folded into an
/// [`crate::result::AggregatedResult`] by the aggregator. In-band `Error`
/// events are diagnostics; only `Done` or end of stream terminates a response.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    /// A `message.delta` payload with its content blocks merged.
    Message(DeltaContent),
    /// Well-formed JSON the decoder does not recognize.
    Other { payload: Value },
    /// In-band error reported by the remote agent.
    Error(StreamError),
    /// The `[DONE]` sentinel line.
    Done,
    /// A data line that failed JSON parsing. Recoverable; the stream continues.
    NonJson { raw: String },
    /// A line without the `data: ` marker. Ignored by the aggregator.
    Skip,
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Error payload carried inside the stream (`code` + `message` pair).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamError {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

/// Merged content fragments from a single `message.delta` event.
///
/// Text arrives as successive fragments and is concatenated in order;
/// tool activity is appended to its sequence, order preserved.
#[derive(Clone, Debug, Default)]
pub struct DeltaContent {
    pub text: String,
    pub tool_use: Vec<Value>,
    pub tool_results: Vec<Value>,
}

impl DeltaContent {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tool_use.is_empty() && self.tool_results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        assert!(StreamEvent::Done.is_terminal());
        assert!(!StreamEvent::Skip.is_terminal());
        assert!(!StreamEvent::Message(DeltaContent::default()).is_terminal());
        let err = StreamEvent::Error(StreamError {
            code: "390301".into(),
            message: "session expired".into(),
            request_id: None,
        });
        assert!(!err.is_terminal());
    }

    #[test]
    fn empty_delta_content() {
        let content = DeltaContent::default();
        assert!(content.is_empty());

        let content = DeltaContent {
            text: "hi".into(),
            ..DeltaContent::default()
        };
        assert!(!content.is_empty());
    }

    #[test]
    fn stream_error_serde() {
        let err = StreamError {
            code: "399505".into(),
            message: "internal error".into(),
            request_id: Some("req-1".into()),
        };
        let json = serde_json::to_string(&err).unwrap();
        let parsed: StreamError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, parsed);
    }
}
