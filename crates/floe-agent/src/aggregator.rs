//! Folds decoded stream events into one [`AggregatedResult`].
//!
//! The fold is an explicit accumulator threaded through the event sequence,
//! independent of any transport: `Accumulator::new()` → `apply` per event →
//! `finish`. The transport client drives it over a live byte stream; tests
//! drive it over canned lines.

use serde_json::Value;
use tracing::{debug, warn};

use floe_core::result::{AggregatedResult, Diagnostics};
use floe_core::stream::StreamEvent;

use crate::sse::decode_line;

/// Substituted when tools ran but produced no text, SQL, or suggestions.
const TOOLS_NO_ANSWER: &str = "I used my tools but didn't find a specific answer or SQL query.";

/// Deployment-specific post-processing applied to the finished result.
///
/// When the final text opens with the apology marker (case-insensitive), any
/// SQL or suggestions are dropped: an apologizing model did not produce a
/// trustworthy query. A configured redirect additionally replaces the answer
/// text; without one the apology text itself is kept.
#[derive(Clone, Debug)]
pub struct ResponsePolicy {
    pub apology_marker: String,
    pub redirect: Option<String>,
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self {
            apology_marker: "i apologize".into(),
            redirect: None,
        }
    }
}

impl ResponsePolicy {
    pub fn with_redirect(redirect: impl Into<String>) -> Self {
        Self {
            redirect: Some(redirect.into()),
            ..Self::default()
        }
    }

    fn apply(&self, result: &mut AggregatedResult) {
        let opening = result.text.trim().to_lowercase();
        if !opening.starts_with(&self.apology_marker.to_lowercase()) {
            return;
        }
        debug!("apology opening detected; dropping sql and suggestions");
        result.sql.clear();
        result.suggestions.clear();
        if let Some(redirect) = &self.redirect {
            result.text = redirect.clone();
        }
    }
}

/// Running totals for one streamed response.
#[derive(Debug, Default)]
pub struct Accumulator {
    text: String,
    tool_use: Vec<Value>,
    tool_results: Vec<Value>,
    other: Vec<Value>,
    errors: Vec<floe_core::stream::StreamError>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one decoded event into the running totals.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Message(content) => {
                self.text.push_str(&content.text);
                self.tool_use.extend(content.tool_use);
                self.tool_results.extend(content.tool_results);
            }
            StreamEvent::Other { payload } => self.other.push(payload),
            StreamEvent::Error(err) => self.errors.push(err),
            StreamEvent::NonJson { raw } => {
                warn!(line = %raw, "dropping non-JSON stream line");
            }
            StreamEvent::Done | StreamEvent::Skip => {}
        }
    }

    /// Decode one raw transport line and fold it.
    pub fn apply_line(&mut self, line: &str) {
        self.apply(decode_line(line));
    }

    /// Freeze the totals into the final result.
    ///
    /// Runs extraction over the accumulated tool results (SQL and suggestions
    /// are last-write-wins in stream order), selects the final text, then
    /// applies the response policy.
    pub fn finish(self, policy: &ResponsePolicy) -> AggregatedResult {
        let mut sql = String::new();
        let mut suggestions: Vec<String> = Vec::new();
        let mut suggestion_text: Option<String> = None;

        for item in &self.tool_results {
            let Some(content) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for block in content {
                let Some(json) = block.get("json").and_then(Value::as_object) else {
                    continue;
                };
                if let Some(s) = json.get("sql").and_then(Value::as_str) {
                    sql = s.to_string();
                }
                if let Some(list) = json.get("suggestions").and_then(Value::as_array) {
                    suggestions.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
                    if let Some(text) = json.get("text").and_then(Value::as_str) {
                        suggestion_text = Some(text.to_string());
                    }
                }
            }
        }

        let text = if let Some(accompanying) = suggestion_text {
            // Text that arrived alongside suggestions beats the running text.
            accompanying
        } else if sql.is_empty()
            && suggestions.is_empty()
            && self.text.is_empty()
            && !self.tool_use.is_empty()
            && self.errors.is_empty()
        {
            TOOLS_NO_ANSWER.to_string()
        } else {
            self.text
        };

        if !self.errors.is_empty() {
            warn!(count = self.errors.len(), "in-stream errors recorded while aggregating");
        }

        let mut result = AggregatedResult {
            text,
            sql,
            suggestions,
            diagnostics: Diagnostics {
                tool_use: self.tool_use,
                errors: self.errors,
            },
        };
        policy.apply(&mut result);
        result
    }
}
