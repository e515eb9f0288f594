use serde::Serialize;
use serde_json::Value;

use crate::stream::StreamError;

/// Terminal output of aggregating one streamed agent response.
///
/// Created empty at stream start, mutated only by the aggregator while
/// consuming events, and frozen once returned.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AggregatedResult {
    /// Free-text answer selected by the final text policy.
    pub text: String,
    /// Generated SQL, or empty if the agent produced none.
    pub sql: String,
    /// Follow-up question suggestions, stream order preserved.
    pub suggestions: Vec<String>,
    /// Tool activity and in-band errors observed while streaming.
    pub diagnostics: Diagnostics,
}

impl AggregatedResult {
    pub fn has_sql(&self) -> bool {
        !self.sql.is_empty()
    }
}

/// Informational records accumulated across the stream. In-band errors are
/// recorded here; they never blank out `text` or `sql` on their own.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Diagnostics {
    pub tool_use: Vec<Value>,
    pub errors: Vec<StreamError>,
}
