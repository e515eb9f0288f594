use serde::Serialize;

/// A chart recommendation, naming the columns each axis should draw from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    /// Time series: a datetime axis against a numeric measure.
    Line { x: String, y: String },
    /// Share-of-whole over a small set of categories.
    Pie { labels: String, values: String },
    /// Per-category measure over a larger set of categories.
    Bar { x: String, y: String },
    /// Two numeric measures plotted against each other.
    Scatter { x: String, y: String },
}
