//! Heuristic chart selection for query result sets.

pub mod select;
pub mod spec;

pub use select::select_chart;
pub use spec::ChartSpec;
