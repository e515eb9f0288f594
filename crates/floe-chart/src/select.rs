//! Rule-based chart selection.
//!
//! Rules are tried in a fixed order on the effective column kinds: time
//! series first, then pie, bar, and scatter. Text columns whose every value
//! parses as a date or timestamp are treated as datetime for the duration of
//! selection; the input table is never mutated.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use floe_core::table::{Column, ColumnKind, TabularResult};

use crate::spec::ChartSpec;

/// Categories a pie can legibly display.
const PIE_MIN_CATEGORIES: usize = 2;
const PIE_MAX_CATEGORIES: usize = 7;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Recommend a chart for a result set, or `None` when nothing fits.
pub fn select_chart(table: &TabularResult) -> Option<ChartSpec> {
    if table.is_empty() {
        return None;
    }

    let kinds: Vec<ColumnKind> = table.columns.iter().map(effective_kind).collect();

    let datetimes = positions_of(&kinds, ColumnKind::Datetime);
    let numerics = positions_of(&kinds, ColumnKind::Numeric);
    let texts = positions_of(&kinds, ColumnKind::Text);

    let name = |i: usize| table.columns[i].name.clone();

    if datetimes.len() == 1 && !numerics.is_empty() {
        return Some(ChartSpec::Line {
            x: name(datetimes[0]),
            y: name(numerics[0]),
        });
    }

    if texts.len() == 1 {
        let labels = &table.columns[texts[0]];
        if numerics.len() == 1 && pie_friendly(labels) {
            return Some(ChartSpec::Pie {
                labels: name(texts[0]),
                values: name(numerics[0]),
            });
        }
        if !numerics.is_empty() {
            return Some(ChartSpec::Bar {
                x: name(texts[0]),
                y: name(numerics[0]),
            });
        }
    }

    if numerics.len() >= 2 {
        return Some(ChartSpec::Scatter {
            x: name(numerics[0]),
            y: name(numerics[1]),
        });
    }

    None
}

fn positions_of(kinds: &[ColumnKind], wanted: ColumnKind) -> Vec<usize> {
    kinds
        .iter()
        .enumerate()
        .filter(|(_, kind)| **kind == wanted)
        .map(|(i, _)| i)
        .collect()
}

fn pie_friendly(column: &Column) -> bool {
    let distinct = column.distinct_count();
    (PIE_MIN_CATEGORIES..=PIE_MAX_CATEGORIES).contains(&distinct)
}

/// The kind a column behaves as during selection. Text columns whose values
/// all look like dates are promoted to datetime; empty ones are not.
fn effective_kind(column: &Column) -> ColumnKind {
    if column.kind == ColumnKind::Text
        && !column.values.is_empty()
        && column.values.iter().all(|v| parses_as_datetime(v))
    {
        return ColumnKind::Datetime;
    }
    column.kind
}

fn parses_as_datetime(value: &str) -> bool {
    let value = value.trim();
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    if DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
    {
        return true;
    }
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}
