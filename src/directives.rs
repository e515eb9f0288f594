/// Inline flags a user can embed anywhere in their question.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Directives {
    /// Show the generated SQL alongside the answer.
    pub show_sql: bool,
    /// Render a chart from the query results.
    pub want_chart: bool,
}

/// Strip `/sql` and `/chart` flags out of a prompt.
///
/// Flags may appear anywhere in the text and are removed wherever they
/// occur; the remainder is whitespace-trimmed.
pub fn strip_directives(prompt: &str) -> (String, Directives) {
    let mut directives = Directives::default();
    let mut remainder = prompt.to_string();

    if remainder.contains("/sql") {
        directives.show_sql = true;
        remainder = remainder.replace("/sql", "");
    }
    if remainder.contains("/chart") {
        directives.want_chart = true;
        remainder = remainder.replace("/chart", "");
    }

    (remainder.trim().to_string(), directives)
}
