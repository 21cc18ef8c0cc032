//! Line-level rule predicates (spec.md section 4.3).

use crate::signature::CellSignature;
use crate::tokens::{find_aggregation_phrase, is_null_equivalent, looks_like_enumerated_footnote, starts_with_footnote_keyword};

/// Everything a line-rule predicate needs about the row under evaluation
/// and its position in the walk. Built fresh per candidate row by the
/// extractor (spec.md section 4.4); the line rules never reach back into
/// the grid themselves.
pub struct LineContext<'a> {
    pub cells: &'a [CellSignature],
    /// True while the extractor has not yet locked in a first data line
    /// for the current table — several rules only make sense before FDL.
    pub fdl_not_yet_found: bool,
    /// True when at least one row below this one is already accepted as
    /// context/data, so "what follows" rules (e.g. `NO_SUMMARY_BELOW`)
    /// have something to look at.
    pub has_context_below: bool,
    pub row_index: usize,
}

fn non_empty_cells<'a>(ctx: &'a LineContext<'a>) -> impl Iterator<Item = &'a CellSignature> {
    ctx.cells.iter().filter(|c| !c.is_empty())
}

fn parse_numeric(cell: &CellSignature) -> Option<f64> {
    if !cell.is_number {
        return None;
    }
    cell.value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect::<String>()
        .parse()
        .ok()
}

fn numeric_values(ctx: &LineContext) -> Vec<f64> {
    ctx.cells.iter().filter_map(parse_numeric).collect()
}

fn longest_arithmetic_run(values: &[f64]) -> usize {
    if values.len() < 2 {
        return values.len();
    }
    let mut best = 1;
    let mut current = 1;
    let mut current_step = None;
    for w in values.windows(2) {
        let step = w[1] - w[0];
        let continues = current_step.is_some_and(|s: f64| (s - step).abs() < 1e-9);
        current = if continues { current + 1 } else { 2 };
        current_step = Some(step);
        best = best.max(current);
    }
    best
}

/// Evaluates the `line.data` rule catalogue.
pub fn evaluate_line_data(ctx: &LineContext) -> Vec<&'static str> {
    let mut fired = Vec::new();

    if ctx.cells.is_empty() {
        return fired;
    }

    if ctx.fdl_not_yet_found && ctx.cells.first().is_some_and(|c| !c.is_empty()) {
        fired.push("UP_TO_FIRST_COLUMN_COMPLETE_CONSISTENTLY");
    }

    let has_aggregate_token = ctx
        .cells
        .first()
        .is_some_and(|c| find_aggregation_phrase(&c.value).is_some());
    let has_numeric = ctx.cells.iter().any(|c| c.is_number);

    if has_aggregate_token && !has_numeric {
        fired.push("AGGREGATION_ON_ROW_WO_NUMERIC");
    }

    let values = numeric_values(ctx);
    if has_aggregate_token && values.len() >= 2 && longest_arithmetic_run(&values) == values.len() {
        fired.push("AGGREGATION_ON_ROW_W_ARITH_SEQUENCE");
    }

    if ctx.cells.first().is_some_and(|c| c.is_aggregate) {
        fired.push("AGGREGATION_TOKEN_IN_FIRST_VALUE_OF_ROW");
    }

    if ctx.cells.iter().any(|c| c.is_number && !c.is_empty()) {
        fired.push("CONTAINS_DATATYPE_CELL_VALUE");
    }

    fired
}

fn is_slug_or_snake(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

const HEADER_KEYWORDS: &[&str] = &["table", "source", "note", "year", "total", "name", "category"];

/// Evaluates the `line.not_data` rule catalogue.
pub fn evaluate_line_not_data(ctx: &LineContext) -> Vec<&'static str> {
    let mut fired = Vec::new();

    if ctx.cells.is_empty() {
        return fired;
    }

    let filled: Vec<&CellSignature> = non_empty_cells(ctx).collect();
    if filled.is_empty() {
        return fired;
    }

    if filled.iter().all(|c| is_slug_or_snake(&c.value)) {
        fired.push("CONSISTENTLY_SLUG_OR_SNAKE");
    }

    if filled.iter().all(|c| c.case == crate::signature::CaseClass::AllCaps) {
        fired.push("CONSISTENTLY_UPPER_CASE");
    }

    let token_count: usize = filled.iter().map(|c| c.token_length).sum();
    if filled.len() <= 2 && token_count >= 3 {
        fired.push("METADATA_LIKE_ROW");
    }

    if filled.iter().any(|c| {
        let lower = c.value.to_lowercase();
        HEADER_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }) {
        fired.push("METADATA_TABLE_HEADER_KEYWORDS");
    }

    let values = numeric_values(ctx);
    let longest_run = longest_arithmetic_run(&values);
    for (min_run, name) in [
        (2, "ADJACENT_ARITHMETIC_SEQUENCE_2"),
        (3, "ADJACENT_ARITHMETIC_SEQUENCE_3"),
        (4, "ADJACENT_ARITHMETIC_SEQUENCE_4"),
        (5, "ADJACENT_ARITHMETIC_SEQUENCE_5"),
        (6, "ADJACENT_ARITHMETIC_SEQUENCE_6"),
    ] {
        if longest_run >= min_run {
            fired.push(name);
        }
    }

    let range_pair_count = filled
        .iter()
        .filter(|c| c.value.contains('-') || c.value.to_lowercase().contains(" to "))
        .count();
    if range_pair_count == 1 {
        fired.push("RANGE_PAIRS_1");
    } else if range_pair_count >= 2 {
        fired.push("RANGE_PAIRS_2_PLUS");
    }

    let mut seen = std::collections::HashSet::new();
    let partial_repeats = filled
        .iter()
        .filter(|c| c.char_length >= 2 && !seen.insert(c.value.clone()))
        .count();
    if partial_repeats >= 1 {
        fired.push("PARTIALLY_REPEATING_VALUES_LENGTH_2_PLUS");
    }

    if ctx.cells.first().is_some_and(|c| c.is_null_equivalent) {
        fired.push("STARTS_WITH_NULL");
    }

    if !ctx.has_context_below {
        fired.push("NO_SUMMARY_BELOW");
    }

    if filled.iter().any(|c| starts_with_footnote_keyword(&c.value) || looks_like_enumerated_footnote(&c.value)) {
        fired.push("FOOTNOTE");
    }

    let null_equivalent_count = ctx.cells.iter().filter(|c| !c.is_empty() && is_null_equivalent(&c.value)).count();
    if null_equivalent_count == 1 {
        fired.push("ONE_NULL_EQUIVALENT_ON_LINE");
    } else if null_equivalent_count >= 2 {
        fired.push("NULL_EQUIVALENT_ON_LINE_2_PLUS");
    }

    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::params::Parameters;
    use crate::signature::SignatureTable;

    fn row_cells(values: &[&str]) -> Vec<CellSignature> {
        let grid = Grid::from_rows(vec![values.iter().map(|v| v.to_string()).collect()]).unwrap();
        let table = SignatureTable::build(&grid, &Parameters::default());
        (0..values.len()).map(|c| table.cell(0, c).clone()).collect()
    }

    #[test]
    fn header_row_fires_slug_and_upper_case_rules() {
        let cells = row_cells(&["CITY", "POPULATION"]);
        let ctx = LineContext {
            cells: &cells,
            fdl_not_yet_found: true,
            has_context_below: true,
            row_index: 0,
        };
        let fired = evaluate_line_not_data(&ctx);
        assert!(fired.contains(&"CONSISTENTLY_UPPER_CASE"));
    }

    #[test]
    fn data_row_contains_datatype_cell_value() {
        let cells = row_cells(&["Paris", "2148000"]);
        let ctx = LineContext {
            cells: &cells,
            fdl_not_yet_found: false,
            has_context_below: true,
            row_index: 3,
        };
        assert!(evaluate_line_data(&ctx).contains(&"CONTAINS_DATATYPE_CELL_VALUE"));
    }

    #[test]
    fn aggregation_row_without_numeric_fires() {
        let cells = row_cells(&["Total", ""]);
        let ctx = LineContext {
            cells: &cells,
            fdl_not_yet_found: false,
            has_context_below: false,
            row_index: 5,
        };
        let fired = evaluate_line_data(&ctx);
        assert!(fired.contains(&"AGGREGATION_ON_ROW_WO_NUMERIC"));
    }

    #[test]
    fn footnote_row_detected() {
        let cells = row_cells(&["Note: values are estimates"]);
        let ctx = LineContext {
            cells: &cells,
            fdl_not_yet_found: false,
            has_context_below: false,
            row_index: 6,
        };
        assert!(evaluate_line_not_data(&ctx).contains(&"FOOTNOTE"));
    }

    #[test]
    fn empty_row_yields_no_rules() {
        let cells = row_cells(&["", ""]);
        let ctx = LineContext {
            cells: &cells,
            fdl_not_yet_found: true,
            has_context_below: true,
            row_index: 0,
        };
        assert!(evaluate_line_data(&ctx).is_empty());
        assert!(evaluate_line_not_data(&ctx).is_empty());
    }
}
