//! Cell-level rule predicates (spec.md section 4.3).

use crate::context::{ColumnSummary, RunLength};
use crate::signature::{CaseClass, CellSignature, CharClass};

fn char_count_over(candidate: &CellSignature, summary: &ColumnSummary, fraction: f64) -> bool {
    match summary.length_max {
        Some(max) if max > 0 => candidate.char_length as f64 >= fraction * max as f64,
        _ => false,
    }
}

fn char_count_under(candidate: &CellSignature, summary: &ColumnSummary, fraction: f64) -> bool {
    match summary.length_min {
        Some(min) if min > 0 => candidate.char_length as f64 <= fraction * min as f64,
        _ => false,
    }
}

fn is_digit_like(class: CharClass) -> bool {
    matches!(class, CharClass::Digit | CharClass::NumericCanonical)
}

/// A cell normalized by `normalize_decimals` collapses to a single
/// `NumericCanonical` run rather than `Digit` (signature.rs), so both
/// classes count as "a run of digits" for these rules.
fn train_is_single_digit_run(train: &[(CharClass, u32)], exact_length: Option<u32>, min_length: Option<u32>) -> bool {
    match train {
        [(class, n)] if is_digit_like(*class) => {
            exact_length.is_none_or(|len| *n == len) && min_length.is_none_or(|min| *n >= min)
        }
        _ => false,
    }
}

/// Evaluates every `cell.data` rule against one candidate cell and the
/// summary of the vertical window around it, returning the ids of the
/// rules that fired. An empty candidate or a window with no evidence
/// (`summary_strength == 0`) yields an empty set rather than an error
/// (spec.md section 7: missing context is tolerated, not an error).
pub fn evaluate_cell_data(candidate: &CellSignature, summary: &ColumnSummary) -> Vec<&'static str> {
    let mut fired = Vec::new();

    if candidate.is_empty() || summary.summary_strength == 0 {
        return fired;
    }

    if let [(class, RunLength::Exact(width))] = summary.pattern.as_slice() {
        if is_digit_like(*class) && train_is_single_digit_run(&candidate.train, Some(*width), None) {
            fired.push("CONSISTENT_NUMERIC_WIDTH");
        }
    }

    if summary.consistent_symbol_sets
        && summary.symbol_summary.len() >= 2
        && candidate.symbols == summary.symbol_summary
    {
        fired.push("CONSISTENT_SC_TWO_OR_MORE");
    }

    if matches!(summary.pattern.first(), Some((c, RunLength::Exact(1))) if is_digit_like(*c))
        && matches!(candidate.train.first(), Some((c, 1)) if is_digit_like(*c))
    {
        fired.push("FW_D1");
    }

    if matches!(summary.bw_pattern.first(), Some((c, RunLength::Exact(1))) if is_digit_like(*c))
        && matches!(candidate.bw_train.first(), Some((c, 1)) if is_digit_like(*c))
    {
        fired.push("BW_D1");
    }

    if train_is_single_digit_run(&candidate.train, Some(4), None) {
        fired.push("D4");
    }

    if train_is_single_digit_run(&candidate.train, None, Some(5)) {
        fired.push("D5PLUS");
    }

    if candidate.char_length >= 4 && summary.length_min.unwrap_or(0) >= 4 {
        fired.push("LENGTH_4PLUS");
    }

    if summary.case_summary == CaseClass::AllCaps && candidate.case == CaseClass::AllCaps {
        fired.push("CASE_SUMMARY_CAPS");
    }

    if summary.length_min.is_some()
        && summary.length_min == summary.length_max
        && summary.length_min == Some(candidate.char_length)
    {
        fired.push("CONSISTENT_CHAR_LENGTH");
    }

    if candidate.token_length <= 1
        && summary.case_summary != CaseClass::Mixed
        && summary.case_summary != CaseClass::None
        && candidate.case == summary.case_summary
    {
        fired.push("CONSISTENT_SINGLE_WORD_CONSISTENT_CASE");
    }

    for (fraction, name) in [
        (0.9, "CHAR_COUNT_OVER_POINT9_MAX"),
        (0.8, "CHAR_COUNT_OVER_POINT8_MAX"),
        (0.7, "CHAR_COUNT_OVER_POINT7_MAX"),
        (0.6, "CHAR_COUNT_OVER_POINT6_MAX"),
        (0.5, "CHAR_COUNT_OVER_POINT5_MAX"),
    ] {
        if char_count_over(candidate, summary, fraction) {
            fired.push(name);
        }
    }

    let value_repeats = summary.value_repeats.get(&candidate.value).copied().unwrap_or(0);
    if value_repeats == 1 {
        fired.push("VALUE_REPEATS_ONCE_BELOW");
    } else if value_repeats >= 2 {
        fired.push("VALUE_REPEATS_TWICE_OR_MORE_BELOW");
    }

    if candidate.tokens.len() >= 2 {
        let max_token_repeat = candidate
            .tokens
            .iter()
            .filter_map(|tok| summary.token_repeats.get(tok))
            .copied()
            .max()
            .unwrap_or(0);
        if max_token_repeat == 1 {
            fired.push("ALPHA_TOKEN_REPEATS_ONCE_BELOW");
        } else if max_token_repeat >= 2 {
            fired.push("ALPHA_TOKEN_REPEATS_TWICE_OR_MORE_BELOW");
        }
    }

    fired
}

/// Evaluates every `cell.not_data` rule. Per the grounding in
/// `collect_line_rules`/`predict_subheaders` in the original implementation,
/// this is skipped entirely when the window has no evidence, or when both
/// the window and the candidate are already unambiguously numeric (nothing
/// to disagree about).
pub fn evaluate_cell_not_data(candidate: &CellSignature, summary: &ColumnSummary) -> Vec<&'static str> {
    let mut fired = Vec::new();

    if candidate.is_empty() || summary.summary_strength == 0 {
        return fired;
    }
    if summary.all_numeric && candidate.is_number {
        return fired;
    }

    if let (Some((sc, _)), Some((cc, _))) = (summary.pattern.first(), candidate.train.first()) {
        if sc != cc {
            fired.push("First_FW_Symbol_disagrees");
        }
    }

    if summary.symbol_summary.len() == 1
        && summary.symbol_summary.iter().next().is_some_and(|c| is_digit_like(*c))
        && !candidate.is_number
    {
        fired.push("CONSISTENT_NUMERIC");
    }

    if summary.pattern.len() >= 2
        && is_digit_like(summary.pattern[0].0)
        && !is_digit_like(summary.pattern[1].0)
    {
        let candidate_matches = candidate.train.len() >= 2
            && is_digit_like(candidate.train[0].0)
            && candidate.train[1].0 == summary.pattern[1].0;
        if !candidate_matches {
            fired.push("CONSISTENT_D_STAR");
        }
    }

    if summary.pattern.len() >= 2
        && is_digit_like(summary.pattern[0].0)
        && !candidate.train.first().is_some_and(|(c, _)| is_digit_like(*c))
    {
        fired.push("FW_SUMMARY_D");
    }

    if summary.bw_pattern.len() >= 2
        && is_digit_like(summary.bw_pattern[0].0)
        && !candidate.bw_train.first().is_some_and(|(c, _)| is_digit_like(*c))
    {
        fired.push("BW_SUMMARY_D");
    }

    if summary.all_numeric && !candidate.is_number {
        fired.push("BROAD_NUMERIC");
    }

    if char_count_under(candidate, summary, 0.1) {
        fired.push("CHAR_COUNT_UNDER_POINT1_MIN");
    }
    if char_count_under(candidate, summary, 0.3) {
        fired.push("CHAR_COUNT_UNDER_POINT3_MIN");
    }

    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::params::Parameters;
    use crate::signature::SignatureTable;

    fn signatures(values: &[&str]) -> Vec<CellSignature> {
        let grid = Grid::from_rows(values.iter().map(|v| vec![v.to_string()]).collect()).unwrap();
        let table = SignatureTable::build(&grid, &Parameters::default());
        (0..values.len()).map(|r| table.cell(r, 0).clone()).collect()
    }

    #[test]
    fn consistent_numeric_width_fires_on_matching_digit_run() {
        let cells = signatures(&["123", "456", "789"]);
        let summary = ColumnSummary::from_window(&cells.iter().collect::<Vec<_>>());
        let fired = evaluate_cell_data(&cells[0], &summary);
        assert!(fired.contains(&"CONSISTENT_NUMERIC_WIDTH"));
    }

    #[test]
    fn first_fw_symbol_disagrees_when_header_breaks_pattern() {
        let data_cells = signatures(&["123", "456", "789"]);
        let summary = ColumnSummary::from_window(&data_cells.iter().collect::<Vec<_>>());
        let header_cells = signatures(&["name"]);
        let fired = evaluate_cell_not_data(&header_cells[0], &summary);
        assert!(fired.contains(&"First_FW_Symbol_disagrees"));
        assert!(fired.contains(&"CONSISTENT_NUMERIC"));
    }

    #[test]
    fn no_evidence_yields_empty_firing_sets() {
        let cells = signatures(&[""]);
        let summary = ColumnSummary::default();
        assert!(evaluate_cell_data(&cells[0], &summary).is_empty());
        assert!(evaluate_cell_not_data(&cells[0], &summary).is_empty());
    }

    #[test]
    fn both_numeric_skips_not_data_evaluation() {
        let cells = signatures(&["1", "2", "3"]);
        let summary = ColumnSummary::from_window(&cells.iter().collect::<Vec<_>>());
        assert!(summary.all_numeric);
        let fired = evaluate_cell_not_data(&cells[0], &summary);
        assert!(fired.is_empty());
    }
}
