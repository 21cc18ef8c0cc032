//! Combines fired rule ids into row-level confidence scores (spec.md
//! section 4.3, ~10% of the core, grounded on `max_score` /
//! `probabilistic_sum` in the original implementation).
//!
//! Three building blocks compose the whole scoring surface:
//! [`max_score`] turns one cell's or line's firing set into a single
//! number, [`probabilistic_sum`] folds several independent pieces of
//! evidence (e.g. one per column) into one row-level score, and
//! [`population_weight`] damps a column's contribution down when only a
//! handful of rows have backed it so far.

use crate::catalogue::RuleMap;
use crate::params::Parameters;

/// The largest weight among `fired` that clears `lower_bound`, or `0.0`
/// if nothing fired or nothing cleared it. A rule with no learned weight
/// (`None`, spec.md section 6 "absent") is skipped rather than treated as
/// zero, and the threshold applies to the weight itself, not the
/// confidence.
pub fn max_score(fired: &[&str], rules: &RuleMap, lower_bound: f64) -> f64 {
    fired
        .iter()
        .filter_map(|id| rules.get(*id))
        .filter_map(|entry| entry.weight)
        .filter(|weight| *weight >= lower_bound)
        .fold(0.0_f64, f64::max)
}

/// Combines independent evidence scores the way independent probabilities
/// of "at least one event occurs" combine: `1 - product(1 - s)`. A single
/// `1.0` input saturates the result to `1.0`; an empty iterator yields
/// `0.0` (no evidence at all).
pub fn probabilistic_sum(scores: impl IntoIterator<Item = f64>) -> f64 {
    1.0 - scores.into_iter().fold(1.0_f64, |acc, s| acc * (1.0 - s))
}

/// Damps a score by how much population has backed it: `1 - (1-p)^(2*strength)`
/// (spec.md section 6, `p`). A column that has only seen one or two
/// non-empty cells so far contributes less than one with a long run of
/// agreeing evidence.
pub fn population_weight(p: f64, strength: usize) -> f64 {
    1.0 - (1.0 - p).powi(2 * strength as i32)
}

/// Score for one column's vote on whether `row` is data, applying the
/// population-weight damping from `params.summary_population_factor`.
pub fn cell_column_score(raw_score: f64, summary_strength: usize, params: &Parameters) -> f64 {
    if !params.summary_population_factor || raw_score == 0.0 {
        return raw_score;
    }
    raw_score * population_weight(params.p, summary_strength)
}

/// Combines per-column cell scores (already population-weighted) and, when
/// `params.weight_input` asks for it, the line-level score, into one
/// row-level confidence. `ignore_left` only widens the column slice the
/// grid is capped to (spec.md section 6, `Grid::capped_to`); it does not
/// also skip columns here, so every column the grid retained votes.
pub fn combine_row_score(
    column_scores: &[f64],
    line_score: Option<f64>,
    params: &Parameters,
) -> f64 {
    let columns = column_scores.iter().copied();
    let with_line = match params.weight_input {
        crate::params::WeightInput::ValuesAndLines => columns.chain(line_score),
        crate::params::WeightInput::Values => columns.chain(None),
    };
    probabilistic_sum(with_line)
}

/// Null imputation (spec.md section 4.3): an empty cell contributes no
/// direct evidence, but if the row two above was accepted as an
/// aggregation row with an empty pattern in this column, an empty cell
/// here is itself weak positive evidence of "still data" rather than a
/// missing signal. Returns `None` when imputation does not apply, leaving
/// the caller to treat the column as having no vote this row.
pub fn impute_null_score(
    is_empty: bool,
    two_rows_above_is_aggregation_with_empty_pattern: bool,
    params: &Parameters,
) -> Option<f64> {
    if !is_empty || !params.impute_nulls {
        return None;
    }
    if two_rows_above_is_aggregation_with_empty_pattern {
        Some(params.weight_lower_bound)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{RuleEntry, RuleType};
    use std::collections::HashMap;

    fn rule(weight: f64, confidence: f64) -> RuleEntry {
        RuleEntry {
            weight: Some(weight),
            confidence: Some(confidence),
            coverage: 1.0,
            theme: "test".to_string(),
            name: "test".to_string(),
            rule_type: Some(RuleType::Other),
        }
    }

    #[test]
    fn max_score_picks_highest_weight_above_threshold() {
        let mut rules: RuleMap = HashMap::new();
        rules.insert("A".to_string(), rule(0.4, 0.9));
        rules.insert("B".to_string(), rule(0.9, 0.1));
        let score = max_score(&["A", "B"], &rules, 0.5);
        assert_eq!(score, 0.9);
    }

    #[test]
    fn max_score_excludes_weight_below_threshold() {
        let mut rules: RuleMap = HashMap::new();
        rules.insert("A".to_string(), rule(0.4, 0.9));
        let score = max_score(&["A"], &rules, 0.5);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn max_score_is_zero_when_nothing_fires() {
        let rules: RuleMap = HashMap::new();
        assert_eq!(max_score(&[], &rules, 0.5), 0.0);
    }

    #[test]
    fn probabilistic_sum_combines_independent_evidence() {
        let score = probabilistic_sum([0.5, 0.5]);
        assert!((score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn probabilistic_sum_of_empty_is_zero() {
        assert_eq!(probabilistic_sum(std::iter::empty()), 0.0);
    }

    #[test]
    fn population_weight_grows_with_strength() {
        let p = 0.3;
        assert!(population_weight(p, 1) < population_weight(p, 6));
    }

    #[test]
    fn null_imputation_requires_flag_and_empty_cell() {
        let params = Parameters::default();
        assert_eq!(impute_null_score(false, true, &params), None);
        assert_eq!(impute_null_score(true, false, &params), None);
        assert!(impute_null_score(true, true, &params).is_some());
    }
}
