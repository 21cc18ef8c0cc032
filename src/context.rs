//! Context-pattern summariser (spec.md section 4.2, ~15% of the core).
//!
//! Produces, for a vertical window of cells in one column, the pattern
//! summary, backward pattern summary, symbol-set summary, case and length
//! summaries, and the token/value repeat maps described in spec.md section
//! 3. Supports both batch construction (`from_window`) and incremental
//! extension (`extend`) — the top-down walk in the extractor grows its
//! window one row at a time and must not rebuild the summary from scratch
//! per row (spec.md section 4.2).

use std::collections::{BTreeSet, HashMap};

use crate::signature::{CaseClass, CellSignature, CharClass, Train};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLength {
    Exact(u32),
    Wildcard,
}

pub type PatternChain = Vec<(CharClass, RunLength)>;

#[derive(Debug, Clone, Default)]
pub struct ColumnSummary {
    pub pattern: PatternChain,
    pub chain_consistent: bool,
    pub bw_pattern: PatternChain,
    pub bw_chain_consistent: bool,
    pub symbol_summary: BTreeSet<CharClass>,
    pub consistent_symbol_sets: bool,
    pub case_summary: CaseClass,
    pub length_min: Option<usize>,
    pub length_max: Option<usize>,
    pub length_mode: Option<usize>,
    pub summary_strength: usize,
    pub all_numeric: bool,
    pub token_repeats: HashMap<String, usize>,
    pub value_repeats: HashMap<String, usize>,

    // Internal running state, kept so `extend` stays O(pattern length)
    // instead of replaying the whole window.
    first_train: Option<Train>,
    first_bw_train: Option<Train>,
    first_symbols: Option<BTreeSet<CharClass>>,
    first_case: Option<CaseClass>,
    case_mismatch: bool,
    length_counts: HashMap<usize, usize>,
}

/// Intersects an existing chain with one new train, truncating at the
/// first disagreement and collapsing run lengths to a wildcard wherever
/// they differ. This is the associative operation both batch construction
/// and incremental extension reduce to.
fn intersect_chain(chain: &PatternChain, train: &Train) -> PatternChain {
    let mut out = PatternChain::new();
    for (i, (class, run_len)) in chain.iter().enumerate() {
        let Some((other_class, other_len)) = train.get(i) else {
            break;
        };
        if other_class != class {
            break;
        }
        let agrees = matches!(run_len, RunLength::Exact(n) if *n == *other_len);
        out.push((
            *class,
            if agrees {
                RunLength::Exact(*other_len)
            } else {
                RunLength::Wildcard
            },
        ));
    }
    out
}

fn exact_chain(train: &Train) -> PatternChain {
    train.iter().map(|(c, n)| (*c, RunLength::Exact(*n))).collect()
}

impl ColumnSummary {
    pub fn from_window(cells: &[&CellSignature]) -> ColumnSummary {
        let mut summary = ColumnSummary::default();
        for cell in cells {
            summary.extend(cell);
        }
        summary
    }

    /// Folds one more cell's signature into the summary. `O(chain length)`.
    pub fn extend(&mut self, cell: &CellSignature) {
        if cell.is_empty() {
            return;
        }

        self.summary_strength += 1;
        self.update_pattern(cell);
        self.update_bw_pattern(cell);
        self.update_symbols(cell);
        self.update_case(cell);
        self.update_length(cell);

        *self.value_repeats.entry(cell.value.clone()).or_insert(0) += 1;
        for token in &cell.tokens {
            *self.token_repeats.entry(token.clone()).or_insert(0) += 1;
        }

        self.all_numeric = if self.summary_strength == 1 {
            cell.is_number
        } else {
            self.all_numeric && cell.is_number
        };
    }

    fn update_pattern(&mut self, cell: &CellSignature) {
        match &self.first_train {
            None => {
                self.first_train = Some(cell.train.clone());
                self.pattern = exact_chain(&cell.train);
                self.chain_consistent = true;
            }
            Some(first) => {
                if self.chain_consistent && &cell.train == first {
                    // still pairwise identical, chain already correct
                } else {
                    self.chain_consistent = false;
                    self.pattern = intersect_chain(&self.pattern, &cell.train);
                }
            }
        }
    }

    fn update_bw_pattern(&mut self, cell: &CellSignature) {
        match &self.first_bw_train {
            None => {
                self.first_bw_train = Some(cell.bw_train.clone());
                self.bw_pattern = exact_chain(&cell.bw_train);
                self.bw_chain_consistent = true;
            }
            Some(first) => {
                if self.bw_chain_consistent && &cell.bw_train == first {
                    // still pairwise identical
                } else {
                    self.bw_chain_consistent = false;
                    self.bw_pattern = intersect_chain(&self.bw_pattern, &cell.bw_train);
                }
            }
        }
    }

    fn update_symbols(&mut self, cell: &CellSignature) {
        match &self.first_symbols {
            None => {
                self.first_symbols = Some(cell.symbols.clone());
                self.symbol_summary = cell.symbols.clone();
                self.consistent_symbol_sets = true;
            }
            Some(first) => {
                if &cell.symbols != first {
                    self.consistent_symbol_sets = false;
                }
                self.symbol_summary = self
                    .symbol_summary
                    .intersection(&cell.symbols)
                    .copied()
                    .collect();
            }
        }
    }

    fn update_case(&mut self, cell: &CellSignature) {
        match self.first_case {
            None => {
                self.first_case = Some(cell.case);
                self.case_summary = cell.case;
            }
            Some(first) => {
                if cell.case != first {
                    self.case_mismatch = true;
                }
                self.case_summary = if self.case_mismatch {
                    CaseClass::Mixed
                } else {
                    first
                };
            }
        }
    }

    fn update_length(&mut self, cell: &CellSignature) {
        let len = cell.char_length;
        self.length_min = Some(self.length_min.map_or(len, |m| m.min(len)));
        self.length_max = Some(self.length_max.map_or(len, |m| m.max(len)));
        *self.length_counts.entry(len).or_insert(0) += 1;
        self.length_mode = self
            .length_counts
            .iter()
            .max_by_key(|(len, count)| (**count, std::cmp::Reverse(**len)))
            .map(|(len, _)| *len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::params::Parameters;
    use crate::signature::SignatureTable;

    fn column_cells(values: &[&str]) -> Vec<CellSignature> {
        let grid = Grid::from_rows(values.iter().map(|v| vec![v.to_string()]).collect()).unwrap();
        let table = SignatureTable::build(&grid, &Parameters::default());
        (0..values.len())
            .map(|r| table.cell(r, 0).clone())
            .collect()
    }

    #[test]
    fn incremental_matches_batch() {
        let cells = column_cells(&["alice", "bob", "carol", "42", ""]);
        let refs: Vec<&CellSignature> = cells.iter().collect();

        let batch = ColumnSummary::from_window(&refs);

        let mut incremental = ColumnSummary::default();
        for cell in &cells {
            incremental.extend(cell);
        }

        assert_eq!(batch.pattern, incremental.pattern);
        assert_eq!(batch.chain_consistent, incremental.chain_consistent);
        assert_eq!(batch.bw_pattern, incremental.bw_pattern);
        assert_eq!(batch.symbol_summary, incremental.symbol_summary);
        assert_eq!(batch.consistent_symbol_sets, incremental.consistent_symbol_sets);
        assert_eq!(batch.case_summary, incremental.case_summary);
        assert_eq!(batch.length_min, incremental.length_min);
        assert_eq!(batch.length_max, incremental.length_max);
        assert_eq!(batch.summary_strength, incremental.summary_strength);
    }

    #[test]
    fn chain_consistent_when_all_identical() {
        let cells = column_cells(&["alice", "bobby", "carol"]);
        let refs: Vec<&CellSignature> = cells.iter().collect();
        let summary = ColumnSummary::from_window(&refs);
        assert!(summary.chain_consistent);
    }

    #[test]
    fn chain_inconsistent_when_shapes_differ() {
        let cells = column_cells(&["alice", "42", "bob"]);
        let refs: Vec<&CellSignature> = cells.iter().collect();
        let summary = ColumnSummary::from_window(&refs);
        assert!(!summary.chain_consistent);
        assert!(summary.pattern.is_empty());
    }

    #[test]
    fn empty_cells_contribute_no_evidence() {
        let cells = column_cells(&["", "", ""]);
        let refs: Vec<&CellSignature> = cells.iter().collect();
        let summary = ColumnSummary::from_window(&refs);
        assert_eq!(summary.summary_strength, 0);
        assert!(summary.pattern.is_empty());
    }

    #[test]
    fn value_and_token_repeats_are_counted() {
        let cells = column_cells(&["paris", "paris", "rome"]);
        let refs: Vec<&CellSignature> = cells.iter().collect();
        let summary = ColumnSummary::from_window(&refs);
        assert_eq!(summary.value_repeats.get("paris"), Some(&2));
        assert_eq!(summary.value_repeats.get("rome"), Some(&1));
    }
}
