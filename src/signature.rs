//! Signature table (spec.md section 4.1, ~20% of the core).
//!
//! Builds, for every cell of a [`Grid`](crate::grid::Grid), the derived
//! attributes listed in spec.md section 3 and exposes random-access slices
//! over vertical windows without copying the underlying strings.

use std::collections::BTreeSet;

use unicode_segmentation::UnicodeSegmentation;

use crate::grid::Grid;
use crate::params::Parameters;
use crate::tokens::{find_aggregation_phrase, is_null_equivalent, is_stopword};

/// One run of the character-class train (spec.md glossary: "Train").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CharClass {
    Digit,
    Letter,
    LetterUpper,
    LetterLower,
    Space,
    Punct(char),
    /// Collapsed representation of a `D,D` / `D.D` run when
    /// `normalize_decimals` is enabled (spec.md section 6).
    NumericCanonical,
}

pub type Train = Vec<(CharClass, u32)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseClass {
    AllCaps,
    AllLower,
    Title,
    Mixed,
    #[default]
    None,
}

/// Immutable view of one cell's derived attributes (spec.md section 3).
#[derive(Debug, Clone)]
pub struct CellSignature {
    pub value: String,
    pub train: Train,
    pub bw_train: Train,
    pub symbols: BTreeSet<CharClass>,
    pub case: CaseClass,
    pub char_length: usize,
    pub token_length: usize,
    pub tokens: Vec<String>,
    pub is_number: bool,
    pub is_aggregate: bool,
    pub is_null_equivalent: bool,
}

impl CellSignature {
    fn empty() -> CellSignature {
        CellSignature {
            value: String::new(),
            train: Vec::new(),
            bw_train: Vec::new(),
            symbols: BTreeSet::new(),
            case: CaseClass::None,
            char_length: 0,
            token_length: 0,
            tokens: Vec::new(),
            is_number: false,
            is_aggregate: false,
            is_null_equivalent: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty()
    }
}

fn strip_matched_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn normalize_value(raw: &str) -> String {
    strip_matched_quotes(raw.trim()).to_string()
}

fn classify_char(c: char, outlier_sensitive: bool) -> CharClass {
    if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_whitespace() {
        CharClass::Space
    } else if c.is_alphabetic() {
        if outlier_sensitive {
            if c.is_uppercase() {
                CharClass::LetterUpper
            } else {
                CharClass::LetterLower
            }
        } else {
            CharClass::Letter
        }
    } else {
        CharClass::Punct(c)
    }
}

fn build_train(value: &str, outlier_sensitive: bool) -> Train {
    let mut train: Train = Vec::new();
    for c in value.chars() {
        let class = classify_char(c, outlier_sensitive);
        match train.last_mut() {
            Some((last_class, count)) if *last_class == class => *count += 1,
            _ => train.push((class, 1)),
        }
    }
    train
}

/// A train made purely of `D`, optionally with `.`, `,`, space and a
/// leading sign (spec.md section 3, `is_number`).
fn is_numeric_train(train: &Train) -> bool {
    if train.is_empty() || !train.iter().any(|(c, _)| *c == CharClass::Digit) {
        return false;
    }
    train.iter().all(|(c, _)| {
        matches!(
            c,
            CharClass::Digit
                | CharClass::Space
                | CharClass::Punct('.')
                | CharClass::Punct(',')
                | CharClass::Punct('+')
                | CharClass::Punct('-')
        )
    })
}

/// Rewrites a `D,D` / `D.D` train into one canonical numeric run, so two
/// differently-formatted numbers (`1,234` and `1.234`) agree structurally.
fn normalize_numeric_train(train: Train) -> Train {
    if !is_numeric_train(&train) {
        return train;
    }
    let digits: u32 = train
        .iter()
        .filter(|(c, _)| *c == CharClass::Digit)
        .map(|(_, n)| n)
        .sum();
    if digits == 0 {
        return train;
    }
    vec![(CharClass::NumericCanonical, digits)]
}

fn classify_case(value: &str) -> CaseClass {
    let letters: Vec<char> = value.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return CaseClass::None;
    }
    let all_upper = letters.iter().all(|c| c.is_uppercase());
    let all_lower = letters.iter().all(|c| c.is_lowercase());
    if all_upper {
        return CaseClass::AllCaps;
    }
    if all_lower {
        return CaseClass::AllLower;
    }

    let is_title = value
        .split_whitespace()
        .all(|word| word.chars().next().is_none_or(|c| c.is_uppercase()));
    if is_title {
        CaseClass::Title
    } else {
        CaseClass::Mixed
    }
}

fn build_tokens(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .split_whitespace()
        .filter(|tok| tok.chars().any(|c| c.is_alphabetic()))
        .filter(|tok| !is_stopword(tok))
        .filter(|tok| !is_null_equivalent(tok))
        .map(|tok| tok.to_string())
        .collect()
}

fn build_signature(raw: &str, params: &Parameters) -> CellSignature {
    let value = normalize_value(raw);

    if value.is_empty() {
        return CellSignature::empty();
    }

    let mut train = build_train(&value, params.outlier_sensitive);
    let is_number = is_numeric_train(&train);
    if params.normalize_decimals {
        train = normalize_numeric_train(train);
    }

    let reversed: String = value.chars().rev().collect();
    let mut bw_train = build_train(&reversed, params.outlier_sensitive);
    if params.normalize_decimals {
        bw_train = normalize_numeric_train(bw_train);
    }

    let symbols: BTreeSet<CharClass> = train.iter().map(|(c, _)| *c).collect();
    let tokens = build_tokens(&value);

    CellSignature {
        is_number,
        is_aggregate: find_aggregation_phrase(&value).is_some(),
        is_null_equivalent: is_null_equivalent(&value),
        case: classify_case(&value),
        char_length: value.graphemes(true).count(),
        token_length: tokens.len(),
        tokens,
        train,
        bw_train,
        symbols,
        value,
    }
}

/// Read-only matrix of cell signatures over an entire grid. Construction is
/// a single pass; slicing never clones attribute payloads.
pub struct SignatureTable {
    cells: Vec<Vec<CellSignature>>,
}

impl SignatureTable {
    pub fn build(grid: &Grid, params: &Parameters) -> SignatureTable {
        let cells = (0..grid.rows())
            .map(|r| {
                (0..grid.cols())
                    .map(|c| build_signature(grid.cell(r, c), params))
                    .collect()
            })
            .collect();
        SignatureTable { cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, |r| r.len())
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellSignature {
        &self.cells[row][col]
    }

    /// `[top..=bottom]` in column `col`, in row order.
    pub fn slice(&self, top: usize, bottom: usize, col: usize) -> Vec<&CellSignature> {
        (top..=bottom).map(|r| self.cell(r, col)).collect()
    }

    /// Same range, but walked from `bottom` back to `top` — used by the
    /// top-down walk, which always reasons about "this row plus everything
    /// already accepted above it" (spec.md section 4.1).
    pub fn reverse_slice(&self, top: usize, bottom: usize, col: usize) -> Vec<&CellSignature> {
        (top..=bottom).rev().map(|r| self.cell(r, col)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Parameters {
        Parameters::default()
    }

    #[test]
    fn empty_cell_is_all_sentinels() {
        let sig = build_signature("", &params());
        assert!(sig.train.is_empty());
        assert!(sig.bw_train.is_empty());
        assert!(sig.symbols.is_empty());
        assert_eq!(sig.case, CaseClass::None);
        assert!(sig.tokens.is_empty());
        assert!(sig.is_null_equivalent);
    }

    #[test]
    fn numeric_cell_flagged() {
        let sig = build_signature("1,234.50", &params());
        assert!(sig.is_number);
    }

    #[test]
    fn aggregate_cell_flagged() {
        let sig = build_signature("Total votes", &params());
        assert!(sig.is_aggregate);
    }

    #[test]
    fn strips_matched_quotes() {
        let sig = build_signature("\"hello\"", &params());
        assert_eq!(sig.value, "hello");
    }

    #[test]
    fn case_classes() {
        assert_eq!(build_signature("PARIS", &params()).case, CaseClass::AllCaps);
        assert_eq!(build_signature("paris", &params()).case, CaseClass::AllLower);
        assert_eq!(build_signature("Paris Match", &params()).case, CaseClass::Title);
        assert_eq!(build_signature("paRis", &params()).case, CaseClass::Mixed);
    }

    #[test]
    fn reverse_slice_is_reversed() {
        let grid = Grid::from_rows(vec![
            vec!["a".to_string()],
            vec!["b".to_string()],
            vec!["c".to_string()],
        ])
        .unwrap();
        let table = SignatureTable::build(&grid, &params());
        let values: Vec<&str> = table
            .reverse_slice(0, 2, 0)
            .into_iter()
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(values, vec!["c", "b", "a"]);
    }
}
