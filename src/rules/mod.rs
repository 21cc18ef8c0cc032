//! Rule engine (spec.md section 4.3, ~35% of the core together with the
//! scorer in [`crate::scorer`]).
//!
//! Named predicates are grouped into four catalogues — `cell.data`,
//! `cell.not_data`, `line.data`, `line.not_data` — matching spec.md
//! section 3. Each catalogue's id list below is the contract the rule
//! [`Catalogue`](crate::catalogue::Catalogue) must satisfy
//! (`Catalogue::validate`).
//!
//! `CHAR_COUNT_UNDER_POINT5_MIN` and `MULTIPLE_AGGREGATION_VALUES_ON_ROW`
//! are commented out in the original rule catalogue and are deliberately
//! not reintroduced here (spec.md Design Notes).

pub mod cell;
pub mod line;

pub const ALL_CELL_DATA_RULES: &[&str] = &[
    "CONSISTENT_NUMERIC_WIDTH",
    "CONSISTENT_SC_TWO_OR_MORE",
    "FW_D1",
    "BW_D1",
    "D4",
    "D5PLUS",
    "LENGTH_4PLUS",
    "CASE_SUMMARY_CAPS",
    "CONSISTENT_CHAR_LENGTH",
    "CONSISTENT_SINGLE_WORD_CONSISTENT_CASE",
    "CHAR_COUNT_OVER_POINT5_MAX",
    "CHAR_COUNT_OVER_POINT6_MAX",
    "CHAR_COUNT_OVER_POINT7_MAX",
    "CHAR_COUNT_OVER_POINT8_MAX",
    "CHAR_COUNT_OVER_POINT9_MAX",
    "VALUE_REPEATS_ONCE_BELOW",
    "VALUE_REPEATS_TWICE_OR_MORE_BELOW",
    "ALPHA_TOKEN_REPEATS_ONCE_BELOW",
    "ALPHA_TOKEN_REPEATS_TWICE_OR_MORE_BELOW",
];

pub const ALL_CELL_NOT_DATA_RULES: &[&str] = &[
    "First_FW_Symbol_disagrees",
    "CONSISTENT_NUMERIC",
    "CONSISTENT_D_STAR",
    "FW_SUMMARY_D",
    "BW_SUMMARY_D",
    "BROAD_NUMERIC",
    "CHAR_COUNT_UNDER_POINT1_MIN",
    "CHAR_COUNT_UNDER_POINT3_MIN",
];

pub const ALL_LINE_DATA_RULES: &[&str] = &[
    "UP_TO_FIRST_COLUMN_COMPLETE_CONSISTENTLY",
    "AGGREGATION_ON_ROW_WO_NUMERIC",
    "AGGREGATION_ON_ROW_W_ARITH_SEQUENCE",
    "AGGREGATION_TOKEN_IN_FIRST_VALUE_OF_ROW",
    "CONTAINS_DATATYPE_CELL_VALUE",
];

pub const ALL_LINE_NOT_DATA_RULES: &[&str] = &[
    "CONSISTENTLY_SLUG_OR_SNAKE",
    "CONSISTENTLY_UPPER_CASE",
    "METADATA_LIKE_ROW",
    "METADATA_TABLE_HEADER_KEYWORDS",
    "ADJACENT_ARITHMETIC_SEQUENCE_2",
    "ADJACENT_ARITHMETIC_SEQUENCE_3",
    "ADJACENT_ARITHMETIC_SEQUENCE_4",
    "ADJACENT_ARITHMETIC_SEQUENCE_5",
    "ADJACENT_ARITHMETIC_SEQUENCE_6",
    "RANGE_PAIRS_1",
    "RANGE_PAIRS_2_PLUS",
    "PARTIALLY_REPEATING_VALUES_LENGTH_2_PLUS",
    "STARTS_WITH_NULL",
    "NO_SUMMARY_BELOW",
    "FOOTNOTE",
    "NULL_EQUIVALENT_ON_LINE_2_PLUS",
    "ONE_NULL_EQUIVALENT_ON_LINE",
];
