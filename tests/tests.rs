//! Integration-level scenarios and universal properties from spec.md
//! section 8. Per-module unit tests already cover most of the individual
//! building blocks (signature trains, pattern summaries, the scorer); this
//! file exercises the assembled pipeline through [`tablescout::detect_tables`].

use std::collections::BTreeSet;

use tablescout::{Catalogue, Parameters};

macro_rules! grid[
    ($($row:expr),* $(,)?) => {
        vec![$($row.iter().map(|c: &&str| c.to_string()).collect::<Vec<String>>()),*]
    };
];

fn default_env() -> (Catalogue, Parameters) {
    (Catalogue::default_catalogue(), Parameters::default())
}

// S2 — preamble, table, footnote (the repository's own example grid).
#[test]
fn s2_preamble_table_footnote() {
    let rows = grid![
        ["Survey conducted between", "", ""],
        ["Method: phone", "", ""],
        ["Sample size: 1000", "", ""],
        ["Margin of error: 3.1%", "", ""],
        ["PARTY", "LEAD_NAME", "PROJ_SUPPORT"],
        ["LIB", "Trudeau", "32"],
        ["CON", "Poilievre", "35"],
        ["NDP", "Singh", "18"],
        ["BQ", "Blanchet", "7"],
        ["GRN", "May", "4"],
        ["PPC", "Bernier", "3"],
        ["NOT PREDICTED TO WIN RIDINGS", "", ""],
        ["OTH", "nd", "1"],
        ["(MOE) margin of error is +/- 3.1 percentage points", "", ""],
        ["* projected vote share, not seat count", "", ""],
        ["source: internal polling memo", "", ""],
    ];

    let (catalogue, params) = default_env();
    let report = tablescout::detect_tables(rows, &catalogue, &params).unwrap();

    assert_eq!(report.tables.len(), 1);
    let table = &report.tables[0];
    assert!(table.ordering_is_valid());
    assert_eq!(table.header, vec![4]);
    assert_eq!(table.data_start, 5);
    assert_eq!(table.data_end, 12);
    assert!(table.subheader_scope.contains_key(&11));
    assert_eq!(table.footnotes, vec![13, 14, 15]);
    assert_eq!(table.top_boundary, 0);
    assert_eq!(table.bottom_boundary, 15);
}

// S4 — same shape as the two-table scenario covered inline in
// extractor.rs, but the blank separator is replaced by a subheader-shaped
// row, so the two tables must merge into one.
#[test]
fn s4_merges_on_subheader_shaped_gap() {
    let rows = grid![
        ["name", "age", "city"],
        ["alice", "30", "paris"],
        ["bob", "40", "rome"],
        ["REGION X", "", ""],
        ["carol", "25", "berlin"],
        ["dave", "50", "madrid"],
    ];

    let (catalogue, params) = default_env();
    let report = tablescout::detect_tables(rows, &catalogue, &params).unwrap();

    assert_eq!(report.tables.len(), 1);
    let table = &report.tables[0];
    assert!(table.ordering_is_valid());
    assert!(table.subheader_scope.contains_key(&3));
    assert_eq!(table.data_end, 5);
}

// Property 2 — header, data, subheader, aggregation and footnote rows are
// pairwise disjoint, across every table the pipeline emits.
#[test]
fn property_rows_are_pairwise_disjoint() {
    let rows = grid![
        ["PARTY", "LEAD_NAME", "PROJ_SUPPORT"],
        ["LIB", "Trudeau", "32"],
        ["CON", "Poilievre", "35"],
        ["NDP", "Singh", "18"],
        ["NOT PREDICTED TO WIN RIDINGS", "", ""],
        ["OTH", "nd", "1"],
        ["Total", "", "86"],
        ["source: internal memo", "", ""],
    ];

    let (catalogue, params) = default_env();
    let report = tablescout::detect_tables(rows, &catalogue, &params).unwrap();

    for table in &report.tables {
        let header: BTreeSet<usize> = table.header.iter().copied().collect();
        let footnotes: BTreeSet<usize> = table.footnotes.iter().copied().collect();
        let subheaders: BTreeSet<usize> = table.subheader_scope.keys().copied().collect();
        let aggregations: BTreeSet<usize> = table.aggregation_scope.keys().copied().collect();
        let data: BTreeSet<usize> = (table.data_start..=table.data_end)
            .filter(|r| !subheaders.contains(r))
            .collect();

        assert!(header.is_disjoint(&data));
        assert!(header.is_disjoint(&footnotes));
        assert!(header.is_disjoint(&subheaders));
        assert!(data.is_disjoint(&footnotes));
        assert!(subheaders.is_disjoint(&footnotes));
        assert!(aggregations.is_disjoint(&subheaders));
    }
}

// Property 3 — turning off null imputation never turns a previously
// non-data row into data, for a row with no null cells at all (so
// imputation has nothing to act on either way).
#[test]
fn property_impute_nulls_does_not_add_data_rows_without_nulls() {
    let rows = grid![
        ["name", "age", "city"],
        ["alice", "30", "paris"],
        ["bob", "40", "rome"],
        ["carol", "25", "berlin"],
    ];

    let catalogue = Catalogue::default_catalogue();
    let mut with_impute = Parameters::default();
    with_impute.impute_nulls = true;
    let mut without_impute = Parameters::default();
    without_impute.impute_nulls = false;

    let a = tablescout::detect_tables(rows.clone(), &catalogue, &with_impute).unwrap();
    let b = tablescout::detect_tables(rows, &catalogue, &without_impute).unwrap();

    assert_eq!(a.tables.len(), b.tables.len());
    assert_eq!(a.tables[0].data_start, b.tables[0].data_start);
    assert_eq!(a.tables[0].data_end, b.tables[0].data_end);
}

// Property 7 — a grid whose every row is syntactically identical yields
// at most one table, and never classifies a row as a subheader.
#[test]
fn property_uniform_rows_yield_no_subheaders() {
    let rows = grid![
        ["alpha", "beta", "gamma"],
        ["alpha", "beta", "gamma"],
        ["alpha", "beta", "gamma"],
        ["alpha", "beta", "gamma"],
        ["alpha", "beta", "gamma"],
    ];

    let (catalogue, params) = default_env();
    let report = tablescout::detect_tables(rows, &catalogue, &params).unwrap();

    assert!(report.tables.len() <= 1);
    if let Some(table) = report.tables.first() {
        assert!(table.subheader_scope.is_empty());
        for row in 0..5 {
            let is_header = table.header.contains(&row);
            let is_data = row >= table.data_start && row <= table.data_end;
            assert!(is_header || is_data, "row {row} neither header nor data");
        }
    }
}

// Property 8 — `columns` contains exactly the column indices that survive
// the null-column drop over header ∪ data.
#[test]
fn property_columns_match_null_column_drop() {
    let rows = grid![
        ["name", "age", ""],
        ["alice", "30", ""],
        ["bob", "40", ""],
        ["carol", "25", ""],
    ];

    let (catalogue, params) = default_env();
    let report = tablescout::detect_tables(rows, &catalogue, &params).unwrap();

    assert_eq!(report.tables.len(), 1);
    let table = &report.tables[0];
    assert!(table.columns.contains_key(&0));
    assert!(table.columns.contains_key(&1));
    assert!(!table.columns.contains_key(&2));
}

// Round-trip law (b) — running the extractor twice on the same grid with
// the same parameters is deterministic, down to the JSON encoding.
#[test]
fn round_trip_law_deterministic_across_runs() {
    let rows = grid![
        ["PARTY", "LEAD_NAME", "PROJ_SUPPORT"],
        ["LIB", "Trudeau", "32"],
        ["CON", "Poilievre", "35"],
        ["NDP", "Singh", "18"],
        ["NOT PREDICTED TO WIN RIDINGS", "", ""],
        ["OTH", "nd", "1"],
        ["source: internal memo", "", ""],
    ];

    let (catalogue, params) = default_env();
    let first = tablescout::detect_tables(rows.clone(), &catalogue, &params).unwrap();
    let second = tablescout::detect_tables(rows, &catalogue, &params).unwrap();

    let first_json = serde_json::to_string(&first.tables).unwrap();
    let second_json = serde_json::to_string(&second.tables).unwrap();
    assert_eq!(first_json, second_json);
}

// Empty grid is InvalidInput (spec.md section 7), not a panic.
#[test]
fn empty_grid_is_invalid_input() {
    let (catalogue, params) = default_env();
    let result = tablescout::detect_tables(Vec::new(), &catalogue, &params);
    assert!(result.is_err());
}

// A remainder with no plausible FDL is "no more tables", not an error
// (spec.md section 7, NoTablesFound).
#[test]
fn blank_grid_yields_no_tables_without_error() {
    let rows = grid![["", "", ""], ["", "", ""], ["", "", ""]];
    let (catalogue, params) = default_env();
    let report = tablescout::detect_tables(rows, &catalogue, &params).unwrap();
    assert!(report.tables.is_empty());
}
