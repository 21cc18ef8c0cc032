//! Table-structure discovery engine: locates embedded tables in grids of
//! delimited-text cells using a learned-weight rule catalogue rather than a
//! fixed one-header-row assumption (spec.md section 1).
//!
//! [`detect_tables`] is the entry point: it takes a raw grid of strings plus
//! a rule [`Catalogue`] and [`Parameters`], and returns one [`FileReport`]
//! describing every table the extractor found.

pub mod catalogue;
pub mod context;
pub mod errors;
pub mod extractor;
pub mod grid;
pub mod params;
pub mod rules;
pub mod scorer;
pub mod signature;
pub mod table;
pub mod tokens;

use serde::Serialize;

pub use catalogue::Catalogue;
pub use errors::{TableError, TableResult};
pub use grid::Grid;
pub use params::Parameters;
pub use table::TableRecord;

/// Per-file summary (spec.md section 6 outputs): table records plus a few
/// counters about the grid they were found in.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub blanklines: usize,
    pub lines_processed: usize,
    pub columns_in_file: usize,
    pub columns_in_file_considered: usize,
    pub tables: Vec<TableRecord>,
}

/// Runs the full pipeline over `rows`: caps the column count the way
/// spec.md section 6 requires, then hands the capped grid to the extractor.
/// An empty `tables` vector is not an error (spec.md section 7,
/// `NoTablesFound`) — it is simply a file with nothing the catalogue
/// recognized.
pub fn detect_tables(
    rows: Vec<Vec<String>>,
    catalogue: &Catalogue,
    params: &Parameters,
) -> TableResult<FileReport> {
    let grid = Grid::from_rows(rows)?;
    let columns_in_file = grid.cols();

    let capped = grid.capped_to(params.max_attributes, params.ignore_left);
    let columns_in_file_considered = capped.cols();
    let blanklines = capped.blank_rows().len();
    let lines_processed = capped.rows();

    let tables = extractor::discover_tables(&capped, catalogue, params)?;

    Ok(FileReport {
        blanklines,
        lines_processed,
        columns_in_file,
        columns_in_file_considered,
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn detects_one_clean_table() {
        let report = detect_tables(
            rows(&[
                &["name", "age", "city"],
                &["alice", "30", "paris"],
                &["bob", "40", "rome"],
            ]),
            &Catalogue::default_catalogue(),
            &Parameters::default(),
        )
        .unwrap();

        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.columns_in_file, 3);
        assert_eq!(report.lines_processed, 3);
    }

    #[test]
    fn caps_columns_per_parameters() {
        let mut params = Parameters::default();
        params.max_attributes = 1;
        params.ignore_left = 0;

        let report = detect_tables(
            rows(&[&["a", "b", "c", "d"], &["1", "2", "3", "4"]]),
            &Catalogue::default_catalogue(),
            &params,
        )
        .unwrap();

        assert_eq!(report.columns_in_file, 4);
        assert!(report.columns_in_file_considered <= 2);
    }
}
