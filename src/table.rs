//! Output data model for one discovered table (spec.md section 3 "Table
//! record") plus the per-row tag used while walking the grid.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::grid::Grid;

/// Tag assigned to a row during the scan. Modeled as an explicit tagged
/// variant rather than string comparisons (spec.md section 9 design
/// notes); `Other` is the default for rows the extractor has not yet
/// classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Blank,
    Context,
    Header,
    Data,
    Subheader,
    Footnote,
    Aggregation,
    #[default]
    Other,
}

/// FDL prediction quality, reported the same way for the last-data-line
/// walk (`data_end_confidence` reuses the same shape, spec.md section
/// 4.4).
#[derive(Debug, Clone, Serialize)]
pub struct FdlConfidence {
    pub avg_majority_confidence: f64,
    pub avg_difference: f64,
    pub avg_confusion_index: f64,
    pub softmax: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregationInfo {
    pub label: String,
    pub phrase: String,
    pub function: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnHeaderEntry {
    pub row: usize,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnRecord {
    pub table_column: usize,
    pub column_header: Vec<ColumnHeaderEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRecord {
    pub top_boundary: usize,
    pub bottom_boundary: usize,
    pub data_start: usize,
    pub data_end: usize,
    pub header: Vec<usize>,
    pub footnotes: Vec<usize>,
    pub subheader_scope: BTreeMap<usize, Vec<usize>>,
    pub aggregation_scope: BTreeMap<usize, AggregationInfo>,
    pub columns: BTreeMap<usize, ColumnRecord>,
    pub fdl_confidence: FdlConfidence,
    pub data_end_confidence: f64,
}

impl TableRecord {
    /// Checks the ordering invariant from spec.md section 3. Used by the
    /// extractor before emitting and by tests asserting property 1.
    pub fn ordering_is_valid(&self) -> bool {
        let header_first = self.header.first().copied().unwrap_or(self.data_start);
        let header_last = self.header.last().copied().unwrap_or(self.data_start.saturating_sub(1));
        self.top_boundary <= header_first
            && header_first <= header_last
            && header_last < self.data_start
            && self.data_start <= self.data_end
            && self.data_end <= self.bottom_boundary
    }
}

/// Builds `columns` for the rows the table actually covers: a column
/// survives only if some header or data row has a non-empty value in it
/// (spec.md section 4.4 step 7, section 8 property 8); header strings from
/// every header row are concatenated in row order with `separator`.
pub fn build_columns(
    grid: &Grid,
    header_rows: &[usize],
    data_start: usize,
    data_end: usize,
) -> BTreeMap<usize, ColumnRecord> {
    let mut columns = BTreeMap::new();

    for col in 0..grid.cols() {
        let header_entries: Vec<ColumnHeaderEntry> = header_rows
            .iter()
            .filter_map(|&row| {
                let value = grid.cell(row, col).trim();
                (!value.is_empty()).then(|| ColumnHeaderEntry { row, value: value.to_string() })
            })
            .collect();

        let has_data = (data_start..=data_end).any(|row| !grid.cell(row, col).trim().is_empty());

        if header_entries.is_empty() && !has_data {
            continue;
        }

        columns.insert(
            col,
            ColumnRecord {
                table_column: col,
                column_header: header_entries,
            },
        );
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::from_rows(vec![
            vec!["name".to_string(), "age".to_string(), "".to_string()],
            vec!["alice".to_string(), "30".to_string(), "".to_string()],
            vec!["bob".to_string(), "40".to_string(), "".to_string()],
        ])
        .unwrap()
    }

    #[test]
    fn drops_fully_null_columns() {
        let columns = build_columns(&grid(), &[0], 1, 2);
        assert_eq!(columns.len(), 2);
        assert!(!columns.contains_key(&2));
    }

    #[test]
    fn ordering_invariant_holds_for_sane_record() {
        let record = TableRecord {
            top_boundary: 0,
            bottom_boundary: 3,
            data_start: 1,
            data_end: 3,
            header: vec![0],
            footnotes: vec![],
            subheader_scope: BTreeMap::new(),
            aggregation_scope: BTreeMap::new(),
            columns: BTreeMap::new(),
            fdl_confidence: FdlConfidence {
                avg_majority_confidence: 0.8,
                avg_difference: 0.3,
                avg_confusion_index: 0.1,
                softmax: 0.9,
            },
            data_end_confidence: 0.7,
        };
        assert!(record.ordering_is_valid());
    }
}
