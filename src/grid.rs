use std::collections::BTreeSet;

use crate::errors::{TableError, TableResult};

/// A two-dimensional grid of string cells, trimmed to the column policy the
/// caller configured (spec.md section 6: `min(max_attributes + ignore_left,
/// C) + 1`).
///
/// `Grid` owns its data; everything downstream (signatures, summaries,
/// extraction) only ever borrows from it.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Vec<String>>,
    blank_rows: BTreeSet<usize>,
}

impl Grid {
    /// Builds a grid from raw rows, ragged rows are padded with empty cells
    /// up to the widest row before the column cap is applied.
    pub fn from_rows(rows: Vec<Vec<String>>) -> TableResult<Grid> {
        if rows.is_empty() {
            return Err(TableError::InvalidInput("grid has zero rows".to_string()));
        }

        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);

        if width == 0 {
            return Err(TableError::InvalidInput(
                "grid has zero columns".to_string(),
            ));
        }

        let mut padded = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.resize(width, String::new());
            padded.push(row);
        }

        let blank_rows = padded
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|cell| cell.trim().is_empty()))
            .map(|(i, _)| i)
            .collect();

        Ok(Grid {
            rows: padded,
            blank_rows,
        })
    }

    /// Caps column count to `min(max_attributes + ignore_left, C) + 1` and
    /// drops everything beyond that, the way the original top-down walk
    /// slices `candidate_data.iloc[:, :slice_idx]` before ever looking at a
    /// row's signatures.
    pub fn capped_to(&self, max_attributes: usize, ignore_left: usize) -> Grid {
        let policy = max_attributes + ignore_left;
        let slice_idx = std::cmp::min(policy, self.cols()) + 1;
        let slice_idx = std::cmp::min(slice_idx, self.cols());

        let rows = self
            .rows
            .iter()
            .map(|row| row[..slice_idx].to_vec())
            .collect();

        Grid::from_rows(rows).expect("capping a valid grid cannot make it invalid")
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    pub fn row(&self, index: usize) -> &[String] {
        &self.rows[index]
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.rows[row][col]
    }

    pub fn blank_rows(&self) -> &BTreeSet<usize> {
        &self.blank_rows
    }

    pub fn is_blank_row(&self, row: usize) -> bool {
        self.blank_rows.contains(&row)
    }

    /// The full joined representation of a row, used for header-repetition
    /// detection (spec.md section 3: header rows are deduplicated by
    /// joined-string equality).
    pub fn joined_row(&self, row: usize) -> String {
        self.rows[row].join(",")
    }

    /// A sub-grid view over `[top..=bottom]`, used when the extractor moves
    /// `file_offset` forward to scan the remainder for another table.
    pub fn sub_grid(&self, top: usize) -> Grid {
        let rows = self.rows[top..].to_vec();
        Grid::from_rows(rows).expect("a non-empty sub-range of a valid grid is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_blank_rows() {
        let grid = Grid::from_rows(vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["".to_string(), " ".to_string()],
            vec!["c".to_string(), "d".to_string()],
        ])
        .unwrap();

        assert_eq!(grid.blank_rows().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn pads_ragged_rows() {
        let grid = Grid::from_rows(vec![vec!["a".to_string()], vec!["b".to_string(), "c".to_string()]])
            .unwrap();

        assert_eq!(grid.cols(), 2);
        assert_eq!(grid.cell(0, 1), "");
    }

    #[test]
    fn rejects_empty_grid() {
        assert!(Grid::from_rows(vec![]).is_err());
    }

    #[test]
    fn caps_columns() {
        let grid = Grid::from_rows(vec![vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
        ]])
        .unwrap();

        let capped = grid.capped_to(1, 1);
        assert_eq!(capped.cols(), 3);
    }
}
