//! Table extractor (spec.md section 4.4, ~30% of the core): the state
//! machine that predicts FDL, headers, subheaders, aggregation rows and
//! LDL, emits a [`TableRecord`], then iterates over the remainder of the
//! grid to find the next one.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalogue::Catalogue;
use crate::context::ColumnSummary;
use crate::errors::TableResult;
use crate::grid::Grid;
use crate::params::{CombinedLabelWeight, Parameters};
use crate::rules::cell as cell_rules;
use crate::rules::line as line_rules;
use crate::scorer;
use crate::signature::{CellSignature, SignatureTable};
use crate::table::{self, AggregationInfo, FdlConfidence, TableRecord};
use crate::tokens::{find_aggregation_phrase, looks_like_enumerated_footnote, starts_with_footnote_keyword};

/// Runs the full scan over `grid`, discovering every table and merging
/// adjacent ones whose gap is only blanks or already-absorbed subheaders
/// (spec.md section 4.4 steps 8-9).
pub fn discover_tables(grid: &Grid, catalogue: &Catalogue, params: &Parameters) -> TableResult<Vec<TableRecord>> {
    catalogue.validate()?;

    let mut raw_tables = Vec::new();
    let mut seen_headers: BTreeSet<String> = BTreeSet::new();
    let mut offset = 0usize;

    while offset < grid.rows() {
        let sub = grid.sub_grid(offset);
        let signatures = SignatureTable::build(&sub, params);

        let Some(mut record) = discover_next_table(&sub, &signatures, catalogue, params, &mut seen_headers) else {
            break;
        };
        offset_record(&mut record, offset);

        let next_offset = record.data_end + 1;
        raw_tables.push(record);
        if next_offset <= offset {
            break;
        }
        offset = next_offset;
    }

    let mut tables: Vec<TableRecord> = Vec::new();
    for record in raw_tables {
        if let Some(prev) = tables.last_mut() {
            if should_merge(prev, &record, grid) {
                merge_tables(prev, record);
                continue;
            }
        }
        tables.push(record);
    }

    finalize_boundaries(&mut tables, grid);

    Ok(tables)
}

/// Rewrites every row index a just-discovered (locally-indexed) record
/// carries into the coordinate space of the whole file.
fn offset_record(record: &mut TableRecord, offset: usize) {
    record.top_boundary += offset;
    record.bottom_boundary += offset;
    record.data_start += offset;
    record.data_end += offset;
    record.header = record.header.iter().map(|r| r + offset).collect();
    record.footnotes = record.footnotes.iter().map(|r| r + offset).collect();
    record.subheader_scope = record
        .subheader_scope
        .iter()
        .map(|(k, v)| (k + offset, v.iter().map(|r| r + offset).collect()))
        .collect();
    record.aggregation_scope = record
        .aggregation_scope
        .iter()
        .map(|(k, v)| (k + offset, v.clone()))
        .collect();
    for column in record.columns.values_mut() {
        for entry in &mut column.column_header {
            entry.row += offset;
        }
    }
}

/// spec.md section 4.4 step 8: the next table's header/data_start span is
/// "fully contained in blanks and prior subheaders" of `prev`.
fn should_merge(prev: &TableRecord, next: &TableRecord, grid: &Grid) -> bool {
    let gap_start = prev.data_end + 1;
    let gap_end = next.data_start.saturating_sub(1);
    if gap_start > gap_end {
        return true;
    }
    (gap_start..=gap_end).all(|r| grid.is_blank_row(r) || prev.subheader_scope.contains_key(&r))
}

fn merge_tables(prev: &mut TableRecord, next: TableRecord) {
    prev.data_end = next.data_end;
    prev.data_end_confidence = next.data_end_confidence;
    for (row, scope) in next.subheader_scope {
        prev.subheader_scope.insert(row, scope);
    }
    for (row, info) in next.aggregation_scope {
        prev.aggregation_scope.insert(row, info);
    }
    for (col, record) in next.columns {
        prev.columns.entry(col).or_insert(record);
    }
}

/// Assigns `footnotes`/`bottom_boundary` across the final table list
/// (spec.md section 4.4 steps 8-9): the gap before the next surviving
/// table (or the end of the grid for the last one) becomes footnotes.
fn finalize_boundaries(tables: &mut [TableRecord], grid: &Grid) {
    let total_rows = grid.rows();
    for i in 0..tables.len() {
        let has_next = i + 1 < tables.len();
        let range_end = if has_next { tables[i + 1].top_boundary } else { total_rows };
        let footnotes: Vec<usize> = (tables[i].data_end + 1..range_end)
            .filter(|&r| !grid.is_blank_row(r))
            .collect();
        tables[i].bottom_boundary = if has_next {
            range_end.saturating_sub(1)
        } else {
            footnotes.last().copied().unwrap_or(tables[i].data_end)
        };
        tables[i].footnotes = footnotes;
    }
}

/// Discovers one table starting at the top of `grid` (local row 0). All
/// row indices in the returned record are local to `grid`; the caller
/// offsets them back into the file's coordinate space.
fn discover_next_table(
    grid: &Grid,
    signatures: &SignatureTable,
    catalogue: &Catalogue,
    params: &Parameters,
    seen_headers: &mut BTreeSet<String>,
) -> Option<TableRecord> {
    let scan_top = 0;
    let (fdl, fdl_confidence) = predict_fdl(grid, signatures, catalogue, params, scan_top)?;

    let headers = predict_headers(grid, signatures, scan_top, fdl);

    let (data_end, data_end_confidence) =
        walk_last_data_line(grid, signatures, catalogue, params, fdl, grid.rows() - 1, seen_headers);
    let data_start = fdl;
    let data_rows: Vec<usize> = (data_start..=data_end).collect();

    let new_candidates = predict_subheaders_new(signatures, scan_top, fdl, data_end);
    let mut subheaders = resolve_subheader_candidates(&new_candidates, signatures, catalogue, params, &data_rows);

    let old_candidates = predict_subheaders_old(signatures, data_start, data_end);
    let mut more_subheaders = resolve_subheader_candidates(&old_candidates, signatures, catalogue, params, &data_rows);
    subheaders.append(&mut more_subheaders);
    subheaders.sort_unstable();
    subheaders.dedup();

    let subheader_set: BTreeSet<usize> = subheaders.iter().copied().collect();
    let aggregation_scope = build_aggregation_scope(signatures, data_start, data_end, &subheader_set);
    let subheader_scope = build_subheader_scope(&subheaders, data_end);

    for &row in &headers {
        seen_headers.insert(grid.joined_row(row));
    }

    let columns = table::build_columns(grid, &headers, data_start, data_end);

    Some(TableRecord {
        top_boundary: scan_top,
        bottom_boundary: data_end,
        data_start,
        data_end,
        header: headers,
        footnotes: Vec::new(),
        subheader_scope,
        aggregation_scope,
        columns,
        fdl_confidence,
        data_end_confidence,
    })
}

struct FdlCandidate {
    row: usize,
    data_conf: f64,
    not_data_conf: f64,
}

/// spec.md section 4.4 step 2: scores up to `max_candidates` rows below
/// `scan_top` (within `max_line_depth`) using a window of the up-to
/// `max_summary_strength` non-empty rows immediately below each
/// candidate, then picks the best by `combined_label_weight` with a
/// softmax over the candidate pool.
fn predict_fdl(
    grid: &Grid,
    signatures: &SignatureTable,
    catalogue: &Catalogue,
    params: &Parameters,
    scan_top: usize,
) -> Option<(usize, FdlConfidence)> {
    let scan_bottom = grid.rows() - 1;
    let last_candidate_row = std::cmp::min(scan_top + params.max_line_depth, scan_bottom);

    let mut candidates = Vec::new();
    let mut row = scan_top;
    while row <= last_candidate_row && candidates.len() < params.max_candidates {
        if grid.is_blank_row(row) {
            row += 1;
            continue;
        }

        let window_bottom = std::cmp::min(row + params.max_summary_strength, scan_bottom);
        let col_summaries: Vec<ColumnSummary> = (0..grid.cols())
            .map(|col| window_below(signatures, row + 1, window_bottom, col, params.max_summary_strength))
            .collect();

        let has_context_below = row < scan_bottom;
        let (data_conf, not_data_conf) =
            score_row(row, &col_summaries, signatures, grid, catalogue, params, true, has_context_below);
        candidates.push(FdlCandidate { row, data_conf, not_data_conf });
        row += 1;
    }

    if candidates.is_empty() {
        return None;
    }

    let markov_prior = params
        .markov_model
        .as_ref()
        .filter(|_| params.markov_approximation_probabilities)
        .and_then(|model| model.probability("context", "data"));

    let composite = |c: &FdlCandidate| {
        let base = match params.combined_label_weight {
            CombinedLabelWeight::Difference => c.data_conf - c.not_data_conf,
            CombinedLabelWeight::Confidence => c.data_conf,
            CombinedLabelWeight::ConfusionIndex => 1.0 - (c.data_conf - c.not_data_conf).abs(),
        };
        match markov_prior {
            Some(prior) => 0.5 * base + 0.5 * prior,
            None => base,
        }
    };
    let scores: Vec<f64> = candidates.iter().map(composite).collect();
    let max_composite = scores.iter().cloned().fold(f64::MIN, f64::max);
    if max_composite <= 0.0 {
        return None;
    }

    let exp_scores: Vec<f64> = scores.iter().map(|s| (s - max_composite).exp()).collect();
    let sum_exp: f64 = exp_scores.iter().sum();
    let softmax: Vec<f64> = exp_scores.iter().map(|e| e / sum_exp).collect();

    let (best_idx, _) = scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
        .expect("candidates is non-empty");

    let count = candidates.len() as f64;
    let avg_majority_confidence = candidates.iter().map(|c| c.data_conf).sum::<f64>() / count;
    let avg_difference = candidates.iter().map(|c| (c.data_conf - c.not_data_conf).abs()).sum::<f64>() / count;
    let avg_confusion_index = candidates
        .iter()
        .map(|c| 1.0 - (c.data_conf - c.not_data_conf).abs())
        .sum::<f64>()
        / count;

    Some((
        candidates[best_idx].row,
        FdlConfidence {
            avg_majority_confidence,
            avg_difference,
            avg_confusion_index,
            softmax: softmax[best_idx],
        },
    ))
}

fn window_below(
    signatures: &SignatureTable,
    start_row: usize,
    end_row_inclusive: usize,
    col: usize,
    max_strength: usize,
) -> ColumnSummary {
    let mut summary = ColumnSummary::default();
    let mut row = start_row;
    while row <= end_row_inclusive && summary.summary_strength < max_strength {
        summary.extend(signatures.cell(row, col));
        row += 1;
    }
    summary
}

/// Headers are every row between `scan_top` and `fdl` that is not blank
/// and not a null-payload row (those are subheader candidates instead,
/// spec.md section 4.4 step 3).
fn predict_headers(grid: &Grid, signatures: &SignatureTable, scan_top: usize, fdl: usize) -> Vec<usize> {
    (scan_top..fdl)
        .filter(|&r| !grid.is_blank_row(r) && !null_payload_beyond_first_column(signatures, r))
        .collect()
}

fn null_payload_beyond_first_column(signatures: &SignatureTable, row: usize) -> bool {
    (1..signatures.cols()).all(|c| signatures.cell(row, c).is_null_equivalent)
}

/// The "new" subheader predictor (grounded on `predict_subheaders_new` in
/// the original implementation): pre-seeds candidates from the pre-FDL
/// span as well as the data region. Deliberately not unified with
/// [`predict_subheaders_old`] (spec.md section 9 open question).
fn predict_subheaders_new(signatures: &SignatureTable, top: usize, fdl: usize, data_end: usize) -> Vec<usize> {
    (top..=data_end)
        .filter(|&r| r != fdl && null_payload_beyond_first_column(signatures, r))
        .collect()
}

/// The "old" subheader predictor: only looks inside the already-accepted
/// data region, once FDL/headers are fixed.
fn predict_subheaders_old(signatures: &SignatureTable, data_start: usize, data_end: usize) -> Vec<usize> {
    (data_start..=data_end)
        .filter(|&r| null_payload_beyond_first_column(signatures, r))
        .collect()
}

/// spec.md section 4.4 step 4: a candidate is promoted to subheader when
/// its not-data score (against the surrounding data rows' column-0
/// summary) is at least as strong as its data score.
fn resolve_subheader_candidates(
    candidates: &[usize],
    signatures: &SignatureTable,
    catalogue: &Catalogue,
    params: &Parameters,
    data_rows: &[usize],
) -> Vec<usize> {
    if data_rows.is_empty() {
        return candidates.to_vec();
    }

    let take_from = data_rows.len().saturating_sub(params.max_summary_strength);
    let mut summary = ColumnSummary::default();
    for &row in &data_rows[take_from..] {
        summary.extend(signatures.cell(row, 0));
    }

    candidates
        .iter()
        .copied()
        .filter(|&candidate| {
            let cell = signatures.cell(candidate, 0);
            let data_score = scorer::max_score(
                &cell_rules::evaluate_cell_data(cell, &summary),
                &catalogue.cell_data,
                params.weight_lower_bound,
            );
            let not_data_score = scorer::max_score(
                &cell_rules::evaluate_cell_not_data(cell, &summary),
                &catalogue.cell_not_data,
                params.not_data_weight_lower_bound,
            );
            not_data_score >= data_score
        })
        .collect()
}

fn build_aggregation_scope(
    signatures: &SignatureTable,
    data_start: usize,
    data_end: usize,
    subheaders: &BTreeSet<usize>,
) -> BTreeMap<usize, AggregationInfo> {
    let mut scope = BTreeMap::new();
    for row in data_start..=data_end {
        if subheaders.contains(&row) {
            continue;
        }
        let cell = signatures.cell(row, 0);
        if let Some((phrase, function, _)) = find_aggregation_phrase(&cell.value) {
            scope.insert(
                row,
                AggregationInfo {
                    label: cell.value.clone(),
                    phrase: phrase.to_string(),
                    function: function.to_string(),
                },
            );
        }
    }
    scope
}

fn build_subheader_scope(subheaders: &[usize], data_end: usize) -> BTreeMap<usize, Vec<usize>> {
    let mut sorted = subheaders.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut scope = BTreeMap::new();
    for (i, &sub) in sorted.iter().enumerate() {
        let next_boundary = sorted.get(i + 1).map(|&n| n.saturating_sub(1)).unwrap_or(data_end);
        let rows: Vec<usize> = ((sub + 1)..=next_boundary).collect();
        scope.insert(sub, rows);
    }
    scope
}

/// spec.md section 4.4 step 5: walks downward from `fdl`, extending the
/// running per-column summaries one row at a time. Returns the last
/// accepted row and its data confidence.
fn walk_last_data_line(
    grid: &Grid,
    signatures: &SignatureTable,
    catalogue: &Catalogue,
    params: &Parameters,
    fdl: usize,
    scan_bottom: usize,
    seen_headers: &BTreeSet<String>,
) -> (usize, f64) {
    let cols = grid.cols();
    let mut col_summaries: Vec<ColumnSummary> = vec![ColumnSummary::default(); cols];
    let mut accepted_count = 0usize;
    let mut probation_active = false;
    let mut last_accept = fdl;
    let mut last_conf = 0.0;

    let mut row = fdl;
    while row <= scan_bottom {
        if grid.is_blank_row(row) {
            break;
        }
        if accepted_count > 0 && seen_headers.contains(&grid.joined_row(row)) {
            break;
        }
        if is_footnote_row(grid, signatures, row) {
            break;
        }

        let has_context_below = row < scan_bottom;
        let (data_conf, not_data_conf) =
            score_row(row, &col_summaries, signatures, grid, catalogue, params, false, has_context_below);

        let is_aggregation_row = signatures.cell(row, 0).is_aggregate;
        let force_accept = accepted_count < 3 || is_aggregation_row;
        let accept = force_accept || (data_conf >= not_data_conf && not_data_conf > 0.0);

        if accept {
            for col in 0..cols {
                col_summaries[col].extend(signatures.cell(row, col));
            }
            accepted_count += 1;
            last_accept = row;
            last_conf = data_conf;
            probation_active = false;
            row += 1;
            continue;
        }

        if !probation_active && accepted_count > 0 {
            probation_active = true;
            row += 1;
            continue;
        }

        break;
    }

    (last_accept, last_conf)
}

/// Footnote heuristics (spec.md section 4.4 step 5, plus the supplement
/// in SPEC_FULL.md recovered from the original top-down walk): leading
/// footnote keywords or enumerated markers, an `=` anywhere on the row, or
/// a lone leading `(` with every other cell null-equivalent.
fn is_footnote_row(grid: &Grid, signatures: &SignatureTable, row: usize) -> bool {
    let first_value = &signatures.cell(row, 0).value;

    if starts_with_footnote_keyword(first_value) || looks_like_enumerated_footnote(first_value) {
        return true;
    }
    if grid.row(row).iter().any(|cell| cell.contains('=')) {
        return true;
    }

    let rest_is_null = (1..grid.cols()).all(|c| signatures.cell(row, c).is_null_equivalent);
    rest_is_null && first_value.trim_start().starts_with('(')
}

fn score_row(
    row: usize,
    col_summaries: &[ColumnSummary],
    signatures: &SignatureTable,
    grid: &Grid,
    catalogue: &Catalogue,
    params: &Parameters,
    fdl_not_yet_found: bool,
    has_context_below: bool,
) -> (f64, f64) {
    let cols = grid.cols();
    let mut data_scores = Vec::with_capacity(cols);
    let mut not_data_scores = Vec::with_capacity(cols);

    for col in 0..cols {
        let cell = signatures.cell(row, col);
        let summary = &col_summaries[col];

        let raw_data = scorer::max_score(
            &cell_rules::evaluate_cell_data(cell, summary),
            &catalogue.cell_data,
            params.weight_lower_bound,
        );
        data_scores.push(scorer::cell_column_score(raw_data, summary.summary_strength, params));

        let raw_not_data = scorer::max_score(
            &cell_rules::evaluate_cell_not_data(cell, summary),
            &catalogue.cell_not_data,
            params.not_data_weight_lower_bound,
        );
        not_data_scores.push(scorer::cell_column_score(raw_not_data, summary.summary_strength, params));
    }

    let row_cells: Vec<CellSignature> = (0..cols).map(|c| signatures.cell(row, c).clone()).collect();
    let line_ctx = line_rules::LineContext {
        cells: &row_cells,
        fdl_not_yet_found,
        has_context_below,
        row_index: row,
    };
    let line_data_score = scorer::max_score(
        &line_rules::evaluate_line_data(&line_ctx),
        &catalogue.line_data,
        params.weight_lower_bound,
    );
    let line_not_data_score = scorer::max_score(
        &line_rules::evaluate_line_not_data(&line_ctx),
        &catalogue.line_not_data,
        params.not_data_weight_lower_bound,
    );

    let data_conf = scorer::combine_row_score(&data_scores, Some(line_data_score), params);
    let not_data_conf = scorer::combine_row_score(&not_data_scores, Some(line_not_data_score), params);

    (data_conf, not_data_conf)
}
