// src/engine/segment.rs
use crate::engine::normalize::MappingConfig;
use crate::engine::variant::{ReportVariant, RowBand, UnitRule};
use crate::utils::error::EngineError;

/// One extracted table: rows of optional trimmed text cells, as the
/// extraction edge hands them over. Row lengths may vary between reports;
/// cells past the end of a short row read as empty.
pub type Grid = Vec<Vec<Option<String>>>;

/// Walks the variant's row bands in order and produces the ordered
/// (raw_label, raw_value) pairs.
///
/// Band order, then row order within a band, is preserved; duplicate labels
/// across bands are both retained. Excluded labels and rows without a
/// resolvable label or value are dropped here; the normalizer does no
/// further filtering.
pub fn segment(
    grid: &Grid,
    variant: ReportVariant,
    mapping: &MappingConfig,
) -> Result<Vec<(String, String)>, EngineError> {
    let mut pairs = Vec::new();
    for band in variant.bands() {
        walk_band(grid, band, mapping, &mut pairs)?;
    }
    tracing::debug!("segmented {} rows into {} pairs", grid.len(), pairs.len());
    Ok(pairs)
}

fn walk_band(
    grid: &Grid,
    band: &RowBand,
    mapping: &MappingConfig,
    pairs: &mut Vec<(String, String)>,
) -> Result<(), EngineError> {
    if grid.len() < band.start {
        return Err(EngineError::MalformedTable(format!(
            "table has {} rows, band starting at row {} is missing",
            grid.len(),
            band.start,
        )));
    }
    let end = band.end.map_or(grid.len(), |e| e.min(grid.len()));
    let rows = &grid[band.start..end];
    if !rows.is_empty() && !rows.iter().any(|row| row.len() > band.value_col) {
        return Err(EngineError::MalformedTable(format!(
            "rows {}..{} never reach value column {}",
            band.start, end, band.value_col,
        )));
    }

    // Sticky carry-over is iteration state local to one band walk.
    let mut current_label: Option<&str> = None;
    for (offset, row) in rows.iter().enumerate() {
        let row_idx = band.start + offset;
        let label_cell = cell(row, band.label_col);
        if band.sticky && label_cell.is_some() {
            current_label = label_cell;
        }
        let base = if band.sticky { current_label } else { label_cell };
        let Some(base) = base else {
            tracing::debug!("row {}: no label, skipped", row_idx);
            continue;
        };
        let label = match band.unit {
            UnitRule::None => base.to_string(),
            // A non-empty unit cell qualifies the label; the meq/L row under
            // a printed nutrient label gets "<label> (meq/L)".
            UnitRule::Column(col) => match cell(row, col) {
                Some(unit) => format!("{} ({})", base, unit),
                None => base.to_string(),
            },
            // Printed labels in literal-unit bands already carry their own
            // annotation; only continuation rows take the suffix.
            UnitRule::Literal(unit) if label_cell.is_none() => format!("{} ({})", base, unit),
            UnitRule::Literal(_) => base.to_string(),
        };
        if mapping.is_excluded(&label) {
            tracing::debug!("row {}: label {:?} excluded", row_idx, label);
            continue;
        }
        let Some(value) = cell(row, band.value_col) else {
            tracing::debug!("row {}: no value for {:?}, skipped", row_idx, label);
            continue;
        };
        pairs.push((label, value.to_string()));
    }
    Ok(())
}

// A trimmed, non-empty cell; short rows and blank cells both read as None.
fn cell(row: &[Option<String>], idx: usize) -> Option<&str> {
    row.get(idx)
        .and_then(|c| c.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
