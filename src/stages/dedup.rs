//! Deduplication stage.
//!
//! Drops duplicate columns first (identical dtype and cell-for-cell equal,
//! null positions included), then duplicate rows, keeping first occurrences
//! and preserving row order. If row deduplication would leave nothing, the
//! input is returned unchanged instead of destroying the dataset.

use polars::prelude::*;
use tracing::{info, warn};

use crate::error::Result;

pub fn run(df: DataFrame) -> Result<DataFrame> {
    let df = drop_duplicate_columns(df)?;

    if df.height() == 0 || df.width() == 0 {
        return Ok(df);
    }

    let before = df.height();
    let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let after = deduped.height();

    if after == 0 {
        warn!(
            rows = before,
            "row deduplication would empty the frame, keeping input unchanged"
        );
        return Ok(df);
    }

    if before > after {
        info!(removed = before - after, "removed duplicate rows");
    }
    if after < 2 {
        warn!(rows = after, "fewer than 2 rows remain after deduplication");
    }

    Ok(deduped)
}

/// Remove columns that are exact duplicates of an earlier column.
fn drop_duplicate_columns(df: DataFrame) -> Result<DataFrame> {
    let columns = df.get_columns();
    let mut to_drop: Vec<PlSmallStr> = Vec::new();

    for (i, col) in columns.iter().enumerate() {
        let series = col.as_materialized_series();
        if to_drop.iter().any(|n| n == series.name()) {
            continue;
        }
        for later in &columns[i + 1..] {
            let other = later.as_materialized_series();
            if to_drop.iter().any(|n| n == other.name()) {
                continue;
            }
            if series.dtype() == other.dtype() && series.equals_missing(other) {
                to_drop.push(other.name().clone());
            }
        }
    }

    if to_drop.is_empty() {
        return Ok(df);
    }

    info!(removed = to_drop.len(), columns = ?to_drop, "removed duplicate columns");
    Ok(df.drop_many(to_drop))
}
