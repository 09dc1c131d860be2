//! Transformation stage: coerce every column to numeric.
//!
//! Numeric columns are widened to Float64. String columns are parsed value
//! by value; currency symbols, thousands separators and percent signs are
//! stripped, missing-value markers ("N/A", "null", ...) and unparseable
//! values become nulls. Booleans become 0/1. Columns where nothing coerces
//! are dropped, so the output frame is entirely numeric.

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::Result;
use crate::utils::{is_numeric_dtype, parse_numeric_string};

pub fn run(df: DataFrame) -> Result<DataFrame> {
    if df.width() == 0 {
        return Ok(df);
    }

    let mut kept: Vec<Column> = Vec::with_capacity(df.width());
    let mut dropped: Vec<String> = Vec::new();

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let name = series.name().clone();

        let coerced: Series = if is_numeric_dtype(series.dtype()) {
            series.cast(&DataType::Float64)?
        } else if series.dtype() == &DataType::Boolean {
            series.cast(&DataType::Float64)?
        } else if series.dtype() == &DataType::String {
            let values: Vec<Option<f64>> = series
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_numeric_string))
                .collect();
            Series::new(name.clone(), values)
        } else {
            // Anything polars can cast numerically is kept, the rest dropped.
            match series.cast(&DataType::Float64) {
                Ok(s) => s,
                Err(_) => {
                    dropped.push(name.to_string());
                    continue;
                }
            }
        };

        // A column that coerced to nothing carries no signal.
        if !is_numeric_dtype(series.dtype()) && coerced.null_count() == coerced.len() {
            dropped.push(name.to_string());
            continue;
        }

        kept.push(coerced.into_column());
    }

    if !dropped.is_empty() {
        info!(
            dropped = dropped.len(),
            columns = ?dropped,
            "dropped non-coercible columns"
        );
    }
    debug!(kept = kept.len(), "transformation complete");

    Ok(DataFrame::new(kept)?)
}
