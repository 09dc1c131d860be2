//! Imputation stage: fill missing numeric values with the column median.
//!
//! All-null columns pass through unchanged since their median is undefined.

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::Result;
use crate::utils::is_numeric_dtype;

pub fn run(mut df: DataFrame) -> Result<DataFrame> {
    let candidates: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()) && c.null_count() > 0)
        .map(|c| c.name().to_string())
        .collect();

    if candidates.is_empty() {
        debug!("no numeric columns with missing values, skipping imputation");
        return Ok(df);
    }

    let mut filled_columns = 0usize;
    for name in &candidates {
        let series = df.column(name)?.as_materialized_series().clone();
        let Some(median) = series.median() else {
            debug!(column = %name, "all values missing, median undefined, left unchanged");
            continue;
        };

        let cast = series.cast(&DataType::Float64)?;
        let values: Vec<f64> = cast
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(median))
            .collect();
        let filled = Series::new(name.as_str().into(), values);
        df.replace(name, filled)?;
        filled_columns += 1;
    }

    info!(columns = filled_columns, "median imputation complete");
    Ok(df)
}
