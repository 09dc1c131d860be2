//! Outlier removal stage.
//!
//! Per numeric column, bounds are computed from the 15th and 85th
//! percentiles (linear interpolation over the sorted non-null values) with a
//! 1.5 inter-quantile-range fence. A row survives only if every numeric
//! column's value sits within its own bounds; missing values never
//! disqualify a row.

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::utils::is_numeric_dtype;

pub fn run(df: DataFrame, config: &PipelineConfig) -> Result<DataFrame> {
    let numeric: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();

    if numeric.is_empty() || df.height() == 0 {
        debug!("no numeric data, skipping outlier removal");
        return Ok(df);
    }

    let height = df.height();
    let mut keep = vec![true; height];

    for name in &numeric {
        let series = df.column(name)?.as_materialized_series();
        let cast = series.cast(&DataType::Float64)?;
        let values = cast.f64()?;

        let mut non_null: Vec<f64> = values.into_no_null_iter().collect();
        if non_null.is_empty() {
            continue;
        }
        non_null.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = interpolated_quantile(&non_null, config.lower_quantile);
        let q3 = interpolated_quantile(&non_null, config.upper_quantile);
        let iqr = q3 - q1;
        let lower = q1 - config.iqr_factor * iqr;
        let upper = q3 + config.iqr_factor * iqr;

        debug!(column = %name, q1, q3, lower, upper, "outlier bounds");

        for (i, v) in values.into_iter().enumerate() {
            if let Some(v) = v {
                if v < lower || v > upper {
                    keep[i] = false;
                }
            }
        }
    }

    let removed = keep.iter().filter(|&&k| !k).count();
    if removed == 0 {
        return Ok(df);
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let filtered = df.filter(&mask)?;
    info!(removed, remaining = filtered.height(), "removed outlier rows");
    Ok(filtered)
}

/// Quantile by linear interpolation at position `q * (n - 1)` over an
/// already sorted slice.
fn interpolated_quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_interpolated_quantile() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        // position 0.15 * 5 = 0.75 between 1 and 2
        assert_eq!(interpolated_quantile(&sorted, 0.15), 1.75);
        // position 0.85 * 5 = 4.25 between 5 and 100
        assert_eq!(interpolated_quantile(&sorted, 0.85), 28.75);
        assert_eq!(interpolated_quantile(&sorted, 0.0), 1.0);
        assert_eq!(interpolated_quantile(&sorted, 1.0), 100.0);
    }

    #[test]
    fn test_extreme_value_removed() {
        let df = df!["x" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 100.0]].unwrap();
        let out = run(df, &PipelineConfig::default()).unwrap();
        // Q1=1.75, Q3=28.75, IQR=27, bounds [-38.75, 69.25]
        assert_eq!(out.height(), 5);
        let col = out.column("x").unwrap().as_materialized_series();
        assert_eq!(col.f64().unwrap().get(4), Some(5.0));
    }

    #[test]
    fn test_uniform_data_kept_intact() {
        let df = df!["x" => [10.0f64, 11.0, 12.0, 13.0, 14.0]].unwrap();
        let out = run(df.clone(), &PipelineConfig::default()).unwrap();
        assert_eq!(df, out);
    }

    #[test]
    fn test_nulls_do_not_disqualify_rows() {
        let df = df![
            "x" => [Some(1.0f64), None, Some(3.0), Some(2.0)],
            "y" => [Some(5.0f64), Some(6.0), None, Some(7.0)],
        ]
        .unwrap();
        let out = run(df, &PipelineConfig::default()).unwrap();
        assert_eq!(out.height(), 4);
    }

    #[test]
    fn test_row_removed_if_any_column_out_of_bounds() {
        let df = df![
            "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 3.0],
            "b" => [10.0f64, 11.0, 12.0, 13.0, 14.0, 9999.0],
        ]
        .unwrap();
        let out = run(df, &PipelineConfig::default()).unwrap();
        assert_eq!(out.height(), 5);
    }

    #[test]
    fn test_no_numeric_columns_passes_through() {
        let df = df!["s" => ["a", "b", "c"]].unwrap();
        let out = run(df.clone(), &PipelineConfig::default()).unwrap();
        assert_eq!(df, out);
    }
}
