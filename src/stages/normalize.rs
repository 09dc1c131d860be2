//! Normalization stage: standard-scale continuous columns.
//!
//! Consults the column classifier and scales only columns classified
//! continuous and not flagged binary, so class labels, category codes and
//! 0/1 indicators keep their original values. Scaling is (x - mean) / std
//! with population standard deviation over the non-missing values. A
//! zero-variance column is centered only.

use polars::prelude::*;
use tracing::{debug, info};

use crate::classifier::{classify_columns, ColumnClass};
use crate::config::PipelineConfig;
use crate::error::Result;

pub fn run(mut df: DataFrame, target: Option<&str>, config: &PipelineConfig) -> Result<DataFrame> {
    let kinds = classify_columns(&df, target, config)?;
    let scalable: Vec<String> = kinds
        .iter()
        .filter(|k| k.class == ColumnClass::Continuous && !k.binary)
        .map(|k| k.name.clone())
        .collect();

    if scalable.is_empty() {
        debug!("no continuous columns to scale");
        return Ok(df);
    }

    for name in &scalable {
        let series = df.column(name)?.as_materialized_series().clone();
        let cast = series.cast(&DataType::Float64)?;
        let values = cast.f64()?;

        let Some(mean) = values.mean() else {
            continue;
        };
        // Population std, matching what downstream model training expects.
        let std = values.std(0).unwrap_or(0.0);
        let scale = if std > 0.0 { std } else { 1.0 };

        let scaled: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.map(|x| (x - mean) / scale))
            .collect();
        let replacement = Series::new(name.as_str().into(), scaled);
        df.replace(name, replacement)?;
    }

    info!(columns = scalable.len(), "standard scaling complete");
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    fn column_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_continuous_column_scaled_to_zero_mean_unit_std() {
        let df = df!["x" => [0.5f64, 1.5, 2.5, 3.5, 4.5]].unwrap();
        let out = run(df, None, &config()).unwrap();
        let values: Vec<f64> = column_values(&out, "x").into_iter().flatten().collect();

        let mean: f64 = values.iter().sum::<f64>() / values.len() as f64;
        let var: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        assert!(mean.abs() < 1e-9);
        assert!((var.sqrt() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_binary_column_untouched() {
        let df = df![
            "flag" => [0.0f64, 1.0, 1.0, 0.0, 1.0],
            "x" => [0.3f64, 1.1, 2.9, 3.2, 4.8],
        ]
        .unwrap();
        let out = run(df, None, &config()).unwrap();
        assert_eq!(
            column_values(&out, "flag"),
            vec![Some(0.0), Some(1.0), Some(1.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn test_target_column_untouched() {
        let df = df![
            "label" => [0.0f64, 1.0, 2.0, 0.0, 1.0],
            "x" => [0.3f64, 1.1, 2.9, 3.2, 4.8],
        ]
        .unwrap();
        let out = run(df, Some("label"), &config()).unwrap();
        assert_eq!(
            column_values(&out, "label"),
            vec![Some(0.0), Some(1.0), Some(2.0), Some(0.0), Some(1.0)]
        );
        // the feature column is scaled
        assert!(column_values(&out, "x")[0].unwrap() < 0.0);
    }

    #[test]
    fn test_zero_variance_column_centered_only() {
        let df = df![
            "c" => [7.3f64, 7.3, 7.3, 7.3, 7.3],
            "x" => [0.3f64, 1.1, 2.9, 3.2, 4.8],
        ]
        .unwrap();
        let out = run(df, None, &config()).unwrap();
        assert_eq!(
            column_values(&out, "c"),
            vec![Some(0.0); 5]
        );
    }

    #[test]
    fn test_nulls_stay_null() {
        let df = df!["x" => [Some(0.5f64), None, Some(2.5), Some(3.9), Some(4.1)]].unwrap();
        let out = run(df, None, &config()).unwrap();
        assert_eq!(column_values(&out, "x")[1], None);
    }

    #[test]
    fn test_no_continuous_columns_passes_through() {
        let df = df!["flag" => [0i64, 1, 0, 1]].unwrap();
        let out = run(df.clone(), None, &config()).unwrap();
        assert_eq!(df, out);
    }
}
