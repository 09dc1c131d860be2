//! Preprocessing report generation.
//!
//! Finalization attaches a before/after report to each processed dataset:
//! frame shapes, per-column missing counts and basic statistics, so users
//! can see what the chain did to their data without diffing CSV files. The
//! report is written as JSON next to the processed result.

use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::utils::is_numeric_dtype;

/// Basic statistics for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub missing_count: usize,
    pub distinct_count: usize,
    /// Mean over non-missing values; `None` for non-numeric or all-missing
    /// columns.
    pub mean: Option<f64>,
    /// Population standard deviation over non-missing values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Snapshot of a frame's shape and per-column statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    pub rows: usize,
    pub columns: usize,
    pub column_summaries: Vec<ColumnSummary>,
}

impl FrameSummary {
    /// Summarize a frame. Statistics are computed per column over the
    /// non-missing values.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut column_summaries = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let non_null = series.drop_nulls();

            let (mean, std, min, max) = if is_numeric_dtype(series.dtype()) && !non_null.is_empty()
            {
                let cast = non_null.cast(&DataType::Float64)?;
                let values = cast.f64()?;
                (values.mean(), values.std(0), values.min(), values.max())
            } else {
                (None, None, None, None)
            };

            column_summaries.push(ColumnSummary {
                name: series.name().to_string(),
                dtype: series.dtype().to_string(),
                missing_count: series.null_count(),
                distinct_count: if non_null.is_empty() {
                    0
                } else {
                    non_null.n_unique()?
                },
                mean,
                std,
                min,
                max,
            });
        }

        Ok(Self {
            rows: df.height(),
            columns: df.width(),
            column_summaries,
        })
    }
}

/// Before/after comparison for one preprocessing chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingReport {
    /// Path to the uploaded file.
    pub source_file: String,
    /// Path to the processed result.
    pub result_file: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
    pub rows_removed_percent: f32,
    pub columns_before: usize,
    pub columns_after: usize,
    pub columns_removed: usize,
    pub before: FrameSummary,
    pub after: FrameSummary,
}

impl PreprocessingReport {
    pub fn new(
        source_file: impl Into<String>,
        result_file: impl Into<String>,
        before: FrameSummary,
        after: FrameSummary,
    ) -> Self {
        let rows_removed = before.rows.saturating_sub(after.rows);
        let rows_removed_percent = if before.rows > 0 {
            (rows_removed as f32 / before.rows as f32) * 100.0
        } else {
            0.0
        };

        Self {
            source_file: source_file.into(),
            result_file: result_file.into(),
            rows_before: before.rows,
            rows_after: after.rows,
            rows_removed,
            rows_removed_percent,
            columns_before: before.columns,
            columns_after: after.columns,
            columns_removed: before.columns.saturating_sub(after.columns),
            before,
            after,
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| PrepError::Encode(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frame_summary_statistics() {
        let df = df![
            "x" => [Some(1.0f64), None, Some(3.0)],
            "city" => ["madrid", "lyon", "lyon"],
        ]
        .unwrap();
        let summary = FrameSummary::from_frame(&df).unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 2);

        let x = &summary.column_summaries[0];
        assert_eq!(x.name, "x");
        assert_eq!(x.missing_count, 1);
        assert_eq!(x.distinct_count, 2);
        assert_eq!(x.mean, Some(2.0));
        assert_eq!(x.min, Some(1.0));
        assert_eq!(x.max, Some(3.0));

        let city = &summary.column_summaries[1];
        assert_eq!(city.missing_count, 0);
        assert_eq!(city.distinct_count, 2);
        assert_eq!(city.mean, None);
    }

    #[test]
    fn test_all_missing_column_summary() {
        let df = df!["empty" => [None::<f64>, None]].unwrap();
        let summary = FrameSummary::from_frame(&df).unwrap();
        let col = &summary.column_summaries[0];
        assert_eq!(col.missing_count, 2);
        assert_eq!(col.distinct_count, 0);
        assert_eq!(col.mean, None);
    }

    #[test]
    fn test_report_shape_deltas() {
        let before_df = df![
            "a" => [1.0f64, 2.0, 3.0, 4.0],
            "b" => [1.0f64, 2.0, 3.0, 4.0],
        ]
        .unwrap();
        let after_df = df!["a" => [1.0f64, 2.0, 3.0]].unwrap();

        let report = PreprocessingReport::new(
            "data.csv",
            "data_processed.csv",
            FrameSummary::from_frame(&before_df).unwrap(),
            FrameSummary::from_frame(&after_df).unwrap(),
        );

        assert_eq!(report.rows_before, 4);
        assert_eq!(report.rows_after, 3);
        assert_eq!(report.rows_removed, 1);
        assert_eq!(report.rows_removed_percent, 25.0);
        assert_eq!(report.columns_removed, 1);
    }

    #[test]
    fn test_report_round_trips_as_json() {
        let df = df!["v" => [1.0f64, 2.0]].unwrap();
        let summary = FrameSummary::from_frame(&df).unwrap();
        let report =
            PreprocessingReport::new("in.csv", "out.csv", summary.clone(), summary);

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();

        let parsed: PreprocessingReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.rows_before, 2);
        assert_eq!(parsed.source_file, "in.csv");
    }
}
