//! Column role detection.
//!
//! Decides, per column, whether it behaves as a continuous measurement or a
//! categorical code. Downstream, Normalization scales only continuous
//! non-binary columns so that class labels and dummy-coded flags keep their
//! original values.

use polars::prelude::*;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::utils::is_numeric_dtype;

/// Statistical role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    /// Real-valued measurement, candidate for scaling.
    Continuous,
    /// Numeric values acting as category codes.
    CategoricalNumeric,
    /// Non-numeric values.
    CategoricalText,
}

/// Classification result for a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnKind {
    pub name: String,
    pub class: ColumnClass,
    /// Whether the non-missing value set is a subset of {0, 1}. Computed
    /// independently of `class`.
    pub binary: bool,
}

/// Classify every column of the frame.
///
/// Columns with no non-missing values are skipped entirely. Rules are
/// applied in order, first match wins:
///
/// 1. the target column with at most `target_class_max_cardinality` distinct
///    values is categorical (a classification label),
/// 2. non-numeric dtype is categorical text,
/// 3. distinct/row-count ratio below `categorical_ratio_threshold` is
///    categorical,
/// 4. at most `small_int_max_cardinality` distinct integer values within
///    [0, 100] is categorical (dummy/ordinal codes),
/// 5. anything else is continuous.
///
/// Deterministic and side-effect-free: two calls with the same frame, target
/// and config return identical results.
pub fn classify_columns(
    df: &DataFrame,
    target: Option<&str>,
    config: &PipelineConfig,
) -> Result<Vec<ColumnKind>> {
    let row_count = df.height();
    let mut kinds = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let name = series.name().to_string();

        let non_null = series.drop_nulls();
        if non_null.is_empty() {
            debug!(column = %name, "skipping all-missing column");
            continue;
        }

        let distinct = non_null.n_unique()?;
        let numeric = is_numeric_dtype(series.dtype());
        let binary = numeric && is_binary(&non_null)?;

        let class = if target == Some(name.as_str())
            && distinct <= config.target_class_max_cardinality
        {
            ColumnClass::CategoricalNumeric
        } else if !numeric {
            ColumnClass::CategoricalText
        } else if row_count > 0
            && (distinct as f64) / (row_count as f64) < config.categorical_ratio_threshold
        {
            ColumnClass::CategoricalNumeric
        } else if distinct <= config.small_int_max_cardinality && is_small_range_int(&non_null)? {
            ColumnClass::CategoricalNumeric
        } else {
            ColumnClass::Continuous
        };

        kinds.push(ColumnKind { name, class, binary });
    }

    Ok(kinds)
}

/// True if every value of an already null-free numeric series is 0 or 1.
fn is_binary(non_null: &Series) -> Result<bool> {
    let values = non_null.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_no_null_iter()
        .all(|v| v == 0.0 || v == 1.0))
}

/// True if every value is a whole number within [0, 100].
fn is_small_range_int(non_null: &Series) -> Result<bool> {
    if !is_numeric_dtype(non_null.dtype()) {
        return Ok(false);
    }
    let values = non_null.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_no_null_iter()
        .all(|v| v.fract() == 0.0 && (0.0..=100.0).contains(&v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    fn kind_of<'a>(kinds: &'a [ColumnKind], name: &str) -> &'a ColumnKind {
        kinds.iter().find(|k| k.name == name).unwrap()
    }

    #[test]
    fn test_continuous_measurement() {
        let df = df!["income" => [1200.5f64, 3400.0, 980.25, 5600.75, 2100.0]].unwrap();
        let kinds = classify_columns(&df, None, &config()).unwrap();
        assert_eq!(kind_of(&kinds, "income").class, ColumnClass::Continuous);
        assert!(!kind_of(&kinds, "income").binary);
    }

    #[test]
    fn test_text_column_is_categorical_text() {
        let df = df!["city" => ["madrid", "lyon", "porto"]].unwrap();
        let kinds = classify_columns(&df, None, &config()).unwrap();
        assert_eq!(kind_of(&kinds, "city").class, ColumnClass::CategoricalText);
    }

    #[test]
    fn test_target_with_few_classes_is_categorical() {
        let values: Vec<f64> = (0..100).map(|i| (i % 3) as f64 + 0.5).collect();
        let df = df!["label" => values].unwrap();
        let kinds = classify_columns(&df, Some("label"), &config()).unwrap();
        assert_eq!(
            kind_of(&kinds, "label").class,
            ColumnClass::CategoricalNumeric
        );
    }

    #[test]
    fn test_low_distinct_ratio_is_categorical() {
        // 2 distinct values over 100 rows, ratio 0.02 < 0.05
        let values: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 1.5 } else { 2.5 }).collect();
        let df = df!["code" => values].unwrap();
        let kinds = classify_columns(&df, None, &config()).unwrap();
        assert_eq!(
            kind_of(&kinds, "code").class,
            ColumnClass::CategoricalNumeric
        );
    }

    #[test]
    fn test_small_range_integers_are_categorical() {
        let df = df!["grade" => [0i64, 5, 10, 15, 20, 25, 100]].unwrap();
        let kinds = classify_columns(&df, None, &config()).unwrap();
        assert_eq!(
            kind_of(&kinds, "grade").class,
            ColumnClass::CategoricalNumeric
        );
    }

    #[test]
    fn test_integers_outside_range_stay_continuous() {
        let df = df!["year" => [1990i64, 1995, 2000, 2005, 2010]].unwrap();
        let kinds = classify_columns(&df, None, &config()).unwrap();
        assert_eq!(kind_of(&kinds, "year").class, ColumnClass::Continuous);
    }

    #[test]
    fn test_binary_flag_is_independent() {
        let df = df![
            "flag" => [0.0f64, 1.0, 0.0, 1.0, 1.0],
            "measure" => [0.1f64, 1.9, 2.8, 3.7, 4.6],
        ]
        .unwrap();
        let kinds = classify_columns(&df, None, &config()).unwrap();
        assert!(kind_of(&kinds, "flag").binary);
        assert!(!kind_of(&kinds, "measure").binary);
    }

    #[test]
    fn test_all_missing_column_skipped() {
        let df = df![
            "empty" => [None::<f64>, None, None],
            "kept" => [0.3f64, 1.7, 2.9],
        ]
        .unwrap();
        let kinds = classify_columns(&df, None, &config()).unwrap();
        assert_eq!(kinds.len(), 1);
        assert_eq!(kinds[0].name, "kept");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let df = df![
            "a" => [0.1f64, 2.3, 4.5, 6.7, 8.9],
            "b" => ["x", "y", "z", "x", "y"],
        ]
        .unwrap();
        let first = classify_columns(&df, Some("a"), &config()).unwrap();
        let second = classify_columns(&df, Some("a"), &config()).unwrap();
        assert_eq!(first, second);
    }
}
