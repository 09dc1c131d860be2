//! Inter-stage frame transport.
//!
//! Stages never share in-memory frames. Each hand-off serializes the frame
//! to a self-describing JSON payload with an ordered, column-major layout,
//! and the next stage reconstructs it. Floats rely on serde_json's
//! shortest-round-trip printing so recomputed statistics survive transport.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Serialized frame payload. Column order is the frame's column order.
#[derive(Debug, Serialize, Deserialize)]
pub struct FramePayload {
    pub columns: Vec<ColumnPayload>,
}

/// A single column of the payload. Missing values (nulls and float NaN)
/// serialize as JSON `null`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ColumnPayload {
    pub name: String,
    #[serde(flatten)]
    pub data: ColumnData,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "values")]
pub enum ColumnData {
    #[serde(rename = "int")]
    Int(Vec<Option<i64>>),
    #[serde(rename = "float")]
    Float(Vec<Option<f64>>),
    #[serde(rename = "str")]
    Str(Vec<Option<String>>),
    #[serde(rename = "bool")]
    Bool(Vec<Option<bool>>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Str(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
        }
    }
}

/// Encode a frame as a JSON payload string.
///
/// Integer columns are widened to 64 bits, float columns to `f64`. NaN
/// encodes as `null`. Unsupported dtypes fail with [`PrepError::Encode`].
pub fn encode(df: &DataFrame) -> Result<String> {
    let mut columns = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let name = series.name().to_string();

        let data = match series.dtype() {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => {
                let cast = series.cast(&DataType::Int64)?;
                ColumnData::Int(cast.i64()?.into_iter().collect())
            }
            DataType::Float32 | DataType::Float64 => {
                let cast = series.cast(&DataType::Float64)?;
                ColumnData::Float(
                    cast.f64()?
                        .into_iter()
                        .map(|v| v.filter(|x| !x.is_nan()))
                        .collect(),
                )
            }
            DataType::String => ColumnData::Str(
                series
                    .str()?
                    .into_iter()
                    .map(|v| v.map(str::to_string))
                    .collect(),
            ),
            DataType::Boolean => ColumnData::Bool(series.bool()?.into_iter().collect()),
            other => {
                return Err(PrepError::Encode(format!(
                    "column '{name}' has unsupported dtype {other}"
                )));
            }
        };

        columns.push(ColumnPayload { name, data });
    }

    serde_json::to_string(&FramePayload { columns })
        .map_err(|e| PrepError::Encode(e.to_string()))
}

/// Decode a JSON payload string back into a frame.
///
/// Fails with [`PrepError::Decode`] on malformed JSON, ragged columns, or
/// duplicate column names. Never silently drops rows or columns.
pub fn decode(payload: &str) -> Result<DataFrame> {
    let parsed: FramePayload =
        serde_json::from_str(payload).map_err(|e| PrepError::Decode(e.to_string()))?;

    if parsed.columns.is_empty() {
        return Ok(DataFrame::empty());
    }

    let expected_len = parsed.columns[0].data.len();
    let mut seen = std::collections::HashSet::new();
    let mut columns = Vec::with_capacity(parsed.columns.len());

    for col in &parsed.columns {
        if !seen.insert(col.name.as_str()) {
            return Err(PrepError::Decode(format!(
                "duplicate column name '{}'",
                col.name
            )));
        }
        if col.data.len() != expected_len {
            return Err(PrepError::Decode(format!(
                "ragged payload: column '{}' has {} values, expected {}",
                col.name,
                col.data.len(),
                expected_len
            )));
        }

        let name: PlSmallStr = col.name.as_str().into();
        let series = match &col.data {
            ColumnData::Int(v) => Series::new(name, v),
            ColumnData::Float(v) => Series::new(name, v),
            ColumnData::Str(v) => Series::new(name, v),
            ColumnData::Bool(v) => Series::new(name, v),
        };
        columns.push(series.into_column());
    }

    DataFrame::new(columns).map_err(|e| PrepError::Decode(e.to_string()))
}
