//! Preprocessing stages.
//!
//! Each stage is a pure frame transformation: decoded input frame in,
//! output frame out, no access to the dataset record or the source file.
//! [`run_stage`] is the single dispatch point used by the orchestrator's
//! queue: it decodes the serialized payload, applies the stage, and
//! re-encodes the result for the next hand-off.

pub mod dedup;
pub mod impute;
pub mod normalize;
pub mod outliers;
pub mod transform;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::config::PipelineConfig;
use crate::error::{PrepError, Result};

/// The five preprocessing stages, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageKind {
    Transform,
    Dedup,
    Impute,
    Outliers,
    Normalize,
}

impl StageKind {
    /// All stages in execution order.
    pub const CHAIN: [StageKind; 5] = [
        StageKind::Transform,
        StageKind::Dedup,
        StageKind::Impute,
        StageKind::Outliers,
        StageKind::Normalize,
    ];

    /// Human-readable name used in logs and stage fault messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            StageKind::Transform => "transformation",
            StageKind::Dedup => "deduplication",
            StageKind::Impute => "imputation",
            StageKind::Outliers => "outlier removal",
            StageKind::Normalize => "normalization",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Parameters shared by all stages of one chain.
#[derive(Debug, Clone)]
pub struct StageParams {
    pub config: PipelineConfig,
    pub target_column: Option<String>,
}

/// Apply a stage to an in-memory frame.
pub fn apply(kind: StageKind, df: DataFrame, params: &StageParams) -> Result<DataFrame> {
    match kind {
        StageKind::Transform => transform::run(df),
        StageKind::Dedup => dedup::run(df),
        StageKind::Impute => impute::run(df),
        StageKind::Outliers => outliers::run(df, &params.config),
        StageKind::Normalize => {
            normalize::run(df, params.target_column.as_deref(), &params.config)
        }
    }
}

/// Decode a serialized frame payload, apply a stage, and encode the result.
///
/// This is the unit of work submitted to the stage queue. A fault raised by
/// the stage itself surfaces as [`PrepError::Stage`] carrying the stage
/// name, so the record's error message says where the chain broke.
pub fn run_stage(kind: StageKind, payload: &str, params: &StageParams) -> Result<String> {
    let df = codec::decode(payload)?;
    debug!(stage = %kind, rows = df.height(), cols = df.width(), "stage input");
    let out = apply(kind, df, params).map_err(|e| stage_error(kind, e))?;
    debug!(stage = %kind, rows = out.height(), cols = out.width(), "stage output");
    codec::encode(&out)
}

/// Attribute a stage-internal fault to its stage. Transport errors keep
/// their own variants.
fn stage_error(kind: StageKind, err: PrepError) -> PrepError {
    match err {
        e @ (PrepError::Decode(_) | PrepError::Encode(_)) => e,
        other => PrepError::stage_fault(kind.display_name(), other),
    }
}
