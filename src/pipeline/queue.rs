//! Stage job queue.
//!
//! Stages run as independent units of work on the runtime's blocking pool.
//! The orchestrator submits one stage at a time per chain and awaits its
//! serialized result before submitting the next, so stages within a chain
//! are strictly ordered while chains for different datasets run in parallel.

use static_assertions::assert_impl_all;

use crate::error::{PrepError, Result};
use crate::stages::{run_stage, StageKind, StageParams};

/// Dispatches stage jobs onto the tokio blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageQueue;

assert_impl_all!(StageQueue: Send, Sync);

impl StageQueue {
    pub fn new() -> Self {
        Self
    }

    /// Submit one stage job and await its serialized output frame.
    ///
    /// The payload and parameters are moved into the job; nothing else from
    /// the submitting chain crosses the hand-off boundary.
    pub async fn submit(
        &self,
        stage: StageKind,
        payload: String,
        params: StageParams,
    ) -> Result<String> {
        tokio::task::spawn_blocking(move || run_stage(stage, &payload, &params))
            .await
            .map_err(|e| PrepError::Internal(format!("stage job did not complete: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::config::PipelineConfig;
    use polars::prelude::*;

    fn params() -> StageParams {
        StageParams {
            config: PipelineConfig::default(),
            target_column: None,
        }
    }

    #[tokio::test]
    async fn test_submit_runs_stage() {
        let df = df!["x" => [Some(1.0f64), None, Some(3.0)]].unwrap();
        let payload = codec::encode(&df).unwrap();

        let queue = StageQueue::new();
        let out = queue
            .submit(StageKind::Impute, payload, params())
            .await
            .unwrap();

        let decoded = codec::decode(&out).unwrap();
        assert_eq!(decoded.column("x").unwrap().null_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_surfaces_stage_errors() {
        let queue = StageQueue::new();
        let err = queue
            .submit(StageKind::Dedup, "not a payload".to_string(), params())
            .await
            .unwrap_err();
        assert!(matches!(err, PrepError::Decode(_)));
    }
}
