//! Chain orchestration.
//!
//! [`Orchestrator::start`] is the single entry point: it spawns a background
//! chain that reads the source CSV once, threads a serialized frame payload
//! through the five stages via the [`StageQueue`], and hands the last output
//! to finalization. Any fault along the way goes to the failure handler,
//! which marks the record ready-with-error without touching the source file
//! or a previously finalized result.

pub mod queue;
pub mod state;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use polars::prelude::*;
use static_assertions::assert_impl_all;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::PipelineConfig;
use crate::error::{PrepError, Result};
use crate::record::{DatasetRecord, RecordId, RecordStore};
use crate::report::{FrameSummary, PreprocessingReport};
use crate::stages::{StageKind, StageParams};
use crate::codec;

use self::queue::StageQueue;
use self::state::ChainState;

/// Suffix appended to the source file stem for the finalized output.
const RESULT_SUFFIX: &str = "_processed";

/// Suffix appended to the source file stem for the before/after report.
const REPORT_SUFFIX: &str = "_report";

/// Handle to a running chain. Awaiting it waits for the chain to reach a
/// terminal state; the outcome itself is read from the dataset record.
#[derive(Debug)]
pub struct JobHandle {
    inner: tokio::task::JoinHandle<()>,
}

impl JobHandle {
    pub async fn wait(self) -> Result<()> {
        self.inner
            .await
            .map_err(|e| PrepError::Internal(format!("chain task failed: {e}")))
    }
}

/// Drives preprocessing chains over a record store.
pub struct Orchestrator {
    store: Arc<dyn RecordStore>,
    config: PipelineConfig,
    queue: StageQueue,
    active: Arc<Mutex<HashSet<RecordId>>>,
}

assert_impl_all!(Orchestrator: Send, Sync);

impl Orchestrator {
    pub fn new(store: Arc<dyn RecordStore>, config: PipelineConfig) -> Self {
        Self {
            store,
            config,
            queue: StageQueue::new(),
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Start the preprocessing chain for a dataset. Fire-and-forget: the
    /// chain runs in the background and the returned handle only signals
    /// completion. At most one chain per dataset id may be active.
    pub fn start(&self, id: RecordId) -> Result<JobHandle> {
        {
            let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
            if !active.insert(id) {
                return Err(PrepError::ChainActive(id));
            }
        }

        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        let queue = self.queue;
        let active = Arc::clone(&self.active);
        let span = info_span!("preprocess_chain", dataset_id = id);

        let inner = tokio::spawn(async move {
            run_chain(store, config, queue, id).instrument(span).await;
            active.lock().unwrap_or_else(|e| e.into_inner()).remove(&id);
        });

        Ok(JobHandle { inner })
    }
}

async fn run_chain(
    store: Arc<dyn RecordStore>,
    config: PipelineConfig,
    queue: StageQueue,
    id: RecordId,
) {
    let record = match store.get(id) {
        Ok(record) => record,
        Err(e) => {
            // Nothing to mark failed when the record itself is missing.
            error!(error = %e, "cannot start chain");
            return;
        }
    };

    info!(source = %record.source_path.display(), "chain started");
    let limit = config.error_message_limit;

    if let Err(err) = process(&*store, &config, &queue, record).await {
        fail_record(&*store, id, &err, limit);
    }
}

/// Run the full chain for one record. Returns on the first fault; the
/// caller routes it to the failure handler.
async fn process(
    store: &dyn RecordStore,
    config: &PipelineConfig,
    queue: &StageQueue,
    mut record: DatasetRecord,
) -> Result<()> {
    // The source file is read exactly once, here. Stages only ever see the
    // serialized payload.
    let df = read_source(&record.source_path)?;
    let df = apply_column_selection(df, &record)?;
    let before = FrameSummary::from_frame(&df)?;
    let mut payload = codec::encode(&df)?;

    let params = StageParams {
        config: config.clone(),
        target_column: record.target_column.clone(),
    };

    for stage in StageKind::CHAIN {
        record.status = ChainState::for_stage(stage);
        store.save(&record)?;
        payload = queue.submit(stage, payload, params.clone()).await?;
    }

    record.status = ChainState::Finalizing;
    store.save(&record)?;
    finalize(store, record, &payload, before)
}

fn read_source(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!(rows = df.height(), cols = df.width(), "source loaded");
    Ok(df)
}

/// Verify the target and ignored columns exist, then drop the ignored ones.
fn apply_column_selection(df: DataFrame, record: &DatasetRecord) -> Result<DataFrame> {
    if let Some(target) = &record.target_column {
        if df.column(target).is_err() {
            return Err(PrepError::Schema(target.clone()));
        }
    }
    for ignored in &record.ignored_columns {
        if df.column(ignored).is_err() {
            return Err(PrepError::Schema(ignored.clone()));
        }
    }
    if record.ignored_columns.is_empty() {
        return Ok(df);
    }

    let names: Vec<PlSmallStr> = record
        .ignored_columns
        .iter()
        .map(|s| s.as_str().into())
        .collect();
    info!(dropped = names.len(), "dropped ignored columns");
    Ok(df.drop_many(names))
}

/// Write the final frame next to the source and mark the record ready.
///
/// The destination is derived deterministically from the source path, so
/// re-running a chain overwrites the same file.
fn finalize(
    store: &dyn RecordStore,
    mut record: DatasetRecord,
    payload: &str,
    before: FrameSummary,
) -> Result<()> {
    let mut df = codec::decode(payload)?;
    let dest = result_path(&record.source_path);

    write_result(&mut df, &dest)?;
    record.result_path = Some(dest.clone());
    record.report_path = write_report(&record, &dest, &before, &df);

    record.ready = true;
    record.error_message = None;
    record.status = ChainState::ReadyOk;
    store.save(&record)?;

    info!(
        result = %dest.display(),
        rows = df.height(),
        cols = df.width(),
        "chain finished"
    );
    Ok(())
}

/// Write the frame as CSV via a sibling temp file and an atomic rename.
///
/// A failed write must never clobber a previously finalized result, so the
/// destination is only replaced once the new file is complete.
fn write_result(df: &mut DataFrame, dest: &Path) -> Result<()> {
    let tmp = dest.with_extension("csv.tmp");

    let written = (|| -> Result<()> {
        let mut file = std::fs::File::create(&tmp)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)?;
        Ok(())
    })();

    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    if let Err(e) = std::fs::rename(&tmp, dest) {
        let _ = std::fs::remove_file(&tmp);
        return Err(PrepError::Io(e));
    }
    Ok(())
}

/// Write the before/after report next to the result. Report problems are
/// logged, not fatal; the processed data is already on disk.
fn write_report(
    record: &DatasetRecord,
    dest: &Path,
    before: &FrameSummary,
    final_df: &DataFrame,
) -> Option<PathBuf> {
    let path = report_path(&record.source_path);
    let after = match FrameSummary::from_frame(final_df) {
        Ok(after) => after,
        Err(e) => {
            warn!(error = %e, "could not summarize final frame, skipping report");
            return None;
        }
    };

    let report = PreprocessingReport::new(
        record.source_path.display().to_string(),
        dest.display().to_string(),
        before.clone(),
        after,
    );
    match report.write_json(&path) {
        Ok(()) => {
            info!(report = %path.display(), "report written");
            Some(path)
        }
        Err(e) => {
            warn!(error = %e, "could not write report");
            None
        }
    }
}

/// Mark the record failed. The source file and any previously finalized
/// result are left untouched.
fn fail_record(store: &dyn RecordStore, id: RecordId, err: &PrepError, limit: usize) {
    error!(error = %err, "chain failed");

    let mut record = match store.get(id) {
        Ok(record) => record,
        Err(e) => {
            error!(error = %e, "cannot persist failure");
            return;
        }
    };

    record.ready = true;
    record.error_message = Some(err.truncated_message(limit));
    record.status = ChainState::ReadyFailed;
    if let Err(e) = store.save(&record) {
        error!(error = %e, "cannot persist failure");
    }
}

/// `uploads/data.csv` finalizes to `uploads/data_processed.csv`.
fn result_path(source: &Path) -> PathBuf {
    sibling_path(source, RESULT_SUFFIX, "csv")
}

/// `uploads/data.csv` gets its report at `uploads/data_report.json`.
fn report_path(source: &Path) -> PathBuf {
    sibling_path(source, REPORT_SUFFIX, "json")
}

fn sibling_path(source: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let file_name = format!("{stem}{suffix}.{extension}");
    match source.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
