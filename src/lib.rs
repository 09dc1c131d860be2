//! Asynchronous Tabular Preprocessing Pipeline
//!
//! A Polars-based preprocessing backend for machine learning datasets. An
//! uploaded CSV is pushed through a chain of queued background stages, each
//! consuming the serialized output of the previous one:
//!
//! - **Transformation**: coerce every column to numeric, drop what cannot be
//! - **Deduplication**: remove duplicate columns, then duplicate rows
//! - **Imputation**: fill missing numeric values with the column median
//! - **Outlier Removal**: drop rows outside per-column IQR fences
//! - **Normalization**: standard-scale continuous, non-binary columns
//!
//! The final frame is written next to the source file together with a
//! before/after JSON report, and the dataset record is marked ready. A
//! fault at any stage marks the record ready-with-error instead, leaving
//! the source file and any previously finalized result untouched.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tabular_prep::{
//!     DatasetRecord, InMemoryRecordStore, Orchestrator, PipelineConfig,
//! };
//!
//! let store = Arc::new(InMemoryRecordStore::new());
//! store.insert(DatasetRecord::new(1, "uploads/data.csv").with_target("label"));
//!
//! let orchestrator = Orchestrator::new(store.clone(), PipelineConfig::default());
//! orchestrator.start(1)?.wait().await?;
//!
//! let record = store.get(1)?;
//! match record.error_message {
//!     None => println!("done: {:?}", record.result_path),
//!     Some(msg) => println!("failed: {msg}"),
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to tune classification and outlier thresholds:
//!
//! ```rust,ignore
//! let config = PipelineConfig::builder()
//!     .lower_quantile(0.15)
//!     .upper_quantile(0.85)
//!     .iqr_factor(1.5)
//!     .build()?;
//! ```

pub mod classifier;
pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod stages;
pub mod utils;

// Re-exports for convenient access
pub use classifier::{classify_columns, ColumnClass, ColumnKind};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PrepError, Result, DEFAULT_ERROR_MESSAGE_LIMIT};
pub use pipeline::state::ChainState;
pub use pipeline::{JobHandle, Orchestrator};
pub use record::{DatasetRecord, InMemoryRecordStore, RecordId, RecordStore};
pub use report::{ColumnSummary, FrameSummary, PreprocessingReport};
pub use stages::{StageKind, StageParams};
