//! Chain progress states.

use serde::{Deserialize, Serialize};

use crate::stages::StageKind;

/// Progress of one preprocessing chain, persisted on the dataset record
/// before every stage hand-off. Strictly sequential; the two `Ready*`
/// states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainState {
    Pending,
    Transforming,
    Deduplicating,
    Imputing,
    RemovingOutliers,
    Normalizing,
    Finalizing,
    ReadyOk,
    ReadyFailed,
}

impl ChainState {
    /// The state the chain is in while the given stage runs.
    pub fn for_stage(stage: StageKind) -> Self {
        match stage {
            StageKind::Transform => ChainState::Transforming,
            StageKind::Dedup => ChainState::Deduplicating,
            StageKind::Impute => ChainState::Imputing,
            StageKind::Outliers => ChainState::RemovingOutliers,
            StageKind::Normalize => ChainState::Normalizing,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ChainState::ReadyOk | ChainState::ReadyFailed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChainState::Pending => "pending",
            ChainState::Transforming => "transforming",
            ChainState::Deduplicating => "deduplicating",
            ChainState::Imputing => "imputing",
            ChainState::RemovingOutliers => "removing outliers",
            ChainState::Normalizing => "normalizing",
            ChainState::Finalizing => "finalizing",
            ChainState::ReadyOk => "ready",
            ChainState::ReadyFailed => "failed",
        }
    }
}

impl std::fmt::Display for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
