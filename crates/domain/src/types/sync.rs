//! Sync progress types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::distributor::DistributorId;

/// Per-distributor sync state
///
/// `ready -> running -> {completed, failed}`; a new run moves any non-running
/// state back to `running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Ready,
    Running,
    Completed,
    Failed,
}

crate::impl_domain_status_conversions!(SyncStatus {
    Ready => "ready",
    Running => "running",
    Completed => "completed",
    Failed => "failed",
});

/// Observable progress of the latest sync run for one distributor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub distributor_id: DistributorId,
    pub status: SyncStatus,
    /// Expected record count, 0 while unknown.
    pub total_items: u64,
    pub processed_items: u64,
    pub current_item: Option<String>,
    pub last_error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SyncProgress {
    /// Initial state for a distributor that has never been synced.
    pub fn ready(distributor_id: DistributorId) -> Self {
        Self {
            distributor_id,
            status: SyncStatus::Ready,
            total_items: 0,
            processed_items: 0,
            current_item: None,
            last_error: None,
            started_at: None,
            finished_at: None,
            last_updated: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SyncStatus::Running
    }

    /// Completion percentage, `None` while the total is unknown.
    pub fn percent_complete(&self) -> Option<f64> {
        if self.total_items == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = self.processed_items as f64 / self.total_items as f64 * 100.0;
        Some(pct.min(100.0))
    }
}
