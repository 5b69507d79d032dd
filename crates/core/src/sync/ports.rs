//! Port interfaces for sync progress persistence
//!
//! Every state change is a single conditional write so that concurrent
//! callers cannot interleave a read-modify-write on the same record.

use chrono::{DateTime, Utc};
use fflbro_domain::{DistributorId, Result, SyncProgress, SyncStatus};

/// Store of per-distributor sync progress records
pub trait SyncProgressRepository: Send + Sync {
    /// Stored record for `distributor_id`, if any.
    fn find_progress(&self, distributor_id: &DistributorId) -> Result<Option<SyncProgress>>;

    /// Every persisted record, ordered by distributor id.
    fn list_progress(&self) -> Result<Vec<SyncProgress>>;

    /// Atomically move the record to `running` unless it already is.
    ///
    /// Resets `processed_items` to 0, sets `total_items`, clears the
    /// cursor and error. Returns `None` when a run is already in progress;
    /// a missing record is created. Fails with `UnknownDistributor` when the
    /// distributor row does not exist.
    fn begin_run(
        &self,
        distributor_id: &DistributorId,
        expected_total: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncProgress>>;

    /// Add `delta` to a running record and raise `total_items` to at least
    /// the new processed count. Returns `None` when not running.
    fn record_progress(
        &self,
        distributor_id: &DistributorId,
        delta: u64,
        current_item: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncProgress>>;

    /// Move a running record to `outcome` (`completed` or `failed`).
    /// Returns `None` when not running.
    fn finish_run(
        &self,
        distributor_id: &DistributorId,
        outcome: SyncStatus,
        error: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncProgress>>;
}
