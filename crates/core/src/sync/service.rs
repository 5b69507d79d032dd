//! Sync progress tracker - per-distributor run state machine
//!
//! `ready -> running -> {completed, failed}`; a new run may start from any
//! state except `running`. The tracker never talks to a distributor itself:
//! feed connectors report into it and dashboards read from it.

use std::collections::HashMap;
use std::sync::Arc;

use fflbro_common::time::Clock;
use fflbro_domain::constants::SYNC_CANCELLED_REASON;
use fflbro_domain::{DistributorId, FflBroError, Result, SyncProgress, SyncStatus};
use tracing::{debug, info, warn};

use super::ports::SyncProgressRepository;
use crate::registry::ports::DistributorRepository;

/// Sync progress tracker
pub struct SyncTracker {
    distributors: Arc<dyn DistributorRepository>,
    progress: Arc<dyn SyncProgressRepository>,
    clock: Arc<dyn Clock>,
}

impl SyncTracker {
    /// Tracker over `progress`, validating ids against `distributors`.
    pub fn new(
        distributors: Arc<dyn DistributorRepository>,
        progress: Arc<dyn SyncProgressRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { distributors, progress, clock }
    }

    /// Open a new run for `distributor_id`.
    ///
    /// `expected_total` is 0 when the feed size is not known up front.
    pub fn start_sync(
        &self,
        distributor_id: &DistributorId,
        expected_total: u64,
    ) -> Result<SyncProgress> {
        let distributor = self
            .distributors
            .find_distributor(distributor_id)?
            .ok_or_else(|| FflBroError::UnknownDistributor(distributor_id.to_string()))?;
        if !distributor.accepts_sync() {
            return Err(FflBroError::InvalidState(format!(
                "distributor {distributor_id} is {}; syncs are not accepted",
                distributor.status
            )));
        }

        match self.progress.begin_run(distributor_id, expected_total, self.clock.now())? {
            Some(progress) => {
                info!(%distributor_id, expected_total, "sync started");
                Ok(progress)
            }
            None => {
                debug!(%distributor_id, "sync start rejected; run already in progress");
                Err(FflBroError::AlreadyRunning(distributor_id.to_string()))
            }
        }
    }

    /// Add `processed_delta` items to the running total and move the cursor.
    pub fn report_progress(
        &self,
        distributor_id: &DistributorId,
        processed_delta: u64,
        current_item: &str,
    ) -> Result<SyncProgress> {
        self.ensure_known(distributor_id)?;
        match self.progress.record_progress(
            distributor_id,
            processed_delta,
            current_item,
            self.clock.now(),
        )? {
            Some(progress) => {
                debug!(
                    %distributor_id,
                    processed = progress.processed_items,
                    total = progress.total_items,
                    current_item,
                    "sync progress"
                );
                Ok(progress)
            }
            None => Err(self.not_running(distributor_id, "report progress")?),
        }
    }

    /// Mark the run completed.
    pub fn complete_sync(&self, distributor_id: &DistributorId) -> Result<SyncProgress> {
        self.ensure_known(distributor_id)?;
        match self.progress.finish_run(
            distributor_id,
            SyncStatus::Completed,
            None,
            self.clock.now(),
        )? {
            Some(progress) => {
                info!(%distributor_id, processed = progress.processed_items, "sync completed");
                Ok(progress)
            }
            None => Err(self.not_running(distributor_id, "complete")?),
        }
    }

    /// Mark the run failed; `processed_items` is kept as a resume marker.
    pub fn fail_sync(&self, distributor_id: &DistributorId, reason: &str) -> Result<SyncProgress> {
        self.ensure_known(distributor_id)?;
        match self.progress.finish_run(
            distributor_id,
            SyncStatus::Failed,
            Some(reason),
            self.clock.now(),
        )? {
            Some(progress) => {
                warn!(
                    %distributor_id,
                    processed = progress.processed_items,
                    reason,
                    "sync failed"
                );
                Ok(progress)
            }
            None => Err(self.not_running(distributor_id, "fail")?),
        }
    }

    /// Cancellation is a failure with the reserved reason `cancelled`.
    pub fn cancel_sync(&self, distributor_id: &DistributorId) -> Result<SyncProgress> {
        self.fail_sync(distributor_id, SYNC_CANCELLED_REASON)
    }

    /// Latest progress; a distributor that never synced reports `ready`.
    pub fn get_progress(&self, distributor_id: &DistributorId) -> Result<SyncProgress> {
        self.ensure_known(distributor_id)?;
        Ok(self
            .progress
            .find_progress(distributor_id)?
            .unwrap_or_else(|| SyncProgress::ready(distributor_id.clone())))
    }

    /// One record per registered distributor, in registry order.
    pub fn list_progress(&self) -> Result<Vec<SyncProgress>> {
        let mut stored: HashMap<DistributorId, SyncProgress> = self
            .progress
            .list_progress()?
            .into_iter()
            .map(|progress| (progress.distributor_id.clone(), progress))
            .collect();

        Ok(self
            .distributors
            .list_distributors()?
            .into_iter()
            .map(|distributor| {
                stored.remove(&distributor.id).unwrap_or_else(|| SyncProgress::ready(distributor.id))
            })
            .collect())
    }

    fn ensure_known(&self, distributor_id: &DistributorId) -> Result<()> {
        if self.distributors.find_distributor(distributor_id)?.is_none() {
            return Err(FflBroError::UnknownDistributor(distributor_id.to_string()));
        }
        Ok(())
    }

    /// Build the `InvalidState` error naming the state the record is in.
    fn not_running(&self, distributor_id: &DistributorId, action: &str) -> Result<FflBroError> {
        let status = self
            .progress
            .find_progress(distributor_id)?
            .map_or(SyncStatus::Ready, |progress| progress.status);
        Ok(FflBroError::InvalidState(format!(
            "cannot {action} sync for {distributor_id}: status is {status}, not running"
        )))
    }
}
