//! Catalog sync driver
//!
//! Pulls records from a [`DistributorFeed`], upserts them into the catalog
//! and reports progress around the run. The transfer itself (FTP, HTTP, file
//! drop) lives behind the feed; this driver only sequences tracker and
//! catalog calls.

use std::sync::Arc;

use fflbro_domain::constants::DEFAULT_PROGRESS_REPORT_EVERY;
use fflbro_domain::{DistributorId, ProductFields, Result, SyncProgress, SyncStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::service::SyncTracker;
use crate::catalog::CatalogService;

/// One raw product row produced by a feed connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub item_number: String,
    pub fields: ProductFields,
}

impl FeedRecord {
    /// Record for `item_number` carrying `fields`.
    pub fn new(item_number: impl Into<String>, fields: ProductFields) -> Self {
        Self { item_number: item_number.into(), fields }
    }
}

/// Source of records for one distributor
pub trait DistributorFeed {
    /// Record count if the feed knows it before streaming.
    fn expected_total(&self) -> Option<u64>;

    /// Next record, `None` once the feed is drained.
    fn next_record(&mut self) -> Option<Result<FeedRecord>>;
}

/// What to do with the partial-progress marker of a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumePolicy {
    /// Re-ingest everything.
    #[default]
    Restart,
    /// After a failed run, skip as many leading records as it processed.
    SkipProcessed,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub distributor_id: DistributorId,
    pub upserted: u64,
    pub skipped: u64,
    pub progress: SyncProgress,
}

/// Drives one feed into the catalog under sync tracking
pub struct CatalogSyncJob {
    tracker: Arc<SyncTracker>,
    catalog: Arc<CatalogService>,
    report_every: u64,
    resume: ResumePolicy,
}

impl CatalogSyncJob {
    pub fn new(tracker: Arc<SyncTracker>, catalog: Arc<CatalogService>) -> Self {
        Self {
            tracker,
            catalog,
            report_every: DEFAULT_PROGRESS_REPORT_EVERY,
            resume: ResumePolicy::default(),
        }
    }

    /// Report progress after this many records (minimum 1).
    pub fn with_report_every(mut self, report_every: u64) -> Self {
        self.report_every = report_every.max(1);
        self
    }

    pub fn with_resume_policy(mut self, resume: ResumePolicy) -> Self {
        self.resume = resume;
        self
    }

    /// Run a full sync for `distributor_id`.
    ///
    /// Any feed, catalog or tracker error marks the run failed (keeping the
    /// processed count) and is returned. A run cancelled from outside
    /// surfaces as the `InvalidState` of the next progress report.
    pub fn run(
        &self,
        distributor_id: &DistributorId,
        feed: &mut dyn DistributorFeed,
    ) -> Result<SyncOutcome> {
        let skip = match self.resume {
            ResumePolicy::Restart => 0,
            ResumePolicy::SkipProcessed => {
                let previous = self.tracker.get_progress(distributor_id)?;
                if previous.status == SyncStatus::Failed {
                    previous.processed_items
                } else {
                    0
                }
            }
        };

        self.tracker.start_sync(distributor_id, feed.expected_total().unwrap_or(0))?;
        if skip > 0 {
            info!(%distributor_id, skip, "resuming after failed run");
        }

        let mut tally = Tally::default();
        match self.ingest(distributor_id, feed, skip, &mut tally) {
            Ok(()) => {
                let progress = self.tracker.complete_sync(distributor_id)?;
                Ok(SyncOutcome {
                    distributor_id: distributor_id.clone(),
                    upserted: tally.upserted,
                    skipped: tally.skipped,
                    progress,
                })
            }
            Err(err) => {
                // Records ingested since the last report still count toward the failed run.
                if tally.unreported > 0 {
                    if let Err(flush_err) =
                        self.tracker.report_progress(distributor_id, tally.unreported, &tally.last_item)
                    {
                        warn!(%distributor_id, error = %flush_err, "could not flush progress");
                    }
                }
                if let Err(fail_err) = self.tracker.fail_sync(distributor_id, &err.to_string()) {
                    warn!(%distributor_id, error = %fail_err, "could not mark sync failed");
                }
                Err(err)
            }
        }
    }

    fn ingest(
        &self,
        distributor_id: &DistributorId,
        feed: &mut dyn DistributorFeed,
        skip: u64,
        tally: &mut Tally,
    ) -> Result<()> {
        while let Some(record) = feed.next_record() {
            let record = record?;
            if tally.skipped < skip {
                tally.skipped += 1;
            } else {
                self.catalog.upsert_product(distributor_id, &record.item_number, &record.fields)?;
                tally.upserted += 1;
            }
            tally.unreported += 1;
            tally.last_item = record.item_number;

            if tally.unreported >= self.report_every {
                self.tracker.report_progress(distributor_id, tally.unreported, &tally.last_item)?;
                tally.unreported = 0;
            }
        }

        if tally.unreported > 0 {
            self.tracker.report_progress(distributor_id, tally.unreported, &tally.last_item)?;
            tally.unreported = 0;
        }
        Ok(())
    }
}

/// Counters for one run.
#[derive(Debug, Default)]
struct Tally {
    upserted: u64,
    skipped: u64,
    unreported: u64,
    last_item: String,
}
