//! Port interfaces for the distributor registry

use fflbro_domain::{Distributor, DistributorId, ReadinessState, Result};

/// Persistence for registered distributors
pub trait DistributorRepository: Send + Sync {
    /// All distributors in registration order.
    fn list_distributors(&self) -> Result<Vec<Distributor>>;

    /// Distributor with `id`, if registered.
    fn find_distributor(&self, id: &DistributorId) -> Result<Option<Distributor>>;

    /// Fails with `AlreadyExists` when the id is taken.
    fn insert_distributor(&self, distributor: &Distributor) -> Result<()>;

    /// Returns `false` when no such distributor exists.
    fn update_status(&self, id: &DistributorId, status: ReadinessState) -> Result<bool>;

    /// Fails with `InUse` while products or a sync record reference the
    /// distributor, `UnknownDistributor` when absent.
    fn delete_distributor(&self, id: &DistributorId) -> Result<()>;
}
