//! Distributor registry service

use std::sync::Arc;

use fflbro_domain::{
    Distributor, DistributorConfig, DistributorId, FflBroError, ReadinessState, Result,
};
use tracing::{debug, info};

use super::ports::DistributorRepository;

/// Registry of known distributors
///
/// Other services consult it to validate distributor identifiers.
pub struct DistributorRegistry {
    repository: Arc<dyn DistributorRepository>,
}

impl DistributorRegistry {
    /// Registry backed by `repository`.
    pub fn new(repository: Arc<dyn DistributorRepository>) -> Self {
        Self { repository }
    }

    /// All distributors in registration order.
    pub fn list_distributors(&self) -> Result<Vec<Distributor>> {
        self.repository.list_distributors()
    }

    /// Whether `id` is registered.
    pub fn is_known(&self, id: &DistributorId) -> Result<bool> {
        Ok(self.repository.find_distributor(id)?.is_some())
    }

    /// Declared readiness, `UnknownDistributor` when not registered.
    pub fn get_status(&self, id: &DistributorId) -> Result<ReadinessState> {
        Ok(self.require(id)?.status)
    }

    /// Look up a distributor, failing with `UnknownDistributor`.
    pub fn require(&self, id: &DistributorId) -> Result<Distributor> {
        self.repository
            .find_distributor(id)?
            .ok_or_else(|| FflBroError::UnknownDistributor(id.to_string()))
    }

    /// Register a new distributor; a taken id fails with `AlreadyExists`.
    pub fn add_distributor(
        &self,
        id: DistributorId,
        name: impl Into<String>,
        status: ReadinessState,
    ) -> Result<Distributor> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FflBroError::InvalidInput(format!("distributor {id} needs a display name")));
        }
        let distributor = Distributor::new(id, name.trim(), status);
        self.repository.insert_distributor(&distributor)?;
        info!(distributor_id = %distributor.id, status = %distributor.status, "distributor registered");
        Ok(distributor)
    }

    /// Change the declared readiness of a registered distributor.
    pub fn set_status(&self, id: &DistributorId, status: ReadinessState) -> Result<Distributor> {
        if !self.repository.update_status(id, status)? {
            return Err(FflBroError::UnknownDistributor(id.to_string()));
        }
        info!(distributor_id = %id, %status, "distributor status changed");
        self.require(id)
    }

    /// Remove a distributor no products or sync record reference.
    pub fn remove_distributor(&self, id: &DistributorId) -> Result<()> {
        self.repository.delete_distributor(id)?;
        info!(distributor_id = %id, "distributor removed");
        Ok(())
    }

    /// Register configured distributors that are not yet known.
    ///
    /// Existing entries keep their stored status. Returns how many were added.
    pub fn seed_from_config(&self, entries: &[DistributorConfig]) -> Result<usize> {
        let mut added = 0;
        for entry in entries {
            if self.repository.find_distributor(&entry.id)?.is_some() {
                continue;
            }
            let distributor = Distributor::new(entry.id.clone(), entry.name.clone(), entry.status);
            match self.repository.insert_distributor(&distributor) {
                Ok(()) => added += 1,
                // Lost a race with another seeder
                Err(FflBroError::AlreadyExists(_)) => {}
                Err(err) => return Err(err),
            }
        }
        debug!(added, configured = entries.len(), "distributor registry seeded");
        Ok(added)
    }
}
