//! Distributor registry types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_DISTRIBUTOR_ID_LENGTH;
use crate::errors::{FflBroError, Result};

/// Validated distributor slug (`lipseys`, `sports_south`, ...).
///
/// Lowercase ASCII letters, digits and underscores only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistributorId(String);

impl DistributorId {
    /// Validate and wrap a distributor slug.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_DISTRIBUTOR_ID_LENGTH {
            return Err(FflBroError::InvalidInput(format!(
                "distributor id must be 1-{MAX_DISTRIBUTOR_ID_LENGTH} characters: {id:?}"
            )));
        }
        if !id.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_') {
            return Err(FflBroError::InvalidInput(format!(
                "distributor id must be lowercase alphanumeric or underscore: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DistributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DistributorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for DistributorId {
    type Err = FflBroError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for DistributorId {
    type Error = FflBroError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DistributorId> for String {
    fn from(value: DistributorId) -> Self {
        value.0
    }
}

/// Declared readiness of a distributor integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessState {
    #[default]
    Ready,
    Pending,
    Disabled,
}

crate::impl_domain_status_conversions!(ReadinessState {
    Ready => "ready",
    Pending => "pending",
    Disabled => "disabled",
});

/// Upstream wholesale supplier whose catalog is mirrored locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributor {
    pub id: DistributorId,
    pub name: String,
    pub status: ReadinessState,
}

impl Distributor {
    pub fn new(id: DistributorId, name: impl Into<String>, status: ReadinessState) -> Self {
        Self { id, name: name.into(), status }
    }

    /// Whether sync runs may be started for this distributor.
    pub fn accepts_sync(&self) -> bool {
        self.status != ReadinessState::Disabled
    }
}
