//! Read-only reference data consumed when composing SPM numbers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Error type for reference data backends
#[derive(Error, Debug, Clone)]
pub enum ReferenceDataError {
    #[error("Reference data backend unavailable: {0}")]
    Unavailable(String),
}

/// A lookup that must succeed before numbering can proceed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MissingReferenceDataError {
    #[error("Owning unit '{0}' has no reference data; numbering cannot proceed")]
    Unit(String),

    #[error("Schedule code '{0}' is not an active schedule")]
    Schedule(String),
}

/// Codes attached to an owning unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitInfo {
    pub unit_code: String,
    pub region_code: String,
}

/// An issuance schedule a document can be submitted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub code: String,
    pub description: String,
}

/// Reference data contract.
#[async_trait]
pub trait ReferenceDataService: Send + Sync {
    /// Codes for an owning unit, or `None` if the unit is unknown.
    async fn lookup_unit(&self, owning_unit: &str) -> Result<Option<UnitInfo>, ReferenceDataError>;

    /// The currently active issuance schedules.
    async fn active_schedules(&self) -> Result<Vec<Schedule>, ReferenceDataError>;
}

/// Map-backed reference data for tests and static deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceData {
    units: HashMap<String, UnitInfo>,
    schedules: Vec<Schedule>,
}

impl StaticReferenceData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_unit(
        mut self,
        owning_unit: impl Into<String>,
        unit_code: impl Into<String>,
        region_code: impl Into<String>,
    ) -> Self {
        self.units.insert(
            owning_unit.into(),
            UnitInfo {
                unit_code: unit_code.into(),
                region_code: region_code.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn with_schedule(mut self, code: impl Into<String>, description: impl Into<String>) -> Self {
        self.schedules.push(Schedule {
            code: code.into(),
            description: description.into(),
        });
        self
    }
}

#[async_trait]
impl ReferenceDataService for StaticReferenceData {
    async fn lookup_unit(&self, owning_unit: &str) -> Result<Option<UnitInfo>, ReferenceDataError> {
        Ok(self.units.get(owning_unit).cloned())
    }

    async fn active_schedules(&self) -> Result<Vec<Schedule>, ReferenceDataError> {
        Ok(self.schedules.clone())
    }
}
