//! Domain identifier types
//!
//! Newtype wrappers over UUIDs so an export id can never be passed where a
//! run id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// BatchExport identifier
///
/// The string form of this id is also the id of the export's schedule in the
/// workflow engine, so it must never be reassigned to another export.
///
/// # Examples
///
/// ```
/// use batch_exports::domain::ids::BatchExportId;
/// use std::str::FromStr;
///
/// let id = BatchExportId::from_str("0f9f5e8c-5d55-4a5d-9f3e-2a1c6b1e9f10").unwrap();
/// assert_eq!(id.schedule_id(), "0f9f5e8c-5d55-4a5d-9f3e-2a1c6b1e9f10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchExportId(Uuid);

impl BatchExportId {
    /// Generates a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the schedule id used in the workflow engine
    pub fn schedule_id(&self) -> String {
        self.0.to_string()
    }
}

impl Default for BatchExportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchExportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatchExportId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| format!("Invalid BatchExport id '{s}': {e}"))
    }
}

impl From<Uuid> for BatchExportId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// BatchExportRun identifier
///
/// For backfills this is also the workflow id of the direct execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| format!("Invalid BatchExportRun id '{s}': {e}"))
    }
}

impl From<Uuid> for RunId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
