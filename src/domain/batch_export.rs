//! Export definitions
//!
//! A [`BatchExport`] is created by an administrative action elsewhere; this
//! crate only reads it, flips its paused flag and registers its schedule.

use crate::domain::ids::BatchExportId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Owning team of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// Where an export writes to
///
/// `config` is opaque here: its shape belongs to the destination workflow
/// registered for `destination_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: Uuid,

    /// Key into the destination workflow registry, e.g. `"S3"`
    #[serde(rename = "type")]
    pub destination_type: String,

    #[serde(default)]
    pub config: Map<String, Value>,
}

/// Cadence of a recurring export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportInterval {
    #[default]
    Hour,
    Day,
    #[serde(rename = "every 5 minutes")]
    Every5Minutes,
}

impl ExportInterval {
    /// Length of one batch window in seconds
    pub fn as_seconds(&self) -> u64 {
        match self {
            ExportInterval::Hour => 3_600,
            ExportInterval::Day => 86_400,
            ExportInterval::Every5Minutes => 300,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportInterval::Hour => "hour",
            ExportInterval::Day => "day",
            ExportInterval::Every5Minutes => "every 5 minutes",
        }
    }
}

impl fmt::Display for ExportInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hour" => Ok(ExportInterval::Hour),
            "day" => Ok(ExportInterval::Day),
            "every 5 minutes" => Ok(ExportInterval::Every5Minutes),
            other => Err(format!(
                "Invalid export interval '{other}'. Must be one of: hour, day, every 5 minutes"
            )),
        }
    }
}

/// An export definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchExport {
    pub id: BatchExportId,
    pub team: Team,
    pub name: String,
    pub destination: Destination,
    #[serde(default)]
    pub interval: ExportInterval,
    #[serde(default)]
    pub paused: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub last_updated_at: DateTime<Utc>,
}

impl BatchExport {
    /// Schedule id in the workflow engine
    pub fn schedule_id(&self) -> String {
        self.id.schedule_id()
    }
}
